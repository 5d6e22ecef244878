use std::ffi::{c_int, CString};
use std::path::Path;

use crate::{
    crs::Epsg,
    gdalinterop::{self, check_pointer},
    Error, Rect, Result,
};

/// Fixed warp working memory limit when multithreading is enabled.
const WARP_MEMORY_LIMIT: &str = "80%";

/// Resampling kernel used when mapping source pixels onto the output grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResampleAlgorithm {
    Nearest,
    Bilinear,
    #[default]
    Cubic,
    CubicSpline,
    Lanczos,
    Average,
    Rms,
    Mode,
    Min,
    Max,
    Median,
    FirstQuartile,
    ThirdQuartile,
    Sum,
}

impl ResampleAlgorithm {
    fn cli_name(&self) -> &'static str {
        match self {
            ResampleAlgorithm::Nearest => "near",
            ResampleAlgorithm::Bilinear => "bilinear",
            ResampleAlgorithm::Cubic => "cubic",
            ResampleAlgorithm::CubicSpline => "cubicspline",
            ResampleAlgorithm::Lanczos => "lanczos",
            ResampleAlgorithm::Average => "average",
            ResampleAlgorithm::Rms => "rms",
            ResampleAlgorithm::Mode => "mode",
            ResampleAlgorithm::Min => "min",
            ResampleAlgorithm::Max => "max",
            ResampleAlgorithm::Median => "med",
            ResampleAlgorithm::FirstQuartile => "q1",
            ResampleAlgorithm::ThirdQuartile => "q3",
            ResampleAlgorithm::Sum => "sum",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumThreads {
    AllCpus,
    Count(usize),
}

impl NumThreads {
    fn is_multithreaded(&self) -> bool {
        match self {
            NumThreads::AllCpus => true,
            NumThreads::Count(count) => *count > 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MergeWarpOptions {
    /// Crop the output to this extent (default = the union of the input extents)
    pub output_extent: Option<Rect>,
    /// Reprojection target, also governs the interpretation of the extent coordinates
    /// (default = the coordinate system of the inputs)
    pub target_srs: Option<Epsg>,
    /// Output pixel size in target coordinate system units, applied to both axes
    /// (default = derived from the inputs)
    pub pixel_size: Option<f64>,
    /// The resampling kernel to use (default = `ResampleAlgorithm::Cubic`)
    pub resample_algo: ResampleAlgorithm,
    /// Nodata sentinel applied to both the inputs and the output
    pub nodata: Option<f64>,
    /// GDAL driver name of the output format (default = "GTiff")
    pub output_format: String,
    /// Value for the COMPRESS creation option of the output
    pub compression: Option<String>,
    /// Configure how many threads to use for the warp operation (default = single threaded)
    pub num_threads: NumThreads,
}

impl Default for MergeWarpOptions {
    fn default() -> Self {
        Self {
            output_extent: None,
            target_srs: None,
            pixel_size: None,
            resample_algo: ResampleAlgorithm::default(),
            nodata: None,
            output_format: "GTiff".to_string(),
            compression: None,
            num_threads: NumThreads::Count(1),
        }
    }
}

/// Translates the options into the argument list for the gdalwarp utility.
pub fn warp_cli_args(opts: &MergeWarpOptions) -> Vec<String> {
    let mut args = Vec::new();

    if let Some(extent) = &opts.output_extent {
        args.extend([
            "-te".to_string(),
            extent.min().x.to_string(),
            extent.min().y.to_string(),
            extent.max().x.to_string(),
            extent.max().y.to_string(),
        ]);

        if let Some(srs) = opts.target_srs {
            args.extend(["-te_srs".to_string(), srs.to_string()]);
        }
    }

    args.extend(["-of".to_string(), opts.output_format.clone()]);

    if let Some(pixel_size) = opts.pixel_size {
        args.extend(["-tr".to_string(), pixel_size.to_string(), pixel_size.to_string()]);
    }

    args.extend(["-r".to_string(), opts.resample_algo.cli_name().to_string()]);

    if let Some(srs) = opts.target_srs {
        args.extend(["-t_srs".to_string(), srs.to_string()]);
    }

    if let Some(nodata) = opts.nodata {
        args.extend(["-srcnodata".to_string(), nodata.to_string()]);
        args.extend(["-dstnodata".to_string(), nodata.to_string()]);
    }

    let mut creation_options = vec!["BIGTIFF=YES".to_string(), "TILED=YES".to_string()];
    if opts.num_threads.is_multithreaded() {
        args.push("-multi".to_string());
        args.extend(["-wm".to_string(), WARP_MEMORY_LIMIT.to_string()]);
        creation_options.push(match opts.num_threads {
            NumThreads::AllCpus => "NUM_THREADS=ALL_CPUS".to_string(),
            NumThreads::Count(count) => format!("NUM_THREADS={count}"),
        });
    }

    if let Some(compression) = &opts.compression {
        creation_options.push(format!("COMPRESS={compression}"));
    }

    for creation_option in creation_options {
        args.extend(["-co".to_string(), creation_option]);
    }

    args
}

struct WarpAppOptionsWrapper {
    options: *mut gdal_sys::GDALWarpAppOptions,
}

impl WarpAppOptionsWrapper {
    fn new(opts: &[String]) -> Result<Self> {
        let c_opts = gdalinterop::create_string_list(opts)?;

        Ok(WarpAppOptionsWrapper {
            options: unsafe { gdal_sys::GDALWarpAppOptionsNew(c_opts.as_ptr(), core::ptr::null_mut()) },
        })
    }
}

impl Drop for WarpAppOptionsWrapper {
    fn drop(&mut self) {
        unsafe {
            gdal_sys::GDALWarpAppOptionsFree(self.options);
        }
    }
}

/// Merges the input rasters into a single reprojected raster at `output_path`.
///
/// Inputs later in the list take precedence where they overlap earlier ones.
/// The output dataset is closed before returning, so the file is immediately
/// readable by other processes. Use [`merge_warp_to_dataset`] to keep working
/// with the result instead.
pub fn merge_warp<P: AsRef<Path>>(input_paths: &[P], output_path: &Path, opts: &MergeWarpOptions) -> Result<()> {
    merge_warp_to_dataset(input_paths, output_path, opts).map(|_| ())
}

/// Same as [`merge_warp`] but transfers ownership of the resulting dataset to
/// the caller. Dropping the dataset flushes and closes the output file.
pub fn merge_warp_to_dataset<P: AsRef<Path>>(
    input_paths: &[P],
    output_path: &Path,
    opts: &MergeWarpOptions,
) -> Result<gdal::Dataset> {
    if input_paths.is_empty() {
        return Err(Error::InvalidArgument("No input rasters provided to merge".to_string()));
    }

    let args = warp_cli_args(opts);
    log::debug!("Warp args: {}", args.join(" "));
    let warp_options = WarpAppOptionsWrapper::new(&args)?;

    let src_datasets = input_paths
        .iter()
        .map(|path| gdal::Dataset::open(path.as_ref()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let mut src_handles: Vec<gdal_sys::GDALDatasetH> = src_datasets.iter().map(gdal::Dataset::c_dataset).collect();

    gdalinterop::create_output_directory_if_needed(output_path)?;

    let path_str = CString::new(output_path.to_string_lossy().to_string())?;

    unsafe {
        let mut user_error: c_int = 0;
        let handle = gdal_sys::GDALWarp(
            path_str.as_ptr(),
            std::ptr::null_mut(),
            src_handles.len() as c_int,
            src_handles.as_mut_ptr(),
            warp_options.options,
            &mut user_error,
        );

        if user_error != 0 {
            return Err(Error::Runtime("GDAL Warp: invalid arguments".to_string()));
        }

        Ok(gdal::Dataset::from_c_dataset(check_pointer(handle, "GDALWarp")?))
    }
}
