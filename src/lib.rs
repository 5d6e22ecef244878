#![warn(clippy::unwrap_used)]

pub type Result<T = ()> = std::result::Result<T, Error>;

pub mod crs;
mod error;
pub mod gdalinterop;
mod runtimeconfiguration;
mod warp;

#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use runtimeconfiguration::RuntimeConfiguration;
pub use runtimeconfiguration::{proj_data_from_process_path, proj_data_from_search_path};
#[doc(inline)]
pub use warp::{merge_warp, merge_warp_to_dataset, warp_cli_args, MergeWarpOptions, NumThreads, ResampleAlgorithm};

pub type Rect<T = f64> = geo_types::Rect<T>;
