use std::{
    ffi::{c_char, c_void, CStr},
    path::{Path, PathBuf},
};

use gdal::{cpl::CslStringList, errors::GdalError};

use crate::Result;

pub struct Config {
    pub debug_logging: bool,
    pub proj_data_search_location: Option<PathBuf>,
}

impl Config {
    pub fn apply(&self) -> Result<()> {
        setup_logging(self.debug_logging);
        if let Some(proj_data) = &self.proj_data_search_location {
            let proj_data = proj_data.to_string_lossy().to_string();
            gdal::config::set_config_option("PROJ_DATA", proj_data.as_str())?;

            // Also set the environment variable unless it is already set by the user
            // e.g. the proj library itself does not look at gdal settings
            if std::env::var_os("PROJ_DATA").is_none() {
                std::env::set_var("PROJ_DATA", proj_data.as_str());
            }
        }

        Ok(())
    }
}

pub fn setup_logging(debug: bool) {
    if debug && gdal::config::set_config_option("CPL_DEBUG", "ON").is_err() {
        log::debug!("Failed to set GDAL debug level")
    }

    gdal::config::set_error_handler(|sev, _ec, msg| {
        use gdal::errors::CplErrType;
        match sev {
            CplErrType::Debug => log::debug!("GDAL: {msg}"),
            CplErrType::Warning => log::warn!("GDAL: {msg}"),
            CplErrType::Failure | CplErrType::Fatal => log::error!("GDAL: {msg}"),
            CplErrType::None => {}
        }
    });
}

pub fn create_string_list(options: &[String]) -> Result<CslStringList> {
    let mut result = CslStringList::new();
    for opt in options {
        result.add_string(opt)?;
    }

    Ok(result)
}

pub fn check_pointer(ptr: *mut c_void, method_name: &'static str) -> std::result::Result<*mut c_void, GdalError> {
    if ptr.is_null() {
        let msg = last_error_message();
        unsafe { gdal_sys::CPLErrorReset() };
        Err(GdalError::NullPointer { method_name, msg })
    } else {
        Ok(ptr)
    }
}

pub fn create_output_directory_if_needed(p: &Path) -> Result {
    if p.to_string_lossy().starts_with("/vsi") {
        // this is a gdal virtual filesystem path
        return Ok(());
    }

    if let Some(parent) = p.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(())
}

fn raw_string_to_string(raw_ptr: *const c_char) -> String {
    let c_str = unsafe { CStr::from_ptr(raw_ptr) };
    c_str.to_string_lossy().into_owned()
}

fn last_error_message() -> String {
    raw_string_to_string(unsafe { gdal_sys::CPLGetLastErrorMsg() })
}
