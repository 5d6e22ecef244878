use std::path::{Path, PathBuf};

use bon::bon;

use crate::gdalinterop;
use crate::Result;

/// Process wide GDAL and PROJ settings, to be applied once at startup.
pub struct RuntimeConfiguration {
    gdal_config: gdalinterop::Config,
}

#[bon]
impl RuntimeConfiguration {
    #[builder]
    pub fn new(proj_data: Option<&Path>, gdal_debug_log: Option<bool>) -> Self {
        Self {
            gdal_config: gdalinterop::Config {
                debug_logging: gdal_debug_log.unwrap_or(false),
                proj_data_search_location: proj_data.map(Path::to_path_buf),
            },
        }
    }

    pub fn apply(&self) -> Result<()> {
        self.gdal_config.apply()?;
        Ok(())
    }
}

/// Best effort guess of the proj data directory for environments that do not
/// configure it: takes the second entry of the executable search path
/// (`<prefix>/Library/bin` in conda style layouts) and resolves
/// `../share/proj` relative to it.
///
/// Returns `None` when the search path does not contain a second entry.
/// The result is a guess, verify it contains `proj.db` before relying on it.
pub fn proj_data_from_search_path(search_path: &str, separator: char) -> Option<PathBuf> {
    let second_entry = search_path
        .split(separator)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .nth(1)?;

    let library_dir = Path::new(second_entry).parent()?;
    Some(library_dir.join("share").join("proj"))
}

/// Applies the search path heuristic to the `PATH` variable of the current process.
pub fn proj_data_from_process_path() -> Option<PathBuf> {
    let search_path = std::env::var("PATH").ok()?;
    let separator = if cfg!(windows) { ';' } else { ':' };
    proj_data_from_search_path(&search_path, separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(windows)]
    fn proj_data_guess_from_windows_style_path() {
        let path = r"C:\App\bin;C:\Envs\myenv\Library\bin;C:\Windows\system32";
        assert_eq!(
            proj_data_from_search_path(path, ';'),
            Some(PathBuf::from(r"C:\Envs\myenv\Library").join("share").join("proj"))
        );
    }

    #[test]
    fn proj_data_guess_from_unix_style_path() {
        let path = "/usr/local/bin:/opt/env/bin:/usr/bin";
        assert_eq!(
            proj_data_from_search_path(path, ':'),
            Some(PathBuf::from("/opt/env/share/proj"))
        );
    }

    #[test]
    fn proj_data_guess_skips_empty_entries() {
        let path = "/usr/local/bin::/opt/env/bin";
        assert_eq!(
            proj_data_from_search_path(path, ':'),
            Some(PathBuf::from("/opt/env/share/proj"))
        );
    }

    #[test]
    fn proj_data_guess_requires_two_entries() {
        assert_eq!(proj_data_from_search_path("/usr/bin", ':'), None);
        assert_eq!(proj_data_from_search_path("", ':'), None);
    }
}
