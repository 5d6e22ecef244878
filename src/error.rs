use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
    #[error("Invalid string: {0}")]
    InvalidString(#[from] std::ffi::NulError),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("GDAL error: {0}")]
    GdalError(#[from] gdal::errors::GdalError),
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::InvalidNumber(err.to_string())
    }
}
