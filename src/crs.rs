use std::str::FromStr;

use crate::Error;

/// Numeric identifier of a coordinate reference system in the EPSG registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Epsg(u32);

impl Epsg {
    pub const fn new(code: u32) -> Self {
        Epsg(code)
    }

    pub fn code(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Epsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

impl From<u32> for Epsg {
    fn from(code: u32) -> Self {
        Epsg(code)
    }
}

impl FromStr for Epsg {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.strip_prefix("EPSG:").unwrap_or(s);
        Ok(Epsg(code.parse()?))
    }
}

pub mod epsg {
    use super::Epsg;

    pub const WGS84: Epsg = Epsg::new(4326);
    pub const WGS84_WEB_MERCATOR: Epsg = Epsg::new(3857);
    pub const NAD83: Epsg = Epsg::new(4269);
}
