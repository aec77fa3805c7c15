use std::fmt;
use serde::{Serialize,Deserialize};
use crate::errors::{CoreError,Result};

/// a hydrologic modeling domain named `<watershed>-<subbasin>`, e.g. `nfie-conus`.
#[derive(Debug,Clone,PartialEq,Eq,Hash,Serialize,Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Region(String);

impl Region {
    pub fn parse (s: impl AsRef<str>) -> Result<Self> {
        let s = s.as_ref();
        if is_valid_region_name(s) {
            Ok( Region(s.to_string()) )
        } else {
            Err( CoreError::InvalidRegionName(s.to_string()) )
        }
    }

    pub fn as_str (&self)->&str { &self.0 }

    /// the `<watershed>` component
    pub fn watershed (&self)->&str {
        self.0.split_once('-').map(|(w,_)| w).unwrap_or(&self.0)
    }

    /// the `<subbasin>` component
    pub fn subbasin (&self)->&str {
        self.0.split_once('-').map(|(_,s)| s).unwrap_or("")
    }
}

impl TryFrom<String> for Region {
    type Error = CoreError;
    fn try_from (s: String) -> Result<Self> { Region::parse(s) }
}

impl From<Region> for String {
    fn from (r: Region) -> String { r.0 }
}

impl fmt::Display for Region {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// `^[a-z0-9_]+-[a-z0-9_]+$` — exactly one hyphen, lowercase alphanumeric/underscore segments.
pub fn is_valid_region_name (s: &str) -> bool {
    let Some((w,b)) = s.split_once('-') else { return false };
    if b.contains('-') { return false }
    !w.is_empty() && !b.is_empty()
        && w.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && b.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_names() {
        assert!( Region::parse("nfie-conus").is_ok() );
        assert!( Region::parse("r-s").is_ok() );
        assert!( Region::parse("upper_miss-sub_1").is_ok() );
    }

    #[test]
    fn rejects_malformed_names() {
        assert!( Region::parse("nohyphen").is_err() );
        assert!( Region::parse("too-many-hyphens").is_err() );
        assert!( Region::parse("Upper-Case").is_err() );
        assert!( Region::parse("-s").is_err() );
        assert!( Region::parse("r-").is_err() );
    }

    #[test]
    fn roundtrips_as_str() {
        let r = Region::parse("nfie-conus").unwrap();
        assert_eq!( r.watershed(), "nfie");
        assert_eq!( r.subbasin(), "conus");
        assert_eq!( r.as_str(), "nfie-conus");
    }
}
