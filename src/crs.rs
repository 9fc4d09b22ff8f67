//! Coordinate reference system identifiers.
//!
//! Las files carry their crs in a `LASF_Projection` variable length record,
//! either as [WKT](https://docs.ogc.org/is/18-010r7/18-010r7.html) (mandatory
//! for the extended point formats) or as GeoTiff tags. This crate works with
//! plain authority:code identifiers (e.g. `EPSG:25832`): the writer stores the
//! identifier in the wkt record, and the reader recovers a code either from
//! that form or from a real wkt payload by scanning its `AUTHORITY`/`ID`
//! entries, the last of which identifies the overall crs.

use crate::{Error, Result, Vlr};
use std::{fmt, str::FromStr};

/// A coordinate reference system identified by an authority and a numeric code.
///
/// # Examples
///
/// ```
/// # use laspipe::Crs;
/// let crs: Crs = "EPSG:25832".parse().unwrap();
/// assert_eq!(Crs::epsg(25832), crs);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Crs {
    authority: String,
    code: u32,
}

impl Crs {
    /// Creates a new crs from an authority name and a code.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::Crs;
    /// let crs = Crs::new("EPSG", 7416);
    /// ```
    pub fn new(authority: impl Into<String>, code: u32) -> Crs {
        Crs {
            authority: authority.into().to_ascii_uppercase(),
            code,
        }
    }

    /// Creates a new EPSG crs.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::Crs;
    /// let crs = Crs::epsg(25832);
    /// assert_eq!("EPSG:25832", crs.to_string());
    /// ```
    pub fn epsg(code: u32) -> Crs {
        Crs::new("EPSG", code)
    }

    /// Returns this crs' authority.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Returns this crs' code.
    pub fn code(&self) -> u32 {
        self.code
    }

    /// Returns true if this crs is governed by the EPSG authority.
    pub fn is_epsg(&self) -> bool {
        self.authority == "EPSG"
    }

    pub(crate) fn to_vlr(&self) -> Vlr {
        Vlr {
            user_id: "LASF_Projection".to_string(),
            record_id: 2112,
            description: String::new(),
            data: self.to_string().into_bytes(),
            is_extended: false,
        }
    }

    pub(crate) fn from_vlr_data(data: &[u8]) -> Option<Crs> {
        let text = String::from_utf8_lossy(data);
        let text = text.trim_end_matches('\0').trim();
        if let Ok(crs) = text.parse() {
            return Some(crs);
        }
        epsg_code_in_wkt(text).map(Crs::epsg)
    }
}

impl FromStr for Crs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Crs> {
        let (authority, code) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidCrs(s.to_string()))?;
        let authority = authority.trim();
        if authority.is_empty() || !authority.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::InvalidCrs(s.to_string()));
        }
        let code = code
            .trim()
            .parse()
            .map_err(|_| Error::InvalidCrs(s.to_string()))?;
        Ok(Crs::new(authority, code))
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.authority, self.code)
    }
}

/// The last EPSG reference in a wkt string identifies the crs as a whole.
fn epsg_code_in_wkt(text: &str) -> Option<u32> {
    let index = text.rfind("\"EPSG\"")?;
    let digits: String = text[index + "\"EPSG\"".len()..]
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
