//! Variable length records store metadata not defined in the header.
//!
//! "Regular" vlrs sit between the header and the point records, "extended"
//! vlrs (evlrs) after the point records. This crate reserves three records for
//! itself: the `LASF_Projection` wkt record that carries the crs, the
//! `LASF_Spec` extra bytes record that carries the schema, and (when
//! compressing) the laszip record. Those are lifted into typed fields on
//! [Header](crate::Header) when reading and regenerated when writing; any
//! other vlr is passed through untouched.

use crate::{
    raw,
    utils::{AsLasStr, FromLasStr},
    Error, Result,
};

const HEADER_SIZE: usize = 54;
const EVLR_HEADER_SIZE: usize = 60;

/// A variable length record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Vlr {
    /// The user that created this record.
    ///
    /// Often an official, registered user id such as "LASF_Spec" or
    /// "LASF_Projection".
    pub user_id: String,

    /// The type of record, depends on the user id.
    pub record_id: u16,

    /// Textual description of the data.
    pub description: String,

    /// The data themselves.
    pub data: Vec<u8>,

    /// Should this vlr be written at the end of the file, as an evlr.
    pub is_extended: bool,
}

impl Vlr {
    /// Creates a vlr from a raw vlr.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::{raw, Vlr};
    /// let vlr = Vlr::new(raw::Vlr::default()).unwrap();
    /// ```
    pub fn new(raw_vlr: raw::Vlr) -> Result<Vlr> {
        Ok(Vlr {
            user_id: raw_vlr.user_id.as_ref().as_las_str()?.to_string(),
            record_id: raw_vlr.record_id,
            description: raw_vlr.description.as_ref().as_las_str()?.to_string(),
            is_extended: raw_vlr.is_extended(),
            data: raw_vlr.data,
        })
    }

    /// Converts this vlr into a raw vlr.
    ///
    /// Pass `true` to force the raw vlr into its extended form.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::Vlr;
    /// let raw_vlr = Vlr::default().into_raw(false).unwrap();
    /// let raw_evlr = Vlr::default().into_raw(true).unwrap();
    /// ```
    pub fn into_raw(self, force_extended: bool) -> Result<raw::Vlr> {
        let extended = force_extended || self.is_extended;
        let mut user_id = [0; 16];
        user_id.as_mut().from_las_str(&self.user_id)?;
        let mut description = [0; 32];
        description.as_mut().from_las_str(&self.description)?;
        let record_length_after_header = if extended {
            raw::vlr::RecordLength::Evlr(self.data.len() as u64)
        } else if self.data.len() > u16::MAX as usize {
            return Err(Error::VlrTooLong(self.data.len()));
        } else {
            raw::vlr::RecordLength::Vlr(self.data.len() as u16)
        };
        Ok(raw::Vlr {
            reserved: 0,
            user_id,
            record_id: self.record_id,
            record_length_after_header,
            description,
            data: self.data,
        })
    }

    /// Returns the total length of this vlr in bytes, header included.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::Vlr;
    /// assert_eq!(54, Vlr::default().len(false));
    /// assert_eq!(60, Vlr::default().len(true));
    /// ```
    pub fn len(&self, extended: bool) -> usize {
        self.data.len()
            + if extended {
                EVLR_HEADER_SIZE
            } else {
                HEADER_SIZE
            }
    }

    /// Returns true if the data of this vlr are empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true if this vlr must be written in its extended form.
    ///
    /// True either if the flag is set, or if the data are too long for a
    /// regular vlr.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::Vlr;
    /// let mut vlr = Vlr::default();
    /// assert!(!vlr.is_extended());
    /// vlr.data = vec![0; u16::MAX as usize + 1];
    /// assert!(vlr.is_extended());
    /// ```
    pub fn is_extended(&self) -> bool {
        self.is_extended || self.data.len() > u16::MAX as usize
    }

    pub(crate) fn is_projection(&self) -> bool {
        self.user_id == "LASF_Projection"
    }

    pub(crate) fn is_wkt_crs(&self) -> bool {
        self.is_projection() && self.record_id == 2112
    }

    pub(crate) fn is_extra_bytes(&self) -> bool {
        self.user_id == "LASF_Spec" && self.record_id == 4
    }
}
