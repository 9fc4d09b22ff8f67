//! Utility functions for working with laszip compressed data.
//!
//! The entropy coding itself lives in the [laz](https://crates.io/crates/laz)
//! crate; this module only builds and finds the laszip vlr that describes the
//! compressed record layout.

use crate::{Error, Header, Result, Vlr};
use laz::{LazItemRecordBuilder, LazItemType, LazVlr};
use std::io::Cursor;

/// Returns true if this [Vlr] is the laszip vlr.
///
/// # Examples
///
/// ```
/// use laspipe::{laz::is_laszip_vlr, Vlr};
///
/// let mut vlr = Vlr::default();
/// assert!(!is_laszip_vlr(&vlr));
/// vlr.user_id = "laszip encoded".to_string();
/// vlr.record_id = 22204;
/// assert!(is_laszip_vlr(&vlr));
/// ```
pub fn is_laszip_vlr(vlr: &Vlr) -> bool {
    vlr.user_id == LazVlr::USER_ID && vlr.record_id == LazVlr::RECORD_ID
}

impl Header {
    /// Adds a laszip vlr describing this header's point format.
    ///
    /// Called by the writer before it emits a compressed file.
    pub(crate) fn add_laz_vlr(&mut self) -> Result<()> {
        let point_format = self.point_format();
        let mut laz_items = LazItemRecordBuilder::new();
        let _ = laz_items.add_item(LazItemType::Point14);
        if point_format.has_color {
            if point_format.has_nir {
                let _ = laz_items.add_item(LazItemType::RGBNIR14);
            } else {
                let _ = laz_items.add_item(LazItemType::RGB14);
            }
        }
        if point_format.extra_bytes > 0 {
            let _ = laz_items.add_item(LazItemType::Byte14(point_format.extra_bytes));
        }
        let laz_vlr = LazVlr::from_laz_items(laz_items.build());
        let mut cursor = Cursor::new(Vec::<u8>::new());
        laz_vlr.write_to(&mut cursor)?;
        self.vlrs.push(Vlr {
            user_id: LazVlr::USER_ID.to_owned(),
            record_id: LazVlr::RECORD_ID,
            description: LazVlr::DESCRIPTION.to_owned(),
            data: cursor.into_inner(),
            is_extended: false,
        });
        Ok(())
    }

    /// Returns this header's laszip vlr.
    ///
    /// Returns an error if there is none, because without it compressed
    /// points can't be decompressed.
    pub(crate) fn laz_vlr(&self) -> Result<LazVlr> {
        self.vlrs
            .iter()
            .find(|vlr| is_laszip_vlr(vlr))
            .ok_or(Error::LasZipVlrNotFound)
            .and_then(|vlr| LazVlr::from_buffer(&vlr.data).map_err(Error::from))
    }

    /// Drops the laszip vlr again once the points are decompressed.
    pub(crate) fn remove_laz_vlr(&mut self) {
        self.vlrs.retain(|vlr| !is_laszip_vlr(vlr));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Format;
    use crate::Builder;

    #[test]
    fn add_and_find() {
        let mut builder = Builder::default();
        builder.point_format = Format::new(8).unwrap();
        let mut header = builder.into_header().unwrap();
        assert!(header.laz_vlr().is_err());
        header.add_laz_vlr().unwrap();
        assert!(header.laz_vlr().is_ok());
        header.remove_laz_vlr();
        assert!(header.laz_vlr().is_err());
    }
}
