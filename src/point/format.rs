use crate::{Error, Result};

/// A point record format.
///
/// Only the las 1.4 extended formats are supported:
///
/// | Format | Color | Near infrared |
/// |--------|-------|---------------|
/// | 6      | no    | no            |
/// | 7      | yes   | no            |
/// | 8      | yes   | yes           |
///
/// `extra_bytes` counts the auxiliary bytes after the standard attributes,
/// described by the header's [Schema](crate::Schema). `is_compressed` is not
/// part of the format proper, but rides the format id on disk (the laszip
/// convention of setting its high bit).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Format {
    /// Does this format carry color?
    pub has_color: bool,
    /// Does this format carry near infrared?
    pub has_nir: bool,
    /// Are the point data laszip compressed?
    pub is_compressed: bool,
    /// The number of extra bytes on each point.
    pub extra_bytes: u16,
}

impl Format {
    /// Creates a new format from a las format id.
    ///
    /// Returns [Error::UnsupportedFormat] for everything but 6, 7 and 8.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::point::Format;
    /// let format = Format::new(8).unwrap();
    /// assert!(format.has_color);
    /// assert!(format.has_nir);
    /// assert!(Format::new(0).is_err());
    /// assert!(Format::new(9).is_err());
    /// ```
    pub fn new(n: u8) -> Result<Format> {
        match n {
            6 => Ok(Format::default()),
            7 => Ok(Format {
                has_color: true,
                ..Default::default()
            }),
            8 => Ok(Format {
                has_color: true,
                has_nir: true,
                ..Default::default()
            }),
            _ => Err(Error::UnsupportedFormat(n)),
        }
    }

    /// Returns this format's las format id.
    ///
    /// Returns an error for attribute combinations that don't map onto a
    /// format id (near infrared without color).
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::point::Format;
    /// assert_eq!(8, Format::new(8).unwrap().to_u8().unwrap());
    /// ```
    pub fn to_u8(&self) -> Result<u8> {
        match (self.has_color, self.has_nir) {
            (false, false) => Ok(6),
            (true, false) => Ok(7),
            (true, true) => Ok(8),
            (false, true) => Err(Error::UnsupportedFormat(8)),
        }
    }

    /// The length of one point record in this format, in bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::point::Format;
    /// assert_eq!(30, Format::new(6).unwrap().len());
    /// assert_eq!(36, Format::new(7).unwrap().len());
    /// assert_eq!(38, Format::new(8).unwrap().len());
    /// ```
    pub fn len(&self) -> u16 {
        let mut len = 30;
        if self.has_color {
            len += 6;
        }
        if self.has_nir {
            len += 2;
        }
        len + self.extra_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new() {
        for n in [0, 1, 2, 3, 4, 5, 9, 10, 127] {
            assert!(Format::new(n).is_err(), "format {n} should be rejected");
        }
        for n in [6, 7, 8] {
            assert_eq!(n, Format::new(n).unwrap().to_u8().unwrap());
        }
    }

    #[test]
    fn len_with_extra_bytes() {
        let mut format = Format::new(8).unwrap();
        format.extra_bytes = 1;
        assert_eq!(39, format.len());
    }

    #[test]
    fn nir_without_color() {
        let format = Format {
            has_nir: true,
            ..Default::default()
        };
        assert!(format.to_u8().is_err());
    }
}
