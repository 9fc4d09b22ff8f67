//! Point records and their format.
//!
//! Every point carries its coordinates in world space; the quantization into
//! scaled integers happens at the [raw](crate::raw) boundary. Optional
//! attributes (color, near infrared, extra bytes) are `Option`s/`Vec`s that
//! must agree with the cloud's [Format] to be written.

mod classification;
mod format;
mod scan_direction;

pub use self::{
    classification::Classification, format::Format, scan_direction::ScanDirection,
};

use crate::{raw, Color, Error, Result, Transform, Vector};

/// A point record, in world coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Point {
    /// The x coordinate, unquantized.
    pub x: f64,
    /// The y coordinate, unquantized.
    pub y: f64,
    /// The z coordinate, unquantized.
    pub z: f64,
    /// The pulse return magnitude.
    pub intensity: u16,
    /// The return number of this point's pulse, one-based.
    pub return_number: u8,
    /// The total number of returns for this point's pulse.
    pub number_of_returns: u8,
    /// The direction the scanner mirror was travelling.
    pub scan_direction: ScanDirection,
    /// True if this point is at the edge of a flight line.
    pub is_edge_of_flight_line: bool,
    /// The ASPRS classification of this point.
    pub classification: Classification,
    /// True if this point was created by a technique other than lidar.
    pub is_synthetic: bool,
    /// True if this point is a model key point.
    pub is_key_point: bool,
    /// True if this point should be excluded from processing.
    pub is_withheld: bool,
    /// True if this point lies in the overlap of two flight lines.
    pub is_overlap: bool,
    /// The channel of a multi-channel scanner, 0 through 3.
    pub scanner_channel: u8,
    /// The scan angle in degrees.
    pub scan_angle: f32,
    /// Free byte for the user.
    pub user_data: u8,
    /// The file this point originated from.
    pub point_source_id: u16,
    /// The time this point was collected.
    pub gps_time: f64,
    /// The color of this point.
    pub color: Option<Color>,
    /// The near infrared value of this point.
    pub nir: Option<u16>,
    /// Raw auxiliary storage, interpreted via the header's
    /// [Schema](crate::Schema).
    pub extra_bytes: Vec<u8>,
}

impl Point {
    /// Creates a point from a raw point.
    ///
    /// A stored classification of 12 (the legacy overlap code) is mapped to
    /// `Unclassified` with the `is_overlap` flag set.
    pub(crate) fn new(raw_point: raw::Point, transforms: &Vector<Transform>) -> Point {
        let (classification, overlap) = if raw_point.classification == 12 {
            (Classification::Unclassified, true)
        } else {
            (
                Classification::new(raw_point.classification)
                    .unwrap_or(Classification::Unclassified),
                false,
            )
        };
        Point {
            x: transforms.x.direct(raw_point.x),
            y: transforms.y.direct(raw_point.y),
            z: transforms.z.direct(raw_point.z),
            intensity: raw_point.intensity,
            return_number: raw_point.returns & 0xf,
            number_of_returns: (raw_point.returns >> 4) & 0xf,
            is_synthetic: raw_point.flags & 1 == 1,
            is_key_point: raw_point.flags & 2 == 2,
            is_withheld: raw_point.flags & 4 == 4,
            is_overlap: raw_point.flags & 8 == 8 || overlap,
            scanner_channel: (raw_point.flags >> 4) & 3,
            scan_direction: ScanDirection::from((raw_point.flags >> 6) & 1),
            is_edge_of_flight_line: raw_point.flags & 0x80 == 0x80,
            classification,
            scan_angle: f32::from(raw_point.scan_angle) * 0.006,
            user_data: raw_point.user_data,
            point_source_id: raw_point.point_source_id,
            gps_time: raw_point.gps_time,
            color: raw_point.color,
            nir: raw_point.nir,
            extra_bytes: raw_point.extra_bytes,
        }
    }

    /// Converts this point into a raw point.
    ///
    /// Returns an error if a coordinate can't be quantized or a bit field is
    /// out of range.
    pub(crate) fn into_raw(self, transforms: &Vector<Transform>) -> Result<raw::Point> {
        Ok(raw::Point {
            x: transforms.x.inverse(self.x)?,
            y: transforms.y.inverse(self.y)?,
            z: transforms.z.inverse(self.z)?,
            intensity: self.intensity,
            returns: self.returns_byte()?,
            flags: self.flags_byte()?,
            classification: self.classification.into(),
            user_data: self.user_data,
            scan_angle: quantize_scan_angle(self.scan_angle),
            point_source_id: self.point_source_id,
            gps_time: self.gps_time,
            color: self.color,
            nir: self.nir,
            extra_bytes: self.extra_bytes,
        })
    }

    /// Returns true if this point's attributes agree with the point format.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::{point::Format, Color, Point};
    /// let mut point = Point::default();
    /// let format = Format::new(7).unwrap();
    /// assert!(!point.matches(&format));
    /// point.color = Some(Color::default());
    /// assert!(point.matches(&format));
    /// ```
    pub fn matches(&self, format: &Format) -> bool {
        self.color.is_some() == format.has_color
            && self.nir.is_some() == format.has_nir
            && self.extra_bytes.len() == usize::from(format.extra_bytes)
    }

    fn returns_byte(&self) -> Result<u8> {
        if self.return_number > 15 {
            Err(Error::InvalidReturnNumber(self.return_number))
        } else if self.number_of_returns > 15 {
            Err(Error::InvalidNumberOfReturns(self.number_of_returns))
        } else {
            Ok(self.return_number | (self.number_of_returns << 4))
        }
    }

    fn flags_byte(&self) -> Result<u8> {
        if self.scanner_channel > 3 {
            return Err(Error::InvalidScannerChannel(self.scanner_channel));
        }
        let mut flags = 0;
        if self.is_synthetic {
            flags |= 1;
        }
        if self.is_key_point {
            flags |= 2;
        }
        if self.is_withheld {
            flags |= 4;
        }
        if self.is_overlap {
            flags |= 8;
        }
        flags |= self.scanner_channel << 4;
        flags |= u8::from(self.scan_direction) << 6;
        if self.is_edge_of_flight_line {
            flags |= 0x80;
        }
        Ok(flags)
    }
}

fn quantize_scan_angle(scan_angle: f32) -> i16 {
    let quantized = (scan_angle / 0.006).round();
    if quantized >= f32::from(i16::MAX) {
        i16::MAX
    } else if quantized <= f32::from(i16::MIN) {
        i16::MIN
    } else {
        quantized as i16
    }
}
