//! Raw point records, quantized and bit-packed as stored on disk.

use crate::{point::Format, Color, Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// A raw point record in one of the extended formats (6 through 8).
///
/// Coordinates are quantized i32s; the `returns` and `flags` bytes keep their
/// on-disk bit packing. Conversion to and from world-space
/// [Point](crate::Point)s goes through the header's transforms.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Point {
    /// The quantized x coordinate.
    pub x: i32,
    /// The quantized y coordinate.
    pub y: i32,
    /// The quantized z coordinate.
    pub z: i32,
    /// The pulse return magnitude.
    pub intensity: u16,
    /// Return number (low nibble) and number of returns (high nibble).
    pub returns: u8,
    /// Classification flags, scanner channel, scan direction and edge flag.
    pub flags: u8,
    /// The classification code.
    pub classification: u8,
    /// Free byte for the user.
    pub user_data: u8,
    /// The quantized scan angle, in 0.006° increments.
    pub scan_angle: i16,
    /// The file this point originated from.
    pub point_source_id: u16,
    /// The time this point was collected.
    pub gps_time: f64,
    /// The color of this point, present for formats 7 and 8.
    pub color: Option<Color>,
    /// The near infrared value, present for format 8.
    pub nir: Option<u16>,
    /// The auxiliary bytes after the standard attributes.
    pub extra_bytes: Vec<u8>,
}

impl Point {
    /// Reads a raw point.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::{point::Format, raw::Point};
    /// use std::io::Cursor;
    /// let format = Format::new(6).unwrap();
    /// let mut cursor = Cursor::new(vec![0; format.len() as usize]);
    /// let point = Point::read_from(&mut cursor, &format).unwrap();
    /// ```
    pub fn read_from<R: Read>(read: &mut R, format: &Format) -> Result<Point> {
        let x = read.read_i32::<LittleEndian>()?;
        let y = read.read_i32::<LittleEndian>()?;
        let z = read.read_i32::<LittleEndian>()?;
        let intensity = read.read_u16::<LittleEndian>()?;
        let returns = read.read_u8()?;
        let flags = read.read_u8()?;
        let classification = read.read_u8()?;
        let user_data = read.read_u8()?;
        let scan_angle = read.read_i16::<LittleEndian>()?;
        let point_source_id = read.read_u16::<LittleEndian>()?;
        let gps_time = read.read_f64::<LittleEndian>()?;
        let color = if format.has_color {
            let red = read.read_u16::<LittleEndian>()?;
            let green = read.read_u16::<LittleEndian>()?;
            let blue = read.read_u16::<LittleEndian>()?;
            Some(Color::new(red, green, blue))
        } else {
            None
        };
        let nir = if format.has_nir {
            Some(read.read_u16::<LittleEndian>()?)
        } else {
            None
        };
        let mut extra_bytes = vec![0; usize::from(format.extra_bytes)];
        read.read_exact(&mut extra_bytes)?;
        Ok(Point {
            x,
            y,
            z,
            intensity,
            returns,
            flags,
            classification,
            user_data,
            scan_angle,
            point_source_id,
            gps_time,
            color,
            nir,
            extra_bytes,
        })
    }

    /// Writes a raw point.
    ///
    /// Returns an error if the point's optional attributes don't agree with
    /// the format.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::{point::Format, raw::Point};
    /// use std::io::Cursor;
    /// let mut cursor = Cursor::new(Vec::new());
    /// let format = Format::new(6).unwrap();
    /// Point::default().write_to(&mut cursor, &format).unwrap();
    /// ```
    pub fn write_to<W: Write>(&self, write: &mut W, format: &Format) -> Result<()> {
        write.write_i32::<LittleEndian>(self.x)?;
        write.write_i32::<LittleEndian>(self.y)?;
        write.write_i32::<LittleEndian>(self.z)?;
        write.write_u16::<LittleEndian>(self.intensity)?;
        write.write_u8(self.returns)?;
        write.write_u8(self.flags)?;
        write.write_u8(self.classification)?;
        write.write_u8(self.user_data)?;
        write.write_i16::<LittleEndian>(self.scan_angle)?;
        write.write_u16::<LittleEndian>(self.point_source_id)?;
        write.write_f64::<LittleEndian>(self.gps_time)?;
        if format.has_color {
            let color = self.color.ok_or(Error::MissingColor(*format))?;
            write.write_u16::<LittleEndian>(color.red)?;
            write.write_u16::<LittleEndian>(color.green)?;
            write.write_u16::<LittleEndian>(color.blue)?;
        }
        if format.has_nir {
            let nir = self.nir.ok_or(Error::MissingNir(*format))?;
            write.write_u16::<LittleEndian>(nir)?;
        }
        if self.extra_bytes.len() != usize::from(format.extra_bytes) {
            return Err(Error::ExtraBytesMismatch {
                len: self.extra_bytes.len(),
                expected: usize::from(format.extra_bytes),
            });
        }
        write.write_all(&self.extra_bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(format: &Format, point: Point) {
        let mut cursor = Cursor::new(Vec::new());
        point.write_to(&mut cursor, format).unwrap();
        assert_eq!(usize::from(format.len()), cursor.get_ref().len());
        cursor.set_position(0);
        assert_eq!(point, Point::read_from(&mut cursor, format).unwrap());
    }

    #[test]
    fn roundtrip_format_6() {
        roundtrip(
            &Format::new(6).unwrap(),
            Point {
                x: -1,
                y: 2,
                z: 3,
                intensity: 42,
                returns: 0x32,
                flags: 0xd5,
                classification: 2,
                user_data: 42,
                scan_angle: -500,
                point_source_id: 1,
                gps_time: 42.,
                ..Default::default()
            },
        );
    }

    #[test]
    fn roundtrip_format_8() {
        let mut format = Format::new(8).unwrap();
        format.extra_bytes = 1;
        roundtrip(
            &format,
            Point {
                color: Some(Color::new(1, 2, 3)),
                nir: Some(42),
                extra_bytes: vec![42],
                ..Default::default()
            },
        );
    }

    #[test]
    fn missing_color() {
        let format = Format::new(7).unwrap();
        let mut cursor = Cursor::new(Vec::new());
        assert!(Point::default().write_to(&mut cursor, &format).is_err());
    }

    #[test]
    fn extra_bytes_mismatch() {
        let mut format = Format::new(6).unwrap();
        format.extra_bytes = 2;
        let point = Point {
            extra_bytes: vec![42],
            ..Default::default()
        };
        let mut cursor = Cursor::new(Vec::new());
        assert!(point.write_to(&mut cursor, &format).is_err());
    }
}
