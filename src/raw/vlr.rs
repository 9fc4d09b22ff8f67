//! Raw variable length records, regular and extended.

use crate::Result;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// A raw variable length record, mapping directly onto its file layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vlr {
    /// Reserved for future use.
    pub reserved: u16,
    /// The user id, a nul-filled ascii field.
    pub user_id: [u8; 16],
    /// The record id.
    pub record_id: u16,
    /// The number of data bytes after the vlr header.
    ///
    /// This field is two bytes wide in a regular vlr and eight in an evlr.
    pub record_length_after_header: RecordLength,
    /// The description, a nul-filled ascii field.
    pub description: [u8; 32],
    /// The data.
    pub data: Vec<u8>,
}

/// The width of the record length field depends on the vlr flavor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordLength {
    /// A regular vlr's two byte record length.
    Vlr(u16),
    /// An evlr's eight byte record length.
    Evlr(u64),
}

impl Vlr {
    /// Reads a raw vlr.
    ///
    /// Pass `true` to read an extended vlr.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::raw::Vlr;
    /// use std::io::Cursor;
    /// let mut cursor = Cursor::new(vec![0; 54]);
    /// let vlr = Vlr::read_from(&mut cursor, false).unwrap();
    /// ```
    pub fn read_from<R: Read>(read: &mut R, extended: bool) -> Result<Vlr> {
        let reserved = read.read_u16::<LittleEndian>()?;
        let mut user_id = [0; 16];
        read.read_exact(&mut user_id)?;
        let record_id = read.read_u16::<LittleEndian>()?;
        let record_length_after_header = if extended {
            RecordLength::Evlr(read.read_u64::<LittleEndian>()?)
        } else {
            RecordLength::Vlr(read.read_u16::<LittleEndian>()?)
        };
        let mut description = [0; 32];
        read.read_exact(&mut description)?;
        let mut data = vec![0; record_length_after_header.value()];
        read.read_exact(&mut data)?;
        Ok(Vlr {
            reserved,
            user_id,
            record_id,
            record_length_after_header,
            description,
            data,
        })
    }

    /// Writes a raw vlr.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::raw::Vlr;
    /// use std::io::Cursor;
    /// let mut cursor = Cursor::new(Vec::new());
    /// Vlr::default().write_to(&mut cursor).unwrap();
    /// ```
    pub fn write_to<W: Write>(&self, write: &mut W) -> Result<()> {
        write.write_u16::<LittleEndian>(self.reserved)?;
        write.write_all(&self.user_id)?;
        write.write_u16::<LittleEndian>(self.record_id)?;
        match self.record_length_after_header {
            RecordLength::Vlr(n) => write.write_u16::<LittleEndian>(n)?,
            RecordLength::Evlr(n) => write.write_u64::<LittleEndian>(n)?,
        }
        write.write_all(&self.description)?;
        write.write_all(&self.data)?;
        Ok(())
    }

    /// Returns true if this raw vlr is extended.
    pub fn is_extended(&self) -> bool {
        matches!(self.record_length_after_header, RecordLength::Evlr(_))
    }
}

impl RecordLength {
    fn value(&self) -> usize {
        match *self {
            RecordLength::Vlr(n) => usize::from(n),
            RecordLength::Evlr(n) => n as usize,
        }
    }
}

impl Default for Vlr {
    fn default() -> Vlr {
        Vlr {
            reserved: 0,
            user_id: [0; 16],
            record_id: 0,
            record_length_after_header: RecordLength::Vlr(0),
            description: [0; 32],
            data: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn roundtrip() {
        let vlr = Vlr {
            record_id: 42,
            record_length_after_header: RecordLength::Vlr(3),
            data: vec![1, 2, 3],
            ..Default::default()
        };
        let mut cursor = Cursor::new(Vec::new());
        vlr.write_to(&mut cursor).unwrap();
        cursor.set_position(0);
        assert_eq!(vlr, Vlr::read_from(&mut cursor, false).unwrap());
    }

    #[test]
    fn roundtrip_extended() {
        let vlr = Vlr {
            record_id: 42,
            record_length_after_header: RecordLength::Evlr(3),
            data: vec![1, 2, 3],
            ..Default::default()
        };
        let mut cursor = Cursor::new(Vec::new());
        vlr.write_to(&mut cursor).unwrap();
        cursor.set_position(0);
        assert_eq!(vlr, Vlr::read_from(&mut cursor, true).unwrap());
    }
}
