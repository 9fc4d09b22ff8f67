//! The raw las 1.4 header, mapping directly onto the file structure.

use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// The size of a las 1.4 header without padding.
pub const HEADER_SIZE: u16 = 375;

/// A raw las 1.4 header.
///
/// The legacy (32 bit) point counts are kept so the struct round-trips, but
/// the extended point formats require them to be zero and this crate always
/// writes them that way.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Header {
    pub file_signature: [u8; 4],
    pub file_source_id: u16,
    pub global_encoding: u16,
    pub guid: [u8; 16],
    pub version_major: u8,
    pub version_minor: u8,
    pub system_identifier: [u8; 32],
    pub generating_software: [u8; 32],
    pub file_creation_day_of_year: u16,
    pub file_creation_year: u16,
    pub header_size: u16,
    pub offset_to_point_data: u32,
    pub number_of_variable_length_records: u32,
    pub point_data_record_format: u8,
    pub point_data_record_length: u16,
    pub legacy_number_of_point_records: u32,
    pub legacy_number_of_points_by_return: [u32; 5],
    pub x_scale_factor: f64,
    pub y_scale_factor: f64,
    pub z_scale_factor: f64,
    pub x_offset: f64,
    pub y_offset: f64,
    pub z_offset: f64,
    pub max_x: f64,
    pub min_x: f64,
    pub max_y: f64,
    pub min_y: f64,
    pub max_z: f64,
    pub min_z: f64,
    pub start_of_waveform_data_packet_record: u64,
    pub start_of_first_evlr: u64,
    pub number_of_evlrs: u32,
    pub number_of_point_records: u64,
    pub number_of_points_by_return: [u64; 15],
    /// Any bytes between the standard header and the first vlr.
    pub padding: Vec<u8>,
}

impl Header {
    /// Reads a raw header.
    ///
    /// Fails fast on a bad file signature or an impossible header size.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::raw::Header;
    /// use std::io::Cursor;
    /// let mut cursor = Cursor::new(Vec::new());
    /// Header::default().write_to(&mut cursor).unwrap();
    /// cursor.set_position(0);
    /// let header = Header::read_from(&mut cursor).unwrap();
    /// ```
    pub fn read_from<R: Read>(read: &mut R) -> Result<Header> {
        let mut file_signature = [0; 4];
        read.read_exact(&mut file_signature)?;
        if &file_signature != b"LASF" {
            return Err(Error::InvalidFileSignature(file_signature));
        }
        let file_source_id = read.read_u16::<LittleEndian>()?;
        let global_encoding = read.read_u16::<LittleEndian>()?;
        let mut guid = [0; 16];
        read.read_exact(&mut guid)?;
        let version_major = read.read_u8()?;
        let version_minor = read.read_u8()?;
        let mut system_identifier = [0; 32];
        read.read_exact(&mut system_identifier)?;
        let mut generating_software = [0; 32];
        read.read_exact(&mut generating_software)?;
        let file_creation_day_of_year = read.read_u16::<LittleEndian>()?;
        let file_creation_year = read.read_u16::<LittleEndian>()?;
        let header_size = read.read_u16::<LittleEndian>()?;
        let offset_to_point_data = read.read_u32::<LittleEndian>()?;
        let number_of_variable_length_records = read.read_u32::<LittleEndian>()?;
        let point_data_record_format = read.read_u8()?;
        let point_data_record_length = read.read_u16::<LittleEndian>()?;
        let legacy_number_of_point_records = read.read_u32::<LittleEndian>()?;
        let mut legacy_number_of_points_by_return = [0; 5];
        for n in legacy_number_of_points_by_return.iter_mut() {
            *n = read.read_u32::<LittleEndian>()?;
        }
        let x_scale_factor = read.read_f64::<LittleEndian>()?;
        let y_scale_factor = read.read_f64::<LittleEndian>()?;
        let z_scale_factor = read.read_f64::<LittleEndian>()?;
        let x_offset = read.read_f64::<LittleEndian>()?;
        let y_offset = read.read_f64::<LittleEndian>()?;
        let z_offset = read.read_f64::<LittleEndian>()?;
        let max_x = read.read_f64::<LittleEndian>()?;
        let min_x = read.read_f64::<LittleEndian>()?;
        let max_y = read.read_f64::<LittleEndian>()?;
        let min_y = read.read_f64::<LittleEndian>()?;
        let max_z = read.read_f64::<LittleEndian>()?;
        let min_z = read.read_f64::<LittleEndian>()?;
        let mut header = Header {
            file_signature,
            file_source_id,
            global_encoding,
            guid,
            version_major,
            version_minor,
            system_identifier,
            generating_software,
            file_creation_day_of_year,
            file_creation_year,
            header_size,
            offset_to_point_data,
            number_of_variable_length_records,
            point_data_record_format,
            point_data_record_length,
            legacy_number_of_point_records,
            legacy_number_of_points_by_return,
            x_scale_factor,
            y_scale_factor,
            z_scale_factor,
            x_offset,
            y_offset,
            z_offset,
            max_x,
            min_x,
            max_y,
            min_y,
            max_z,
            min_z,
            start_of_waveform_data_packet_record: 0,
            start_of_first_evlr: 0,
            number_of_evlrs: 0,
            number_of_point_records: u64::from(legacy_number_of_point_records),
            number_of_points_by_return: [0; 15],
            padding: Vec::new(),
        };
        let mut read_so_far: u16 = 227;
        if (version_major, version_minor) >= (1, 3) {
            header.start_of_waveform_data_packet_record = read.read_u64::<LittleEndian>()?;
            read_so_far += 8;
        }
        if (version_major, version_minor) >= (1, 4) {
            header.start_of_first_evlr = read.read_u64::<LittleEndian>()?;
            header.number_of_evlrs = read.read_u32::<LittleEndian>()?;
            header.number_of_point_records = read.read_u64::<LittleEndian>()?;
            for n in header.number_of_points_by_return.iter_mut() {
                *n = read.read_u64::<LittleEndian>()?;
            }
            read_so_far += 140;
        }
        if header_size < read_so_far {
            return Err(Error::HeaderTooSmall(header_size));
        }
        if header_size > read_so_far {
            let mut padding = vec![0; usize::from(header_size - read_so_far)];
            read.read_exact(&mut padding)?;
            header.padding = padding;
        }
        Ok(header)
    }

    /// Writes a raw header.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::raw::Header;
    /// use std::io::Cursor;
    /// let mut cursor = Cursor::new(Vec::new());
    /// Header::default().write_to(&mut cursor).unwrap();
    /// ```
    pub fn write_to<W: Write>(&self, write: &mut W) -> Result<()> {
        write.write_all(&self.file_signature)?;
        write.write_u16::<LittleEndian>(self.file_source_id)?;
        write.write_u16::<LittleEndian>(self.global_encoding)?;
        write.write_all(&self.guid)?;
        write.write_u8(self.version_major)?;
        write.write_u8(self.version_minor)?;
        write.write_all(&self.system_identifier)?;
        write.write_all(&self.generating_software)?;
        write.write_u16::<LittleEndian>(self.file_creation_day_of_year)?;
        write.write_u16::<LittleEndian>(self.file_creation_year)?;
        write.write_u16::<LittleEndian>(self.header_size)?;
        write.write_u32::<LittleEndian>(self.offset_to_point_data)?;
        write.write_u32::<LittleEndian>(self.number_of_variable_length_records)?;
        write.write_u8(self.point_data_record_format)?;
        write.write_u16::<LittleEndian>(self.point_data_record_length)?;
        write.write_u32::<LittleEndian>(self.legacy_number_of_point_records)?;
        for n in &self.legacy_number_of_points_by_return {
            write.write_u32::<LittleEndian>(*n)?;
        }
        write.write_f64::<LittleEndian>(self.x_scale_factor)?;
        write.write_f64::<LittleEndian>(self.y_scale_factor)?;
        write.write_f64::<LittleEndian>(self.z_scale_factor)?;
        write.write_f64::<LittleEndian>(self.x_offset)?;
        write.write_f64::<LittleEndian>(self.y_offset)?;
        write.write_f64::<LittleEndian>(self.z_offset)?;
        write.write_f64::<LittleEndian>(self.max_x)?;
        write.write_f64::<LittleEndian>(self.min_x)?;
        write.write_f64::<LittleEndian>(self.max_y)?;
        write.write_f64::<LittleEndian>(self.min_y)?;
        write.write_f64::<LittleEndian>(self.max_z)?;
        write.write_f64::<LittleEndian>(self.min_z)?;
        if (self.version_major, self.version_minor) >= (1, 3) {
            write.write_u64::<LittleEndian>(self.start_of_waveform_data_packet_record)?;
        }
        if (self.version_major, self.version_minor) >= (1, 4) {
            write.write_u64::<LittleEndian>(self.start_of_first_evlr)?;
            write.write_u32::<LittleEndian>(self.number_of_evlrs)?;
            write.write_u64::<LittleEndian>(self.number_of_point_records)?;
            for n in &self.number_of_points_by_return {
                write.write_u64::<LittleEndian>(*n)?;
            }
        }
        if !self.padding.is_empty() {
            write.write_all(&self.padding)?;
        }
        Ok(())
    }

    /// Returns true if this raw header describes laszip compressed data.
    ///
    /// The laszip convention sets the high bit of the point data record
    /// format.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::raw::Header;
    /// let mut header = Header::default();
    /// assert!(!header.is_compressed());
    /// header.point_data_record_format = 0x88;
    /// assert!(header.is_compressed());
    /// ```
    pub fn is_compressed(&self) -> bool {
        self.point_data_record_format & 0x80 == 0x80
    }
}

impl Default for Header {
    fn default() -> Header {
        Header {
            file_signature: *b"LASF",
            file_source_id: 0,
            global_encoding: 0,
            guid: [0; 16],
            version_major: 1,
            version_minor: 4,
            system_identifier: [0; 32],
            generating_software: [0; 32],
            file_creation_day_of_year: 0,
            file_creation_year: 0,
            header_size: HEADER_SIZE,
            offset_to_point_data: u32::from(HEADER_SIZE),
            number_of_variable_length_records: 0,
            point_data_record_format: 6,
            point_data_record_length: 30,
            legacy_number_of_point_records: 0,
            legacy_number_of_points_by_return: [0; 5],
            x_scale_factor: 0.01,
            y_scale_factor: 0.01,
            z_scale_factor: 0.01,
            x_offset: 0.,
            y_offset: 0.,
            z_offset: 0.,
            max_x: 0.,
            min_x: 0.,
            max_y: 0.,
            min_y: 0.,
            max_z: 0.,
            min_z: 0.,
            start_of_waveform_data_packet_record: 0,
            start_of_first_evlr: 0,
            number_of_evlrs: 0,
            number_of_point_records: 0,
            number_of_points_by_return: [0; 15],
            padding: Vec::new(),
        }
    }
}
