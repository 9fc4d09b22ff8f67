//! Las headers and the builder that constructs them.
//!
//! A [Header] describes the layout of the points that follow it: their
//! format, their quantization, their crs and their extra dimension schema.
//! Headers are immutable once built; use a [Builder] to set things up:
//!
//! ```
//! use laspipe::{point::Format, schema::DataType, Builder, Crs};
//!
//! let mut builder = Builder::default();
//! builder.point_format = Format::new(8).unwrap();
//! builder.crs = Some(Crs::epsg(25832));
//! builder.schema.declare("confidence", DataType::U8).unwrap();
//! let header = builder.into_header().unwrap();
//! assert_eq!(1, header.point_format().extra_bytes);
//! ```
//!
//! The crs and the schema are typed fields here, not raw vlrs: the reader
//! lifts them out of the `LASF_Projection` and `LASF_Spec` records once, at
//! parse time, and the writer regenerates those records on the way out.

use crate::{
    point::Format,
    raw,
    utils::{AsLasStr, FromLasStr},
    Bounds, Crs, Error, Point, Result, Schema, Transform, Vector, Version, Vlr,
};
use chrono::{Datelike, NaiveDate, Utc};
use std::io::{Read, Seek, SeekFrom, Write};
use uuid::Uuid;

/// Builds headers.
#[derive(Clone, Debug)]
pub struct Builder {
    /// The coordinate reference system of the points.
    pub crs: Option<Crs>,
    /// The file creation date.
    pub date: Option<NaiveDate>,
    /// Extended variable length records.
    pub evlrs: Vec<Vlr>,
    /// The file source id, e.g. a flight line number.
    pub file_source_id: u16,
    /// The software that created this file.
    pub generating_software: String,
    /// A globally unique identifier for this file.
    pub guid: Uuid,
    /// Bytes after the header but before the first vlr.
    pub padding: Vec<u8>,
    /// The point format.
    pub point_format: Format,
    /// Bytes after the points but before any evlrs.
    pub point_padding: Vec<u8>,
    /// The extra dimension schema.
    pub schema: Schema,
    /// The hardware or process that collected the points.
    pub system_identifier: String,
    /// The per-axis scales and offsets used to quantize coordinates.
    pub transforms: Vector<Transform>,
    /// The las format version.
    pub version: Version,
    /// Bytes after the last vlr but before the first point.
    pub vlr_padding: Vec<u8>,
    /// Variable length records.
    pub vlrs: Vec<Vlr>,
}

impl Builder {
    /// Creates a builder from a raw header.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::{raw, Builder};
    /// let builder = Builder::new(raw::Header::default()).unwrap();
    /// ```
    pub fn new(raw_header: raw::Header) -> Result<Builder> {
        let mut point_format = Format::new(raw_header.point_data_record_format & 0x7f)?;
        point_format.is_compressed = raw_header.is_compressed();
        if raw_header.point_data_record_length < point_format.len() {
            return Err(Error::InvalidPointDataRecordLength(
                raw_header.point_data_record_format & 0x7f,
                point_format.len(),
                raw_header.point_data_record_length,
            ));
        }
        point_format.extra_bytes = raw_header.point_data_record_length - point_format.len();
        let date = if raw_header.file_creation_year > 0 {
            NaiveDate::from_yo_opt(
                i32::from(raw_header.file_creation_year),
                u32::from(raw_header.file_creation_day_of_year),
            )
        } else {
            None
        };
        Ok(Builder {
            crs: None,
            date,
            evlrs: Vec::new(),
            file_source_id: raw_header.file_source_id,
            generating_software: raw_header
                .generating_software
                .as_ref()
                .as_las_str()?
                .to_string(),
            guid: Uuid::from_bytes(raw_header.guid),
            padding: raw_header.padding,
            point_format,
            point_padding: Vec::new(),
            schema: Schema::default(),
            system_identifier: raw_header
                .system_identifier
                .as_ref()
                .as_las_str()?
                .to_string(),
            transforms: Vector {
                x: Transform {
                    scale: raw_header.x_scale_factor,
                    offset: raw_header.x_offset,
                },
                y: Transform {
                    scale: raw_header.y_scale_factor,
                    offset: raw_header.y_offset,
                },
                z: Transform {
                    scale: raw_header.z_scale_factor,
                    offset: raw_header.z_offset,
                },
            },
            version: Version::new(raw_header.version_major, raw_header.version_minor),
            vlr_padding: Vec::new(),
            vlrs: Vec::new(),
        })
    }

    /// Converts this builder into a header.
    ///
    /// Validates the scale/offset transforms (scales must be strictly
    /// positive), the version/format agreement, and the extra byte layout,
    /// and lifts any crs or extra bytes vlrs into their typed fields.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::Builder;
    /// let header = Builder::default().into_header().unwrap();
    /// ```
    pub fn into_header(mut self) -> Result<Header> {
        if !self.version.supports_extended_formats() {
            return Err(Error::UnsupportedFeature {
                version: self.version,
                feature: "extended point formats",
            });
        }
        if !self.evlrs.is_empty() && !self.version.supports_evlrs() {
            return Err(Error::UnsupportedFeature {
                version: self.version,
                feature: "extended variable length records",
            });
        }
        for transform in [self.transforms.x, self.transforms.y, self.transforms.z] {
            if !(transform.scale > 0. && transform.scale.is_finite()) {
                return Err(Error::InvalidScale(transform.scale));
            }
        }

        let mut crs = self.crs;
        let mut schema = self.schema;
        let mut vlrs = Vec::with_capacity(self.vlrs.len());
        for vlr in self.vlrs {
            if vlr.is_wkt_crs() {
                if crs.is_none() {
                    crs = Crs::from_vlr_data(&vlr.data);
                }
            } else if vlr.is_extra_bytes() {
                if schema.is_empty() {
                    schema = Schema::from_vlr_data(&vlr.data)?;
                }
            } else {
                // The laszip vlr passes through here too: the reader needs it
                // to decompress, and the writer regenerates it.
                vlrs.push(vlr);
            }
        }

        let declared = schema.len_bytes();
        let mut point_format = self.point_format;
        if usize::from(point_format.extra_bytes) < declared {
            if point_format.extra_bytes == 0 {
                point_format.extra_bytes = u16::try_from(declared)?;
            } else {
                return Err(Error::ExtraBytesMismatch {
                    len: usize::from(point_format.extra_bytes),
                    expected: declared,
                });
            }
        }

        self.evlrs.retain(|evlr| {
            if evlr.is_wkt_crs() {
                if crs.is_none() {
                    crs = Crs::from_vlr_data(&evlr.data);
                }
                false
            } else {
                true
            }
        });

        Ok(Header {
            bounds: Bounds::default(),
            crs,
            date: self.date,
            evlrs: self.evlrs,
            file_source_id: self.file_source_id,
            generating_software: self.generating_software,
            guid: self.guid,
            number_of_points: 0,
            number_of_points_by_return: [0; 15],
            padding: self.padding,
            point_format,
            point_padding: self.point_padding,
            schema,
            system_identifier: self.system_identifier,
            transforms: self.transforms,
            version: self.version,
            vlr_padding: self.vlr_padding,
            vlrs,
        })
    }
}

impl Default for Builder {
    fn default() -> Builder {
        Builder {
            crs: None,
            date: Some(Utc::now().date_naive()),
            evlrs: Vec::new(),
            file_source_id: 0,
            generating_software: format!("laspipe {}", env!("CARGO_PKG_VERSION")),
            guid: Uuid::nil(),
            padding: Vec::new(),
            point_format: Format::default(),
            point_padding: Vec::new(),
            schema: Schema::default(),
            system_identifier: "laspipe".to_string(),
            transforms: Vector {
                x: Transform::default(),
                y: Transform::default(),
                z: Transform::default(),
            },
            version: Version::default(),
            vlr_padding: Vec::new(),
            vlrs: Vec::new(),
        }
    }
}

impl From<Version> for Builder {
    fn from(version: Version) -> Builder {
        Builder {
            version,
            ..Default::default()
        }
    }
}

impl From<(u8, u8)> for Builder {
    fn from(version: (u8, u8)) -> Builder {
        Builder::from(Version::from(version))
    }
}

/// A las header.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub(crate) bounds: Bounds,
    pub(crate) crs: Option<Crs>,
    pub(crate) date: Option<NaiveDate>,
    pub(crate) evlrs: Vec<Vlr>,
    pub(crate) file_source_id: u16,
    pub(crate) generating_software: String,
    pub(crate) guid: Uuid,
    pub(crate) number_of_points: u64,
    pub(crate) number_of_points_by_return: [u64; 15],
    pub(crate) padding: Vec<u8>,
    pub(crate) point_format: Format,
    pub(crate) point_padding: Vec<u8>,
    pub(crate) schema: Schema,
    pub(crate) system_identifier: String,
    pub(crate) transforms: Vector<Transform>,
    pub(crate) version: Version,
    pub(crate) vlr_padding: Vec<u8>,
    pub(crate) vlrs: Vec<Vlr>,
}

impl Header {
    /// Returns this header's bounds.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Returns this header's coordinate reference system, if any.
    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    /// Sets this header's coordinate reference system.
    pub fn set_crs(&mut self, crs: Crs) {
        self.crs = Some(crs);
    }

    /// Returns this header's file creation date.
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Returns this header's extended variable length records.
    pub fn evlrs(&self) -> &[Vlr] {
        &self.evlrs
    }

    /// Returns this header's file source id.
    pub fn file_source_id(&self) -> u16 {
        self.file_source_id
    }

    /// Returns this header's generating software.
    pub fn generating_software(&self) -> &str {
        &self.generating_software
    }

    /// Returns this header's guid.
    pub fn guid(&self) -> Uuid {
        self.guid
    }

    /// Returns the number of points in the file this header describes.
    pub fn number_of_points(&self) -> u64 {
        self.number_of_points
    }

    /// Returns this header's point format.
    pub fn point_format(&self) -> &Format {
        &self.point_format
    }

    /// Returns a mutable reference to this header's point format.
    pub fn point_format_mut(&mut self) -> &mut Format {
        &mut self.point_format
    }

    /// Returns this header's extra dimension schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns this header's system identifier.
    pub fn system_identifier(&self) -> &str {
        &self.system_identifier
    }

    /// Returns this header's scale/offset transforms.
    pub fn transforms(&self) -> &Vector<Transform> {
        &self.transforms
    }

    /// Returns this header's version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns this header's variable length records.
    ///
    /// The crs and schema records are not part of this list, they are carried
    /// as typed fields and regenerated on write. The laszip record of a
    /// compressed file does appear here, the decompressor needs it.
    pub fn vlrs(&self) -> &[Vlr] {
        &self.vlrs
    }

    /// Reads a header, vlrs and evlrs included, leaving the reader positioned
    /// at the first point record.
    pub(crate) fn read_from<R: Read + Seek>(read: &mut R) -> Result<Header> {
        // All header offsets are relative to where the las data begins,
        // which need not be the start of the stream.
        let start = read.stream_position()?;
        let raw_header = raw::Header::read_from(read)?;
        let number_of_vlrs = raw_header.number_of_variable_length_records;
        let offset_to_point_data = u64::from(raw_header.offset_to_point_data);
        let number_of_evlrs = raw_header.number_of_evlrs;
        let start_of_first_evlr = raw_header.start_of_first_evlr;
        let number_of_points = raw_header.number_of_point_records;
        let number_of_points_by_return = raw_header.number_of_points_by_return;
        let bounds = Bounds {
            min: Vector {
                x: raw_header.min_x,
                y: raw_header.min_y,
                z: raw_header.min_z,
            },
            max: Vector {
                x: raw_header.max_x,
                y: raw_header.max_y,
                z: raw_header.max_z,
            },
        };

        let mut builder = Builder::new(raw_header)?;
        for _ in 0..number_of_vlrs {
            let raw_vlr = raw::Vlr::read_from(read, false)?;
            builder.vlrs.push(Vlr::new(raw_vlr)?);
        }
        let position = read.stream_position()? - start;
        if position > offset_to_point_data {
            return Err(Error::OffsetToPointDataTooSmall(
                u32::try_from(offset_to_point_data).unwrap_or(u32::MAX),
            ));
        }
        if position < offset_to_point_data {
            let mut vlr_padding = vec![0; (offset_to_point_data - position) as usize];
            read.read_exact(&mut vlr_padding)?;
            builder.vlr_padding = vlr_padding;
        }
        if number_of_evlrs > 0 && start_of_first_evlr > 0 {
            let _ = read.seek(SeekFrom::Start(start + start_of_first_evlr))?;
            for _ in 0..number_of_evlrs {
                let raw_evlr = raw::Vlr::read_from(read, true)?;
                builder.evlrs.push(Vlr::new(raw_evlr)?);
            }
            let _ = read.seek(SeekFrom::Start(start + offset_to_point_data))?;
        }

        let mut header = builder.into_header()?;
        header.number_of_points = number_of_points;
        header.number_of_points_by_return = number_of_points_by_return;
        header.bounds = bounds;
        Ok(header)
    }

    /// Converts this header into a raw header.
    pub(crate) fn into_raw(&self) -> Result<raw::Header> {
        let mut system_identifier = [0; 32];
        system_identifier
            .as_mut()
            .from_las_str(&self.system_identifier)?;
        let mut generating_software = [0; 32];
        generating_software
            .as_mut()
            .from_las_str(&self.generating_software)?;
        let wire_vlrs = self.wire_vlrs();
        let vlr_len: u32 = wire_vlrs
            .iter()
            .map(|vlr| u32::try_from(vlr.len(false)).unwrap_or(u32::MAX))
            .sum();
        let header_size = raw::HEADER_SIZE + u16::try_from(self.padding.len())?;
        let format_id = self.point_format.to_u8()?
            | if self.point_format.is_compressed {
                0x80
            } else {
                0
            };
        let (bounds_min, bounds_max) = if self.number_of_points == 0 {
            (Vector::default(), Vector::default())
        } else {
            (self.bounds.min, self.bounds.max)
        };
        Ok(raw::Header {
            file_signature: *b"LASF",
            file_source_id: self.file_source_id,
            // Standard gps time plus the mandatory wkt crs bit.
            global_encoding: 0x11,
            guid: self.guid.into_bytes(),
            version_major: self.version.major,
            version_minor: self.version.minor,
            system_identifier,
            generating_software,
            file_creation_day_of_year: self
                .date
                .map_or(0, |date| u16::try_from(date.ordinal()).unwrap_or(0)),
            file_creation_year: self
                .date
                .map_or(0, |date| u16::try_from(date.year()).unwrap_or(0)),
            header_size,
            offset_to_point_data: u32::from(header_size)
                + vlr_len
                + u32::try_from(self.vlr_padding.len())?,
            number_of_variable_length_records: u32::try_from(wire_vlrs.len())?,
            point_data_record_format: format_id,
            point_data_record_length: self.point_format.len(),
            legacy_number_of_point_records: 0,
            legacy_number_of_points_by_return: [0; 5],
            x_scale_factor: self.transforms.x.scale,
            y_scale_factor: self.transforms.y.scale,
            z_scale_factor: self.transforms.z.scale,
            x_offset: self.transforms.x.offset,
            y_offset: self.transforms.y.offset,
            z_offset: self.transforms.z.offset,
            max_x: bounds_max.x,
            min_x: bounds_min.x,
            max_y: bounds_max.y,
            min_y: bounds_min.y,
            max_z: bounds_max.z,
            min_z: bounds_min.z,
            start_of_waveform_data_packet_record: 0,
            // The writer patches in the real evlr offset when it closes.
            start_of_first_evlr: 0,
            number_of_evlrs: u32::try_from(self.evlrs.len())?,
            number_of_point_records: self.number_of_points,
            number_of_points_by_return: self.number_of_points_by_return,
            padding: self.padding.clone(),
        })
    }

    /// Writes this header, vlrs and vlr padding included.
    pub(crate) fn write_to<W: Write>(&self, write: &mut W) -> Result<()> {
        self.into_raw()?.write_to(write)?;
        for vlr in self.wire_vlrs() {
            vlr.into_raw(false)?.write_to(write)?;
        }
        if !self.vlr_padding.is_empty() {
            write.write_all(&self.vlr_padding)?;
        }
        Ok(())
    }

    /// The vlrs as they go onto disk: user vlrs plus the regenerated schema
    /// and crs records.
    fn wire_vlrs(&self) -> Vec<Vlr> {
        let mut wire_vlrs = self.vlrs.clone();
        if !self.schema.is_empty() {
            if let Ok(vlr) = self.schema.to_vlr() {
                wire_vlrs.push(vlr);
            }
        }
        if let Some(crs) = &self.crs {
            wire_vlrs.push(crs.to_vlr());
        }
        wire_vlrs
    }

    pub(crate) fn point_padding(&self) -> &[u8] {
        &self.point_padding
    }

    /// Zeroes the point counts and bounds, called when a writer takes this
    /// header over.
    pub(crate) fn clear(&mut self) {
        self.number_of_points = 0;
        self.number_of_points_by_return = [0; 15];
        self.bounds = Bounds::default();
    }

    /// Folds a point into the counts and bounds.
    pub(crate) fn add_point(&mut self, point: &Point) {
        self.number_of_points += 1;
        if (1..=15).contains(&point.return_number) {
            self.number_of_points_by_return[usize::from(point.return_number) - 1] += 1;
        }
        self.bounds.grow(point);
    }
}

impl Default for Header {
    fn default() -> Header {
        Builder::default()
            .into_header()
            .expect("the default builder produces a valid header")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DataType;

    #[test]
    fn zero_scale_is_rejected() {
        let mut builder = Builder::default();
        builder.transforms.z.scale = 0.;
        assert!(matches!(
            builder.into_header(),
            Err(Error::InvalidScale(_))
        ));
    }

    #[test]
    fn negative_scale_is_rejected() {
        let mut builder = Builder::default();
        builder.transforms.x.scale = -0.01;
        assert!(builder.into_header().is_err());
    }

    #[test]
    fn pre_14_versions_are_rejected() {
        let builder = Builder::from((1, 2));
        assert!(matches!(
            builder.into_header(),
            Err(Error::UnsupportedFeature { .. })
        ));
    }

    #[test]
    fn schema_drives_extra_bytes() {
        let mut builder = Builder::default();
        builder.schema.declare("confidence", DataType::U8).unwrap();
        builder.schema.declare("range", DataType::F32).unwrap();
        let header = builder.into_header().unwrap();
        assert_eq!(5, header.point_format().extra_bytes);
        assert_eq!(35, header.point_format().len());
    }

    #[test]
    fn default_transforms() {
        let header = Header::default();
        assert_eq!(0.01, header.transforms().x.scale);
        assert_eq!(0., header.transforms().x.offset);
    }

    #[test]
    fn crs_vlr_is_lifted() {
        let mut builder = Builder::default();
        builder.vlrs.push(Crs::epsg(25832).to_vlr());
        let header = builder.into_header().unwrap();
        assert_eq!(Some(&Crs::epsg(25832)), header.crs());
        assert!(header.vlrs().is_empty());
    }

    #[test]
    fn extra_bytes_vlr_is_lifted() {
        let mut schema = Schema::default();
        schema.declare("confidence", DataType::U8).unwrap();
        let mut builder = Builder::default();
        builder.vlrs.push(schema.to_vlr().unwrap());
        let header = builder.into_header().unwrap();
        assert!(header.schema().contains("confidence"));
        assert!(header.vlrs().is_empty());
        assert_eq!(1, header.point_format().extra_bytes);
    }

    #[test]
    fn user_vlrs_pass_through() {
        let mut builder = Builder::default();
        builder.vlrs.push(Vlr {
            user_id: "laspipe test".to_string(),
            record_id: 42,
            ..Default::default()
        });
        let header = builder.into_header().unwrap();
        assert_eq!(1, header.vlrs().len());
    }
}
