//! The in-memory point cloud model.
//!
//! A [PointCloud] owns one [Header] and an ordered sequence of [Point]s;
//! insertion order is storage order, nothing ever reorders the records. The
//! transformations in [colorize](crate::colorize) and
//! [reproject](crate::reproject) replace field values in place, they never
//! change the record count.

use crate::{
    Error, Header, Point, Reader, Result, Writer, WriterOptions,
};
use std::{
    io::{Read, Seek, Write},
    path::Path,
};

/// A point cloud: a header and an ordered sequence of points.
///
/// # Examples
///
/// ```
/// use laspipe::{Builder, Point, PointCloud};
///
/// let mut cloud = PointCloud::new(Builder::default().into_header().unwrap());
/// cloud.append(Point { x: 1., y: 2., z: 3., ..Default::default() }).unwrap();
/// assert_eq!(1, cloud.len());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PointCloud {
    header: Header,
    points: Vec<Point>,
}

impl PointCloud {
    /// Creates a new, empty point cloud.
    pub fn new(header: Header) -> PointCloud {
        PointCloud {
            header,
            points: Vec::new(),
        }
    }

    /// Returns this cloud's header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub(crate) fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Returns the number of points in this cloud.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if this cloud has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns this cloud's points, in storage order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns mutable access to this cloud's points.
    ///
    /// A slice is handed out on purpose: callers can replace field values in
    /// place but can't change the record count or order.
    pub fn points_mut(&mut self) -> &mut [Point] {
        &mut self.points
    }

    /// Appends a point, validating it against the header first.
    ///
    /// The append is atomic: on error the cloud is unchanged. A point that
    /// omits a field the point format mandates fails with
    /// [Error::MissingColor], [Error::MissingNir] or
    /// [Error::ExtraBytesMismatch]; a point that carries auxiliary bytes
    /// beyond the declared layout fails with [Error::UndeclaredField].
    ///
    /// # Examples
    ///
    /// ```
    /// use laspipe::{Builder, Point, PointCloud};
    ///
    /// let mut cloud = PointCloud::new(Default::default());
    /// let point = Point { extra_bytes: vec![42], ..Default::default() };
    /// assert!(cloud.append(point).is_err());
    /// assert!(cloud.is_empty());
    /// ```
    pub fn append(&mut self, point: Point) -> Result<()> {
        let format = self.header.point_format();
        if format.has_color && point.color.is_none() {
            return Err(Error::MissingColor(*format));
        }
        if format.has_nir && point.nir.is_none() {
            return Err(Error::MissingNir(*format));
        }
        if !format.has_color && point.color.is_some()
            || !format.has_nir && point.nir.is_some()
        {
            return Err(Error::PointAttributesDoNotMatch(*format));
        }
        let expected = usize::from(format.extra_bytes);
        if point.extra_bytes.len() > expected {
            return Err(Error::UndeclaredField(format!(
                "{} auxiliary byte(s) beyond the declared layout of {}",
                point.extra_bytes.len() - expected,
                expected,
            )));
        }
        if point.extra_bytes.len() < expected {
            return Err(Error::ExtraBytesMismatch {
                len: point.extra_bytes.len(),
                expected,
            });
        }
        self.points.push(point);
        Ok(())
    }

    /// Reads a point cloud from anything `Read + Seek`.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspipe::{PointCloud, Writer};
    ///
    /// let cursor = Writer::default().into_inner().unwrap();
    /// let cloud = PointCloud::read_from(cursor).unwrap();
    /// assert!(cloud.is_empty());
    /// ```
    pub fn read_from<R: Read + Seek + Send + Sync + 'static>(read: R) -> Result<PointCloud> {
        let mut reader = Reader::new(read)?;
        let mut points = Vec::new();
        let _ = reader.read_all_points_into(&mut points)?;
        Ok(PointCloud {
            header: reader.header().clone(),
            points,
        })
    }

    /// Reads a point cloud from a path, las or laz.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<PointCloud> {
        let mut reader = Reader::from_path(path)?;
        let mut points = Vec::new();
        let _ = reader.read_all_points_into(&mut points)?;
        Ok(PointCloud {
            header: reader.header().clone(),
            points,
        })
    }

    /// Writes this cloud, returning the destination seeked back to the start
    /// of the las data.
    ///
    /// Whether the output is compressed is controlled by the header's
    /// `point_format().is_compressed` flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use laspipe::PointCloud;
    ///
    /// let cloud = PointCloud::new(Default::default());
    /// let cursor = cloud.write_to(Cursor::new(Vec::new())).unwrap();
    /// ```
    pub fn write_to<W: Write + Seek + Send + Sync + 'static>(&self, write: W) -> Result<W> {
        self.write_to_with(write, WriterOptions::default())
    }

    /// Writes this cloud with custom writer options.
    pub fn write_to_with<W: Write + Seek + Send + Sync + 'static>(
        &self,
        write: W,
        options: WriterOptions,
    ) -> Result<W> {
        let mut writer = Writer::with_options(write, self.header.clone(), options)?;
        writer.write_points(&self.points)?;
        writer.into_inner()
    }

    /// Writes this cloud to a path, compressing when the extension is `.laz`.
    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_path_with(path, WriterOptions::default())
    }

    /// Writes this cloud to a path with custom writer options.
    pub fn to_path_with<P: AsRef<Path>>(&self, path: P, options: WriterOptions) -> Result<()> {
        let mut writer = Writer::from_path_with(path, self.header.clone(), options)?;
        writer.write_points(&self.points)?;
        writer.close()
    }

    /// Exports this cloud's attributes as columns.
    ///
    /// `rgb` and `infrared` are empty when the point format doesn't carry
    /// them; `confidence` is present exactly when the schema declares a
    /// `confidence` dimension.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspipe::PointCloud;
    ///
    /// let cloud = PointCloud::new(Default::default());
    /// let data = cloud.to_data();
    /// assert!(data.points.is_empty());
    /// assert!(data.confidence.is_none());
    /// ```
    pub fn to_data(&self) -> CloudData {
        let format = self.header.point_format();
        let schema = self.header.schema();
        let points = self.points.iter().map(|p| (p.x, p.y, p.z)).collect();
        let rgb = if format.has_color {
            self.points
                .iter()
                .filter_map(|p| p.color.map(|c| (c.red, c.green, c.blue)))
                .collect()
        } else {
            Vec::new()
        };
        let infrared = if format.has_nir {
            self.points.iter().filter_map(|p| p.nir).collect()
        } else {
            Vec::new()
        };
        let classification = self
            .points
            .iter()
            .map(|p| u8::from(p.classification))
            .collect();
        let confidence = if schema.contains("confidence") {
            Some(
                self.points
                    .iter()
                    .map(|p| schema.value_of("confidence", p).unwrap_or(0.) as u8)
                    .collect(),
            )
        } else {
            None
        };
        CloudData {
            points,
            rgb,
            infrared,
            classification,
            confidence,
        }
    }
}

impl Default for PointCloud {
    fn default() -> PointCloud {
        PointCloud::new(Header::default())
    }
}

/// A columnar export of a point cloud's attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CloudData {
    /// The xyz coordinates.
    pub points: Vec<(f64, f64, f64)>,
    /// The colors, empty if the format has none.
    pub rgb: Vec<(u16, u16, u16)>,
    /// The near infrared values, empty if the format has none.
    pub infrared: Vec<u16>,
    /// The classification codes.
    pub classification: Vec<u8>,
    /// The confidence values, present when the schema declares them.
    pub confidence: Option<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{point::Format, schema::DataType, Builder, Color};

    fn format_8_cloud() -> PointCloud {
        let mut builder = Builder::default();
        builder.point_format = Format::new(8).unwrap();
        PointCloud::new(builder.into_header().unwrap())
    }

    #[test]
    fn append_validates_color() {
        let mut cloud = format_8_cloud();
        assert!(matches!(
            cloud.append(Point::default()),
            Err(Error::MissingColor(_))
        ));
        assert!(cloud.is_empty());
        let point = Point {
            color: Some(Color::default()),
            nir: Some(0),
            ..Default::default()
        };
        cloud.append(point).unwrap();
        assert_eq!(1, cloud.len());
    }

    #[test]
    fn append_rejects_undeclared_extra_bytes() {
        let mut cloud = PointCloud::default();
        let point = Point {
            extra_bytes: vec![42],
            ..Default::default()
        };
        assert!(matches!(
            cloud.append(point),
            Err(Error::UndeclaredField(_))
        ));
        assert!(cloud.is_empty());
    }

    #[test]
    fn append_rejects_missing_extra_bytes() {
        let mut builder = Builder::default();
        builder.schema.declare("confidence", DataType::U8).unwrap();
        let mut cloud = PointCloud::new(builder.into_header().unwrap());
        assert!(matches!(
            cloud.append(Point::default()),
            Err(Error::ExtraBytesMismatch { .. })
        ));
    }

    #[test]
    fn to_data_confidence() {
        let mut builder = Builder::default();
        builder.schema.declare("confidence", DataType::U8).unwrap();
        let header = builder.into_header().unwrap();
        let mut cloud = PointCloud::new(header);
        let mut point = Point::default();
        cloud
            .header()
            .schema()
            .set_value("confidence", &mut point, 7.)
            .unwrap();
        cloud.append(point).unwrap();
        let data = cloud.to_data();
        assert_eq!(Some(vec![7]), data.confidence);
        assert!(data.rgb.is_empty());
        assert!(data.infrared.is_empty());
        assert_eq!(vec![0], data.classification);
    }
}
