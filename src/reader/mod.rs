//! Read las points.
//!
//! Create a [Reader] from anything that is `Read + Seek`, most commonly a
//! buffered file or an in-memory cursor:
//!
//! ```
//! use std::io::Cursor;
//! use laspipe::{Reader, Writer};
//!
//! let mut writer = Writer::default();
//! writer.write_point(Default::default()).unwrap();
//! let mut reader = Reader::new(writer.into_inner().unwrap()).unwrap();
//! ```
//!
//! Read points one at a time with [Reader::read_point], in bulk with
//! [Reader::read_points], or iterate over all of them:
//!
//! ```
//! # use std::io::Cursor;
//! # use laspipe::{Reader, Writer};
//! # let mut writer = Writer::default();
//! # writer.write_point(Default::default()).unwrap();
//! # let mut reader = Reader::new(writer.into_inner().unwrap()).unwrap();
//! for point in reader.points() {
//!     let point = point.unwrap();
//!     println!("({}, {}, {})", point.x, point.y, point.z);
//! }
//! ```
//!
//! Laszip compressed data is handled transparently when the `laz` feature is
//! enabled (it is by default); without the feature, compressed files fail
//! with [Error::LaszipNotEnabled](crate::Error::LaszipNotEnabled).

mod las;
#[cfg(feature = "laz")]
mod laz;

use crate::{Header, Point, Result};
#[cfg(not(feature = "laz"))]
use crate::Error;
use std::{
    fs::File,
    io::{BufReader, Read, Seek},
    path::Path,
};

trait ReadPoints {
    fn read_point(&mut self) -> Result<Option<Point>>;
    fn read_points(&mut self, n: u64, points: &mut Vec<Point>) -> Result<u64>;
    fn seek(&mut self, index: u64) -> Result<()>;
    fn header(&self) -> &Header;
}

/// An iterator over a reader's points.
///
/// Created by calling [Reader::points].
#[allow(missing_debug_implementations)]
pub struct PointIterator<'a> {
    point_reader: &'a mut dyn ReadPoints,
}

impl Iterator for PointIterator<'_> {
    type Item = Result<Point>;

    fn next(&mut self) -> Option<Self::Item> {
        self.point_reader.read_point().transpose()
    }
}

/// Reads las data.
#[allow(missing_debug_implementations)]
pub struct Reader {
    point_reader: Box<dyn ReadPoints>,
}

impl Reader {
    /// Creates a new reader.
    ///
    /// This does *not* wrap the `Read` in a `BufRead`, so if you're concerned
    /// about performance you should do that wrapping yourself (or use
    /// [Reader::from_path]).
    ///
    /// # Examples
    ///
    /// ```
    /// use laspipe::{Reader, Writer};
    /// let reader = Reader::new(Writer::default().into_inner().unwrap()).unwrap();
    /// ```
    pub fn new<R: Read + Seek + Send + Sync + 'static>(mut read: R) -> Result<Reader> {
        let header = Header::read_from(&mut read)?;
        if header.point_format().is_compressed {
            #[cfg(feature = "laz")]
            {
                Ok(Reader {
                    point_reader: Box::new(laz::PointReader::new(read, header)?),
                })
            }
            #[cfg(not(feature = "laz"))]
            {
                Err(Error::LaszipNotEnabled)
            }
        } else {
            Ok(Reader {
                point_reader: Box::new(las::PointReader::new(read, header)?),
            })
        }
    }

    /// Creates a new reader from a path.
    ///
    /// The underlying `File` is wrapped in a `BufReader` for performance.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Reader> {
        File::open(path)
            .map_err(crate::Error::from)
            .and_then(|file| Reader::new(BufReader::new(file)))
    }

    /// Returns a reference to this reader's header.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::{Reader, Writer};
    /// let reader = Reader::new(Writer::default().into_inner().unwrap()).unwrap();
    /// let header = reader.header();
    /// ```
    pub fn header(&self) -> &Header {
        self.point_reader.header()
    }

    /// Reads a point, returning `Ok(None)` once all points are read.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::{Reader, Writer};
    /// let mut writer = Writer::default();
    /// writer.write_point(Default::default()).unwrap();
    /// let mut reader = Reader::new(writer.into_inner().unwrap()).unwrap();
    /// let point = reader.read_point().unwrap().unwrap();
    /// assert!(reader.read_point().unwrap().is_none());
    /// ```
    pub fn read_point(&mut self) -> Result<Option<Point>> {
        self.point_reader.read_point()
    }

    /// Reads at most `n` points into a new vector.
    pub fn read_points(&mut self, n: u64) -> Result<Vec<Point>> {
        let mut points = Vec::new();
        let _ = self.point_reader.read_points(n, &mut points)?;
        Ok(points)
    }

    /// Reads at most `n` points into the provided vector, returning the
    /// number of points read.
    pub fn read_points_into(&mut self, n: u64, points: &mut Vec<Point>) -> Result<u64> {
        self.point_reader.read_points(n, points)
    }

    /// Reads all remaining points into the provided vector, returning the
    /// number of points read.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::{Reader, Writer};
    /// let mut writer = Writer::default();
    /// writer.write_point(Default::default()).unwrap();
    /// let mut reader = Reader::new(writer.into_inner().unwrap()).unwrap();
    /// let mut points = Vec::new();
    /// assert_eq!(1, reader.read_all_points_into(&mut points).unwrap());
    /// ```
    pub fn read_all_points_into(&mut self, points: &mut Vec<Point>) -> Result<u64> {
        let number_of_points = self.point_reader.header().number_of_points();
        self.point_reader.read_points(number_of_points, points)
    }

    /// Seeks to the given point index, zero-based.
    ///
    /// Seeking in compressed data can be expensive, the decompressor may have
    /// to rewind to a chunk boundary and decompress up to the target.
    pub fn seek(&mut self, index: u64) -> Result<()> {
        self.point_reader.seek(index)
    }

    /// Returns an iterator over this reader's points.
    pub fn points(&mut self) -> PointIterator<'_> {
        PointIterator {
            point_reader: &mut *self.point_reader,
        }
    }
}
