//! Write las points.
//!
//! A [Writer] takes its configuration from a [Header]:
//!
//! ```
//! use std::io::Cursor;
//! use laspipe::{Builder, Writer};
//! use laspipe::point::Format;
//!
//! let mut builder = Builder::default();
//! builder.point_format = Format::new(8).unwrap();
//! let header = builder.into_header().unwrap();
//! let writer = Writer::new(Cursor::new(Vec::new()), header).unwrap();
//! ```
//!
//! The optional attributes of each written point must agree with the point
//! format exactly, otherwise data would silently be lost:
//!
//! ```
//! use std::io::Cursor;
//! use laspipe::{Builder, Color, Point, Writer};
//! use laspipe::point::Format;
//!
//! let mut builder = Builder::default();
//! builder.point_format = Format::new(7).unwrap();
//! let mut writer = Writer::new(Cursor::new(Vec::new()), builder.into_header().unwrap()).unwrap();
//!
//! let mut point = Point::default();
//! assert!(writer.write_point(point.clone()).is_err()); // format 7 requires color
//! point.color = Some(Color::new(1, 2, 3));
//! writer.write_point(point).unwrap();
//! ```
//!
//! The header is re-written with the final point counts and bounds when the
//! writer closes. [Writer::close] is called by `Drop` as a backstop, but
//! closing explicitly lets you handle the error.

mod las;
#[cfg(feature = "laz")]
mod laz;

use crate::{raw, Error, Header, Point, Result};
use std::{
    fs::File,
    io::{BufWriter, Cursor, Seek, SeekFrom, Write},
    path::Path,
};

trait WritePoint<W: Write> {
    fn write_point(&mut self, point: Point) -> Result<()>;
    fn write_points(&mut self, points: &[Point]) -> Result<()> {
        for point in points.iter().cloned() {
            self.write_point(point)?;
        }
        Ok(())
    }
    fn into_inner(self: Box<Self>) -> W;
    fn get_mut(&mut self) -> &mut W;
    fn header(&self) -> &Header;
    fn header_mut(&mut self) -> &mut Header;
    fn done(&mut self) -> Result<()>;
}

struct ClosedPointWriter;

impl<W: Write> WritePoint<W> for ClosedPointWriter {
    fn write_point(&mut self, _point: Point) -> Result<()> {
        unreachable!()
    }
    fn into_inner(self: Box<Self>) -> W {
        unreachable!()
    }
    fn get_mut(&mut self) -> &mut W {
        unreachable!()
    }
    fn header(&self) -> &Header {
        unreachable!()
    }
    fn header_mut(&mut self) -> &mut Header {
        unreachable!()
    }
    fn done(&mut self) -> Result<()> {
        unreachable!()
    }
}

/// Options for a [Writer].
///
/// `confidence_overrides_classification` reproduces a quirk of the original
/// acquisition pipeline: when enabled, and when the header's schema declares a
/// `confidence` dimension, every written record's classification byte is
/// replaced by its confidence value. That destroys the classification data,
/// so it is off by default and exists only as an explicit opt-in.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriterOptions {
    /// Replace each record's classification with its `confidence` extra
    /// dimension, when declared.
    pub confidence_overrides_classification: bool,
}

impl WriterOptions {
    /// Enables or disables the classification override.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::WriterOptions;
    /// let options = WriterOptions::default().with_confidence_override(true);
    /// assert!(options.confidence_overrides_classification);
    /// ```
    pub fn with_confidence_override(mut self, enabled: bool) -> Self {
        self.confidence_overrides_classification = enabled;
        self
    }
}

/// Converts a point into its raw form, applying writer policies.
fn raw_point(point: Point, header: &Header, options: &WriterOptions) -> Result<raw::Point> {
    let confidence = if options.confidence_overrides_classification {
        header.schema().value_of("confidence", &point).ok()
    } else {
        None
    };
    let mut raw_point = point.into_raw(header.transforms())?;
    if let Some(confidence) = confidence {
        raw_point.classification = confidence as u8;
    }
    Ok(raw_point)
}

/// Writes las data.
#[allow(missing_debug_implementations)]
pub struct Writer<W: 'static + Write + Seek + Send + Sync> {
    closed: bool,
    start: u64,
    point_writer: Box<dyn WritePoint<W>>,
}

impl<W: 'static + Write + Seek + Send + Sync> Writer<W> {
    /// Creates a new writer with default options.
    ///
    /// The header that is passed in will have its point counts and bounds
    /// zeroed; the writer maintains them as points are written.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use laspipe::Writer;
    /// let writer = Writer::new(Cursor::new(Vec::new()), Default::default());
    /// ```
    pub fn new(write: W, header: Header) -> Result<Writer<W>> {
        Self::with_options(write, header, WriterOptions::default())
    }

    /// Creates a new writer with custom options.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use laspipe::{Writer, WriterOptions};
    /// let options = WriterOptions::default().with_confidence_override(true);
    /// let writer = Writer::with_options(Cursor::new(Vec::new()), Default::default(), options);
    /// ```
    pub fn with_options(mut write: W, mut header: Header, options: WriterOptions) -> Result<Self> {
        let start = write.stream_position()?;
        header.clear();
        #[cfg(feature = "laz")]
        header.remove_laz_vlr();
        if header.point_format().is_compressed {
            #[cfg(feature = "laz")]
            {
                header.add_laz_vlr()?;
                header.write_to(&mut write)?;
                Ok(Writer {
                    closed: false,
                    start,
                    point_writer: Box::new(laz::PointWriter::new(write, header, options)?),
                })
            }
            #[cfg(not(feature = "laz"))]
            {
                Err(Error::LaszipNotEnabled)
            }
        } else {
            header.write_to(&mut write)?;
            Ok(Writer {
                closed: false,
                start,
                point_writer: Box::new(las::PointWriter::new(write, header, options)),
            })
        }
    }

    /// Closes this writer.
    ///
    /// Finalizes the compressor, writes any evlrs, and re-writes the header
    /// with the final point counts and bounds. Returns an error when called
    /// twice.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspipe::Writer;
    /// let mut writer = Writer::default();
    /// writer.close().unwrap();
    /// assert!(writer.close().is_err());
    /// ```
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::ClosedWriter);
        }

        self.point_writer.done()?;

        let point_padding = self.header().point_padding().to_vec();
        self.point_writer.get_mut().write_all(&point_padding)?;

        let mut start_of_first_evlr = 0;
        if !self.header().evlrs().is_empty() {
            start_of_first_evlr = self.point_writer.get_mut().stream_position()? - self.start;
            let raw_evlrs: Vec<Result<raw::Vlr>> = self
                .point_writer
                .header()
                .evlrs()
                .iter()
                .map(|evlr| evlr.clone().into_raw(true))
                .collect();
            for raw_evlr in raw_evlrs {
                raw_evlr?.write_to(self.point_writer.get_mut())?;
            }
        }

        let _ = self
            .point_writer
            .get_mut()
            .seek(SeekFrom::Start(self.start))?;
        let mut raw_header = self.point_writer.header().into_raw()?;
        raw_header.start_of_first_evlr = start_of_first_evlr;
        raw_header.write_to(self.point_writer.get_mut())?;
        let _ = self
            .point_writer
            .get_mut()
            .seek(SeekFrom::Start(self.start))?;
        self.closed = true;
        Ok(())
    }

    /// Returns a reference to this writer's header.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspipe::Writer;
    /// let writer = Writer::default();
    /// let header = writer.header();
    /// ```
    pub fn header(&self) -> &Header {
        self.point_writer.header()
    }

    /// Writes a point.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspipe::Writer;
    /// let mut writer = Writer::default();
    /// writer.write_point(Default::default()).unwrap();
    /// ```
    pub fn write_point(&mut self, point: Point) -> Result<()> {
        if self.closed {
            return Err(Error::ClosedWriter);
        }
        if !point.matches(self.header().point_format()) {
            return Err(Error::PointAttributesDoNotMatch(
                *self.header().point_format(),
            ));
        }
        self.point_writer.write_point(point)
    }

    /// Writes all the points.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspipe::{Point, Writer};
    /// let mut writer = Writer::default();
    /// let points = vec![Point::default(), Point::default()];
    /// writer.write_points(&points).unwrap();
    /// ```
    pub fn write_points(&mut self, points: &[Point]) -> Result<()> {
        if self.closed {
            return Err(Error::ClosedWriter);
        }
        if points
            .iter()
            .any(|point| !point.matches(self.header().point_format()))
        {
            return Err(Error::PointAttributesDoNotMatch(
                *self.header().point_format(),
            ));
        }
        self.point_writer.write_points(points)
    }

    /// Closes this writer and returns its inner `Write`, seeked to the
    /// beginning of the las data.
    ///
    /// # Examples
    ///
    /// ```
    /// use laspipe::Writer;
    /// let writer = Writer::default();
    /// let cursor = writer.into_inner().unwrap();
    /// ```
    pub fn into_inner(mut self) -> Result<W> {
        if !self.closed {
            self.close()?;
        }
        // The writer implements Drop, so the stream can't be moved out
        // directly. Swap in a sentinel instead; every public method checks
        // self.closed before touching the point writer.
        let point_writer = std::mem::replace(&mut self.point_writer, Box::new(ClosedPointWriter));
        let mut inner = point_writer.into_inner();
        let _ = inner.seek(SeekFrom::Start(self.start))?;
        Ok(inner)
    }
}

impl Writer<BufWriter<File>> {
    /// Creates a new writer for a path.
    ///
    /// If the `laz` feature is enabled, a `.laz` extension turns on
    /// compression.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use laspipe::Writer;
    /// let writer = Writer::from_path("points.laz", Default::default());
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P, header: Header) -> Result<Writer<BufWriter<File>>> {
        Writer::from_path_with(path, header, WriterOptions::default())
    }

    /// Creates a new writer for a path with custom options.
    pub fn from_path_with<P: AsRef<Path>>(
        path: P,
        mut header: Header,
        options: WriterOptions,
    ) -> Result<Writer<BufWriter<File>>> {
        let compress = cfg!(feature = "laz")
            && path
                .as_ref()
                .extension()
                .and_then(|extension| extension.to_str())
                .is_some_and(|extension| extension.eq_ignore_ascii_case("laz"));
        header.point_format_mut().is_compressed = compress;
        File::create(path)
            .map_err(Error::from)
            .and_then(|file| Writer::with_options(BufWriter::new(file), header, options))
    }
}

impl Default for Writer<Cursor<Vec<u8>>> {
    fn default() -> Writer<Cursor<Vec<u8>>> {
        Writer::new(Cursor::new(Vec::new()), Header::default())
            .expect("an in-memory writer with a default header is valid")
    }
}

impl<W: 'static + Write + Seek + Send + Sync> Drop for Writer<W> {
    fn drop(&mut self) {
        if !self.closed {
            self.close().expect("error when dropping the writer");
        }
    }
}
