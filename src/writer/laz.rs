use super::{raw_point, WritePoint, WriterOptions};
use crate::{Header, Point, Result};
use laz::LasZipCompressor;
use std::io::{Cursor, Seek, Write};

pub(crate) struct PointWriter<W: Write + Seek + Send + 'static> {
    compressor: LasZipCompressor<'static, W>,
    // Staging buffer for the raw bytes of the points to be compressed; owned
    // here so it is dropped on every exit path.
    buffer: Cursor<Vec<u8>>,
    header: Header,
    options: WriterOptions,
}

impl<W: Write + Seek + Send + 'static> PointWriter<W> {
    pub(crate) fn new(
        write: W,
        header: Header,
        options: WriterOptions,
    ) -> Result<PointWriter<W>> {
        let buffer = Cursor::new(vec![0u8; header.point_format().len() as usize]);
        let vlr = header.laz_vlr()?;
        let compressor = LasZipCompressor::new(write, vlr)?;
        Ok(PointWriter {
            compressor,
            buffer,
            header,
            options,
        })
    }
}

impl<W: Write + Seek + Send + 'static> WritePoint<W> for PointWriter<W> {
    fn write_point(&mut self, point: Point) -> Result<()> {
        self.header.add_point(&point);
        self.buffer.set_position(0);
        raw_point(point, &self.header, &self.options)
            .and_then(|raw_point| {
                raw_point.write_to(&mut self.buffer, self.header.point_format())
            })?;
        let len = self.buffer.position() as usize;
        self.compressor
            .compress_one(&self.buffer.get_ref()[..len])?;
        Ok(())
    }

    fn write_points(&mut self, points: &[Point]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        self.buffer.get_mut().clear();
        self.buffer.set_position(0);
        for point in points.iter().cloned() {
            self.header.add_point(&point);
            let raw_point = raw_point(point, &self.header, &self.options)?;
            raw_point.write_to(&mut self.buffer, self.header.point_format())?;
        }
        let len = self.buffer.position() as usize;
        self.compressor.compress_many(&self.buffer.get_ref()[..len])?;
        Ok(())
    }

    fn into_inner(self: Box<Self>) -> W {
        self.compressor.into_inner()
    }

    fn get_mut(&mut self) -> &mut W {
        self.compressor.get_mut()
    }

    fn header(&self) -> &Header {
        &self.header
    }

    fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    fn done(&mut self) -> Result<()> {
        self.compressor.done()?;
        Ok(())
    }
}
