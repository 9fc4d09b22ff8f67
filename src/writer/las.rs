use super::{raw_point, WritePoint, WriterOptions};
use crate::{Header, Point, Result};
use std::io::{Seek, Write};

pub(crate) struct PointWriter<W: Write + Seek> {
    write: W,
    header: Header,
    options: WriterOptions,
}

impl<W: Write + Seek> PointWriter<W> {
    pub(crate) fn new(write: W, header: Header, options: WriterOptions) -> PointWriter<W> {
        PointWriter {
            write,
            header,
            options,
        }
    }
}

impl<W: Write + Seek> WritePoint<W> for PointWriter<W> {
    fn write_point(&mut self, point: Point) -> Result<()> {
        self.header.add_point(&point);
        raw_point(point, &self.header, &self.options)
            .and_then(|raw_point| raw_point.write_to(&mut self.write, self.header.point_format()))
    }

    fn into_inner(self: Box<Self>) -> W {
        self.write
    }

    fn get_mut(&mut self) -> &mut W {
        &mut self.write
    }

    fn header(&self) -> &Header {
        &self.header
    }

    fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    fn done(&mut self) -> Result<()> {
        Ok(())
    }
}
