//! Read, transform, and write [ASPRS
//! las](https://www.asprs.org/divisions-committees/lidar-division/laser-las-file-format-exchange-activities)
//! point clouds, las 1.4 extended point formats (6 through 8), las or laz.
//!
//! The pipeline this crate is built around is read → colorize → reproject →
//! write:
//!
//! ```
//! use laspipe::{colorize, reproject, point::Format, BandMapping, Builder, Crs,
//!     GeoTransform, Point, PointCloud, Raster};
//!
//! // Normally this comes from PointCloud::from_path("input.laz").
//! let mut builder = Builder::default();
//! builder.point_format = Format::new(8).unwrap();
//! builder.crs = Some(Crs::epsg(25832));
//! let mut cloud = PointCloud::new(builder.into_header().unwrap());
//! cloud.append(Point {
//!     x: 500000.,
//!     y: 6200000.,
//!     color: Some(Default::default()),
//!     nir: Some(0),
//!     ..Default::default()
//! }).unwrap();
//!
//! // Sample an orthophoto's four bands into color and infrared. The raster
//! // must speak the cloud's crs, so colorize before reprojecting.
//! let raster = Raster::constant(
//!     100,
//!     100,
//!     GeoTransform::new(499950., 6200050., 1., -1.),
//!     &[10., 20., 30., 40.],
//! )
//! .unwrap()
//! .with_crs(Crs::epsg(25832));
//! let outcome = colorize(&mut cloud, &raster, &BandMapping::rgb_nir()).unwrap();
//! assert_eq!(0, outcome.out_of_bounds);
//!
//! // Then move the coordinates into the delivery system.
//! reproject(&mut cloud, &Crs::epsg(4326)).unwrap();
//!
//! // And write: cloud.to_path("output.laz") compresses by extension.
//! ```
//!
//! # Reading and writing
//!
//! [PointCloud] is the batch interface; [Reader] and [Writer] stream points
//! one at a time for data that shouldn't be fully resident:
//!
//! ```
//! use laspipe::{Point, Reader, Writer};
//!
//! let mut writer = Writer::default();
//! writer.write_point(Point { x: 1., y: 2., z: 3., ..Default::default() }).unwrap();
//! let mut reader = Reader::new(writer.into_inner().unwrap()).unwrap();
//! let point = reader.read_point().unwrap().unwrap();
//! assert_eq!(1., point.x);
//! ```
//!
//! Coordinates are quantized on disk with the header's per-axis scale and
//! offset (`0.01` and `0` by default), so a round trip reproduces them to
//! within half a scale step.
//!
//! # Compression
//!
//! laz support is a cargo feature, enabled by default. The writer compresses
//! when `point_format().is_compressed` is set (or the output path ends in
//! `.laz`); the reader detects compression on its own.

#![deny(
    missing_docs,
    missing_debug_implementations,
    unsafe_code,
    unused_import_braces
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod colorize;
pub mod header;
#[cfg(feature = "laz")]
pub mod laz;
pub mod point;
pub mod raster;
pub mod raw;
pub mod reader;
pub mod reproject;
pub mod schema;
pub mod writer;

mod bounds;
mod cloud;
mod color;
mod crs;
mod error;
mod transform;
mod utils;
mod vector;
mod version;
mod vlr;

pub use crate::{
    bounds::Bounds,
    cloud::{CloudData, PointCloud},
    color::Color,
    colorize::{colorize, BandMapping, Colorization, Dimension},
    crs::Crs,
    error::Error,
    header::{Builder, Header},
    point::Point,
    raster::{GeoTransform, Raster},
    reader::Reader,
    reproject::{reproject, Reprojector},
    schema::Schema,
    transform::Transform,
    vector::Vector,
    version::Version,
    vlr::Vlr,
    writer::{Writer, WriterOptions},
};

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, Error>;
