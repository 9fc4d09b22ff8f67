//! In-memory rasters, sampled by the colorizer.
//!
//! A [Raster] is a read-only, band-major grid of samples plus the north-up
//! affine [GeoTransform] that places it in the world. How the grid got into
//! memory (GeoTIFF, COG, synthetic) is outside this crate's concern: the
//! colorizer needs the whole grid resident before it starts, it never reads
//! per point.

use crate::{Crs, Error, Result};

/// A north-up affine geotransform: origin plus pixel size, rotation zero.
///
/// The world position of the top-left corner of pixel `(col, row)` is
/// `(origin_x + col * pixel_width, origin_y + row * pixel_height)`;
/// `pixel_height` is negative for the usual north-up rasters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoTransform {
    /// The x coordinate of the raster's top-left corner.
    pub origin_x: f64,
    /// The y coordinate of the raster's top-left corner.
    pub origin_y: f64,
    /// The width of one pixel in world units.
    pub pixel_width: f64,
    /// The height of one pixel in world units, negative for north-up.
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Creates a new geotransform.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::GeoTransform;
    /// let geotransform = GeoTransform::new(0., 10., 1., -1.);
    /// ```
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> GeoTransform {
        GeoTransform {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// Returns the (column, row) of the pixel containing a world position.
    ///
    /// The result may lie outside the raster; bounds checking is the
    /// caller's job.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::GeoTransform;
    /// let geotransform = GeoTransform::new(0., 10., 1., -1.);
    /// assert_eq!((2, 3), geotransform.pixel_of(2.5, 6.5));
    /// ```
    pub fn pixel_of(&self, x: f64, y: f64) -> (i64, i64) {
        let col = ((x - self.origin_x) / self.pixel_width).floor();
        let row = ((y - self.origin_y) / self.pixel_height).floor();
        (col as i64, row as i64)
    }
}

/// A read-only, multi-band raster grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    geotransform: GeoTransform,
    crs: Option<Crs>,
    bands: Vec<Vec<f64>>,
}

impl Raster {
    /// Creates a new raster from band-major sample data.
    ///
    /// Every band must hold exactly `width * height` samples, row-major from
    /// the top-left pixel; there must be at least one band, and the pixel
    /// sizes must be nonzero and finite.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::{GeoTransform, Raster};
    /// let geotransform = GeoTransform::new(0., 2., 1., -1.);
    /// let band = vec![1., 2., 3., 4.];
    /// let raster = Raster::new(2, 2, geotransform, vec![band]).unwrap();
    /// ```
    pub fn new(
        width: usize,
        height: usize,
        geotransform: GeoTransform,
        bands: Vec<Vec<f64>>,
    ) -> Result<Raster> {
        if width == 0 || height == 0 {
            return Err(Error::MalformedRaster(format!(
                "the raster is empty: {width}x{height}"
            )));
        }
        if bands.is_empty() {
            return Err(Error::MalformedRaster("the raster has no bands".to_string()));
        }
        if !(geotransform.pixel_width.is_finite()
            && geotransform.pixel_width != 0.
            && geotransform.pixel_height.is_finite()
            && geotransform.pixel_height != 0.)
        {
            return Err(Error::MalformedRaster(format!(
                "bad pixel size: {} x {}",
                geotransform.pixel_width, geotransform.pixel_height
            )));
        }
        for (index, band) in bands.iter().enumerate() {
            if band.len() != width * height {
                return Err(Error::MalformedRaster(format!(
                    "band {} holds {} sample(s), expected {}",
                    index + 1,
                    band.len(),
                    width * height
                )));
            }
        }
        Ok(Raster {
            width,
            height,
            geotransform,
            crs: None,
            bands,
        })
    }

    /// Creates a raster whose bands each hold one constant value everywhere.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::{GeoTransform, Raster};
    /// let geotransform = GeoTransform::new(0., 10., 1., -1.);
    /// let raster = Raster::constant(10, 10, geotransform, &[10., 20., 30., 40.]).unwrap();
    /// assert_eq!(4, raster.band_count());
    /// assert_eq!(Some(20.), raster.sample(2, 3, 3));
    /// ```
    pub fn constant(
        width: usize,
        height: usize,
        geotransform: GeoTransform,
        values: &[f64],
    ) -> Result<Raster> {
        let bands = values
            .iter()
            .map(|&value| vec![value; width * height])
            .collect();
        Raster::new(width, height, geotransform, bands)
    }

    /// Tags this raster with the crs its geotransform speaks.
    pub fn with_crs(mut self, crs: Crs) -> Raster {
        self.crs = Some(crs);
        self
    }

    /// Returns this raster's width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns this raster's height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of bands.
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Returns this raster's geotransform.
    pub fn geotransform(&self) -> &GeoTransform {
        &self.geotransform
    }

    /// Returns this raster's crs, if known.
    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    /// Returns true if the pixel coordinate lies inside the raster.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::{GeoTransform, Raster};
    /// let raster = Raster::constant(2, 2, GeoTransform::new(0., 2., 1., -1.), &[0.]).unwrap();
    /// assert!(raster.contains(1, 1));
    /// assert!(!raster.contains(2, 0));
    /// assert!(!raster.contains(-1, 0));
    /// ```
    pub fn contains(&self, col: i64, row: i64) -> bool {
        col >= 0
            && row >= 0
            && (col as u64) < self.width as u64
            && (row as u64) < self.height as u64
    }

    /// Samples one band at an integer pixel, nearest-neighbor.
    ///
    /// `band` is 1-based, following the raster conventions of the gis world.
    /// Returns `None` outside the raster or for an unknown band.
    pub fn sample(&self, band: usize, col: i64, row: i64) -> Option<f64> {
        if band == 0 || !self.contains(col, row) {
            return None;
        }
        self.bands
            .get(band - 1)
            .and_then(|samples| samples.get(row as usize * self.width + col as usize))
            .copied()
    }
}
