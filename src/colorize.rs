//! Assign color and infrared channels from a raster.
//!
//! Each point's horizontal position is pushed through the raster's
//! geotransform and the hit pixel is sampled nearest-neighbor, once per
//! configured band. The mapping configuration follows the colorization
//! convention of geoprocessing pipelines: an ordered list of
//! `(dimension, 1-based band, scale factor)` triples, also parseable from
//! the `"Red:1:1.0"` string syntax.
//!
//! ```
//! use laspipe::{colorize, BandMapping, GeoTransform, Point, PointCloud, Raster};
//! use laspipe::{point::Format, Builder};
//!
//! let mut builder = Builder::default();
//! builder.point_format = Format::new(8).unwrap();
//! let mut cloud = PointCloud::new(builder.into_header().unwrap());
//!
//! let raster = Raster::constant(
//!     10,
//!     10,
//!     GeoTransform::new(0., 10., 1., -1.),
//!     &[10., 20., 30., 40.],
//! )
//! .unwrap();
//!
//! let outcome = colorize(&mut cloud, &raster, &BandMapping::rgb_nir()).unwrap();
//! assert_eq!(0, outcome.out_of_bounds);
//! ```
//!
//! Points outside the raster extent are not an error: their mapped fields
//! are left untouched and they are tallied in [Colorization::out_of_bounds].
//! The cloud's crs must already match the raster's; this component never
//! reprojects, so reproject first when they differ.

use crate::{Error, PointCloud, Raster, Result};
use log::{debug, warn};
use rayon::prelude::*;
use std::{fmt, str::FromStr};

/// A point dimension a raster band can be mapped onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// The red color channel.
    Red,
    /// The green color channel.
    Green,
    /// The blue color channel.
    Blue,
    /// The near infrared channel.
    Infrared,
}

impl FromStr for Dimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Dimension> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Dimension::Red),
            "green" => Ok(Dimension::Green),
            "blue" => Ok(Dimension::Blue),
            "infrared" | "nir" => Ok(Dimension::Infrared),
            _ => Err(Error::InvalidBandMapping(format!(
                "unknown dimension: {s}"
            ))),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Red => write!(f, "Red"),
            Dimension::Green => write!(f, "Green"),
            Dimension::Blue => write!(f, "Blue"),
            Dimension::Infrared => write!(f, "Infrared"),
        }
    }
}

/// One entry of a colorization configuration: which band feeds which
/// dimension, and a multiplicative scale applied after sampling.
#[derive(Clone, Debug, PartialEq)]
pub struct BandMapping {
    /// The output dimension.
    pub dimension: Dimension,
    /// The 1-based raster band to sample.
    pub band: usize,
    /// The scale factor applied to each sample.
    pub scale: f64,
}

impl BandMapping {
    /// Creates a new band mapping with a scale factor of one.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::{BandMapping, Dimension};
    /// let mapping = BandMapping::new(Dimension::Red, 1);
    /// assert_eq!(1., mapping.scale);
    /// ```
    pub fn new(dimension: Dimension, band: usize) -> BandMapping {
        BandMapping {
            dimension,
            band,
            scale: 1.,
        }
    }

    /// Sets the scale factor.
    pub fn with_scale(mut self, scale: f64) -> BandMapping {
        self.scale = scale;
        self
    }

    /// The canonical four-band mapping: red, green, blue and infrared from
    /// bands one through four.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::BandMapping;
    /// let mappings = BandMapping::rgb_nir();
    /// assert_eq!(4, mappings.len());
    /// ```
    pub fn rgb_nir() -> Vec<BandMapping> {
        vec![
            BandMapping::new(Dimension::Red, 1),
            BandMapping::new(Dimension::Green, 2),
            BandMapping::new(Dimension::Blue, 3),
            BandMapping::new(Dimension::Infrared, 4),
        ]
    }
}

impl FromStr for BandMapping {
    type Err = Error;

    /// Parses the `"Red:1:1.0"` syntax; the scale part is optional.
    fn from_str(s: &str) -> Result<BandMapping> {
        let mut parts = s.trim().split(':');
        let dimension = parts
            .next()
            .ok_or_else(|| Error::InvalidBandMapping(s.to_string()))?
            .parse()?;
        let band = parts
            .next()
            .ok_or_else(|| Error::InvalidBandMapping(s.to_string()))?
            .trim()
            .parse()
            .map_err(|_| Error::InvalidBandMapping(s.to_string()))?;
        let scale = match parts.next() {
            Some(scale) => scale
                .trim()
                .parse()
                .map_err(|_| Error::InvalidBandMapping(s.to_string()))?,
            None => 1.,
        };
        if parts.next().is_some() {
            return Err(Error::InvalidBandMapping(s.to_string()));
        }
        Ok(BandMapping {
            dimension,
            band,
            scale,
        })
    }
}

/// Parses a comma-separated list of band mappings.
///
/// # Examples
///
/// ```
/// # use laspipe::colorize::parse_band_mappings;
/// let mappings =
///     parse_band_mappings("Red:1:1.0, Green:2:1.0, Blue:3:1.0, Infrared:4:1.0").unwrap();
/// assert_eq!(4, mappings.len());
/// ```
pub fn parse_band_mappings(s: &str) -> Result<Vec<BandMapping>> {
    s.split(',').map(str::parse).collect()
}

/// Counters reported by one colorization pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Colorization {
    /// The number of points that were sampled and assigned.
    pub sampled: u64,
    /// The number of points outside the raster extent, left untouched.
    pub out_of_bounds: u64,
}

/// Colorizes a cloud from a raster.
///
/// The configuration is validated up front, before any point is touched:
/// every band index must exist in the raster
/// ([Error::BandIndexOutOfRange]) and every mapped dimension must be
/// representable by the cloud's point format
/// ([Error::UnsupportedDimension]). After that the pass is a pure,
/// order-independent map over the records, run in parallel; sampling the
/// same point twice yields the same values.
///
/// Sampled values are multiplied by the mapping's scale factor and clamped
/// to the 16 bit range of the target fields.
pub fn colorize(
    cloud: &mut PointCloud,
    raster: &Raster,
    mappings: &[BandMapping],
) -> Result<Colorization> {
    let format = *cloud.header().point_format();
    for mapping in mappings {
        if mapping.band == 0 || mapping.band > raster.band_count() {
            return Err(Error::BandIndexOutOfRange {
                band: mapping.band,
                available: raster.band_count(),
            });
        }
        let supported = match mapping.dimension {
            Dimension::Red | Dimension::Green | Dimension::Blue => format.has_color,
            Dimension::Infrared => format.has_nir,
        };
        if !supported {
            return Err(Error::UnsupportedDimension {
                dimension: mapping.dimension,
                format,
            });
        }
    }
    if let (Some(cloud_crs), Some(raster_crs)) = (cloud.header().crs(), raster.crs()) {
        if cloud_crs != raster_crs {
            warn!(
                "colorizing a {cloud_crs} cloud from a {raster_crs} raster, reproject first"
            );
        }
    }

    let geotransform = *raster.geotransform();
    let (sampled, out_of_bounds) = cloud
        .points_mut()
        .par_iter_mut()
        .map(|point| {
            let (col, row) = geotransform.pixel_of(point.x, point.y);
            if !raster.contains(col, row) {
                return (0u64, 1u64);
            }
            for mapping in mappings {
                let Some(value) = raster.sample(mapping.band, col, row) else {
                    continue;
                };
                let value = clamp_to_u16(value * mapping.scale);
                match mapping.dimension {
                    Dimension::Red => {
                        let mut color = point.color.unwrap_or_default();
                        color.red = value;
                        point.color = Some(color);
                    }
                    Dimension::Green => {
                        let mut color = point.color.unwrap_or_default();
                        color.green = value;
                        point.color = Some(color);
                    }
                    Dimension::Blue => {
                        let mut color = point.color.unwrap_or_default();
                        color.blue = value;
                        point.color = Some(color);
                    }
                    Dimension::Infrared => point.nir = Some(value),
                }
            }
            (1u64, 0u64)
        })
        .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

    if out_of_bounds > 0 {
        debug!("{out_of_bounds} point(s) fell outside the raster extent");
    }
    Ok(Colorization {
        sampled,
        out_of_bounds,
    })
}

fn clamp_to_u16(value: f64) -> u16 {
    if value <= 0. {
        0
    } else if value >= f64::from(u16::MAX) {
        u16::MAX
    } else {
        value.round() as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{point::Format, Builder, GeoTransform, Point};

    fn cloud_with_format(n: u8) -> PointCloud {
        let mut builder = Builder::default();
        builder.point_format = Format::new(n).unwrap();
        PointCloud::new(builder.into_header().unwrap())
    }

    fn rgbn_raster() -> Raster {
        Raster::constant(
            10,
            10,
            GeoTransform::new(0., 10., 1., -1.),
            &[10., 20., 30., 40.],
        )
        .unwrap()
    }

    #[test]
    fn parse_mapping() {
        let mapping: BandMapping = "Red:1:1.0".parse().unwrap();
        assert_eq!(BandMapping::new(Dimension::Red, 1), mapping);
        let mapping: BandMapping = "Infrared:4".parse().unwrap();
        assert_eq!(BandMapping::new(Dimension::Infrared, 4), mapping);
        assert!("Red".parse::<BandMapping>().is_err());
        assert!("Chartreuse:1".parse::<BandMapping>().is_err());
        assert!("Red:one".parse::<BandMapping>().is_err());
    }

    #[test]
    fn parse_pipeline_dimension_string() {
        let mappings =
            parse_band_mappings("Red:1:1.0, Green:2:1.0, Blue:3:1.0, Infrared:4:1.0").unwrap();
        assert_eq!(BandMapping::rgb_nir(), mappings);
    }

    #[test]
    fn band_out_of_range_is_fatal() {
        let mut cloud = cloud_with_format(8);
        let raster = rgbn_raster();
        let mappings = vec![BandMapping::new(Dimension::Red, 5)];
        assert!(matches!(
            colorize(&mut cloud, &raster, &mappings),
            Err(Error::BandIndexOutOfRange { band: 5, .. })
        ));
    }

    #[test]
    fn dimension_not_in_format_is_fatal() {
        let mut cloud = cloud_with_format(6);
        let raster = rgbn_raster();
        let mappings = vec![BandMapping::new(Dimension::Red, 1)];
        assert!(matches!(
            colorize(&mut cloud, &raster, &mappings),
            Err(Error::UnsupportedDimension { .. })
        ));
    }

    #[test]
    fn scale_factor_and_clamp() {
        let mut cloud = cloud_with_format(7);
        cloud
            .append(Point {
                x: 5.,
                y: 5.,
                color: Some(Default::default()),
                ..Default::default()
            })
            .unwrap();
        let raster = Raster::constant(
            10,
            10,
            GeoTransform::new(0., 10., 1., -1.),
            &[300., 20., 30.],
        )
        .unwrap();
        let mappings = vec![
            BandMapping::new(Dimension::Red, 1).with_scale(256.),
            BandMapping::new(Dimension::Green, 2).with_scale(0.5),
            BandMapping::new(Dimension::Blue, 3),
        ];
        let outcome = colorize(&mut cloud, &raster, &mappings).unwrap();
        assert_eq!(1, outcome.sampled);
        let color = cloud.points()[0].color.unwrap();
        assert_eq!(u16::MAX, color.red);
        assert_eq!(10, color.green);
        assert_eq!(30, color.blue);
    }
}
