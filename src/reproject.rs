//! Reproject a cloud between coordinate reference systems.
//!
//! The actual math is [proj4rs](https://crates.io/crates/proj4rs)'s job, a
//! pure-Rust port of proj4 treated here as a trusted primitive. This module
//! wires it to the point cloud model with an all-or-nothing contract: every
//! transformed coordinate is buffered, and only when the whole sequence has
//! transformed cleanly are the records and the header's crs updated. A
//! failure anywhere leaves the cloud exactly as it was.
//!
//! ```
//! use laspipe::{reproject, Builder, Crs, Point, PointCloud};
//!
//! let mut builder = Builder::default();
//! builder.crs = Some(Crs::epsg(25832));
//! let mut cloud = PointCloud::new(builder.into_header().unwrap());
//! cloud.append(Point { x: 500000., y: 6200000., ..Default::default() }).unwrap();
//!
//! reproject(&mut cloud, &Crs::epsg(4326)).unwrap();
//! assert_eq!(Some(&Crs::epsg(4326)), cloud.header().crs());
//! ```
//!
//! Reprojecting a cloud onto its own crs is a no-op; reprojecting an empty
//! cloud succeeds and only updates the header.

use crate::{Crs, Error, PointCloud, Result};
use proj4rs::Proj;
use std::fmt;

/// Proj definitions for the EPSG codes this crate ships with.
///
/// The table covers the geographic, web mercator and northern European UTM
/// systems the reference pipelines move between; use
/// [Reprojector::from_proj_strings] for anything else.
fn proj_definition(crs: &Crs) -> Option<&'static str> {
    if !crs.is_epsg() {
        return None;
    }
    Some(match crs.code() {
        4258 => "+proj=longlat +ellps=GRS80 +no_defs",
        4326 => "+proj=longlat +datum=WGS84 +no_defs",
        3857 => {
            "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m \
             +nadgrids=@null +no_defs"
        }
        25832 => "+proj=utm +zone=32 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs",
        25833 => "+proj=utm +zone=33 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs",
        32632 => "+proj=utm +zone=32 +datum=WGS84 +units=m +no_defs",
        32633 => "+proj=utm +zone=33 +datum=WGS84 +units=m +no_defs",
        // ETRS89 / UTM 32N + DVR90 height, the compound system of the Danish
        // national lidar data.
        7416 => {
            "+proj=utm +zone=32 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +vunits=m +no_defs"
        }
        _ => return None,
    })
}

fn is_geographic(definition: &str) -> bool {
    definition.contains("+proj=longlat") || definition.contains("+proj=latlong")
}

/// A reusable transformation between two coordinate reference systems.
pub struct Reprojector {
    source: Crs,
    target: Crs,
    from: Proj,
    to: Proj,
    source_is_geographic: bool,
    target_is_geographic: bool,
}

impl fmt::Debug for Reprojector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reprojector")
            .field("source", &self.source)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl Reprojector {
    /// Creates a reprojector between two EPSG systems from the built-in
    /// definition table.
    ///
    /// Returns [Error::UnsupportedCrs] for codes outside the table.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::{Crs, Reprojector};
    /// let reprojector = Reprojector::new(&Crs::epsg(25832), &Crs::epsg(7416)).unwrap();
    /// assert!(Reprojector::new(&Crs::epsg(25832), &Crs::epsg(2193)).is_err());
    /// ```
    pub fn new(source: &Crs, target: &Crs) -> Result<Reprojector> {
        let source_definition =
            proj_definition(source).ok_or_else(|| Error::UnsupportedCrs(source.clone()))?;
        let target_definition =
            proj_definition(target).ok_or_else(|| Error::UnsupportedCrs(target.clone()))?;
        Reprojector::from_proj_strings(source, source_definition, target, target_definition)
    }

    /// Creates a reprojector from explicit proj strings, for systems outside
    /// the built-in table.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::{Crs, Reprojector};
    /// let reprojector = Reprojector::from_proj_strings(
    ///     &Crs::epsg(2193),
    ///     "+proj=tmerc +lat_0=0 +lon_0=173 +k=0.9996 +x_0=1600000 +y_0=10000000 \
    ///      +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs",
    ///     &Crs::epsg(4326),
    ///     "+proj=longlat +datum=WGS84 +no_defs",
    /// )
    /// .unwrap();
    /// ```
    pub fn from_proj_strings(
        source: &Crs,
        source_definition: &str,
        target: &Crs,
        target_definition: &str,
    ) -> Result<Reprojector> {
        let from = Proj::from_proj_string(source_definition)
            .map_err(|err| Error::Reprojection(format!("invalid definition for {source}: {err:?}")))?;
        let to = Proj::from_proj_string(target_definition)
            .map_err(|err| Error::Reprojection(format!("invalid definition for {target}: {err:?}")))?;
        Ok(Reprojector {
            source: source.clone(),
            target: target.clone(),
            from,
            to,
            source_is_geographic: is_geographic(source_definition),
            target_is_geographic: is_geographic(target_definition),
        })
    }

    /// Returns the source crs.
    pub fn source(&self) -> &Crs {
        &self.source
    }

    /// Returns the target crs.
    pub fn target(&self) -> &Crs {
        &self.target
    }

    /// Transforms one coordinate triple.
    ///
    /// Geographic systems speak degrees at this interface; the radian
    /// conversion proj4rs wants happens inside. z rides along and is only
    /// touched by definitions that carry vertical units.
    pub fn transform(&self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64)> {
        let mut point = if self.source_is_geographic {
            (x.to_radians(), y.to_radians(), z)
        } else {
            (x, y, z)
        };
        proj4rs::transform::transform(&self.from, &self.to, &mut point)
            .map_err(|err| Error::Reprojection(format!("{err:?}")))?;
        if self.target_is_geographic {
            point.0 = point.0.to_degrees();
            point.1 = point.1.to_degrees();
        }
        if !(point.0.is_finite() && point.1.is_finite() && point.2.is_finite()) {
            return Err(Error::Reprojection(format!(
                "({x}, {y}, {z}) transformed to a non-finite coordinate"
            )));
        }
        Ok(point)
    }

    /// Reprojects every record of a cloud, all-or-nothing.
    ///
    /// The cloud's crs must equal this reprojector's source crs. On success
    /// the header's crs becomes the target crs; on any failure the cloud is
    /// left untouched.
    pub fn reproject(&self, cloud: &mut PointCloud) -> Result<()> {
        match cloud.header().crs() {
            None => return Err(Error::MissingCrs),
            Some(crs) if *crs != self.source => {
                return Err(Error::CrsMismatch {
                    expected: self.source.clone(),
                    found: crs.clone(),
                });
            }
            Some(_) => {}
        }
        let transformed = cloud
            .points()
            .iter()
            .map(|point| self.transform(point.x, point.y, point.z))
            .collect::<Result<Vec<_>>>()?;
        for (point, (x, y, z)) in cloud.points_mut().iter_mut().zip(transformed) {
            point.x = x;
            point.y = y;
            point.z = z;
        }
        cloud.header_mut().set_crs(self.target.clone());
        Ok(())
    }
}

/// Reprojects a cloud onto a target crs.
///
/// Reprojecting onto the crs the cloud already has is a no-op that leaves
/// every coordinate bit-identical. Otherwise this builds a [Reprojector]
/// from the built-in definition table and runs it.
///
/// # Examples
///
/// ```
/// use laspipe::{reproject, Builder, Crs, PointCloud};
///
/// let mut builder = Builder::default();
/// builder.crs = Some(Crs::epsg(25832));
/// let mut cloud = PointCloud::new(builder.into_header().unwrap());
/// reproject(&mut cloud, &Crs::epsg(7416)).unwrap();
/// assert_eq!(Some(&Crs::epsg(7416)), cloud.header().crs());
/// ```
pub fn reproject(cloud: &mut PointCloud, target: &Crs) -> Result<()> {
    let source = cloud.header().crs().cloned().ok_or(Error::MissingCrs)?;
    if source == *target {
        return Ok(());
    }
    Reprojector::new(&source, target)?.reproject(cloud)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Builder, Point};

    fn cloud_with_crs(crs: Crs) -> PointCloud {
        let mut builder = Builder::default();
        builder.crs = Some(crs);
        PointCloud::new(builder.into_header().unwrap())
    }

    #[test]
    fn identity_is_a_noop() {
        let mut cloud = cloud_with_crs(Crs::epsg(25832));
        cloud
            .append(Point {
                x: 500000.,
                y: 6200000.,
                z: 42.,
                ..Default::default()
            })
            .unwrap();
        let before = cloud.clone();
        reproject(&mut cloud, &Crs::epsg(25832)).unwrap();
        assert_eq!(before, cloud);
    }

    #[test]
    fn empty_cloud_updates_only_the_crs() {
        let mut cloud = cloud_with_crs(Crs::epsg(25832));
        reproject(&mut cloud, &Crs::epsg(4326)).unwrap();
        assert_eq!(Some(&Crs::epsg(4326)), cloud.header().crs());
        assert!(cloud.is_empty());
    }

    #[test]
    fn missing_crs() {
        let mut cloud = PointCloud::default();
        assert!(matches!(
            reproject(&mut cloud, &Crs::epsg(4326)),
            Err(Error::MissingCrs)
        ));
    }

    #[test]
    fn unsupported_crs() {
        let mut cloud = cloud_with_crs(Crs::epsg(25832));
        assert!(matches!(
            reproject(&mut cloud, &Crs::epsg(2193)),
            Err(Error::UnsupportedCrs(_))
        ));
        assert_eq!(Some(&Crs::epsg(25832)), cloud.header().crs());
    }

    #[test]
    fn crs_mismatch() {
        let reprojector = Reprojector::new(&Crs::epsg(25832), &Crs::epsg(4326)).unwrap();
        let mut cloud = cloud_with_crs(Crs::epsg(32632));
        assert!(matches!(
            reprojector.reproject(&mut cloud),
            Err(Error::CrsMismatch { .. })
        ));
    }

    #[test]
    fn utm_to_wgs84_and_back() {
        let reprojector = Reprojector::new(&Crs::epsg(25832), &Crs::epsg(4326)).unwrap();
        let (lon, lat, _) = reprojector.transform(500000., 6200000., 0.).unwrap();
        // The central meridian of zone 32 is 9 degrees east.
        assert!((lon - 9.).abs() < 1e-6, "lon = {lon}");
        assert!((55. ..57.).contains(&lat), "lat = {lat}");

        let back = Reprojector::new(&Crs::epsg(4326), &Crs::epsg(25832)).unwrap();
        let (x, y, _) = back.transform(lon, lat, 0.).unwrap();
        assert!((x - 500000.).abs() < 1e-3, "x = {x}");
        assert!((y - 6200000.).abs() < 1e-3, "y = {y}");
    }

    #[test]
    fn reprojection_transforms_records() {
        let mut cloud = cloud_with_crs(Crs::epsg(25832));
        cloud
            .append(Point {
                x: 500000.,
                y: 6200000.,
                z: 42.,
                ..Default::default()
            })
            .unwrap();
        reproject(&mut cloud, &Crs::epsg(4326)).unwrap();
        let point = &cloud.points()[0];
        assert!((point.x - 9.).abs() < 1e-6);
        assert!((point.z - 42.).abs() < 1e-6);
        assert_eq!(Some(&Crs::epsg(4326)), cloud.header().crs());
    }
}
