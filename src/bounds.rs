use crate::{Point, Vector};

/// Minimum and maximum bounds in three dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// The smallest corner.
    pub min: Vector<f64>,
    /// The largest corner.
    pub max: Vector<f64>,
}

impl Bounds {
    /// Grows the bounds to include the point.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::{Bounds, Point};
    /// let mut bounds = Bounds::default();
    /// let point = Point { x: 1., y: 2., z: 3., ..Default::default() };
    /// bounds.grow(&point);
    /// assert_eq!(1., bounds.max.x);
    /// ```
    pub fn grow(&mut self, point: &Point) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }
}

impl Default for Bounds {
    fn default() -> Bounds {
        Bounds {
            min: Vector {
                x: f64::INFINITY,
                y: f64::INFINITY,
                z: f64::INFINITY,
            },
            max: Vector {
                x: f64::NEG_INFINITY,
                y: f64::NEG_INFINITY,
                z: f64::NEG_INFINITY,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow() {
        let mut bounds = Bounds::default();
        bounds.grow(&Point {
            x: 1.,
            y: 2.,
            z: 3.,
            ..Default::default()
        });
        bounds.grow(&Point {
            x: -1.,
            y: -2.,
            z: -3.,
            ..Default::default()
        });
        assert_eq!(Vector::new(-1., -2., -3.), bounds.min);
        assert_eq!(Vector::new(1., 2., 3.), bounds.max);
    }
}
