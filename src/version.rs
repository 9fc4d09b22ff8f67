use std::fmt;

/// A las format version, major.minor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// The major version, always 1 for now.
    pub major: u8,
    /// The minor version.
    pub minor: u8,
}

impl Version {
    /// Creates a new version.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::Version;
    /// let version = Version::new(1, 4);
    /// ```
    pub fn new(major: u8, minor: u8) -> Version {
        Version { major, minor }
    }

    /// Does this version support the extended point formats (6 through 8)?
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::Version;
    /// assert!(Version::new(1, 4).supports_extended_formats());
    /// assert!(!Version::new(1, 2).supports_extended_formats());
    /// ```
    pub fn supports_extended_formats(&self) -> bool {
        *self >= Version::new(1, 4)
    }

    /// Does this version support extended variable length records?
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::Version;
    /// assert!(Version::new(1, 4).supports_evlrs());
    /// assert!(!Version::new(1, 2).supports_evlrs());
    /// ```
    pub fn supports_evlrs(&self) -> bool {
        *self >= Version::new(1, 4)
    }
}

impl Default for Version {
    fn default() -> Version {
        Version::new(1, 4)
    }
}

impl From<(u8, u8)> for Version {
    fn from((major, minor): (u8, u8)) -> Version {
        Version::new(major, minor)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
