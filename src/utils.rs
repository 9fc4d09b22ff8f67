use crate::{Error, Result};

/// Interprets a nul-filled byte field as a `&str`, las-style.
pub trait AsLasStr {
    /// Interprets the bytes as a `&str`, stopping at the first nul byte.
    ///
    /// Returns an error if the characters before the first nul are not ascii.
    fn as_las_str(&self) -> Result<&str>;
}

/// Writes a `&str` into a fixed-width, nul-filled byte field, las-style.
pub trait FromLasStr {
    /// Copies the string into this byte field.
    ///
    /// Returns an error if the string doesn't fit, or is not ascii.
    fn from_las_str(&mut self, s: &str) -> Result<()>;
}

impl AsLasStr for &'_ [u8] {
    fn as_las_str(&self) -> Result<&str> {
        let end = self.iter().position(|&b| b == 0).unwrap_or(self.len());
        let s = std::str::from_utf8(&self[..end])?;
        if !s.is_ascii() {
            Err(Error::NotAscii(s.to_string()))
        } else {
            Ok(s)
        }
    }
}

impl FromLasStr for &'_ mut [u8] {
    fn from_las_str(&mut self, s: &str) -> Result<()> {
        if !s.is_ascii() {
            return Err(Error::NotAscii(s.to_string()));
        }
        if s.len() > self.len() {
            return Err(Error::StringTooLong {
                string: s.to_string(),
                len: self.len(),
            });
        }
        for (byte, c) in self.iter_mut().zip(s.bytes()) {
            *byte = c;
        }
        for byte in self.iter_mut().skip(s.len()) {
            *byte = 0;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_las_str_stops_at_nul() {
        let bytes = b"lidar\0\0\0";
        assert_eq!("lidar", bytes.as_ref().as_las_str().unwrap());
    }

    #[test]
    fn as_las_str_no_nul() {
        let bytes = b"lidar";
        assert_eq!("lidar", bytes.as_ref().as_las_str().unwrap());
    }

    #[test]
    fn from_las_str_nul_fills() {
        let mut bytes = *b"xxxxxxxx";
        bytes.as_mut().from_las_str("lidar").unwrap();
        assert_eq!(*b"lidar\0\0\0", bytes);
    }

    #[test]
    fn from_las_str_too_long() {
        let mut bytes = [0; 2];
        assert!(bytes.as_mut().from_las_str("lidar").is_err());
    }
}
