/// The direction the scanner mirror was travelling when the point was
/// collected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScanDirection {
    /// A negative scan direction.
    #[default]
    RightToLeft,
    /// A positive scan direction.
    LeftToRight,
}

impl From<u8> for ScanDirection {
    fn from(n: u8) -> ScanDirection {
        match n & 1 {
            0 => ScanDirection::RightToLeft,
            _ => ScanDirection::LeftToRight,
        }
    }
}

impl From<ScanDirection> for u8 {
    fn from(scan_direction: ScanDirection) -> u8 {
        match scan_direction {
            ScanDirection::RightToLeft => 0,
            ScanDirection::LeftToRight => 1,
        }
    }
}
