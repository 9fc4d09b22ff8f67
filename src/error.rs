use crate::{colorize::Dimension, point::Format, Crs, Transform, Version};
use thiserror::Error;

/// Crate-specific error enum.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A band index does not exist in the raster.
    #[error("band {band} is out of range for a raster with {available} band(s)")]
    BandIndexOutOfRange {
        /// The requested 1-based band index.
        band: usize,
        /// The number of bands the raster actually has.
        available: usize,
    },

    /// The writer is closed.
    #[error("the writer is closed")]
    ClosedWriter,

    /// The cloud's crs does not match the reprojector's source crs.
    #[error("the cloud's crs ({found}) does not match the reprojector's source ({expected})")]
    CrsMismatch {
        /// The crs the reprojector was built for.
        expected: Crs,
        /// The crs the cloud actually has.
        found: Crs,
    },

    /// An extra dimension with this name is already declared.
    #[error("extra dimension is already declared: {0}")]
    DuplicateField(String),

    /// The point's extra bytes do not cover the declared layout.
    #[error("the point carries {len} extra byte(s) but the layout requires {expected}")]
    ExtraBytesMismatch {
        /// The number of extra bytes on the point.
        len: usize,
        /// The number of extra bytes the layout requires.
        expected: usize,
    },

    /// The header size is too small.
    #[error("the header size is too small: {0}")]
    HeaderTooSmall(u16),

    /// A band mapping string could not be parsed.
    #[error("invalid band mapping: {0}")]
    InvalidBandMapping(String),

    /// A crs identifier could not be parsed.
    #[error("invalid crs identifier: {0}")]
    InvalidCrs(String),

    /// The file signature is not "LASF".
    #[error("the file signature is not LASF: {0:?}")]
    InvalidFileSignature([u8; 4]),

    /// The point data record length is smaller than the format demands.
    #[error("point format {0} demands at least {1} byte records, the header says {2}")]
    InvalidPointDataRecordLength(u8, u16, u16),

    /// The number of returns is out of range.
    #[error("invalid number of returns: {0}")]
    InvalidNumberOfReturns(u8),

    /// The return number is out of range.
    #[error("invalid return number: {0}")]
    InvalidReturnNumber(u8),

    /// A quantization scale is not strictly positive.
    #[error("the scale must be strictly positive: {0}")]
    InvalidScale(f64),

    /// The scanner channel is out of range.
    #[error("invalid scanner channel: {0}")]
    InvalidScannerChannel(u8),

    /// The value can't be represented as an i32 after applying the transform.
    #[error("the value {0} can't be quantized with {1}")]
    InverseTransform(f64, Transform),

    /// Wrapper around `std::io::Error`.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper around `laz::LasZipError`.
    #[cfg(feature = "laz")]
    #[error("laszip error: {0}")]
    Laz(String),

    /// The data is laszip compressed but the laz feature is not enabled.
    #[error("the data is laszip compressed, but the laz feature of this crate is not enabled")]
    LaszipNotEnabled,

    /// The laszip vlr was not found, the points cannot be decompressed.
    #[error("the laszip vlr was not found")]
    LasZipVlrNotFound,

    /// The raster's shape is inconsistent.
    #[error("the raster is malformed: {0}")]
    MalformedRaster(String),

    /// The point format requires color, but the point has none.
    #[error("point format {0:?} requires color, but the point has none")]
    MissingColor(Format),

    /// The header has no crs.
    #[error("the header has no crs")]
    MissingCrs,

    /// The point format requires near infrared, but the point has none.
    #[error("point format {0:?} requires near infrared, but the point has none")]
    MissingNir(Format),

    /// The string contains non-ascii characters.
    #[error("the string is not ascii: {0}")]
    NotAscii(String),

    /// The offset to point data is too small.
    #[error("the offset to point data is too small: {0}")]
    OffsetToPointDataTooSmall(u32),

    /// Classification 12 is reserved for the overlap flag.
    #[error("classification 12 is reserved, use the is_overlap flag instead")]
    OverlapClassification,

    /// The point's attributes don't match the point format.
    #[error("the point's attributes do not match point format {0:?}")]
    PointAttributesDoNotMatch(Format),

    /// A coordinate transformation failed.
    #[error("reprojection failed: {0}")]
    Reprojection(String),

    /// The string is too long for its fixed-width field.
    #[error("the string is too long for a {len}-byte field: {string}")]
    StringTooLong {
        /// The string.
        string: String,
        /// The width of the target field in bytes.
        len: usize,
    },

    /// Wrapper around `std::num::TryFromIntError`.
    #[error(transparent)]
    TryFromInt(#[from] std::num::TryFromIntError),

    /// The field is not declared in the header's schema.
    #[error("extra dimension is not declared in the schema: {0}")]
    UndeclaredField(String),

    /// The crs has no built-in projection definition.
    #[error("no built-in projection definition for crs: {0}")]
    UnsupportedCrs(Crs),

    /// A colorization dimension is not carried by the point format.
    #[error("dimension {dimension} is not carried by point format {format:?}")]
    UnsupportedDimension {
        /// The mapped dimension.
        dimension: Dimension,
        /// The cloud's point format.
        format: Format,
    },

    /// The las version doesn't support the feature.
    #[error("las version {version} does not support {feature}")]
    UnsupportedFeature {
        /// The las version.
        version: Version,
        /// The unsupported feature.
        feature: &'static str,
    },

    /// The point format is not supported.
    #[error("unsupported point format: {0}")]
    UnsupportedFormat(u8),

    /// Wrapper around `std::str::Utf8Error`.
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),

    /// A value does not fit an extra dimension's storage type.
    #[error("the value {value} does not fit extra dimension {name}")]
    ValueOutOfRange {
        /// The dimension's name.
        name: String,
        /// The offending value.
        value: f64,
    },

    /// The vlr data is too long for a non-extended vlr.
    #[error("the vlr is too long: {0}")]
    VlrTooLong(usize),
}

#[cfg(feature = "laz")]
impl From<laz::LasZipError> for Error {
    fn from(err: laz::LasZipError) -> Error {
        Error::Laz(err.to_string())
    }
}
