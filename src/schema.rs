//! The schema of a point cloud's extra dimensions.
//!
//! Las points can carry "extra bytes" after their standard attributes. The
//! extra bytes vlr (`LASF_Spec`, record id 4) describes those bytes as a list
//! of named, typed dimensions. This crate resolves that description into a
//! [Schema] once, when the header is parsed, and every by-name access goes
//! through it:
//!
//! ```
//! use laspipe::{schema::DataType, Point, Schema};
//!
//! let mut schema = Schema::default();
//! schema.declare("confidence", DataType::U8).unwrap();
//!
//! let mut point = Point::default();
//! schema.set_value("confidence", &mut point, 42.).unwrap();
//! assert_eq!(42., schema.value_of("confidence", &point).unwrap());
//! assert!(schema.value_of("intensity", &point).is_err());
//! ```

use crate::{Error, Point, Result, Vlr};
use log::warn;

pub(crate) const USER_ID: &str = "LASF_Spec";
pub(crate) const RECORD_ID: u16 = 4;
const DESCRIPTOR_SIZE: usize = 192;

/// Scalar storage types for extra dimensions.
///
/// These are the scalar entries of the las extra bytes data type table;
/// deprecated vector types are not supported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// An unsigned byte.
    U8,
    /// A signed byte.
    I8,
    /// An unsigned two byte integer.
    U16,
    /// A signed two byte integer.
    I16,
    /// An unsigned four byte integer.
    U32,
    /// A signed four byte integer.
    I32,
    /// An unsigned eight byte integer.
    U64,
    /// A signed eight byte integer.
    I64,
    /// A four byte float.
    F32,
    /// An eight byte float.
    F64,
}

impl DataType {
    /// The width of this data type in bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::schema::DataType;
    /// assert_eq!(1, DataType::U8.len());
    /// assert_eq!(8, DataType::F64.len());
    /// ```
    pub fn len(&self) -> usize {
        match self {
            DataType::U8 | DataType::I8 => 1,
            DataType::U16 | DataType::I16 => 2,
            DataType::U32 | DataType::I32 | DataType::F32 => 4,
            DataType::U64 | DataType::I64 | DataType::F64 => 8,
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            DataType::U8 => 1,
            DataType::I8 => 2,
            DataType::U16 => 3,
            DataType::I16 => 4,
            DataType::U32 => 5,
            DataType::I32 => 6,
            DataType::U64 => 7,
            DataType::I64 => 8,
            DataType::F32 => 9,
            DataType::F64 => 10,
        }
    }

    fn from_u8(n: u8) -> Option<DataType> {
        match n {
            1 => Some(DataType::U8),
            2 => Some(DataType::I8),
            3 => Some(DataType::U16),
            4 => Some(DataType::I16),
            5 => Some(DataType::U32),
            6 => Some(DataType::I32),
            7 => Some(DataType::U64),
            8 => Some(DataType::I64),
            9 => Some(DataType::F32),
            10 => Some(DataType::F64),
            _ => None,
        }
    }

    fn holds(&self, value: f64) -> bool {
        if !value.is_finite() {
            return matches!(self, DataType::F32 | DataType::F64);
        }
        match self {
            DataType::U8 => value >= 0. && value <= f64::from(u8::MAX) && value.fract() == 0.,
            DataType::I8 => {
                value >= f64::from(i8::MIN) && value <= f64::from(i8::MAX) && value.fract() == 0.
            }
            DataType::U16 => value >= 0. && value <= f64::from(u16::MAX) && value.fract() == 0.,
            DataType::I16 => {
                value >= f64::from(i16::MIN) && value <= f64::from(i16::MAX) && value.fract() == 0.
            }
            DataType::U32 => value >= 0. && value <= f64::from(u32::MAX) && value.fract() == 0.,
            DataType::I32 => {
                value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX) && value.fract() == 0.
            }
            DataType::U64 => value >= 0. && value <= u64::MAX as f64 && value.fract() == 0.,
            DataType::I64 => {
                value >= i64::MIN as f64 && value <= i64::MAX as f64 && value.fract() == 0.
            }
            DataType::F32 | DataType::F64 => true,
        }
    }
}

/// A named, typed extra dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtraDimension {
    name: String,
    data_type: DataType,
    description: String,
}

impl ExtraDimension {
    /// Returns this dimension's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns this dimension's data type.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Returns this dimension's description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// The declared extra dimensions of a point cloud.
///
/// Order of declaration is storage order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    dimensions: Vec<ExtraDimension>,
}

impl Schema {
    /// Declares a new extra dimension.
    ///
    /// Returns an error if a dimension with this name is already declared.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::{schema::DataType, Schema};
    /// let mut schema = Schema::default();
    /// schema.declare("confidence", DataType::U8).unwrap();
    /// assert!(schema.declare("confidence", DataType::U8).is_err());
    /// ```
    pub fn declare(&mut self, name: &str, data_type: DataType) -> Result<()> {
        self.declare_with_description(name, data_type, "")
    }

    /// Declares a new extra dimension with a description.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::{schema::DataType, Schema};
    /// let mut schema = Schema::default();
    /// schema
    ///     .declare_with_description("confidence", DataType::U8, "Confidence levels")
    ///     .unwrap();
    /// ```
    pub fn declare_with_description(
        &mut self,
        name: &str,
        data_type: DataType,
        description: &str,
    ) -> Result<()> {
        if self.contains(name) {
            return Err(Error::DuplicateField(name.to_string()));
        }
        for s in [name, description] {
            if !s.is_ascii() {
                return Err(Error::NotAscii(s.to_string()));
            }
            if s.len() > 32 {
                return Err(Error::StringTooLong {
                    string: s.to_string(),
                    len: 32,
                });
            }
        }
        self.dimensions.push(ExtraDimension {
            name: name.to_string(),
            data_type,
            description: description.to_string(),
        });
        Ok(())
    }

    /// Returns true if a dimension with this name is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.dimensions.iter().any(|d| d.name == name)
    }

    /// Returns the declared dimensions, in storage order.
    pub fn dimensions(&self) -> &[ExtraDimension] {
        &self.dimensions
    }

    /// Returns the number of declared dimensions.
    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    /// Returns true if no dimensions are declared.
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Returns the total width of the declared layout in bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use laspipe::{schema::DataType, Schema};
    /// let mut schema = Schema::default();
    /// schema.declare("confidence", DataType::U8).unwrap();
    /// schema.declare("range", DataType::F32).unwrap();
    /// assert_eq!(5, schema.len_bytes());
    /// ```
    pub fn len_bytes(&self) -> usize {
        self.dimensions.iter().map(|d| d.data_type.len()).sum()
    }

    /// Reads the named dimension's value from a point's extra bytes.
    ///
    /// Returns [Error::UndeclaredField] if no dimension with this name is
    /// declared, and an error if the point's extra bytes don't cover the
    /// layout.
    pub fn value_of(&self, name: &str, point: &Point) -> Result<f64> {
        let (offset, dimension) = self.locate(name)?;
        let end = offset + dimension.data_type.len();
        let bytes = point.extra_bytes.get(offset..end).ok_or({
            Error::ExtraBytesMismatch {
                len: point.extra_bytes.len(),
                expected: self.len_bytes(),
            }
        })?;
        Ok(read_value(dimension.data_type, bytes))
    }

    /// Writes the named dimension's value into a point's extra bytes.
    ///
    /// The point's extra bytes are zero-extended to the layout's width if
    /// they're too short. Returns [Error::UndeclaredField] for undeclared
    /// names and [Error::ValueOutOfRange] for values the dimension's storage
    /// type can't hold.
    pub fn set_value(&self, name: &str, point: &mut Point, value: f64) -> Result<()> {
        let (offset, dimension) = self.locate(name)?;
        if !dimension.data_type.holds(value) {
            return Err(Error::ValueOutOfRange {
                name: name.to_string(),
                value,
            });
        }
        let len_bytes = self.len_bytes();
        if point.extra_bytes.len() < len_bytes {
            point.extra_bytes.resize(len_bytes, 0);
        }
        let end = offset + dimension.data_type.len();
        write_value(dimension.data_type, value, &mut point.extra_bytes[offset..end]);
        Ok(())
    }

    fn locate(&self, name: &str) -> Result<(usize, &ExtraDimension)> {
        let mut offset = 0;
        for dimension in &self.dimensions {
            if dimension.name == name {
                return Ok((offset, dimension));
            }
            offset += dimension.data_type.len();
        }
        Err(Error::UndeclaredField(name.to_string()))
    }

    pub(crate) fn to_vlr(&self) -> Result<Vlr> {
        use crate::utils::FromLasStr;

        let mut data = Vec::with_capacity(self.dimensions.len() * DESCRIPTOR_SIZE);
        for dimension in &self.dimensions {
            let mut descriptor = [0u8; DESCRIPTOR_SIZE];
            descriptor[2] = dimension.data_type.to_u8();
            let mut name = [0; 32];
            name.as_mut().from_las_str(&dimension.name)?;
            descriptor[4..36].copy_from_slice(&name);
            let mut description = [0; 32];
            description.as_mut().from_las_str(&dimension.description)?;
            descriptor[160..192].copy_from_slice(&description);
            data.extend_from_slice(&descriptor);
        }
        Ok(Vlr {
            user_id: USER_ID.to_string(),
            record_id: RECORD_ID,
            description: "Extra dimensions".to_string(),
            data,
            is_extended: false,
        })
    }

    pub(crate) fn from_vlr_data(data: &[u8]) -> Result<Schema> {
        use crate::utils::AsLasStr;

        let mut schema = Schema::default();
        for descriptor in data.chunks_exact(DESCRIPTOR_SIZE) {
            let name = descriptor[4..36].as_ref().as_las_str()?.to_string();
            let description = descriptor[160..192].as_ref().as_las_str()?.to_string();
            let Some(data_type) = DataType::from_u8(descriptor[2]) else {
                warn!(
                    "skipping extra dimension {} with unsupported data type {}",
                    name, descriptor[2]
                );
                continue;
            };
            schema.declare_with_description(&name, data_type, &description)?;
        }
        if data.len() % DESCRIPTOR_SIZE != 0 {
            warn!(
                "the extra bytes vlr has {} trailing byte(s), ignoring them",
                data.len() % DESCRIPTOR_SIZE
            );
        }
        Ok(schema)
    }
}

fn read_value(data_type: DataType, bytes: &[u8]) -> f64 {
    match data_type {
        DataType::U8 => f64::from(bytes[0]),
        DataType::I8 => f64::from(bytes[0] as i8),
        DataType::U16 => f64::from(u16::from_le_bytes([bytes[0], bytes[1]])),
        DataType::I16 => f64::from(i16::from_le_bytes([bytes[0], bytes[1]])),
        DataType::U32 => f64::from(u32::from_le_bytes(bytes.try_into().unwrap_or_default())),
        DataType::I32 => f64::from(i32::from_le_bytes(bytes.try_into().unwrap_or_default())),
        DataType::U64 => u64::from_le_bytes(bytes.try_into().unwrap_or_default()) as f64,
        DataType::I64 => i64::from_le_bytes(bytes.try_into().unwrap_or_default()) as f64,
        DataType::F32 => f64::from(f32::from_le_bytes(bytes.try_into().unwrap_or_default())),
        DataType::F64 => f64::from_le_bytes(bytes.try_into().unwrap_or_default()),
    }
}

fn write_value(data_type: DataType, value: f64, bytes: &mut [u8]) {
    match data_type {
        DataType::U8 => bytes[0] = value as u8,
        DataType::I8 => bytes[0] = (value as i8) as u8,
        DataType::U16 => bytes.copy_from_slice(&(value as u16).to_le_bytes()),
        DataType::I16 => bytes.copy_from_slice(&(value as i16).to_le_bytes()),
        DataType::U32 => bytes.copy_from_slice(&(value as u32).to_le_bytes()),
        DataType::I32 => bytes.copy_from_slice(&(value as i32).to_le_bytes()),
        DataType::U64 => bytes.copy_from_slice(&(value as u64).to_le_bytes()),
        DataType::I64 => bytes.copy_from_slice(&(value as i64).to_le_bytes()),
        DataType::F32 => bytes.copy_from_slice(&(value as f32).to_le_bytes()),
        DataType::F64 => bytes.copy_from_slice(&value.to_le_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confidence_schema() -> Schema {
        let mut schema = Schema::default();
        schema
            .declare_with_description("confidence", DataType::U8, "Confidence levels")
            .unwrap();
        schema
    }

    #[test]
    fn duplicate_field() {
        let mut schema = confidence_schema();
        assert!(matches!(
            schema.declare("confidence", DataType::U16),
            Err(Error::DuplicateField(_))
        ));
        assert_eq!(1, schema.len());
    }

    #[test]
    fn undeclared_field() {
        let schema = confidence_schema();
        let mut point = Point::default();
        assert!(matches!(
            schema.set_value("classification", &mut point, 2.),
            Err(Error::UndeclaredField(_))
        ));
        assert!(matches!(
            schema.value_of("classification", &point),
            Err(Error::UndeclaredField(_))
        ));
    }

    #[test]
    fn value_roundtrip() {
        let schema = confidence_schema();
        let mut point = Point::default();
        schema.set_value("confidence", &mut point, 255.).unwrap();
        assert_eq!(255., schema.value_of("confidence", &point).unwrap());
    }

    #[test]
    fn value_out_of_range() {
        let schema = confidence_schema();
        let mut point = Point::default();
        assert!(matches!(
            schema.set_value("confidence", &mut point, 256.),
            Err(Error::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            schema.set_value("confidence", &mut point, -1.),
            Err(Error::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            schema.set_value("confidence", &mut point, 0.5),
            Err(Error::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn layout_offsets() {
        let mut schema = Schema::default();
        schema.declare("confidence", DataType::U8).unwrap();
        schema.declare("range", DataType::F64).unwrap();
        assert_eq!(9, schema.len_bytes());

        let mut point = Point::default();
        schema.set_value("range", &mut point, 2.5).unwrap();
        schema.set_value("confidence", &mut point, 7.).unwrap();
        assert_eq!(9, point.extra_bytes.len());
        assert_eq!(2.5, schema.value_of("range", &point).unwrap());
        assert_eq!(7., schema.value_of("confidence", &point).unwrap());
    }

    #[test]
    fn vlr_roundtrip() {
        let mut schema = Schema::default();
        schema
            .declare_with_description("confidence", DataType::U8, "Confidence levels")
            .unwrap();
        schema.declare("range", DataType::F32).unwrap();
        let vlr = schema.to_vlr().unwrap();
        assert!(vlr.is_extra_bytes());
        assert_eq!(384, vlr.data.len());
        assert_eq!(schema, Schema::from_vlr_data(&vlr.data).unwrap());
    }
}
