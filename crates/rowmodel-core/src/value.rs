//! Run-time value model
//!
//! The tag set is closed: every column a store describes is mapped onto one
//! of these tags, and every field value is one of these variants.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::fmt;

use crate::store::Cell;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
pub const TIME_FORMAT: &str = "%H:%M:%S%.f";

/// Declared run-time type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Text,
    Integer,
    Decimal,
    Float,
    Double,
    Date,
    Timestamp,
    Time,
    /// Catch-all for binary and unmapped column types; accepts any value and
    /// holds it as its literal text
    Opaque,
}

impl TypeTag {
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Text => "text",
            TypeTag::Integer => "integer",
            TypeTag::Decimal => "decimal",
            TypeTag::Float => "float",
            TypeTag::Double => "double",
            TypeTag::Date => "date",
            TypeTag::Timestamp => "timestamp",
            TypeTag::Time => "time",
            TypeTag::Opaque => "opaque",
        }
    }

    /// Whether a value of tag `other` may be stored under this declared type
    pub fn accepts(&self, other: TypeTag) -> bool {
        *self == TypeTag::Opaque || *self == other
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i32),
    Decimal(Decimal),
    Float(f32),
    Double(f64),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Time(NaiveTime),
    Opaque(Cell),
}

impl Value {
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Text(_) => TypeTag::Text,
            Value::Integer(_) => TypeTag::Integer,
            Value::Decimal(_) => TypeTag::Decimal,
            Value::Float(_) => TypeTag::Float,
            Value::Double(_) => TypeTag::Double,
            Value::Date(_) => TypeTag::Date,
            Value::Timestamp(_) => TypeTag::Timestamp,
            Value::Time(_) => TypeTag::Time,
            Value::Opaque(_) => TypeTag::Opaque,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// The SQL-literal text used when this value is written to the store
    pub fn to_literal(&self) -> String {
        self.to_string()
    }
}

/// Renders the literal text written between quotes in rendered SQL
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Float(x) => write!(f, "{}", x),
            Value::Double(x) => write!(f, "{}", x),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
            Value::Time(t) => write!(f, "{}", t.format(TIME_FORMAT)),
            Value::Opaque(cell) => match cell {
                Cell::Null => f.write_str("NULL"),
                Cell::Integer(i) => write!(f, "{}", i),
                Cell::Real(x) => write!(f, "{}", x),
                Cell::Text(s) => f.write_str(s),
                Cell::Blob(bytes) => f.write_str(&hex::encode(bytes)),
            },
        }
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Time(v)
    }
}

impl From<Cell> for Value {
    fn from(v: Cell) -> Self {
        Value::Opaque(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_opaque_accepts_every_tag() {
        for tag in [TypeTag::Text, TypeTag::Integer, TypeTag::Date, TypeTag::Opaque] {
            assert!(TypeTag::Opaque.accepts(tag));
        }
        assert!(!TypeTag::Integer.accepts(TypeTag::Text));
        assert!(TypeTag::Integer.accepts(TypeTag::Integer));
    }

    #[test]
    fn test_literal_formats() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let ts = date.and_hms_opt(8, 30, 0).unwrap();
        let time = NaiveTime::from_hms_opt(23, 5, 1).unwrap();

        assert_eq!(Value::from(date).to_literal(), "2024-03-09");
        assert_eq!(Value::from(ts).to_literal(), "2024-03-09 08:30:00");
        assert_eq!(Value::from(time).to_literal(), "23:05:01");
        assert_eq!(Value::from(12345).to_literal(), "12345");
        assert_eq!(
            Value::from(Decimal::from_str("12.50").unwrap()).to_literal(),
            "12.50"
        );
        assert_eq!(Value::from(1.5f32).to_literal(), "1.5");
        assert_eq!(Value::Opaque(Cell::Blob(vec![0xde, 0xad])).to_literal(), "dead");
    }

    #[test]
    fn test_tag_follows_variant() {
        assert_eq!(Value::from("x").tag(), TypeTag::Text);
        assert_eq!(Value::from(2.0f64).tag(), TypeTag::Double);
        assert_eq!(Value::from(Cell::Integer(1)).tag(), TypeTag::Opaque);
    }
}
