//! Static dispatch tables between store types and run-time values

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::store::{Cell, Row};
use crate::value::{TypeTag, Value, DATE_FORMAT, TIMESTAMP_FORMAT, TIME_FORMAT};

const ISO_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Pulls one typed value out of a row; `None` when the cell is missing,
/// NULL, or cannot be converted to the tag's type
pub type Extractor = fn(&Row, &str) -> Option<Value>;

/// Map a declared native column type onto a type tag
///
/// The declared type is upper-cased and any size/precision suffix is dropped
/// (`varchar(40)` → `VARCHAR`). Unknown and binary types map to `Opaque`.
pub fn native_type_tag(native: &str) -> TypeTag {
    let base = native.split('(').next().unwrap_or_default();
    let normalised = base.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_uppercase();

    match normalised.as_str() {
        "CHAR" | "CHARACTER" | "VARCHAR" | "VARYING CHARACTER" | "NCHAR" | "NATIVE CHARACTER"
        | "NVARCHAR" | "TEXT" | "CLOB" | "LONGVARCHAR" | "LONGNVARCHAR" => TypeTag::Text,
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" => TypeTag::Integer,
        "BIGINT" | "DECIMAL" | "NUMERIC" => TypeTag::Decimal,
        "FLOAT" | "REAL" => TypeTag::Float,
        "DOUBLE" | "DOUBLE PRECISION" => TypeTag::Double,
        "DATE" => TypeTag::Date,
        "TIMESTAMP" | "DATETIME" => TypeTag::Timestamp,
        "TIME" => TypeTag::Time,
        _ => TypeTag::Opaque,
    }
}

/// Row extractor for a type tag
pub fn extractor(tag: TypeTag) -> Extractor {
    match tag {
        TypeTag::Text => extract_text,
        TypeTag::Integer => extract_integer,
        TypeTag::Decimal => extract_decimal,
        TypeTag::Float => extract_float,
        TypeTag::Double => extract_double,
        TypeTag::Date => extract_date,
        TypeTag::Timestamp => extract_timestamp,
        TypeTag::Time => extract_time,
        TypeTag::Opaque => extract_opaque,
    }
}

fn non_null<'a>(row: &'a Row, column: &str) -> Option<&'a Cell> {
    row.get(column).filter(|cell| !cell.is_null())
}

fn extract_text(row: &Row, column: &str) -> Option<Value> {
    let text = match non_null(row, column)? {
        Cell::Text(s) => s.clone(),
        Cell::Integer(i) => i.to_string(),
        Cell::Real(x) => x.to_string(),
        Cell::Blob(bytes) => String::from_utf8(bytes.clone()).ok()?,
        Cell::Null => return None,
    };
    Some(Value::Text(text))
}

fn extract_integer(row: &Row, column: &str) -> Option<Value> {
    let n = match non_null(row, column)? {
        Cell::Integer(i) => i32::try_from(*i).ok()?,
        Cell::Real(x) if x.fract() == 0.0 && *x >= i32::MIN as f64 && *x <= i32::MAX as f64 => {
            *x as i32
        }
        Cell::Text(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    Some(Value::Integer(n))
}

fn extract_decimal(row: &Row, column: &str) -> Option<Value> {
    let d = match non_null(row, column)? {
        Cell::Integer(i) => Decimal::from(*i),
        // Parsed from the shortest round-trip text, not the exact binary value
        Cell::Real(x) => Decimal::from_str(&x.to_string())
            .ok()
            .or_else(|| Decimal::from_f64(*x))?,
        Cell::Text(s) => Decimal::from_str(s.trim()).ok()?,
        _ => return None,
    };
    Some(Value::Decimal(d))
}

fn extract_float(row: &Row, column: &str) -> Option<Value> {
    let x = match non_null(row, column)? {
        Cell::Real(x) => *x as f32,
        Cell::Integer(i) => *i as f32,
        Cell::Text(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    Some(Value::Float(x))
}

fn extract_double(row: &Row, column: &str) -> Option<Value> {
    let x = match non_null(row, column)? {
        Cell::Real(x) => *x,
        Cell::Integer(i) => *i as f64,
        Cell::Text(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    Some(Value::Double(x))
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, ISO_TIMESTAMP_FORMAT))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn extract_date(row: &Row, column: &str) -> Option<Value> {
    let date = match non_null(row, column)? {
        Cell::Text(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .or_else(|| parse_timestamp(s).map(|ts| ts.date()))?
        }
        _ => return None,
    };
    Some(Value::Date(date))
}

fn extract_timestamp(row: &Row, column: &str) -> Option<Value> {
    let ts = match non_null(row, column)? {
        Cell::Text(s) => parse_timestamp(s.trim())?,
        Cell::Integer(secs) => DateTime::from_timestamp(*secs, 0)?.naive_utc(),
        _ => return None,
    };
    Some(Value::Timestamp(ts))
}

fn extract_time(row: &Row, column: &str) -> Option<Value> {
    let time = match non_null(row, column)? {
        Cell::Text(s) => NaiveTime::parse_from_str(s.trim(), TIME_FORMAT).ok()?,
        _ => return None,
    };
    Some(Value::Time(time))
}

/// Any non-NULL cell, as the literal text an Opaque slot writes
fn extract_opaque(row: &Row, column: &str) -> Option<Value> {
    let literal = Value::Opaque(non_null(row, column)?.clone()).to_literal();
    Some(Value::Opaque(Cell::Text(literal)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(column: &str, cell: Cell) -> Row {
        Row::new(vec![(column.to_string(), cell)])
    }

    #[test]
    fn test_native_type_mapping() {
        assert_eq!(native_type_tag("VARCHAR(40)"), TypeTag::Text);
        assert_eq!(native_type_tag("text"), TypeTag::Text);
        assert_eq!(native_type_tag("INTEGER"), TypeTag::Integer);
        assert_eq!(native_type_tag("BIGINT"), TypeTag::Decimal);
        assert_eq!(native_type_tag("decimal(10, 2)"), TypeTag::Decimal);
        assert_eq!(native_type_tag("REAL"), TypeTag::Float);
        assert_eq!(native_type_tag("double  precision"), TypeTag::Double);
        assert_eq!(native_type_tag("DATE"), TypeTag::Date);
        assert_eq!(native_type_tag("DATETIME"), TypeTag::Timestamp);
        assert_eq!(native_type_tag("TIME"), TypeTag::Time);
        assert_eq!(native_type_tag("BLOB"), TypeTag::Opaque);
        assert_eq!(native_type_tag(""), TypeTag::Opaque);
    }

    #[test]
    fn test_malformed_cells_degrade_to_absent() {
        let bad_int = row("n", Cell::Text("not a number".to_string()));
        assert_eq!(extractor(TypeTag::Integer)(&bad_int, "n"), None);

        let overflow = row("n", Cell::Integer(i64::from(i32::MAX) + 1));
        assert_eq!(extractor(TypeTag::Integer)(&overflow, "n"), None);

        let bad_date = row("d", Cell::Text("yesterday".to_string()));
        assert_eq!(extractor(TypeTag::Date)(&bad_date, "d"), None);

        let null = row("s", Cell::Null);
        assert_eq!(extractor(TypeTag::Text)(&null, "s"), None);
        assert_eq!(extractor(TypeTag::Opaque)(&null, "s"), None);
    }

    #[test]
    fn test_missing_column_is_absent() {
        let r = row("status", Cell::Text("active".to_string()));
        assert_eq!(extractor(TypeTag::Text)(&r, "remarks"), None);
    }

    #[test]
    fn test_extractors_convert_store_cells() {
        let r = Row::new(vec![
            ("i".to_string(), Cell::Integer(42)),
            ("d".to_string(), Cell::Real(12.5)),
            ("day".to_string(), Cell::Text("2024-03-09".to_string())),
            ("ts".to_string(), Cell::Text("2024-03-09 08:30:00".to_string())),
            ("t".to_string(), Cell::Text("23:05:01".to_string())),
            ("b".to_string(), Cell::Blob(vec![1, 2])),
        ]);

        assert_eq!(extractor(TypeTag::Integer)(&r, "i"), Some(Value::Integer(42)));
        assert_eq!(extractor(TypeTag::Text)(&r, "i"), Some(Value::from("42")));
        assert_eq!(
            extractor(TypeTag::Decimal)(&r, "d"),
            Some(Value::Decimal(Decimal::from_str("12.5").unwrap()))
        );
        assert_eq!(extractor(TypeTag::Float)(&r, "d"), Some(Value::Float(12.5)));
        assert_eq!(extractor(TypeTag::Double)(&r, "i"), Some(Value::Double(42.0)));
        assert_eq!(
            extractor(TypeTag::Date)(&r, "day"),
            Some(Value::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()))
        );
        assert_eq!(
            extractor(TypeTag::Timestamp)(&r, "ts"),
            Some(Value::Timestamp(
                NaiveDate::from_ymd_opt(2024, 3, 9)
                    .unwrap()
                    .and_hms_opt(8, 30, 0)
                    .unwrap()
            ))
        );
        assert_eq!(
            extractor(TypeTag::Time)(&r, "t"),
            Some(Value::Time(NaiveTime::from_hms_opt(23, 5, 1).unwrap()))
        );
        assert_eq!(
            extractor(TypeTag::Opaque)(&r, "b"),
            Some(Value::Opaque(Cell::Text("0102".to_string())))
        );
        assert_eq!(
            extractor(TypeTag::Opaque)(&r, "i"),
            Some(Value::Opaque(Cell::Text("42".to_string())))
        );
    }
}
