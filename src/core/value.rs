/// Value Model Module
///
/// Raw database values, storage-kind hints and the conversion traits the
/// binding engine uses to move values between members and the database.
use crate::core::{DbAutoFillError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A raw value as stored by the database.
///
/// `Null` doubles as the explicit "no value" marker for outbound parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DbValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl DbValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DbValue::Null)
    }

    /// Name of the storage class, used in conversion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            DbValue::Null => "NULL",
            DbValue::Integer(_) => "INTEGER",
            DbValue::Real(_) => "REAL",
            DbValue::Text(_) => "TEXT",
            DbValue::Blob(_) => "BLOB",
        }
    }

    /// Re-encodes the value for an explicit storage-kind hint.
    ///
    /// `Null` is never touched; kinds with no distinct representation keep
    /// the value as it is.
    pub fn with_kind(self, kind: DbType) -> Result<DbValue> {
        if self.is_null() {
            return Ok(self);
        }

        let value = match kind {
            DbType::Boolean => DbValue::Integer(bool::from_db_value(&self)? as i64),
            DbType::Byte => DbValue::Integer(u8::from_db_value(&self)? as i64),
            DbType::SByte => DbValue::Integer(i8::from_db_value(&self)? as i64),
            DbType::Int16 => DbValue::Integer(i16::from_db_value(&self)? as i64),
            DbType::Int32 => DbValue::Integer(i32::from_db_value(&self)? as i64),
            DbType::Int64 => DbValue::Integer(i64::from_db_value(&self)?),
            DbType::Single => DbValue::Real(f32::from_db_value(&self)? as f64),
            DbType::Double | DbType::Decimal | DbType::Currency => {
                DbValue::Real(f64::from_db_value(&self)?)
            }
            DbType::String
            | DbType::AnsiString
            | DbType::StringFixedLength
            | DbType::AnsiStringFixedLength
            | DbType::Xml => DbValue::Text(String::from_db_value(&self)?),
            DbType::Binary => DbValue::Blob(Vec::<u8>::from_db_value(&self)?),
            DbType::Guid => DbValue::Text(Uuid::from_db_value(&self)?.hyphenated().to_string()),
            DbType::Date
            | DbType::DateTime
            | DbType::DateTime2
            | DbType::DateTimeOffset
            | DbType::Time
            | DbType::Object => self,
        };

        Ok(value)
    }
}

/// String form of a raw value, as handed to custom types and identifier parsing.
impl fmt::Display for DbValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbValue::Null => Ok(()),
            DbValue::Integer(i) => write!(f, "{}", i),
            DbValue::Real(r) => write!(f, "{}", r),
            DbValue::Text(t) => f.write_str(t),
            DbValue::Blob(b) => {
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

impl From<rusqlite::types::ValueRef<'_>> for DbValue {
    fn from(value: rusqlite::types::ValueRef<'_>) -> Self {
        use rusqlite::types::ValueRef;
        match value {
            ValueRef::Null => DbValue::Null,
            ValueRef::Integer(i) => DbValue::Integer(i),
            ValueRef::Real(r) => DbValue::Real(r),
            ValueRef::Text(t) => match std::str::from_utf8(t) {
                Ok(text) => DbValue::Text(text.to_string()),
                // Invalid UTF-8 stays as raw bytes
                Err(_) => DbValue::Blob(t.to_vec()),
            },
            ValueRef::Blob(b) => DbValue::Blob(b.to_vec()),
        }
    }
}

impl rusqlite::ToSql for DbValue {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        use rusqlite::types::{ToSqlOutput, ValueRef};
        Ok(match self {
            DbValue::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            DbValue::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            DbValue::Real(r) => ToSqlOutput::Borrowed(ValueRef::Real(*r)),
            DbValue::Text(t) => ToSqlOutput::Borrowed(ValueRef::Text(t.as_bytes())),
            DbValue::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

/// Storage-kind hint attached to an outbound parameter so the provider can
/// pick an exact wire representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbType {
    AnsiString,
    AnsiStringFixedLength,
    Binary,
    Boolean,
    Byte,
    SByte,
    Currency,
    Date,
    DateTime,
    DateTime2,
    DateTimeOffset,
    Decimal,
    Double,
    Guid,
    Int16,
    Int32,
    Int64,
    Object,
    Single,
    String,
    StringFixedLength,
    Time,
    Xml,
}

/// Outbound conversion: member value to a raw database value.
pub trait ToDbValue {
    fn to_db_value(&self) -> DbValue;
}

/// Inbound conversion: raw database value to a member value.
///
/// `Default` supplies the value a member takes when its column is NULL.
pub trait FromDbValue: Sized + Default {
    fn from_db_value(value: &DbValue) -> Result<Self>;
}

impl ToDbValue for DbValue {
    fn to_db_value(&self) -> DbValue {
        self.clone()
    }
}

impl Default for DbValue {
    fn default() -> Self {
        DbValue::Null
    }
}

impl FromDbValue for DbValue {
    fn from_db_value(value: &DbValue) -> Result<Self> {
        Ok(value.clone())
    }
}

impl<T: ToDbValue> ToDbValue for Option<T> {
    fn to_db_value(&self) -> DbValue {
        match self {
            Some(v) => v.to_db_value(),
            None => DbValue::Null,
        }
    }
}

impl<T: FromDbValue> FromDbValue for Option<T> {
    fn from_db_value(value: &DbValue) -> Result<Self> {
        match value {
            DbValue::Null => Ok(None),
            other => T::from_db_value(other).map(Some),
        }
    }
}

fn unsupported<T>(value: &DbValue, target: &str) -> Result<T> {
    Err(DbAutoFillError::conversion(
        value,
        target,
        format!("unsupported conversion from {}", value.type_name()),
    ))
}

macro_rules! integer_conversions {
    ($($t:ty),*) => {$(
        impl ToDbValue for $t {
            fn to_db_value(&self) -> DbValue {
                DbValue::Integer(*self as i64)
            }
        }

        impl FromDbValue for $t {
            fn from_db_value(value: &DbValue) -> Result<Self> {
                let target = stringify!($t);
                match value {
                    DbValue::Integer(i) => <$t>::try_from(*i)
                        .map_err(|e| DbAutoFillError::conversion(value, target, e)),
                    DbValue::Real(r) => {
                        let rounded = r.round_ties_even();
                        if rounded.is_finite() && rounded >= <$t>::MIN as f64 && rounded < <$t>::MAX as f64 + 1.0 {
                            Ok(rounded as $t)
                        } else {
                            Err(DbAutoFillError::conversion(value, target, "value out of range"))
                        }
                    }
                    DbValue::Text(t) => t
                        .trim()
                        .parse::<$t>()
                        .map_err(|e| DbAutoFillError::conversion(value, target, e)),
                    _ => unsupported(value, target),
                }
            }
        }
    )*};
}

integer_conversions!(i8, i16, i32, i64, u8, u16, u32);

impl ToDbValue for f64 {
    fn to_db_value(&self) -> DbValue {
        DbValue::Real(*self)
    }
}

impl FromDbValue for f64 {
    fn from_db_value(value: &DbValue) -> Result<Self> {
        match value {
            DbValue::Integer(i) => Ok(*i as f64),
            DbValue::Real(r) => Ok(*r),
            DbValue::Text(t) => t
                .trim()
                .parse::<f64>()
                .map_err(|e| DbAutoFillError::conversion(value, "f64", e)),
            _ => unsupported(value, "f64"),
        }
    }
}

impl ToDbValue for f32 {
    fn to_db_value(&self) -> DbValue {
        DbValue::Real(*self as f64)
    }
}

impl FromDbValue for f32 {
    fn from_db_value(value: &DbValue) -> Result<Self> {
        let wide = f64::from_db_value(value)
            .map_err(|_| DbAutoFillError::conversion(value, "f32", "not a number"))?;
        if wide.is_finite() && wide.abs() > f32::MAX as f64 {
            return Err(DbAutoFillError::conversion(value, "f32", "value out of range"));
        }
        Ok(wide as f32)
    }
}

impl ToDbValue for bool {
    fn to_db_value(&self) -> DbValue {
        DbValue::Integer(*self as i64)
    }
}

impl FromDbValue for bool {
    fn from_db_value(value: &DbValue) -> Result<Self> {
        match value {
            DbValue::Integer(i) => Ok(*i != 0),
            DbValue::Real(r) => Ok(*r != 0.0),
            DbValue::Text(t) => match t.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(DbAutoFillError::conversion(value, "bool", "not a boolean literal")),
            },
            _ => unsupported(value, "bool"),
        }
    }
}

impl ToDbValue for String {
    fn to_db_value(&self) -> DbValue {
        DbValue::Text(self.clone())
    }
}

impl ToDbValue for &str {
    fn to_db_value(&self) -> DbValue {
        DbValue::Text(self.to_string())
    }
}

impl FromDbValue for String {
    fn from_db_value(value: &DbValue) -> Result<Self> {
        match value {
            DbValue::Text(t) => Ok(t.clone()),
            DbValue::Integer(_) | DbValue::Real(_) => Ok(value.to_string()),
            DbValue::Blob(b) => String::from_utf8(b.clone())
                .map_err(|e| DbAutoFillError::conversion("<blob>", "String", e)),
            DbValue::Null => unsupported(value, "String"),
        }
    }
}

impl ToDbValue for Vec<u8> {
    fn to_db_value(&self) -> DbValue {
        DbValue::Blob(self.clone())
    }
}

impl FromDbValue for Vec<u8> {
    fn from_db_value(value: &DbValue) -> Result<Self> {
        match value {
            DbValue::Blob(b) => Ok(b.clone()),
            DbValue::Text(t) => Ok(t.as_bytes().to_vec()),
            _ => unsupported(value, "Vec<u8>"),
        }
    }
}

impl ToDbValue for Uuid {
    fn to_db_value(&self) -> DbValue {
        DbValue::Text(self.hyphenated().to_string())
    }
}

impl FromDbValue for Uuid {
    fn from_db_value(value: &DbValue) -> Result<Self> {
        match value {
            DbValue::Blob(b) if b.len() == 16 => {
                Uuid::from_slice(b).map_err(|e| DbAutoFillError::conversion(value, "Uuid", e))
            }
            DbValue::Null => unsupported(value, "Uuid"),
            _ => Uuid::parse_str(value.to_string().trim())
                .map_err(|e| DbAutoFillError::conversion(value, "Uuid", e)),
        }
    }
}

impl ToDbValue for NaiveDateTime {
    fn to_db_value(&self) -> DbValue {
        DbValue::Text(self.format("%Y-%m-%d %H:%M:%S%.f").to_string())
    }
}

impl FromDbValue for NaiveDateTime {
    fn from_db_value(value: &DbValue) -> Result<Self> {
        match value {
            DbValue::Text(t) => {
                let t = t.trim();
                DATETIME_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(t, fmt).ok())
                    .or_else(|| DateTime::parse_from_rfc3339(t).ok().map(|d| d.naive_utc()))
                    .or_else(|| {
                        NaiveDate::parse_from_str(t, "%Y-%m-%d")
                            .ok()
                            .and_then(|d| d.and_hms_opt(0, 0, 0))
                    })
                    .ok_or_else(|| DbAutoFillError::conversion(value, "NaiveDateTime", "unrecognized format"))
            }
            DbValue::Integer(secs) => DateTime::from_timestamp(*secs, 0)
                .map(|d| d.naive_utc())
                .ok_or_else(|| DbAutoFillError::conversion(value, "NaiveDateTime", "timestamp out of range")),
            _ => unsupported(value, "NaiveDateTime"),
        }
    }
}

impl ToDbValue for DateTime<Utc> {
    fn to_db_value(&self) -> DbValue {
        DbValue::Text(self.to_rfc3339())
    }
}

impl FromDbValue for DateTime<Utc> {
    fn from_db_value(value: &DbValue) -> Result<Self> {
        if let DbValue::Text(t) = value {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(t.trim()) {
                return Ok(parsed.with_timezone(&Utc));
            }
        }
        NaiveDateTime::from_db_value(value)
            .map(|naive| naive.and_utc())
            .map_err(|_| DbAutoFillError::conversion(value, "DateTime<Utc>", "unrecognized format"))
    }
}

impl ToDbValue for NaiveDate {
    fn to_db_value(&self) -> DbValue {
        DbValue::Text(self.format("%Y-%m-%d").to_string())
    }
}

impl FromDbValue for NaiveDate {
    fn from_db_value(value: &DbValue) -> Result<Self> {
        match value {
            DbValue::Text(t) => NaiveDate::parse_from_str(t.trim(), "%Y-%m-%d")
                .or_else(|_| NaiveDateTime::from_db_value(value).map(|d| d.date()))
                .map_err(|_| DbAutoFillError::conversion(value, "NaiveDate", "unrecognized format")),
            _ => NaiveDateTime::from_db_value(value).map(|d| d.date()),
        }
    }
}

impl ToDbValue for NaiveTime {
    fn to_db_value(&self) -> DbValue {
        DbValue::Text(self.format("%H:%M:%S%.f").to_string())
    }
}

impl FromDbValue for NaiveTime {
    fn from_db_value(value: &DbValue) -> Result<Self> {
        match value {
            DbValue::Text(t) => NaiveTime::parse_from_str(t.trim(), "%H:%M:%S%.f")
                .or_else(|_| NaiveTime::parse_from_str(t.trim(), "%H:%M"))
                .map_err(|e| DbAutoFillError::conversion(value, "NaiveTime", e)),
            _ => unsupported(value, "NaiveTime"),
        }
    }
}
