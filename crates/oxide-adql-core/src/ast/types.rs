//! Target types for CAST.

use core::fmt;

/// ADQL data types accepted by CAST.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DataType {
    // Integer types
    Smallint,
    Integer,
    Bigint,

    // Floating point
    Real,
    /// DOUBLE PRECISION.
    Double,

    // String types
    /// Fixed-length character string.
    Char(Option<u32>),
    /// Variable-length character string.
    Varchar(Option<u32>),

    Timestamp,

    // Geometry types
    Point,
    Circle,
    Polygon,
}

impl DataType {
    /// Returns the ADQL representation of the data type.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Smallint => String::from("SMALLINT"),
            Self::Integer => String::from("INTEGER"),
            Self::Bigint => String::from("BIGINT"),
            Self::Real => String::from("REAL"),
            Self::Double => String::from("DOUBLE PRECISION"),
            Self::Char(len) => match len {
                Some(n) => format!("CHAR({n})"),
                None => String::from("CHAR"),
            },
            Self::Varchar(len) => match len {
                Some(n) => format!("VARCHAR({n})"),
                None => String::from("VARCHAR"),
            },
            Self::Timestamp => String::from("TIMESTAMP"),
            Self::Point => String::from("POINT"),
            Self::Circle => String::from("CIRCLE"),
            Self::Polygon => String::from("POLYGON"),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_to_sql() {
        assert_eq!(DataType::Integer.to_sql(), "INTEGER");
        assert_eq!(DataType::Double.to_sql(), "DOUBLE PRECISION");
        assert_eq!(DataType::Varchar(Some(64)).to_sql(), "VARCHAR(64)");
        assert_eq!(DataType::Char(None).to_string(), "CHAR");
    }
}
