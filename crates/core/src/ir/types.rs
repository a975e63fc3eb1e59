use std::fmt;

/// Column types, numbered like `java.sql.Types` so that type codes read from
/// driver metadata map onto them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    LongVarchar,
    NChar,
    NVarchar,
    LongNVarchar,
    Clob,
    NClob,
    Date,
    Time,
    Timestamp,
    Binary,
    VarBinary,
    LongVarBinary,
    Blob,
    Boolean,
    Other,
}

const TYPE_CODES: [(DataType, i32, &str); 27] = [
    (DataType::Bit, -7, "BIT"),
    (DataType::TinyInt, -6, "TINYINT"),
    (DataType::SmallInt, 5, "SMALLINT"),
    (DataType::Integer, 4, "INTEGER"),
    (DataType::BigInt, -5, "BIGINT"),
    (DataType::Float, 6, "FLOAT"),
    (DataType::Real, 7, "REAL"),
    (DataType::Double, 8, "DOUBLE"),
    (DataType::Numeric, 2, "NUMERIC"),
    (DataType::Decimal, 3, "DECIMAL"),
    (DataType::Char, 1, "CHAR"),
    (DataType::Varchar, 12, "VARCHAR"),
    (DataType::LongVarchar, -1, "LONGVARCHAR"),
    (DataType::NChar, -15, "NCHAR"),
    (DataType::NVarchar, -9, "NVARCHAR"),
    (DataType::LongNVarchar, -16, "LONGNVARCHAR"),
    (DataType::Clob, 2005, "CLOB"),
    (DataType::NClob, 2011, "NCLOB"),
    (DataType::Date, 91, "DATE"),
    (DataType::Time, 92, "TIME"),
    (DataType::Timestamp, 93, "TIMESTAMP"),
    (DataType::Binary, -2, "BINARY"),
    (DataType::VarBinary, -3, "VARBINARY"),
    (DataType::LongVarBinary, -4, "LONGVARBINARY"),
    (DataType::Blob, 2004, "BLOB"),
    (DataType::Boolean, 16, "BOOLEAN"),
    (DataType::Other, 1111, "OTHER"),
];

impl DataType {
    pub fn code(self) -> i32 {
        TYPE_CODES
            .iter()
            .find(|(data_type, _, _)| *data_type == self)
            .map_or(1111, |(_, code, _)| *code)
    }

    pub fn from_code(code: i32) -> Option<Self> {
        TYPE_CODES
            .iter()
            .find(|(_, candidate, _)| *candidate == code)
            .map(|(data_type, _, _)| *data_type)
    }

    pub fn sql_name(self) -> &'static str {
        TYPE_CODES
            .iter()
            .find(|(data_type, _, _)| *data_type == self)
            .map_or("OTHER", |(_, _, name)| *name)
    }

    pub fn from_sql_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        TYPE_CODES
            .iter()
            .find(|(_, _, candidate)| *candidate == upper)
            .map(|(data_type, _, _)| *data_type)
    }

    /// Types whose length participates in structural comparison.
    pub fn uses_length(self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::Varchar
                | Self::NChar
                | Self::NVarchar
                | Self::Binary
                | Self::VarBinary
        )
    }

    /// Types whose precision and scale participate in structural comparison.
    pub fn uses_precision(self) -> bool {
        matches!(self, Self::Numeric | Self::Decimal)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Value {
    /// Renders the value as a standard SQL literal.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::String(value) => format!("'{}'", value.replace('\'', "''")),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Bool(true) => "TRUE".to_string(),
            Self::Bool(false) => "FALSE".to_string(),
            Self::Null => "NULL".to_string(),
        }
    }
}
