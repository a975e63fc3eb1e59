use dbsync_core::{Column, DataType};

const DEFAULT_VARCHAR_LENGTH: u32 = 255;

pub(crate) fn type_name(column: &Column) -> String {
    let base = match column.data_type {
        DataType::Bit | DataType::Boolean => "BOOLEAN",
        DataType::TinyInt => "TINYINT",
        DataType::SmallInt => "SMALLINT",
        DataType::Integer => "INT",
        DataType::BigInt => "BIGINT",
        DataType::Float => "FLOAT",
        DataType::Double | DataType::Real => "DOUBLE",
        DataType::Numeric | DataType::Decimal => "DECIMAL",
        DataType::Char | DataType::NChar => "CHAR",
        DataType::Varchar | DataType::NVarchar => {
            let length = column.length.unwrap_or(DEFAULT_VARCHAR_LENGTH);
            return format!("VARCHAR({length})");
        }
        DataType::LongVarchar | DataType::LongNVarchar => "MEDIUMTEXT",
        DataType::Clob | DataType::NClob | DataType::Other => "LONGTEXT",
        DataType::Date => "DATE",
        DataType::Time => "TIME",
        DataType::Timestamp => "DATETIME",
        DataType::Binary => "BINARY",
        DataType::VarBinary => "VARBINARY",
        DataType::LongVarBinary => "MEDIUMBLOB",
        DataType::Blob => "LONGBLOB",
    };

    if column.data_type.uses_length()
        && let Some(length) = column.length
    {
        return format!("{base}({length})");
    }
    if column.data_type.uses_precision()
        && let Some(precision) = column.precision
    {
        return format!("{base}({precision},{})", column.scale.unwrap_or(0));
    }
    base.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnType {
    pub(crate) data_type: DataType,
    pub(crate) length: Option<u32>,
    pub(crate) precision: Option<u32>,
    pub(crate) scale: Option<u32>,
}

/// Parses `information_schema.COLUMNS.COLUMN_TYPE`, e.g. `varchar(254)` or
/// `int unsigned`. Integer display widths are ignored except `tinyint(1)`.
pub(crate) fn parse_column_type(column_type: &str) -> ColumnType {
    let lowered = column_type.trim().to_ascii_lowercase();
    let (name, arguments) = match lowered.split_once('(') {
        Some((name, rest)) => (
            name.trim().to_string(),
            rest.split_once(')').map_or(rest, |(arguments, _)| arguments),
        ),
        None => (
            lowered.split_whitespace().next().unwrap_or_default().to_string(),
            "",
        ),
    };

    let mut numbers = arguments
        .split(',')
        .filter_map(|argument| argument.trim().parse::<u32>().ok());
    let first = numbers.next();
    let second = numbers.next();

    let data_type = match name.as_str() {
        "tinyint" if first == Some(1) => DataType::Boolean,
        "bool" | "boolean" => DataType::Boolean,
        "bit" => DataType::Bit,
        "tinyint" => DataType::TinyInt,
        "smallint" => DataType::SmallInt,
        "mediumint" | "int" | "integer" => DataType::Integer,
        "bigint" => DataType::BigInt,
        "float" => DataType::Float,
        "double" | "real" => DataType::Double,
        "decimal" | "numeric" => DataType::Decimal,
        "char" => DataType::Char,
        "varchar" => DataType::Varchar,
        "tinytext" | "text" | "mediumtext" => DataType::LongVarchar,
        "longtext" => DataType::Clob,
        "date" => DataType::Date,
        "time" => DataType::Time,
        "datetime" | "timestamp" => DataType::Timestamp,
        "binary" => DataType::Binary,
        "varbinary" => DataType::VarBinary,
        "tinyblob" | "blob" | "mediumblob" => DataType::LongVarBinary,
        "longblob" => DataType::Blob,
        _ => DataType::Other,
    };

    let mut parsed = ColumnType {
        data_type,
        length: None,
        precision: None,
        scale: None,
    };
    if data_type.uses_length() {
        parsed.length = first;
    } else if data_type.uses_precision() {
        parsed.precision = first;
        parsed.scale = first.map(|_| second.unwrap_or(0));
    }
    parsed
}
