use dbsync_core::{Column, DataType};

pub(crate) fn type_name(column: &Column) -> String {
    let base = match column.data_type {
        DataType::Bit | DataType::Boolean => "BIT",
        DataType::TinyInt => "TINYINT",
        DataType::SmallInt => "SMALLINT",
        DataType::Integer => "INT",
        DataType::BigInt => "BIGINT",
        DataType::Float | DataType::Double => "FLOAT",
        DataType::Real => "REAL",
        DataType::Numeric | DataType::Decimal => "DECIMAL",
        DataType::Char => "CHAR",
        DataType::NChar => "NCHAR",
        DataType::Varchar => return sized("VARCHAR", column.length),
        DataType::NVarchar => return sized("NVARCHAR", column.length),
        DataType::LongVarchar | DataType::Clob => "VARCHAR(MAX)",
        DataType::LongNVarchar | DataType::NClob | DataType::Other => "NVARCHAR(MAX)",
        DataType::Date => "DATE",
        DataType::Time => "TIME",
        DataType::Timestamp => "DATETIME2",
        DataType::Binary => "BINARY",
        DataType::VarBinary => return sized("VARBINARY", column.length),
        DataType::LongVarBinary | DataType::Blob => "VARBINARY(MAX)",
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

/// Variable-length types without a length are unbounded.
fn sized(base: &str, length: Option<u32>) -> String {
    match length {
        Some(length) => format!("{base}({length})"),
        None => format!("{base}(MAX)"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnType {
    pub(crate) data_type: DataType,
    pub(crate) length: Option<u32>,
    pub(crate) precision: Option<u32>,
    pub(crate) scale: Option<u32>,
}

/// Maps a `sys.types` name and the `sys.columns` size fields. `max_length`
/// is in bytes and `-1` for `MAX`.
pub(crate) fn parse_sys_type(
    type_name: &str,
    max_length: i32,
    precision: i32,
    scale: i32,
) -> ColumnType {
    let lowered = type_name.trim().to_ascii_lowercase();
    let data_type = match lowered.as_str() {
        "bit" => DataType::Bit,
        "tinyint" => DataType::TinyInt,
        "smallint" => DataType::SmallInt,
        "int" => DataType::Integer,
        "bigint" => DataType::BigInt,
        "float" => DataType::Double,
        "real" => DataType::Real,
        "decimal" | "numeric" => DataType::Decimal,
        "char" => DataType::Char,
        "nchar" => DataType::NChar,
        "varchar" => DataType::Varchar,
        "nvarchar" => DataType::NVarchar,
        "text" => DataType::LongVarchar,
        "ntext" => DataType::LongNVarchar,
        "date" => DataType::Date,
        "time" => DataType::Time,
        "datetime" | "datetime2" | "smalldatetime" => DataType::Timestamp,
        "binary" => DataType::Binary,
        "varbinary" => DataType::VarBinary,
        "image" => DataType::LongVarBinary,
        _ => DataType::Other,
    };

    let mut parsed = ColumnType {
        data_type,
        length: None,
        precision: None,
        scale: None,
    };
    if data_type.uses_length() && max_length > 0 {
        let bytes = u32::try_from(max_length).unwrap_or_default();
        let national = matches!(data_type, DataType::NChar | DataType::NVarchar);
        parsed.length = Some(if national { bytes / 2 } else { bytes });
    } else if data_type.uses_precision() {
        parsed.precision = u32::try_from(precision).ok();
        parsed.scale = u32::try_from(scale).ok();
    }
    parsed
}
