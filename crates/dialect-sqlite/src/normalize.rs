use dbsync_core::{Column, DataType};

/// Declared types whose names are not the standard SQL spelling.
const TYPE_ALIASES: [(&str, DataType); 12] = [
    ("INT", DataType::Integer),
    ("INT2", DataType::SmallInt),
    ("INT8", DataType::BigInt),
    ("MEDIUMINT", DataType::Integer),
    ("TEXT", DataType::LongVarchar),
    ("CHARACTER", DataType::Char),
    ("VARYING CHARACTER", DataType::Varchar),
    ("NATIVE CHARACTER", DataType::NChar),
    ("DOUBLE PRECISION", DataType::Double),
    ("BOOL", DataType::Boolean),
    ("DATETIME", DataType::Timestamp),
    ("NTEXT", DataType::LongNVarchar),
];

pub(crate) fn type_name(column: &Column) -> String {
    let base = match column.data_type {
        DataType::LongVarchar => "TEXT",
        other => other.sql_name(),
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

/// A declared column type such as `VARCHAR(40)` or `decimal(10, 2)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeclaredType {
    pub(crate) data_type: DataType,
    pub(crate) length: Option<u32>,
    pub(crate) precision: Option<u32>,
    pub(crate) scale: Option<u32>,
}

pub(crate) fn parse_declared_type(declared: &str) -> DeclaredType {
    let declared = declared.trim();
    let (name, arguments) = match declared.split_once('(') {
        Some((name, rest)) => (name.trim(), rest.trim_end_matches(')')),
        None => (declared, ""),
    };
    let upper = name.to_ascii_uppercase();
    let data_type = DataType::from_sql_name(&upper)
        .or_else(|| {
            TYPE_ALIASES
                .iter()
                .find(|(alias, _)| *alias == upper)
                .map(|(_, data_type)| *data_type)
        })
        .unwrap_or(DataType::Other);

    let mut numbers = arguments
        .split(',')
        .filter_map(|argument| argument.trim().parse::<u32>().ok());
    let first = numbers.next();
    let second = numbers.next();

    let mut parsed = DeclaredType {
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
