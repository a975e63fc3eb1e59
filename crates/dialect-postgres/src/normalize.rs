use dbsync_core::{Column, DataType};

pub(crate) fn type_name(column: &Column) -> String {
    let base = match column.data_type {
        DataType::Bit | DataType::Boolean => "BOOLEAN",
        DataType::TinyInt | DataType::SmallInt => "SMALLINT",
        DataType::Integer => "INTEGER",
        DataType::BigInt => "BIGINT",
        DataType::Float | DataType::Double => "DOUBLE PRECISION",
        DataType::Real => "REAL",
        DataType::Numeric | DataType::Decimal => "NUMERIC",
        DataType::Char | DataType::NChar => "CHAR",
        DataType::Varchar | DataType::NVarchar => "VARCHAR",
        DataType::LongVarchar
        | DataType::LongNVarchar
        | DataType::Clob
        | DataType::NClob
        | DataType::Other => "TEXT",
        DataType::Date => "DATE",
        DataType::Time => "TIME",
        DataType::Timestamp => "TIMESTAMP",
        DataType::Binary | DataType::VarBinary | DataType::LongVarBinary | DataType::Blob => {
            "BYTEA"
        }
    };

    let character = matches!(
        column.data_type,
        DataType::Char | DataType::NChar | DataType::Varchar | DataType::NVarchar
    );
    if character && let Some(length) = column.length {
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
pub(crate) struct FormattedType {
    pub(crate) data_type: DataType,
    pub(crate) length: Option<u32>,
    pub(crate) precision: Option<u32>,
    pub(crate) scale: Option<u32>,
}

/// Parses `pg_catalog.format_type` output such as `character varying(254)`.
pub(crate) fn parse_formatted_type(formatted: &str) -> FormattedType {
    let formatted = formatted.trim();
    let (name, arguments) = match formatted.split_once('(') {
        Some((name, rest)) => {
            let (arguments, suffix) = rest.split_once(')').unwrap_or((rest, ""));
            (format!("{}{}", name.trim(), suffix), arguments)
        }
        None => (formatted.to_string(), ""),
    };

    let data_type = match name.trim() {
        "smallint" => DataType::SmallInt,
        "integer" => DataType::Integer,
        "bigint" => DataType::BigInt,
        "real" => DataType::Real,
        "double precision" => DataType::Double,
        "numeric" => DataType::Numeric,
        "character varying" => DataType::Varchar,
        "character" => DataType::Char,
        "text" => DataType::LongVarchar,
        "boolean" => DataType::Boolean,
        "date" => DataType::Date,
        "time without time zone" => DataType::Time,
        "timestamp without time zone" => DataType::Timestamp,
        "bytea" => DataType::LongVarBinary,
        _ => DataType::Other,
    };

    let mut numbers = arguments
        .split(',')
        .filter_map(|argument| argument.trim().parse::<u32>().ok());
    let first = numbers.next();
    let second = numbers.next();

    let mut parsed = FormattedType {
        data_type,
        length: None,
        precision: None,
        scale: None,
    };
    match data_type {
        DataType::Varchar | DataType::Char => parsed.length = first,
        DataType::Numeric => {
            parsed.precision = first;
            parsed.scale = first.map(|_| second.unwrap_or(0));
        }
        _ => {}
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatted_types_parse_modifiers() {
        assert_eq!(
            parse_formatted_type("character varying(254)"),
            FormattedType {
                data_type: DataType::Varchar,
                length: Some(254),
                precision: None,
                scale: None,
            }
        );
        assert_eq!(
            parse_formatted_type("numeric(10,2)"),
            FormattedType {
                data_type: DataType::Numeric,
                length: None,
                precision: Some(10),
                scale: Some(2),
            }
        );
        assert_eq!(
            parse_formatted_type("timestamp(3) without time zone").data_type,
            DataType::Timestamp
        );
        assert_eq!(parse_formatted_type("jsonb").data_type, DataType::Other);
    }

    #[test]
    fn rendered_types_read_back_as_the_same_type() {
        let cases = [
            Column::new("A", DataType::Varchar).with_length(40),
            Column::new("A", DataType::Decimal).with_precision(12, 4),
            Column::new("A", DataType::Clob),
            Column::new("A", DataType::Bit),
            Column::new("A", DataType::Blob),
        ];
        for column in cases {
            let parsed = parse_formatted_type(&postgres_spelling(&type_name(&column)));
            let mut loaded = Column::new("A", parsed.data_type);
            loaded.length = parsed.length;
            loaded.precision = parsed.precision;
            loaded.scale = parsed.scale;
            assert_eq!(type_name(&loaded), type_name(&column));
        }
    }

    /// The spelling `format_type` reports for a type we render.
    fn postgres_spelling(rendered: &str) -> String {
        rendered
            .replace("VARCHAR", "character varying")
            .replace("NUMERIC", "numeric")
            .to_ascii_lowercase()
    }
}
