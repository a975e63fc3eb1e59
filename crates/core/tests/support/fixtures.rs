use dbsync_core::{Column, DataMap, DataType, QualifiedName, Relationship, Table};

#[allow(dead_code)]
pub fn artist() -> Table {
    Table::named("ARTIST")
        .with_column(Column::new("ARTIST_ID", DataType::Integer).primary_key())
        .with_column(Column::new("ARTIST_NAME", DataType::Varchar).with_length(254).mandatory())
        .with_column(Column::new("DATE_OF_BIRTH", DataType::Date))
}

#[allow(dead_code)]
pub fn painting() -> Table {
    Table::named("PAINTING")
        .with_column(Column::new("PAINTING_ID", DataType::Integer).primary_key())
        .with_column(Column::new("ARTIST_ID", DataType::Integer))
        .with_column(Column::new("PAINTING_TITLE", DataType::Varchar).with_length(255).mandatory())
}

#[allow(dead_code)]
pub fn painting_to_artist() -> Relationship {
    Relationship::new("toArtist", QualifiedName::new("ARTIST")).join("ARTIST_ID", "ARTIST_ID")
}

#[allow(dead_code)]
pub fn artist_to_paintings() -> Relationship {
    Relationship::new("paintingArray", QualifiedName::new("PAINTING"))
        .join("ARTIST_ID", "ARTIST_ID")
        .to_many()
}

/// ARTIST and PAINTING with the relationship in both directions.
#[allow(dead_code)]
pub fn gallery() -> DataMap {
    DataMap::new()
        .with_table(artist().with_relationship(artist_to_paintings()))
        .with_table(painting().with_relationship(painting_to_artist()))
}
