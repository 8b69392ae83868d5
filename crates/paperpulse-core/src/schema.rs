/// Arrow schema definitions for the pipeline's tables.
///
/// Column names are the external interface: downstream plotting reads these
/// tables by name, so keep them stable.
pub mod tables {
    use arrow::datatypes::{DataType, Field, Schema};

    pub const TITLE: &str = "title";
    pub const AUTHORS: &str = "authors";
    pub const YEAR: &str = "year";
    pub const CONFERENCE: &str = "conference";
    pub const DOI_LINK: &str = "doi_link";
    pub const DBLP_LINK: &str = "dblp_link";
    pub const FILTERED_PHRASES: &str = "filtered_phrases";
    pub const COUNT: &str = "count";
    pub const KEYWORD: &str = "keyword";
    pub const HOT_INDEX: &str = "hot_index";

    /// Schema for cleaned paper titles.
    pub fn papers_schema() -> Schema {
        Schema::new(vec![
            Field::new(TITLE, DataType::Utf8, false),
            Field::new(YEAR, DataType::Int64, false),
            Field::new(CONFERENCE, DataType::Utf8, false),
        ])
    }

    /// Schema for per-(conference, year) canonical phrase counts.
    pub fn keyword_counts_schema() -> Schema {
        Schema::new(vec![
            Field::new(CONFERENCE, DataType::Utf8, false),
            Field::new(YEAR, DataType::Int64, false),
            Field::new(FILTERED_PHRASES, DataType::Utf8, false),
            Field::new(COUNT, DataType::Int64, false),
        ])
    }

    /// Schema for the ranked hot keyword table.
    pub fn hot_keywords_schema() -> Schema {
        Schema::new(vec![
            Field::new(CONFERENCE, DataType::Utf8, false),
            Field::new(KEYWORD, DataType::Utf8, false),
            Field::new(HOT_INDEX, DataType::Float64, false),
        ])
    }

    /// Schema for observed and forecast paper counts.
    pub fn paper_counts_schema() -> Schema {
        Schema::new(vec![
            Field::new(CONFERENCE, DataType::Utf8, false),
            Field::new(YEAR, DataType::Int64, false),
            Field::new(COUNT, DataType::Int64, false),
        ])
    }
}
