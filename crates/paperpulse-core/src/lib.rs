pub mod clean;
pub mod config;
pub mod records;
pub mod schema;
pub mod table;

pub use clean::{clean_papers, clean_title};
pub use config::{ConfigError, ConfigFile, PipelineConfig, ScoringConfig};
pub use records::{
    Conference, ConferenceYearCount, HotKeyword, KeywordCount, PaperRecord, RawPaper,
};
pub use schema::tables;
pub use table::TableError;
