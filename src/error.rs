use thiserror::Error;

#[derive(Error, Debug)]
/// Batch error
pub enum BatchError {
    #[error("ItemWriter from: {0}")]
    ItemWriter(String),

    #[error("ItemReader from: {0}")]
    ItemReader(String),

    #[error("ItemProcessor from: {0}")]
    ItemProcessor(String),

    #[error("Step {name} failed: {source}")]
    Step {
        name: String,
        #[source]
        source: Box<BatchError>,
    },

    #[error("Configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors raised while turning CSV records into catalog products, or while
/// validating the files handed to the import workflow.
#[derive(Error, Debug, PartialEq)]
pub enum CatalogError {
    #[error("record has no `{0}` column")]
    MissingField(&'static str),

    #[error("invalid {column} value: {value:?}")]
    InvalidNumber { column: &'static str, value: String },

    #[error("unknown currency code: {0:?}")]
    UnknownCurrency(String),

    #[error("not a csv file: {0}")]
    NotCsvFile(String),
}
