use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed committee column: {0}")]
    Committee(#[from] serde_json::Error),
    #[error("malformed timestamp '{0}'")]
    Timestamp(String),
    #[error("{table} CSV is missing column '{column}'")]
    MissingColumn { table: &'static str, column: &'static str },
    #[error("history record {0} not found")]
    HistoryNotFound(i64),
}
