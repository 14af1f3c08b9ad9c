use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerritoryError {
    #[error("Invalid weight triple ({arr}, {account}, {risk}): components must sum to 100, got {sum}")]
    InvalidWeightTriple {
        arr:     u32,
        account: u32,
        risk:    u32,
        sum:     u32,
    },

    #[error("Rep '{rep}' appears more than once in the roster")]
    DuplicateRep { rep: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{file} is missing required columns: {}", .columns.join(", "))]
    MissingColumns { file: String, columns: Vec<String> },

    #[error("{file} row {row}, column {column}: {message}")]
    InvalidRow {
        file:    String,
        row:     usize,
        column:  String,
        message: String,
    },

    #[error("No {what} found")]
    EmptyDataset { what: String },

    #[error("Account '{id}' appears more than once (rows {rows:?})")]
    DuplicateAccount { id: String, rows: Vec<usize> },
}

pub type TerritoryResult<T> = Result<T, TerritoryError>;
