use thiserror::Error;

/// Failures the tracker core can surface. Validation problems are reported
/// before any side effect happens. Absence of data is never one of these:
/// a day nobody logged reads back as an empty day.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("habit name must not be empty")]
    EmptyHabitName,
    #[error("invalid date {input:?}, expected YYYY-MM-DD")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("invalid month {0:?}, expected YYYY-MM")]
    InvalidYearMonth(String),
    #[error("invalid year {0:?}, expected a 4 digit year")]
    InvalidYear(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The filesystem actually failing or a record that can't be encoded.
/// Upserts are single appends, so retrying a failed one is safe.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io failed")]
    Io(#[from] std::io::Error),
    #[error("record encoding failed")]
    Encode(#[from] serde_json::Error),
}
