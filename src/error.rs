use thiserror::Error;

/// A single page could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// A GC table row that cannot become a ranked entry. Absorbed by the extractor.
#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("row has {0} cells, need at least 13")]
    TooFewCells(usize),

    #[error("rank cell '{0}' is not a number")]
    BadRank(String),

    #[error("rank {0} already seen")]
    DuplicateRank(u32),
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that end a whole run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("unknown race key '{0}'")]
    UnknownRace(String),

    #[error("stage discovery failed for {slug} {year}: {source}")]
    Discovery {
        slug: String,
        year: i32,
        #[source]
        source: FetchError,
    },

    #[error(transparent)]
    Persist(#[from] PersistError),
}
