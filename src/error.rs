use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("failed to load configuration")]
    Configuration,
    #[display("failed to open the database")]
    Database,
    #[display("failed to set up article extraction")]
    Extractor,
    #[display("failed to set up fetching")]
    Fetcher,
    #[display("invalid short ID")]
    InvalidShortId,
    /// An ingestion failure, carrying its HTTP-style status.
    #[display("request failed ({_0})")]
    Ingest(#[error(not(source))] u16),
}

impl ErrorKind {
    /// Process exit status: `2` for bad input, `3` for unknown records.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidShortId | Self::Ingest(400) => 2,
            Self::Ingest(404) => 3,
            _ => 1,
        }
    }
}
