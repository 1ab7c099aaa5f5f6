use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExploreError {
    #[error("unsupported source `{0}`: only http/https/file are supported")]
    UnsupportedSource(String),

    #[error("source `{0}` returned no data")]
    EmptySource(String),

    #[error("required column `{0}` is missing")]
    MissingColumn(String),
}
