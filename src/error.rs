use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("prediction serialisation error: {0}")]
    PredictionSerialisation(#[from] ciborium::ser::Error<std::io::Error>),

    #[error("could not build the prediction thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("the context length k must be at least 1")]
    ContextLengthZero,

    #[error("the prediction count n must be at least 1")]
    PredictionCountZero,

    #[error("the model was already trained, create a fresh model for each corpus")]
    AlreadyTrained,

    #[error("sequence id {0} has no entry in the lookup table")]
    UnknownSequenceId(usize),

    #[error("the sequence input {0} is expected to start with a header line but is empty")]
    MissingHeader(String),
}
