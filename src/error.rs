use {
    thiserror::Error,
    crate::attack_orderings::OrderingKey,
};

#[derive(Debug, Error)]
pub enum SirError {
    #[error("unable to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid network file {path}, line {line}: {reason}")]
    NetworkFormat {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("graph operation failed: {0}")]
    Graph(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("ordering {0} is missing from the ordering store")]
    MissingOrdering(OrderingKey),

    #[error("ordering store was built for {stored} vertices, network has {network}")]
    StoreMismatch { stored: usize, network: usize },

    #[error("ordering store: {0}")]
    Store(#[from] bincode::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("epidemic still alive after {rounds} rounds (beta = {beta}, gamma = {gamma}), refusing to continue")]
    RoundCapExceeded { rounds: usize, beta: f64, gamma: f64 },
}

pub type SirResult<T> = Result<T, SirError>;

impl SirError {
    pub fn io<P: AsRef<std::path::Path>>(path: P, source: std::io::Error) -> Self
    {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
