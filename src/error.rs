use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The training corpus could not be opened or read.
    #[error("training corpus '{}' is unavailable: {}", .path.display(), .source)]
    CorpusUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A corpus line that does not parse into a (label, text) pair.
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// Training finished without seeing a single document.
    #[error("model is untrained: the corpus contained no spam or ham documents")]
    UntrainedModel,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Exit status when the training corpus cannot be opened or read (`EX_NOINPUT`).
pub const EXIT_CORPUS_UNAVAILABLE: i32 = 66;
/// Exit status when the corpus was readable but unusable for training (`EX_DATAERR`).
pub const EXIT_BAD_CORPUS: i32 = 65;

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::CorpusUnavailable { .. } => EXIT_CORPUS_UNAVAILABLE,
            Error::MalformedRecord { .. } | Error::UntrainedModel => EXIT_BAD_CORPUS,
        }
    }
}
