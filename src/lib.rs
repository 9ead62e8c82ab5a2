pub mod classifier;
pub mod config;
pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod model;
pub mod session;
pub mod tokenizer;

pub use classifier::{classify, Classification, Classifier};
pub use config::{Config, OutputFormat};
pub use corpus::{CorpusReader, CorpusSummary, Label, MalformedPolicy, ReadOptions, Record};
pub use error::{Error, Result};
pub use evaluation::Evaluation;
pub use model::{train, Model, TokenProbability, Trainer};
pub use session::{Response, Session};
