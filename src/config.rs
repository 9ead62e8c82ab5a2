use crate::classifier::DEFAULT_THRESHOLD;
use crate::corpus::{MalformedPolicy, ReadOptions};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Labeled training corpus, one `label,text` record per line.
    pub corpus_path: PathBuf,
    /// Treat the first non-blank corpus line as a header and skip it.
    pub has_header: bool,
    pub on_malformed: MalformedPolicy,
    /// Messages scoring strictly above this probability are spam.
    pub threshold: f64,
    /// Input lines that end the interactive session.
    pub sentinels: Vec<String>,
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            corpus_path: PathBuf::from("spam.csv"),
            has_header: true,
            on_malformed: MalformedPolicy::Skip,
            threshold: DEFAULT_THRESHOLD,
            sentinels: vec!["exit".to_string(), "q".to_string()],
            output: OutputFormat::Text,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {path}"))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {path}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {path}"))?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            anyhow::bail!("threshold must be within [0, 1], got {}", self.threshold);
        }
        if self.sentinels.iter().all(|s| s.trim().is_empty()) {
            anyhow::bail!("at least one non-empty sentinel is required to end a session");
        }
        Ok(())
    }

    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            has_header: self.has_header,
            on_malformed: self.on_malformed,
        }
    }
}
