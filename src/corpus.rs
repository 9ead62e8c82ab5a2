use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Spam,
    Ham,
}

impl FromStr for Label {
    type Err = String;

    /// Labels are case-sensitive; anything other than `spam` or `ham` is rejected.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "spam" => Ok(Label::Spam),
            "ham" => Ok(Label::Ham),
            other => Err(format!("unknown label '{other}', expected 'spam' or 'ham'")),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Spam => write!(f, "spam"),
            Label::Ham => write!(f, "ham"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub label: Label,
    pub text: String,
}

impl Record {
    pub fn new(label: Label, text: impl Into<String>) -> Self {
        Self {
            label,
            text: text.into(),
        }
    }
}

/// What to do with a line that does not parse into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Log a warning, count the line as skipped and keep reading.
    #[default]
    Skip,
    /// Stop reading and surface the error.
    Abort,
}

#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    pub has_header: bool,
    pub on_malformed: MalformedPolicy,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            on_malformed: MalformedPolicy::Skip,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusSummary {
    pub records: usize,
    pub skipped: usize,
    pub header_skipped: bool,
}

/// Streams `label,text` records out of a line-oriented source.
pub struct CorpusReader<R> {
    path: PathBuf,
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
    options: ReadOptions,
    summary: CorpusSummary,
    failed: bool,
}

impl CorpusReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>, options: ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::CorpusUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::with_path(BufReader::new(file), path, options))
    }
}

impl<R: BufRead> CorpusReader<R> {
    pub fn new(reader: R, options: ReadOptions) -> Self {
        Self::with_path(reader, "<stream>", options)
    }

    fn with_path(reader: R, path: impl Into<PathBuf>, options: ReadOptions) -> Self {
        Self {
            path: path.into(),
            reader,
            buf: Vec::new(),
            line_no: 0,
            options,
            summary: CorpusSummary::default(),
            failed: false,
        }
    }

    pub fn summary(&self) -> &CorpusSummary {
        &self.summary
    }
}

impl<R: BufRead> Iterator for CorpusReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let line = match read_line(&mut self.reader, &mut self.buf) {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(source) => {
                    self.failed = true;
                    return Some(Err(Error::CorpusUnavailable {
                        path: self.path.clone(),
                        source,
                    }));
                }
            };
            self.line_no += 1;

            let line = line.as_str();
            if line.trim().is_empty() {
                continue;
            }

            if self.options.has_header && !self.summary.header_skipped {
                self.summary.header_skipped = true;
                log::debug!("Skipping corpus header: {line}");
                continue;
            }

            match parse_record(line) {
                Ok(record) => {
                    self.summary.records += 1;
                    return Some(Ok(record));
                }
                Err(reason) => match self.options.on_malformed {
                    MalformedPolicy::Skip => {
                        self.summary.skipped += 1;
                        log::warn!("Skipping malformed record on line {}: {reason}", self.line_no);
                    }
                    MalformedPolicy::Abort => {
                        self.failed = true;
                        return Some(Err(Error::MalformedRecord {
                            line: self.line_no,
                            reason,
                        }));
                    }
                },
            }
        }
    }
}

/// Reads the next line without its `\n` or `\r\n` terminator, `None` at end
/// of input. Lines that are not valid UTF-8 are decoded as Latin-1, so every
/// byte sequence yields text.
pub fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    Ok(Some(match std::str::from_utf8(buf) {
        Ok(line) => line.to_string(),
        Err(_) => buf.iter().map(|&b| char::from(b)).collect(),
    }))
}

/// Parses one `label,text` line. Either field may be double-quoted, with `""`
/// standing for a literal quote. Unquoted text runs to the end of the line,
/// minus trailing empty columns.
pub fn parse_record(line: &str) -> std::result::Result<Record, String> {
    let (label, rest) = split_field(line)?;
    let rest = rest.ok_or_else(|| "missing ',' between label and text".to_string())?;
    let label: Label = label.trim().parse()?;

    let rest = rest.trim_start();
    let text = if rest.starts_with('"') {
        let (text, _ignored) = split_field(rest)?;
        text
    } else {
        rest.trim_end_matches(|c: char| c == ',' || c.is_whitespace())
            .to_string()
    };

    Ok(Record::new(label, text))
}

/// Splits the leading field off `input`, returning it and the remainder after
/// the separating comma (`None` when the line has no further comma).
fn split_field(input: &str) -> std::result::Result<(String, Option<&str>), String> {
    let trimmed = input.trim_start();
    let Some(quoted) = trimmed.strip_prefix('"') else {
        return Ok(match input.split_once(',') {
            Some((field, rest)) => (field.to_string(), Some(rest)),
            None => (input.to_string(), None),
        });
    };

    let mut field = String::new();
    let mut chars = quoted.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if c != '"' {
            field.push(c);
            continue;
        }
        if let Some((_, '"')) = chars.peek() {
            field.push('"');
            chars.next();
            continue;
        }

        let after = &quoted[idx + 1..];
        let after_trimmed = after.trim_start();
        return match after_trimmed.strip_prefix(',') {
            Some(rest) => Ok((field, Some(rest))),
            None if after_trimmed.is_empty() => Ok((field, None)),
            None => Err(format!("unexpected characters after closing quote: '{after_trimmed}'")),
        };
    }

    Err("unterminated quoted field".to_string())
}
