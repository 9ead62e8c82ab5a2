use crate::classifier::{Classification, Classifier};
use crate::config::OutputFormat;
use crate::corpus::read_line;
use std::io::{self, BufRead, Write};

/// Answer to one line of interactive input.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Verdict(Classification),
    Quit,
}

/// One line in, one structured result out.
pub struct Session<'m> {
    classifier: Classifier<'m>,
    sentinels: Vec<String>,
    format: OutputFormat,
}

impl<'m> Session<'m> {
    pub fn new(classifier: Classifier<'m>, sentinels: Vec<String>, format: OutputFormat) -> Self {
        Self {
            classifier,
            sentinels,
            format,
        }
    }

    pub fn respond(&self, line: &str) -> Response {
        let line = line.trim();
        if self.sentinels.iter().any(|s| s == line) {
            return Response::Quit;
        }
        Response::Verdict(self.classifier.classify(line))
    }

    pub fn banner(&self) -> String {
        let quoted: Vec<String> = self.sentinels.iter().map(|s| format!("\"{s}\"")).collect();
        format!("Enter emails! type {} to quit", quoted.join(" or "))
    }

    /// Reads lines until a sentinel or end of input, returning how many
    /// messages were classified.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> io::Result<usize> {
        if self.format == OutputFormat::Text {
            writeln!(output, "{}", self.banner())?;
        }

        let mut classified = 0;
        let mut buf = Vec::new();
        while let Some(line) = read_line(&mut input, &mut buf)? {
            match self.respond(&line) {
                Response::Quit => break,
                Response::Verdict(result) => {
                    self.write_verdict(&mut output, &result)?;
                    classified += 1;
                }
            }
        }

        output.flush()?;
        Ok(classified)
    }

    fn write_verdict<W: Write>(&self, output: &mut W, result: &Classification) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(output, "Probability this email is spam is: {}", result.probability)?;
                let verdict = if result.is_spam() { "spam" } else { "not spam" };
                writeln!(output, "this email is {verdict}")
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut *output, result).map_err(io::Error::from)?;
                writeln!(output)
            }
        }
    }
}
