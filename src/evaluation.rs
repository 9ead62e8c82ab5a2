use crate::classifier::Classifier;
use crate::corpus::{Label, Record};
use crate::error::Result;
use serde::Serialize;

/// Confusion matrix of predicted against labeled classes, with spam as the
/// positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub true_spam: usize,
    pub false_spam: usize,
    pub true_ham: usize,
    pub false_ham: usize,
}

impl Evaluation {
    pub fn record(&mut self, expected: Label, predicted: Label) {
        match (expected, predicted) {
            (Label::Spam, Label::Spam) => self.true_spam += 1,
            (Label::Ham, Label::Spam) => self.false_spam += 1,
            (Label::Ham, Label::Ham) => self.true_ham += 1,
            (Label::Spam, Label::Ham) => self.false_ham += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_spam + self.false_spam + self.true_ham + self.false_ham
    }

    /// Share of correctly labeled messages, `0.0` when nothing was evaluated.
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_spam + self.true_ham, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_spam, self.true_spam + self.false_spam)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_spam, self.true_spam + self.false_ham)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

/// Classifies every record and tallies the outcome against its label.
pub fn evaluate<I>(classifier: &Classifier<'_>, records: I) -> Evaluation
where
    I: IntoIterator<Item = Record>,
{
    let mut evaluation = Evaluation::default();
    for record in records {
        let predicted = classifier.classify(&record.text).verdict;
        evaluation.record(record.label, predicted);
    }
    evaluation
}

/// Like [`evaluate`], for a fallible record stream.
pub fn try_evaluate<I>(classifier: &Classifier<'_>, records: I) -> Result<Evaluation>
where
    I: IntoIterator<Item = Result<Record>>,
{
    let mut evaluation = Evaluation::default();
    for record in records {
        let record = record?;
        let predicted = classifier.classify(&record.text).verdict;
        evaluation.record(record.label, predicted);
    }
    Ok(evaluation)
}
