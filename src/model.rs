use crate::corpus::{Label, Record};
use crate::error::{Error, Result};
use crate::tokenizer;
use serde::Serialize;
use std::collections::HashMap;

/// Smoothed conditional probabilities of one vocabulary token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TokenProbability {
    /// `P(token | spam)`
    pub spam: f64,
    /// `P(token | ham)`
    pub ham: f64,
}

/// A trained Bernoulli Naive Bayes model.
///
/// Only [`Trainer::finish`] (or [`train`]) can build one, and it refuses an
/// empty corpus, so every `Model` has at least one training document and
/// well-defined class priors. The model is never mutated after training.
///
/// Both conditional tables share the single `vocabulary` map, which keeps
/// their key sets identical: every token seen in either class has a spam and
/// a ham probability.
#[derive(Debug, Clone)]
pub struct Model {
    spam_count: u64,
    ham_count: u64,
    vocabulary: HashMap<String, TokenProbability>,
}

impl Model {
    pub fn spam_count(&self) -> u64 {
        self.spam_count
    }

    pub fn ham_count(&self) -> u64 {
        self.ham_count
    }

    pub fn total_count(&self) -> u64 {
        self.spam_count + self.ham_count
    }

    /// `P(spam)`, the share of training documents labeled spam.
    pub fn prior_spam(&self) -> f64 {
        self.spam_count as f64 / self.total_count() as f64
    }

    /// `P(ham)`, the share of training documents labeled ham.
    pub fn prior_ham(&self) -> f64 {
        self.ham_count as f64 / self.total_count() as f64
    }

    pub fn token(&self, token: &str) -> Option<TokenProbability> {
        self.vocabulary.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.vocabulary.contains_key(token)
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn tokens(&self) -> impl Iterator<Item = (&str, TokenProbability)> {
        self.vocabulary.iter().map(|(t, p)| (t.as_str(), *p))
    }
}

/// Accumulates document counts until the corpus is exhausted.
#[derive(Debug, Default)]
pub struct Trainer {
    spam_count: u64,
    ham_count: u64,
    spam_doc_freq: HashMap<String, u64>,
    ham_doc_freq: HashMap<String, u64>,
}

impl Trainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one document. Each distinct token is counted once per document.
    pub fn observe(&mut self, label: Label, text: &str) {
        let (count, doc_freq) = match label {
            Label::Spam => (&mut self.spam_count, &mut self.spam_doc_freq),
            Label::Ham => (&mut self.ham_count, &mut self.ham_doc_freq),
        };

        *count += 1;
        for token in tokenizer::document(text) {
            *doc_freq.entry(token).or_insert(0) += 1;
        }
    }

    pub fn documents(&self) -> u64 {
        self.spam_count + self.ham_count
    }

    /// Applies add-one smoothing and freezes the counts into a [`Model`].
    ///
    /// `P(t|c) = (docs of c containing t + 1) / (docs of c + 2)`. A token never
    /// seen in class `c` gets `1 / (docs of c + 2)`, so no probability is ever
    /// exactly 0 or 1 and a class with no documents never divides by zero.
    pub fn finish(self) -> Result<Model> {
        if self.documents() == 0 {
            return Err(Error::UntrainedModel);
        }

        let spam_denominator = (self.spam_count + 2) as f64;
        let ham_denominator = (self.ham_count + 2) as f64;
        let smoothed = |freq: Option<&u64>, denominator: f64| {
            (freq.copied().unwrap_or(0) + 1) as f64 / denominator
        };

        let mut vocabulary = HashMap::with_capacity(
            self.spam_doc_freq.len().max(self.ham_doc_freq.len()),
        );
        for token in self.ham_doc_freq.keys().chain(self.spam_doc_freq.keys()) {
            if vocabulary.contains_key(token) {
                continue;
            }
            let probability = TokenProbability {
                spam: smoothed(self.spam_doc_freq.get(token), spam_denominator),
                ham: smoothed(self.ham_doc_freq.get(token), ham_denominator),
            };
            vocabulary.insert(token.clone(), probability);
        }

        log::info!(
            "Trained on {} documents ({} spam, {} ham), vocabulary of {} tokens",
            self.documents(),
            self.spam_count,
            self.ham_count,
            vocabulary.len()
        );

        Ok(Model {
            spam_count: self.spam_count,
            ham_count: self.ham_count,
            vocabulary,
        })
    }
}

/// Trains a model from labeled records.
pub fn train<I>(records: I) -> Result<Model>
where
    I: IntoIterator<Item = Record>,
{
    let mut trainer = Trainer::new();
    for record in records {
        trainer.observe(record.label, &record.text);
    }
    trainer.finish()
}

/// Trains a model from a fallible record stream such as a
/// [`CorpusReader`](crate::corpus::CorpusReader), stopping at the first error.
pub fn try_train<I>(records: I) -> Result<Model>
where
    I: IntoIterator<Item = Result<Record>>,
{
    let mut trainer = Trainer::new();
    for record in records {
        let record = record?;
        trainer.observe(record.label, &record.text);
    }
    trainer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn two_document_model() -> Model {
        train(vec![
            Record::new(Label::Spam, "win money now"),
            Record::new(Label::Ham, "meeting at noon"),
        ])
        .unwrap()
    }

    #[test]
    fn test_counts_and_smoothed_probabilities() {
        let model = two_document_model();
        assert_eq!(model.spam_count(), 1);
        assert_eq!(model.ham_count(), 1);

        let win = model.token("win").unwrap();
        assert!((win.spam - 2.0 / 3.0).abs() < EPSILON);
        assert!((win.ham - 1.0 / 3.0).abs() < EPSILON);

        let noon = model.token("noon").unwrap();
        assert!((noon.spam - 1.0 / 3.0).abs() < EPSILON);
        assert!((noon.ham - 2.0 / 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_unseen_class_gets_pseudo_count_only() {
        // With no ham documents at all, every token's ham probability is 1 / (0 + 2).
        let model = train(vec![Record::new(Label::Spam, "win money now")]).unwrap();
        assert_eq!(model.ham_count(), 0);

        let win = model.token("win").unwrap();
        assert!((win.spam - 2.0 / 3.0).abs() < EPSILON);
        assert!((win.ham - 1.0 / 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_every_token_has_both_probabilities_strictly_inside_unit_interval() {
        let model = train(vec![
            Record::new(Label::Spam, "FREE entry! win a prize"),
            Record::new(Label::Spam, "win cash now, claim prize"),
            Record::new(Label::Ham, "are we still meeting for lunch?"),
            Record::new(Label::Ham, "lunch at noon, then the meeting"),
            Record::new(Label::Ham, "call me when you win"),
        ])
        .unwrap();

        for text in [
            "FREE entry! win a prize",
            "win cash now, claim prize",
            "are we still meeting for lunch?",
            "lunch at noon, then the meeting",
            "call me when you win",
        ] {
            for token in tokenizer::normalize(text) {
                let p = model
                    .token(&token)
                    .unwrap_or_else(|| panic!("token {token:?} missing from vocabulary"));
                assert!(p.spam > 0.0 && p.spam < 1.0, "P({token}|spam) = {}", p.spam);
                assert!(p.ham > 0.0 && p.ham < 1.0, "P({token}|ham) = {}", p.ham);
            }
        }
    }

    #[test]
    fn test_document_frequency_counts_presence_not_occurrences() {
        let model = train(vec![
            Record::new(Label::Spam, "money money money"),
            Record::new(Label::Spam, "money"),
            Record::new(Label::Ham, "hello"),
        ])
        .unwrap();

        // Two spam documents contain "money": (2 + 1) / (2 + 2).
        let money = model.token("money").unwrap();
        assert!((money.spam - 0.75).abs() < EPSILON);
        assert!((money.ham - 1.0 / 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_vocabulary_is_union_of_both_classes() {
        let model = two_document_model();
        assert_eq!(model.vocabulary_len(), 6);
        for token in ["win", "money", "now", "meeting", "at", "noon"] {
            assert!(model.contains(token), "missing {token}");
        }

        let mut tokens: Vec<&str> = model.tokens().map(|(token, _)| token).collect();
        tokens.sort_unstable();
        assert_eq!(tokens, vec!["at", "meeting", "money", "noon", "now", "win"]);
    }

    #[test]
    fn test_empty_corpus_is_untrained() {
        match train(Vec::<Record>::new()) {
            Err(Error::UntrainedModel) => {}
            other => panic!("Expected UntrainedModel, got {other:?}"),
        }
    }

    #[test]
    fn test_documents_without_tokens_still_count() {
        let model = train(vec![
            Record::new(Label::Spam, "!!!"),
            Record::new(Label::Ham, "hi"),
        ])
        .unwrap();
        assert_eq!(model.spam_count(), 1);
        assert_eq!(model.vocabulary_len(), 1);
        assert!((model.prior_spam() - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_try_train_propagates_errors() {
        let records = vec![
            Ok(Record::new(Label::Spam, "win")),
            Err(Error::MalformedRecord {
                line: 2,
                reason: "bad".to_string(),
            }),
        ];
        match try_train(records) {
            Err(Error::MalformedRecord { line: 2, .. }) => {}
            other => panic!("Expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_model_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Model>();
    }
}
