use crate::corpus::Label;
use crate::model::Model;
use crate::tokenizer;
use serde::Serialize;
use std::collections::BTreeSet;

pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Result of classifying one message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Posterior probability that the message is spam.
    pub probability: f64,
    pub verdict: Label,
    /// Distinct message tokens found in the training vocabulary.
    pub evidence: usize,
}

impl Classification {
    pub fn is_spam(&self) -> bool {
        self.verdict == Label::Spam
    }
}

/// Read-only view over a trained [`Model`] that turns messages into verdicts.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'m> {
    model: &'m Model,
    threshold: f64,
}

impl<'m> Classifier<'m> {
    pub fn new(model: &'m Model) -> Self {
        Self::with_threshold(model, DEFAULT_THRESHOLD)
    }

    /// A message is spam when its probability is strictly above `threshold`,
    /// which must lie in `[0, 1]`. A NaN threshold is replaced by the default.
    pub fn with_threshold(model: &'m Model, threshold: f64) -> Self {
        debug_assert!(
            threshold.is_nan() || (0.0..=1.0).contains(&threshold),
            "threshold must be within [0, 1], got {threshold}"
        );
        let threshold = if threshold.is_nan() {
            DEFAULT_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        Self { model, threshold }
    }

    pub fn model(&self) -> &'m Model {
        self.model
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn classify(&self, message: &str) -> Classification {
        let evidence = known_tokens(self.model, message);
        let probability = posterior(self.model, &evidence);
        let verdict = if probability > self.threshold {
            Label::Spam
        } else {
            Label::Ham
        };

        log::debug!(
            "Classified message with {} known tokens: P(spam) = {probability:.6}",
            evidence.len()
        );

        Classification {
            probability,
            verdict,
            evidence: evidence.len(),
        }
    }
}

/// Probability in `[0, 1]` that `message` is spam under `model`.
pub fn classify(model: &Model, message: &str) -> f64 {
    posterior(model, &known_tokens(model, message))
}

// Tokens unseen during training carry no evidence either way.
fn known_tokens(model: &Model, message: &str) -> BTreeSet<String> {
    tokenizer::document(message)
        .into_iter()
        .filter(|token| model.contains(token))
        .collect()
}

/// Bayes' rule over the present tokens, accumulated in log space.
///
/// Only tokens present in the message contribute `ln P(t|c)`; vocabulary
/// tokens absent from the message are not scored with `ln (1 - P(t|c))`.
/// The two unnormalized log scores are normalized with log-sum-exp so that
/// long messages cannot underflow both classes to zero.
fn posterior(model: &Model, tokens: &BTreeSet<String>) -> f64 {
    let mut log_spam = (model.spam_count() as f64).ln();
    let mut log_ham = (model.ham_count() as f64).ln();

    for token in tokens {
        if let Some(p) = model.token(token) {
            log_spam += p.spam.ln();
            log_ham += p.ham.ln();
        }
    }

    // The shared ln(total) term of both priors cancels out in the ratio.
    let max = log_spam.max(log_ham);
    let spam = (log_spam - max).exp();
    let ham = (log_ham - max).exp();
    spam / (spam + ham)
}
