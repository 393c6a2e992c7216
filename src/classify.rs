// Sentiment classification for submitted lines.
//
// A `SentimentModel` produces a continuous score in `[0,1]` or reports that it
// is unavailable. `Classifier` maps the score onto a `Bucket`, and falls back
// to a keyword heuristic whenever the model cannot answer. It never fails.

use std::fmt;

use serde::Deserialize;

/// Sentiment outcome for a submitted line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bucket {
    Positive,
    Neutral,
    Negative,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Positive, Bucket::Neutral, Bucket::Negative];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Positive => "positive",
            Bucket::Neutral => "neutral",
            Bucket::Negative => "negative",
        }
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        match self {
            Bucket::Positive => 0,
            Bucket::Neutral => 1,
            Bucket::Negative => 2,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a model hands back for one line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Prediction {
    Score(f32),
    Unavailable,
}

/// External text-sentiment predictor.
pub trait SentimentModel {
    fn predict(&self, text: &str) -> Prediction;
}

/// A model that is never ready. Every line goes through the keyword fallback.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoModel;

impl SentimentModel for NoModel {
    fn predict(&self, _text: &str) -> Prediction {
        Prediction::Unavailable
    }
}

// word -> valence
#[rustfmt::skip]
const LEXICON: &[(&str, f32)] = &[
    ("love", 3.0), ("loved", 3.0), ("heart", 2.0), ("kiss", 2.0), ("happy", 3.0),
    ("joy", 3.0), ("beautiful", 3.0), ("great", 3.0), ("good", 2.0), ("wonderful", 3.0),
    ("hope", 2.0), ("grow", 1.0), ("bloom", 2.0), ("kind", 2.0), ("calm", 1.0),
    ("thank", 2.0), ("thanks", 2.0), ("fun", 2.0), ("nice", 2.0), ("bright", 1.0),
    ("sad", -2.0), ("tired", -2.0), ("angry", -3.0), ("hate", -3.0), ("bad", -2.0),
    ("awful", -3.0), ("terrible", -3.0), ("lonely", -2.0), ("fear", -2.0), ("afraid", -2.0),
    ("cry", -2.0), ("lost", -1.0), ("hurt", -2.0), ("sick", -2.0), ("dark", -1.0),
];

/// Small word-valence scorer standing in for a trained model.
///
/// The summed valence goes through a logistic curve, so a line with no known
/// words lands at exactly 0.5.
#[derive(Clone, Copy, Debug, Default)]
pub struct LexiconModel;

impl SentimentModel for LexiconModel {
    fn predict(&self, text: &str) -> Prediction {
        let lower = text.to_lowercase();
        let sum: f32 = lower
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
            .filter_map(|w| LEXICON.iter().find(|(k, _)| *k == w).map(|(_, v)| *v))
            .sum();
        Prediction::Score(1.0 / (1.0 + (-0.8 * sum).exp()))
    }
}

/// Which model the classifier wraps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    #[default]
    Lexicon,
    None,
}

impl ModelKind {
    pub fn build(self) -> Box<dyn SentimentModel> {
        match self {
            ModelKind::Lexicon => Box::new(LexiconModel),
            ModelKind::None => Box::new(NoModel),
        }
    }
}

const NEGATIVE_WORDS: &[&str] = &["sad", "tired", "angry"];
const POSITIVE_WORDS: &[&str] = &["love", "heart", "kiss"];

/// How a bucket was decided.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Source {
    Model { score: f32 },
    Fallback,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub bucket: Bucket,
    pub source: Source,
}

impl Classification {
    /// One-line description for the debug status readout.
    pub fn status(&self) -> String {
        match self.source {
            Source::Model { score } => format!("model score={score:.2} -> {}", self.bucket),
            Source::Fallback => format!("(fallback classify) -> {}", self.bucket),
        }
    }
}

pub struct Classifier {
    model: Box<dyn SentimentModel>,
    positive_above: f32,
    negative_below: f32,
}

impl Classifier {
    pub fn new(model: Box<dyn SentimentModel>, positive_above: f32, negative_below: f32) -> Self {
        Self { model, positive_above, negative_below }
    }

    pub fn classify(&self, text: &str) -> Classification {
        let text = text.trim();
        if text.is_empty() {
            return Classification { bucket: Bucket::Neutral, source: Source::Fallback };
        }
        match self.model.predict(text) {
            Prediction::Score(score) if score.is_finite() => {
                Classification { bucket: self.bucket_for_score(score), source: Source::Model { score } }
            }
            _ => Classification { bucket: keyword_bucket(text), source: Source::Fallback },
        }
    }

    fn bucket_for_score(&self, score: f32) -> Bucket {
        if score > self.positive_above {
            Bucket::Positive
        } else if score < self.negative_below {
            Bucket::Negative
        } else {
            Bucket::Neutral
        }
    }
}

/// Keyword heuristic. Negative words win over positive ones.
pub fn keyword_bucket(text: &str) -> Bucket {
    let s = text.to_lowercase();
    if NEGATIVE_WORDS.iter().any(|w| s.contains(w)) {
        Bucket::Negative
    } else if POSITIVE_WORDS.iter().any(|w| s.contains(w)) {
        Bucket::Positive
    } else {
        Bucket::Neutral
    }
}
