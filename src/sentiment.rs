//! Lexicon-based sentiment classification.
//!
//! The polarity engine is injected behind a trait so the thresholding logic
//! can be tested with deterministic scores. The bundled [`LexiconScorer`]
//! uses word lists to produce a compound score, no external ML dependencies.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use serde::Serialize;
use utoipa::ToSchema;

/// Compound scores at or above this value classify as Positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound scores at or below this value classify as Negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

// Normalization constant mapping raw hit counts into [-1, 1].
const NORMALIZATION_ALPHA: f64 = 15.0;

// Common positive words for comment sentiment detection
static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "good", "great", "excellent", "amazing", "wonderful", "fantastic", "superb",
        "outstanding", "brilliant", "love", "loved", "loving", "best", "better",
        "positive", "happy", "joy", "joyful", "beautiful", "perfect", "awesome",
        "incredible", "magnificent", "delightful", "pleasant", "satisfying",
        "satisfied", "recommend", "recommended", "impressive", "exceptional",
        "remarkable", "cool", "nice", "fun", "funny", "enjoyed", "enjoyable",
        "helpful", "informative", "inspiring", "underrated", "masterpiece",
        "legend", "legendary", "thanks", "thank", "liked", "likes", "favorite",
        "gem", "quality", "valuable", "wholesome", "hilarious", "banger",
    ]
    .into_iter()
    .collect()
});

// Common negative words for comment sentiment detection
static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "bad", "terrible", "awful", "horrible", "poor", "worst", "worse", "hate",
        "hated", "hating", "dislike", "disliked", "disappointing", "disappointed",
        "failure", "failed", "fail", "failing", "negative", "sad", "unhappy",
        "angry", "annoyed", "annoying", "frustrated", "frustrating", "problem",
        "problems", "broken", "wrong", "useless", "waste", "scam", "fraud",
        "fake", "misleading", "clickbait", "boring", "bored", "cringe",
        "overrated", "stupid", "dumb", "trash", "garbage", "rubbish", "pathetic",
        "mediocre", "unwatchable", "painful", "disgusting", "ridiculous",
        "nonsense", "lies", "lying", "unsubscribed", "dislikes",
    ]
    .into_iter()
    .collect()
});

/// The closed set of sentiment labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a text to a compound polarity score in `[-1, 1]`.
pub trait PolarityScorer: Send + Sync {
    fn compound_score(&self, text: &str) -> f64;
}

// Plain closures work as scorers, which keeps tests free of the real lexicon.
impl<F> PolarityScorer for F
where
    F: Fn(&str) -> f64 + Send + Sync,
{
    fn compound_score(&self, text: &str) -> f64 {
        self(text)
    }
}

/// Word-list polarity scorer.
///
/// Counts positive and negative word hits over alphabetic tokens and squashes
/// the signed hit balance into `[-1, 1]` with `x / sqrt(x² + alpha)`.
#[derive(Debug, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }
}

impl PolarityScorer for LexiconScorer {
    fn compound_score(&self, text: &str) -> f64 {
        let words: Vec<&str> = text
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| w.len() > 2)
            .collect();

        if words.is_empty() {
            return 0.0;
        }

        let positive_count = words.iter().filter(|w| POSITIVE_WORDS.contains(*w)).count();
        let negative_count = words.iter().filter(|w| NEGATIVE_WORDS.contains(*w)).count();

        let balance = positive_count as f64 - negative_count as f64;
        balance / (balance * balance + NORMALIZATION_ALPHA).sqrt()
    }
}

/// A label together with the score it was derived from.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct ScoredSentiment {
    pub label: SentimentLabel,
    /// `abs(compound)` rounded to 3 decimal places.
    pub confidence: f64,
    pub compound: f64,
}

/// Threshold-based classifier over an injected polarity engine.
pub struct SentimentClassifier {
    scorer: Box<dyn PolarityScorer>,
}

impl SentimentClassifier {
    pub fn new(scorer: Box<dyn PolarityScorer>) -> Self {
        Self { scorer }
    }

    pub fn with_default_lexicon() -> Self {
        Self::new(Box::new(LexiconScorer::new()))
    }

    pub fn classify(&self, text: &str) -> SentimentLabel {
        self.classify_scored(text).label
    }

    pub fn classify_scored(&self, text: &str) -> ScoredSentiment {
        let compound = self.scorer.compound_score(text);

        let label = if compound >= POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if compound <= NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };

        ScoredSentiment {
            label,
            confidence: (compound.abs() * 1000.0).round() / 1000.0,
            compound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier_with_fixed_score(score: f64) -> SentimentClassifier {
        SentimentClassifier::new(Box::new(move |_: &str| score))
    }

    #[test]
    fn thresholds_are_exact_at_the_boundaries() {
        assert_eq!(
            classifier_with_fixed_score(0.05).classify("x"),
            SentimentLabel::Positive
        );
        assert_eq!(
            classifier_with_fixed_score(-0.05).classify("x"),
            SentimentLabel::Negative
        );
        assert_eq!(
            classifier_with_fixed_score(0.0).classify("x"),
            SentimentLabel::Neutral
        );
        assert_eq!(
            classifier_with_fixed_score(0.049).classify("x"),
            SentimentLabel::Neutral
        );
        assert_eq!(
            classifier_with_fixed_score(-0.049).classify("x"),
            SentimentLabel::Neutral
        );
    }

    #[test]
    fn confidence_is_absolute_score_rounded_to_three_decimals() {
        let scored = classifier_with_fixed_score(-0.6789).classify_scored("x");
        assert_eq!(scored.label, SentimentLabel::Negative);
        assert_eq!(scored.confidence, 0.679);

        let scored = classifier_with_fixed_score(0.1234).classify_scored("x");
        assert_eq!(scored.confidence, 0.123);
    }

    #[test]
    fn lexicon_scores_positive_text_positive() {
        let classifier = SentimentClassifier::with_default_lexicon();
        assert_eq!(
            classifier.classify("this video is amazing i love it best content ever"),
            SentimentLabel::Positive
        );
    }

    #[test]
    fn lexicon_scores_negative_text_negative() {
        let classifier = SentimentClassifier::with_default_lexicon();
        assert_eq!(
            classifier.classify("terrible video waste of time worst clickbait"),
            SentimentLabel::Negative
        );
    }

    #[test]
    fn lexicon_scores_plain_text_neutral() {
        let classifier = SentimentClassifier::with_default_lexicon();
        assert_eq!(
            classifier.classify("the video was uploaded on monday"),
            SentimentLabel::Neutral
        );
        assert_eq!(classifier.classify(""), SentimentLabel::Neutral);
    }

    #[test]
    fn lexicon_compound_stays_within_bounds() {
        let scorer = LexiconScorer::new();
        let gushing = "amazing wonderful fantastic superb brilliant perfect awesome \
                       incredible magnificent delightful best loved great good nice";
        let score = scorer.compound_score(gushing);
        assert!(score > 0.9 && score <= 1.0, "score: {}", score);
    }
}
