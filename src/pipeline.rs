//! Analysis pipeline: reference → fetched comments → classified ResultSet.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use once_cell::sync::Lazy;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::normalize::clean_text;
use crate::sentiment::{SentimentClassifier, SentimentLabel};
use crate::video::VideoId;
use crate::youtube::{fetch_comments, CommentSource, FetchError};

// Tokens excluded from the keyword table when stopword filtering is on.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "the", "and", "for", "that", "this", "with", "you", "was", "are", "but",
        "not", "have", "has", "had", "its", "his", "her", "they", "them", "what",
        "when", "where", "which", "who", "will", "would", "your", "from", "all",
        "can", "out", "our", "one", "about", "just", "like", "too", "very",
        "she", "him", "how", "than", "then", "there", "their", "been", "were",
        "being", "into", "more", "some", "such", "only", "over", "same", "now",
        "after", "before", "because", "get", "got", "dont", "does", "did",
        "also", "any", "these", "those", "here",
    ]
    .into_iter()
    .collect()
});

/// Terminal outcomes of a failed analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("the reference could not be resolved to a video id")]
    InvalidReference,
    #[error("no comments are available for this video")]
    NoComments,
    #[error("comment source unavailable: {0}")]
    SourceUnavailable(String),
}

/// Per-run tuning knobs supplied by the boundary layer.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Hard upper bound on fetched comments.
    pub max_comments: usize,
    /// Exclude stopwords (and sub-3-character tokens) from the keyword table.
    pub filter_stopwords: bool,
    /// Number of top keywords to report.
    pub keyword_limit: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            max_comments: 100,
            filter_stopwords: true,
            keyword_limit: 10,
        }
    }
}

/// One comment paired with its classification.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClassifiedComment {
    pub text: String,
    pub published_at: Option<String>,
    pub sentiment: SentimentLabel,
    pub confidence: f64,
}

/// Per-label tallies over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct LabelCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl LabelCounts {
    fn bump(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Negative => self.negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    /// Share of `label` in percent. Total is always > 0 on a ResultSet
    /// (zero-comment runs fail with NoComments before one is built), but an
    /// empty tally still answers 0.0 rather than dividing by zero.
    pub fn percentage(&self, label: SentimentLabel) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let count = match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Negative => self.negative,
        };
        count as f64 / total as f64 * 100.0
    }
}

/// Raw comment text grouped per label, in fetch order.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct LabelBuckets {
    pub positive: Vec<String>,
    pub neutral: Vec<String>,
    pub negative: Vec<String>,
}

impl LabelBuckets {
    fn push(&mut self, label: SentimentLabel, text: String) {
        match label {
            SentimentLabel::Positive => self.positive.push(text),
            SentimentLabel::Neutral => self.neutral.push(text),
            SentimentLabel::Negative => self.negative.push(text),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

/// Aggregate of one analysis run. Built fresh per invocation, never shared.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResultSet {
    pub run_id: String,
    pub analyzed_at: String,
    pub video_id: String,
    pub total: usize,
    pub counts: LabelCounts,
    pub percentages: Percentages,
    pub buckets: LabelBuckets,
    pub comments: Vec<ClassifiedComment>,
    pub keywords: Vec<KeywordCount>,
}

/// Per-label shares for the KPI row.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct Percentages {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl From<&LabelCounts> for Percentages {
    fn from(counts: &LabelCounts) -> Self {
        Self {
            positive: counts.percentage(SentimentLabel::Positive),
            neutral: counts.percentage(SentimentLabel::Neutral),
            negative: counts.percentage(SentimentLabel::Negative),
        }
    }
}

/// Runs the full pipeline against an injected comment source.
pub struct Analyzer {
    classifier: SentimentClassifier,
}

impl Analyzer {
    pub fn new(classifier: SentimentClassifier) -> Self {
        Self { classifier }
    }

    /// parse → fetch → normalize → classify → aggregate.
    ///
    /// Each call owns its ResultSet; concurrent calls share nothing mutable.
    pub async fn analyze<S>(
        &self,
        source: &S,
        reference: &str,
        options: &AnalyzeOptions,
    ) -> Result<ResultSet, AnalysisError>
    where
        S: CommentSource + ?Sized,
    {
        let video_id = VideoId::parse(reference).ok_or(AnalysisError::InvalidReference)?;
        println!(
            "🔎 Analyzing video {} (cap: {} comments)",
            video_id, options.max_comments
        );

        let raw = fetch_comments(source, &video_id, options.max_comments)
            .await
            .map_err(|e| match e {
                FetchError::CommentsDisabled | FetchError::VideoUnavailable => {
                    AnalysisError::NoComments
                }
                other => {
                    eprintln!("❌ Comment fetch failed: {}", other);
                    AnalysisError::SourceUnavailable(other.to_string())
                }
            })?;

        if raw.is_empty() {
            return Err(AnalysisError::NoComments);
        }

        let mut counts = LabelCounts::default();
        let mut buckets = LabelBuckets::default();
        let mut comments = Vec::with_capacity(raw.len());
        let mut word_freq: HashMap<String, usize> = HashMap::new();

        for comment in raw {
            let cleaned = clean_text(&comment.text);
            let scored = self.classifier.classify_scored(&cleaned);

            counts.bump(scored.label);
            buckets.push(scored.label, comment.text.clone());

            for token in cleaned.split_whitespace() {
                if options.filter_stopwords && (token.len() < 3 || STOPWORDS.contains(token)) {
                    continue;
                }
                *word_freq.entry(token.to_owned()).or_insert(0) += 1;
            }

            comments.push(ClassifiedComment {
                text: comment.text,
                published_at: comment.published_at,
                sentiment: scored.label,
                confidence: scored.confidence,
            });
        }

        let mut keywords: Vec<KeywordCount> = word_freq
            .into_iter()
            .map(|(word, count)| KeywordCount { word, count })
            .collect();
        // Count-descending; ties broken alphabetically so output is stable.
        keywords.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        keywords.truncate(options.keyword_limit);

        let total = counts.total();
        println!(
            "✅ Analysis complete: {} comments ({} positive / {} neutral / {} negative)",
            total, counts.positive, counts.neutral, counts.negative
        );

        Ok(ResultSet {
            run_id: Uuid::new_v4().to_string(),
            analyzed_at: Utc::now().to_rfc3339(),
            video_id: video_id.to_string(),
            total,
            counts,
            percentages: Percentages::from(&counts),
            buckets,
            comments,
            keywords,
        })
    }
}
