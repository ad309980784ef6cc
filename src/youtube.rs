//! YouTube Data API v3 comment retrieval.
//!
//! The commentThreads endpoint is paginated behind an opaque continuation
//! token; [`fetch_comments`] drives the pagination, treating the caller's cap
//! as a hard upper bound so a misbehaving token sequence can never loop the
//! fetch forever. All API failure classes are absorbed into [`FetchError`]
//! before they reach the pipeline.

use axum::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::video::VideoId;

/// Largest page size the commentThreads endpoint accepts.
pub const MAX_PAGE_SIZE: usize = 100;

const COMMENT_THREADS_URL: &str = "https://www.googleapis.com/youtube/v3/commentThreads";

/// A single top-level comment as delivered by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RawComment {
    pub text: String,
    pub published_at: Option<String>,
}

/// One page of comments plus the continuation token, if any.
#[derive(Debug, Default)]
pub struct CommentPage {
    pub comments: Vec<RawComment>,
    pub next_page_token: Option<String>,
}

/// Classified comment-retrieval failures.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("comments are disabled for this video")]
    CommentsDisabled,
    #[error("video is private or does not exist")]
    VideoUnavailable,
    #[error("API quota exhausted")]
    QuotaExceeded,
    #[error("API request rejected ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("network failure: {0}")]
    Network(String),
}

/// Paginated comment listing, one page per call.
///
/// This is the seam between the pipeline and the real API; tests supply
/// scripted implementations instead of network calls.
#[async_trait]
pub trait CommentSource: Send + Sync {
    async fn list_page(
        &self,
        id: &VideoId,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<CommentPage, FetchError>;
}

// ============================================================================
// Wire models (commentThreads?part=snippet)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadsResponse {
    next_page_token: Option<String>,
    #[serde(default)]
    items: Vec<CommentThread>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    text_display: String,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorItem {
    #[serde(default)]
    reason: String,
}

// ============================================================================
// Real client
// ============================================================================

/// reqwest-backed client for the commentThreads endpoint.
pub struct YouTubeClient {
    http: reqwest::Client,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    fn page_url(&self, id: &VideoId, page_size: usize, page_token: Option<&str>) -> String {
        let mut url = format!(
            "{}?part=snippet&textFormat=plainText&videoId={}&maxResults={}&key={}",
            COMMENT_THREADS_URL,
            urlencoding::encode(id.as_str()),
            page_size,
            urlencoding::encode(&self.api_key),
        );
        if let Some(token) = page_token {
            url.push_str("&pageToken=");
            url.push_str(&urlencoding::encode(token));
        }
        url
    }

    /// Map an error payload onto the failure taxonomy via its `reason` field.
    fn classify_failure(status: u16, body: &str) -> FetchError {
        if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(body) {
            for item in &envelope.error.errors {
                match item.reason.as_str() {
                    "commentsDisabled" => return FetchError::CommentsDisabled,
                    "videoNotFound" | "notFound" | "forbidden" => {
                        return FetchError::VideoUnavailable
                    }
                    "quotaExceeded" | "dailyLimitExceeded" | "rateLimitExceeded" => {
                        return FetchError::QuotaExceeded
                    }
                    _ => {}
                }
            }
            return FetchError::Api {
                status,
                message: envelope.error.message,
            };
        }
        FetchError::Api {
            status,
            message: body.chars().take(200).collect(),
        }
    }
}

#[async_trait]
impl CommentSource for YouTubeClient {
    async fn list_page(
        &self,
        id: &VideoId,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<CommentPage, FetchError> {
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let url = self.page_url(id, page_size, page_token);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_failure(status.as_u16(), &body));
        }

        let payload: CommentThreadsResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let comments = payload
            .items
            .into_iter()
            .map(|thread| {
                let snippet = thread.snippet.top_level_comment.snippet;
                RawComment {
                    text: snippet.text_display,
                    published_at: snippet.published_at,
                }
            })
            .collect();

        Ok(CommentPage {
            comments,
            next_page_token: payload.next_page_token,
        })
    }
}

// ============================================================================
// Pagination driver
// ============================================================================

/// Collect up to `cap` comments in API delivery order.
///
/// Each page request is bounded by `min(MAX_PAGE_SIZE, cap - collected)`, and
/// pagination stops at the cap, at source exhaustion, or on an empty page
/// (which also covers a source that keeps handing out tokens without data).
/// A page failure after comments were already collected degrades to the
/// partial result; a first-page failure surfaces its classification.
/// Abandoning the returned future stops further page requests.
pub async fn fetch_comments<S>(
    source: &S,
    id: &VideoId,
    cap: usize,
) -> Result<Vec<RawComment>, FetchError>
where
    S: CommentSource + ?Sized,
{
    let mut comments: Vec<RawComment> = Vec::new();
    let mut page_token: Option<String> = None;

    while comments.len() < cap {
        let page_size = MAX_PAGE_SIZE.min(cap - comments.len());

        let page = match source.list_page(id, page_size, page_token.as_deref()).await {
            Ok(page) => page,
            Err(e) if comments.is_empty() => return Err(e),
            Err(e) => {
                eprintln!(
                    "⚠️ Page fetch failed after {} comments, keeping partial set: {}",
                    comments.len(),
                    e
                );
                break;
            }
        };

        if page.comments.is_empty() {
            break;
        }

        comments.extend(page.comments);

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    comments.truncate(cap);
    Ok(comments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a fixed script of pages and records the requested page sizes.
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<CommentPage, FetchError>>>,
        requested_sizes: Mutex<Vec<usize>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<CommentPage, FetchError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                requested_sizes: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.requested_sizes.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CommentSource for ScriptedSource {
        async fn list_page(
            &self,
            _id: &VideoId,
            page_size: usize,
            _page_token: Option<&str>,
        ) -> Result<CommentPage, FetchError> {
            self.requested_sizes.lock().unwrap().push(page_size);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .expect("page requested beyond the scripted sequence")
        }
    }

    fn page(start: usize, count: usize, token: Option<&str>) -> CommentPage {
        CommentPage {
            comments: (start..start + count)
                .map(|i| RawComment {
                    text: format!("comment {}", i),
                    published_at: None,
                })
                .collect(),
            next_page_token: token.map(str::to_owned),
        }
    }

    fn id() -> VideoId {
        VideoId::parse("dQw4w9WgXcQ").unwrap()
    }

    #[tokio::test]
    async fn cap_is_a_hard_bound_on_pagination() {
        // Two full pages satisfy the cap; the live token after the second
        // page must not trigger a third request.
        let source = ScriptedSource::new(vec![
            Ok(page(0, 100, Some("t1"))),
            Ok(page(100, 50, Some("t2"))),
        ]);

        let comments = fetch_comments(&source, &id(), 150).await.unwrap();

        assert_eq!(comments.len(), 150);
        assert_eq!(source.calls(), 2);
        assert_eq!(*source.requested_sizes.lock().unwrap(), vec![100, 50]);
    }

    #[tokio::test]
    async fn delivery_order_is_preserved() {
        let source = ScriptedSource::new(vec![
            Ok(page(0, 3, Some("t1"))),
            Ok(page(3, 2, None)),
        ]);

        let comments = fetch_comments(&source, &id(), 10).await.unwrap();

        let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["comment 0", "comment 1", "comment 2", "comment 3", "comment 4"]
        );
    }

    #[tokio::test]
    async fn comments_disabled_on_first_page_is_contained() {
        let source = ScriptedSource::new(vec![Err(FetchError::CommentsDisabled)]);

        let result = fetch_comments(&source, &id(), 100).await;

        assert!(matches!(result, Err(FetchError::CommentsDisabled)));
    }

    #[tokio::test]
    async fn failure_after_partial_collection_keeps_the_partial_set() {
        let source = ScriptedSource::new(vec![
            Ok(page(0, 100, Some("t1"))),
            Err(FetchError::QuotaExceeded),
        ]);

        let comments = fetch_comments(&source, &id(), 300).await.unwrap();

        assert_eq!(comments.len(), 100);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn empty_page_with_live_token_terminates() {
        let source = ScriptedSource::new(vec![Ok(page(0, 0, Some("loop")))]);

        let comments = fetch_comments(&source, &id(), 100).await.unwrap();

        assert!(comments.is_empty());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn overfull_page_is_truncated_to_the_cap() {
        // A source ignoring the requested page size still cannot exceed the cap.
        let source = ScriptedSource::new(vec![Ok(page(0, 80, Some("t1")))]);

        let comments = fetch_comments(&source, &id(), 50).await.unwrap();

        assert_eq!(comments.len(), 50);
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn error_payloads_classify_by_reason() {
        let disabled = r#"{"error":{"code":403,"message":"x","errors":[{"reason":"commentsDisabled"}]}}"#;
        assert!(matches!(
            YouTubeClient::classify_failure(403, disabled),
            FetchError::CommentsDisabled
        ));

        let quota = r#"{"error":{"code":403,"message":"x","errors":[{"reason":"quotaExceeded"}]}}"#;
        assert!(matches!(
            YouTubeClient::classify_failure(403, quota),
            FetchError::QuotaExceeded
        ));

        let missing = r#"{"error":{"code":404,"message":"x","errors":[{"reason":"videoNotFound"}]}}"#;
        assert!(matches!(
            YouTubeClient::classify_failure(404, missing),
            FetchError::VideoUnavailable
        ));

        let unknown = r#"{"error":{"code":400,"message":"odd","errors":[{"reason":"somethingElse"}]}}"#;
        assert!(matches!(
            YouTubeClient::classify_failure(400, unknown),
            FetchError::Api { status: 400, .. }
        ));

        assert!(matches!(
            YouTubeClient::classify_failure(500, "not json"),
            FetchError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn page_url_carries_key_and_token() {
        let client = YouTubeClient::new("test-key");
        let url = client.page_url(&id(), 100, Some("CAoQAA"));

        assert!(url.starts_with(COMMENT_THREADS_URL));
        assert!(url.contains("videoId=dQw4w9WgXcQ"));
        assert!(url.contains("maxResults=100"));
        assert!(url.contains("key=test-key"));
        assert!(url.contains("pageToken=CAoQAA"));
    }
}
