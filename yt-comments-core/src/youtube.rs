use {
    std::time::Duration,
    async_trait::async_trait,
    serde::Deserialize,
    chrono::{DateTime, Utc},
    url::Url,
    crate::{
        config::YoutubeConfig,
        error::SourceError,
        models::CommentRecord,
    },
};

const COMMENT_THREADS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/commentThreads";
const PAGE_SIZE: u32 = 100;

/// One page of comments plus the token for the next page, if any. An empty
/// `comments` with no token means the video genuinely has no (more)
/// comments; transport problems surface as [`SourceError`] instead.
#[derive(Debug)]
pub struct CommentPage {
    pub comments: Vec<CommentRecord>,
    pub next_page_token: Option<String>,
}

/// Paged comment source boundary. Implementations report transport failures
/// distinctly from "zero comments".
#[async_trait]
pub trait CommentSource: Send + Sync {
    async fn fetch_page(
        &self,
        video_id: &str,
        page_token: Option<&str>,
        include_replies: bool,
    ) -> Result<CommentPage, SourceError>;
}

pub struct YoutubeClient {
    client: reqwest::Client,
    api_key: String,
}

impl YoutubeClient {
    pub fn new(config: &YoutubeConfig) -> Result<Self, SourceError> {
        let api_key = config
            .api_key()
            .ok_or_else(|| SourceError::Unavailable("no youtube api key configured".to_owned()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs()))
            .build()
            .map_err(|err| SourceError::Unavailable(err.to_string()))?;

        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl CommentSource for YoutubeClient {
    async fn fetch_page(
        &self,
        video_id: &str,
        page_token: Option<&str>,
        include_replies: bool,
    ) -> Result<CommentPage, SourceError> {
        let part = if include_replies { "snippet,replies" } else { "snippet" };

        let mut request = self
            .client
            .get(COMMENT_THREADS_ENDPOINT)
            .query(&[
                ("part", part),
                ("videoId", video_id),
                ("textFormat", "plainText"),
                ("key", &self.api_key),
            ])
            .query(&[("maxResults", PAGE_SIZE)]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request
            .send()
            .await
            .map_err(|err| SourceError::Unavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ApiErrorResponse>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| "no error detail".to_owned());
            return Err(SourceError::Unavailable(format!(
                "comment threads api returned status {}: {}",
                status.as_u16(),
                detail
            )));
        }

        let body: CommentThreadListResponse = response
            .json()
            .await
            .map_err(|err| SourceError::Unavailable(format!("bad api response: {}", err)))?;

        Ok(CommentPage {
            next_page_token: body.next_page_token.clone(),
            comments: records_from_response(body, include_replies),
        })
    }
}

/// Pull a video id out of whatever the user pasted: a bare 11-character id,
/// a watch url, youtu.be, shorts or embed links.
pub fn video_id_from_url(input: &str) -> Result<String, SourceError> {
    let input = input.trim();

    if looks_like_video_id(input) {
        return Ok(input.to_owned());
    }

    // users paste urls without a scheme too
    let url = Url::parse(input)
        .or_else(|_| Url::parse(&format!("https://{}", input)))
        .map_err(|_| SourceError::InvalidVideoUrl(input.to_owned()))?;

    let host = url.host_str().unwrap_or_default();
    let mut segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let candidate = if host.ends_with("youtu.be") {
        segments.pop()
    } else if let Some(v) = url.query_pairs().find(|(k, _)| k == "v").map(|(_, v)| v.into_owned()) {
        return validated_id(v, input);
    } else if segments.first() == Some(&"shorts") || segments.first() == Some(&"embed") {
        segments.get(1).copied()
    } else {
        None
    };

    match candidate {
        Some(id) => validated_id(id.to_owned(), input),
        None => Err(SourceError::InvalidVideoUrl(input.to_owned())),
    }
}

fn validated_id(id: String, input: &str) -> Result<String, SourceError> {
    if looks_like_video_id(&id) {
        Ok(id)
    } else {
        Err(SourceError::InvalidVideoUrl(input.to_owned()))
    }
}

fn looks_like_video_id(s: &str) -> bool {
    s.len() == 11 && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// commentThreads response shape, limited to the fields the pipeline reads.

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CommentThreadListResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
    next_page_token: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CommentThread {
    snippet: CommentThreadSnippet,
    replies: Option<Replies>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippet {
    top_level_comment: CommentItem,
}

#[derive(Deserialize, Debug)]
struct Replies {
    #[serde(default)]
    comments: Vec<CommentItem>,
}

#[derive(Deserialize, Debug)]
struct CommentItem {
    id: String,
    snippet: CommentSnippet,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    text_original: Option<String>,
    text_display: Option<String>,
    author_display_name: Option<String>,
    published_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

fn records_from_response(body: CommentThreadListResponse, include_replies: bool) -> Vec<CommentRecord> {
    let mut records = Vec::new();

    for thread in body.items {
        records.push(into_record(thread.snippet.top_level_comment, false));

        if include_replies {
            if let Some(replies) = thread.replies {
                for reply in replies.comments {
                    records.push(into_record(reply, true));
                }
            }
        }
    }

    records
}

fn into_record(item: CommentItem, is_reply: bool) -> CommentRecord {
    CommentRecord {
        id: item.id,
        text: item
            .snippet
            .text_original
            .or(item.snippet.text_display)
            .unwrap_or_default(),
        author: item.snippet.author_display_name,
        published_at: item.snippet.published_at,
        is_reply,
    }
}
