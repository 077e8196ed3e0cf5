//! services/api/src/web/summary_task.rs
//!
//! This module contains the summarization flow for a single URL: extract a
//! bounded text digest, ask the model, and recover a structured summary from
//! whatever came back.

use crate::content::{markup, prompt::build_summary_prompt, recover::recover_summary};
use corepick_core::domain::{ExtractionResult, MediaKind, SummaryRecord};
use corepick_core::ports::{ContentFetchService, GenerativeService, PortResult};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Fallback title for video URLs whose metadata lookup failed.
const VIDEO_TITLE_PLACEHOLDER: &str = "YouTube動画";

/// Title used when a page offers neither `og:title` nor a `<title>` tag.
const NO_TITLE: &str = "No Title";

/// Body text is cut to this many characters before it enters the digest.
/// Keeps the prompt well under model input limits while leaving room for
/// long articles.
const BODY_TEXT_CHAR_BUDGET: usize = 20_000;

//=========================================================================================
// Extractor
//=========================================================================================

/// Produces the bounded text digest for one URL.
pub struct Extractor {
    fetcher: Arc<dyn ContentFetchService>,
}

impl Extractor {
    pub fn new(fetcher: Arc<dyn ContentFetchService>) -> Self {
        Self { fetcher }
    }

    /// Fetches a URL and reduces it to a title plus labeled digest.
    ///
    /// Page-fetch failures propagate. The video title lookup is best-effort:
    /// on failure the title degrades to a placeholder and extraction carries
    /// on.
    pub async fn extract(&self, url: &str) -> PortResult<ExtractionResult> {
        let media_kind = MediaKind::classify(url);

        // On the video path the host's metadata endpoint owns the title.
        let title_override = match media_kind {
            MediaKind::Video => Some(self.video_title(url).await),
            MediaKind::Generic => None,
        };

        let html = self.fetcher.fetch_page(url, media_kind).await?;
        let page = markup::read_page(&html);

        let title = title_override
            .or(page.og_title)
            .or(page.title_tag)
            .unwrap_or_else(|| NO_TITLE.to_string());

        // A watch page's body is player markup, not content, so video
        // digests are built from metadata alone.
        let body_text = match media_kind {
            MediaKind::Video => None,
            MediaKind::Generic => Some(markup::truncate_chars(
                &page.body_text,
                BODY_TEXT_CHAR_BUDGET,
            )),
        };

        let digest = compose_digest(&title, &page.description, body_text.as_deref());
        Ok(ExtractionResult {
            title,
            digest,
            media_kind,
        })
    }

    async fn video_title(&self, url: &str) -> String {
        match self.fetcher.fetch_video_title(url).await {
            Ok(title) => title,
            Err(e) => {
                debug!("Video title lookup failed for {}: {}", url, e);
                VIDEO_TITLE_PLACEHOLDER.to_string()
            }
        }
    }
}

/// Lays out the labeled digest sections: title, meta description, and the
/// optional body text.
fn compose_digest(title: &str, description: &str, body_text: Option<&str>) -> String {
    let mut digest = format!("【タイトル】: {}\n【メタ情報・概要】: {}", title, description);
    if let Some(body) = body_text {
        digest.push_str("\n【ページ本文】: ");
        digest.push_str(body);
    }
    digest
}

//=========================================================================================
// SummaryPipeline
//=========================================================================================

/// The stateless summarization pipeline: extract, prompt, generate, recover.
/// Persisting the result is the caller's business.
pub struct SummaryPipeline {
    extractor: Extractor,
    model: Arc<dyn GenerativeService>,
}

impl SummaryPipeline {
    pub fn new(fetcher: Arc<dyn ContentFetchService>, model: Arc<dyn GenerativeService>) -> Self {
        Self {
            extractor: Extractor::new(fetcher),
            model,
        }
    }

    /// Runs the whole flow for one URL.
    ///
    /// Fetch and model failures propagate; a malformed model reply does not,
    /// it degrades into an error record with a 200-shaped body.
    pub async fn run(&self, url: &str) -> PortResult<SummaryRecord> {
        let start_time = Instant::now();

        let extraction = self.extractor.extract(url).await?;
        info!(
            "Extracted a {}-char digest from {}",
            extraction.digest.chars().count(),
            url
        );

        let prompt = build_summary_prompt(&extraction);
        let raw_reply = self.model.generate(&prompt).await?;
        debug!("📦 Raw model reply: {}", raw_reply);

        let record = recover_summary(&raw_reply, &extraction.title);
        info!("⏱️ Summarized {} in {:?}", url, start_time.elapsed());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use corepick_core::ports::PortError;

    const ARTICLE_HTML: &str = "<html><head>\
         <title>Tag Title</title>\
         <meta name='description' content='short description'>\
         </head><body><script>var x;</script>Hello World</body></html>";

    /// Serves a fixed page; the video title is optional.
    struct StubFetcher {
        html: String,
        video_title: Option<String>,
    }

    impl StubFetcher {
        fn page(html: &str) -> Self {
            Self {
                html: html.to_string(),
                video_title: None,
            }
        }
    }

    #[async_trait]
    impl ContentFetchService for StubFetcher {
        async fn fetch_page(&self, _url: &str, _kind: MediaKind) -> PortResult<String> {
            Ok(self.html.clone())
        }

        async fn fetch_video_title(&self, url: &str) -> PortResult<String> {
            self.video_title
                .clone()
                .ok_or_else(|| PortError::Fetch(format!("stub lookup failed for {}", url)))
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl ContentFetchService for FailingFetcher {
        async fn fetch_page(&self, url: &str, _kind: MediaKind) -> PortResult<String> {
            Err(PortError::Fetch(format!("connection refused: {}", url)))
        }

        async fn fetch_video_title(&self, url: &str) -> PortResult<String> {
            Err(PortError::Fetch(format!("connection refused: {}", url)))
        }
    }

    struct StubModel {
        reply: String,
    }

    #[async_trait]
    impl GenerativeService for StubModel {
        async fn generate(&self, _prompt: &str) -> PortResult<String> {
            Ok(self.reply.clone())
        }
    }

    fn extractor(fetcher: StubFetcher) -> Extractor {
        Extractor::new(Arc::new(fetcher))
    }

    #[tokio::test]
    async fn extract_reads_the_title_and_the_stripped_body() {
        let result = extractor(StubFetcher::page(ARTICLE_HTML))
            .extract("https://example.com/post")
            .await
            .unwrap();

        assert_eq!(result.title, "Tag Title");
        assert_eq!(result.media_kind, MediaKind::Generic);
        assert!(result.digest.contains("【ページ本文】: Hello World"));
        assert!(result.digest.contains("【メタ情報・概要】: short description"));
        assert!(!result.digest.contains("var x"));
    }

    #[tokio::test]
    async fn extract_prefers_og_title_over_the_title_tag() {
        let html = "<html><head>\
             <title>Tag Title</title>\
             <meta property='og:title' content='OG Title'>\
             </head><body>text</body></html>";
        let result = extractor(StubFetcher::page(html))
            .extract("https://example.com")
            .await
            .unwrap();
        assert_eq!(result.title, "OG Title");
    }

    #[tokio::test]
    async fn extract_defaults_the_title_when_the_page_has_none() {
        let result = extractor(StubFetcher::page("<html><body>just text</body></html>"))
            .extract("https://example.com")
            .await
            .unwrap();
        assert_eq!(result.title, "No Title");
    }

    #[tokio::test]
    async fn video_extraction_uses_the_oembed_title_and_skips_the_body() {
        let html = "<html><head>\
             <meta property='og:description' content='video blurb'>\
             </head><body>player chrome and comments</body></html>";
        let fetcher = StubFetcher {
            html: html.to_string(),
            video_title: Some("公式動画タイトル".to_string()),
        };

        let result = extractor(fetcher)
            .extract("https://www.youtube.com/watch?v=abc")
            .await
            .unwrap();

        assert_eq!(result.media_kind, MediaKind::Video);
        assert_eq!(result.title, "公式動画タイトル");
        assert!(result.digest.contains("video blurb"));
        assert!(!result.digest.contains("【ページ本文】"));
    }

    #[tokio::test]
    async fn a_failed_video_lookup_degrades_to_the_placeholder_title() {
        let html = "<html><head>\
             <meta property='og:title' content='Page OG Title'>\
             </head><body></body></html>";
        let result = extractor(StubFetcher::page(html))
            .extract("https://youtu.be/abc")
            .await
            .unwrap();
        assert_eq!(result.title, "YouTube動画");
    }

    #[tokio::test]
    async fn long_bodies_are_cut_to_the_char_budget() {
        let long_body = "あ".repeat(BODY_TEXT_CHAR_BUDGET + 500);
        let html = format!("<html><body>{}</body></html>", long_body);
        let result = extractor(StubFetcher::page(&html))
            .extract("https://example.com")
            .await
            .unwrap();

        let body_section = result.digest.split("【ページ本文】: ").nth(1).unwrap();
        assert_eq!(body_section.chars().count(), BODY_TEXT_CHAR_BUDGET);
    }

    #[tokio::test]
    async fn run_parses_a_well_formed_reply() {
        let reply = "```json\n{\"title\": \"要約タイトル\", \"summary\": [\"p1\"], \"nextSteps\": [\"n1\",]}\n```";
        let pipeline = SummaryPipeline::new(
            Arc::new(StubFetcher::page(ARTICLE_HTML)),
            Arc::new(StubModel {
                reply: reply.to_string(),
            }),
        );

        let record = pipeline.run("https://example.com/post").await.unwrap();
        assert_eq!(record.title, "要約タイトル");
        assert_eq!(record.summary, vec!["p1"]);
        assert_eq!(record.next_steps.len(), 1);
    }

    #[tokio::test]
    async fn run_degrades_instead_of_failing_on_gibberish() {
        let pipeline = SummaryPipeline::new(
            Arc::new(StubFetcher::page(ARTICLE_HTML)),
            Arc::new(StubModel {
                reply: "すみません、要約できません。".to_string(),
            }),
        );

        let record = pipeline.run("https://example.com/post").await.unwrap();
        assert_eq!(record.title, "Tag Title");
        assert_eq!(record.summary[0], "内容の読み取りに失敗しました💦");
        assert!(record.next_steps.is_empty());
    }

    #[tokio::test]
    async fn run_propagates_fetch_failures() {
        let pipeline = SummaryPipeline::new(
            Arc::new(FailingFetcher),
            Arc::new(StubModel {
                reply: String::new(),
            }),
        );

        let result = pipeline.run("https://example.com/down").await;
        assert!(matches!(result, Err(PortError::Fetch(_))));
    }
}
