//! services/api/src/content/recover.rs
//!
//! Turns raw model output into a usable `SummaryRecord`. Models emit
//! imperfect JSON even when told not to, so the reply is cleaned of code
//! fences and trailing commas before parsing, and a parse failure degrades
//! into a well-formed error record instead of an error.

use corepick_core::domain::{Step, SummaryRecord};
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

/// Title used when parsing fails and no fallback title is available.
const PARSE_ERROR_TITLE: &str = "解析エラー";

/// Summary shown to the user when the model reply cannot be parsed.
const PARSE_ERROR_SUMMARY: [&str; 2] = [
    "内容の読み取りに失敗しました💦",
    "URLを確認してもう一度試してみてね。",
];

/// Placeholder the model may echo back when it found no title. Replaced by
/// the extractor's fallback title.
const NO_TITLE_PLACEHOLDER: &str = "No Title";

/// The reply shape the prompt asks for. `summary` is required; a reply
/// without it counts as a parse failure.
#[derive(Deserialize)]
struct ModelReply {
    title: Option<String>,
    summary: Vec<String>,
    #[serde(default, rename = "nextSteps")]
    next_steps: Vec<String>,
}

/// Recovers a structured summary from raw model output.
///
/// Total over its input: any string, including empty or non-JSON text,
/// yields a well-formed record.
pub fn recover_summary(raw: &str, fallback_title: &str) -> SummaryRecord {
    let cleaned = strip_code_fences(raw);
    let repaired = repair_trailing_commas(&cleaned);

    match serde_json::from_str::<ModelReply>(&repaired) {
        Ok(reply) => {
            let title = match reply.title {
                Some(title) if title != NO_TITLE_PLACEHOLDER && !title.trim().is_empty() => title,
                _ => fallback_title.to_string(),
            };
            SummaryRecord {
                title,
                summary: reply.summary,
                next_steps: Step::sequence_from_contents(reply.next_steps),
            }
        }
        Err(e) => {
            warn!("Could not parse model reply as JSON: {}", e);
            degraded_record(fallback_title)
        }
    }
}

/// Removes Markdown code-fence markers anywhere in the reply. Idempotent: a
/// fence-free string passes through unchanged.
fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Drops every comma that directly precedes a closing `}` or `]`, the one
/// malformed-JSON defect models produce routinely.
fn repair_trailing_commas(text: &str) -> String {
    let trailing_comma = Regex::new(r",(\s*[}\]])").unwrap();
    trailing_comma.replace_all(text, "$1").to_string()
}

fn degraded_record(fallback_title: &str) -> SummaryRecord {
    let title = if fallback_title.is_empty() {
        PARSE_ERROR_TITLE
    } else {
        fallback_title
    };
    SummaryRecord {
        title: title.to_string(),
        summary: PARSE_ERROR_SUMMARY.iter().map(|s| s.to_string()).collect(),
        next_steps: Vec::new(),
    }
}
