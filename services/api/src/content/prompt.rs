//! services/api/src/content/prompt.rs
//!
//! Builds the instruction text sent to the summary model. The prompt is a
//! pure function of the extraction result: same digest, same prompt.

const SUMMARY_PROMPT_TEMPLATE: &str = r#"あなたは優秀な要約アシスタントです。
以下のWebコンテンツの内容を深く理解し、ユーザーにとって有益な情報を抽出してJSON形式で出力してください。

【解析対象テキスト】
{digest}

【出力フォーマット】
以下のJSONスキーマに従ってください。Markdown記法は不要です。
{
  "title": "記事または動画のタイトル",
  "summary": ["要点1", "要点2", "要点3"],
  "nextSteps": ["ステップ1", "ステップ2", "ステップ3"]
}

【重要ルール】
1. summary: 「この記事は〜」という説明は禁止。記事の「結論」「重要な主張」を3つ抽出。
2. nextSteps: 読者が次に取るべき具体的な行動を最大3つ。
3. 言語は必ず日本語で。"#;

/// Extra rule appended for video content, where no transcript is available.
const VIDEO_RULE: &str =
    "4. 字幕は提供されないため、タイトルと概要から動画の内容を推測して要約すること。";

use corepick_core::domain::{ExtractionResult, MediaKind};

/// Renders the summary prompt for one extraction.
pub fn build_summary_prompt(extraction: &ExtractionResult) -> String {
    let mut prompt = SUMMARY_PROMPT_TEMPLATE.replace("{digest}", &extraction.digest);
    if extraction.media_kind == MediaKind::Video {
        prompt.push('\n');
        prompt.push_str(VIDEO_RULE);
    }
    prompt
}
