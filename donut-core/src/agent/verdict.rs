//! Turning the model's raw answer into the playful part of a reply

use serde::Deserialize;

use crate::error::{Error, Result};

/// Structured rating returned by the judge persona
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoryVerdict {
    /// Rating, clamped to 1..=10 when rendered
    pub score: i64,
    /// Encouraging comment
    pub comment: String,
}

impl StoryVerdict {
    /// Comment followed by the rating
    pub fn render(&self) -> String {
        format!(
            "{} Story rating: {}/10",
            self.comment.trim(),
            self.score.clamp(1, 10)
        )
    }
}

/// Strip a surrounding markdown code fence, if present
pub fn strip_code_fence(raw: &str) -> &str {
    let raw = raw.trim();
    if !raw.starts_with("```") {
        return raw;
    }
    // Drop the opening fence line (``` or ```json)
    let body = raw.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
    body.rsplit_once("```")
        .map(|(inner, _)| inner)
        .unwrap_or(body)
        .trim()
}

/// Extract the playful text from a completion.
///
/// A JSON verdict is rendered as comment plus rating; any other non-empty
/// text is used as is. Empty output counts as a failed completion.
pub fn interpret_reply(raw: &str) -> Result<String> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(Error::completion("empty completion"));
    }

    match serde_json::from_str::<StoryVerdict>(body) {
        Ok(verdict) if !verdict.comment.trim().is_empty() => Ok(verdict.render()),
        Ok(_) => Err(Error::completion("verdict without comment")),
        Err(_) => Ok(body.to_string()),
    }
}
