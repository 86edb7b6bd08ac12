// file: src/models/verdict.rs
// description: GPT suitability verdict model and reply parsing
// reference: https://platform.openai.com/docs/guides/structured-outputs

use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GptVerdict {
    pub suitable: bool,
    pub confidence: f32,
    #[serde(default)]
    pub reasoning: String,
}

impl GptVerdict {
    pub fn new(suitable: bool, confidence: f32, reasoning: String) -> Self {
        Self {
            suitable,
            confidence,
            reasoning,
        }
        .normalized()
    }

    /// Parses a chat-completion reply into a verdict. Models are asked for a
    /// bare JSON object but sometimes wrap it in prose or code fences, so a
    /// brace-delimited substring is tried before giving up.
    pub fn parse_reply(reply: &str) -> Result<Self> {
        let trimmed = reply.trim();

        if let Ok(verdict) = serde_json::from_str::<GptVerdict>(trimmed) {
            return Ok(verdict.normalized());
        }

        if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
            if start < end {
                if let Ok(verdict) = serde_json::from_str::<GptVerdict>(&trimmed[start..=end]) {
                    return Ok(verdict.normalized());
                }
            }
        }

        let preview: String = trimmed.chars().take(200).collect();
        Err(SearchError::GptFilter(format!(
            "Unparseable GPT verdict: {}",
            preview
        )))
    }

    /// A row survives filtering only when the model judged it suitable with
    /// confidence at or above the threshold.
    pub fn passes(&self, threshold: f32) -> bool {
        self.suitable && self.confidence >= threshold
    }

    pub fn label(&self) -> &'static str {
        if self.suitable { "suitable" } else { "not suitable" }
    }

    fn normalized(mut self) -> Self {
        if !self.confidence.is_finite() {
            self.confidence = 0.0;
        }
        self.confidence = self.confidence.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_json() {
        let verdict = GptVerdict::parse_reply(
            r#"{"suitable": true, "confidence": 0.85, "reasoning": "Case-control AD study"}"#,
        )
        .unwrap();

        assert!(verdict.suitable);
        assert!((verdict.confidence - 0.85).abs() < f32::EPSILON);
        assert_eq!(verdict.reasoning, "Case-control AD study");
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let reply = "Sure, here is my assessment:\n```json\n{\"suitable\": false, \"confidence\": 0.9}\n```";
        let verdict = GptVerdict::parse_reply(reply).unwrap();

        assert!(!verdict.suitable);
        assert_eq!(verdict.reasoning, "");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(GptVerdict::parse_reply("it depends").is_err());
        assert!(GptVerdict::parse_reply("").is_err());
        assert!(GptVerdict::parse_reply("{\"suitable\": \"maybe\"}").is_err());
    }

    #[test]
    fn test_confidence_clamped() {
        let verdict = GptVerdict::parse_reply(r#"{"suitable": true, "confidence": 1.7}"#).unwrap();
        assert_eq!(verdict.confidence, 1.0);

        let verdict = GptVerdict::parse_reply(r#"{"suitable": true, "confidence": -0.2}"#).unwrap();
        assert_eq!(verdict.confidence, 0.0);
    }

    #[test]
    fn test_passes_requires_both_suitable_and_confident() {
        let confident_yes = GptVerdict::new(true, 0.8, String::new());
        let hesitant_yes = GptVerdict::new(true, 0.4, String::new());
        let confident_no = GptVerdict::new(false, 0.95, String::new());

        assert!(confident_yes.passes(0.6));
        assert!(!hesitant_yes.passes(0.6));
        assert!(!confident_no.passes(0.6));
    }

    #[test]
    fn test_passes_at_exact_threshold() {
        let verdict = GptVerdict::new(true, 0.6, String::new());
        assert!(verdict.passes(0.6));
    }
}
