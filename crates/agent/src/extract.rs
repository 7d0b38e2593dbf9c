//! Structured block extraction
//!
//! The model embeds a JSON summary inside free-form prose. Extraction
//! is a permissive single-shot heuristic: first `{` to last `}`,
//! parsed as-is. It does not balance nested braces; malformed or
//! multiply-nested payloads degrade to "no block this turn". The
//! heuristic is isolated here so a stricter delimiter protocol could
//! replace it without touching the turn processor.

use serde::Deserialize;

use receptionist_core::AppointmentDraft;

/// Find and parse the first JSON-like block in text.
///
/// Pure; never panics. Returns `None` when no brace pair exists or the
/// span between the braces is not valid JSON.
pub fn extract_json_block(text: &str) -> Option<serde_json::Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Remove the `{..}` span and any surrounding backtick or fence
/// delimiters, leaving only the speakable prose.
///
/// Returns the input unchanged when no brace pair exists.
pub fn strip_json_block(text: &str) -> String {
    let (start, end) = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => (start, end),
        _ => return text.to_string(),
    };

    let prefix = trim_fence_suffix(&text[..start]);
    let suffix = trim_fence_prefix(&text[end + 1..]);

    if prefix.is_empty() {
        suffix.to_string()
    } else if suffix.is_empty() {
        prefix.to_string()
    } else {
        format!("{} {}", prefix, suffix)
    }
}

/// Strip a trailing code-fence opener ("```json", "```", backticks)
/// from the prose before the block.
fn trim_fence_suffix(prefix: &str) -> &str {
    let mut trimmed = prefix.trim_end();
    for marker in ["```json", "```JSON", "```"] {
        if let Some(rest) = trimmed.strip_suffix(marker) {
            trimmed = rest.trim_end();
            break;
        }
    }
    trimmed.trim_end_matches('`').trim_end()
}

/// Strip a leading code-fence closer from the prose after the block.
fn trim_fence_prefix(suffix: &str) -> &str {
    suffix
        .trim_start()
        .trim_start_matches('`')
        .trim_start()
}

/// The summary object the system prompt asks the model to emit
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CallSummary {
    #[serde(default)]
    pub bangla_notes: Option<String>,
    #[serde(default)]
    pub english_notes: Option<String>,
    /// Null when no appointment was discussed
    #[serde(default)]
    pub appointment_data: Option<AppointmentDraft>,
}

impl CallSummary {
    /// Deserialize from an extracted block, tolerating unknown keys
    /// and missing fields.
    pub fn from_value(value: &serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    pub fn has_notes(&self) -> bool {
        self.bangla_notes.as_deref().is_some_and(|s| !s.is_empty())
            || self.english_notes.as_deref().is_some_and(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_object_regardless_of_prose() {
        let text = "ঠিক আছে, বুক করা হয়েছে। {\"appointment_data\": {\"patient_name\": \"Jane\"}} ধন্যবাদ!";
        let value = extract_json_block(text).unwrap();
        assert_eq!(
            value["appointment_data"]["patient_name"],
            serde_json::json!("Jane")
        );

        let bare = extract_json_block("{\"a\": 1}").unwrap();
        assert_eq!(bare["a"], serde_json::json!(1));
    }

    #[test]
    fn test_no_braces_returns_none() {
        assert!(extract_json_block("no structured data here").is_none());
        assert!(extract_json_block("").is_none());
        assert!(extract_json_block("only } closing").is_none());
        assert!(extract_json_block("only { opening").is_none());
    }

    #[test]
    fn test_reversed_braces_return_none() {
        assert!(extract_json_block("} backwards {").is_none());
    }

    #[test]
    fn test_malformed_json_returns_none() {
        assert!(extract_json_block("prefix {not json at all} suffix").is_none());
        assert!(extract_json_block("{\"unterminated\": ").is_none());
    }

    #[test]
    fn test_multiple_objects_fail_single_shot() {
        // First-{ to last-} spans both objects; the heuristic does not
        // balance braces, so this degrades to None.
        assert!(extract_json_block("{\"a\": 1} and {\"b\": 2}").is_none());
    }

    #[test]
    fn test_strip_removes_block_and_fences() {
        let text = "আপনার বুকিং হয়ে গেছে।\n```json\n{\"appointment_data\": {}}\n```\nধন্যবাদ!";
        let spoken = strip_json_block(text);
        assert!(!spoken.contains('{'));
        assert!(!spoken.contains('}'));
        assert!(!spoken.contains('`'));
        assert!(spoken.contains("আপনার বুকিং হয়ে গেছে।"));
        assert!(spoken.contains("ধন্যবাদ!"));
    }

    #[test]
    fn test_strip_without_block_is_identity() {
        assert_eq!(strip_json_block("hello there"), "hello there");
    }

    #[test]
    fn test_strip_block_only_text_is_empty() {
        assert_eq!(strip_json_block("{\"a\": 1}"), "");
        assert_eq!(strip_json_block("```json {\"a\": 1} ```"), "");
    }

    #[test]
    fn test_summary_with_null_appointment() {
        let value = extract_json_block(
            r#"{"bangla_notes": "নোট", "english_notes": "note", "appointment_data": null}"#,
        )
        .unwrap();
        let summary = CallSummary::from_value(&value);
        assert!(summary.has_notes());
        assert!(summary.appointment_data.is_none());
    }

    #[test]
    fn test_summary_with_draft() {
        let value = extract_json_block(
            r#"{"appointment_data": {"patient_name": "Jane Doe", "date": "2024-01-02", "time": "15:00"}}"#,
        )
        .unwrap();
        let summary = CallSummary::from_value(&value);
        assert!(!summary.has_notes());
        let draft = summary.appointment_data.as_ref().unwrap();
        assert!(draft.is_committable());
    }

    #[test]
    fn test_summary_tolerates_junk_shape() {
        let value = serde_json::json!({"something": "else"});
        let summary = CallSummary::from_value(&value);
        assert!(summary.appointment_data.is_none());
    }
}
