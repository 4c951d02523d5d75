#![forbid(unsafe_code)]

//! Flattening of the upstream "rich text" encodings.

use serde::Deserialize;
use serde_json::Value;

use crate::raw::{Lenient, lenient};

/// Text as the upstream client emits it: a bare string, an object with a
/// direct `text` (or `simpleText`) field, or an object with an ordered list
/// of styled `runs`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RichText {
    Plain(String),
    Object(TextObject),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextObject {
    #[serde(default, alias = "simpleText", deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub runs: Option<Vec<Lenient<TextRun>>>,
}

/// One fragment of a run list. Styling metadata is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextRun {
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
}

impl RichText {
    /// Flattens to plain text. A non-empty direct text wins over runs; runs
    /// are joined in order without a separator.
    pub fn to_plain(&self) -> String {
        match self {
            RichText::Plain(value) => value.clone(),
            RichText::Object(object) => {
                if let Some(text) = object.text.as_deref().filter(|text| !text.is_empty()) {
                    return text.to_string();
                }
                match &object.runs {
                    Some(runs) => runs
                        .iter()
                        .filter_map(Lenient::get)
                        .filter_map(|run| run.text.as_deref())
                        .collect(),
                    None => String::new(),
                }
            }
        }
    }
}

/// Absent text flattens to the empty string.
pub fn extract_text(value: Option<&RichText>) -> String {
    value.map(RichText::to_plain).unwrap_or_default()
}

/// Same as [`extract_text`] for an untyped JSON value.
pub fn extract_text_value(value: &Value) -> String {
    let text: Option<RichText> = serde_json::from_value(value.clone()).ok();
    extract_text(text.as_ref())
}

/// Returns the first candidate whose flattened text is non-empty.
pub(crate) fn first_text<'a>(candidates: impl IntoIterator<Item = Option<&'a RichText>>) -> String {
    candidates
        .into_iter()
        .map(extract_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_encodings_flatten_to_the_same_string() {
        let plain = json!("Günün en iyi videosu");
        let direct = json!({ "text": "Günün en iyi videosu" });
        let runs = json!({
            "runs": [
                { "text": "Günün " },
                { "text": "en iyi", "bold": true },
                { "text": " videosu" },
            ]
        });

        let expected = "Günün en iyi videosu";
        assert_eq!(extract_text_value(&plain), expected);
        assert_eq!(extract_text_value(&direct), expected);
        assert_eq!(extract_text_value(&runs), expected);
    }

    #[test]
    fn simple_text_is_a_direct_text_alias() {
        assert_eq!(extract_text_value(&json!({ "simpleText": "Merhaba" })), "Merhaba");
    }

    #[test]
    fn empty_direct_text_falls_back_to_runs() {
        let value = json!({ "text": "", "runs": [{ "text": "a" }, { "text": "b" }] });
        assert_eq!(extract_text_value(&value), "ab");
    }

    #[test]
    fn runs_without_text_contribute_nothing() {
        let value = json!({ "runs": [{ "text": "x" }, { "emoji": ":)" }, 7, { "text": "y" }] });
        assert_eq!(extract_text_value(&value), "xy");
    }

    #[test]
    fn unsupported_shapes_yield_empty_string() {
        assert_eq!(extract_text(None), "");
        for value in [json!(null), json!(12), json!(true), json!({}), json!({ "runs": "nope" })] {
            assert_eq!(extract_text_value(&value), "", "{value}");
        }
    }

    #[test]
    fn first_text_skips_empty_candidates() {
        let empty = RichText::Plain(String::new());
        let filled = RichText::Plain("second".into());
        assert_eq!(first_text([None, Some(&empty), Some(&filled)]), "second");
        assert_eq!(first_text([None, Some(&empty)]), "");
    }
}
