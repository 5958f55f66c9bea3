//! Decoding of raw response bodies

use super::types::SearchResult;
use crate::error::{Result, SearchError};
use serde_json::Value;

/// Decodes Instant Answer JSON into [`SearchResult`]
///
/// Strict only about the body being a JSON object; individual fields that
/// are missing or oddly typed fall back to their defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultDecoder;

impl ResultDecoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(&self, text: &str) -> Result<SearchResult> {
        decode(text)
    }
}

/// Decode a response body
pub fn decode(text: &str) -> Result<SearchResult> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| SearchError::decode(e.to_string(), text))?;

    if !value.is_object() {
        return Err(SearchError::decode(
            format!("expected a JSON object, found {}", kind_of(&value)),
            text,
        ));
    }

    serde_json::from_value(value).map_err(|e| SearchError::decode(e.to_string(), text))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SNIPPET_LIMIT;
    use crate::results::{Icon, RelatedTopic};

    const CAT_RESPONSE: &str = r#"{
        "Abstract": "",
        "AbstractText": "",
        "AbstractSource": "Wikipedia",
        "AbstractURL": "https://en.wikipedia.org/wiki/Cat_(disambiguation)",
        "Answer": "",
        "AnswerType": "",
        "Definition": "",
        "DefinitionSource": "",
        "DefinitionURL": "",
        "Entity": "",
        "Heading": "Cat",
        "Image": "",
        "ImageHeight": "",
        "Infobox": "",
        "Redirect": "",
        "RelatedTopics": [
            {
                "FirstURL": "https://duckduckgo.com/Cat",
                "Icon": {"Height": "", "URL": "/i/cat.jpg", "Width": ""},
                "Result": "<a href=\"https://duckduckgo.com/Cat\">Cat</a> A small domesticated carnivorous mammal.",
                "Text": "Cat A small domesticated carnivorous mammal."
            },
            {
                "Name": "Music",
                "Topics": [
                    {
                        "FirstURL": "https://duckduckgo.com/Cat_(band)",
                        "Icon": {"Height": "", "URL": "", "Width": ""},
                        "Result": "<a href=\"https://duckduckgo.com/Cat_(band)\">Cat (band)</a>",
                        "Text": "Cat (band)"
                    }
                ]
            }
        ],
        "Results": [],
        "Type": "D",
        "meta": {"id": "wikipedia_fathead"}
    }"#;

    #[test]
    fn test_decode_disambiguation_response() {
        let result = decode(CAT_RESPONSE).unwrap();

        assert_eq!(result.heading.as_deref(), Some("Cat"));
        assert_eq!(result.result_type.as_deref(), Some("D"));
        assert_eq!(result.related_topics.len(), 2);
        assert!(result.results.is_empty());

        let music = &result.related_topics[1];
        assert_eq!(music.name.as_deref(), Some("Music"));
        assert_eq!(music.topics[0].text.as_deref(), Some("Cat (band)"));

        let suggestions = result.suggestions();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].uri, "https://duckduckgo.com/Cat");
    }

    #[test]
    fn test_missing_sequences_default_to_empty() {
        let result = decode(r#"{"Heading": "Nothing"}"#).unwrap();
        assert!(result.related_topics.is_empty());
        assert!(result.results.is_empty());
        assert_eq!(decode("{}").unwrap(), SearchResult::default());
    }

    #[test]
    fn test_not_json_is_decode_error() {
        let err = decode("not json").unwrap_err();
        assert!(err.is_decode());
        match err {
            SearchError::Decode { snippet, .. } => assert_eq!(snippet, "not json"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_object_json_is_decode_error() {
        for body in ["[]", "42", "\"text\"", "null"] {
            let err = decode(body).unwrap_err();
            assert!(err.is_decode(), "{body} should not decode");
        }
    }

    #[test]
    fn test_decode_error_snippet_is_truncated() {
        let body = format!("<html>{}</html>", "x".repeat(1000));
        match decode(&body).unwrap_err() {
            SearchError::Decode { snippet, .. } => {
                assert_eq!(snippet.chars().count(), SNIPPET_LIMIT + 1)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_round_trip_populated() {
        let original = SearchResult {
            abstract_html: Some("<b>Rust</b> is a language".to_string()),
            abstract_text: Some("Rust is a language".to_string()),
            abstract_source: Some("Wikipedia".to_string()),
            abstract_uri: Some("https://en.wikipedia.org/wiki/Rust".to_string()),
            heading: Some("Rust".to_string()),
            answer: Some(String::new()),
            answer_type: Some(String::new()),
            definition: Some("a reddish-brown coating".to_string()),
            definition_source: Some("Merriam-Webster".to_string()),
            definition_uri: Some("https://example.org/rust".to_string()),
            entity: Some("programming language".to_string()),
            image: Some("/i/rust.png".to_string()),
            redirect_uri: None,
            related_topics: vec![
                RelatedTopic {
                    icon: Some(Icon {
                        url: Some("/i/cargo.png".to_string()),
                        height: Some("16".to_string()),
                        width: Some(String::new()),
                    }),
                    result: Some("<a href=\"https://duckduckgo.com/Cargo\">Cargo</a>".to_string()),
                    ..RelatedTopic::leaf("Cargo", "https://duckduckgo.com/Cargo")
                },
                RelatedTopic::category("Tools", vec![RelatedTopic::leaf("rustup", "https://duckduckgo.com/rustup")]),
            ],
            results: vec![RelatedTopic::leaf("Official site", "https://www.rust-lang.org")],
            result_type: Some("A".to_string()),
        };

        let json = serde_json::to_string(&original).unwrap();
        assert_eq!(decode(&json).unwrap(), original);
    }

    #[test]
    fn test_round_trip_defaults() {
        let original = SearchResult::default();
        let json = serde_json::to_string(&original).unwrap();
        assert_eq!(decode(&json).unwrap(), original);
    }

    #[test]
    fn test_decoder_struct_delegates() {
        let result = ResultDecoder::new().decode(r#"{"Answer": "4"}"#).unwrap();
        assert_eq!(result.answer.as_deref(), Some("4"));
    }
}
