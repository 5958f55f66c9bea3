//! Result type definitions

use super::lenient;
use serde::{Deserialize, Serialize};

/// Decoded Instant Answer response
///
/// Every scalar field is optional. `related_topics` and `results` default to
/// empty when the response leaves them out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Topic summary, may contain HTML
    #[serde(
        rename = "Abstract",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub abstract_html: Option<String>,
    /// Topic summary without HTML
    #[serde(
        rename = "AbstractText",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub abstract_text: Option<String>,
    /// Name of the abstract's source
    #[serde(
        rename = "AbstractSource",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub abstract_source: Option<String>,
    /// Deep link to the abstract's source
    #[serde(
        rename = "AbstractURL",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub abstract_uri: Option<String>,
    /// Name of the topic
    #[serde(
        rename = "Heading",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub heading: Option<String>,
    /// Instant answer
    #[serde(
        rename = "Answer",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub answer: Option<String>,
    /// Kind of instant answer (calc, color, digest, ...)
    #[serde(
        rename = "AnswerType",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub answer_type: Option<String>,
    #[serde(
        rename = "Definition",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub definition: Option<String>,
    #[serde(
        rename = "DefinitionSource",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub definition_source: Option<String>,
    #[serde(
        rename = "DefinitionURL",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub definition_uri: Option<String>,
    #[serde(
        rename = "Entity",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub entity: Option<String>,
    #[serde(
        rename = "Image",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<String>,
    /// Target of a !bang redirect
    #[serde(
        rename = "Redirect",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub redirect_uri: Option<String>,
    /// Internal links, leaves and categories mixed
    #[serde(rename = "RelatedTopics", default, deserialize_with = "lenient::topics")]
    pub related_topics: Vec<RelatedTopic>,
    /// External links, mostly official sites
    #[serde(rename = "Results", default, deserialize_with = "lenient::topics")]
    pub results: Vec<RelatedTopic>,
    /// Response category: A (article), D (disambiguation), C (category),
    /// N (name), E (exclusive) or empty
    #[serde(
        rename = "Type",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub result_type: Option<String>,
}

impl SearchResult {
    /// Leaf related topics with non-empty text, in response order.
    ///
    /// Category groupings are dropped, not flattened.
    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.related_topics
            .iter()
            .filter_map(RelatedTopic::suggestion)
            .collect()
    }

    /// True when the response carries no answer, abstract, definition or links
    pub fn is_empty(&self) -> bool {
        let blank = |field: &Option<String>| field.as_deref().map_or(true, str::is_empty);

        blank(&self.abstract_text)
            && blank(&self.answer)
            && blank(&self.definition)
            && blank(&self.redirect_uri)
            && self.related_topics.is_empty()
            && self.results.is_empty()
    }
}

/// Whether a related topic is a link or a grouping of further topics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    Leaf,
    Category,
}

/// Entry of `RelatedTopics` or `Results`
///
/// The API mixes two shapes in the same array: leaves with `Text` and
/// `FirstURL`, and categories with `Name` and nested `Topics`. Both decode
/// into this one struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedTopic {
    #[serde(
        rename = "Text",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Option<String>,
    #[serde(
        rename = "FirstURL",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_uri: Option<String>,
    #[serde(
        rename = "Icon",
        default,
        deserialize_with = "lenient::icon",
        skip_serializing_if = "Option::is_none"
    )]
    pub icon: Option<Icon>,
    /// HTML link for the topic
    #[serde(
        rename = "Result",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<String>,
    /// Category name, only on groupings
    #[serde(
        rename = "Name",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        rename = "Topics",
        default,
        deserialize_with = "lenient::topics",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub topics: Vec<RelatedTopic>,
}

impl RelatedTopic {
    pub fn leaf(text: impl Into<String>, first_uri: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            first_uri: Some(first_uri.into()),
            ..Default::default()
        }
    }

    pub fn category(name: impl Into<String>, topics: Vec<RelatedTopic>) -> Self {
        Self {
            name: Some(name.into()),
            topics,
            ..Default::default()
        }
    }

    pub fn kind(&self) -> TopicKind {
        let has_text = self.text.as_deref().is_some_and(|t| !t.is_empty());
        if !has_text && (!self.topics.is_empty() || self.name.is_some()) {
            TopicKind::Category
        } else {
            TopicKind::Leaf
        }
    }

    /// Suggestion for this entry, if it carries non-blank text
    pub fn suggestion(&self) -> Option<Suggestion> {
        let text = self.text.as_deref()?;
        if text.trim().is_empty() {
            return None;
        }

        Some(Suggestion {
            text: text.to_string(),
            uri: self.first_uri.clone().unwrap_or_default(),
        })
    }

    /// All leaves below this entry, depth-first, including itself
    pub fn leaves(&self) -> Vec<&RelatedTopic> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a RelatedTopic>) {
        match self.kind() {
            TopicKind::Leaf => out.push(self),
            TopicKind::Category => {
                for topic in &self.topics {
                    topic.collect_leaves(out);
                }
            }
        }
    }
}

/// Icon attached to a related topic
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    #[serde(
        rename = "URL",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,
    /// Height in pixels; the API sends either a number or an empty string
    #[serde(
        rename = "Height",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub height: Option<String>,
    #[serde(
        rename = "Width",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub width: Option<String>,
}

/// Entry of a suggestion list handed to the UI
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    pub uri: String,
}
