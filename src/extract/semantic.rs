use std::sync::LazyLock;

use regex::Regex;

use crate::dom::dom_model::{Document, NodeId};
use crate::extract::field_model::SemanticType;
use crate::extract::label::infer_label;

/// One classifier rule: matches on the native control type or on a keyword
/// pattern over the field's combined text.
pub struct SemanticRule {
    pub semantic_type: SemanticType,
    pub native_types: &'static [&'static str],
    pub keywords: Option<Regex>,
}

impl SemanticRule {
    fn new(semantic_type: SemanticType, native_types: &'static [&'static str], keywords: Option<&str>) -> Self {
        Self {
            semantic_type,
            native_types,
            // Patterns are literals in this file.
            keywords: keywords.and_then(|k| Regex::new(k).ok()),
        }
    }

    pub fn matches(&self, native_type: &str, haystack: &str) -> bool {
        self.native_types.contains(&native_type)
            || self.keywords.as_ref().is_some_and(|re| re.is_match(haystack))
    }
}

/// Evaluated top to bottom, first match wins. Order is load-bearing: phone
/// includes "number" as a keyword and must run before the number rule.
pub static RULES: LazyLock<Vec<SemanticRule>> = LazyLock::new(|| {
    vec![
        SemanticRule::new(SemanticType::Email, &["email"], Some(r"email|e-mail")),
        SemanticRule::new(SemanticType::Phone, &["tel"], Some(r"phone|mobile|contact|number")),
        SemanticRule::new(
            SemanticType::Name,
            &[],
            Some(r"name|full.name|first.name|last.name|surname"),
        ),
        SemanticRule::new(
            SemanticType::Address,
            &[],
            Some(r"address|street|city|zip|postal|country|state"),
        ),
        SemanticRule::new(SemanticType::Date, &["date"], Some(r"date|birth|dob")),
        SemanticRule::new(SemanticType::Password, &["password"], None),
        SemanticRule::new(SemanticType::Number, &["number"], Some(r"age|quantity|amount|count")),
        SemanticRule::new(SemanticType::Url, &["url"], Some(r"website|url|link")),
        SemanticRule::new(
            SemanticType::Company,
            &[],
            Some(r"company|organization|employer|business"),
        ),
        SemanticRule::new(SemanticType::Title, &[], Some(r"title|position|role|job")),
    ]
});

/// Classify from already-gathered signals. All text is lowercased before
/// matching.
pub fn classify_semantic_type(
    native_type: &str,
    label: &str,
    name: &str,
    id: &str,
    placeholder: &str,
) -> SemanticType {
    let haystack = format!("{} {} {} {}", label, name, id, placeholder).to_lowercase();

    RULES
        .iter()
        .find(|rule| rule.matches(native_type, &haystack))
        .map(|rule| rule.semantic_type)
        .unwrap_or(SemanticType::Text)
}

pub fn determine_semantic_type(doc: &Document, node: NodeId) -> SemanticType {
    let Some(el) = doc.element(node) else {
        return SemanticType::Text;
    };
    let label = infer_label(doc, node);

    classify_semantic_type(
        &el.control_type(),
        &label,
        el.name().unwrap_or(""),
        el.id().unwrap_or(""),
        el.non_empty_attr("placeholder").unwrap_or(""),
    )
}
