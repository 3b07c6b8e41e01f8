use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dom::dom_model::{Document, NodeId};

// ============================================================================
// Locator: a re-resolvable, string-serializable element reference
// ============================================================================

/// How to find an element again later, after every in-memory handle is gone.
///
/// Only `Id` is expected to be unique. Generation checks that `Name` and
/// `Class` resolve back to their element, but any non-id locator may point
/// elsewhere once the document mutates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// `#id`
    Id(String),
    /// `tag[name="..."]`
    Name { tag: String, name: String },
    /// `tag.class`
    Class { tag: String, class: String },
    /// `parent > tag:nth-child(n)`, 1-based among the parent's element children.
    Positional {
        parent_tag: String,
        tag: String,
        position: usize,
    },
    /// Bare tag name.
    Tag(String),
}

impl Locator {
    /// Build the most specific locator available for an element:
    /// id, then name, then first class token, then position, then tag.
    /// Name and class are skipped when an earlier element shares them.
    pub fn generate(doc: &Document, node: NodeId) -> Option<Locator> {
        let el = doc.element(node)?;
        let tag = el.tag.clone();

        if let Some(id) = el.id() {
            return Some(Locator::Id(id.to_string()));
        }

        // Name and class only count when they lead back to this element;
        // radio groups and repeated widgets share both.
        let by_name = el.name().map(|name| Locator::Name {
            tag: tag.clone(),
            name: name.to_string(),
        });
        let by_class = el.class_tokens().next().map(|class| Locator::Class {
            tag: tag.clone(),
            class: class.to_string(),
        });
        if let Some(locator) = [by_name, by_class]
            .into_iter()
            .flatten()
            .find(|locator| locator.resolve(doc) == Some(node))
        {
            return Some(locator);
        }

        if let Some(parent) = doc.parent_element(node) {
            let parent_tag = doc.element(parent)?.tag.clone();
            let position = doc
                .element_children(parent)
                .iter()
                .position(|c| *c == node)
                .map(|i| i + 1)?;
            return Some(Locator::Positional {
                parent_tag,
                tag,
                position,
            });
        }

        Some(Locator::Tag(tag))
    }

    /// First element in document order the locator matches.
    pub fn resolve(&self, doc: &Document) -> Option<NodeId> {
        match self {
            Locator::Id(id) => doc.element_by_id(id),
            Locator::Name { tag, name } => {
                doc.find_element(|el| el.is(tag) && el.attr("name") == Some(name.as_str()))
            }
            Locator::Class { tag, class } => {
                doc.find_element(|el| el.is(tag) && el.class_tokens().any(|c| c == class))
            }
            Locator::Positional {
                parent_tag,
                tag,
                position,
            } => doc.all_elements().into_iter().find(|candidate| {
                let Some(el) = doc.element(*candidate) else {
                    return false;
                };
                if !el.is(tag) {
                    return false;
                }
                let Some(parent) = doc.parent_element(*candidate) else {
                    return false;
                };
                if !doc.element(parent).is_some_and(|p| p.is(parent_tag)) {
                    return false;
                }
                doc.element_children(parent)
                    .iter()
                    .position(|c| c == candidate)
                    .is_some_and(|i| i + 1 == *position)
            }),
            Locator::Tag(tag) => doc.find_element(|el| el.is(tag)),
        }
    }

    /// Whether this locator is guaranteed to address a single element.
    pub fn is_unique(&self) -> bool {
        matches!(self, Locator::Id(_))
    }
}

// ============================================================================
// String form
// ============================================================================

fn escape_quoted(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

fn unescape_quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "#{}", id),
            Locator::Name { tag, name } => write!(f, "{}[name=\"{}\"]", tag, escape_quoted(name)),
            Locator::Class { tag, class } => write!(f, "{}.{}", tag, class),
            Locator::Positional {
                parent_tag,
                tag,
                position,
            } => write!(f, "{} > {}:nth-child({})", parent_tag, tag, position),
            Locator::Tag(tag) => f.write_str(tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocatorParseError(pub String);

impl fmt::Display for LocatorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid locator '{}'", self.0)
    }
}

impl std::error::Error for LocatorParseError {}

impl FromStr for Locator {
    type Err = LocatorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LocatorParseError(s.to_string());
        let s = s.trim();
        if s.is_empty() {
            return Err(invalid());
        }

        if let Some(id) = s.strip_prefix('#') {
            return Ok(Locator::Id(id.to_string()));
        }

        if let Some((tag, rest)) = s.split_once("[name=\"") {
            let name = rest.strip_suffix("\"]").ok_or_else(invalid)?;
            return Ok(Locator::Name {
                tag: tag.to_string(),
                name: unescape_quoted(name),
            });
        }

        if let Some((parent_tag, rest)) = s.split_once(" > ") {
            let (tag, nth) = rest.split_once(":nth-child(").ok_or_else(invalid)?;
            let position = nth
                .strip_suffix(')')
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(invalid)?;
            return Ok(Locator::Positional {
                parent_tag: parent_tag.to_string(),
                tag: tag.to_string(),
                position,
            });
        }

        if let Some((tag, class)) = s.split_once('.') {
            if tag.is_empty() || class.is_empty() {
                return Err(invalid());
            }
            return Ok(Locator::Class {
                tag: tag.to_string(),
                class: class.to_string(),
            });
        }

        Ok(Locator::Tag(s.to_string()))
    }
}

impl Serialize for Locator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Locator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
