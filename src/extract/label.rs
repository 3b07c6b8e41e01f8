use serde::{Deserialize, Serialize};

use crate::dom::dom_model::{Document, NodeId};

pub const UNKNOWN_LABEL: &str = "Unknown Field";

/// Container text shorter than this (in characters) is taken as the label.
pub const CONTAINER_TEXT_MAX: usize = 100;

/// Sibling text shorter than this (in characters) is taken as the label.
pub const SIBLING_TEXT_MAX: usize = 50;

/// Which step of the fallback chain produced a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelSource {
    ForAttribute,
    WrappingLabel,
    PrecedingLabel,
    NearbyText,
    Attribute,
    Fallback,
}

type LabelStrategy = fn(&Document, NodeId) -> Option<String>;

/// Ordered chain: structural association, then proximity, then attributes.
/// First strategy returning non-empty text wins.
const STRATEGIES: &[(LabelSource, LabelStrategy)] = &[
    (LabelSource::ForAttribute, label_by_for_attribute),
    (LabelSource::WrappingLabel, label_by_wrapping_label),
    (LabelSource::PrecedingLabel, label_by_preceding_sibling),
    (LabelSource::NearbyText, label_by_nearby_text),
    (LabelSource::Attribute, label_by_attributes),
];

pub fn infer_label(doc: &Document, node: NodeId) -> String {
    infer_label_with_source(doc, node).0
}

pub fn infer_label_with_source(doc: &Document, node: NodeId) -> (String, LabelSource) {
    STRATEGIES
        .iter()
        .find_map(|(source, strategy)| {
            strategy(doc, node)
                .filter(|label| !label.is_empty())
                .map(|label| (label, *source))
        })
        .unwrap_or_else(|| (UNKNOWN_LABEL.to_string(), LabelSource::Fallback))
}

/// Text with the control's own current value removed once, so a label that
/// wraps a pre-filled control does not echo the user's input.
fn text_without_value(doc: &Document, container: NodeId, control: NodeId) -> String {
    let text = doc.text_content(container);
    let value = doc.control_value(control);
    if value.is_empty() {
        text
    } else {
        text.replacen(&value, "", 1)
    }
}

fn label_by_for_attribute(doc: &Document, node: NodeId) -> Option<String> {
    let id = doc.element(node)?.id()?;
    let label = doc.find_element(|el| el.is("label") && el.attr("for") == Some(id))?;
    Some(doc.text_content(label).trim().to_string())
}

fn label_by_wrapping_label(doc: &Document, node: NodeId) -> Option<String> {
    let label = doc.closest(node, "label")?;
    Some(text_without_value(doc, label, node).trim().to_string())
}

/// Walk preceding element siblings looking for a `<label>`. Any sibling with
/// visible text that is not a label ends the search.
fn label_by_preceding_sibling(doc: &Document, node: NodeId) -> Option<String> {
    let mut sibling = doc.previous_element_sibling(node);
    while let Some(current) = sibling {
        let text = doc.text_content(current);
        if doc.element(current)?.is("label") {
            return Some(text.trim().to_string());
        }
        if !text.trim().is_empty() {
            return None;
        }
        sibling = doc.previous_element_sibling(current);
    }
    None
}

fn label_by_nearby_text(doc: &Document, node: NodeId) -> Option<String> {
    let parent = doc.parent_element(node)?;

    let container_text = text_without_value(doc, parent, node);
    let container_text = container_text.trim();
    if !container_text.is_empty() && container_text.chars().count() < CONTAINER_TEXT_MAX {
        return Some(container_text.to_string());
    }

    doc.element_children(parent)
        .into_iter()
        .filter(|sibling| *sibling != node)
        .map(|sibling| doc.text_content(sibling).trim().to_string())
        .find(|text| !text.is_empty() && text.chars().count() < SIBLING_TEXT_MAX)
}

fn label_by_attributes(doc: &Document, node: NodeId) -> Option<String> {
    let el = doc.element(node)?;
    ["placeholder", "name", "id", "aria-label"]
        .iter()
        .find_map(|attr| el.non_empty_attr(attr))
        .map(str::to_string)
}
