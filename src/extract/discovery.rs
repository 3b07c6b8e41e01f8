use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};

use crate::dom::dom_model::{Document, Element, NodeId};
use crate::extract::constraints::{extract_constraints, extract_options};
use crate::extract::field_model::{
    ElementInfo, ExtractionData, FieldAnalysis, FieldContext, FieldDescriptor, FieldSummary,
    FormGroupEntry, Position,
};
use crate::extract::label::infer_label;
use crate::extract::semantic::determine_semantic_type;
use crate::locator::locator::Locator;

/// Input types that never receive a visible value.
const EXCLUDED_INPUT_TYPES: &[&str] = &["hidden", "button", "submit", "reset"];

/// Every `input`, `select` and `textarea`, in document order.
pub fn candidate_controls(doc: &Document) -> Vec<NodeId> {
    doc.all_elements()
        .into_iter()
        .filter(|id| doc.element(*id).is_some_and(Element::is_form_control))
        .collect()
}

/// Whether a candidate control can meaningfully receive a value.
pub fn is_fillable(doc: &Document, node: NodeId) -> bool {
    let Some(el) = doc.element(node) else {
        return false;
    };
    if !el.is_form_control() || el.has_attr("disabled") {
        return false;
    }
    if el.is("input") && EXCLUDED_INPUT_TYPES.contains(&el.control_type().as_str()) {
        return false;
    }
    doc.is_rendered(node)
}

/// `<tag>_<id|name|class|field_n>_<n>`, `n` being the position among all
/// candidate controls. Stable only while the document is unchanged.
pub fn generate_field_id(el: &Element, index: usize) -> String {
    let key = el
        .id()
        .or_else(|| el.name())
        .or_else(|| el.class_name())
        .map(str::to_string)
        .unwrap_or_else(|| format!("field_{}", index));
    format!("{}_{}_{}", el.tag, key, index)
}

pub fn field_context(doc: &Document, node: NodeId) -> FieldContext {
    let form = doc.closest(node, "form");
    let section = doc.closest_matching(node, |el| {
        el.is("section")
            || el.is("fieldset")
            || (el.is("div") && el.attr("class").is_some_and(|c| c.contains("section")))
    });

    let form_el = form.and_then(|f| doc.element(f));
    let section_el = section.and_then(|s| doc.element(s));

    FieldContext {
        form_id: form_el.map(|f| {
            f.id()
                .or_else(|| f.class_name())
                .unwrap_or("unnamed-form")
                .to_string()
        }),
        form_action: form_el.map(|f| {
            f.non_empty_attr("action")
                .unwrap_or_else(|| doc.url())
                .to_string()
        }),
        section_class: section_el.and_then(|s| s.class_name()).map(str::to_string),
        section_id: section_el.and_then(|s| s.id()).map(str::to_string),
        field_index: form
            .and_then(|f| doc.form_elements(f).iter().position(|e| *e == node))
            .unwrap_or(0),
    }
}

pub fn element_position(el: &Element) -> Position {
    el.rect
        .map(|r| Position {
            top: r.y,
            left: r.x,
            width: r.width,
            height: r.height,
        })
        .unwrap_or_default()
}

/// Build the descriptor for one control. `index` is its candidate position.
pub fn describe_field(doc: &Document, node: NodeId, index: usize) -> Option<FieldDescriptor> {
    let el = doc.element(node)?;
    let control_type = el.control_type();
    let current_value = doc.control_value(node);

    Some(FieldDescriptor {
        id: generate_field_id(el, index),
        label: infer_label(doc, node),
        element_info: ElementInfo {
            tag_name: el.tag.to_uppercase(),
            input_type: Some(control_type.clone()),
            name: el.name().map(str::to_string),
            id: el.id().map(str::to_string),
            class_name: el.class_name().map(str::to_string),
        },
        analysis: FieldAnalysis {
            field_type: control_type,
            semantic_type: determine_semantic_type(doc, node),
            constraints: extract_constraints(doc, node),
            options: extract_options(doc, node),
            placeholder: el.non_empty_attr("placeholder").map(str::to_string),
            current_value: (!current_value.is_empty()).then_some(current_value),
        },
        context: field_context(doc, node),
        locator: Locator::generate(doc, node)?,
        position: element_position(el),
    })
}

/// Scan the document and describe every fillable control, in document order.
pub fn discover_fields(doc: &Document) -> Vec<FieldDescriptor> {
    candidate_controls(doc)
        .into_iter()
        .enumerate()
        .filter(|(_, node)| is_fillable(doc, *node))
        .filter_map(|(index, node)| describe_field(doc, node, index))
        .collect()
}

pub fn group_fields_by_form(fields: &[FieldDescriptor]) -> BTreeMap<String, Vec<FormGroupEntry>> {
    let mut groups: BTreeMap<String, Vec<FormGroupEntry>> = BTreeMap::new();
    for field in fields {
        groups
            .entry(field.form_key().to_string())
            .or_default()
            .push(FormGroupEntry {
                id: field.id.clone(),
                label: field.label.clone(),
                semantic_type: field.analysis.semantic_type,
                required: field.analysis.constraints.required,
            });
    }
    groups
}

/// Hash of the structural parts of an extraction. Excludes timestamp and
/// layout, so two passes over an unchanged document agree.
pub fn extraction_fingerprint(fields: &[FieldDescriptor]) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    for field in fields {
        hasher.update(field.id.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(field.label.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(field.analysis.field_type.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(field.analysis.semantic_type.as_str().as_bytes());
        hasher.update(b"\x1f");
        hasher.update(field.locator.to_string().as_bytes());
        hasher.update(b"\x1e");
    }
    format!("{:x}", hasher.finalize())
}

/// Package descriptors for the orchestrator.
pub fn prepare_extraction(doc: &Document, fields: &[FieldDescriptor]) -> ExtractionData {
    ExtractionData {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        page_url: doc.url().to_string(),
        page_title: doc.title().to_string(),
        total_fields: fields.len(),
        fields: fields.iter().map(FieldSummary::from).collect(),
        form_groups: group_fields_by_form(fields),
        fingerprint: extraction_fingerprint(fields),
    }
}
