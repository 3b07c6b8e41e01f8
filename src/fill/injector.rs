use serde_json::Value;

use crate::dom::dom_model::{Document, Element, EventKind, NodeId};
use crate::extract::constraints::extract_options;
use crate::fill::coerce::{is_truthy, normalize_date};
use crate::fill::fill_model::{ControlKind, FillError, FillValue, InputKind};
use crate::fill::options::match_option;

// ============================================================================
// Value injection, one strategy per control kind
// ============================================================================

/// Events raised after assigning a text value, in order.
pub const TEXT_EVENT_SEQUENCE: [EventKind; 4] = [
    EventKind::Focus,
    EventKind::Input,
    EventKind::Change,
    EventKind::Blur,
];

const AUTOCOMPLETE_CLASS_HINTS: &[&str] = &["autocomplete", "typeahead", "combobox"];

/// What a successful injection wrote, and whether the control wants the
/// deferred autocomplete key nudge.
#[derive(Debug, Clone, PartialEq)]
pub struct Injection {
    pub value: Value,
    pub autocomplete: bool,
}

/// Write `value` into the control at `node` and raise the events a page
/// framework listens for.
pub fn inject(doc: &mut Document, node: NodeId, value: &FillValue) -> Result<Injection, FillError> {
    let el = doc
        .element(node)
        .ok_or_else(|| FillError::Injection(format!("node {} is not an element", node.0)))?;
    let kind = ControlKind::of(el);
    let autocomplete = is_autocomplete_widget(el);

    match kind {
        ControlKind::Input(InputKind::Checkbox) | ControlKind::Input(InputKind::Radio) => {
            fill_checkable(doc, node, value).map(plain)
        }
        ControlKind::Input(InputKind::Date) => fill_date(doc, node, value).map(plain),
        ControlKind::Input(InputKind::Text) | ControlKind::TextArea => {
            fill_text(doc, node, &value.as_text()).map(|value| Injection { value, autocomplete })
        }
        ControlKind::Select => fill_select(doc, node, value).map(plain),
        ControlKind::Unsupported(tag) => Err(FillError::UnsupportedElement { tag }),
    }
}

fn plain(value: Value) -> Injection {
    Injection {
        value,
        autocomplete: false,
    }
}

/// Combobox-style widgets that only commit a typed value after keyboard
/// interaction.
pub fn is_autocomplete_widget(el: &Element) -> bool {
    if el.attr("role").is_some_and(|r| r.eq_ignore_ascii_case("combobox")) {
        return true;
    }
    if el
        .attr("aria-autocomplete")
        .is_some_and(|a| !a.eq_ignore_ascii_case("none"))
    {
        return true;
    }
    if el.non_empty_attr("list").is_some() {
        return true;
    }
    el.class_tokens().any(|token| {
        let token = token.to_lowercase();
        AUTOCOMPLETE_CLASS_HINTS.iter().any(|hint| token.contains(hint))
    })
}

fn fill_checkable(doc: &mut Document, node: NodeId, value: &FillValue) -> Result<Value, FillError> {
    let checked = is_truthy(value);
    doc.set_checked(node, checked)?;
    doc.dispatch(node, EventKind::Change)?;
    doc.dispatch(node, EventKind::Click)?;
    Ok(Value::Bool(checked))
}

fn fill_date(doc: &mut Document, node: NodeId, value: &FillValue) -> Result<Value, FillError> {
    let normalized = normalize_date(&value.as_text());
    fill_text(doc, node, &normalized)
}

/// Clear, focus, assign, then raise focus/input/change/blur.
fn fill_text(doc: &mut Document, node: NodeId, text: &str) -> Result<Value, FillError> {
    doc.set_value(node, "")?;
    doc.focus(node)?;
    doc.set_value(node, text)?;
    for kind in TEXT_EVENT_SEQUENCE {
        doc.dispatch(node, kind)?;
    }
    Ok(Value::String(doc.control_value(node)))
}

fn fill_select(doc: &mut Document, node: NodeId, value: &FillValue) -> Result<Value, FillError> {
    let options = extract_options(doc, node);
    let target = value.as_text();

    let (index, _tier) = match_option(&options, &target)
        .ok_or_else(|| FillError::NoMatchingOption { value: target.clone() })?;

    doc.set_selected_index(node, index)?;
    doc.dispatch(node, EventKind::Change)?;
    Ok(Value::String(options[index].value.clone()))
}
