use crate::dom::dom_model::{Document, NodeId};
use crate::extract::field_model::{Constraints, SelectOption};

/// Reflect the control's validation attributes.
pub fn extract_constraints(doc: &Document, node: NodeId) -> Constraints {
    let Some(el) = doc.element(node) else {
        return Constraints::default();
    };

    let length = |attr: &str| {
        el.attr(attr)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
    };
    let text = |attr: &str| el.non_empty_attr(attr).map(str::to_string);

    Constraints {
        required: el.has_attr("required"),
        min_length: length("minlength"),
        max_length: length("maxlength"),
        pattern: text("pattern"),
        min: text("min"),
        max: text("max"),
        step: text("step"),
    }
}

/// Ordered (value, text) pairs for a select; empty for anything else.
pub fn extract_options(doc: &Document, node: NodeId) -> Vec<SelectOption> {
    if !doc.element(node).is_some_and(|el| el.is("select")) {
        return Vec::new();
    }

    doc.select_options(node)
        .into_iter()
        .map(|opt| SelectOption {
            value: doc.option_value(opt),
            text: doc.option_text(opt),
        })
        .collect()
}
