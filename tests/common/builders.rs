use form_autofill::dom::dom_model::Document;
use serde_json::{Value, json};

pub const TEST_URL: &str = "https://example.com/form";

pub fn text(s: &str) -> Value {
    json!({ "text": s })
}

pub fn el(tag: &str, attrs: Value, children: Vec<Value>) -> Value {
    json!({ "tag": tag, "attrs": attrs, "children": children })
}

pub fn input(attrs: Value) -> Value {
    el("input", attrs, vec![])
}

pub fn label_for(id: &str, caption: &str) -> Value {
    el("label", json!({ "for": id }), vec![text(caption)])
}

pub fn option(value: &str, caption: &str) -> Value {
    el("option", json!({ "value": value }), vec![text(caption)])
}

pub fn select(attrs: Value, options: &[(&str, &str)]) -> Value {
    el(
        "select",
        attrs,
        options.iter().map(|(v, t)| option(v, t)).collect(),
    )
}

pub fn form(id: &str, children: Vec<Value>) -> Value {
    el("form", json!({ "id": id }), children)
}

/// A page whose `<body>` holds `children`.
pub fn page(children: Vec<Value>) -> Document {
    let snapshot = json!({
        "url": TEST_URL,
        "title": "Test Form",
        "body": el("body", json!({}), children),
    });
    Document::from_json(&snapshot.to_string()).unwrap()
}
