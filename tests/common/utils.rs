use std::path::PathBuf;

use form_autofill::dom::dom_model::{Document, NodeId};

pub fn fixture(name: &str) -> PathBuf {
    let base = std::env::current_dir().unwrap();
    base.join("tests").join("fixtures").join(name)
}

pub fn load_fixture(name: &str) -> Document {
    let json = std::fs::read_to_string(fixture(name)).unwrap();
    Document::from_json(&json).unwrap()
}

/// The sign-up page most tests run against.
pub fn signup_page() -> Document {
    load_fixture("signup.json")
}

/// Node of the element with this `id` attribute.
pub fn node(doc: &Document, id: &str) -> NodeId {
    doc.element_by_id(id)
        .unwrap_or_else(|| panic!("no element with id '{}'", id))
}

/// Node of the first element with this `name` attribute.
pub fn named(doc: &Document, name: &str) -> NodeId {
    doc.find_element(|el| el.attr("name") == Some(name))
        .unwrap_or_else(|| panic!("no element named '{}'", name))
}
