use form_autofill::extract::label::{
    LabelSource, UNKNOWN_LABEL, infer_label, infer_label_with_source,
};
use form_autofill::extract::semantic::{RULES, classify_semantic_type, determine_semantic_type};
use form_autofill::extract::field_model::SemanticType;
use serde_json::json;

use crate::common::{
    builders::{el, input, label_for, page, text},
    utils::node,
};

mod common;

// =========================================================================
// Label fallback chain
// =========================================================================

#[test]
fn for_attribute_label_beats_placeholder() {
    let doc = page(vec![
        label_for("mail", "Work email"),
        input(json!({ "id": "mail", "placeholder": "name@company.com" })),
    ]);

    let (label, source) = infer_label_with_source(&doc, node(&doc, "mail"));
    assert_eq!(label, "Work email");
    assert_eq!(source, LabelSource::ForAttribute);
}

#[test]
fn wrapping_label_strips_the_current_value() {
    let doc = page(vec![el(
        "label",
        json!({}),
        vec![
            text("Nickname "),
            json!({ "tag": "input", "attrs": { "name": "nick" }, "value": "Nickname" }),
        ],
    )]);
    let control = doc.elements_by_tag("input")[0];

    // stripping the value leaves nothing, so the chain moves on to attributes
    let (label, source) = infer_label_with_source(&doc, control);
    assert_eq!(label, "nick");
    assert_eq!(source, LabelSource::Attribute);

    let doc = page(vec![el(
        "label",
        json!({}),
        vec![
            text("City: Paris"),
            json!({ "tag": "input", "attrs": { "name": "city" }, "value": "Paris" }),
        ],
    )]);
    let control = doc.elements_by_tag("input")[0];
    assert_eq!(
        infer_label_with_source(&doc, control),
        ("City:".to_string(), LabelSource::WrappingLabel)
    );
}

#[test]
fn preceding_label_sibling_is_used() {
    let doc = page(vec![el(
        "div",
        json!({}),
        vec![
            el("label", json!({}), vec![text("Favourite colour")]),
            el("span", json!({}), vec![]),
            input(json!({ "id": "colour" })),
        ],
    )]);

    let (label, source) = infer_label_with_source(&doc, node(&doc, "colour"));
    assert_eq!(label, "Favourite colour");
    assert_eq!(source, LabelSource::PrecedingLabel);
}

#[test]
fn text_between_label_and_control_aborts_the_sibling_scan() {
    let long_text = "x".repeat(120);
    let doc = page(vec![el(
        "div",
        json!({}),
        vec![
            el("label", json!({}), vec![text("Hidden gem")]),
            el("p", json!({}), vec![text(&long_text)]),
            input(json!({ "id": "gem", "name": "gem_field" })),
        ],
    )]);

    // the paragraph ends the sibling scan; the label still wins as nearby text
    let (label, source) = infer_label_with_source(&doc, node(&doc, "gem"));
    assert_eq!(source, LabelSource::NearbyText);
    assert_eq!(label, "Hidden gem");
}

#[test]
fn short_container_text_is_taken_whole() {
    let doc = page(vec![el(
        "div",
        json!({}),
        vec![
            el("span", json!({}), vec![text("Promo code")]),
            text(" (optional)"),
            input(json!({ "id": "promo" })),
        ],
    )]);

    assert_eq!(infer_label(&doc, node(&doc, "promo")), "Promo code (optional)");
}

#[test]
fn long_container_text_falls_back_to_a_short_sibling() {
    let filler = "lorem ipsum ".repeat(10);
    let doc = page(vec![el(
        "div",
        json!({}),
        vec![
            el("p", json!({}), vec![text(&filler)]),
            el("em", json!({}), vec![text("Referral")]),
            text("and"),
            input(json!({ "id": "ref" })),
        ],
    )]);

    // the <p> is itself too long for a sibling label, the <em> is next
    assert_eq!(infer_label(&doc, node(&doc, "ref")), "Referral");
}

#[test]
fn attribute_fallbacks_in_order() {
    let doc = page(vec![
        el("div", json!({}), vec![input(json!({ "id": "a", "name": "alpha", "placeholder": "Type here" }))]),
        el("div", json!({}), vec![input(json!({ "id": "b", "name": "beta" }))]),
        el("div", json!({}), vec![input(json!({ "id": "c" }))]),
        el("div", json!({}), vec![input(json!({ "aria-label": "Accessible" }))]),
    ]);
    let inputs = doc.elements_by_tag("input");

    assert_eq!(infer_label(&doc, inputs[0]), "Type here");
    assert_eq!(infer_label(&doc, inputs[1]), "beta");
    assert_eq!(infer_label(&doc, inputs[2]), "c");
    assert_eq!(infer_label(&doc, inputs[3]), "Accessible");
}

#[test]
fn no_signal_yields_the_fallback_label() {
    let doc = page(vec![el("div", json!({}), vec![input(json!({}))])]);
    let control = doc.elements_by_tag("input")[0];

    let (label, source) = infer_label_with_source(&doc, control);
    assert_eq!(label, UNKNOWN_LABEL);
    assert_eq!(source, LabelSource::Fallback);
}

// =========================================================================
// Semantic classification
// =========================================================================

#[test]
fn native_email_type_wins_regardless_of_label() {
    assert_eq!(
        classify_semantic_type("email", "Company website", "", "", ""),
        SemanticType::Email
    );
}

#[test]
fn phone_number_classifies_as_phone_not_number() {
    assert_eq!(
        classify_semantic_type("text", "Phone Number", "", "", ""),
        SemanticType::Phone
    );
    // bare "number" is a phone signal too, before the number rule runs
    assert_eq!(
        classify_semantic_type("text", "Account number", "", "", ""),
        SemanticType::Phone
    );
}

#[test]
fn keywords_are_searched_across_label_name_id_and_placeholder() {
    assert_eq!(
        classify_semantic_type("text", "Where?", "street_line", "", ""),
        SemanticType::Address
    );
    assert_eq!(
        classify_semantic_type("text", "", "", "dob", ""),
        SemanticType::Date
    );
    assert_eq!(
        classify_semantic_type("text", "", "", "", "Your WEBSITE"),
        SemanticType::Url
    );
    assert_eq!(
        classify_semantic_type("text", "Employer", "", "", ""),
        SemanticType::Company
    );
    assert_eq!(
        classify_semantic_type("text", "Job", "", "", ""),
        SemanticType::Title
    );
    assert_eq!(
        classify_semantic_type("password", "Secret", "", "", ""),
        SemanticType::Password
    );
    assert_eq!(
        classify_semantic_type("number", "How many", "", "", ""),
        SemanticType::Number
    );
    assert_eq!(
        classify_semantic_type("text", "Favourite colour", "", "", ""),
        SemanticType::Text
    );
}

#[test]
fn rule_order_is_fixed() {
    let order: Vec<SemanticType> = RULES.iter().map(|r| r.semantic_type).collect();
    assert_eq!(
        order,
        vec![
            SemanticType::Email,
            SemanticType::Phone,
            SemanticType::Name,
            SemanticType::Address,
            SemanticType::Date,
            SemanticType::Password,
            SemanticType::Number,
            SemanticType::Url,
            SemanticType::Company,
            SemanticType::Title,
        ]
    );
}

#[test]
fn determine_uses_the_inferred_label() {
    let doc = page(vec![
        label_for("x1", "Mobile"),
        input(json!({ "id": "x1" })),
    ]);
    assert_eq!(determine_semantic_type(&doc, node(&doc, "x1")), SemanticType::Phone);
}
