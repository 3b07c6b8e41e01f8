use form_autofill::extract::discovery::discover_fields;
use form_autofill::locator::locator::Locator;
use serde_json::json;

use crate::common::{
    builders::{el, form, input, page},
    utils::{node, signup_page},
};

mod common;

#[test]
fn id_locator_round_trips_to_the_same_element() {
    let doc = signup_page();
    let email = node(&doc, "email");

    let locator = Locator::generate(&doc, email).unwrap();
    assert_eq!(locator, Locator::Id("email".into()));
    assert!(locator.is_unique());
    assert_eq!(locator.resolve(&doc), Some(email));
}

#[test]
fn every_discovered_field_resolves_back_to_its_control() {
    let doc = signup_page();
    for field in discover_fields(&doc) {
        let resolved = field.locator.resolve(&doc).unwrap();
        let el = doc.element(resolved).unwrap();
        assert_eq!(el.tag.to_uppercase(), field.element_info.tag_name, "{}", field.id);
        assert_eq!(el.name(), field.element_info.name.as_deref(), "{}", field.id);
    }
}

#[test]
fn priority_is_id_name_class_position_tag() {
    let doc = page(vec![el(
        "div",
        json!({}),
        vec![
            input(json!({ "id": "i", "name": "n", "class": "c" })),
            input(json!({ "name": "n2", "class": "c2" })),
            input(json!({ "class": "first second" })),
            input(json!({})),
        ],
    )]);
    let inputs = doc.elements_by_tag("input");

    let locators: Vec<String> = inputs
        .iter()
        .map(|n| Locator::generate(&doc, *n).unwrap().to_string())
        .collect();

    assert_eq!(
        locators,
        vec![
            "#i",
            "input[name=\"n2\"]",
            "input.first",
            "div > input:nth-child(4)",
        ]
    );
    assert_eq!(
        Locator::generate(&doc, doc.root()).unwrap(),
        Locator::Tag("body".into())
    );
}

#[test]
fn positional_locator_resolves_to_its_element() {
    let doc = page(vec![el(
        "div",
        json!({}),
        vec![el("span", json!({}), vec![]), input(json!({})), input(json!({}))],
    )]);
    let third = doc.elements_by_tag("input")[1];

    let locator = Locator::generate(&doc, third).unwrap();
    assert_eq!(locator.to_string(), "div > input:nth-child(3)");
    assert_eq!(locator.resolve(&doc), Some(third));
}

#[test]
fn shared_class_falls_back_to_position() {
    let doc = page(vec![
        input(json!({ "class": "twin" })),
        input(json!({ "class": "twin" })),
    ]);
    let inputs = doc.elements_by_tag("input");

    assert_eq!(Locator::generate(&doc, inputs[0]).unwrap().to_string(), "input.twin");

    let second = Locator::generate(&doc, inputs[1]).unwrap();
    assert_eq!(second.to_string(), "body > input:nth-child(2)");
    assert!(!second.is_unique());
    assert_eq!(second.resolve(&doc), Some(inputs[1]));
}

#[test]
fn radio_group_without_ids_gets_one_locator_per_button() {
    let doc = page(vec![form(
        "plans",
        vec![
            input(json!({ "type": "radio", "name": "plan", "value": "basic" })),
            input(json!({ "type": "radio", "name": "plan", "value": "pro" })),
            input(json!({ "type": "radio", "name": "plan", "value": "team", "class": "plan-team" })),
        ],
    )]);
    let radios = doc.elements_by_tag("input");

    let locators: Vec<String> = radios
        .iter()
        .map(|n| Locator::generate(&doc, *n).unwrap().to_string())
        .collect();
    assert_eq!(
        locators,
        vec!["input[name=\"plan\"]", "form > input:nth-child(2)", "input.plan-team"]
    );

    for radio in &radios {
        let locator = Locator::generate(&doc, *radio).unwrap();
        assert_eq!(locator.resolve(&doc), Some(*radio), "{}", locator);
    }
}

#[test]
fn string_form_parses_back() {
    for raw in [
        "#email",
        "input[name=\"first_name\"]",
        "select.wide",
        "form > textarea:nth-child(2)",
        "textarea",
    ] {
        let locator: Locator = raw.parse().unwrap();
        assert_eq!(locator.to_string(), raw);
    }

    let quoted = Locator::Name {
        tag: "input".into(),
        name: "say \"hi\"".into(),
    };
    let parsed: Locator = quoted.to_string().parse().unwrap();
    assert_eq!(parsed, quoted);

    assert!("".parse::<Locator>().is_err());
    assert!("div > input:nth-child(x)".parse::<Locator>().is_err());
}

#[test]
fn locators_serialize_as_selector_strings() {
    let json = serde_json::to_value(Locator::Id("zip".into())).unwrap();
    assert_eq!(json, json!("#zip"));

    let back: Locator = serde_json::from_value(json!("input[name=\"q\"]")).unwrap();
    assert_eq!(
        back,
        Locator::Name {
            tag: "input".into(),
            name: "q".into()
        }
    );
}

#[test]
fn missing_element_does_not_resolve() {
    let doc = signup_page();
    assert_eq!(Locator::Id("nope".into()).resolve(&doc), None);
}
