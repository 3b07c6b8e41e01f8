use std::sync::{Arc, Mutex};
use std::time::Duration;

use form_autofill::dom::dom_model::{EventKind, Key};
use form_autofill::extractor::field_extractor::FieldExtractor;
use form_autofill::extractor::protocol::{FieldFill, Request, Response};
use form_autofill::extractor::service::{serve_lines, spawn_extractor};
use form_autofill::fill::fill_model::FillValue;
use form_autofill::fill::nudge::NudgeConfig;
use form_autofill::trace::logger::TraceLogger;
use serde_json::{Value, json};

use crate::common::{
    builders::{form, input, page},
    utils::{node, signup_page},
};

mod common;

const FAST_NUDGE: NudgeConfig = NudgeConfig {
    arrow_down_delay_ms: 5,
    enter_delay_ms: 10,
};

fn extracted() -> FieldExtractor {
    let mut extractor = FieldExtractor::from_document(signup_page()).with_nudge(FAST_NUDGE);
    extractor.extract();
    extractor
}

// =========================================================================
// Single fills
// =========================================================================

#[test]
fn fill_before_extraction_reports_field_not_found() {
    let extractor = FieldExtractor::from_document(signup_page());
    let result = extractor.fill_field("input_email_0", &"a@b.co".into());

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Field not found"));
}

#[test]
fn fill_resolves_the_locator_against_the_live_document() {
    let extractor = extracted();
    let result = extractor.fill_field("input_email_0", &"jane@example.com".into());

    assert!(result.success);
    assert_eq!(result.value, Some(json!("jane@example.com")));

    let doc = extractor.document().lock().unwrap();
    assert_eq!(doc.control_value(node(&doc, "email")), "jane@example.com");
}

#[test]
fn vanished_element_reports_its_selector() {
    let mut extractor = extracted();
    extractor
        .document()
        .lock()
        .unwrap()
        .replace(page(vec![input(json!({ "id": "other" }))]));

    let result = extractor.fill_field("input_email_0", &"x".into());
    assert_eq!(
        result.error.as_deref(),
        Some("Element not found for selector: #email")
    );

    // a fresh extraction replaces the stale descriptor set
    extractor.extract();
    assert_eq!(extractor.fields().len(), 1);
    assert!(extractor.field("input_email_0").is_none());
}

// =========================================================================
// Batch fills
// =========================================================================

#[test]
fn batch_with_unknown_ids_reports_partial_success() {
    let extractor = extracted();
    let fills = vec![
        FieldFill::new("input_email_0", "jane@example.com"),
        FieldFill::new("input_missing_99", "x"),
        FieldFill::new("select_country_3", "united states"),
        FieldFill::new("input_ghost_10", "boo"),
        FieldFill::new("input_newsletter_4", true),
    ];

    let batch = extractor.fill_multiple(&fills);

    assert_eq!(batch.summary.total, 5);
    assert_eq!(batch.summary.successful, 3);
    assert_eq!(batch.summary.failed, 2);

    let mut expected: Vec<&str> = fills.iter().map(|f| f.field_id.as_str()).collect();
    expected.sort();
    let keys: Vec<&str> = batch.results.keys().map(String::as_str).collect();
    assert_eq!(keys, expected);

    assert!(!batch.results["input_missing_99"]);
    assert_eq!(
        batch.detailed_results["input_ghost_10"].error.as_deref(),
        Some("Field not found")
    );
    assert_eq!(batch.detailed_results["select_country_3"].value, Some(json!("US")));
    assert_eq!(batch.failed_ids(), vec!["input_ghost_10", "input_missing_99"]);
}

#[test]
fn batch_fills_in_request_order() {
    let extractor = extracted();
    extractor.fill_multiple(&[
        FieldFill::new("input_phone_2", "1"),
        FieldFill::new("input_first_name_1", "Ana"),
    ]);

    let doc = extractor.document().lock().unwrap();
    let phone = doc.find_element(|el| el.attr("name") == Some("phone")).unwrap();
    let first_name = doc.find_element(|el| el.attr("name") == Some("first_name")).unwrap();
    let targets: Vec<_> = doc.events().iter().map(|e| e.target).collect();

    assert_eq!(targets[..4], [phone; 4]);
    assert_eq!(targets[4..], [first_name; 4]);
}

#[test]
fn radio_without_id_fills_the_button_it_was_extracted_from() {
    let mut extractor = FieldExtractor::from_document(page(vec![form(
        "billing",
        vec![
            input(json!({ "type": "radio", "name": "plan", "value": "basic", "checked": "" })),
            input(json!({ "type": "radio", "name": "plan", "value": "pro" })),
        ],
    )]));
    let data = extractor.extract();
    let ids: Vec<&str> = data.fields.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["input_plan_0", "input_plan_1"]);

    let result = extractor.fill_field("input_plan_1", &"yes".into());
    assert!(result.success);

    let doc = extractor.document().lock().unwrap();
    let checked: Vec<bool> = doc
        .elements_by_tag("input")
        .into_iter()
        .map(|n| doc.element(n).unwrap().state.checked)
        .collect();
    assert_eq!(checked, vec![false, true]);
}

#[test]
fn each_request_starts_with_an_empty_event_log() {
    let mut extractor = extracted();
    extractor.handle(Request::FillField {
        field_id: "input_email_0".into(),
        value: "a@b.co".into(),
    });
    assert_eq!(extractor.document().lock().unwrap().events().len(), 4);

    extractor.handle(Request::GetAllFields);
    assert!(extractor.document().lock().unwrap().events().is_empty());
}

// =========================================================================
// Diagnostics and listing
// =========================================================================

#[test]
fn debug_field_describes_the_live_element() {
    let extractor = extracted();
    extractor.fill_field("input_newsletter_4", &FillValue::Bool(true));

    let info = extractor.debug_field("input_newsletter_4");
    assert!(info.field_found);
    assert!(info.element_found);

    let element = info.element_info.unwrap();
    assert_eq!(element.tag_name, "INPUT");
    assert_eq!(element.input_type, "checkbox");
    assert!(element.checked);
    assert!(element.visible);
    assert!(!element.disabled);

    let missing = extractor.debug_field("nope");
    assert!(!missing.field_found);
    assert!(missing.field_data.is_none());
}

#[test]
fn get_all_fields_lists_selectors() {
    let mut extractor = extracted();
    let response = extractor.handle(Request::GetAllFields);

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["fields"][0]["id"], "input_email_0");
    assert_eq!(json["fields"][0]["selector"], "#email");
    assert_eq!(json["fields"][0]["semanticType"], "email");
}

// =========================================================================
// Wire format
// =========================================================================

#[test]
fn requests_parse_from_action_messages() {
    let request: Request = serde_json::from_value(json!({
        "action": "fillField",
        "fieldId": "input_email_0",
        "value": "a@b.co"
    }))
    .unwrap();
    assert_eq!(
        request,
        Request::FillField {
            field_id: "input_email_0".into(),
            value: "a@b.co".into()
        }
    );

    // suggestion-shaped entries are accepted in batches
    let request: Request = serde_json::from_value(json!({
        "action": "fillMultipleFields",
        "fields": [{ "id": "a", "suggestedValue": "1" }, { "fieldId": "b", "value": false }]
    }))
    .unwrap();
    assert_eq!(
        request,
        Request::FillMultipleFields {
            fields: vec![FieldFill::new("a", "1"), FieldFill::new("b", false)]
        }
    );

    let request: Request = serde_json::from_value(json!({ "action": "extractFields" })).unwrap();
    assert_eq!(request, Request::ExtractFields);
}

#[test]
fn batch_response_uses_camel_case_keys() {
    let mut extractor = extracted();
    let response = extractor.handle(Request::FillMultipleFields {
        fields: vec![FieldFill::new("input_email_0", "a@b.co")],
    });
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["results"]["input_email_0"], true);
    assert_eq!(json["detailedResults"]["input_email_0"]["value"], "a@b.co");
    assert_eq!(json["summary"], json!({ "total": 1, "successful": 1, "failed": 0 }));
}

// =========================================================================
// Autocomplete nudge
// =========================================================================

#[tokio::test]
async fn autocomplete_nudge_fires_after_the_result_is_returned() {
    let extractor = extracted();
    let city = {
        let doc = extractor.document().lock().unwrap();
        node(&doc, "city")
    };

    let result = extractor.fill_field("input_city_6", &"Lisbon".into());
    assert!(result.success);
    assert_eq!(extractor.document().lock().unwrap().events().len(), 4);

    tokio::time::sleep(Duration::from_millis(100)).await;

    let doc = extractor.document().lock().unwrap();
    let keys: Vec<EventKind> = doc.events()[4..].iter().map(|e| e.kind).collect();
    assert_eq!(
        keys,
        vec![
            EventKind::KeyDown { key: Key::ArrowDown },
            EventKind::KeyDown { key: Key::Enter },
        ]
    );
    assert!(doc.events()[4..].iter().all(|e| e.target == city));
}

#[tokio::test]
async fn nudge_is_dropped_when_the_page_is_replaced() {
    let mut extractor = extracted();
    extractor.fill_field("input_city_6", &"Lisbon".into());
    extractor.load(signup_page());

    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(extractor.document().lock().unwrap().events().is_empty());
    assert!(extractor.fields().is_empty());
}

#[test]
fn nudge_runs_on_a_thread_outside_a_runtime() {
    let extractor = extracted();
    extractor.fill_field("input_city_6", &"Porto".into());

    std::thread::sleep(Duration::from_millis(150));
    assert_eq!(extractor.document().lock().unwrap().events().len(), 6);
}

// =========================================================================
// Channel service and stdio server
// =========================================================================

#[tokio::test]
async fn client_round_trips_through_the_extractor_task() {
    let extractor = FieldExtractor::from_document(signup_page());
    let document = Arc::clone(extractor.document());
    let (client, task) = spawn_extractor(extractor);

    let data = client.extract_fields().await.unwrap();
    assert_eq!(data.total_fields, 9);

    let result = client.fill_field("input_phone_2", "555-0100").await.unwrap();
    assert!(result.success);

    let batch = client
        .fill_multiple_fields(vec![FieldFill::new("nope", "x")])
        .await
        .unwrap();
    assert_eq!(batch.summary.failed, 1);

    let listing = client.all_fields().await.unwrap();
    assert_eq!(listing.len(), 9);

    let debug = client.debug_field("input_phone_2").await.unwrap();
    assert_eq!(debug.element_info.unwrap().value, "555-0100");

    drop(client);
    let extractor = task.await.unwrap();
    assert_eq!(extractor.fields().len(), 9);

    let doc = document.lock().unwrap();
    let phone = doc.find_element(|el| el.attr("name") == Some("phone")).unwrap();
    assert_eq!(doc.control_value(phone), "555-0100");
}

#[tokio::test]
async fn line_server_answers_each_request_line() {
    let mut extractor = FieldExtractor::from_document(signup_page());
    let input = concat!(
        "{\"action\":\"extractFields\"}\n",
        "\n",
        "{\"action\":\"fillField\",\"fieldId\":\"input_email_0\",\"value\":\"a@b.co\"}\n",
        "not json\n",
        "{\"action\":\"debugField\",\"fieldId\":\"zzz\"}\n",
    );
    let mut output = Vec::new();

    let answered = serve_lines(&mut extractor, input.as_bytes(), &mut output)
        .await
        .unwrap();
    assert_eq!(answered, 4);

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(lines[0]["data"]["totalFields"], 9);
    assert_eq!(lines[1]["result"]["value"], "a@b.co");
    assert_eq!(lines[2]["success"], false);
    assert!(lines[2]["error"].as_str().unwrap().starts_with("Invalid request"));
    assert_eq!(lines[3]["debug"]["fieldFound"], false);

    let parsed: Response = serde_json::from_value(lines[1].clone()).unwrap();
    assert!(parsed.is_success());
}

#[test]
fn trace_file_records_operations() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let trace = Arc::new(TraceLogger::new(path.to_str().unwrap()));

    let mut extractor = FieldExtractor::new(Arc::new(Mutex::new(signup_page()))).with_trace(trace);
    extractor.extract();
    extractor.fill_field("input_email_0", &"a@b.co".into());
    extractor.fill_field("nope", &"x".into());

    let lines: Vec<Value> = std::fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["operation"], "extract");
    assert_eq!(lines[0]["count"], 9);
    assert_eq!(lines[1]["field_id"], "input_email_0");
    assert_eq!(lines[1]["outcome"], "filled");
    assert_eq!(lines[2]["outcome"], "failed");
    assert_eq!(lines[2]["detail"], "Field not found");
}
