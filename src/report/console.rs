use crate::extract::field_model::ExtractionData;
use crate::extractor::protocol::DebugInfo;
use crate::orchestrator::orchestrator::FillReport;

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Format an extraction for terminal output.
///
/// Produces output like:
/// ```text
/// === Sign up (https://example.com/signup) ===
///
///   input_email_0     Email          email   *required
///   select_country_2  Country        text    3 options
///
/// === 2 fields in 1 form ===
/// ```
pub fn format_field_list(data: &ExtractionData) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} ({}) ===\n\n", data.page_title, data.page_url));

    let id_width = data.fields.iter().map(|f| f.id.len()).max().unwrap_or(0);
    let label_width = data.fields.iter().map(|f| f.label.len()).max().unwrap_or(0);

    for field in &data.fields {
        let mut notes = Vec::new();
        if field.required {
            notes.push("*required".to_string());
        }
        if !field.options.is_empty() {
            notes.push(format!("{} options", field.options.len()));
        }
        if let Some(ref value) = field.current_value {
            notes.push(format!("= \"{}\"", value));
        }

        out.push_str(&format!(
            "  {:<id_w$}  {:<label_w$}  {:<8} {}\n",
            field.id,
            field.label,
            field.semantic_type.as_str(),
            notes.join("  "),
            id_w = id_width,
            label_w = label_width,
        ));
    }

    out.push_str(&format!(
        "\n=== {} fields in {} form{} ===\n",
        data.total_fields,
        data.form_groups.len(),
        if data.form_groups.len() == 1 { "" } else { "s" }
    ));

    out
}

/// Format a fill report for terminal output.
///
/// ```text
/// ✓ Email              "jane@example.com"
/// ✗ Country            "Atlantis"
///     [ERROR] No matching option found for value: Atlantis
///
/// Fill Summary: 1 successful, 1 failed out of 2 fields
/// Successfully filled 1/2 fields!
/// ```
pub fn format_fill_report(report: &FillReport) -> String {
    let mut out = String::new();

    let label_width = report.entries.iter().map(|e| e.label.len()).max().unwrap_or(0);

    for entry in &report.entries {
        let marker = if entry.success { "\u{2713}" } else { "\u{2717}" };
        out.push_str(&format!(
            "{} {:<w$}  \"{}\"\n",
            marker,
            entry.label,
            entry.suggested_value.as_text(),
            w = label_width,
        ));
        if let Some(ref error) = entry.error {
            out.push_str(&format!("    [ERROR] {}\n", error));
        }
    }

    if !report.entries.is_empty() {
        out.push('\n');
        out.push_str(&format!(
            "Fill Summary: {} successful, {} failed out of {} fields\n",
            report.summary.successful, report.summary.failed, report.summary.total
        ));
    }
    out.push_str(&report.message());
    out.push('\n');

    out
}

/// Format `debugField` results for failed fields.
pub fn format_debug(debug: &[(String, DebugInfo)]) -> String {
    let mut out = String::new();

    for (field_id, info) in debug {
        out.push_str(&format!("--- {} ---\n", field_id));
        out.push_str(&format!(
            "  field found: {}, element found: {}\n",
            info.field_found, info.element_found
        ));
        if let Some(ref field) = info.field_data {
            out.push_str(&format!("  selector: {}\n", field.locator));
        }
        if let Some(ref el) = info.element_info {
            out.push_str(&format!(
                "  element: <{}> type={} visible={} disabled={} value=\"{}\"\n",
                el.tag_name.to_lowercase(),
                el.input_type,
                el.visible,
                el.disabled,
                el.value
            ));
        }
    }

    out
}
