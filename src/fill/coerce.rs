use std::sync::LazyLock;

use regex::Regex;

use crate::fill::fill_model::FillValue;

const TRUTHY: &[&str] = &["true", "1", "yes"];

static DAY_MONTH_YEAR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})$").ok());

/// Checkbox/radio coercion: boolean `true` or one of the allow-listed
/// strings. Everything else, including absence, is unchecked.
pub fn is_truthy(value: &FillValue) -> bool {
    match value {
        FillValue::Bool(b) => *b,
        FillValue::Text(s) => TRUTHY.contains(&s.as_str()),
        FillValue::Number(_) | FillValue::Null => false,
    }
}

/// Rewrite `DD/MM/YYYY` to `YYYY-MM-DD`. Any other shape passes through.
pub fn normalize_date(raw: &str) -> String {
    let Some(re) = DAY_MONTH_YEAR.as_ref() else {
        return raw.to_string();
    };

    match re.captures(raw.trim()) {
        Some(caps) => format!("{}-{:0>2}-{:0>2}", &caps[3], &caps[2], &caps[1]),
        None => raw.to_string(),
    }
}
