use serde::Serialize;

use crate::extract::field_model::SelectOption;

/// Which tier picked the option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OptionMatch {
    /// Option value equals the target.
    ExactValue,
    /// Option text contains the target, case-insensitively.
    TextContains,
    /// Either of option text and target contains the other.
    Bidirectional,
}

/// Three-tier option matching; within a tier the first option in list order
/// wins. Empty targets and empty option texts only take part in the exact
/// value tier.
pub fn match_option(options: &[SelectOption], target: &str) -> Option<(usize, OptionMatch)> {
    if let Some(i) = options.iter().position(|opt| opt.value == target) {
        return Some((i, OptionMatch::ExactValue));
    }

    let needle = target.to_lowercase();
    if needle.is_empty() {
        return None;
    }
    let texts: Vec<String> = options.iter().map(|opt| opt.text.to_lowercase()).collect();

    if let Some(i) = texts.iter().position(|text| text.contains(&needle)) {
        return Some((i, OptionMatch::TextContains));
    }

    texts
        .iter()
        .position(|text| !text.is_empty() && (text.contains(&needle) || needle.contains(text.as_str())))
        .map(|i| (i, OptionMatch::Bidirectional))
}
