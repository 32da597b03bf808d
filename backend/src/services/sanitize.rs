//! Input sanitizers for free-text values entered by the admin.

/// Longest value accepted for a daily slot.
pub const MAX_DAILY_VALUE_LEN: usize = 40;

/// Keep digits, whitespace, `/`, `-` and the markers `* # @`; trim; cap length.
pub fn sanitize_daily_value(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '*' | '#' | '@' | '/' | '-'))
        .collect::<String>()
        .trim()
        .chars()
        .take(MAX_DAILY_VALUE_LEN)
        .collect()
}

/// Keep digits, `-` and spaces; trim.
pub fn sanitize_result_value(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '-' | ' '))
        .collect::<String>()
        .trim()
        .to_string()
}
