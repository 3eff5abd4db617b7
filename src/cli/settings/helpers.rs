//! Helper functions for settings operations.

use super::error::SettingError;

pub fn success_set(key: &str, value: &str) -> String {
    format!("✅ Set {key} to: {value}")
}

pub fn success_unset(key: &str) -> String {
    format!("✅ Unset {key} (will use default)")
}

/// Join arguments into one value, or report what to type.
pub fn require_value(
    args: &[String],
    hint: &'static str,
    example: &'static str,
) -> Result<String, SettingError> {
    let value = args.join(" ");
    if value.trim().is_empty() {
        return Err(SettingError::MissingArgs { hint, example });
    }
    Ok(value)
}

/// Parse a single, non-whitespace character.
pub fn parse_trigger_char(input: &str) -> Option<char> {
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_whitespace() && !c.is_control() => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_must_be_one_visible_char() {
        assert_eq!(parse_trigger_char("#"), Some('#'));
        assert_eq!(parse_trigger_char("@@"), None);
        assert_eq!(parse_trigger_char(" "), None);
        assert_eq!(parse_trigger_char(""), None);
    }

    #[test]
    fn empty_args_report_missing_value() {
        let err = require_value(&[], "hint", "example").unwrap_err();
        assert!(matches!(err, SettingError::MissingArgs { hint: "hint", .. }));
    }
}
