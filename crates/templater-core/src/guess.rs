//! Form prefill heuristics
//!
//! Best-effort guesses used to seed the annotation form from the selected
//! text. None of these are authoritative; the user can override all of them.

use crate::models::ParamType;

/// Guess a parameter name from the command-line text before a selection
///
/// Takes the last whitespace-separated token, strips a leading `--` or `-`
/// and a trailing `=`, and accepts it only if what remains is letters.
pub fn guess_param_name(line_prefix: &str) -> Option<String> {
    let piece = line_prefix.split_whitespace().last()?;

    let piece = piece
        .strip_prefix("--")
        .or_else(|| piece.strip_prefix('-'))
        .unwrap_or(piece);
    let piece = piece.strip_suffix('=').unwrap_or(piece);

    if !piece.is_empty() && piece.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(piece.to_string())
    } else {
        None
    }
}

/// Guess a parameter type from the selected text
pub fn guess_param_type(selected: &str) -> ParamType {
    let trimmed = selected.trim();

    if trimmed.chars().any(|c| c.is_ascii_alphabetic()) {
        return ParamType::Str;
    }
    if trimmed.contains('.') && trimmed.parse::<f64>().is_ok() {
        return ParamType::Float;
    }
    if trimmed.parse::<i64>().is_ok() {
        return ParamType::Int;
    }
    if !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
    {
        return ParamType::Datetime;
    }

    ParamType::Str
}

/// Turn a display name into a variable-safe name
///
/// Lowercases, drops everything but `[a-z0-9_ ]`, trims, and joins words
/// with underscores.
pub fn slugify(name: &str) -> String {
    let kept: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == ' ')
        .collect();
    kept.trim().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_name_from_long_flag() {
        assert_eq!(
            guess_param_name("python run.py --rate "),
            Some("rate".to_string())
        );
    }

    #[test]
    fn test_guess_name_from_short_flag_with_equals() {
        assert_eq!(guess_param_name("./model -n="), Some("n".to_string()));
        assert_eq!(
            guess_param_name("./model --steps="),
            Some("steps".to_string())
        );
    }

    #[test]
    fn test_guess_name_rejects_non_letters() {
        assert_eq!(guess_param_name("python run.py "), None);
        assert_eq!(guess_param_name("--max-iter "), None);
        assert_eq!(guess_param_name(""), None);
        assert_eq!(guess_param_name("-- "), None);
    }

    #[test]
    fn test_guess_type() {
        assert_eq!(guess_param_type("maize"), ParamType::Str);
        assert_eq!(guess_param_type("0.25"), ParamType::Float);
        assert_eq!(guess_param_type("100"), ParamType::Int);
        assert_eq!(guess_param_type("-3"), ParamType::Int);
        assert_eq!(guess_param_type("2021-01-01"), ParamType::Datetime);
        assert_eq!(guess_param_type("1e5"), ParamType::Str);
        assert_eq!(guess_param_type("/tmp/out"), ParamType::Str);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Growth Rate (%)"), "growth_rate");
        assert_eq!(slugify("  Number of steps  "), "number_of_steps");
        assert_eq!(slugify("already_slugged"), "already_slugged");
    }
}
