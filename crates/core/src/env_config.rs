//! Environment variable parsing with warn-level logging for invalid values.

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    parse_with_default(var, std::env::var(var).ok().as_deref(), default)
}

/// Like [`parse_with_default`], additionally rejecting values that fail `accept`.
///
/// Used for knobs where a syntactically valid value can still be nonsensical
/// (a zero page size, a negative row height). `raw` is the already looked-up
/// variable value.
pub fn parse_checked<T, F>(var: &str, raw: Option<&str>, default: T, accept: F) -> T
where
    T: std::str::FromStr + std::fmt::Display + Clone,
    F: Fn(&T) -> bool,
{
    let parsed = parse_with_default(var, raw, default.clone());
    if accept(&parsed) {
        return parsed;
    }
    tracing::warn!(var, value = %parsed, default = %default, "out-of-range env var value, using default");
    default
}

/// Parses a raw (possibly absent) value, falling back to `default`.
pub fn parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    raw: Option<&str>,
    default: T,
) -> T {
    match raw {
        Some(v) => match v.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_value() {
        let result: u32 = parse_with_default("INCR_LIST_TEST_VALID", Some("42"), 10);
        assert_eq!(result, 42);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let result: u64 = parse_with_default("INCR_LIST_TEST_TRIM", Some(" 250 "), 10);
        assert_eq!(result, 250);
    }

    #[test]
    fn test_parse_invalid_value() {
        let result: u32 = parse_with_default("INCR_LIST_TEST_INVALID", Some("banana"), 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn test_parse_missing_value() {
        let result: u32 = parse_with_default("INCR_LIST_TEST_MISSING", None, 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn test_parse_empty_value() {
        let result: f64 = parse_with_default("INCR_LIST_TEST_EMPTY", Some(""), 48.0);
        assert!((result - 48.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_env_parse_unset_var_uses_default() {
        let result: u32 = env_parse_with_default("INCR_LIST_TEST_SURELY_UNSET_81723", 7);
        assert_eq!(result, 7);
    }

    #[test]
    fn test_checked_value_accepted() {
        let result = parse_checked("INCR_LIST_TEST_CHECKED", Some("5"), 20_u32, |v| *v > 0);
        assert_eq!(result, 5);
    }

    #[test]
    fn test_checked_value_rejected() {
        let result = parse_checked("INCR_LIST_TEST_CHECKED", Some("0"), 20_u32, |v| *v > 0);
        assert_eq!(result, 20);
    }
}
