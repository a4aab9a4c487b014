/// Canonical form of a lookup key: trimmed and lowercased.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Flexible truthiness for categorical yes/no columns.
/// Handles "yes"/"no", "true"/"false", "1"/"0", "y"/"n".
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_trimmed_and_lowercased() {
        assert_eq!(normalize_key("  Cotton "), "cotton");
        assert_eq!(normalize_key("SILK"), "silk");
    }

    #[test]
    fn flag_parsing_handles_variants() {
        assert_eq!(parse_flag("Yes"), Some(true));
        assert_eq!(parse_flag(" 1 "), Some(true));
        assert_eq!(parse_flag("no"), Some(false));
        assert_eq!(parse_flag("FALSE"), Some(false));
        assert_eq!(parse_flag("partial"), None);
    }
}
