/// Split a comma separated value, dropping empty segments.
pub fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|part| {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

/// Parse a boolean value from a raw string, accepting common env-style forms.
///
/// Accepted truthy values (case-insensitive): `"1"`, `"true"`, `"yes"`, `"on"`.
/// Accepted falsy values: `"0"`, `"false"`, `"no"`, `"off"`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Interpret the `APPLY_MIGRATIONS` trigger.
///
/// Only the string `true` in any letter case turns migrations on. Every other
/// value, including `1`, `yes`, or a padded `" true"`, leaves them off.
pub fn parse_migration_trigger(raw: Option<&str>) -> bool {
    raw.is_some_and(|value| value.to_lowercase() == "true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_trigger_matches_true_in_any_case() {
        for value in ["true", "TRUE", "True", "tRuE"] {
            assert!(parse_migration_trigger(Some(value)), "{value}");
        }
    }

    #[test]
    fn migration_trigger_rejects_everything_else() {
        for value in ["", "1", "yes", "on", "false", " true", "true ", "truee"]
        {
            assert!(!parse_migration_trigger(Some(value)), "{value:?}");
        }
        assert!(!parse_migration_trigger(None));
    }

    #[test]
    fn csv_drops_blank_segments() {
        assert_eq!(
            parse_csv("GET, POST,, ,DELETE"),
            vec!["GET".to_string(), "POST".into(), "DELETE".into()]
        );
    }

    #[test]
    fn bool_accepts_env_forms() {
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
