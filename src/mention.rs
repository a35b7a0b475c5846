//! Mention tags prepended to the message text.

use crate::config::NotificationConfig;
use crate::record::Severity;

/// Tag that pings every member of the space.
pub const MENTION_ALL: &str = "<users/all> ";

/// Mention prefix for a record of the given severity.
///
/// Combines `config.default_mentions` with the per-level spec (default
/// first) and hands the result to [`construct_mentions`].
pub fn resolve_mentions(level: Severity, config: &NotificationConfig) -> String {
    construct_mentions(&config.default_mentions, config.level_mentions(level))
}

/// Turn a default spec and a per-level spec into mention tags.
///
/// Tokens are deduplicated on their raw text, first occurrence wins, and
/// are otherwise used as-is: an empty token between two commas renders as
/// `<users/> `. Any spelling of `all` yields a single [`MENTION_ALL`] tag
/// placed before all individual tags. Every tag carries its own trailing
/// space.
pub fn construct_mentions(default_spec: &str, level_spec: &str) -> String {
    let default_spec = default_spec.trim();
    let level_spec = level_spec.trim();

    let joined = match (default_spec.is_empty(), level_spec.is_empty()) {
        (true, true) => return String::new(),
        (false, false) => format!("{default_spec},{level_spec}"),
        (false, true) => default_spec.to_string(),
        (true, false) => level_spec.to_string(),
    };

    let mut seen: Vec<&str> = Vec::new();
    for token in joined.split(',') {
        if !seen.contains(&token) {
            seen.push(token);
        }
    }

    let mut everyone = false;
    let mut users = String::new();
    for id in seen {
        if id.eq_ignore_ascii_case("all") {
            everyone = true;
        } else {
            users.push_str("<users/");
            users.push_str(id);
            users.push_str("> ");
        }
    }

    if everyone {
        format!("{MENTION_ALL}{users}")
    } else {
        users
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_specs_yield_nothing() {
        assert_eq!(construct_mentions("", ""), "");
        assert_eq!(construct_mentions("  ", "\t"), "");
    }

    #[test]
    fn default_comes_before_level_ids() {
        assert_eq!(construct_mentions("7", "42"), "<users/7> <users/42> ");
    }

    #[test]
    fn single_spec_is_used_alone() {
        assert_eq!(construct_mentions("", "42,43"), "<users/42> <users/43> ");
        assert_eq!(construct_mentions("42", ""), "<users/42> ");
    }

    #[test]
    fn repeated_all_collapses_into_one_tag() {
        assert_eq!(construct_mentions("all,all,bob", ""), construct_mentions("all,bob", ""));
        assert_eq!(construct_mentions("ALL,bob", "All"), "<users/all> <users/bob> ");
    }

    #[test]
    fn all_is_always_emitted_first() {
        assert_eq!(construct_mentions("bob,carol", "all"), "<users/all> <users/bob> <users/carol> ");
    }

    #[test]
    fn duplicates_are_removed_case_sensitively() {
        assert_eq!(construct_mentions("bob,Bob", "bob"), "<users/bob> <users/Bob> ");
    }

    #[test]
    fn unknown_identifiers_are_rendered_as_is() {
        assert_eq!(construct_mentions("not a user!", ""), "<users/not a user!> ");
    }

    #[test]
    fn empty_tokens_are_rendered_as_is() {
        assert_eq!(construct_mentions("bob,,carol", ""), "<users/bob> <users/> <users/carol> ");
        assert_eq!(construct_mentions("bob,", ",carol"), "<users/bob> <users/> <users/carol> ");
    }

    #[test]
    fn resolves_against_config_level() {
        let config = NotificationConfig::default()
            .with_default_mentions("all")
            .with_level_mentions(Severity::Error, " 42 ");
        assert_eq!(resolve_mentions(Severity::Error, &config), "<users/all> <users/42> ");
        assert_eq!(resolve_mentions(Severity::Info, &config), "<users/all> ");
    }
}
