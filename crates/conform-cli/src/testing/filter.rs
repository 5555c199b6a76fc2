//! Focus/skip selection of specs

use conform_config::RunConfiguration;
use regex::Regex;

/// Skip pattern applied when neither focus nor skip is configured.
/// Flaky and feature-gated specs only run when asked for explicitly.
pub const DEFAULT_SKIP: &str = r"\[Flaky\]|\[Feature:.+\]";

/// Skip pattern in effect for the given user values
pub fn effective_skip<'a>(focus: &str, skip: &'a str) -> &'a str {
    if focus.is_empty() && skip.is_empty() {
        DEFAULT_SKIP
    } else {
        skip
    }
}

/// Compiled focus and skip regexes
#[derive(Debug, Clone, Default)]
pub struct SpecFilter {
    focus: Option<Regex>,
    skip: Option<Regex>,
}

impl SpecFilter {
    /// Build a filter from user values, applying [`DEFAULT_SKIP`] when both are empty
    pub fn new(focus: &str, skip: &str) -> Result<Self, regex::Error> {
        let skip = effective_skip(focus, skip);
        Ok(Self {
            focus: compile(focus)?,
            skip: compile(skip)?,
        })
    }

    pub fn from_config(config: &RunConfiguration) -> Result<Self, regex::Error> {
        Self::new(config.focus(), config.skip())
    }

    /// Whether a spec with this full text should run
    pub fn matches(&self, text: &str) -> bool {
        let focused = self.focus.as_ref().map_or(true, |re| re.is_match(text));
        let skipped = self.skip.as_ref().map_or(false, |re| re.is_match(text));
        focused && !skipped
    }

    pub fn focus_pattern(&self) -> Option<&str> {
        self.focus.as_ref().map(Regex::as_str)
    }

    pub fn skip_pattern(&self) -> Option<&str> {
        self.skip.as_ref().map(Regex::as_str)
    }
}

fn compile(pattern: &str) -> Result<Option<Regex>, regex::Error> {
    if pattern.is_empty() {
        Ok(None)
    } else {
        Regex::new(pattern).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_skip_applied_when_unconfigured() {
        let filter = SpecFilter::new("", "").unwrap();
        assert_eq!(filter.skip_pattern(), Some(DEFAULT_SKIP));
        assert_eq!(filter.focus_pattern(), None);
    }

    #[rstest]
    #[case("[sig-node] Pods should be restarted [Flaky]", false)]
    #[case("[sig-storage] CSI should mount [Feature:CSIInlineVolume]", false)]
    #[case("[sig-network] DNS should resolve [Conformance]", true)]
    #[case("[sig-apps] Feature gates are documented", true)]
    fn test_default_policy(#[case] text: &str, #[case] runs: bool) {
        let filter = SpecFilter::new("", "").unwrap();
        assert_eq!(filter.matches(text), runs);
    }

    #[test]
    fn test_focus_disables_default_skip() {
        let filter = SpecFilter::new(r"\[Flaky\]", "").unwrap();
        assert_eq!(filter.skip_pattern(), None);
        assert!(filter.matches("[sig-node] Pods should be restarted [Flaky]"));
        assert!(!filter.matches("[sig-network] DNS should resolve"));
    }

    #[test]
    fn test_skip_replaces_default_skip() {
        let filter = SpecFilter::new("", r"\[Serial\]").unwrap();
        assert_eq!(filter.skip_pattern(), Some(r"\[Serial\]"));
        assert!(filter.matches("[sig-storage] CSI should mount [Feature:CSIInlineVolume]"));
        assert!(!filter.matches("[sig-apps] Daemon set should rollback [Serial]"));
    }

    #[test]
    fn test_focus_and_skip_combine() {
        let filter = SpecFilter::new("Conformance", "DNS").unwrap();
        assert!(filter.matches("[sig-node] Pods [Conformance]"));
        assert!(!filter.matches("[sig-network] DNS [Conformance]"));
        assert!(!filter.matches("[sig-node] Pods"));
    }

    #[test]
    fn test_effective_skip() {
        assert_eq!(effective_skip("", ""), DEFAULT_SKIP);
        assert_eq!(effective_skip("x", ""), "");
        assert_eq!(effective_skip("", "y"), "y");
    }

    #[test]
    fn test_invalid_regex_is_error() {
        assert!(SpecFilter::new("([", "").is_err());
        assert!(SpecFilter::new("", "([").is_err());
    }
}
