//! Version resolution

use hrun_api::{Version, VersionList};
use hrun_util::{HrunError, Result};
use std::fmt;

/// Parsed version specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Specifier {
    /// Highest installed version
    Latest,
    /// The inventory's configured default
    Default,
    /// Partial version string matched against installed versions
    Partial(String),
}

impl Specifier {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("latest") {
            Self::Latest
        } else if raw.eq_ignore_ascii_case("default") {
            Self::Default
        } else {
            Self::Partial(raw.to_string())
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Specifier::Latest => write!(f, "latest"),
            Specifier::Default => write!(f, "default"),
            Specifier::Partial(s) => write!(f, "{}", s),
        }
    }
}

/// Select the version `specifier` names.
///
/// `latest` picks the highest candidate and `default` returns
/// `default_version` regardless of the candidates. Anything else must be a
/// substring of a candidate's version string. A candidate equal to the
/// specifier wins outright; otherwise the longest common prefix wins, then
/// the highest version.
pub fn resolve<'a>(
    specifier: &Specifier,
    candidates: &'a VersionList,
    default_version: Option<&'a Version>,
) -> Result<&'a Version> {
    match specifier {
        Specifier::Latest => candidates
            .latest()
            .ok_or_else(|| HrunError::resolution("no versions are installed")),
        Specifier::Default => {
            default_version.ok_or_else(|| HrunError::resolution("no default version is configured"))
        }
        Specifier::Partial(partial) => {
            if partial.is_empty() {
                return Err(HrunError::resolution("empty version specifier"));
            }
            if candidates.is_empty() {
                return Err(HrunError::resolution("no versions are installed"));
            }
            if let Some(exact) = candidates.find(partial) {
                return Ok(exact);
            }

            candidates
                .iter()
                .filter(|v| v.display().contains(partial.as_str()))
                .max_by(|a, b| {
                    common_prefix_len(partial, a.display())
                        .cmp(&common_prefix_len(partial, b.display()))
                        .then_with(|| a.number().cmp(b.number()))
                })
                .ok_or_else(|| {
                    HrunError::resolution(format!("no installed version matches '{}'", partial))
                })
        }
    }
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(displays: &[&str]) -> VersionList {
        VersionList::new(
            displays
                .iter()
                .map(|d| Version::new(*d, format!("/opt/hfs{}", d)))
                .collect(),
        )
    }

    fn resolve_str<'a>(
        spec: &str,
        list: &'a VersionList,
        default: Option<&'a Version>,
    ) -> Result<&'a Version> {
        resolve(&Specifier::parse(spec), list, default)
    }

    #[test]
    fn parse_keywords() {
        assert_eq!(Specifier::parse("latest"), Specifier::Latest);
        assert_eq!(Specifier::parse(" Default "), Specifier::Default);
        assert_eq!(Specifier::parse("18.0"), Specifier::Partial("18.0".into()));
    }

    #[test]
    fn latest_is_maximum() {
        let list = versions(&["18.0.532", "17.5.460", "18.0.1000", "16.5.268"]);
        let v = resolve_str("latest", &list, None).unwrap();
        assert_eq!(v.display(), "18.0.1000");
    }

    #[test]
    fn latest_on_empty_list_fails() {
        let list = VersionList::default();
        assert!(matches!(
            resolve_str("latest", &list, None),
            Err(HrunError::ResolutionError(_))
        ));
    }

    #[test]
    fn default_is_independent_of_candidates() {
        let default = Version::new("17.5", "/opt/hfs17.5").with_default(true);

        for list in [
            versions(&["17.5", "18.0"]),
            versions(&["19.0"]),
            VersionList::default(),
        ] {
            let v = resolve_str("default", &list, Some(&default)).unwrap();
            assert_eq!(v, &default);
        }
    }

    #[test]
    fn default_without_configuration_fails() {
        let list = versions(&["17.5", "18.0"]);
        assert!(matches!(
            resolve_str("default", &list, None),
            Err(HrunError::ResolutionError(_))
        ));
    }

    #[test]
    fn partial_on_empty_list_fails() {
        let list = VersionList::default();
        assert!(matches!(
            resolve_str("18.0", &list, None),
            Err(HrunError::ResolutionError(_))
        ));
    }

    #[test]
    fn partial_prefers_highest_of_equal_prefix() {
        let list = versions(&["17.5.460", "18.0.416", "18.0.532"]);
        assert_eq!(resolve_str("18.0", &list, None).unwrap().display(), "18.0.532");
        assert_eq!(resolve_str("17", &list, None).unwrap().display(), "17.5.460");
    }

    #[test]
    fn partial_prefers_longest_common_prefix() {
        // "5.3" is a substring of both, but only "5.3.1" shares a prefix with it
        let list = versions(&["5.3.1", "15.3.2"]);
        assert_eq!(resolve_str("5.3", &list, None).unwrap().display(), "5.3.1");
    }

    #[test]
    fn exact_version_matches_itself() {
        let list = versions(&["18.0.416", "18.0.532"]);
        assert_eq!(resolve_str("18.0.416", &list, None).unwrap().display(), "18.0.416");
    }

    #[test]
    fn exact_version_beats_longer_build() {
        let list = versions(&["18.0", "18.0.532"]);
        assert_eq!(resolve_str("18.0", &list, None).unwrap().display(), "18.0");
        assert_eq!(resolve_str("18", &list, None).unwrap().display(), "18.0.532");
    }

    #[test]
    fn no_match_fails() {
        let list = versions(&["17.5.460", "18.0.532"]);
        assert!(matches!(
            resolve_str("19.5", &list, None),
            Err(HrunError::ResolutionError(_))
        ));
        assert!(resolve_str("   ", &list, None).is_err());
    }
}
