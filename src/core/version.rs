//! core::version
//!
//! Semantic version resolution for ref and tag names.
//!
//! # Parsing
//!
//! [`parse`] is strict: the input must be a full `MAJOR.MINOR.PATCH` version,
//! optionally followed by pre-release and build metadata. Surrounding
//! whitespace and a single leading `v`, `V` or `=` are tolerated, since
//! `v1.2.3` is the conventional tag spelling. Failure is `None`, never an
//! error; callers treat it as "ignore this input".
//!
//! # Coercion
//!
//! [`coerce`] pulls the first `MAJOR[.MINOR[.PATCH]]` run out of a loosely
//! formatted string and pads it to a full version. Only pre-release tags go
//! through coercion (see [`resolve_release_tag`]).
//!
//! # Example
//!
//! ```
//! use tagtrack::core::version::{coerce, parse};
//!
//! assert_eq!(parse("v1.2.3").unwrap().to_string(), "1.2.3");
//! assert!(parse("latest").is_none());
//! assert_eq!(coerce("v3.1-beta").as_deref(), Some("3.1.0"));
//! ```

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;
use semver::Version;

/// First numeric run of up to three components, not embedded in a longer
/// digit sequence.
fn coerce_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|[^\d])(\d{1,16})(?:\.(\d{1,16}))?(?:\.(\d{1,16}))?(?:$|[^\d])")
            .expect("coerce regex must compile")
    })
}

/// Strictly parse a semantic version.
pub fn parse(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let bare = trimmed
        .strip_prefix(['v', 'V', '='])
        .unwrap_or(trimmed)
        .trim_start();
    Version::parse(bare).ok()
}

/// Normalize a loosely formatted version string into `MAJOR.MINOR.PATCH`.
///
/// Returns `None` when no numeric component can be found.
pub fn coerce(raw: &str) -> Option<String> {
    let caps = coerce_re().captures(raw)?;
    let component = |i: usize| -> Option<u64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    let (major, minor, patch) = (component(1)?, component(2)?, component(3)?);
    Some(format!("{}.{}.{}", major, minor, patch))
}

/// Resolve a release tag name to a version.
///
/// Pre-release tags are coerced before parsing; public release tags must
/// parse as they are.
pub fn resolve_release_tag(tag: &str, prerelease: bool) -> Option<Version> {
    if prerelease {
        coerce(tag).and_then(|v| parse(&v))
    } else {
        parse(tag)
    }
}

/// Compare two versions by semver precedence (build metadata ignored).
pub fn precedence(a: &Version, b: &Version) -> Ordering {
    a.cmp_precedence(b)
}

/// Name of the floating tag tracking a major line (`v2` for `2.4.1`).
pub fn major_tag(version: &Version) -> String {
    format!("v{}", version.major)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse {
        use super::*;

        #[test]
        fn plain_version() {
            let v = parse("2.0.0").unwrap();
            assert_eq!((v.major, v.minor, v.patch), (2, 0, 0));
        }

        #[test]
        fn v_prefix_and_whitespace() {
            assert_eq!(parse("  v1.4.2 ").unwrap(), Version::new(1, 4, 2));
            assert_eq!(parse("V1.4.2").unwrap(), Version::new(1, 4, 2));
            assert_eq!(parse("=1.4.2").unwrap(), Version::new(1, 4, 2));
        }

        #[test]
        fn pre_release_and_build() {
            let v = parse("v1.0.0-rc.1+build.5").unwrap();
            assert_eq!(v.pre.as_str(), "rc.1");
            assert_eq!(v.build.as_str(), "build.5");
        }

        #[test]
        fn rejects_partial_and_garbage() {
            for raw in ["", "latest", "v1", "1.2", "vv1.2.3", "1.2.3.4", "main", "01.2.3"] {
                assert!(parse(raw).is_none(), "parsed {raw:?}");
            }
        }
    }

    mod coerce {
        use super::*;

        #[test]
        fn pads_missing_components() {
            assert_eq!(coerce("v3.1-beta").as_deref(), Some("3.1.0"));
            assert_eq!(coerce("7").as_deref(), Some("7.0.0"));
            assert_eq!(coerce("release-7").as_deref(), Some("7.0.0"));
        }

        #[test]
        fn drops_pre_release_suffix() {
            assert_eq!(coerce("1.2.3-alpha.4").as_deref(), Some("1.2.3"));
        }

        #[test]
        fn ignores_extra_components() {
            assert_eq!(coerce("1.2.3.4").as_deref(), Some("1.2.3"));
        }

        #[test]
        fn strips_leading_zeros() {
            assert_eq!(coerce("v01.02").as_deref(), Some("1.2.0"));
        }

        #[test]
        fn none_without_digits() {
            assert_eq!(coerce("beta"), None);
            assert_eq!(coerce(""), None);
        }

        #[test]
        fn skips_overlong_digit_runs() {
            assert_eq!(coerce("12345678901234567"), None);
            assert_eq!(coerce("12345678901234567 v2").as_deref(), Some("2.0.0"));
        }
    }

    #[test]
    fn release_tag_coerces_only_pre_releases() {
        assert_eq!(resolve_release_tag("v3.1-beta", true), Some(Version::new(3, 1, 0)));
        assert_eq!(resolve_release_tag("v3.1-beta", false), None);
        assert_eq!(resolve_release_tag("2.0.0", false), Some(Version::new(2, 0, 0)));
    }

    #[test]
    fn precedence_ignores_build_metadata() {
        let a = parse("1.0.0+a").unwrap();
        let b = parse("1.0.0+b").unwrap();
        assert_eq!(precedence(&a, &b), Ordering::Equal);
        assert_eq!(precedence(&parse("1.0.0-rc.1").unwrap(), &a), Ordering::Less);
    }

    #[test]
    fn major_tag_name() {
        assert_eq!(major_tag(&Version::new(12, 3, 4)), "v12");
    }
}
