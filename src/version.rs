//! Semantic-version helpers shared by the definition index and the node store.
//!
//! Version strings in a document are free-form. Anything `semver` accepts
//! (after stripping a leading `v` or `=`) takes part in "latest wins"
//! resolution; anything else only ever wins by being first.

use std::cmp::Ordering;

use semver::Version;

/// Parse a version string leniently. Returns `None` for non-semver strings.
pub fn parse(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix('=')
        .or_else(|| trimmed.strip_prefix('v'))
        .unwrap_or(trimmed);
    let mut version = Version::parse(trimmed).ok()?;
    // Build metadata never affects precedence.
    version.build = semver::BuildMetadata::EMPTY;
    Some(version)
}

/// True when `raw` is a valid semantic version.
pub fn is_valid(raw: &str) -> bool {
    parse(raw).is_some()
}

/// Compare two valid versions. `None` when either side is not semver.
pub fn compare(a: &str, b: &str) -> Option<Ordering> {
    Some(parse(a)?.cmp(&parse(b)?))
}

/// Decide whether `candidate` should replace `current` as the latest version.
///
/// - a valid version replaces a missing or invalid one
/// - a valid version replaces a valid one only when strictly higher
/// - an invalid or missing candidate never replaces anything
pub fn supersedes(candidate: Option<&str>, current: Option<&str>) -> bool {
    let Some(candidate) = candidate.and_then(parse) else {
        return false;
    };
    match current.and_then(parse) {
        Some(current) => candidate > current,
        None => true,
    }
}
