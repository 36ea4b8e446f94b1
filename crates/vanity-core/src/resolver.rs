//! Longest-prefix resolution of request paths to registered packages.

use vanity_schema::{PackageRecord, Registry};

/// Yields every segment-aligned prefix of `path`, longest first.
///
/// `"a/b/c"` yields `"a/b/c"`, `"a/b"`, `"a"`. Empty segments are kept as-is,
/// so `"a//b"` yields `"a//b"`, `"a/"`, `"a"`.
pub fn candidates(path: &str) -> impl Iterator<Item = &str> {
    std::iter::once(path).chain(path.rmatch_indices('/').map(|(idx, _)| &path[..idx]))
}

/// Resolves a request path (without the leading slash) to the package whose
/// name is the longest registered prefix of it.
///
/// Sub-paths of a registered name belong to that package at any depth:
/// with `tools` registered, `tools/cmd/lint` resolves to `tools`. A prefix
/// ending in an empty segment never matches, since registered names contain
/// none, so slash-only paths simply come back as `None`.
pub fn resolve<'a>(path: &str, registry: &'a Registry) -> Option<&'a PackageRecord> {
    let found = candidates(path).find_map(|prefix| registry.get(prefix));
    if let Some(record) = found {
        tracing::trace!("Resolved '{path}' to package '{}'", record.name);
    }
    found
}
