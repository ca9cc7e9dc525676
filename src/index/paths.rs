//! Vault path helpers

/// Join a folder and a name; an empty or `/` folder means the vault root
#[must_use]
pub fn join_path(folder: &str, name: &str) -> String {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{folder}/{name}")
    }
}

/// Path without its final segment, empty at the root
#[must_use]
pub fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(parent, _)| parent)
}

/// Final path segment
#[must_use]
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Whether the final segment of a link ends in a dot-separated suffix
///
/// This is the only signal used to tell unresolved notes from links to
/// attachments, so `[[Release 1.0]]` counts as having an extension.
#[must_use]
pub fn has_extension(link: &str) -> bool {
    last_segment(link)
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
}
