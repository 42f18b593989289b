//! Path classifier — maps a watched filesystem path onto the repository.
//!
//! ## Rules
//!
//! | Input (after `jcr_root/`)        | Item path                   |
//! |----------------------------------|-----------------------------|
//! | `apps/foo/bar.txt`               | `/apps/foo/bar.txt`         |
//! | `apps/foo/config.xml`            | `/apps/foo/config`          |
//! | `apps/foo/.content.xml`          | `/apps/foo/jcr:content`     |
//! | `apps/foo/_jcr_content.xml`      | `/apps/foo/jcr:content`     |
//! | `apps/foo/_cq_dialog/.content.xml` | `/apps/foo/cq:dialog/jcr:content` |
//!
//! Paths without a `jcr_root` segment, or with any hidden segment, are not
//! applicable. The one hidden name allowed is the `.content.xml` descriptor.

use std::path::Path;

use crate::types::ItemPath;

/// Directory name anchoring the repository tree inside the watch root.
pub const NAMESPACE_MARKER: &str = "jcr_root";

const METADATA_SUFFIX: &str = ".xml";
const CONTENT_DESCRIPTOR: &str = ".content";
const CONTENT_DESCRIPTOR_FILE: &str = ".content.xml";
const CONTENT_NODE: &str = "jcr:content";

/// Repository locations derived from one local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    /// Repository node the change affects.
    pub item: ItemPath,
    /// Parent of [`Self::item`]; `/` for top-level nodes.
    pub scope: ItemPath,
    /// Location of the raw file inside the package, e.g. `jcr_root/apps/foo/bar.txt`.
    pub archive_path: String,
}

/// Classify a raw watched path. `None` means the path is not applicable.
pub fn classify(local_path: &Path) -> Option<Classified> {
    let normalized = local_path.to_string_lossy().replace('\\', "/");
    let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();

    let (file_name, dirs) = segments.split_last()?;
    if dirs.iter().any(|segment| is_hidden(segment)) {
        return None;
    }
    if is_hidden(file_name) && *file_name != CONTENT_DESCRIPTOR_FILE {
        return None;
    }

    let marker = segments.iter().position(|s| *s == NAMESPACE_MARKER)?;
    let repo = &segments[marker + 1..];
    let (last, parents) = repo.split_last()?;

    let parents: Vec<String> = parents.iter().map(|s| node_name(s)).collect();
    let scope = format!("/{}", parents.join("/"));
    let item = if parents.is_empty() {
        format!("/{}", item_name(last))
    } else {
        format!("{scope}/{}", item_name(last))
    };

    Some(Classified {
        item: ItemPath(item),
        scope: ItemPath(scope),
        archive_path: format!("{NAMESPACE_MARKER}/{}", repo.join("/")),
    })
}

fn is_hidden(segment: &str) -> bool {
    segment.starts_with('.')
}

/// `true` when any segment of `path` is dot-prefixed.
///
/// Everything below such a path classifies as not applicable.
pub fn has_hidden_segment(path: &Path) -> bool {
    path.to_string_lossy()
        .replace('\\', "/")
        .split('/')
        .any(is_hidden)
}

/// Node name for the last segment: metadata suffix stripped, descriptor rewritten.
fn item_name(segment: &str) -> String {
    let stem = segment.strip_suffix(METADATA_SUFFIX).unwrap_or(segment);
    if stem == CONTENT_DESCRIPTOR {
        return CONTENT_NODE.to_string();
    }
    node_name(stem)
}

/// Decode the FileVault namespace escape `_prefix_name` into `prefix:name`.
fn node_name(segment: &str) -> String {
    let Some(rest) = segment.strip_prefix('_') else {
        return segment.to_string();
    };
    match rest.split_once('_') {
        Some((prefix, name))
            if !prefix.is_empty()
                && !name.is_empty()
                && prefix.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            format!("{prefix}:{name}")
        }
        _ => segment.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn item_of(path: &str) -> Option<String> {
        classify(Path::new(path)).map(|c| c.item.0)
    }

    #[test]
    fn hidden_segment_detection_covers_ancestors() {
        assert!(has_hidden_segment(Path::new("/home/me/.work/site")));
        assert!(has_hidden_segment(Path::new("C:\\Users\\me\\.work\\site")));
        assert!(!has_hidden_segment(Path::new("/home/me/work/site")));
        assert!(classify(Path::new("/home/me/.work/site/jcr_root/apps/a.txt")).is_none());
    }

    #[test]
    fn plain_file_maps_to_item_and_parent_scope() {
        let c = classify(Path::new("/work/project/jcr_root/apps/foo/bar.txt")).unwrap();
        assert_eq!(c.item.as_str(), "/apps/foo/bar.txt");
        assert_eq!(c.scope.as_str(), "/apps/foo");
        assert_eq!(c.archive_path, "jcr_root/apps/foo/bar.txt");
    }

    #[test]
    fn escaped_content_descriptor_becomes_jcr_content() {
        let c = classify(Path::new("/work/jcr_root/apps/foo/_jcr_content.xml")).unwrap();
        assert_eq!(c.item.as_str(), "/apps/foo/jcr:content");
        assert_eq!(c.scope.as_str(), "/apps/foo");
        assert_eq!(c.archive_path, "jcr_root/apps/foo/_jcr_content.xml");
    }

    #[test]
    fn dot_content_descriptor_becomes_jcr_content() {
        assert_eq!(
            item_of("/work/jcr_root/apps/foo/.content.xml").as_deref(),
            Some("/apps/foo/jcr:content")
        );
    }

    #[test]
    fn metadata_suffix_is_stripped() {
        assert_eq!(
            item_of("/work/jcr_root/apps/foo/config.xml").as_deref(),
            Some("/apps/foo/config")
        );
    }

    #[test]
    fn escaped_parent_segments_are_decoded() {
        let c = classify(Path::new("/w/jcr_root/apps/foo/_cq_dialog/.content.xml")).unwrap();
        assert_eq!(c.item.as_str(), "/apps/foo/cq:dialog/jcr:content");
        assert_eq!(c.scope.as_str(), "/apps/foo/cq:dialog");
    }

    #[test]
    fn top_level_item_has_root_scope() {
        let c = classify(Path::new("/w/jcr_root/apps")).unwrap();
        assert_eq!(c.item.as_str(), "/apps");
        assert_eq!(c.scope.as_str(), "/");
    }

    #[test]
    fn windows_separators_are_normalized() {
        let c = classify(Path::new(r"C:\work\jcr_root\apps\foo\bar.txt")).unwrap();
        assert_eq!(c.item.as_str(), "/apps/foo/bar.txt");
        assert_eq!(c.archive_path, "jcr_root/apps/foo/bar.txt");
    }

    #[rstest]
    #[case("/work/project/apps/foo/bar.txt")]
    #[case("/work/jcr_root")]
    #[case("/work/jcr_root/")]
    #[case("/work/jcr_root/.git/config")]
    #[case("/work/jcr_root/apps/.idea/workspace.xml")]
    #[case("/work/.hidden/jcr_root/apps/foo/bar.txt")]
    #[case("/work/jcr_root/apps/foo/.DS_Store")]
    #[case("/work/jcr_root_old/apps/foo.txt")]
    #[case("")]
    fn not_applicable(#[case] path: &str) {
        assert_eq!(classify(Path::new(path)), None, "path: {path}");
    }

    #[rstest]
    #[case("_jcr_content", "jcr:content")]
    #[case("_cq_editConfig", "cq:editConfig")]
    #[case("_foo", "_foo")]
    #[case("__bar", "__bar")]
    #[case("_ns_", "_ns_")]
    #[case("plain", "plain")]
    fn namespace_escape(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(node_name(raw), expected);
    }

    #[test]
    fn classify_is_deterministic() {
        let path = Path::new("/work/jcr_root/content/site/en/_jcr_content.xml");
        assert_eq!(classify(path), classify(path));
    }
}
