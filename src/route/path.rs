//! Page name → output file path.
//!
//! | Page name        | Output                          |
//! |------------------|---------------------------------|
//! | root page        | `<output>/index.html`           |
//! | `about`          | `<output>/about/index.html`     |
//! | `tag/go`         | `<output>/tag/go/index.html`    |

use std::path::{Path, PathBuf};

const INDEX_FILE: &str = "index.html";

/// Output path for `page_name`.
///
/// Returns `None` when the name is empty or has an empty, `.`, `..` or
/// absolute component, which would escape or alias the output directory.
pub fn path_for(output: &Path, page_name: &str, root_page: &str) -> Option<PathBuf> {
    if page_name == root_page {
        return Some(output.join(INDEX_FILE));
    }

    let mut path = output.to_path_buf();
    for segment in page_name.split('/') {
        if !is_valid_segment(segment) {
            return None;
        }
        path.push(segment);
    }
    path.push(INDEX_FILE);
    Some(path)
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains('\\')
        && !Path::new(segment).has_root()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_for_page() {
        assert_eq!(
            path_for(Path::new("/dist"), "about", "index"),
            Some(PathBuf::from("/dist/about/index.html"))
        );
    }

    #[test]
    fn test_path_for_root_page() {
        assert_eq!(
            path_for(Path::new("/dist"), "index", "index"),
            Some(PathBuf::from("/dist/index.html"))
        );
        assert_eq!(
            path_for(Path::new("/dist"), "home", "home"),
            Some(PathBuf::from("/dist/index.html"))
        );
    }

    #[test]
    fn test_path_for_nested() {
        assert_eq!(
            path_for(Path::new("/dist"), "tag/go", "index"),
            Some(PathBuf::from("/dist/tag/go/index.html"))
        );
    }

    #[test]
    fn test_path_for_rejects_escapes() {
        let out = Path::new("/dist");
        assert_eq!(path_for(out, "", "index"), None);
        assert_eq!(path_for(out, "/etc", "index"), None);
        assert_eq!(path_for(out, "a//b", "index"), None);
        assert_eq!(path_for(out, "../up", "index"), None);
        assert_eq!(path_for(out, "a/./b", "index"), None);
        assert_eq!(path_for(out, "tag/", "index"), None);
        assert_eq!(path_for(out, "a\\b", "index"), None);
    }
}
