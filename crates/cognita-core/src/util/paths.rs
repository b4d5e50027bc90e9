//! Path resolution utilities.

use std::path::{Path, PathBuf};

/// Expands `~` to the user's home directory.
///
/// If the path starts with `~`, replaces it with the user's home directory.
/// Otherwise returns the path unchanged.
///
/// # Example
///
/// ```
/// use cognita_core::util::paths::expand_tilde;
///
/// let expanded = expand_tilde("~/concepts.json");
/// assert!(!expanded.starts_with("~"));
/// ```
pub fn expand_tilde<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde_with_tilde() {
        let path = expand_tilde("~/data/concepts.json");
        if let Some(home) = dirs::home_dir() {
            assert!(path.starts_with(&home));
            assert!(path.ends_with("data/concepts.json"));
        }
    }

    #[test]
    fn test_expand_tilde_absolute_unchanged() {
        let original = PathBuf::from("/srv/cognita/concepts.json");
        assert_eq!(expand_tilde(&original), original);
    }

    #[test]
    fn test_expand_tilde_relative_unchanged() {
        let original = PathBuf::from("data/concepts.json");
        assert_eq!(expand_tilde(&original), original);
    }

    #[test]
    fn test_expand_tilde_only() {
        let path = expand_tilde("~");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home);
        }
    }
}
