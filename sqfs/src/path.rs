//! Resolution of FROM sources to absolute directories.

use std::path::PathBuf;

use directories::BaseDirs;

use crate::query::SourcePath;
use crate::{Error, Result};

/// Prefix that stands for the current user's home directory.
pub const HOME_PREFIX: &str = "~/";

/// Expands `~/` and canonicalizes source paths.
///
/// The home directory is an explicit value so callers (and tests) can
/// substitute their own.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    home: Option<PathBuf>,
}

impl PathResolver {
    pub fn new(home: Option<PathBuf>) -> Self {
        Self { home }
    }

    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self::new(Some(home.into()))
    }

    /// Use the current user's home directory, if the platform reports one.
    pub fn from_env() -> Self {
        Self::new(BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()))
    }

    /// Replace a leading `~/` with the home directory. Other paths pass
    /// through unchanged.
    pub fn expand(&self, raw: &str) -> Result<PathBuf> {
        match raw.strip_prefix(HOME_PREFIX) {
            Some(rest) => {
                let home = self.home.as_ref().ok_or_else(|| Error::PathResolution {
                    path: raw.to_string(),
                    reason: "could not determine home directory".to_string(),
                })?;
                Ok(home.join(rest))
            }
            None => Ok(PathBuf::from(raw)),
        }
    }

    /// Expand and canonicalize. Fails if the target does not exist.
    pub fn resolve(&self, path: &SourcePath) -> Result<PathBuf> {
        let expanded = self.expand(&path.raw)?;
        std::fs::canonicalize(&expanded).map_err(|e| Error::PathResolution {
            path: path.raw.clone(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_expand_home() {
        let resolver = PathResolver::with_home("/home/someone");
        assert_eq!(
            resolver.expand("~/Projects").unwrap(),
            PathBuf::from("/home/someone/Projects")
        );
        assert_eq!(resolver.expand("~/").unwrap(), PathBuf::from("/home/someone/"));
    }

    #[test]
    fn test_expand_leaves_other_paths() {
        let resolver = PathResolver::with_home("/home/someone");
        assert_eq!(resolver.expand("/tmp").unwrap(), PathBuf::from("/tmp"));
        assert_eq!(resolver.expand("~other").unwrap(), PathBuf::from("~other"));
        assert_eq!(resolver.expand("./~/x").unwrap(), PathBuf::from("./~/x"));
    }

    #[test]
    fn test_expand_without_home() {
        let resolver = PathResolver::new(None);
        let err = resolver.expand("~/x").unwrap_err();
        assert!(matches!(err, Error::PathResolution { .. }));
        assert_eq!(resolver.expand("/x").unwrap(), PathBuf::from("/x"));
    }

    #[test]
    fn test_resolve_home_matches_explicit() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("x")).unwrap();
        let resolver = PathResolver::with_home(tmp.path());

        let via_home = resolver.resolve(&SourcePath::new("~/x")).unwrap();
        let explicit = format!("{}/x", tmp.path().display());
        let direct = resolver.resolve(&SourcePath::new(explicit)).unwrap();
        assert_eq!(via_home, direct);
        assert!(via_home.is_absolute());
    }

    #[test]
    fn test_resolve_canonicalizes() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        let resolver = PathResolver::new(None);

        let dotted = format!("{}/a/b/../.", tmp.path().display());
        let resolved = resolver.resolve(&SourcePath::new(dotted)).unwrap();
        assert_eq!(resolved, tmp.path().join("a").canonicalize().unwrap());
    }

    #[test]
    fn test_resolve_missing() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing");
        let resolver = PathResolver::new(None);

        let err = resolver
            .resolve(&SourcePath::new(missing.display().to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::PathResolution { .. }));
        assert!(!missing.exists());
    }
}
