use crate::atomic::TMP_SUFFIX;
use crate::error::StoreError;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Directories directly below these (and the directories themselves) are
/// treated as somebody's home and refused as a database root.
const HOME_PREFIXES: &[&str] = &["home", "Users"];

/// Validates a proposed database root and returns it absolute and lexically cleaned.
///
/// Rejects the empty path, `~`, the filesystem root, drive roots, the current
/// user's home directory and shallow home paths such as `/home/alice`.
pub(crate) fn validate_root(candidate: &Path) -> Result<PathBuf, StoreError> {
    if candidate.as_os_str().is_empty() || candidate == Path::new("~") {
        return Err(StoreError::UnsafeLocation {
            path: candidate.to_path_buf(),
            context: Some("Missing or unsafe filepath".into()),
        });
    }

    let absolute = std::path::absolute(candidate).map_err(|e| StoreError::UnsafeLocation {
        path: candidate.to_path_buf(),
        context: Some(format!("Cannot resolve against working directory: {e}").into()),
    })?;

    let cleaned = clean(&absolute);
    check_location(&cleaned)?;
    Ok(cleaned)
}

/// Deny-list check for an absolute, cleaned path.
pub(crate) fn check_location(path: &Path) -> Result<(), StoreError> {
    let segments: Vec<&str> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(seg) => Some(seg.to_str().unwrap_or_default()),
            _ => None,
        })
        .collect();

    let unsafe_reason = if segments.is_empty() {
        Some("Filesystem or drive root")
    } else if home_dir().is_some_and(|home| clean(&home).as_path() == path) {
        Some("Home directory")
    } else if path.has_root()
        && segments.len() <= 2
        && HOME_PREFIXES.iter().any(|prefix| segments[0] == *prefix)
    {
        Some("Shallow home directory path")
    } else {
        None
    };

    match unsafe_reason {
        Some(reason) => {
            Err(StoreError::UnsafeLocation { path: path.to_path_buf(), context: Some(reason.into()) })
        },
        None => Ok(()),
    }
}

fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Lexical clean: drops `.`, collapses `..` and redundant separators.
///
/// `..` directly below the root stays at the root, as the filesystem does.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for c in path.components() {
        match c {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => out.push(c),
            Component::CurDir => {},
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push(c);
                }
            },
        }
    }

    out
}

/// Collapse `.` / `..` in a caller-supplied name, refusing anything that would
/// leave the store root.
fn normalize_name(raw: &str) -> Result<Vec<String>, StoreError> {
    let mut out: Vec<String> = Vec::new();

    for c in Path::new(raw).components() {
        match c {
            Component::CurDir => {},
            Component::Normal(seg) => out.push(seg.to_string_lossy().into_owned()),
            Component::ParentDir => {
                if out.pop().is_none() {
                    return Err(StoreError::InvalidName {
                        name: raw.to_owned(),
                        context: Some("Name attempted to escape the database via '..'".into()),
                    });
                }
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(StoreError::InvalidName {
                    name: raw.to_owned(),
                    context: Some("Absolute paths are not allowed".into()),
                });
            },
        }
    }

    Ok(out)
}

/// A cleaned collection name, relative to the store root. May be nested (`a/b`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CollectionName(Vec<String>);

impl CollectionName {
    /// # Errors
    /// [`StoreError::MissingCollection`] when nothing is left after cleaning,
    /// [`StoreError::InvalidName`] for absolute or escaping names.
    pub(crate) fn parse(raw: &str) -> Result<Self, StoreError> {
        let segments = normalize_name(raw)?;
        if segments.is_empty() {
            return Err(StoreError::MissingCollection {
                context: Some("No place to put or find records".into()),
            });
        }
        Ok(Self(segments))
    }

    pub(crate) fn dir(&self, root: &Path) -> PathBuf {
        self.0.iter().fold(root.to_path_buf(), |acc, seg| acc.join(seg))
    }

    /// Lock key shared by every writer of this collection.
    pub(crate) fn key(&self) -> String {
        self.0.join("/")
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Cleans a resource name. `Ok(None)` means the name was empty after cleaning.
///
/// # Errors
/// [`StoreError::InvalidName`] for names spanning several path segments,
/// escaping names and names using the reserved temporary suffix.
pub(crate) fn resource_name(raw: &str) -> Result<Option<String>, StoreError> {
    let mut segments = normalize_name(raw)?;
    match segments.len() {
        0 => Ok(None),
        1 => {
            let name = segments.remove(0);
            if name.ends_with(TMP_SUFFIX) {
                return Err(StoreError::InvalidName {
                    name,
                    context: Some("The temporary publish suffix is reserved".into()),
                });
            }
            Ok(Some(name))
        },
        _ => Err(StoreError::InvalidName {
            name: raw.to_owned(),
            context: Some("Resource names cannot contain path separators".into()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_collapses_segments() {
        assert_eq!(clean(Path::new("/tmp/./deep//school/")), PathBuf::from("/tmp/deep/school"));
        assert_eq!(clean(Path::new("/tmp/deep/../school")), PathBuf::from("/tmp/school"));
        assert_eq!(clean(Path::new("/../..")), PathBuf::from("/"));
    }

    #[test]
    fn test_root_and_home_rejected() {
        for candidate in ["/", "/tmp/..", "", "~", "/home", "/home/fakeuser", "/Users/fakeuser/"] {
            let err = validate_root(Path::new(candidate)).expect_err(candidate);
            assert!(matches!(err, StoreError::UnsafeLocation { .. }), "{candidate}: {err}");
        }
    }

    #[test]
    fn test_current_home_rejected() {
        if let Some(home) = home_dir() {
            assert!(matches!(validate_root(&home), Err(StoreError::UnsafeLocation { .. })));
        }
    }

    #[test]
    fn test_deep_paths_accepted() {
        assert_eq!(
            validate_root(Path::new("/home/fakeuser/db")).unwrap(),
            PathBuf::from("/home/fakeuser/db")
        );
        assert_eq!(
            validate_root(Path::new("/tmp/deep/school/")).unwrap(),
            PathBuf::from("/tmp/deep/school")
        );
    }

    #[test]
    fn test_relative_root_is_made_absolute() {
        let resolved = validate_root(Path::new("data/./db")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("data/db"));
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(CollectionName::parse("fish").unwrap().key(), "fish");
        assert_eq!(CollectionName::parse("./sea/./fish/").unwrap().key(), "sea/fish");
        assert_eq!(CollectionName::parse("sea/../fish").unwrap().key(), "fish");
        assert!(matches!(CollectionName::parse(""), Err(StoreError::MissingCollection { .. })));
        assert!(matches!(CollectionName::parse("."), Err(StoreError::MissingCollection { .. })));
        assert!(matches!(CollectionName::parse("/"), Err(StoreError::InvalidName { .. })));
        assert!(matches!(CollectionName::parse("../x"), Err(StoreError::InvalidName { .. })));
    }

    #[test]
    fn test_collection_dir_joins_root() {
        let name = CollectionName::parse("sea/fish").unwrap();
        assert_eq!(name.dir(Path::new("/db")), PathBuf::from("/db/sea/fish"));
    }

    #[test]
    fn test_resource_names() {
        assert_eq!(resource_name("redfish").unwrap().as_deref(), Some("redfish"));
        assert_eq!(resource_name("./redfish").unwrap().as_deref(), Some("redfish"));
        assert_eq!(resource_name("").unwrap(), None);
        assert_eq!(resource_name(".").unwrap(), None);
        assert!(matches!(resource_name("a/b"), Err(StoreError::InvalidName { .. })));
        assert!(matches!(resource_name("../b"), Err(StoreError::InvalidName { .. })));
        assert!(matches!(resource_name("b.tmp"), Err(StoreError::InvalidName { .. })));
    }
}
