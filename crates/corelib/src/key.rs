//! Object keys.
//!
//! An object is addressed by `(object_id, filename)`. On the wire and on the
//! ring the pair is joined as `"<object_id>/<filename>"`; on a node's disk it
//! becomes `<base_dir>/<object_id>/<filename>`. Both components are
//! restricted so the on-disk path can never leave the base directory.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Separator between the object id and the filename.
pub const KEY_SEPARATOR: char = '/';

/// Composite key of a stored object.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct ObjectKey {
    object_id: String,
    filename: String,
}

impl ObjectKey {
    pub fn new(object_id: impl Into<String>, filename: impl Into<String>) -> Result<Self> {
        let object_id = object_id.into();
        let filename = filename.into();
        validate_component("object id", &object_id)?;
        validate_component("filename", &filename)?;
        Ok(Self { object_id, filename })
    }

    /// Parse a joined key. Exactly one separator is accepted.
    pub fn parse(key: &str) -> Result<Self> {
        let (object_id, filename) = key
            .split_once(KEY_SEPARATOR)
            .ok_or_else(|| Error::InvalidKey(format!("{key:?}: expected <object_id>/<filename>")))?;
        Self::new(object_id, filename)
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The joined form used for routing and on the wire.
    pub fn encoded(&self) -> String {
        format!("{}{}{}", self.object_id, KEY_SEPARATOR, self.filename)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.object_id, KEY_SEPARATOR, self.filename)
    }
}

fn validate_component(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidKey(format!("{what} is empty")));
    }
    if value == "." || value == ".." {
        return Err(Error::InvalidKey(format!("{what} {value:?} is reserved")));
    }
    if value.contains(['/', '\\', '\0']) {
        return Err(Error::InvalidKey(format!("{what} {value:?} contains a path separator")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_joins_with_separator() {
        let key = ObjectKey::new("video-1", "manifest.mpd").unwrap();
        assert_eq!(key.encoded(), "video-1/manifest.mpd");
        assert_eq!(key.to_string(), key.encoded());
    }

    #[test]
    fn test_parse_splits_components() {
        let key = ObjectKey::parse("video-1/chunk-0001.m4s").unwrap();
        assert_eq!(key.object_id(), "video-1");
        assert_eq!(key.filename(), "chunk-0001.m4s");
    }

    #[test]
    fn test_rejects_escaping_components() {
        assert!(ObjectKey::new("..", "passwd").is_err());
        assert!(ObjectKey::new("video", ".").is_err());
        assert!(ObjectKey::new("", "file").is_err());
        assert!(ObjectKey::new("video", "").is_err());
        assert!(ObjectKey::parse("a/b/c").is_err());
        assert!(ObjectKey::parse("noseparator").is_err());
        assert!(ObjectKey::new("a\\b", "c").is_err());
    }
}
