//! Local user data for offline mode.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors produced while loading the user data file.
#[derive(Debug, Error)]
pub enum UserDataError {
    #[error("Couldn't load user data file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid user data in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A game profile served in offline mode.
///
/// Only `id` and `name` are interpreted; every other field is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl UserRecord {
    pub fn to_value(&self) -> Value {
        let mut object = Map::with_capacity(self.profile.len() + 2);
        object.insert("id".to_string(), Value::String(self.id.clone()));
        object.insert("name".to_string(), Value::String(self.name.clone()));
        for (key, value) in &self.profile {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

/// In-memory user records, in file order. Duplicates are not rejected;
/// lookups return the first match.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Vec<UserRecord>,
}

impl UserStore {
    pub fn from_records(users: Vec<UserRecord>) -> Self {
        Self { users }
    }

    /// Read a JSON array of user records.
    pub fn load(path: &Path) -> Result<Self, UserDataError> {
        let text = std::fs::read_to_string(path).map_err(|source| UserDataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let users = serde_json::from_str(&text).map_err(|source| UserDataError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { users })
    }

    pub fn find_by_id(&self, id: &str) -> Option<&UserRecord> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&UserRecord> {
        self.users.iter().find(|user| user.name == name)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    const USERS: &str = r#"[
        {"id": "0f6c8a7e", "name": "Alice", "properties": [{"name": "textures", "value": "e30="}]},
        {"id": "5b1d22c4", "name": "Bob"},
        {"id": "ffffffff", "name": "Alice"}
    ]"#;

    #[test]
    fn test_load_and_lookup() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(USERS.as_bytes()).unwrap();

        let store = UserStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.find_by_id("5b1d22c4").unwrap().name, "Bob");
        assert_eq!(store.find_by_name("Alice").unwrap().id, "0f6c8a7e");
        assert!(store.find_by_id("nope").is_none());
        assert!(store.find_by_name("alice").is_none());
    }

    #[test]
    fn test_opaque_fields_preserved() {
        let users: Vec<UserRecord> = serde_json::from_str(USERS).unwrap();
        assert_eq!(
            users[0].to_value(),
            json!({
                "id": "0f6c8a7e",
                "name": "Alice",
                "properties": [{"name": "textures", "value": "e30="}]
            })
        );
    }

    #[test]
    fn test_load_errors() {
        let missing = UserStore::load(Path::new("/nonexistent/user-data.json")).unwrap_err();
        assert!(matches!(missing, UserDataError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"id\": 1").unwrap();
        let malformed = UserStore::load(file.path()).unwrap_err();
        assert!(matches!(malformed, UserDataError::Parse { .. }));
    }
}
