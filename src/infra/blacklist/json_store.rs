use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::fs;

use crate::core::blacklist::{BlacklistKind, BlacklistStore, StoreError};

/// JSON file store for the block-lists. One document per list:
/// `{ "users": [...], "updated_at": "<RFC 3339>" }` in `user_blacklist.json`,
/// `{ "groups": [...], "updated_at": "<RFC 3339>" }` in `group_blacklist.json`.
pub struct JsonBlacklistStore {
    dir: PathBuf,
}

impl JsonBlacklistStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, kind: BlacklistKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }
}

/// Pull the id list out of a document. A missing key is an empty list;
/// numeric ids from hand-edited files are kept as their decimal string.
fn ids_from_document(kind: BlacklistKind, document: &Value) -> HashSet<String> {
    let Some(items) = document.get(kind.list_key()).and_then(Value::as_array) else {
        return HashSet::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        })
        .collect()
}

#[async_trait]
impl BlacklistStore for JsonBlacklistStore {
    async fn load(&self, kind: BlacklistKind) -> Result<HashSet<String>, StoreError> {
        let path = self.path_for(kind);
        if !path.exists() {
            let empty = HashSet::new();
            self.save(kind, &empty).await?;
            tracing::info!(path = %path.display(), "Created empty blacklist file");
            return Ok(empty);
        }

        let text = fs::read_to_string(&path).await?;
        let document: Value = serde_json::from_str(&text)?;
        Ok(ids_from_document(kind, &document))
    }

    async fn save(&self, kind: BlacklistKind, ids: &HashSet<String>) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;

        let mut items: Vec<&String> = ids.iter().collect();
        items.sort();

        let mut document = Map::new();
        document.insert(kind.list_key().to_string(), serde_json::to_value(items)?);
        document.insert(
            "updated_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        let text = serde_json::to_string_pretty(&Value::Object(document))?;

        // Write next to the target and rename over it so readers never see
        // a half-written document.
        let path = self.path_for(kind);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, text).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
