use super::{names, ModelSchema};
use crate::{Error, Result};

use indexmap::IndexSet;
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, RwLock, RwLockWriteGuard},
};

/// Where raw schema documents come from.
pub trait SchemaSource: Send + Sync {
    /// Returns the raw JSON document for `name`, or `None` when this source
    /// does not know the model.
    fn load(&self, name: &str) -> Result<Option<String>>;
}

/// Schema documents compiled into the application or registered at startup.
#[derive(Debug, Default)]
pub struct BundledSchemas {
    models: RwLock<HashMap<String, String>>,
}

impl BundledSchemas {
    pub fn new() -> BundledSchemas {
        BundledSchemas::default()
    }

    /// Registers (or replaces) the raw document for a model.
    pub fn insert(&self, name: impl Into<String>, contents: impl Into<String>) {
        self.write_models().insert(name.into(), contents.into());
    }

    pub fn with(self, name: impl Into<String>, contents: impl Into<String>) -> BundledSchemas {
        self.insert(name, contents);
        self
    }

    pub fn remove(&self, name: &str) -> Option<String> {
        self.write_models().remove(name)
    }

    fn write_models(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.models.write().unwrap_or_else(|poisoned| {
            tracing::warn!("bundled schema lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl SchemaSource for BundledSchemas {
    fn load(&self, name: &str) -> Result<Option<String>> {
        let models = self
            .models
            .read()
            .map_err(|_| crate::err!("bundled schema map poisoned"))?;
        Ok(models.get(name).cloned())
    }
}

impl SchemaSource for Arc<BundledSchemas> {
    fn load(&self, name: &str) -> Result<Option<String>> {
        self.as_ref().load(name)
    }
}

/// Reads `<root>/<name>.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> DirectorySource {
        DirectorySource { root: root.into() }
    }
}

impl SchemaSource for DirectorySource {
    fn load(&self, name: &str) -> Result<Option<String>> {
        let path = self.root.join(format!("{name}.json"));
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::from(err)),
        }
    }
}

/// Resolves model names to flattened schemas and caches them.
///
/// A live persisted source, when configured, wins over the bundled one.
/// Lookups that fail (unknown name, malformed document, broken ancestor)
/// are logged and reported as "not found".
pub struct SchemaRegistry {
    persisted: Option<Arc<dyn SchemaSource>>,
    bundled: Arc<dyn SchemaSource>,
    cache: RwLock<HashMap<String, Arc<ModelSchema>>>,
}

impl SchemaRegistry {
    pub fn new(bundled: impl SchemaSource + 'static) -> SchemaRegistry {
        SchemaRegistry {
            persisted: None,
            bundled: Arc::new(bundled),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_persisted(mut self, source: impl SchemaSource + 'static) -> SchemaRegistry {
        self.persisted = Some(Arc::new(source));
        self
    }

    /// Returns the flattened schema for `name`, or `None` if it cannot be
    /// resolved.
    pub fn get(&self, name: &str) -> Option<Arc<ModelSchema>> {
        if let Some(schema) = self.cached(name) {
            return Some(schema);
        }

        let mut visited = IndexSet::new();
        let Some(mut schema) = self.import(name, &mut visited) else {
            tracing::debug!(model = name, "schema could not be resolved");
            return None;
        };

        schema.implements = visited.into_iter().collect();
        for field in &mut schema.fields {
            if field.base_model.as_deref() == Some(names::SELF_MODEL) {
                field.base_model = Some(schema.name.clone());
            }
        }

        let schema = Arc::new(schema);
        Some(
            self.write_cache()
                .entry(name.to_string())
                .or_insert(schema)
                .clone(),
        )
    }

    /// Like [`get`](Self::get), but reports absence as an error.
    pub fn require(&self, name: &str) -> Result<Arc<ModelSchema>> {
        self.get(name).ok_or_else(|| Error::schema_not_found(name))
    }

    /// Drops the cached schema for `name`.
    pub fn invalidate(&self, name: &str) {
        self.write_cache().remove(name);
    }

    /// Drops every cached schema. In-flight readers keep the `Arc` they
    /// already hold.
    pub fn invalidate_all(&self) {
        self.write_cache().clear();
    }

    fn cached(&self, name: &str) -> Option<Arc<ModelSchema>> {
        let cache = self.cache.read().unwrap_or_else(|poisoned| {
            tracing::warn!("schema cache lock poisoned, recovering");
            poisoned.into_inner()
        });
        cache.get(name).cloned()
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<ModelSchema>>> {
        self.cache.write().unwrap_or_else(|poisoned| {
            tracing::warn!("schema cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn import(&self, name: &str, visited: &mut IndexSet<String>) -> Option<ModelSchema> {
        let mut schema = self.load(name)?;
        visited.insert(name.to_string());

        for like in &schema.like_inherits {
            visited.insert(like.clone());
        }

        for parent in schema.inherits.clone() {
            if visited.contains(&parent) {
                tracing::debug!(model = name, ancestor = %parent, "ancestor already imported");
                continue;
            }
            visited.insert(parent.clone());

            let Some(ancestor) = self.import(&parent, visited) else {
                tracing::error!(model = name, ancestor = %parent, "failed to import ancestor");
                return None;
            };

            if schema.sort_field.is_none() && ancestor.sort_field.is_some() {
                schema.sort_field = ancestor.sort_field;
                schema.sort_order = ancestor.sort_order;
            }

            for mut field in ancestor.fields {
                if schema.has_field(&field.name) {
                    continue;
                }
                field.inherited = true;
                schema.fields.push(field);
            }
        }

        Some(schema)
    }

    fn load(&self, name: &str) -> Option<ModelSchema> {
        let persisted = self.persisted.iter().map(|source| source.as_ref());
        let sources = persisted.chain(std::iter::once(self.bundled.as_ref()));

        for source in sources {
            let contents = match source.load(name) {
                Ok(Some(contents)) => contents,
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!(model = name, error = %err, "schema source failed");
                    continue;
                }
            };

            return match ModelSchema::from_json(&contents) {
                Ok(schema) => Some(schema),
                Err(err) => {
                    tracing::warn!(model = name, error = %err, "malformed schema document");
                    None
                }
            };
        }

        None
    }
}

impl core::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let cached = self.cache.read().map(|cache| cache.len()).unwrap_or(0);
        f.debug_struct("SchemaRegistry")
            .field("persisted", &self.persisted.is_some())
            .field("cached", &cached)
            .finish()
    }
}
