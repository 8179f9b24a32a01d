//! Named collection of built schemas

use crate::definition::DefinitionError;
use crate::schema::Schema;
use std::collections::HashMap;
use std::sync::Arc;

/// Schemas indexed by model name, kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    schemas: Vec<Arc<Schema>>,
    index: HashMap<String, usize>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema; names must be unique
    pub fn insert(&mut self, schema: Arc<Schema>) -> Result<(), DefinitionError> {
        let name = schema.name().to_string();
        if self.index.contains_key(&name) {
            return Err(DefinitionError::DuplicateModel(name));
        }
        self.index.insert(name, self.schemas.len());
        self.schemas.push(schema);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Schema>> {
        self.index.get(name).map(|&i| &self.schemas[i])
    }

    /// Like [`get`](Self::get), failing with `UnknownModel`
    pub fn require(&self, name: &str) -> Result<&Arc<Schema>, DefinitionError> {
        self.get(name)
            .ok_or_else(|| DefinitionError::UnknownModel(name.to_string()))
    }

    /// Most recently registered schema
    pub fn last(&self) -> Option<&Arc<Schema>> {
        self.schemas.last()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().map(|s| s.name())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
