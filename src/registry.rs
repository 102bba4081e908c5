//! Type-specific registry binding a single [`Syntax`] instance to the
//! schemas and validators for each `block_type` it can produce.

use crate::event::ExtractedBlock;
use crate::schema::Schema;
use crate::syntax::Syntax;
use std::collections::HashMap;
use std::sync::Arc;

/// A validator function run against a fully parsed, typed block.
pub type Validator = Arc<dyn Fn(&ExtractedBlock) -> bool + Send + Sync>;

/// Binds one [`Syntax`] to the set of block types it is allowed to produce.
pub struct Registry {
    syntax: Arc<dyn Syntax>,
    schemas: HashMap<String, Arc<dyn Schema>>,
    validators: HashMap<String, Vec<Validator>>,
}

impl Registry {
    pub fn new(syntax: Arc<dyn Syntax>) -> Self {
        Self {
            syntax,
            schemas: HashMap::new(),
            validators: HashMap::new(),
        }
    }

    pub fn syntax(&self) -> &Arc<dyn Syntax> {
        &self.syntax
    }

    /// Register (or replace) the schema for a block type. Last write wins.
    pub fn register(&mut self, block_type: impl Into<String>, schema: Arc<dyn Schema>) {
        let block_type = block_type.into();
        tracing::debug!(block_type = %block_type, "block_type_registered");
        self.schemas.insert(block_type, schema);
    }

    pub fn get_schema(&self, block_type: &str) -> Option<Arc<dyn Schema>> {
        self.schemas.get(block_type).cloned()
    }

    pub fn is_registered(&self, block_type: &str) -> bool {
        self.schemas.contains_key(block_type)
    }

    pub fn add_validator(&mut self, block_type: impl Into<String>, validator: Validator) {
        let block_type = block_type.into();
        tracing::debug!(block_type = %block_type, "validator_added");
        self.validators.entry(block_type).or_default().push(validator);
    }

    /// Run every validator registered for `block.block_type`. A block type
    /// with no validators (or no type at all) passes by default.
    pub fn validate(&self, block: &ExtractedBlock) -> bool {
        let Some(block_type) = block.block_type.as_deref() else {
            return true;
        };
        match self.validators.get(block_type) {
            Some(validators) => validators.iter().all(|v| v(block)),
            None => true,
        }
    }
}
