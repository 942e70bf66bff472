//! Template render data
//!
//! A data object carries its own properties plus an optional layer of
//! inherited properties (class-level defaults, shared helpers). Inherited
//! properties only reach the template when the loader is configured with
//! `allow_prototype_access`.

use serde::Serialize;
use serde_json::{Map, Value};

/// Data object a template is rendered against
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TemplateData {
    own: Map<String, Value>,
    inherited: Map<String, Value>,
}

impl TemplateData {
    /// Create empty template data
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build template data from any serializable value
    ///
    /// Objects become the own properties. Any other value is exposed
    /// under the `this` key.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if `value` cannot be serialized, for
    /// example a map with non-string keys.
    pub fn from_serialize<S: Serialize>(value: &S) -> Result<Self, serde_json::Error> {
        Ok(Self::from(serde_json::to_value(value)?))
    }

    /// Set an own property
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.own.insert(key.into(), value.into());
        self
    }

    /// Set an own property in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.own.insert(key.into(), value.into());
    }

    /// Attach inherited properties
    ///
    /// Non-object values are ignored; there is nothing to inherit from them.
    #[must_use]
    pub fn with_inherited(mut self, inherited: Value) -> Self {
        if let Value::Object(map) = inherited {
            self.inherited = map;
        }
        self
    }

    /// Own properties
    #[must_use]
    pub fn own(&self) -> &Map<String, Value> {
        &self.own
    }

    /// Inherited properties
    #[must_use]
    pub fn inherited(&self) -> &Map<String, Value> {
        &self.inherited
    }

    /// Build the context value the template engine sees
    ///
    /// Own properties always shadow inherited ones.
    #[must_use]
    pub fn resolve(&self, allow_prototype_access: bool) -> Value {
        if !allow_prototype_access || self.inherited.is_empty() {
            return Value::Object(self.own.clone());
        }

        let mut merged = self.inherited.clone();
        for (key, value) in &self.own {
            merged.insert(key.clone(), value.clone());
        }
        Value::Object(merged)
    }
}

impl From<Value> for TemplateData {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(own) => Self {
                own,
                inherited: Map::new(),
            },
            Value::Null => Self::default(),
            other => Self::new().with("this", other),
        }
    }
}
