//! Application options and their merge rules
//!
//! Options are a flat mapping. Instance values override class defaults key
//! by key; nested objects are merged one level deep and no further.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options recognised by every application window
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationOptions {
    /// Initial width; floored to the configured minimum
    pub width: Option<u32>,
    /// Initial height; floored to the configured minimum
    pub height: Option<u32>,
    /// Initial top offset
    pub top: Option<i32>,
    /// Initial left offset
    pub left: Option<i32>,
    /// Render inside a pop-out window frame
    #[serde(alias = "popOut")]
    pub pop_out: bool,
    /// Window may be minimized (pop-out only)
    pub minimizable: bool,
    /// Window may be drag-resized (pop-out only)
    pub resizable: bool,
    /// CSS id for the window element; defaults to `app-{id}`
    pub id: Option<String>,
    /// Extra CSS classes
    pub classes: Vec<String>,
    /// Window title
    pub title: String,
    /// Content template path
    pub template: Option<String>,
    /// Selectors whose scroll position survives a re-render
    #[serde(alias = "scrollY")]
    pub scroll_y: Vec<String>,
}

impl Default for ApplicationOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            top: None,
            left: None,
            pop_out: true,
            minimizable: true,
            resizable: false,
            id: None,
            classes: Vec::new(),
            title: String::new(),
            template: None,
            scroll_y: Vec::new(),
        }
    }
}

impl ApplicationOptions {
    /// Merge instance overrides onto `defaults`
    ///
    /// # Errors
    ///
    /// Fails if `overrides` is neither an object nor null, or if a merged
    /// value has the wrong type.
    pub fn merge(defaults: &Self, overrides: Value) -> Result<Self, serde_json::Error> {
        let mut base = match serde_json::to_value(defaults)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        match overrides {
            Value::Object(map) => {
                let normalized = map
                    .into_iter()
                    .map(|(key, value)| (canonical_key(&key).to_string(), value))
                    .collect();
                merge_options(&mut base, normalized);
            }
            Value::Null => {}
            other => {
                return Err(serde::de::Error::custom(format!(
                    "application options must be an object, got {other}"
                )))
            }
        }

        serde_json::from_value(Value::Object(base))
    }

    /// Set the content template
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the initial size
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// Map camelCase option names onto their field names
fn canonical_key(key: &str) -> &str {
    match key {
        "popOut" => "pop_out",
        "scrollY" => "scroll_y",
        other => other,
    }
}

/// Merge `overrides` into `base`, key by key
///
/// When both sides hold an object for a key, the inner keys are merged; any
/// deeper nesting is replaced wholesale.
pub fn merge_options(base: &mut Map<String, Value>, overrides: Map<String, Value>) {
    for (key, value) in overrides {
        match value {
            Value::Object(incoming) => {
                if let Some(Value::Object(existing)) = base.get_mut(&key) {
                    for (inner_key, inner_value) in incoming {
                        existing.insert(inner_key, inner_value);
                    }
                } else {
                    base.insert(key, Value::Object(incoming));
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}
