//! Dialog buttons and what their callbacks receive

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};

use super::DialogError;
use crate::registry::WindowId;

/// Callback fired when a button is chosen; its return value is the outcome
pub type ButtonCallback<T> = Arc<dyn Fn(&CallbackTarget) -> T + Send + Sync>;

/// Reference to a rendered dialog element on the surface
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementRef {
    /// Owning window
    pub window_id: WindowId,
    /// CSS id of the window element
    pub css_id: String,
}

/// What a dialog hands to its callbacks
///
/// Which variant is used depends on the dialog's `markup_callbacks` flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackTarget {
    /// The rendered markup of the dialog
    Markup(String),
    /// A bare reference to the dialog element
    Element(ElementRef),
}

impl CallbackTarget {
    pub(crate) fn build(markup: bool, window_id: WindowId, css_id: &str, html: &str) -> Self {
        if markup {
            Self::Markup(html.to_string())
        } else {
            Self::Element(ElementRef {
                window_id,
                css_id: css_id.to_string(),
            })
        }
    }

    /// Rendered markup, if this target carries it
    #[must_use]
    pub fn html(&self) -> Option<&str> {
        match self {
            Self::Markup(html) => Some(html),
            Self::Element(_) => None,
        }
    }

    /// Element reference, if this target carries one
    #[must_use]
    pub fn element(&self) -> Option<&ElementRef> {
        match self {
            Self::Markup(_) => None,
            Self::Element(element) => Some(element),
        }
    }
}

/// One choice offered by a dialog
pub struct DialogButton<T> {
    key: String,
    label: String,
    icon: String,
    callback: Option<ButtonCallback<T>>,
}

impl<T> Clone for DialogButton<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            label: self.label.clone(),
            icon: self.icon.clone(),
            callback: self.callback.clone(),
        }
    }
}

impl<T> fmt::Debug for DialogButton<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogButton")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("icon", &self.icon)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

impl<T> DialogButton<T> {
    /// Button with a key and label, no icon and no callback
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            icon: String::new(),
            callback: None,
        }
    }

    /// Set the icon markup
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Set the callback
    #[must_use]
    pub fn with_callback(mut self, callback: impl Fn(&CallbackTarget) -> T + Send + Sync + 'static) -> Self {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Set an already shared callback
    #[must_use]
    pub fn with_shared_callback(mut self, callback: ButtonCallback<T>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Unique key within the dialog
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display label
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Icon markup
    #[must_use]
    pub fn icon(&self) -> &str {
        &self.icon
    }

    /// Run the callback, if any
    pub(crate) fn invoke(&self, target: &CallbackTarget) -> Option<T> {
        self.callback.as_ref().map(|callback| callback(target))
    }
}

/// Ordered, key-unique set of buttons with at most one default
pub struct ButtonSet<T> {
    buttons: Vec<DialogButton<T>>,
    default: Option<String>,
}

impl<T> Clone for ButtonSet<T> {
    fn clone(&self) -> Self {
        Self {
            buttons: self.buttons.clone(),
            default: self.default.clone(),
        }
    }
}

impl<T> fmt::Debug for ButtonSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonSet")
            .field("buttons", &self.buttons)
            .field("default", &self.default)
            .finish()
    }
}

impl<T> ButtonSet<T> {
    /// Build a set, keeping insertion order
    ///
    /// # Errors
    ///
    /// Returns `DialogError::InvalidConfiguration` for a repeated key or a
    /// default key that names no button.
    pub fn new(buttons: Vec<DialogButton<T>>, default: Option<&str>) -> Result<Self, DialogError> {
        for (i, button) in buttons.iter().enumerate() {
            if buttons[..i].iter().any(|b| b.key == button.key) {
                return Err(DialogError::InvalidConfiguration(format!(
                    "duplicate button key '{}'",
                    button.key
                )));
            }
        }

        if let Some(key) = default {
            if !buttons.iter().any(|b| b.key == key) {
                return Err(DialogError::InvalidConfiguration(format!(
                    "default button '{key}' is not in the button set"
                )));
            }
        }

        Ok(Self {
            buttons,
            default: default.map(str::to_string),
        })
    }

    /// Button by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DialogButton<T>> {
        self.buttons.iter().find(|b| b.key == key)
    }

    /// Key of the default button
    #[must_use]
    pub fn default_key(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// First button in render order
    #[must_use]
    pub fn first(&self) -> Option<&DialogButton<T>> {
        self.buttons.first()
    }

    /// Buttons in render order
    pub fn iter(&self) -> impl Iterator<Item = &DialogButton<T>> {
        self.buttons.iter()
    }

    /// Number of buttons
    #[must_use]
    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    /// Whether the set has no buttons
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    /// Template data for the button row
    pub(crate) fn to_template_value(&self) -> Value {
        Value::Array(
            self.buttons
                .iter()
                .map(|b| {
                    json!({
                        "key": b.key,
                        "label": b.label,
                        "icon": b.icon,
                        "default": self.default.as_deref() == Some(b.key.as_str()),
                    })
                })
                .collect(),
        )
    }
}
