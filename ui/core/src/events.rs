//! UI Events
//!
//! Input reported by the surface back into window controllers. This is the
//! whole listener contract: the surface translates clicks and key presses
//! into these values and hands them to the owning controller.

use serde::{Deserialize, Serialize};

/// A keyboard key relevant to window controllers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    /// Enter / Return
    Enter,
    /// Escape
    Escape,
    /// Any other key, by its `KeyboardEvent.key` name
    Other(String),
}

impl Key {
    /// Parse a `KeyboardEvent.key` or `.code` value
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "Enter" | "NumpadEnter" | "Return" => Self::Enter,
            "Escape" | "Esc" => Self::Escape,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Events from the surface to a window controller
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// A button inside the window was clicked
    Click {
        /// Key of the clicked button (`data-button` attribute)
        button: String,
    },

    /// A key was pressed while the window had focus
    KeyDown {
        /// The pressed key
        key: Key,
    },

    /// The window's own close control was used
    CloseRequested,
}

impl UiEvent {
    /// Click on the button with `key`
    pub fn click(key: impl Into<String>) -> Self {
        Self::Click { button: key.into() }
    }

    /// Key press
    #[must_use]
    pub fn key(key: Key) -> Self {
        Self::KeyDown { key }
    }
}
