//! Light/dark theme preference
//!
//! The only state that outlives a page view. Stored as `"light"`/`"dark"`
//! under a single key; read once at startup, written on every toggle.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::consts::THEME_STORAGE_KEY;
use crate::error::DeckResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Anything other than "light" is treated as the dark default
    pub fn from_stored(s: &str) -> Self {
        if s == "light" { Theme::Light } else { Theme::Dark }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Glyph shown on the toggle button
    pub fn icon(&self) -> &'static str {
        match self {
            Theme::Dark => "🌙",
            Theme::Light => "☀️",
        }
    }

    /// Body class applied while this theme is active
    pub fn body_class(&self) -> Option<&'static str> {
        match self {
            Theme::Dark => None,
            Theme::Light => Some("light-mode"),
        }
    }
}

/// Durable origin-scoped key-value store (localStorage on the web)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> DeckResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> DeckResult<()>;
}

/// In-memory store for native runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> DeckResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> DeckResult<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Browser localStorage (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStore;

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    fn storage() -> DeckResult<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| crate::error::DeckError::Storage("localStorage unavailable".into()))
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> DeckResult<Option<String>> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| crate::error::DeckError::Storage(format!("{:?}", e)))
    }

    fn set(&mut self, key: &str, value: &str) -> DeckResult<()> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| crate::error::DeckError::Storage(format!("{:?}", e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThemePreference {
    theme: Theme,
}

impl ThemePreference {
    /// Read the stored flag; storage failures fall back to the default
    pub fn load(store: &impl KeyValueStore) -> Self {
        let theme = match store.get(THEME_STORAGE_KEY) {
            Ok(Some(value)) => Theme::from_stored(&value),
            Ok(None) => Theme::default(),
            Err(err) => {
                log::warn!("Could not read theme: {}", err);
                Theme::default()
            }
        };
        log::info!("Theme: {}", theme.as_str());
        Self { theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Flip the theme and persist it. The in-page theme changes even if the write fails.
    pub fn toggle(&mut self, store: &mut impl KeyValueStore) -> Theme {
        self.theme = self.theme.toggled();
        if let Err(err) = store.set(THEME_STORAGE_KEY, self.theme.as_str()) {
            log::warn!("Could not save theme: {}", err);
        }
        self.theme
    }
}
