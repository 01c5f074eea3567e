//! Volt Deck - scroll orchestration for the Project Volt pitch deck
//!
//! Core modules:
//! - `scroll`: Scroll sampling (progress, direction, ribbon visibility)
//! - `section`: Section layout, active-section lookup, keyboard navigation
//! - `stage`: KPI stage state machine and boundary crossing detection
//! - `widget`: Widget capability trait and isolated fan-out registry
//! - `deck`: The orchestration object tying the pipeline together
//! - `config`: Data-driven deck configuration
//! - `theme`: Light/dark preference persisted in a key-value store
//! - `keys`: Keyboard shortcuts and easter-egg sequences
//! - `format`: KPI display formatting

pub mod config;
pub mod deck;
pub mod error;
pub mod format;
pub mod keys;
pub mod scroll;
pub mod section;
pub mod stage;
pub mod theme;
pub mod widget;

pub use config::DeckConfig;
pub use deck::{Deck, DeckUpdate, NavTarget};
pub use error::{DeckError, DeckResult};
pub use scroll::{ScrollDirection, ScrollState, ScrollTracker, Viewport};
pub use section::{Section, SectionLayout, SectionNavigator, locate};
pub use stage::{BoundaryWatcher, Crossing, Snapshot, Stage, StageMapper, TriggerAnchor};
pub use theme::{KeyValueStore, MemoryStore, Theme, ThemePreference};
pub use widget::{FanOutReport, Widget, WidgetRegistry};

/// Deck tuning constants
pub mod consts {
    /// A section counts as active this many pixels before it reaches the viewport top
    pub const LOOKAHEAD_PX: f64 = 100.0;
    /// KPI ribbon is shown once the page is scrolled past this offset
    pub const RIBBON_REVEAL_PX: f64 = 400.0;
    /// Stage triggers fire when a section top reaches this fraction of the viewport ("top center")
    pub const STAGE_TRIGGER_FRACTION: f64 = 0.5;

    /// LocalStorage key for the theme flag
    pub const THEME_STORAGE_KEY: &str = "theme";

    /// Key history length for sequence detectors
    pub const KEY_HISTORY_LEN: usize = 10;
    pub const EASTER_EGG_KEYWORD: &str = "rizta";
}
