//! Section layout and active-section lookup
//!
//! A section is a named, scroll-addressable band of the page. Offsets are
//! measured by the host and re-measured on every resize.

use serde::{Deserialize, Serialize};

use crate::consts::LOOKAHEAD_PX;
use crate::error::{DeckError, DeckResult};
use crate::scroll::ScrollState;

/// A named region `[start_offset, end_offset)` of the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub start_offset: f64,
    pub end_offset: f64,
}

impl Section {
    pub fn new(id: impl Into<String>, start_offset: f64, end_offset: f64) -> Self {
        Self {
            id: id.into(),
            start_offset,
            end_offset,
        }
    }

    #[inline]
    pub fn contains(&self, position: f64) -> bool {
        position >= self.start_offset && position < self.end_offset
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.end_offset - self.start_offset
    }
}

/// Id of the section containing `state.offset_px + lookahead_px`.
///
/// Sections are scanned in declaration order, so if two intervals ever
/// overlap the earliest-declared one wins.
pub fn locate<'a>(state: &ScrollState, sections: &'a [Section], lookahead_px: f64) -> Option<&'a str> {
    let position = state.offset_px + lookahead_px;
    if !position.is_finite() {
        return None;
    }
    sections
        .iter()
        .find(|s| s.contains(position))
        .map(|s| s.id.as_str())
}

/// Validated, ordered set of sections plus the lookahead bias used to locate them
#[derive(Debug, Clone)]
pub struct SectionLayout {
    sections: Vec<Section>,
    lookahead_px: f64,
}

impl Default for SectionLayout {
    fn default() -> Self {
        Self {
            sections: Vec::new(),
            lookahead_px: LOOKAHEAD_PX,
        }
    }
}

impl SectionLayout {
    pub fn new(sections: Vec<Section>, lookahead_px: f64) -> DeckResult<Self> {
        validate(&sections)?;
        Ok(Self {
            sections,
            lookahead_px,
        })
    }

    /// Replace offsets after a layout change (resize, fonts loaded, ...)
    pub fn relayout(&mut self, sections: Vec<Section>) -> DeckResult<()> {
        validate(&sections)?;
        self.sections = sections;
        Ok(())
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn lookahead_px(&self) -> f64 {
        self.lookahead_px
    }

    pub fn get(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    pub fn locate(&self, state: &ScrollState) -> Option<&str> {
        locate(state, &self.sections, self.lookahead_px)
    }

    /// Scroll offset to jump to when a nav link or slide dot for `id` is clicked
    pub fn navigate_to(&self, id: &str) -> Option<f64> {
        match self.get(id) {
            Some(section) => Some(section.start_offset),
            None => {
                log::debug!("Navigation target `{}` not on this page", id);
                None
            }
        }
    }
}

fn validate(sections: &[Section]) -> DeckResult<()> {
    let mut prev_end = f64::NEG_INFINITY;
    for (i, s) in sections.iter().enumerate() {
        if !(s.start_offset.is_finite() && s.end_offset.is_finite()) {
            return Err(DeckError::InvalidLayout(format!("section `{}` has non-finite offsets", s.id)));
        }
        if s.end_offset < s.start_offset {
            return Err(DeckError::InvalidLayout(format!(
                "section `{}` ends before it starts ({} < {})",
                s.id, s.end_offset, s.start_offset
            )));
        }
        if s.start_offset < prev_end {
            return Err(DeckError::InvalidLayout(format!(
                "section `{}` overlaps section `{}`",
                s.id,
                sections[i - 1].id
            )));
        }
        if sections[..i].iter().any(|other| other.id == s.id) {
            return Err(DeckError::InvalidLayout(format!("duplicate section id `{}`", s.id)));
        }
        prev_end = s.end_offset;
    }
    Ok(())
}

/// Keyboard section stepping (j/k, arrows, Home/End)
#[derive(Debug, Clone, Default)]
pub struct SectionNavigator {
    current: usize,
    len: usize,
}

impl SectionNavigator {
    pub fn new(len: usize) -> Self {
        Self { current: 0, len }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if len == 0 {
            self.current = 0;
        } else {
            self.current = self.current.min(len - 1);
        }
    }

    /// Follow the section the user scrolled to
    pub fn sync(&mut self, index: usize) {
        if index < self.len {
            self.current = index;
        }
    }

    /// Step forward; `None` at the last section
    pub fn next(&mut self) -> Option<usize> {
        if self.current + 1 < self.len {
            self.current += 1;
            Some(self.current)
        } else {
            None
        }
    }

    /// Step back; `None` at the first section
    pub fn prev(&mut self) -> Option<usize> {
        if self.current > 0 && self.len > 0 {
            self.current -= 1;
            Some(self.current)
        } else {
            None
        }
    }

    pub fn home(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.current = 0;
        Some(0)
    }

    pub fn end(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.current = self.len - 1;
        Some(self.current)
    }
}
