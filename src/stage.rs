//! KPI stage state machine
//!
//! Stages are an ordered narrative (start -> mid -> end). Every stage after
//! the first is bound to a trigger section: crossing that section's start
//! boundary moving down enters the stage, re-crossing it moving up
//! ("leave back") reverts to the previous stage and re-emits its snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::STAGE_TRIGGER_FRACTION;
use crate::scroll::{ScrollState, Viewport};
use crate::section::SectionLayout;

/// Immutable KPI values shown for one stage
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(BTreeMap<String, f64>);

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub snapshot: Snapshot,
}

impl Stage {
    pub fn new(id: impl Into<String>, snapshot: Snapshot) -> Self {
        Self {
            id: id.into(),
            snapshot,
        }
    }
}

/// Where the trigger line sits relative to the scroll offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TriggerAnchor {
    /// Fixed pixel bias below the viewport top
    Lookahead(f64),
    /// Fraction of the viewport height (0.5 = section top hits viewport centre)
    ViewportFraction(f64),
}

impl Default for TriggerAnchor {
    fn default() -> Self {
        TriggerAnchor::ViewportFraction(STAGE_TRIGGER_FRACTION)
    }
}

impl TriggerAnchor {
    /// Document position of the trigger line for this sample
    pub fn position(&self, state: &ScrollState, viewport: Viewport) -> f64 {
        match *self {
            TriggerAnchor::Lookahead(px) => state.offset_px + px,
            TriggerAnchor::ViewportFraction(f) => state.offset_px + viewport.height * f,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingKind {
    /// Trigger line moved down past the section start
    Enter,
    /// Trigger line moved back up above the section start
    LeaveBack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crossing {
    pub section_id: String,
    pub kind: CrossingKind,
}

/// Turns successive trigger-line positions into boundary crossings
///
/// Crossings come out in scroll order: ascending boundaries when moving
/// down, descending when moving up. A single jump over several boundaries
/// yields every intermediate crossing.
#[derive(Debug, Clone, Default)]
pub struct BoundaryWatcher {
    sections: Vec<String>,
    last_position: Option<f64>,
}

impl BoundaryWatcher {
    pub fn new(sections: Vec<String>) -> Self {
        Self {
            sections,
            last_position: None,
        }
    }

    pub fn last_position(&self) -> Option<f64> {
        self.last_position
    }

    /// Re-anchor after a relayout without reporting crossings
    pub fn reset_to(&mut self, position: f64) {
        if position.is_finite() {
            self.last_position = Some(position);
        }
    }

    pub fn advance(&mut self, position: f64, layout: &SectionLayout) -> Vec<Crossing> {
        if !position.is_finite() {
            return Vec::new();
        }
        let prev = self.last_position.replace(position);

        let mut boundaries: Vec<(f64, &str)> = self
            .sections
            .iter()
            .filter_map(|id| layout.get(id).map(|s| (s.start_offset, id.as_str())))
            .collect();
        boundaries.sort_by(|a, b| a.0.total_cmp(&b.0));

        let crossing = |id: &str, kind| Crossing {
            section_id: id.to_string(),
            kind,
        };

        match prev {
            // First sample: catch up on everything already above the trigger line
            None => boundaries
                .iter()
                .filter(|(b, _)| position >= *b)
                .map(|(_, id)| crossing(id, CrossingKind::Enter))
                .collect(),
            Some(prev) if position > prev => boundaries
                .iter()
                .filter(|(b, _)| prev < *b && position >= *b)
                .map(|(_, id)| crossing(id, CrossingKind::Enter))
                .collect(),
            Some(prev) if position < prev => boundaries
                .iter()
                .rev()
                .filter(|(b, _)| position < *b && prev >= *b)
                .map(|(_, id)| crossing(id, CrossingKind::LeaveBack))
                .collect(),
            Some(_) => Vec::new(),
        }
    }
}

type Subscriber = Box<dyn FnMut(&Stage)>;

/// Ordered stage state machine
pub struct StageMapper {
    stages: Vec<Stage>,
    /// Trigger section for each stage; `None` for the initial stage
    triggers: Vec<Option<String>>,
    current: usize,
    subscribers: Vec<Subscriber>,
}

impl std::fmt::Debug for StageMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageMapper")
            .field("stages", &self.stages.iter().map(|s| &s.id).collect::<Vec<_>>())
            .field("triggers", &self.triggers)
            .field("current", &self.current)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl StageMapper {
    /// `stages` pairs each stage with the section whose start enters it.
    /// The first stage's trigger is ignored: it is the initial state.
    pub fn new(stages: Vec<(Stage, Option<String>)>) -> Self {
        let (stages, mut triggers): (Vec<_>, Vec<_>) = stages.into_iter().unzip();
        if let Some(first) = triggers.first_mut() {
            *first = None;
        }
        Self {
            stages,
            triggers,
            current: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, f: impl FnMut(&Stage) + 'static) {
        self.subscribers.push(Box::new(f));
    }

    pub fn current(&self) -> Option<&Stage> {
        self.stages.get(self.current)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Sections that drive transitions, in stage order
    pub fn trigger_sections(&self) -> Vec<String> {
        self.triggers.iter().flatten().cloned().collect()
    }

    pub fn is_terminal(&self) -> bool {
        self.current + 1 >= self.stages.len()
    }

    /// Return to the initial stage without emitting
    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Index of the stage a trigger line at `position` belongs to under `layout`
    ///
    /// Counts consecutive triggers whose section starts at or above the line.
    /// A trigger section missing from the layout stops the count.
    pub fn stage_at(&self, position: f64, layout: &SectionLayout) -> usize {
        self.triggers
            .iter()
            .skip(1)
            .take_while(|t| {
                t.as_deref()
                    .and_then(|id| layout.get(id))
                    .is_some_and(|s| position >= s.start_offset)
            })
            .count()
    }

    /// Step through adjacent transitions until `target` is current
    ///
    /// Returns every stage emitted on the way, in order.
    pub fn walk_to(&mut self, target: usize) -> Vec<Stage> {
        let target = target.min(self.stages.len().saturating_sub(1));
        let mut emitted = Vec::new();
        while self.current != target {
            let step = if self.current < target {
                match self.triggers.get(self.current + 1).cloned().flatten() {
                    Some(id) => self.on_section_enter(&id).cloned(),
                    None => None,
                }
            } else {
                match self.triggers.get(self.current).cloned().flatten() {
                    Some(id) => self.on_section_leave(&id).cloned(),
                    None => None,
                }
            };
            match step {
                Some(stage) => emitted.push(stage),
                None => break,
            }
        }
        emitted
    }

    fn stage_for(&self, section_id: &str) -> Option<usize> {
        self.triggers
            .iter()
            .position(|t| t.as_deref() == Some(section_id))
    }

    /// Forward crossing of `section_id`'s start boundary
    ///
    /// Emits only when the section triggers the next stage; repeated enters
    /// are ignored.
    pub fn on_section_enter(&mut self, section_id: &str) -> Option<&Stage> {
        let target = self.stage_for(section_id)?;
        if target != self.current + 1 {
            if target > self.current + 1 {
                log::debug!(
                    "Ignoring enter of `{}`: stage {} is not adjacent to {}",
                    section_id,
                    target,
                    self.current
                );
            }
            return None;
        }
        self.current = target;
        self.emit()
    }

    /// Backward crossing ("leave back") of `section_id`'s start boundary
    ///
    /// Reverts to the previous stage and re-emits its snapshot.
    pub fn on_section_leave(&mut self, section_id: &str) -> Option<&Stage> {
        let target = self.stage_for(section_id)?;
        if target != self.current || target == 0 {
            return None;
        }
        self.current = target - 1;
        self.emit()
    }

    pub fn apply(&mut self, crossing: &Crossing) -> Option<&Stage> {
        match crossing.kind {
            CrossingKind::Enter => self.on_section_enter(&crossing.section_id),
            CrossingKind::LeaveBack => self.on_section_leave(&crossing.section_id),
        }
    }

    fn emit(&mut self) -> Option<&Stage> {
        let stage = self.stages.get(self.current)?;
        log::info!("Stage -> {}", stage.id);
        for sub in self.subscribers.iter_mut() {
            sub(stage);
        }
        Some(stage)
    }
}
