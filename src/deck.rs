//! The deck orchestrator
//!
//! One instance per page session. Every scroll event runs the same
//! pipeline exactly once:
//!
//! ScrollTracker -> SectionLocator -> StageMapper -> WidgetRegistry
//!
//! Widgets never listen to the host directly.

use crate::config::DeckConfig;
use crate::error::DeckResult;
use crate::keys::Shortcut;
use crate::scroll::{ScrollState, ScrollTracker, Viewport};
use crate::section::{Section, SectionLayout, SectionNavigator};
use crate::stage::{BoundaryWatcher, Stage, StageMapper, TriggerAnchor};
use crate::widget::{FanOutReport, Widget, WidgetRegistry};

/// What the host should do in response to a shortcut
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavTarget {
    /// Smooth-scroll to this document offset
    ScrollTo(f64),
    /// Host-side UI toggle (fullscreen, sidebar, help modal, ...)
    Host(Shortcut),
}

/// Result of one scroll event
#[derive(Debug, Clone, PartialEq)]
pub struct DeckUpdate {
    pub scroll: ScrollState,
    pub ribbon_visible: bool,
    pub active_section: Option<String>,
    pub section_changed: bool,
    /// Stages emitted by this event, in scroll order
    pub stages: Vec<Stage>,
    /// Widget hook failures during this event
    pub widget_failures: usize,
}

#[derive(Debug)]
pub struct Deck {
    tracker: ScrollTracker,
    layout: SectionLayout,
    navigator: SectionNavigator,
    stages: StageMapper,
    watcher: BoundaryWatcher,
    anchor: TriggerAnchor,
    widgets: WidgetRegistry,
    nav_sections: Vec<String>,
    active_section: Option<String>,
    viewport: Viewport,
}

impl Deck {
    pub fn new(config: &DeckConfig) -> DeckResult<Self> {
        config.validate()?;
        let stages = config.stage_mapper();
        let watcher = BoundaryWatcher::new(stages.trigger_sections());
        Ok(Self {
            tracker: ScrollTracker::new(config.ribbon_reveal_px),
            layout: SectionLayout::new(Vec::new(), config.lookahead_px)?,
            navigator: SectionNavigator::default(),
            stages,
            watcher,
            anchor: config.stage_anchor,
            widgets: WidgetRegistry::new(),
            nav_sections: config.sections.clone(),
            active_section: None,
            viewport: Viewport::new(0.0, 0.0),
        })
    }

    pub fn register(&mut self, widget: impl Widget + 'static) {
        self.widgets.register(widget);
    }

    pub fn subscribe_stage(&mut self, f: impl FnMut(&Stage) + 'static) {
        self.stages.subscribe(f);
    }

    /// Track the sections found on the page instead of the configured list
    ///
    /// Duplicates and empty ids are dropped. An empty discovery keeps the
    /// configured list.
    pub fn adopt_page_sections(&mut self, ids: Vec<String>) {
        let mut unique: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            if !id.is_empty() && !unique.contains(&id) {
                unique.push(id);
            }
        }
        if unique.is_empty() {
            log::debug!("No sections found on the page, using the configured list");
            return;
        }
        log::info!("Tracking {} page sections", unique.len());
        self.nav_sections = unique;
    }

    /// Section ids the host must measure: nav sections, then stage triggers
    pub fn measured_sections(&self) -> Vec<String> {
        let mut ids = self.nav_sections.clone();
        for trigger in self.stages.trigger_sections() {
            if !ids.contains(&trigger) {
                ids.push(trigger);
            }
        }
        ids
    }

    pub fn layout(&self) -> &SectionLayout {
        &self.layout
    }

    pub fn current_stage(&self) -> Option<&Stage> {
        self.stages.current()
    }

    pub fn active_section(&self) -> Option<&str> {
        self.active_section.as_deref()
    }

    /// Index of the active section within the nav-dot list
    pub fn active_nav_index(&self) -> Option<usize> {
        let active = self.active_section.as_deref()?;
        self.nav_sections.iter().position(|s| s == active)
    }

    /// First paint: show the initial stage, then sample the restored scroll position
    ///
    /// The initial stage reaches the widgets even if the measured layout is rejected.
    pub fn start(&mut self, sections: Vec<Section>, offset_px: f64, viewport: Viewport) -> DeckResult<DeckUpdate> {
        let mut failures = 0;
        if let Some(initial) = self.stages.current().cloned() {
            failures += self.widgets.notify_stage(&initial).failed.len();
        }
        self.on_resize(sections, viewport)?;
        let mut update = self.on_scroll(offset_px, viewport);
        update.widget_failures += failures;
        Ok(update)
    }

    pub fn on_scroll(&mut self, offset_px: f64, viewport: Viewport) -> DeckUpdate {
        self.viewport = viewport;
        let mut failures = 0;

        let scroll = self.tracker.sample(offset_px, viewport);
        let ribbon_visible = self.tracker.ribbon_visible(&scroll);

        let section_report = self.refresh_section(&scroll);
        let section_changed = section_report.is_some();
        failures += section_report.map_or(0, |r| r.failed.len());

        let position = self.anchor.position(&scroll, viewport);
        let mut emitted = Vec::new();
        for crossing in self.watcher.advance(position, &self.layout) {
            if let Some(stage) = self.stages.apply(&crossing).cloned() {
                failures += self.widgets.notify_stage(&stage).failed.len();
                emitted.push(stage);
            }
        }

        failures += self.widgets.notify_scroll(&scroll, ribbon_visible).failed.len();

        DeckUpdate {
            scroll,
            ribbon_visible,
            active_section: self.active_section.clone(),
            section_changed,
            stages: emitted,
            widget_failures: failures,
        }
    }

    /// Re-measured layout after a resize. Sections may arrive in any order.
    ///
    /// Boundaries can move across the trigger line during a relayout, so the
    /// active section and stage are recomputed from the last scroll sample.
    pub fn on_resize(&mut self, mut sections: Vec<Section>, viewport: Viewport) -> DeckResult<FanOutReport> {
        sections.sort_by(|a, b| a.start_offset.total_cmp(&b.start_offset));
        self.layout.relayout(sections)?;
        self.navigator.set_len(self.layout.len());
        self.viewport = viewport;
        let mut report = self.widgets.notify_resize();

        let Some(offset) = self.tracker.last_offset() else {
            return Ok(report);
        };
        let scroll = ScrollState::sample(offset, viewport);
        if let Some(section_report) = self.refresh_section(&scroll) {
            report.failed.extend(section_report.failed);
        }

        let position = self.anchor.position(&scroll, viewport);
        self.watcher.reset_to(position);
        let target = self.stages.stage_at(position, &self.layout);
        for stage in self.stages.walk_to(target) {
            report.failed.extend(self.widgets.notify_stage(&stage).failed);
        }
        Ok(report)
    }

    /// Re-locate the active section; `Some` with the broadcast report when it changed
    fn refresh_section(&mut self, scroll: &ScrollState) -> Option<FanOutReport> {
        let located = self.layout.locate(scroll).map(str::to_string);
        if located == self.active_section {
            return None;
        }
        self.active_section = located;
        let indexed = self
            .active_section
            .as_deref()
            .and_then(|id| self.layout.index_of(id).map(|i| (i, id)));
        if let Some((i, _)) = indexed {
            self.navigator.sync(i);
        }
        Some(self.widgets.notify_section(indexed))
    }

    /// Offset for a nav link or slide-dot click; `None` if the section is absent
    pub fn navigate_to(&mut self, id: &str) -> Option<f64> {
        let offset = self.layout.navigate_to(id)?;
        if let Some(i) = self.layout.index_of(id) {
            self.navigator.sync(i);
        }
        Some(offset)
    }

    pub fn on_shortcut(&mut self, shortcut: Shortcut) -> Option<NavTarget> {
        let index = match shortcut {
            Shortcut::NextSection => self.navigator.next(),
            Shortcut::PrevSection => self.navigator.prev(),
            Shortcut::Top => {
                self.navigator.home();
                return Some(NavTarget::ScrollTo(0.0));
            }
            Shortcut::Bottom => {
                self.navigator.end();
                return Some(NavTarget::ScrollTo(self.viewport.max_scroll()));
            }
            other => return Some(NavTarget::Host(other)),
        }?;
        self.layout
            .sections()
            .get(index)
            .map(|s| NavTarget::ScrollTo(s.start_offset))
    }
}
