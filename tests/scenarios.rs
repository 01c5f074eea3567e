//! End-to-end scroll scenarios driven through the public API

use std::cell::RefCell;
use std::rc::Rc;

use volt_deck::config::StageConfig;
use volt_deck::{
    Deck, DeckConfig, DeckError, DeckResult, ScrollState, Section, Snapshot, Stage, TriggerAnchor,
    Viewport, Widget, WidgetRegistry, locate,
};

#[test]
fn test_locate_two_sections() {
    let sections = vec![Section::new("a", 0.0, 100.0), Section::new("b", 100.0, 300.0)];
    let vp = Viewport::new(100.0, 1000.0);
    let at = |offset| ScrollState::sample(offset, vp);
    assert_eq!(locate(&at(50.0), &sections, 0.0), Some("a"));
    assert_eq!(locate(&at(150.0), &sections, 0.0), Some("b"));
    assert_eq!(locate(&at(-10.0), &sections, 0.0), None);
}

fn units_config() -> DeckConfig {
    DeckConfig {
        stage_anchor: TriggerAnchor::Lookahead(0.0),
        sections: vec!["intro".into()],
        stages: vec![
            StageConfig {
                id: "start".into(),
                snapshot: Snapshot::new().with("units", 65595.0),
                trigger: None,
            },
            StageConfig {
                id: "mid".into(),
                snapshot: Snapshot::new().with("units", 180000.0),
                trigger: Some("growth".into()),
            },
            StageConfig {
                id: "end".into(),
                snapshot: Snapshot::new().with("units", 340000.0),
                trigger: Some("finale".into()),
            },
        ],
        ..DeckConfig::default()
    }
}

fn units_page() -> Vec<Section> {
    vec![
        Section::new("intro", 0.0, 1000.0),
        Section::new("growth", 1000.0, 2000.0),
        Section::new("finale", 2000.0, 3000.0),
    ]
}

/// Captures every snapshot a widget is shown
struct Odometer {
    shown: Rc<RefCell<Vec<f64>>>,
}

impl Widget for Odometer {
    fn name(&self) -> &str {
        "odometer"
    }

    fn on_stage(&mut self, stage: &Stage) -> DeckResult<()> {
        let units = stage
            .snapshot
            .get("units")
            .ok_or_else(|| DeckError::missing("odometer", "units"))?;
        self.shown.borrow_mut().push(units);
        Ok(())
    }
}

#[test]
fn test_scrolling_back_reemits_previous_snapshot() {
    let vp = Viewport::new(800.0, 3000.0);
    let shown = Rc::new(RefCell::new(Vec::new()));
    let mut deck = Deck::new(&units_config()).unwrap();
    deck.register(Odometer { shown: shown.clone() });

    deck.start(units_page(), 0.0, vp).unwrap();
    deck.on_scroll(1100.0, vp);
    deck.on_scroll(1200.0, vp);
    deck.on_scroll(900.0, vp);

    assert_eq!(*shown.borrow(), vec![65595.0, 180000.0, 65595.0]);
    assert_eq!(deck.current_stage().unwrap().id, "start");
}

#[test]
fn test_round_trip_over_every_boundary() {
    let vp = Viewport::new(800.0, 3000.0);
    let mut deck = Deck::new(&units_config()).unwrap();
    deck.start(units_page(), 0.0, vp).unwrap();

    let down = deck.on_scroll(2500.0, vp);
    let ids: Vec<_> = down.stages.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["mid", "end"]);

    let up = deck.on_scroll(0.0, vp);
    let ids: Vec<_> = up.stages.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["mid", "start"]);
    assert_eq!(up.stages[1].snapshot, Snapshot::new().with("units", 65595.0));
}

#[test]
fn test_subscribers_see_transitions_once() {
    let vp = Viewport::new(800.0, 3000.0);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut deck = Deck::new(&units_config()).unwrap();
    let log = seen.clone();
    deck.subscribe_stage(move |s| log.borrow_mut().push(s.id.clone()));

    deck.start(units_page(), 0.0, vp).unwrap();
    for offset in [1000.0, 1050.0, 1000.0, 1500.0] {
        deck.on_scroll(offset, vp);
    }
    assert_eq!(*seen.borrow(), vec!["mid"]);
}

struct Chart {
    present: bool,
    resized: Rc<RefCell<u32>>,
}

impl Widget for Chart {
    fn name(&self) -> &str {
        if self.present { "revenueChart" } else { "marketShareChart" }
    }

    fn on_resize(&mut self) -> DeckResult<()> {
        if !self.present {
            return Err(DeckError::missing(self.name(), "#marketShareChart"));
        }
        *self.resized.borrow_mut() += 1;
        Ok(())
    }
}

#[test]
fn test_resize_reaches_present_widget() {
    let resized = Rc::new(RefCell::new(0));
    let mut registry = WidgetRegistry::new();
    registry.register(Chart { present: false, resized: resized.clone() });
    registry.register(Chart { present: true, resized: resized.clone() });

    let report = registry.notify_resize();
    assert_eq!(*resized.borrow(), 1);
    assert_eq!(report.updated, 1);
    assert!(matches!(report.failed[0].1, DeckError::MissingTarget { .. }));
}

#[test]
fn test_deck_resize_isolated() {
    let resized = Rc::new(RefCell::new(0));
    let mut deck = Deck::new(&units_config()).unwrap();
    deck.register(Chart { present: false, resized: resized.clone() });
    deck.register(Chart { present: true, resized: resized.clone() });

    let report = deck.on_resize(units_page(), Viewport::new(800.0, 3000.0)).unwrap();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(*resized.borrow(), 1);
}

#[test]
fn test_progress_and_ribbon() {
    let vp = Viewport::new(800.0, 3000.0);
    let mut deck = Deck::new(&units_config()).unwrap();
    deck.start(units_page(), 0.0, vp).unwrap();

    let update = deck.on_scroll(1100.0, vp);
    assert_eq!(update.scroll.progress_pct, 50.0);
    assert!(update.ribbon_visible);

    let update = deck.on_scroll(300.0, vp);
    assert!(!update.ribbon_visible);
    assert_eq!(update.active_section.as_deref(), Some("intro"));
}

fn page_with_growth_at(top: f64) -> Vec<Section> {
    vec![
        Section::new("intro", 0.0, top),
        Section::new("growth", top, 2000.0),
        Section::new("finale", 2000.0, 3000.0),
    ]
}

#[test]
fn test_relayout_moving_boundary_below_line_reverts_stage() {
    let vp = Viewport::new(800.0, 3000.0);
    let shown = Rc::new(RefCell::new(Vec::new()));
    let mut deck = Deck::new(&units_config()).unwrap();
    deck.register(Odometer { shown: shown.clone() });

    deck.start(page_with_growth_at(1000.0), 0.0, vp).unwrap();
    assert_eq!(deck.on_scroll(1100.0, vp).stages[0].id, "mid");

    // Growth now starts below the trigger line at 1100
    deck.on_resize(page_with_growth_at(1500.0), vp).unwrap();
    assert_eq!(deck.current_stage().unwrap().id, "start");
    assert_eq!(deck.active_section(), Some("intro"));

    let update = deck.on_scroll(1200.0, vp);
    assert!(update.stages.is_empty());
    assert_eq!(deck.current_stage().unwrap().id, "start");

    // The moved boundary is crossed normally afterwards
    let update = deck.on_scroll(1600.0, vp);
    assert_eq!(update.stages[0].id, "mid");
    assert_eq!(*shown.borrow(), vec![65595.0, 180000.0, 65595.0, 180000.0]);
}

#[test]
fn test_relayout_moving_boundary_above_line_enters_stage() {
    let vp = Viewport::new(800.0, 3000.0);
    let mut deck = Deck::new(&units_config()).unwrap();
    deck.start(page_with_growth_at(1000.0), 0.0, vp).unwrap();
    deck.on_scroll(900.0, vp);
    assert_eq!(deck.current_stage().unwrap().id, "start");

    deck.on_resize(page_with_growth_at(850.0), vp).unwrap();
    assert_eq!(deck.current_stage().unwrap().id, "mid");
    assert_eq!(deck.active_section(), Some("growth"));

    // Scrolling back above the moved boundary reverts
    let update = deck.on_scroll(800.0, vp);
    assert_eq!(update.stages[0].id, "start");
    assert_eq!(update.stages[0].snapshot.get("units"), Some(65595.0));
}
