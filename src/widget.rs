//! Widget capability and fan-out registry
//!
//! Widgets (charts, canvases, odometer counters, nav dots) are opaque
//! render sinks. The registry is the single place notifications are
//! broadcast from; one widget failing never stops the rest.

use crate::error::{DeckError, DeckResult};
use crate::scroll::ScrollState;
use crate::stage::Stage;

/// Something that renders itself from deck notifications
///
/// Every hook defaults to a no-op so a widget only implements what it
/// reacts to. A widget whose target is absent returns
/// `DeckError::MissingTarget`.
pub trait Widget {
    fn name(&self) -> &str;

    fn on_stage(&mut self, _stage: &Stage) -> DeckResult<()> {
        Ok(())
    }

    fn on_resize(&mut self) -> DeckResult<()> {
        Ok(())
    }

    fn on_scroll(&mut self, _state: &ScrollState, _ribbon_visible: bool) -> DeckResult<()> {
        Ok(())
    }

    /// Active section changed (`None` above the first or below the last section)
    fn on_section(&mut self, _section: Option<(usize, &str)>) -> DeckResult<()> {
        Ok(())
    }
}

/// Outcome of one broadcast
#[derive(Debug, Default)]
pub struct FanOutReport {
    pub updated: usize,
    pub failed: Vec<(String, DeckError)>,
}

impl FanOutReport {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Default)]
pub struct WidgetRegistry {
    widgets: Vec<Box<dyn Widget>>,
}

impl std::fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.widgets.iter().map(|w| w.name()))
            .finish()
    }
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, widget: impl Widget + 'static) {
        log::debug!("Registered widget `{}`", widget.name());
        self.widgets.push(Box::new(widget));
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn notify_resize(&mut self) -> FanOutReport {
        self.broadcast("resize", |w| w.on_resize())
    }

    pub fn notify_stage(&mut self, stage: &Stage) -> FanOutReport {
        self.broadcast("stage", |w| w.on_stage(stage))
    }

    pub fn notify_scroll(&mut self, state: &ScrollState, ribbon_visible: bool) -> FanOutReport {
        self.broadcast("scroll", |w| w.on_scroll(state, ribbon_visible))
    }

    pub fn notify_section(&mut self, section: Option<(usize, &str)>) -> FanOutReport {
        self.broadcast("section", |w| w.on_section(section))
    }

    fn broadcast(
        &mut self,
        event: &str,
        mut f: impl FnMut(&mut dyn Widget) -> DeckResult<()>,
    ) -> FanOutReport {
        let mut report = FanOutReport::default();
        for widget in self.widgets.iter_mut() {
            match f(widget.as_mut()) {
                Ok(()) => report.updated += 1,
                Err(err) => {
                    match &err {
                        DeckError::MissingTarget { .. } => log::debug!("{} skipped: {}", event, err),
                        _ => log::warn!("Widget `{}` failed on {}: {}", widget.name(), event, err),
                    }
                    report.failed.push((widget.name().to_string(), err));
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Snapshot;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records calls; `present = false` mimics a page without the DOM target
    struct Probe {
        name: &'static str,
        present: bool,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl Widget for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn on_stage(&mut self, stage: &Stage) -> DeckResult<()> {
            if !self.present {
                return Err(DeckError::missing(self.name, "#kpiUnits"));
            }
            self.calls.borrow_mut().push(format!("{}:stage:{}", self.name, stage.id));
            Ok(())
        }

        fn on_resize(&mut self) -> DeckResult<()> {
            if !self.present {
                return Err(DeckError::missing(self.name, "#chart"));
            }
            self.calls.borrow_mut().push(format!("{}:resize", self.name));
            Ok(())
        }
    }

    #[test]
    fn test_missing_target_isolated() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut registry = WidgetRegistry::new();
        registry.register(Probe { name: "absent", present: false, calls: calls.clone() });
        registry.register(Probe { name: "present", present: true, calls: calls.clone() });

        let report = registry.notify_resize();
        assert_eq!(report.updated, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "absent");
        assert_eq!(*calls.borrow(), vec!["present:resize"]);
    }

    #[test]
    fn test_stage_fan_out() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut registry = WidgetRegistry::new();
        registry.register(Probe { name: "a", present: true, calls: calls.clone() });
        registry.register(Probe { name: "b", present: true, calls: calls.clone() });

        let stage = Stage::new("mid", Snapshot::new().with("units", 180000.0));
        let report = registry.notify_stage(&stage);
        assert!(report.all_ok());
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn test_default_hooks_are_noops() {
        struct Quiet;
        impl Widget for Quiet {
            fn name(&self) -> &str {
                "quiet"
            }
        }

        let mut registry = WidgetRegistry::new();
        registry.register(Quiet);
        assert!(registry.notify_section(Some((0, "hero"))).all_ok());
        assert_eq!(registry.len(), 1);
    }
}
