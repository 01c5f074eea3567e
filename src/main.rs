//! Volt Deck entry point
//!
//! Wires the deck orchestrator to the browser page. Native builds run a
//! scripted scroll through the default deck and log what it emits.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_deck {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlElement, KeyboardEvent, MouseEvent};

    use volt_deck::format;
    use volt_deck::keys::{KeywordDetector, KonamiDetector, Shortcut};
    use volt_deck::theme::LocalStore;
    use volt_deck::{
        Deck, DeckConfig, DeckError, DeckResult, NavTarget, ScrollState, Section, Stage, Theme,
        ThemePreference, Viewport, Widget,
    };

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn element(id: &str) -> Option<Element> {
        document()?.get_element_by_id(id)
    }

    fn html_element(id: &str) -> Option<HtmlElement> {
        element(id)?.dyn_into().ok()
    }

    fn viewport() -> Viewport {
        let height = web_sys::window()
            .and_then(|w| w.inner_height().ok())
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0);
        let scroll_height = document()
            .and_then(|d| d.document_element())
            .map(|e| e.scroll_height() as f64)
            .unwrap_or(0.0);
        Viewport::new(height, scroll_height)
    }

    fn scroll_offset() -> f64 {
        web_sys::window()
            .and_then(|w| w.scroll_y().ok())
            .unwrap_or(0.0)
    }

    /// Measure the given sections; ids missing from this page are skipped
    fn measure(ids: &[String]) -> Vec<Section> {
        ids.iter()
            .filter_map(|id| {
                let el = html_element(id)?;
                let top = el.offset_top() as f64;
                Some(Section::new(id.clone(), top, top + el.offset_height() as f64))
            })
            .collect()
    }

    /// Section ids found on the page: `.section` ids, then nav `data-section` values
    fn discover_sections() -> Vec<String> {
        let Some(doc) = document() else {
            return Vec::new();
        };
        let mut ids = Vec::new();
        let queries: [(&str, fn(&Element) -> Option<String>); 2] = [
            (".section[id]", |el| Some(el.id())),
            (".nav-section[data-section], .slide-dot[data-section]", |el| {
                el.get_attribute("data-section")
            }),
        ];
        for (selector, read) in queries {
            let Ok(nodes) = doc.query_selector_all(selector) else {
                continue;
            };
            for i in 0..nodes.length() {
                if let Some(id) = nodes
                    .get(i)
                    .and_then(|n| n.dyn_into::<Element>().ok())
                    .and_then(|el| read(&el))
                {
                    ids.push(id);
                }
            }
        }
        ids
    }

    fn smooth_scroll_to(top: f64) {
        if let Some(window) = web_sys::window() {
            let opts = web_sys::ScrollToOptions::new();
            opts.set_top(top);
            opts.set_behavior(web_sys::ScrollBehavior::Smooth);
            window.scroll_to_with_scroll_to_options(&opts);
        }
    }

    fn toggle_class(id: &str, class: &str) {
        if let Some(el) = element(id) {
            let _ = el.class_list().toggle(class);
        }
    }

    /// Horizontal scroll progress bar
    struct ProgressBar {
        target: &'static str,
    }

    impl Widget for ProgressBar {
        fn name(&self) -> &str {
            self.target
        }

        fn on_scroll(&mut self, state: &ScrollState, _ribbon_visible: bool) -> DeckResult<()> {
            let el = html_element(self.target).ok_or_else(|| DeckError::missing("progress", self.target))?;
            let _ = el
                .style()
                .set_property("width", &format!("{}%", state.progress_pct));
            Ok(())
        }
    }

    /// KPI odometer counters
    struct KpiOdometer;

    const KPI_TARGETS: [(&str, &str); 4] = [
        ("units", "kpiUnits"),
        ("revenue", "kpiRevenue"),
        ("ebitda", "kpiEbitda"),
        ("cash", "kpiCash"),
    ];

    impl Widget for KpiOdometer {
        fn name(&self) -> &str {
            "kpi-odometer"
        }

        fn on_stage(&mut self, stage: &Stage) -> DeckResult<()> {
            let mut missing = None;
            for (kpi, target) in KPI_TARGETS {
                let (Some(value), Some(el)) = (stage.snapshot.get(kpi), element(target)) else {
                    if missing.is_none() {
                        missing = Some(target);
                    }
                    continue;
                };
                el.set_inner_html(&format::kpi(kpi, value));
            }
            match missing {
                Some(target) => Err(DeckError::missing(self.name(), target)),
                None => Ok(()),
            }
        }
    }

    /// Sticky KPI ribbon, shown once the hero is scrolled past
    struct KpiRibbon;

    impl Widget for KpiRibbon {
        fn name(&self) -> &str {
            "kpi-ribbon"
        }

        fn on_scroll(&mut self, _state: &ScrollState, ribbon_visible: bool) -> DeckResult<()> {
            let el = element("kpiRibbon").ok_or_else(|| DeckError::missing(self.name(), "kpiRibbon"))?;
            let _ = el.class_list().toggle_with_force("visible", ribbon_visible);
            Ok(())
        }
    }

    /// Slide dots and sidebar nav entries keyed by `data-section`
    struct SectionDots;

    impl Widget for SectionDots {
        fn name(&self) -> &str {
            "section-dots"
        }

        fn on_section(&mut self, section: Option<(usize, &str)>) -> DeckResult<()> {
            let Some((_, id)) = section else {
                return Ok(());
            };
            let doc = document().ok_or_else(|| DeckError::missing(self.name(), "document"))?;
            let nodes = doc
                .query_selector_all(".slide-dot, .nav-section")
                .map_err(|_| DeckError::missing(self.name(), ".slide-dot"))?;
            if nodes.length() == 0 {
                return Err(DeckError::missing(self.name(), ".slide-dot"));
            }
            for i in 0..nodes.length() {
                if let Some(el) = nodes.get(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                    let active = el.get_attribute("data-section").as_deref() == Some(id);
                    let _ = el.class_list().toggle_with_force("active", active);
                }
            }
            Ok(())
        }
    }

    fn apply_theme(theme: Theme) {
        if let Some(body) = document().and_then(|d| d.body()) {
            let _ = body.class_list().toggle_with_force("light-mode", theme.body_class().is_some());
        }
        if let Some(btn) = element("navThemeBtn") {
            btn.set_text_content(Some(theme.icon()));
        }
    }

    fn run_host_shortcut(shortcut: Shortcut) {
        match shortcut {
            Shortcut::ToggleFullscreen => {
                let Some(doc) = document() else { return };
                if doc.fullscreen_element().is_none() {
                    if let Some(root) = doc.document_element() {
                        let _ = root.request_fullscreen();
                    }
                } else {
                    doc.exit_fullscreen();
                }
            }
            Shortcut::ToggleSidebar => toggle_class("navSidebar", "collapsed"),
            Shortcut::ToggleNavbar => {
                toggle_class("navTopbar", "hidden");
                toggle_class("navShowBtn", "visible");
            }
            Shortcut::ToggleHelp => toggle_class("keyboardModal", "visible"),
            Shortcut::CloseHelp => {
                if let Some(el) = element("keyboardModal") {
                    let _ = el.class_list().remove_1("visible");
                }
            }
            // Scroll shortcuts are resolved by the deck
            _ => {}
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        let started = js_sys::Date::now();
        log::info!("Volt deck starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let mut deck = match Deck::new(&DeckConfig::default()) {
            Ok(deck) => deck,
            Err(e) => {
                log::error!("Deck config rejected: {}", e);
                return;
            }
        };

        deck.register(ProgressBar { target: "scrollProgress" });
        deck.register(ProgressBar { target: "navProgressFill" });
        deck.register(ProgressBar { target: "progressBar" });
        deck.register(KpiOdometer);
        deck.register(KpiRibbon);
        deck.register(SectionDots);

        deck.adopt_page_sections(discover_sections());
        let sections = measure(&deck.measured_sections());
        if let Err(e) = deck.start(sections, scroll_offset(), viewport()) {
            log::warn!("Initial layout rejected: {}", e);
        }
        let deck = Rc::new(RefCell::new(deck));

        setup_scroll(&window, deck.clone());
        setup_resize(&window, deck.clone());
        setup_keyboard(&document, deck.clone());
        setup_nav_clicks(&document, deck);
        setup_theme_toggle();

        log::info!("Volt deck ready in {:.0} ms", js_sys::Date::now() - started);
    }

    fn setup_scroll(window: &web_sys::Window, deck: Rc<RefCell<Deck>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            deck.borrow_mut().on_scroll(scroll_offset(), viewport());
        });
        let _ = window.add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(window: &web_sys::Window, deck: Rc<RefCell<Deck>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut d = deck.borrow_mut();
            let sections = measure(&d.measured_sections());
            if let Err(e) = d.on_resize(sections, viewport()) {
                log::warn!("Layout rejected after resize: {}", e);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_keyboard(document: &Document, deck: Rc<RefCell<Deck>>) {
        let mut konami = KonamiDetector::new();
        let mut keyword = KeywordDetector::default();

        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if konami.push(&event.code()) {
                log::info!("Konami code!");
                toggle_class("fireworks", "active");
            }
            if keyword.push(&event.key()) {
                log::info!("Keyword easter egg");
                toggle_class("riztaEasterEgg", "visible");
            }

            let typing = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .map(|el| Shortcut::is_text_input_tag(&el.tag_name()))
                .unwrap_or(false);
            let Some(shortcut) = Shortcut::from_key(&event.key(), typing) else {
                return;
            };
            if shortcut.prevents_default() {
                event.prevent_default();
            }

            // Release the borrow before touching the DOM
            let target = deck.borrow_mut().on_shortcut(shortcut);
            match target {
                Some(NavTarget::ScrollTo(top)) => smooth_scroll_to(top),
                Some(NavTarget::Host(s)) => run_host_shortcut(s),
                None => {}
            }
        });
        let _ = document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Anchor links and slide dots both navigate to a named section
    fn setup_nav_clicks(document: &Document, deck: Rc<RefCell<Deck>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let Some(el) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let Ok(Some(link)) = el.closest("a[href^=\"#\"], .slide-dot") else {
                return;
            };
            let id = match link.get_attribute("data-section") {
                Some(id) => id,
                None => match link.get_attribute("href") {
                    Some(href) => href.trim_start_matches('#').to_string(),
                    None => return,
                },
            };
            event.prevent_default();
            let offset = deck.borrow_mut().navigate_to(&id);
            if let Some(top) = offset {
                smooth_scroll_to(top);
            }
        });
        let _ = document.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_theme_toggle() {
        let Some(btn) = element("navThemeBtn") else {
            log::debug!("No theme button on this page");
            return;
        };
        let mut store = LocalStore;
        let mut pref = ThemePreference::load(&store);
        apply_theme(pref.theme());

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let theme = pref.toggle(&mut store);
            apply_theme(theme);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_deck::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Volt deck (native) starting...");
    log::info!("The page host needs the wasm build - run with `trunk serve` for the web version");

    if let Err(e) = scripted_scroll() {
        log::error!("Scripted scroll failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scroll down through the default deck and back up, printing each stage
#[cfg(not(target_arch = "wasm32"))]
fn scripted_scroll() -> volt_deck::DeckResult<()> {
    use volt_deck::{Deck, DeckConfig, Section, Viewport, format};

    let config = DeckConfig::default();
    let mut deck = Deck::new(&config)?;
    deck.subscribe_stage(|stage| {
        let kpis: Vec<String> = stage
            .snapshot
            .iter()
            .map(|(name, value)| format!("{}={}", name, format::kpi(name, value)))
            .collect();
        println!("stage {:<6} {}", stage.id, kpis.join(" "));
    });

    // Lay the measured sections out one viewport apart
    let height = 900.0;
    let sections: Vec<Section> = deck
        .measured_sections()
        .iter()
        .enumerate()
        .map(|(i, id)| Section::new(id.clone(), i as f64 * height, (i + 1) as f64 * height))
        .collect();
    let total = sections.len() as f64 * height;
    let viewport = Viewport::new(height, total);

    deck.start(sections, 0.0, viewport)?;
    let max = viewport.max_scroll();
    let steps = 12;
    let offsets = (0..=steps)
        .map(|i| max * i as f64 / steps as f64)
        .chain((0..steps).rev().map(|i| max * i as f64 / steps as f64));
    for offset in offsets {
        let update = deck.on_scroll(offset, viewport);
        if update.section_changed {
            println!(
                "{:>5.1}% section {}",
                update.scroll.progress_pct,
                update.active_section.as_deref().unwrap_or("-")
            );
        }
    }
    Ok(())
}
