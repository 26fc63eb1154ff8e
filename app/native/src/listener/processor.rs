//! Per-application event processors.
//!
//! Some applications emit misleading events while they start up. A processor sits
//! in front of the event translation for one window and decides, event by event,
//! whether the event reaches the store.

use std::time::{Duration, Instant};

use tracing::debug;

use super::event::WindowEventKind;
use crate::config::ProcessorsConfig;
use crate::model::Window;

/// What to do with one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessorResult {
    /// Drop the event.
    Ignore,
    /// Drop the event and lay the window's workspace out again after a delay.
    IgnoreAndRelayout,
    /// Translate the event as usual.
    Process,
    /// Translate the event and discard the processor.
    ProcessAndForget,
}

/// Firefox cloaks its windows once while restoring a session and moves them around
/// before that. Everything up to and including the first cloak is dropped.
#[derive(Clone, Debug, Default)]
pub struct FirefoxProcessor {
    seen_first_cloak: bool,
}

impl FirefoxProcessor {
    pub const PROCESS_FILE_NAME: &'static str = "firefox.exe";

    fn process(&mut self, kind: WindowEventKind) -> ProcessorResult {
        if kind == WindowEventKind::Destroyed {
            return ProcessorResult::ProcessAndForget;
        }
        if self.seen_first_cloak {
            return ProcessorResult::Process;
        }
        if kind == WindowEventKind::Cloaked {
            self.seen_first_cloak = true;
        }
        ProcessorResult::Ignore
    }
}

/// Holds back everything but destruction for a fixed time after the first event.
/// Movement in that window is answered with a delayed relayout, since the
/// application is restoring a position of its own.
#[derive(Clone, Debug)]
pub struct GraceProcessor {
    until: Instant,
}

impl GraceProcessor {
    #[must_use]
    pub fn new(started: Instant, duration: Duration) -> Self { Self { until: started + duration } }

    fn process(&self, kind: WindowEventKind, now: Instant) -> ProcessorResult {
        if kind == WindowEventKind::Destroyed || now >= self.until {
            return ProcessorResult::ProcessAndForget;
        }
        if kind.is_movement() { ProcessorResult::IgnoreAndRelayout } else { ProcessorResult::Ignore }
    }
}

#[derive(Clone, Debug)]
pub enum WindowProcessor {
    Firefox(FirefoxProcessor),
    Grace(GraceProcessor),
}

impl WindowProcessor {
    pub fn process(&mut self, kind: WindowEventKind, now: Instant) -> ProcessorResult {
        match self {
            Self::Firefox(processor) => processor.process(kind),
            Self::Grace(processor) => processor.process(kind, now),
        }
    }
}

type Predicate = Box<dyn Fn(&Window) -> bool>;
type Factory = Box<dyn Fn(&Window, Instant) -> WindowProcessor>;

/// Creates processors for windows that match a registered predicate. The first
/// match wins.
#[derive(Default)]
pub struct ProcessorRegistry {
    entries: Vec<(Predicate, Factory)>,
}

impl ProcessorRegistry {
    #[must_use]
    pub fn empty() -> Self { Self::default() }

    /// The Firefox processor plus one grace processor per configured entry.
    #[must_use]
    pub fn from_config(config: &ProcessorsConfig) -> Self {
        let mut registry = Self::empty();
        registry.register(
            |window| window.is_process(FirefoxProcessor::PROCESS_FILE_NAME),
            |_, _| WindowProcessor::Firefox(FirefoxProcessor::default()),
        );

        for grace in &config.grace_windows {
            let names = grace.process_file_names.clone();
            let duration = Duration::from_millis(grace.duration_ms);
            registry.register(
                move |window| names.iter().any(|name| window.is_process(name)),
                move |_, now| WindowProcessor::Grace(GraceProcessor::new(now, duration)),
            );
        }
        registry
    }

    pub fn register(
        &mut self,
        predicate: impl Fn(&Window) -> bool + 'static,
        factory: impl Fn(&Window, Instant) -> WindowProcessor + 'static,
    ) {
        self.entries.push((Box::new(predicate), Box::new(factory)));
    }

    #[must_use]
    pub fn create(&self, window: &Window, now: Instant) -> Option<WindowProcessor> {
        let (_, factory) = self.entries.iter().find(|(predicate, _)| predicate(window))?;
        debug!(%window, "attaching event processor");
        Some(factory(window, now))
    }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraceWindowConfig;
    use crate::native::fake::FakeNative;

    fn window(process: &str) -> Window { Window::from(FakeNative::standard_window(1, process)) }

    #[test]
    fn test_firefox_ignores_until_first_cloak() {
        let mut processor = FirefoxProcessor::default();

        assert_eq!(processor.process(WindowEventKind::Shown), ProcessorResult::Ignore);
        assert_eq!(processor.process(WindowEventKind::LocationChanged), ProcessorResult::Ignore);
        assert_eq!(processor.process(WindowEventKind::Cloaked), ProcessorResult::Ignore);
        assert_eq!(processor.process(WindowEventKind::Uncloaked), ProcessorResult::Process);
        assert_eq!(processor.process(WindowEventKind::Cloaked), ProcessorResult::Process);
        assert_eq!(processor.process(WindowEventKind::Destroyed), ProcessorResult::ProcessAndForget);
    }

    #[test]
    fn test_firefox_destroy_before_cloak() {
        let mut processor = FirefoxProcessor::default();
        assert_eq!(processor.process(WindowEventKind::Destroyed), ProcessorResult::ProcessAndForget);
    }

    #[test]
    fn test_grace_period() {
        let start = Instant::now();
        let processor = GraceProcessor::new(start, Duration::from_secs(3));
        let during = start + Duration::from_secs(1);

        assert_eq!(processor.process(WindowEventKind::Shown, during), ProcessorResult::Ignore);
        assert_eq!(processor.process(WindowEventKind::LocationChanged, during), ProcessorResult::IgnoreAndRelayout);
        assert_eq!(processor.process(WindowEventKind::MoveSizeEnded, during), ProcessorResult::IgnoreAndRelayout);
        assert_eq!(processor.process(WindowEventKind::Destroyed, during), ProcessorResult::ProcessAndForget);

        let after = start + Duration::from_secs(3);
        assert_eq!(processor.process(WindowEventKind::Foreground, after), ProcessorResult::ProcessAndForget);
    }

    #[test]
    fn test_registry_matches_by_process() {
        let config = ProcessorsConfig {
            grace_windows: vec![GraceWindowConfig {
                process_file_names: vec!["Teams.exe".to_string()],
                duration_ms: 500,
            }],
        };
        let registry = ProcessorRegistry::from_config(&config);
        let now = Instant::now();

        assert_eq!(registry.len(), 2);
        assert!(matches!(registry.create(&window("firefox.exe"), now), Some(WindowProcessor::Firefox(_))));
        assert!(matches!(registry.create(&window("teams.exe"), now), Some(WindowProcessor::Grace(_))));
        assert!(registry.create(&window("notepad.exe"), now).is_none());
    }
}
