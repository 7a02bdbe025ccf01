//! Event Classifier: One-Step-Lookback Regime Labeler

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EventConfig;
use crate::error::Result;
use crate::records::{validate_sequence, Event, EventSymbol, StepRecord};

/// Per-symbol tally of an event log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounts {
    pub void: usize,
    pub stable: usize,
    pub volatile: usize,
    pub integrated: usize,
    pub regression: usize,
    pub recovery: usize,
}

impl EventCounts {
    pub fn from_events(events: &[Event]) -> Self {
        let mut counts = Self::default();
        for e in events {
            counts.add(e.event);
        }
        counts
    }

    pub fn add(&mut self, symbol: EventSymbol) {
        *self.slot(symbol) += 1;
    }

    pub fn get(&self, symbol: EventSymbol) -> usize {
        match symbol {
            EventSymbol::Void => self.void,
            EventSymbol::Stable => self.stable,
            EventSymbol::Volatile => self.volatile,
            EventSymbol::Integrated => self.integrated,
            EventSymbol::Regression => self.regression,
            EventSymbol::Recovery => self.recovery,
        }
    }

    pub fn total(&self) -> usize {
        EventSymbol::ALL.iter().map(|&s| self.get(s)).sum()
    }

    fn slot(&mut self, symbol: EventSymbol) -> &mut usize {
        match symbol {
            EventSymbol::Void => &mut self.void,
            EventSymbol::Stable => &mut self.stable,
            EventSymbol::Volatile => &mut self.volatile,
            EventSymbol::Integrated => &mut self.integrated,
            EventSymbol::Regression => &mut self.regression,
            EventSymbol::Recovery => &mut self.recovery,
        }
    }
}

/// Sequential labeler carrying `(prev_h, prev_s, prev_event)`.
///
/// Construct one per run and feed the steps in order.
#[derive(Debug, Clone)]
pub struct EventClassifier {
    config: EventConfig,
    prev_h: Option<f64>,
    prev_s: Option<f64>,
    /// Label of the previous step (None if it produced none)
    prev_event: Option<EventSymbol>,
    events: Vec<Event>,
}

impl EventClassifier {
    pub fn new() -> Self {
        Self::with_config(EventConfig::default())
    }

    pub fn with_config(config: EventConfig) -> Self {
        Self {
            config,
            prev_h: None,
            prev_s: None,
            prev_event: None,
            events: Vec::new(),
        }
    }

    /// Forget carried state and the event log
    pub fn reset(&mut self) {
        self.prev_h = None;
        self.prev_s = None;
        self.prev_event = None;
        self.events.clear();
    }

    /// Label without touching state
    fn label(&self, record: &StepRecord) -> Option<EventSymbol> {
        let cfg = &self.config;
        let (h, s) = (record.h, record.s);

        let mut event = if h < cfg.void_h && s < cfg.void_s {
            Some(EventSymbol::Void)
        } else if cfg.void_h <= h && h < cfg.h_threshold {
            Some(EventSymbol::Stable)
        } else if h >= cfg.h_threshold {
            Some(EventSymbol::Volatile)
        } else {
            None
        };

        if record.terminated && s >= cfg.s_threshold {
            event = Some(EventSymbol::Integrated);
        }

        if self.prev_s.is_some_and(|prev_s| s < prev_s) {
            event = Some(EventSymbol::Regression);
        }

        if self.prev_h.is_some_and(|prev_h| h > prev_h)
            && self.prev_event == Some(EventSymbol::Regression)
        {
            event = Some(EventSymbol::Recovery);
        }

        event
    }

    /// Process a single step
    ///
    /// Returns the appended event, if the step produced one.
    pub fn update(&mut self, record: &StepRecord) -> Option<Event> {
        let symbol = self.label(record);

        self.prev_h = Some(record.h);
        self.prev_s = Some(record.s);
        self.prev_event = symbol;

        let event = Event {
            episode: record.episode,
            event: symbol?,
            h: record.h,
            s: record.s,
            q: record.q_or_default(),
        };
        self.events.push(event.clone());
        Some(event)
    }

    /// Label a whole sequence from a fresh state
    pub fn classify_all(&mut self, records: &[StepRecord]) -> Result<Vec<Event>> {
        validate_sequence(records)?;
        self.reset();

        for record in records {
            self.update(record);
        }

        debug!(steps = records.len(), events = self.events.len(), "classified steps");
        Ok(self.events.clone())
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn counts(&self) -> EventCounts {
        EventCounts::from_events(&self.events)
    }
}

impl Default for EventClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Events grouped into a cycle that closes on `Ω`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCycle {
    pub cycle_id: u32,
    pub events: Vec<Event>,
}

/// Split an event log after every integration event.
///
/// A trailing group without a closing `Ω` is kept as the last cycle.
pub fn group_by_integration(events: &[Event]) -> Vec<EventCycle> {
    let mut cycles = Vec::new();
    let mut current = Vec::new();

    for event in events {
        current.push(event.clone());
        if event.event == EventSymbol::Integrated {
            cycles.push(EventCycle {
                cycle_id: cycles.len() as u32 + 1,
                events: std::mem::take(&mut current),
            });
        }
    }

    if !current.is_empty() {
        cycles.push(EventCycle {
            cycle_id: cycles.len() as u32 + 1,
            events: current,
        });
    }

    cycles
}
