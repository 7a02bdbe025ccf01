//! Analysis Pipeline: One Pass over a Recorded Run
//!
//! ```text
//!  records ─► validate ─► Segmenter ─┬─► EventClassifier
//!                                    ├─► TransitionDetector
//!                                    ├─► CycleTransitionDetector
//!                                    ├─► LogisticMapFitter (per cycle)
//!                                    ├─► GrowthFitter (whole run)
//!                                    └─► QEventDetector (if Q recorded)
//! ```
//!
//! Structural problems with the sequence abort the run; fit problems are
//! recorded in the report next to the successful fits.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::events::{
    group_by_integration, EventClassifier, EventCounts, EventCycle, QEvent, QEventDetector,
};
use crate::fitting::{CycleFit, FitOutcome, GrowthFitResult, GrowthFitter, LogisticMapFitter};
use crate::records::{
    validate_sequence, CycleTransition, Event, StepRecord, TransitionPoint, TransitionReason,
};
use crate::segmentation::{ChangePointRule, CycleTransitionDetector, Segmentation, Segmenter};
use crate::transitions::TransitionDetector;

/// Q-event detection result; absent Q is not an error for the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum QEventOutcome {
    Detected(Vec<QEvent>),
    /// At least one record has no modularity value
    NotRecorded,
}

/// Headline numbers of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub records: usize,
    pub cycles: u32,
    pub events: EventCounts,
    pub transition_points: usize,
    pub entropy_transitions: usize,
    pub density_transitions: usize,
    pub cycle_transitions: usize,
    pub q_events: Option<usize>,
    pub logistic_fitted: usize,
    pub logistic_skipped: usize,
    pub logistic_failed: usize,
    pub growth_fitted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Input records with `cycle` attached
    pub records: Vec<StepRecord>,
    pub segmentation: Segmentation,
    pub events: Vec<Event>,
    /// Event log grouped into Ω-terminated cycles
    pub event_cycles: Vec<EventCycle>,
    pub transition_points: Vec<TransitionPoint>,
    pub cycle_transitions: Vec<CycleTransition>,
    pub logistic_fits: Vec<CycleFit>,
    pub growth_fit: FitOutcome<GrowthFitResult>,
    pub q_events: QEventOutcome,
    pub summary: RunSummary,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisPipeline {
    config: AnalysisConfig,
}

impl AnalysisPipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn run(&self, mut records: Vec<StepRecord>) -> Result<AnalysisReport> {
        self.config.validate()?;
        validate_sequence(&records)?;

        let rule = ChangePointRule::from_config(&self.config.segmentation);
        let segmentation = Segmenter::new(rule).segment(&mut records)?;

        let mut classifier = EventClassifier::with_config(self.config.events.clone());
        let events = classifier.classify_all(&records)?;
        let event_cycles = group_by_integration(&events);

        let transition_points =
            TransitionDetector::new(self.config.transitions.clone()).detect(&records)?;
        let cycle_transitions = CycleTransitionDetector::new(rule).detect(&records)?;

        let logistic_fits = LogisticMapFitter::new(self.config.logistic_map.clone())
            .fit_cycles(&records, &segmentation);

        let growth_fit = GrowthFitter::new(self.config.growth.clone()).fit_records(&records);
        match &growth_fit {
            FitOutcome::Skipped(reason) => warn!(%reason, "growth fit skipped"),
            FitOutcome::Failed(failure) => warn!(%failure, "growth fit failed"),
            FitOutcome::Fitted(_) => {}
        }

        let q_events = if records.iter().all(|r| r.q.is_some()) {
            QEventOutcome::Detected(
                QEventDetector::new(self.config.q_events.clone()).detect(&records)?,
            )
        } else {
            QEventOutcome::NotRecorded
        };

        let summary = summarize(
            &records,
            &segmentation,
            &events,
            &transition_points,
            &cycle_transitions,
            &logistic_fits,
            &growth_fit,
            &q_events,
        );
        info!(
            records = summary.records,
            cycles = summary.cycles,
            events = summary.events.total(),
            transitions = summary.transition_points,
            logistic_fitted = summary.logistic_fitted,
            growth_fitted = summary.growth_fitted,
            "analysis complete"
        );

        Ok(AnalysisReport {
            records,
            segmentation,
            events,
            event_cycles,
            transition_points,
            cycle_transitions,
            logistic_fits,
            growth_fit,
            q_events,
            summary,
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn summarize(
    records: &[StepRecord],
    segmentation: &Segmentation,
    events: &[Event],
    transition_points: &[TransitionPoint],
    cycle_transitions: &[CycleTransition],
    logistic_fits: &[CycleFit],
    growth_fit: &FitOutcome<GrowthFitResult>,
    q_events: &QEventOutcome,
) -> RunSummary {
    let by_reason = |wanted: TransitionReason| {
        transition_points
            .iter()
            .filter(|p| p.reason == wanted || p.reason == TransitionReason::Both)
            .count()
    };

    RunSummary {
        records: records.len(),
        cycles: segmentation.cycle_count,
        events: EventCounts::from_events(events),
        transition_points: transition_points.len(),
        entropy_transitions: by_reason(TransitionReason::Entropy),
        density_transitions: by_reason(TransitionReason::Density),
        cycle_transitions: cycle_transitions.len(),
        q_events: match q_events {
            QEventOutcome::Detected(events) => Some(events.len()),
            QEventOutcome::NotRecorded => None,
        },
        logistic_fitted: logistic_fits.iter().filter(|f| f.outcome.is_fitted()).count(),
        logistic_skipped: logistic_fits.iter().filter(|f| f.outcome.is_skipped()).count(),
        logistic_failed: logistic_fits.iter().filter(|f| f.outcome.is_failed()).count(),
        growth_fitted: growth_fit.is_fitted(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::records::EventSymbol;

    fn scenario() -> Vec<StepRecord> {
        vec![
            StepRecord::new(1, 0.1, 0.1),
            StepRecord::new(2, 0.1, 0.1),
            StepRecord::new(3, 0.9, 0.1).terminated(true),
            StepRecord::new(4, 0.1, 0.6),
        ]
    }

    #[test]
    fn test_scenario_report() {
        let report = AnalysisPipeline::default().run(scenario()).unwrap();

        assert_eq!(report.summary.cycles, 3);
        assert_eq!(report.summary.records, 4);
        assert_eq!(report.cycle_transitions.len(), 2);
        assert_eq!(report.summary.events.void, 2);
        assert_eq!(report.summary.events.volatile, 1);
        assert_eq!(report.summary.events.integrated, 0);
        assert!(report.events.iter().all(|e| e.event != EventSymbol::Regression));

        // Cycles of length 2, 1, 1: only the first is fittable
        assert_eq!(report.summary.logistic_fitted, 1);
        assert_eq!(report.summary.logistic_skipped, 2);
        assert_eq!(report.q_events, QEventOutcome::NotRecorded);
        assert_eq!(report.summary.q_events, None);
        assert!(report.records.iter().all(|r| r.cycle.is_some()));
    }

    #[test]
    fn test_empty_run_is_fatal() {
        assert_eq!(
            AnalysisPipeline::default().run(Vec::new()).unwrap_err(),
            AnalysisError::EmptyInput
        );
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let mut config = AnalysisConfig::default();
        config.logistic_map.resolution = 1;
        let err = AnalysisPipeline::new(config).run(scenario()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }

    #[test]
    fn test_modularity_detected_when_recorded() {
        let records: Vec<StepRecord> = scenario()
            .into_iter()
            .zip([0.1, 0.1, 0.4, 0.4])
            .map(|(r, q)| r.with_q(q))
            .collect();
        let report = AnalysisPipeline::default().run(records).unwrap();
        assert_eq!(report.summary.q_events, Some(1));
    }

    #[test]
    fn test_repeated_runs_are_isolated() {
        let pipeline = AnalysisPipeline::default();
        let first = pipeline.run(scenario()).unwrap();
        let second = pipeline.run(scenario()).unwrap();
        assert_eq!(first, second);
    }
}
