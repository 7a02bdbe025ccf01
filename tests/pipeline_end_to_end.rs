use hs_cycle_dynamics::config::LogisticMapConfig;
use hs_cycle_dynamics::{
    AnalysisConfig, AnalysisError, AnalysisPipeline, AnalysisReport, GrowthParams,
    QEventOutcome, StepRecord, SyntheticRunBuilder,
};

const CONFIG: &str = r#"
[segmentation]
h_threshold = 10.0
s_threshold = 10.0
split_on_terminate = true
"#;

fn termination_only() -> AnalysisConfig {
    AnalysisConfig::from_toml_str(CONFIG).expect("config should parse")
}

#[test]
fn synthetic_run_recovers_ground_truth() {
    let truth = GrowthParams::new(0.8, 0.6, 0.1);
    let run = SyntheticRunBuilder::new()
        .cycle(2.8, 0.3, 20)
        .cycle(3.2, 0.3, 20)
        .cycle(3.5, 0.3, 20)
        .growth(truth, 0.05)
        .build()
        .unwrap();

    let report = AnalysisPipeline::new(termination_only())
        .run(run.records.clone())
        .unwrap();

    assert_eq!(report.summary.records, 60);
    assert_eq!(report.summary.cycles, 3);
    assert_eq!(report.cycle_transitions.len(), 2);
    assert!(report.cycle_transitions.iter().all(|t| t.terminated));
    assert_eq!(report.summary.logistic_fitted, 3);

    let step = LogisticMapConfig::default().grid_step();
    for (fit, spec) in report.logistic_fits.iter().zip(&run.cycles) {
        let res = fit.outcome.fitted().expect("cycle should be fitted");
        assert_eq!(res.length, spec.len);
        assert!(
            (res.r - spec.r).abs() <= step,
            "cycle {}: r_true = {}, fitted = {}",
            fit.cycle_id,
            spec.r,
            res.r
        );
    }

    let growth = report.growth_fit.fitted().expect("growth fit should converge");
    let fitted = growth.params();
    assert!(growth.rmse < 1e-4, "rmse = {}", growth.rmse);
    assert!((fitted.net_rate() - truth.net_rate()).abs() < 1e-2);
    assert!((fitted.crowding() - truth.crowding()).abs() < 5e-2);

    assert_eq!(report.q_events, QEventOutcome::NotRecorded);
}

#[test]
fn report_survives_json() {
    let run = SyntheticRunBuilder::new()
        .cycle(3.2, 0.4, 12)
        .cycle(3.6, 0.2, 12)
        .noise(0.005, 1e-4)
        .with_modularity(true)
        .seed(11)
        .build()
        .unwrap();

    let report = AnalysisPipeline::default().run(run.records).unwrap();
    assert!(report.summary.q_events.is_some());

    let json = serde_json::to_string(&report).unwrap();
    let back: AnalysisReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.summary, report.summary);
    assert_eq!(back.events.len(), report.events.len());
}

#[test]
fn records_load_from_json_with_optional_fields() {
    let json = r#"[
        {"episode": 1, "h": 0.1, "s": 0.1},
        {"episode": 2, "h": 0.1, "s": 0.1},
        {"episode": 3, "h": 0.9, "s": 0.1, "terminated": true},
        {"episode": 4, "h": 0.1, "s": 0.6}
    ]"#;
    let records: Vec<StepRecord> = serde_json::from_str(json).unwrap();
    let report = AnalysisPipeline::default().run(records).unwrap();

    let ids: Vec<u32> = report.records.iter().filter_map(|r| r.cycle).collect();
    assert_eq!(ids, vec![1, 1, 2, 3]);
    assert_eq!(report.summary.events.total(), 3);
}

#[test]
fn out_of_order_episodes_abort() {
    let records = vec![
        StepRecord::new(1, 0.1, 0.1),
        StepRecord::new(3, 0.2, 0.1),
        StepRecord::new(2, 0.3, 0.1),
    ];
    let err = AnalysisPipeline::default().run(records).unwrap_err();
    assert!(matches!(err, AnalysisError::NonMonotonicEpisode { index: 2, .. }));
}
