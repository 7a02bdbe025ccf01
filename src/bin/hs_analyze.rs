//! hs-analyze: Cycle and Dynamics Analysis of a Recorded Run
//!
//! Reads a JSON array of step records (or generates a synthetic run with
//! known ground truth), runs the full analysis pipeline, prints a summary
//! and optionally writes the structured report as JSON.
//!
//! ```text
//! hs-analyze --input runs/test/metrics.json --output report.json
//! hs-analyze --synthetic 6 --seed 42
//! RUST_LOG=debug hs-analyze --synthetic 3 --config analysis.toml
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

use hs_cycle_dynamics::{
    AnalysisConfig, AnalysisPipeline, AnalysisReport, EventSymbol, FitOutcome, GrowthParams,
    QEventOutcome, StepRecord, SyntheticRunBuilder,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON file holding an array of step records
    #[arg(long, conflicts_with = "synthetic")]
    input: Option<PathBuf>,

    /// Generate a synthetic run with this many cycles instead of reading one
    #[arg(long)]
    synthetic: Option<usize>,

    /// Seed for the synthetic run
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Path to config TOML (defaults are used when missing)
    #[arg(long, default_value = "analysis.toml")]
    config: PathBuf,

    /// Write the full report as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

fn load_records(args: &Args) -> anyhow::Result<Vec<StepRecord>> {
    if let Some(path) = &args.input {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let records = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse step records in {}", path.display()))?;
        return Ok(records);
    }

    let Some(n_cycles) = args.synthetic else {
        bail!("either --input or --synthetic is required");
    };

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut builder = SyntheticRunBuilder::new()
        .growth(GrowthParams::new(0.6, 0.8, 0.05), 0.02)
        .noise(0.002, 1e-4)
        .with_modularity(true)
        .seed(args.seed);
    for _ in 0..n_cycles {
        let r = rng.random_range(2.8..3.9);
        let h0 = rng.random_range(0.2..0.7);
        let len = rng.random_range(5..40);
        builder = builder.cycle(r, h0, len);
    }

    Ok(builder.build()?.records)
}

fn print_summary(report: &AnalysisReport) {
    let s = &report.summary;

    println!("═══════════════════════════════════════════════════════════════");
    println!("  H/S Cycle Dynamics Report");
    println!("═══════════════════════════════════════════════════════════════\n");

    println!("1. Segmentation:");
    println!("   - records: {}", s.records);
    println!("   - cycles:  {}", s.cycles);
    if report.segmentation.overwrote_existing {
        println!("   - existing cycle ids were overwritten");
    }

    println!("\n2. Event rhythm:");
    for symbol in EventSymbol::ALL {
        println!("   - {}: {}", symbol, s.events.get(symbol));
    }
    println!("   - integration cycles: {}", report.event_cycles.len());

    println!("\n3. Transitions:");
    println!(
        "   - fine-grained points: {} (H: {}, S: {})",
        s.transition_points, s.entropy_transitions, s.density_transitions
    );
    println!("   - cycle boundaries:    {}", s.cycle_transitions);

    println!("\n4. Modularity events:");
    match &report.q_events {
        QEventOutcome::Detected(events) => println!("   - {} event(s)", events.len()),
        QEventOutcome::NotRecorded => println!("   - Q not recorded"),
    }

    println!("\n5. Logistic map fits (H per cycle):");
    for fit in &report.logistic_fits {
        match &fit.outcome {
            FitOutcome::Fitted(res) => println!(
                "   - cycle {:3}: r = {:.4}, n = {:3}, episodes {}..={}, rmse = {:.3e}",
                res.cycle_id, res.r, res.length, res.start_episode, res.end_episode, res.rmse
            ),
            FitOutcome::Skipped(reason) => println!("   - cycle {:3}: skipped ({})", fit.cycle_id, reason),
            FitOutcome::Failed(failure) => println!("   - cycle {:3}: failed ({})", fit.cycle_id, failure),
        }
    }

    println!("\n6. Growth fit (S, whole run):");
    match &report.growth_fit {
        FitOutcome::Fitted(res) => {
            println!("   - k = {:.4}, C = {:.4}, ε = {:.4}", res.k, res.capacity, res.epsilon);
            println!("   - rmse = {:.3e} after {} iteration(s)", res.rmse, res.iterations);
            if let Some(eq) = res.params().equilibrium() {
                println!("   - equilibrium S* = {:.4e}", eq);
            }
        }
        FitOutcome::Skipped(reason) => println!("   - skipped ({})", reason),
        FitOutcome::Failed(failure) => println!("   - failed ({})", failure),
    }

    println!("\n═══════════════════════════════════════════════════════════════");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = AnalysisConfig::load_or_default(&args.config);
    let records = load_records(&args)?;

    let report = AnalysisPipeline::new(config).run(records)?;
    print_summary(&report);

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}
