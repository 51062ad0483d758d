//! Topple quickstart: drive a sandpile to criticality and measure it.
//!
//! Demonstrates:
//!   1. Building an engine from a rule, a shape and a seed
//!   2. Warming up until the grain total stops trending
//!   3. Measuring with several sinks at once
//!   4. Summarising avalanches
//!
//! Run with:
//!   cargo run --example quickstart

use topple_engine::{
    AvalancheTracker, Fanout, Sandpile, StabilityDetector, StatsWindow, WarmUpOutcome,
};
use topple_rules::Abelian;
use topple_space::Square4;

// ─── Run parameters ─────────────────────────────────────────────

const ROWS: u32 = 64;
const COLS: u32 = 64;
const PROBABILITY: f64 = 1e-3;
const SEED: u64 = 42;
const WARM_UP_CAP: u64 = 200_000;
const MEASURE: u64 = 50_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let shape = Square4::new(ROWS, COLS)?;
    let mut pile = Sandpile::builder(Abelian::default())
        .probability(PROBABILITY)
        .seed(SEED)
        .build_random(shape)?;
    println!(
        "{ROWS}x{COLS} abelian pile, p={PROBABILITY}, seed={SEED}, {} grains",
        pile.total()
    );

    let mut detector = StabilityDetector::new(5_000, 100, 0.01)?;
    let warm = pile.drive_to_stable(&mut detector, WARM_UP_CAP);
    match warm.outcome {
        WarmUpOutcome::Converged { slope } => {
            println!("warm-up converged after {} steps (slope {slope:.4})", warm.steps)
        }
        WarmUpOutcome::CapReached => println!("warm-up hit the {WARM_UP_CAP}-step cap"),
        WarmUpOutcome::Interrupted => println!("warm-up interrupted"),
    }

    let mut tracker = AvalancheTracker::new(0);
    let mut window = StatsWindow::default();
    let report = pile.drive(MEASURE, Fanout::new().with(&mut tracker).with(&mut window));
    println!(
        "measured {} steps, total now {} grains",
        report.steps,
        pile.total()
    );

    let records = tracker.records();
    if records.is_empty() {
        println!("no complete avalanches");
        return Ok(());
    }
    let largest = records.iter().map(|r| r.area).max().unwrap_or(0);
    let longest = records.iter().map(|r| r.duration).max().unwrap_or(0);
    let mean_area = records.iter().map(|r| r.area as f64).sum::<f64>() / records.len() as f64;
    println!(
        "{} avalanches: mean area {mean_area:.1}, largest {largest}, longest {longest} steps",
        records.len()
    );
    println!(
        "last step skipped {:.1}% of cells",
        pile.metrics().skip_ratio() * 100.0
    );
    Ok(())
}
