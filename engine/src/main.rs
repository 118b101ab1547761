use adventurer_engine::{Pacing, StepOutcome, Walker, WalkerConfig};
use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "adventurer")]
#[command(about = "Walks the adventurer through the floors one depth-first step at a time", long_about = None)]
struct Args {
    /// Number of floors (defaults to ADVENTURER_FLOORS, then 10)
    #[arg(short, long)]
    floors: Option<usize>,

    /// Number of steps to trigger (defaults to one full cycle, 2N - 1)
    #[arg(short, long)]
    steps: Option<usize>,

    /// Pause after a discovery or backtrack, in milliseconds
    #[arg(long)]
    step_delay_ms: Option<u64>,

    /// Pause after a completed cycle, in milliseconds
    #[arg(long)]
    cycle_delay_ms: Option<u64>,

    /// Run without any pacing delay
    #[arg(long)]
    no_delay: bool,

    /// Print each step as a JSON line
    #[arg(long)]
    json: bool,

    /// Verbose output level (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(args: &Args) -> Result<WalkerConfig> {
    let mut config = WalkerConfig::from_env().context("failed to read walker configuration")?;

    if let Some(floors) = args.floors {
        config.floor_count = floors;
    }
    if let Some(ms) = args.step_delay_ms {
        config.pacing.step_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = args.cycle_delay_ms {
        config.pacing.cycle_delay = Duration::from_millis(ms);
    }
    if args.no_delay {
        config.pacing = Pacing::none();
    }
    Ok(config)
}

fn print_outcome(index: usize, outcome: &StepOutcome) {
    let path = outcome
        .state
        .stack()
        .iter()
        .map(|floor| floor.to_string())
        .collect::<Vec<_>>()
        .join(" -> ");
    println!(
        "[{:>3}] {:<16} path: {}",
        index, outcome.event.to_string(), path
    );
    println!("      {}", outcome.message);
    println!("      Conquered: {}", outcome.state.progress());
}

/// Fires `steps` triggers one after another and hands each outcome to `emit`.
async fn run_steps<F>(walker: &Walker, steps: usize, mut emit: F) -> Result<()>
where
    F: FnMut(usize, &StepOutcome) -> Result<()>,
{
    for index in 1..=steps {
        let outcome = walker
            .step()
            .await
            .context("walker unexpectedly busy")?;
        emit(index, &outcome)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = resolve_config(&args)?;
    let engine = config.build_engine().context("invalid floor count")?;
    let steps = args.steps.unwrap_or_else(|| engine.cycle_length());

    if !args.json {
        println!("=== Adventurer ===");
        println!("Floors: {}", config.floor_count);
        println!(
            "Pacing: {}ms per step, {}ms per cycle",
            config.pacing.step_delay.as_millis(),
            config.pacing.cycle_delay.as_millis()
        );
        println!("Steps: {}", steps);
        println!();
    }

    let walker = Walker::new(engine, config.pacing);

    run_steps(&walker, steps, |index, outcome| {
        if args.json {
            println!("{}", serde_json::to_string(outcome)?);
        } else {
            print_outcome(index, outcome);
        }
        Ok(())
    })
    .await?;

    if !args.json {
        let state = walker.snapshot().await;
        println!();
        println!("=== Finished on floor {} ===", state.current());
        println!("Conquered: {}", state.progress());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use adventurer_engine::{TraversalEngine, TraversalEvent};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_run_steps_emits_every_index() {
        let walker = Walker::new(TraversalEngine::new(3).unwrap(), Pacing::none());
        let mut seen = Vec::new();
        run_steps(&walker, 5, |index, outcome| {
            seen.push((index, outcome.event));
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(seen.len(), 5);
        assert_eq!(seen[0], (1, TraversalEvent::Discovery(2)));
        assert_eq!(seen[4], (5, TraversalEvent::CycleComplete));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_steps_fails_instead_of_skipping_when_busy() {
        let walker = Arc::new(Walker::new(TraversalEngine::new(3).unwrap(), Pacing::default()));
        let pending = {
            let walker = walker.clone();
            tokio::spawn(async move { walker.step().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        let mut emitted = 0;
        let err = run_steps(&walker, 2, |_, _| {
            emitted += 1;
            Ok(())
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("unexpectedly busy"));
        assert_eq!(emitted, 0);
        assert!(pending.await.unwrap().is_some());
    }

    #[test]
    fn test_flags_override_pacing() {
        let args = Args::parse_from([
            "adventurer",
            "--floors",
            "3",
            "--step-delay-ms",
            "5",
            "--cycle-delay-ms",
            "7",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.floor_count, 3);
        assert_eq!(config.pacing.step_delay, Duration::from_millis(5));
        assert_eq!(config.pacing.cycle_delay, Duration::from_millis(7));

        let args = Args::parse_from(["adventurer", "--floors", "3", "--no-delay", "-vv"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(resolve_config(&args).unwrap().pacing, Pacing::none());
    }
}
