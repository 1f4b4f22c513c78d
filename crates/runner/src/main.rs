//! Headless scenario runner.
//!
//! Loads a RON scenario (or the built-in demo), wires the orchestrator to the
//! scripted sandbox and ticks until the mission resolves or the tick budget
//! runs out.
mod config;

use std::fs;

use agent_world::{GameWorld, Scenario, ScriptedWorld};
use anyhow::{Context, Result};
use autopilot::Orchestrator;
use config::RunnerConfig;
use tracing::info;

const DEMO_SCENARIO: &str = include_str!("../scenarios/demo.ron");

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    setup_logging();
    let config = RunnerConfig::from_env();

    let mut world = load_world(&config)?;
    let mut orchestrator = Orchestrator::new(config.agent_config(), world.map().clone());

    let (outcome, ticks) = run_mission(&mut orchestrator, &mut world, &config);
    info!(
        ticks,
        visited = orchestrator.memory().visited_count(),
        "{}",
        outcome.describe()
    );
    Ok(())
}

/// Structured logs on stderr; `RUST_LOG` overrides the INFO default.
fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_world(config: &RunnerConfig) -> Result<ScriptedWorld> {
    let scenario: Scenario = match &config.scenario {
        Some(path) => {
            info!(scenario = %path.display(), "loading scenario");
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading scenario file {}", path.display()))?;
            ron::from_str(&text)
                .with_context(|| format!("parsing scenario {}", path.display()))?
        }
        None => {
            info!("no scenario configured, running the built-in demo");
            ron::from_str(DEMO_SCENARIO).context("parsing the built-in demo scenario")?
        }
    };
    scenario.into_world().context("building the scenario world")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Won,
    Lost,
    Stopped,
    BudgetExhausted,
}

impl Outcome {
    fn describe(self) -> &'static str {
        match self {
            Outcome::Won => "mission won",
            Outcome::Lost => "mission lost",
            Outcome::Stopped => "stopped before the mission resolved",
            Outcome::BudgetExhausted => "tick budget exhausted",
        }
    }
}

/// Ticks the orchestrator against the sandbox until the run resolves.
fn run_mission(
    orchestrator: &mut Orchestrator,
    world: &mut ScriptedWorld,
    config: &RunnerConfig,
) -> (Outcome, u64) {
    let dt = 1.0 / config.tick_hz as f32;
    let mut last_task = String::new();
    let mut ticks = 0;

    orchestrator.start();
    while ticks < config.max_ticks && orchestrator.is_running() {
        orchestrator.tick(world, dt);
        // Requests land between ticks, the same cadence a frame loop
        // gives the agent in-game.
        while let Some(request) = orchestrator.take_request() {
            world.apply(&request);
        }
        ticks += 1;

        let task = orchestrator.current_task();
        if task != last_task {
            info!(tick = ticks, "{task}");
            last_task = task;
        }
    }
    orchestrator.stop();

    let outcome = if world.mission_won() {
        Outcome::Won
    } else if world.mission_lost() {
        Outcome::Lost
    } else if ticks >= config.max_ticks {
        Outcome::BudgetExhausted
    } else {
        Outcome::Stopped
    };
    (outcome, ticks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_demo_builds_a_world() {
        let scenario: Scenario = ron::from_str(DEMO_SCENARIO).unwrap();
        let world = scenario.into_world().unwrap();
        assert_eq!(world.map().home_zone(), agent_world::ZoneId(1));
        assert!(world.map().objective_zone().is_some());
        assert!(world.map().starting_item().is_some());
    }

    #[test]
    fn demo_mission_is_winnable_with_default_settings() {
        let scenario: Scenario = ron::from_str(DEMO_SCENARIO).unwrap();
        let mut world = scenario.into_world().unwrap();
        let config = RunnerConfig::default();
        let mut orchestrator = Orchestrator::new(config.agent_config(), world.map().clone());

        let (outcome, ticks) = run_mission(&mut orchestrator, &mut world, &config);

        assert_eq!(outcome, Outcome::Won);
        assert!(ticks < config.max_ticks);
    }
}
