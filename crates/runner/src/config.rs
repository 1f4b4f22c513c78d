//! Runner configuration from the process environment.
use std::env;
use std::path::PathBuf;

use autopilot::AgentConfig;

/// Everything one headless autopilot run needs to know.
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// RON scenario path; `None` runs the built-in demo.
    pub scenario: Option<PathBuf>,
    /// Seed for the agent's randomized choices.
    pub seed: u64,
    /// Simulation ticks per second.
    pub tick_hz: u32,
    /// Hard stop after this many ticks.
    pub max_ticks: u64,
    pub think_interval: f32,
    pub stuck_timeout: f32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            scenario: None,
            seed: 0,
            tick_hz: Self::DEFAULT_TICK_HZ,
            max_ticks: Self::DEFAULT_MAX_TICKS,
            think_interval: AgentConfig::DEFAULT_THINK_INTERVAL,
            stuck_timeout: AgentConfig::DEFAULT_STUCK_TIMEOUT,
        }
    }
}

impl RunnerConfig {
    pub const DEFAULT_TICK_HZ: u32 = 10;
    pub const DEFAULT_MAX_TICKS: u64 = 2000;

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `AUTOPILOT_SCENARIO` - RON scenario path (default: built-in demo)
    /// - `AUTOPILOT_SEED` - Agent RNG seed (default: 0)
    /// - `AUTOPILOT_TICK_HZ` - Simulation ticks per second (default: 10)
    /// - `AUTOPILOT_MAX_TICKS` - Tick budget for the run (default: 2000)
    /// - `AUTOPILOT_THINK_INTERVAL` - Seconds between objective decisions (default: 0.2)
    /// - `AUTOPILOT_STUCK_TIMEOUT` - Stand-still seconds before stuck recovery (default: 5)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.scenario = env::var("AUTOPILOT_SCENARIO").ok().map(PathBuf::from);

        if let Some(seed) = read_env::<u64>("AUTOPILOT_SEED") {
            config.seed = seed;
        }
        if let Some(hz) = read_env::<u32>("AUTOPILOT_TICK_HZ") {
            config.tick_hz = hz.max(1);
        }
        if let Some(ticks) = read_env::<u64>("AUTOPILOT_MAX_TICKS") {
            config.max_ticks = ticks.max(1);
        }
        if let Some(interval) = read_env::<f32>("AUTOPILOT_THINK_INTERVAL") {
            config.think_interval = interval.max(0.0);
        }
        if let Some(timeout) = read_env::<f32>("AUTOPILOT_STUCK_TIMEOUT") {
            config.stuck_timeout = timeout.max(0.0);
        }

        config
    }

    /// Agent tuning derived from the runner settings.
    pub fn agent_config(&self) -> AgentConfig {
        let mut agent = AgentConfig::with_seed(self.seed);
        agent.think_interval = self.think_interval;
        agent.stuck_timeout = self.stuck_timeout;
        agent
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
