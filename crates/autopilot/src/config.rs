/// Agent tuning knobs and timing thresholds.
///
/// Times are seconds of simulated time accumulated from tick deltas.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentConfig {
    /// Minimum time between two path steps, matching the simulation's
    /// discrete tile-step cadence.
    pub move_cooldown: f32,
    /// Minimum time between two objective decisions.
    pub think_interval: f32,
    /// How long the position may stand still before the agent declares
    /// itself stuck.
    pub stuck_timeout: f32,
    /// Manhattan radius within which a hostile NPC preempts into combat.
    pub combat_radius: u32,
    /// Exploration attempts before a zone change is forced.
    pub explore_attempt_cap: u32,
    /// Random interior cells sampled per exploration wander attempt.
    pub interior_sample_tries: u32,
    /// Search nodes expanded before a pathfinding query gives up.
    pub max_expansions: usize,
    /// Ring radius searched for a walkable substitute goal.
    pub search_radius: i32,
    /// Seed for the orchestrator's randomized choices.
    pub seed: u64,
}

impl AgentConfig {
    pub const DEFAULT_MOVE_COOLDOWN: f32 = 0.1;
    pub const DEFAULT_THINK_INTERVAL: f32 = 0.2;
    pub const DEFAULT_STUCK_TIMEOUT: f32 = 5.0;
    pub const DEFAULT_COMBAT_RADIUS: u32 = 5;
    pub const DEFAULT_EXPLORE_ATTEMPT_CAP: u32 = 20;
    pub const DEFAULT_INTERIOR_SAMPLE_TRIES: u32 = 20;
    pub const DEFAULT_MAX_EXPANSIONS: usize = 1000;
    pub const DEFAULT_SEARCH_RADIUS: i32 = 10;

    pub fn new() -> Self {
        Self {
            move_cooldown: Self::DEFAULT_MOVE_COOLDOWN,
            think_interval: Self::DEFAULT_THINK_INTERVAL,
            stuck_timeout: Self::DEFAULT_STUCK_TIMEOUT,
            combat_radius: Self::DEFAULT_COMBAT_RADIUS,
            explore_attempt_cap: Self::DEFAULT_EXPLORE_ATTEMPT_CAP,
            interior_sample_tries: Self::DEFAULT_INTERIOR_SAMPLE_TRIES,
            max_expansions: Self::DEFAULT_MAX_EXPANSIONS,
            search_radius: Self::DEFAULT_SEARCH_RADIUS,
            seed: 0,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { seed, ..Self::new() }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new()
    }
}
