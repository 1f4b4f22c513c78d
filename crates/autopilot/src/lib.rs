//! The autonomous player.
//!
//! Four cooperating pieces, leaf-first: a grid [`Pathfinder`] with
//! blocklists, an [`ActionExecutor`] that turns one intent into per-tick
//! primitive requests, a [`GoalSelector`] that derives the next objective
//! from mission phase and zone contents, and an [`Orchestrator`] state
//! machine that ties them together with threat response, decision rate
//! limiting and deadlock recovery. Everything runs synchronously inside the
//! host simulation's tick; the only outward effect is the primitive-action
//! queue drained by the host.
pub mod config;
pub mod executor;
pub mod goal;
pub mod orchestrator;
pub mod pathfind;

pub use config::AgentConfig;
pub use executor::{ActionExecutor, ActionState, StartOutcome};
pub use goal::{ExplorationMemory, GoalSelector, MissionPhase, NpcTarget, Objective};
pub use orchestrator::{BotState, Orchestrator};
pub use pathfind::{NavGrid, Pathfinder};
