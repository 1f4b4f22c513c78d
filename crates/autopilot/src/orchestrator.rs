//! The top-level autopilot state machine.
//!
//! One `tick` call drives everything: the executor advances first, then the
//! orchestrator reads its flags and dispatches on its own state. Decisions
//! and combat are rate-limited on a think timer; a stuck timer watches the
//! player position and forces recovery when nothing has moved for too long.
//! The orchestrator never mutates simulation state directly: everything it
//! wants done leaves through the executor's request queue.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use agent_world::{
    ActionRequest, Direction, Disposition, GameWorld, Point, Position, WorldMap, ZoneId,
};

use crate::config::AgentConfig;
use crate::executor::{ActionExecutor, StartOutcome};
use crate::goal::{ExplorationMemory, GoalSelector, NpcTarget, Objective};
use crate::pathfind::NavGrid;

/// The orchestrator's own machine state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BotState {
    /// Not running.
    Idle,
    /// Waiting for the next rate-limited decision.
    Deciding,
    /// An objective is in the executor's hands.
    Executing,
    /// A hostile is close; fight or close in.
    Combat,
    /// No concrete objective; wander to shake something loose.
    Exploring,
    /// Position frozen too long; perturb and rethink.
    Stuck,
}

/// A zone-boundary crossing in progress.
#[derive(Clone, Copy, Debug)]
enum ExitAttempt {
    /// Walking toward the edge cell.
    Walking { zone: ZoneId, direction: Direction },
    /// The boundary step is queued; next tick shows whether it worked.
    Stepping { zone: ZoneId, direction: Direction },
}

/// Ticks the executor and goal selector, owns threat response, decision
/// rate-limiting and deadlock recovery.
pub struct Orchestrator {
    config: AgentConfig,
    map: WorldMap,
    state: BotState,
    executor: ActionExecutor,
    goal: GoalSelector,
    objective: Objective,
    exit_attempt: Option<ExitAttempt>,
    think_timer: f32,
    stuck_timer: f32,
    /// Stuck recovery fires once per stall; rearmed by actual movement.
    stuck_latched: bool,
    last_position: Option<Position>,
    last_zone: Option<ZoneId>,
    explore_attempts: u32,
    rng: StdRng,
}

impl Orchestrator {
    pub fn new(config: AgentConfig, map: WorldMap) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            executor: ActionExecutor::new(&config),
            goal: GoalSelector::new(),
            config,
            map,
            state: BotState::Idle,
            objective: Objective::None,
            exit_attempt: None,
            think_timer: 0.0,
            stuck_timer: 0.0,
            stuck_latched: false,
            last_position: None,
            last_zone: None,
            explore_attempts: 0,
            rng,
        }
    }

    pub fn state(&self) -> BotState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state != BotState::Idle
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn memory(&self) -> &ExplorationMemory {
        self.goal.memory()
    }

    /// Human-readable description of what the agent is doing, for overlays
    /// and logs.
    pub fn current_task(&self) -> String {
        match self.state {
            BotState::Idle => "idle".to_owned(),
            BotState::Deciding => "deciding what to do".to_owned(),
            BotState::Executing => format!("{} ({})", self.objective, self.executor.state()),
            BotState::Combat => "fighting".to_owned(),
            BotState::Exploring => format!("exploring ({})", self.objective),
            BotState::Stuck => "stuck, wiggling free".to_owned(),
        }
    }

    /// Next queued primitive request. The simulation glue drains this after
    /// every tick.
    pub fn take_request(&mut self) -> Option<ActionRequest> {
        self.executor.take_request()
    }

    /// Begins a fresh run: clears all memory, blocklists and timers.
    pub fn start(&mut self) {
        info!("autopilot engaged");
        self.executor.reset();
        self.goal.reset();
        self.objective = Objective::None;
        self.exit_attempt = None;
        self.think_timer = 0.0;
        self.stuck_timer = 0.0;
        self.stuck_latched = false;
        self.last_position = None;
        self.last_zone = None;
        self.explore_attempts = 0;
        self.state = BotState::Deciding;
    }

    /// Halts immediately from any state. Memory survives until `start`.
    pub fn stop(&mut self) {
        if self.state != BotState::Idle {
            info!("autopilot disengaged");
        }
        self.executor.cancel();
        self.exit_attempt = None;
        self.state = BotState::Idle;
    }

    /// One cooperative step. The executor always advances first so its
    /// completion flags are current when the orchestrator reads them.
    pub fn tick(&mut self, world: &mut dyn GameWorld, dt: f32) {
        if self.state == BotState::Idle {
            return;
        }
        self.executor.tick(world, dt);
        self.think_timer += dt;
        self.observe_position(&*world, dt);
        if self.check_stuck() {
            return;
        }

        match self.state {
            BotState::Idle => {}
            BotState::Deciding => self.decide(world),
            BotState::Executing => self.watch_executor(world),
            BotState::Combat => self.fight(world),
            BotState::Exploring => self.explore(world),
            BotState::Stuck => self.perturb(world),
        }
    }

    // ---- timers and position tracking ----

    fn observe_position(&mut self, world: &dyn GameWorld, dt: f32) {
        let position = world.player_position();

        if self.last_zone != Some(position.zone) {
            if let Some(previous) = self.last_zone {
                debug!(from = %previous, to = %position.zone, "zone changed");
                self.goal.on_zone_changed(position.zone);
                self.explore_attempts = 0;
                // Door and x-wing transitions moot any in-flight walk.
                // Deliberate edge steps resolve through their own
                // bookkeeping in watch_executor instead.
                if !matches!(self.exit_attempt, Some(ExitAttempt::Stepping { .. }))
                    && self.executor.is_busy()
                {
                    self.executor.cancel();
                    self.exit_attempt = None;
                    self.state = BotState::Deciding;
                }
            }
            self.last_zone = Some(position.zone);
        }

        if self.last_position == Some(position) {
            self.stuck_timer += dt;
        } else {
            self.last_position = Some(position);
            self.stuck_timer = 0.0;
            self.stuck_latched = false;
        }
    }

    fn check_stuck(&mut self) -> bool {
        if self.stuck_timer > self.config.stuck_timeout
            && !self.stuck_latched
            && self.state != BotState::Stuck
        {
            warn!(task = %self.objective, "no movement for a while, forcing recovery");
            self.stuck_latched = true;
            self.executor.cancel();
            self.exit_attempt = None;
            self.state = BotState::Stuck;
            return true;
        }
        false
    }

    // ---- state handlers ----

    fn decide(&mut self, world: &mut dyn GameWorld) {
        if self.think_timer < self.config.think_interval {
            return;
        }
        self.think_timer = 0.0;
        self.exit_attempt = None;

        if world.mission_won() || world.mission_lost() {
            info!(won = world.mission_won(), "mission over, stopping");
            self.stop();
            return;
        }

        if let Some(enemy) = self.nearest_hostile(&*world) {
            if world.player_point().manhattan_distance(enemy.at) <= self.config.combat_radius {
                debug!(%enemy, "hostile nearby, engaging");
                self.executor.cancel();
                self.state = BotState::Combat;
                return;
            }
        }

        let objective = self.goal.current_objective(&*world, &self.map);
        self.objective = objective;
        self.launch(world, objective);
    }

    fn launch(&mut self, world: &mut dyn GameWorld, objective: Objective) {
        let zone = world.player_zone();
        self.goal.mark_attempted(zone, &objective);

        match objective {
            Objective::None => self.stop(),
            Objective::TalkToNpc(npc) => {
                let outcome = self.executor.talk_to_npc(&*world, npc.at);
                self.executing_or_unreachable(zone, npc.at, outcome);
            }
            Objective::UseItemOnNpc(npc, item) => {
                let outcome = self.executor.use_item_on_npc(&*world, item, npc.at);
                self.executing_or_unreachable(zone, npc.at, outcome);
            }
            Objective::PickupItem(at) => {
                let outcome = self.executor.pickup_item(&*world, at);
                self.executing_or_unreachable(zone, at, outcome);
            }
            Objective::KillEnemy(npc) => {
                // Close hostiles are handled by the combat preemption above;
                // this one is far away, so close the gap as a plain task.
                let outcome = self.executor.move_to_adjacent_of(&*world, npc.at);
                self.executing_or_unreachable(zone, npc.at, outcome);
            }
            Objective::EnterDoor(at, _) => {
                let outcome = self.executor.enter_door(&*world, at);
                self.executing_or_unreachable(zone, at, outcome);
            }
            Objective::PushObject(at, direction) => {
                let outcome = self.executor.push_object(&*world, at, direction);
                self.executing_or_unreachable(zone, at, outcome);
            }
            Objective::ChangeZone(target, Some(direction)) => {
                self.start_zone_change(world, target, direction);
            }
            Objective::ChangeZone(_, None) | Objective::Explore | Objective::FindNpc => {
                // Clear any stale completion flag so the first wander runs.
                self.executor.cancel();
                self.state = BotState::Exploring;
            }
            Objective::UseXWing => {
                self.executor.use_xwing(&*world);
                self.state = BotState::Executing;
            }
        }
    }

    fn executing_or_unreachable(&mut self, zone: ZoneId, target: Point, outcome: StartOutcome) {
        if outcome == StartOutcome::NoPath {
            self.goal
                .mark_unreachable(Position::from_point(zone, target));
        }
        self.state = BotState::Executing;
    }

    fn watch_executor(&mut self, world: &mut dyn GameWorld) {
        // A queued boundary step resolves one tick after it was applied.
        if let Some(ExitAttempt::Stepping { zone, direction }) = self.exit_attempt {
            self.exit_attempt = None;
            if world.player_zone() == zone {
                debug!(%zone, "crossed the zone boundary");
            } else {
                debug!(%direction, "zone exit did not work, marking it blocked");
                self.goal.mark_exit_blocked(world.player_zone(), direction);
            }
            self.executor.cancel();
            self.state = BotState::Deciding;
            return;
        }

        if self.executor.is_completed() {
            if let Some(ExitAttempt::Walking { zone, direction }) = self.exit_attempt {
                // At the edge; take the one step the pathfinder cannot plan.
                let to = world.player_point().step(direction);
                self.executor.push_request(ActionRequest::step(to, direction));
                self.executor.cancel();
                self.exit_attempt = Some(ExitAttempt::Stepping { zone, direction });
                return;
            }
            self.executor.cancel();
            self.state = BotState::Deciding;
            return;
        }

        // Idle without ever reporting Completed counts as abandonment.
        if !self.executor.is_busy() {
            self.exit_attempt = None;
            self.state = BotState::Deciding;
        }
    }

    fn fight(&mut self, world: &mut dyn GameWorld) {
        if self.think_timer < self.config.think_interval {
            return;
        }
        self.think_timer = 0.0;

        let Some(enemy) = self.nearest_hostile(&*world) else {
            debug!("no hostiles left, back to planning");
            self.executor.cancel();
            self.state = BotState::Deciding;
            return;
        };
        let player = world.player_point();
        let distance = player.manhattan_distance(enemy.at);
        if distance <= 1 {
            let direction = Direction::between(player, enemy.at).unwrap_or(Direction::North);
            debug!(%enemy, "attacking");
            self.executor.attack(enemy.at, direction);
        } else if distance <= self.config.combat_radius {
            // Re-issued every combat beat so a moving enemy stays tracked.
            let outcome = self.executor.move_to_adjacent_of(&*world, enemy.at);
            if outcome == StartOutcome::NoPath {
                self.goal
                    .mark_unreachable(Position::from_point(world.player_zone(), enemy.at));
                self.executor.cancel();
                self.state = BotState::Deciding;
            }
        } else {
            debug!(%enemy, "hostile out of range, disengaging");
            self.executor.cancel();
            self.state = BotState::Deciding;
        }
    }

    fn explore(&mut self, world: &mut dyn GameWorld) {
        if self.executor.is_busy() {
            return;
        }
        if self.executor.is_completed() {
            // One wander done; re-run the whole decision ladder.
            self.executor.cancel();
            self.state = BotState::Deciding;
            return;
        }

        self.explore_attempts += 1;
        if self.explore_attempts > self.config.explore_attempt_cap {
            info!(
                attempts = self.explore_attempts,
                "exploration cap hit, forcing a zone change"
            );
            self.explore_attempts = 0;
            self.force_zone_change(world);
            return;
        }
        self.start_wander(world);
    }

    fn perturb(&mut self, world: &mut dyn GameWorld) {
        // Half the usual cadence; recovery should not thrash.
        if self.think_timer < self.config.think_interval * 2.0 {
            return;
        }
        self.think_timer = 0.0;

        let direction = Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())];
        let to = world.player_point().step(direction);
        info!(%direction, "nudging a random step to get unstuck");
        self.executor.push_request(ActionRequest::step(to, direction));
        self.state = BotState::Deciding;
    }

    // ---- wandering ----

    fn start_wander(&mut self, world: &mut dyn GameWorld) {
        let zone = world.player_zone();
        let player = world.player_point();

        // An NPC nobody has talked to is the most promising lead.
        let untalked = world
            .npcs(zone)
            .iter()
            .filter(|npc| npc.is_alive() && npc.is_enabled())
            .filter(|npc| self.goal.classify(npc) == Disposition::Friendly)
            .filter(|npc| {
                !self
                    .goal
                    .memory()
                    .has_talked_to(Position::from_point(zone, npc.point()))
            })
            .min_by_key(|npc| player.manhattan_distance(npc.point()))
            .map(|npc| npc.point());
        if let Some(at) = untalked {
            debug!(%at, "wandering toward an untalked npc");
            self.goal.mark_talked_to(Position::from_point(zone, at));
            self.executor.talk_to_npc(&*world, at);
            return;
        }

        let unentered = world
            .objects(zone)
            .iter()
            .filter(|object| object.is_passage())
            .filter(|object| {
                !self
                    .goal
                    .memory()
                    .has_entered_door(Position::from_point(zone, object.point()))
            })
            .min_by_key(|object| player.manhattan_distance(object.point()))
            .map(|object| object.point());
        if let Some(at) = unentered {
            debug!(%at, "wandering through an unentered door");
            self.goal.mark_door_entered(Position::from_point(zone, at));
            self.executor.enter_door(&*world, at);
            return;
        }

        let unexplored: Vec<(ZoneId, Direction)> = Direction::ALL
            .iter()
            .filter_map(|&direction| {
                self.map
                    .neighbor(zone, direction)
                    .map(|next| (next, direction))
            })
            .filter(|(next, direction)| {
                !self.goal.memory().is_visited(*next)
                    && !self.goal.memory().is_exit_blocked(zone, *direction)
            })
            .collect();
        if let Some(&(target, direction)) = unexplored.choose(&mut self.rng) {
            self.start_zone_change(world, target, direction);
            return;
        }

        if let Some(cell) = self.random_walkable_cell(&*world) {
            debug!(%cell, "wandering to a random cell");
            self.executor.move_to(&*world, cell);
            return;
        }

        self.force_zone_change(world);
    }

    fn random_walkable_cell(&mut self, world: &dyn GameWorld) -> Option<Point> {
        let grid = NavGrid::current(world);
        let dims = grid.dimensions();
        if dims.width < 3 || dims.height < 3 {
            return None;
        }
        for _ in 0..self.config.interior_sample_tries {
            let cell = Point::new(
                self.rng.gen_range(1..dims.width as i32 - 1),
                self.rng.gen_range(1..dims.height as i32 - 1),
            );
            if cell != world.player_point()
                && self.executor.pathfinder().is_walkable(&grid, cell, &[])
            {
                return Some(cell);
            }
        }
        None
    }

    fn force_zone_change(&mut self, world: &mut dyn GameWorld) {
        let zone = world.player_zone();
        let mut candidates: Vec<(ZoneId, Direction)> = Direction::ALL
            .iter()
            .filter_map(|&direction| {
                self.map
                    .neighbor(zone, direction)
                    .map(|next| (next, direction))
            })
            .filter(|(_, direction)| !self.goal.memory().is_exit_blocked(zone, *direction))
            .collect();
        if candidates.is_empty() {
            // Even a blocked exit beats standing still.
            candidates = Direction::ALL
                .iter()
                .filter_map(|&direction| {
                    self.map
                        .neighbor(zone, direction)
                        .map(|next| (next, direction))
                })
                .collect();
        }
        match candidates.choose(&mut self.rng) {
            Some(&(target, direction)) => self.start_zone_change(world, target, direction),
            None => {
                debug!("no exits from this zone at all, flying out");
                self.executor.use_xwing(&*world);
                self.state = BotState::Executing;
            }
        }
    }

    // ---- zone boundary crossing ----

    /// Walks to the zone edge in `direction`; the final off-grid step is
    /// queued by `watch_executor` once the walk completes.
    fn start_zone_change(
        &mut self,
        world: &mut dyn GameWorld,
        target: ZoneId,
        direction: Direction,
    ) {
        let dims = world.zone_dimensions(world.player_zone());
        let at = world.player_point();
        let edge = match direction {
            Direction::North => Point::new(at.x, 0),
            Direction::South => Point::new(at.x, dims.height as i32 - 1),
            Direction::East => Point::new(dims.width as i32 - 1, at.y),
            Direction::West => Point::new(0, at.y),
        };
        debug!(to = %target, %direction, "heading for the zone edge");
        match self.executor.move_to(&*world, edge) {
            StartOutcome::NoPath => {
                self.goal.mark_exit_blocked(world.player_zone(), direction);
                self.executor.cancel();
                self.exit_attempt = None;
                self.state = BotState::Deciding;
            }
            _ => {
                self.exit_attempt = Some(ExitAttempt::Walking {
                    zone: target,
                    direction,
                });
                self.state = BotState::Executing;
            }
        }
    }

    fn nearest_hostile(&self, world: &dyn GameWorld) -> Option<NpcTarget> {
        let zone = world.player_zone();
        let player = world.player_point();
        world
            .npcs(zone)
            .iter()
            .filter(|npc| npc.is_alive() && npc.is_enabled())
            .filter(|npc| self.goal.classify(npc) == Disposition::Hostile)
            .filter(|npc| {
                !self
                    .goal
                    .memory()
                    .is_unreachable(Position::from_point(zone, npc.point()))
            })
            .min_by_key(|npc| player.manhattan_distance(npc.point()))
            .map(|npc| NpcTarget::new(npc.id, npc.point()))
    }
}
