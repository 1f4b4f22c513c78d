//! Turns one high-level intent into a stream of primitive action requests.
//!
//! The executor runs one task at a time. A `start` operation resolves a route
//! up front and reports whether there is anything to do; `tick` then walks the
//! route one rate-limited step per call, queueing `Move` requests for the
//! simulation and watching the observed position to confirm each step landed.
//! The simulation applies queued requests between ticks, so a step issued on
//! one tick is confirmed (or found rejected) on the next eligible one.
//!
//! Pathfinding failure is never an error here. A task that cannot route, or
//! whose route stops working and cannot be replanned, finishes as `Completed`
//! so the caller always gets its turn back.
use std::collections::VecDeque;

use tracing::debug;

use agent_world::{ActionRequest, Direction, GameWorld, ItemId, Point, Position};

use crate::config::AgentConfig;
use crate::pathfind::{NavGrid, Pathfinder};

/// Observable executor state.
///
/// Set by each `start` operation, driven forward by `tick`, cleared back to
/// `Idle` by `cancel` once the owner has seen a terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ActionState {
    Idle,
    Moving,
    MovingToNpc,
    MovingToItem,
    MovingToDoor,
    MovingToPush,
    Interacting,
    Pushing,
    Completed,
}

impl ActionState {
    pub fn is_moving(self) -> bool {
        matches!(
            self,
            ActionState::Moving
                | ActionState::MovingToNpc
                | ActionState::MovingToItem
                | ActionState::MovingToDoor
                | ActionState::MovingToPush
        )
    }

    /// A task is in flight; `tick` still has work to do.
    pub fn is_busy(self) -> bool {
        !matches!(self, ActionState::Idle | ActionState::Completed)
    }
}

/// What a `start` operation found out about the requested task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// The goal condition already holds; the task completed on the spot.
    Satisfied,
    /// A route exists and the executor is now busy walking it.
    Started,
    /// No route to the target; the task was given up immediately.
    NoPath,
}

/// What happens when the route runs out.
enum TaskKind {
    MoveTo,
    MoveAdjacent,
    ApproachNpc { item: Option<ItemId> },
    Pickup,
    EnterDoor,
    Push { direction: Direction },
}

struct InFlight {
    path: Vec<Position>,
    index: usize,
    /// The cell the task is about; for adjacency tasks this is not the cell
    /// walked to.
    target: Point,
    kind: TaskKind,
    /// One replan is allowed per failure episode; a rejection with this set
    /// gives the task up.
    replanned: bool,
}

impl InFlight {
    fn new(path: Vec<Position>, target: Point, kind: TaskKind) -> Self {
        Self {
            path,
            index: 0,
            target,
            kind,
            replanned: false,
        }
    }

    fn exhausted(&self) -> bool {
        self.index >= self.path.len()
    }
}

pub struct ActionExecutor {
    state: ActionState,
    in_flight: Option<InFlight>,
    /// Waypoint of the last queued `Move`, awaiting confirmation against the
    /// observed position.
    pending_step: Option<Point>,
    move_timer: f32,
    move_cooldown: f32,
    pathfinder: Pathfinder,
    outbox: VecDeque<ActionRequest>,
}

impl ActionExecutor {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            state: ActionState::Idle,
            in_flight: None,
            pending_step: None,
            move_timer: 0.0,
            move_cooldown: config.move_cooldown,
            pathfinder: Pathfinder::with_limits(config.max_expansions, config.search_radius),
            outbox: VecDeque::new(),
        }
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    pub fn is_completed(&self) -> bool {
        self.state == ActionState::Completed
    }

    pub fn pathfinder(&self) -> &Pathfinder {
        &self.pathfinder
    }

    pub fn pathfinder_mut(&mut self) -> &mut Pathfinder {
        &mut self.pathfinder
    }

    /// Next queued primitive request, oldest first.
    pub fn take_request(&mut self) -> Option<ActionRequest> {
        self.outbox.pop_front()
    }

    /// Queues a request on the shared outbound channel without touching the
    /// executor's own task state.
    pub(crate) fn push_request(&mut self, request: ActionRequest) {
        self.outbox.push_back(request);
    }

    // ---- task starts ----

    /// Walks onto `target`.
    pub fn move_to(&mut self, world: &dyn GameWorld, target: Point) -> StartOutcome {
        if world.player_point() == target {
            return self.satisfied();
        }
        let grid = NavGrid::current(world);
        match self
            .pathfinder
            .find_path(&grid, world.player_point(), target, &[])
        {
            Some(path) => self.begin(
                ActionState::Moving,
                InFlight::new(path, target, TaskKind::MoveTo),
            ),
            None => self.give_up("move", target),
        }
    }

    /// Walks onto any cell next to `target`.
    pub fn move_to_adjacent_of(&mut self, world: &dyn GameWorld, target: Point) -> StartOutcome {
        if world.player_point().is_adjacent(target) {
            return self.satisfied();
        }
        let grid = NavGrid::current(world);
        match self
            .pathfinder
            .find_path_to_adjacent(&grid, world.player_point(), target, &[])
        {
            Some((path, _)) => self.begin(
                ActionState::Moving,
                InFlight::new(path, target, TaskKind::MoveAdjacent),
            ),
            None => self.give_up("approach", target),
        }
    }

    /// Walks next to the NPC standing at `npc_at` and opens a conversation.
    pub fn talk_to_npc(&mut self, world: &dyn GameWorld, npc_at: Point) -> StartOutcome {
        self.approach_npc(world, npc_at, None)
    }

    /// Walks next to the NPC standing at `npc_at` and applies `item` to it.
    pub fn use_item_on_npc(
        &mut self,
        world: &dyn GameWorld,
        item: ItemId,
        npc_at: Point,
    ) -> StartOutcome {
        self.approach_npc(world, npc_at, Some(item))
    }

    fn approach_npc(
        &mut self,
        world: &dyn GameWorld,
        npc_at: Point,
        item: Option<ItemId>,
    ) -> StartOutcome {
        let grid = NavGrid::current(world);
        match self
            .pathfinder
            .find_path_to_adjacent(&grid, world.player_point(), npc_at, &[])
        {
            Some((path, _)) => self.begin(
                ActionState::MovingToNpc,
                InFlight::new(path, npc_at, TaskKind::ApproachNpc { item }),
            ),
            None => self.give_up("reach npc", npc_at),
        }
    }

    /// Walks onto the collectible at `at`; the simulation picks it up on
    /// arrival.
    pub fn pickup_item(&mut self, world: &dyn GameWorld, at: Point) -> StartOutcome {
        if world.player_point() == at {
            return self.satisfied();
        }
        let grid = NavGrid::current(world);
        match self.pathfinder.find_path(&grid, world.player_point(), at, &[]) {
            Some(path) => self.begin(
                ActionState::MovingToItem,
                InFlight::new(path, at, TaskKind::Pickup),
            ),
            None => self.give_up("pickup", at),
        }
    }

    /// Walks onto the door cell at `at`; the simulation transitions on
    /// arrival.
    pub fn enter_door(&mut self, world: &dyn GameWorld, at: Point) -> StartOutcome {
        if world.player_point() == at {
            return self.satisfied();
        }
        let grid = NavGrid::current(world);
        match self.pathfinder.find_path(&grid, world.player_point(), at, &[]) {
            Some(path) => self.begin(
                ActionState::MovingToDoor,
                InFlight::new(path, at, TaskKind::EnterDoor),
            ),
            None => self.give_up("enter door", at),
        }
    }

    /// Walks to the cell behind the pushable at `at` and shoves it one cell
    /// toward `direction`.
    pub fn push_object(
        &mut self,
        world: &dyn GameWorld,
        at: Point,
        direction: Direction,
    ) -> StartOutcome {
        let stand = at.step(direction.opposite());
        let grid = NavGrid::current(world);
        match self
            .pathfinder
            .find_path(&grid, world.player_point(), stand, &[])
        {
            Some(path) => self.begin(
                ActionState::MovingToPush,
                InFlight::new(path, at, TaskKind::Push { direction }),
            ),
            None => self.give_up("push", at),
        }
    }

    /// Queues one melee swing at `at`; completes immediately.
    pub fn attack(&mut self, at: Point, direction: Direction) {
        self.outbox.push_back(ActionRequest::attack(at, direction));
        self.finish_single_shot();
    }

    /// Selects `item` and queues a `UseItem` on the player's own cell;
    /// completes immediately.
    pub fn use_item(&mut self, world: &mut dyn GameWorld, item: ItemId) {
        world.select_item(Some(item));
        self.outbox
            .push_back(ActionRequest::use_item(world.player_point(), None));
        self.finish_single_shot();
    }

    /// Queues boarding the X-Wing; completes immediately.
    pub fn use_xwing(&mut self, world: &dyn GameWorld) {
        self.outbox
            .push_back(ActionRequest::use_xwing(world.player_point()));
        self.finish_single_shot();
    }

    /// Drops the current task and any unconfirmed step. Queued requests are
    /// already sent and stay queued.
    pub fn cancel(&mut self) {
        self.in_flight = None;
        self.pending_step = None;
        self.state = ActionState::Idle;
    }

    /// Full new-run reset: task, timers, blocklists and the outbound queue.
    pub fn reset(&mut self) {
        self.cancel();
        self.move_timer = 0.0;
        self.pathfinder.reset();
        self.outbox.clear();
    }

    // ---- ticking ----

    /// Advances the in-flight task by at most one step. Steps are gated on
    /// the move cooldown so the agent walks at the simulation's tile cadence.
    pub fn tick(&mut self, world: &mut dyn GameWorld, dt: f32) {
        self.pathfinder.sync_zone(world.player_zone());
        if !self.state.is_busy() {
            return;
        }
        self.move_timer += dt;
        if self.move_timer < self.move_cooldown {
            return;
        }
        self.move_timer = 0.0;

        match self.state {
            ActionState::Interacting | ActionState::Pushing => {
                self.state = ActionState::Completed;
            }
            _ => self.advance_movement(world),
        }
    }

    fn advance_movement(&mut self, world: &mut dyn GameWorld) {
        let Some(mut flight) = self.in_flight.take() else {
            self.state = ActionState::Completed;
            return;
        };

        // A transition while walking (a door underfoot, a scripted warp)
        // moots the rest of the route.
        if flight.path.get(flight.index).is_some_and(|p| p.zone != world.player_zone()) {
            debug!(to = %flight.target, "zone changed mid-route, task over");
            self.pending_step = None;
            self.state = ActionState::Completed;
            return;
        }
        let current = world.player_point();

        // Confirm the previously queued step against the observed position.
        if let Some(expected) = self.pending_step.take() {
            if current == expected {
                flight.index += 1;
                flight.replanned = false;
            } else {
                debug!(expected = %expected, at = %current, "step rejected, replanning");
                self.pathfinder
                    .block_temporarily(Position::from_point(world.player_zone(), expected));
                if flight.replanned || !self.replan(&*world, &mut flight) {
                    debug!(to = %flight.target, "no route after rejection, giving up");
                    self.state = ActionState::Completed;
                    return;
                }
                flight.replanned = true;
            }
        }

        // Waypoints the simulation already put us on need no request.
        while !flight.exhausted() && flight.path[flight.index].point() == current {
            flight.index += 1;
        }

        if flight.exhausted() {
            self.finish_movement(world, flight);
            return;
        }

        let next = flight.path[flight.index].point();
        if let Some(direction) = Direction::between(current, next) {
            self.outbox.push_back(ActionRequest::step(next, direction));
            self.pending_step = Some(next);
        }
        self.in_flight = Some(flight);
    }

    fn replan(&self, world: &dyn GameWorld, flight: &mut InFlight) -> bool {
        let grid = NavGrid::current(world);
        let start = world.player_point();
        let path = match flight.kind {
            TaskKind::MoveTo | TaskKind::Pickup | TaskKind::EnterDoor => {
                self.pathfinder.find_path(&grid, start, flight.target, &[])
            }
            TaskKind::Push { direction } => self.pathfinder.find_path(
                &grid,
                start,
                flight.target.step(direction.opposite()),
                &[],
            ),
            TaskKind::MoveAdjacent | TaskKind::ApproachNpc { .. } => self
                .pathfinder
                .find_path_to_adjacent(&grid, start, flight.target, &[])
                .map(|(path, _)| path),
        };
        match path {
            Some(path) => {
                debug!(to = %flight.target, len = path.len(), "replanned route");
                flight.path = path;
                flight.index = 0;
                true
            }
            None => false,
        }
    }

    fn finish_movement(&mut self, world: &mut dyn GameWorld, flight: InFlight) {
        match flight.kind {
            TaskKind::MoveTo | TaskKind::MoveAdjacent | TaskKind::Pickup | TaskKind::EnterDoor => {
                self.state = ActionState::Completed;
            }
            TaskKind::ApproachNpc { item } => {
                let facing = Direction::between(world.player_point(), flight.target)
                    .unwrap_or(Direction::North);
                match item {
                    Some(item) => {
                        world.select_item(Some(item));
                        self.outbox
                            .push_back(ActionRequest::use_item(flight.target, Some(facing)));
                    }
                    None => {
                        self.outbox
                            .push_back(ActionRequest::talk(flight.target, facing));
                    }
                }
                self.state = ActionState::Interacting;
            }
            TaskKind::Push { direction } => {
                self.outbox
                    .push_back(ActionRequest::step(flight.target, direction));
                self.state = ActionState::Pushing;
            }
        }
    }

    // ---- helpers ----

    fn satisfied(&mut self) -> StartOutcome {
        self.in_flight = None;
        self.pending_step = None;
        self.state = ActionState::Completed;
        StartOutcome::Satisfied
    }

    fn begin(&mut self, state: ActionState, flight: InFlight) -> StartOutcome {
        debug!(to = %flight.target, len = flight.path.len(), state = %state, "task started");
        self.in_flight = Some(flight);
        self.pending_step = None;
        self.move_timer = 0.0;
        self.state = state;
        StartOutcome::Started
    }

    fn give_up(&mut self, what: &str, target: Point) -> StartOutcome {
        debug!(task = what, to = %target, "no route, giving up");
        self.in_flight = None;
        self.pending_step = None;
        self.state = ActionState::Completed;
        StartOutcome::NoPath
    }

    fn finish_single_shot(&mut self) {
        self.in_flight = None;
        self.pending_step = None;
        self.state = ActionState::Completed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_world::{
        ActionKind, NpcId, ScriptedWorld, TileLayer, WALL_TILE, WorldMap, ZoneBuilder, ZoneId,
        friendly_npc,
    };

    const ZONE: ZoneId = ZoneId(1);
    const DT: f32 = 0.1;

    fn executor() -> ActionExecutor {
        ActionExecutor::new(&AgentConfig::new())
    }

    fn open_world(width: u32, height: u32, player: Point) -> ScriptedWorld {
        let mut world = ScriptedWorld::new(WorldMap::single_zone(ZONE));
        world.add_zone(ZONE, ZoneBuilder::new(width, height));
        world.place_player(ZONE, player);
        world
    }

    /// One simulation frame: tick the executor, then let the world apply
    /// everything it queued, recording the requests for assertions.
    fn drive(
        executor: &mut ActionExecutor,
        world: &mut ScriptedWorld,
        log: &mut Vec<ActionRequest>,
    ) {
        executor.tick(world, DT);
        while let Some(request) = executor.take_request() {
            world.apply(&request);
            log.push(request);
        }
    }

    #[test]
    fn move_to_walks_the_route_and_completes() {
        let mut world = open_world(5, 5, Point::new(0, 0));
        let mut executor = executor();
        let mut log = Vec::new();

        assert_eq!(
            executor.move_to(&world, Point::new(2, 0)),
            StartOutcome::Started
        );
        for _ in 0..3 {
            drive(&mut executor, &mut world, &mut log);
        }

        assert_eq!(executor.state(), ActionState::Completed);
        assert_eq!(world.player_point(), Point::new(2, 0));
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|r| r.kind == ActionKind::Move));
    }

    #[test]
    fn move_to_current_cell_is_already_satisfied() {
        let world = open_world(5, 5, Point::new(2, 2));
        let mut executor = executor();
        assert_eq!(
            executor.move_to(&world, Point::new(2, 2)),
            StartOutcome::Satisfied
        );
        assert_eq!(executor.state(), ActionState::Completed);
        assert!(executor.take_request().is_none());
    }

    #[test]
    fn unroutable_target_gives_up_without_blocking() {
        let mut world = ScriptedWorld::new(WorldMap::single_zone(ZONE));
        world.add_zone(
            ZONE,
            ZoneBuilder::new(5, 5)
                .wall(1, 2)
                .wall(3, 2)
                .wall(2, 1)
                .wall(2, 3),
        );
        world.place_player(ZONE, Point::new(0, 0));
        let mut executor = executor();
        assert_eq!(
            executor.move_to(&world, Point::new(2, 2)),
            StartOutcome::NoPath
        );
        assert_eq!(executor.state(), ActionState::Completed);
    }

    #[test]
    fn talking_walks_adjacent_then_interacts() {
        let mut world = ScriptedWorld::new(WorldMap::single_zone(ZONE));
        world.add_zone(
            ZONE,
            ZoneBuilder::new(5, 5).npc(friendly_npc(NpcId(9), 2, 0)),
        );
        world.place_player(ZONE, Point::new(2, 2));
        let mut executor = executor();
        let mut log = Vec::new();

        assert_eq!(
            executor.talk_to_npc(&world, Point::new(2, 0)),
            StartOutcome::Started
        );
        drive(&mut executor, &mut world, &mut log); // step onto (2, 1)
        assert_eq!(world.player_point(), Point::new(2, 1));
        drive(&mut executor, &mut world, &mut log); // route done, talk
        assert_eq!(executor.state(), ActionState::Interacting);
        drive(&mut executor, &mut world, &mut log);
        assert_eq!(executor.state(), ActionState::Completed);

        let kinds: Vec<ActionKind> = log.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ActionKind::Move, ActionKind::Talk]);
        let talk = log[1];
        assert_eq!(talk.target(), Point::new(2, 0));
        assert_eq!(talk.direction, Some(Direction::North));
    }

    #[test]
    fn already_adjacent_npc_still_gets_talked_to() {
        let mut world = ScriptedWorld::new(WorldMap::single_zone(ZONE));
        world.add_zone(
            ZONE,
            ZoneBuilder::new(5, 5).npc(friendly_npc(NpcId(9), 2, 0)),
        );
        world.place_player(ZONE, Point::new(2, 1));
        let mut executor = executor();
        let mut log = Vec::new();

        assert_eq!(
            executor.talk_to_npc(&world, Point::new(2, 0)),
            StartOutcome::Started
        );
        drive(&mut executor, &mut world, &mut log);
        assert_eq!(executor.state(), ActionState::Interacting);
        assert_eq!(log[0].kind, ActionKind::Talk);
    }

    #[test]
    fn rejected_step_replans_around_the_obstruction() {
        let mut world = open_world(3, 3, Point::new(0, 0));
        let mut executor = executor();
        let mut log = Vec::new();

        assert_eq!(
            executor.move_to(&world, Point::new(2, 0)),
            StartOutcome::Started
        );
        // The straight route is walled off after planning.
        world.set_tile(ZONE, TileLayer::Middle, Point::new(1, 0), Some(WALL_TILE));

        for _ in 0..8 {
            drive(&mut executor, &mut world, &mut log);
        }
        assert_eq!(executor.state(), ActionState::Completed);
        assert_eq!(world.player_point(), Point::new(2, 0));
        // First request bounced off the new wall.
        assert_eq!(log[0].target(), Point::new(1, 0));
        assert!(log[1..].iter().all(|r| r.target() != Point::new(1, 0)));
    }

    #[test]
    fn second_rejection_after_replanning_gives_up() {
        let mut world = open_world(3, 3, Point::new(0, 0));
        let mut executor = executor();

        executor.move_to(&world, Point::new(2, 0));
        world.set_tile(ZONE, TileLayer::Middle, Point::new(1, 0), Some(WALL_TILE));

        // First step bounces off the new wall.
        executor.tick(&mut world, DT);
        while let Some(request) = executor.take_request() {
            world.apply(&request);
        }
        // The replanned detour is walled off before its first step lands.
        executor.tick(&mut world, DT);
        world.set_tile(ZONE, TileLayer::Middle, Point::new(0, 1), Some(WALL_TILE));
        while let Some(request) = executor.take_request() {
            world.apply(&request);
        }
        executor.tick(&mut world, DT);

        assert_eq!(executor.state(), ActionState::Completed);
        assert_eq!(world.player_point(), Point::new(0, 0));
    }

    #[test]
    fn pushing_walks_behind_the_object_and_shoves() {
        let mut world = ScriptedWorld::new(WorldMap::single_zone(ZONE));
        world.add_zone(ZONE, ZoneBuilder::new(5, 5).pushable(2, 2));
        world.place_player(ZONE, Point::new(0, 2));
        let mut executor = executor();
        let mut log = Vec::new();

        assert_eq!(
            executor.push_object(&world, Point::new(2, 2), Direction::East),
            StartOutcome::Started
        );
        drive(&mut executor, &mut world, &mut log); // step to (1, 2)
        drive(&mut executor, &mut world, &mut log); // arrive, shove
        assert_eq!(executor.state(), ActionState::Pushing);
        drive(&mut executor, &mut world, &mut log);
        assert_eq!(executor.state(), ActionState::Completed);

        let shove = log.last().unwrap();
        assert_eq!(shove.kind, ActionKind::Move);
        assert_eq!(shove.target(), Point::new(2, 2));
        assert_eq!(shove.direction, Some(Direction::East));
    }

    #[test]
    fn use_item_selects_before_queueing() {
        let mut world = open_world(3, 3, Point::new(1, 1));
        world.give_item(ItemId(7));
        let mut executor = executor();

        executor.use_item(&mut world, ItemId(7));
        assert_eq!(world.selected_item(), Some(ItemId(7)));
        assert_eq!(executor.state(), ActionState::Completed);
        let request = executor.take_request().unwrap();
        assert_eq!(request.kind, ActionKind::UseItem);
    }

    #[test]
    fn cancel_clears_the_task_and_goes_idle() {
        let mut world = open_world(5, 5, Point::new(0, 0));
        let mut executor = executor();
        let mut log = Vec::new();

        executor.move_to(&world, Point::new(4, 4));
        drive(&mut executor, &mut world, &mut log);
        executor.cancel();
        assert_eq!(executor.state(), ActionState::Idle);

        let queued = log.len();
        drive(&mut executor, &mut world, &mut log);
        drive(&mut executor, &mut world, &mut log);
        assert_eq!(log.len(), queued);
    }
}
