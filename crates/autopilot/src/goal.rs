//! Mission phases, exploration memory and objective selection.
//!
//! The selector is a pure policy over the observed world plus its own memory
//! of what has been attempted this run. Every decision goes through the same
//! two steps: derive the mission phase from a handful of global facts, then,
//! inside the solve-a-zone phase, walk a strict priority ladder over the
//! zone's contents. Attempt memory is committed when an objective is handed
//! out, not when it succeeds, so a candidate that keeps failing cannot pin
//! the agent forever.
use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use agent_world::{
    Direction, Disposition, GameWorld, ItemId, NpcId, NpcState, Point, Position, TileFlags,
    TileLayer, WorldMap, ZoneId,
};

/// Where the agent stands in the overall mission arc. Derived fresh from
/// world state on every decision; never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum MissionPhase {
    /// The designated starting item is missing; get it from the mission
    /// giver at home.
    TalkToHomeNpc,
    /// Kitted out and still at home; fly to the mission area.
    TravelToObjective,
    /// Work the current zone.
    SolveZone,
    /// The mission goal is done; fly home.
    ReturnHome,
    /// Goal done and back home. Nothing left to do.
    Completed,
}

/// An NPC pinned at the cell it was observed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NpcTarget {
    pub id: NpcId,
    pub at: Point,
}

impl NpcTarget {
    pub const fn new(id: NpcId, at: Point) -> Self {
        Self { id, at }
    }
}

impl fmt::Display for NpcTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.id, self.at)
    }
}

/// One concrete thing the agent intends to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Objective {
    /// Nothing to do (mission finished).
    None,
    TalkToNpc(NpcTarget),
    UseItemOnNpc(NpcTarget, ItemId),
    PickupItem(Point),
    KillEnemy(NpcTarget),
    ChangeZone(ZoneId, Option<Direction>),
    UseXWing,
    EnterDoor(Point, Option<ZoneId>),
    PushObject(Point, Direction),
    /// Wander intent without a concrete target; resolved by the orchestrator.
    Explore,
    /// Look around for any NPC at all.
    FindNpc,
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::None => write!(f, "idle"),
            Objective::TalkToNpc(npc) => write!(f, "talk to {npc}"),
            Objective::UseItemOnNpc(npc, item) => write!(f, "use {item} on {npc}"),
            Objective::PickupItem(at) => write!(f, "pick up item at {at}"),
            Objective::KillEnemy(npc) => write!(f, "kill {npc}"),
            Objective::ChangeZone(zone, Some(direction)) => {
                write!(f, "change zone to {zone} ({direction})")
            }
            Objective::ChangeZone(zone, None) => write!(f, "change zone to {zone}"),
            Objective::UseXWing => write!(f, "board the x-wing"),
            Objective::EnterDoor(at, Some(dest)) => write!(f, "enter door at {at} to {dest}"),
            Objective::EnterDoor(at, None) => write!(f, "enter door at {at}"),
            Objective::PushObject(at, direction) => write!(f, "push object at {at} {direction}"),
            Objective::Explore => write!(f, "explore"),
            Objective::FindNpc => write!(f, "find an npc"),
        }
    }
}

/// Everything the agent remembers about a run; only `reset` forgets.
///
/// Entries accumulate monotonically with one exception: unreachable marks
/// for a zone are dropped when that zone is entered again, so a cell that
/// was cut off once gets another chance after the world shifts.
#[derive(Debug, Default)]
pub struct ExplorationMemory {
    visited: HashSet<ZoneId>,
    talked_to: HashSet<Position>,
    tried_items: HashSet<(Position, ItemId)>,
    collected: HashSet<Position>,
    entered_doors: HashSet<Position>,
    blocked_exits: HashSet<(ZoneId, Direction)>,
    unreachable: HashSet<Position>,
}

impl ExplorationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_visited(&mut self, zone: ZoneId) {
        if self.visited.insert(zone) {
            debug!(%zone, "zone visited");
        }
    }

    pub fn is_visited(&self, zone: ZoneId) -> bool {
        self.visited.contains(&zone)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn mark_talked_to(&mut self, npc: Position) {
        self.talked_to.insert(npc);
    }

    pub fn has_talked_to(&self, npc: Position) -> bool {
        self.talked_to.contains(&npc)
    }

    pub fn mark_item_tried(&mut self, npc: Position, item: ItemId) {
        self.tried_items.insert((npc, item));
    }

    pub fn has_tried_item(&self, npc: Position, item: ItemId) -> bool {
        self.tried_items.contains(&(npc, item))
    }

    pub fn mark_collected(&mut self, at: Position) {
        self.collected.insert(at);
    }

    pub fn is_collected(&self, at: Position) -> bool {
        self.collected.contains(&at)
    }

    pub fn mark_door_entered(&mut self, at: Position) {
        self.entered_doors.insert(at);
    }

    pub fn has_entered_door(&self, at: Position) -> bool {
        self.entered_doors.contains(&at)
    }

    pub fn mark_exit_blocked(&mut self, zone: ZoneId, direction: Direction) {
        self.blocked_exits.insert((zone, direction));
    }

    pub fn is_exit_blocked(&self, zone: ZoneId, direction: Direction) -> bool {
        self.blocked_exits.contains(&(zone, direction))
    }

    pub fn mark_unreachable(&mut self, position: Position) {
        if self.unreachable.insert(position) {
            debug!(%position, "marked unreachable");
        }
    }

    pub fn is_unreachable(&self, position: Position) -> bool {
        self.unreachable.contains(&position)
    }

    /// Forgets unreachable marks for the zone being entered; other zones
    /// keep theirs.
    pub fn clear_unreachable_in(&mut self, zone: ZoneId) {
        self.unreachable.retain(|p| p.zone != zone);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Default disposition: trust the simulation's hostility flag.
fn flag_disposition(npc: &NpcState) -> Disposition {
    if npc.is_hostile() {
        Disposition::Hostile
    } else {
        Disposition::Friendly
    }
}

/// Objective policy over observed state plus [`ExplorationMemory`].
///
/// The disposition classifier is injectable so content-specific heuristics
/// (the real game judges some characters by name) stay out of the policy.
pub struct GoalSelector {
    memory: ExplorationMemory,
    classifier: fn(&NpcState) -> Disposition,
}

impl GoalSelector {
    pub fn new() -> Self {
        Self::with_classifier(flag_disposition)
    }

    pub fn with_classifier(classifier: fn(&NpcState) -> Disposition) -> Self {
        Self {
            memory: ExplorationMemory::new(),
            classifier,
        }
    }

    pub fn memory(&self) -> &ExplorationMemory {
        &self.memory
    }

    /// Runs the injected disposition classifier on one NPC.
    pub fn classify(&self, npc: &NpcState) -> Disposition {
        (self.classifier)(npc)
    }

    pub fn reset(&mut self) {
        self.memory.reset();
    }

    /// The agent crossed into `entered`; its unreachable marks get retried.
    pub fn on_zone_changed(&mut self, entered: ZoneId) {
        debug!(zone = %entered, "zone entered, retrying its unreachable cells");
        self.memory.clear_unreachable_in(entered);
    }

    // ---- attempt bookkeeping ----

    pub fn mark_talked_to(&mut self, npc: Position) {
        self.memory.mark_talked_to(npc);
    }

    pub fn mark_used_item_on(&mut self, npc: Position, item: ItemId) {
        self.memory.mark_item_tried(npc, item);
    }

    pub fn mark_item_collected(&mut self, at: Position) {
        self.memory.mark_collected(at);
    }

    pub fn mark_door_entered(&mut self, at: Position) {
        self.memory.mark_door_entered(at);
    }

    pub fn mark_exit_blocked(&mut self, zone: ZoneId, direction: Direction) {
        self.memory.mark_exit_blocked(zone, direction);
    }

    pub fn mark_unreachable(&mut self, position: Position) {
        self.memory.mark_unreachable(position);
    }

    /// Commits the attempt `objective` represents, so the same candidate is
    /// not handed out again on the next decision even if it fails.
    pub fn mark_attempted(&mut self, zone: ZoneId, objective: &Objective) {
        match objective {
            Objective::TalkToNpc(npc) => {
                self.memory.mark_talked_to(Position::from_point(zone, npc.at));
            }
            Objective::UseItemOnNpc(npc, item) => {
                self.memory
                    .mark_item_tried(Position::from_point(zone, npc.at), *item);
            }
            Objective::PickupItem(at) => {
                self.memory.mark_collected(Position::from_point(zone, *at));
            }
            Objective::EnterDoor(at, _) => {
                self.memory.mark_door_entered(Position::from_point(zone, *at));
            }
            _ => {}
        }
    }

    // ---- decisions ----

    /// Derives the mission phase from global facts: starting item held,
    /// standing at home, mission goal solved. Takes precedence over all
    /// in-zone logic.
    pub fn current_phase(&self, world: &dyn GameWorld, map: &WorldMap) -> MissionPhase {
        let at_home = world.player_zone() == map.home_zone();
        if mission_accomplished(world, map) {
            return if at_home {
                MissionPhase::Completed
            } else {
                MissionPhase::ReturnHome
            };
        }
        if let Some(item) = map.starting_item() {
            if !world.has_item(item) {
                return MissionPhase::TalkToHomeNpc;
            }
        }
        if at_home && map.objective_zone().is_some_and(|zone| zone != map.home_zone()) {
            return MissionPhase::TravelToObjective;
        }
        MissionPhase::SolveZone
    }

    /// Marks the current zone visited, then derives the next objective from
    /// the phase. Never fails: when nothing concrete is left the result
    /// degrades to a wander or return intent.
    pub fn current_objective(&mut self, world: &dyn GameWorld, map: &WorldMap) -> Objective {
        self.memory.mark_visited(world.player_zone());

        let phase = self.current_phase(world, map);
        let objective = match phase {
            MissionPhase::Completed => Objective::None,
            MissionPhase::TalkToHomeNpc => self.home_npc_objective(world, map),
            MissionPhase::TravelToObjective | MissionPhase::ReturnHome => Objective::UseXWing,
            MissionPhase::SolveZone => self.solve_zone_objective(world, map),
        };
        debug!(%phase, %objective, "objective selected");
        objective
    }

    fn home_npc_objective(&self, world: &dyn GameWorld, map: &WorldMap) -> Objective {
        let zone = world.player_zone();
        if zone != map.home_zone() {
            // The starting item is handed out at home.
            return Objective::UseXWing;
        }
        let wanted = map.home_npc();
        let candidate = world
            .npcs(zone)
            .iter()
            .filter(|npc| npc.is_alive() && npc.is_enabled())
            .find(|npc| wanted.is_none_or(|id| npc.id == id));
        match candidate {
            Some(npc) => Objective::TalkToNpc(NpcTarget::new(npc.id, npc.point())),
            None => Objective::FindNpc,
        }
    }

    /// The strict priority ladder for working a zone. Each tier only looks
    /// at candidates that are not marked unreachable and not yet attempted.
    fn solve_zone_objective(&self, world: &dyn GameWorld, map: &WorldMap) -> Objective {
        let zone = world.player_zone();
        let player = world.player_point();
        let memory = &self.memory;
        let reachable = |at: Point| !memory.is_unreachable(Position::from_point(zone, at));
        let npcs = world.npcs(zone);

        // 1. A living hostile always comes first.
        if let Some(npc) = npcs
            .iter()
            .filter(|npc| self.is_targetable(npc, Disposition::Hostile))
            .filter(|npc| reachable(npc.point()))
            .min_by_key(|npc| player.manhattan_distance(npc.point()))
        {
            return Objective::KillEnemy(NpcTarget::new(npc.id, npc.point()));
        }

        // 2. Uncollected item objects.
        if let Some(object) = world
            .objects(zone)
            .iter()
            .filter(|object| object.is_item())
            .filter(|object| !world.object_collected(zone, object.point()))
            .filter(|object| !memory.is_collected(Position::from_point(zone, object.point())))
            .find(|object| reachable(object.point()))
        {
            return Objective::PickupItem(object.point());
        }

        // 3. Items embedded in the middle tile layer.
        if let Some(at) = self.embedded_item(world, zone) {
            return Objective::PickupItem(at);
        }

        // 4. Nearest friendly not yet talked to this run.
        if let Some(npc) = npcs
            .iter()
            .filter(|npc| self.is_targetable(npc, Disposition::Friendly))
            .filter(|npc| !memory.has_talked_to(Position::from_point(zone, npc.point())))
            .filter(|npc| reachable(npc.point()))
            .min_by_key(|npc| player.manhattan_distance(npc.point()))
        {
            return Objective::TalkToNpc(NpcTarget::new(npc.id, npc.point()));
        }

        // 5. Offer inventory items to friendlies, one untried pairing at a
        // time.
        if !world.inventory().is_empty() {
            for npc in npcs
                .iter()
                .filter(|npc| self.is_targetable(npc, Disposition::Friendly))
                .filter(|npc| reachable(npc.point()))
            {
                let key = Position::from_point(zone, npc.point());
                if let Some(item) = world
                    .inventory()
                    .iter()
                    .copied()
                    .find(|item| !memory.has_tried_item(key, *item))
                {
                    return Objective::UseItemOnNpc(NpcTarget::new(npc.id, npc.point()), item);
                }
            }
        }

        // 6. Nearest passage that might lead somewhere new.
        if let Some(object) = world
            .objects(zone)
            .iter()
            .filter(|object| object.is_passage())
            .filter(|object| !memory.has_entered_door(Position::from_point(zone, object.point())))
            .filter(|object| {
                object
                    .destination_zone()
                    .is_none_or(|dest| !memory.is_visited(dest))
            })
            .filter(|object| reachable(object.point()))
            .min_by_key(|object| player.manhattan_distance(object.point()))
        {
            return Objective::EnterDoor(object.point(), object.destination_zone());
        }

        // 7. Walk off the map edge into an unvisited neighbor.
        for direction in Direction::ALL {
            if memory.is_exit_blocked(zone, direction) {
                continue;
            }
            if let Some(next) = map.neighbor(zone, direction) {
                if !memory.is_visited(next) {
                    return Objective::ChangeZone(next, Some(direction));
                }
            }
        }

        // 8. Somewhere in the world a zone is still unvisited.
        if map.zones().any(|z| !memory.is_visited(z)) {
            return Objective::Explore;
        }

        // 9. This zone is spent.
        Objective::UseXWing
    }

    fn is_targetable(&self, npc: &NpcState, wanted: Disposition) -> bool {
        npc.is_alive() && npc.is_enabled() && (self.classifier)(npc) == wanted
    }

    fn embedded_item(&self, world: &dyn GameWorld, zone: ZoneId) -> Option<Point> {
        let dims = world.zone_dimensions(zone);
        for y in 0..dims.height as i32 {
            for x in 0..dims.width as i32 {
                let at = Point::new(x, y);
                let Some(tile) = world.tile(zone, TileLayer::Middle, at) else {
                    continue;
                };
                if !world.tile_flags(tile).contains(TileFlags::ITEM) {
                    continue;
                }
                if world.object_collected(zone, at) {
                    continue;
                }
                let position = Position::from_point(zone, at);
                if self.memory.is_collected(position) || self.memory.is_unreachable(position) {
                    continue;
                }
                return Some(at);
            }
        }
        None
    }
}

impl Default for GoalSelector {
    fn default() -> Self {
        Self::new()
    }
}

fn mission_accomplished(world: &dyn GameWorld, map: &WorldMap) -> bool {
    map.objective_zone()
        .is_some_and(|zone| world.zone_solved(zone))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_world::{
        ObjectKind, ScriptedWorld, TileId, ZoneBuilder, ZoneObject, friendly_npc, hostile_npc,
    };

    const HOME: ZoneId = ZoneId(1);
    const AWAY: ZoneId = ZoneId(2);
    const START_ITEM: ItemId = ItemId(1);
    const GIVER: NpcId = NpcId(1);

    fn single_zone_world(builder: ZoneBuilder) -> ScriptedWorld {
        let mut world = ScriptedWorld::new(WorldMap::single_zone(HOME));
        world.add_zone(HOME, builder);
        world.place_player(HOME, Point::new(2, 2));
        world
    }

    fn mission_map() -> WorldMap {
        WorldMap::new(2, 1, vec![Some(HOME), Some(AWAY)], HOME)
            .and_then(|map| map.with_objective(AWAY))
            .unwrap()
            .with_starting_item(START_ITEM)
            .with_home_npc(GIVER)
    }

    fn mission_world() -> ScriptedWorld {
        let mut world = ScriptedWorld::new(mission_map());
        world.add_zone(HOME, ZoneBuilder::new(5, 5).npc(friendly_npc(GIVER, 2, 0)));
        world.add_zone(AWAY, ZoneBuilder::new(5, 5));
        world.place_player(HOME, Point::new(2, 2));
        world
    }

    #[test]
    fn hostile_outranks_friendly_until_dead() {
        let mut world = single_zone_world(
            ZoneBuilder::new(9, 9)
                .npc(hostile_npc(NpcId(66), 8, 8))
                .npc(friendly_npc(NpcId(9), 2, 0)),
        );
        let map = world.map().clone();
        let mut goal = GoalSelector::new();

        // The friendly is closer; the hostile still wins on tier.
        match goal.current_objective(&world, &map) {
            Objective::KillEnemy(npc) => assert_eq!(npc.id, NpcId(66)),
            other => panic!("expected a kill objective, got {other}"),
        }

        world.kill_npc(HOME, Point::new(8, 8));
        match goal.current_objective(&world, &map) {
            Objective::TalkToNpc(npc) => assert_eq!(npc.id, NpcId(9)),
            other => panic!("expected a talk objective, got {other}"),
        }
    }

    #[test]
    fn item_objects_outrank_doors_regardless_of_distance() {
        let mut world = single_zone_world(
            ZoneBuilder::new(5, 5)
                .object(ZoneObject::new(ObjectKind::Crate, 0, 0, 12))
                .object(ZoneObject::new(ObjectKind::Door, 4, 4, 9)),
        );
        world.place_player(HOME, Point::new(4, 3));
        let map = world.map().clone();
        let mut goal = GoalSelector::new();

        assert_eq!(
            goal.current_objective(&world, &map),
            Objective::PickupItem(Point::new(0, 0))
        );
    }

    #[test]
    fn embedded_tile_items_rank_below_object_items() {
        let mut world = single_zone_world(
            ZoneBuilder::new(5, 5)
                .object(ZoneObject::new(ObjectKind::Weapon, 3, 3, 12))
                .tile(TileLayer::Middle, 1, 1, TileId(40)),
        );
        world.define_tile(TileId(40), TileFlags::ITEM);
        let map = world.map().clone();
        let mut goal = GoalSelector::new();

        let first = goal.current_objective(&world, &map);
        assert_eq!(first, Objective::PickupItem(Point::new(3, 3)));

        goal.mark_attempted(HOME, &first);
        assert_eq!(
            goal.current_objective(&world, &map),
            Objective::PickupItem(Point::new(1, 1))
        );
    }

    #[test]
    fn talked_npcs_are_not_revisited() {
        let world = single_zone_world(ZoneBuilder::new(5, 5).npc(friendly_npc(NpcId(9), 2, 0)));
        let map = world.map().clone();
        let mut goal = GoalSelector::new();

        let first = goal.current_objective(&world, &map);
        assert_eq!(
            first,
            Objective::TalkToNpc(NpcTarget::new(NpcId(9), Point::new(2, 0)))
        );

        goal.mark_attempted(HOME, &first);
        assert_eq!(goal.current_objective(&world, &map), Objective::UseXWing);
    }

    #[test]
    fn inventory_items_are_offered_to_talked_npcs() {
        let mut world = single_zone_world(ZoneBuilder::new(5, 5).npc(friendly_npc(NpcId(9), 2, 0)));
        world.give_item(ItemId(7));
        world.give_item(ItemId(8));
        let map = world.map().clone();
        let mut goal = GoalSelector::new();
        goal.mark_talked_to(Position::new(HOME, 2, 0));

        let npc = NpcTarget::new(NpcId(9), Point::new(2, 0));
        let first = goal.current_objective(&world, &map);
        assert_eq!(first, Objective::UseItemOnNpc(npc, ItemId(7)));

        goal.mark_attempted(HOME, &first);
        assert_eq!(
            goal.current_objective(&world, &map),
            Objective::UseItemOnNpc(npc, ItemId(8))
        );
    }

    #[test]
    fn doors_to_visited_zones_are_skipped() {
        let world = single_zone_world(
            ZoneBuilder::new(5, 5).object(ZoneObject::new(ObjectKind::Door, 4, 4, 2)),
        );
        let map = world.map().clone();
        let mut goal = GoalSelector::new();

        assert_eq!(
            goal.current_objective(&world, &map),
            Objective::EnterDoor(Point::new(4, 4), Some(AWAY))
        );

        goal.memory.mark_visited(AWAY);
        assert_eq!(goal.current_objective(&world, &map), Objective::UseXWing);
    }

    #[test]
    fn adjacent_unvisited_zones_prompt_a_zone_change() {
        let map = WorldMap::new(2, 1, vec![Some(HOME), Some(AWAY)], HOME).unwrap();
        let mut world = ScriptedWorld::new(map.clone());
        world.add_zone(HOME, ZoneBuilder::new(5, 5));
        world.add_zone(AWAY, ZoneBuilder::new(5, 5));
        world.place_player(HOME, Point::new(2, 2));
        let mut goal = GoalSelector::new();

        assert_eq!(
            goal.current_objective(&world, &map),
            Objective::ChangeZone(AWAY, Some(Direction::East))
        );
    }

    #[test]
    fn blocked_exits_fall_back_to_wandering() {
        let map = WorldMap::new(2, 1, vec![Some(HOME), Some(AWAY)], HOME).unwrap();
        let mut world = ScriptedWorld::new(map.clone());
        world.add_zone(HOME, ZoneBuilder::new(5, 5));
        world.add_zone(AWAY, ZoneBuilder::new(5, 5));
        world.place_player(HOME, Point::new(2, 2));
        let mut goal = GoalSelector::new();
        goal.mark_exit_blocked(HOME, Direction::East);

        assert_eq!(goal.current_objective(&world, &map), Objective::Explore);
    }

    #[test]
    fn unreachable_hostiles_are_passed_over() {
        let world = single_zone_world(
            ZoneBuilder::new(9, 9)
                .npc(hostile_npc(NpcId(66), 8, 8))
                .npc(friendly_npc(NpcId(9), 2, 0)),
        );
        let map = world.map().clone();
        let mut goal = GoalSelector::new();
        goal.mark_unreachable(Position::new(HOME, 8, 8));

        match goal.current_objective(&world, &map) {
            Objective::TalkToNpc(npc) => assert_eq!(npc.id, NpcId(9)),
            other => panic!("expected a talk objective, got {other}"),
        }
    }

    #[test]
    fn unreachable_marks_clear_only_for_the_entered_zone() {
        let mut goal = GoalSelector::new();
        let here = Position::new(HOME, 3, 3);
        let there = Position::new(AWAY, 1, 1);
        goal.mark_unreachable(here);
        goal.mark_unreachable(there);

        goal.on_zone_changed(AWAY);
        assert!(goal.memory().is_unreachable(here));
        assert!(!goal.memory().is_unreachable(there));
    }

    #[test]
    fn phase_follows_the_mission_arc() {
        let mut world = mission_world();
        let map = world.map().clone();
        let mut goal = GoalSelector::new();

        // No starting item yet: get it from the mission giver.
        assert_eq!(
            goal.current_phase(&world, &map),
            MissionPhase::TalkToHomeNpc
        );
        assert_eq!(
            goal.current_objective(&world, &map),
            Objective::TalkToNpc(NpcTarget::new(GIVER, Point::new(2, 0)))
        );

        // Item in hand, still at home: fly out.
        world.give_item(START_ITEM);
        assert_eq!(
            goal.current_phase(&world, &map),
            MissionPhase::TravelToObjective
        );
        assert_eq!(goal.current_objective(&world, &map), Objective::UseXWing);

        // In the mission area: work the zone.
        world.place_player(AWAY, Point::new(2, 2));
        assert_eq!(goal.current_phase(&world, &map), MissionPhase::SolveZone);

        // Goal solved away from home: fly back.
        world.set_zone_solved(AWAY, true);
        assert_eq!(goal.current_phase(&world, &map), MissionPhase::ReturnHome);
        assert_eq!(goal.current_objective(&world, &map), Objective::UseXWing);

        // Back home with the goal solved: done.
        world.place_player(HOME, Point::new(2, 2));
        assert_eq!(goal.current_phase(&world, &map), MissionPhase::Completed);
        assert_eq!(goal.current_objective(&world, &map), Objective::None);
    }

    #[test]
    fn deciding_marks_the_current_zone_visited() {
        let world = single_zone_world(ZoneBuilder::new(5, 5));
        let map = world.map().clone();
        let mut goal = GoalSelector::new();
        assert!(!goal.memory().is_visited(HOME));

        goal.current_objective(&world, &map);
        assert!(goal.memory().is_visited(HOME));
    }
}
