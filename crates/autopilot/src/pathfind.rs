//! Grid pathfinding within one zone.
//!
//! A* over 4-connected cells with unit step cost and a Manhattan heuristic.
//! Walkability layers in-bounds checks, tile obstacles, living NPCs, the
//! caller's dynamic obstacle list and the pathfinder's own blocklists. An
//! unreachable goal is first rewritten to the nearest walkable cell by an
//! expanding ring search; searches are capped so a sealed-off target costs a
//! bounded amount of work.
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use agent_world::{Direction, GameWorld, Point, Position, TileLayer, ZoneDimensions, ZoneId};

use crate::config::AgentConfig;

/// Fixed neighbor scan order for adjacency searches: up, down, left, right.
pub(crate) const ADJACENT_SCAN: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::West,
    Direction::East,
];

/// Read view over one zone's walkability, borrowed from the simulation for
/// the duration of a query.
pub struct NavGrid<'a> {
    world: &'a dyn GameWorld,
    zone: ZoneId,
    dims: ZoneDimensions,
}

impl<'a> NavGrid<'a> {
    pub fn new(world: &'a dyn GameWorld, zone: ZoneId) -> Self {
        let dims = world.zone_dimensions(zone);
        Self { world, zone, dims }
    }

    /// Grid for the zone the player currently stands in.
    pub fn current(world: &'a dyn GameWorld) -> Self {
        Self::new(world, world.player_zone())
    }

    pub fn zone(&self) -> ZoneId {
        self.zone
    }

    pub fn dimensions(&self) -> ZoneDimensions {
        self.dims
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        self.dims.contains(point)
    }

    /// Zone-qualifies an in-zone cell.
    pub fn position(&self, point: Point) -> Position {
        Position::from_point(self.zone, point)
    }

    fn terrain_blocks(&self, point: Point) -> bool {
        self.world
            .tile(self.zone, TileLayer::Middle, point)
            .is_some_and(|tile| self.world.tile_flags(tile).blocks_walking())
    }

    fn npc_blocks(&self, point: Point) -> bool {
        self.world
            .npcs(self.zone)
            .iter()
            .any(|npc| npc.point() == point && npc.blocks_movement())
    }

    fn cell_index(&self, point: Point) -> usize {
        point.y as usize * self.dims.width as usize + point.x as usize
    }
}

/// Open-list entry. The heap is a max-heap, so the ordering is reversed to
/// pop the lowest f-score first; equal f-scores pop in insertion order via
/// the monotonic `seq` counter, which pins tie-breaking deterministically.
#[derive(Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    f: u32,
    seq: u64,
    g: u32,
    cell: Point,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Zone path search with owned blocklists.
///
/// The *temporary* blocklist marks cells where movement failed unexpectedly;
/// it is dropped wholesale when the zone context changes. The *permanent*
/// blocklist marks cells that must never be pathed through again once
/// discovered (terrain that masquerades as open). Both are OR'd into every
/// walkability check.
pub struct Pathfinder {
    temporary: Vec<Position>,
    permanent: Vec<Position>,
    last_zone: Option<ZoneId>,
    max_expansions: usize,
    search_radius: i32,
}

impl Pathfinder {
    pub fn new() -> Self {
        Self::with_limits(
            AgentConfig::DEFAULT_MAX_EXPANSIONS,
            AgentConfig::DEFAULT_SEARCH_RADIUS,
        )
    }

    pub fn with_limits(max_expansions: usize, search_radius: i32) -> Self {
        Self {
            temporary: Vec::new(),
            permanent: Vec::new(),
            last_zone: None,
            max_expansions,
            search_radius,
        }
    }

    /// Marks a cell unwalkable until the zone context changes.
    pub fn block_temporarily(&mut self, position: Position) {
        if !self.temporary.contains(&position) {
            debug!(%position, "temporary blocklist entry");
            self.temporary.push(position);
        }
    }

    /// Marks a cell unwalkable for the rest of the run.
    pub fn block_permanently(&mut self, position: Position) {
        if !self.permanent.contains(&position) {
            debug!(%position, "permanent blocklist entry");
            self.permanent.push(position);
        }
    }

    /// Reports the zone the agent is operating in; a change from the
    /// last-seen zone drops the temporary blocklist.
    pub fn sync_zone(&mut self, zone: ZoneId) {
        if self.last_zone != Some(zone) {
            if self.last_zone.is_some() && !self.temporary.is_empty() {
                debug!(
                    entries = self.temporary.len(),
                    "zone changed, clearing temporary blocklist"
                );
            }
            self.temporary.clear();
            self.last_zone = Some(zone);
        }
    }

    /// Clears both blocklists and the zone context. New-run reset.
    pub fn reset(&mut self) {
        self.temporary.clear();
        self.permanent.clear();
        self.last_zone = None;
    }

    /// The full walkability predicate: bounds, blocklists, terrain, NPCs and
    /// the caller's extra obstacles.
    pub fn is_walkable(&self, grid: &NavGrid<'_>, point: Point, obstacles: &[Point]) -> bool {
        if !grid.in_bounds(point) {
            return false;
        }
        let position = grid.position(point);
        if self.temporary.contains(&position) || self.permanent.contains(&position) {
            return false;
        }
        if grid.terrain_blocks(point) || grid.npc_blocks(point) {
            return false;
        }
        !obstacles.contains(&point)
    }

    /// The nearest walkable cell to `from`: itself, or the first match of an
    /// expanding ring search (perimeter cells only, row-major within each
    /// ring) out to the configured radius.
    pub fn find_nearest_walkable(
        &self,
        grid: &NavGrid<'_>,
        from: Point,
        obstacles: &[Point],
    ) -> Option<Point> {
        if self.is_walkable(grid, from, obstacles) {
            return Some(from);
        }
        for radius in 1..=self.search_radius {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx.abs() != radius && dy.abs() != radius {
                        continue;
                    }
                    let candidate = Point::new(from.x + dx, from.y + dy);
                    if self.is_walkable(grid, candidate, obstacles) {
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }

    /// Shortest path from `start` to `goal`.
    ///
    /// Returns an empty path when `start == goal`, rewrites an unwalkable
    /// goal to its nearest walkable substitute, and gives `None` when no
    /// route exists or the expansion cap is hit. The returned path never
    /// contains `start` and always ends at the resolved destination.
    pub fn find_path(
        &self,
        grid: &NavGrid<'_>,
        start: Point,
        goal: Point,
        obstacles: &[Point],
    ) -> Option<Vec<Position>> {
        if start == goal {
            return Some(Vec::new());
        }
        let goal = if self.is_walkable(grid, goal, obstacles) {
            goal
        } else {
            let substitute = self.find_nearest_walkable(grid, goal, obstacles)?;
            debug!(%goal, %substitute, "goal not walkable, substituting");
            substitute
        };
        if start == goal {
            return Some(Vec::new());
        }

        let dims = grid.dimensions();
        let cells = (dims.width as usize) * (dims.height as usize);
        if cells == 0 {
            return None;
        }
        let mut g_score = vec![u32::MAX; cells];
        let mut came_from = vec![usize::MAX; cells];
        let mut heap = BinaryHeap::new();
        let mut seq: u64 = 0;

        let start_idx = grid.cell_index(start);
        g_score[start_idx] = 0;
        heap.push(OpenNode {
            f: start.manhattan_distance(goal),
            seq,
            g: 0,
            cell: start,
        });

        let mut expansions = 0usize;
        while let Some(node) = heap.pop() {
            let node_idx = grid.cell_index(node.cell);
            // Stale entry superseded by a cheaper route.
            if node.g != g_score[node_idx] {
                continue;
            }
            expansions += 1;
            if expansions > self.max_expansions {
                debug!(%start, %goal, "expansion cap hit, giving up");
                return None;
            }
            if node.cell == goal {
                return Some(reconstruct(grid, &came_from, start_idx, node_idx));
            }

            for direction in ADJACENT_SCAN {
                let next = node.cell.step(direction);
                if !self.is_walkable(grid, next, obstacles) {
                    continue;
                }
                let next_idx = grid.cell_index(next);
                let tentative = node.g + 1;
                if tentative < g_score[next_idx] {
                    g_score[next_idx] = tentative;
                    came_from[next_idx] = node_idx;
                    seq += 1;
                    heap.push(OpenNode {
                        f: tentative + next.manhattan_distance(goal),
                        seq,
                        g: tentative,
                        cell: next,
                    });
                }
            }
        }
        None
    }

    /// Shortest path to any of `target`'s four neighbors, scanned in the
    /// fixed up/down/left/right order; ties keep the first-found. Also
    /// returns which neighbor the path ends at. Standing on a neighbor
    /// already yields an empty path.
    pub fn find_path_to_adjacent(
        &self,
        grid: &NavGrid<'_>,
        start: Point,
        target: Point,
        obstacles: &[Point],
    ) -> Option<(Vec<Position>, Point)> {
        let mut best: Option<(Vec<Position>, Point)> = None;
        for direction in ADJACENT_SCAN {
            let neighbor = target.step(direction);
            if start == neighbor {
                return Some((Vec::new(), neighbor));
            }
            if !self.is_walkable(grid, neighbor, obstacles) {
                continue;
            }
            if let Some(path) = self.find_path(grid, start, neighbor, obstacles) {
                let better = match &best {
                    Some((current, _)) => path.len() < current.len(),
                    None => true,
                };
                if better {
                    best = Some((path, neighbor));
                }
            }
        }
        best
    }
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new()
    }
}

fn reconstruct(
    grid: &NavGrid<'_>,
    came_from: &[usize],
    start_idx: usize,
    goal_idx: usize,
) -> Vec<Position> {
    let width = grid.dimensions().width as usize;
    let mut path = Vec::new();
    let mut idx = goal_idx;
    while idx != start_idx {
        let point = Point::new((idx % width) as i32, (idx / width) as i32);
        path.push(grid.position(point));
        idx = came_from[idx];
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_world::{ScriptedWorld, WorldMap, ZoneBuilder};

    const ZONE: ZoneId = ZoneId(1);
    const OTHER_ZONE: ZoneId = ZoneId(2);

    fn open_world(width: u32, height: u32) -> ScriptedWorld {
        let mut world = ScriptedWorld::new(WorldMap::single_zone(ZONE));
        world.add_zone(ZONE, ZoneBuilder::new(width, height));
        world
    }

    fn walled_world(width: u32, height: u32, walls: &[(i32, i32)]) -> ScriptedWorld {
        let mut world = ScriptedWorld::new(WorldMap::single_zone(ZONE));
        let mut builder = ZoneBuilder::new(width, height);
        for &(x, y) in walls {
            builder = builder.wall(x, y);
        }
        world.add_zone(ZONE, builder);
        world
    }

    #[test]
    fn open_grid_paths_have_manhattan_length() {
        let world = open_world(9, 9);
        let grid = NavGrid::new(&world, ZONE);
        let finder = Pathfinder::new();
        let pairs = [
            (Point::new(0, 0), Point::new(8, 8)),
            (Point::new(4, 4), Point::new(4, 0)),
            (Point::new(7, 2), Point::new(1, 6)),
        ];
        for (start, goal) in pairs {
            let path = finder.find_path(&grid, start, goal, &[]).unwrap();
            assert_eq!(path.len() as u32, start.manhattan_distance(goal));
            assert_eq!(path.last().unwrap().point(), goal);
        }
    }

    #[test]
    fn start_equals_goal_is_an_empty_path() {
        let world = open_world(5, 5);
        let grid = NavGrid::new(&world, ZONE);
        let finder = Pathfinder::new();
        let path = finder
            .find_path(&grid, Point::new(2, 2), Point::new(2, 2), &[])
            .unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn paths_never_contain_the_start_cell() {
        let world = open_world(5, 5);
        let grid = NavGrid::new(&world, ZONE);
        let finder = Pathfinder::new();
        let start = Point::new(1, 3);
        let path = finder
            .find_path(&grid, start, Point::new(4, 0), &[])
            .unwrap();
        assert!(path.iter().all(|p| p.point() != start));
    }

    #[test]
    fn sealed_goal_returns_none() {
        // (2,2) stays walkable but is sealed behind four walls.
        let world = walled_world(5, 5, &[(1, 2), (3, 2), (2, 1), (2, 3)]);
        let grid = NavGrid::new(&world, ZONE);
        let finder = Pathfinder::new();
        assert!(
            finder
                .find_path(&grid, Point::new(0, 0), Point::new(2, 2), &[])
                .is_none()
        );
    }

    #[test]
    fn unwalkable_goal_is_rewritten_to_ring_substitute() {
        // Goal itself is a wall; the first ring cell in row-major order is
        // the upper-left diagonal neighbor.
        let world = walled_world(7, 7, &[(3, 3)]);
        let grid = NavGrid::new(&world, ZONE);
        let finder = Pathfinder::new();
        let path = finder
            .find_path(&grid, Point::new(0, 3), Point::new(3, 3), &[])
            .unwrap();
        assert_eq!(path.last().unwrap().point(), Point::new(2, 2));
    }

    #[test]
    fn deterministic_tie_break_pins_the_path() {
        // Every shortest path to (2,2) has equal f-scores along the way; the
        // FIFO tie-break plus the fixed neighbor order make the exact route
        // reproducible.
        let world = open_world(5, 5);
        let grid = NavGrid::new(&world, ZONE);
        let finder = Pathfinder::new();
        let path = finder
            .find_path(&grid, Point::new(0, 0), Point::new(2, 2), &[])
            .unwrap();
        let cells: Vec<Point> = path.iter().map(|p| p.point()).collect();
        assert_eq!(
            cells,
            vec![
                Point::new(0, 1),
                Point::new(0, 2),
                Point::new(1, 2),
                Point::new(2, 2),
            ]
        );
    }

    #[test]
    fn expansion_cap_bounds_hopeless_searches() {
        // A sealed target in a grid large enough that exhausting the open
        // component would cost more than the cap.
        let mut walls = Vec::new();
        for x in 45..=47 {
            walls.push((x, 45));
            walls.push((x, 47));
        }
        walls.push((45, 46));
        walls.push((47, 46));
        let world = walled_world(50, 50, &walls);
        let grid = NavGrid::new(&world, ZONE);
        let finder = Pathfinder::new();
        assert!(
            finder
                .find_path(&grid, Point::new(0, 0), Point::new(46, 46), &[])
                .is_none()
        );
    }

    #[test]
    fn dynamic_obstacles_reroute_the_path() {
        let world = open_world(3, 3);
        let grid = NavGrid::new(&world, ZONE);
        let finder = Pathfinder::new();
        let blocked = [Point::new(1, 0)];
        let path = finder
            .find_path(&grid, Point::new(0, 0), Point::new(2, 0), &blocked)
            .unwrap();
        assert!(path.iter().all(|p| p.point() != blocked[0]));
        assert_eq!(path.last().unwrap().point(), Point::new(2, 0));
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn living_npcs_block_cells() {
        let mut world = ScriptedWorld::new(WorldMap::single_zone(ZONE));
        world.add_zone(
            ZONE,
            ZoneBuilder::new(3, 1).npc(agent_world::hostile_npc(agent_world::NpcId(1), 1, 0)),
        );
        let grid = NavGrid::new(&world, ZONE);
        let finder = Pathfinder::new();
        assert!(!finder.is_walkable(&grid, Point::new(1, 0), &[]));
        assert!(
            finder
                .find_path(&grid, Point::new(0, 0), Point::new(2, 0), &[])
                .is_none()
        );
    }

    #[test]
    fn temporary_blocklist_clears_on_zone_change() {
        let world = open_world(5, 5);
        let grid = NavGrid::new(&world, ZONE);
        let mut finder = Pathfinder::new();
        let cell = Point::new(2, 2);

        finder.sync_zone(ZONE);
        finder.block_temporarily(Position::from_point(ZONE, cell));
        assert!(!finder.is_walkable(&grid, cell, &[]));

        // Same zone reported again: entry survives.
        finder.sync_zone(ZONE);
        assert!(!finder.is_walkable(&grid, cell, &[]));

        // Zone context changes: entry dropped.
        finder.sync_zone(OTHER_ZONE);
        assert!(finder.is_walkable(&grid, cell, &[]));
    }

    #[test]
    fn permanent_blocklist_survives_zone_changes() {
        let world = open_world(5, 5);
        let grid = NavGrid::new(&world, ZONE);
        let mut finder = Pathfinder::new();
        let cell = Point::new(1, 1);

        finder.sync_zone(ZONE);
        finder.block_permanently(Position::from_point(ZONE, cell));
        finder.sync_zone(OTHER_ZONE);
        finder.sync_zone(ZONE);
        assert!(!finder.is_walkable(&grid, cell, &[]));
    }

    #[test]
    fn adjacent_search_returns_minimal_path() {
        let world = open_world(5, 5);
        let grid = NavGrid::new(&world, ZONE);
        let finder = Pathfinder::new();
        let start = Point::new(2, 4);
        let target = Point::new(2, 2);
        let (path, neighbor) = finder
            .find_path_to_adjacent(&grid, start, target, &[])
            .unwrap();
        // No adjacent cell of the target is reachable in fewer steps.
        for direction in ADJACENT_SCAN {
            let candidate = target.step(direction);
            if let Some(other) = finder.find_path(&grid, start, candidate, &[]) {
                assert!(path.len() <= other.len());
            }
        }
        assert!(neighbor.is_adjacent(target));
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn adjacent_search_ties_keep_scan_order() {
        // From (0,0), the north and west neighbors of (2,2) are both three
        // steps away; the scan order keeps north.
        let world = open_world(5, 5);
        let grid = NavGrid::new(&world, ZONE);
        let finder = Pathfinder::new();
        let (path, neighbor) = finder
            .find_path_to_adjacent(&grid, Point::new(0, 0), Point::new(2, 2), &[])
            .unwrap();
        assert_eq!(neighbor, Point::new(2, 1));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn standing_adjacent_already_is_an_empty_path() {
        let world = open_world(5, 5);
        let grid = NavGrid::new(&world, ZONE);
        let finder = Pathfinder::new();
        let (path, neighbor) = finder
            .find_path_to_adjacent(&grid, Point::new(2, 1), Point::new(2, 2), &[])
            .unwrap();
        assert!(path.is_empty());
        assert_eq!(neighbor, Point::new(2, 1));
    }

    #[test]
    fn nearest_walkable_gives_up_beyond_radius() {
        let all_walls: Vec<(i32, i32)> = (0..3)
            .flat_map(|x| (0..3).map(move |y| (x, y)))
            .collect();
        let world = walled_world(3, 3, &all_walls);
        let grid = NavGrid::new(&world, ZONE);
        let finder = Pathfinder::new();
        assert!(
            finder
                .find_nearest_walkable(&grid, Point::new(1, 1), &[])
                .is_none()
        );
    }
}
