//! Scripted in-memory simulation for harnesses and tests.
//!
//! Implements [`GameWorld`] with the minimal observable rules the agent can
//! exercise: walkability-checked movement, edge-off and door transitions,
//! automatic pickup, talk/use-item responses driven by per-NPC scripts,
//! one-hit combat, and X-Wing travel between home and a landing zone. This is
//! not the game's zone-script interpreter — it answers with state changes
//! only, never logic of its own beyond these rules.
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::action::{ActionKind, ActionRequest};
use crate::ids::{ItemId, NpcId, TileId, ZoneId};
use crate::map::WorldMap;
use crate::npc::{NpcFlags, NpcState};
use crate::object::ZoneObject;
use crate::position::{Direction, Point};
use crate::tile::{TileFlags, TileLayer};
use crate::world::{GameWorld, ZoneDimensions};

/// Tile id the builder uses for plain walls.
pub const WALL_TILE: TileId = TileId(0xF00);
/// Tile id the builder uses for pushable blocks.
pub const PUSH_TILE: TileId = TileId(0xF01);

/// How a sandbox NPC answers talk/use-item requests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NpcScript {
    /// Item granted the first time the player talks to this NPC.
    pub gives: Option<ItemId>,
    /// Item that satisfies this NPC when used on it.
    pub wants: Option<ItemId>,
    /// Satisfying `wants` marks the NPC's zone solved.
    pub solves_zone: bool,
}

struct ScriptedZone {
    dims: ZoneDimensions,
    layers: [Vec<Option<TileId>>; 3],
    objects: Vec<ZoneObject>,
    npcs: Vec<NpcState>,
    collected: HashSet<Point>,
    solved: bool,
    entry: Option<Point>,
}

impl ScriptedZone {
    fn cell_index(&self, point: Point) -> Option<usize> {
        if self.dims.contains(point) {
            Some(point.y as usize * self.dims.width as usize + point.x as usize)
        } else {
            None
        }
    }

    fn tile(&self, layer: TileLayer, point: Point) -> Option<TileId> {
        let idx = self.cell_index(point)?;
        self.layers[layer.index()][idx]
    }
}

/// Authoring handle for one sandbox zone. All cells start empty (walkable).
pub struct ZoneBuilder {
    zone: ScriptedZone,
}

impl ZoneBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        let cells = (width as usize) * (height as usize);
        Self {
            zone: ScriptedZone {
                dims: ZoneDimensions::new(width, height),
                layers: [vec![None; cells], vec![None; cells], vec![None; cells]],
                objects: Vec::new(),
                npcs: Vec::new(),
                collected: HashSet::new(),
                solved: false,
                entry: None,
            },
        }
    }

    /// Places `tile` at `(x, y)` on `layer`. Out-of-bounds cells are ignored.
    pub fn tile(mut self, layer: TileLayer, x: i32, y: i32, tile: TileId) -> Self {
        if let Some(idx) = self.zone.cell_index(Point::new(x, y)) {
            self.zone.layers[layer.index()][idx] = Some(tile);
        }
        self
    }

    /// A hard wall on the middle layer.
    pub fn wall(self, x: i32, y: i32) -> Self {
        self.tile(TileLayer::Middle, x, y, WALL_TILE)
    }

    /// A pushable block on the middle layer.
    pub fn pushable(self, x: i32, y: i32) -> Self {
        self.tile(TileLayer::Middle, x, y, PUSH_TILE)
    }

    pub fn object(mut self, object: ZoneObject) -> Self {
        self.zone.objects.push(object);
        self
    }

    pub fn npc(mut self, npc: NpcState) -> Self {
        self.zone.npcs.push(npc);
        self
    }

    /// Where arrivals (doors without a twin, X-Wing landings) are placed.
    pub fn entry(mut self, x: i32, y: i32) -> Self {
        self.zone.entry = Some(Point::new(x, y));
        self
    }
}

/// Convenience for a live, enabled NPC snapshot.
pub fn friendly_npc(id: NpcId, x: i32, y: i32) -> NpcState {
    NpcState::new(id, x, y, 10, NpcFlags::ALIVE | NpcFlags::ENABLED)
}

/// Convenience for a live, enabled, hostile NPC snapshot.
pub fn hostile_npc(id: NpcId, x: i32, y: i32) -> NpcState {
    NpcState::new(
        id,
        x,
        y,
        10,
        NpcFlags::ALIVE | NpcFlags::ENABLED | NpcFlags::HOSTILE,
    )
}

struct PlayerState {
    zone: ZoneId,
    at: Point,
    inventory: Vec<ItemId>,
    selected: Option<ItemId>,
}

/// The scripted simulation. Build with a [`WorldMap`], add zones, place the
/// player, then alternate `apply` with agent ticks.
pub struct ScriptedWorld {
    map: WorldMap,
    zones: HashMap<ZoneId, ScriptedZone>,
    tile_defs: HashMap<TileId, TileFlags>,
    npc_scripts: HashMap<(ZoneId, NpcId), NpcScript>,
    gifts_given: HashSet<(ZoneId, NpcId)>,
    player: PlayerState,
    landing_zone: Option<ZoneId>,
    lost: bool,
}

impl ScriptedWorld {
    pub fn new(map: WorldMap) -> Self {
        let home = map.home_zone();
        let mut tile_defs = HashMap::new();
        tile_defs.insert(WALL_TILE, TileFlags::OBSTACLE);
        tile_defs.insert(PUSH_TILE, TileFlags::OBSTACLE | TileFlags::DRAGGABLE);
        Self {
            map,
            zones: HashMap::new(),
            tile_defs,
            npc_scripts: HashMap::new(),
            gifts_given: HashSet::new(),
            player: PlayerState {
                zone: home,
                at: Point::ORIGIN,
                inventory: Vec::new(),
                selected: None,
            },
            landing_zone: None,
            lost: false,
        }
    }

    pub fn map(&self) -> &WorldMap {
        &self.map
    }

    pub fn add_zone(&mut self, id: ZoneId, builder: ZoneBuilder) {
        self.zones.insert(id, builder.zone);
    }

    /// Registers attribute bits for a tile id used in zone layers.
    pub fn define_tile(&mut self, tile: TileId, flags: TileFlags) {
        self.tile_defs.insert(tile, flags);
    }

    pub fn set_npc_script(&mut self, zone: ZoneId, npc: NpcId, script: NpcScript) {
        self.npc_scripts.insert((zone, npc), script);
    }

    /// The zone the X-Wing flies to from home. Defaults to the objective
    /// zone when unset.
    pub fn set_landing_zone(&mut self, zone: ZoneId) {
        self.landing_zone = Some(zone);
    }

    pub fn place_player(&mut self, zone: ZoneId, at: Point) {
        self.player.zone = zone;
        self.player.at = at;
    }

    pub fn give_item(&mut self, item: ItemId) {
        self.player.inventory.push(item);
    }

    pub fn set_lost(&mut self) {
        self.lost = true;
    }

    pub fn set_zone_solved(&mut self, zone: ZoneId, solved: bool) {
        if let Some(z) = self.zones.get_mut(&zone) {
            z.solved = solved;
        }
    }

    /// Kills the NPC standing at `at`, if any. Test hook mirroring what a
    /// zone script would do.
    pub fn kill_npc(&mut self, zone: ZoneId, at: Point) {
        if let Some(z) = self.zones.get_mut(&zone) {
            if let Some(npc) = z.npcs.iter_mut().find(|n| n.point() == at) {
                npc.health = 0;
                npc.flags.remove(NpcFlags::ALIVE);
            }
        }
    }

    /// Replaces (or clears) a tile after construction. Lets tests introduce
    /// obstacles mid-run.
    pub fn set_tile(&mut self, zone: ZoneId, layer: TileLayer, at: Point, tile: Option<TileId>) {
        if let Some(z) = self.zones.get_mut(&zone) {
            if let Some(idx) = z.cell_index(at) {
                z.layers[layer.index()][idx] = tile;
            }
        }
    }

    /// Applies one primitive action the way the real simulation would,
    /// between agent ticks. Invalid requests are ignored without effect —
    /// that silence is exactly what the agent must cope with.
    pub fn apply(&mut self, request: &ActionRequest) {
        match request.kind {
            ActionKind::Move => self.apply_move(request.target()),
            ActionKind::Attack => self.apply_attack(request.target()),
            ActionKind::Talk => self.apply_talk(request.target()),
            ActionKind::UseItem => self.apply_use_item(request.target()),
            ActionKind::UseXWing => self.apply_xwing(),
        }
    }

    // ---- action resolution ----

    fn apply_move(&mut self, target: Point) {
        let zone = self.player.zone;
        let dims = self.zones.get(&zone).map(|z| z.dims);
        let Some(dims) = dims else { return };

        if dims.contains(target) {
            if self.cell_walkable(zone, target) {
                self.player.at = target;
                self.after_arrival(true);
            } else {
                debug!(%zone, %target, "move rejected");
            }
            return;
        }

        // Stepping past the edge leaves toward the matching neighbor zone.
        let exit = if target.x < 0 {
            Direction::West
        } else if target.x >= dims.width as i32 {
            Direction::East
        } else if target.y < 0 {
            Direction::North
        } else {
            Direction::South
        };
        let Some(next) = self.map.neighbor(zone, exit) else {
            debug!(%zone, direction = %exit, "edge exit without neighbor");
            return;
        };
        let entry = self.edge_entry(next, exit, target);
        self.transition(next, entry);
    }

    fn apply_attack(&mut self, target: Point) {
        let zone = self.player.zone;
        if let Some(z) = self.zones.get_mut(&zone) {
            if let Some(npc) = z
                .npcs
                .iter_mut()
                .find(|n| n.point() == target && n.is_alive())
            {
                npc.health = 0;
                npc.flags.remove(NpcFlags::ALIVE);
                debug!(%zone, %target, id = %npc.id, "npc defeated");
            }
        }
    }

    fn apply_talk(&mut self, target: Point) {
        let zone = self.player.zone;
        let Some(npc) = self.npc_at(zone, target) else {
            return;
        };

        // The mission giver hands over the starting item on first contact.
        if Some(npc.id) == self.map.home_npc() && zone == self.map.home_zone() {
            if let Some(item) = self.map.starting_item() {
                if !self.player.inventory.contains(&item) {
                    debug!(%item, "mission giver hands over the starting item");
                    self.player.inventory.push(item);
                }
            }
        }

        if let Some(script) = self.npc_scripts.get(&(zone, npc.id)).copied() {
            if let Some(gift) = script.gives {
                if self.gifts_given.insert((zone, npc.id)) {
                    debug!(%gift, id = %npc.id, "npc gives item");
                    self.player.inventory.push(gift);
                }
            }
        }
    }

    fn apply_use_item(&mut self, target: Point) {
        let zone = self.player.zone;
        let Some(item) = self.player.selected else {
            return;
        };
        let Some(npc) = self.npc_at(zone, target) else {
            return;
        };
        let Some(script) = self.npc_scripts.get(&(zone, npc.id)).copied() else {
            return;
        };
        if script.wants != Some(item) {
            return;
        }

        if let Some(pos) = self.player.inventory.iter().position(|i| *i == item) {
            self.player.inventory.remove(pos);
        }
        if let Some(gift) = script.gives {
            if self.gifts_given.insert((zone, npc.id)) {
                self.player.inventory.push(gift);
            }
        }
        if script.solves_zone {
            if let Some(z) = self.zones.get_mut(&zone) {
                z.solved = true;
                debug!(%zone, "zone solved");
            }
        }
    }

    fn apply_xwing(&mut self) {
        let home = self.map.home_zone();
        let dest = if self.player.zone == home {
            match self.landing_zone.or(self.map.objective_zone()) {
                Some(zone) => zone,
                None => return,
            }
        } else {
            home
        };
        let entry = self.arrival_point(dest);
        debug!(from = %self.player.zone, to = %dest, "x-wing flight");
        self.transition(dest, entry);
    }

    // ---- shared state transitions ----

    fn transition(&mut self, zone: ZoneId, at: Point) {
        self.player.zone = zone;
        self.player.at = at;
        // Passages are not chained across a transition, so two doors facing
        // each other cannot bounce the player forever.
        self.after_arrival(false);
    }

    /// Pickups and door-follow checks for the cell the player now stands on.
    fn after_arrival(&mut self, follow_passage: bool) {
        let zone = self.player.zone;
        let at = self.player.at;

        // Collect an uncollected item object on this cell.
        let item_object = self.zones.get(&zone).and_then(|z| {
            if z.collected.contains(&at) {
                return None;
            }
            z.objects
                .iter()
                .find(|o| o.point() == at && o.is_item())
                .and_then(|o| o.contained_item())
        });
        if let Some(item) = item_object {
            debug!(%item, %zone, %at, "collected item object");
            self.player.inventory.push(item);
            if let Some(z) = self.zones.get_mut(&zone) {
                z.collected.insert(at);
            }
        }

        // Collect an uncollected embedded item tile.
        let tile_item = self.zones.get(&zone).and_then(|z| {
            if z.collected.contains(&at) {
                return None;
            }
            z.tile(TileLayer::Middle, at).filter(|t| {
                self.tile_defs
                    .get(t)
                    .is_some_and(|f| f.contains(TileFlags::ITEM))
            })
        });
        if let Some(tile) = tile_item {
            debug!(%tile, %zone, %at, "collected item tile");
            self.player.inventory.push(ItemId(tile.0));
            if let Some(z) = self.zones.get_mut(&zone) {
                z.collected.insert(at);
                let idx = z.cell_index(at);
                if let Some(idx) = idx {
                    z.layers[TileLayer::Middle.index()][idx] = None;
                }
            }
        }

        // Standing on a door/teleporter follows it.
        if !follow_passage {
            return;
        }
        let passage = self
            .zones
            .get(&zone)
            .and_then(|z| z.objects.iter().find(|o| o.point() == at && o.is_passage()))
            .and_then(|o| o.destination_zone());
        if let Some(dest) = passage {
            if dest != zone && self.zones.contains_key(&dest) {
                let entry = self.arrival_point(dest);
                debug!(from = %zone, to = %dest, "passage taken");
                self.transition(dest, entry);
            }
        }
    }

    fn edge_entry(&self, next: ZoneId, exit: Direction, target: Point) -> Point {
        let dims = self
            .zones
            .get(&next)
            .map(|z| z.dims)
            .unwrap_or(ZoneDimensions::new(1, 1));
        let clamp = |v: i32, max: u32| v.clamp(0, max.saturating_sub(1) as i32);
        match exit {
            Direction::East => Point::new(0, clamp(target.y, dims.height)),
            Direction::West => Point::new(dims.width as i32 - 1, clamp(target.y, dims.height)),
            Direction::South => Point::new(clamp(target.x, dims.width), 0),
            Direction::North => Point::new(clamp(target.x, dims.width), dims.height as i32 - 1),
        }
    }

    fn arrival_point(&self, zone: ZoneId) -> Point {
        let Some(z) = self.zones.get(&zone) else {
            return Point::ORIGIN;
        };
        if let Some(entry) = z.entry {
            return entry;
        }
        Point::new(z.dims.width as i32 / 2, z.dims.height as i32 / 2)
    }

    fn npc_at(&self, zone: ZoneId, at: Point) -> Option<NpcState> {
        self.zones
            .get(&zone)?
            .npcs
            .iter()
            .find(|n| n.point() == at && n.is_alive() && n.is_enabled())
            .copied()
    }

    fn cell_walkable(&self, zone: ZoneId, at: Point) -> bool {
        let Some(z) = self.zones.get(&zone) else {
            return false;
        };
        if !z.dims.contains(at) {
            return false;
        }
        if let Some(tile) = z.tile(TileLayer::Middle, at) {
            let flags = self.tile_defs.get(&tile).copied().unwrap_or_default();
            if flags.blocks_walking() {
                return false;
            }
        }
        !z.npcs.iter().any(|n| n.point() == at && n.blocks_movement())
    }
}

impl GameWorld for ScriptedWorld {
    fn player_zone(&self) -> ZoneId {
        self.player.zone
    }

    fn player_point(&self) -> Point {
        self.player.at
    }

    fn inventory(&self) -> &[ItemId] {
        &self.player.inventory
    }

    fn selected_item(&self) -> Option<ItemId> {
        self.player.selected
    }

    fn select_item(&mut self, item: Option<ItemId>) {
        self.player.selected = item;
    }

    fn mission_won(&self) -> bool {
        let Some(objective) = self.map.objective_zone() else {
            return false;
        };
        self.zone_solved(objective) && self.player.zone == self.map.home_zone()
    }

    fn mission_lost(&self) -> bool {
        self.lost
    }

    fn zone_dimensions(&self, zone: ZoneId) -> ZoneDimensions {
        self.zones
            .get(&zone)
            .map(|z| z.dims)
            .unwrap_or(ZoneDimensions::new(0, 0))
    }

    fn tile(&self, zone: ZoneId, layer: TileLayer, at: Point) -> Option<TileId> {
        self.zones.get(&zone)?.tile(layer, at)
    }

    fn tile_flags(&self, tile: TileId) -> TileFlags {
        self.tile_defs.get(&tile).copied().unwrap_or_default()
    }

    fn objects(&self, zone: ZoneId) -> &[ZoneObject] {
        self.zones.get(&zone).map(|z| z.objects.as_slice()).unwrap_or(&[])
    }

    fn npcs(&self, zone: ZoneId) -> &[NpcState] {
        self.zones.get(&zone).map(|z| z.npcs.as_slice()).unwrap_or(&[])
    }

    fn object_collected(&self, zone: ZoneId, at: Point) -> bool {
        self.zones
            .get(&zone)
            .is_some_and(|z| z.collected.contains(&at))
    }

    fn zone_solved(&self, zone: ZoneId) -> bool {
        self.zones.get(&zone).is_some_and(|z| z.solved)
    }
}
