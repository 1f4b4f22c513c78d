//! The static world map handed over by the mission generator.
//!
//! A rectangular grid of zone ids (not every cell is populated) plus the
//! mission metadata the agent needs: where home is, which zone completes the
//! mission, which item the mission giver hands out, and who the mission giver
//! is. Zone adjacency falls out of grid adjacency.
use std::collections::HashSet;

use crate::ids::{ItemId, NpcId, ZoneId};
use crate::position::Direction;

/// Errors from [`WorldMap::new`] validation.
#[derive(Debug, thiserror::Error)]
pub enum WorldMapError {
    #[error("grid has {found} cells, expected {expected} ({width}x{height})")]
    GridSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        found: usize,
    },
    #[error("{0} appears in more than one grid cell")]
    DuplicateZone(ZoneId),
    #[error("home {0} is not placed in the grid")]
    HomeNotInGrid(ZoneId),
    #[error("objective {0} is not placed in the grid")]
    ObjectiveNotInGrid(ZoneId),
}

/// Zone connectivity and mission metadata, immutable for the whole run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldMap {
    width: u32,
    height: u32,
    /// Row-major zone grid; `None` for empty world cells.
    cells: Vec<Option<ZoneId>>,
    home: ZoneId,
    objective: Option<ZoneId>,
    starting_item: Option<ItemId>,
    home_npc: Option<NpcId>,
}

impl WorldMap {
    /// Builds and validates a map from a row-major zone grid.
    pub fn new(
        width: u32,
        height: u32,
        cells: Vec<Option<ZoneId>>,
        home: ZoneId,
    ) -> Result<Self, WorldMapError> {
        let expected = (width as usize) * (height as usize);
        if cells.len() != expected {
            return Err(WorldMapError::GridSizeMismatch {
                width,
                height,
                expected,
                found: cells.len(),
            });
        }
        let mut seen = HashSet::new();
        for zone in cells.iter().flatten() {
            if !seen.insert(*zone) {
                return Err(WorldMapError::DuplicateZone(*zone));
            }
        }
        if !seen.contains(&home) {
            return Err(WorldMapError::HomeNotInGrid(home));
        }
        Ok(Self {
            width,
            height,
            cells,
            home,
            objective: None,
            starting_item: None,
            home_npc: None,
        })
    }

    /// A 1x1 map holding only `zone`, which doubles as home. Test fixture.
    pub fn single_zone(zone: ZoneId) -> Self {
        Self {
            width: 1,
            height: 1,
            cells: vec![Some(zone)],
            home: zone,
            objective: None,
            starting_item: None,
            home_npc: None,
        }
    }

    pub fn with_objective(mut self, zone: ZoneId) -> Result<Self, WorldMapError> {
        if self.index_of(zone).is_none() {
            return Err(WorldMapError::ObjectiveNotInGrid(zone));
        }
        self.objective = Some(zone);
        Ok(self)
    }

    pub fn with_starting_item(mut self, item: ItemId) -> Self {
        self.starting_item = Some(item);
        self
    }

    pub fn with_home_npc(mut self, npc: NpcId) -> Self {
        self.home_npc = Some(npc);
        self
    }

    pub fn home_zone(&self) -> ZoneId {
        self.home
    }

    pub fn objective_zone(&self) -> Option<ZoneId> {
        self.objective
    }

    pub fn starting_item(&self) -> Option<ItemId> {
        self.starting_item
    }

    pub fn home_npc(&self) -> Option<NpcId> {
        self.home_npc
    }

    pub fn contains(&self, zone: ZoneId) -> bool {
        self.index_of(zone).is_some()
    }

    /// The zone one grid cell over in `direction`, if populated.
    pub fn neighbor(&self, zone: ZoneId, direction: Direction) -> Option<ZoneId> {
        let idx = self.index_of(zone)?;
        let x = (idx % self.width as usize) as i32;
        let y = (idx / self.width as usize) as i32;
        let (dx, dy) = direction.delta();
        let (nx, ny) = (x + dx, y + dy);
        if nx < 0 || ny < 0 || nx >= self.width as i32 || ny >= self.height as i32 {
            return None;
        }
        self.cells[ny as usize * self.width as usize + nx as usize]
    }

    /// All zones in row-major grid order.
    pub fn zones(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.cells.iter().flatten().copied()
    }

    fn index_of(&self, zone: ZoneId) -> Option<usize> {
        self.cells.iter().position(|c| *c == Some(zone))
    }
}
