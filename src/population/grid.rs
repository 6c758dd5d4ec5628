//! Grid population manager
//!
//! Organisms live on a fixed width x height toroidal grid; slot index
//! `id = y * width + x`. Offspring are placed in the parent's Moore
//! neighborhood (the 8 surrounding cells plus the parent's own, wrapped at the
//! edges), so lineages spread locally instead of mixing globally.

use std::collections::BTreeSet;

use rand::Rng;

use crate::error::{ConfigError, ConfigResult};
use crate::organism::Organism;
use crate::population::PopulationManager;

/// Population manager with toroidal grid topology.
#[derive(Clone, Debug)]
pub struct GridManager<O: Organism> {
    slots: Vec<Option<O>>,
    width: usize,
    height: usize,
}

impl<O: Organism> GridManager<O> {
    /// Create an empty `width` x `height` grid.
    pub fn new(width: usize, height: usize) -> ConfigResult<Self> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyGrid { width, height });
        }
        let mut slots = Vec::new();
        slots.resize_with(width * height, || None);
        Ok(Self {
            slots,
            width,
            height,
        })
    }

    /// Grid width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Column of a slot index.
    pub fn to_x(&self, id: usize) -> usize {
        id % self.width
    }

    /// Row of a slot index.
    pub fn to_y(&self, id: usize) -> usize {
        id / self.width
    }

    /// Slot index of a coordinate pair.
    pub fn to_id(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Slot index of a coordinate pair after toroidal wrapping.
    fn wrapped_id(&self, x: isize, y: isize) -> usize {
        let x = x.rem_euclid(self.width as isize) as usize;
        let y = y.rem_euclid(self.height as isize) as usize;
        self.to_id(x, y)
    }

    /// Indices of the currently empty slots.
    pub fn empty_slots(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| if s.is_none() { Some(i) } else { None })
            .collect()
    }

    /// The up-to-8 cells surrounding `id`, wrapped toroidally.
    ///
    /// Deduplicated (small grids wrap neighbors onto each other) and excluding
    /// the focal cell itself; returned in ascending index order.
    pub fn neighbors(&self, id: usize) -> Vec<usize> {
        assert!(id < self.slots.len(), "grid index {} out of range", id);
        let x = self.to_x(id) as isize;
        let y = self.to_y(id) as isize;

        let mut cells = BTreeSet::new();
        for dy in -1..=1 {
            for dx in -1..=1 {
                cells.insert(self.wrapped_id(x + dx, y + dy));
            }
        }
        cells.remove(&id);
        cells.into_iter().collect()
    }

    /// Every cell reachable from `id` within `depth` neighbor steps.
    ///
    /// A breadth-first flood fill over the 8-neighborhood, deduplicated and
    /// excluding the focal cell; returned in ascending index order.
    pub fn cluster(&self, id: usize, depth: usize) -> Vec<usize> {
        assert!(id < self.slots.len(), "grid index {} out of range", id);
        let mut seen = BTreeSet::new();
        seen.insert(id);
        let mut frontier = vec![id];

        for _ in 0..depth {
            let mut next = Vec::new();
            for cell in frontier {
                for n in self.neighbors(cell) {
                    if seen.insert(n) {
                        next.push(n);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        seen.remove(&id);
        seen.into_iter().collect()
    }
}

impl<O: Organism> PopulationManager<O> for GridManager<O> {
    fn slots(&self) -> &[Option<O>] {
        &self.slots
    }

    fn slots_mut(&mut self) -> &mut Vec<Option<O>> {
        &mut self.slots
    }

    /// Injected organisms go into a uniformly random empty cell; once the grid
    /// is full, into a uniformly random cell, replacing its occupant.
    fn add_org<R: Rng>(&mut self, org: O, rng: &mut R) -> usize {
        let empty = self.empty_slots();
        let pos = if empty.is_empty() {
            rng.gen_range(0..self.slots.len())
        } else {
            empty[rng.gen_range(0..empty.len())]
        };
        self.slots[pos] = Some(org);
        pos
    }

    /// Newly born organisms land next to their parent: one of the 9 cells of
    /// the parent's Moore neighborhood (its own included), wrapped toroidally.
    fn add_org_birth<R: Rng>(&mut self, org: O, parent_slot: usize, rng: &mut R) -> usize {
        assert!(
            parent_slot < self.slots.len(),
            "parent slot {} out of range",
            parent_slot
        );
        let parent_x = self.to_x(parent_slot) as isize;
        let parent_y = self.to_y(parent_slot) as isize;
        let offset = rng.gen_range(0..9) as isize;
        let pos = self.wrapped_id(parent_x + offset % 3 - 1, parent_y + offset / 3 - 1);

        self.slots[pos] = Some(org);
        pos
    }

    /// Destroy all organisms; the grid itself keeps its shape.
    fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }
}
