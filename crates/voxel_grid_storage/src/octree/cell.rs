use voxel_grid_core::prelude::*;

/// An index into a `CellArena`.
pub type CellId = u32;

/// What a cell holds: either one value for its whole octant, or up to 8 children.
///
/// An absent child reads as `State::Outside`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CellContents<C> {
    Homogeneous(C),
    Mixed([Option<CellId>; 8]),
}

/// One node of an `OctreeGrid`. The root is at level 1 and terminal cells, which cover a single voxel, are at the grid's
/// maximum level.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OctreeCell<C> {
    pub octant: Octant,
    pub level: u8,
    pub contents: CellContents<C>,
}

impl<C: Copy> OctreeCell<C> {
    #[inline]
    pub fn homogeneous_value(&self) -> Option<C> {
        match self.contents {
            CellContents::Homogeneous(v) => Some(v),
            CellContents::Mixed(_) => None,
        }
    }

    #[inline]
    pub fn children(&self) -> Option<&[Option<CellId>; 8]> {
        match &self.contents {
            CellContents::Homogeneous(_) => None,
            CellContents::Mixed(children) => Some(children),
        }
    }
}

/// Storage for octree cells. Freed slots are reused before the arena grows.
#[derive(Clone, Debug)]
pub struct CellArena<C> {
    cells: Vec<OctreeCell<C>>,
    free_list: Vec<CellId>,
}

impl<C: Copy> CellArena<C> {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            free_list: Vec::new(),
        }
    }

    pub fn alloc(&mut self, cell: OctreeCell<C>) -> CellId {
        if let Some(id) = self.free_list.pop() {
            self.cells[id as usize] = cell;
            id
        } else {
            self.cells.push(cell);
            (self.cells.len() - 1) as CellId
        }
    }

    /// The slot for `id` may be reused by the next `alloc`.
    pub fn free(&mut self, id: CellId) {
        debug_assert!(!self.free_list.contains(&id));
        self.free_list.push(id);
    }

    /// The number of cells that have been allocated and not freed.
    #[inline]
    pub fn num_live(&self) -> usize {
        self.cells.len() - self.free_list.len()
    }

    #[inline]
    pub fn get(&self, id: CellId) -> &OctreeCell<C> {
        &self.cells[id as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: CellId) -> &mut OctreeCell<C> {
        &mut self.cells[id as usize]
    }
}

impl<C: Copy> Default for CellArena<C> {
    fn default() -> Self {
        Self::new()
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
