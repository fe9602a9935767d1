//! Block-sparse backends.
//!
//! The grid is partitioned into cubic blocks with edge length `2^order`. Storage for a block is only allocated when something
//! is written into it, and unallocated blocks read as `VoxelData::OUTSIDE`.
//!
//! - `BlockGrid` stores one packed cell per voxel in each allocated block.
//! - `TwoBitBlockGrid` stores only states, 2 bits per voxel, and keeps blocks of a single state as one value.
//!
//! ```
//! use voxel_grid_core::prelude::*;
//! use voxel_grid_storage::prelude::*;
//!
//! let geom = GridGeometry::new(PointN([100, 50, 100]), 0.1, 0.1).unwrap();
//! let mut grid = BlockGridShort::with_block_order(geom, 3).unwrap();
//!
//! grid.set_data(PointN([10, 20, 30]), VoxelData::new(State::Interior, 77)).unwrap();
//! assert_eq!(grid.num_allocated_blocks(), 1);
//! assert_eq!(grid.find_count(VoxelClass::Interior), 1);
//! assert_eq!(grid.find_count(VoxelClass::Outside), 100 * 50 * 100 - 1);
//! ```

mod indexer;
mod two_bit;

pub use indexer::*;
pub use two_bit::*;

use crate::{
    scan_grid, BytePacking, Grid, PackingPolicy, ShortPacking, VisitStatus, VoxelVisitor,
};

use voxel_grid_core::prelude::*;

use core::marker::PhantomData;

/// The block order used when none is given.
pub const DEFAULT_BLOCK_ORDER: u32 = 4;

/// A block-sparse grid with one `P::Cell` per voxel in each allocated block.
#[derive(Clone, Debug)]
pub struct BlockGrid<P: PackingPolicy> {
    geometry: GridGeometry,
    indexer: BlockIndexer,
    blocks: Vec<Option<Box<[P::Cell]>>>,
    marker: PhantomData<P>,
}

pub type BlockGridByte = BlockGrid<BytePacking>;
pub type BlockGridShort = BlockGrid<ShortPacking>;

impl<P: PackingPolicy> BlockGrid<P> {
    pub fn new(geometry: GridGeometry) -> Result<Self, GridError> {
        Self::with_block_order(geometry, DEFAULT_BLOCK_ORDER)
    }

    pub fn with_block_order(geometry: GridGeometry, order: u32) -> Result<Self, GridError> {
        let indexer = BlockIndexer::new(geometry.shape(), order)?;
        let num_blocks = indexer.num_blocks();
        tracing::debug!(
            policy = P::NAME,
            shape = ?geometry.shape(),
            order,
            num_blocks,
            "creating block grid"
        );

        Ok(Self {
            geometry,
            indexer,
            blocks: vec![None; num_blocks],
            marker: PhantomData,
        })
    }

    #[inline]
    pub fn indexer(&self) -> &BlockIndexer {
        &self.indexer
    }

    pub fn block_order(&self) -> u32 {
        self.indexer.block_shape().order() as u32
    }

    pub fn num_allocated_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_some()).count()
    }

    #[inline]
    fn get_cell(&self, p: Point3i) -> P::Cell {
        if !self.geometry.contains(p) {
            return P::outside();
        }

        self.blocks[self.indexer.block_id(p)]
            .as_ref()
            .map(|block| block[self.indexer.local_index(p)])
            .unwrap_or_else(P::outside)
    }

    /// The cell at `p`, allocating its block if necessary. `p` must be in the grid.
    #[inline]
    fn get_cell_mut(&mut self, p: Point3i) -> &mut P::Cell {
        let id = self.indexer.block_id(p);
        let local = self.indexer.local_index(p);
        let volume = self.indexer.block_shape().volume();
        let block = self.blocks[id].get_or_insert_with(|| {
            tracing::trace!(block = id, "allocating block");
            vec![P::outside(); volume].into_boxed_slice()
        });

        &mut block[local]
    }

    /// Visits the voxels of allocated blocks that are in the grid and match `class`, in block id order.
    fn visit_allocated(&self, class: VoxelClass, visitor: &mut VoxelVisitor<'_>) -> VisitStatus {
        for (id, block) in self.blocks.iter().enumerate() {
            let block = match block {
                Some(b) => b,
                None => continue,
            };
            for (local, cell) in block.iter().enumerate() {
                let data = P::decode(*cell);
                if !class.matches(data.state) {
                    continue;
                }
                let p = self.indexer.voxel_coords(id, local);
                if self.geometry.contains(p) && visitor(p, data).is_exit() {
                    return VisitStatus::ExitEarly;
                }
            }
        }

        VisitStatus::Continue
    }
}

impl<P: PackingPolicy> Grid for BlockGrid<P> {
    fn backend_name(&self) -> &'static str {
        "block"
    }

    #[inline]
    fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    #[inline]
    fn get_data(&self, p: Point3i) -> VoxelData {
        P::decode(self.get_cell(p))
    }

    fn set_data(&mut self, p: Point3i, data: VoxelData) -> Result<(), GridError> {
        self.geometry.check_contains(p)?;

        if data.is_outside() && self.blocks[self.indexer.block_id(p)].is_none() {
            // Already outside.
            return Ok(());
        }
        *self.get_cell_mut(p) = P::encode(data);

        Ok(())
    }

    /// Only `State::Outside` and `State::Interior` can be set alone. `Interior` keeps the current attribute.
    fn set_state(&mut self, p: Point3i, state: State) -> Result<(), GridError> {
        match state {
            State::Outside => self.set_data(p, VoxelData::OUTSIDE),
            State::Interior => {
                self.geometry.check_contains(p)?;
                let cell = self.get_cell_mut(p);
                *cell = P::combine(state, P::extract_attribute(*cell));

                Ok(())
            }
            State::Exterior | State::UserDefined => Err(GridError::UnhandledState {
                state: state.to_bits(),
            }),
        }
    }

    fn set_attribute(&mut self, p: Point3i, attribute: Attribute) -> Result<(), GridError> {
        self.geometry.check_contains(p)?;
        let cell = self.get_cell_mut(p);
        *cell = P::update_attribute(*cell, attribute);

        Ok(())
    }

    fn create_empty(
        &self,
        shape: Point3i,
        pixel_size: f64,
        slice_height: f64,
    ) -> Result<Box<dyn Grid>, GridError> {
        let geometry = GridGeometry::new(shape, pixel_size, slice_height)?;

        Ok(Box::new(Self::with_block_order(
            geometry,
            self.block_order(),
        )?))
    }

    fn clone_grid(&self) -> Box<dyn Grid> {
        Box::new(self.clone())
    }

    fn find_interruptible(&self, class: VoxelClass, visitor: &mut VoxelVisitor<'_>) -> VisitStatus {
        if class.includes_outside() {
            scan_grid(self, class, visitor)
        } else {
            self.visit_allocated(class, visitor)
        }
    }

    fn find_count(&self, class: VoxelClass) -> u64 {
        let mut count = 0;
        match class {
            VoxelClass::All => return self.geometry.num_voxels(),
            VoxelClass::Outside => {
                self.visit_allocated(VoxelClass::Marked, &mut |_, _| {
                    count += 1;
                    VisitStatus::Continue
                });
                return self.geometry.num_voxels() - count;
            }
            _ => {
                self.visit_allocated(class, &mut |_, _| {
                    count += 1;
                    VisitStatus::Continue
                });
            }
        }

        count
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;

    fn geometry() -> GridGeometry {
        GridGeometry::new(PointN([10, 6, 9]), 1.0, 1.0).unwrap()
    }

    #[test]
    fn reads_never_allocate() {
        let grid = BlockGridByte::with_block_order(geometry(), 2).unwrap();

        for p in grid.geometry().extent().iter_points() {
            assert_eq!(grid.get_data(p), VoxelData::OUTSIDE);
        }
        assert_eq!(grid.get_data(PointN([100, 0, 0])), VoxelData::OUTSIDE);
        assert_eq!(grid.num_allocated_blocks(), 0);
    }

    #[test]
    fn writing_outside_into_vacant_block_does_not_allocate() {
        let mut grid = BlockGridByte::with_block_order(geometry(), 2).unwrap();

        grid.set_data(PointN([1, 1, 1]), VoxelData::new(State::Outside, 5))
            .unwrap();
        assert_eq!(grid.num_allocated_blocks(), 0);

        grid.set_data(PointN([1, 1, 1]), VoxelData::new(State::Exterior, 5))
            .unwrap();
        assert_eq!(grid.num_allocated_blocks(), 1);

        // Blocks are never freed.
        grid.set_data(PointN([1, 1, 1]), VoxelData::OUTSIDE).unwrap();
        assert_eq!(grid.num_allocated_blocks(), 1);
        assert_eq!(grid.get_data(PointN([1, 1, 1])), VoxelData::OUTSIDE);
    }

    #[test]
    fn set_state_only_accepts_outside_and_interior() {
        let mut grid = BlockGridShort::new(geometry()).unwrap();
        let p = PointN([9, 5, 8]);

        grid.set_data(p, VoxelData::new(State::Exterior, 12)).unwrap();
        grid.set_state(p, State::Interior).unwrap();
        assert_eq!(grid.get_data(p), VoxelData::new(State::Interior, 12));

        assert_eq!(
            grid.set_state(p, State::Exterior),
            Err(GridError::UnhandledState { state: 1 })
        );
        assert_eq!(
            grid.set_state(p, State::UserDefined),
            Err(GridError::UnhandledState { state: 3 })
        );

        grid.set_state(p, State::Outside).unwrap();
        assert_eq!(grid.get_data(p), VoxelData::OUTSIDE);
    }

    #[test]
    fn set_attribute_allocates_and_keeps_state() {
        let mut grid = BlockGridShort::new(geometry()).unwrap();
        let p = PointN([2, 3, 4]);

        grid.set_attribute(p, 3).unwrap();
        assert_eq!(grid.num_allocated_blocks(), 1);
        assert_eq!(grid.get_data(p), VoxelData::OUTSIDE);

        grid.set_data(p, VoxelData::new(State::Interior, 1)).unwrap();
        grid.set_attribute(p, 3).unwrap();
        assert_eq!(grid.get_data(p), VoxelData::new(State::Interior, 3));
    }

    #[test]
    fn traversal_skips_padding() {
        // With order 2 the last block along X covers x in [8, 12), but the grid stops at 10.
        let mut grid = BlockGridByte::with_block_order(geometry(), 2).unwrap();
        let points = [PointN([9, 0, 0]), PointN([0, 5, 8]), PointN([4, 4, 4])];
        for p in points.iter() {
            grid.set_data(*p, VoxelData::new(State::Interior, 2)).unwrap();
        }

        let mut found = Vec::new();
        grid.find(VoxelClass::Marked, &mut |p, _| found.push(p));
        found.sort_by_key(|p| (p.y(), p.x(), p.z()));
        assert_eq!(
            found,
            vec![PointN([9, 0, 0]), PointN([4, 4, 4]), PointN([0, 5, 8])]
        );

        assert_eq!(grid.find_count(VoxelClass::All), 10 * 6 * 9);
        assert_eq!(grid.find_count(VoxelClass::Outside), 10 * 6 * 9 - 3);

        let mut outside = 0;
        grid.find(VoxelClass::Outside, &mut |_, _| outside += 1);
        assert_eq!(outside, 10 * 6 * 9 - 3);
    }

    #[test]
    fn create_empty_keeps_block_order() {
        let grid = BlockGridByte::with_block_order(geometry(), 3).unwrap();
        let empty = grid.create_empty(PointN([4, 4, 4]), 0.5, 0.5).unwrap();

        assert_eq!(empty.backend_name(), "block");
        assert_eq!(empty.geometry().shape(), PointN([4, 4, 4]));
        assert_eq!(empty.find_count(VoxelClass::Marked), 0);
    }
}
