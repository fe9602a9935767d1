use super::{BlockAddressing, ShiftBlockIndexer, DEFAULT_BLOCK_ORDER};
use crate::{scan_grid, visit_region, Grid, VisitStatus, VoxelVisitor};

use voxel_grid_core::prelude::*;

/// A dense array of 2-bit states, 4 per byte.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TwoBitArray {
    bytes: Box<[u8]>,
}

impl TwoBitArray {
    /// An array of `len` states, all equal to `state`. `len` must be a multiple of 4.
    pub fn filled(len: usize, state: State) -> Self {
        debug_assert_eq!(len % 4, 0);

        Self {
            bytes: vec![replicate(state); len / 4].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() * 4
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> State {
        State::from_bits_truncate(self.bytes[i >> 2] >> ((i & 3) << 1))
    }

    #[inline]
    pub fn set(&mut self, i: usize, state: State) {
        let shift = (i & 3) << 1;
        let byte = &mut self.bytes[i >> 2];
        *byte = (*byte & !(0b11 << shift)) | (state.to_bits() << shift);
    }

    /// If every element has the same state, returns it.
    pub fn uniform_state(&self) -> Option<State> {
        let first = *self.bytes.first()?;
        let state = State::from_bits_truncate(first);
        if self.bytes.iter().all(|b| *b == replicate(state)) {
            Some(state)
        } else {
            None
        }
    }
}

/// A byte holding 4 copies of `state`.
#[inline]
fn replicate(state: State) -> u8 {
    state.to_bits() * 0b0101_0101
}

/// The storage for one block of a `TwoBitBlockGrid`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TwoBitBlock {
    /// Every voxel in the block has this state.
    Uniform(State),
    Packed(TwoBitArray),
}

impl TwoBitBlock {
    #[inline]
    pub fn get(&self, local: usize) -> State {
        match self {
            TwoBitBlock::Uniform(s) => *s,
            TwoBitBlock::Packed(a) => a.get(local),
        }
    }
}

impl Default for TwoBitBlock {
    fn default() -> Self {
        TwoBitBlock::Uniform(State::Outside)
    }
}

/// A block-sparse grid that stores 2 bits of state per voxel and no attributes.
///
/// Every voxel reads with `NO_MATERIAL`, and the attribute given to `set_data` is ignored. Blocks start out uniformly
/// `State::Outside` and are promoted to a packed array on the first write of a different state. `compact` demotes packed
/// blocks that have become uniform again.
///
/// Voxels must be cubic.
///
/// ```
/// use voxel_grid_core::prelude::*;
/// use voxel_grid_storage::prelude::*;
///
/// let geom = GridGeometry::new(Point3i::fill(32), 0.5, 0.5).unwrap();
/// let mut grid = TwoBitBlockGrid::new(geom).unwrap();
///
/// grid.set_data(PointN([1, 2, 3]), VoxelData::new(State::Exterior, 99)).unwrap();
/// assert_eq!(grid.get_data(PointN([1, 2, 3])), VoxelData::new(State::Exterior, NO_MATERIAL));
/// assert_eq!(grid.num_packed_blocks(), 1);
///
/// grid.set_state(PointN([1, 2, 3]), State::Outside).unwrap();
/// assert_eq!(grid.compact(), 1);
/// assert_eq!(grid.num_packed_blocks(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct TwoBitBlockGrid {
    geometry: GridGeometry,
    indexer: ShiftBlockIndexer,
    blocks: Vec<TwoBitBlock>,
}

impl TwoBitBlockGrid {
    pub const BACKEND_NAME: &'static str = "two_bit_block";

    pub fn new(geometry: GridGeometry) -> Result<Self, GridError> {
        Self::with_block_order(geometry, DEFAULT_BLOCK_ORDER)
    }

    pub fn with_block_order(geometry: GridGeometry, order: u32) -> Result<Self, GridError> {
        geometry.require_cubic(Self::BACKEND_NAME)?;
        let indexer = ShiftBlockIndexer::new(geometry.shape(), order)?;
        let num_blocks = indexer.num_blocks();
        tracing::debug!(
            shape = ?geometry.shape(),
            order,
            num_blocks,
            "creating two bit block grid"
        );

        Ok(Self {
            geometry,
            indexer,
            blocks: vec![TwoBitBlock::default(); num_blocks],
        })
    }

    pub fn block_order(&self) -> u32 {
        self.indexer.block_shape().order() as u32
    }

    #[inline]
    pub fn indexer(&self) -> &ShiftBlockIndexer {
        &self.indexer
    }

    pub fn num_packed_blocks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, TwoBitBlock::Packed(_)))
            .count()
    }

    /// Demotes every packed block whose voxels all have the same state. Returns the number of blocks demoted.
    pub fn compact(&mut self) -> usize {
        let mut demoted = 0;
        for block in self.blocks.iter_mut() {
            let uniform = match block {
                TwoBitBlock::Packed(a) => a.uniform_state(),
                TwoBitBlock::Uniform(_) => None,
            };
            if let Some(state) = uniform {
                *block = TwoBitBlock::Uniform(state);
                demoted += 1;
            }
        }
        tracing::debug!(demoted, "compacted two bit block grid");

        demoted
    }

    #[inline]
    fn get_state_unchecked(&self, p: Point3i) -> State {
        self.blocks[self.indexer.block_id(p)].get(self.indexer.local_index(p))
    }

    fn visit_blocks(&self, class: VoxelClass, visitor: &mut VoxelVisitor<'_>) -> VisitStatus {
        for (id, block) in self.blocks.iter().enumerate() {
            match block {
                TwoBitBlock::Uniform(state) => {
                    let value = VoxelData::new(*state, NO_MATERIAL);
                    let extent = self.indexer.block_extent(id);
                    if visit_region(&self.geometry, &extent, value, class, visitor).is_exit() {
                        return VisitStatus::ExitEarly;
                    }
                }
                TwoBitBlock::Packed(array) => {
                    for local in 0..array.len() {
                        let state = array.get(local);
                        if !class.matches(state) {
                            continue;
                        }
                        let p = self.indexer.voxel_coords(id, local);
                        if self.geometry.contains(p)
                            && visitor(p, VoxelData::new(state, NO_MATERIAL)).is_exit()
                        {
                            return VisitStatus::ExitEarly;
                        }
                    }
                }
            }
        }

        VisitStatus::Continue
    }
}

impl Grid for TwoBitBlockGrid {
    fn backend_name(&self) -> &'static str {
        Self::BACKEND_NAME
    }

    #[inline]
    fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    #[inline]
    fn get_data(&self, p: Point3i) -> VoxelData {
        if !self.geometry.contains(p) {
            return VoxelData::OUTSIDE;
        }

        VoxelData::new(self.get_state_unchecked(p), NO_MATERIAL)
    }

    /// Stores `data.state`. The attribute is ignored.
    fn set_data(&mut self, p: Point3i, data: VoxelData) -> Result<(), GridError> {
        self.geometry.check_contains(p)?;

        let id = self.indexer.block_id(p);
        let local = self.indexer.local_index(p);
        let volume = self.indexer.block_shape().volume();
        let block = &mut self.blocks[id];
        match block {
            TwoBitBlock::Uniform(s) if *s == data.state => {}
            TwoBitBlock::Uniform(s) => {
                tracing::trace!(block = id, "packing uniform block");
                let mut array = TwoBitArray::filled(volume, *s);
                array.set(local, data.state);
                *block = TwoBitBlock::Packed(array);
            }
            TwoBitBlock::Packed(array) => array.set(local, data.state),
        }

        Ok(())
    }

    fn set_state(&mut self, p: Point3i, state: State) -> Result<(), GridError> {
        self.set_data(p, VoxelData::new(state, NO_MATERIAL))
    }

    fn set_attribute(&mut self, _p: Point3i, _attribute: Attribute) -> Result<(), GridError> {
        Err(GridError::Unsupported {
            operation: "set_attribute",
            backend: Self::BACKEND_NAME,
        })
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
            self.visit_blocks(class, visitor)
        }
    }

    fn find_count(&self, class: VoxelClass) -> u64 {
        let count_matching = |class: VoxelClass| {
            let mut count: u64 = 0;
            self.visit_blocks(class, &mut |_, _| {
                count += 1;
                VisitStatus::Continue
            });
            count
        };

        match class {
            VoxelClass::All => self.geometry.num_voxels(),
            VoxelClass::Outside => self.geometry.num_voxels() - count_matching(VoxelClass::Marked),
            _ => count_matching(class),
        }
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

    #[test]
    fn two_bit_array_get_set() {
        let mut array = TwoBitArray::filled(16, State::Interior);
        assert_eq!(array.uniform_state(), Some(State::Interior));

        array.set(5, State::UserDefined);
        array.set(6, State::Outside);
        assert_eq!(array.get(4), State::Interior);
        assert_eq!(array.get(5), State::UserDefined);
        assert_eq!(array.get(6), State::Outside);
        assert_eq!(array.get(7), State::Interior);
        assert_eq!(array.uniform_state(), None);

        array.set(5, State::Interior);
        array.set(6, State::Interior);
        assert_eq!(array.uniform_state(), Some(State::Interior));
    }

    #[test]
    fn non_cubic_voxels_are_rejected() {
        let geom = GridGeometry::new(Point3i::fill(8), 1.0, 0.5).unwrap();

        assert!(matches!(
            TwoBitBlockGrid::new(geom),
            Err(GridError::NonCubicVoxels { .. })
        ));
    }

    #[test]
    fn attributes_are_not_stored() {
        let geom = GridGeometry::new(PointN([9, 3, 17]), 1.0, 1.0).unwrap();
        let mut grid = TwoBitBlockGrid::with_block_order(geom, 2).unwrap();
        let p = PointN([8, 2, 16]);

        grid.set_data(p, VoxelData::new(State::Interior, 7)).unwrap();
        assert_eq!(grid.get_data(p), VoxelData::new(State::Interior, NO_MATERIAL));
        assert_eq!(
            grid.set_attribute(p, 7),
            Err(GridError::Unsupported {
                operation: "set_attribute",
                backend: "two_bit_block",
            })
        );
    }

    #[test]
    fn uniform_writes_do_not_pack() {
        let geom = GridGeometry::new(Point3i::fill(8), 1.0, 1.0).unwrap();
        let mut grid = TwoBitBlockGrid::with_block_order(geom, 2).unwrap();

        grid.set_state(PointN([0, 0, 0]), State::Outside).unwrap();
        assert_eq!(grid.num_packed_blocks(), 0);

        // Fill one whole block, then compact it back to a single state.
        let block = Extent3i::from_min_and_shape(PointN([4, 0, 4]), Point3i::fill(4));
        for p in block.iter_points() {
            grid.set_state(p, State::Exterior).unwrap();
        }
        assert_eq!(grid.num_packed_blocks(), 1);
        assert_eq!(grid.compact(), 1);
        assert_eq!(grid.num_packed_blocks(), 0);
        assert_eq!(grid.compact(), 0);

        assert_eq!(grid.find_count(VoxelClass::Exterior), 64);
        assert_eq!(grid.find_count(VoxelClass::Outside), 512 - 64);
        assert_eq!(grid.get_state(PointN([5, 3, 7])), State::Exterior);
    }

    #[test]
    fn padding_is_not_visited() {
        let geom = GridGeometry::new(PointN([5, 5, 5]), 1.0, 1.0).unwrap();
        let mut grid = TwoBitBlockGrid::with_block_order(geom, 2).unwrap();

        // The block at (4, 4, 4) only has one voxel inside of the grid.
        grid.set_state(PointN([4, 4, 4]), State::Interior).unwrap();

        let mut found = Vec::new();
        grid.find(VoxelClass::Interior, &mut |p, _| found.push(p));
        assert_eq!(found, vec![PointN([4, 4, 4])]);
    }
}
