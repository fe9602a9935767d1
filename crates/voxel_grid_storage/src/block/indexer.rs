use voxel_grid_core::prelude::*;
use voxel_grid_core::{ceil_div, ceil_log2};

use serde::{Deserialize, Serialize};

/// The smallest and largest supported block orders. A block has edge length `2^order`.
pub const MIN_BLOCK_ORDER: u32 = 1;
pub const MAX_BLOCK_ORDER: u32 = 10;

/// Maps voxel coordinates to a (block id, local index) pair and back.
///
/// Implementations only differ in how block coordinates are numbered. The layout inside of a block is always Y, X, Z.
pub trait BlockAddressing {
    fn block_shape(&self) -> &BlockShape;

    fn block_id(&self, p: Point3i) -> usize;

    /// The block coordinates (block origin divided by the block edge length) of block `id`.
    fn block_coords(&self, id: usize) -> Point3i;

    /// The number of block ids, including ids that no voxel maps to.
    fn num_blocks(&self) -> usize;

    #[inline]
    fn local_index(&self, p: Point3i) -> usize {
        self.block_shape().local_index(p)
    }

    #[inline]
    fn block_origin(&self, id: usize) -> Point3i {
        self.block_coords(id) << self.block_shape().order()
    }

    #[inline]
    fn block_extent(&self, id: usize) -> Extent3i {
        Extent3i::from_min_and_shape(
            self.block_origin(id),
            Point3i::fill(self.block_shape().edge_length()),
        )
    }

    /// The inverse of `(block_id, local_index)`.
    #[inline]
    fn voxel_coords(&self, id: usize, local: usize) -> Point3i {
        self.block_origin(id) + self.block_shape().local_offset(local)
    }
}

/// The cube of voxels covered by one block, and the number of blocks needed along each axis.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BlockShape {
    order: i32,
    mask: i32,
    block_res: Point3i,
}

impl BlockShape {
    /// Fails unless `order` is in `[MIN_BLOCK_ORDER, MAX_BLOCK_ORDER]`. Orders larger than needed to cover the whole grid
    /// with one block are clamped down to that size.
    pub fn new(grid_shape: Point3i, order: u32) -> Result<Self, GridError> {
        if !(MIN_BLOCK_ORDER..=MAX_BLOCK_ORDER).contains(&order) {
            return Err(GridError::InvalidGeometry(format!(
                "block order {} is not in [{}, {}]",
                order, MIN_BLOCK_ORDER, MAX_BLOCK_ORDER
            )));
        }
        let order = order.min(ceil_log2(grid_shape.max_component()).max(MIN_BLOCK_ORDER)) as i32;
        let edge = 1 << order;

        Ok(Self {
            order,
            mask: edge - 1,
            block_res: grid_shape.map_components(|c| ceil_div(c, edge).max(1)),
        })
    }

    #[inline]
    pub fn order(&self) -> i32 {
        self.order
    }

    #[inline]
    pub fn edge_length(&self) -> i32 {
        1 << self.order
    }

    /// The number of voxels in one block.
    #[inline]
    pub fn volume(&self) -> usize {
        1 << (3 * self.order)
    }

    /// The number of blocks along each axis, `ceil(dim / 2^order)`.
    #[inline]
    pub fn block_res(&self) -> Point3i {
        self.block_res
    }

    #[inline]
    pub fn local_index(&self, p: Point3i) -> usize {
        let o = self.order;
        let v = p & self.mask;

        (((v.y() << o) << o) + (v.x() << o) + v.z()) as usize
    }

    /// The offset from the block origin of the voxel at `local`.
    #[inline]
    pub fn local_offset(&self, local: usize) -> Point3i {
        let o = self.order;
        let local = local as i32;

        PointN([(local >> o) & self.mask, local >> (2 * o), local & self.mask])
    }
}

/// Numbers blocks densely in Y, X, Z order: `by * res_x * res_z + bx * res_z + bz`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BlockIndexer {
    shape: BlockShape,
}

impl BlockIndexer {
    pub fn new(grid_shape: Point3i, order: u32) -> Result<Self, GridError> {
        Ok(Self {
            shape: BlockShape::new(grid_shape, order)?,
        })
    }
}

impl BlockAddressing for BlockIndexer {
    #[inline]
    fn block_shape(&self) -> &BlockShape {
        &self.shape
    }

    #[inline]
    fn block_id(&self, p: Point3i) -> usize {
        let b = p >> self.shape.order;
        let res = self.shape.block_res;

        (b.y() * res.x() * res.z() + b.x() * res.z() + b.z()) as usize
    }

    #[inline]
    fn block_coords(&self, id: usize) -> Point3i {
        let res = self.shape.block_res;
        let id = id as i32;
        let layer = res.x() * res.z();
        let rem = id % layer;

        PointN([rem / res.z(), id / layer, rem % res.z()])
    }

    #[inline]
    fn num_blocks(&self) -> usize {
        self.shape.block_res.volume() as usize
    }
}

/// Numbers blocks with bit shifts: `bz + (bx << gz) + (by << (gx + gz))`, where `gx` and `gz` are the base 2 logarithms of
/// the block resolutions rounded up to powers of 2.
///
/// Ids that no voxel maps to are left unused when a resolution is not a power of 2.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ShiftBlockIndexer {
    shape: BlockShape,
    gx: i32,
    gz: i32,
}

impl ShiftBlockIndexer {
    pub fn new(grid_shape: Point3i, order: u32) -> Result<Self, GridError> {
        let shape = BlockShape::new(grid_shape, order)?;
        let gx = ceil_log2(shape.block_res.x()) as i32;
        let gz = ceil_log2(shape.block_res.z()) as i32;
        let gy = ceil_log2(shape.block_res.y()) as i32;
        // Ids are computed in i32.
        if gx + gy + gz > 30 {
            return Err(GridError::InvalidGeometry(format!(
                "{:?} blocks of order {} need more than 2^30 block ids",
                shape.block_res,
                shape.order
            )));
        }

        Ok(Self { shape, gx, gz })
    }
}

impl BlockAddressing for ShiftBlockIndexer {
    #[inline]
    fn block_shape(&self) -> &BlockShape {
        &self.shape
    }

    #[inline]
    fn block_id(&self, p: Point3i) -> usize {
        let b = p >> self.shape.order;

        (b.z() + (b.x() << self.gz) + (b.y() << (self.gx + self.gz))) as usize
    }

    #[inline]
    fn block_coords(&self, id: usize) -> Point3i {
        let id = id as i32;

        PointN([
            (id >> self.gz) & ((1 << self.gx) - 1),
            id >> (self.gx + self.gz),
            id & ((1 << self.gz) - 1),
        ])
    }

    #[inline]
    fn num_blocks(&self) -> usize {
        (self.shape.block_res.y() as usize) << (self.gx + self.gz)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
