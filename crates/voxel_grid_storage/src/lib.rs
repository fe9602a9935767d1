#![allow(clippy::new_without_default, clippy::len_without_is_empty)]

//! Interchangeable storage backends for voxel grids.
//!
//! Every backend implements the object safe `Grid` trait, so it can be swapped without changing the code that uses it. Each
//! voxel holds a `VoxelData`: a 2-bit `State` plus an `Attribute` (material id), packed into a fixed-width integer cell by a
//! `PackingPolicy`.
//!
//! The backends are:
//!   - `ArrayGrid`: dense, one cell per voxel
//!   - `BlockGrid`: block-sparse, blocks allocated on first write
//!   - `TwoBitBlockGrid`: block-sparse, states only, with uniform blocks stored as one value
//!   - `OctreeGrid`: sparse octree that splits on write and collapses uniform regions
//!   - `MaterialIndexGrid`: an inverted index from material to voxels
//!   - `SliceGrid`: one dense or sparse 2D slice per Y coordinate
//!
//! Any grid can be wrapped by `OccupiedGrid`, which rejects overwriting a different material, or by `MaterialIndexedGrid`,
//! which keeps a material index next to the grid.
//!
//! A backend can also be chosen at runtime from a serializable `GridBuilder`.

pub mod access_traits;
pub mod array;
pub mod block;
pub mod builder;
pub mod grid;
pub mod material_index;
pub mod octree;
pub mod packing;
pub mod slice;
pub mod wrapper;

pub use access_traits::*;
pub use array::*;
pub use block::*;
pub use builder::*;
pub use grid::*;
pub use material_index::*;
pub use octree::*;
pub use packing::*;
pub use slice::*;
pub use wrapper::*;

// Hash types to use for small keys like `PointN`.
pub type SmallKeyHashMap<K, V> = ahash::AHashMap<K, V>;
pub type SmallKeyHashSet<K> = ahash::AHashSet<K>;

pub mod prelude {
    pub use super::{
        ArrayGrid, ArrayGridByte, ArrayGridInt, ArrayGridLong, ArrayGridShort, BackendKind,
        BlockGrid, BlockGridByte, BlockGridShort, BytePacking, CellVisitor, Grid, GridBuilder,
        IntPacking, LongPacking, MaterialIndexGrid, MaterialIndexedGrid, OccupiedGrid, OctreeGrid,
        OctreeGridByte, OctreeGridShort, PackingPolicy, ShortPacking, SliceGrid, SliceGridInt,
        SliceGridShort, SliceKind, TwoBitBlockGrid, VisitStatus, VoxelVisitor,
    };
}
