//! The core data types for voxel grids:
//! - `PointN`: a lattice or world point, most importantly `Point3i` and `Point3d`
//! - `Extent3i`: a box of lattice points
//! - `Octant`: a power of 2 cube, and the fixed octant numbering used by octree grids
//! - `State`, `VoxelClass`, `VoxelData`: the value stored for every voxel
//! - `GridGeometry`: the shape of a grid and its mapping to world coordinates
//! - `GridError`: the error returned by every fallible grid operation

pub mod error;
pub mod extent3;
pub mod geometry;
pub mod int_math;
pub mod octant;
pub mod point;
pub mod point3;
pub mod voxel;

pub use error::GridError;
pub use extent3::{Extent3PointIter, Extent3i};
pub use geometry::{GridGeometry, WorldBounds};
pub use int_math::{ceil_div, ceil_log2, next_power_of_2};
pub use octant::{octant_index, octant_offset, Octant, OCTANT_OFFSETS};
pub use point::PointN;
pub use point3::{Point3, Point3d, Point3i};
pub use voxel::{Attribute, State, VoxelClass, VoxelData, NO_MATERIAL};

pub mod prelude {
    pub use super::{
        Attribute, Extent3i, GridError, GridGeometry, Octant, Point3, Point3d, Point3i, PointN,
        State, VoxelClass, VoxelData, WorldBounds, NO_MATERIAL,
    };
}
