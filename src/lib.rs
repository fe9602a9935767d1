//! Voxel grids with interchangeable storage backends.
//!
//! This library is organized into two crates:
//! - **core**: lattice points and extents, voxel values, and the mapping between grid and world coordinates
//! - **storage**: the `Grid` contract and every backend that implements it
//!
//! Start with the `Grid` trait and `GridBuilder`:
//!
//! ```
//! use voxel_grids::prelude::*;
//!
//! let builder = GridBuilder::new(BackendKind::BlockShort, PointN([16, 16, 16]), 0.5, 0.5);
//! let mut grid = builder.build().unwrap();
//! grid.set_data(PointN([3, 4, 5]), VoxelData::new(State::Exterior, 12)).unwrap();
//!
//! let mut found = Vec::new();
//! grid.find(VoxelClass::Marked, &mut |p, data| found.push((p, data)));
//! assert_eq!(found, vec![(PointN([3, 4, 5]), VoxelData::new(State::Exterior, 12))]);
//! ```

pub use voxel_grid_core as core;
pub use voxel_grid_storage as storage;

pub mod prelude {
    pub use super::core::prelude::*;
    pub use super::storage::prelude::*;
}
