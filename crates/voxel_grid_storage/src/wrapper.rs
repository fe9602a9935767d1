//! Grids that wrap another grid and add behavior to its writes.
//!
//! Both wrappers own a `Box<dyn Grid>`, so they work over any backend (including other wrappers), and they implement
//! `Grid` themselves:
//!
//! - `OccupiedGrid` refuses to overwrite a voxel that already holds a different material
//! - `MaterialIndexedGrid` keeps a material to voxel index next to the wrapped grid, so per-material traversal, counting,
//!   removal and reassignment only touch the affected voxels
//!
//! ```
//! use voxel_grid_core::prelude::*;
//! use voxel_grid_storage::prelude::*;
//!
//! let geom = GridGeometry::new(Point3i::fill(8), 1.0, 1.0).unwrap();
//! let mut grid = MaterialIndexedGrid::new(Box::new(OccupiedGrid::new(Box::new(ArrayGridShort::new(geom)))));
//!
//! grid.set_data(PointN([1, 2, 3]), VoxelData::new(State::Interior, 7)).unwrap();
//! assert!(grid.set_data(PointN([1, 2, 3]), VoxelData::new(State::Interior, 8)).is_err());
//! assert_eq!(grid.find_count_attribute(7), 1);
//! ```

mod indexed;
mod occupied;

pub use indexed::*;
pub use occupied::*;
