//! Visitor types shared by all grid traversals.
//!
//! Every traversal is driven by a closure that receives the grid coordinate and value of each matching voxel. Interruptible
//! traversals take a closure returning `VisitStatus`; returning `VisitStatus::ExitEarly` stops the traversal before any further
//! callbacks, and the traversal returns `VisitStatus::ExitEarly` to its caller.
//!
//! ```
//! use voxel_grid_core::prelude::*;
//! use voxel_grid_storage::prelude::*;
//!
//! let mut grid = ArrayGridByte::new(GridGeometry::new(Point3i::fill(8), 1.0, 1.0).unwrap());
//! grid.set_data(PointN([1, 2, 3]), VoxelData::new(State::Interior, 4)).unwrap();
//!
//! // Find the first outside voxel, then stop.
//! let mut first = None;
//! let status = grid.find_interruptible(VoxelClass::Outside, &mut |p, _v| {
//!     first = Some(p);
//!     VisitStatus::ExitEarly
//! });
//! assert_eq!(status, VisitStatus::ExitEarly);
//! assert_eq!(first, Some(Point3i::ZERO));
//! ```

use voxel_grid_core::prelude::*;

/// Returned by interruptible visitors and traversals.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VisitStatus {
    /// Continue the traversal.
    Continue,
    /// Stop the traversal. No further voxels will be visited.
    ExitEarly,
}

impl VisitStatus {
    #[inline]
    pub fn is_exit(self) -> bool {
        self == VisitStatus::ExitEarly
    }
}

impl From<bool> for VisitStatus {
    /// `true` means "keep going".
    #[inline]
    fn from(keep_going: bool) -> Self {
        if keep_going {
            VisitStatus::Continue
        } else {
            VisitStatus::ExitEarly
        }
    }
}

/// The closure type taken by interruptible traversals.
pub type VoxelVisitor<'a> = dyn FnMut(Point3i, VoxelData) -> VisitStatus + 'a;

/// Calls `visitor` on every point of `extent` with the same `value`, stopping early if asked. This is how backends that store
/// whole regions under one value (uniform blocks, homogeneous octree cells, unallocated blocks) fan out to voxels.
#[inline]
pub fn visit_uniform_extent(
    extent: &Extent3i,
    value: VoxelData,
    visitor: &mut VoxelVisitor<'_>,
) -> VisitStatus {
    for p in extent.iter_points() {
        if visitor(p, value).is_exit() {
            return VisitStatus::ExitEarly;
        }
    }

    VisitStatus::Continue
}
