//! The `Grid` trait: the access contract shared by every storage backend.
//!
//! A backend only has to provide point reads and writes, its geometry, and the `create_empty`/`clone_grid` factories. Every
//! other operation has a default implementation in terms of those, and backends override the ones they can do faster
//! (bucket traversal in `MaterialIndexGrid`, whole-cell traversal in `OctreeGrid`, skipping vacant blocks in `BlockGrid`, ...).
//!
//! The contract is object safe, so callers can work with `Box<dyn Grid>` without knowing the backend:
//!
//! ```
//! use voxel_grid_core::prelude::*;
//! use voxel_grid_storage::prelude::*;
//!
//! fn fill_column(grid: &mut dyn Grid, x: i32, z: i32, material: Attribute) -> Result<(), GridError> {
//!     for y in 0..grid.geometry().height() {
//!         grid.set_data(PointN([x, y, z]), VoxelData::new(State::Interior, material))?;
//!     }
//!     Ok(())
//! }
//!
//! let geom = GridGeometry::new(PointN([4, 8, 4]), 0.1, 0.1).unwrap();
//! let mut grids: Vec<Box<dyn Grid>> = vec![
//!     Box::new(ArrayGridByte::new(geom)),
//!     Box::new(OctreeGridByte::new(geom).unwrap()),
//! ];
//! for grid in grids.iter_mut() {
//!     fill_column(grid.as_mut(), 1, 2, 7).unwrap();
//!     assert_eq!(grid.find_count(VoxelClass::Interior), 8);
//!     assert_eq!(grid.find_count_attribute(7), 8);
//!
//!     // Reads outside of the grid are never an error.
//!     assert_eq!(grid.get_data(PointN([-1, 0, 0])), VoxelData::OUTSIDE);
//! }
//! ```
//!
//! # Outside Voxels
//!
//! Every backend upholds `state == Outside => attribute == NO_MATERIAL`. Writing `State::Outside` with any attribute stores
//! `VoxelData::OUTSIDE`, and setting the attribute of an outside voxel has no effect.

use crate::{visit_uniform_extent, VisitStatus, VoxelVisitor};

use voxel_grid_core::prelude::*;

use std::fmt::Write;

/// The capability contract of a voxel grid backend.
pub trait Grid: Send + Sync {
    /// A short name for the backend, used in logs and errors.
    fn backend_name(&self) -> &'static str;

    fn geometry(&self) -> &GridGeometry;

    /// The value at `p`. Coordinates outside of the grid read as `VoxelData::OUTSIDE`.
    fn get_data(&self, p: Point3i) -> VoxelData;

    /// Overwrites the value at `p`. Fails with `GridError::OutOfBounds` if `p` is not in the grid.
    fn set_data(&mut self, p: Point3i, data: VoxelData) -> Result<(), GridError>;

    /// Creates a new, empty grid using the same backend (and packing policy) as `self`.
    fn create_empty(
        &self,
        shape: Point3i,
        pixel_size: f64,
        slice_height: f64,
    ) -> Result<Box<dyn Grid>, GridError>;

    /// A deep copy of `self`.
    fn clone_grid(&self) -> Box<dyn Grid>;

    // ███████╗███████╗████████╗████████╗███████╗██████╗ ███████╗
    // ██╔════╝██╔════╝╚══██╔══╝╚══██╔══╝██╔════╝██╔══██╗██╔════╝
    // ███████╗█████╗     ██║      ██║   █████╗  ██████╔╝███████╗
    // ╚════██║██╔══╝     ██║      ██║   ██╔══╝  ██╔══██╗╚════██║
    // ███████║███████╗   ██║      ██║   ███████╗██║  ██║███████║
    // ╚══════╝╚══════╝   ╚═╝      ╚═╝   ╚══════╝╚═╝  ╚═╝╚══════╝

    /// Sets the state at `p`, keeping the attribute. A transition to `State::Outside` clears the attribute, and a transition
    /// out of `State::Outside` starts from `NO_MATERIAL`.
    fn set_state(&mut self, p: Point3i, state: State) -> Result<(), GridError> {
        let old = self.get_data(p);
        self.set_data(p, VoxelData::new(state, old.attribute))
    }

    /// Sets the attribute at `p`, keeping the state.
    fn set_attribute(&mut self, p: Point3i, attribute: Attribute) -> Result<(), GridError> {
        let old = self.get_data(p);
        self.set_data(p, VoxelData::new(old.state, attribute))
    }

    #[inline]
    fn get_state(&self, p: Point3i) -> State {
        self.get_data(p).state
    }

    #[inline]
    fn get_attribute(&self, p: Point3i) -> Attribute {
        self.get_data(p).attribute
    }

    #[inline]
    fn get_data_world(&self, w: Point3d) -> VoxelData {
        self.get_data(self.geometry().grid_coords(w))
    }

    #[inline]
    fn get_state_world(&self, w: Point3d) -> State {
        self.get_data_world(w).state
    }

    #[inline]
    fn get_attribute_world(&self, w: Point3d) -> Attribute {
        self.get_data_world(w).attribute
    }

    fn set_data_world(&mut self, w: Point3d, data: VoxelData) -> Result<(), GridError> {
        let p = self.geometry().grid_coords(w);
        self.set_data(p, data)
    }

    fn set_state_world(&mut self, w: Point3d, state: State) -> Result<(), GridError> {
        let p = self.geometry().grid_coords(w);
        self.set_state(p, state)
    }

    fn set_attribute_world(&mut self, w: Point3d, attribute: Attribute) -> Result<(), GridError> {
        let p = self.geometry().grid_coords(w);
        self.set_attribute(p, attribute)
    }

    //  ██████╗ ██████╗  ██████╗ ██████╗ ██████╗ ███████╗
    // ██╔════╝██╔═══██╗██╔═══██╗██╔══██╗██╔══██╗██╔════╝
    // ██║     ██║   ██║██║   ██║██████╔╝██║  ██║███████╗
    // ██║     ██║   ██║██║   ██║██╔══██╗██║  ██║╚════██║
    // ╚██████╗╚██████╔╝╚██████╔╝██║  ██║██████╔╝███████║
    //  ╚═════╝ ╚═════╝  ╚═════╝ ╚═╝  ╚═╝╚═════╝ ╚══════╝

    #[inline]
    fn inside_grid(&self, p: Point3i) -> bool {
        self.geometry().contains(p)
    }

    #[inline]
    fn inside_grid_world(&self, w: Point3d) -> bool {
        self.geometry().contains_world(w)
    }

    #[inline]
    fn get_grid_coords(&self, w: Point3d) -> Point3i {
        self.geometry().grid_coords(w)
    }

    /// The world position of the center of voxel `p`.
    #[inline]
    fn get_world_coords(&self, p: Point3i) -> Point3d {
        self.geometry().world_coords(p)
    }

    #[inline]
    fn get_grid_bounds(&self) -> WorldBounds {
        self.geometry().grid_bounds()
    }

    // ████████╗██████╗  █████╗ ██╗   ██╗███████╗██████╗ ███████╗ █████╗ ██╗
    // ╚══██╔══╝██╔══██╗██╔══██╗██║   ██║██╔════╝██╔══██╗██╔════╝██╔══██╗██║
    //    ██║   ██████╔╝███████║██║   ██║█████╗  ██████╔╝███████╗███████║██║
    //    ██║   ██╔══██╗██╔══██║╚██╗ ██╔╝██╔══╝  ██╔══██╗╚════██║██╔══██║██║
    //    ██║   ██║  ██║██║  ██║ ╚████╔╝ ███████╗██║  ██║███████║██║  ██║███████╗
    //    ╚═╝   ╚═╝  ╚═╝╚═╝  ╚═╝  ╚═══╝  ╚══════╝╚═╝  ╚═╝╚══════╝╚═╝  ╚═╝╚══════╝

    /// Visits every voxel matching `class` until `visitor` returns `VisitStatus::ExitEarly`.
    ///
    /// The default implementation scans the whole grid in Y, X, Z order.
    fn find_interruptible(&self, class: VoxelClass, visitor: &mut VoxelVisitor<'_>) -> VisitStatus {
        scan_grid(self, class, visitor)
    }

    /// Visits every voxel matching `class` whose attribute is `material`, until `visitor` returns `VisitStatus::ExitEarly`.
    fn find_attribute_interruptible(
        &self,
        class: VoxelClass,
        material: Attribute,
        visitor: &mut VoxelVisitor<'_>,
    ) -> VisitStatus {
        self.find_interruptible(class, &mut |p, data| {
            if data.attribute == material {
                visitor(p, data)
            } else {
                VisitStatus::Continue
            }
        })
    }

    /// Visits every voxel matching `class`.
    fn find(&self, class: VoxelClass, visitor: &mut dyn FnMut(Point3i, VoxelData)) {
        self.find_interruptible(class, &mut |p, data| {
            visitor(p, data);
            VisitStatus::Continue
        });
    }

    /// Visits every voxel matching `class` whose attribute is `material`.
    ///
    /// Use `VoxelClass::Marked` to visit every voxel that carries `material`.
    fn find_attribute(
        &self,
        class: VoxelClass,
        material: Attribute,
        visitor: &mut dyn FnMut(Point3i, VoxelData),
    ) {
        self.find_attribute_interruptible(class, material, &mut |p, data| {
            visitor(p, data);
            VisitStatus::Continue
        });
    }

    /// The number of voxels matching `class`.
    fn find_count(&self, class: VoxelClass) -> u64 {
        if class == VoxelClass::All {
            return self.geometry().num_voxels();
        }

        let mut count = 0;
        self.find(class, &mut |_, _| count += 1);

        count
    }

    /// The number of voxels that are not outside and carry `material`.
    fn find_count_attribute(&self, material: Attribute) -> u64 {
        let mut count = 0;
        self.find_attribute(VoxelClass::Marked, material, &mut |_, _| count += 1);

        count
    }

    // ██████╗ ██╗   ██╗██╗     ██╗  ██╗
    // ██╔══██╗██║   ██║██║     ██║ ██╔╝
    // ██████╔╝██║   ██║██║     █████╔╝
    // ██╔══██╗██║   ██║██║     ██╔═██╗
    // ██████╔╝╚██████╔╝███████╗██║  ██╗
    // ╚═════╝  ╚═════╝ ╚══════╝╚═╝  ╚═╝

    /// Sets every voxel carrying `material` to `VoxelData::OUTSIDE`. Returns the number of voxels removed.
    fn remove_attribute(&mut self, material: Attribute) -> Result<u64, GridError> {
        let mut points = Vec::new();
        self.find_attribute(VoxelClass::Marked, material, &mut |p, _| points.push(p));

        for p in points.iter() {
            self.set_data(*p, VoxelData::OUTSIDE)?;
        }
        tracing::debug!(
            backend = self.backend_name(),
            material,
            removed = points.len(),
            "removed attribute"
        );

        Ok(points.len() as u64)
    }

    /// Gives `new_material` to every voxel that is not outside and whose attribute is in `materials`. Returns the number of
    /// voxels changed.
    fn reassign_attribute(
        &mut self,
        materials: &[Attribute],
        new_material: Attribute,
    ) -> Result<u64, GridError> {
        let mut changes = Vec::new();
        self.find(VoxelClass::Marked, &mut |p, data| {
            if data.attribute != new_material && materials.contains(&data.attribute) {
                changes.push((p, data.state));
            }
        });

        for (p, state) in changes.iter() {
            self.set_data(*p, VoxelData::new(*state, new_material))?;
        }
        tracing::debug!(
            backend = self.backend_name(),
            ?materials,
            new_material,
            changed = changes.len(),
            "reassigned attribute"
        );

        Ok(changes.len() as u64)
    }

    // ██████╗ ███████╗██████╗ ██╗   ██╗ ██████╗
    // ██╔══██╗██╔════╝██╔══██╗██║   ██║██╔════╝
    // ██║  ██║█████╗  ██████╔╝██║   ██║██║  ███╗
    // ██║  ██║██╔══╝  ██╔══██╗██║   ██║██║   ██║
    // ██████╔╝███████╗██████╔╝╚██████╔╝╚██████╔╝
    // ╚═════╝ ╚══════╝╚═════╝  ╚═════╝  ╚═════╝

    /// The states of slice `y`, one row per Z (from `depth - 1` down to 0), one column per X.
    fn to_string_slice(&self, y: i32) -> String {
        let geom = self.geometry();
        let mut out = String::new();
        for z in (0..geom.depth()).rev() {
            for x in 0..geom.width() {
                // Writing to a `String` can't fail.
                let _ = write!(out, "{} ", self.get_state(PointN([x, y, z])));
            }
            out.push('\n');
        }

        out
    }

    /// Every slice of the grid, as in `to_string_slice`.
    fn to_string_all(&self) -> String {
        let height = self.geometry().height();
        let mut out = format!("Grid:  height: {}\n", height);
        for y in 0..height {
            let _ = writeln!(out, "{}:", y);
            out.push_str(&self.to_string_slice(y));
        }

        out
    }
}

impl Clone for Box<dyn Grid> {
    fn clone(&self) -> Self {
        self.clone_grid()
    }
}

/// Visits the voxels of `extent` that lie inside of `geometry`, all of which share `value`, if `value` matches `class`.
///
/// Sparse backends use this to enumerate regions they store (or implicitly store) as a single value.
#[inline]
pub fn visit_region(
    geometry: &GridGeometry,
    extent: &Extent3i,
    value: VoxelData,
    class: VoxelClass,
    visitor: &mut VoxelVisitor<'_>,
) -> VisitStatus {
    if !class.matches(value.state) {
        return VisitStatus::Continue;
    }

    visit_uniform_extent(&extent.intersection(&geometry.extent()), value, visitor)
}

/// Reads every voxel of `grid` with `Grid::get_data`, in Y, X, Z order, and visits the ones matching `class`.
///
/// This is the exact per-voxel traversal. Sparse backends fall back to it for classes that include `State::Outside`.
pub fn scan_grid<G: Grid + ?Sized>(
    grid: &G,
    class: VoxelClass,
    visitor: &mut VoxelVisitor<'_>,
) -> VisitStatus {
    for p in grid.geometry().extent().iter_points() {
        let data = grid.get_data(p);
        if class.matches(data.state) && visitor(p, data).is_exit() {
            return VisitStatus::ExitEarly;
        }
    }

    VisitStatus::Continue
}
