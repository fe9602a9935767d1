//! Conversions between integer grid coordinates and continuous world coordinates.
//!
//! A grid covers `shape` voxels. Each voxel is `pixel_size` wide along X and Z and `slice_height` tall along Y, and voxel
//! `(0, 0, 0)` has its minimum corner at `origin`.
//!
//! ```
//! use voxel_grid_core::prelude::*;
//!
//! let geom = GridGeometry::new(PointN([4, 4, 4]), 0.5, 0.25).unwrap();
//!
//! // World to grid is floor division.
//! assert_eq!(geom.grid_coords(PointN([1.2, 0.3, 0.49])), PointN([2, 1, 0]));
//! assert_eq!(geom.grid_coords(PointN([-0.1, 0.0, 0.0])), PointN([-1, 0, 0]));
//!
//! // Grid to world gives the voxel center.
//! assert_eq!(geom.world_coords(PointN([2, 1, 0])), PointN([1.25, 0.375, 0.25]));
//!
//! let bounds = geom.grid_bounds();
//! assert_eq!(bounds.max, PointN([2.0, 1.0, 2.0]));
//! ```

use crate::{Extent3i, GridError, Point3d, Point3i, PointN};

use serde::{Deserialize, Serialize};

/// An axis-aligned box in world space.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct WorldBounds {
    pub min: Point3d,
    pub max: Point3d,
}

impl WorldBounds {
    #[inline]
    pub fn new(min: Point3d, max: Point3d) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn size(&self) -> Point3d {
        self.max - self.min
    }
}

/// The fixed shape and world placement of a grid.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct GridGeometry {
    shape: Point3i,
    pixel_size: f64,
    slice_height: f64,
    origin: Point3d,
}

impl GridGeometry {
    pub fn new(shape: Point3i, pixel_size: f64, slice_height: f64) -> Result<Self, GridError> {
        Self::with_origin(shape, pixel_size, slice_height, Point3d::fill(0.0))
    }

    pub fn with_origin(
        shape: Point3i,
        pixel_size: f64,
        slice_height: f64,
        origin: Point3d,
    ) -> Result<Self, GridError> {
        if shape.0.iter().any(|c| *c <= 0) {
            return Err(GridError::InvalidGeometry(format!(
                "shape {:?} must be positive in every dimension",
                shape
            )));
        }
        check_voxel_size("pixel size", pixel_size)?;
        check_voxel_size("slice height", slice_height)?;
        if origin.0.iter().any(|c| !c.is_finite()) {
            return Err(GridError::InvalidGeometry(format!(
                "origin {:?} must be finite",
                origin
            )));
        }

        Ok(Self {
            shape,
            pixel_size,
            slice_height,
            origin,
        })
    }

    /// Covers `bounds` with voxels of the given size. The number of voxels along each axis is rounded to the nearest
    /// integer.
    pub fn from_bounds(
        bounds: WorldBounds,
        pixel_size: f64,
        slice_height: f64,
    ) -> Result<Self, GridError> {
        check_voxel_size("pixel size", pixel_size)?;
        check_voxel_size("slice height", slice_height)?;

        let size = bounds.size();
        let shape = PointN([
            (size.x() / pixel_size).round() as i32,
            (size.y() / slice_height).round() as i32,
            (size.z() / pixel_size).round() as i32,
        ]);

        Self::with_origin(shape, pixel_size, slice_height, bounds.min)
    }

    #[inline]
    pub fn shape(&self) -> Point3i {
        self.shape
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.shape.x()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.shape.y()
    }

    #[inline]
    pub fn depth(&self) -> i32 {
        self.shape.z()
    }

    #[inline]
    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    #[inline]
    pub fn slice_height(&self) -> f64 {
        self.slice_height
    }

    #[inline]
    pub fn origin(&self) -> Point3d {
        self.origin
    }

    /// The world-space size of one voxel along each axis.
    #[inline]
    pub fn voxel_size(&self) -> Point3d {
        PointN([self.pixel_size, self.slice_height, self.pixel_size])
    }

    /// The extent of valid grid coordinates, `[0, shape)`.
    #[inline]
    pub fn extent(&self) -> Extent3i {
        Extent3i::from_min_and_shape(Point3i::ZERO, self.shape)
    }

    #[inline]
    pub fn num_voxels(&self) -> u64 {
        self.shape.volume()
    }

    /// The number of voxels in one Y slice.
    #[inline]
    pub fn slice_size(&self) -> usize {
        self.width() as usize * self.depth() as usize
    }

    #[inline]
    pub fn is_cubic(&self) -> bool {
        self.pixel_size == self.slice_height
    }

    #[inline]
    pub fn contains(&self, p: Point3i) -> bool {
        self.extent().contains(p)
    }

    #[inline]
    pub fn contains_world(&self, w: Point3d) -> bool {
        self.contains(self.grid_coords(w))
    }

    /// Fails with `GridError::OutOfBounds` unless `p` is a valid grid coordinate.
    #[inline]
    pub fn check_contains(&self, p: Point3i) -> Result<(), GridError> {
        if self.contains(p) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                point: p,
                shape: self.shape,
            })
        }
    }

    /// Fails with `GridError::NonCubicVoxels` unless `pixel_size == slice_height`.
    pub fn require_cubic(&self, backend: &'static str) -> Result<(), GridError> {
        if self.is_cubic() {
            Ok(())
        } else {
            Err(GridError::NonCubicVoxels {
                backend,
                pixel_size: self.pixel_size,
                slice_height: self.slice_height,
            })
        }
    }

    /// The voxel containing the world point `w`.
    ///
    /// Coordinates beyond the range of `i32` saturate, and NaN maps to `i32::MIN`, so a non-finite `w` is never inside of
    /// the grid.
    #[inline]
    pub fn grid_coords(&self, w: Point3d) -> Point3i {
        ((w - self.origin) / self.voxel_size())
            .floor()
            .map_components(|c| if c.is_nan() { i32::MIN } else { c as i32 })
    }

    /// The world position of the center of voxel `p`.
    #[inline]
    pub fn world_coords(&self, p: Point3i) -> Point3d {
        let size = self.voxel_size();

        self.origin + (Point3d::from(p) + Point3d::fill(0.5)) * size
    }

    #[inline]
    pub fn grid_bounds(&self) -> WorldBounds {
        WorldBounds::new(
            self.origin,
            self.origin + Point3d::from(self.shape) * self.voxel_size(),
        )
    }

    /// Moves and rescales the grid to cover `bounds` without changing its shape.
    ///
    /// The X and Z voxel sizes implied by `bounds` must agree within 1%.
    pub fn set_grid_bounds(&mut self, bounds: WorldBounds) -> Result<(), GridError> {
        let size = bounds.size();
        let x_size = size.x() / self.width() as f64;
        let y_size = size.y() / self.height() as f64;
        let z_size = size.z() / self.depth() as f64;

        check_voxel_size("pixel size", x_size)?;
        check_voxel_size("slice height", y_size)?;
        if ((x_size - z_size) / x_size).abs() > 0.01 {
            return Err(GridError::NonSquarePixels { x_size, z_size });
        }

        *self = Self::with_origin(self.shape, x_size, y_size, bounds.min)?;

        Ok(())
    }
}

fn check_voxel_size(name: &str, size: f64) -> Result<(), GridError> {
    if size.is_finite() && size > 0.0 {
        Ok(())
    } else {
        Err(GridError::InvalidGeometry(format!(
            "{} must be positive and finite, got {}",
            name, size
        )))
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
