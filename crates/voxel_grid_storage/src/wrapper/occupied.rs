use crate::{Grid, VisitStatus, VoxelVisitor};

use voxel_grid_core::prelude::*;

/// Wraps a grid so that voxels which are not outside can only be cleared or rewritten with their own material.
///
/// - `set_data` fails with `GridError::Occupied` when both the old and new values are not outside and their materials
///   differ.
/// - `set_state` fails when both the old and new states are not outside.
/// - `set_attribute` fails when the voxel is not outside and holds a different material.
///
/// Bulk operations (`remove_attribute`, `reassign_attribute`) are passed through unchecked.
#[derive(Clone)]
pub struct OccupiedGrid {
    inner: Box<dyn Grid>,
}

impl OccupiedGrid {
    pub fn new(inner: Box<dyn Grid>) -> Self {
        Self { inner }
    }

    #[inline]
    pub fn inner(&self) -> &dyn Grid {
        self.inner.as_ref()
    }

    pub fn into_inner(self) -> Box<dyn Grid> {
        self.inner
    }

    fn occupied(p: Point3i, existing: VoxelData) -> GridError {
        tracing::trace!(point = ?p, existing = ?existing, "rejected write to occupied voxel");

        GridError::Occupied {
            point: p,
            existing: existing.attribute,
        }
    }
}

impl Grid for OccupiedGrid {
    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }

    #[inline]
    fn geometry(&self) -> &GridGeometry {
        self.inner.geometry()
    }

    #[inline]
    fn get_data(&self, p: Point3i) -> VoxelData {
        self.inner.get_data(p)
    }

    fn set_data(&mut self, p: Point3i, data: VoxelData) -> Result<(), GridError> {
        let existing = self.inner.get_data(p);
        if !existing.is_outside() && !data.is_outside() && existing.attribute != data.attribute {
            return Err(Self::occupied(p, existing));
        }

        self.inner.set_data(p, data)
    }

    fn set_state(&mut self, p: Point3i, state: State) -> Result<(), GridError> {
        let existing = self.inner.get_data(p);
        if !existing.is_outside() && !state.is_outside() {
            return Err(Self::occupied(p, existing));
        }

        self.inner.set_state(p, state)
    }

    fn set_attribute(&mut self, p: Point3i, attribute: Attribute) -> Result<(), GridError> {
        let existing = self.inner.get_data(p);
        if !existing.is_outside() && existing.attribute != attribute {
            return Err(Self::occupied(p, existing));
        }

        self.inner.set_attribute(p, attribute)
    }

    fn create_empty(
        &self,
        shape: Point3i,
        pixel_size: f64,
        slice_height: f64,
    ) -> Result<Box<dyn Grid>, GridError> {
        let inner = self.inner.create_empty(shape, pixel_size, slice_height)?;

        Ok(Box::new(Self::new(inner)))
    }

    fn clone_grid(&self) -> Box<dyn Grid> {
        Box::new(self.clone())
    }

    fn find_interruptible(&self, class: VoxelClass, visitor: &mut VoxelVisitor<'_>) -> VisitStatus {
        self.inner.find_interruptible(class, visitor)
    }

    fn find_attribute_interruptible(
        &self,
        class: VoxelClass,
        material: Attribute,
        visitor: &mut VoxelVisitor<'_>,
    ) -> VisitStatus {
        self.inner
            .find_attribute_interruptible(class, material, visitor)
    }

    fn find_count(&self, class: VoxelClass) -> u64 {
        self.inner.find_count(class)
    }

    fn find_count_attribute(&self, material: Attribute) -> u64 {
        self.inner.find_count_attribute(material)
    }

    fn remove_attribute(&mut self, material: Attribute) -> Result<u64, GridError> {
        self.inner.remove_attribute(material)
    }

    fn reassign_attribute(
        &mut self,
        materials: &[Attribute],
        new_material: Attribute,
    ) -> Result<u64, GridError> {
        self.inner.reassign_attribute(materials, new_material)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
