use crate::{Grid, SmallKeyHashSet, VisitStatus, VoxelVisitor};

use voxel_grid_core::prelude::*;

use std::collections::BTreeMap;

/// Wraps a grid and keeps an index from each material to the voxels that carry it.
///
/// Reads and writes go to the wrapped grid, which stays the source of truth. After every write the value is read back, so
/// the index also matches backends that drop attributes (such as `TwoBitBlockGrid`, where every voxel that is not outside
/// is indexed under `NO_MATERIAL`).
///
/// Attribute traversal over classes that exclude OUTSIDE visits the indexed voxels in Y, X, Z order.
#[derive(Clone)]
pub struct MaterialIndexedGrid {
    inner: Box<dyn Grid>,
    index: BTreeMap<Attribute, SmallKeyHashSet<Point3i>>,
}

impl MaterialIndexedGrid {
    /// Indexes every voxel of `inner` that is not outside.
    pub fn new(inner: Box<dyn Grid>) -> Self {
        let mut index: BTreeMap<Attribute, SmallKeyHashSet<Point3i>> = BTreeMap::new();
        inner.find(VoxelClass::Marked, &mut |p, data| {
            index.entry(data.attribute).or_default().insert(p);
        });
        tracing::debug!(
            backend = inner.backend_name(),
            materials = index.len(),
            "indexed grid materials"
        );

        Self { inner, index }
    }

    #[inline]
    pub fn inner(&self) -> &dyn Grid {
        self.inner.as_ref()
    }

    pub fn into_inner(self) -> Box<dyn Grid> {
        self.inner
    }

    /// The materials with at least one voxel, in ascending order.
    pub fn materials(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.index.keys().copied()
    }

    fn unindex(&mut self, p: Point3i, old: VoxelData) {
        if old.is_outside() {
            return;
        }
        if let Some(bucket) = self.index.get_mut(&old.attribute) {
            bucket.remove(&p);
            if bucket.is_empty() {
                self.index.remove(&old.attribute);
            }
        }
    }

    fn reindex(&mut self, p: Point3i, old: VoxelData) {
        let new = self.inner.get_data(p);
        if new == old {
            return;
        }

        self.unindex(p, old);
        if !new.is_outside() {
            self.index.entry(new.attribute).or_default().insert(p);
        }
    }

    fn sorted_bucket(&self, material: Attribute) -> Vec<Point3i> {
        let mut points: Vec<Point3i> = self
            .index
            .get(&material)
            .map(|bucket| bucket.iter().copied().collect())
            .unwrap_or_default();
        points.sort_by_key(|p| (p.y(), p.x(), p.z()));

        points
    }
}

impl Grid for MaterialIndexedGrid {
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
        let old = self.inner.get_data(p);
        self.inner.set_data(p, data)?;
        self.reindex(p, old);

        Ok(())
    }

    fn set_state(&mut self, p: Point3i, state: State) -> Result<(), GridError> {
        let old = self.inner.get_data(p);
        self.inner.set_state(p, state)?;
        self.reindex(p, old);

        Ok(())
    }

    fn set_attribute(&mut self, p: Point3i, attribute: Attribute) -> Result<(), GridError> {
        let old = self.inner.get_data(p);
        self.inner.set_attribute(p, attribute)?;
        self.reindex(p, old);

        Ok(())
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
        if class.includes_outside() {
            return self
                .inner
                .find_attribute_interruptible(class, material, visitor);
        }

        for p in self.sorted_bucket(material) {
            let data = self.inner.get_data(p);
            if class.matches(data.state) && visitor(p, data) == VisitStatus::ExitEarly {
                return VisitStatus::ExitEarly;
            }
        }

        VisitStatus::Continue
    }

    fn find_count(&self, class: VoxelClass) -> u64 {
        if class == VoxelClass::Marked {
            return self.index.values().map(|bucket| bucket.len() as u64).sum();
        }

        self.inner.find_count(class)
    }

    fn find_count_attribute(&self, material: Attribute) -> u64 {
        self.index
            .get(&material)
            .map_or(0, |bucket| bucket.len() as u64)
    }

    fn remove_attribute(&mut self, material: Attribute) -> Result<u64, GridError> {
        let points = self.sorted_bucket(material);
        for p in points.iter() {
            self.set_data(*p, VoxelData::OUTSIDE)?;
        }
        tracing::debug!(
            backend = self.backend_name(),
            material,
            removed = points.len(),
            "removed indexed attribute"
        );

        Ok(points.len() as u64)
    }

    fn reassign_attribute(
        &mut self,
        materials: &[Attribute],
        new_material: Attribute,
    ) -> Result<u64, GridError> {
        let mut changed = 0;
        for material in materials.iter().copied() {
            if material == new_material {
                continue;
            }
            for p in self.sorted_bucket(material) {
                let state = self.inner.get_state(p);
                self.set_data(p, VoxelData::new(state, new_material))?;
                changed += 1;
            }
        }
        tracing::debug!(
            backend = self.backend_name(),
            ?materials,
            new_material,
            changed,
            "reassigned indexed attribute"
        );

        Ok(changed)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
