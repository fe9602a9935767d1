//! The material inverted index backend.
//!
//! `MaterialIndexGrid` maps each material to the set of voxels that carry it. This makes per-material traversal, counting,
//! removal and reassignment proportional to the number of affected voxels, at the cost of point reads, which have to scan
//! every bucket. Outside voxels are never stored.
//!
//! Only whole values can be written: `set_state` and `set_attribute` fail with `GridError::Unsupported`.
//!
//! ```
//! use voxel_grid_core::prelude::*;
//! use voxel_grid_storage::prelude::*;
//!
//! let geom = GridGeometry::new(Point3i::fill(16), 1.0, 1.0).unwrap();
//! let mut grid = MaterialIndexGrid::new(geom);
//!
//! grid.set_data(PointN([1, 1, 1]), VoxelData::new(State::Interior, 4)).unwrap();
//! grid.set_data(PointN([2, 1, 1]), VoxelData::new(State::Exterior, 4)).unwrap();
//! grid.set_data(PointN([1, 1, 1]), VoxelData::new(State::Interior, 5)).unwrap();
//!
//! assert_eq!(grid.find_count_attribute(4), 1);
//! assert_eq!(grid.materials().collect::<Vec<_>>(), vec![4, 5]);
//! ```

use crate::{Grid, SmallKeyHashMap, SmallKeyHashSet, VisitStatus, VoxelVisitor};

use voxel_grid_core::prelude::*;

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// An entry of a material bucket. Entries are equal when their points are equal, regardless of state.
#[derive(Clone, Copy, Debug)]
pub struct IndexedVoxel {
    pub point: Point3i,
    pub state: State,
}

impl IndexedVoxel {
    #[inline]
    fn key(point: Point3i) -> Self {
        Self {
            point,
            state: State::Outside,
        }
    }
}

impl PartialEq for IndexedVoxel {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point
    }
}

impl Eq for IndexedVoxel {}

impl Hash for IndexedVoxel {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.point.hash(state);
    }
}

/// A sparse grid indexed by material.
#[derive(Clone, Debug)]
pub struct MaterialIndexGrid {
    geometry: GridGeometry,
    buckets: BTreeMap<Attribute, SmallKeyHashSet<IndexedVoxel>>,
}

impl MaterialIndexGrid {
    pub const BACKEND_NAME: &'static str = "material_index";

    pub fn new(geometry: GridGeometry) -> Self {
        tracing::debug!(shape = ?geometry.shape(), "creating material index grid");

        Self {
            geometry,
            buckets: BTreeMap::new(),
        }
    }

    /// The materials with at least one voxel, in increasing order.
    pub fn materials(&self) -> impl '_ + Iterator<Item = Attribute> {
        self.buckets.keys().copied()
    }

    /// The number of voxels that are not outside.
    pub fn num_entries(&self) -> u64 {
        self.buckets.values().map(|b| b.len() as u64).sum()
    }

    /// Removes `p` from whichever bucket holds it. Empty buckets are dropped.
    fn remove_point(&mut self, p: Point3i) {
        let key = IndexedVoxel::key(p);
        let mut emptied = None;
        for (material, bucket) in self.buckets.iter_mut() {
            if bucket.remove(&key) {
                if bucket.is_empty() {
                    emptied = Some(*material);
                }
                break;
            }
        }
        if let Some(material) = emptied {
            self.buckets.remove(&material);
        }
    }

    /// Every stored voxel, keyed by point.
    fn point_map(&self) -> SmallKeyHashMap<Point3i, VoxelData> {
        let mut map = SmallKeyHashMap::default();
        for (material, bucket) in self.buckets.iter() {
            for v in bucket.iter() {
                map.insert(v.point, VoxelData::new(v.state, *material));
            }
        }

        map
    }

    /// Exact traversal including outside voxels, in Y, X, Z order.
    fn scan_with_outside(
        &self,
        class: VoxelClass,
        material: Option<Attribute>,
        visitor: &mut VoxelVisitor<'_>,
    ) -> VisitStatus {
        let map = self.point_map();
        for p in self.geometry.extent().iter_points() {
            let data = map.get(&p).copied().unwrap_or(VoxelData::OUTSIDE);
            if class.matches(data.state)
                && material.map_or(true, |m| m == data.attribute)
                && visitor(p, data).is_exit()
            {
                return VisitStatus::ExitEarly;
            }
        }

        VisitStatus::Continue
    }

    fn visit_bucket(
        material: Attribute,
        bucket: &SmallKeyHashSet<IndexedVoxel>,
        class: VoxelClass,
        visitor: &mut VoxelVisitor<'_>,
    ) -> VisitStatus {
        for v in bucket.iter() {
            if class.matches(v.state) && visitor(v.point, VoxelData::new(v.state, material)).is_exit()
            {
                return VisitStatus::ExitEarly;
            }
        }

        VisitStatus::Continue
    }
}

impl Grid for MaterialIndexGrid {
    fn backend_name(&self) -> &'static str {
        Self::BACKEND_NAME
    }

    #[inline]
    fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Scans every bucket for `p`.
    fn get_data(&self, p: Point3i) -> VoxelData {
        for (material, bucket) in self.buckets.iter() {
            for v in bucket.iter() {
                if v.point == p {
                    return VoxelData::new(v.state, *material);
                }
            }
        }

        VoxelData::OUTSIDE
    }

    fn set_data(&mut self, p: Point3i, data: VoxelData) -> Result<(), GridError> {
        self.geometry.check_contains(p)?;

        self.remove_point(p);
        if !data.is_outside() {
            self.buckets
                .entry(data.attribute)
                .or_insert_with(SmallKeyHashSet::default)
                .insert(IndexedVoxel {
                    point: p,
                    state: data.state,
                });
        }

        Ok(())
    }

    fn set_state(&mut self, _p: Point3i, _state: State) -> Result<(), GridError> {
        Err(GridError::Unsupported {
            operation: "set_state",
            backend: Self::BACKEND_NAME,
        })
    }

    fn set_attribute(&mut self, _p: Point3i, _attribute: Attribute) -> Result<(), GridError> {
        Err(GridError::Unsupported {
            operation: "set_attribute",
            backend: Self::BACKEND_NAME,
        })
    }

    fn create_empty(
        &self,
        shape: Point3i,
        pixel_size: f64,
        slice_height: f64,
    ) -> Result<Box<dyn Grid>, GridError> {
        let geometry = GridGeometry::new(shape, pixel_size, slice_height)?;

        Ok(Box::new(Self::new(geometry)))
    }

    fn clone_grid(&self) -> Box<dyn Grid> {
        Box::new(self.clone())
    }

    /// Classes that exclude outside voxels are visited material by material, in increasing material order. Within a material
    /// the order is unspecified.
    fn find_interruptible(&self, class: VoxelClass, visitor: &mut VoxelVisitor<'_>) -> VisitStatus {
        if class.includes_outside() {
            return self.scan_with_outside(class, None, visitor);
        }

        for (material, bucket) in self.buckets.iter() {
            if Self::visit_bucket(*material, bucket, class, visitor).is_exit() {
                return VisitStatus::ExitEarly;
            }
        }

        VisitStatus::Continue
    }

    fn find_attribute_interruptible(
        &self,
        class: VoxelClass,
        material: Attribute,
        visitor: &mut VoxelVisitor<'_>,
    ) -> VisitStatus {
        if class.includes_outside() {
            return self.scan_with_outside(class, Some(material), visitor);
        }

        match self.buckets.get(&material) {
            Some(bucket) => Self::visit_bucket(material, bucket, class, visitor),
            None => VisitStatus::Continue,
        }
    }

    fn find_count(&self, class: VoxelClass) -> u64 {
        match class {
            VoxelClass::All => self.geometry.num_voxels(),
            VoxelClass::Marked => self.num_entries(),
            VoxelClass::Outside => self.geometry.num_voxels() - self.num_entries(),
            _ => self
                .buckets
                .values()
                .flat_map(|b| b.iter())
                .filter(|v| class.matches(v.state))
                .count() as u64,
        }
    }

    fn find_count_attribute(&self, material: Attribute) -> u64 {
        self.buckets
            .get(&material)
            .map_or(0, |bucket| bucket.len() as u64)
    }

    fn remove_attribute(&mut self, material: Attribute) -> Result<u64, GridError> {
        let removed = self
            .buckets
            .remove(&material)
            .map_or(0, |bucket| bucket.len() as u64);
        tracing::debug!(
            backend = Self::BACKEND_NAME,
            material,
            removed,
            "removed attribute"
        );

        Ok(removed)
    }

    fn reassign_attribute(
        &mut self,
        materials: &[Attribute],
        new_material: Attribute,
    ) -> Result<u64, GridError> {
        let mut moved = Vec::new();
        for material in materials.iter() {
            if *material == new_material {
                continue;
            }
            if let Some(bucket) = self.buckets.remove(material) {
                moved.extend(bucket.iter().copied());
            }
        }

        let changed = moved.len() as u64;
        if !moved.is_empty() {
            self.buckets
                .entry(new_material)
                .or_insert_with(SmallKeyHashSet::default)
                .extend(moved);
        }
        tracing::debug!(
            backend = Self::BACKEND_NAME,
            ?materials,
            new_material,
            changed,
            "reassigned attribute"
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

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;

    fn grid() -> MaterialIndexGrid {
        MaterialIndexGrid::new(GridGeometry::new(PointN([4, 3, 2]), 1.0, 1.0).unwrap())
    }

    #[test]
    fn rewrite_moves_point_between_buckets() {
        let mut grid = grid();
        let p = PointN([3, 2, 1]);

        grid.set_data(p, VoxelData::new(State::Interior, 1)).unwrap();
        grid.set_data(p, VoxelData::new(State::Exterior, 2)).unwrap();

        assert_eq!(grid.get_data(p), VoxelData::new(State::Exterior, 2));
        assert_eq!(grid.find_count_attribute(1), 0);
        assert_eq!(grid.find_count_attribute(2), 1);
        assert_eq!(grid.materials().collect::<Vec<_>>(), vec![2]);

        grid.set_data(p, VoxelData::new(State::Outside, 2)).unwrap();
        assert_eq!(grid.get_data(p), VoxelData::OUTSIDE);
        assert_eq!(grid.num_entries(), 0);
        assert_eq!(grid.materials().count(), 0);
    }

    #[test]
    fn rewrite_with_same_material_replaces_state() {
        let mut grid = grid();
        let p = PointN([0, 0, 0]);

        grid.set_data(p, VoxelData::new(State::Interior, 1)).unwrap();
        grid.set_data(p, VoxelData::new(State::Exterior, 1)).unwrap();

        assert_eq!(grid.get_data(p), VoxelData::new(State::Exterior, 1));
        assert_eq!(grid.find_count(VoxelClass::Interior), 0);
        assert_eq!(grid.find_count(VoxelClass::Exterior), 1);
    }

    #[test]
    fn partial_mutators_are_unsupported() {
        let mut grid = grid();

        assert_eq!(
            grid.set_state(Point3i::ZERO, State::Interior),
            Err(GridError::Unsupported {
                operation: "set_state",
                backend: "material_index",
            })
        );
        assert!(matches!(
            grid.set_attribute(Point3i::ZERO, 1),
            Err(GridError::Unsupported { .. })
        ));
        assert_eq!(grid.num_entries(), 0);
    }

    #[test]
    fn traversal_is_grouped_by_material() {
        let mut grid = grid();
        grid.set_data(PointN([0, 0, 0]), VoxelData::new(State::Interior, 9))
            .unwrap();
        grid.set_data(PointN([1, 0, 0]), VoxelData::new(State::Interior, 3))
            .unwrap();
        grid.set_data(PointN([2, 0, 0]), VoxelData::new(State::Exterior, 9))
            .unwrap();

        let mut materials = Vec::new();
        grid.find(VoxelClass::Marked, &mut |_, v| materials.push(v.attribute));
        assert_eq!(materials, vec![3, 9, 9]);

        assert_eq!(grid.find_count(VoxelClass::Outside), 24 - 3);
        let mut outside = 0;
        grid.find(VoxelClass::Outside, &mut |_, _| outside += 1);
        assert_eq!(outside, 24 - 3);
    }

    #[test]
    fn bulk_material_edits() {
        let mut grid = grid();
        let extent = grid.geometry().extent();
        for (i, p) in extent.iter_points().enumerate() {
            grid.set_data(p, VoxelData::new(State::Interior, (i % 3) as Attribute))
                .unwrap();
        }

        assert_eq!(grid.reassign_attribute(&[0, 1], 2), Ok(16));
        assert_eq!(grid.find_count_attribute(2), 24);

        assert_eq!(grid.remove_attribute(2), Ok(24));
        assert_eq!(grid.find_count(VoxelClass::Marked), 0);
        assert_eq!(grid.get_data(PointN([1, 1, 1])), VoxelData::OUTSIDE);
    }
}
