//! The sparse octree backend.
//!
//! `OctreeGrid` covers the grid with a single root octant whose edge length is the smallest power of 2 at least as large as
//! every grid dimension. Each cell of the tree is either **homogeneous**, holding one value for its whole octant, or
//! **mixed**, holding up to 8 children. An absent child is implicitly `State::Outside`, so an empty grid is a single
//! homogeneous root cell.
//!
//! # Writes
//!
//! A write descends from the root. A homogeneous cell that already holds the written value is left alone; otherwise it
//! splits. Splitting an outside cell only materializes the child on the write path, while splitting any other cell
//! materializes all 8 children with the old value. As the recursion unwinds, each mixed cell on the path collapses back to a
//! homogeneous cell if all 8 of its children now hold the same value. Collapse never looks at cells off of the write path.
//!
//! ```
//! use voxel_grid_core::prelude::*;
//! use voxel_grid_storage::prelude::*;
//!
//! let geom = GridGeometry::new(Point3i::fill(4), 1.0, 1.0).unwrap();
//! let mut grid = OctreeGridShort::new(geom).unwrap();
//! assert_eq!(grid.cell_count(), 1);
//!
//! // Fill one 2x2x2 octant. Its cells collapse into one as soon as the last voxel is written.
//! for p in Extent3i::from_min_and_shape(Point3i::ZERO, Point3i::fill(2)).iter_points() {
//!     grid.set_data(p, VoxelData::new(State::Interior, 8)).unwrap();
//! }
//! assert_eq!(grid.cell_count(), 2);
//! assert_eq!(grid.find_count_attribute(8), 8);
//! ```
//!
//! # Traversal
//!
//! The `Grid` traversals are exact per voxel. For classes that exclude `State::Outside`, they walk the tree breadth first and
//! fan each matching homogeneous cell out into its voxels, so the cost depends on the number of cells rather than the volume
//! of the grid. `OctreeGrid::visit_cells` exposes the cells themselves.

mod cell;

pub use cell::*;

use crate::{
    scan_grid, visit_region, BytePacking, Grid, PackingPolicy, ShortPacking, VisitStatus,
    VoxelVisitor,
};

use voxel_grid_core::prelude::*;
use voxel_grid_core::{ceil_log2, next_power_of_2};

use core::marker::PhantomData;
use std::collections::VecDeque;

/// A sparse grid stored as an octree of `P::Cell` values.
#[derive(Clone, Debug)]
pub struct OctreeGrid<P: PackingPolicy> {
    geometry: GridGeometry,
    max_level: u8,
    arena: CellArena<P::Cell>,
    marker: PhantomData<P>,
}

pub type OctreeGridByte = OctreeGrid<BytePacking>;
pub type OctreeGridShort = OctreeGrid<ShortPacking>;

impl<P: PackingPolicy> OctreeGrid<P> {
    pub const BACKEND_NAME: &'static str = "octree";

    /// The id of the root cell, which always exists.
    pub const ROOT: CellId = 0;

    /// Fails with `GridError::NonCubicVoxels` unless the voxels are cubes.
    pub fn new(geometry: GridGeometry) -> Result<Self, GridError> {
        geometry.require_cubic(Self::BACKEND_NAME)?;

        let size = next_power_of_2(geometry.shape().max_component());
        let max_level = ceil_log2(size) as u8 + 1;
        let mut arena = CellArena::new();
        arena.alloc(OctreeCell {
            octant: Octant::new_unchecked(Point3i::ZERO, size),
            level: 1,
            contents: CellContents::Homogeneous(P::outside()),
        });
        tracing::debug!(
            policy = P::NAME,
            shape = ?geometry.shape(),
            root_size = size,
            max_level,
            "creating octree grid"
        );

        Ok(Self {
            geometry,
            max_level,
            arena,
            marker: PhantomData,
        })
    }

    /// The level of terminal cells. The root is at level 1.
    #[inline]
    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    #[inline]
    pub fn root_octant(&self) -> Octant {
        self.arena.get(Self::ROOT).octant
    }

    /// The number of live cells, including the root.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.arena.num_live()
    }

    #[inline]
    pub fn cell(&self, id: CellId) -> &OctreeCell<P::Cell> {
        self.arena.get(id)
    }

    fn get_cell_value(&self, p: Point3i) -> P::Cell {
        let mut id = Self::ROOT;
        loop {
            let cell = self.arena.get(id);
            match &cell.contents {
                CellContents::Homogeneous(value) => return *value,
                CellContents::Mixed(children) => {
                    match children[cell.octant.child_index_containing(p) as usize] {
                        Some(child) => id = child,
                        None => return P::outside(),
                    }
                }
            }
        }
    }

    fn write(&mut self, id: CellId, p: Point3i, value: P::Cell) {
        let cell = *self.arena.get(id);
        if cell.level == self.max_level {
            self.arena.get_mut(id).contents = CellContents::Homogeneous(value);
            return;
        }

        let mut children = match cell.contents {
            CellContents::Homogeneous(old) if old == value => return,
            CellContents::Homogeneous(old) => self.split(&cell, old),
            CellContents::Mixed(children) => children,
        };

        let child_octant = cell.octant.child_index_containing(p);
        let child = match children[child_octant as usize] {
            Some(child) => child,
            None if P::extract_state(value).is_outside() => return,
            None => {
                let child = self.arena.alloc(OctreeCell {
                    octant: cell.octant.child(child_octant),
                    level: cell.level + 1,
                    contents: CellContents::Homogeneous(P::outside()),
                });
                children[child_octant as usize] = Some(child);

                child
            }
        };
        self.arena.get_mut(id).contents = CellContents::Mixed(children);

        self.write(child, p, value);
        self.try_collapse(id);
    }

    /// Creates the children of a homogeneous cell holding `old`. Outside children are left absent.
    fn split(&mut self, cell: &OctreeCell<P::Cell>, old: P::Cell) -> [Option<CellId>; 8] {
        tracing::trace!(octant = ?cell.octant, level = cell.level, "splitting cell");

        let mut children = [None; 8];
        if P::extract_state(old).is_outside() {
            return children;
        }
        for (i, slot) in children.iter_mut().enumerate() {
            *slot = Some(self.arena.alloc(OctreeCell {
                octant: cell.octant.child(i as u8),
                level: cell.level + 1,
                contents: CellContents::Homogeneous(old),
            }));
        }

        children
    }

    /// Makes cell `id` homogeneous if all 8 of its child slots hold the same value.
    fn try_collapse(&mut self, id: CellId) {
        let children = match self.arena.get(id).contents {
            CellContents::Mixed(children) => children,
            CellContents::Homogeneous(_) => return,
        };

        let mut common = None;
        for slot in children.iter() {
            let value = match slot {
                Some(child) => match self.arena.get(*child).homogeneous_value() {
                    Some(v) => v,
                    None => return,
                },
                None => P::outside(),
            };
            match common {
                None => common = Some(value),
                Some(c) if c == value => {}
                Some(_) => return,
            }
        }

        if let Some(value) = common {
            for child in children.iter().flatten() {
                self.arena.free(*child);
            }
            let cell = self.arena.get_mut(id);
            cell.contents = CellContents::Homogeneous(value);
            tracing::trace!(octant = ?cell.octant, level = cell.level, "collapsed cell");
        }
    }

    /// Calls `f` on every homogeneous cell in breadth first order.
    fn visit_homogeneous(
        &self,
        mut f: impl FnMut(Octant, VoxelData) -> VisitStatus,
    ) -> VisitStatus {
        let mut queue = VecDeque::new();
        queue.push_back(Self::ROOT);
        while let Some(id) = queue.pop_front() {
            let cell = self.arena.get(id);
            match &cell.contents {
                CellContents::Homogeneous(value) => {
                    if f(cell.octant, P::decode(*value)).is_exit() {
                        return VisitStatus::ExitEarly;
                    }
                }
                CellContents::Mixed(children) => queue.extend(children.iter().flatten().copied()),
            }
        }

        VisitStatus::Continue
    }

    /// The number of voxels inside of the grid that are covered by homogeneous cells matching `class` and `material`.
    fn count_homogeneous(&self, class: VoxelClass, material: Option<Attribute>) -> u64 {
        let grid_extent = self.geometry.extent();
        let mut count = 0;
        self.visit_homogeneous(|octant, data| {
            if class.matches(data.state) && material.map_or(true, |m| m == data.attribute) {
                count += Extent3i::from(octant).intersection(&grid_extent).num_points();
            }
            VisitStatus::Continue
        });

        count
    }

    /// Visits cells in breadth first order, with the coarse granularity that the tree stores them.
    ///
    /// Each homogeneous cell matching `class` is visited once with its octant, which may extend past the grid. Each absent
    /// child of a mixed cell is visited once as `VoxelData::OUTSIDE` (if `class` includes outside voxels), reported with the
    /// parent's minimum and the child's edge length.
    pub fn visit_cells(&self, class: VoxelClass, visitor: &mut impl CellVisitor) -> VisitStatus {
        let mut queue = VecDeque::new();
        queue.push_back(Self::ROOT);
        while let Some(id) = queue.pop_front() {
            let cell = self.arena.get(id);
            match &cell.contents {
                CellContents::Homogeneous(value) => {
                    let data = P::decode(*value);
                    if class.matches(data.state) && visitor.visit_cell(cell.octant, data).is_exit() {
                        return VisitStatus::ExitEarly;
                    }
                }
                CellContents::Mixed(children) => {
                    let absent = Octant::new_unchecked(
                        cell.octant.minimum(),
                        cell.octant.edge_length() >> 1,
                    );
                    for slot in children.iter() {
                        match slot {
                            Some(child) => queue.push_back(*child),
                            None => {
                                if class.includes_outside()
                                    && visitor.visit_cell(absent, VoxelData::OUTSIDE).is_exit()
                                {
                                    return VisitStatus::ExitEarly;
                                }
                            }
                        }
                    }
                }
            }
        }

        VisitStatus::Continue
    }
}

impl<P: PackingPolicy> Grid for OctreeGrid<P> {
    fn backend_name(&self) -> &'static str {
        Self::BACKEND_NAME
    }

    #[inline]
    fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    fn get_data(&self, p: Point3i) -> VoxelData {
        if !self.geometry.contains(p) {
            return VoxelData::OUTSIDE;
        }

        P::decode(self.get_cell_value(p))
    }

    fn set_data(&mut self, p: Point3i, data: VoxelData) -> Result<(), GridError> {
        self.geometry.check_contains(p)?;
        self.write(Self::ROOT, p, P::encode(data));

        Ok(())
    }

    /// Writes `state` with `NO_MATERIAL`.
    fn set_state(&mut self, p: Point3i, state: State) -> Result<(), GridError> {
        self.set_data(p, VoxelData::new(state, NO_MATERIAL))
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

        Ok(Box::new(Self::new(geometry)?))
    }

    fn clone_grid(&self) -> Box<dyn Grid> {
        Box::new(self.clone())
    }

    fn find_interruptible(&self, class: VoxelClass, visitor: &mut VoxelVisitor<'_>) -> VisitStatus {
        if class.includes_outside() {
            return scan_grid(self, class, visitor);
        }

        self.visit_homogeneous(|octant, data| {
            visit_region(&self.geometry, &octant.into(), data, class, &mut *visitor)
        })
    }

    fn find_attribute_interruptible(
        &self,
        class: VoxelClass,
        material: Attribute,
        visitor: &mut VoxelVisitor<'_>,
    ) -> VisitStatus {
        if class.includes_outside() {
            return scan_grid(self, class, &mut |p, data| {
                if data.attribute == material {
                    visitor(p, data)
                } else {
                    VisitStatus::Continue
                }
            });
        }

        self.visit_homogeneous(|octant, data| {
            if data.attribute != material {
                return VisitStatus::Continue;
            }
            visit_region(&self.geometry, &octant.into(), data, class, &mut *visitor)
        })
    }

    fn find_count(&self, class: VoxelClass) -> u64 {
        match class {
            VoxelClass::All => self.geometry.num_voxels(),
            VoxelClass::Outside => {
                self.geometry.num_voxels() - self.count_homogeneous(VoxelClass::Marked, None)
            }
            _ => self.count_homogeneous(class, None),
        }
    }

    fn find_count_attribute(&self, material: Attribute) -> u64 {
        self.count_homogeneous(VoxelClass::Marked, Some(material))
    }

    fn remove_attribute(&mut self, material: Attribute) -> Result<u64, GridError> {
        let mut regions = Vec::new();
        self.visit_homogeneous(|octant, data| {
            if !data.is_outside() && data.attribute == material {
                regions.push(Extent3i::from(octant).intersection(&self.geometry.extent()));
            }
            VisitStatus::Continue
        });

        let mut removed = 0;
        for region in regions.iter() {
            for p in region.iter_points() {
                self.set_data(p, VoxelData::OUTSIDE)?;
                removed += 1;
            }
        }
        tracing::debug!(
            backend = Self::BACKEND_NAME,
            material,
            removed,
            cells = self.cell_count(),
            "removed attribute"
        );

        Ok(removed)
    }
}

/// Visits the cells of an `OctreeGrid`.
pub trait CellVisitor {
    fn visit_cell(&mut self, octant: Octant, value: VoxelData) -> VisitStatus;
}

impl<F> CellVisitor for F
where
    F: FnMut(Octant, VoxelData) -> VisitStatus,
{
    #[inline]
    fn visit_cell(&mut self, octant: Octant, value: VoxelData) -> VisitStatus {
        (self)(octant, value)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
