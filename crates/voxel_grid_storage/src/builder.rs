//! Constructing grids from plain configuration.
//!
//! `GridBuilder` holds everything needed to construct any backend, and it can be (de)serialized with serde, so an application
//! can choose its backend from a config file.
//!
//! ```
//! use voxel_grid_core::prelude::*;
//! use voxel_grid_storage::prelude::*;
//!
//! let mut grid = GridBuilder::new(BackendKind::OctreeShort, PointN([32, 32, 32]), 0.25, 0.25)
//!     .with_origin(PointN([-4.0, 0.0, -4.0]))
//!     .build()
//!     .unwrap();
//!
//! grid.set_data_world(PointN([-3.9, 0.1, -3.9]), VoxelData::new(State::Interior, 3)).unwrap();
//! assert_eq!(grid.get_data(Point3i::ZERO), VoxelData::new(State::Interior, 3));
//! assert_eq!(grid.backend_name(), "octree");
//! ```

use crate::{
    ArrayGridByte, ArrayGridInt, ArrayGridLong, ArrayGridShort, BlockGridByte, BlockGridShort, Grid,
    MaterialIndexGrid, MaterialIndexedGrid, OccupiedGrid, OctreeGridByte, OctreeGridShort,
    SliceGridInt, SliceKind, TwoBitBlockGrid, DEFAULT_BLOCK_ORDER,
};

use voxel_grid_core::prelude::*;

use serde::{Deserialize, Serialize};

/// Every backend (and packing width) that `GridBuilder` can construct.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum BackendKind {
    ArrayByte,
    ArrayShort,
    ArrayInt,
    ArrayLong,
    BlockByte,
    BlockShort,
    TwoBitBlock,
    OctreeByte,
    OctreeShort,
    MaterialIndex,
    SliceDense,
    SliceSparse,
}

impl BackendKind {
    pub const ALL: [BackendKind; 12] = [
        BackendKind::ArrayByte,
        BackendKind::ArrayShort,
        BackendKind::ArrayInt,
        BackendKind::ArrayLong,
        BackendKind::BlockByte,
        BackendKind::BlockShort,
        BackendKind::TwoBitBlock,
        BackendKind::OctreeByte,
        BackendKind::OctreeShort,
        BackendKind::MaterialIndex,
        BackendKind::SliceDense,
        BackendKind::SliceSparse,
    ];

    /// True if this backend only accepts geometry with `pixel_size == slice_height`.
    pub fn requires_cubic_voxels(self) -> bool {
        matches!(
            self,
            BackendKind::TwoBitBlock | BackendKind::OctreeByte | BackendKind::OctreeShort
        )
    }

    /// True if this backend stores an attribute for every voxel.
    pub fn stores_attributes(self) -> bool {
        self != BackendKind::TwoBitBlock
    }
}

impl Default for BackendKind {
    fn default() -> Self {
        BackendKind::ArrayShort
    }
}

fn default_block_order() -> u32 {
    DEFAULT_BLOCK_ORDER
}

/// The parameters needed to construct a grid.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct GridBuilder {
    pub backend: BackendKind,
    /// The number of voxels along each axis.
    pub shape: Point3i,
    /// The world size of a voxel along X and Z.
    pub pixel_size: f64,
    /// The world size of a voxel along Y.
    pub slice_height: f64,
    /// The world position of the minimum corner of voxel `(0, 0, 0)`.
    #[serde(default)]
    pub origin: Option<Point3d>,
    /// Only used by the block backends.
    #[serde(default = "default_block_order")]
    pub block_order: u32,
    /// Wrap the grid in an `OccupiedGrid`.
    #[serde(default)]
    pub reject_occupied: bool,
    /// Wrap the grid in a `MaterialIndexedGrid`. This is the outermost wrapper.
    #[serde(default)]
    pub index_materials: bool,
}

impl GridBuilder {
    pub fn new(backend: BackendKind, shape: Point3i, pixel_size: f64, slice_height: f64) -> Self {
        Self {
            backend,
            shape,
            pixel_size,
            slice_height,
            origin: None,
            block_order: DEFAULT_BLOCK_ORDER,
            reject_occupied: false,
            index_materials: false,
        }
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_origin(mut self, origin: Point3d) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_block_order(mut self, block_order: u32) -> Self {
        self.block_order = block_order;
        self
    }

    pub fn with_reject_occupied(mut self, reject_occupied: bool) -> Self {
        self.reject_occupied = reject_occupied;
        self
    }

    pub fn with_index_materials(mut self, index_materials: bool) -> Self {
        self.index_materials = index_materials;
        self
    }

    /// Validates the shape and voxel sizes.
    pub fn geometry(&self) -> Result<GridGeometry, GridError> {
        GridGeometry::with_origin(
            self.shape,
            self.pixel_size,
            self.slice_height,
            self.origin.unwrap_or_else(|| Point3d::fill(0.0)),
        )
    }

    pub fn build(&self) -> Result<Box<dyn Grid>, GridError> {
        let geometry = self.geometry()?;
        let order = self.block_order;

        let mut grid: Box<dyn Grid> = match self.backend {
            BackendKind::ArrayByte => Box::new(ArrayGridByte::new(geometry)),
            BackendKind::ArrayShort => Box::new(ArrayGridShort::new(geometry)),
            BackendKind::ArrayInt => Box::new(ArrayGridInt::new(geometry)),
            BackendKind::ArrayLong => Box::new(ArrayGridLong::new(geometry)),
            BackendKind::BlockByte => Box::new(BlockGridByte::with_block_order(geometry, order)?),
            BackendKind::BlockShort => Box::new(BlockGridShort::with_block_order(geometry, order)?),
            BackendKind::TwoBitBlock => {
                Box::new(TwoBitBlockGrid::with_block_order(geometry, order)?)
            }
            BackendKind::OctreeByte => Box::new(OctreeGridByte::new(geometry)?),
            BackendKind::OctreeShort => Box::new(OctreeGridShort::new(geometry)?),
            BackendKind::MaterialIndex => Box::new(MaterialIndexGrid::new(geometry)),
            BackendKind::SliceDense => Box::new(SliceGridInt::new(geometry, SliceKind::Dense)),
            BackendKind::SliceSparse => Box::new(SliceGridInt::new(geometry, SliceKind::Sparse)),
        };
        if self.reject_occupied {
            grid = Box::new(OccupiedGrid::new(grid));
        }
        if self.index_materials {
            grid = Box::new(MaterialIndexedGrid::new(grid));
        }

        Ok(grid)
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

    #[test]
    fn builds_every_backend() {
        let builder = GridBuilder::new(BackendKind::default(), PointN([6, 5, 4]), 0.5, 0.5)
            .with_block_order(2);

        let mut names = Vec::new();
        for kind in BackendKind::ALL.iter().copied() {
            let grid = builder.with_backend(kind).build().unwrap();
            assert_eq!(grid.geometry().shape(), PointN([6, 5, 4]));
            assert_eq!(grid.find_count(VoxelClass::Outside), 120);
            names.push(grid.backend_name());
        }
        names.dedup();

        assert_eq!(
            names,
            vec![
                "array",
                "block",
                "two_bit_block",
                "octree",
                "material_index",
                "slice"
            ]
        );
    }

    #[test]
    fn cubic_voxels_are_required_where_needed() {
        let builder = GridBuilder::new(BackendKind::default(), Point3i::fill(4), 1.0, 0.5);

        for kind in BackendKind::ALL.iter().copied() {
            let result = builder.with_backend(kind).build();
            assert_eq!(result.is_err(), kind.requires_cubic_voxels(), "{:?}", kind);
        }
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let builder = GridBuilder::new(BackendKind::BlockByte, PointN([4, 0, 4]), 1.0, 1.0);
        assert!(matches!(builder.build(), Err(GridError::InvalidGeometry(_))));

        let builder = GridBuilder::new(BackendKind::BlockByte, Point3i::fill(4), 1.0, 1.0)
            .with_block_order(11);
        assert!(matches!(builder.build(), Err(GridError::InvalidGeometry(_))));
    }

    #[test]
    fn wrappers_are_applied_from_config() {
        let builder = GridBuilder::new(BackendKind::BlockShort, Point3i::fill(4), 1.0, 1.0)
            .with_reject_occupied(true)
            .with_index_materials(true);
        let mut grid = builder.build().unwrap();
        let p = PointN([1, 2, 3]);

        assert_eq!(grid.backend_name(), "block");
        grid.set_data(p, VoxelData::new(State::Interior, 2)).unwrap();
        assert!(matches!(
            grid.set_data(p, VoxelData::new(State::Interior, 3)),
            Err(GridError::Occupied { existing: 2, .. })
        ));
        assert_eq!(grid.find_count_attribute(2), 1);
        assert_eq!(grid.find_count_attribute(3), 0);

        let mut plain = builder.with_reject_occupied(false).build().unwrap();
        plain.set_data(p, VoxelData::new(State::Interior, 2)).unwrap();
        plain.set_data(p, VoxelData::new(State::Interior, 3)).unwrap();
        assert_eq!(plain.find_count_attribute(3), 1);
    }

    #[test]
    fn origin_shifts_world_coordinates() {
        let grid = GridBuilder::new(BackendKind::ArrayByte, Point3i::fill(2), 1.0, 1.0)
            .with_origin(PointN([10.0, 20.0, 30.0]))
            .build()
            .unwrap();

        assert_eq!(grid.get_grid_coords(PointN([11.5, 20.5, 30.5])), PointN([1, 0, 0]));
        assert_eq!(grid.get_world_coords(Point3i::ZERO), PointN([10.5, 20.5, 30.5]));
    }
}
