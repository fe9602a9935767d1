//! Behavior every backend must share, checked through `Box<dyn Grid>`.

use voxel_grid_core::prelude::*;
use voxel_grid_storage::prelude::*;

use pretty_assertions::assert_eq;
use rand::prelude::*;
use utilities::{
    data_sets::fill_sphere,
    random::{apply_writes, assert_same_voxels, random_writes, reference_grid},
};

fn builder(shape: Point3i) -> GridBuilder {
    GridBuilder::new(BackendKind::default(), shape, 0.5, 0.5).with_block_order(2)
}

fn all_grids(shape: Point3i) -> Vec<(BackendKind, Box<dyn Grid>)> {
    let builder = builder(shape);

    BackendKind::ALL
        .iter()
        .map(|&kind| (kind, builder.with_backend(kind).build().unwrap()))
        .collect()
}

#[test]
fn new_grids_are_entirely_outside() {
    for (kind, grid) in all_grids(PointN([5, 7, 6])) {
        assert_eq!(grid.find_count(VoxelClass::All), 210, "{:?}", kind);
        assert_eq!(grid.find_count(VoxelClass::Outside), 210, "{:?}", kind);
        assert_eq!(grid.find_count(VoxelClass::Marked), 0, "{:?}", kind);
        assert_eq!(grid.get_data(PointN([4, 6, 5])), VoxelData::OUTSIDE);
    }
}

#[test]
fn random_writes_agree_with_dense_reference() {
    let shape = PointN([12, 9, 10]);
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let writes = random_writes(&mut rng, shape, 600, 60);
    let reference = reference_grid(builder(shape).geometry().unwrap(), &writes).unwrap();

    for (kind, mut grid) in all_grids(shape) {
        apply_writes(grid.as_mut(), &writes).unwrap();

        assert_same_voxels(&reference, grid.as_ref(), kind.stores_attributes());
        for class in VoxelClass::ALL.iter().copied() {
            assert_eq!(
                grid.find_count(class),
                reference.find_count(class),
                "{:?} {:?}",
                kind,
                class
            );
        }
    }
}

#[test]
fn find_visits_exactly_the_counted_voxels() {
    let shape = Point3i::fill(8);

    for (kind, mut grid) in all_grids(shape) {
        fill_sphere(grid.as_mut(), 5).unwrap();

        for class in VoxelClass::ALL.iter().copied() {
            let mut visited = Vec::new();
            grid.find(class, &mut |p, data| {
                assert!(class.matches(data.state));
                visited.push(p);
            });
            let num_visited = visited.len() as u64;
            visited.sort_by_key(|p| (p.x(), p.y(), p.z()));
            visited.dedup();

            assert_eq!(visited.len() as u64, num_visited, "{:?} {:?}", kind, class);
            assert_eq!(num_visited, grid.find_count(class), "{:?} {:?}", kind, class);
        }
    }
}

#[test]
fn early_exit_stops_after_the_requested_number_of_callbacks() {
    for (kind, mut grid) in all_grids(Point3i::fill(8)) {
        fill_sphere(grid.as_mut(), 2).unwrap();

        for &class in [VoxelClass::Marked, VoxelClass::Outside, VoxelClass::All].iter() {
            let mut calls = 0;
            let status = grid.find_interruptible(class, &mut |_, _| {
                calls += 1;
                VisitStatus::from(calls < 5)
            });

            assert_eq!(status, VisitStatus::ExitEarly, "{:?} {:?}", kind, class);
            assert_eq!(calls, 5, "{:?} {:?}", kind, class);
        }

    }
}

#[test]
fn traversal_with_no_matches_makes_no_callbacks() {
    for (kind, grid) in all_grids(Point3i::fill(8)) {
        for &class in [VoxelClass::Marked, VoxelClass::Exterior, VoxelClass::Interior].iter() {
            let mut calls = 0;
            let status = grid.find_interruptible(class, &mut |_, _| {
                calls += 1;
                VisitStatus::ExitEarly
            });

            assert_eq!(status, VisitStatus::Continue, "{:?} {:?}", kind, class);
            assert_eq!(calls, 0, "{:?} {:?}", kind, class);
        }
    }
}

#[test]
fn outside_writes_drop_the_attribute() {
    for (kind, mut grid) in all_grids(Point3i::fill(4)) {
        let p = PointN([2, 1, 3]);
        grid.set_data(p, VoxelData::new(State::Outside, 9)).unwrap();
        assert_eq!(grid.get_data(p), VoxelData::OUTSIDE, "{:?}", kind);

        grid.set_data(p, VoxelData::new(State::Interior, 9)).unwrap();
        grid.set_data(p, VoxelData::new(State::Outside, 9)).unwrap();
        assert_eq!(grid.get_data(p), VoxelData::OUTSIDE, "{:?}", kind);
        assert_eq!(grid.find_count_attribute(9), 0, "{:?}", kind);
    }
}

#[test]
fn writes_are_idempotent() {
    for (kind, mut grid) in all_grids(Point3i::fill(6)) {
        let p = PointN([5, 0, 1]);
        let data = VoxelData::new(State::Exterior, 4);
        grid.set_data(p, data).unwrap();
        let once = grid.to_string_all();
        grid.set_data(p, data).unwrap();

        assert_eq!(grid.to_string_all(), once, "{:?}", kind);
        assert_eq!(grid.find_count(VoxelClass::Marked), 1, "{:?}", kind);
    }
}

#[test]
fn out_of_bounds_writes_are_errors_and_reads_are_outside() {
    for (kind, mut grid) in all_grids(Point3i::fill(4)) {
        for &p in [PointN([-1, 0, 0]), PointN([0, 4, 0]), PointN([0, 0, 17])].iter() {
            let result = grid.set_data(p, VoxelData::new(State::Interior, 1));
            assert!(
                matches!(result, Err(GridError::OutOfBounds { .. })),
                "{:?} {:?}",
                kind,
                result
            );
            assert_eq!(grid.get_data(p), VoxelData::OUTSIDE);
            assert!(!grid.inside_grid(p));
        }
        assert_eq!(grid.find_count(VoxelClass::Marked), 0);
    }
}

#[test]
fn removing_a_material_keeps_the_others() {
    let shape = Point3i::fill(8);

    for (kind, mut grid) in all_grids(shape) {
        if !kind.stores_attributes() {
            continue;
        }

        let (_, written) = fill_sphere(grid.as_mut(), 3).unwrap();
        for x in 0..8 {
            grid.set_data(PointN([x, 0, 0]), VoxelData::new(State::Interior, 4))
                .unwrap();
        }

        assert_eq!(grid.find_count_attribute(3), written, "{:?}", kind);
        assert_eq!(grid.remove_attribute(3).unwrap(), written, "{:?}", kind);
        assert_eq!(grid.find_count_attribute(3), 0, "{:?}", kind);
        assert_eq!(grid.find_count_attribute(4), 8, "{:?}", kind);
        assert_eq!(grid.find_count(VoxelClass::Marked), 8, "{:?}", kind);
        assert_eq!(grid.remove_attribute(3).unwrap(), 0, "{:?}", kind);
    }
}

#[test]
fn reassigning_materials_merges_them() {
    for (kind, mut grid) in all_grids(Point3i::fill(4)) {
        if !kind.stores_attributes() {
            continue;
        }

        grid.set_data(PointN([0, 0, 0]), VoxelData::new(State::Interior, 1))
            .unwrap();
        grid.set_data(PointN([1, 0, 0]), VoxelData::new(State::Exterior, 2))
            .unwrap();
        grid.set_data(PointN([2, 0, 0]), VoxelData::new(State::Interior, 3))
            .unwrap();

        assert_eq!(grid.reassign_attribute(&[1, 2], 3).unwrap(), 2, "{:?}", kind);
        assert_eq!(grid.find_count_attribute(3), 3, "{:?}", kind);
        assert_eq!(
            grid.get_data(PointN([1, 0, 0])),
            VoxelData::new(State::Exterior, 3),
            "{:?}",
            kind
        );
    }
}

#[test]
fn single_interior_voxel() {
    for (kind, mut grid) in all_grids(Point3i::fill(4)) {
        let p = PointN([1, 1, 1]);
        grid.set_data(p, VoxelData::new(State::Interior, 3)).unwrap();

        assert_eq!(grid.get_state(p), State::Interior, "{:?}", kind);
        if kind.stores_attributes() {
            assert_eq!(grid.get_attribute(p), 3, "{:?}", kind);
        }
        assert_eq!(grid.find_count(VoxelClass::All), 64, "{:?}", kind);
        assert_eq!(grid.find_count(VoxelClass::Interior), 1, "{:?}", kind);
        assert_eq!(grid.find_count(VoxelClass::Outside), 63, "{:?}", kind);
    }

    let geom = GridGeometry::new(Point3i::fill(4), 1.0, 1.0).unwrap();
    let mut octree = OctreeGridShort::new(geom).unwrap();
    octree
        .set_data(PointN([1, 1, 1]), VoxelData::new(State::Interior, 3))
        .unwrap();

    // Root, one child on the path, and the terminal voxel.
    assert_eq!(octree.cell_count(), 3);
}

#[test]
fn clones_are_independent() {
    for (kind, mut grid) in all_grids(Point3i::fill(4)) {
        let p = PointN([3, 3, 3]);
        grid.set_data(p, VoxelData::new(State::Interior, 1)).unwrap();

        let mut copy = grid.clone();
        copy.set_data(p, VoxelData::OUTSIDE).unwrap();
        copy.set_data(Point3i::ZERO, VoxelData::new(State::Exterior, 2))
            .unwrap();

        assert_eq!(grid.get_state(p), State::Interior, "{:?}", kind);
        assert_eq!(grid.get_state(Point3i::ZERO), State::Outside, "{:?}", kind);
        assert_eq!(copy.get_state(p), State::Outside, "{:?}", kind);
        assert_eq!(copy.backend_name(), grid.backend_name());
    }
}

#[test]
fn create_empty_uses_the_same_backend() {
    for (kind, mut grid) in all_grids(Point3i::fill(4)) {
        grid.set_data(Point3i::ZERO, VoxelData::new(State::Interior, 1))
            .unwrap();

        let empty = grid.create_empty(PointN([8, 2, 8]), 0.25, 0.25).unwrap();
        assert_eq!(empty.backend_name(), grid.backend_name(), "{:?}", kind);
        assert_eq!(empty.geometry().shape(), PointN([8, 2, 8]));
        assert_eq!(empty.find_count(VoxelClass::Outside), 128, "{:?}", kind);
    }
}

#[test]
fn string_slices_show_rows_from_high_z() {
    for (kind, mut grid) in all_grids(PointN([3, 2, 2])) {
        grid.set_data(PointN([0, 1, 1]), VoxelData::new(State::Interior, 1))
            .unwrap();
        grid.set_data(PointN([2, 1, 0]), VoxelData::new(State::Exterior, 1))
            .unwrap();

        assert_eq!(grid.to_string_slice(0), "0 0 0 \n0 0 0 \n", "{:?}", kind);
        assert_eq!(grid.to_string_slice(1), "2 0 0 \n0 0 1 \n", "{:?}", kind);
    }
}

#[test]
fn world_coordinates_round_trip_through_voxel_centers() {
    for (kind, grid) in all_grids(Point3i::fill(4)) {
        for p in grid.geometry().extent().iter_points() {
            let w = grid.get_world_coords(p);
            assert_eq!(grid.get_grid_coords(w), p, "{:?}", kind);
            assert!(grid.inside_grid_world(w));
        }
    }
}

#[test]
fn non_finite_world_coordinates_never_reach_the_grid() {
    let non_finite = [
        Point3d::fill(f64::NAN),
        PointN([0.1, f64::NAN, 0.1]),
        PointN([f64::INFINITY, 0.1, 0.1]),
        PointN([0.1, 0.1, f64::NEG_INFINITY]),
    ];

    for (kind, mut grid) in all_grids(Point3i::fill(4)) {
        for &w in non_finite.iter() {
            assert!(!grid.inside_grid_world(w), "{:?} {:?}", kind, w);

            let result = grid.set_data_world(w, VoxelData::new(State::Interior, 5));
            assert!(
                matches!(result, Err(GridError::OutOfBounds { .. })),
                "{:?} {:?}",
                kind,
                result
            );
            assert_eq!(grid.get_data_world(w), VoxelData::OUTSIDE);
        }
        assert_eq!(grid.get_data(Point3i::ZERO), VoxelData::OUTSIDE, "{:?}", kind);
        assert_eq!(grid.find_count(VoxelClass::Marked), 0, "{:?}", kind);
    }
}

#[test]
fn material_index_stays_consistent_over_every_backend() {
    let shape = PointN([8, 6, 8]);
    let mut rng = StdRng::seed_from_u64(0x1d3);
    let writes = random_writes(&mut rng, shape, 400, 12);
    let reference = reference_grid(builder(shape).geometry().unwrap(), &writes).unwrap();

    for (kind, grid) in all_grids(shape) {
        let mut grid = MaterialIndexedGrid::new(grid);
        apply_writes(&mut grid, &writes).unwrap();

        assert_same_voxels(&reference, &grid, kind.stores_attributes());
        assert_eq!(
            grid.find_count(VoxelClass::Marked),
            reference.find_count(VoxelClass::Marked),
            "{:?}",
            kind
        );
        if !kind.stores_attributes() {
            continue;
        }

        for material in 1..=12 {
            assert_eq!(
                grid.find_count_attribute(material),
                reference.find_count_attribute(material),
                "{:?} {}",
                kind,
                material
            );

            let mut indexed = Vec::new();
            grid.find_attribute(VoxelClass::Interior, material, &mut |p, _| indexed.push(p));
            let mut scanned = Vec::new();
            reference.find_attribute(VoxelClass::Interior, material, &mut |p, _| scanned.push(p));
            assert_eq!(indexed, scanned, "{:?} {}", kind, material);
        }

        let removed = reference.find_count_attribute(5);
        assert_eq!(grid.remove_attribute(5).unwrap(), removed, "{:?}", kind);
        assert_eq!(grid.inner().find_count_attribute(5), 0, "{:?}", kind);

        let merged = reference.find_count_attribute(6) + reference.find_count_attribute(7);
        assert_eq!(grid.reassign_attribute(&[6], 7).unwrap(), reference.find_count_attribute(6));
        assert_eq!(grid.find_count_attribute(7), merged, "{:?}", kind);
        assert_eq!(grid.inner().find_count_attribute(7), merged, "{:?}", kind);
    }
}

#[test]
fn occupied_voxels_reject_other_materials_on_every_backend() {
    let p = PointN([2, 1, 3]);

    for (kind, grid) in all_grids(Point3i::fill(4)) {
        let mut grid = OccupiedGrid::new(grid);
        grid.set_data(p, VoxelData::new(State::Interior, 1)).unwrap();

        let result = grid.set_data(p, VoxelData::new(State::Exterior, 2));
        if kind.stores_attributes() {
            assert_eq!(
                result,
                Err(GridError::Occupied {
                    point: p,
                    existing: 1
                }),
                "{:?}",
                kind
            );
            assert_eq!(grid.get_data(p), VoxelData::new(State::Interior, 1), "{:?}", kind);
        }

        grid.set_data(p, VoxelData::OUTSIDE).unwrap();
        grid.set_data(p, VoxelData::new(State::Exterior, 2)).unwrap();
        assert_eq!(grid.get_state(p), State::Exterior, "{:?}", kind);
        assert_eq!(grid.find_count(VoxelClass::Marked), 1, "{:?}", kind);
    }
}
