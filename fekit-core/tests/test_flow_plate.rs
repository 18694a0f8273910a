use approx::assert_relative_eq;
use fekit_core::element::FlowTri3;
use fekit_core::{
    coordxtr, extract, solve_constrained, AssemblyContext, AssemblyOptions, BoundaryConditions, BoundaryDofs,
    Coordinates, DofTable, Error, SolverConfig, SolverType,
};

// Steady heat flow through a square plate
//
// MESH
//
// Unit square, 2×2 cells, each split into two counter-clockwise triangles.
//
// ```text
//   6 ---- 7 ---- 8
//   |    / |    / |
//   |  /   |  /   |
//   3 ---- 4 ---- 5
//   |    / |    / |
//   |  /   |  /   |
//   0 ---- 1 ---- 2
// ```
//
// BOUNDARY CONDITIONS
//
// T = 0 on the left edge (marker 10)
// T = 10 on the right edge (marker 20)
// Top and bottom edges insulated
//
// PARAMETERS
//
// Thickness t = 0.5, isotropic conductivity k = 1.7
//
// REFERENCE
//
// The exact field T = 10·x is linear, so the triangles reproduce it exactly:
// gradient (10, 0) and flux (-10·k, 0) in every element.

const K: f64 = 1.7;
const T: f64 = 0.5;

fn plate() -> (Coordinates, Vec<[usize; 3]>) {
    let mut rows = Vec::new();
    for j in 0..3 {
        for i in 0..3 {
            rows.push([0.5 * i as f64, 0.5 * j as f64]);
        }
    }
    let mut connectivity = Vec::new();
    for j in 0..2 {
        for i in 0..2 {
            let n0 = 3 * j + i;
            let (n1, n2, n3) = (n0 + 1, n0 + 4, n0 + 3);
            connectivity.push([n0, n1, n2]);
            connectivity.push([n0, n2, n3]);
        }
    }
    (Coordinates::from_rows(&rows).unwrap(), connectivity)
}

#[test]
fn test_flow_plate() -> Result<(), Error> {
    // mesh
    let (coords, connectivity) = plate();
    let dofs = DofTable::new(coords.n_nodes(), 1);
    let topology = dofs.topology_from_connectivity(&connectivity)?;
    let points = coordxtr(&topology, &coords, &dofs)?.all_points2()?;

    let mut boundary = BoundaryDofs::new();
    boundary.insert(10, &[1, 4, 7])?;
    boundary.insert(20, &[3, 6, 9])?;

    // assembly
    let element = FlowTri3::isotropic(T, K)?;
    let mut system = AssemblyContext::new(dofs.n_dofs());
    system.assemble_elements(&element, &topology, &points, &AssemblyOptions { parallel: true })?;
    let (k, f) = system.into_parts();

    // solve
    let mut bc = BoundaryConditions::new();
    bc.apply_marker(&boundary, 10, 0.0)?;
    bc.apply_marker(&boundary, 20, 10.0)?;
    let config = SolverConfig {
        solver_type: SolverType::SparseCholesky,
        ..Default::default()
    };
    let solution = solve_constrained(&k, &f, &bc, &config)?;

    for node in 0..coords.n_nodes() {
        let x = coords.node(node).map_or(f64::NAN, |p| p[0]);
        assert_relative_eq!(solution.a[node], 10.0 * x, epsilon = 1e-10);
    }

    // heat enters on the right and leaves on the left
    let right: f64 = [2, 5, 8].iter().map(|&i| solution.q[i]).sum();
    let left: f64 = [0, 3, 6].iter().map(|&i| solution.q[i]).sum();
    assert_relative_eq!(right, 10.0 * K * T, max_relative = 1e-10);
    assert_relative_eq!(left, -right, max_relative = 1e-10);

    // element flux
    let ed = extract(&topology, &solution.a)?;
    let (flows, gradients) = element.flows(&points, &ed)?;
    assert_eq!(flows.shape(), (8, 2));
    for e in 0..8 {
        assert_relative_eq!(gradients[(e, 0)], 10.0, epsilon = 1e-9);
        assert_relative_eq!(gradients[(e, 1)], 0.0, epsilon = 1e-9);
        assert_relative_eq!(flows[(e, 0)], -10.0 * K, epsilon = 1e-9);
        assert_relative_eq!(flows[(e, 1)], 0.0, epsilon = 1e-9);
    }
    Ok(())
}

#[test]
fn test_flow_plate_heat_supply() -> Result<(), Error> {
    // Uniform supply Q with all edges held at T = 0: total supply leaves as reactions.
    let (coords, connectivity) = plate();
    let dofs = DofTable::new(coords.n_nodes(), 1);
    let topology = dofs.topology_from_connectivity(&connectivity)?;
    let points = coordxtr(&topology, &coords, &dofs)?.all_points2()?;

    let element = FlowTri3::isotropic(T, K)?;
    let mut system = AssemblyContext::new(dofs.n_dofs());
    system.assemble_loaded_elements(&element, &topology, &points, &100.0, &AssemblyOptions::default())?;

    let edge: Vec<usize> = (1..=9).filter(|&id| id != 5).collect();
    let bc = BoundaryConditions::from_one_based(&edge, None)?;
    let solution = solve_constrained(system.stiffness(), system.load(), &bc, &SolverConfig::default())?;

    assert!(solution.a[4] > 0.0);
    assert_relative_eq!(solution.q.sum(), -100.0 * 1.0 * T, max_relative = 1e-10);
    Ok(())
}

#[test]
fn test_unknown_marker_is_reported() {
    let boundary = BoundaryDofs::new();
    let mut bc = BoundaryConditions::new();
    assert!(matches!(
        bc.apply_marker(&boundary, 30, 0.0),
        Err(Error::UnknownBoundaryMarker(30))
    ));
}
