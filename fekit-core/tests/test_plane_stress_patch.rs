use approx::assert_relative_eq;
use fekit_core::element::{PlaneAnalysis, PlaneTri3};
use fekit_core::{
    coordxtr, extract, hooke, solveq, AssemblyContext, AssemblyOptions, BoundaryConditions, Coordinates, DofTable,
    Element, Error,
};

// Uniaxial tension patch of constant strain triangles
//
// MESH
//
// ```text
//   3 -------- 2
//   |       /  |
//   |    /     |      2 x 1 rectangle, two triangles
//   | /        |
//   0 -------- 1
// ```
//
// BOUNDARY CONDITIONS
//
// u = 0 @ nodes 0 and 3; v = 0 @ node 0
// Horizontal force σ·h·t/2 @ nodes 1 and 2
//
// REFERENCE
//
// Uniform stress σxx = σ, so εxx = σ/E, εyy = -ν·σ/E and the right edge
// moves by 2·σ/E.

const E: f64 = 70e9;
const NU: f64 = 0.33;
const SIGMA: f64 = 1e6;
const THICKNESS: f64 = 0.01;

fn rectangle() -> (Coordinates, DofTable, Vec<[usize; 3]>) {
    let coords = Coordinates::from_rows(&[[0.0, 0.0], [2.0, 0.0], [2.0, 1.0], [0.0, 1.0]]).unwrap();
    let dofs = DofTable::new(4, 2);
    (coords, dofs, vec![[0, 1, 2], [0, 2, 3]])
}

fn solve_patch(element: &PlaneTri3) -> Result<(Vec<fekit_core::element::PlaneResult>, nalgebra::DVector<f64>), Error> {
    let (coords, dofs, connectivity) = rectangle();
    let topology = dofs.topology_from_connectivity(&connectivity)?;
    let points = coordxtr(&topology, &coords, &dofs)?.all_points2()?;

    let mut system = AssemblyContext::new(dofs.n_dofs());
    system.assemble_elements(element, &topology, &points, &AssemblyOptions::default())?;
    let nodal = SIGMA * 1.0 * THICKNESS / 2.0;
    system.add_load(3, nodal)?;
    system.add_load(5, nodal)?;

    let bc = BoundaryConditions::from_one_based(&[1, 2, 7], None)?;
    let solution = solveq(system.stiffness(), system.load(), &bc)?;

    let ed = extract(&topology, &solution.a)?;
    Ok((element.recover_batch(&points, &ed, None)?, solution.a))
}

#[test]
fn test_plane_stress_patch() -> Result<(), Error> {
    let element = PlaneTri3::new(PlaneAnalysis::Stress, THICKNESS, hooke(1, E, NU)?)?;
    let (results, a) = solve_patch(&element)?;

    assert_relative_eq!(a[2], 2.0 * SIGMA / E, max_relative = 1e-9);
    assert_relative_eq!(a[5], -NU * SIGMA / E, max_relative = 1e-9);
    for r in &results {
        assert_relative_eq!(r.stress[0], SIGMA, max_relative = 1e-9);
        assert_relative_eq!(r.stress[1], 0.0, epsilon = 1e-3);
        assert_relative_eq!(r.stress[2], 0.0, epsilon = 1e-3);
        assert_relative_eq!(r.strain[1], -NU * SIGMA / E, max_relative = 1e-9);
    }
    Ok(())
}

#[test]
fn test_plane_stress_patch_from_3d_law() -> Result<(), Error> {
    // The 6x6 law reduced to plane stress gives the same response, plus εzz.
    let element = PlaneTri3::new(PlaneAnalysis::Stress, THICKNESS, hooke(4, E, NU)?)?;
    let (results, a) = solve_patch(&element)?;

    assert_relative_eq!(a[2], 2.0 * SIGMA / E, max_relative = 1e-9);
    for r in &results {
        assert_eq!(r.stress.len(), 4);
        assert_relative_eq!(r.stress[0], SIGMA, max_relative = 1e-9);
        assert_eq!(r.stress[2], 0.0);
        assert_relative_eq!(r.strain[2], -NU * SIGMA / E, max_relative = 1e-8);
    }
    Ok(())
}
