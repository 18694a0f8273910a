//! Element displacement extraction.
//!
//! Gathers the global solution at each element's DOF indices. The batch form
//! returns one row per element, ready for element recovery.

use crate::error::Result;
use crate::topology::{ElementDofs, Topology};
use nalgebra::{DMatrix, DVector};

/// Element values `ed[a] = a[dofs[a]]` for one element.
pub fn extract_element(dofs: &ElementDofs, a: &DVector<f64>) -> Result<DVector<f64>> {
    dofs.check_range(a.len())?;
    Ok(DVector::from_iterator(dofs.len(), dofs.as_slice().iter().map(|&i| a[i])))
}

/// Element values for every element, shape `[n_elements x dofs_per_element]`.
pub fn extract(topology: &Topology, a: &DVector<f64>) -> Result<DMatrix<f64>> {
    topology.check_range(a.len())?;
    let elements = topology.elements();
    Ok(DMatrix::from_fn(topology.n_elements(), topology.dofs_per_element(), |e, j| {
        a[elements[e].as_slice()[j]]
    }))
}
