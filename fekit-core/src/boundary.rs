//! Prescribed-DOF boundary conditions.
//!
//! DOF ids enter 1-based and are stored 0-based. Each DOF may be prescribed
//! once; the prescribed set partitions the system into free and prescribed
//! DOFs for the constrained solve.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Prescribed DOFs and their values, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryConditions {
    entries: Vec<(usize, f64)>,
    index: HashMap<usize, usize>,
}

impl BoundaryConditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prescribe a value at a 1-based DOF id.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDofId`] for id 0
    /// - [`Error::DuplicateConstraint`] if the DOF is already prescribed
    pub fn prescribe(&mut self, dof: usize, value: f64) -> Result<()> {
        if dof == 0 {
            return Err(Error::InvalidDofId);
        }
        if self.index.contains_key(&(dof - 1)) {
            return Err(Error::DuplicateConstraint { dof });
        }
        self.index.insert(dof - 1, self.entries.len());
        self.entries.push((dof - 1, value));
        Ok(())
    }

    /// Build from 1-based DOF ids; missing values default to zero.
    pub fn from_one_based(dofs: &[usize], values: Option<&[f64]>) -> Result<Self> {
        if let Some(values) = values {
            if values.len() != dofs.len() {
                return Err(Error::Shape(format!(
                    "{} prescribed DOFs, {} prescribed values",
                    dofs.len(),
                    values.len()
                )));
            }
        }
        let mut bc = Self::new();
        for (i, &dof) in dofs.iter().enumerate() {
            bc.prescribe(dof, values.map_or(0.0, |v| v[i]))?;
        }
        Ok(bc)
    }

    /// Prescribe `value` on every DOF of a boundary marker.
    ///
    /// DOFs shared with an earlier marker (corner nodes) are accepted when
    /// they carry the same value.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownBoundaryMarker`] if the marker has no DOFs
    /// - [`Error::DuplicateConstraint`] if a shared DOF gets a different value
    pub fn apply_marker(&mut self, boundary: &BoundaryDofs, marker: i32, value: f64) -> Result<()> {
        let dofs = boundary
            .dofs(marker)
            .ok_or(Error::UnknownBoundaryMarker(marker))?;

        for &dof in dofs {
            if let Some(&pos) = self.index.get(&dof) {
                if self.entries[pos].1 != value {
                    return Err(Error::DuplicateConstraint { dof: dof + 1 });
                }
            }
        }
        for &dof in dofs {
            if !self.index.contains_key(&dof) {
                self.index.insert(dof, self.entries.len());
                self.entries.push((dof, value));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prescribed value at a 0-based DOF index.
    pub fn value(&self, dof: usize) -> Option<f64> {
        self.index.get(&dof).map(|&pos| self.entries[pos].1)
    }

    /// `(dof, value)` pairs with 0-based DOF indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Check every prescribed DOF against a system of `n_dofs` DOFs.
    pub fn check_range(&self, n_dofs: usize) -> Result<()> {
        match self.entries.iter().find(|(dof, _)| *dof >= n_dofs) {
            Some(&(dof, _)) => Err(Error::DofOutOfRange { dof: dof + 1, n_dofs }),
            None => Ok(()),
        }
    }

    /// 0-based free and prescribed DOF indices, both ascending.
    pub fn partition(&self, n_dofs: usize) -> (Vec<usize>, Vec<usize>) {
        (0..n_dofs).partition(|dof| !self.index.contains_key(dof))
    }
}

/// Boundary DOFs grouped by marker, as produced by mesh generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryDofs {
    markers: HashMap<i32, Vec<usize>>,
}

impl BoundaryDofs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add 1-based DOF ids to a marker. Ids already listed are ignored.
    pub fn insert(&mut self, marker: i32, dofs: &[usize]) -> Result<()> {
        if dofs.contains(&0) {
            return Err(Error::InvalidDofId);
        }
        let entry = self.markers.entry(marker).or_default();
        for &dof in dofs {
            if !entry.contains(&(dof - 1)) {
                entry.push(dof - 1);
            }
        }
        Ok(())
    }

    /// 0-based DOF indices of a marker.
    pub fn dofs(&self, marker: i32) -> Option<&[usize]> {
        self.markers.get(&marker).map(Vec::as_slice)
    }

    pub fn markers(&self) -> impl Iterator<Item = i32> + '_ {
        self.markers.keys().copied()
    }
}
