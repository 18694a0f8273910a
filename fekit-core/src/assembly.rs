//! Global stiffness and load assembly.
//!
//! [`AssemblyContext`] owns the global stiffness matrix `K` and load vector
//! `f` and is the only writer during an assembly pass. Element contributions
//! are scatter-added at their DOF indices: `K[i, j] += Ke[a, b]` for every
//! pair of local indices `(a, b)` mapping to global `(i, j)`.
//!
//! Every operation validates its input before writing, so a failed call
//! leaves the accumulator as it was.
//!
//! Parallel assembly uses Rayon with per-thread partial accumulators merged
//! at the end, since elements sharing nodes write to overlapping entries.

use crate::element::{Element, LoadedElement};
use crate::error::{Error, Result};
use crate::topology::{ElementDofs, Topology};
use crate::types::Point2;
use log::{debug, trace};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use std::ops::AddAssign;

/// Assembly options.
#[derive(Debug, Clone, Default)]
pub struct AssemblyOptions {
    /// Compute element contributions in parallel.
    pub parallel: bool,
}

/// Owner of the global stiffness matrix and load vector.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyContext {
    k: DMatrix<f64>,
    f: DVector<f64>,
}

impl AssemblyContext {
    /// Zero-initialized system with `n_dofs` DOFs.
    pub fn new(n_dofs: usize) -> Self {
        Self {
            k: DMatrix::zeros(n_dofs, n_dofs),
            f: DVector::zeros(n_dofs),
        }
    }

    /// Continue accumulating into an existing system.
    pub fn from_parts(k: DMatrix<f64>, f: DVector<f64>) -> Result<Self> {
        if !k.is_square() || k.nrows() != f.len() {
            return Err(Error::Shape(format!(
                "stiffness {}x{} does not match load vector of length {}",
                k.nrows(),
                k.ncols(),
                f.len()
            )));
        }
        Ok(Self { k, f })
    }

    /// Number of DOFs in the system.
    pub fn n_dofs(&self) -> usize {
        self.f.len()
    }

    pub fn stiffness(&self) -> &DMatrix<f64> {
        &self.k
    }

    pub fn load(&self) -> &DVector<f64> {
        &self.f
    }

    pub fn into_parts(self) -> (DMatrix<f64>, DVector<f64>) {
        (self.k, self.f)
    }

    /// Add a nodal load at a 1-based DOF id.
    pub fn add_load(&mut self, dof: usize, value: f64) -> Result<()> {
        if dof == 0 {
            return Err(Error::InvalidDofId);
        }
        if dof > self.n_dofs() {
            return Err(Error::DofOutOfRange {
                dof,
                n_dofs: self.n_dofs(),
            });
        }
        self.f[dof - 1] += value;
        Ok(())
    }

    /// Scatter-add one element's `Ke` (and `fe`).
    ///
    /// Returns the updated stiffness matrix.
    ///
    /// # Errors
    ///
    /// - [`Error::DofOutOfRange`] if a DOF index exceeds the system size
    /// - [`Error::Shape`] if `Ke` or `fe` does not match the number of DOFs
    pub fn assemble_element(
        &mut self,
        dofs: &ElementDofs,
        ke: &DMatrix<f64>,
        fe: Option<&DVector<f64>>,
    ) -> Result<&DMatrix<f64>> {
        self.check_contribution(dofs, ke, fe)?;
        self.scatter(dofs, ke, fe);
        Ok(&self.k)
    }

    /// Scatter-add the same `Ke` (and `fe`) for every element of a topology.
    ///
    /// All rows are validated before anything is written.
    pub fn assemble_batch(
        &mut self,
        topology: &Topology,
        ke: &DMatrix<f64>,
        fe: Option<&DVector<f64>>,
    ) -> Result<&DMatrix<f64>> {
        for (e, dofs) in topology.iter().enumerate() {
            self.check_contribution(dofs, ke, fe)
                .map_err(|err| err.in_element(e))?;
        }
        debug!(
            "assembling {} identical elements into {} DOFs",
            topology.n_elements(),
            self.n_dofs()
        );
        for dofs in topology {
            self.scatter(dofs, ke, fe);
        }
        Ok(&self.k)
    }

    /// Assemble contributions computed per element by `kernel`.
    ///
    /// `kernel(e, dofs)` returns `Ke` and an optional `fe` for element `e`.
    /// Contributions are accumulated into a scratch system and merged only
    /// once every element has succeeded.
    pub fn assemble_with<F>(
        &mut self,
        topology: &Topology,
        options: &AssemblyOptions,
        kernel: F,
    ) -> Result<&DMatrix<f64>>
    where
        F: Fn(usize, &ElementDofs) -> Result<(DMatrix<f64>, Option<DVector<f64>>)> + Sync,
    {
        let n = self.n_dofs();
        debug!(
            "assembling {} elements into {} DOFs (parallel: {})",
            topology.n_elements(),
            n,
            options.parallel
        );

        let add_element = |mut partial: AssemblyContext, (e, dofs): (usize, &ElementDofs)| -> Result<AssemblyContext> {
            trace!("element {}: DOFs {:?}", e, dofs.to_one_based());
            let (ke, fe) = kernel(e, dofs).map_err(|err| err.in_element(e))?;
            partial
                .assemble_element(dofs, &ke, fe.as_ref())
                .map_err(|err| err.in_element(e))?;
            Ok(partial)
        };

        let scratch = if options.parallel {
            topology
                .elements()
                .par_iter()
                .enumerate()
                .try_fold(|| AssemblyContext::new(n), add_element)
                .try_reduce(
                    || AssemblyContext::new(n),
                    |mut a, b| {
                        a += &b;
                        Ok(a)
                    },
                )?
        } else {
            topology
                .iter()
                .enumerate()
                .try_fold(AssemblyContext::new(n), add_element)?
        };

        *self += &scratch;
        Ok(&self.k)
    }

    /// Assemble the stiffness of `element` over every row of `topology`.
    ///
    /// `coords[e]` holds the nodal coordinates of element `e`.
    pub fn assemble_elements<E: Element>(
        &mut self,
        element: &E,
        topology: &Topology,
        coords: &[Vec<Point2>],
        options: &AssemblyOptions,
    ) -> Result<&DMatrix<f64>> {
        check_coordinate_count(topology, coords)?;
        self.assemble_with(topology, options, |e, _| Ok((element.stiffness(&coords[e])?, None)))
    }

    /// Assemble stiffness and distributed-load vectors of `element`.
    pub fn assemble_loaded_elements<E>(
        &mut self,
        element: &E,
        topology: &Topology,
        coords: &[Vec<Point2>],
        load: &E::Load,
        options: &AssemblyOptions,
    ) -> Result<&DMatrix<f64>>
    where
        E: LoadedElement,
        E::Load: Sync,
    {
        check_coordinate_count(topology, coords)?;
        self.assemble_with(topology, options, |e, _| {
            let (ke, fe) = element.stiffness_with_load(&coords[e], load)?;
            Ok((ke, Some(fe)))
        })
    }

    fn check_contribution(&self, dofs: &ElementDofs, ke: &DMatrix<f64>, fe: Option<&DVector<f64>>) -> Result<()> {
        dofs.check_range(self.n_dofs())?;
        let n = dofs.len();
        if ke.shape() != (n, n) {
            return Err(Error::Shape(format!(
                "element stiffness is {}x{}, element has {} DOFs",
                ke.nrows(),
                ke.ncols(),
                n
            )));
        }
        if let Some(fe) = fe {
            if fe.len() != n {
                return Err(Error::Shape(format!(
                    "element load vector has length {}, element has {} DOFs",
                    fe.len(),
                    n
                )));
            }
        }
        Ok(())
    }

    fn scatter(&mut self, dofs: &ElementDofs, ke: &DMatrix<f64>, fe: Option<&DVector<f64>>) {
        let idx = dofs.as_slice();
        for (b, &j) in idx.iter().enumerate() {
            for (a, &i) in idx.iter().enumerate() {
                self.k[(i, j)] += ke[(a, b)];
            }
        }
        if let Some(fe) = fe {
            for (a, &i) in idx.iter().enumerate() {
                self.f[i] += fe[a];
            }
        }
    }
}

impl AddAssign<&AssemblyContext> for AssemblyContext {
    fn add_assign(&mut self, rhs: &AssemblyContext) {
        debug_assert_eq!(self.n_dofs(), rhs.n_dofs());
        self.k += &rhs.k;
        self.f += &rhs.f;
    }
}

fn check_coordinate_count(topology: &Topology, coords: &[Vec<Point2>]) -> Result<()> {
    if coords.len() != topology.n_elements() {
        return Err(Error::Shape(format!(
            "{} element coordinate sets for {} elements",
            coords.len(),
            topology.n_elements()
        )));
    }
    Ok(())
}
