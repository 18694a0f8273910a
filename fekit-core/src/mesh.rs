//! Node coordinate table and element coordinate extraction.
//!
//! Meshes come from an external generator as three arrays: node coordinates,
//! a node DOF table and the element topology. [`coordxtr`] combines them into
//! per-element coordinate arrays, one matrix per spatial dimension with shape
//! `[n_elements x nodes_per_element]`.

use crate::dof::DofTable;
use crate::error::{Error, Result};
use crate::topology::Topology;
use crate::types::Point2;
use nalgebra::DMatrix;

/// Node coordinates in 1, 2 or 3 dimensions, indexed by node.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinates {
    dimension: usize,
    /// Flattened `[n_nodes x dimension]`.
    data: Vec<f64>,
}

impl Coordinates {
    /// Create an empty table for points of the given dimension.
    pub fn new(dimension: usize) -> Result<Self> {
        if !(1..=3).contains(&dimension) {
            return Err(Error::Shape(format!(
                "coordinate dimension must be 1, 2 or 3, got {}",
                dimension
            )));
        }
        Ok(Self {
            dimension,
            data: Vec::new(),
        })
    }

    /// Build from one row per node.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let dimension = rows.first().map_or(2, |r| r.as_ref().len());
        let mut coords = Self::new(dimension)?;
        coords.data.reserve(rows.len() * dimension);
        for row in rows {
            coords.add_node(row.as_ref())?;
        }
        Ok(coords)
    }

    /// Add a node, returning its index.
    pub fn add_node(&mut self, point: &[f64]) -> Result<usize> {
        if point.len() != self.dimension {
            return Err(Error::Shape(format!(
                "node has {} coordinates, table dimension is {}",
                point.len(),
                self.dimension
            )));
        }
        let idx = self.n_nodes();
        self.data.extend_from_slice(point);
        Ok(idx)
    }

    pub fn n_nodes(&self) -> usize {
        self.data.len() / self.dimension
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Coordinates of a node.
    pub fn node(&self, idx: usize) -> Option<&[f64]> {
        let start = idx.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }
}

/// Per-element coordinate arrays, `[n_elements x nodes_per_element]` each.
///
/// `ey` and `ez` are present only when the coordinate table has that many
/// dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementCoordinates {
    pub ex: DMatrix<f64>,
    pub ey: Option<DMatrix<f64>>,
    pub ez: Option<DMatrix<f64>>,
}

impl ElementCoordinates {
    pub fn n_elements(&self) -> usize {
        self.ex.nrows()
    }

    pub fn nodes_per_element(&self) -> usize {
        self.ex.ncols()
    }

    /// Planar node points of one element, for the 2D element kernels.
    pub fn points2(&self, element: usize) -> Result<Vec<Point2>> {
        let ey = self
            .ey
            .as_ref()
            .ok_or_else(|| Error::Shape("element coordinates have no y component".into()))?;
        if element >= self.n_elements() {
            return Err(Error::Shape(format!(
                "element {} out of bounds ({} elements)",
                element,
                self.n_elements()
            )));
        }
        Ok((0..self.nodes_per_element())
            .map(|i| Point2::new(self.ex[(element, i)], ey[(element, i)]))
            .collect())
    }

    /// Planar node points of every element.
    pub fn all_points2(&self) -> Result<Vec<Vec<Point2>>> {
        (0..self.n_elements()).map(|e| self.points2(e)).collect()
    }
}

/// Extract element coordinate arrays from global coordinates.
///
/// Each element row of `topology` is split into node tuples of
/// `dofs.dofs_per_node()` DOFs; each tuple is resolved to a node through the
/// inverse DOF table and that node's coordinates are copied out.
///
/// # Errors
///
/// - Shape error if the DOF table and coordinate table disagree on the node
///   count, or if DOFs per node does not divide the element DOF count.
/// - [`Error::NodeNotFound`] if a tuple matches no node of the DOF table.
pub fn coordxtr(topology: &Topology, coords: &Coordinates, dofs: &DofTable) -> Result<ElementCoordinates> {
    let dofs_per_node = dofs.dofs_per_node();
    if dofs_per_node == 0 {
        return Err(Error::Shape("DOF table has zero DOFs per node".into()));
    }
    if dofs.n_nodes() != coords.n_nodes() {
        return Err(Error::Shape(format!(
            "DOF table has {} nodes, coordinate table has {}",
            dofs.n_nodes(),
            coords.n_nodes()
        )));
    }
    let dofs_per_element = topology.dofs_per_element();
    if dofs_per_element % dofs_per_node != 0 {
        return Err(Error::Shape(format!(
            "{} element DOFs are not a multiple of {} DOFs per node",
            dofs_per_element, dofs_per_node
        )));
    }

    let n_elements = topology.n_elements();
    let nodes_per_element = dofs_per_element / dofs_per_node;
    let dimension = coords.dimension();

    let mut arrays = vec![DMatrix::<f64>::zeros(n_elements, nodes_per_element); dimension];

    for (e, element) in topology.iter().enumerate() {
        for (i, tuple) in element.as_slice().chunks_exact(dofs_per_node).enumerate() {
            let node_coords = dofs
                .find_node(tuple)
                .and_then(|node| coords.node(node))
                .ok_or(Error::NodeNotFound {
                    element: e,
                    local_node: i,
                })?;
            for (array, &value) in arrays.iter_mut().zip(node_coords) {
                array[(e, i)] = value;
            }
        }
    }

    let mut arrays = arrays.into_iter();
    let ex = arrays
        .next()
        .unwrap_or_else(|| DMatrix::zeros(n_elements, nodes_per_element));
    Ok(ElementCoordinates {
        ex,
        ey: arrays.next(),
        ez: arrays.next(),
    })
}
