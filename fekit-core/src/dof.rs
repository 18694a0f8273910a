//! Degree-of-freedom mapping.
//!
//! A [`DofTable`] assigns each node an ordered tuple of global DOFs. The
//! table keeps the inverse mapping (DOF → node, component) so that a node can
//! be found from any DOF tuple in constant time, which is what coordinate
//! extraction needs.

use crate::error::{Error, Result};
use crate::topology::{ElementDofs, Topology};

/// Node → DOF table with its inverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DofTable {
    dofs_per_node: usize,
    /// Flattened `[n_nodes x dofs_per_node]` table of 0-based DOF indices.
    dofs: Vec<usize>,
    /// DOF index → (node, component).
    owners: Vec<Option<(usize, usize)>>,
}

impl DofTable {
    /// Sequential numbering: node `i` owns DOFs `i*dofs_per_node ..`.
    ///
    /// In 1-based terms node 0 gets ids `1..=dofs_per_node`, node 1 the next
    /// `dofs_per_node`, and so on.
    pub fn new(n_nodes: usize, dofs_per_node: usize) -> Self {
        let n_dofs = n_nodes * dofs_per_node;
        let dofs: Vec<usize> = (0..n_dofs).collect();
        let owners = (0..n_dofs)
            .map(|d| Some((d / dofs_per_node, d % dofs_per_node)))
            .collect();
        Self {
            dofs_per_node,
            dofs,
            owners,
        }
    }

    /// Ingest an arbitrary table of 1-based DOF ids, one row per node.
    ///
    /// # Errors
    ///
    /// Fails on a zero id, rows of unequal length, or a DOF owned by two nodes.
    pub fn from_one_based<R: AsRef<[usize]>>(rows: &[R]) -> Result<Self> {
        let dofs_per_node = rows.first().map_or(0, |r| r.as_ref().len());
        let mut dofs = Vec::with_capacity(rows.len() * dofs_per_node);

        for (node, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != dofs_per_node {
                return Err(Error::Shape(format!(
                    "node {} has {} DOFs, expected {}",
                    node,
                    row.len(),
                    dofs_per_node
                )));
            }
            for &id in row {
                dofs.push(id.checked_sub(1).ok_or(Error::InvalidDofId)?);
            }
        }

        let n_dofs = dofs.iter().max().map_or(0, |&d| d + 1);
        let mut owners = vec![None; n_dofs];
        for (pos, &d) in dofs.iter().enumerate() {
            let owner = (pos / dofs_per_node, pos % dofs_per_node);
            if let Some((other, _)) = owners[d] {
                return Err(Error::Shape(format!(
                    "DOF {} is assigned to nodes {} and {}",
                    d + 1,
                    other,
                    owner.0
                )));
            }
            owners[d] = Some(owner);
        }

        Ok(Self {
            dofs_per_node,
            dofs,
            owners,
        })
    }

    /// Number of nodes in the table.
    pub fn n_nodes(&self) -> usize {
        if self.dofs_per_node == 0 {
            0
        } else {
            self.dofs.len() / self.dofs_per_node
        }
    }

    pub fn dofs_per_node(&self) -> usize {
        self.dofs_per_node
    }

    /// Size of the global system addressed by the table.
    pub fn n_dofs(&self) -> usize {
        self.owners.len()
    }

    /// 0-based DOFs of a node.
    pub fn node_dofs(&self, node: usize) -> Option<&[usize]> {
        let start = node.checked_mul(self.dofs_per_node)?;
        self.dofs.get(start..start + self.dofs_per_node)
    }

    /// 1-based DOF ids of a node.
    pub fn node_dofs_one_based(&self, node: usize) -> Option<Vec<usize>> {
        self.node_dofs(node)
            .map(|dofs| dofs.iter().map(|&d| d + 1).collect())
    }

    /// Node and component owning a 0-based DOF.
    pub fn owner(&self, dof: usize) -> Option<(usize, usize)> {
        self.owners.get(dof).copied().flatten()
    }

    /// Node whose DOF tuple equals `tuple` exactly (0-based indices).
    pub fn find_node(&self, tuple: &[usize]) -> Option<usize> {
        if tuple.len() != self.dofs_per_node || tuple.is_empty() {
            return None;
        }
        let (node, component) = self.owner(tuple[0])?;
        if component != 0 {
            return None;
        }
        (self.node_dofs(node)? == tuple).then_some(node)
    }

    /// Build the element topology from 0-based node connectivity.
    pub fn topology_from_connectivity<R: AsRef<[usize]>>(&self, connectivity: &[R]) -> Result<Topology> {
        let n_nodes = self.n_nodes();
        let elements = connectivity
            .iter()
            .enumerate()
            .map(|(e, nodes)| {
                let mut row = Vec::with_capacity(nodes.as_ref().len() * self.dofs_per_node);
                for &node in nodes.as_ref() {
                    let dofs = self.node_dofs(node).ok_or_else(|| {
                        Error::Shape(format!(
                            "node index {} out of bounds (table has {} nodes)",
                            node, n_nodes
                        ))
                        .in_element(e)
                    })?;
                    row.extend_from_slice(dofs);
                }
                Ok(ElementDofs::from_zero_based(row))
            })
            .collect::<Result<Vec<_>>>()?;
        Topology::from_elements(elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_numbering() {
        let table = DofTable::new(3, 2);
        assert_eq!(table.n_nodes(), 3);
        assert_eq!(table.n_dofs(), 6);
        assert_eq!(table.node_dofs(1).unwrap(), &[2, 3]);
        assert_eq!(table.node_dofs_one_based(2).unwrap(), vec![5, 6]);
        assert_eq!(table.owner(5), Some((2, 1)));
        assert!(table.node_dofs(3).is_none());
    }

    #[test]
    fn test_find_node() {
        let table = DofTable::new(4, 2);
        assert_eq!(table.find_node(&[4, 5]), Some(2));
        // Components of two different nodes
        assert_eq!(table.find_node(&[5, 6]), None);
        // Wrong tuple length
        assert_eq!(table.find_node(&[4]), None);
    }

    #[test]
    fn test_arbitrary_numbering() {
        let table = DofTable::from_one_based(&[[5, 6], [1, 2], [3, 4]]).unwrap();
        assert_eq!(table.n_dofs(), 6);
        assert_eq!(table.find_node(&[0, 1]), Some(1));
        assert_eq!(table.owner(4), Some((0, 0)));
    }

    #[test]
    fn test_shared_dof_rejected() {
        let result = DofTable::from_one_based(&[[1, 2], [2, 3]]);
        assert!(matches!(result, Err(Error::Shape(_))));
    }

    #[test]
    fn test_topology_from_connectivity() {
        let table = DofTable::new(4, 3);
        let topo = table
            .topology_from_connectivity(&[[0, 1], [1, 2], [2, 3]])
            .unwrap();
        assert_eq!(topo.n_elements(), 3);
        assert_eq!(topo.element(2).unwrap().to_one_based(), vec![7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_connectivity_bad_node() {
        let table = DofTable::new(2, 1);
        let result = table.topology_from_connectivity(&[[0, 1], [1, 2]]);
        assert!(matches!(result, Err(Error::InElement { element: 1, .. })));
    }
}
