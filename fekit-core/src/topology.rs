//! Element topology (edof): the global DOFs each element touches.
//!
//! DOF ids arrive 1-based from mesh generation and user input. They are
//! converted once, here, to 0-based storage indices; every algorithm past this
//! module works 0-based. Errors that report a DOF back to the caller convert
//! it back to 1-based.

use crate::error::{Error, Result};

/// 0-based global DOF indices of a single element, in local DOF order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDofs(Vec<usize>);

impl ElementDofs {
    /// Ingest 1-based DOF ids.
    pub fn from_one_based(ids: &[usize]) -> Result<Self> {
        ids.iter()
            .map(|&id| id.checked_sub(1).ok_or(Error::InvalidDofId))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Wrap indices that are already 0-based.
    pub fn from_zero_based(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// Number of element DOFs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 0-based indices.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// 1-based ids, as the caller supplied them.
    pub fn to_one_based(&self) -> Vec<usize> {
        self.0.iter().map(|&i| i + 1).collect()
    }

    /// Check that every index addresses a system of `n_dofs` DOFs.
    pub fn check_range(&self, n_dofs: usize) -> Result<()> {
        match self.0.iter().find(|&&i| i >= n_dofs) {
            Some(&i) => Err(Error::DofOutOfRange { dof: i + 1, n_dofs }),
            None => Ok(()),
        }
    }
}

impl AsRef<[usize]> for ElementDofs {
    fn as_ref(&self) -> &[usize] {
        &self.0
    }
}

/// Element topology: one [`ElementDofs`] row per element, all of equal length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    elements: Vec<ElementDofs>,
    dofs_per_element: usize,
}

impl Topology {
    /// Ingest a table of 1-based DOF id rows.
    ///
    /// # Errors
    ///
    /// Fails on a zero id or on rows of unequal length.
    pub fn from_one_based<R: AsRef<[usize]>>(rows: &[R]) -> Result<Self> {
        let elements = rows
            .iter()
            .enumerate()
            .map(|(e, row)| ElementDofs::from_one_based(row.as_ref()).map_err(|err| err.in_element(e)))
            .collect::<Result<Vec<_>>>()?;
        Self::from_elements(elements)
    }

    /// Build from already-converted element rows.
    pub fn from_elements(elements: Vec<ElementDofs>) -> Result<Self> {
        let dofs_per_element = elements.first().map_or(0, ElementDofs::len);
        if let Some((e, row)) = elements
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != dofs_per_element)
        {
            return Err(Error::Shape(format!(
                "element {} has {} DOFs, expected {}",
                e,
                row.len(),
                dofs_per_element
            )));
        }
        Ok(Self {
            elements,
            dofs_per_element,
        })
    }

    /// Number of elements.
    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    /// DOFs per element row.
    pub fn dofs_per_element(&self) -> usize {
        self.dofs_per_element
    }

    pub fn elements(&self) -> &[ElementDofs] {
        &self.elements
    }

    pub fn element(&self, idx: usize) -> Option<&ElementDofs> {
        self.elements.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ElementDofs> {
        self.elements.iter()
    }

    /// Smallest system size that holds every referenced DOF.
    pub fn min_n_dofs(&self) -> usize {
        self.elements
            .iter()
            .flat_map(|row| row.as_slice().iter())
            .max()
            .map_or(0, |&i| i + 1)
    }

    /// Check every row against a system of `n_dofs` DOFs.
    pub fn check_range(&self, n_dofs: usize) -> Result<()> {
        for (e, row) in self.elements.iter().enumerate() {
            row.check_range(n_dofs).map_err(|err| err.in_element(e))?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Topology {
    type Item = &'a ElementDofs;
    type IntoIter = std::slice::Iter<'a, ElementDofs>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_based_ingestion() {
        let dofs = ElementDofs::from_one_based(&[1, 2, 5, 6]).unwrap();
        assert_eq!(dofs.as_slice(), &[0, 1, 4, 5]);
        assert_eq!(dofs.to_one_based(), vec![1, 2, 5, 6]);
    }

    #[test]
    fn test_zero_id_rejected() {
        assert!(matches!(
            ElementDofs::from_one_based(&[0, 1]),
            Err(Error::InvalidDofId)
        ));
    }

    #[test]
    fn test_topology_rows() {
        let topo = Topology::from_one_based(&[[1, 2, 3, 4, 5, 6], [4, 5, 6, 7, 8, 9]]).unwrap();
        assert_eq!(topo.n_elements(), 2);
        assert_eq!(topo.dofs_per_element(), 6);
        assert_eq!(topo.element(1).unwrap().as_slice(), &[3, 4, 5, 6, 7, 8]);
        assert_eq!(topo.min_n_dofs(), 9);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows: Vec<Vec<usize>> = vec![vec![1, 2], vec![2, 3, 4]];
        assert!(matches!(Topology::from_one_based(&rows), Err(Error::Shape(_))));
    }

    #[test]
    fn test_range_check_reports_one_based() {
        let topo = Topology::from_one_based(&[[1, 2], [2, 7]]).unwrap();
        match topo.check_range(6) {
            Err(Error::InElement { element, source }) => {
                assert_eq!(element, 1);
                assert!(matches!(*source, Error::DofOutOfRange { dof: 7, n_dofs: 6 }));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
