//! Tensor product of one-dimensional meshers.

use std::sync::Arc;

use ql_core::{errors::Result, Real, Size};
use ql_math::Array;

use super::Fdm1dMesher;
use crate::finite_differences::operators::FdmLinearOpLayout;

/// Multi-dimensional grid built from one mesher per direction.
#[derive(Debug, Clone)]
pub struct FdmMesherComposite {
    layout: Arc<FdmLinearOpLayout>,
    meshers: Vec<Arc<Fdm1dMesher>>,
}

impl FdmMesherComposite {
    /// Combine the meshers; direction `k` uses `meshers[k]`.
    pub fn new(meshers: Vec<Arc<Fdm1dMesher>>) -> Result<Self> {
        let dims = meshers.iter().map(|m| m.size()).collect();
        let layout = Arc::new(FdmLinearOpLayout::new(dims)?);
        Ok(Self { layout, meshers })
    }

    /// Single-direction composite.
    pub fn from_1d(mesher: Fdm1dMesher) -> Result<Self> {
        Self::new(vec![Arc::new(mesher)])
    }

    /// Shared layout.
    pub fn layout(&self) -> &Arc<FdmLinearOpLayout> {
        &self.layout
    }

    /// Number of grid points.
    pub fn size(&self) -> Size {
        self.layout.size()
    }

    /// Number of directions.
    pub fn directions(&self) -> Size {
        self.meshers.len()
    }

    /// Mesher of `direction`.
    pub fn mesher(&self, direction: Size) -> &Fdm1dMesher {
        &self.meshers[direction]
    }

    /// Location along `direction` of the point with flat index `index`.
    pub fn location(&self, index: Size, direction: Size) -> Real {
        self.meshers[direction].location(self.layout.coordinate(index, direction))
    }

    /// Forward spacing along `direction` at `index`.
    pub fn dplus(&self, index: Size, direction: Size) -> Option<Real> {
        self.meshers[direction].dplus(self.layout.coordinate(index, direction))
    }

    /// Backward spacing along `direction` at `index`.
    pub fn dminus(&self, index: Size, direction: Size) -> Option<Real> {
        self.meshers[direction].dminus(self.layout.coordinate(index, direction))
    }

    /// Location along `direction` of every grid point, in flat-index order.
    pub fn locations(&self, direction: Size) -> Array {
        Array::from_fn(self.size(), |i| self.location(i, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattened_locations() {
        let x = Fdm1dMesher::uniform(0.0, 1.0, 3).unwrap();
        let y = Fdm1dMesher::from_locations(vec![10.0, 20.0]).unwrap();
        let m = FdmMesherComposite::new(vec![Arc::new(x), Arc::new(y)]).unwrap();
        assert_eq!(m.size(), 6);
        assert_eq!(m.locations(0).as_slice(), &[0.0, 0.5, 1.0, 0.0, 0.5, 1.0]);
        assert_eq!(m.locations(1).as_slice(), &[10.0, 10.0, 10.0, 20.0, 20.0, 20.0]);
        assert_eq!(m.dplus(4, 1), None);
        assert_eq!(m.dminus(4, 1), Some(10.0));
        assert_eq!(m.dplus(4, 0), Some(0.5));
    }
}
