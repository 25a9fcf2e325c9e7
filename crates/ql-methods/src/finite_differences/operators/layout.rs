//! Flattening of a multi-dimensional grid into one index space.
//!
//! Direction 0 varies fastest: `index = Σ coordinates[k] · spacing[k]` with
//! `spacing[0] = 1` and `spacing[k] = spacing[k-1] · dim[k-1]`.

use ql_core::{ensure_config, errors::Result, Size};

/// Mapping between flat indices and per-direction coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdmLinearOpLayout {
    dim: Vec<Size>,
    spacing: Vec<Size>,
    size: Size,
}

/// A grid point as yielded by [`FdmLinearOpLayout::iter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPoint {
    /// Flat index.
    pub index: Size,
    /// Per-direction coordinates.
    pub coordinates: Vec<Size>,
}

impl FdmLinearOpLayout {
    /// Layout for the given per-direction point counts.
    ///
    /// Every direction needs at least two points.
    pub fn new(dim: Vec<Size>) -> Result<Self> {
        ensure_config!(!dim.is_empty(), "layout needs at least one direction");
        ensure_config!(
            dim.iter().all(|&d| d >= 2),
            "every direction needs at least two grid points, got {dim:?}"
        );
        let mut spacing = Vec::with_capacity(dim.len());
        let mut stride = 1;
        for &d in &dim {
            spacing.push(stride);
            stride *= d;
        }
        Ok(Self {
            dim,
            spacing,
            size: stride,
        })
    }

    /// Points per direction.
    pub fn dim(&self) -> &[Size] {
        &self.dim
    }

    /// Index strides per direction.
    pub fn spacing(&self) -> &[Size] {
        &self.spacing
    }

    /// Total number of grid points.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Number of directions.
    pub fn directions(&self) -> Size {
        self.dim.len()
    }

    /// Flat index of `coordinates`.
    pub fn index(&self, coordinates: &[Size]) -> Size {
        coordinates
            .iter()
            .zip(&self.spacing)
            .map(|(c, s)| c * s)
            .sum()
    }

    /// Coordinates of the flat index `index`.
    pub fn coordinates(&self, index: Size) -> Vec<Size> {
        self.dim
            .iter()
            .zip(&self.spacing)
            .map(|(&d, &s)| (index / s) % d)
            .collect()
    }

    /// Coordinate along `direction` of the flat index `index`.
    pub fn coordinate(&self, index: Size, direction: Size) -> Size {
        (index / self.spacing[direction]) % self.dim[direction]
    }

    /// Reflect a shifted coordinate back into `[0, dim)`.
    fn reflect(coordinate: isize, dim: Size) -> Size {
        let upper = dim as isize - 1;
        let c = if coordinate < 0 {
            -coordinate
        } else if coordinate > upper {
            2 * upper - coordinate
        } else {
            coordinate
        };
        c.clamp(0, upper) as Size
    }

    fn shifted(&self, index: Size, direction: Size, offset: isize) -> Size {
        let c = self.coordinate(index, direction) as isize;
        let target = Self::reflect(c + offset, self.dim[direction]);
        index - (c as Size) * self.spacing[direction] + target * self.spacing[direction]
    }

    /// Flat index of the neighbour `offset` steps away along `direction`.
    ///
    /// Coordinates outside the grid are reflected about the edge, so the
    /// neighbour of an edge point is the first interior point.
    pub fn neighbourhood(&self, index: Size, direction: Size, offset: isize) -> Size {
        self.shifted(index, direction, offset)
    }

    /// Flat index of the neighbour shifted along two directions.
    pub fn neighbourhood2(
        &self,
        index: Size,
        d1: Size,
        offset1: isize,
        d2: Size,
        offset2: isize,
    ) -> Size {
        let first = self.shifted(index, d1, offset1);
        self.shifted(first, d2, offset2)
    }

    /// Iterate over all grid points in flat-index order.
    pub fn iter(&self) -> impl Iterator<Item = GridPoint> + '_ {
        (0..self.size).map(move |index| GridPoint {
            index,
            coordinates: self.coordinates(index),
        })
    }
}
