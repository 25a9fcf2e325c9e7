//! One-dimensional grids: node locations plus forward/backward spacings.

use ql_core::{
    ensure,
    errors::{Error, Result},
    Real, Size,
};

/// Where and how strongly a concentrating mesher clusters its nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConcentrationPoint {
    /// Location the nodes cluster around.
    pub point: Real,
    /// Width of the cluster relative to the mesh range; smaller is tighter.
    pub density: Real,
    /// Place a node exactly on `point`.
    pub required: bool,
}

impl ConcentrationPoint {
    /// Cluster around `point` without forcing a node onto it.
    pub fn new(point: Real, density: Real) -> Self {
        Self {
            point,
            density,
            required: false,
        }
    }

    /// Same cluster with a node exactly on the point.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Strictly increasing grid along one direction.
///
/// `dplus(i) = x[i+1] − x[i]` is absent for the last node and
/// `dminus(i) = x[i] − x[i−1]` is absent for the first one.
#[derive(Debug, Clone, PartialEq)]
pub struct Fdm1dMesher {
    locations: Vec<Real>,
    gaps: Vec<Real>,
}

impl Fdm1dMesher {
    /// Mesher over explicit locations.
    ///
    /// Zero-width or inverted cells are rejected here, so no operator built
    /// on the mesher ever divides by a vanishing spacing.
    pub fn from_locations(locations: Vec<Real>) -> Result<Self> {
        ensure!(
            locations.len() >= 2,
            "a mesher needs at least two points, got {}",
            locations.len()
        );
        ensure!(
            locations.iter().all(|x| x.is_finite()),
            "mesher locations must be finite"
        );
        let gaps: Vec<Real> = locations.windows(2).map(|w| w[1] - w[0]).collect();
        if let Some(i) = gaps.iter().position(|&h| h <= 0.0) {
            return Err(Error::Precondition(format!(
                "mesher locations must be strictly increasing: x[{}] = {} >= x[{}] = {}",
                i,
                locations[i],
                i + 1,
                locations[i + 1]
            )));
        }
        Ok(Self { locations, gaps })
    }

    /// Equally spaced nodes on `[start, end]`.
    pub fn uniform(start: Real, end: Real, size: Size) -> Result<Self> {
        ensure!(size >= 2, "a mesher needs at least two points, got {size}");
        ensure!(end > start, "mesher end ({end}) must exceed start ({start})");
        let dx = (end - start) / (size - 1) as Real;
        let mut locations: Vec<Real> = (0..size).map(|i| start + i as Real * dx).collect();
        locations[size - 1] = end;
        Self::from_locations(locations)
    }

    /// Nodes on `[start, end]` clustered around an optional point.
    ///
    /// With concentration point `c` and relative density `δ`, node `i` sits at
    /// `c + δ(end − start)·sinh(c₁(1 − lᵢ) + c₂lᵢ)` with
    /// `c₁ = asinh((start − c)/(δ(end − start)))` and
    /// `c₂ = asinh((end − c)/(δ(end − start)))`. When the point is required the
    /// fractions `lᵢ` are bent quadratically so that one node lands on `c`.
    pub fn concentrating(
        start: Real,
        end: Real,
        size: Size,
        concentration: Option<ConcentrationPoint>,
    ) -> Result<Self> {
        let Some(cp) = concentration else {
            return Self::uniform(start, end, size);
        };
        ensure!(size >= 2, "a mesher needs at least two points, got {size}");
        ensure!(end > start, "mesher end ({end}) must exceed start ({start})");
        ensure!(
            cp.point >= start && cp.point <= end,
            "concentration point ({}) outside [{start}, {end}]",
            cp.point
        );
        ensure!(cp.density > 0.0, "density ({}) must be positive", cp.density);

        let density = cp.density * (end - start);
        let c1 = ((start - cp.point) / density).asinh();
        let c2 = ((end - cp.point) / density).asinh();
        let n = (size - 1) as Real;

        let g = if cp.required && size > 2 {
            let z0 = -c1 / (c2 - c1);
            let k = (z0 * n).round();
            if k >= 1.0 && k <= n - 1.0 {
                let u0 = k / n;
                (z0 - u0) / (u0 * (u0 - 1.0))
            } else {
                // the point is within half a step of an end node
                0.0
            }
        } else {
            0.0
        };

        let mut locations = Vec::with_capacity(size);
        locations.push(start);
        for i in 1..size - 1 {
            let u = i as Real / n;
            let l = u + g * u * (u - 1.0);
            locations.push(cp.point + density * (c1 * (1.0 - l) + c2 * l).sinh());
        }
        locations.push(end);
        Self::from_locations(locations)
    }

    /// Number of nodes.
    pub fn size(&self) -> Size {
        self.locations.len()
    }

    /// Node locations.
    pub fn locations(&self) -> &[Real] {
        &self.locations
    }

    /// Location of node `i`.
    pub fn location(&self, i: Size) -> Real {
        self.locations[i]
    }

    /// Spacing to the next node.
    pub fn dplus(&self, i: Size) -> Option<Real> {
        self.gaps.get(i).copied()
    }

    /// Spacing to the previous node.
    pub fn dminus(&self, i: Size) -> Option<Real> {
        i.checked_sub(1).and_then(|j| self.gaps.get(j).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn uniform_spacing() {
        let m = Fdm1dMesher::uniform(-1.0, 1.0, 5).unwrap();
        assert_eq!(m.locations(), &[-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_eq!(m.dplus(0), Some(0.5));
        assert_eq!(m.dplus(4), None);
        assert_eq!(m.dminus(0), None);
        assert_eq!(m.dminus(4), Some(0.5));
    }

    #[test]
    fn rejects_degenerate_cells() {
        assert!(Fdm1dMesher::from_locations(vec![0.0, 1.0, 1.0, 2.0]).is_err());
        assert!(Fdm1dMesher::from_locations(vec![0.0, 2.0, 1.0]).is_err());
        assert!(Fdm1dMesher::from_locations(vec![0.0]).is_err());
        assert!(Fdm1dMesher::uniform(1.0, 1.0, 10).is_err());
    }

    #[test]
    fn concentrating_clusters_nodes() {
        let m = Fdm1dMesher::concentrating(0.0, 10.0, 51, Some(ConcentrationPoint::new(3.0, 0.05)))
            .unwrap();
        assert_eq!(m.location(0), 0.0);
        assert_eq!(m.location(50), 10.0);
        let near = m
            .locations()
            .windows(2)
            .position(|w| w[0] <= 3.0 && w[1] > 3.0)
            .unwrap();
        let h_near = m.dplus(near).unwrap();
        assert!(h_near < m.dplus(49).unwrap() / 5.0);
        assert!(h_near < 10.0 / 50.0);
    }

    #[test]
    fn required_point_lands_on_node() {
        for &c in &[0.37, 2.0, 8.91] {
            let m = Fdm1dMesher::concentrating(
                0.0,
                10.0,
                41,
                Some(ConcentrationPoint::new(c, 0.1).required()),
            )
            .unwrap();
            let hit = m.locations().iter().any(|&x| (x - c).abs() < 1e-10);
            assert!(hit, "no node on {c}");
        }
    }

    #[test]
    fn without_concentration_is_uniform() {
        let m = Fdm1dMesher::concentrating(0.0, 1.0, 3, None).unwrap();
        assert_abs_diff_eq!(m.location(1), 0.5, epsilon = 1e-15);
    }
}
