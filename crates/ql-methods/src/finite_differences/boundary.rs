//! Dirichlet and Neumann boundary conditions.
//!
//! A condition pins one side of one direction of the mesh. The schemes call
//! its hooks around every explicit action and every implicit solve:
//!
//! 1. [`FdmBoundaryCondition::apply_before_applying`] turns the boundary rows
//!    of the operator into zero rows, so the explicit action leaves those
//!    entries untouched;
//! 2. [`FdmBoundaryCondition::apply_after_applying`] writes the boundary
//!    target into the result;
//! 3. [`FdmBoundaryCondition::apply_before_solving`] prepares the rows of
//!    `I − a·L` and the right-hand side. Dirichlet rows become identity rows
//!    with the value on the right. Neumann rows become the difference
//!    `x[edge] − x[inner] = ∓d·h`, so the slope is part of the implicit
//!    solve along the condition's direction; sweeps along other directions
//!    see an identity row holding the current edge target;
//! 4. [`FdmBoundaryCondition::apply_after_solving`] writes the target into the
//!    solution.

use std::fmt;
use std::sync::Arc;

use ql_core::{ensure_config, errors::Result, Real, Size, Time};
use ql_math::Array;

use crate::finite_differences::meshers::FdmMesherComposite;
use crate::finite_differences::operators::FdmLinearOpComposite;

/// Edge of a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// First grid line.
    Lower,
    /// Last grid line.
    Upper,
}

/// Value prescribed by a Dirichlet condition.
#[derive(Clone)]
pub enum BoundaryValue {
    /// Same value at every time.
    Constant(Real),
    /// Value as a function of time.
    TimeDependent(Arc<dyn Fn(Time) -> Real + Send + Sync>),
}

impl BoundaryValue {
    fn at(&self, t: Time) -> Real {
        match self {
            BoundaryValue::Constant(v) => *v,
            BoundaryValue::TimeDependent(f) => f(t),
        }
    }
}

impl fmt::Debug for BoundaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryValue::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            BoundaryValue::TimeDependent(_) => f.write_str("TimeDependent(..)"),
        }
    }
}

/// Kind of condition.
#[derive(Debug, Clone)]
pub enum BoundaryKind {
    /// Fixed value on the boundary.
    Dirichlet(BoundaryValue),
    /// Fixed first derivative across the outermost cell.
    Neumann(Real),
}

/// One boundary condition on one side of one direction.
#[derive(Debug, Clone)]
pub struct FdmBoundaryCondition {
    kind: BoundaryKind,
    side: Side,
    direction: Size,
    rows: Vec<Size>,
    inner_rows: Vec<Size>,
    spacings: Vec<Real>,
    current: Real,
}

impl FdmBoundaryCondition {
    fn build(
        mesher: &FdmMesherComposite,
        kind: BoundaryKind,
        direction: Size,
        side: Side,
    ) -> Result<Self> {
        let layout = mesher.layout();
        ensure_config!(
            direction < layout.directions(),
            "boundary direction {direction} outside a {}-dimensional mesh",
            layout.directions()
        );
        let (edge, offset) = match side {
            Side::Lower => (0, 1),
            Side::Upper => (layout.dim()[direction] - 1, -1),
        };
        let rows: Vec<Size> = (0..layout.size())
            .filter(|&i| layout.coordinate(i, direction) == edge)
            .collect();
        let inner_rows: Vec<Size> = rows
            .iter()
            .map(|&i| layout.neighbourhood(i, direction, offset))
            .collect();
        let spacings = rows
            .iter()
            .zip(&inner_rows)
            .map(|(&i, &j)| (mesher.location(j, direction) - mesher.location(i, direction)).abs())
            .collect();
        let current = match &kind {
            BoundaryKind::Dirichlet(v) => v.at(0.0),
            BoundaryKind::Neumann(d) => *d,
        };
        Ok(Self {
            kind,
            side,
            direction,
            rows,
            inner_rows,
            spacings,
            current,
        })
    }

    /// Constant value `value` on `side` of `direction`.
    pub fn dirichlet(
        mesher: &FdmMesherComposite,
        value: Real,
        direction: Size,
        side: Side,
    ) -> Result<Self> {
        Self::build(
            mesher,
            BoundaryKind::Dirichlet(BoundaryValue::Constant(value)),
            direction,
            side,
        )
    }

    /// Value `f(t)` on `side` of `direction`.
    pub fn time_dependent_dirichlet(
        mesher: &FdmMesherComposite,
        f: Arc<dyn Fn(Time) -> Real + Send + Sync>,
        direction: Size,
        side: Side,
    ) -> Result<Self> {
        Self::build(
            mesher,
            BoundaryKind::Dirichlet(BoundaryValue::TimeDependent(f)),
            direction,
            side,
        )
    }

    /// Derivative `∂V/∂x = derivative` across the outermost cell on `side`
    /// of `direction`.
    pub fn neumann(
        mesher: &FdmMesherComposite,
        derivative: Real,
        direction: Size,
        side: Side,
    ) -> Result<Self> {
        Self::build(mesher, BoundaryKind::Neumann(derivative), direction, side)
    }

    /// Kind of the condition.
    pub fn kind(&self) -> &BoundaryKind {
        &self.kind
    }

    /// Side of the condition.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Direction of the condition.
    pub fn direction(&self) -> Size {
        self.direction
    }

    /// Flat indices of the boundary rows.
    pub fn rows(&self) -> &[Size] {
        &self.rows
    }

    /// Evaluate time-dependent data at `t`.
    pub fn set_time(&mut self, t: Time) {
        if let BoundaryKind::Dirichlet(v) = &self.kind {
            self.current = v.at(t);
        }
    }

    /// Target of boundary row `k` given the values `a`.
    fn target(&self, k: Size, a: &Array) -> Real {
        match self.kind {
            BoundaryKind::Dirichlet(_) => self.current,
            BoundaryKind::Neumann(d) => {
                let inner = a[self.inner_rows[k]];
                match self.side {
                    Side::Lower => inner - d * self.spacings[k],
                    Side::Upper => inner + d * self.spacings[k],
                }
            }
        }
    }

    fn write(&self, a: &mut Array) {
        for k in 0..self.rows.len() {
            let value = self.target(k, a);
            a[self.rows[k]] = value;
        }
    }

    /// Zero the boundary rows of `op` before an explicit action.
    pub fn apply_before_applying(&self, op: &mut dyn FdmLinearOpComposite) {
        op.clear_rows(&self.rows);
    }

    /// Enforce the condition on the result of an explicit action.
    pub fn apply_after_applying(&self, a: &mut Array) {
        self.write(a);
    }

    /// Prepare the boundary rows of `op` and `rhs` for solving
    /// `(I − a·L) x = rhs`, either along `direction` only or, with `None`,
    /// on the full operator.
    pub fn apply_before_solving(
        &self,
        op: &mut dyn FdmLinearOpComposite,
        rhs: &mut Array,
        a: Real,
        direction: Option<Size>,
    ) {
        match self.kind {
            BoundaryKind::Neumann(d)
                if a != 0.0 && direction.map_or(true, |k| k == self.direction) =>
            {
                op.couple_edge_rows(self.direction, &self.rows, 1.0 / a);
                for (k, &row) in self.rows.iter().enumerate() {
                    rhs[row] = match self.side {
                        Side::Lower => -d * self.spacings[k],
                        Side::Upper => d * self.spacings[k],
                    };
                }
            }
            _ => {
                op.clear_rows(&self.rows);
                self.write(rhs);
            }
        }
    }

    /// Enforce the condition on the solution of an implicit solve.
    pub fn apply_after_solving(&self, a: &mut Array) {
        self.write(a);
    }
}

/// Boundary conditions applied in registration order.
#[derive(Debug, Clone, Default)]
pub struct FdmBoundaryConditionSet {
    conditions: Vec<FdmBoundaryCondition>,
}

impl FdmBoundaryConditionSet {
    /// Set without conditions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set of `conditions`; at most one per side of each direction.
    pub fn new(conditions: Vec<FdmBoundaryCondition>) -> Result<Self> {
        let mut set = Self::empty();
        for c in conditions {
            set.push(c)?;
        }
        Ok(set)
    }

    /// Register another condition.
    pub fn push(&mut self, condition: FdmBoundaryCondition) -> Result<()> {
        ensure_config!(
            !self
                .conditions
                .iter()
                .any(|c| c.direction == condition.direction && c.side == condition.side),
            "two boundary conditions on the {:?} side of direction {}",
            condition.side,
            condition.direction
        );
        self.conditions.push(condition);
        Ok(())
    }

    /// Number of conditions.
    pub fn len(&self) -> Size {
        self.conditions.len()
    }

    /// `true` without conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Registered conditions.
    pub fn iter(&self) -> impl Iterator<Item = &FdmBoundaryCondition> {
        self.conditions.iter()
    }

    /// See [`FdmBoundaryCondition::set_time`].
    pub fn set_time(&mut self, t: Time) {
        self.conditions.iter_mut().for_each(|c| c.set_time(t));
    }

    /// See [`FdmBoundaryCondition::apply_before_applying`].
    pub fn apply_before_applying(&self, op: &mut dyn FdmLinearOpComposite) {
        self.conditions.iter().for_each(|c| c.apply_before_applying(op));
    }

    /// See [`FdmBoundaryCondition::apply_after_applying`].
    pub fn apply_after_applying(&self, a: &mut Array) {
        self.conditions.iter().for_each(|c| c.apply_after_applying(a));
    }

    /// See [`FdmBoundaryCondition::apply_before_solving`].
    pub fn apply_before_solving(
        &self,
        op: &mut dyn FdmLinearOpComposite,
        rhs: &mut Array,
        a: Real,
        direction: Option<Size>,
    ) {
        self.conditions
            .iter()
            .for_each(|c| c.apply_before_solving(op, rhs, a, direction));
    }

    /// See [`FdmBoundaryCondition::apply_after_solving`].
    pub fn apply_after_solving(&self, a: &mut Array) {
        self.conditions.iter().for_each(|c| c.apply_after_solving(a));
    }
}
