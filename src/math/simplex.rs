use super::augmented::AugmentedMatrix;
use super::fraction::Fraction;
use super::gauss_jordan;
use super::matrix::Matrix;
use super::vector::Vector;
use crate::error::ReverseError;
use log::{debug, warn};

/// Constraint comparison against the right-hand side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    LessEqual,
    Equal,
    GreaterEqual,
}

struct Constraint {
    lhs: Vector,
    kind: ConstraintKind,
    rhs: Fraction,
}

/// Accumulates linear constraints over `size` free variables and builds the
/// two-phase simplex program. The variables are unrestricted in sign; the
/// builder eliminates them against the slack block, splitting any that
/// survive elimination into a nonnegative pair.
pub struct LpBuilder {
    size: usize,
    constraints: Vec<Constraint>,
}

impl LpBuilder {
    pub fn of_size(size: usize) -> Self {
        LpBuilder {
            size,
            constraints: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn with_constraint(
        mut self,
        lhs: Vector,
        kind: ConstraintKind,
        rhs: Fraction,
    ) -> Result<Self, ReverseError> {
        if lhs.dimension() != self.size {
            return Err(ReverseError::InvalidArgument(format!(
                "constraint gradient has length {}, program has {} variables",
                lhs.dimension(),
                self.size
            )));
        }
        self.constraints.push(Constraint { lhs, kind, rhs });
        Ok(self)
    }

    pub fn with_lower_bound(self, idx: usize, rhs: &Fraction) -> Result<Self, ReverseError> {
        let lhs = Vector::basis_one(self.size, idx);
        self.with_constraint(lhs, ConstraintKind::GreaterEqual, rhs.clone())
    }

    pub fn with_upper_bound(self, idx: usize, rhs: &Fraction) -> Result<Self, ReverseError> {
        let lhs = Vector::basis_one(self.size, idx);
        self.with_constraint(lhs, ConstraintKind::LessEqual, rhs.clone())
    }

    /// For every row `r` of `basis`, adds the pair `r·x >= min_r` and
    /// `r·x <= max_r`.
    pub fn add_bounded_basis(
        mut self,
        min: &Vector,
        basis: &Matrix,
        max: &Vector,
    ) -> Result<Self, ReverseError> {
        assert_eq!(min.dimension(), basis.row_count());
        assert_eq!(max.dimension(), basis.row_count());
        for r in 0..basis.row_count() {
            let row = basis.get_row(r);
            self = self
                .with_constraint(row.clone(), ConstraintKind::GreaterEqual, min.get(r).clone())?
                .with_constraint(row, ConstraintKind::LessEqual, max.get(r).clone())?;
        }
        Ok(self)
    }

    pub fn build(self) -> Result<LinearProgram, ReverseError> {
        if self.constraints.is_empty() {
            return Ok(LinearProgram::unconstrained(self.size));
        }

        let size = self.size;
        let slack_total = self
            .constraints
            .iter()
            .filter(|c| c.kind != ConstraintKind::Equal)
            .count();

        // Working system [reals | slacks | rhs], one slack per inequality
        let mut rhs_col = size + slack_total;
        let mut system = Matrix::new(self.constraints.len(), rhs_col + 1);
        let mut next_slack = size;
        for (r, c) in self.constraints.iter().enumerate() {
            for i in 0..size {
                system.set(r, i, c.lhs.get(i).clone());
            }
            system.set(r, rhs_col, c.rhs.clone());
            match c.kind {
                ConstraintKind::LessEqual => {
                    system.set(r, next_slack, Fraction::one());
                    next_slack += 1;
                }
                ConstraintKind::GreaterEqual => {
                    system.set(r, next_slack, Fraction::minus_one());
                    next_slack += 1;
                }
                ConstraintKind::Equal => {}
            }
        }

        // Eliminate the free variables row by row
        let pivots = {
            let mut aug = AugmentedMatrix::new(&mut system, vec![]);
            gauss_jordan::reduce(&mut aug, |col| col < size)
        };
        let loose: Vec<usize> = (0..size).filter(|&i| pivots[i] == -1).collect();

        let slack_total = if loose.is_empty() {
            slack_total
        } else {
            // Survivors get the nonnegative split r = r+ - r-, each on a
            // fresh row, then a second elimination pass picks them up
            let wider = slack_total + 2 * loose.len();
            let mut grown = Matrix::new(system.row_count() + loose.len(), size + wider + 1);
            for r in 0..system.row_count() {
                for c in 0..(size + slack_total) {
                    grown.set(r, c, system.get(r, c).clone());
                }
                grown.set(r, size + wider, system.get(r, rhs_col).clone());
            }
            for (extra, &real) in loose.iter().enumerate() {
                let r = system.row_count() + extra;
                grown.set(r, real, Fraction::one());
                grown.set(r, size + slack_total + 2 * extra, Fraction::one());
                grown.set(r, size + slack_total + 2 * extra + 1, Fraction::minus_one());
            }
            system = grown;
            rhs_col = size + wider;

            let pivots = {
                let mut aug = AugmentedMatrix::new(&mut system, vec![]);
                gauss_jordan::reduce(&mut aug, |col| col < size)
            };
            assert!(
                (0..size).all(|i| pivots[i] != -1),
                "free variable survived elimination"
            );
            wider
        };

        // Rows 0..size now express each free variable over the slacks
        let mut recover = Matrix::new(size, slack_total + 1);
        for r in 0..size {
            for c in 0..slack_total {
                recover.set(r, c, system.get(r, size + c).clone());
            }
            recover.set(r, slack_total, system.get(r, rhs_col).clone());
        }

        // The remaining nontrivial rows constrain the slacks alone; each one
        // starts with an artificial basic variable
        let residual: Vec<usize> = (size..system.row_count())
            .filter(|&r| (size..=rhs_col).any(|c| !system.get(r, c).is_zero()))
            .collect();

        let mut rows = Matrix::new(residual.len(), slack_total + 1);
        for (out, &r) in residual.iter().enumerate() {
            for c in 0..slack_total {
                rows.set(out, c, system.get(r, size + c).clone());
            }
            rows.set(out, slack_total, system.get(r, rhs_col).clone());
            if rows.get(out, slack_total).signum() < 0 {
                rows.row_multiply(out, &Fraction::minus_one());
            }
        }

        let mut lp = LinearProgram {
            rows,
            basis: (0..residual.len()).map(|r| slack_total + r).collect(),
            nonbasis: (0..slack_total).collect(),
            costs: Vector::new(slack_total + 1),
            recover,
            variables: slack_total,
        };
        lp.repair_artificials()?;
        Ok(lp)
    }
}

/// A two-phase simplex program over exact rationals, kept in dictionary
/// form: every row expresses one basic variable over the current nonbasic
/// variables (last column is the row's value), and the reduced-cost vector
/// lives beside the rows rather than inside them. Cloning is structural;
/// `with_equality` returns a new program and leaves the original intact.
#[derive(Clone)]
pub struct LinearProgram {
    rows: Matrix,
    basis: Vec<usize>,
    nonbasis: Vec<usize>,
    costs: Vector,
    recover: Matrix,
    /// Count of genuine slack variables; any id at or above is artificial.
    variables: usize,
}

impl LinearProgram {
    /// Program with no constraints: every objective is answered by the
    /// origin.
    fn unconstrained(size: usize) -> Self {
        LinearProgram {
            rows: Matrix::new(0, 1),
            basis: Vec::new(),
            nonbasis: Vec::new(),
            costs: Vector::new(1),
            recover: Matrix::new(size, 1),
            variables: 0,
        }
    }

    /// Number of original (pre-slack) variables.
    pub fn size(&self) -> usize {
        self.recover.row_count()
    }

    fn width(&self) -> usize {
        self.nonbasis.len()
    }

    /// Express `lhs · x - constant` over the current nonbasic variables.
    /// The result has one slot per nonbasic column plus a final slot holding
    /// the expression's value at the current vertex.
    fn reduce_expression(&self, lhs: &Vector, constant: &Fraction) -> Vector {
        assert_eq!(lhs.dimension(), self.recover.row_count());

        // Weight of every slack variable inside the expression, via the
        // recovery rows x_i = rhs_i - sum(t_ij * s_j)
        let slot = self.recover.col_count() - 1;
        let mut weights = Vector::new(slot + 1);
        for i in 0..lhs.dimension() {
            let w = lhs.get(i);
            if !w.is_zero() {
                weights.add_assign(&self.recover.get_row(i).multiply_scalar(w));
            }
        }

        let width = self.width();
        let mut reduced = Vector::new(width + 1);
        for c in 0..width {
            reduced.set(c, weights.get(self.nonbasis[c]).clone());
        }
        reduced.set(width, weights.get(slot) - constant);

        // Substitute every basic variable by its row
        for r in 0..self.basis.len() {
            let w = weights.get(self.basis[r]).clone();
            if !w.is_zero() {
                reduced.subtract_assign(&self.rows.get_row(r).multiply_scalar(&w));
            }
        }

        reduced
    }

    pub fn maximize(&mut self, gradient: &Vector) -> (Vector, Fraction) {
        let neg = gradient.negate();
        let (vertex, value) = self.minimize(&neg);
        (vertex, value.negate())
    }

    pub fn minimize(&mut self, gradient: &Vector) -> (Vector, Fraction) {
        self.costs = self.reduce_expression(gradient, &Fraction::zero());
        self.run();
        let value = self.costs.get(self.width()).clone();
        (self.original_point(), value)
    }

    /// Vertex coordinates in the original variable space.
    fn original_point(&self) -> Vector {
        let slot = self.recover.col_count() - 1;
        let mut point = self.recover.get_col(slot);
        let value_col = self.width();
        for (r, &var) in self.basis.iter().enumerate() {
            let amount = self.rows.get(r, value_col);
            if var < self.variables && !amount.is_zero() {
                point.subtract_assign(&self.recover.get_col(var).multiply_scalar(amount));
            }
        }
        point
    }

    fn run(&mut self) {
        let mut pivots = 0u64;
        while let Some(col) = self.improving_column() {
            let row = match self.blocking_row(col) {
                Some(r) => r,
                None => panic!("objective is unbounded over the feasible region"),
            };
            self.pivot(row, col);
            pivots += 1;
            if pivots % 10_000 == 0 {
                debug!("simplex pivot {}, {} rows", pivots, self.rows.row_count());
            }
            if pivots > 1_000_000 {
                warn!("simplex passed 1M pivots, assuming a cycle and stopping");
                break;
            }
        }
    }

    /// Entering column: the most positive reduced cost, ties to the lower
    /// index. At a degenerate vertex (any zero row value) fall back to the
    /// first improving index so the walk cannot cycle.
    fn improving_column(&self) -> Option<usize> {
        let width = self.width();
        let degenerate = (0..self.rows.row_count()).any(|r| self.rows.get(r, width).is_zero());
        let mut improving = (0..width).filter(|&c| self.costs.get(c).signum() > 0);
        if degenerate {
            improving.next()
        } else {
            improving.max_by(|&a, &b| self.costs.get(a).cmp(self.costs.get(b)).then(b.cmp(&a)))
        }
    }

    /// Leaving row: smallest ratio of value to positive coefficient, ties to
    /// the lower row.
    fn blocking_row(&self, col: usize) -> Option<usize> {
        let value_col = self.width();
        (0..self.rows.row_count())
            .filter(|&r| self.rows.get(r, col).signum() > 0)
            .map(|r| (self.rows.get(r, value_col) / self.rows.get(r, col), r))
            .min_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, r)| r)
    }

    /// Exchange the basic variable of `row` with the nonbasic of `col`. The
    /// normalized pivot row, with the leaving variable's coefficient put in
    /// the freed column, is subtracted from everything else in one shape.
    fn pivot(&mut self, row: usize, col: usize) {
        let rate = self.rows.get(row, col).reciprocal();
        let mut axis = self.rows.get_row(row);
        axis.set(col, Fraction::one());
        let axis = axis.multiply_scalar(&rate);

        for r in 0..self.rows.row_count() {
            if r == row {
                continue;
            }
            let factor = self.rows.get(r, col).clone();
            if factor.is_zero() {
                continue;
            }
            let mut updated = self.rows.get_row(r);
            updated.set(col, Fraction::zero());
            updated.subtract_assign(&axis.multiply_scalar(&factor));
            self.rows.set_row(r, &updated);
        }

        let factor = self.costs.get(col).clone();
        if !factor.is_zero() {
            self.costs.set(col, Fraction::zero());
            self.costs.subtract_assign(&axis.multiply_scalar(&factor));
        }

        self.rows.set_row(row, &axis);
        std::mem::swap(&mut self.basis[row], &mut self.nonbasis[col]);
    }

    /// A new program with the equality `lhs · x = rhs` appended as one
    /// artificial-backed row, repaired by a phase-one pass.
    pub fn with_equality(
        &self,
        lhs: &Vector,
        rhs: &Fraction,
    ) -> Result<LinearProgram, ReverseError> {
        let mut lp = self.clone();
        let mut row = lp.reduce_expression(lhs, rhs);
        if row.get(lp.width()).signum() < 0 {
            row = row.negate();
        }
        let artificial = lp.variables + lp.basis.len();
        lp.push_row(&row, artificial);
        lp.repair_artificials()?;
        Ok(lp)
    }

    /// Phase one: price the artificial basics, pivot their total to zero,
    /// then clear every trace of them. A leftover artificial row that no
    /// genuine variable can replace is a redundant constraint and is
    /// dropped.
    fn repair_artificials(&mut self) -> Result<(), ReverseError> {
        let width = self.width();
        let mut total = Vector::new(width + 1);
        for (r, &var) in self.basis.iter().enumerate() {
            if var >= self.variables {
                total.add_assign(&self.rows.get_row(r));
            }
        }
        self.costs = total;
        self.run();

        if !self.costs.get(width).is_zero() {
            return Err(ReverseError::InfeasibleConstraints);
        }

        let mut r = 0;
        while r < self.basis.len() {
            if self.basis[r] < self.variables {
                r += 1;
                continue;
            }
            let swap = (0..self.width())
                .find(|&c| self.nonbasis[c] < self.variables && !self.rows.get(r, c).is_zero());
            match swap {
                Some(c) => {
                    self.pivot(r, c);
                    r += 1;
                }
                None => self.drop_row(r),
            }
        }

        let keep: Vec<usize> = (0..self.width())
            .filter(|&c| self.nonbasis[c] < self.variables)
            .collect();
        if keep.len() < self.width() {
            self.retain_columns(&keep);
        }
        Ok(())
    }

    fn push_row(&mut self, row: &Vector, var: usize) {
        let height = self.rows.row_count();
        let mut grown = Matrix::new(height + 1, self.rows.col_count());
        for r in 0..height {
            grown.set_row(r, &self.rows.get_row(r));
        }
        grown.set_row(height, row);
        self.rows = grown;
        self.basis.push(var);
    }

    fn drop_row(&mut self, row: usize) {
        let mut shrunk = Matrix::new(self.rows.row_count() - 1, self.rows.col_count());
        let mut out = 0;
        for r in 0..self.rows.row_count() {
            if r == row {
                continue;
            }
            shrunk.set_row(out, &self.rows.get_row(r));
            out += 1;
        }
        self.rows = shrunk;
        self.basis.remove(row);
    }

    fn retain_columns(&mut self, keep: &[usize]) {
        let height = self.rows.row_count();
        let value_col = self.width();
        let mut shrunk = Matrix::new(height, keep.len() + 1);
        for r in 0..height {
            for (out, &c) in keep.iter().enumerate() {
                shrunk.set(r, out, self.rows.get(r, c).clone());
            }
            shrunk.set(r, keep.len(), self.rows.get(r, value_col).clone());
        }
        self.rows = shrunk;
        self.nonbasis = keep.iter().map(|&c| self.nonbasis[c]).collect();
        self.costs = Vector::new(keep.len() + 1);
    }
}
