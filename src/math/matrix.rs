use super::augmented::AugmentedMatrix;
use super::fraction::Fraction;
use super::gauss_jordan;
use super::vector::{Vector, VectorView, VectorViewMut};
use crate::error::ReverseError;

/// A matrix of rationals stored in column-major order: element `(row, col)`
/// lives at `data[col * rows + row]`. Row, column, and diagonal views share
/// this storage, so a write through one view is visible through the matrix
/// and every other view of the same cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    data: Vec<Fraction>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Matrix {
            data: vec![Fraction::zero(); rows * cols],
            rows,
            cols,
        }
    }

    pub fn identity(size: usize) -> Self {
        let mut m = Matrix::new(size, size);
        for i in 0..size {
            m.set(i, i, Fraction::one());
        }
        m
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    fn index(&self, row: usize, col: usize) -> usize {
        col * self.rows + row
    }

    pub fn get(&self, row: usize, col: usize) -> &Fraction {
        assert!(row < self.rows && col < self.cols);
        &self.data[col * self.rows + row]
    }

    pub fn try_get(&self, row: usize, col: usize) -> Result<&Fraction, ReverseError> {
        if row >= self.rows {
            return Err(ReverseError::IndexOutOfRange {
                index: row,
                len: self.rows,
            });
        }
        if col >= self.cols {
            return Err(ReverseError::IndexOutOfRange {
                index: col,
                len: self.cols,
            });
        }
        Ok(self.get(row, col))
    }

    pub fn set(&mut self, row: usize, col: usize, value: Fraction) {
        assert!(row < self.rows && col < self.cols);
        let i = self.index(row, col);
        self.data[i] = value;
    }

    /// Column view: stride 1, offset `rows * col`.
    pub fn column(&self, col: usize) -> VectorView<'_> {
        assert!(col < self.cols);
        VectorView::new(&self.data, self.rows, 1, col * self.rows)
    }

    pub fn column_mut(&mut self, col: usize) -> VectorViewMut<'_> {
        assert!(col < self.cols);
        VectorViewMut::new(&mut self.data, self.rows, 1, col * self.rows)
    }

    /// Row view: stride `rows`, offset `row`.
    pub fn row(&self, row: usize) -> VectorView<'_> {
        assert!(row < self.rows);
        VectorView::new(&self.data, self.cols, self.rows, row)
    }

    pub fn row_mut(&mut self, row: usize) -> VectorViewMut<'_> {
        assert!(row < self.rows);
        VectorViewMut::new(&mut self.data, self.cols, self.rows, row)
    }

    /// Main diagonal view: stride `rows + 1`, offset 0.
    pub fn diagonal(&self) -> VectorView<'_> {
        VectorView::new(&self.data, self.rows.min(self.cols), self.rows + 1, 0)
    }

    pub fn diagonal_mut(&mut self) -> VectorViewMut<'_> {
        VectorViewMut::new(
            &mut self.data,
            self.rows.min(self.cols),
            self.rows + 1,
            0,
        )
    }

    pub fn get_row(&self, row: usize) -> Vector {
        self.row(row).to_vector()
    }

    pub fn get_col(&self, col: usize) -> Vector {
        self.column(col).to_vector()
    }

    pub fn set_row(&mut self, row: usize, v: &Vector) {
        assert_eq!(v.dimension(), self.cols);
        for c in 0..self.cols {
            self.set(row, c, v.get(c).clone());
        }
    }

    pub fn set_col(&mut self, col: usize, v: &Vector) {
        assert_eq!(v.dimension(), self.rows);
        for r in 0..self.rows {
            self.set(r, col, v.get(r).clone());
        }
    }

    pub fn swap_rows(&mut self, r1: usize, r2: usize) {
        if r1 == r2 {
            return;
        }
        for col in 0..self.cols {
            let i1 = self.index(r1, col);
            let i2 = self.index(r2, col);
            self.data.swap(i1, i2);
        }
    }

    pub fn swap_columns(&mut self, c1: usize, c2: usize) {
        if c1 == c2 {
            return;
        }
        for row in 0..self.rows {
            let i1 = self.index(row, c1);
            let i2 = self.index(row, c2);
            self.data.swap(i1, i2);
        }
    }

    pub fn swap_elements(&mut self, r1: usize, c1: usize, r2: usize, c2: usize) {
        let i1 = self.index(r1, c1);
        let i2 = self.index(r2, c2);
        self.data.swap(i1, i2);
    }

    pub fn row_divide(&mut self, row: usize, divisor: &Fraction) {
        let recip = divisor.reciprocal();
        self.row_multiply(row, &recip);
    }

    pub fn row_multiply(&mut self, row: usize, scalar: &Fraction) {
        for c in 0..self.cols {
            let i = self.index(row, c);
            self.data[i] = &self.data[i] * scalar;
        }
    }

    /// `row[target] -= scale * row[source]`
    pub fn row_subtract_scaled(&mut self, target: usize, source: usize, scale: &Fraction) {
        for c in 0..self.cols {
            let val = self.get(target, c) - &(self.get(source, c) * scale);
            self.set(target, c, val);
        }
    }

    /// `row[target] += scale * row[source]`
    pub fn row_add_scaled(&mut self, target: usize, source: usize, scale: &Fraction) {
        for c in 0..self.cols {
            let val = self.get(target, c) + &(self.get(source, c) * scale);
            self.set(target, c, val);
        }
    }

    /// `col[target] -= scale * col[source]`
    pub fn column_subtract_scaled(&mut self, target: usize, source: usize, scale: &Fraction) {
        for r in 0..self.rows {
            let val = self.get(r, target) - &(self.get(r, source) * scale);
            self.set(r, target, val);
        }
    }

    pub fn transpose(&self) -> Matrix {
        let mut m = Matrix::new(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                m.set(c, r, self.get(r, c).clone());
            }
        }
        m
    }

    pub fn multiply_matrix(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.cols, other.rows);
        let mut result = Matrix::new(self.rows, other.cols);
        for r in 0..self.rows {
            let row = self.row(r);
            for c in 0..other.cols {
                result.set(r, c, row.dot(&other.column(c)));
            }
        }
        result
    }

    pub fn multiply_vector(&self, v: &Vector) -> Vector {
        assert_eq!(self.cols, v.dimension());
        let mut result = Vector::new(self.rows);
        for r in 0..self.rows {
            result.set(r, self.row(r).to_vector().dot(v));
        }
        result
    }

    pub fn multiply_scalar(&self, scalar: &Fraction) -> Matrix {
        let mut m = self.clone();
        for x in &mut m.data {
            *x = &*x * scalar;
        }
        m
    }

    /// Copy out a rectangular block.
    pub fn submatrix(
        &self,
        start_row: usize,
        start_col: usize,
        row_count: usize,
        col_count: usize,
    ) -> Matrix {
        let mut m = Matrix::new(row_count, col_count);
        for r in 0..row_count {
            for c in 0..col_count {
                m.set(r, c, self.get(start_row + r, start_col + c).clone());
            }
        }
        m
    }

    /// Inverse via Gauss-Jordan on the augmented system `[M | I]`.
    pub fn inverse(&self) -> Result<Matrix, ReverseError> {
        assert!(self.is_square(), "Matrix is not square");
        let mut main = self.clone();
        let mut inv = Matrix::identity(self.rows);
        let pivots = {
            let mut aug = AugmentedMatrix::new(&mut main, vec![&mut inv]);
            gauss_jordan::reduce_all(&mut aug)
        };
        if pivots.iter().any(|&p| p == -1) {
            return Err(ReverseError::InvalidArgument(
                "matrix is singular".to_string(),
            ));
        }
        Ok(inv)
    }

    /// Determinant by cofactor expansion on column 0. The empty matrix has
    /// determinant 1.
    pub fn determinant(&self) -> Fraction {
        assert!(self.is_square(), "Matrix is not square");
        let n = self.rows;
        if n == 0 {
            return Fraction::one();
        }
        if n == 1 {
            return self.get(0, 0).clone();
        }
        let mut det = Fraction::zero();
        let mut sign = Fraction::one();
        for r in 0..n {
            let cofactor = self.get(r, 0);
            if !cofactor.is_zero() {
                let minor_det = self.minor(r, 0).determinant();
                det = &det + &(&(&sign * cofactor) * &minor_det);
            }
            sign = sign.negate();
        }
        det
    }

    fn minor(&self, skip_row: usize, skip_col: usize) -> Matrix {
        let mut m = Matrix::new(self.rows - 1, self.cols - 1);
        let mut mr = 0;
        for r in 0..self.rows {
            if r == skip_row {
                continue;
            }
            let mut mc = 0;
            for c in 0..self.cols {
                if c == skip_col {
                    continue;
                }
                m.set(mr, mc, self.get(r, c).clone());
                mc += 1;
            }
            mr += 1;
        }
        m
    }
}

impl std::fmt::Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for r in 0..self.rows {
            if r > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.get_row(r))?;
        }
        write!(f, "}}")
    }
}
