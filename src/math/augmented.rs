use super::fraction::Fraction;
use super::matrix::Matrix;

/// A main matrix plus associated matrices of equal height. Row operations
/// broadcast to every member in lockstep, so reducing the main matrix keeps
/// the others consistent with the same sequence of elementary operations.
pub struct AugmentedMatrix<'a> {
    main: &'a mut Matrix,
    others: Vec<&'a mut Matrix>,
}

impl<'a> AugmentedMatrix<'a> {
    pub fn new(main: &'a mut Matrix, others: Vec<&'a mut Matrix>) -> Self {
        for other in &others {
            assert_eq!(main.row_count(), other.row_count());
        }
        AugmentedMatrix { main, others }
    }

    pub fn row_count(&self) -> usize {
        self.main.row_count()
    }

    /// Width of the main matrix; pivoting is confined to these columns.
    pub fn main_col_count(&self) -> usize {
        self.main.col_count()
    }

    /// Total logical width: main columns, then each associated matrix in
    /// order.
    pub fn col_count(&self) -> usize {
        self.main.col_count() + self.others.iter().map(|m| m.col_count()).sum::<usize>()
    }

    pub fn get(&self, row: usize, col: usize) -> &Fraction {
        let mut col = col;
        if col < self.main.col_count() {
            return self.main.get(row, col);
        }
        col -= self.main.col_count();
        for other in &self.others {
            if col < other.col_count() {
                return other.get(row, col);
            }
            col -= other.col_count();
        }
        panic!("column {} out of range", col);
    }

    pub fn main(&self) -> &Matrix {
        self.main
    }

    pub fn swap_rows(&mut self, r1: usize, r2: usize) {
        self.main.swap_rows(r1, r2);
        for other in &mut self.others {
            other.swap_rows(r1, r2);
        }
    }

    pub fn divide_row(&mut self, row: usize, divisor: &Fraction) {
        self.main.row_divide(row, divisor);
        for other in &mut self.others {
            other.row_divide(row, divisor);
        }
    }

    pub fn multiply_row(&mut self, row: usize, scalar: &Fraction) {
        self.main.row_multiply(row, scalar);
        for other in &mut self.others {
            other.row_multiply(row, scalar);
        }
    }

    /// `row[target] -= scale * row[source]` across all members.
    pub fn subtract_scaled_row(&mut self, target: usize, source: usize, scale: &Fraction) {
        self.main.row_subtract_scaled(target, source, scale);
        for other in &mut self.others {
            other.row_subtract_scaled(target, source, scale);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lockstep_row_ops() {
        let mut main = Matrix::new(2, 2);
        main.set(0, 0, Fraction::from(2));
        main.set(1, 1, Fraction::from(3));
        let mut tracker = Matrix::identity(2);

        {
            let mut aug = AugmentedMatrix::new(&mut main, vec![&mut tracker]);
            aug.swap_rows(0, 1);
            aug.divide_row(0, &Fraction::from(3));
            assert_eq!(aug.col_count(), 4);
            assert_eq!(aug.get(0, 1), &Fraction::from(1));
            assert_eq!(aug.get(0, 3), &Fraction::new(1, 3));
        }

        assert_eq!(main.get(0, 1), &Fraction::from(1));
        assert_eq!(tracker.get(0, 1), &Fraction::new(1, 3));
        assert_eq!(tracker.get(1, 0), &Fraction::from(1));
    }
}
