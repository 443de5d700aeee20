use super::augmented::AugmentedMatrix;

/// Gauss-Jordan elimination over the main matrix of an augmented system.
/// Returns the pivot map: `pivots[col] = row` holding that column's pivot,
/// or -1 if the column has none. `eligible` gates which columns may pivot;
/// skipped columns are recorded as -1 and left untouched.
pub fn reduce(aug: &mut AugmentedMatrix<'_>, eligible: impl Fn(usize) -> bool) -> Vec<i32> {
    let rows = aug.row_count();
    let cols = aug.main_col_count();
    let mut pivots = vec![-1i32; cols];

    let mut row = 0usize;
    let mut pivot_col = 0usize;

    while pivot_col < cols && !eligible(pivot_col) {
        pivot_col += 1;
    }

    while row < rows && pivot_col < cols {
        // First nonzero entry at or below the cursor
        let mut pivot_row = None;
        for pr in row..rows {
            if !aug.main().get(pr, pivot_col).is_zero() {
                pivot_row = Some(pr);
                break;
            }
        }

        if let Some(pr) = pivot_row {
            let pivot = aug.main().get(pr, pivot_col).clone();
            aug.divide_row(pr, &pivot);

            for i in 0..rows {
                if i == pr {
                    continue;
                }
                let scale = aug.main().get(i, pivot_col).clone();
                if !scale.is_zero() {
                    aug.subtract_scaled_row(i, pr, &scale);
                }
            }

            if pr != row {
                aug.swap_rows(row, pr);
            }

            pivots[pivot_col] = row as i32;
            row += 1;
        }

        loop {
            pivot_col += 1;
            if pivot_col >= cols || eligible(pivot_col) {
                break;
            }
        }
    }

    pivots
}

pub fn reduce_all(aug: &mut AugmentedMatrix<'_>) -> Vec<i32> {
    reduce(aug, |_| true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::fraction::Fraction;
    use crate::math::matrix::Matrix;

    fn from_rows(rows: &[&[i64]]) -> Matrix {
        let mut m = Matrix::new(rows.len(), rows[0].len());
        for (r, row) in rows.iter().enumerate() {
            for (c, &x) in row.iter().enumerate() {
                m.set(r, c, Fraction::from(x));
            }
        }
        m
    }

    #[test]
    fn full_rank_reduction() {
        let mut m = from_rows(&[&[2, 1, -1, 8], &[-3, -1, 2, -11], &[-2, 1, 2, -3]]);
        let pivots = {
            let mut aug = AugmentedMatrix::new(&mut m, vec![]);
            reduce_all(&mut aug)
        };
        assert_eq!(pivots, vec![0, 1, 2, -1]);
        // RREF of this system solves x=2, y=3, z=-1
        assert_eq!(m.get(0, 3), &Fraction::from(2));
        assert_eq!(m.get(1, 3), &Fraction::from(3));
        assert_eq!(m.get(2, 3), &Fraction::from(-1));
    }

    #[test]
    fn dependent_column_skipped() {
        let mut m = from_rows(&[&[1, 2, 1], &[2, 4, 0]]);
        let pivots = {
            let mut aug = AugmentedMatrix::new(&mut m, vec![]);
            reduce_all(&mut aug)
        };
        // Column 1 is twice column 0 and gets no pivot
        assert_eq!(pivots, vec![0, -1, 1]);
    }

    #[test]
    fn gated_columns_left_alone() {
        let mut m = from_rows(&[&[1, 5, 2], &[3, 7, 4]]);
        let pivots = {
            let mut aug = AugmentedMatrix::new(&mut m, vec![]);
            reduce(&mut aug, |col| col != 1)
        };
        assert_eq!(pivots[0], 0);
        assert_eq!(pivots[1], -1);
        assert_eq!(pivots[2], 1);
    }
}
