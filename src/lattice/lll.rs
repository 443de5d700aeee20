use crate::math::fraction::Fraction;
use crate::math::matrix::Matrix;
use crate::math::vector::Vector;
use log::debug;
use num_bigint::BigInt;
use num_traits::Zero;

/// Quality parameters for the reduction. `delta` is the Lovász constant;
/// `max_stage` caps the stage counter, -1 meaning all of them.
pub struct Params {
    pub delta: Fraction,
    pub max_stage: i32,
}

impl Params {
    pub fn recommended() -> Self {
        Params {
            delta: Fraction::new(99, 100),
            max_stage: -1,
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Params {
            delta: Fraction::new(75, 100),
            max_stage: -1,
        }
    }
}

/// Result of a reduction. `transformations` records the column operations:
/// `reduced_basis = input · transformations` before dependent columns are
/// stripped from the front.
pub struct Reduction {
    pub num_dependent_vectors: usize,
    pub reduced_basis: Matrix,
    pub transformations: Matrix,
}

/// Lenstra-Lenstra-Lovász basis reduction. Basis vectors are the columns of
/// `lattice`; arithmetic is exact rational throughout. Linearly dependent
/// input columns come out as zero columns and are stripped.
pub fn reduce(lattice: &Matrix, params: &Params) -> Reduction {
    let ambient = lattice.row_count();
    let vectors = lattice.col_count();

    let mut basis = lattice.clone();
    let mut gso = Matrix::new(ambient, vectors);
    let mut mu = Matrix::new(vectors, vectors);
    let mut norms = Vector::new(vectors);
    let mut coordinates = Matrix::identity(vectors);

    if vectors == 0 {
        return Reduction {
            num_dependent_vectors: 0,
            reduced_basis: basis,
            transformations: coordinates,
        };
    }

    gso.set_col(0, &basis.get_col(0));
    norms.set(0, basis.get_col(0).magnitude_sq());

    let mut k: usize = 1;
    let mut kmax: usize = 0;
    let mut update_gso = true;
    let n = if params.max_stage == -1 {
        vectors
    } else {
        params.max_stage as usize
    };
    let mut iteration: u64 = 0;

    while k < n {
        iteration += 1;
        if iteration % 1000 == 0 {
            debug!("lll iteration {}, k={}/{}", iteration, k, n);
        }
        if k > kmax && update_gso {
            kmax = k;
            update_gso_at(&basis, &mut gso, &mut mu, &mut norms, k);
        }

        size_reduce(&mut basis, &mut coordinates, &mut mu, k, k - 1);

        if lovasz_fails(&mu, &norms, k, &params.delta) {
            swap_stage(&mut basis, &mut coordinates, &mut gso, &mut mu, &mut norms, k, kmax);
            k = if k > 1 { k - 1 } else { 1 };
            update_gso = false;
        } else {
            if k >= 2 {
                for j in (0..=(k - 2)).rev() {
                    size_reduce(&mut basis, &mut coordinates, &mut mu, k, j);
                }
            }
            k += 1;
            update_gso = true;
        }
    }

    // Dependent vectors have collapsed into leading zero columns
    let p = (0..vectors)
        .take_while(|&c| basis.get_col(c).is_zero())
        .count();
    if p > 0 {
        basis = basis.submatrix(0, p, ambient, vectors - p);
        coordinates = coordinates.submatrix(0, p, coordinates.row_count(), vectors - p);
    }

    Reduction {
        num_dependent_vectors: p,
        reduced_basis: basis,
        transformations: coordinates,
    }
}

/// Reduce with the recommended delta of 99/100.
pub fn reduce_default(lattice: &Matrix) -> Reduction {
    reduce(lattice, &Params::recommended())
}

fn update_gso_at(
    basis: &Matrix,
    gso: &mut Matrix,
    mu: &mut Matrix,
    norms: &mut Vector,
    k: usize,
) {
    let mut new_col = basis.get_col(k);
    for j in 0..k {
        if !norms.get(j).is_zero() {
            let mu_jk = &basis.get_col(k).dot(&gso.get_col(j)) / norms.get(j);
            mu.set(j, k, mu_jk.clone());
            new_col.subtract_assign(&gso.get_col(j).multiply_scalar(&mu_jk));
        } else {
            mu.set(j, k, Fraction::zero());
        }
    }
    norms.set(k, new_col.magnitude_sq());
    gso.set_col(k, &new_col);
}

fn lovasz_fails(mu: &Matrix, norms: &Vector, k: usize, delta: &Fraction) -> bool {
    let mu_k = mu.get(k - 1, k);
    let factor = delta - &(mu_k * mu_k);
    *norms.get(k) < norms.get(k - 1) * &factor
}

/// RED(k, j): subtract the rounded projection coefficient times column j
/// from column k.
fn size_reduce(
    basis: &mut Matrix,
    coordinates: &mut Matrix,
    mu: &mut Matrix,
    k: usize,
    j: usize,
) {
    let r = mu.get(j, k).round();
    if r == BigInt::zero() {
        return;
    }
    let scale = Fraction::from(r);

    basis.column_subtract_scaled(k, j, &scale);
    coordinates.column_subtract_scaled(k, j, &scale);

    let new_mu = mu.get(j, k) - &scale;
    mu.set(j, k, new_mu);

    for l in 0..j {
        let new_val = mu.get(l, k) - &(mu.get(l, j) * &scale);
        mu.set(l, k, new_val);
    }
}

/// SWAP(k): exchange columns k and k-1 and patch the orthogonalization.
/// The three branches cover a zero combined norm, a zero k-th norm with a
/// nonzero projection, and the regular case.
fn swap_stage(
    basis: &mut Matrix,
    coordinates: &mut Matrix,
    gso: &mut Matrix,
    mu: &mut Matrix,
    norms: &mut Vector,
    k: usize,
    kmax: usize,
) {
    basis.swap_columns(k, k - 1);
    coordinates.swap_columns(k, k - 1);

    if k > 1 {
        for j in 0..=(k - 2) {
            mu.swap_elements(j, k, j, k - 1);
        }
    }

    let tmu = mu.get(k - 1, k).clone();
    let tb = norms.get(k) + &(&(&tmu * &tmu) * norms.get(k - 1));

    if tb.is_zero() {
        norms.set(k, norms.get(k - 1).clone());
        norms.set(k - 1, Fraction::zero());
        gso.swap_columns(k, k - 1);
        for i in (k + 1)..=kmax {
            mu.set(k, i, mu.get(k - 1, i).clone());
            mu.set(k - 1, i, Fraction::zero());
        }
    } else if norms.get(k).is_zero() && !tmu.is_zero() {
        norms.set(k - 1, tb);
        let scaled = gso.get_col(k - 1).multiply_scalar(&tmu);
        gso.set_col(k - 1, &scaled);
        mu.set(k - 1, k, tmu.reciprocal());
        for i in (k + 1)..=kmax {
            let val = mu.get(k - 1, i) / &tmu;
            mu.set(k - 1, i, val);
        }
    } else {
        let t = norms.get(k - 1) / &tb;
        mu.set(k - 1, k, &tmu * &t);

        let b = gso.get_col(k - 1);
        let g_k = gso.get_col(k);

        let new_gso_km1 = g_k.add(&b.multiply_scalar(&tmu));
        let bk_over_tb = norms.get(k) / &tb;
        let mu_kk1 = mu.get(k - 1, k).clone();
        let new_gso_k = b
            .multiply_scalar(&bk_over_tb)
            .subtract(&g_k.multiply_scalar(&mu_kk1));

        gso.set_col(k - 1, &new_gso_km1);
        gso.set_col(k, &new_gso_k);

        norms.set(k, norms.get(k) * &t);
        norms.set(k - 1, tb);

        for i in (k + 1)..=kmax {
            let t_val = mu.get(k, i).clone();
            let new_ik = mu.get(k - 1, i) - &(&tmu * &t_val);
            let new_ikm1 = &t_val + &(mu.get(k - 1, k) * &new_ik);
            mu.set(k, i, new_ik);
            mu.set(k - 1, i, new_ikm1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_cols(cols: &[&[i64]]) -> Matrix {
        let h = cols[0].len();
        let mut m = Matrix::new(h, cols.len());
        for (c, col) in cols.iter().enumerate() {
            for (r, &x) in col.iter().enumerate() {
                m.set(r, c, Fraction::from(x));
            }
        }
        m
    }

    fn shortest_norm_sq(m: &Matrix) -> Fraction {
        (0..m.col_count())
            .map(|c| m.get_col(c).magnitude_sq())
            .min()
            .unwrap()
    }

    #[test]
    fn reduces_a_three_dimensional_basis() {
        let input = from_cols(&[&[1, 1, 1], &[-1, 0, 2], &[3, 5, 6]]);
        let result = reduce_default(&input);
        let reduced = &result.reduced_basis;

        assert_eq!(result.num_dependent_vectors, 0);
        assert_eq!(reduced.col_count(), 3);

        // Same lattice: the transformation is unimodular
        let det = result.transformations.determinant();
        assert!(det == Fraction::one() || det == Fraction::minus_one());
        assert_eq!(input.multiply_matrix(&result.transformations), *reduced);

        // Integer transition both ways
        let back = result.transformations.inverse().unwrap();
        for r in 0..back.row_count() {
            for c in 0..back.col_count() {
                assert!(back.get(r, c).is_integer());
            }
        }

        // Classical quality bound against the input's shortest vector
        let best_in = shortest_norm_sq(&input);
        let best_out = shortest_norm_sq(reduced);
        assert!(best_out <= &Fraction::from(2) * &best_in);
    }

    #[test]
    fn size_reduction_bound_holds() {
        let input = from_cols(&[&[1, 1, 1], &[-1, 0, 2], &[3, 5, 6]]);
        let result = reduce_default(&input);
        let reduced = &result.reduced_basis;

        // Recompute Gram-Schmidt from scratch and check |mu| <= 1/2
        let n = reduced.col_count();
        let mut gso: Vec<Vector> = Vec::new();
        for k in 0..n {
            let mut g = reduced.get_col(k);
            for j in 0..k {
                let denom = gso[j].magnitude_sq();
                let mu = &reduced.get_col(k).dot(&gso[j]) / &denom;
                assert!(mu.abs() <= Fraction::half());
                g.subtract_assign(&gso[j].multiply_scalar(&mu));
            }
            gso.push(g);
        }
    }

    #[test]
    fn dependent_column_is_stripped() {
        let input = from_cols(&[&[1, 2, 3], &[2, 4, 6], &[0, 1, 0]]);
        let result = reduce_default(&input);
        assert_eq!(result.num_dependent_vectors, 1);
        assert_eq!(result.reduced_basis.col_count(), 2);
        for c in 0..2 {
            assert!(!result.reduced_basis.get_col(c).is_zero());
        }
    }
}
