use super::call::RandomCall;
use crate::error::ReverseError;
use crate::lattice::enumerate::{self, Enumerator};
use crate::lattice::lll;
use crate::lcg::lcg::Lcg;
use crate::lcg::rand::Rand;
use crate::math::fraction::Fraction;
use crate::math::matrix::Matrix;
use crate::math::simplex::LpBuilder;
use crate::math::vector::Vector;
use log::debug;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rayon::iter::ParallelIterator;
use std::sync::Arc;

/// One transcript entry: the observed call, the absolute index of its first
/// seed update, and whether it contributes only to replay filtering.
#[derive(Clone, Debug)]
pub struct CallEntry {
    pub index: i64,
    pub call: RandomCall,
    pub filter_only: bool,
}

/// Accumulates an ordered transcript of generator calls and solves for
/// every initial seed consistent with it. The index provider starts at zero
/// and advances by each call's update count; explicit skips advance it
/// without adding constraints.
#[derive(Default)]
pub struct Reverser {
    entries: Vec<CallEntry>,
    next_index: i64,
}

impl Reverser {
    pub fn new() -> Self {
        Reverser {
            entries: Vec::new(),
            next_index: 0,
        }
    }

    /// Append a call that constrains the lattice and is replay-checked.
    pub fn add_call(&mut self, call: RandomCall) {
        let skips = call.skips();
        self.entries.push(CallEntry {
            index: self.next_index,
            call,
            filter_only: false,
        });
        self.next_index += skips;
    }

    /// Append a call that is only replay-checked, never constraining the
    /// lattice.
    pub fn add_filter(&mut self, call: RandomCall) {
        let skips = call.skips();
        self.entries.push(CallEntry {
            index: self.next_index,
            call,
            filter_only: true,
        });
        self.next_index += skips;
    }

    /// Advance past one unobserved update.
    pub fn skip(&mut self) {
        self.skip_by(1);
    }

    /// Advance past `updates` unobserved updates.
    pub fn skip_by(&mut self, updates: i64) {
        assert!(updates >= 0, "cannot skip backwards");
        self.next_index += updates;
    }

    pub fn entries(&self) -> &[CallEntry] {
        &self.entries
    }

    /// Solve against the Java 48-bit generator.
    pub fn solve(&self) -> Result<SeedStream, ReverseError> {
        self.solve_with(&Lcg::JAVA)
    }

    /// Solve the accumulated transcript: build the lattice of admissible
    /// state tuples, LLL-reduce it, enumerate the lattice points inside the
    /// bound box, and replay-validate each candidate. The returned stream is
    /// lazy; the reverser itself can be reused afterwards.
    pub fn solve_with(&self, lcg: &Lcg) -> Result<SeedStream, ReverseError> {
        let modulus = BigInt::from(lcg.modulus);

        // Flatten the measured calls into seed constraints at absolute
        // update indices
        let mut indices: Vec<i64> = Vec::new();
        let mut mins: Vec<BigInt> = Vec::new();
        let mut maxes: Vec<BigInt> = Vec::new();
        for entry in self.entries.iter().filter(|e| !e.filter_only) {
            for (offset, seed_call) in entry.call.to_seed().into_iter().enumerate() {
                let min = mod_big(&BigInt::from(seed_call.min), &modulus);
                let mut max = mod_big(&BigInt::from(seed_call.max), &modulus);
                if max < min {
                    max += &modulus;
                }
                indices.push(entry.index + offset as i64);
                mins.push(min);
                maxes.push(max);
            }
        }

        // With nothing to constrain, sweep the full state space and let the
        // replay filters do the work
        if indices.is_empty() {
            indices.push(0);
            mins.push(BigInt::zero());
            maxes.push(&modulus - 1);
        }

        let dims = indices.len();
        let first_index = indices[0];
        debug!("solving a transcript of {} constraints", dims);

        // One generator per constraint plus the row of multiplier powers
        let mult = mod_big(&BigInt::from(lcg.multiplier), &modulus);
        let mut construction = Matrix::new(dims + 1, dims);
        for i in 0..dims {
            let exp = BigInt::from(indices[i] - first_index);
            let power = mult.modpow(&exp, &modulus);
            construction.set(0, i, Fraction::from(power));
            construction.set(i + 1, i, Fraction::from(modulus.clone()));
        }
        let generators = construction.transpose();

        // Deterministic part of each state, from a zero-seeded cursor
        let mut offsets = Vector::new(dims);
        let mut cursor = Rand::of_internal_seed(lcg, 0);
        for i in 0..dims {
            offsets.set(i, Fraction::from(cursor.get_seed()));
            if i + 1 < dims {
                cursor.skip(indices[i + 1] - indices[i])?;
            }
        }

        // Center the box on the lattice
        let mut lower = Vector::new(dims);
        let mut upper = Vector::new(dims);
        for i in 0..dims {
            lower.set(i, &Fraction::from(mins[i].clone()) - offsets.get(i));
            upper.set(i, &Fraction::from(maxes[i].clone()) - offsets.get(i));
        }

        // Normalize the per-axis scale before reduction; LLL quality is
        // scale-sensitive
        let mut lcm = BigInt::one();
        for i in 0..dims {
            let side = &maxes[i] - &mins[i] + BigInt::one();
            lcm = lcm_big(&lcm, &side);
        }
        let mut scales = Matrix::new(dims, dims);
        let mut unscales = Matrix::new(dims, dims);
        for i in 0..dims {
            let side = &maxes[i] - &mins[i] + BigInt::one();
            let scale = &lcm / &side;
            scales.set(i, i, Fraction::from(scale.clone()));
            unscales.set(i, i, Fraction::new(BigInt::one(), scale));
        }

        let scaled = scales.multiply_matrix(&generators);
        let reduction = lll::reduce(&scaled, &lll::Params::recommended());
        let basis = unscales.multiply_matrix(&reduction.reduced_basis);
        assert_eq!(
            basis.col_count(),
            dims,
            "reduction must leave one generator per dimension"
        );
        debug!(
            "lattice reduced, {} dependent generator(s) dropped",
            reduction.num_dependent_vectors
        );

        let constraints = LpBuilder::of_size(dims)
            .add_bounded_basis(&lower, &Matrix::identity(dims), &upper)?
            .build()?;

        let basis_inverse = basis.inverse()?;
        let order = enumerate::width_order(&basis_inverse, &constraints);
        let enumerator = Enumerator::new(basis_inverse, constraints, order);

        // Replay plan: a composed skip to reach each entry, then the entry's
        // own validator advances past it
        let rewind = lcg.of_step(-(first_index + 1))?;
        let mut replays = Vec::with_capacity(self.entries.len());
        let mut position: i64 = 0;
        for entry in &self.entries {
            replays.push((lcg.of_step(entry.index - position)?, entry.call.clone()));
            position = entry.index + entry.call.skips();
        }

        Ok(SeedStream {
            enumerator,
            ctx: Arc::new(ReplayContext {
                lcg: lcg.clone(),
                basis,
                offsets,
                rewind,
                replays,
            }),
        })
    }
}

struct ReplayContext {
    lcg: Lcg,
    basis: Matrix,
    offsets: Vector,
    rewind: Lcg,
    replays: Vec<(Lcg, RandomCall)>,
}

impl ReplayContext {
    /// Map a lattice coordinate vector back to a candidate, rewind it to
    /// the initial seed, and replay the full transcript against it.
    fn accept(&self, vertex: &Vector) -> Option<i64> {
        let point = self.basis.multiply_vector(vertex);
        let first = self.offsets.get(0) + point.get(0);
        debug_assert!(first.is_integer());

        let modulus = BigInt::from(self.lcg.modulus);
        let state = mod_big(first.numerator(), &modulus)
            .to_i64()
            .expect("state fits in i64 after reduction");
        let initial = self.rewind.next_seed(state);

        let mut rand = Rand::of_internal_seed(&self.lcg, initial);
        for (skip_lcg, call) in &self.replays {
            rand.advance_lcg(skip_lcg);
            if !call.validate(&mut rand) {
                return None;
            }
        }
        Some(initial)
    }
}

/// Lazy sequence of surviving initial seeds. Pull it as an `Iterator`, or
/// hand the traversal to rayon with [`SeedStream::into_par_iter`]; stopping
/// early in either mode abandons the remaining search tree unexplored.
pub struct SeedStream {
    enumerator: Enumerator,
    ctx: Arc<ReplayContext>,
}

impl Iterator for SeedStream {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        loop {
            let vertex = self.enumerator.next()?;
            if let Some(seed) = self.ctx.accept(&vertex) {
                return Some(seed);
            }
        }
    }
}

impl SeedStream {
    /// Parallel traversal by work-splitting the search tree. Output order
    /// across workers is unspecified.
    pub fn into_par_iter(self) -> impl ParallelIterator<Item = i64> {
        let ctx = self.ctx;
        rayon::iter::split(self.enumerator, Enumerator::split).flat_map_iter(move |part| {
            let ctx = ctx.clone();
            part.filter_map(move |vertex| ctx.accept(&vertex))
        })
    }
}

/// Non-negative remainder.
fn mod_big(a: &BigInt, m: &BigInt) -> BigInt {
    ((a % m) + m) % m
}

fn lcm_big(a: &BigInt, b: &BigInt) -> BigInt {
    let g = a.gcd(b);
    if g.is_zero() {
        BigInt::zero()
    } else {
        a * (b / &g)
    }
}
