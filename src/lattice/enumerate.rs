use crate::error::ReverseError;
use crate::math::fraction::Fraction;
use crate::math::matrix::Matrix;
use crate::math::simplex::{LinearProgram, LpBuilder};
use crate::math::vector::Vector;
use log::debug;
use num_bigint::BigInt;
use num_traits::One;
use std::sync::Arc;

/// Shared, immutable search context: the inverted basis, the coordinate
/// visit order, and the dimension count.
struct Context {
    inverse: Matrix,
    order: Vec<usize>,
    size: usize,
}

/// One node of the search tree mid-expansion: the program with equalities
/// for the shallower coordinates already applied, the partial vertex, and
/// the remaining child range `[next, last]`.
#[derive(Clone)]
struct Frame {
    lp: LinearProgram,
    fixed: Vector,
    depth: usize,
    next: BigInt,
    last: BigInt,
}

/// Lazy depth-first traversal over all integer coordinate vectors `v` whose
/// image under the basis lies inside the constraint polytope. Children are
/// visited in ascending order; nothing below a node is computed until the
/// node is pulled. `split` hands half of the shallowest unexpanded range to
/// an independent iterator for parallel traversal.
pub struct Enumerator {
    ctx: Arc<Context>,
    stack: Vec<Frame>,
}

impl Enumerator {
    /// `inverse` is the inverted lattice basis; `constraints` describes the
    /// polytope in basis-image space; `order` lists the coordinate visit
    /// order, narrowest first.
    pub fn new(inverse: Matrix, constraints: LinearProgram, order: Vec<usize>) -> Enumerator {
        let size = inverse.row_count();
        assert_eq!(order.len(), size);
        let ctx = Arc::new(Context {
            inverse,
            order,
            size,
        });
        let mut stack = Vec::new();
        if size > 0 {
            if let Some(frame) = Self::make_frame(&ctx, constraints, Vector::new(size), 0) {
                stack.push(frame);
            }
        }
        Enumerator { ctx, stack }
    }

    /// Bound the coordinate at `depth` over the current program. An empty
    /// integer range means the subtree is dead.
    fn make_frame(ctx: &Context, lp: LinearProgram, fixed: Vector, depth: usize) -> Option<Frame> {
        let gradient = ctx.inverse.get_row(ctx.order[depth]);
        let (_, lo) = lp.clone().minimize(&gradient);
        let (_, hi) = lp.clone().maximize(&gradient);

        let next = lo.ceil();
        let last = hi.floor();
        if next > last {
            return None;
        }
        Some(Frame {
            lp,
            fixed,
            depth,
            next,
            last,
        })
    }

    /// Split off the upper half of the shallowest frame that still has at
    /// least two unexpanded children. A frame's program already carries the
    /// equalities of its ancestors, so the new iterator needs nothing but
    /// that one frame. Returns `None` as the second element when nothing is
    /// left to share.
    pub fn split(mut self) -> (Enumerator, Option<Enumerator>) {
        for i in 0..self.stack.len() {
            let frame = &self.stack[i];
            if &frame.last - &frame.next >= BigInt::one() {
                let mid: BigInt = (&frame.next + &frame.last) >> 1;
                let mut upper_frame = frame.clone();
                upper_frame.next = &mid + 1;
                let upper = Enumerator {
                    ctx: self.ctx.clone(),
                    stack: vec![upper_frame],
                };
                self.stack[i].last = mid;
                return (self, Some(upper));
            }
        }
        (self, None)
    }
}

impl Iterator for Enumerator {
    type Item = Vector;

    fn next(&mut self) -> Option<Vector> {
        loop {
            match self.stack.last() {
                None => return None,
                Some(frame) if frame.next > frame.last => {
                    self.stack.pop();
                    continue;
                }
                _ => {}
            }

            let (k, depth, index) = {
                let frame = self.stack.last_mut().expect("stack checked above");
                let k = frame.next.clone();
                frame.next += 1;
                (k, frame.depth, self.ctx.order[frame.depth])
            };

            if depth + 1 == self.ctx.size {
                // Leaf level: every k in range is a vertex, no child program
                let frame = self.stack.last().expect("stack checked above");
                let mut vertex = frame.fixed.clone();
                vertex.set(index, Fraction::from(k));
                return Some(vertex);
            }

            let child = {
                let frame = self.stack.last().expect("stack checked above");
                let gradient = self.ctx.inverse.get_row(index);
                let value = Fraction::from(k);
                match frame.lp.with_equality(&gradient, &value) {
                    Ok(lp) => {
                        let mut fixed = frame.fixed.clone();
                        fixed.set(index, value);
                        Some((lp, fixed))
                    }
                    // The slice is empty; skip this child
                    Err(_) => None,
                }
            };

            if let Some((lp, fixed)) = child {
                if let Some(frame) = Self::make_frame(&self.ctx, lp, fixed, depth + 1) {
                    self.stack.push(frame);
                }
            }
        }
    }
}

/// Width of the polytope along each row of `inverse`, ordered ascending.
/// Fixing the narrowest coordinates first keeps the branching factor near
/// the root small.
pub fn width_order(inverse: &Matrix, constraints: &LinearProgram) -> Vec<usize> {
    let size = inverse.row_count();
    let mut widths: Vec<Fraction> = Vec::with_capacity(size);
    let mut order: Vec<usize> = (0..size).collect();

    for i in 0..size {
        let gradient = inverse.get_row(i);
        let (_, lo) = constraints.clone().minimize(&gradient);
        let (_, hi) = constraints.clone().maximize(&gradient);
        let width = &hi - &lo;
        debug!("dimension {} width {}", i, width);
        widths.push(width);
    }

    order.sort_by(|&a, &b| widths[a].cmp(&widths[b]));
    order
}

/// Collect every integer coordinate vector `v` with `basis · v` inside the
/// axis-aligned box `[lower, upper]`.
pub fn enumerate(
    basis: &Matrix,
    lower: &Vector,
    upper: &Vector,
) -> Result<Vec<Vector>, ReverseError> {
    let size = basis.row_count();
    let constraints = LpBuilder::of_size(size)
        .add_bounded_basis(lower, &Matrix::identity(size), upper)?
        .build()?;
    let inverse = basis.inverse()?;
    let order = width_order(&inverse, &constraints);
    Ok(Enumerator::new(inverse, constraints, order).collect())
}
