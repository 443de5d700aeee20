//! # LCG Reverser
//!
//! Recovers the possible internal states (seeds) of a linear congruential
//! generator from a transcript of partially observed outputs. Each observed
//! call constrains the post-update state to a bit range; the solver turns the
//! transcript into an integer-lattice enumeration problem, reduces the basis
//! with LLL, prunes the search region with exact-rational linear programming,
//! and replays every surviving candidate against the original observations.
//!
//! ## Overview
//!
//! Everything from the rational arithmetic up through the simplex pivots is
//! exact. No floating point enters the pipeline, so the lattice point count
//! is correct even on adversarial inputs.
//!
//! The pipeline is: **transcript → seed constraints → lattice basis → LLL →
//! LP-pruned branch and bound → replay validation → initial seeds**.

/// Exact rational arithmetic, vectors and matrices with strided views,
/// Gauss-Jordan elimination, and the two-phase simplex optimizer.
pub mod math;
/// Linear congruential generator model and the Java-compatible cursor.
pub mod lcg;
/// LLL lattice basis reduction and lazy bounded lattice point enumeration.
pub mod lattice;
/// Call taxonomy and the transcript-to-seeds solve pipeline.
pub mod reverser;

mod error;

pub use error::ReverseError;
pub use lcg::lcg::Lcg;
pub use lcg::rand::Rand;
pub use reverser::call::{RandomCall, SeedCall};
pub use reverser::reverser::{Reverser, SeedStream};
