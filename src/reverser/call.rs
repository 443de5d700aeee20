use crate::error::ReverseError;
use crate::lcg::rand::Rand;

const MASK_16: u64 = 0xFFFF;
const MASK_32: u64 = 0xFFFF_FFFF;

/// An inclusive bound on a single post-update internal state. This is the
/// base call: one update, its own seed constraint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedCall {
    pub min: i64,
    pub max: i64,
}

impl SeedCall {
    pub fn new(min: i64, max: i64) -> Self {
        SeedCall { min, max }
    }
}

/// One observed generator call. Each variant knows how many seed updates it
/// consumes, how its domain bounds translate into seed constraints, and how
/// to re-check a candidate by replaying the real call.
///
/// The bit-range encodings target the 48-bit Java-style generator family.
#[derive(Clone, Debug)]
pub enum RandomCall {
    /// Direct constraint on one post-update state.
    Seed(SeedCall),
    /// `nextBoolean()` with a known outcome.
    Boolean { value: bool },
    /// `nextInt()` (full 32-bit) within `[min, max]`.
    Int { min: i32, max: i32 },
    /// `nextInt(range)` for a power-of-two range, result in `[min, max]`.
    IntRangePow2 { range: i32, min: i32, max: i32 },
    /// `nextFloat()` within the given bounds.
    Float {
        min: f32,
        max: f32,
        min_exclusive: bool,
        max_exclusive: bool,
    },
    /// `nextLong()` within `[min, max]`.
    Long { min: i64, max: i64 },
    /// `nextDouble()` within the given bounds.
    Double {
        min: f64,
        max: f64,
        min_exclusive: bool,
        max_exclusive: bool,
    },
}

impl RandomCall {
    pub fn seed(min: i64, max: i64) -> RandomCall {
        RandomCall::Seed(SeedCall::new(min, max))
    }

    pub fn boolean(value: bool) -> RandomCall {
        RandomCall::Boolean { value }
    }

    pub fn int_range(min: i32, max: i32) -> Result<RandomCall, ReverseError> {
        if min > max {
            return Err(ReverseError::InvalidArgument(format!(
                "empty int range [{}, {}]",
                min, max
            )));
        }
        Ok(RandomCall::Int { min, max })
    }

    pub fn int_range_pow2(range: i32, min: i32, max: i32) -> Result<RandomCall, ReverseError> {
        if range <= 0 || (range & range.wrapping_neg()) != range {
            return Err(ReverseError::InvalidArgument(format!(
                "range {} is not a positive power of two",
                range
            )));
        }
        if min > max || min < 0 || max >= range {
            return Err(ReverseError::InvalidArgument(format!(
                "bounds [{}, {}] do not fit in [0, {})",
                min, max, range
            )));
        }
        Ok(RandomCall::IntRangePow2 { range, min, max })
    }

    pub fn float_range(min: f32, max: f32) -> Result<RandomCall, ReverseError> {
        Self::float_range_exclusive(min, max, false, false)
    }

    pub fn float_range_exclusive(
        min: f32,
        max: f32,
        min_exclusive: bool,
        max_exclusive: bool,
    ) -> Result<RandomCall, ReverseError> {
        if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&max) || min > max {
            return Err(ReverseError::InvalidArgument(format!(
                "bad float bounds [{}, {}]",
                min, max
            )));
        }
        Ok(RandomCall::Float {
            min,
            max,
            min_exclusive,
            max_exclusive,
        })
    }

    pub fn long_range(min: i64, max: i64) -> Result<RandomCall, ReverseError> {
        if min > max {
            return Err(ReverseError::InvalidArgument(format!(
                "empty long range [{}, {}]",
                min, max
            )));
        }
        Ok(RandomCall::Long { min, max })
    }

    pub fn double_range(min: f64, max: f64) -> Result<RandomCall, ReverseError> {
        Self::double_range_exclusive(min, max, false, false)
    }

    pub fn double_range_exclusive(
        min: f64,
        max: f64,
        min_exclusive: bool,
        max_exclusive: bool,
    ) -> Result<RandomCall, ReverseError> {
        if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&max) || min > max {
            return Err(ReverseError::InvalidArgument(format!(
                "bad double bounds [{}, {}]",
                min, max
            )));
        }
        Ok(RandomCall::Double {
            min,
            max,
            min_exclusive,
            max_exclusive,
        })
    }

    /// Number of seed updates this call consumes.
    pub fn skips(&self) -> i64 {
        match self {
            RandomCall::Long { .. } | RandomCall::Double { .. } => 2,
            _ => 1,
        }
    }

    /// Seed constraints at consecutive relative indices, starting at this
    /// call's first update. A trailing constraint is dropped when the later
    /// update carries no information.
    pub fn to_seed(&self) -> Vec<SeedCall> {
        match self {
            RandomCall::Seed(call) => vec![call.clone()],

            RandomCall::Boolean { value } => {
                let v = *value as i64;
                vec![SeedCall::new(v << 47, (v << 47) + ((1 << 47) - 1))]
            }

            RandomCall::Int { min, max } => {
                vec![SeedCall::new(
                    (*min as i64) << 16,
                    ((*max as i64) << 16) + 0xFFFF,
                )]
            }

            RandomCall::IntRangePow2 { range, min, max } => {
                let r = *range as i64;
                let lo = ((*min as i64) << 31) / r;
                let hi = (((*max as i64) << 31) + (1 << 31) - 1) / r;
                vec![SeedCall::new(lo << 17, (hi << 17) + ((1 << 17) - 1))]
            }

            RandomCall::Float {
                min,
                max,
                min_exclusive,
                max_exclusive,
            } => {
                let min = if *min_exclusive { min.next_up() } else { *min };
                let max = if *max_exclusive { max.next_down() } else { *max };
                let lo = ((min as f64 * (1u64 << 24) as f64).floor() as i64).min((1 << 24) - 1);
                let hi = ((max as f64 * (1u64 << 24) as f64).floor() as i64).min((1 << 24) - 1);
                vec![SeedCall::new(lo << 24, (hi << 24) + ((1 << 24) - 1))]
            }

            RandomCall::Long { min, max } => {
                let min_u = *min as u64;
                let max_u = *max as u64;
                let min_lo = min_u & MASK_32;
                let max_lo = max_u & MASK_32;
                // The low word is sign-extended before the add, so the
                // observed high word carries its sign bit, wrapping as a
                // 32-bit word
                let min_hi = ((min_u >> 32) + (min_lo >> 31)) & MASK_32;
                let max_hi = ((max_u >> 32) + (max_lo >> 31)) & MASK_32;

                let mut calls = vec![SeedCall::new(
                    (min_hi << 16) as i64,
                    ((max_hi << 16) | MASK_16) as i64,
                )];
                if min_hi == max_hi {
                    calls.push(SeedCall::new(
                        (min_lo << 16) as i64,
                        ((max_lo << 16) | MASK_16) as i64,
                    ));
                }
                calls
            }

            RandomCall::Double {
                min,
                max,
                min_exclusive,
                max_exclusive,
            } => {
                let min = if *min_exclusive { min.next_up() } else { *min };
                let max = if *max_exclusive { max.next_down() } else { *max };
                let scale = (1u64 << 53) as f64;
                let t_min = ((min * scale).floor() as u64).min((1 << 53) - 1);
                let t_max = ((max * scale).floor() as u64).min((1 << 53) - 1);
                let min_hi = t_min >> 27;
                let max_hi = t_max >> 27;

                let mut calls = vec![SeedCall::new(
                    (min_hi << 22) as i64,
                    ((max_hi << 22) + ((1 << 22) - 1)) as i64,
                )];
                if min_hi == max_hi {
                    let min_lo = t_min & ((1 << 27) - 1);
                    let max_lo = t_max & ((1 << 27) - 1);
                    calls.push(SeedCall::new(
                        (min_lo << 21) as i64,
                        ((max_lo << 21) + ((1 << 21) - 1)) as i64,
                    ));
                }
                calls
            }
        }
    }

    /// Replay the call on `rand`, consuming `skips()` updates, and check
    /// that the produced value satisfies the original constraint.
    pub fn validate(&self, rand: &mut Rand) -> bool {
        match self {
            RandomCall::Seed(call) => {
                let m = rand.lcg().modulus;
                let s = rand.next_seed();
                let min = rand.lcg().modop(call.min);
                let mut max = rand.lcg().modop(call.max);
                if max < min {
                    max += m;
                }
                (min..=max).contains(&s) || (min..=max).contains(&(s + m))
            }

            RandomCall::Boolean { value } => rand.next_boolean() == *value,

            RandomCall::Int { min, max } => (*min..=*max).contains(&rand.next_int32()),

            RandomCall::IntRangePow2 { range, min, max } => {
                (*min..=*max).contains(&rand.next_int(*range))
            }

            RandomCall::Float {
                min,
                max,
                min_exclusive,
                max_exclusive,
            } => {
                let f = rand.next_float();
                let above = if *min_exclusive { f > *min } else { f >= *min };
                let below = if *max_exclusive { f < *max } else { f <= *max };
                above && below
            }

            RandomCall::Long { min, max } => (*min..=*max).contains(&rand.next_long()),

            RandomCall::Double {
                min,
                max,
                min_exclusive,
                max_exclusive,
            } => {
                let d = rand.next_double();
                let above = if *min_exclusive { d > *min } else { d >= *min };
                let below = if *max_exclusive { d < *max } else { d <= *max };
                above && below
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcg::lcg::Lcg;

    #[test]
    fn boolean_halves() {
        let calls = RandomCall::boolean(false).to_seed();
        assert_eq!(calls, vec![SeedCall::new(0, (1 << 47) - 1)]);

        let calls = RandomCall::boolean(true).to_seed();
        assert_eq!(calls, vec![SeedCall::new(1 << 47, (1 << 48) - 1)]);
    }

    #[test]
    fn int_window() {
        let calls = RandomCall::int_range(-2, 3).unwrap().to_seed();
        assert_eq!(
            calls,
            vec![SeedCall::new(-2 << 16, (3 << 16) + 0xFFFF)]
        );
    }

    #[test]
    fn int_range_pow2_encoding() {
        let calls = RandomCall::int_range_pow2(16, 5, 5).unwrap().to_seed();
        let lo = (5i64 << 31) / 16;
        let hi = ((5i64 << 31) + (1 << 31) - 1) / 16;
        assert_eq!(
            calls,
            vec![SeedCall::new(lo << 17, (hi << 17) + 0x1FFFF)]
        );
    }

    #[test]
    fn int_range_pow2_degenerate_range_one() {
        let calls = RandomCall::int_range_pow2(1, 0, 0).unwrap().to_seed();
        assert_eq!(calls, vec![SeedCall::new(0, (1 << 48) - 1)]);
    }

    #[test]
    fn int_range_pow2_rejects_bad_arguments() {
        assert!(RandomCall::int_range_pow2(12, 0, 1).is_err());
        assert!(RandomCall::int_range_pow2(0, 0, 0).is_err());
        assert!(RandomCall::int_range_pow2(-16, 0, 1).is_err());
        assert!(RandomCall::int_range_pow2(16, 3, 2).is_err());
        assert!(RandomCall::int_range_pow2(16, 0, 16).is_err());
    }

    #[test]
    fn long_shares_high_word() {
        let calls = RandomCall::long_range(-3_700_000_000, -3_700_000_000)
            .unwrap()
            .to_seed();
        assert_eq!(calls.len(), 2);

        let v = -3_700_000_000i64 as u64;
        let hi = v >> 32;
        let lo = v & 0xFFFF_FFFF;
        assert!(lo >> 31 == 0);
        assert_eq!(calls[0], SeedCall::new((hi << 16) as i64, ((hi << 16) | 0xFFFF) as i64));
        assert_eq!(calls[1], SeedCall::new((lo << 16) as i64, ((lo << 16) | 0xFFFF) as i64));
    }

    #[test]
    fn long_drops_low_word_when_high_words_differ() {
        let calls = RandomCall::long_range(0, 1 << 40).unwrap().to_seed();
        assert_eq!(calls.len(), 1);
    }

    #[test]
    fn long_carry_from_negative_low_word() {
        // Low word has its sign bit set, so the observed high word is one up
        let v = (5i64 << 32) | 0x8000_0001;
        let calls = RandomCall::long_range(v, v).unwrap().to_seed();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].min >> 16, 6);
    }

    #[test]
    fn long_carry_wraps_the_high_word() {
        // -1 is produced by first word 0 and second word -1; the carry out
        // of 0xFFFFFFFF must wrap, not spill past the state width
        let calls = RandomCall::long_range(-1, -1).unwrap().to_seed();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], SeedCall::new(0, 0xFFFF));
        assert_eq!(
            calls[1],
            SeedCall::new(
                (0xFFFF_FFFFu64 << 16) as i64,
                ((0xFFFF_FFFFu64 << 16) | 0xFFFF) as i64
            )
        );
    }

    #[test]
    fn long_bounds_stay_inside_the_state_space() {
        for v in [-1i64, i64::MIN, i64::MIN | 0x8000_0000, i64::MAX, -3_700_000_000] {
            for call in RandomCall::long_range(v, v).unwrap().to_seed() {
                assert!(call.min >= 0, "value {:#x}", v);
                assert!(call.max < 1 << 48, "value {:#x}", v);
                assert!(call.min <= call.max);
            }
        }
    }

    #[test]
    fn double_drops_low_word_when_high_bits_differ() {
        let exact = RandomCall::double_range(0.5, 0.5).unwrap().to_seed();
        assert_eq!(exact.len(), 2);

        let wide = RandomCall::double_range(0.1, 0.9).unwrap().to_seed();
        assert_eq!(wide.len(), 1);
    }

    #[test]
    fn float_exclusive_bounds_narrow_the_window() {
        let inclusive = RandomCall::float_range(0.25, 0.5).unwrap().to_seed();
        let exclusive = RandomCall::float_range_exclusive(0.25, 0.5, true, true)
            .unwrap()
            .to_seed();
        assert!(exclusive[0].min > inclusive[0].min);
        assert!(exclusive[0].max < inclusive[0].max);
    }

    #[test]
    fn validators_accept_their_own_replay() {
        let lcg = Lcg::JAVA;
        let origin = Rand::of_scrambled_seed(&lcg, 4242);

        let mut rand = origin.clone();
        let v = rand.next_int32();
        let call = RandomCall::int_range(v, v).unwrap();
        assert!(call.validate(&mut origin.clone()));

        let mut rand = origin.clone();
        let v = rand.next_long();
        let call = RandomCall::long_range(v, v).unwrap();
        assert!(call.validate(&mut origin.clone()));

        let mut rand = origin.clone();
        let v = rand.next_boolean();
        let call = RandomCall::boolean(v);
        assert!(call.validate(&mut origin.clone()));

        let mut rand = origin.clone();
        let v = rand.next_float();
        let call = RandomCall::float_range(v, v).unwrap();
        assert!(call.validate(&mut origin.clone()));
        let strict = RandomCall::float_range_exclusive(v, v, true, true).unwrap();
        assert!(!strict.validate(&mut origin.clone()));
    }

    #[test]
    fn seed_call_validates_wrapped_interval() {
        let lcg = Lcg::new(5, 3, 16);
        let mut rand = Rand::of_internal_seed(&lcg, 2);
        assert_eq!(lcg.next_seed(2), 13);
        // Raw bounds [12, 17] cover the wrapped set {12..15, 0, 1}
        let call = RandomCall::seed(12, 17);
        assert!(call.validate(&mut rand));
        let mut rand = Rand::of_internal_seed(&lcg, 2);
        let miss = RandomCall::seed(14, 17);
        assert!(!miss.validate(&mut rand));
    }

    #[test]
    fn skips_per_variant() {
        assert_eq!(RandomCall::boolean(true).skips(), 1);
        assert_eq!(RandomCall::long_range(0, 0).unwrap().skips(), 2);
        assert_eq!(RandomCall::double_range(0.5, 0.5).unwrap().skips(), 2);
        assert_eq!(RandomCall::seed(0, 10).skips(), 1);
    }
}
