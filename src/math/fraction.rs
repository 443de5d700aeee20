use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// An exact rational number represented as numerator/denominator.
/// Invariants:
/// - denominator > 0
/// - gcd(|numerator|, denominator) == 1
/// - if numerator == 0 then denominator == 1
#[derive(Clone, Debug)]
pub struct Fraction {
    num: BigInt,
    den: BigInt,
}

impl Fraction {
    pub fn zero() -> Self {
        Fraction {
            num: BigInt::zero(),
            den: BigInt::one(),
        }
    }

    pub fn one() -> Self {
        Fraction {
            num: BigInt::one(),
            den: BigInt::one(),
        }
    }

    pub fn minus_one() -> Self {
        Fraction {
            num: -BigInt::one(),
            den: BigInt::one(),
        }
    }

    pub fn half() -> Self {
        Fraction {
            num: BigInt::one(),
            den: BigInt::from(2),
        }
    }

    pub fn new(numerator: impl Into<BigInt>, denominator: impl Into<BigInt>) -> Self {
        let mut f = Fraction {
            num: numerator.into(),
            den: denominator.into(),
        };
        if f.den.is_zero() {
            panic!("Division by zero");
        }
        f.simplify();
        f
    }

    fn new_raw(num: BigInt, den: BigInt) -> Self {
        let mut f = Fraction { num, den };
        f.simplify();
        f
    }

    fn simplify(&mut self) {
        if self.num.is_zero() {
            self.den = BigInt::one();
            return;
        }
        if self.den.is_negative() {
            self.num = -&self.num;
            self.den = -&self.den;
        }
        let g = self.num.gcd(&self.den);
        self.num = &self.num / &g;
        self.den = &self.den / &g;
    }

    pub fn numerator(&self) -> &BigInt {
        &self.num
    }

    pub fn denominator(&self) -> &BigInt {
        &self.den
    }

    pub fn negate(&self) -> Fraction {
        Fraction {
            num: -&self.num,
            den: self.den.clone(),
        }
    }

    pub fn reciprocal(&self) -> Fraction {
        Fraction::new_raw(self.den.clone(), self.num.clone())
    }

    pub fn abs(&self) -> Fraction {
        if self.num.is_negative() {
            self.negate()
        } else {
            self.clone()
        }
    }

    pub fn signum(&self) -> i32 {
        if self.num.is_positive() {
            1
        } else if self.num.is_negative() {
            -1
        } else {
            0
        }
    }

    /// Raise to an integer power. A negative exponent inverts first, so the
    /// value must be nonzero in that case.
    pub fn pow(&self, exp: i32) -> Fraction {
        if exp < 0 {
            return self.reciprocal().pow(-exp);
        }
        Fraction {
            num: self.num.pow(exp as u32),
            den: self.den.pow(exp as u32),
        }
    }

    /// Floor: largest integer k such that k <= self
    pub fn floor(&self) -> BigInt {
        if self.den.is_one() {
            self.num.clone()
        } else if self.num.is_negative() {
            &self.num / &self.den - BigInt::one()
        } else {
            &self.num / &self.den
        }
    }

    /// Ceil: smallest integer k such that k >= self
    pub fn ceil(&self) -> BigInt {
        if self.den.is_one() {
            self.num.clone()
        } else if self.num.is_positive() {
            &self.num / &self.den + BigInt::one()
        } else {
            &self.num / &self.den
        }
    }

    /// Round: closest integer, rounding 0.5 up (towards +inf)
    pub fn round(&self) -> BigInt {
        (self + &Fraction::half()).floor()
    }

    /// `self - floor(self / m) * m`; the result has the sign of `m`.
    pub fn modulo(&self, m: &Fraction) -> Fraction {
        self - &(m * &Fraction::from((self / m).floor()))
    }

    pub fn is_integer(&self) -> bool {
        self.den.is_one()
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }
}

impl Add for &Fraction {
    type Output = Fraction;

    fn add(self, other: &Fraction) -> Fraction {
        Fraction::new_raw(
            &self.num * &other.den + &other.num * &self.den,
            &self.den * &other.den,
        )
    }
}

impl Sub for &Fraction {
    type Output = Fraction;

    fn sub(self, other: &Fraction) -> Fraction {
        Fraction::new_raw(
            &self.num * &other.den - &other.num * &self.den,
            &self.den * &other.den,
        )
    }
}

impl Mul for &Fraction {
    type Output = Fraction;

    fn mul(self, other: &Fraction) -> Fraction {
        Fraction::new_raw(&self.num * &other.num, &self.den * &other.den)
    }
}

impl Div for &Fraction {
    type Output = Fraction;

    fn div(self, other: &Fraction) -> Fraction {
        Fraction::new_raw(&self.num * &other.den, &self.den * &other.num)
    }
}

impl Mul<&BigInt> for &Fraction {
    type Output = Fraction;

    fn mul(self, other: &BigInt) -> Fraction {
        Fraction::new_raw(&self.num * other, self.den.clone())
    }
}

impl Neg for &Fraction {
    type Output = Fraction;

    fn neg(self) -> Fraction {
        self.negate()
    }
}

impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        self.num == other.num && self.den == other.den
    }
}

impl Eq for Fraction {}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.num * &other.den).cmp(&(&other.num * &self.den))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den.is_one() {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl From<i64> for Fraction {
    fn from(n: i64) -> Self {
        Fraction {
            num: BigInt::from(n),
            den: BigInt::one(),
        }
    }
}

impl From<BigInt> for Fraction {
    fn from(n: BigInt) -> Self {
        Fraction {
            num: n,
            den: BigInt::one(),
        }
    }
}
