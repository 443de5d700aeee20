use super::fraction::Fraction;
use crate::error::ReverseError;
use num_bigint::BigInt;
use std::fmt;

/// An owned vector of rationals with contiguous storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vector {
    data: Vec<Fraction>,
}

impl Vector {
    pub fn new(dimension: usize) -> Self {
        Vector {
            data: vec![Fraction::zero(); dimension],
        }
    }

    pub fn from_data(data: Vec<Fraction>) -> Self {
        Vector { data }
    }

    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    pub fn get(&self, i: usize) -> &Fraction {
        &self.data[i]
    }

    pub fn try_get(&self, i: usize) -> Result<&Fraction, ReverseError> {
        self.data.get(i).ok_or(ReverseError::IndexOutOfRange {
            index: i,
            len: self.data.len(),
        })
    }

    pub fn set(&mut self, i: usize, value: Fraction) {
        self.data[i] = value;
    }

    pub fn magnitude_sq(&self) -> Fraction {
        let mut mag = Fraction::zero();
        for x in &self.data {
            mag = &mag + &(x * x);
        }
        mag
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|x| x.is_zero())
    }

    pub fn add(&self, other: &Vector) -> Vector {
        assert_eq!(self.dimension(), other.dimension());
        Vector {
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| a + b)
                .collect(),
        }
    }

    pub fn subtract(&self, other: &Vector) -> Vector {
        assert_eq!(self.dimension(), other.dimension());
        Vector {
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| a - b)
                .collect(),
        }
    }

    pub fn add_assign(&mut self, other: &Vector) {
        assert_eq!(self.dimension(), other.dimension());
        for i in 0..self.data.len() {
            self.data[i] = &self.data[i] + other.get(i);
        }
    }

    pub fn subtract_assign(&mut self, other: &Vector) {
        assert_eq!(self.dimension(), other.dimension());
        for i in 0..self.data.len() {
            self.data[i] = &self.data[i] - other.get(i);
        }
    }

    pub fn multiply_scalar(&self, scalar: &Fraction) -> Vector {
        Vector {
            data: self.data.iter().map(|x| x * scalar).collect(),
        }
    }

    pub fn multiply_bigint(&self, scalar: &BigInt) -> Vector {
        Vector {
            data: self.data.iter().map(|x| x * scalar).collect(),
        }
    }

    pub fn dot(&self, other: &Vector) -> Fraction {
        assert_eq!(self.dimension(), other.dimension());
        let mut result = Fraction::zero();
        for i in 0..self.data.len() {
            result = &result + &(&self.data[i] * other.get(i));
        }
        result
    }

    pub fn negate(&self) -> Vector {
        Vector {
            data: self.data.iter().map(|x| x.negate()).collect(),
        }
    }

    /// Basis vector of the given size with `scale` at position `i`.
    pub fn basis(size: usize, i: usize, scale: Fraction) -> Vector {
        let mut v = Vector::new(size);
        v.set(i, scale);
        v
    }

    pub fn basis_one(size: usize, i: usize) -> Vector {
        Self::basis(size, i, Fraction::one())
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, x) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", x)?;
        }
        write!(f, "}}")
    }
}

/// A read-only strided view into shared storage. Index `i` maps to
/// `storage[offset + i * stride]`.
pub struct VectorView<'a> {
    storage: &'a [Fraction],
    len: usize,
    stride: usize,
    offset: usize,
}

impl<'a> VectorView<'a> {
    pub(crate) fn new(storage: &'a [Fraction], len: usize, stride: usize, offset: usize) -> Self {
        VectorView {
            storage,
            len,
            stride,
            offset,
        }
    }

    pub fn dimension(&self) -> usize {
        self.len
    }

    pub fn get(&self, i: usize) -> &Fraction {
        assert!(i < self.len);
        &self.storage[self.offset + i * self.stride]
    }

    pub fn dot(&self, other: &VectorView<'_>) -> Fraction {
        assert_eq!(self.len, other.len);
        let mut result = Fraction::zero();
        for i in 0..self.len {
            result = &result + &(self.get(i) * other.get(i));
        }
        result
    }

    /// Copy out into an owned contiguous vector.
    pub fn to_vector(&self) -> Vector {
        Vector {
            data: (0..self.len).map(|i| self.get(i).clone()).collect(),
        }
    }
}

/// A mutable strided view. Writes land in the shared storage and are visible
/// through the owning matrix and any later view of the same cells.
pub struct VectorViewMut<'a> {
    storage: &'a mut [Fraction],
    len: usize,
    stride: usize,
    offset: usize,
}

impl<'a> VectorViewMut<'a> {
    pub(crate) fn new(
        storage: &'a mut [Fraction],
        len: usize,
        stride: usize,
        offset: usize,
    ) -> Self {
        VectorViewMut {
            storage,
            len,
            stride,
            offset,
        }
    }

    pub fn dimension(&self) -> usize {
        self.len
    }

    pub fn get(&self, i: usize) -> &Fraction {
        assert!(i < self.len);
        &self.storage[self.offset + i * self.stride]
    }

    pub fn set(&mut self, i: usize, value: Fraction) {
        assert!(i < self.len);
        self.storage[self.offset + i * self.stride] = value;
    }

    pub fn to_vector(&self) -> Vector {
        Vector {
            data: (0..self.len).map(|i| self.get(i).clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_and_dot() {
        let e1 = Vector::basis_one(3, 1);
        let v = Vector::from_data(vec![
            Fraction::from(2),
            Fraction::from(-3),
            Fraction::from(5),
        ]);
        assert_eq!(e1.dot(&v), Fraction::from(-3));
        assert_eq!(v.magnitude_sq(), Fraction::from(38));
    }

    #[test]
    fn zero_size() {
        let v = Vector::new(0);
        assert_eq!(v.dimension(), 0);
        assert!(v.is_zero());
        assert_eq!(v.dot(&Vector::new(0)), Fraction::zero());
    }

    #[test]
    fn strided_view_reads() {
        let data = vec![
            Fraction::from(0),
            Fraction::from(1),
            Fraction::from(2),
            Fraction::from(3),
            Fraction::from(4),
            Fraction::from(5),
        ];
        let view = VectorView::new(&data, 3, 2, 1);
        assert_eq!(view.get(0), &Fraction::from(1));
        assert_eq!(view.get(1), &Fraction::from(3));
        assert_eq!(view.get(2), &Fraction::from(5));
        assert_eq!(view.to_vector().dimension(), 3);
    }

    #[test]
    fn try_get_out_of_range() {
        let v = Vector::new(2);
        assert!(v.try_get(1).is_ok());
        assert!(v.try_get(2).is_err());
    }
}
