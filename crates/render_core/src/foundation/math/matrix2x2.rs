//! Row-major 2x2 matrix for 2D transforms
//!
//! Storage is `[m00, m01, m10, m11]`: indices 0 and 1 form the first row,
//! 2 and 3 the second. Vectors are treated as columns, so `M * v` yields
//! `(m00*x + m01*y, m10*x + m11*y)`.
//!
//! Every in-place operation reads the whole source matrix into locals before
//! writing, which keeps `a *= a` and `a.mul_matrix(&a.clone())` well-defined.

use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

use approx::{AbsDiffEq, RelativeEq, UlpsEq};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Element, Vector2};

/// Errors raised by checked matrix access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    /// Element, row or column index past the end of the matrix
    #[error("Matrix does not contain an element at index {index} (size {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of addressable items
        len: usize,
    },
}

/// Generic 2x2 matrix stored in row-major order
///
/// A plain value type: `Copy`, no heap storage, zero matrix by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Matrix2x2<T> {
    elements: [T; 4],
}

impl<T> Matrix2x2<T> {
    /// Number of elements in a row
    pub const ROW_SIZE: usize = 2;

    /// Total number of elements
    pub const SIZE: usize = Self::ROW_SIZE * Self::ROW_SIZE;

    /// Create a matrix from its elements, row by row
    pub const fn new(m00: T, m01: T, m10: T, m11: T) -> Self {
        Self {
            elements: [m00, m01, m10, m11],
        }
    }

    /// Create a matrix from a row-major element array
    pub const fn from_elements(elements: [T; 4]) -> Self {
        Self { elements }
    }

    /// Borrow the row-major element storage
    pub const fn as_slice(&self) -> &[T] {
        &self.elements
    }
}

impl<T: Element> Matrix2x2<T> {
    /// Create a matrix from two rows
    pub fn from_rows(first: [T; 2], second: [T; 2]) -> Self {
        Self::new(first[0], first[1], second[0], second[1])
    }

    /// The zero matrix
    pub const fn zeros() -> Self {
        Self::from_elements([T::ZERO; 4])
    }

    /// The identity matrix
    pub const fn identity() -> Self {
        Self::new(T::ONE, T::ZERO, T::ZERO, T::ONE)
    }

    /// Copy of the row-major elements
    pub const fn elements(&self) -> [T; 4] {
        self.elements
    }

    /// Checked element read
    ///
    /// # Errors
    /// Returns [`MathError::IndexOutOfRange`] when `index >= 4`.
    pub fn get(&self, index: usize) -> Result<T, MathError> {
        self.elements
            .get(index)
            .copied()
            .ok_or(MathError::IndexOutOfRange {
                index,
                len: Self::SIZE,
            })
    }

    /// Checked element write
    ///
    /// # Errors
    /// Returns [`MathError::IndexOutOfRange`] when `index >= 4`.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), MathError> {
        let slot = self
            .elements
            .get_mut(index)
            .ok_or(MathError::IndexOutOfRange {
                index,
                len: Self::SIZE,
            })?;
        *slot = value;
        Ok(())
    }

    /// Read one row
    ///
    /// # Errors
    /// Returns [`MathError::IndexOutOfRange`] when `row >= 2`.
    pub fn row(&self, row: usize) -> Result<[T; 2], MathError> {
        if row >= Self::ROW_SIZE {
            return Err(MathError::IndexOutOfRange {
                index: row,
                len: Self::ROW_SIZE,
            });
        }
        let start = row * Self::ROW_SIZE;
        Ok([self.elements[start], self.elements[start + 1]])
    }

    /// Read one column
    ///
    /// # Errors
    /// Returns [`MathError::IndexOutOfRange`] when `column >= 2`.
    pub fn column(&self, column: usize) -> Result<[T; 2], MathError> {
        if column >= Self::ROW_SIZE {
            return Err(MathError::IndexOutOfRange {
                index: column,
                len: Self::ROW_SIZE,
            });
        }
        Ok([
            self.elements[column],
            self.elements[Self::ROW_SIZE + column],
        ])
    }

    /// Swap the off-diagonal elements in place
    pub fn transpose(&mut self) -> &mut Self {
        let [m00, m01, m10, m11] = self.elements;
        self.elements = [m00, m10, m01, m11];
        self
    }

    /// Transposed copy, leaving `self` untouched
    #[must_use]
    pub fn transposed(&self) -> Self {
        let mut copy = *self;
        copy.transpose();
        copy
    }

    /// Element-wise addition in place
    pub fn add_matrix(&mut self, other: &Self) -> &mut Self {
        for (lhs, rhs) in self.elements.iter_mut().zip(other.elements) {
            *lhs = *lhs + rhs;
        }
        self
    }

    /// Element-wise subtraction in place
    pub fn sub_matrix(&mut self, other: &Self) -> &mut Self {
        for (lhs, rhs) in self.elements.iter_mut().zip(other.elements) {
            *lhs = *lhs - rhs;
        }
        self
    }

    /// Scale every element in place
    pub fn mul_scalar(&mut self, scalar: T) -> &mut Self {
        for element in &mut self.elements {
            *element = *element * scalar;
        }
        self
    }

    /// Matrix product `self = self * other`
    pub fn mul_matrix(&mut self, other: &Self) -> &mut Self {
        // Both operands are snapshotted: rows of `self` are read before any write.
        let [a00, a01, a10, a11] = self.elements;
        let [b00, b01, b10, b11] = other.elements;
        self.elements = [
            a00 * b00 + a01 * b10,
            a00 * b01 + a01 * b11,
            a10 * b00 + a11 * b10,
            a10 * b01 + a11 * b11,
        ];
        self
    }

    /// Transform a vector, returning a new one
    pub fn mul_vector(&self, vector: &Vector2<T>) -> Vector2<T> {
        let [m00, m01, m10, m11] = self.elements;
        Vector2::new(
            m00 * vector.x + m01 * vector.y,
            m10 * vector.x + m11 * vector.y,
        )
    }

    /// Determinant `m00*m11 - m01*m10`
    pub fn determinant(&self) -> T {
        let [m00, m01, m10, m11] = self.elements;
        m00 * m11 - m01 * m10
    }
}

macro_rules! impl_float_transforms {
    ($($ty:ty),*) => {
        $(
            impl Matrix2x2<$ty> {
                /// Counter-clockwise rotation by `angle` radians
                pub fn rotation(angle: $ty) -> Self {
                    let (sin, cos) = angle.sin_cos();
                    Self::new(cos, -sin, sin, cos)
                }

                /// Axis-aligned scale
                pub const fn scaling(sx: $ty, sy: $ty) -> Self {
                    Self::new(sx, 0.0, 0.0, sy)
                }

                /// Inverse matrix, or `None` when the matrix is singular
                ///
                /// Singularity is judged relative to the size of the two
                /// determinant products, so uniformly small matrices still
                /// invert.
                pub fn inverse(&self) -> Option<Self> {
                    let [m00, m01, m10, m11] = self.elements;
                    let det = self.determinant();
                    let scale = (m00 * m11).abs().max((m01 * m10).abs());
                    if !det.is_finite() || det.abs() <= <$ty>::EPSILON * scale {
                        return None;
                    }
                    let inv_det = 1.0 / det;
                    Some(Self::new(
                        m11 * inv_det,
                        -m01 * inv_det,
                        -m10 * inv_det,
                        m00 * inv_det,
                    ))
                }
            }
        )*
    };
}

impl_float_transforms!(f32, f64);

impl<T: Element> Default for Matrix2x2<T> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<T> Index<usize> for Matrix2x2<T> {
    type Output = T;

    /// Panics when `index >= 4`; use [`Matrix2x2::get`] for a checked read.
    fn index(&self, index: usize) -> &T {
        &self.elements[index]
    }
}

impl<T> IndexMut<usize> for Matrix2x2<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.elements[index]
    }
}

impl<T: Element> AddAssign for Matrix2x2<T> {
    fn add_assign(&mut self, rhs: Self) {
        self.add_matrix(&rhs);
    }
}

impl<T: Element> SubAssign for Matrix2x2<T> {
    fn sub_assign(&mut self, rhs: Self) {
        self.sub_matrix(&rhs);
    }
}

impl<T: Element> MulAssign<T> for Matrix2x2<T> {
    fn mul_assign(&mut self, rhs: T) {
        self.mul_scalar(rhs);
    }
}

impl<T: Element> MulAssign for Matrix2x2<T> {
    fn mul_assign(&mut self, rhs: Self) {
        self.mul_matrix(&rhs);
    }
}

/// `v *= m` replaces `v` with `m * v`.
impl<T: Element> MulAssign<Matrix2x2<T>> for Vector2<T> {
    fn mul_assign(&mut self, rhs: Matrix2x2<T>) {
        *self = rhs.mul_vector(self);
    }
}

impl<T: Element> Add for Matrix2x2<T> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self.add_matrix(&rhs);
        self
    }
}

impl<T: Element> Sub for Matrix2x2<T> {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        self.sub_matrix(&rhs);
        self
    }
}

impl<T: Element> Mul<T> for Matrix2x2<T> {
    type Output = Self;

    fn mul(mut self, rhs: T) -> Self {
        self.mul_scalar(rhs);
        self
    }
}

impl<T: Element> Mul for Matrix2x2<T> {
    type Output = Self;

    fn mul(mut self, rhs: Self) -> Self {
        self.mul_matrix(&rhs);
        self
    }
}

impl<T: Element> Mul<Vector2<T>> for Matrix2x2<T> {
    type Output = Vector2<T>;

    fn mul(self, rhs: Vector2<T>) -> Vector2<T> {
        self.mul_vector(&rhs)
    }
}

impl<T: Element + Neg<Output = T>> Neg for Matrix2x2<T> {
    type Output = Self;

    fn neg(self) -> Self {
        let [m00, m01, m10, m11] = self.elements;
        Self::new(-m00, -m01, -m10, -m11)
    }
}

impl<T: fmt::Display> fmt::Display for Matrix2x2<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [m00, m01, m10, m11] = &self.elements;
        write!(f, "[[{m00}, {m01}], [{m10}, {m11}]]")
    }
}

impl<T: Element> From<nalgebra::Matrix2<T>> for Matrix2x2<T> {
    fn from(m: nalgebra::Matrix2<T>) -> Self {
        Self::new(m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)])
    }
}

impl<T: Element> From<Matrix2x2<T>> for nalgebra::Matrix2<T> {
    fn from(m: Matrix2x2<T>) -> Self {
        let [m00, m01, m10, m11] = m.elements;
        Self::new(m00, m01, m10, m11)
    }
}

impl<T: Element> From<[[T; 2]; 2]> for Matrix2x2<T> {
    fn from(rows: [[T; 2]; 2]) -> Self {
        Self::from_rows(rows[0], rows[1])
    }
}

impl<T> AbsDiffEq for Matrix2x2<T>
where
    T: AbsDiffEq,
    T::Epsilon: Copy,
{
    type Epsilon = T::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        T::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.elements
            .iter()
            .zip(&other.elements)
            .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl<T> RelativeEq for Matrix2x2<T>
where
    T: RelativeEq,
    T::Epsilon: Copy,
{
    fn default_max_relative() -> Self::Epsilon {
        T::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.elements
            .iter()
            .zip(&other.elements)
            .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}

impl<T> UlpsEq for Matrix2x2<T>
where
    T: UlpsEq,
    T::Epsilon: Copy,
{
    fn default_max_ulps() -> u32 {
        T::default_max_ulps()
    }

    fn ulps_eq(&self, other: &Self, epsilon: Self::Epsilon, max_ulps: u32) -> bool {
        self.elements
            .iter()
            .zip(&other.elements)
            .all(|(a, b)| a.ulps_eq(b, epsilon, max_ulps))
    }
}
