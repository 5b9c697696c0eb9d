//! Math utilities and types
//!
//! Provides the fixed-size 2D transform types used by camera and model code.
//! Vectors come from `nalgebra`; the 2x2 matrix is our own row-major value
//! type so that its in-place operators have exactly the semantics we rely on.

mod matrix2x2;

pub use matrix2x2::{Matrix2x2, MathError};
pub use nalgebra::Vector2;

use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 2x2 matrix type
pub type Mat2 = Matrix2x2<f32>;

/// Numeric element type usable inside a [`Matrix2x2`].
///
/// Implemented for the primitive integer and floating point types.
pub trait Element:
    nalgebra::Scalar
    + Copy
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
{
    /// Additive identity
    const ZERO: Self;

    /// Multiplicative identity
    const ONE: Self;
}

macro_rules! impl_element {
    ($zero:literal, $one:literal => $($ty:ty),*) => {
        $(
            impl Element for $ty {
                const ZERO: Self = $zero;
                const ONE: Self = $one;
            }
        )*
    };
}

impl_element!(0, 1 => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_element!(0.0, 1.0 => f32, f64);

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }
}
