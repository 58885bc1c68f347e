//! # Fixed-Point Arithmetic
//!
//! **NO FLOATING POINT ONCE A POINT ENTERS THE CULLING PIPELINE**
//!
//! The camera footprint is recomputed every frame and diffed against the
//! previous one. Float drift between two frames would make tiles on the
//! footprint border flicker, so every coordinate is converted once into a
//! signed 64-bit integer scaled by [`UNIT`].
//!
//! ## Precision
//!
//! - `UNIT = 2^20`, i.e. 20 fractional bits (~1e-6 tile)
//! - Range: about ±8.7e12 tiles, far beyond any map
//!
//! ## Multiplication
//!
//! Fixed values are only ever multiplied by plain integers or `f64` scale
//! factors. The two places that need a fixed × fixed product (slope
//! computation and slope interpolation) go through [`Fixed::ratio`] and
//! [`Fixed::mul_slope`], which widen to `i128`.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use bytemuck::{Pod, Zeroable};

use crate::error::{GeometryError, GeometryResult};
use crate::vector::Vec3;

/// Number of fractional bits.
pub const PRECISION_DIGITS: u32 = 20;

/// The raw value of `1.0`.
pub const UNIT: i64 = 1 << PRECISION_DIGITS;

// =============================================================================
// Fixed - scalar
// =============================================================================

/// Signed fixed-point number with [`PRECISION_DIGITS`] fractional bits.
///
/// Internally stores `value * UNIT` as an `i64`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct Fixed(i64);

impl Fixed {
    /// Zero value.
    pub const ZERO: Self = Self(0);

    /// One unit (one tile).
    pub const ONE: Self = Self(UNIT);

    /// Maximum representable value.
    pub const MAX: Self = Self(i64::MAX);

    /// Minimum representable value.
    pub const MIN: Self = Self(i64::MIN);

    /// Creates from the raw internal representation.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw internal value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Creates from a whole number.
    #[inline]
    #[must_use]
    pub const fn from_int(whole: i64) -> Self {
        Self(whole * UNIT)
    }

    /// Converts an engine float, truncating toward zero.
    ///
    /// # Example
    ///
    /// ```rust
    /// use umbra_geometry::{Fixed, UNIT};
    ///
    /// assert_eq!(Fixed::from_f64(1.5).raw(), UNIT + UNIT / 2);
    /// assert_eq!(Fixed::from_f64(-0.75).raw(), -(UNIT * 3 / 4));
    /// ```
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn from_f64(value: f64) -> Self {
        Self((value * UNIT as f64) as i64)
    }

    /// Converts an engine `f32`, truncating toward zero.
    #[inline]
    #[must_use]
    pub fn from_f32(value: f32) -> Self {
        Self::from_f64(f64::from(value))
    }

    /// Converts back to a float (debugging and engine hand-off only).
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / UNIT as f64
    }

    /// Largest whole number `<= self`: the tile row/column containing `self`.
    #[inline]
    #[must_use]
    pub const fn floor_int(self) -> i64 {
        self.0 >> PRECISION_DIGITS
    }

    /// Smallest whole number `>= self`.
    #[inline]
    #[must_use]
    pub const fn ceil_int(self) -> i64 {
        -((-self.0) >> PRECISION_DIGITS)
    }

    /// Absolute value.
    #[inline]
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Checked division by an integer. Returns `None` for a zero divisor.
    #[inline]
    #[must_use]
    pub const fn checked_div_int(self, rhs: i64) -> Option<Self> {
        match self.0.checked_div(rhs) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Multiplies by a plain float factor, truncating toward zero.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn scale(self, factor: f64) -> Self {
        Self((self.0 as f64 * factor) as i64)
    }

    /// Returns `num / den` as a fixed-point slope (`num * UNIT / den`),
    /// truncated toward zero. `None` when `den` is zero.
    #[inline]
    #[must_use]
    pub fn ratio(num: Self, den: Self) -> Option<Self> {
        if den.0 == 0 {
            return None;
        }
        let wide = i128::from(num.0) * i128::from(UNIT) / i128::from(den.0);
        Some(Self(narrow(wide)))
    }

    /// Slope of the edge `from -> to` as `dx / dy`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DivisionByZero`] when both vertices share `y`.
    #[inline]
    pub fn ratio_between(
        from: (usize, FixedVector3),
        to: (usize, FixedVector3),
    ) -> GeometryResult<Self> {
        Self::ratio(from.1.x - to.1.x, from.1.y - to.1.y).ok_or(GeometryError::DivisionByZero {
            from: from.0,
            to: to.0,
        })
    }

    /// Returns `slope * dy / UNIT`: the x offset of a rail after descending `dy`.
    #[inline]
    #[must_use]
    pub fn mul_slope(slope: Self, dy: Self) -> Self {
        let wide = i128::from(slope.0) * i128::from(dy.0) / i128::from(UNIT);
        Self(narrow(wide))
    }
}

/// Saturates an `i128` intermediate back into the `i64` representation.
#[inline]
fn narrow(wide: i128) -> i64 {
    i64::try_from(wide).unwrap_or(if wide < 0 { i64::MIN } else { i64::MAX })
}

impl Add for Fixed {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl Sub for Fixed {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl Neg for Fixed {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self(self.0.wrapping_neg())
    }
}

impl Mul<i64> for Fixed {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0.wrapping_mul(rhs))
    }
}

impl Div<i64> for Fixed {
    type Output = Self;

    #[inline]
    fn div(self, rhs: i64) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({:.6})", self.to_f64())
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.to_f64())
    }
}

// =============================================================================
// FixedVector2 / FixedVector3
// =============================================================================

/// 2D fixed-point vector on the ground plane.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct FixedVector2 {
    /// X component.
    pub x: Fixed,
    /// Y component.
    pub y: Fixed,
}

impl FixedVector2 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(Fixed::ZERO, Fixed::ZERO);

    /// Creates a new vector.
    #[inline]
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Creates from whole tile coordinates.
    #[inline]
    #[must_use]
    pub const fn from_ints(x: i64, y: i64) -> Self {
        Self::new(Fixed::from_int(x), Fixed::from_int(y))
    }

    /// Creates from float coordinates, truncating toward zero.
    #[inline]
    #[must_use]
    pub fn from_f64s(x: f64, y: f64) -> Self {
        Self::new(Fixed::from_f64(x), Fixed::from_f64(y))
    }

    /// Exact 2D cross product `self × rhs` on the raw values.
    #[inline]
    #[must_use]
    pub fn cross(self, rhs: Self) -> i128 {
        i128::from(self.x.raw()) * i128::from(rhs.y.raw())
            - i128::from(self.y.raw()) * i128::from(rhs.x.raw())
    }

    /// Exact squared length on the raw values.
    #[inline]
    #[must_use]
    pub fn length_squared(self) -> i128 {
        let x = i128::from(self.x.raw());
        let y = i128::from(self.y.raw());
        x * x + y * y
    }

    /// Lifts onto the ground plane (`z = 0`).
    #[inline]
    #[must_use]
    pub const fn extend(self) -> FixedVector3 {
        FixedVector3::new(self.x, self.y, Fixed::ZERO)
    }
}

impl Add for FixedVector2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for FixedVector2 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<i64> for FixedVector2 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: i64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl fmt::Debug for FixedVector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// 3D fixed-point vector; `z` is carried but culling only looks at `x`/`y`.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct FixedVector3 {
    /// X component.
    pub x: Fixed,
    /// Y component.
    pub y: Fixed,
    /// Z component.
    pub z: Fixed,
}

impl FixedVector3 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(Fixed::ZERO, Fixed::ZERO, Fixed::ZERO);

    /// Creates a new vector.
    #[inline]
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed, z: Fixed) -> Self {
        Self { x, y, z }
    }

    /// Creates a ground point from whole tile coordinates.
    #[inline]
    #[must_use]
    pub const fn from_ints(x: i64, y: i64) -> Self {
        Self::new(Fixed::from_int(x), Fixed::from_int(y), Fixed::ZERO)
    }

    /// Converts an engine vector (multiply by `UNIT`, truncate toward zero).
    #[inline]
    #[must_use]
    pub fn from_vec3(v: Vec3) -> Self {
        Self::new(Fixed::from_f32(v.x), Fixed::from_f32(v.y), Fixed::from_f32(v.z))
    }

    /// Ground-plane projection.
    #[inline]
    #[must_use]
    pub const fn xy(self) -> FixedVector2 {
        FixedVector2::new(self.x, self.y)
    }
}

impl From<Vec3> for FixedVector3 {
    fn from(v: Vec3) -> Self {
        Self::from_vec3(v)
    }
}

impl Add for FixedVector3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for FixedVector3 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<i64> for FixedVector3 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: i64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl fmt::Debug for FixedVector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_int() {
        let value = Fixed::from_int(7);
        assert_eq!(value.raw(), 7 * UNIT);
        assert_eq!(value.floor_int(), 7);
        assert_eq!(value.ceil_int(), 7);
    }

    #[test]
    fn test_from_f64_truncates_toward_zero() {
        let tiny = 1.0 / (UNIT as f64 * 4.0);
        assert_eq!(Fixed::from_f64(tiny).raw(), 0);
        assert_eq!(Fixed::from_f64(-tiny).raw(), 0);
        assert_eq!(Fixed::from_f64(2.25).raw(), 2 * UNIT + UNIT / 4);
    }

    #[test]
    fn test_floor_and_ceil_negative() {
        let value = Fixed::from_f64(-1.5);
        assert_eq!(value.floor_int(), -2);
        assert_eq!(value.ceil_int(), -1);
    }

    #[test]
    fn test_ratio() {
        let slope = Fixed::ratio(Fixed::from_int(3), Fixed::from_int(2)).unwrap();
        assert_eq!(slope, Fixed::from_f64(1.5));
    }

    #[test]
    fn test_ratio_by_zero() {
        assert!(Fixed::ratio(Fixed::ONE, Fixed::ZERO).is_none());

        let a = FixedVector3::from_ints(0, 4);
        let b = FixedVector3::from_ints(3, 4);
        assert_eq!(
            Fixed::ratio_between((2, a), (3, b)),
            Err(GeometryError::DivisionByZero { from: 2, to: 3 })
        );
    }

    #[test]
    fn test_mul_slope() {
        let slope = Fixed::from_f64(-0.5);
        assert_eq!(Fixed::mul_slope(slope, Fixed::from_int(6)), Fixed::from_int(-3));
    }

    #[test]
    fn test_checked_div_int() {
        assert_eq!(Fixed::from_int(9).checked_div_int(3), Some(Fixed::from_int(3)));
        assert!(Fixed::ONE.checked_div_int(0).is_none());
    }

    #[test]
    fn test_scale() {
        assert_eq!(Fixed::from_int(4).scale(0.25), Fixed::ONE);
    }

    #[test]
    fn test_cross() {
        let a = FixedVector2::from_ints(1, 0);
        let b = FixedVector2::from_ints(0, 1);
        assert!(a.cross(b) > 0);
        assert!(b.cross(a) < 0);
        assert_eq!(a.cross(a * 3), 0);
    }

    #[test]
    fn test_from_vec3() {
        let v = FixedVector3::from_vec3(Vec3::new(1.0, -2.0, 0.5));
        assert_eq!(v.x, Fixed::ONE);
        assert_eq!(v.y, Fixed::from_int(-2));
        assert_eq!(v.z, Fixed::from_raw(UNIT / 2));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Fixed::from_f64(2.5)), "2.500000");
    }
}
