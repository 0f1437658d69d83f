#[cfg(not(feature = "libm"))]
use num_traits::float::FloatCore as NumTraitsFloat;
#[cfg(feature = "libm")]
use num_traits::Float as NumTraitsFloat;
use serde::{Deserialize, Serialize};

/// Types must implement this trait to instantiate any of the generic devices
/// in this crate.  Implementations are provided for `f32` and `f64`.
pub trait Float:
    NumTraitsFloat + From<u16> + From<f32> + Default + Copy + Serialize + for<'a> Deserialize<'a>
{
    /// 0
    const ZERO: Self;
    /// 1
    const ONE: Self;
    /// 2
    const TWO: Self;
    /// 1/2
    const ONE_HALF: Self;
    /// 10, the "high" level of a gate or trigger voltage
    const TEN: Self;
    /// 12, semitones per octave
    const TWELVE: Self;
    /// 60, seconds per minute
    const SIXTY: Self;
    /// ln(2)
    const LN_2: Self;
    /// Creates a value of this type from a u16.  Functionality provided by
    /// the trait (uses the `From<u16>` implementation)
    fn from_u16(x: u16) -> Self {
        <Self as From<u16>>::from(x)
    }
    /// Creates a value of this type from a f32.  Functionality provided by
    /// the trait (uses the `From<f32>` implementation)
    fn from_f32(x: f32) -> Self {
        <Self as From<f32>>::from(x)
    }
    /// Returns 2 raised to the power of self
    fn fexp2(self) -> Self;
    /// Returns the base 2 logarithm of self
    fn flog2(self) -> Self;
    /// Returns self raised to the power of `exp`.  Negative bases are not
    /// supported and return zero.
    fn fpow(self, exp: Self) -> Self;
}

impl Float for f32 {
    const ZERO: f32 = 0.0f32;
    const ONE: f32 = 1.0f32;
    const TWO: f32 = 2.0f32;
    const ONE_HALF: f32 = 0.5f32;
    const TEN: f32 = 10.0f32;
    const TWELVE: f32 = 12.0f32;
    const SIXTY: f32 = 60.0f32;
    const LN_2: f32 = core::f32::consts::LN_2;
    fn fexp2(self) -> Self {
        #[cfg(not(feature = "libm"))]
        let ret = crate::float_approx::exp2_approx(self);
        #[cfg(feature = "libm")]
        let ret = <Self as NumTraitsFloat>::exp2(self);
        ret
    }
    fn flog2(self) -> Self {
        #[cfg(not(feature = "libm"))]
        let ret = crate::float_approx::log2_approx(self);
        #[cfg(feature = "libm")]
        let ret = <Self as NumTraitsFloat>::log2(self);
        ret
    }
    fn fpow(self, exp: Self) -> Self {
        if self <= 0f32 {
            return 0f32;
        }
        #[cfg(not(feature = "libm"))]
        let ret = crate::float_approx::pow_approx(self, exp);
        #[cfg(feature = "libm")]
        let ret = <Self as NumTraitsFloat>::powf(self, exp);
        ret
    }
}

impl Float for f64 {
    const ZERO: f64 = 0.0f64;
    const ONE: f64 = 1.0f64;
    const TWO: f64 = 2.0f64;
    const ONE_HALF: f64 = 0.5f64;
    const TEN: f64 = 10.0f64;
    const TWELVE: f64 = 12.0f64;
    const SIXTY: f64 = 60.0f64;
    const LN_2: f64 = core::f64::consts::LN_2;
    fn fexp2(self) -> Self {
        #[cfg(not(feature = "libm"))]
        let ret = crate::float_approx::exp2_approx(self);
        #[cfg(feature = "libm")]
        let ret = <Self as NumTraitsFloat>::exp2(self);
        ret
    }
    fn flog2(self) -> Self {
        #[cfg(not(feature = "libm"))]
        let ret = crate::float_approx::log2_approx(self);
        #[cfg(feature = "libm")]
        let ret = <Self as NumTraitsFloat>::log2(self);
        ret
    }
    fn fpow(self, exp: Self) -> Self {
        if self <= 0f64 {
            return 0f64;
        }
        #[cfg(not(feature = "libm"))]
        let ret = crate::float_approx::pow_approx(self, exp);
        #[cfg(feature = "libm")]
        let ret = <Self as NumTraitsFloat>::powf(self, exp);
        ret
    }
}
