//! Polynomial approximations of the transcendental functions used by the
//! devices, for builds without libm.

#![cfg_attr(feature = "libm", allow(dead_code))]

use crate::Float;

/// Approximate 2^x.  Splits x into integer and fractional parts, evaluates
/// e^(f*ln2) with a truncated Taylor series and scales by the integer power.
/// Relative error is below 1e-6 over the whole range.
pub fn exp2_approx<T: Float>(x: T) -> T {
    let n = x.floor();
    let z = (x - n) * T::LN_2;
    // Horner form of 1 + z + z^2/2! + ... + z^8/8!
    let mut poly = T::ONE;
    for k in (1u16..=8).rev() {
        poly = T::ONE + z * poly / T::from_u16(k);
    }
    match n.to_i32() {
        Some(exp) => poly * T::TWO.powi(exp),
        None if x > T::ZERO => T::infinity(),
        None => T::ZERO,
    }
}

/// Approximate log2(x) for positive x.  The mantissa is normalized into
/// [1, 2) and the remainder is evaluated with the atanh series
/// log(y) = 2 * atanh((y - 1) / (y + 1)).
pub fn log2_approx<T: Float>(x: T) -> T {
    if x.is_nan() || x < T::ZERO {
        return T::nan();
    }
    if x == T::ZERO {
        return T::neg_infinity();
    }
    if x.is_infinite() {
        return x;
    }
    let mut y = x;
    let mut exponent = T::ZERO;
    while y >= T::TWO {
        y = y * T::ONE_HALF;
        exponent = exponent + T::ONE;
    }
    while y < T::ONE {
        y = y * T::TWO;
        exponent = exponent - T::ONE;
    }
    let s = (y - T::ONE) / (y + T::ONE);
    let s2 = s * s;
    let mut series = T::ZERO;
    for k in [11u16, 9, 7, 5, 3] {
        series = s2 * (T::ONE / T::from_u16(k) + series);
    }
    let ln_y = T::TWO * s * (T::ONE + series);
    exponent + ln_y / T::LN_2
}

/// Approximate x^e for positive x
pub fn pow_approx<T: Float>(x: T, e: T) -> T {
    exp2_approx(e * log2_approx(x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exp2_approx_relative_error() {
        let numsteps = 2000;
        for i in 0..=numsteps {
            let x = 20.0 * (i as f64) / (numsteps as f64) - 10.0;
            let approx = exp2_approx(x);
            let exact = x.exp2();
            assert!(((approx - exact) / exact).abs() < 1e-6);
        }
    }
    #[test]
    fn log2_approx_absolute_error() {
        let numsteps = 2000;
        for i in 1..=numsteps {
            let x = 0.0009766 + 1000.0 * (i as f64) / (numsteps as f64);
            let approx = log2_approx(x);
            let exact = x.log2();
            assert!((approx - exact).abs() < 1e-5);
        }
    }
    #[test]
    fn log2_approx_domain_edges() {
        assert!(log2_approx(-1f32).is_nan());
        assert_eq!(log2_approx(0f32), f32::NEG_INFINITY);
        assert_eq!(log2_approx(f32::INFINITY), f32::INFINITY);
        assert_eq!(log2_approx(1f32), 0f32);
    }
    #[test]
    fn pow_approx_shapes() {
        for i in 1..=100 {
            let x = i as f64 / 100.0;
            for e in [0.5, 1.0, 2.0, 4.0] {
                assert!((pow_approx(x, e) - x.powf(e)).abs() < 1e-5);
            }
        }
    }
}
