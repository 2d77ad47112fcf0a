//! Complex number type used throughout the expression engine.
//!
//! `Complex` is a plain immutable value type: every operation returns a new
//! instance. A `Complex` with a zero imaginary part is *not* collapsed into a
//! plain real number; the two representations are only unified by the
//! dispatch layer in [`crate::numeric`].
//!
//! All operations are total over the `f64` domain. Division by a
//! zero-magnitude value produces IEEE infinities/NaNs which are propagated,
//! never trapped.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A complex number as a real/imaginary pair of `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    /// The imaginary unit.
    pub const I: Complex = Complex { re: 0.0, im: 1.0 };

    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Embeds a real number on the real axis.
    pub fn from_real(re: f64) -> Self {
        Self { re, im: 0.0 }
    }

    /// Embeds a real number on the imaginary axis.
    pub fn from_imag(im: f64) -> Self {
        Self { re: 0.0, im }
    }

    /// Complex conjugate.
    pub fn conj(self) -> Self {
        Self::new(self.re, -self.im)
    }

    /// Squared magnitude, `re² + im²`.
    pub fn abs2(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    /// Magnitude, `√(re² + im²)`.
    pub fn abs(self) -> f64 {
        self.abs2().sqrt()
    }

    /// Principal argument in `(−π, π]`.
    ///
    /// Computed with a quadrant-aware arctangent: a value on the imaginary
    /// axis maps to `±π/2` by the sign of `im` (with `im == 0` treated as
    /// positive), otherwise `atan(im/re)` shifted by `±π` in the left
    /// half-plane.
    pub fn arg(self) -> f64 {
        use std::f64::consts::PI;
        if self.re == 0.0 {
            if self.im >= 0.0 {
                PI / 2.0
            } else {
                -PI / 2.0
            }
        } else {
            let val = (self.im / self.re).atan();
            if self.re < 0.0 {
                if self.im >= 0.0 {
                    PI + val
                } else {
                    -PI + val
                }
            } else {
                val
            }
        }
    }

    /// Complex exponential, `e^re (cos im + i sin im)`.
    pub fn exp(self) -> Self {
        Self::new(
            self.re.exp() * self.im.cos(),
            self.re.exp() * self.im.sin(),
        )
    }

    /// Principal natural logarithm, `ln|z| + i arg(z)`.
    pub fn log(self) -> Self {
        Self::new(self.abs().ln(), self.arg())
    }

    /// `cos z = (e^{iz} + e^{−iz}) / 2`
    pub fn cos(self) -> Self {
        let e_pos = (Self::I * self).exp();
        let e_neg = (-Self::I * self).exp();
        Self::from_real(0.5) * (e_pos + e_neg)
    }

    /// `sin z = −i (e^{iz} − e^{−iz}) / 2`
    pub fn sin(self) -> Self {
        let e_pos = (Self::I * self).exp();
        let e_neg = (-Self::I * self).exp();
        Self::from_imag(-0.5) * (e_pos - e_neg)
    }

    pub fn tan(self) -> Self {
        self.sin() / self.cos()
    }

    /// `cosh z = (e^z + e^{−z}) / 2`
    pub fn cosh(self) -> Self {
        Self::from_real(0.5) * (self.exp() + (-self).exp())
    }

    /// `sinh z = (e^z − e^{−z}) / 2`
    pub fn sinh(self) -> Self {
        Self::from_real(0.5) * (self.exp() - (-self).exp())
    }

    pub fn tanh(self) -> Self {
        self.sinh() / self.cosh()
    }
}

impl Add for Complex {
    type Output = Complex;

    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Complex;

    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Complex;

    fn mul(self, rhs: Complex) -> Complex {
        Complex::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Div for Complex {
    type Output = Complex;

    /// Multiplies by the conjugate over the squared magnitude. A
    /// zero-magnitude divisor yields non-finite components.
    fn div(self, rhs: Complex) -> Complex {
        let inv = Complex::from_real(1.0 / rhs.abs2()) * rhs.conj();
        self * inv
    }
}

impl Neg for Complex {
    type Output = Complex;

    fn neg(self) -> Complex {
        Complex::new(-self.re, -self.im)
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im < 0.0 {
            write!(f, "{}-{}i", self.re, -self.im)
        } else {
            write!(f, "{}+{}i", self.re, self.im)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_arg_quadrants() {
        assert!(close(Complex::new(1.0, 1.0).arg(), PI / 4.0));
        assert!(close(Complex::new(-1.0, 1.0).arg(), 3.0 * PI / 4.0));
        assert!(close(Complex::new(-1.0, -1.0).arg(), -3.0 * PI / 4.0));
        assert!(close(Complex::new(1.0, -1.0).arg(), -PI / 4.0));

        // On the axes: ±π/2 on the imaginary axis, π on the negative real axis.
        assert!(close(Complex::new(0.0, 2.0).arg(), PI / 2.0));
        assert!(close(Complex::new(0.0, -2.0).arg(), -PI / 2.0));
        assert!(close(Complex::new(-1.0, 0.0).arg(), PI));
        assert!(close(Complex::new(1.0, 0.0).arg(), 0.0));
    }

    #[test]
    fn test_magnitude_and_conjugate() {
        let z = Complex::new(3.0, 4.0);
        assert!(close(z.abs2(), 25.0));
        assert!(close(z.abs(), 5.0));
        assert_eq!(z.conj(), Complex::new(3.0, -4.0));
    }

    #[test]
    fn test_mul_div_roundtrip() {
        let z = Complex::new(2.0, -1.0);
        let w = Complex::new(-0.5, 3.0);
        let back = (z * w) / w;
        assert!(close(back.re, z.re));
        assert!(close(back.im, z.im));
    }

    #[test]
    fn test_exp_of_i_pi() {
        // Euler: e^{iπ} = −1
        let z = (Complex::I * Complex::from_real(PI)).exp();
        assert!(close(z.re, -1.0));
        assert!(close(z.im, 0.0));
    }

    #[test]
    fn test_log_of_negative_real() {
        let z = Complex::new(-1.0, 0.0).log();
        assert!(close(z.re, 0.0));
        assert!(close(z.im, PI));
    }

    #[test]
    fn test_trig_matches_real_axis() {
        // On the real axis the exp-identity formulas must agree with f64.
        let z = Complex::from_real(0.7);
        assert!(close(z.cos().re, 0.7f64.cos()));
        assert!(close(z.sin().re, 0.7f64.sin()));
        assert!(close(z.cosh().re, 0.7f64.cosh()));
        assert!(close(z.sinh().re, 0.7f64.sinh()));
        assert!(close(z.tan().re, 0.7f64.tan()));
        assert!(close(z.tanh().re, 0.7f64.tanh()));
    }
}
