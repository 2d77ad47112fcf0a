//! Polymorphic numeric values: plain reals unified with complex numbers.
//!
//! Every arithmetic entry point of the engine dispatches on [`Numeric`], the
//! tagged union of a plain `f64` and a [`Complex`] value. The promotion rule
//! is fixed:
//!
//! - real ⊕ real → real (native `f64` arithmetic, fast path)
//! - any operand complex → complex (the real operand is promoted via
//!   `Real(r) → Complex(r, 0)`)
//!
//! Two deliberate exceptions: [`Numeric::abs`] returns the magnitude as a
//! real for complex input, and [`Numeric::step`] always returns a real,
//! judging only the real part.
//!
//! Exponentiation takes the real fast path only for strictly positive real
//! bases. Everything else (`0^0` included) routes through
//! `exp(log(z) · w)`, so a negative base with a fractional exponent yields a
//! complex result on the principal branch rather than NaN.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::complex::Complex;

/// A value that is either a plain real or a complex number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Real(f64),
    Complex(Complex),
}

impl Numeric {
    /// Real part of the value.
    pub fn re(self) -> f64 {
        match self {
            Numeric::Real(x) => x,
            Numeric::Complex(z) => z.re,
        }
    }

    /// Imaginary part (zero for reals).
    pub fn im(self) -> f64 {
        match self {
            Numeric::Real(_) => 0.0,
            Numeric::Complex(z) => z.im,
        }
    }

    /// Widens the value to a `Complex`, placing reals on the real axis.
    pub fn promote(self) -> Complex {
        match self {
            Numeric::Real(x) => Complex::from_real(x),
            Numeric::Complex(z) => z,
        }
    }

    /// Exponentiation with the branch-cut convention of the complex log.
    ///
    /// Real bases greater than zero use `f64::powf` and keep the operand
    /// variant. Any other case is computed as `exp(log(z) · w)`, so
    /// `(-1)^0.5` comes back as `≈ i` instead of NaN, and `0^0` inherits
    /// the non-finite result of `log(0)`.
    pub fn pow(self, rhs: Numeric) -> Numeric {
        match (self, rhs) {
            (Numeric::Real(a), Numeric::Real(b)) if a > 0.0 => Numeric::Real(a.powf(b)),
            (a, b) => {
                let z = a.promote();
                let w = b.promote();
                if z.im == 0.0 && w.im == 0.0 && z.re > 0.0 {
                    Numeric::Complex(Complex::from_real(z.re.powf(w.re)))
                } else {
                    Numeric::Complex((z.log() * w).exp())
                }
            }
        }
    }

    pub fn exp(self) -> Numeric {
        match self {
            Numeric::Real(x) => Numeric::Real(x.exp()),
            Numeric::Complex(z) => Numeric::Complex(z.exp()),
        }
    }

    /// Natural logarithm. A negative real stays on the real branch and
    /// yields NaN; only complex input uses the principal complex log.
    pub fn log(self) -> Numeric {
        match self {
            Numeric::Real(x) => Numeric::Real(x.ln()),
            Numeric::Complex(z) => Numeric::Complex(z.log()),
        }
    }

    pub fn sin(self) -> Numeric {
        match self {
            Numeric::Real(x) => Numeric::Real(x.sin()),
            Numeric::Complex(z) => Numeric::Complex(z.sin()),
        }
    }

    pub fn cos(self) -> Numeric {
        match self {
            Numeric::Real(x) => Numeric::Real(x.cos()),
            Numeric::Complex(z) => Numeric::Complex(z.cos()),
        }
    }

    pub fn tan(self) -> Numeric {
        match self {
            Numeric::Real(x) => Numeric::Real(x.tan()),
            Numeric::Complex(z) => Numeric::Complex(z.tan()),
        }
    }

    pub fn sinh(self) -> Numeric {
        match self {
            Numeric::Real(x) => Numeric::Real(x.sinh()),
            Numeric::Complex(z) => Numeric::Complex(z.sinh()),
        }
    }

    pub fn cosh(self) -> Numeric {
        match self {
            Numeric::Real(x) => Numeric::Real(x.cosh()),
            Numeric::Complex(z) => Numeric::Complex(z.cosh()),
        }
    }

    pub fn tanh(self) -> Numeric {
        match self {
            Numeric::Real(x) => Numeric::Real(x.tanh()),
            Numeric::Complex(z) => Numeric::Complex(z.tanh()),
        }
    }

    /// Magnitude. Always real, also for complex input.
    pub fn abs(self) -> Numeric {
        match self {
            Numeric::Real(x) => Numeric::Real(x.abs()),
            Numeric::Complex(z) => Numeric::Real(z.abs()),
        }
    }

    /// Unit step on the real part: `1.0` when `re ≥ 0`, else `0.0`. The
    /// imaginary part is ignored and the result is always real.
    pub fn step(self) -> Numeric {
        if self.re() >= 0.0 {
            Numeric::Real(1.0)
        } else {
            Numeric::Real(0.0)
        }
    }
}

impl Add for Numeric {
    type Output = Numeric;

    fn add(self, rhs: Numeric) -> Numeric {
        match (self, rhs) {
            (Numeric::Real(a), Numeric::Real(b)) => Numeric::Real(a + b),
            (a, b) => Numeric::Complex(a.promote() + b.promote()),
        }
    }
}

impl Sub for Numeric {
    type Output = Numeric;

    fn sub(self, rhs: Numeric) -> Numeric {
        match (self, rhs) {
            (Numeric::Real(a), Numeric::Real(b)) => Numeric::Real(a - b),
            (a, b) => Numeric::Complex(a.promote() - b.promote()),
        }
    }
}

impl Mul for Numeric {
    type Output = Numeric;

    fn mul(self, rhs: Numeric) -> Numeric {
        match (self, rhs) {
            (Numeric::Real(a), Numeric::Real(b)) => Numeric::Real(a * b),
            (a, b) => Numeric::Complex(a.promote() * b.promote()),
        }
    }
}

impl Div for Numeric {
    type Output = Numeric;

    fn div(self, rhs: Numeric) -> Numeric {
        match (self, rhs) {
            (Numeric::Real(a), Numeric::Real(b)) => Numeric::Real(a / b),
            (a, b) => Numeric::Complex(a.promote() / b.promote()),
        }
    }
}

impl Neg for Numeric {
    type Output = Numeric;

    fn neg(self) -> Numeric {
        match self {
            Numeric::Real(x) => Numeric::Real(-x),
            Numeric::Complex(z) => Numeric::Complex(-z),
        }
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Real(value)
    }
}

impl From<Complex> for Numeric {
    fn from(value: Complex) -> Self {
        Numeric::Complex(value)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Real(x) => write!(f, "{x}"),
            Numeric::Complex(z) => write!(f, "{z}"),
        }
    }
}
