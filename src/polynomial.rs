//! Univariate polynomial arithmetic over a prime field $\mathbb{F}_p$.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::util::{modinv, one, zero};

/// A polynomial in $\mathbb{F}_p[x]$.
///
/// Coefficients are stored in little-endian order (lowest degree first) and
/// are always canonical in $[0, p)$. The representation is trimmed after
/// every operation: the zero polynomial is a single zero coefficient, and any
/// other polynomial has a nonzero top coefficient. Values are immutable from
/// the caller's perspective; every operator returns a fresh instance.
///
/// The modulus is borrowed, and both operands of a binary operation must
/// share it. Mixing moduli is a programmer error and asserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polynomial<'a> {
    coeffs: Vec<BigUint>,
    modulus: &'a BigUint,
}

impl<'a> Polynomial<'a> {
    /// Constructs a new polynomial given the modulus and some coefficients in
    /// little-endian order. Every coefficient is reduced mod $p$ and trailing
    /// zeros are trimmed.
    pub fn new(modulus: &'a BigUint, coeffs: &[BigUint]) -> Self {
        let coeffs = if coeffs.is_empty() {
            vec![zero()]
        } else {
            coeffs.iter().map(|int| int % modulus).collect()
        };
        let mut tmp = Polynomial { coeffs, modulus };
        tmp.normalize();
        tmp
    }

    /// The zero polynomial.
    pub fn zero(modulus: &'a BigUint) -> Self {
        Polynomial {
            coeffs: vec![zero()],
            modulus,
        }
    }

    /// The constant polynomial $1$.
    pub fn one(modulus: &'a BigUint) -> Self {
        Polynomial {
            coeffs: vec![one()],
            modulus,
        }
    }

    /// The monomial $x$.
    pub fn x(modulus: &'a BigUint) -> Self {
        Polynomial {
            coeffs: vec![zero(), one()],
            modulus,
        }
    }

    pub fn modulus(&self) -> &'a BigUint {
        self.modulus
    }

    /// Ensures there is at least one coefficient, and that unless this is the
    /// zero polynomial the leading term is nonzero.
    fn normalize(&mut self) {
        let mut trim = 0;
        for coeff in self.coeffs.iter().rev() {
            if coeff.is_zero() {
                trim += 1;
            } else {
                break;
            }
        }
        let newlen = self.coeffs.len() - trim;
        self.coeffs.truncate(std::cmp::max(1, newlen));
    }

    /// Returns the degree of this polynomial. The zero polynomial reports
    /// degree $0$; use [`Polynomial::is_zero`] to tell the two apart.
    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// Returns true iff this is a constant polynomial (i.e. of degree $0$).
    pub fn is_constant(&self) -> bool {
        self.coeffs.len() == 1
    }

    /// Returns true iff this is the zero polynomial.
    pub fn is_zero(&self) -> bool {
        self.is_constant() && self.coeffs[0].is_zero()
    }

    /// Returns true iff this is the constant polynomial $1$.
    pub fn is_one(&self) -> bool {
        self.is_constant() && self.coeffs[0].is_one()
    }

    /// Returns the highest-degree coefficient.
    pub fn leading_coeff(&self) -> &BigUint {
        self.coeffs.last().expect("representation is never empty")
    }

    /// Returns the coefficient of $x^i$, or $0$ when $i$ exceeds the degree.
    pub fn coeff(&self, i: usize) -> BigUint {
        self.coeffs.get(i).cloned().unwrap_or_else(zero)
    }

    /// Sets the coefficient of $x^i$ to `v` reduced mod $p$, growing the
    /// representation as needed.
    pub fn set_coeff(&mut self, i: usize, v: &BigUint) {
        if i >= self.coeffs.len() {
            self.coeffs.resize(i + 1, zero());
        }
        self.coeffs[i] = v % self.modulus;
        self.normalize();
    }

    /// Evaluates this polynomial at `point` by Horner's rule.
    pub fn eval(&self, point: &BigUint) -> BigUint {
        let point = &(point % self.modulus);
        let mut acc = zero();
        for coeff in self.coeffs.iter().rev() {
            acc = (acc * point + coeff) % self.modulus;
        }
        acc
    }

    /// Adds another polynomial to this one, coefficient-wise in
    /// $\mathbb{F}_p$.
    pub fn add(&self, other: &Self) -> Self {
        assert_eq!(self.modulus, other.modulus, "operands share one modulus");
        let (longer, shorter) = if self.coeffs.len() >= other.coeffs.len() {
            (self, other)
        } else {
            (other, self)
        };

        let mut result = longer.coeffs.clone();
        for (result, coeff) in result.iter_mut().zip(shorter.coeffs.iter()) {
            *result = (&*result + coeff) % self.modulus;
        }

        let mut tmp = Polynomial {
            coeffs: result,
            modulus: self.modulus,
        };
        tmp.normalize();
        tmp
    }

    /// Subtracts another polynomial from this one.
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Negates this polynomial.
    pub fn neg(&self) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .map(|coeff| (self.modulus - coeff) % self.modulus)
            .collect();
        // The leading term cannot become zero if it was not zero before.
        Polynomial {
            coeffs,
            modulus: self.modulus,
        }
    }

    /// Multiplies this polynomial by another using schoolbook convolution.
    pub fn mul(&self, other: &Self) -> Self {
        assert_eq!(self.modulus, other.modulus, "operands share one modulus");
        if self.is_zero() || other.is_zero() {
            return Self::zero(self.modulus);
        }
        let mut result = vec![zero(); self.degree() + other.degree() + 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coeffs.iter().enumerate() {
                result[i + j] = (&result[i + j] + a * b) % self.modulus;
            }
        }
        let mut tmp = Polynomial {
            coeffs: result,
            modulus: self.modulus,
        };
        tmp.normalize();
        tmp
    }

    /// Multiplies every coefficient by `k` mod $p$.
    pub fn scale(&self, k: &BigUint) -> Self {
        let k = &(k % self.modulus);
        let coeffs = self
            .coeffs
            .iter()
            .map(|coeff| (coeff * k) % self.modulus)
            .collect();
        let mut tmp = Polynomial {
            coeffs,
            modulus: self.modulus,
        };
        tmp.normalize();
        tmp
    }

    /// Euclidean division, returning `(quotient, remainder)` with
    /// `self = quotient * divisor + remainder` and either a zero remainder or
    /// `deg(remainder) < deg(divisor)`.
    ///
    /// Dividing by the zero polynomial returns `(0, self)`.
    pub fn div_mod(&self, divisor: &Self) -> (Self, Self) {
        assert_eq!(self.modulus, divisor.modulus, "operands share one modulus");
        if divisor.is_zero() || self.is_zero() || self.degree() < divisor.degree() {
            return (Self::zero(self.modulus), self.clone());
        }

        let modulus = self.modulus;
        // The divisor is monicized up front; for prime p the leading
        // coefficient of a nonzero polynomial is always invertible.
        let inv = modinv(divisor.leading_coeff(), modulus)
            .expect("leading coefficient is invertible modulo a prime");
        let mut remainder = self.clone();
        let mut quotient = vec![zero(); self.degree() - divisor.degree() + 1];

        while !remainder.is_zero() && remainder.degree() >= divisor.degree() {
            let power = remainder.degree() - divisor.degree();
            let q = (remainder.leading_coeff() * &inv) % modulus;
            for (divisor_coeff, remainder_coeff) in divisor
                .coeffs
                .iter()
                .zip(remainder.coeffs.iter_mut().skip(power))
            {
                let tmp = (&q * divisor_coeff) % modulus;
                let tmp = (modulus - tmp) % modulus;
                *remainder_coeff = (&*remainder_coeff + tmp) % modulus;
            }
            quotient[power] = q;
            remainder.normalize();
        }

        let mut quotient = Polynomial {
            coeffs: quotient,
            modulus,
        };
        quotient.normalize();

        (quotient, remainder)
    }

    /// Divides by a known factor, panicking if the division leaves a
    /// remainder. Misuse is a programmer error.
    pub fn div_exact(&self, divisor: &Self) -> Self {
        let (quotient, remainder) = self.div_mod(divisor);
        assert!(remainder.is_zero(), "divisor is not a factor");
        quotient
    }

    /// Computes `self` raised to the `n`th power in the quotient ring
    /// $\mathbb{F}_p[x]/(h)$ by square-and-multiply, reducing mod `h` after
    /// every step. `n = 0` yields the constant $1$.
    pub fn pow_mod(&self, n: &BigUint, h: &Self) -> Self {
        assert_eq!(self.modulus, h.modulus, "operands share one modulus");
        let mut acc = Self::one(self.modulus);
        if n.is_zero() {
            return acc;
        }
        let base = self.div_mod(h).1;
        for i in (0..n.bits()).rev() {
            acc = acc.mul(&acc).div_mod(h).1;
            if n.bit(i) {
                acc = acc.mul(&base).div_mod(h).1;
            }
        }
        acc
    }

    /// Computes the monic greatest common divisor of `self` and `other` by
    /// the Euclidean algorithm. `gcd(0, 0)` is $0$.
    pub fn gcd(&self, other: &Self) -> Self {
        assert_eq!(self.modulus, other.modulus, "operands share one modulus");
        let mut a = self.clone();
        let mut b = other.clone();
        while !b.is_zero() {
            let (_, r) = a.div_mod(&b);
            a = std::mem::replace(&mut b, r);
        }
        a.monic()
    }

    /// The extended Euclidean algorithm: returns `(g, u, v)` with
    /// `u * self + v * other = g` and `g` the monic gcd.
    pub fn ext_gcd(&self, other: &Self) -> (Self, Self, Self) {
        assert_eq!(self.modulus, other.modulus, "operands share one modulus");
        let mut r0 = self.clone();
        let mut r1 = other.clone();
        let mut u0 = Self::one(self.modulus);
        let mut u1 = Self::zero(self.modulus);
        let mut v0 = Self::zero(self.modulus);
        let mut v1 = Self::one(self.modulus);

        while !r1.is_zero() {
            let (q, r) = r0.div_mod(&r1);
            r0 = std::mem::replace(&mut r1, r);
            let u = u0.sub(&q.mul(&u1));
            u0 = std::mem::replace(&mut u1, u);
            let v = v0.sub(&q.mul(&v1));
            v0 = std::mem::replace(&mut v1, v);
        }

        if r0.is_zero() {
            return (r0, u0, v0);
        }
        let inv = modinv(r0.leading_coeff(), self.modulus)
            .expect("leading coefficient is invertible modulo a prime");
        (r0.scale(&inv), u0.scale(&inv), v0.scale(&inv))
    }

    /// Computes the inverse of `self` in $\mathbb{F}_p[x]/(h)$.
    ///
    /// When `gcd(self, h)` is not a unit there is no inverse; the monic
    /// non-unit gcd is returned instead, which is exactly the factor of `h`
    /// the trace computation's zero-splitter wants.
    pub fn inv_mod(&self, h: &Self) -> Result<Self, Self> {
        let (g, u, _) = self.ext_gcd(h);
        if g.is_one() {
            Ok(u.div_mod(h).1)
        } else {
            Err(g)
        }
    }

    /// Returns the monic associate of this polynomial (zero stays zero).
    pub fn monic(&self) -> Self {
        if self.is_zero() {
            return self.clone();
        }
        let inv = modinv(self.leading_coeff(), self.modulus)
            .expect("leading coefficient is invertible modulo a prime");
        self.scale(&inv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::num;

    fn poly<'a>(p: &'a BigUint, coeffs: &[u32]) -> Polynomial<'a> {
        let coeffs: Vec<BigUint> = coeffs.iter().map(|&c| num(c)).collect();
        Polynomial::new(p, &coeffs)
    }

    #[test]
    fn new_trims_and_reduces() {
        let p = num(7);
        let f = poly(&p, &[9, 8, 7, 0, 0]);
        assert_eq!(f.degree(), 1);
        assert_eq!(f.coeff(0), num(2));
        assert_eq!(f.coeff(1), num(1));
        assert_eq!(f.coeff(2), num(0));
        assert_eq!(f.coeff(100), num(0));
    }

    #[test]
    fn zero_polynomial_queries() {
        let p = num(7);
        let z = Polynomial::zero(&p);
        assert!(z.is_zero());
        assert!(z.is_constant());
        assert_eq!(z.degree(), 0);
        assert_eq!(poly(&p, &[7, 14, 21]), z);
    }

    #[test]
    fn set_coeff_grows_and_reduces() {
        let p = num(11);
        let mut f = Polynomial::one(&p);
        f.set_coeff(3, &num(13));
        assert_eq!(f.degree(), 3);
        assert_eq!(f.coeff(3), num(2));
        f.set_coeff(3, &num(0));
        assert_eq!(f.degree(), 0);
        assert!(f.is_one());
    }

    #[test]
    fn add_sub_roundtrip() {
        let p = num(101);
        let f = poly(&p, &[3, 0, 5, 9]);
        let g = poly(&p, &[100, 7]);
        assert_eq!(f.add(&g).sub(&g), f);
        assert_eq!(f.sub(&f), Polynomial::zero(&p));
        assert_eq!(f.add(&g), g.add(&f));
    }

    #[test]
    fn mul_is_commutative_and_absorbs_zero() {
        let p = num(97);
        let f = poly(&p, &[1, 2, 3]);
        let g = poly(&p, &[4, 0, 0, 5]);
        assert_eq!(f.mul(&g), g.mul(&f));
        assert_eq!(f.mul(&g).degree(), 5);
        let z = Polynomial::zero(&p);
        assert_eq!(f.mul(&z), z);
        assert_eq!(z.mul(&f), z);
    }

    #[test]
    fn mul_distributes_over_add() {
        let p = num(23);
        let f = poly(&p, &[5, 1, 9]);
        let g = poly(&p, &[2, 2]);
        let h = poly(&p, &[7, 0, 0, 3]);
        assert_eq!(f.mul(&g.add(&h)), f.mul(&g).add(&f.mul(&h)));
    }

    #[test]
    fn div_mod_concrete() {
        // (x^3 + 2x + 5) = x * (x^2 + 1) + (x + 5) over F_101
        let p = num(101);
        let f = poly(&p, &[5, 2, 0, 1]);
        let h = poly(&p, &[1, 0, 1]);
        let (q, r) = f.div_mod(&h);
        assert_eq!(q, poly(&p, &[0, 1]));
        assert_eq!(r, poly(&p, &[5, 1]));
    }

    #[test]
    fn div_mod_reconstructs_dividend() {
        let p = num(101);
        let f = poly(&p, &[17, 3, 99, 4, 0, 56, 1]);
        let h = poly(&p, &[3, 5, 7]);
        let (q, r) = f.div_mod(&h);
        assert!(r.is_zero() || r.degree() < h.degree());
        assert_eq!(q.mul(&h).add(&r), f);
    }

    #[test]
    fn div_mod_nonmonic_divisor() {
        let p = num(13);
        let f = poly(&p, &[1, 0, 0, 0, 1]);
        let h = poly(&p, &[2, 0, 5]);
        let (q, r) = f.div_mod(&h);
        assert_eq!(q.mul(&h).add(&r), f);
        assert!(r.degree() < h.degree());
    }

    #[test]
    fn div_mod_by_zero_returns_self() {
        let p = num(13);
        let f = poly(&p, &[1, 2, 3]);
        let (q, r) = f.div_mod(&Polynomial::zero(&p));
        assert!(q.is_zero());
        assert_eq!(r, f);
    }

    #[test]
    fn pow_mod_matches_repeated_multiplication() {
        let p = num(17);
        let h = poly(&p, &[3, 1, 0, 2, 1]);
        let f = poly(&p, &[2, 5, 1]);
        let mut expected = Polynomial::one(&p);
        for _ in 0..9 {
            expected = expected.mul(&f).div_mod(&h).1;
        }
        assert_eq!(f.pow_mod(&num(9), &h), expected);
        assert!(f.pow_mod(&num(0), &h).is_one());
    }

    #[test]
    fn gcd_is_monic() {
        let p = num(11);
        // (x + 1)(x + 2) and (x + 1)(x + 3), scaled by units
        let a = poly(&p, &[2, 3, 1]).scale(&num(7));
        let b = poly(&p, &[3, 4, 1]).scale(&num(5));
        assert_eq!(a.gcd(&b), poly(&p, &[1, 1]));
        let z = Polynomial::zero(&p);
        assert!(z.gcd(&z).is_zero());
        assert_eq!(z.gcd(&a), a.monic());
    }

    #[test]
    fn ext_gcd_identity() {
        let p = num(101);
        let a = poly(&p, &[5, 0, 3, 1]);
        let b = poly(&p, &[7, 2, 1]);
        let (g, u, v) = a.ext_gcd(&b);
        assert_eq!(u.mul(&a).add(&v.mul(&b)), g);
        assert!(a.div_mod(&g).1.is_zero());
        assert!(b.div_mod(&g).1.is_zero());
    }

    #[test]
    fn inv_mod_inverts_units() {
        let p = num(19);
        let h = poly(&p, &[1, 0, 1]);
        let f = poly(&p, &[2, 1]);
        let inv = f.inv_mod(&h).unwrap();
        assert!(f.mul(&inv).div_mod(&h).1.is_one());
    }

    #[test]
    fn inv_mod_surfaces_common_factor() {
        let p = num(19);
        // h = (x + 1)(x + 2), f = (x + 1)(x + 4): gcd is x + 1
        let h = poly(&p, &[2, 3, 1]);
        let f = poly(&p, &[4, 5, 1]);
        let g = f.inv_mod(&h).unwrap_err();
        assert_eq!(g, poly(&p, &[1, 1]));
    }

    #[test]
    fn eval_by_horner() {
        let p = num(97);
        let f = poly(&p, &[93, 36, 12, 0, 3]);
        // 3*16 + 12*4 + 36*2 + 93 = 261 = 2*97 + 67
        assert_eq!(f.eval(&num(2)), num(67));
    }

    #[test]
    #[should_panic(expected = "operands share one modulus")]
    fn mixing_moduli_is_a_programmer_error() {
        let p = num(7);
        let q = num(11);
        let f = poly(&p, &[1, 1]);
        let g = poly(&q, &[1, 1]);
        let _ = f.add(&g);
    }

    #[test]
    #[should_panic(expected = "divisor is not a factor")]
    fn div_exact_rejects_nonfactor() {
        let p = num(7);
        let f = poly(&p, &[1, 0, 1]);
        let g = poly(&p, &[1, 1]);
        let _ = f.div_exact(&g);
    }
}
