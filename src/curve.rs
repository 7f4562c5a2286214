//! Short Weierstrass curves $E(\mathbb{F}_p) : y^2 = x^3 + ax + b$ and their
//! affine point group.
//!
//! The point arithmetic here is the plain chord-and-tangent kind. It is not
//! used by the point-counting core itself; it exists so callers (and the
//! tests) can cross-check a computed group order by multiplying points by it.

use num_bigint::{BigInt, BigUint};
use num_traits::Zero;

use crate::polynomial::Polynomial;
use crate::util::{canonical_mod, is_probably_prime, mod_sqrt, modinv, num, one, zero};
use crate::Error;

/// An elliptic curve $y^2 = x^3 + ax + b$ over $\mathbb{F}_p$ with $a$ and
/// $b$ held in canonical form.
///
/// Construction validates the field (odd prime $p > 3$) and rejects singular
/// curves, so every value of this type is a genuine elliptic curve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EllipticCurve {
    a: BigUint,
    b: BigUint,
    p: BigUint,
}

/// A point of $E(\mathbb{F}_p)$ in affine coordinates, with the point at
/// infinity as the group's neutral element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Point {
    Infinity,
    Affine { x: BigUint, y: BigUint },
}

impl Point {
    pub fn affine(x: BigUint, y: BigUint) -> Self {
        Point::Affine { x, y }
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self, Point::Infinity)
    }
}

impl EllipticCurve {
    /// Builds the curve $y^2 = x^3 + ax + b$ over $\mathbb{F}_p$, reducing
    /// `a` and `b` mod `p`.
    ///
    /// Fails with [`Error::InvalidPrime`] when `p` is not a (probable) prime,
    /// [`Error::DomainError`] when `p <= 3`, and [`Error::SingularCurve`]
    /// when $4a^3 + 27b^2 = 0$ over the field.
    pub fn new(a: &BigInt, b: &BigInt, p: &BigInt) -> Result<Self, Error> {
        let p = p
            .to_biguint()
            .ok_or_else(|| Error::DomainError(format!("field modulus {} is negative", p)))?;
        if !is_probably_prime(&p) {
            return Err(Error::InvalidPrime(p));
        }
        if p <= num(3) {
            return Err(Error::DomainError(format!(
                "fields of characteristic {} are not supported",
                p
            )));
        }

        let curve = EllipticCurve {
            a: canonical_mod(a, &p),
            b: canonical_mod(b, &p),
            p,
        };
        if curve.discriminant_is_zero() {
            return Err(Error::SingularCurve(curve.p));
        }
        Ok(curve)
    }

    pub fn a(&self) -> &BigUint {
        &self.a
    }

    pub fn b(&self) -> &BigUint {
        &self.b
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// True iff $4a^3 + 27b^2 = 0$ (mod $p$), i.e. the cubic has a repeated
    /// root and the "curve" crosses or cusps.
    fn discriminant_is_zero(&self) -> bool {
        let a_cubed = self.a.modpow(&num(3), &self.p);
        let b_squared = self.b.modpow(&num(2), &self.p);
        ((num(4) * a_cubed + num(27) * b_squared) % &self.p).is_zero()
    }

    /// The Weierstrass cubic $f(x) = x^3 + ax + b$ as a polynomial over
    /// $\mathbb{F}_p$.
    pub fn weierstrass_poly(&self) -> Polynomial<'_> {
        Polynomial::new(
            &self.p,
            &[self.b.clone(), self.a.clone(), zero(), one()],
        )
    }

    /// Evaluates $x^3 + ax + b$ at `x`.
    pub fn rhs(&self, x: &BigUint) -> BigUint {
        let x = x % &self.p;
        (x.modpow(&num(3), &self.p) + &self.a * &x + &self.b) % &self.p
    }

    /// True iff `point` satisfies the curve equation (the point at infinity
    /// always does).
    pub fn contains(&self, point: &Point) -> bool {
        match point {
            Point::Infinity => true,
            Point::Affine { x, y } => {
                let y = y % &self.p;
                (&y * &y) % &self.p == self.rhs(x)
            }
        }
    }

    /// Recovers a point $(x, y)$ on the curve from its $x$-coordinate, or
    /// `None` when $x^3 + ax + b$ is a non-residue.
    pub fn lift_x(&self, x: &BigUint) -> Option<Point> {
        let y = mod_sqrt(&self.rhs(x), &self.p)?;
        Some(Point::affine(x % &self.p, y))
    }

    /// Adds two points of the curve by the chord-and-tangent rule.
    ///
    /// Both points must lie on the curve; that is the caller's contract, and
    /// it guarantees every slope denominator below is invertible.
    pub fn add_points(&self, lhs: &Point, rhs: &Point) -> Point {
        let (x1, y1) = match lhs {
            Point::Infinity => return rhs.clone(),
            Point::Affine { x, y } => (x, y),
        };
        let (x2, y2) = match rhs {
            Point::Infinity => return lhs.clone(),
            Point::Affine { x, y } => (x, y),
        };

        let p = &self.p;
        if x1 == x2 && ((y1 + y2) % p).is_zero() {
            // Mirror points: the chord is vertical.
            return Point::Infinity;
        }

        let slope = if x1 == x2 {
            // Tangent: (3x^2 + a) / 2y
            let numerator = (num(3) * x1 * x1 + &self.a) % p;
            let denominator = (num(2) * y1) % p;
            let inv = modinv(&denominator, p).expect("tangent denominator is nonzero");
            (numerator * inv) % p
        } else {
            // Chord: (y2 - y1) / (x2 - x1)
            let numerator = (p + y2 - y1) % p;
            let denominator = (p + x2 - x1) % p;
            let inv = modinv(&denominator, p).expect("chord denominator is nonzero");
            (numerator * inv) % p
        };

        let x3 = (&slope * &slope + (p - x1) + (p - x2)) % p;
        let y3 = (slope * ((p + x1 - &x3) % p) + (p - y1)) % p;
        Point::affine(x3, y3)
    }

    /// Multiplies a point by a scalar with double-and-add.
    pub fn mul_point(&self, point: &Point, k: &BigUint) -> Point {
        let mut acc = Point::Infinity;
        if k.is_zero() {
            return acc;
        }
        for i in (0..k.bits()).rev() {
            acc = self.add_points(&acc, &acc);
            if k.bit(i) {
                acc = self.add_points(&acc, point);
            }
        }
        acc
    }

    /// Counts $\\#E(\mathbb{F}_p)$ by brute force: one pass over the field
    /// tallying square roots of $x^3 + ax + b$, plus the point at infinity.
    ///
    /// Only sensible for small fields; the tests use it as the oracle that
    /// Schoof's algorithm must agree with.
    pub fn naive_count(&self) -> BigUint {
        use std::collections::HashMap;

        let p = &self.p;
        let mut square_roots: HashMap<BigUint, u32> = HashMap::new();
        let mut y = zero();
        while &y < p {
            *square_roots.entry((&y * &y) % p).or_insert(0) += 1;
            y += 1u32;
        }

        let mut count = one();
        let mut x = zero();
        while &x < p {
            if let Some(n) = square_roots.get(&self.rhs(&x)) {
                count += *n;
            }
            x += 1u32;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(a: i64, b: i64, p: i64) -> EllipticCurve {
        EllipticCurve::new(&BigInt::from(a), &BigInt::from(b), &BigInt::from(p)).unwrap()
    }

    #[test]
    fn construction_reduces_parameters() {
        let e = curve(-1, 7689, 83);
        assert_eq!(*e.a(), num(82));
        assert_eq!(*e.b(), num(7689 % 83));
    }

    #[test]
    fn rejects_composite_modulus() {
        let err = EllipticCurve::new(&BigInt::from(1), &BigInt::from(1), &BigInt::from(91));
        assert!(matches!(err, Err(Error::InvalidPrime(_))));
    }

    #[test]
    fn rejects_tiny_characteristic() {
        let err = EllipticCurve::new(&BigInt::from(1), &BigInt::from(1), &BigInt::from(3));
        assert!(matches!(err, Err(Error::DomainError(_))));
    }

    #[test]
    fn rejects_singular_curve() {
        // 4a^3 + 27b^2 = 0 for (a, b) = (0, 0) and for (-3, 2).
        let err = EllipticCurve::new(&BigInt::from(0), &BigInt::from(0), &BigInt::from(17));
        assert!(matches!(err, Err(Error::SingularCurve(_))));
        let err = EllipticCurve::new(&BigInt::from(-3), &BigInt::from(2), &BigInt::from(17));
        assert!(matches!(err, Err(Error::SingularCurve(_))));
    }

    #[test]
    fn membership_and_lift() {
        let e = curve(2, 3, 97);
        let point = e.lift_x(&num(3)).unwrap();
        assert!(e.contains(&point));
        assert!(e.contains(&Point::Infinity));
        assert!(!e.contains(&Point::affine(num(1), num(1))));
    }

    #[test]
    fn addition_matches_group_axioms() {
        let e = curve(2, 3, 97);
        let p1 = e.lift_x(&num(3)).unwrap();
        let p2 = e.lift_x(&num(80)).unwrap();

        // Identity and inverses.
        assert_eq!(e.add_points(&p1, &Point::Infinity), p1);
        let minus_p1 = match &p1 {
            Point::Affine { x, y } => Point::affine(x.clone(), (num(97) - y) % num(97)),
            Point::Infinity => unreachable!(),
        };
        assert!(e.add_points(&p1, &minus_p1).is_infinity());

        // Commutativity, and closure of a few sums.
        let sum = e.add_points(&p1, &p2);
        assert_eq!(sum, e.add_points(&p2, &p1));
        assert!(e.contains(&sum));
        assert!(e.contains(&e.add_points(&p1, &p1)));
    }

    #[test]
    fn scalar_multiplication_annihilates_at_group_order() {
        // #E = 100 for y^2 = x^3 + 2x + 3 over F_97.
        let e = curve(2, 3, 97);
        let order = e.naive_count();
        assert_eq!(order, num(100));

        let mut x = zero();
        let point = loop {
            if let Some(point) = e.lift_x(&x) {
                break point;
            }
            x += 1u32;
        };
        assert!(e.mul_point(&point, &order).is_infinity());
        assert!(!e.mul_point(&point, &num(1)).is_infinity());
    }

    #[test]
    fn naive_count_small_curves() {
        assert_eq!(curve(0, 7, 17).naive_count(), num(18));
        assert_eq!(curve(21, 7689, 83).naive_count(), num(92));
    }
}
