//! Division polynomials $\psi_\ell$ of a short Weierstrass curve, built on
//! demand and memoized.
//!
//! The store keeps each $\psi_n$ as a univariate polynomial in $x$ together
//! with the power of $y$ factored out of it: odd indices are pure in $x$,
//! even indices carry a single factor of $y$. During the recurrences every
//! $y^2$ is replaced by $f(x) = x^3 + ax + b$, so no bivariate arithmetic is
//! ever needed. The roots of the $x$-part of $\psi_\ell$ are exactly the
//! $x$-coordinates of the nontrivial $\ell$-torsion of the curve.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use num_bigint::BigUint;

use crate::curve::EllipticCurve;
use crate::polynomial::Polynomial;
use crate::util::{modinv, num, zero};

/// A division polynomial split into its $x$-part and the power of $y$ it
/// carries (always 0 or 1 after reduction).
#[derive(Debug, Clone)]
struct DivisionPoly<'a> {
    poly: Polynomial<'a>,
    y_power: usize,
}

/// Lazily computed, memoized division polynomials of one curve.
///
/// The store borrows its curve and must never be mixed with another one.
/// Entries are computed bottom-up over an explicitly scheduled index set, so
/// arbitrarily large odd $\ell$ stay within constant stack depth, and each
/// index is computed exactly once.
pub struct PsiStore<'a> {
    curve: &'a EllipticCurve,
    cache: BTreeMap<usize, DivisionPoly<'a>>,
}

impl<'a> PsiStore<'a> {
    pub fn new(curve: &'a EllipticCurve) -> Self {
        let mut store = PsiStore {
            curve,
            cache: BTreeMap::new(),
        };
        store.seed_base_cases();
        store
    }

    /// Returns the $x$-part of $\psi_\ell$.
    ///
    /// Schoof's driver only ever needs the base cases and odd $\ell$;
    /// requesting an even $\ell \geq 6$ is a programmer error and panics.
    pub fn get(&mut self, l: usize) -> &Polynomial<'a> {
        assert!(
            l <= 4 || l % 2 == 1,
            "division polynomials for even l >= 6 are never needed"
        );
        self.ensure(l);
        &self.cache[&l].poly
    }

    /// Seeds $\psi_0$ through $\psi_4$ straight from the curve parameters.
    fn seed_base_cases(&mut self) {
        let p = self.curve.p();
        let a = self.curve.a();
        let b = self.curve.b();
        // -v mod p, for v already reduced.
        let neg = |v: BigUint| p - (v % p);

        // psi_0 = 0, psi_1 = 1, psi_2 = 2y
        self.insert(0, Polynomial::zero(p), 0);
        self.insert(1, Polynomial::one(p), 0);
        self.insert(2, Polynomial::new(p, &[num(2)]), 1);

        // psi_3 = 3x^4 + 6ax^2 + 12bx - a^2
        self.insert(
            3,
            Polynomial::new(
                p,
                &[neg(a * a), num(12) * b, num(6) * a, zero(), num(3)],
            ),
            0,
        );

        // psi_4 = 4y (x^6 + 5ax^4 + 20bx^3 - 5a^2x^2 - 4abx - a^3 - 8b^2)
        self.insert(
            4,
            Polynomial::new(
                p,
                &[
                    neg((a * a * a + num(8) * b * b) % p) * num(4),
                    neg((num(4) * a * b) % p) * num(4),
                    neg((num(5) * a * a) % p) * num(4),
                    num(20) * b * num(4),
                    num(5) * a * num(4),
                    zero(),
                    num(4),
                ],
            ),
            1,
        );
    }

    fn insert(&mut self, n: usize, poly: Polynomial<'a>, y_power: usize) {
        self.cache.insert(n, DivisionPoly { poly, y_power });
    }

    /// Computes every missing $\psi_n$ that `l` depends on, smallest first.
    ///
    /// The schedule is collected with an explicit work stack; since the
    /// recurrence for index $n$ only reaches indices in $[n/2 - 2, n/2 + 2]$,
    /// walking the scheduled set in ascending order sees every dependency
    /// already filled in.
    fn ensure(&mut self, l: usize) {
        let mut schedule = BTreeSet::new();
        let mut work = vec![l];
        while let Some(n) = work.pop() {
            if self.cache.contains_key(&n) || schedule.contains(&n) {
                continue;
            }
            schedule.insert(n);
            let m = n / 2;
            if n % 2 == 1 {
                work.extend_from_slice(&[m - 1, m, m + 1, m + 2]);
            } else {
                work.extend_from_slice(&[m - 2, m - 1, m, m + 1, m + 2]);
            }
        }

        for n in schedule {
            debug!("computing division polynomial psi_{}", n);
            let entry = self.compute(n);
            self.cache.insert(n, entry);
        }
    }

    /// Evaluates the recurrence for $\psi_n$, $n \geq 5$, assuming all the
    /// indices it references are already cached.
    fn compute(&self, n: usize) -> DivisionPoly<'a> {
        let f = self.curve.weierstrass_poly();
        let m = n / 2;

        if n % 2 == 1 {
            // psi_{2m+1} = psi_{m+2} psi_m^3 - psi_{m-1} psi_{m+1}^3
            let psi_m_plus_2 = &self.cache[&(m + 2)];
            let psi_m = &self.cache[&m];
            let psi_m_minus_1 = &self.cache[&(m - 1)];
            let psi_m_plus_1 = &self.cache[&(m + 1)];

            let cube = |d: &DivisionPoly<'a>| d.poly.mul(&d.poly).mul(&d.poly);

            // One side of the recurrence carries y^4 and the other none
            // (which depends on the parity of m); replacing y^2 with f(x)
            // brings both down to polynomials in x alone.
            let mut left = psi_m_plus_2.poly.mul(&cube(psi_m));
            let mut left_y = psi_m_plus_2.y_power + 3 * psi_m.y_power;
            while left_y > 1 {
                left = left.mul(&f);
                left_y -= 2;
            }
            let mut right = psi_m_minus_1.poly.mul(&cube(psi_m_plus_1));
            let mut right_y = psi_m_minus_1.y_power + 3 * psi_m_plus_1.y_power;
            while right_y > 1 {
                right = right.mul(&f);
                right_y -= 2;
            }
            // Odd division polynomials are pure in x.
            debug_assert_eq!(left_y, 0);
            debug_assert_eq!(right_y, 0);

            DivisionPoly {
                poly: left.sub(&right),
                y_power: 0,
            }
        } else {
            // psi_{2m} = psi_m (psi_{m+2} psi_{m-1}^2 - psi_{m-2} psi_{m+1}^2) / 2y
            let psi_m = &self.cache[&m];
            let psi_m_plus_2 = &self.cache[&(m + 2)];
            let psi_m_minus_1 = &self.cache[&(m - 1)];
            let psi_m_minus_2 = &self.cache[&(m - 2)];
            let psi_m_plus_1 = &self.cache[&(m + 1)];

            let square = |d: &DivisionPoly<'a>| d.poly.mul(&d.poly);
            let left = psi_m_plus_2.poly.mul(&square(psi_m_minus_1));
            let right = psi_m_minus_2.poly.mul(&square(psi_m_plus_1));

            let left_y = psi_m_plus_2.y_power + 2 * psi_m_minus_1.y_power;
            let right_y = psi_m_minus_2.y_power + 2 * psi_m_plus_1.y_power;
            debug_assert_eq!(left_y, right_y);

            let two_inv =
                modinv(&num(2), self.curve.p()).expect("2 is invertible in odd characteristic");
            let mut result = left.sub(&right).mul(&psi_m.poly).scale(&two_inv);
            let mut y_power = left_y + psi_m.y_power - 1;
            while y_power > 1 {
                result = result.mul(&f);
                y_power -= 2;
            }
            debug_assert_eq!(y_power, 1);

            DivisionPoly {
                poly: result,
                y_power: 1,
            }
        }
    }
}
