//! # Schoof's algorithm
//!
//! This crate computes the number of points on a short Weierstrass curve
//! $E(\mathbb{F}_p) : y^2 = x^3 + ax + b$ over a prime field by [Schoof's
//! algorithm]: the trace of Frobenius is determined modulo enough small
//! primes $\ell$ to pin it down inside the Hasse interval, and the order
//! follows as $\\#E(\mathbb{F}_p) = p + 1 - t$. The implementation favors
//! clarity over speed; the polynomial arithmetic is schoolbook throughout.
//!
//! The one-call entry point is [`count_points`]:
//!
//! ```
//! use num_bigint::BigInt;
//!
//! let n = schoof::count_points(
//!     &BigInt::from(2),
//!     &BigInt::from(3),
//!     &BigInt::from(97),
//! )
//! .unwrap();
//! assert_eq!(n, 100u32.into());
//! ```
//!
//! [Schoof's algorithm]: https://en.wikipedia.org/wiki/Schoof's_algorithm

pub mod curve;
pub mod division;
pub mod polynomial;
mod trace;
pub mod util;

use log::info;
use num_bigint::{BigInt, BigUint};
use thiserror::Error as ThisError;

use curve::EllipticCurve;
use division::PsiStore;
use polynomial::Polynomial;
use trace::{trace_mod_2, trace_mod_l};
use util::{modinv, num, one, small_primes};

/// Errors surfaced by the point-counting entry points.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The field modulus failed the primality test.
    #[error("{0} is not prime")]
    InvalidPrime(BigUint),
    /// The parameters lie outside the supported domain, e.g. a field of
    /// characteristic 2 or 3.
    #[error("unsupported domain: {0}")]
    DomainError(String),
    /// $4a^3 + 27b^2 = 0$ over the field: not an elliptic curve.
    #[error("curve is singular over F_{0}")]
    SingularCurve(BigUint),
    /// No trace candidate matched modulo `l`. Always a bug: the driver never
    /// silently substitutes a wrong count.
    #[error("no trace of Frobenius found modulo {l}")]
    TraceNotFound { l: u64 },
    /// The auxiliary primes ran out before the CRT modulus cleared the Hasse
    /// bound.
    #[error("auxiliary primes exhausted before the trace was pinned down")]
    InsufficientPrecision,
    /// An internal invariant was violated; a bug in this crate, not a
    /// property of the input.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(&'static str),
}

/// Counts the points of $y^2 = x^3 + ax + b$ over $\mathbb{F}_p$.
///
/// `a` and `b` may be any integers (they are reduced mod `p`); `p` must be
/// an odd prime greater than 3, and the reduced curve must be non-singular.
pub fn count_points(a: &BigInt, b: &BigInt, p: &BigInt) -> Result<BigUint, Error> {
    let curve = EllipticCurve::new(a, b, p)?;
    Schoof::new(&curve).count_points()
}

/// A point-counting run over one curve.
///
/// Borrowing the curve keeps the memoized division polynomials tied to it;
/// the value is single-threaded by construction (the $\psi$ cache mutates on
/// use) and cheap to throw away.
pub struct Schoof<'a> {
    curve: &'a EllipticCurve,
    psi: PsiStore<'a>,
}

impl<'a> Schoof<'a> {
    pub fn new(curve: &'a EllipticCurve) -> Self {
        Schoof {
            curve,
            psi: PsiStore::new(curve),
        }
    }

    /// Runs the full algorithm and returns $\\#E(\mathbb{F}_p)$.
    pub fn count_points(&mut self) -> Result<BigUint, Error> {
        let p = self.curve.p();

        // Once the product of the treated moduli exceeds 4 sqrt(p), the
        // trace is determined inside the Hasse interval (the +1 rounds the
        // integer square root up).
        let goal = num(4) * (p.sqrt() + one());

        let t2 = trace_mod_2(self.curve);
        info!("trace of Frobenius mod 2: {}", t2);
        let mut t = t2;
        let mut m = num(2);

        let mut primes = small_primes(prime_search_bound(p)).filter(|&l| l > 2);
        while m <= goal {
            let l = match primes.next() {
                Some(l) => l,
                None => return Err(Error::InsufficientPrecision),
            };
            // l = p would make the torsion degenerate; skip it.
            if BigUint::from(l) == *p {
                continue;
            }

            let psi = self.psi.get(l as usize).clone();
            let c = trace_mod_l(self.curve, l, &psi)?;
            info!("trace of Frobenius mod {}: {}", l, c);

            let (t_next, m_next) = crt_fold(&t, &m, &c, l);
            t = t_next;
            m = m_next;
        }

        // The residue t mod m sits in [0, m); the actual trace may be
        // negative, in which case it shows up in the upper half.
        let t = if t > (&m >> 1u32) {
            BigInt::from(t) - BigInt::from(m)
        } else {
            BigInt::from(t)
        };

        let n = BigInt::from(p + 1u32) - t;
        n.to_biguint()
            .ok_or(Error::InternalInvariant("point count must be positive"))
    }

    /// The $x$-part of the division polynomial $\psi_\ell$ of this curve.
    /// Requesting an even $\ell \geq 6$ is a programmer error.
    pub fn psi(&mut self, l: usize) -> &Polynomial<'a> {
        self.psi.get(l)
    }

    /// The trace of Frobenius modulo the prime `l` (2 included), without any
    /// CRT accumulation. `l` must be prime and different from the field
    /// characteristic.
    pub fn trace_mod(&mut self, l: u64) -> Result<BigUint, Error> {
        assert!(
            util::is_probably_prime(&BigUint::from(l)),
            "trace residues are only defined for prime moduli"
        );
        assert!(
            BigUint::from(l) != *self.curve.p(),
            "l must differ from the field characteristic"
        );
        if l == 2 {
            return Ok(trace_mod_2(self.curve));
        }
        let psi = self.psi.get(l as usize).clone();
        trace_mod_l(self.curve, l, &psi)
    }
}

/// Folds a fresh residue $t \equiv c \pmod{\ell}$ into the running CRT pair
/// `(t, m)`, returning the updated pair with modulus $m \cdot \ell$.
///
/// `gcd(m, l) = 1` is the caller's invariant: each prime is folded once.
fn crt_fold(t: &BigUint, m: &BigUint, c: &BigUint, l: u64) -> (BigUint, BigUint) {
    let l = BigUint::from(l);
    let t_mod_l = t % &l;
    let diff = (c + &l - t_mod_l) % &l;
    let m_inv = modinv(&(m % &l), &l).expect("CRT moduli are pairwise coprime");
    let k = (diff * m_inv) % &l;
    (t + k * m, m * l)
}

/// An upper bound on the auxiliary primes worth trying: by the prime number
/// theorem the primes below roughly log(4 sqrt(p)) already multiply past the
/// Hasse bound, so a few multiples of the bit length is a comfortable margin.
fn prime_search_bound(p: &BigUint) -> u64 {
    64 + 4 * p.bits()
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Signed;

    fn count(a: i64, b: i64, p: i64) -> BigUint {
        count_points(&BigInt::from(a), &BigInt::from(b), &BigInt::from(p)).unwrap()
    }

    #[test]
    fn counts_small_named_curves() {
        // y^2 = x^3 + 7 over F_17 (a pocket secp256k1) has 18 points.
        assert_eq!(count(0, 7, 17), num(18));
        assert_eq!(count(2, 3, 97), num(100));
    }

    #[test]
    fn count_agrees_with_enumeration_on_the_demo_curve() {
        let e = EllipticCurve::new(
            &BigInt::from(21),
            &BigInt::from(7689),
            &BigInt::from(83),
        )
        .unwrap();
        let expected = e.naive_count();
        assert_eq!(Schoof::new(&e).count_points().unwrap(), expected);
        assert_eq!(expected, num(92));
    }

    #[test]
    fn counts_known_larger_curves() {
        assert_eq!(count(186, 20, 191), num(204));
        assert_eq!(count(14368, 6420, 65519), num(65614));
    }

    #[test]
    #[ignore = "minutes of schoolbook arithmetic in debug builds"]
    fn counts_a_27_bit_curve() {
        assert_eq!(count(135939349, 38820686, 138172777), num(138161621));
    }

    #[test]
    fn count_respects_the_hasse_bound() {
        for (a, b, p) in [(5i64, 9i64, 23i64), (1, 1, 101), (40, 46, 191)] {
            let n = BigInt::from(count(a, b, p));
            let p = BigInt::from(p);
            let bound = p.sqrt() * 2;
            let distance = (n - (&p + 1i32)).abs();
            assert!(distance <= bound, "|N - (p + 1)| <= 2 sqrt(p)");
        }
    }

    #[test]
    fn negative_parameters_are_reduced() {
        // a = -1 = 16 and b = 24 = 7 over F_17.
        assert_eq!(count(-1, 7, 17), count(16, 7, 17));
        assert_eq!(count(0, 24, 17), count(0, 7, 17));
    }

    #[test]
    fn trace_residues_recombine_to_the_count() {
        let e = EllipticCurve::new(
            &BigInt::from(2),
            &BigInt::from(3),
            &BigInt::from(97),
        )
        .unwrap();
        let mut schoof = Schoof::new(&e);
        let n = schoof.count_points().unwrap();
        // t = p + 1 - N must reduce to the per-l residues.
        let t = BigInt::from(97 + 1) - BigInt::from(n);
        for l in [2u64, 3, 5, 7] {
            let c = BigInt::from(schoof.trace_mod(l).unwrap());
            let l = BigInt::from(l);
            assert_eq!((&t - &c) % &l, BigInt::from(0), "t = {} mod {}", c, l);
        }
    }

    #[test]
    fn psi_introspection_matches_the_store() {
        let e = EllipticCurve::new(
            &BigInt::from(2),
            &BigInt::from(3),
            &BigInt::from(97),
        )
        .unwrap();
        let mut schoof = Schoof::new(&e);
        assert_eq!(schoof.psi(3).degree(), 4);
        assert_eq!(schoof.psi(5).degree(), 12);
    }

    #[test]
    fn rejects_bad_inputs() {
        let err = count_points(&BigInt::from(1), &BigInt::from(1), &BigInt::from(15));
        assert!(matches!(err, Err(Error::InvalidPrime(_))));
        let err = count_points(&BigInt::from(1), &BigInt::from(1), &BigInt::from(2));
        assert!(matches!(err, Err(Error::DomainError(_))));
        let err = count_points(&BigInt::from(0), &BigInt::from(0), &BigInt::from(17));
        assert!(matches!(err, Err(Error::SingularCurve(_))));
    }

    #[test]
    fn crt_fold_congruences() {
        let (t, m) = crt_fold(&num(1), &num(2), &num(2), 3);
        // t = 1 mod 2 and t = 2 mod 3 gives t = 5 mod 6.
        assert_eq!(t, num(5));
        assert_eq!(m, num(6));
        let (t, m) = crt_fold(&t, &m, &num(4), 5);
        assert_eq!(&t % num(6), num(5));
        assert_eq!(&t % num(5), num(4));
        assert_eq!(m, num(30));
    }
}
