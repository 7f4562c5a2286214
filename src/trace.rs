//! Trace of Frobenius modulo small primes.
//!
//! For an odd prime $\ell$ the Frobenius endomorphism $\pi(x, y) = (x^p,
//! y^p)$ satisfies $\pi^2 - [t]\pi + [p] = 0$ on the $\ell$-torsion, and $t
//! \bmod \ell$ is found by searching the $c \in [0, \ell)$ for which the
//! relation holds. The search works in the ring $\mathbb{F}_p[x]/(h)$ with
//! $h = \psi_\ell$, representing each endomorphism image as a pair $(A(x),
//! B(x)\,y)$ with $y^2$ folded into $f(x) = x^3 + ax + b$.
//!
//! When a chord or tangent denominator fails to invert mod $h$, its gcd with
//! $h$ is a proper factor: $\psi_\ell$ was reducible, and restricting to the
//! smaller factor keeps the search inside a single Frobenius eigenspace. The
//! whole computation restarts against the new modulus.

use log::debug;
use num_bigint::BigUint;
use num_traits::Zero;

use crate::curve::EllipticCurve;
use crate::polynomial::Polynomial;
use crate::util::{num, one, zero};
use crate::Error;

/// Fields of at most this many bits count 2-torsion by enumerating the roots
/// of the cubic directly; larger fields go through $\gcd(x^p - x, f)$.
const DIRECT_ROOT_COUNT_BITS: u64 = 32;

/// Computes the trace of Frobenius modulo $2$.
///
/// $t$ is even exactly when $E(\mathbb{F}_p)$ has a point of order $2$,
/// i.e. when $x^3 + ax + b$ has a root in $\mathbb{F}_p$.
pub(crate) fn trace_mod_2(curve: &EllipticCurve) -> BigUint {
    let p = curve.p();
    let f = curve.weierstrass_poly();

    let roots = if p.bits() <= DIRECT_ROOT_COUNT_BITS {
        let mut count = 0u64;
        let mut x = zero();
        while &x < p {
            if f.eval(&x).is_zero() {
                count += 1;
            }
            x += 1u32;
        }
        count
    } else {
        // deg gcd(x^p - x, f) is the number of distinct roots of f; x^p is
        // taken in F_p[x]/(f) to keep the degrees tiny.
        let x = Polynomial::x(p);
        x.pow_mod(p, &f).sub(&x).gcd(&f).degree() as u64
    };

    if roots == 0 {
        one()
    } else {
        zero()
    }
}

/// Computes the trace of Frobenius modulo an odd prime `l`, with `psi` the
/// $\ell$th division polynomial of the curve. `l` must differ from the field
/// characteristic.
pub(crate) fn trace_mod_l<'a>(
    curve: &'a EllipticCurve,
    l: u64,
    psi: &Polynomial<'a>,
) -> Result<BigUint, Error> {
    let p = curve.p();
    let a = curve.a();
    let f = curve.weierstrass_poly();

    let p_squared = p * p;
    let frob_y_exp = (p - 1u32) >> 1;
    let frob2_y_exp = (&p_squared - 1u32) >> 1;
    // The multiplier of the [p] term acts on l-torsion, so only p mod l matters.
    let k = p % BigUint::from(l);

    let mut h = psi.clone();
    'modulus: loop {
        // (x, y) itself, and its images under Frobenius and its square. All
        // components live reduced mod h; with Y^p = (Y^2)^{(p-1)/2} Y the
        // y-components are powers of f.
        let x_mono = Polynomial::x(p);
        let generic = Endo {
            x: x_mono.div_mod(&h).1,
            y: Polynomial::one(p).div_mod(&h).1,
        };
        let frob = Endo {
            x: x_mono.pow_mod(p, &h),
            y: f.pow_mod(&frob_y_exp, &h),
        };
        let frob2 = Endo {
            x: x_mono.pow_mod(&p_squared, &h),
            y: f.pow_mod(&frob2_y_exp, &h),
        };

        // sum = [p mod l](x, y), by double-and-add.
        let mut sum: Option<Endo<'_>> = None;
        for i in (0..k.bits()).rev() {
            if let Some(point) = sum.take() {
                sum = match add_endo(&point, &point, &h, &f, a) {
                    Ok(res) => res,
                    Err(g) => {
                        h = split_modulus(&h, g, l)?;
                        continue 'modulus;
                    }
                };
            }
            if k.bit(i) {
                sum = match sum.take() {
                    None => Some(generic.clone()),
                    Some(point) => match add_endo(&point, &generic, &h, &f, a) {
                        Ok(res) => res,
                        Err(g) => {
                            h = split_modulus(&h, g, l)?;
                            continue 'modulus;
                        }
                    },
                };
            }
        }

        // sum = pi^2 + [p mod l].
        let sum = match sum {
            None => Some(frob2.clone()),
            Some(point) => match add_endo(&point, &frob2, &h, &f, a) {
                Ok(res) => res,
                Err(g) => {
                    h = split_modulus(&h, g, l)?;
                    continue 'modulus;
                }
            },
        };

        let target = match sum {
            // pi^2 + [p] vanished on the torsion, so [c]pi must too: c = 0.
            None => return Ok(zero()),
            Some(target) => target,
        };

        // Walk [c] frob for c = 1, 2, ... until it meets the target.
        let mut lhs = frob.clone();
        let mut c = 1u64;
        while c < l {
            if lhs == target {
                return Ok(BigUint::from(c));
            }
            lhs = match add_endo(&lhs, &frob, &h, &f, a) {
                Ok(Some(next)) => next,
                Ok(None) => {
                    // [c + 1] frob = 0 would bound the order of a torsion
                    // point away from the prime l.
                    return Err(Error::InternalInvariant(
                        "Frobenius image collapsed below its order",
                    ));
                }
                Err(g) => {
                    h = split_modulus(&h, g, l)?;
                    continue 'modulus;
                }
            };
            c += 1;
        }

        return Err(Error::TraceNotFound { l });
    }
}

/// The image of the $\ell$-torsion under an endomorphism, written $(A(x),
/// B(x)\,y)$ with both components reduced mod the torsion modulus.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Endo<'a> {
    x: Polynomial<'a>,
    y: Polynomial<'a>,
}

/// Adds two endomorphism images by the chord-and-tangent formulas in
/// $\mathbb{F}_p[x]/(h)$, with $y^2$ eliminated through $f$.
///
/// `Ok(None)` is the point at infinity (the operands were mirror images).
/// `Err(g)` reports a denominator that was not invertible mod `h`; `g` is its
/// monic gcd with `h`, the caller's cue to split the modulus.
fn add_endo<'a>(
    u: &Endo<'a>,
    v: &Endo<'a>,
    h: &Polynomial<'a>,
    f: &Polynomial<'a>,
    a: &BigUint,
) -> Result<Option<Endo<'a>>, Polynomial<'a>> {
    let slope = if u.x != v.x {
        // Chord between distinct x-images: (y_u - y_v) / (x_u - x_v); the y
        // factors cancel, leaving a slope of the form r(x) y.
        let d = u.x.sub(&v.x);
        let d_inv = d.inv_mod(h)?;
        u.y.sub(&v.y).mul(&d_inv).div_mod(h).1
    } else {
        if u.y != v.y {
            return Ok(None);
        }
        // Tangent: (3x^2 + a) / 2y, multiplied through by y / y to clear the
        // denominator's y into an f.
        let d = u.y.mul(f).div_mod(h).1;
        let d = d.add(&d);
        let d_inv = d.inv_mod(h)?;
        let n = u.x.mul(&u.x).div_mod(h).1.scale(&num(3));
        let n = n.add(&Polynomial::new(h.modulus(), &[a.clone()]));
        n.mul(&d_inv).div_mod(h).1
    };

    // x_3 = slope^2 - x_u - x_v and y_3 = slope (x_u - x_3) - y_u, with the
    // slope's y^2 contributing one factor of f.
    let x = slope.mul(&slope).div_mod(h).1.mul(f).div_mod(h).1;
    let x = x.sub(&u.x).sub(&v.x).div_mod(h).1;
    let y = u.x.sub(&x).mul(&slope).div_mod(h).1.sub(&u.y).div_mod(h).1;
    Ok(Some(Endo { x, y }))
}

/// Replaces the torsion modulus by the smaller of the factor pair a
/// non-invertible denominator exposed.
fn split_modulus<'a>(
    h: &Polynomial<'a>,
    g: Polynomial<'a>,
    l: u64,
) -> Result<Polynomial<'a>, Error> {
    if g.degree() == 0 || g.degree() >= h.degree() {
        return Err(Error::InternalInvariant(
            "denominator gcd is not a proper factor of the torsion modulus",
        ));
    }
    let q = h.div_exact(&g);
    debug!(
        "torsion modulus for l = {} split: degree {} -> {} * {}",
        l,
        h.degree(),
        g.degree(),
        q.degree()
    );
    Ok(if g.degree() <= q.degree() { g } else { q })
}
