//! Big-integer helpers shared across the crate: tiny constructors, modular
//! inverses and square roots, and the primality utilities the point-counting
//! driver leans on.

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

/// Witness count for Miller–Rabin; each extra round divides the false
/// positive probability by four.
const MILLER_RABIN_ROUNDS: usize = 20;

pub fn zero() -> BigUint {
    BigUint::zero()
}

pub fn one() -> BigUint {
    BigUint::one()
}

pub fn num(n: u32) -> BigUint {
    BigUint::from(n)
}

/// Computes the inverse of `a` modulo `m` by the extended Euclidean
/// algorithm, or `None` when `gcd(a, m) != 1`.
pub fn modinv(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() {
        return None;
    }
    let modulus = BigInt::from(m.clone());
    let mut r0 = BigInt::from(a % m);
    let mut r1 = modulus.clone();
    let mut s0 = BigInt::one();
    let mut s1 = BigInt::zero();

    while !r1.is_zero() {
        let q = &r0 / &r1;
        let r = &r0 - &q * &r1;
        let s = &s0 - &q * &s1;
        r0 = std::mem::replace(&mut r1, r);
        s0 = std::mem::replace(&mut s1, s);
    }

    if !r0.is_one() {
        return None;
    }
    s0.mod_floor(&modulus).to_biguint()
}

/// Miller–Rabin primality test with [`MILLER_RABIN_ROUNDS`] random witnesses.
/// Composites slip through with probability at most $4^{-20}$.
pub fn is_probably_prime(n: &BigUint) -> bool {
    let two = num(2);
    if *n < two {
        return false;
    }
    if *n < num(4) {
        // 2 and 3
        return true;
    }
    if n.is_even() {
        return false;
    }

    // Write n - 1 as 2^s * d with d odd.
    let n_minus_1 = n - 1u32;
    let s = n_minus_1
        .trailing_zeros()
        .expect("n - 1 is nonzero for n >= 4");
    let d = &n_minus_1 >> s;

    let mut rng = rand::thread_rng();
    'witness: for _ in 0..MILLER_RABIN_ROUNDS {
        let witness = rng.gen_biguint_range(&two, &n_minus_1);
        let mut x = witness.modpow(&d, n);
        if x.is_one() || x == n_minus_1 {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Enumerates the primes below `upper` in ascending order.
pub fn small_primes(upper: u64) -> impl Iterator<Item = u64> {
    (2..upper).filter(|&candidate| is_probably_prime(&BigUint::from(candidate)))
}

/// Computes a square root of `n` modulo an odd prime `p` by Tonelli–Shanks,
/// or `None` when `n` is a quadratic non-residue.
pub fn mod_sqrt(n: &BigUint, p: &BigUint) -> Option<BigUint> {
    let n = &(n % p);
    if n.is_zero() {
        return Some(zero());
    }
    let exp = (p - 1u32) >> 1;
    if !n.modpow(&exp, p).is_one() {
        // Euler's criterion: not a residue.
        return None;
    }

    // p = 3 (mod 4): the root is n^{(p + 1) / 4}.
    if (p % 4u32) == num(3) {
        return Some(n.modpow(&((p + 1u32) >> 2), p));
    }

    // Tonelli–Shanks. Write p - 1 = 2^s * q with q odd.
    let p_minus_1 = p - 1u32;
    let s = p_minus_1
        .trailing_zeros()
        .expect("p - 1 is nonzero for odd prime p");
    let q = &p_minus_1 >> s;

    // Any non-residue serves as the seed of the 2-Sylow generator.
    let mut z = num(2);
    while z.modpow(&exp, p).is_one() {
        z += 1u32;
    }

    let mut m = s;
    let mut c = z.modpow(&q, p);
    let mut t = n.modpow(&q, p);
    let mut r = n.modpow(&((&q + 1u32) >> 1), p);

    while !t.is_one() {
        let mut i = 0u64;
        let mut probe = t.clone();
        while !probe.is_one() {
            probe = (&probe * &probe) % p;
            i += 1;
        }
        let mut b = c;
        for _ in 0..(m - i - 1) {
            b = (&b * &b) % p;
        }
        m = i;
        c = (&b * &b) % p;
        t = (t * &c) % p;
        r = (r * b) % p;
    }
    Some(r)
}

/// Reduces an arbitrary signed integer into the canonical range $[0, p)$.
pub fn canonical_mod(v: &BigInt, p: &BigUint) -> BigUint {
    let p_int = BigInt::from(p.clone());
    let reduced = v.mod_floor(&p_int);
    debug_assert!(!reduced.is_negative());
    reduced.to_biguint().expect("mod_floor is non-negative")
}
