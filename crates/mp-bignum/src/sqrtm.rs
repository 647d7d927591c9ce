//! Modular square roots: the `p == 3 (mod 4)` and `p == 5 (mod 8)` fast
//! paths, Tonelli-Shanks for the rest, and the CRT composition for a
//! two-prime composite modulus.

use mp_types::BnError;

use crate::bignum::BigNum;

/// Witness-search bound for Tonelli-Shanks. A non-residue turns up almost
/// immediately for any prime modulus; hitting the cap means the modulus is
/// adversarial or composite.
const WITNESS_MAX: u64 = 1000;

fn sqrtm_3mod4(x: &BigNum, p: &BigNum) -> Option<BigNum> {
    // b = x^((p + 1) / 4) mod p
    let e = p.add_u64(1).shr_trunc(2);
    let b = x.powm(&e, p).ok()?;

    // b^2 must reproduce x.
    let c = b.sqr().rem_euclid(p).ok()?;

    if &c != x {
        return None;
    }

    Some(b)
}

fn sqrtm_5mod8(x: &BigNum, p: &BigNum) -> Option<BigNum> {
    // Atkin's formula: with t = 2x and a = t^((p - 5) / 8),
    // b = (a^2 * t - 1) * x * a.
    let t = x.shl(1).rem_euclid(p).ok()?;
    let e = p.shr_trunc(3);
    let a = t.powm(&e, p).ok()?;

    let mut b = a.sqr().rem_euclid(p).ok()?;
    b = b.mul(&t).rem_euclid(p).ok()?;
    b = b.sub_u64(1);
    b = b.mul(x).rem_euclid(p).ok()?;
    b = b.mul(&a).rem_euclid(p).ok()?;

    let c = b.sqr().rem_euclid(p).ok()?;

    if &c != x {
        return None;
    }

    Some(b)
}

fn sqrtm_tonelli(x: &BigNum, p: &BigNum) -> Option<BigNum> {
    if p.is_one() {
        return None;
    }

    match x.jacobi(p) {
        -1 => return None,
        0 => return Some(BigNum::zero()),
        _ => {}
    }

    // p - 1 == 2^e * s with s odd.
    let mut s = p.sub_u64(1);
    let e = s.ctz();

    s = s.shr_trunc(e);

    // Search for a quadratic non-residue, bounded so adversarial moduli
    // fail instead of spinning.
    let mut n = BigNum::from_u64(2);
    let mut tries = 0;

    while n.jacobi(p) != -1 {
        n = n.add_u64(1);
        tries += 1;

        if tries > WITNESS_MAX {
            return None;
        }
    }

    // y = x^((s + 1) / 2), b = x^s, g = n^s.
    let t = s.add_u64(1).shr_trunc(1);
    let mut y = x.powm(&t, p).ok()?;
    let mut b = x.powm(&s, p).ok()?;
    let mut g = n.powm(&s, p).ok()?;
    let mut k = e;

    loop {
        let mut t = b.clone();
        let mut m = 0;

        while !t.is_one() {
            if m >= k {
                return None;
            }

            t = t.sqr().rem_euclid(p).ok()?;
            m += 1;
        }

        if m == 0 {
            break;
        }

        // t = g^(2^(k - m - 1))
        let mut t = g;

        for _ in 0..k - m - 1 {
            t = t.sqr().rem_euclid(p).ok()?;
        }

        g = t.sqr().rem_euclid(p).ok()?;
        y = y.mul(&t).rem_euclid(p).ok()?;
        b = b.mul(&g).rem_euclid(p).ok()?;
        k = m;
    }

    Some(y)
}

impl BigNum {
    /// A square root of `self` in `F(p)` for odd prime `p`, dispatching on
    /// `p mod 8`. Every path verifies by squaring; failure means `self` is
    /// a non-residue (or `p` is unusable).
    pub fn sqrtm(&self, p: &BigNum) -> Result<BigNum, BnError> {
        if p.sign() <= 0 || p.is_even() {
            return Err(BnError::NoSquareRoot);
        }

        let x = self.rem_euclid(p)?;

        let r = if p.getlimbn(0) & 3 == 3 {
            sqrtm_3mod4(&x, p)
        } else if p.getlimbn(0) & 7 == 5 {
            sqrtm_5mod8(&x, p)
        } else {
            sqrtm_tonelli(&x, p)
        };

        r.ok_or(BnError::NoSquareRoot)
    }

    /// A square root of `self` in `F(p * q)`, composed from the per-prime
    /// roots with the Bezout coefficients of `egcd(p, q)`.
    pub fn sqrtpq(&self, p: &BigNum, q: &BigNum) -> Result<BigNum, BnError> {
        let sp = self.sqrtm(p)?;
        let sq = self.sqrtm(q)?;

        let (_, mp_, mq) = p.gcdext(q);
        let n = p.mul(q);

        // u = sq * mp * p mod n
        let mut u = sq.mul(&mp_).rem_euclid(&n)?;
        u = u.mul(p).rem_euclid(&n)?;

        // v = sp * mq * q mod n
        let mut v = sp.mul(&mq).rem_euclid(&n)?;
        v = v.mul(q).rem_euclid(&n)?;

        u.add(&v).rem_euclid(&n)
    }
}
