//! Arithmetic on [`BigNum`]: add/sub/mul families, the three division
//! families (truncated, Euclidean, rounded), exact division,
//! divisibility and congruence tests, integer powers and roots.

use core::cmp::Ordering;

use mp_types::BnError;

use crate::bignum::BigNum;
use crate::div;
use crate::limb::Limb;
use crate::nat;

/// `|x| + |y|`.
fn add_abs(x: &[Limb], y: &[Limb]) -> Vec<Limb> {
    let (a, b) = if x.len() >= y.len() { (x, y) } else { (y, x) };
    let mut z = vec![0; a.len() + 1];

    let c = nat::add(&mut z[..a.len()], a, b);
    z[a.len()] = c;

    z
}

/// `|x| - |y|`, requiring `|x| >= |y|`.
fn sub_abs(x: &[Limb], y: &[Limb]) -> Vec<Limb> {
    let mut z = vec![0; x.len()];

    let c = nat::sub(&mut z, x, y);
    debug_assert_eq!(c, 0);

    z
}

impl BigNum {
    /*
     * Addition / Subtraction
     */

    /// `self + other`.
    pub fn add(&self, other: &BigNum) -> BigNum {
        if self.is_negative() == other.is_negative() {
            // x + y, (-x) + (-y) == -(x + y)
            let mut z = BigNum::from_limbs(add_abs(self.mag(), other.mag()));
            z.set_negative(self.is_negative());
            z
        } else {
            match self.cmp_abs(other) {
                // x + (-x) == 0
                Ordering::Equal => BigNum::zero(),
                // x + (-y) == -(y - x), (-x) + y == y - x
                Ordering::Less => {
                    let mut z = BigNum::from_limbs(sub_abs(other.mag(), self.mag()));
                    z.set_negative(other.is_negative());
                    z
                }
                // x + (-y) == x - y, (-x) + y == -(x - y)
                Ordering::Greater => {
                    let mut z = BigNum::from_limbs(sub_abs(self.mag(), other.mag()));
                    z.set_negative(self.is_negative());
                    z
                }
            }
        }
    }

    /// `self - other`.
    pub fn sub(&self, other: &BigNum) -> BigNum {
        if self.is_negative() != other.is_negative() {
            // x - (-y) == x + y, (-x) - y == -(x + y)
            let mut z = BigNum::from_limbs(add_abs(self.mag(), other.mag()));
            z.set_negative(self.is_negative());
            z
        } else {
            match self.cmp_abs(other) {
                // x - x == 0
                Ordering::Equal => BigNum::zero(),
                // x - y == -(y - x), (-x) - (-y) == y - x
                Ordering::Less => {
                    let mut z = BigNum::from_limbs(sub_abs(other.mag(), self.mag()));
                    z.set_negative(!self.is_negative());
                    z
                }
                Ordering::Greater => {
                    let mut z = BigNum::from_limbs(sub_abs(self.mag(), other.mag()));
                    z.set_negative(self.is_negative());
                    z
                }
            }
        }
    }

    /// `self + y`.
    pub fn add_u64(&self, y: u64) -> BigNum {
        self.add(&BigNum::from_u64(y))
    }

    /// `self - y`.
    pub fn sub_u64(&self, y: u64) -> BigNum {
        self.sub(&BigNum::from_u64(y))
    }

    /// `self + y`.
    pub fn add_i64(&self, y: i64) -> BigNum {
        self.add(&BigNum::from_i64(y))
    }

    /// `self - y`.
    pub fn sub_i64(&self, y: i64) -> BigNum {
        self.sub(&BigNum::from_i64(y))
    }

    /// `x - self` for scalar `x`: negate after a regular subtract.
    pub fn u64_sub(x: u64, y: &BigNum) -> BigNum {
        y.sub_u64(x).neg()
    }

    /// Negation.
    pub fn neg(&self) -> BigNum {
        let mut z = self.clone();
        z.set_negative(!z.is_negative());
        z
    }

    /// Absolute value.
    pub fn abs(&self) -> BigNum {
        let mut z = self.clone();
        z.set_negative(false);
        z
    }

    /*
     * Multiplication
     */

    /// `self * other`.
    pub fn mul(&self, other: &BigNum) -> BigNum {
        if core::ptr::eq(self, other) {
            return self.sqr();
        }

        if self.is_zero() || other.is_zero() {
            return BigNum::zero();
        }

        let (a, b) = if self.size() >= other.size() {
            (self.mag(), other.mag())
        } else {
            (other.mag(), self.mag())
        };

        let mut z = vec![0; a.len() + b.len()];
        nat::mul(&mut z, a, b);

        BigNum::from_sign_magnitude(z, self.is_negative() != other.is_negative())
    }

    /// `self * y`.
    pub fn mul_u64(&self, y: u64) -> BigNum {
        self.mul(&BigNum::from_u64(y))
    }

    /// `self * y`.
    pub fn mul_i64(&self, y: i64) -> BigNum {
        self.mul(&BigNum::from_i64(y))
    }

    /// `self^2` via the dedicated squaring kernel.
    pub fn sqr(&self) -> BigNum {
        let xn = self.size();

        if xn == 0 {
            return BigNum::zero();
        }

        let mut z = vec![0; 2 * xn];
        let mut scratch = vec![0; 2 * xn];

        nat::sqr(&mut z, self.mag(), &mut scratch);

        BigNum::from_limbs(z)
    }

    /// `self += x * y`.
    pub fn addmul(&mut self, x: &BigNum, y: &BigNum) {
        if !x.is_zero() && !y.is_zero() {
            *self = self.add(&x.mul(y));
        }
    }

    /// `self -= x * y`.
    pub fn submul(&mut self, x: &BigNum, y: &BigNum) {
        if !x.is_zero() && !y.is_zero() {
            *self = self.sub(&x.mul(y));
        }
    }

    /// `round((self * y) / 2^bits)`, rounding half away from zero.
    pub fn mulshift(&self, y: &BigNum, bits: usize) -> BigNum {
        let negative = self.is_negative() != y.is_negative();
        let mut z = self.mul(y);

        if bits > 0 {
            z.set_negative(false);

            let b = z.tstbit(bits - 1);

            z = z.shr_trunc(bits);

            if b {
                z = z.add_u64(1);
            }

            z.set_negative(negative);
        }

        z
    }

    /*
     * Truncation Division
     */

    /// Truncated division: quotient toward zero, remainder carrying the
    /// numerator's sign.
    pub fn div_rem(&self, d: &BigNum) -> Result<(BigNum, BigNum), BnError> {
        let nn = self.size();
        let dn = d.size();

        if dn == 0 {
            return Err(BnError::DivisionByZero);
        }

        if nat::cmp2(self.mag(), d.mag()) == Ordering::Less {
            return Ok((BigNum::zero(), self.clone()));
        }

        let mut qp = vec![0; nn - dn + 1];
        let mut rp = vec![0; dn];

        div::divmod(Some(&mut qp), Some(&mut rp), self.mag(), d.mag());

        let q = BigNum::from_sign_magnitude(qp, self.is_negative() != d.is_negative());
        let r = BigNum::from_sign_magnitude(rp, self.is_negative());

        Ok((q, r))
    }

    /// Truncated quotient.
    pub fn quo(&self, d: &BigNum) -> Result<BigNum, BnError> {
        Ok(self.div_rem(d)?.0)
    }

    /// Truncated remainder (sign of the numerator).
    pub fn rem(&self, d: &BigNum) -> Result<BigNum, BnError> {
        Ok(self.div_rem(d)?.1)
    }

    /// Magnitude of the truncated remainder by a scalar.
    pub fn rem_u64(&self, d: u64) -> Result<u64, BnError> {
        Ok(self.div_rem(&BigNum::from_u64(d))?.1.to_u64())
    }

    /*
     * Euclidean Division
     */

    /// Euclidean division: the remainder is non-negative, the quotient
    /// adjusted by one where truncation disagrees.
    pub fn div_rem_euclid(&self, d: &BigNum) -> Result<(BigNum, BigNum), BnError> {
        let (mut q, mut r) = self.div_rem(d)?;

        if r.is_negative() {
            if d.is_negative() {
                q = q.add_u64(1);
                r = r.sub(d);
            } else {
                q = q.sub_u64(1);
                r = r.add(d);
            }
        }

        Ok((q, r))
    }

    /// Euclidean quotient.
    pub fn div_euclid(&self, d: &BigNum) -> Result<BigNum, BnError> {
        Ok(self.div_rem_euclid(d)?.0)
    }

    /// Euclidean remainder, always in `[0, |d|)`.
    pub fn rem_euclid(&self, d: &BigNum) -> Result<BigNum, BnError> {
        Ok(self.div_rem_euclid(d)?.1)
    }

    /// Euclidean remainder by a scalar.
    pub fn mod_u64(&self, d: u64) -> Result<u64, BnError> {
        let r = self.rem_u64(d)?;

        if self.is_negative() && r != 0 {
            Ok(d - r)
        } else {
            Ok(r)
        }
    }

    /*
     * Round Division
     */

    /// Round-to-nearest division: computes `(n +- d/2) / d` truncated, so
    /// ties round away from zero for odd `d` and to the larger magnitude
    /// for even `d`.
    pub fn div_round(&self, d: &BigNum) -> Result<BigNum, BnError> {
        let h = d.shr_trunc(1);

        let t = if self.is_negative() != d.is_negative() {
            self.sub(&h)
        } else {
            self.add(&h)
        };

        t.quo(d)
    }

    /*
     * Exact Division
     */

    /// `self / d` when `d` is known to divide exactly. Panics on an
    /// inexact division.
    pub fn divexact(&self, d: &BigNum) -> Result<BigNum, BnError> {
        let nn = self.size();
        let dn = d.size();

        if dn == 0 {
            return Err(BnError::DivisionByZero);
        }

        if nn < dn {
            return Ok(BigNum::zero());
        }

        let mut qp = vec![0; nn - dn + 1];

        div::divexact(&mut qp, self.mag(), d.mag());

        Ok(BigNum::from_sign_magnitude(
            qp,
            self.is_negative() != d.is_negative(),
        ))
    }

    /// `self / d` for a scalar divisor dividing exactly.
    pub fn divexact_u64(&self, d: u64) -> Result<BigNum, BnError> {
        self.divexact(&BigNum::from_u64(d))
    }

    /*
     * Divisibility
     */

    /// True if `d` divides `self`.
    pub fn divisible_by(&self, d: &BigNum) -> bool {
        if self.is_zero() {
            return true;
        }

        if d.is_zero() {
            return false;
        }

        match self.rem(d) {
            Ok(r) => r.is_zero(),
            Err(_) => false,
        }
    }

    /// True if `d` divides `self`.
    pub fn divisible_by_u64(&self, d: u64) -> bool {
        self.divisible_by(&BigNum::from_u64(d))
    }

    /// True if `2^bits` divides `self`: checks the trailing bits directly.
    pub fn divisible_by_2exp(&self, bits: usize) -> bool {
        if self.is_zero() {
            return true;
        }

        self.ctz() >= bits
    }

    /// True if `self == y (mod d)`; `d == 0` degenerates to equality.
    pub fn congruent_to(&self, y: &BigNum, d: &BigNum) -> bool {
        if d.is_zero() {
            return self == y;
        }

        self.sub(y).divisible_by(d)
    }

    /// True if `self == y (mod 2^bits)`.
    pub fn congruent_to_2exp(&self, y: &BigNum, bits: usize) -> bool {
        if bits == 0 {
            return true;
        }

        self.sub(y).divisible_by_2exp(bits)
    }

    /*
     * Exponentiation
     */

    /// `self^y`, with squaring only when `y` is a power of two.
    pub fn pow_u64(&self, y: u64) -> BigNum {
        if y == 0 {
            return BigNum::one();
        }

        if y == 1 {
            return self.clone();
        }

        if self.is_zero() {
            return BigNum::zero();
        }

        if y & (y - 1) == 0 {
            let mut z = self.clone();
            let mut y = y - 1;

            while y > 0 {
                z = z.sqr();
                y >>= 1;
            }

            return z;
        }

        let mut z = BigNum::one();
        let mut u = self.clone();
        let mut y = y;

        while y > 0 {
            if y & 1 != 0 {
                z = z.mul(&u);
            }

            u = u.sqr();
            y >>= 1;
        }

        z
    }

    /*
     * Roots
     */

    /// Integer `k`-th root and remainder: `(s, r)` with `s^k + r == self`
    /// and `(s + 1)^k > self`. Newton iteration over integers.
    ///
    /// Panics when `k` is zero or when taking an even root of a negative.
    pub fn rootrem(&self, k: u64) -> (BigNum, BigNum) {
        assert!(k != 0, "zeroth root");
        assert!(
            !(self.is_negative() && k & 1 == 0),
            "even root of a negative"
        );

        if self.is_zero() {
            return (BigNum::zero(), BigNum::zero());
        }

        // u = 2^(ceil(bitlen / k) + 1), matching the sign of x.
        let kk = k as usize;
        let mut u = BigNum::zero();

        u.setbit((self.bit_len() + kk - 1) / kk + 1);

        if self.is_negative() {
            u = u.neg();
        }

        let kb = BigNum::from_u64(k);
        let mut s = BigNum::zero();

        loop {
            core::mem::swap(&mut s, &mut u);

            // u = floor(((k - 1) * s + floor(x / s^(k - 1))) / k)
            let t = s.pow_u64(k - 1);
            let q = self.quo(&t).expect("root iterate is non-zero");
            let t = s.mul_u64(k - 1).add(&q);

            u = t.quo(&kb).expect("k is non-zero");

            if u.cmp_abs(&s) != Ordering::Less {
                break;
            }
        }

        let r = self.sub(&s.pow_u64(k));

        (s, r)
    }

    /// Floor of the integer `k`-th root.
    pub fn root(&self, k: u64) -> BigNum {
        self.rootrem(k).0
    }

    /// True if `self` is a perfect `k`-th power.
    pub fn is_perfect_root(&self, k: u64) -> bool {
        if k == 0 || (self.is_negative() && k & 1 == 0) {
            return false;
        }

        self.rootrem(k).1.is_zero()
    }

    /// Integer square root and remainder. Panics on a negative input.
    pub fn sqrtrem(&self) -> (BigNum, BigNum) {
        assert!(!self.is_negative(), "square root of a negative");

        if self.is_zero() {
            return (BigNum::zero(), BigNum::zero());
        }

        let mut u = BigNum::zero();

        u.setbit((self.bit_len() + 1) / 2 + 1);

        let mut s = BigNum::zero();

        loop {
            core::mem::swap(&mut s, &mut u);

            // u = floor((s + floor(x / s)) / 2)
            let t = self.quo(&s).expect("sqrt iterate is non-zero");
            u = s.add(&t).shr_trunc(1);

            if u.cmp_abs(&s) != Ordering::Less {
                break;
            }
        }

        let r = self.sub(&s.sqr());

        (s, r)
    }

    /// Floor of the integer square root.
    pub fn sqrt(&self) -> BigNum {
        self.sqrtrem().0
    }

    /// True if `self` is a perfect square.
    pub fn is_perfect_square(&self) -> bool {
        if self.is_negative() {
            return false;
        }

        self.sqrtrem().1.is_zero()
    }

    /// True if `self == a^b` for some `b > 1` (zero and one included).
    ///
    /// Tests squareness, then prime exponents up to the bit length.
    pub fn is_perfect_power(&self) -> bool {
        let n = self.bit_len();

        if n <= 1 {
            return true;
        }

        if self.is_perfect_square() {
            return true;
        }

        let sieve = crate::prime::sieve(n as u64);
        let mut p = 3;

        while p <= n {
            if nat::tstbit(&sieve, p) && self.is_perfect_root(p as u64) {
                return true;
            }

            p += 2;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bn(x: i64) -> BigNum {
        BigNum::from_i64(x)
    }

    #[test]
    fn test_add_sub_signs() {
        for &(x, y) in &[
            (100i64, 200i64),
            (-100, 200),
            (100, -200),
            (-100, -200),
            (0, 5),
            (5, 0),
            (7, -7),
        ] {
            assert_eq!(bn(x).add(&bn(y)).to_i64(), x + y, "{x} + {y}");
            assert_eq!(bn(x).sub(&bn(y)).to_i64(), x - y, "{x} - {y}");
        }
    }

    #[test]
    fn test_add_carry_chain() {
        let x = BigNum::from_u64(u64::MAX);
        let z = x.add(&x);

        assert_eq!(z.to_str_radix(16), "1fffffffffffffffe");
        assert_eq!(z.sub(&x), x);
    }

    #[test]
    fn test_mul() {
        assert_eq!(bn(12345).mul(&bn(67890)).to_i64(), 12345 * 67890);
        assert_eq!(bn(-3).mul(&bn(4)).to_i64(), -12);
        assert_eq!(bn(-3).mul(&bn(-4)).to_i64(), 12);
        assert_eq!(bn(3).mul(&BigNum::zero()).sign(), 0);
    }

    #[test]
    fn test_sqr_matches_mul() {
        let x = BigNum::from_str_radix("123456789123456789123456789", 10).unwrap();
        assert_eq!(x.sqr(), x.mul(&x.clone()));
    }

    #[test]
    fn test_mul_commutes_distributes() {
        let a = BigNum::from_str_radix("-987654321987654321", 10).unwrap();
        let b = BigNum::from_u64(0xdeadbeef);
        let c = bn(-12345);

        assert_eq!(a.mul(&b), b.mul(&a));
        assert_eq!(a.mul(&b.add(&c)), a.mul(&b).add(&a.mul(&c)));
    }

    #[test]
    fn test_div_rem_truncates() {
        // Truncated: quotient toward zero, remainder sign of numerator.
        let cases = [
            (7i64, 3i64, 2i64, 1i64),
            (-7, 3, -2, -1),
            (7, -3, -2, 1),
            (-7, -3, 2, -1),
        ];

        for (n, d, q, r) in cases {
            let (qq, rr) = bn(n).div_rem(&bn(d)).unwrap();
            assert_eq!((qq.to_i64(), rr.to_i64()), (q, r), "{n} / {d}");
        }
    }

    #[test]
    fn test_div_rem_euclid() {
        // Euclidean: remainder in [0, |d|).
        let cases = [
            (7i64, 3i64, 2i64, 1i64),
            (-7, 3, -3, 2),
            (7, -3, -2, 1),
            (-7, -3, 3, 2),
        ];

        for (n, d, q, r) in cases {
            let (qq, rr) = bn(n).div_rem_euclid(&bn(d)).unwrap();
            assert_eq!((qq.to_i64(), rr.to_i64()), (q, r), "{n} divmod {d}");
        }
    }

    #[test]
    fn test_division_identity_large() {
        let n = BigNum::from_str_radix("340282366920938463463374607431768211455", 10).unwrap();
        let d = BigNum::from_str_radix("18446744073709551617", 10).unwrap();

        let (q, r) = n.div_rem(&d).unwrap();

        // 2^128 - 1 == (2^64 - 1) * (2^64 + 1) exactly.
        assert_eq!(q.to_str_radix(10), "18446744073709551615");
        assert!(r.is_zero());
        assert_eq!(q.mul(&d).add(&r), n);
    }

    #[test]
    fn test_div_by_zero() {
        assert!(bn(5).div_rem(&BigNum::zero()).is_err());
        assert!(bn(5).divexact(&BigNum::zero()).is_err());
    }

    #[test]
    fn test_scalar_rem() {
        assert_eq!(bn(7).rem_u64(3).unwrap(), 1);
        assert_eq!(bn(-7).rem_u64(3).unwrap(), 1); // magnitude
        assert_eq!(bn(-7).mod_u64(3).unwrap(), 2);
        assert_eq!(bn(6).mod_u64(3).unwrap(), 0);
        assert_eq!(bn(-6).mod_u64(3).unwrap(), 0);
    }

    #[test]
    fn test_div_round() {
        let cases = [
            (7i64, 2i64, 4i64),
            (5, 2, 3),
            (-5, 2, -3),
            (7, 3, 2),
            (8, 3, 3),
            (-8, 3, -3),
            (9, 3, 3),
        ];

        for (n, d, expect) in cases {
            assert_eq!(
                bn(n).div_round(&bn(d)).unwrap().to_i64(),
                expect,
                "{n} /round {d}"
            );
        }
    }

    #[test]
    fn test_divexact() {
        let d = BigNum::from_str_radix("123456789123456789", 10).unwrap();
        let q0 = BigNum::from_str_radix("-987654321987654321987", 10).unwrap();
        let n = d.mul(&q0);

        assert_eq!(n.divexact(&d).unwrap(), q0);
        assert_eq!(n.divexact_u64(3).unwrap().mul_u64(3), n);
    }

    #[test]
    fn test_divisibility() {
        assert!(bn(12).divisible_by(&bn(4)));
        assert!(!bn(12).divisible_by(&bn(5)));
        assert!(BigNum::zero().divisible_by(&bn(5)));
        assert!(!bn(12).divisible_by(&BigNum::zero()));
        assert!(bn(12).divisible_by_u64(6));

        assert!(bn(8).divisible_by_2exp(3));
        assert!(!bn(8).divisible_by_2exp(4));
        assert!(bn(-8).divisible_by_2exp(3));

        assert!(bn(17).congruent_to(&bn(5), &bn(12)));
        assert!(!bn(17).congruent_to(&bn(6), &bn(12)));
        assert!(bn(17).congruent_to(&bn(17), &BigNum::zero()));
        assert!(bn(19).congruent_to_2exp(&bn(3), 4));
    }

    #[test]
    fn test_pow() {
        assert_eq!(bn(3).pow_u64(0).to_i64(), 1);
        assert_eq!(bn(3).pow_u64(1).to_i64(), 3);
        assert_eq!(bn(3).pow_u64(4).to_i64(), 81);
        assert_eq!(bn(2).pow_u64(10).to_i64(), 1024);
        assert_eq!(bn(-2).pow_u64(3).to_i64(), -8);
        assert_eq!(bn(-2).pow_u64(4).to_i64(), 16);
        assert_eq!(bn(10).pow_u64(20).to_str_radix(10), "100000000000000000000");
    }

    #[test]
    fn test_rootrem() {
        // s^k + r == x and (s + 1)^k > x.
        for &(x, k) in &[(1000u64, 3u64), (1024, 10), (35, 2), (7, 1), (1, 5)] {
            let xb = BigNum::from_u64(x);
            let (s, r) = xb.rootrem(k);

            assert_eq!(s.pow_u64(k).add(&r), xb, "{x} root {k}");
            assert!(s.add_u64(1).pow_u64(k) > xb, "{x} root {k} bound");
        }

        // Odd root of a negative.
        let (s, r) = bn(-27).rootrem(3);
        assert_eq!(s.to_i64(), -3);
        assert!(r.is_zero());
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(bn(0).sqrt().to_i64(), 0);
        assert_eq!(bn(1).sqrt().to_i64(), 1);
        assert_eq!(bn(35).sqrt().to_i64(), 5);
        assert_eq!(bn(36).sqrt().to_i64(), 6);

        let (s, r) = bn(99).sqrtrem();
        assert_eq!((s.to_i64(), r.to_i64()), (9, 18));

        assert!(bn(49).is_perfect_square());
        assert!(!bn(50).is_perfect_square());
        assert!(!bn(-4).is_perfect_square());
    }

    #[test]
    fn test_perfect_power() {
        assert!(bn(0).is_perfect_power());
        assert!(bn(1).is_perfect_power());
        assert!(bn(8).is_perfect_power());
        assert!(bn(27).is_perfect_power());
        assert!(bn(64).is_perfect_power());
        assert!(bn(243).is_perfect_power()); // 3^5
        assert!(!bn(24).is_perfect_power());
        assert!(!bn(100000000000000003i64).is_perfect_power());
    }

    #[test]
    fn test_mulshift() {
        // round((x * y) / 2^8)
        let z = bn(1000).mulshift(&bn(1000), 8);
        assert_eq!(z.to_i64(), 3906); // 1000000 / 256 = 3906.25

        let z = bn(-1000).mulshift(&bn(1000), 8);
        assert_eq!(z.to_i64(), -3906);

        let z = bn(384).mulshift(&bn(1), 8);
        assert_eq!(z.to_i64(), 2); // 1.5 rounds away
    }

    #[test]
    fn test_addmul_submul() {
        let mut z = bn(10);
        z.addmul(&bn(3), &bn(4));
        assert_eq!(z.to_i64(), 22);

        z.submul(&bn(5), &bn(5));
        assert_eq!(z.to_i64(), -3);
    }
}
