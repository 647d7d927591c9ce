//! Primality testing and prime generation: small-prime bitmap, primorial
//! trial division, Miller-Rabin, the strong Lucas test, and their
//! Baillie-PSW composition.

use mp_types::BnError;

use crate::bignum::BigNum;
use crate::div::Reciprocal;
use crate::limb::{self, Limb, LIMB_BITS};
use crate::nat;
use crate::rand::Rng;

/// Bitmap of the 172 primes in [2, 1023]; bit `p` is set iff `p` is
/// prime. Also seeds [`sieve`] for small bounds.
#[cfg(target_pointer_width = "64")]
static PRIMES: [Limb; 16] = [
    0x28208a20a08a28ac,
    0x800228a202088288,
    0x8028208820a00a08,
    0x08028228800800a2,
    0x228800200a20a082,
    0x8820808228020800,
    0x0882802802022020,
    0x208808808008a202,
    0x0a08200820000a00,
    0x00800a2082820802,
    0x200808220028208a,
    0x0220808820808020,
    0x28a00a0020080022,
    0x008a20008a200080,
    0x0208220200808800,
    0x2822002080820880,
];

/// Bitmap of the 172 primes in [2, 1023].
#[cfg(not(target_pointer_width = "64"))]
static PRIMES: [Limb; 32] = [
    0xa08a28ac, 0x28208a20, 0x02088288, 0x800228a2, 0x20a00a08, 0x80282088,
    0x800800a2, 0x08028228, 0x0a20a082, 0x22880020, 0x28020800, 0x88208082,
    0x02022020, 0x08828028, 0x8008a202, 0x20880880, 0x20000a00, 0x0a082008,
    0x82820802, 0x00800a20, 0x0028208a, 0x20080822, 0x20808020, 0x02208088,
    0x20080022, 0x28a00a00, 0x8a200080, 0x008a2000, 0x00808800, 0x02082202,
    0x80820880, 0x28220020,
];

/// Prime bitmap covering [0, n] by the sieve of Eratosthenes; bounds
/// below 1024 copy the precomputed table.
pub(crate) fn sieve(n: u64) -> Vec<Limb> {
    let n = n as usize;
    let zn = (n + LIMB_BITS) / LIMB_BITS;
    let lo = (n + 1) % LIMB_BITS;

    if n < 1024 {
        return PRIMES[..zn].to_vec();
    }

    let mut zp = vec![Limb::MAX; zn];

    let mut p = 2;

    while p * p <= n {
        if nat::tstbit(&zp, p) {
            let mut i = p * p;

            while i <= n {
                nat::clrbit(&mut zp, i);
                i += p;
            }
        }

        p += 1;
    }

    zp[0] &= !(3 as Limb);

    if lo != 0 {
        zp[zn - 1] &= limb::mask(lo);
    }

    zp
}

/// Residues of `x` against the primorial `2 * 3 * ... * 53 / 2`, split
/// into two word-sized moduli so every small prime through 53 is a cheap
/// scalar `%` away. Avoids any multi-limb division.
fn mod_primorial(x: &BigNum) -> (Limb, Limb) {
    debug_assert!(!x.is_negative());

    #[cfg(target_pointer_width = "64")]
    {
        // d = p(16)# / 2
        const D: Limb = 16294579238595022365;

        let rec = Reciprocal::new(D);
        let r = rec.rem(x.mag());

        (r % 4127218095, r % 3948078067)
    }

    #[cfg(not(target_pointer_width = "64"))]
    {
        // d1 = 3 * 5 * 7 * 11 * 13 * 17 * 19 * 23 * 37
        // d2 = 29 * 31 * 41 * 43 * 47 * 53
        const D1: Limb = 4127218095;
        const D2: Limb = 3948078067;

        let r1 = Reciprocal::new(D1).rem(x.mag());
        let r2 = Reciprocal::new(D2).rem(x.mag());

        (r1, r2)
    }
}

/// True when either residue exposes a factor among the first 16 odd
/// primes.
fn primorial_composite(ra: Limb, rb: Limb) -> bool {
    ra % 3 == 0
        || ra % 5 == 0
        || ra % 7 == 0
        || ra % 11 == 0
        || ra % 13 == 0
        || ra % 17 == 0
        || ra % 19 == 0
        || ra % 23 == 0
        || ra % 37 == 0
        || rb % 29 == 0
        || rb % 31 == 0
        || rb % 41 == 0
        || rb % 43 == 0
        || rb % 47 == 0
        || rb % 53 == 0
}

impl BigNum {
    /// Miller-Rabin with `reps` random bases in `[2, n - 2]`; when
    /// `force2` is set the last round uses base 2. Entropy failure is
    /// reported to the caller.
    pub fn miller_rabin<R: Rng>(
        &self,
        reps: u32,
        force2: bool,
        rng: &mut R,
    ) -> Result<bool, BnError> {
        use core::cmp::Ordering;

        if self.cmp_u64(2) == Ordering::Less {
            return Ok(false);
        }

        if self.is_even() {
            return Ok(self.cmp_u64(2) == Ordering::Equal);
        }

        if self.cmp_u64(7) != Ordering::Greater {
            // 3, 5 or 7.
            return Ok(true);
        }

        // n - 1 == 2^k * q with q odd.
        let nm1 = self.sub_u64(1);
        let nm3 = nm1.sub_u64(2);
        let k = nm1.ctz();
        let q = nm1.shr_trunc(k);

        'witness: for i in 0..reps {
            let x = if i == reps - 1 && force2 {
                BigNum::from_u64(2)
            } else {
                nm3.urandomm(rng)?.add_u64(2)
            };

            let mut y = x.powm(&q, self).expect("modulus is non-zero");

            if y.is_one() || y == nm1 {
                continue;
            }

            for _ in 1..k {
                y = y.sqr().rem_euclid(self).expect("modulus is non-zero");

                if y == nm1 {
                    continue 'witness;
                }

                if y.is_one() {
                    return Ok(false);
                }
            }

            return Ok(false);
        }

        Ok(true)
    }

    /// Strong Lucas test with Selfridge parameter selection: scan
    /// `p = 3, 4, 5, ...` until `p^2 - 4` is a non-residue. `limit` caps
    /// the scan (0 for the built-in bound only).
    pub fn lucas_prime(&self, limit: u64) -> bool {
        use core::cmp::Ordering;

        if self.cmp_u64(2) == Ordering::Less {
            return false;
        }

        if self.is_even() {
            return self.cmp_u64(2) == Ordering::Equal;
        }

        if self.cmp_u64(7) != Ordering::Greater {
            return true;
        }

        let mut p: u64 = 3;

        loop {
            if p > 10000 {
                // Thought to be impossible.
                return false;
            }

            if limit != 0 && p > limit {
                return false;
            }

            // d = p^2 - 4
            let d = BigNum::from_u64(p * p - 4);

            match d.jacobi(self) {
                -1 => break,
                0 => {
                    // d shares a factor: prime only if n == p + 2.
                    return self.cmp_u64(p + 2) == Ordering::Equal;
                }
                _ => {}
            }

            if p == 40 {
                // A square passes parameter selection forever.
                if self.is_perfect_square() {
                    return false;
                }
            }

            p += 1;
        }

        // n + 1 == 2^r * s with s odd.
        let mut s = self.add_u64(1);
        let r = s.ctz();

        s = s.shr_trunc(r);

        let nm2 = self.sub_u64(2);

        // V_s and V_{s+1} of the Lucas sequence with parameter p.
        let mut vk = BigNum::from_u64(2);
        let mut vk1 = BigNum::from_u64(p);

        for i in (0..=s.bit_len()).rev() {
            if s.tstbit(i) {
                // vk = vk * vk1 - p, vk1 = vk1^2 - 2
                let t1 = vk.mul(&vk1).sub_u64(p);
                vk = t1.rem_euclid(self).expect("modulus is non-zero");

                let t1 = vk1.sqr().sub_u64(2);
                vk1 = t1.rem_euclid(self).expect("modulus is non-zero");
            } else {
                // vk1 = vk1 * vk - p, vk = vk^2 - 2
                let t1 = vk1.mul(&vk).sub_u64(p);
                vk1 = t1.rem_euclid(self).expect("modulus is non-zero");

                let t1 = vk.sqr().sub_u64(2);
                vk = t1.rem_euclid(self).expect("modulus is non-zero");
            }
        }

        // V_s == +-2 implies a possible prime when additionally
        // V_s * p == 2 * V_{s+1} (mod n).
        if vk.cmp_u64(2) == Ordering::Equal || vk == nm2 {
            let t1 = vk.mul_u64(p);
            let t2 = vk1.shl(1);

            let t = t1.sub(&t2).rem_euclid(self).expect("modulus is non-zero");

            if t.is_zero() {
                return true;
            }
        }

        // Any V_{s * 2^i} == 0 for 0 <= i < r - 1 also passes.
        for _ in 0..r.saturating_sub(1) {
            if vk.is_zero() {
                return true;
            }

            if vk.cmp_u64(2) == Ordering::Equal {
                return false;
            }

            let t1 = vk.sqr().sub_u64(2);
            vk = t1.rem_euclid(self).expect("modulus is non-zero");
        }

        false
    }

    /// Baillie-PSW: small-prime table, evenness, primorial trial
    /// division, Miller-Rabin (`rounds + 1` with base 2 forced), then the
    /// strong Lucas test. No known composite passes.
    pub fn probab_prime<R: Rng>(&self, rounds: u32, rng: &mut R) -> Result<bool, BnError> {
        // No negatives (or zero).
        if self.sign() <= 0 {
            return Ok(false);
        }

        // Small inputs answer from the table.
        if self.size() == 1 && self.getlimbn(0) < 1024 {
            return Ok(nat::tstbit(&PRIMES, self.getlimbn(0) as usize));
        }

        // No even numbers.
        if self.is_even() {
            return Ok(false);
        }

        // Trial division.
        let (ra, rb) = mod_primorial(self);

        if primorial_composite(ra, rb) {
            return Ok(false);
        }

        if !self.miller_rabin(rounds + 1, true, rng)? {
            return Ok(false);
        }

        if !self.lucas_prime(0) {
            return Ok(false);
        }

        Ok(true)
    }

    /// Uniform random prime of exactly `bits` bits: the top two bits and
    /// the low bit are forced, candidates advance by even deltas until the
    /// primorial residues clear the first 16 primes, then Baillie-PSW
    /// decides. Restarts on bit-length loss.
    pub fn randprime<R: Rng>(bits: usize, rng: &mut R) -> Result<BigNum, BnError> {
        const MAX_DELTA: u64 = 1 << 20;

        assert!(bits > 1);

        loop {
            let mut z = BigNum::urandomb(bits, rng)?;

            z.setbit(bits - 1);
            z.setbit(bits - 2);
            z.setbit(0);

            if bits > 6 {
                let (ra, rb) = mod_primorial(&z);
                let mut delta: u64 = 0;

                while delta < MAX_DELTA {
                    let r = ra + delta as Limb;

                    if r % 3 == 0
                        || r % 5 == 0
                        || r % 7 == 0
                        || r % 11 == 0
                        || r % 13 == 0
                        || r % 17 == 0
                        || r % 19 == 0
                        || r % 23 == 0
                        || r % 37 == 0
                    {
                        delta += 2;
                        continue;
                    }

                    let r = rb + delta as Limb;

                    if r % 29 == 0
                        || r % 31 == 0
                        || r % 41 == 0
                        || r % 43 == 0
                        || r % 47 == 0
                        || r % 53 == 0
                    {
                        delta += 2;
                        continue;
                    }

                    z = z.add_u64(delta);
                    break;
                }

                if z.bit_len() != bits {
                    continue;
                }
            }

            if !z.probab_prime(20, rng)? {
                continue;
            }

            return Ok(z);
        }
    }

    /// The smallest probable prime strictly greater than `self`.
    pub fn nextprime<R: Rng>(&self, rng: &mut R) -> Result<BigNum, BnError> {
        use core::cmp::Ordering;

        if self.cmp_u64(2) == Ordering::Less {
            return Ok(BigNum::from_u64(2));
        }

        let mut z = self.add_u64(1 + self.is_odd() as u64);

        while !z.probab_prime(20, rng)? {
            z = z.add_u64(2);
        }

        Ok(z)
    }

    /// Bounded prime search: at most `m` candidates upward from `self`.
    /// Fails with [`BnError::PrimeGenFail`] when the bound is exhausted.
    pub fn findprime<R: Rng>(&self, m: u64, rng: &mut R) -> Result<BigNum, BnError> {
        let mut z = self.clone();
        let mut m = m;

        if z.is_even() {
            z = z.add_u64(1);

            if m == 0 {
                return Err(BnError::PrimeGenFail);
            }

            m -= 1;
        }

        let m = m / 2 + 1;

        for _ in 0..m {
            if z.probab_prime(20, rng)? {
                return Ok(z);
            }

            z = z.add_u64(2);
        }

        Err(BnError::PrimeGenFail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rand::testutil::XorShift;

    fn naive_prime(n: usize) -> bool {
        if n < 2 {
            return false;
        }

        let mut p = 2;

        while p * p <= n {
            if n % p == 0 {
                return false;
            }

            p += 1;
        }

        true
    }

    #[test]
    fn test_primes_bitmap_matches_trial_division() {
        for n in 0..1024 {
            assert_eq!(nat::tstbit(&PRIMES, n), naive_prime(n), "n = {n}");
        }
    }

    #[test]
    fn test_sieve_beyond_table() {
        let sp = sieve(2100);

        for n in 0..=2100usize {
            assert_eq!(nat::tstbit(&sp, n), naive_prime(n), "n = {n}");
        }
    }

    #[test]
    fn test_mod_primorial() {
        let x = BigNum::from_u64(123456789);
        let (ra, rb) = mod_primorial(&x);

        for p in [3u64, 5, 7, 11, 13, 17, 19, 23, 37] {
            assert_eq!(ra as u64 % p, 123456789 % p, "mod {p}");
        }

        for p in [29u64, 31, 41, 43, 47, 53] {
            assert_eq!(rb as u64 % p, 123456789 % p, "mod {p}");
        }
    }

    #[test]
    fn test_probab_prime_small() {
        let mut rng = XorShift(1);

        for p in [2u64, 3, 5, 7, 97, 251, 1009, 65537, 1000003] {
            assert!(
                BigNum::from_u64(p).probab_prime(10, &mut rng).unwrap(),
                "{p} is prime"
            );
        }

        for c in [0u64, 1, 4, 9, 15, 1024, 65535, 1000001, 2047] {
            assert!(
                !BigNum::from_u64(c).probab_prime(10, &mut rng).unwrap(),
                "{c} is composite"
            );
        }
    }

    #[test]
    fn test_probab_prime_negative() {
        let mut rng = XorShift(2);

        assert!(!BigNum::from_i64(-7).probab_prime(10, &mut rng).unwrap());
    }

    #[test]
    fn test_mersenne_primes() {
        let mut rng = XorShift(3);

        // 2^61 - 1 and 2^127 - 1 are prime.
        let m61 = BigNum::from_u64((1u64 << 61) - 1);
        assert!(m61.probab_prime(5, &mut rng).unwrap());

        let m127 = BigNum::from_u64(1)
            .shl(127)
            .sub_u64(1);
        assert!(m127.probab_prime(5, &mut rng).unwrap());

        // 2^64 + 1 == 274177 * 67280421310721.
        let f = BigNum::from_u64(1).shl(64).add_u64(1);
        assert!(!f.probab_prime(5, &mut rng).unwrap());
    }

    #[test]
    fn test_miller_rabin_strong_pseudoprime() {
        let mut rng = XorShift(4);

        // 2047 == 23 * 89 passes base 2 but not the full stack.
        let n = BigNum::from_u64(2047);

        assert!(n.miller_rabin(1, true, &mut rng).unwrap());
        assert!(!n.lucas_prime(0));
        assert!(!n.probab_prime(10, &mut rng).unwrap());
    }

    #[test]
    fn test_lucas_prime() {
        for p in [3u64, 5, 101, 1009, 10007] {
            assert!(BigNum::from_u64(p).lucas_prime(0), "{p}");
        }

        // No odd composite below 1000 slips through.
        for n in (9..1000usize).step_by(2) {
            if !naive_prime(n) {
                assert!(!BigNum::from_u64(n as u64).lucas_prime(0), "{n}");
            }
        }
    }

    #[test]
    fn test_nextprime() {
        let mut rng = XorShift(5);

        assert_eq!(BigNum::zero().nextprime(&mut rng).unwrap().to_u64(), 2);
        assert_eq!(BigNum::from_u64(2).nextprime(&mut rng).unwrap().to_u64(), 3);
        assert_eq!(BigNum::from_u64(8).nextprime(&mut rng).unwrap().to_u64(), 11);
        assert_eq!(BigNum::from_u64(97).nextprime(&mut rng).unwrap().to_u64(), 101);
        assert_eq!(
            BigNum::from_u64(1000000).nextprime(&mut rng).unwrap().to_u64(),
            1000003
        );
    }

    #[test]
    fn test_findprime() {
        let mut rng = XorShift(6);

        let z = BigNum::from_u64(90).findprime(10, &mut rng).unwrap();
        assert_eq!(z.to_u64(), 97);

        // Too few steps to reach one.
        assert!(matches!(
            BigNum::from_u64(890).findprime(2, &mut rng),
            Err(BnError::PrimeGenFail)
        ));
    }

    #[test]
    fn test_randprime() {
        let mut rng = XorShift(7);

        for bits in [8usize, 16, 48] {
            let p = BigNum::randprime(bits, &mut rng).unwrap();

            assert_eq!(p.bit_len(), bits, "{bits} bits");
            assert!(p.is_odd());
            assert!(p.probab_prime(10, &mut rng).unwrap());
        }
    }
}
