//! GCD, extended GCD, modular inverse, quadratic symbols and modular
//! exponentiation on [`BigNum`].

use core::cmp::Ordering;

use mp_types::BnError;

use crate::bignum::BigNum;
use crate::limb::Limb;
use crate::ntheory;
use crate::powm;

impl BigNum {
    /*
     * GCD
     */

    /// Greatest common divisor, always non-negative.
    pub fn gcd(&self, other: &BigNum) -> BigNum {
        if self.is_zero() {
            return other.abs();
        }

        if other.is_zero() {
            return self.abs();
        }

        let (x, y) = if self.size() >= other.size() {
            (self, other)
        } else {
            (other, self)
        };

        let mut zp = vec![0; y.size()];
        let zn = ntheory::gcd(&mut zp, x.mag(), y.mag());

        zp.truncate(zn);

        BigNum::from_limbs(zp)
    }

    /// GCD against a scalar. For `y == 0` the result is `|self|`, reported
    /// as 0 when it does not fit.
    pub fn gcd_u64(&self, y: u64) -> u64 {
        if self.is_zero() {
            return y;
        }

        if y == 0 {
            if self.fits_u64() || self.neg().fits_u64() {
                return self.to_u64();
            }

            return 0;
        }

        match Limb::try_from(y) {
            Ok(yl) => ntheory::gcd_1(self.mag(), yl) as u64,
            Err(_) => self.gcd(&BigNum::from_u64(y)).to_u64(),
        }
    }

    /// Least common multiple, always non-negative.
    pub fn lcm(&self, other: &BigNum) -> BigNum {
        if self.is_zero() || other.is_zero() {
            return BigNum::zero();
        }

        let g = self.gcd(other);
        let t = self.quo(&g).expect("gcd is non-zero");

        other.mul(&t).abs()
    }

    /// LCM against a scalar.
    pub fn lcm_u64(&self, y: u64) -> BigNum {
        if self.is_zero() || y == 0 {
            return BigNum::zero();
        }

        self.mul_u64(y / self.gcd_u64(y)).abs()
    }

    /*
     * Extended GCD
     */

    /// Extended GCD by Knuth's right-shift binary Algorithm L: returns
    /// `(g, s, t)` with `g = s * self + t * other` and `g >= 0`.
    ///
    /// Cofactors are halved under conditional modular adjustment so they
    /// stay integral throughout.
    pub fn gcdext(&self, other: &BigNum) -> (BigNum, BigNum, BigNum) {
        if self.is_zero() {
            return (
                other.abs(),
                BigNum::zero(),
                BigNum::from_i64(other.sign() as i64),
            );
        }

        if other.is_zero() {
            return (
                self.abs(),
                BigNum::from_i64(self.sign() as i64),
                BigNum::zero(),
            );
        }

        let mut u = self.abs();
        let mut v = other.abs();

        // a * u + b * v == u
        let mut a = BigNum::one();
        let mut b = BigNum::zero();

        // c * u + d * v == v
        let mut c = BigNum::zero();
        let mut d = BigNum::one();

        let shift = u.ctz().min(v.ctz());

        u = u.shr_trunc(shift);
        v = v.shr_trunc(shift);

        let up = u.clone();
        let vp = v.clone();

        while !u.is_zero() {
            let uz = u.ctz();
            let vz = v.ctz();

            u = u.shr_trunc(uz);
            v = v.shr_trunc(vz);

            for _ in 0..uz {
                if a.is_odd() || b.is_odd() {
                    a = a.add(&vp);
                    b = b.sub(&up);
                }

                a = a.shr_trunc(1);
                b = b.shr_trunc(1);
            }

            for _ in 0..vz {
                if c.is_odd() || d.is_odd() {
                    c = c.add(&vp);
                    d = d.sub(&up);
                }

                c = c.shr_trunc(1);
                d = d.shr_trunc(1);
            }

            if u.cmp_abs(&v) != Ordering::Less {
                u = u.sub(&v);
                a = a.sub(&c);
                b = b.sub(&d);
            } else {
                v = v.sub(&u);
                c = c.sub(&a);
                d = d.sub(&b);
            }
        }

        if self.is_negative() {
            c = c.neg();
        }

        if other.is_negative() {
            d = d.neg();
        }

        (v.shl(shift), c, d)
    }

    /*
     * Modular Inverse
     */

    /// `self^-1 mod y`, in `[0, |y|)`. Fails exactly when
    /// `gcd(self, y) != 1`.
    ///
    /// Odd moduli run Penk's right-shift EGCD; even moduli fall back to
    /// the full extended GCD.
    pub fn invert(&self, y: &BigNum) -> Result<BigNum, BnError> {
        if self.is_zero() || y.is_zero() {
            return Err(BnError::NoInverse);
        }

        if y.cmp_abs_u64(1) == Ordering::Equal {
            return Err(BnError::NoInverse);
        }

        if y.is_odd() {
            let reduced;

            let x = if self.is_negative() || self.cmp_abs(y) != Ordering::Less {
                reduced = self.rem_euclid(y).expect("modulus is non-zero");
                &reduced
            } else {
                self
            };

            let mut zp = vec![0; y.size()];

            if !ntheory::invert(&mut zp, x.mag(), y.mag()) {
                return Err(BnError::NoInverse);
            }

            Ok(BigNum::from_limbs(zp))
        } else {
            let (g, s, _) = self.gcdext(y);

            if !g.is_one() {
                return Err(BnError::NoInverse);
            }

            s.rem_euclid(y)
        }
    }

    /*
     * Quadratic Symbols
     */

    /// Jacobi symbol `(self / y)`. Panics unless `y` is odd and non-zero.
    pub fn jacobi(&self, y: &BigNum) -> i32 {
        assert!(!y.is_zero() && y.is_odd(), "jacobi: y must be odd");

        let reduced;

        let x = if self.is_negative() || self.cmp_abs(y) != Ordering::Less {
            reduced = self.rem_euclid(y).expect("modulus is non-zero");
            &reduced
        } else {
            self
        };

        let mut j = ntheory::jacobi(x.mag(), y.mag());

        if self.is_negative() && y.is_negative() {
            j = -j;
        }

        j
    }

    /// Legendre symbol: Jacobi restricted to positive odd `p`.
    pub fn legendre(&self, p: &BigNum) -> i32 {
        assert!(!p.is_negative(), "legendre: p must be positive");

        self.jacobi(p)
    }

    /// Kronecker symbol: the Jacobi symbol extended to even and negative
    /// `y` by stripping factors of two against a residue table.
    pub fn kronecker(&self, y: &BigNum) -> i32 {
        const TABLE: [i32; 8] = [0, 1, 0, -1, 0, -1, 0, 1];

        if self.is_zero() {
            return (y.cmp_abs_u64(1) == Ordering::Equal) as i32;
        }

        if y.is_zero() {
            return (self.cmp_abs_u64(1) == Ordering::Equal) as i32;
        }

        if self.is_even() && y.is_even() {
            return 0;
        }

        let bits = y.ctz();

        if bits > 0 {
            let t = y.shr_trunc(bits);
            let mut k = self.jacobi(&t);

            if bits & 1 == 1 {
                k *= TABLE[(self.getlimbn(0) & 7) as usize];
            }

            k
        } else {
            self.jacobi(y)
        }
    }

    /// Kronecker symbol against a scalar.
    pub fn kronecker_u64(&self, y: u64) -> i32 {
        self.kronecker(&BigNum::from_u64(y))
    }

    /// Kronecker symbol against a signed scalar.
    pub fn kronecker_i64(&self, y: i64) -> i32 {
        self.kronecker(&BigNum::from_i64(y))
    }

    /// Kronecker symbol with a scalar numerator.
    pub fn u64_kronecker(x: u64, y: &BigNum) -> i32 {
        BigNum::from_u64(x).kronecker(y)
    }

    /// Kronecker symbol with a signed scalar numerator.
    pub fn i64_kronecker(x: i64, y: &BigNum) -> i32 {
        BigNum::from_i64(x).kronecker(y)
    }

    /*
     * Factor Removal
     */

    /// Divide out every factor of `y`, returning the reduced value and the
    /// multiplicity. Powers of two reduce to a shift by `ctz`.
    pub fn remove(&self, y: &BigNum) -> (BigNum, usize) {
        assert!(!y.is_zero(), "remove: zero factor");

        let w = y.getlimbn(0);

        if self.is_zero() || (y.size() == 1 && w == 1) {
            return (self.clone(), 0);
        }

        if y.size() == 1 && w & (w - 1) == 0 {
            let b = crate::limb::bitlen(w - 1);
            let c = self.ctz() / b.max(1);

            let mut z = self.shr_trunc(c * b);

            if y.is_negative() && c & 1 == 1 {
                z = z.neg();
            }

            return (z, c);
        }

        let mut n = self.clone();
        let mut c = 0;

        while !n.is_zero() {
            let (q, r) = n.div_rem(y).expect("factor is non-zero");

            if !r.is_zero() {
                break;
            }

            n = q;
            c += 1;
        }

        (n, c)
    }

    /*
     * Modular Exponentiation
     */

    fn powm_inner(&self, y: &BigNum, m: &BigNum) -> BigNum {
        let mn = m.size();
        let mut zp = vec![0; mn];
        let mut scratch = vec![0; powm::powm_itch(mn)];

        powm::powm(&mut zp, self.mag(), y.mag(), m.mag(), &mut scratch);

        BigNum::from_limbs(zp)
    }

    /// `self^y mod m`, non-negative. A negative exponent inverts first and
    /// fails when no inverse exists; a zero modulus fails.
    pub fn powm(&self, y: &BigNum, m: &BigNum) -> Result<BigNum, BnError> {
        if m.is_zero() {
            return Err(BnError::DivisionByZero);
        }

        if y.is_negative() {
            let t = self.invert(m)?;

            return Ok(t.powm_inner(y, m));
        }

        if self.is_negative() || self.cmp_abs(m) != Ordering::Less {
            let t = self.rem_euclid(m)?;

            Ok(t.powm_inner(y, m))
        } else {
            Ok(self.powm_inner(y, m))
        }
    }

    /// `self^y mod m` for a scalar exponent.
    pub fn powm_u64(&self, y: u64, m: &BigNum) -> Result<BigNum, BnError> {
        self.powm(&BigNum::from_u64(y), m)
    }

    /// Constant-time `self^y mod m` through the fixed-window engine.
    ///
    /// Requires an odd modulus and a non-negative exponent; the execution
    /// profile depends only on operand lengths.
    pub fn powm_sec(&self, y: &BigNum, m: &BigNum) -> Result<BigNum, BnError> {
        if y.is_negative() {
            return Err(BnError::NegativeExponent);
        }

        if m.is_zero() {
            return Err(BnError::DivisionByZero);
        }

        if m.is_even() {
            return Err(BnError::EvenModulus);
        }

        let reduced;

        let x = if self.is_negative() || self.cmp_abs(m) != Ordering::Less {
            reduced = self.rem_euclid(m)?;
            &reduced
        } else {
            self
        };

        let mn = m.size();
        let mut zp = vec![0; mn];
        let mut scratch = vec![0; powm::sec_powm_itch(mn)];

        powm::sec_powm(&mut zp, x.mag(), y.mag(), m.mag(), &mut scratch);

        Ok(BigNum::from_limbs(zp))
    }
}
