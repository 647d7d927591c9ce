//! Integer sequences on [`BigNum`]: factorials, primorials, binomial
//! coefficients, Fibonacci and Lucas numbers.

use core::cmp::Ordering;

use crate::bignum::BigNum;
use crate::nat;
use crate::prime;

impl BigNum {
    /// `n!`.
    pub fn factorial(n: u64) -> BigNum {
        Self::mfactorial(n, 1)
    }

    /// Double factorial `n!!`.
    pub fn double_factorial(n: u64) -> BigNum {
        Self::mfactorial(n, 2)
    }

    /// Multifactorial `n!^(m)`: the product `n * (n - m) * (n - 2m) * ...`.
    pub fn mfactorial(n: u64, m: u64) -> BigNum {
        if n == 0 {
            return BigNum::one();
        }

        let mut z = BigNum::from_u64(n);

        if m == 0 {
            return z;
        }

        let mut n = n;

        while n > m {
            n -= m;
            z = z.mul_u64(n);
        }

        z
    }

    /// Primorial: the product of all primes up to `n` inclusive.
    pub fn primorial(n: u64) -> BigNum {
        if n < 2 {
            return BigNum::one();
        }

        let sp = prime::sieve(n);
        let mut z = BigNum::from_u64(2);
        let mut p = 3;

        while p <= n {
            if nat::tstbit(&sp, p as usize) {
                z = z.mul_u64(p);
            }

            p += 2;
        }

        z
    }

    /// Binomial coefficient `C(n, k)` for big `n`, via the negative-n
    /// identity `C(-n, k) == (-1)^k * C(n + k - 1, k)`.
    pub fn binomial(n: &BigNum, k: u64) -> BigNum {
        let mut neg = false;

        let mut m = if n.is_negative() {
            neg = k & 1 == 1;
            n.neg().add_u64(k).sub_u64(1)
        } else {
            n.clone()
        };

        if m.cmp_u64(k) == Ordering::Less {
            return BigNum::zero();
        }

        // C(n, k) == C(n, n - k)
        let mut k = k;
        let t = m.sub_u64(k);

        if t.cmp_u64(k) == Ordering::Less {
            k = t.to_u64();
        }

        let mut z = BigNum::one();

        for i in 0..k {
            z = z.mul(&m);
            z = z.quo(&BigNum::from_u64(i + 1)).expect("non-zero index");
            m = m.sub_u64(1);
        }

        if neg {
            z = z.neg();
        }

        z
    }

    /// Binomial coefficient `C(n, k)` for scalar `n`.
    pub fn binomial_uu(n: u64, k: u64) -> BigNum {
        if n < k {
            return BigNum::zero();
        }

        // C(n, k) == C(n, n - k)
        let k = k.min(n - k);
        let mut z = BigNum::one();

        for i in 0..k {
            z = z.mul_u64(n - i);
            z = z.quo(&BigNum::from_u64(i + 1)).expect("non-zero index");
        }

        z
    }

    /// Binomial coefficient for signed scalar `n`.
    pub fn binomial_iu(n: i64, k: u64) -> BigNum {
        if n < 0 {
            Self::binomial(&BigNum::from_i64(n), k)
        } else {
            Self::binomial_uu(n as u64, k)
        }
    }

    /// Fibonacci number `F(n)`.
    pub fn fibonacci(n: u64) -> BigNum {
        Self::fibonacci2(n).0
    }

    /// `(F(n), F(n - 1))` by the doubling identities
    /// `F(2k) == F(k) * (2*F(k+1) - F(k))` and
    /// `F(2k+1) == F(k)^2 + F(k+1)^2`, walking the exponent from its top
    /// bit. `F(-1)` is reported as 0.
    pub fn fibonacci2(n: u64) -> (BigNum, BigNum) {
        if n == 0 {
            return (BigNum::zero(), BigNum::zero());
        }

        let mut a = BigNum::zero();
        let mut b = BigNum::one();

        let n = n - 1;
        let bits = 64 - n.leading_zeros() as u64;

        for i in (0..bits).rev() {
            // c = a * (2b - a), d = a^2 + b^2
            let t = b.add(&b).sub(&a);
            let c = a.mul(&t);
            let d = a.sqr().add(&b.sqr());

            if (n >> i) & 1 == 1 {
                b = c.add(&d);
                a = d;
            } else {
                a = c;
                b = d;
            }
        }

        (b, a)
    }

    /// Lucas number `L(n)`.
    pub fn lucas(n: u64) -> BigNum {
        Self::lucas2(n).0
    }

    /// `(L(n), L(n - 1))` from the Fibonacci pair:
    /// `L(n) == F(n) + 2*F(n-1)` and `L(n-1) == 2*F(n) - F(n-1)`.
    /// For `n == 0` the second value is 0.
    pub fn lucas2(n: u64) -> (BigNum, BigNum) {
        if n == 0 {
            return (BigNum::from_u64(2), BigNum::zero());
        }

        let (fnn, fn1) = Self::fibonacci2(n);

        let ln1 = fnn.add(&fnn).sub(&fn1);
        let ln = fn1.add(&fn1).add(&fnn);

        (ln, ln1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factorial() {
        assert_eq!(BigNum::factorial(0).to_u64(), 1);
        assert_eq!(BigNum::factorial(1).to_u64(), 1);
        assert_eq!(BigNum::factorial(5).to_u64(), 120);
        assert_eq!(BigNum::factorial(20).to_u64(), 2432902008176640000);
        assert_eq!(
            BigNum::factorial(30).to_str_radix(10),
            "265252859812191058636308480000000"
        );
    }

    #[test]
    fn test_double_factorial() {
        assert_eq!(BigNum::double_factorial(9).to_u64(), 945);
        assert_eq!(BigNum::double_factorial(10).to_u64(), 3840);
    }

    #[test]
    fn test_mfactorial() {
        assert_eq!(BigNum::mfactorial(10, 3).to_u64(), 280);
        assert_eq!(BigNum::mfactorial(7, 0).to_u64(), 7);
    }

    #[test]
    fn test_primorial() {
        assert_eq!(BigNum::primorial(1).to_u64(), 1);
        assert_eq!(BigNum::primorial(2).to_u64(), 2);
        assert_eq!(BigNum::primorial(10).to_u64(), 210);
        assert_eq!(BigNum::primorial(13).to_u64(), 30030);

        // p(16)# == 32589158477190044730 covers the primes through 53.
        assert_eq!(
            BigNum::primorial(53).to_str_radix(10),
            "32589158477190044730"
        );
    }

    #[test]
    fn test_binomial() {
        assert_eq!(BigNum::binomial_uu(5, 2).to_u64(), 10);
        assert_eq!(BigNum::binomial_uu(12, 5).to_u64(), 792);
        assert_eq!(BigNum::binomial_uu(50, 3).to_u64(), 19600);
        assert_eq!(BigNum::binomial_uu(3, 5).to_u64(), 0);
        assert_eq!(BigNum::binomial_uu(7, 0).to_u64(), 1);

        // Pascal identity on a big n.
        let n = BigNum::from_u64(100);
        let lhs = BigNum::binomial(&n, 10);
        let rhs = BigNum::binomial_uu(99, 9).add(&BigNum::binomial_uu(99, 10));
        assert_eq!(lhs, rhs);

        // C(-2, 3) == -C(4, 3) == -4.
        assert_eq!(BigNum::binomial_iu(-2, 3).to_i64(), -4);
        assert_eq!(BigNum::binomial_iu(-2, 2).to_i64(), 3);
    }

    #[test]
    fn test_fibonacci() {
        let known = [0u64, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55];

        for (n, &f) in known.iter().enumerate() {
            assert_eq!(BigNum::fibonacci(n as u64).to_u64(), f, "F({n})");
        }

        assert_eq!(BigNum::fibonacci(20).to_u64(), 6765);
        assert_eq!(
            BigNum::fibonacci(100).to_str_radix(10),
            "354224848179261915075"
        );

        // Recurrence through the doubling formulas.
        for n in 2..40u64 {
            let (f_n, f_n1) = BigNum::fibonacci2(n);
            let f_next = BigNum::fibonacci(n + 1);

            assert_eq!(f_next, f_n.add(&f_n1), "F({} + 1)", n);
        }
    }

    #[test]
    fn test_lucas() {
        let known = [2u64, 1, 3, 4, 7, 11, 18, 29, 47, 76, 123];

        for (n, &l) in known.iter().enumerate() {
            assert_eq!(BigNum::lucas(n as u64).to_u64(), l, "L({n})");
        }

        // L(n) == F(n-1) + F(n+1).
        for n in 1..30u64 {
            let l = BigNum::lucas(n);
            let f_prev = BigNum::fibonacci(n - 1);
            let f_next = BigNum::fibonacci(n + 1);

            assert_eq!(l, f_prev.add(&f_next), "L({n})");
        }
    }
}
