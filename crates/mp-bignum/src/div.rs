//! The division engine.
//!
//! Small divisors go through the 2-by-1 (one limb) or 3-by-2 (two limb)
//! reciprocal divisions; anything larger runs Knuth's Algorithm D with the
//! reciprocal primitive in place of hardware division. The `div-3by2`
//! cargo feature switches the large engine to the 3-by-2 variant.
//!
//! Exact division by a single limb uses the multiplicative inverse of the
//! odd part of the divisor modulo the limb base, so no quotient estimation
//! is needed at all.

use crate::limb::{self, Limb, LIMB_BITS};
use crate::nat;

/// A divisor precomputed for a running division: normalized limbs, the
/// reciprocal of the top limb(s), the normalization shift, and scratch for
/// the shifted numerator.
///
/// Created at the entry of a divmod, used by that divmod, and dropped on
/// exit.
pub struct Divisor {
    vp: Vec<Limb>,
    up: Vec<Limb>,
    inv: Limb,
    shift: usize,
}

impl Divisor {
    /// Precompute for an `nn`-limb numerator. Panics on a zero divisor
    /// (empty, or top limb zero).
    pub fn new(dp: &[Limb], nn: usize) -> Self {
        let dn = dp.len();

        assert!(dn > 0 && dp[dn - 1] != 0, "division by zero");
        assert!(nn >= dn);

        let shift = limb::clz(dp[dn - 1]);
        let mut vp = vec![0; dn];

        if shift != 0 {
            nat::lshift(&mut vp, dp, shift);
        } else {
            vp.copy_from_slice(dp);
        }

        let inv = if dn == 1 {
            limb::inv_2by1(vp[0])
        } else if dn == 2 || cfg!(feature = "div-3by2") {
            limb::inv_3by2(vp[dn - 1], vp[dn - 2])
        } else {
            limb::inv_2by1(vp[dn - 1])
        };

        Divisor {
            vp,
            up: vec![0; nn + 1],
            inv,
            shift,
        }
    }

    /// Divisor size in limbs.
    #[inline]
    pub fn size(&self) -> usize {
        self.vp.len()
    }

    /// `n / d` and `n mod d`. The quotient needs `nn - dn + 1` limbs, the
    /// remainder `dn`.
    pub fn divmod(
        &mut self,
        qp: Option<&mut [Limb]>,
        rp: Option<&mut [Limb]>,
        np: &[Limb],
    ) {
        let dn = self.vp.len();

        assert!(np.len() >= dn);
        assert!(np.len() + 1 <= self.up.len());

        if dn == 1 {
            let r = divmod_small_2by1(qp, np, self.vp[0], self.inv, self.shift);

            if let Some(rp) = rp {
                rp[0] = r;
            }
        } else if dn == 2 {
            divmod_small_3by2(
                qp, rp, np, self.vp[1], self.vp[0], self.inv, self.shift,
                &mut self.up,
            );
        } else {
            #[cfg(feature = "div-3by2")]
            divmod_large_3by2(qp, rp, np, &self.vp, &mut self.up, self.inv, self.shift);

            #[cfg(not(feature = "div-3by2"))]
            divmod_large_2by1(qp, rp, np, &self.vp, &mut self.up, self.inv, self.shift);
        }
    }

    /// Remainder only.
    #[inline]
    pub fn rem(&mut self, rp: &mut [Limb], np: &[Limb]) {
        self.divmod(None, Some(rp), np);
    }
}

/// A normalized single-limb divisor with its 2-by-1 reciprocal, for
/// repeated division by the same small value.
pub(crate) struct Reciprocal {
    d: Limb,
    inv: Limb,
    shift: usize,
}

impl Reciprocal {
    pub fn new(d: Limb) -> Self {
        assert!(d != 0, "division by zero");

        let shift = limb::clz(d);
        let d = d << shift;

        Reciprocal {
            d,
            inv: limb::inv_2by1(d),
            shift,
        }
    }

    /// In-place `t /= d`, returning the remainder.
    pub fn divmod_in_place(&self, tp: &mut [Limb]) -> Limb {
        let mut r: Limb = 0;

        for j in (0..tp.len()).rev() {
            let mut n1 = r;
            let mut n0 = tp[j];

            if self.shift != 0 {
                n1 = (n1 << self.shift) | (n0 >> (LIMB_BITS - self.shift));
                n0 <<= self.shift;
            }

            let (q, k) = limb::div_2by1(n1, n0, self.d, self.inv);

            r = k >> self.shift;
            tp[j] = q;
        }

        r
    }

    /// Remainder of `x / d` without storing a quotient.
    pub fn rem(&self, xp: &[Limb]) -> Limb {
        let mut r: Limb = 0;

        for j in (0..xp.len()).rev() {
            let mut n1 = r;
            let mut n0 = xp[j];

            if self.shift != 0 {
                n1 = (n1 << self.shift) | (n0 >> (LIMB_BITS - self.shift));
                n0 <<= self.shift;
            }

            let (_, k) = limb::div_2by1(n1, n0, self.d, self.inv);

            r = k >> self.shift;
        }

        r
    }
}

/// Möller & Granlund, Algorithm 7: sequential 2-by-1 division of the whole
/// numerator. Returns the (de-normalized) remainder.
fn divmod_small_2by1(
    mut qp: Option<&mut [Limb]>,
    np: &[Limb],
    d: Limb,
    inv: Limb,
    shift: usize,
) -> Limb {
    let mut r: Limb = 0;

    for j in (0..np.len()).rev() {
        let mut n1 = r;
        let mut n0 = np[j];

        if shift != 0 {
            n1 = (n1 << shift) | (n0 >> (LIMB_BITS - shift));
            n0 <<= shift;
        }

        let (q, k) = limb::div_2by1(n1, n0, d, inv);

        r = k >> shift;

        if let Some(qp) = qp.as_deref_mut() {
            qp[j] = q;
        }
    }

    r
}

/// Sequential 3-by-2 division for a 2-limb divisor.
#[allow(clippy::too_many_arguments)]
fn divmod_small_3by2(
    mut qp: Option<&mut [Limb]>,
    rp: Option<&mut [Limb]>,
    np: &[Limb],
    d1: Limb,
    d0: Limb,
    inv: Limb,
    shift: usize,
    up: &mut [Limb],
) {
    let nn = np.len();

    // Normalize.
    if shift != 0 {
        let c = nat::lshift(&mut up[..nn], np, shift);
        up[nn] = c;
    } else {
        up[..nn].copy_from_slice(np);
        up[nn] = 0;
    }

    let mut r1 = up[nn];
    let mut r0 = up[nn - 1];

    for j in (0..nn - 1).rev() {
        let n2 = r1;
        let n1 = r0;
        let n0 = up[j];

        let (q, k1, k0) = limb::div_3by2(n2, n1, n0, d1, d0, inv);

        r1 = k1;
        r0 = k0;

        if let Some(qp) = qp.as_deref_mut() {
            qp[j] = q;
        }
    }

    // Unnormalize.
    if let Some(rp) = rp {
        if shift != 0 {
            rp[0] = (r0 >> shift) | (r1 << (LIMB_BITS - shift));
            rp[1] = r1 >> shift;
        } else {
            rp[0] = r0;
            rp[1] = r1;
        }
    }
}

/// Knuth Algorithm D with the 2-by-1 reciprocal in place of hardware
/// division.
///
/// When the leading numerator limb equals the leading divisor limb the
/// trial quotient would overflow the limb; `qhat` is pinned to `B - 1` and
/// the add-back step corrects the overestimate.
fn divmod_large_2by1(
    mut qp: Option<&mut [Limb]>,
    rp: Option<&mut [Limb]>,
    np: &[Limb],
    vp: &[Limb],
    up: &mut [Limb],
    inv: Limb,
    shift: usize,
) {
    let nn = np.len();
    let dn = vp.len();

    // D1. Normalize.
    if shift != 0 {
        let c = nat::lshift(&mut up[..nn], np, shift);
        up[nn] = c;
    } else {
        up[..nn].copy_from_slice(np);
        up[nn] = 0;
    }

    // D2. Initialize j.
    for j in (0..=nn - dn).rev() {
        // D3. Calculate qhat.
        let mut qhat;

        if up[j + dn] == vp[dn - 1] {
            // qhat would be >= B; pin it to B - 1 and let the add-back
            // step absorb the overestimation.
            qhat = Limb::MAX;
        } else {
            let (q, mut rhat) =
                limb::div_2by1(up[j + dn], up[j + dn - 1], vp[dn - 1], inv);

            qhat = q;

            while limb::mul_gt_2(qhat, vp[dn - 2], rhat, up[j + dn - 2]) {
                qhat -= 1;
                rhat = rhat.wrapping_add(vp[dn - 1]);

                if rhat < vp[dn - 1] {
                    break;
                }
            }
        }

        // D4. Multiply and subtract.
        let c = nat::submul_1(&mut up[j..j + dn], vp, qhat);
        let (z, c) = limb::sub(up[j + dn], c);

        up[j + dn] = z;

        // D5. Test remainder.
        if c != 0 {
            // D6. Add back.
            let k = nat::add_n_in_place(&mut up[j..j + dn], vp);

            up[j + dn] = up[j + dn].wrapping_add(k);

            qhat -= 1;
        }

        if let Some(qp) = qp.as_deref_mut() {
            qp[j] = qhat;
        }

        // D7. Loop on j.
    }

    // D8. Unnormalize.
    if let Some(rp) = rp {
        if shift != 0 {
            nat::rshift(&mut rp[..dn], &up[..dn], shift);
        } else {
            rp[..dn].copy_from_slice(&up[..dn]);
        }
    }
}

/// Knuth Algorithm D on the 3-by-2 primitive.
///
/// The division primitive already yields the two-limb remainder, so the
/// multiply-subtract skips its last two iterations; on the exceptional
/// `qhat = B - 1` path the remainder genuinely occupies three limbs and the
/// extra word must take part in the subtraction.
#[cfg(feature = "div-3by2")]
fn divmod_large_3by2(
    mut qp: Option<&mut [Limb]>,
    rp: Option<&mut [Limb]>,
    np: &[Limb],
    vp: &[Limb],
    up: &mut [Limb],
    inv: Limb,
    shift: usize,
) {
    let nn = np.len();
    let dn = vp.len();
    let d1 = vp[dn - 1];
    let d0 = vp[dn - 2];

    // D1. Normalize.
    if shift != 0 {
        let c = nat::lshift(&mut up[..nn], np, shift);
        up[nn] = c;
    } else {
        up[..nn].copy_from_slice(np);
        up[nn] = 0;
    }

    // D2. Initialize j.
    for j in (0..=nn - dn).rev() {
        let n2 = up[j + dn];
        let n1 = up[j + dn - 1];
        let n0 = up[j + dn - 2];

        // D3. Calculate qhat.
        let (mut q, r2, r1, r0);

        if n2 == d1 && n1 == d0 {
            // q = B would overflow; take q = B - 1, which makes the
            // remainder (0, n0) + (d1, d0) -- potentially three limbs.
            q = Limb::MAX;
            r0 = n0.wrapping_add(d0);
            r1 = d1.wrapping_add((r0 < d0) as Limb);
            r2 = (r1 < d1) as Limb;
        } else {
            let (qq, k1, k0) = limb::div_3by2(n2, n1, n0, d1, d0, inv);

            q = qq;
            r1 = k1;
            r0 = k0;
            r2 = 0;
        }

        // D4. Multiply and subtract, reusing the remainder for the top
        // two (plus one) limbs.
        let c = nat::submul_1(&mut up[j..j + dn - 2], &vp[..dn - 2], q);

        let (z, c) = limb::sub(r0, c);
        up[j + dn - 2] = z;
        let (z, c) = limb::sub(r1, c);
        up[j + dn - 1] = z;
        let (z, c) = limb::sub(r2, c);
        up[j + dn] = z;

        // D5. Test remainder.
        if c != 0 {
            // D6. Add back.
            let k = nat::add_n_in_place(&mut up[j..j + dn], vp);

            up[j + dn] = up[j + dn].wrapping_add(k);

            q -= 1;
        }

        if let Some(qp) = qp.as_deref_mut() {
            qp[j] = q;
        }

        // D7. Loop on j.
    }

    // D8. Unnormalize.
    if let Some(rp) = rp {
        if shift != 0 {
            nat::rshift(&mut rp[..dn], &up[..dn], shift);
        } else {
            rp[..dn].copy_from_slice(&up[..dn]);
        }
    }
}

/*
 * Division
 */

/// `n / d` for a single-limb divisor; returns the remainder. The quotient,
/// when requested, needs `np.len()` limbs.
pub fn divmod_1(qp: Option<&mut [Limb]>, np: &[Limb], d: Limb) -> Limb {
    assert!(d != 0, "division by zero");

    let nn = np.len();

    if nn == 0 {
        return 0;
    }

    if nn == 1 {
        let q = np[0] / d;
        let r = np[0] - q * d;

        if let Some(qp) = qp {
            qp[0] = q;
        }

        return r;
    }

    let shift = limb::clz(d);
    let dnorm = d << shift;

    divmod_small_2by1(qp, np, dnorm, limb::inv_2by1(dnorm), shift)
}

/// Quotient of `n / d` for a single-limb divisor.
pub fn div_1(qp: &mut [Limb], np: &[Limb], d: Limb) {
    divmod_1(Some(qp), np, d);
}

/// Remainder of `n / d` for a single-limb divisor.
pub fn rem_1(np: &[Limb], d: Limb) -> Limb {
    divmod_1(None, np, d)
}

/// Full division: `qp` gets `nn - dn + 1` limbs, `rp` gets `dn`.
/// Panics on a zero divisor or `nn < dn`.
pub fn divmod(
    qp: Option<&mut [Limb]>,
    rp: Option<&mut [Limb]>,
    np: &[Limb],
    dp: &[Limb],
) {
    let mut den = Divisor::new(dp, np.len());

    den.divmod(qp, rp, np);
}

/// Quotient only.
pub fn div(qp: &mut [Limb], np: &[Limb], dp: &[Limb]) {
    divmod(Some(qp), None, np, dp);
}

/// Remainder only.
pub fn rem(rp: &mut [Limb], np: &[Limb], dp: &[Limb]) {
    divmod(None, Some(rp), np, dp);
}

/*
 * Exact Division
 */

/// `q = n / d` for single-limb `d` known to divide `n` exactly.
///
/// Strips the trailing zero bits of `d`, matches them in `n`, and divides
/// by the odd part through its inverse modulo the limb base.
pub fn divexact_1(qp: &mut [Limb], np: &[Limb], d: Limb) {
    assert!(d != 0, "division by zero");
    debug_assert_eq!(divmod_1(None, np, d), 0, "inexact division");

    let nn = np.len();

    debug_assert!(qp.len() >= nn);

    if nn == 0 {
        return;
    }

    let s = limb::ctz(d);

    if s != 0 {
        nat::rshift(&mut qp[..nn], np, s);
    } else {
        qp[..nn].copy_from_slice(np);
    }

    let d = d >> s;

    if d == 1 {
        return;
    }

    let inv = limb::inv_mod(d);
    let mut c: Limb = 0;

    for q in qp[..nn].iter_mut() {
        let (t, b) = limb::sub(*q, c);
        let z = t.wrapping_mul(inv);

        *q = z;

        let (_, hi) = limb::mul_wide(z, d);

        c = hi + b;
    }
}

/// `q = n / d` where `d` is known to divide `n` exactly. Panics if the
/// remainder is in fact non-zero.
pub fn divexact(qp: &mut [Limb], np: &[Limb], dp: &[Limb]) {
    assert!(!dp.is_empty(), "division by zero");

    let mut rp = vec![0; dp.len()];

    divmod(Some(qp), Some(&mut rp), np, dp);

    assert!(nat::is_zero(&rp), "inexact division");
}
