//! Modular exponentiation over limb slices.
//!
//! Two engines: a variable-time sliding window (division-based interior
//! for even moduli or small exponents, Montgomery interior otherwise) and
//! a constant-time fixed window for odd moduli and secret exponents.

use crate::ct;
use crate::div::{self, Divisor};
use crate::limb::{self, Limb, LIMB_BITS};
use crate::modular;
use crate::nat;

/// Sliding window width for the variable-time engines.
pub const SLIDE_WIDTH: usize = 5;

/// Table entries for the sliding window (odd powers only).
pub const SLIDE_SIZE: usize = 1 << (SLIDE_WIDTH - 1);

/// Fixed window width for the constant-time engine.
pub const FIXED_WIDTH: usize = 4;

/// Table entries for the fixed window.
pub const FIXED_SIZE: usize = 1 << FIXED_WIDTH;

/// Scratch limbs required by [`powm`].
#[inline]
pub const fn powm_itch(mn: usize) -> usize {
    // The division interior wants (6 + SLIDE_SIZE) * mn, the Montgomery
    // interior (5 + SLIDE_SIZE) * mn + 1.
    (6 + SLIDE_SIZE) * mn + 1
}

/// Scratch limbs required by [`sec_powm`].
#[inline]
pub const fn sec_powm_itch(mn: usize) -> usize {
    (5 + FIXED_SIZE) * mn + 1
}

/// Sliding window with a division interior.
fn div_powm(
    zp: &mut [Limb],
    xp: &[Limb],
    yp: &[Limb],
    mp: &[Limb],
    scratch: &mut [Limb],
) {
    let mn = mp.len();
    let yn = yp.len();
    let sn = mn * 2;

    let (ap, rest) = scratch.split_at_mut(mn);
    let (rp, rest) = rest.split_at_mut(mn);
    let (sp, rest) = rest.split_at_mut(2 * mn);
    let (tp, rest) = rest.split_at_mut(2 * mn);
    let wp = &mut rest[..SLIDE_SIZE * mn];

    let len = yn * LIMB_BITS - limb::clz(yp[yn - 1]);

    ap[..xp.len()].copy_from_slice(xp);
    nat::zero(&mut ap[xp.len()..]);

    let mut den = Divisor::new(mp, sn);

    let mut i = len;

    if yn > 2 {
        // r = a^2 mod m
        nat::sqr(sp, ap, tp);
        den.rem(rp, sp);

        // w[j] = a^(2j + 1) mod m
        wp[..mn].copy_from_slice(ap);

        for j in 1..SLIDE_SIZE {
            let (prev, cur) = wp.split_at_mut(j * mn);

            nat::mul_n(sp, &prev[(j - 1) * mn..], rp);
            den.rem(&mut cur[..mn], sp);
        }

        while i >= SLIDE_WIDTH {
            let width = SLIDE_WIDTH;
            let bits = nat::getbits(yp, i - width, width);

            if (bits as usize) < SLIDE_SIZE {
                nat::sqr(sp, rp, tp);
                den.rem(rp, sp);
                i -= 1;
                continue;
            }

            let shift = limb::ctz(bits);
            let width = width - shift;
            let bits = bits >> shift;

            if i == len {
                let w = (bits >> 1) as usize;
                rp.copy_from_slice(&wp[w * mn..(w + 1) * mn]);
            } else {
                for _ in 0..width {
                    nat::sqr(sp, rp, tp);
                    den.rem(rp, sp);
                }

                let w = (bits >> 1) as usize;
                nat::mul_n(sp, rp, &wp[w * mn..(w + 1) * mn]);
                den.rem(rp, sp);
            }

            i -= width;
        }
    } else {
        rp.copy_from_slice(ap);
        i = len - 1;
    }

    while i > 0 {
        i -= 1;

        nat::sqr(sp, rp, tp);
        den.rem(rp, sp);

        if nat::tstbit(yp, i) {
            nat::mul_n(sp, rp, ap);
            den.rem(rp, sp);
        }
    }

    if nat::cmp(rp, mp) != core::cmp::Ordering::Less {
        den.rem(zp, rp);
    } else {
        zp.copy_from_slice(rp);
    }
}

/// Sliding window with a Montgomery interior. Requires an odd modulus.
fn mont_powm(
    zp: &mut [Limb],
    xp: &[Limb],
    yp: &[Limb],
    mp: &[Limb],
    scratch: &mut [Limb],
) {
    let mn = mp.len();
    let yn = yp.len();

    let (ap, rest) = scratch.split_at_mut(mn);
    let (rp, rest) = rest.split_at_mut(mn);
    let (tp, rest) = rest.split_at_mut(2 * mn + 1);
    let (rr, rest) = rest.split_at_mut(mn);
    let wp = &mut rest[..SLIDE_SIZE * mn];

    let len = yn * LIMB_BITS - limb::clz(yp[yn - 1]);

    ap[..xp.len()].copy_from_slice(xp);
    nat::zero(&mut ap[xp.len()..]);

    let k = modular::mont(rr, mp, tp);

    // a into the Montgomery domain.
    let a = ap.to_vec();
    modular::montmul(ap, &a, rr, mp, k, tp);

    let mut i = len;

    if yn > 2 {
        modular::montmul(rp, ap, ap, mp, k, tp);

        wp[..mn].copy_from_slice(ap);

        for j in 1..SLIDE_SIZE {
            let (prev, cur) = wp.split_at_mut(j * mn);

            modular::montmul(&mut cur[..mn], &prev[(j - 1) * mn..], rp, mp, k, tp);
        }

        while i >= SLIDE_WIDTH {
            let width = SLIDE_WIDTH;
            let bits = nat::getbits(yp, i - width, width);

            if (bits as usize) < SLIDE_SIZE {
                let r = rp.to_vec();
                modular::montmul(rp, &r, &r, mp, k, tp);
                i -= 1;
                continue;
            }

            let shift = limb::ctz(bits);
            let width = width - shift;
            let bits = bits >> shift;

            if i == len {
                let w = (bits >> 1) as usize;
                rp.copy_from_slice(&wp[w * mn..(w + 1) * mn]);
            } else {
                for _ in 0..width {
                    let r = rp.to_vec();
                    modular::montmul(rp, &r, &r, mp, k, tp);
                }

                let w = (bits >> 1) as usize;
                let r = rp.to_vec();
                modular::montmul(rp, &r, &wp[w * mn..(w + 1) * mn], mp, k, tp);
            }

            i -= width;
        }
    } else {
        rp.copy_from_slice(ap);
        i = len - 1;
    }

    while i > 0 {
        i -= 1;

        let r = rp.to_vec();
        modular::montmul(rp, &r, &r, mp, k, tp);

        if nat::tstbit(yp, i) {
            let r = rp.to_vec();
            modular::montmul(rp, &r, ap, mp, k, tp);
        }
    }

    // Back out of the Montgomery domain.
    nat::set_1(rr, 1);

    let r = rp.to_vec();
    modular::montmul(rp, &r, rr, mp, k, tp);

    if nat::cmp(rp, mp) != core::cmp::Ordering::Less {
        let c = nat::sub_n_in_place(rp, mp);
        debug_assert_eq!(c, 0);

        if nat::cmp(rp, mp) != core::cmp::Ordering::Less {
            let r = rp.to_vec();
            div::rem(rp, &r, mp);
        }
    }

    zp.copy_from_slice(rp);
}

/// Variable-time `z = x^y mod m`.
///
/// Dispatch: modulus 1 gives 0, exponent 0 gives 1, base 0 gives 0;
/// multi-limb exponents with an odd modulus go through Montgomery,
/// everything else through division. Requires `x <= m` in length and a
/// stripped, non-zero modulus.
pub fn powm(
    zp: &mut [Limb],
    xp: &[Limb],
    yp: &[Limb],
    mp: &[Limb],
    scratch: &mut [Limb],
) {
    let mn = mp.len();

    assert!(mn > 0 && mp[mn - 1] != 0, "modulus must be non-zero");
    assert!(xp.len() <= mn);

    // x^y mod 1 = 0
    if mn == 1 && mp[0] == 1 {
        nat::zero(zp);
        return;
    }

    let yp = nat::normalized(yp);
    let xp = nat::normalized(xp);

    // x^0 mod m = 1
    if yp.is_empty() {
        nat::set_1(&mut zp[..mn], 1);
        return;
    }

    // 0^y mod m = 0
    if xp.is_empty() {
        nat::zero(zp);
        return;
    }

    if yp.len() > 1 && mp[0] & 1 != 0 {
        mont_powm(zp, xp, yp, mp, scratch);
    } else {
        // Division is faster for small exponents.
        div_powm(zp, xp, yp, mp, scratch);
    }
}

/// Constant-time `z = x^y mod m` with a fixed 4-bit window.
///
/// The modulus must be odd and `x < m`; the exponent is consumed top-down
/// in exact window chunks, each table lookup sweeping every entry. No
/// branch or memory access depends on secret values; only the operand
/// lengths (public) shape the execution.
pub fn sec_powm(
    zp: &mut [Limb],
    xp: &[Limb],
    yp: &[Limb],
    mp: &[Limb],
    scratch: &mut [Limb],
) {
    let mn = mp.len();
    let yn = yp.len();

    assert!(mn > 0 && mp[mn - 1] != 0, "modulus must be non-zero");
    assert!(mp[0] & 1 != 0, "modulus must be odd");
    assert!(xp.len() <= mn);

    let (rp, rest) = scratch.split_at_mut(mn);
    let (tp, rest) = rest.split_at_mut(2 * mn + 1);
    let (sp, rest) = rest.split_at_mut(mn);
    let (rr, rest) = rest.split_at_mut(mn);
    let wp = &mut rest[..FIXED_SIZE * mn];

    rp[..xp.len()].copy_from_slice(xp);
    nat::zero(&mut rp[xp.len()..]);

    let k = modular::mont(rr, mp, tp);

    // w[0] = 1 (Montgomery domain), w[1] = x * R, w[i] = w[i-1] * w[1].
    {
        let (w0, rest) = wp.split_at_mut(mn);

        nat::set_1(w0, 1);

        let t = w0.to_vec();
        modular::sec_montmul(w0, &t, rr, mp, k, tp);

        let (w1, _) = rest.split_at_mut(mn);
        modular::sec_montmul(w1, rp, rr, mp, k, tp);
    }

    for i in 2..FIXED_SIZE {
        let (prev, cur) = wp.split_at_mut(i * mn);

        modular::sec_montmul(
            &mut cur[..mn],
            &prev[(i - 1) * mn..],
            &prev[mn..2 * mn],
            mp,
            k,
            tp,
        );
    }

    let steps = (yn * LIMB_BITS + FIXED_WIDTH - 1) / FIXED_WIDTH;

    rp.copy_from_slice(&wp[..mn]);
    nat::zero(sp);

    for i in (0..steps).rev() {
        let b = nat::getbits(yp, i * FIXED_WIDTH, FIXED_WIDTH);

        ct::sec_tabselect(sp, wp, mn, b as usize);

        if i == steps - 1 {
            rp.copy_from_slice(sp);
        } else {
            for _ in 0..FIXED_WIDTH {
                let r = rp.to_vec();
                modular::sec_montmul(rp, &r, &r, mp, k, tp);
            }

            let r = rp.to_vec();
            modular::sec_montmul(rp, &r, sp, mp, k, tp);
        }
    }

    nat::set_1(rr, 1);
    modular::sec_montmul(zp, rp, rr, mp, k, tp);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_limbs(mut x: u128, n: usize) -> Vec<Limb> {
        let mut v = vec![0; n];
        for w in v.iter_mut() {
            *w = x as Limb;
            x >>= LIMB_BITS;
        }
        v
    }

    fn from_limbs(xp: &[Limb]) -> u128 {
        let mut x: u128 = 0;
        for &w in xp.iter().rev() {
            x = (x << LIMB_BITS) | w as u128;
        }
        x
    }

    fn modpow_u128(mut x: u128, mut y: u128, m: u128) -> u128 {
        // Word-sized reference; m small enough that x * x fits.
        let mut r: u128 = 1 % m;
        x %= m;
        while y > 0 {
            if y & 1 == 1 {
                r = r * x % m;
            }
            x = x * x % m;
            y >>= 1;
        }
        r
    }

    fn run_powm(x: u128, y: u128, m: u128, mn: usize) -> u128 {
        let xp = to_limbs(x % m, mn);
        let yp = to_limbs(y, mn);
        let mp = to_limbs(m, mn);
        let mp = nat::normalized(&mp).to_vec();

        let mut zp = vec![0; mp.len()];
        let mut scratch = vec![0; powm_itch(mp.len())];

        powm(
            &mut zp,
            &xp[..nat::strip(&xp)],
            &yp[..nat::strip(&yp)],
            &mp,
            &mut scratch,
        );

        from_limbs(&zp)
    }

    #[test]
    fn test_powm_small() {
        assert_eq!(run_powm(3, 65537, 97, 1), modpow_u128(3, 65537, 97));
        assert_eq!(run_powm(2, 10, 1000, 1), 24);
        assert_eq!(run_powm(5, 0, 13, 1), 1);
        assert_eq!(run_powm(0, 5, 13, 1), 0);
        assert_eq!(run_powm(7, 13, 1, 1), 0);
    }

    #[test]
    fn test_powm_even_modulus() {
        // Even modulus takes the division interior.
        for &(x, y, m) in &[(3u128, 1000u128, 4096u128), (7, 77, 100), (10, 10, 6)] {
            assert_eq!(run_powm(x, y, m, 1), modpow_u128(x, y, m), "{x}^{y} mod {m}");
        }
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_powm_odd_modulus_montgomery() {
        // Multi-limb exponent with an odd modulus takes Montgomery.
        let m = 0xffff_ffff_ffff_fff1u128;
        let y = u128::MAX;

        let expect = modpow_u128(3, y, m);
        let got = run_powm(3, y, m, 2);

        assert_eq!(got, expect);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_sec_powm_matches_powm() {
        let m: u128 = 0x1_0000_0000_0000_001b; // odd
        let mn = 2;
        let mp = to_limbs(m, mn);

        for &(x, y) in &[
            (2u128, 7u128),
            (0xdead_beef, 0x1234_5678_9abc_def0),
            (5, u64::MAX as u128),
        ] {
            let xp = to_limbs(x % m, mn);
            let yp = to_limbs(y, mn);

            let mut want = vec![0; mn];
            let mut scratch = vec![0; powm_itch(mn)];
            powm(
                &mut want,
                &xp[..nat::strip(&xp)],
                &yp[..nat::strip(&yp)],
                &mp,
                &mut scratch,
            );

            let mut got = vec![0; mn];
            let mut scratch = vec![0; sec_powm_itch(mn)];
            sec_powm(&mut got, &xp, &yp, &mp, &mut scratch);

            assert_eq!(got, want, "{x}^{y} mod {m}");
        }
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_powm_sliding_window_long_exponent() {
        // Exponent longer than two limbs exercises the window table.
        let m: u128 = 0xffff_ffff_ffff_fc01; // odd, one limb on 64-bit
        let mp = to_limbs(m, 1);
        let mp = nat::normalized(&mp).to_vec();
        let mn = mp.len();

        // y = 2^200-ish bit pattern spread over several limbs.
        let mut yp = vec![0 as Limb; 256 / LIMB_BITS];
        for (i, w) in yp.iter_mut().enumerate() {
            *w = (0x9e37_79b9_7f4a_7c15u64 as Limb).wrapping_mul(i as Limb + 1) | 1;
        }

        let xp = to_limbs(123456789 % m, mn);

        let mut zp = vec![0; mn];
        let mut scratch = vec![0; powm_itch(mn)];
        powm(&mut zp, &xp, &yp, &mp, &mut scratch);

        // Reference: bit-by-bit square and multiply using the same kernels.
        let mut r: u128 = 1;
        let bits = nat::bitlen(&yp);
        for i in (0..bits).rev() {
            r = r * r % m;
            if nat::tstbit(&yp, i) {
                r = r * 123456789 % m;
            }
        }

        assert_eq!(from_limbs(&zp), r);
    }
}
