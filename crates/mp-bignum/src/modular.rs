//! Modular reduction machinery: Barrett, Montgomery (CIOS), weak reduce.

use crate::ct;
use crate::div;
use crate::limb::{self, Limb};
use crate::nat;

/// Scratch limbs required by [`reduce_weak`].
#[inline]
pub const fn reduce_weak_itch(n: usize) -> usize {
    n
}

/// Scratch limbs required by [`barrett`].
#[inline]
pub const fn barrett_itch(shift: usize) -> usize {
    shift + 1
}

/// Scratch limbs required by [`reduce`].
#[inline]
pub const fn reduce_itch(n: usize, shift: usize) -> usize {
    1 + shift + (shift - n + 1)
}

/// Scratch limbs required by [`mont`].
#[inline]
pub const fn mont_itch(n: usize) -> usize {
    2 * n + 1
}

/// Scratch limbs required by [`montmul`] / [`sec_montmul`].
#[inline]
pub const fn montmul_itch(n: usize) -> usize {
    2 * n
}

/// One masked conditional subtraction: `z = x - n` if `hi:x >= n`, else
/// `z = x`. No branch depends on the values. Returns whether the
/// subtraction happened.
///
/// `x` must be bounded by `2n` (one subtraction suffices).
pub fn reduce_weak(
    zp: &mut [Limb],
    xp: &[Limb],
    np: &[Limb],
    hi: Limb,
    scratch: &mut [Limb],
) -> bool {
    let n = np.len();
    let tp = &mut scratch[..n];

    let c = nat::sub_n(tp, xp, np);

    // [, c] = hi - c
    let c = (hi < c) as Limb;

    ct::cnd_select(zp, xp, tp, (c == 0) as Limb);

    c == 0
}

/// Barrett precomputation: `m = floor(B^shift / n)`.
///
/// Requires `shift >= 2 * n.len()`; `mp` receives `shift - n + 1` limbs.
pub fn barrett(mp: &mut [Limb], np: &[Limb], shift: usize, scratch: &mut [Limb]) {
    let n = np.len();
    let xn = shift + 1;

    assert!(n > 0);
    assert!(shift >= n * 2);

    let xp = &mut scratch[..xn];

    // m = B^shift / n
    nat::zero(xp);
    xp[shift] = 1;

    let mut qp = vec![0; xn - n + 1];
    div::div(&mut qp, xp, np);

    assert_eq!(nat::strip(&qp), shift - n + 1);

    mp.copy_from_slice(&qp[..shift - n + 1]);
}

/// Barrett reduction of `x` (`shift` limbs) modulo `n` using the
/// precomputed `m`: `h = (x * m) >> (shift * L)`, `q = x - h * n`, then at
/// most one masked subtraction.
pub fn reduce(
    zp: &mut [Limb],
    xp: &[Limb],
    mp: &[Limb],
    np: &[Limb],
    shift: usize,
    scratch: &mut [Limb],
) {
    let n = np.len();
    let mn = shift - n + 1;

    debug_assert_eq!(xp.len(), shift);
    debug_assert_eq!(mp.len(), mn);

    let scratch = &mut scratch[..1 + shift + mn];

    // h = x * m; only the top mn limbs survive the shift. The product is
    // laid down at offset 1 so those limbs land past the q region.
    nat::mul(&mut scratch[1..1 + shift + mn], xp, mp);

    let (qp, hp) = scratch.split_at_mut(1 + shift);
    let hp = &mut hp[..mn];

    // q = x - h * n
    nat::mul(qp, hp, np);
    nat::sub_n_from(&mut qp[..shift], xp);

    // z = q - n if q >= n
    let hi = qp[n];

    reduce_weak(zp, &qp[..n], np, hi, hp);
}

/// Montgomery precomputation for an odd modulus `m`:
/// returns `k = -m^-1 mod B` and writes `rr = B^(2n) mod m`.
pub fn mont(rp: &mut [Limb], mp: &[Limb], scratch: &mut [Limb]) -> Limb {
    let n = mp.len();

    assert!(n > 0);
    assert!(mp[0] & 1 != 0, "modulus must be odd");

    // k = -m^-1 mod B
    let k = limb::inv_mod(mp[0]).wrapping_neg();

    // rr = B^(2n) mod m
    let xn = n * 2 + 1;
    let xp = &mut scratch[..xn];

    nat::zero(xp);
    xp[n * 2] = 1;

    div::rem(rp, xp, mp);

    k
}

/// Word-by-word Montgomery multiplication interior (CIOS): accumulates
/// `x * y` and the reduction multiples of `m` into a `2n`-limb window,
/// returning the extra top carry.
fn montmul_inner(
    xp: &[Limb],
    yp: &[Limb],
    mp: &[Limb],
    k: Limb,
    tp: &mut [Limb],
) -> Limb {
    let n = mp.len();

    assert!(n > 0);

    let c2 = nat::mul_1(&mut tp[..n], xp, yp[0]);
    let u = tp[0].wrapping_mul(k);
    let c3 = nat::addmul_1(&mut tp[..n], mp, u);

    let (z, mut c1) = limb::add(c2, c3);
    tp[n] = z;

    for i in 1..n {
        let c2 = nat::addmul_1(&mut tp[i..i + n], xp, yp[i]);
        let u = tp[i].wrapping_mul(k);
        let c3 = nat::addmul_1(&mut tp[i..i + n], mp, u);

        let (cx, c2) = limb::add(c1, c2);
        let (cy, c3) = limb::add(cx, c3);

        c1 = c2 | c3;

        tp[n + i] = cy;
    }

    c1
}

/// Almost-Montgomery multiplication (variable time): the output is fully
/// reduced only after an optional final subtraction, taken when the extra
/// carry is set. The result may otherwise lie in `[0, 2m)`.
pub fn montmul(
    zp: &mut [Limb],
    xp: &[Limb],
    yp: &[Limb],
    mp: &[Limb],
    k: Limb,
    scratch: &mut [Limb],
) {
    let n = mp.len();
    let tp = &mut scratch[..2 * n];

    let c = montmul_inner(xp, yp, mp, k, tp);

    if c != 0 {
        nat::sub_n(zp, &tp[n..], mp);
    } else {
        zp.copy_from_slice(&tp[n..]);
    }
}

/// Constant-time Montgomery multiplication: the raw CIOS output goes
/// through [`reduce_weak`] unconditionally.
pub fn sec_montmul(
    zp: &mut [Limb],
    xp: &[Limb],
    yp: &[Limb],
    mp: &[Limb],
    k: Limb,
    scratch: &mut [Limb],
) {
    let n = mp.len();
    let tp = &mut scratch[..2 * n];

    let c = montmul_inner(xp, yp, mp, k, tp);
    let (lo, hi) = tp.split_at_mut(n);

    reduce_weak(zp, hi, mp, c, lo);
}
