//! Random limb-vector generation.
//!
//! The engine never owns an entropy source: everything randomized takes an
//! [`Rng`] implementation and reports its failure to the caller.
//! [`OsRng`] is the OS-backed default.

use mp_types::BnError;

use crate::limb::{self, Limb, LIMB_BYTES};
use crate::nat;

/// Byte-level entropy source consumed by the random-integer and primality
/// paths.
pub trait Rng {
    /// Fill `dst` with random bytes.
    fn fill_bytes(&mut self, dst: &mut [u8]) -> Result<(), BnError>;
}

impl<T: Rng + ?Sized> Rng for &mut T {
    fn fill_bytes(&mut self, dst: &mut [u8]) -> Result<(), BnError> {
        (**self).fill_bytes(dst)
    }
}

/// Operating-system randomness.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRng;

impl Rng for OsRng {
    fn fill_bytes(&mut self, dst: &mut [u8]) -> Result<(), BnError> {
        getrandom::getrandom(dst).map_err(|_| BnError::RandGenFail)
    }
}

/// Fill `zp` with random limbs.
pub fn random<R: Rng>(zp: &mut [Limb], rng: &mut R) -> Result<(), BnError> {
    let mut buf = vec![0u8; zp.len() * LIMB_BYTES];

    rng.fill_bytes(&mut buf)?;

    for (z, chunk) in zp.iter_mut().zip(buf.chunks_exact(LIMB_BYTES)) {
        *z = Limb::from_le_bytes(chunk.try_into().unwrap());
    }

    Ok(())
}

/// Uniform random value in `[0, x)` by rejection sampling. Unused leading
/// limbs of `zp` are zeroed.
pub fn randomm<R: Rng>(zp: &mut [Limb], xp: &[Limb], rng: &mut R) -> Result<(), BnError> {
    let n = nat::strip(xp);

    if n > 0 {
        let s = limb::clz(xp[n - 1]);

        loop {
            random(&mut zp[..n], rng)?;

            if s > 0 {
                zp[n - 1] >>= s;
            }

            if nat::cmp(&zp[..n], &xp[..n]) == core::cmp::Ordering::Less {
                break;
            }
        }
    }

    nat::zero(&mut zp[n..]);

    Ok(())
}

impl crate::bignum::BigNum {
    /// Uniform random value of at most `bits` bits.
    pub fn urandomb<R: Rng>(bits: usize, rng: &mut R) -> Result<Self, BnError> {
        let zn = (bits + limb::LIMB_BITS - 1) / limb::LIMB_BITS;

        if zn == 0 {
            return Ok(Self::zero());
        }

        let mut zp = vec![0; zn];

        random(&mut zp, rng)?;
        nat::mask(&mut zp, bits);

        Ok(Self::from_limbs(zp))
    }

    /// Uniform random value in `[0, |self|)`, carrying this value's sign.
    pub fn urandomm<R: Rng>(&self, rng: &mut R) -> Result<Self, BnError> {
        let xn = self.size();

        if xn == 0 {
            return Ok(Self::zero());
        }

        let mut zp = vec![0; xn];

        randomm(&mut zp, self.mag(), rng)?;

        let mut z = Self::from_limbs(zp);
        z.set_negative(self.is_negative());

        Ok(z)
    }
}
