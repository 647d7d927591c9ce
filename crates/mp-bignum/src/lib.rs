#![forbid(unsafe_code)]
#![doc = "Arbitrary-precision integer arithmetic for the mp workspace."]
//!
//! Two surfaces:
//!
//! - The limb-slice kernels ([`nat`], [`div`], [`modular`], [`powm`],
//!   [`ntheory`], [`ct`], [`codec`]) operate on caller-owned buffers and
//!   never allocate output storage; cryptographic callers drive these
//!   directly.
//! - [`BigNum`] is the growable signed integer on top, covering the full
//!   arithmetic, bitwise, number-theoretic, primality and conversion
//!   surface.

pub mod codec;
pub mod ct;
pub mod div;
pub mod limb;
pub mod modular;
pub mod nat;
pub mod ntheory;
pub mod powm;
pub mod rand;

mod bignum;
mod bits;
mod gcd;
mod ops;
mod prime;
mod series;
mod sqrtm;

pub use bignum::BigNum;
pub use codec::Endian;
pub use limb::{Limb, LIMB_BITS, LIMB_BYTES};
pub use rand::{OsRng, Rng};

pub use mp_types::BnError;
