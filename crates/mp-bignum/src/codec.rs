//! Byte and string conversion for limb vectors.
//!
//! Byte import/export supports little-, big- and host-endian layouts;
//! string conversion covers bases 2 through 62 with power-of-two bases
//! going through shifts and everything else through repeated division.

use crate::div::Reciprocal;
use crate::limb::{self, Limb, LIMB_BITS, LIMB_BYTES};
use crate::nat;

/// Byte order of an imported or exported byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Least significant byte first.
    Little,
    /// The byte order of the build target.
    Host,
    /// Most significant byte first.
    Big,
}

impl Endian {
    #[inline]
    fn big(self) -> bool {
        match self {
            Endian::Little => false,
            Endian::Big => true,
            Endian::Host => cfg!(target_endian = "big"),
        }
    }
}

/// Case-insensitive digit values for bases up to 36; 36 marks an invalid
/// character.
static TABLE_36: [u8; 256] = {
    let mut t = [36u8; 256];
    let mut i = 0;

    while i < 10 {
        t[b'0' as usize + i] = i as u8;
        i += 1;
    }

    let mut i = 0;

    while i < 26 {
        t[b'A' as usize + i] = 10 + i as u8;
        t[b'a' as usize + i] = 10 + i as u8;
        i += 1;
    }

    t
};

/// Case-sensitive digit values for bases above 36 (0-9, A-Z, a-z); 62
/// marks an invalid character.
static TABLE_62: [u8; 256] = {
    let mut t = [62u8; 256];
    let mut i = 0;

    while i < 10 {
        t[b'0' as usize + i] = i as u8;
        i += 1;
    }

    let mut i = 0;

    while i < 26 {
        t[b'A' as usize + i] = 10 + i as u8;
        t[b'a' as usize + i] = 36 + i as u8;
        i += 1;
    }

    t
};

/// `'\t'`, `'\n'`, `'\v'`, `'\f'`, `'\r'`, `' '`.
#[inline]
pub(crate) fn is_space(ch: u8) -> bool {
    matches!(ch, b'\t' | b'\n' | 0x0b | 0x0c | b'\r' | b' ')
}

/// Read bytes into limbs. Unused leading limbs are zeroed; bytes beyond
/// the limb capacity are dropped from the most significant end.
pub fn import(zp: &mut [Limb], bytes: &[u8], endian: Endian) {
    let mut i = 0;

    if endian.big() {
        let mut xp = bytes;

        while i < zp.len() && xp.len() >= LIMB_BYTES {
            let (rest, tail) = xp.split_at(xp.len() - LIMB_BYTES);

            zp[i] = Limb::from_be_bytes(tail.try_into().unwrap());
            xp = rest;
            i += 1;
        }

        if i < zp.len() && !xp.is_empty() {
            let mut z: Limb = 0;

            for &b in xp {
                z = (z << 8) | b as Limb;
            }

            zp[i] = z;
            i += 1;
        }
    } else {
        let mut xp = bytes;

        while i < zp.len() && xp.len() >= LIMB_BYTES {
            let (head, rest) = xp.split_at(LIMB_BYTES);

            zp[i] = Limb::from_le_bytes(head.try_into().unwrap());
            xp = rest;
            i += 1;
        }

        if i < zp.len() && !xp.is_empty() {
            let mut z: Limb = 0;

            for &b in xp.iter().rev() {
                z = (z << 8) | b as Limb;
            }

            zp[i] = z;
            i += 1;
        }
    }

    nat::zero(&mut zp[i..]);
}

/// Write limbs as bytes, padding with zeros out to the requested length.
/// Limbs beyond the byte capacity are dropped from the most significant
/// end.
pub fn export(zp: &mut [u8], xp: &[Limb], endian: Endian) {
    let mut i = 0;

    if endian.big() {
        let mut out = &mut zp[..];

        while i < xp.len() && out.len() >= LIMB_BYTES {
            let at = out.len() - LIMB_BYTES;
            let (rest, tail) = out.split_at_mut(at);

            tail.copy_from_slice(&xp[i].to_be_bytes());
            out = rest;
            i += 1;
        }

        if i < xp.len() && !out.is_empty() {
            let mut x = xp[i];

            for b in out.iter_mut().rev() {
                *b = x as u8;
                x >>= 8;
            }
        } else {
            out.fill(0);
        }
    } else {
        let mut out = &mut zp[..];

        while i < xp.len() && out.len() >= LIMB_BYTES {
            let (head, rest) = out.split_at_mut(LIMB_BYTES);

            head.copy_from_slice(&xp[i].to_le_bytes());
            out = rest;
            i += 1;
        }

        if i < xp.len() && !out.is_empty() {
            let mut x = xp[i];

            for b in out.iter_mut() {
                *b = x as u8;
                x >>= 8;
            }
        } else {
            out.fill(0);
        }
    }
}

/// Limbs needed to parse `str` in `base` (an upper bound for non-power-of-
/// two bases is exact here because digits group into full limbs).
pub(crate) fn str_limbs(s: &str, base: u32) -> usize {
    let mut len = s.bytes().filter(|&b| !is_space(b)).count();

    if len == 0 {
        len = 1;
    }

    let base = base.clamp(2, 62) as Limb;

    if base & (base - 1) == 0 {
        return (len * limb::bitlen(base - 1) + LIMB_BITS - 1) / LIMB_BITS;
    }

    let max = Limb::MAX / base;
    let mut limb_pow = base;
    let mut limb_len = 1;

    while limb_pow <= max {
        limb_pow *= base;
        limb_len += 1;
    }

    (len + limb_len - 1) / limb_len
}

/// Parse an unsigned string in `base` (2 to 62) into `zp`.
///
/// Power-of-two bases consume digits with shifts, the rest with
/// multiply-and-add. Returns false (and zeros `zp`) on an invalid digit or
/// overflow of the destination.
pub fn set_str(zp: &mut [Limb], s: &str, base: u32) -> bool {
    if !(2..=62).contains(&base) {
        nat::zero(zp);
        return false;
    }

    let table: &[u8; 256] = if base <= 36 { &TABLE_36 } else { &TABLE_62 };
    let shift = if base & (base - 1) == 0 {
        limb::bitlen(base as Limb - 1)
    } else {
        0
    };

    let mut n = 0;

    for ch in s.bytes() {
        if is_space(ch) {
            continue;
        }

        let d = table[ch as usize] as u32;

        if d >= base {
            nat::zero(zp);
            return false;
        }

        let c;

        if n == 0 {
            c = d as Limb;
        } else if shift > 0 {
            c = nat::lshift_in_place(&mut zp[..n], shift);
            zp[0] |= d as Limb;
        } else {
            let hi = nat::mul_1_in_place(&mut zp[..n], base as Limb);
            c = hi + nat::add_1_in_place(&mut zp[..n], d as Limb);
        }

        if c != 0 {
            if n == zp.len() {
                nat::zero(zp);
                return false;
            }

            zp[n] = c;
            n += 1;
        }
    }

    nat::zero(&mut zp[n..]);

    true
}

const CHARSET_36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const CHARSET_62: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Render the unsigned value of `xp` in `base` (2 to 62). Zero renders as
/// `"0"`.
pub fn get_str(xp: &[Limb], base: u32) -> String {
    assert!((2..=62).contains(&base), "unsupported base");

    let xp = nat::normalized(xp);
    let xn = xp.len();

    if xn == 0 {
        return "0".to_string();
    }

    let charset = if base <= 36 { CHARSET_36 } else { CHARSET_62 };
    let mut out: Vec<u8> = Vec::with_capacity(sizeinbase(xp, base));

    if matches!(base, 2 | 4 | 16) {
        // Whole limbs split into fixed-width digits.
        let shift = limb::bitlen(base as Limb - 1);
        let digits = LIMB_BITS / shift;
        let mask = base as Limb - 1;

        for &w in &xp[..xn - 1] {
            let mut x = w;

            for _ in 0..digits {
                out.push(charset[(x & mask) as usize]);
                x >>= shift;
            }
        }

        let mut x = xp[xn - 1];

        loop {
            out.push(charset[(x & mask) as usize]);
            x >>= shift;

            if x == 0 {
                break;
            }
        }
    } else if base & (base - 1) == 0 {
        // Power-of-two digits that straddle limb boundaries.
        let bits = nat::bitlen(xp);
        let width = limb::bitlen(base as Limb - 1);
        let mut pos = 0;

        while pos < bits {
            let ch = nat::getbits(xp, pos, width);
            out.push(charset[ch as usize]);
            pos += width;
        }
    } else {
        // Repeated division by the base.
        let rec = Reciprocal::new(base as Limb);
        let mut tp = xp.to_vec();

        while !tp.is_empty() {
            let ch = rec.divmod_in_place(&mut tp);

            if tp.last() == Some(&0) {
                tp.pop();
            }

            out.push(charset[ch as usize]);
        }
    }

    out.reverse();

    String::from_utf8(out).unwrap()
}

/// Exact digit count of `xp` in `base`; 1 for zero.
pub fn sizeinbase(xp: &[Limb], base: u32) -> usize {
    assert!(base >= 2, "unsupported base");

    let xp = nat::normalized(xp);

    if xp.is_empty() {
        return 1;
    }

    if base & (base - 1) == 0 {
        let bits = nat::bitlen(xp);
        let width = limb::bitlen(base as Limb - 1);

        return (bits + width - 1) / width;
    }

    let rec = Reciprocal::new(base as Limb);
    let mut tp = xp.to_vec();
    let mut len = 0;

    while !tp.is_empty() {
        rec.divmod_in_place(&mut tp);

        if tp.last() == Some(&0) {
            tp.pop();
        }

        len += 1;
    }

    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_export_roundtrip() {
        let bytes = [0x01u8, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09];
        let zn = (bytes.len() + LIMB_BYTES - 1) / LIMB_BYTES;

        for endian in [Endian::Little, Endian::Big, Endian::Host] {
            let mut zp = vec![0; zn];
            import(&mut zp, &bytes, endian);

            let mut out = vec![0u8; bytes.len()];
            export(&mut out, &zp, endian);

            assert_eq!(out, bytes, "{endian:?}");
        }
    }

    #[test]
    fn test_import_values() {
        let mut zp = vec![0; 2];

        import(&mut zp, &[0x12, 0x34], Endian::Big);
        assert_eq!(zp, [0x1234, 0]);

        import(&mut zp, &[0x12, 0x34], Endian::Little);
        assert_eq!(zp, [0x3412, 0]);
    }

    #[test]
    fn test_export_padding() {
        let xp = [0xabcd as Limb];

        let mut out = [0u8; 4];
        export(&mut out, &xp, Endian::Big);
        assert_eq!(out, [0x00, 0x00, 0xab, 0xcd]);

        let mut out = [0u8; 4];
        export(&mut out, &xp, Endian::Little);
        assert_eq!(out, [0xcd, 0xab, 0x00, 0x00]);
    }

    #[test]
    fn test_set_str_bases() {
        let mut zp = vec![0; 2];

        assert!(set_str(&mut zp, "255", 10));
        assert_eq!(zp[0], 255);

        assert!(set_str(&mut zp, "ff", 16));
        assert_eq!(zp[0], 255);

        assert!(set_str(&mut zp, "FF", 16));
        assert_eq!(zp[0], 255);

        assert!(set_str(&mut zp, "11111111", 2));
        assert_eq!(zp[0], 255);

        assert!(set_str(&mut zp, "377", 8));
        assert_eq!(zp[0], 255);

        // Base 62 is case sensitive: 'z' is 61.
        assert!(set_str(&mut zp, "z", 62));
        assert_eq!(zp[0], 61);

        assert!(set_str(&mut zp, "Z", 62));
        assert_eq!(zp[0], 35);
    }

    #[test]
    fn test_set_str_invalid() {
        let mut zp = vec![7; 2];

        assert!(!set_str(&mut zp, "12x", 10));
        assert!(nat::is_zero(&zp));

        assert!(!set_str(&mut zp, "8", 8));
        assert!(!set_str(&mut zp, "1", 63));

        // Overflow of the destination.
        let mut zp = vec![0; 1];
        let big = "1".repeat(LIMB_BITS + 1);
        assert!(!set_str(&mut zp, &big, 2));
    }

    #[test]
    fn test_set_str_whitespace() {
        let mut zp = vec![0; 2];

        assert!(set_str(&mut zp, " 1 2\t3\n", 10));
        assert_eq!(zp[0], 123);
    }

    #[test]
    fn test_get_str_roundtrip() {
        let xp = [0xdeadbeef as Limb, 0x1234];

        for base in [2u32, 3, 8, 10, 16, 32, 36, 62] {
            let s = get_str(&xp, base);
            let mut zp = vec![0; 3];

            assert!(set_str(&mut zp, &s, base), "base {base}: {s}");
            assert_eq!(&zp[..2], &xp, "base {base}");
        }
    }

    #[test]
    fn test_get_str_zero() {
        assert_eq!(get_str(&[0, 0], 10), "0");
        assert_eq!(get_str(&[], 16), "0");
    }

    #[test]
    fn test_get_str_known_values() {
        assert_eq!(get_str(&[123456789], 10), "123456789");
        assert_eq!(get_str(&[0xff], 16), "ff");
        assert_eq!(get_str(&[8], 8), "10");
        assert_eq!(get_str(&[5], 2), "101");
    }

    #[test]
    fn test_sizeinbase() {
        assert_eq!(sizeinbase(&[0], 10), 1);
        assert_eq!(sizeinbase(&[255], 16), 2);
        assert_eq!(sizeinbase(&[256], 16), 3);
        assert_eq!(sizeinbase(&[999], 10), 3);
        assert_eq!(sizeinbase(&[1000], 10), 4);
        assert_eq!(sizeinbase(&[7], 2), 3);

        // Exact, not an over-estimate, for every base.
        for base in 2..=62u32 {
            let xp = [Limb::MAX, 3];
            assert_eq!(
                sizeinbase(&xp, base),
                get_str(&xp, base).len(),
                "base {base}"
            );
        }
    }

    #[test]
    fn test_str_limbs_bounds() {
        // Parsing must fit in the predicted limb count.
        for (s, base) in [("123456789123456789123456789", 10), ("ffffffffffffffffff", 16)] {
            let n = str_limbs(s, base);
            let mut zp = vec![0; n];

            assert!(set_str(&mut zp, s, base), "{s}");
        }
    }
}
