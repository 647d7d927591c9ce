#![no_main]
use libfuzzer_sys::fuzz_target;
use mp_bignum::BigNum;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = core::str::from_utf8(data) {
        for base in [0u32, 2, 10, 16, 62] {
            if let Ok(x) = BigNum::from_str_radix(s, base) {
                let b = if base == 0 { 10 } else { base };
                let out = x.to_str_radix(b);
                let back = BigNum::from_str_radix(&out, b).unwrap();
                assert_eq!(back, x);
            }
        }
    }
});
