#![no_main]
use libfuzzer_sys::fuzz_target;
use mp_bignum::{BigNum, Endian};

fuzz_target!(|data: &[u8]| {
    for endian in [Endian::Little, Endian::Big] {
        let x = BigNum::import(data, endian);

        if !data.is_empty() {
            let out = x.export(data.len(), endian).unwrap();
            let back = BigNum::import(&out, endian);
            assert_eq!(back, x);
        }
    }
});
