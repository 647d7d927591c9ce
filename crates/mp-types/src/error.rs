/// Big-number arithmetic errors.
#[derive(Debug, thiserror::Error)]
pub enum BnError {
    // General errors
    #[error("invalid argument")]
    InvalidArg,
    #[error("operation not supported")]
    NotSupported,

    // Arithmetic errors
    #[error("division by zero")]
    DivisionByZero,
    #[error("no modular inverse")]
    NoInverse,
    #[error("no square root in field")]
    NoSquareRoot,
    #[error("modulus must be odd")]
    EvenModulus,
    #[error("negative exponent without inverse")]
    NegativeExponent,

    // Conversion errors
    #[error("invalid digit for base")]
    InvalidDigit,
    #[error("unsupported base: {0}")]
    InvalidBase(u32),
    #[error("buffer length not enough: need {need}, got {got}")]
    BufferTooSmall { need: usize, got: usize },

    // Randomness errors
    #[error("random generation failed")]
    RandGenFail,
    #[error("prime generation failed")]
    PrimeGenFail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_simple_variants() {
        assert_eq!(BnError::InvalidArg.to_string(), "invalid argument");
        assert_eq!(BnError::DivisionByZero.to_string(), "division by zero");
        assert_eq!(BnError::NoInverse.to_string(), "no modular inverse");
        assert_eq!(
            BnError::NoSquareRoot.to_string(),
            "no square root in field"
        );
        assert_eq!(BnError::EvenModulus.to_string(), "modulus must be odd");
        assert_eq!(BnError::InvalidDigit.to_string(), "invalid digit for base");
        assert_eq!(BnError::RandGenFail.to_string(), "random generation failed");
    }

    #[test]
    fn test_error_structured_variants() {
        assert_eq!(BnError::InvalidBase(63).to_string(), "unsupported base: 63");

        let e = BnError::BufferTooSmall { need: 32, got: 16 };
        assert_eq!(e.to_string(), "buffer length not enough: need 32, got 16");
    }

    #[test]
    fn test_error_debug_impl() {
        let e = BnError::NoInverse;
        let dbg = format!("{:?}", e);
        assert!(dbg.contains("NoInverse"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BnError>();
    }
}
