//! A stored environment variable and its typed views.

use crate::error::EnvError;
use serde::{Deserialize, Serialize};
use stakegov_types::{Address, VarType};

/// Raw value plus its type tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVariable {
    pub var_type: VarType,
    pub value: Vec<u8>,
}

impl EnvVariable {
    /// Validate `value` against `var_type` and build the variable.
    ///
    /// Integers and `Bytes32` are big-endian words of at most 32 bytes,
    /// addresses are exactly 20 bytes, strings must be UTF-8.
    pub fn new(var_type: VarType, value: Vec<u8>) -> Result<Self, EnvError> {
        let fits = match var_type {
            VarType::Invalid => return Err(EnvError::InvalidType),
            VarType::Int | VarType::Uint | VarType::Bytes32 => value.len() <= 32,
            VarType::Address => value.len() == Address::LEN,
            VarType::Bytes => true,
            VarType::String => std::str::from_utf8(&value).is_ok(),
        };
        if !fits {
            return Err(EnvError::ValueMismatch {
                var_type,
                len: value.len(),
            });
        }
        Ok(Self { var_type, value })
    }

    /// Unsigned value, if the tag is `Uint` and it fits in 128 bits.
    pub fn as_uint(&self) -> Option<u128> {
        if self.var_type != VarType::Uint {
            return None;
        }
        let (high, low) = split_word(&self.value);
        if high.iter().any(|b| *b != 0) {
            return None;
        }
        Some(u128::from_be_bytes(low))
    }

    /// Signed two's-complement value, if the tag is `Int` and it fits in 128 bits.
    pub fn as_int(&self) -> Option<i128> {
        if self.var_type != VarType::Int {
            return None;
        }
        if self.value.is_empty() {
            return Some(0);
        }
        if self.value.len() > 32 {
            return None;
        }
        let negative = self.value[0] & 0x80 != 0;
        let fill = if negative { 0xff } else { 0x00 };
        // Sign-extend to 32 bytes, then the upper 16 must be pure sign bytes.
        let mut word = [fill; 32];
        word[32 - self.value.len()..].copy_from_slice(&self.value);
        let (high, low) = word.split_at(16);
        if high.iter().any(|b| *b != fill) || (low[0] & 0x80 != 0) != negative {
            return None;
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(low);
        Some(i128::from_be_bytes(arr))
    }

    pub fn as_address(&self) -> Option<Address> {
        if self.var_type != VarType::Address {
            return None;
        }
        Address::from_slice(&self.value).ok()
    }

    pub fn as_str(&self) -> Option<&str> {
        if self.var_type != VarType::String {
            return None;
        }
        std::str::from_utf8(&self.value).ok()
    }
}

/// Split a big-endian word into the bytes above the low 16 and the
/// zero-padded low 16 bytes.
fn split_word(value: &[u8]) -> (&[u8], [u8; 16]) {
    let cut = value.len().saturating_sub(16);
    let (high, low_src) = value.split_at(cut);
    let mut low = [0u8; 16];
    low[16 - low_src.len()..].copy_from_slice(low_src);
    (high, low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint_decodes_big_endian() {
        let var = EnvVariable::new(VarType::Uint, vec![0x03, 0xe8]).unwrap();
        assert_eq!(var.as_uint(), Some(1000));
        assert_eq!(var.as_int(), None);
    }

    #[test]
    fn uint_wider_than_128_bits_is_none() {
        let mut value = vec![0u8; 32];
        value[0] = 1;
        let var = EnvVariable::new(VarType::Uint, value).unwrap();
        assert_eq!(var.as_uint(), None);
    }

    #[test]
    fn int_decodes_negative_one_from_full_word() {
        let var = EnvVariable::new(VarType::Int, vec![0xff; 32]).unwrap();
        assert_eq!(var.as_int(), Some(-1));
    }

    #[test]
    fn int_decodes_short_positive() {
        let var = EnvVariable::new(VarType::Int, vec![0x01, 0x00]).unwrap();
        assert_eq!(var.as_int(), Some(256));
    }

    #[test]
    fn int_sign_extends_short_negative() {
        let var = EnvVariable::new(VarType::Int, vec![0xfe]).unwrap();
        assert_eq!(var.as_int(), Some(-2));
    }

    #[test]
    fn address_requires_twenty_bytes() {
        assert!(EnvVariable::new(VarType::Address, vec![1; 19]).is_err());
        let var = EnvVariable::new(VarType::Address, vec![1; 20]).unwrap();
        assert_eq!(var.as_address(), Some(Address::repeat_byte(1)));
    }

    #[test]
    fn string_must_be_utf8() {
        assert!(EnvVariable::new(VarType::String, vec![0xff, 0xfe]).is_err());
        let var = EnvVariable::new(VarType::String, b"metaverse".to_vec()).unwrap();
        assert_eq!(var.as_str(), Some("metaverse"));
    }

    #[test]
    fn word_types_cap_at_32_bytes() {
        assert!(EnvVariable::new(VarType::Bytes32, vec![0; 33]).is_err());
        assert!(EnvVariable::new(VarType::Bytes, vec![0; 33]).is_ok());
    }

    #[test]
    fn invalid_type_rejected() {
        assert!(matches!(
            EnvVariable::new(VarType::Invalid, vec![]),
            Err(EnvError::InvalidType)
        ));
    }
}
