//! Decoded ABI values.

/// A value decoded according to an ABI type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Bytes(Vec<u8>),
    Address([u8; 32]),
    UInt(u64),
    Int(i64),
    /// Big-endian magnitude.
    BigUint(Vec<u8>),
    /// Big-endian two's complement.
    BigInt(Vec<u8>),
    Bool(bool),
    List(Vec<AbiValue>),
    Option(Option<Box<AbiValue>>),
    Tuple(Vec<AbiValue>),
    Struct {
        name: String,
        fields: Vec<(String, AbiValue)>,
    },
    Enum {
        name: String,
        variant: String,
        discriminant: u8,
        fields: Vec<(String, AbiValue)>,
    },
    /// Values decoded from consecutive return-data slots.
    Multi(Vec<AbiValue>),
}

impl AbiValue {
    /// Look up a struct field by name.
    pub fn field(&self, name: &str) -> Option<&AbiValue> {
        match self {
            Self::Struct { fields, .. } => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Decimal rendering of any integer variant.
    pub fn to_decimal_string(&self) -> Option<String> {
        match self {
            Self::UInt(n) => Some(n.to_string()),
            Self::Int(n) => Some(n.to_string()),
            Self::BigUint(bytes) => Some(magnitude_to_decimal(bytes)),
            Self::BigInt(bytes) => Some(twos_complement_to_decimal(bytes)),
            _ => None,
        }
    }
}

fn magnitude_to_decimal(bytes: &[u8]) -> String {
    // Little-endian base-10 digits, grown as the value is shifted in.
    let mut digits: Vec<u8> = vec![0];
    for &byte in bytes {
        let mut carry = u32::from(byte);
        for digit in digits.iter_mut() {
            let acc = u32::from(*digit) * 256 + carry;
            *digit = (acc % 10) as u8;
            carry = acc / 10;
        }
        while carry > 0 {
            digits.push((carry % 10) as u8);
            carry /= 10;
        }
    }
    while digits.len() > 1 && digits.last() == Some(&0) {
        digits.pop();
    }
    digits.iter().rev().map(|d| char::from(b'0' + d)).collect()
}

fn twos_complement_to_decimal(bytes: &[u8]) -> String {
    let negative = bytes.first().is_some_and(|b| b & 0x80 != 0);
    if !negative {
        return magnitude_to_decimal(bytes);
    }
    // Negate: invert every bit, then add one.
    let mut magnitude: Vec<u8> = bytes.iter().map(|b| !b).collect();
    for byte in magnitude.iter_mut().rev() {
        let (sum, overflow) = byte.overflowing_add(1);
        *byte = sum;
        if !overflow {
            break;
        }
    }
    format!("-{}", magnitude_to_decimal(&magnitude))
}
