//! Binary decoding of query return data.
//!
//! A query returns a list of buffers. Single-valued outputs take one buffer in
//! top-level encoding; `variadic`, `multi` and `optional` outputs spread over
//! as many buffers as they need. Inside a buffer, nested values use the nested
//! encoding: fixed-width numbers, `u32` big-endian length prefixes for
//! variable-size data, a presence byte for options and a discriminant byte
//! for enums.

use crate::error::{AbiError, Result};
use crate::schema::{Abi, FieldDef, TypeDef};
use crate::types::TypeExpr;
use crate::value::AbiValue;

impl Abi {
    /// Decode the return data of a query against `endpoint`, one value per
    /// declared output.
    pub fn decode_outputs(&self, endpoint: &str, return_data: &[Vec<u8>]) -> Result<Vec<AbiValue>> {
        let endpoint = self.endpoint(endpoint)?;
        let mut cursor = 0;
        let values = endpoint
            .outputs
            .iter()
            .map(|output| self.decode_multi(&output.ty, return_data, &mut cursor))
            .collect::<Result<Vec<_>>>()?;
        if cursor < return_data.len() {
            return Err(AbiError::UnexpectedReturnData {
                extra: return_data.len() - cursor,
            });
        }
        Ok(values)
    }

    /// Decode one value from a complete buffer in top-level encoding.
    pub fn decode_top(&self, ty: &TypeExpr, bytes: &[u8]) -> Result<AbiValue> {
        match ty {
            TypeExpr::Bytes => Ok(AbiValue::Bytes(bytes.to_vec())),
            TypeExpr::BigUint => Ok(AbiValue::BigUint(bytes.to_vec())),
            TypeExpr::BigInt => Ok(AbiValue::BigInt(bytes.to_vec())),
            TypeExpr::Address | TypeExpr::H256 if bytes.len() != 32 => {
                Err(AbiError::InvalidLength {
                    ty: ty.to_string(),
                    expected: 32,
                    actual: bytes.len(),
                })
            }
            TypeExpr::Bool => match bytes {
                [] | [0] => Ok(AbiValue::Bool(false)),
                [1] => Ok(AbiValue::Bool(true)),
                _ => Err(invalid(ty, "expected empty or a single 0/1 byte")),
            },
            TypeExpr::UInt { width } => {
                check_width(ty, *width, bytes)?;
                Ok(AbiValue::UInt(be_unsigned(bytes)))
            }
            TypeExpr::Int { width } => {
                check_width(ty, *width, bytes)?;
                Ok(AbiValue::Int(be_signed(bytes)))
            }
            TypeExpr::Option(inner) => match bytes.split_first() {
                None => Ok(AbiValue::Option(None)),
                Some((1, rest)) => {
                    let value = self.decode_whole(inner, rest)?;
                    Ok(AbiValue::Option(Some(Box::new(value))))
                }
                Some(_) => Err(invalid(ty, "expected presence byte 1")),
            },
            TypeExpr::List(item) => {
                let mut reader = Reader::new(bytes);
                let mut items = Vec::new();
                while !reader.is_empty() {
                    let before = reader.pos;
                    items.push(self.decode_nested(item, &mut reader)?);
                    if reader.pos == before {
                        return Err(invalid(ty, "zero-sized items cannot fill the buffer"));
                    }
                }
                Ok(AbiValue::List(items))
            }
            TypeExpr::Named(name) if bytes.is_empty() => match self.type_def(name)? {
                TypeDef::Enum { .. } => self.decode_whole(ty, &[0]),
                _ => self.decode_whole(ty, bytes),
            },
            TypeExpr::Variadic(_) | TypeExpr::Multi(_) | TypeExpr::Optional(_) => {
                Err(AbiError::NotSingleValue { ty: ty.to_string() })
            }
            _ => self.decode_whole(ty, bytes),
        }
    }

    /// Decode one value in nested encoding, advancing `reader`.
    fn decode_nested(&self, ty: &TypeExpr, reader: &mut Reader<'_>) -> Result<AbiValue> {
        match ty {
            TypeExpr::Bytes => {
                let len = reader.length(ty)?;
                Ok(AbiValue::Bytes(reader.take(len, ty)?.to_vec()))
            }
            TypeExpr::BigUint => {
                let len = reader.length(ty)?;
                Ok(AbiValue::BigUint(reader.take(len, ty)?.to_vec()))
            }
            TypeExpr::BigInt => {
                let len = reader.length(ty)?;
                Ok(AbiValue::BigInt(reader.take(len, ty)?.to_vec()))
            }
            TypeExpr::Address => {
                let mut address = [0u8; 32];
                address.copy_from_slice(reader.take(32, ty)?);
                Ok(AbiValue::Address(address))
            }
            TypeExpr::H256 => Ok(AbiValue::Bytes(reader.take(32, ty)?.to_vec())),
            TypeExpr::Bool => match reader.byte(ty)? {
                0 => Ok(AbiValue::Bool(false)),
                1 => Ok(AbiValue::Bool(true)),
                other => Err(invalid(ty, &format!("unexpected byte {other}"))),
            },
            TypeExpr::UInt { width } => Ok(AbiValue::UInt(be_unsigned(reader.take(*width, ty)?))),
            TypeExpr::Int { width } => Ok(AbiValue::Int(be_signed(reader.take(*width, ty)?))),
            TypeExpr::List(item) => {
                let count = reader.length(ty)?;
                let mut items = Vec::new();
                for _ in 0..count {
                    let before = reader.pos;
                    items.push(self.decode_nested(item, reader)?);
                    // Zero-sized items: the prefix alone must not drive the loop.
                    if reader.pos == before && count > reader.remaining() {
                        return Err(invalid(
                            ty,
                            &format!(
                                "{count} zero-sized items exceed the {} remaining byte(s)",
                                reader.remaining()
                            ),
                        ));
                    }
                }
                Ok(AbiValue::List(items))
            }
            TypeExpr::Option(inner) => match reader.byte(ty)? {
                0 => Ok(AbiValue::Option(None)),
                1 => Ok(AbiValue::Option(Some(Box::new(self.decode_nested(inner, reader)?)))),
                other => Err(invalid(ty, &format!("unexpected presence byte {other}"))),
            },
            TypeExpr::Tuple(items) => Ok(AbiValue::Tuple(
                items
                    .iter()
                    .map(|item| self.decode_nested(item, reader))
                    .collect::<Result<Vec<_>>>()?,
            )),
            TypeExpr::Array { len, item } => Ok(AbiValue::List(
                (0..*len)
                    .map(|_| self.decode_nested(item, reader))
                    .collect::<Result<Vec<_>>>()?,
            )),
            TypeExpr::Named(name) => self.decode_named(name, reader),
            TypeExpr::Variadic(_) | TypeExpr::Multi(_) | TypeExpr::Optional(_) => {
                Err(AbiError::NotSingleValue { ty: ty.to_string() })
            }
        }
    }

    fn decode_named(&self, name: &str, reader: &mut Reader<'_>) -> Result<AbiValue> {
        match self.type_def(name)? {
            TypeDef::Struct { fields } => Ok(AbiValue::Struct {
                name: name.to_string(),
                fields: self.decode_fields(fields, reader)?,
            }),
            TypeDef::Enum { variants } => {
                let discriminant = reader.byte(&TypeExpr::Named(name.to_string()))?;
                match variants
                    .iter()
                    .find(|variant| variant.discriminant == discriminant)
                {
                    Some(variant) => Ok(AbiValue::Enum {
                        name: name.to_string(),
                        variant: variant.name.clone(),
                        discriminant,
                        fields: self.decode_fields(&variant.fields, reader)?,
                    }),
                    // An undeclared tag of a field-less enum still has a known
                    // size, so it decodes as `#<discriminant>`.
                    None if variants.iter().all(|variant| variant.fields.is_empty()) => {
                        Ok(AbiValue::Enum {
                            name: name.to_string(),
                            variant: format!("#{discriminant}"),
                            discriminant,
                            fields: Vec::new(),
                        })
                    }
                    None => Err(AbiError::UnknownVariant {
                        enum_name: name.to_string(),
                        discriminant,
                    }),
                }
            }
            TypeDef::Unsupported => Err(AbiError::UnsupportedType {
                name: name.to_string(),
            }),
        }
    }

    fn decode_fields(
        &self,
        fields: &[FieldDef],
        reader: &mut Reader<'_>,
    ) -> Result<Vec<(String, AbiValue)>> {
        fields
            .iter()
            .map(|field| Ok((field.name.clone(), self.decode_nested(&field.ty, reader)?)))
            .collect()
    }

    fn decode_multi(
        &self,
        ty: &TypeExpr,
        data: &[Vec<u8>],
        cursor: &mut usize,
    ) -> Result<AbiValue> {
        match ty {
            TypeExpr::Variadic(item) => {
                let mut items = Vec::new();
                while *cursor < data.len() {
                    let before = *cursor;
                    items.push(self.decode_multi(item, data, cursor)?);
                    if *cursor == before {
                        break;
                    }
                }
                Ok(AbiValue::List(items))
            }
            TypeExpr::Multi(items) => Ok(AbiValue::Multi(
                items
                    .iter()
                    .map(|item| self.decode_multi(item, data, cursor))
                    .collect::<Result<Vec<_>>>()?,
            )),
            TypeExpr::Optional(inner) if *cursor < data.len() => Ok(AbiValue::Option(Some(
                Box::new(self.decode_multi(inner, data, cursor)?),
            ))),
            TypeExpr::Optional(_) => Ok(AbiValue::Option(None)),
            single => {
                let bytes = data
                    .get(*cursor)
                    .ok_or(AbiError::MissingReturnValue { index: *cursor })?;
                *cursor += 1;
                self.decode_top(single, bytes)
            }
        }
    }

    /// Nested decoding that must consume the whole buffer.
    fn decode_whole(&self, ty: &TypeExpr, bytes: &[u8]) -> Result<AbiValue> {
        let mut reader = Reader::new(bytes);
        let value = self.decode_nested(ty, &mut reader)?;
        reader.finish(ty)?;
        Ok(value)
    }

    fn type_def(&self, name: &str) -> Result<&TypeDef> {
        self.types.get(name).ok_or_else(|| AbiError::UnknownType {
            name: name.to_string(),
        })
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, needed: usize, ty: &TypeExpr) -> Result<&'a [u8]> {
        if needed > self.remaining() {
            return Err(AbiError::Truncated {
                ty: ty.to_string(),
                needed,
                remaining: self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(slice)
    }

    fn byte(&mut self, ty: &TypeExpr) -> Result<u8> {
        Ok(self.take(1, ty)?[0])
    }

    /// A `u32` big-endian length or item-count prefix.
    fn length(&mut self, ty: &TypeExpr) -> Result<usize> {
        let prefix = self.take(4, ty)?;
        Ok(be_unsigned(prefix) as usize)
    }

    fn finish(self, ty: &TypeExpr) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            count => Err(AbiError::TrailingBytes {
                ty: ty.to_string(),
                count,
            }),
        }
    }
}

fn check_width(ty: &TypeExpr, width: usize, bytes: &[u8]) -> Result<()> {
    if bytes.len() > width {
        return Err(invalid(
            ty,
            &format!("{} byte(s) do not fit in {width}", bytes.len()),
        ));
    }
    Ok(())
}

fn invalid(ty: &TypeExpr, reason: &str) -> AbiError {
    AbiError::InvalidValue {
        ty: ty.to_string(),
        reason: reason.to_string(),
    }
}

fn be_unsigned(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte))
}

fn be_signed(bytes: &[u8]) -> i64 {
    let seed = match bytes.first() {
        Some(first) if first & 0x80 != 0 => -1i64,
        _ => 0,
    };
    bytes
        .iter()
        .fold(seed, |acc, byte| (acc << 8) | i64::from(*byte))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ABI: &str = r#"{
        "endpoints": [
            { "name": "getQuorum", "mutability": "readonly", "outputs": [{ "type": "u32" }] },
            { "name": "getPair", "mutability": "readonly", "outputs": [{ "type": "u8" }, { "type": "optional<bytes>", "multi_result": true }] },
            { "name": "getAll", "mutability": "readonly", "outputs": [{ "type": "variadic<multi<u16,bool>>", "multi_result": true }] }
        ],
        "types": {
            "Level": {
                "type": "enum",
                "variants": [
                    { "name": "Low", "discriminant": 0 },
                    { "name": "Custom", "discriminant": 1, "fields": [{ "name": "0", "type": "u8" }] }
                ]
            },
            "Point": {
                "type": "struct",
                "fields": [
                    { "name": "x", "type": "i16" },
                    { "name": "label", "type": "Option<bytes>" }
                ]
            },
            "Marker": { "type": "struct", "fields": [] },
            "Flag": {
                "type": "enum",
                "variants": [
                    { "name": "Off", "discriminant": 0 },
                    { "name": "On", "discriminant": 1 }
                ]
            },
            "Opaque": { "type": "explicit-enum", "variants": [] }
        }
    }"#;

    fn abi() -> Abi {
        Abi::from_json(ABI).unwrap_or_else(|e| panic!("{e}"))
    }

    fn ty(expr: &str) -> TypeExpr {
        TypeExpr::parse(expr).unwrap_or_else(|e| panic!("{e}"))
    }

    fn top(expr: &str, bytes: &[u8]) -> Result<AbiValue> {
        abi().decode_top(&ty(expr), bytes)
    }

    #[test]
    fn top_level_numbers_are_minimal_big_endian() {
        assert_eq!(top("u32", &[]).ok(), Some(AbiValue::UInt(0)));
        assert_eq!(top("u32", &[0x01, 0x00]).ok(), Some(AbiValue::UInt(256)));
        assert_eq!(top("i64", &[0xff]).ok(), Some(AbiValue::Int(-1)));
        assert_eq!(top("i16", &[0x7f, 0xff]).ok(), Some(AbiValue::Int(32767)));
        assert!(matches!(
            top("u8", &[1, 2]),
            Err(AbiError::InvalidValue { .. })
        ));
    }

    #[test]
    fn top_level_bool_and_option() {
        assert_eq!(top("bool", &[]).ok(), Some(AbiValue::Bool(false)));
        assert_eq!(top("bool", &[1]).ok(), Some(AbiValue::Bool(true)));
        assert!(top("bool", &[2]).is_err());
        assert_eq!(top("Option<u8>", &[]).ok(), Some(AbiValue::Option(None)));
        assert_eq!(
            top("Option<u8>", &[1, 9]).ok(),
            Some(AbiValue::Option(Some(Box::new(AbiValue::UInt(9)))))
        );
        assert!(top("Option<u8>", &[2, 9]).is_err());
    }

    #[test]
    fn top_level_list_runs_to_the_end() {
        assert_eq!(
            top("List<u16>", &[0, 1, 0, 2]).ok(),
            Some(AbiValue::List(vec![AbiValue::UInt(1), AbiValue::UInt(2)]))
        );
        assert!(matches!(
            top("List<u16>", &[0, 1, 0]),
            Err(AbiError::Truncated { .. })
        ));
    }

    #[test]
    fn empty_top_level_enum_is_the_first_variant() {
        let value = top("Level", &[]).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(
            value,
            AbiValue::Enum {
                name: "Level".into(),
                variant: "Low".into(),
                discriminant: 0,
                fields: Vec::new(),
            }
        );
        let custom = top("Level", &[1, 42]).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(
            custom,
            AbiValue::Enum {
                name: "Level".into(),
                variant: "Custom".into(),
                discriminant: 1,
                fields: vec![("0".into(), AbiValue::UInt(42))],
            }
        );
        assert!(matches!(
            top("Level", &[7]),
            Err(AbiError::UnknownVariant { discriminant: 7, .. })
        ));
    }

    #[test]
    fn undeclared_tag_of_a_field_less_enum_degrades() {
        assert_eq!(
            top("Flag", &[5]).ok(),
            Some(AbiValue::Enum {
                name: "Flag".into(),
                variant: "#5".into(),
                discriminant: 5,
                fields: Vec::new(),
            })
        );
        let nested = top("List<Flag>", &[0, 0, 0, 2, 1, 9]).unwrap_or_else(|e| panic!("{e}"));
        let AbiValue::List(items) = nested else {
            panic!("expected a list");
        };
        assert!(matches!(&items[1], AbiValue::Enum { variant, .. } if variant == "#9"));
    }

    #[test]
    fn zero_sized_items_cannot_outnumber_the_input() {
        assert!(matches!(
            top("Option<List<Marker>>", &[1, 0xff, 0xff, 0xff, 0xff]),
            Err(AbiError::InvalidValue { .. })
        ));
        assert!(matches!(
            top("List<Marker>", &[0]),
            Err(AbiError::InvalidValue { .. })
        ));
        let few = top("tuple<List<Marker>,u32>", &[0, 0, 0, 2, 0, 0, 0, 7])
            .unwrap_or_else(|e| panic!("{e}"));
        let AbiValue::Tuple(parts) = few else {
            panic!("expected a tuple");
        };
        assert!(matches!(&parts[0], AbiValue::List(items) if items.len() == 2));
        assert_eq!(parts[1], AbiValue::UInt(7));
    }

    #[test]
    fn structs_use_nested_encoding_and_must_be_consumed() {
        let bytes = [0xff, 0xfe, 1, 0, 0, 0, 2, b'h', b'i'];
        let value = top("Point", &bytes).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(value.field("x"), Some(&AbiValue::Int(-2)));
        assert_eq!(
            value.field("label"),
            Some(&AbiValue::Option(Some(Box::new(AbiValue::Bytes(b"hi".to_vec())))))
        );

        let mut extra = bytes.to_vec();
        extra.push(0);
        assert!(matches!(
            top("Point", &extra),
            Err(AbiError::TrailingBytes { count: 1, .. })
        ));
        assert!(matches!(
            top("Point", &bytes[..5]),
            Err(AbiError::Truncated { .. })
        ));
    }

    #[test]
    fn top_level_address_must_be_32_bytes() {
        assert_eq!(top("Address", &[7; 32]).ok(), Some(AbiValue::Address([7; 32])));
        assert!(matches!(
            top("Address", &[7; 31]),
            Err(AbiError::InvalidLength {
                expected: 32,
                actual: 31,
                ..
            })
        ));
    }

    #[test]
    fn unsupported_definitions_fail_only_when_decoded() {
        assert!(matches!(
            top("Opaque", &[0]),
            Err(AbiError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn multi_valued_types_need_output_context() {
        assert!(matches!(
            top("variadic<u8>", &[1]),
            Err(AbiError::NotSingleValue { .. })
        ));
    }

    #[test]
    fn decodes_endpoint_outputs() {
        let abi = abi();
        assert_eq!(
            abi.decode_outputs("getQuorum", &[vec![3]]).ok(),
            Some(vec![AbiValue::UInt(3)])
        );
        assert!(matches!(
            abi.decode_outputs("getQuorum", &[]),
            Err(AbiError::MissingReturnValue { index: 0 })
        ));
        assert!(matches!(
            abi.decode_outputs("getQuorum", &[vec![3], vec![4]]),
            Err(AbiError::UnexpectedReturnData { extra: 1 })
        ));

        assert_eq!(
            abi.decode_outputs("getPair", &[vec![5]]).ok(),
            Some(vec![AbiValue::UInt(5), AbiValue::Option(None)])
        );
        assert_eq!(
            abi.decode_outputs("getPair", &[vec![5], b"x".to_vec()]).ok(),
            Some(vec![
                AbiValue::UInt(5),
                AbiValue::Option(Some(Box::new(AbiValue::Bytes(b"x".to_vec())))),
            ])
        );
    }

    #[test]
    fn variadic_multi_groups_consecutive_entries() {
        let abi = abi();
        let data = vec![vec![1], vec![1], vec![2], vec![]];
        assert_eq!(
            abi.decode_outputs("getAll", &data).ok(),
            Some(vec![AbiValue::List(vec![
                AbiValue::Multi(vec![AbiValue::UInt(1), AbiValue::Bool(true)]),
                AbiValue::Multi(vec![AbiValue::UInt(2), AbiValue::Bool(false)]),
            ])])
        );
        assert_eq!(
            abi.decode_outputs("getAll", &[]).ok(),
            Some(vec![AbiValue::List(Vec::new())])
        );
        assert!(matches!(
            abi.decode_outputs("getAll", &[vec![1]]),
            Err(AbiError::MissingReturnValue { index: 1 })
        ));
    }
}
