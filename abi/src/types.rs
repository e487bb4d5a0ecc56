//! ABI type expressions such as `variadic<multi<bytes,Slot>>`.

use std::fmt;

use crate::error::{AbiError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// Any length-prefixed buffer: `bytes`, `ManagedBuffer`, `utf-8 string`...
    Bytes,
    Address,
    H256,
    Bool,
    /// Unsigned integer of `width` bytes.
    UInt { width: usize },
    /// Signed integer of `width` bytes.
    Int { width: usize },
    BigUint,
    BigInt,
    List(Box<TypeExpr>),
    Option(Box<TypeExpr>),
    Tuple(Vec<TypeExpr>),
    Array { len: usize, item: Box<TypeExpr> },
    /// Zero or more values, each taking one or more return-data slots.
    Variadic(Box<TypeExpr>),
    /// Several values side by side in return data.
    Multi(Vec<TypeExpr>),
    /// A trailing value that may be left out of return data.
    Optional(Box<TypeExpr>),
    /// A struct or enum declared in the ABI `types` section.
    Named(String),
}

impl TypeExpr {
    pub fn parse(expr: &str) -> Result<Self> {
        let mut parser = Parser { src: expr, pos: 0 };
        let ty = parser.parse_type()?;
        if parser.pos != expr.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }

    /// Whether values of this type span a variable number of return-data slots.
    pub fn is_multi_value(&self) -> bool {
        matches!(self, Self::Variadic(_) | Self::Multi(_) | Self::Optional(_))
    }

    /// Call `visit` with every declared type name referenced by this expression.
    pub fn for_each_named(&self, visit: &mut dyn FnMut(&str) -> Result<()>) -> Result<()> {
        match self {
            Self::Named(name) => visit(name),
            Self::List(inner)
            | Self::Option(inner)
            | Self::Variadic(inner)
            | Self::Optional(inner)
            | Self::Array { item: inner, .. } => inner.for_each_named(visit),
            Self::Tuple(items) | Self::Multi(items) => {
                items.iter().try_for_each(|item| item.for_each_named(visit))
            }
            Self::Bytes
            | Self::Address
            | Self::H256
            | Self::Bool
            | Self::UInt { .. }
            | Self::Int { .. }
            | Self::BigUint
            | Self::BigInt => Ok(()),
        }
    }

    fn from_parts(name: &str, mut args: Vec<TypeExpr>) -> std::result::Result<Self, String> {
        let simple = match name {
            "bytes" | "BoxedBytes" | "ManagedBuffer" | "utf-8 string" | "TokenIdentifier"
            | "EgldOrEsdtTokenIdentifier" => Some(Self::Bytes),
            "Address" => Some(Self::Address),
            "H256" => Some(Self::H256),
            "bool" => Some(Self::Bool),
            "u8" => Some(Self::UInt { width: 1 }),
            "u16" => Some(Self::UInt { width: 2 }),
            "u32" | "usize" => Some(Self::UInt { width: 4 }),
            "u64" => Some(Self::UInt { width: 8 }),
            "i8" => Some(Self::Int { width: 1 }),
            "i16" => Some(Self::Int { width: 2 }),
            "i32" | "isize" => Some(Self::Int { width: 4 }),
            "i64" => Some(Self::Int { width: 8 }),
            "BigUint" => Some(Self::BigUint),
            "BigInt" => Some(Self::BigInt),
            _ => None,
        };
        if let Some(ty) = simple {
            return if args.is_empty() {
                Ok(ty)
            } else {
                Err(format!("{name} takes no type arguments"))
            };
        }

        let single = |args: &mut Vec<TypeExpr>| match args.len() {
            1 => Ok(Box::new(args.remove(0))),
            n => Err(format!("{name} takes one type argument, got {n}")),
        };
        match name {
            "List" => Ok(Self::List(single(&mut args)?)),
            "Option" => Ok(Self::Option(single(&mut args)?)),
            "variadic" => Ok(Self::Variadic(single(&mut args)?)),
            "optional" => Ok(Self::Optional(single(&mut args)?)),
            "tuple" | "multi" if args.is_empty() => Err(format!("{name} needs type arguments")),
            "tuple" => Ok(Self::Tuple(args)),
            "multi" => Ok(Self::Multi(args)),
            _ => {
                if let Some(len) = name.strip_prefix("array").and_then(|n| n.parse().ok()) {
                    return Ok(Self::Array {
                        len,
                        item: single(&mut args)?,
                    });
                }
                if !args.is_empty() {
                    return Err(format!("unknown generic type {name}"));
                }
                if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    Ok(Self::Named(name.to_string()))
                } else {
                    Err(format!("invalid type name {name:?}"))
                }
            }
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, name: &str, items: &[TypeExpr]) -> fmt::Result {
            write!(f, "{name}<")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{item}")?;
            }
            f.write_str(">")
        }

        match self {
            Self::Bytes => f.write_str("bytes"),
            Self::Address => f.write_str("Address"),
            Self::H256 => f.write_str("H256"),
            Self::Bool => f.write_str("bool"),
            Self::UInt { width } => write!(f, "u{}", width * 8),
            Self::Int { width } => write!(f, "i{}", width * 8),
            Self::BigUint => f.write_str("BigUint"),
            Self::BigInt => f.write_str("BigInt"),
            Self::List(inner) => write!(f, "List<{inner}>"),
            Self::Option(inner) => write!(f, "Option<{inner}>"),
            Self::Tuple(items) => join(f, "tuple", items),
            Self::Array { len, item } => write!(f, "array{len}<{item}>"),
            Self::Variadic(inner) => write!(f, "variadic<{inner}>"),
            Self::Multi(items) => join(f, "multi", items),
            Self::Optional(inner) => write!(f, "optional<{inner}>"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn parse_type(&mut self) -> Result<TypeExpr> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, '<' | '>' | ',') {
                break;
            }
            self.pos += c.len_utf8();
        }
        let name = self.src[start..self.pos].trim();
        if name.is_empty() {
            return Err(self.error("expected a type name"));
        }

        let mut args = Vec::new();
        if self.peek() == Some('<') {
            self.pos += 1;
            loop {
                args.push(self.parse_type()?);
                match self.peek() {
                    Some(',') => self.pos += 1,
                    Some('>') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.error("expected ',' or '>'")),
                }
            }
            self.skip_whitespace();
        }

        TypeExpr::from_parts(name, args).map_err(|reason| AbiError::InvalidTypeExpr {
            expr: self.src.to_string(),
            reason,
        })
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
    }

    fn error(&self, reason: &str) -> AbiError {
        AbiError::InvalidTypeExpr {
            expr: self.src.to_string(),
            reason: format!("{reason} at offset {}", self.pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(expr: &str) -> TypeExpr {
        TypeExpr::parse(expr).unwrap_or_else(|e| panic!("{expr}: {e}"))
    }

    #[test]
    fn parses_slot_listing_output() {
        assert_eq!(
            parse("variadic<multi<bytes,Slot>>"),
            TypeExpr::Variadic(Box::new(TypeExpr::Multi(vec![
                TypeExpr::Bytes,
                TypeExpr::Named("Slot".into()),
            ])))
        );
    }

    #[test]
    fn parses_aliases_and_spacing() {
        assert_eq!(parse("utf-8 string"), TypeExpr::Bytes);
        assert_eq!(parse("usize"), TypeExpr::UInt { width: 4 });
        assert_eq!(
            parse("tuple< u64 , Option<Address> >"),
            TypeExpr::Tuple(vec![
                TypeExpr::UInt { width: 8 },
                TypeExpr::Option(Box::new(TypeExpr::Address)),
            ])
        );
        assert_eq!(
            parse("array32<u8>"),
            TypeExpr::Array {
                len: 32,
                item: Box::new(TypeExpr::UInt { width: 1 }),
            }
        );
    }

    #[test]
    fn display_round_trips() {
        for expr in [
            "variadic<multi<bytes,Slot>>",
            "List<Address>",
            "optional<tuple<u32,i64,BigUint>>",
            "array4<bool>",
        ] {
            assert_eq!(parse(expr).to_string(), expr);
        }
    }

    #[test]
    fn rejects_malformed_expressions() {
        for expr in ["", "List<", "List<u8", "List<u8,u16>", "u8<u8>", "multi<>", "a b<u8>", "u8>"] {
            assert!(
                matches!(TypeExpr::parse(expr), Err(AbiError::InvalidTypeExpr { .. })),
                "{expr:?} should be rejected"
            );
        }
    }

    #[test]
    fn collects_named_references() {
        let ty = parse("variadic<multi<Slot,List<Status>>>");
        let mut names = Vec::new();
        ty.for_each_named(&mut |name| {
            names.push(name.to_string());
            Ok(())
        })
        .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(names, vec!["Slot", "Status"]);
    }
}
