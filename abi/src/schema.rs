//! The JSON ABI document emitted by the contract build.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde::Deserializer;
use tracing::debug;

use crate::error::{AbiError, Result};
use crate::types::TypeExpr;

#[derive(Debug, Clone, Deserialize)]
pub struct Abi {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    #[serde(default)]
    pub types: BTreeMap<String, TypeDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Endpoint {
    pub name: String,
    #[serde(default)]
    pub mutability: Option<String>,
    #[serde(default)]
    pub inputs: Vec<Input>,
    #[serde(default)]
    pub outputs: Vec<Output>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Input {
    pub name: String,
    #[serde(rename = "type", deserialize_with = "type_expr")]
    pub ty: TypeExpr,
    #[serde(default)]
    pub multi_arg: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Output {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", deserialize_with = "type_expr")]
    pub ty: TypeExpr,
    #[serde(default)]
    pub multi_result: bool,
}

/// A custom type from the `types` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TypeDef {
    Struct {
        #[serde(default)]
        fields: Vec<FieldDef>,
    },
    Enum {
        #[serde(default)]
        variants: Vec<VariantDef>,
    },
    /// Any other definition kind; only an error if a value of it is decoded.
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type", deserialize_with = "type_expr")]
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariantDef {
    pub name: String,
    pub discriminant: u8,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

fn type_expr<'de, D>(deserializer: D) -> std::result::Result<TypeExpr, D::Error>
where
    D: Deserializer<'de>,
{
    let expr = String::deserialize(deserializer)?;
    TypeExpr::parse(&expr).map_err(serde::de::Error::custom)
}

impl Endpoint {
    pub fn is_readonly(&self) -> bool {
        self.mutability.as_deref() == Some("readonly")
    }
}

impl Abi {
    /// Parse an ABI document and check that every referenced type resolves.
    pub fn from_json(json: &str) -> Result<Self> {
        let abi: Abi = serde_json::from_str(json)?;
        abi.validate()?;
        Ok(abi)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| AbiError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let abi = Self::from_json(&json)?;
        debug!(
            path = %path.display(),
            name = %abi.name,
            endpoints = abi.endpoints.len(),
            types = abi.types.len(),
            "loaded contract ABI"
        );
        Ok(abi)
    }

    pub fn validate(&self) -> Result<()> {
        let mut resolve = |name: &str| {
            if self.types.contains_key(name) {
                Ok(())
            } else {
                Err(AbiError::UnknownType {
                    name: name.to_string(),
                })
            }
        };

        for endpoint in &self.endpoints {
            for input in &endpoint.inputs {
                input.ty.for_each_named(&mut resolve)?;
            }
            for output in &endpoint.outputs {
                output.ty.for_each_named(&mut resolve)?;
            }
        }
        for def in self.types.values() {
            let fields: Box<dyn Iterator<Item = &FieldDef>> = match def {
                TypeDef::Struct { fields } => Box::new(fields.iter()),
                TypeDef::Enum { variants } => {
                    Box::new(variants.iter().flat_map(|variant| variant.fields.iter()))
                }
                TypeDef::Unsupported => Box::new(std::iter::empty()),
            };
            for field in fields {
                field.ty.for_each_named(&mut resolve)?;
            }
        }
        Ok(())
    }

    pub fn endpoint(&self, name: &str) -> Result<&Endpoint> {
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.name == name)
            .ok_or_else(|| AbiError::UnknownEndpoint {
                name: name.to_string(),
            })
    }

    /// Check that `function` can be sent in a transaction with `arg_count`
    /// arguments.
    pub fn check_call(&self, function: &str, arg_count: usize) -> Result<()> {
        let endpoint = self.endpoint(function)?;
        if endpoint.is_readonly() {
            return Err(AbiError::ReadOnlyEndpoint {
                name: function.to_string(),
            });
        }

        let open_ended = endpoint
            .inputs
            .last()
            .is_some_and(|input| input.multi_arg || input.ty.is_multi_value());
        let fixed = if open_ended {
            endpoint.inputs.len() - 1
        } else {
            endpoint.inputs.len()
        };

        let matches = if open_ended {
            arg_count >= fixed
        } else {
            arg_count == fixed
        };
        if matches {
            Ok(())
        } else {
            Err(AbiError::ArgumentCount {
                endpoint: function.to_string(),
                expected: if open_ended {
                    format!("at least {fixed}")
                } else {
                    fixed.to_string()
                },
                actual: arg_count,
            })
        }
    }
}
