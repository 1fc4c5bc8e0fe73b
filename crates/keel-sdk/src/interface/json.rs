//! Solidity JSON ABI entries as emitted by the compiler.
//!
//! These structs hold the raw content; validation and type dispatch happen
//! when an entry is turned into a method, event or error.

use serde::{Deserialize, Serialize};

use crate::abi::{parse_type_with, Fields, Param, Type};
use crate::error::AbiError;

/// One entry of a JSON ABI array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiEntry {
    /// `constructor`, `function`, `fallback`, `receive`, `event` or `error`;
    /// entries without a type are functions
    #[serde(rename = "type", default = "default_entry_type")]
    pub entry_type: String,
    /// Absent for constructor/fallback/receive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Parameters (event and error fields included)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<AbiParam>>,
    /// Return values; functions only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<AbiParam>>,
    /// `pure`, `view`, `nonpayable` or `payable`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
    /// Events only
    #[serde(default)]
    pub anonymous: bool,
    /// Pre-0.5 compilers: `constant` instead of `stateMutability`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<bool>,
    /// Pre-0.5 compilers: `payable` instead of `stateMutability`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payable: Option<bool>,
}

fn default_entry_type() -> String {
    "function".to_string()
}

/// A parameter of an ABI entry (or a component of a tuple parameter)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParam {
    /// Empty for anonymous parameters
    #[serde(default)]
    pub name: String,
    /// Type string, e.g. `uint256[]` or `tuple`
    #[serde(rename = "type")]
    pub param_type: String,
    /// Struct fields when the base type is `tuple`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<AbiParam>,
    /// Events only
    #[serde(default)]
    pub indexed: bool,
    /// Solidity-level type name, informational only
    #[serde(rename = "internalType", default, skip_serializing_if = "Option::is_none")]
    pub internal_type: Option<String>,
}

impl AbiEntry {
    /// Declared inputs, empty if absent
    pub fn inputs(&self) -> &[AbiParam] {
        self.inputs.as_deref().unwrap_or_default()
    }

    /// Declared outputs, empty if absent
    pub fn outputs(&self) -> &[AbiParam] {
        self.outputs.as_deref().unwrap_or_default()
    }
}

impl AbiParam {
    /// Resolve the declared type, including `tuple` components
    pub fn to_type(&self) -> Result<Type, AbiError> {
        parse_type_with(&self.param_type, &|| {
            if self.components.is_empty() {
                return Err(AbiError::declaration(format!(
                    "`{}` requires at least one component",
                    self.param_type
                )));
            }
            let fields = self
                .components
                .iter()
                .enumerate()
                .map(|(i, component)| {
                    let name = if component.name.is_empty() {
                        format!("_{i}")
                    } else {
                        component.name.clone()
                    };
                    Ok((name, component.to_type()?))
                })
                .collect::<Result<Vec<_>, AbiError>>()?;
            Type::structure(fields)
        })
    }

    /// Resolve into a parameter; an empty name means anonymous
    pub fn to_param(&self) -> Result<Param, AbiError> {
        Ok(Param::new(Some(self.name.clone()), self.to_type()?))
    }
}

/// Build a parameter list from JSON parameters
pub(crate) fn dispatch_fields(params: &[AbiParam]) -> Result<Fields, AbiError> {
    let params = params
        .iter()
        .map(AbiParam::to_param)
        .collect::<Result<Vec<_>, _>>()?;
    Fields::new(params)
}

/// Parse a JSON ABI array, or a compiler artifact object carrying an `abi` key
pub(crate) fn parse_entries(json: &serde_json::Value) -> Result<Vec<AbiEntry>, AbiError> {
    let entries = match json {
        serde_json::Value::Object(map) => match map.get("abi") {
            Some(abi) => abi,
            None => {
                return Err(AbiError::declaration(
                    "expected a JSON ABI array or an object with an `abi` key",
                ))
            }
        },
        other => other,
    };
    Ok(Vec::<AbiEntry>::deserialize(entries)?)
}
