//! Methods, overload sets, constructor and the fallback/receive entries

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use bytes::Bytes;
use tracing::trace;

use crate::abi::{selector, Args, FieldValues, Fields, Selector, Type, Value};
use crate::error::AbiError;

/// Declared state mutability of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutability {
    /// Reads no state
    Pure,
    /// Reads but does not modify state
    View,
    /// Modifies state, rejects value transfers
    Nonpayable,
    /// Modifies state, accepts value transfers
    Payable,
}

impl Mutability {
    /// Accepts a value transfer
    pub fn payable(&self) -> bool {
        matches!(self, Mutability::Payable)
    }

    /// Needs a transaction (as opposed to a read-only call)
    pub fn mutating(&self) -> bool {
        matches!(self, Mutability::Nonpayable | Mutability::Payable)
    }

    /// The JSON ABI spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Mutability::Pure => "pure",
            Mutability::View => "view",
            Mutability::Nonpayable => "nonpayable",
            Mutability::Payable => "payable",
        }
    }
}

impl FromStr for Mutability {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pure" => Ok(Mutability::Pure),
            "view" => Ok(Mutability::View),
            "nonpayable" => Ok(Mutability::Nonpayable),
            "payable" => Ok(Mutability::Payable),
            other => Err(AbiError::declaration(format!(
                "Unknown state mutability type: `{other}`"
            ))),
        }
    }
}

impl fmt::Display for Mutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contract function
#[derive(Debug, Clone)]
pub struct Method {
    name: String,
    mutability: Mutability,
    inputs: Fields,
    outputs: Fields,
    single_output: bool,
    selector: OnceLock<Selector>,
}

impl Method {
    /// Create a method returning a (possibly empty) list of outputs
    pub fn new(name: impl Into<String>, mutability: Mutability, inputs: Fields, outputs: Fields) -> Self {
        Self {
            name: name.into(),
            mutability,
            inputs,
            outputs,
            single_output: false,
            selector: OnceLock::new(),
        }
    }

    /// Create a method with one bare output; its decoded result is the value itself
    pub fn with_single_output(
        name: impl Into<String>,
        mutability: Mutability,
        inputs: Fields,
        output: Type,
    ) -> Self {
        Self {
            single_output: true,
            ..Self::new(name, mutability, inputs, Fields::anonymous([output]))
        }
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared mutability
    pub fn mutability(&self) -> Mutability {
        self.mutability
    }

    /// Accepts a value transfer
    pub fn payable(&self) -> bool {
        self.mutability.payable()
    }

    /// Needs a transaction
    pub fn mutating(&self) -> bool {
        self.mutability.mutating()
    }

    /// Input parameters
    pub fn inputs(&self) -> &Fields {
        &self.inputs
    }

    /// Output parameters
    pub fn outputs(&self) -> &Fields {
        &self.outputs
    }

    /// `name(canonical inputs)`, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> String {
        format!("{}{}", self.name, self.inputs.canonical_form())
    }

    /// 4-byte selector
    pub fn selector(&self) -> Selector {
        *self
            .selector
            .get_or_init(|| selector(&self.name, self.inputs.canonical_form()))
    }

    /// Bind and encode the arguments: `selector ++ encoded inputs`
    pub fn call(&self, args: &Args) -> Result<MethodCall<'_>, AbiError> {
        let encoded = self.inputs.encode(args)?;
        let mut data = Vec::with_capacity(Selector::LEN + encoded.len());
        data.extend_from_slice(self.selector().as_bytes());
        data.extend(encoded);
        Ok(MethodCall {
            method: self,
            data: Bytes::from(data),
        })
    }

    /// Decode the returned bytes
    pub fn decode_output(&self, data: &[u8]) -> Result<Output, AbiError> {
        let values = self.outputs.decode(data)?;
        if !self.single_output {
            return Ok(Output::Values(values));
        }
        match values.into_tuple().pop() {
            Some(value) => Ok(Output::Value(value)),
            None => Err(AbiError::declaration(format!(
                "`{}` declares a single output but has none",
                self.name
            ))),
        }
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.mutability == other.mutability
            && self.inputs == other.inputs
            && self.outputs == other.outputs
            && self.single_output == other.single_output
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function {}{}", self.name, self.inputs)?;
        if self.payable() {
            f.write_str(" payable")?;
        }
        if !self.outputs.is_empty() {
            write!(f, " returns {}", self.outputs)?;
        }
        Ok(())
    }
}

/// Decoded return value of a method call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// The method declares a single bare output
    Value(Value),
    /// Every other output list
    Values(FieldValues),
}

impl Output {
    /// Single value; multiple outputs become a struct value
    pub fn into_value(self) -> Value {
        match self {
            Output::Value(value) => value,
            Output::Values(values) => values.into_value(),
        }
    }

    /// The output list, if this is not a bare single output
    pub fn as_values(&self) -> Option<&FieldValues> {
        match self {
            Output::Values(values) => Some(values),
            Output::Value(_) => None,
        }
    }
}

/// A method call with the arguments encoded
#[derive(Debug, Clone)]
pub struct MethodCall<'a> {
    method: &'a Method,
    data: Bytes,
}

impl<'a> MethodCall<'a> {
    /// The method that produced this call
    pub fn method(&self) -> &'a Method {
        self.method
    }

    /// `selector ++ encoded arguments`
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consume into the payload
    pub fn into_data(self) -> Bytes {
        self.data
    }

    /// Decode the returned bytes with the originating method
    pub fn decode_output(&self, data: &[u8]) -> Result<Output, AbiError> {
        self.method.decode_output(data)
    }
}

/// Same-named methods with distinct input signatures (Solidity overloading).
///
/// A set with one member behaves exactly like that method.
#[derive(Debug, Clone)]
pub struct MultiMethod {
    name: String,
    methods: Vec<Method>,
}

impl MultiMethod {
    /// Start a set with its first member
    pub fn new(method: Method) -> Self {
        Self {
            name: method.name.clone(),
            methods: vec![method],
        }
    }

    /// Register another overload
    pub fn add(&mut self, method: Method) -> Result<(), AbiError> {
        if method.name != self.name {
            return Err(AbiError::declaration(format!(
                "cannot add `{}` to the overloads of `{}`",
                method.name, self.name
            )));
        }
        if self.get(method.inputs.canonical_form()).is_some() {
            return Err(AbiError::declaration(format!(
                "ABI contains more than one declaration of `{}{}`",
                self.name,
                method.inputs.canonical_form()
            )));
        }
        self.methods.push(method);
        Ok(())
    }

    /// Shared name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members in registration order
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Member by canonical input form, e.g. `"(uint8,bool)"`
    pub fn get(&self, canonical: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.inputs.canonical_form() == canonical)
    }

    /// The only member, if there are no overloads
    pub fn single(&self) -> Option<&Method> {
        match self.methods.as_slice() {
            [method] => Some(method),
            _ => None,
        }
    }

    /// Number of overloads
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Always false; a set holds at least one method
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Call the first overload (in registration order) that accepts the arguments
    pub fn call(&self, args: &Args) -> Result<MethodCall<'_>, AbiError> {
        if let Some(method) = self.single() {
            return method.call(args);
        }

        for method in &self.methods {
            match method.call(args) {
                Ok(call) => return Ok(call),
                Err(err) => trace!(
                    "Overload {}{} rejected: {}",
                    self.name,
                    method.inputs.canonical_form(),
                    err
                ),
            }
        }

        Err(AbiError::NoMatchingOverload {
            name: self.name.clone(),
            candidates: self.methods.iter().map(|m| m.inputs.to_string()).collect(),
        })
    }
}

impl fmt::Display for MultiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, method) in self.methods.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{method}")?;
        }
        Ok(())
    }
}

/// Contract constructor
#[derive(Debug, Clone, PartialEq)]
pub struct Constructor {
    inputs: Fields,
    payable: bool,
}

impl Default for Constructor {
    fn default() -> Self {
        Self::new(Fields::empty(), false)
    }
}

impl Constructor {
    /// Create a constructor
    pub fn new(inputs: Fields, payable: bool) -> Self {
        Self { inputs, payable }
    }

    /// Input parameters
    pub fn inputs(&self) -> &Fields {
        &self.inputs
    }

    /// Accepts a value transfer on deployment
    pub fn payable(&self) -> bool {
        self.payable
    }

    /// Bind and encode the arguments (no selector)
    pub fn call(&self, args: &Args) -> Result<ConstructorCall, AbiError> {
        let input = self.inputs.encode(args)?;
        Ok(ConstructorCall {
            input: Bytes::from(input),
        })
    }
}

impl fmt::Display for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "constructor{}", self.inputs)?;
        if self.payable {
            f.write_str(" payable")?;
        }
        Ok(())
    }
}

/// Encoded constructor arguments, to be appended to the bytecode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorCall {
    input: Bytes,
}

impl ConstructorCall {
    /// Encoded arguments
    pub fn input(&self) -> &Bytes {
        &self.input
    }
}

/// Fallback function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fallback {
    payable: bool,
}

impl Fallback {
    /// Create a fallback entry
    pub fn new(payable: bool) -> Self {
        Self { payable }
    }

    /// Accepts a value transfer
    pub fn payable(&self) -> bool {
        self.payable
    }
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.payable { "fallback() payable" } else { "fallback()" })
    }
}

/// Receive function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Receive {
    payable: bool,
}

impl Receive {
    /// Create a receive entry
    pub fn new(payable: bool) -> Self {
        Self { payable }
    }

    /// Accepts a value transfer
    pub fn payable(&self) -> bool {
        self.payable
    }
}

impl fmt::Display for Receive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.payable { "receive() payable" } else { "receive()" })
    }
}
