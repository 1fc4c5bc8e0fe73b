//! Contract interface: methods, events, errors and the assembled ABI
//!
//! A [`ContractAbi`] is built either from a JSON ABI (as emitted by the
//! Solidity compiler) or programmatically through [`ContractAbiBuilder`].
//!
//! # Example
//!
//! ```rust
//! use keel_sdk::abi::Args;
//! use keel_sdk::interface::ContractAbi;
//!
//! let abi = ContractAbi::from_json_str(r#"[
//!     {"type": "function", "name": "balanceOf", "stateMutability": "view",
//!      "inputs": [{"name": "owner", "type": "address"}],
//!      "outputs": [{"name": "", "type": "uint256"}]}
//! ]"#).unwrap();
//!
//! let method = abi.method("balanceOf").unwrap();
//! let call = method.call(&Args::new().arg(keel_sdk::Address::ZERO)).unwrap();
//! assert_eq!(&call.data()[..4], &[0x70, 0xa0, 0x82, 0x31]);
//! ```

mod custom_error;
mod event;
mod json;
mod method;

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::abi::{FieldValues, Selector};
use crate::error::AbiError;

pub use custom_error::{legacy_error, panic_error, Error};
pub use event::{Event, EventFilter, FilterValue};
pub use json::{AbiEntry, AbiParam};
pub use method::{
    Constructor, ConstructorCall, Fallback, Method, MethodCall, MultiMethod, Mutability, Output,
    Receive,
};

use json::{dispatch_fields, parse_entries};

/// Assembled contract ABI
#[derive(Debug, Clone)]
pub struct ContractAbi {
    constructor: Constructor,
    fallback: Option<Fallback>,
    receive: Option<Receive>,
    methods: Vec<MultiMethod>,
    method_index: HashMap<String, usize>,
    events: Vec<Event>,
    event_index: HashMap<String, usize>,
    errors: Vec<Error>,
    error_index: HashMap<String, usize>,
    error_selectors: HashMap<Selector, usize>,
}

impl ContractAbi {
    /// Start building an ABI programmatically
    pub fn builder() -> ContractAbiBuilder {
        ContractAbiBuilder::default()
    }

    /// Build from a JSON ABI array, or a compiler artifact with an `abi` key
    pub fn from_json(json: &serde_json::Value) -> Result<Self, AbiError> {
        let entries = parse_entries(json)?;
        debug!("Parsed JSON ABI with {} entries", entries.len());

        let mut builder = ContractAbiBuilder::default();
        for entry in &entries {
            builder = builder.entry(entry)?;
        }
        builder.build()
    }

    /// Build from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, AbiError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_json(&value)
    }

    /// The constructor; an empty non-payable one if none was declared
    pub fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    /// The fallback function, if declared
    pub fn fallback(&self) -> Option<&Fallback> {
        self.fallback.as_ref()
    }

    /// The receive function, if declared
    pub fn receive(&self) -> Option<&Receive> {
        self.receive.as_ref()
    }

    /// Overload set for a method name
    pub fn method(&self, name: &str) -> Option<&MultiMethod> {
        self.method_index.get(name).map(|&i| &self.methods[i])
    }

    /// All overload sets in declaration order
    pub fn methods(&self) -> &[MultiMethod] {
        &self.methods
    }

    /// Event by name
    pub fn event(&self, name: &str) -> Option<&Event> {
        self.event_index.get(name).map(|&i| &self.events[i])
    }

    /// All events in declaration order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Custom error by name
    pub fn error(&self, name: &str) -> Option<&Error> {
        self.error_index.get(name).map(|&i| &self.errors[i])
    }

    /// All custom errors in declaration order
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Identify the error in a revert payload and decode its fields.
    ///
    /// `Panic(uint256)` and `Error(string)` are always recognized.
    pub fn resolve_error(&self, data: &[u8]) -> Result<(&Error, FieldValues), AbiError> {
        let Some(selector) = Selector::from_prefix(data) else {
            debug!("Revert data too short for a selector: {} bytes", data.len());
            return Err(AbiError::ErrorDataTooShort(data.len()));
        };

        let error = if selector == panic_error().selector() {
            panic_error()
        } else if selector == legacy_error().selector() {
            legacy_error()
        } else {
            match self.error_selectors.get(&selector) {
                Some(&i) => &self.errors[i],
                None => {
                    debug!("No error with selector {} in the ABI", selector);
                    return Err(AbiError::UnknownErrorSelector(selector));
                }
            }
        };

        let fields = error.decode_fields(&data[Selector::LEN..])?;
        Ok((error, fields))
    }
}

impl fmt::Display for ContractAbi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        writeln!(f, "    {}", self.constructor)?;
        if let Some(fallback) = &self.fallback {
            writeln!(f, "    {fallback}")?;
        }
        if let Some(receive) = &self.receive {
            writeln!(f, "    {receive}")?;
        }
        for method in self.methods.iter().flat_map(MultiMethod::methods) {
            writeln!(f, "    {method}")?;
        }
        for event in &self.events {
            writeln!(f, "    {event}")?;
        }
        for error in &self.errors {
            writeln!(f, "    {error}")?;
        }
        write!(f, "}}")
    }
}

/// Collects ABI entries; validation happens in [`build`](Self::build)
#[derive(Debug, Clone, Default)]
pub struct ContractAbiBuilder {
    constructors: Vec<Constructor>,
    fallbacks: Vec<Fallback>,
    receives: Vec<Receive>,
    methods: Vec<Method>,
    events: Vec<Event>,
    errors: Vec<Error>,
}

impl ContractAbiBuilder {
    /// Declare the constructor
    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Declare the fallback function
    pub fn fallback(mut self, fallback: Fallback) -> Self {
        self.fallbacks.push(fallback);
        self
    }

    /// Declare the receive function
    pub fn receive(mut self, receive: Receive) -> Self {
        self.receives.push(receive);
        self
    }

    /// Add a method; same-named methods become overloads
    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Add an event
    pub fn event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    /// Add a custom error
    pub fn error(mut self, error: Error) -> Self {
        self.errors.push(error);
        self
    }

    /// Add a JSON ABI entry
    pub fn entry(self, entry: &AbiEntry) -> Result<Self, AbiError> {
        let builder = match entry.entry_type.as_str() {
            "constructor" => self.constructor(constructor_from_json(entry)?),
            "function" => self.method(method_from_json(entry)?),
            "fallback" => {
                let payable = special_from_json("Fallback", entry)?;
                self.fallback(Fallback::new(payable))
            }
            "receive" => {
                let payable = special_from_json("Receive", entry)?;
                self.receive(Receive::new(payable))
            }
            "event" => self.event(event_from_json(entry)?),
            "error" => self.error(error_from_json(entry)?),
            other => {
                return Err(AbiError::declaration(format!("Unknown ABI entry type: {other}")))
            }
        };
        Ok(builder)
    }

    /// Validate and assemble
    pub fn build(self) -> Result<ContractAbi, AbiError> {
        let constructor = at_most_one(self.constructors, "more than one constructor declarations")?
            .unwrap_or_default();
        let fallback = at_most_one(self.fallbacks, "more than one fallback declarations")?;
        let receive = at_most_one(self.receives, "more than one receive method declarations")?;

        let mut methods: Vec<MultiMethod> = Vec::new();
        let mut method_index = HashMap::new();
        for method in self.methods {
            match method_index.get(method.name()) {
                Some(&i) => {
                    let multi: &mut MultiMethod = &mut methods[i];
                    multi.add(method)?;
                }
                None => {
                    method_index.insert(method.name().to_string(), methods.len());
                    methods.push(MultiMethod::new(method));
                }
            }
        }

        let event_index = index_by_name(&self.events, Event::name)?;
        let error_index = index_by_name(&self.errors, Error::name)?;

        let mut error_selectors = HashMap::new();
        for (i, error) in self.errors.iter().enumerate() {
            if let Some(&other) = error_selectors.get(&error.selector()) {
                let other: &Error = &self.errors[other];
                return Err(AbiError::declaration(format!(
                    "errors `{}` and `{}` share the selector {}",
                    other.name(),
                    error.name(),
                    error.selector()
                )));
            }
            error_selectors.insert(error.selector(), i);
        }

        debug!(
            "Assembled contract ABI: {} methods, {} events, {} errors",
            methods.len(),
            self.events.len(),
            self.errors.len()
        );

        Ok(ContractAbi {
            constructor,
            fallback,
            receive,
            methods,
            method_index,
            events: self.events,
            event_index,
            errors: self.errors,
            error_index,
            error_selectors,
        })
    }
}

fn at_most_one<T>(mut items: Vec<T>, message: &str) -> Result<Option<T>, AbiError> {
    if items.len() > 1 {
        return Err(AbiError::declaration(format!("JSON ABI contains {message}")));
    }
    Ok(items.pop())
}

fn index_by_name<T>(items: &[T], name: fn(&T) -> &str) -> Result<HashMap<String, usize>, AbiError> {
    let mut index = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if index.insert(name(item).to_string(), i).is_some() {
            return Err(AbiError::declaration(format!(
                "JSON ABI contains more than one declarations of `{}`",
                name(item)
            )));
        }
    }
    Ok(index)
}

/// `stateMutability`, or the pre-0.5 `payable`/`constant` flags
fn entry_mutability(entry: &AbiEntry) -> Result<Mutability, AbiError> {
    if let Some(mutability) = &entry.state_mutability {
        return mutability.parse();
    }
    Ok(match (entry.payable, entry.constant) {
        (Some(true), _) => Mutability::Payable,
        (_, Some(true)) => Mutability::View,
        _ => Mutability::Nonpayable,
    })
}

fn entry_name<'a>(kind: &str, entry: &'a AbiEntry) -> Result<&'a str, AbiError> {
    match entry.name.as_deref() {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(AbiError::declaration(format!("{kind}'s JSON entry must have a `name`"))),
    }
}

/// Only `nonpayable` and `payable` are allowed; returns whether it is payable
fn payable_only(kind: &str, entry: &AbiEntry) -> Result<bool, AbiError> {
    match entry_mutability(entry)? {
        Mutability::Payable => Ok(true),
        Mutability::Nonpayable => Ok(false),
        _ => Err(AbiError::declaration(format!(
            "{kind}'s JSON entry state mutability must be `nonpayable` or `payable`"
        ))),
    }
}

fn constructor_from_json(entry: &AbiEntry) -> Result<Constructor, AbiError> {
    if entry.name.is_some() {
        return Err(AbiError::declaration("Constructor's JSON entry cannot have a `name`"));
    }
    if !entry.outputs().is_empty() {
        return Err(AbiError::declaration(
            "Constructor's JSON entry cannot have non-empty `outputs`",
        ));
    }
    let payable = payable_only("Constructor", entry)?;
    Ok(Constructor::new(dispatch_fields(entry.inputs())?, payable))
}

fn special_from_json(kind: &str, entry: &AbiEntry) -> Result<bool, AbiError> {
    if !entry.inputs().is_empty() {
        return Err(AbiError::declaration(format!(
            "{kind}'s JSON entry cannot have non-empty `inputs`"
        )));
    }
    if !entry.outputs().is_empty() {
        return Err(AbiError::declaration(format!(
            "{kind}'s JSON entry cannot have non-empty `outputs`"
        )));
    }
    payable_only(kind, entry)
}

fn method_from_json(entry: &AbiEntry) -> Result<Method, AbiError> {
    let name = entry_name("Function", entry)?;
    let mutability = entry_mutability(entry)?;
    let inputs = dispatch_fields(entry.inputs())?;
    match entry.outputs() {
        [output] if output.name.is_empty() => Ok(Method::with_single_output(
            name,
            mutability,
            inputs,
            output.to_type()?,
        )),
        outputs => Ok(Method::new(name, mutability, inputs, dispatch_fields(outputs)?)),
    }
}

fn event_from_json(entry: &AbiEntry) -> Result<Event, AbiError> {
    let name = entry_name("Event", entry)?;
    let fields = dispatch_fields(entry.inputs())?;
    let indexed = entry.inputs().iter().map(|param| param.indexed).collect();
    Event::from_flags(name, fields, indexed, entry.anonymous)
}

fn error_from_json(entry: &AbiEntry) -> Result<Error, AbiError> {
    let name = entry_name("Error", entry)?;
    Ok(Error::new(name, dispatch_fields(entry.inputs())?))
}
