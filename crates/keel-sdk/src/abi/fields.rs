//! Parameter lists: argument binding and tuple encoding/decoding

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Index;
use std::sync::OnceLock;

use super::decode::decode_tuple;
use super::encode::encode;
use super::types::Type;
use super::value::Value;
use crate::error::AbiError;

/// A single declared parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: Option<String>,
    ty: Type,
}

impl Param {
    /// Named parameter
    pub fn named(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: Some(name.into()),
            ty,
        }
    }

    /// Anonymous parameter
    pub fn anonymous(ty: Type) -> Self {
        Self { name: None, ty }
    }

    /// Create from an optional name; an empty name means anonymous
    pub fn new(name: Option<String>, ty: Type) -> Self {
        Self {
            name: name.filter(|n| !n.is_empty()),
            ty,
        }
    }

    /// Declared name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declared type
    pub fn ty(&self) -> &Type {
        &self.ty
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} {name}", self.ty),
            None => write!(f, "{}", self.ty),
        }
    }
}

/// Turn a declared name into an identifier usable as a keyword argument.
///
/// Characters outside `[A-Za-z0-9_]` become `_`, a leading digit gets a `_`
/// prefix. Anonymous parameters are addressed as `_<index>`.
pub fn sanitize_identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// An ordered parameter list (method inputs/outputs, event and error fields).
#[derive(Clone)]
pub struct Fields {
    params: Vec<Param>,
    idents: Vec<String>,
    canonical: OnceLock<String>,
}

impl Fields {
    /// Build from parameters; names must be unique once sanitized.
    ///
    /// Anonymous parameters get a positional `_{index}` placeholder, which is
    /// left out of the uniqueness check.
    pub fn new(params: Vec<Param>) -> Result<Self, AbiError> {
        let mut idents = Vec::with_capacity(params.len());
        let mut seen = HashSet::new();
        for (i, param) in params.iter().enumerate() {
            let ident = match param.name() {
                Some(name) => {
                    let ident = sanitize_identifier(name);
                    if !seen.insert(ident.clone()) {
                        return Err(AbiError::declaration(format!(
                            "Duplicate field name: `{name}`"
                        )));
                    }
                    ident
                }
                None => format!("_{i}"),
            };
            idents.push(ident);
        }
        Ok(Self {
            params,
            idents,
            canonical: OnceLock::new(),
        })
    }

    /// Named parameters in declaration order
    pub fn named<S: Into<String>>(
        params: impl IntoIterator<Item = (S, Type)>,
    ) -> Result<Self, AbiError> {
        Self::new(params.into_iter().map(|(n, t)| Param::named(n, t)).collect())
    }

    /// Anonymous parameters
    pub fn anonymous(types: impl IntoIterator<Item = Type>) -> Self {
        let params: Vec<Param> = types.into_iter().map(Param::anonymous).collect();
        let idents = (0..params.len()).map(|i| format!("_{i}")).collect();
        Self {
            params,
            idents,
            canonical: OnceLock::new(),
        }
    }

    /// No parameters
    pub fn empty() -> Self {
        Self::anonymous([])
    }

    /// A single parameter; cannot clash with itself
    pub(crate) fn single(param: Param) -> Self {
        let ident = match param.name() {
            Some(name) => sanitize_identifier(name),
            None => "_0".to_string(),
        };
        Self {
            params: vec![param],
            idents: vec![ident],
            canonical: OnceLock::new(),
        }
    }

    /// Parameters in declaration order
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if there are no parameters
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Declared types in order
    pub fn types(&self) -> impl Iterator<Item = &Type> + Clone {
        self.params.iter().map(|p| &p.ty)
    }

    /// True if at least one parameter has no name
    pub fn has_anonymous(&self) -> bool {
        self.params.iter().any(|p| p.name.is_none())
    }

    /// Keyword identifier of the parameter at `index`
    pub fn identifier(&self, index: usize) -> Option<&str> {
        self.idents.get(index).map(String::as_str)
    }

    /// Position of a parameter by declared name or by identifier
    pub fn position(&self, name: &str) -> Option<usize> {
        self.params
            .iter()
            .zip(&self.idents)
            .position(|(p, ident)| p.name.is_some() && (p.name() == Some(name) || ident == name))
    }

    /// Canonical form, e.g. `(uint8,bool)`
    pub fn canonical_form(&self) -> &str {
        self.canonical.get_or_init(|| {
            let types: Vec<&str> = self.types().map(Type::canonical_form).collect();
            format!("({})", types.join(","))
        })
    }

    /// A new list holding the parameters selected by `keep`, names preserved
    pub(crate) fn subset(&self, keep: impl Fn(usize) -> bool) -> Self {
        let mut params = Vec::new();
        let mut idents = Vec::new();
        for (i, (param, ident)) in self.params.iter().zip(&self.idents).enumerate() {
            if keep(i) {
                params.push(param.clone());
                idents.push(ident.clone());
            }
        }
        Self {
            params,
            idents,
            canonical: OnceLock::new(),
        }
    }

    /// Bind positional and keyword arguments to the parameters.
    ///
    /// Every parameter must be supplied exactly once. Anonymous parameters
    /// can only be passed positionally.
    pub fn bind<'a>(&self, args: &'a Args) -> Result<Vec<&'a Value>, AbiError> {
        let slots = self.bind_partial(args)?;
        slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.ok_or_else(|| {
                    AbiError::Binding(format!(
                        "missing a required argument: '{}'",
                        self.idents[i]
                    ))
                })
            })
            .collect()
    }

    /// Bind arguments, leaving unsupplied parameters as `None`
    pub fn bind_partial<'a, V>(&self, args: &'a Args<V>) -> Result<Vec<Option<&'a V>>, AbiError> {
        if args.positional.len() > self.params.len() {
            return Err(AbiError::Binding(format!(
                "too many positional arguments: expected at most {}, got {}",
                self.params.len(),
                args.positional.len()
            )));
        }

        let mut slots: Vec<Option<&V>> = vec![None; self.params.len()];
        for (slot, value) in slots.iter_mut().zip(&args.positional) {
            *slot = Some(value);
        }

        for (name, value) in &args.named {
            let index = self.position(name).ok_or_else(|| {
                AbiError::Binding(format!("got an unexpected keyword argument '{name}'"))
            })?;
            if slots[index].is_some() {
                return Err(AbiError::Binding(format!("multiple values for argument '{name}'")));
            }
            slots[index] = Some(value);
        }

        Ok(slots)
    }

    /// Bind, normalize and encode the arguments as an ABI tuple
    pub fn encode(&self, args: &Args) -> Result<Vec<u8>, AbiError> {
        let bound = self.bind(args)?;
        self.encode_values(bound)
    }

    /// Normalize and encode values already in declaration order
    pub fn encode_values<'a>(
        &self,
        values: impl IntoIterator<Item = &'a Value>,
    ) -> Result<Vec<u8>, AbiError> {
        let values: Vec<&Value> = values.into_iter().collect();
        if values.len() != self.params.len() {
            return Err(AbiError::Binding(format!(
                "expected {} values, got {}",
                self.params.len(),
                values.len()
            )));
        }
        let tokens = self
            .types()
            .zip(values)
            .map(|(ty, value)| ty.normalize(value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(encode(&tokens))
    }

    /// Decode an ABI tuple into named/positional values
    pub fn decode(&self, data: &[u8]) -> Result<FieldValues, AbiError> {
        let tokens = decode_tuple(self.types(), data)
            .map_err(|e| AbiError::decode(self.canonical_form(), e))?;
        let values = self
            .types()
            .zip(&tokens)
            .map(|(ty, token)| ty.denormalize(token))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.values(values))
    }

    /// Pair values (in declaration order) with the parameter names
    pub(crate) fn values<V>(&self, values: Vec<V>) -> FieldValues<V> {
        FieldValues {
            entries: self
                .params
                .iter()
                .map(|p| p.name.clone())
                .zip(values)
                .collect(),
        }
    }
}

impl PartialEq for Fields {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params
    }
}

impl Eq for Fields {}

impl fmt::Debug for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fields{self}")
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")
    }
}

/// Call arguments: positional values followed by keyword values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args<V = Value> {
    positional: Vec<V>,
    named: Vec<(String, V)>,
}

impl<V> Default for Args<V> {
    fn default() -> Self {
        Self {
            positional: Vec::new(),
            named: Vec::new(),
        }
    }
}

impl<V> Args<V> {
    /// No arguments
    pub fn new() -> Self {
        Self::default()
    }

    /// Positional arguments only
    pub fn positional<T: Into<V>>(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            named: Vec::new(),
        }
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<V>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Append a keyword argument
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<V>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }

    /// Total number of arguments supplied
    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    /// Check if no arguments were supplied
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> From<Vec<V>> for Args<V> {
    fn from(positional: Vec<V>) -> Self {
        Self {
            positional,
            named: Vec::new(),
        }
    }
}

/// Decoded values in declaration order, addressable by position or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValues<V = Value> {
    entries: Vec<(Option<String>, V)>,
}

impl<V> FieldValues<V> {
    /// Number of values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value of a named field
    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_deref() == Some(name))
            .map(|(_, v)| v)
    }

    /// Iterate over `(name, value)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &V)> {
        self.entries.iter().map(|(n, v)| (n.as_deref(), v))
    }

    /// Values in declaration order
    pub fn as_tuple(&self) -> Vec<&V> {
        self.entries.iter().map(|(_, v)| v).collect()
    }

    /// Consume into values in declaration order
    pub fn into_tuple(self) -> Vec<V> {
        self.entries.into_iter().map(|(_, v)| v).collect()
    }

    /// Name → value map; fails if any field is anonymous
    pub fn as_dict(&self) -> Result<HashMap<&str, &V>, AbiError> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, (name, value))| match name {
                Some(name) => Ok((name.as_str(), value)),
                None => Err(AbiError::AnonymousField(i)),
            })
            .collect()
    }
}

impl FieldValues<Value> {
    /// Wrap as a struct value (by name if every field is named)
    pub fn into_value(self) -> Value {
        if self.entries.iter().all(|(n, _)| n.is_some()) {
            Value::named(self.entries.into_iter().filter_map(|(n, v)| n.map(|n| (n, v))))
        } else {
            Value::tuple(self.into_tuple())
        }
    }
}

impl<V> Index<usize> for FieldValues<V> {
    type Output = V;

    fn index(&self, index: usize) -> &V {
        &self.entries[index].1
    }
}

impl<V> Index<&str> for FieldValues<V> {
    type Output = V;

    fn index(&self, name: &str) -> &V {
        match self.get(name) {
            Some(value) => value,
            None => panic!("no field named `{name}`"),
        }
    }
}
