//! Function signatures and argument binding.
//!
//! A [`Signature`] names a function, declares its parameters with their
//! schemas, and optionally declares a return schema. Binding a call's
//! [`CallArgs`] against it yields [`BoundArgs`] or a [`ValidationFailure`]
//! titled after the function and tagged [`ValidationPhase::Arguments`].
//!
//! Issue locations follow the call shape: a value passed positionally is
//! located by its index, a value passed by keyword by its name.
//!
//! # Example
//!
//! ```rust
//! use safecall::{CallArgs, Schema, Signature};
//! use serde_json::json;
//!
//! let signature = Signature::new("botched_args")
//!     .param("a", Schema::integer())
//!     .param_default("b", Schema::integer(), json!(0));
//!
//! let failure = signature.bind(&CallArgs::new().kwarg("a", "A")).unwrap_err();
//! assert_eq!(failure.title(), "botched_args");
//! assert_eq!(failure.first().kind, "int_parsing");
//! assert_eq!(failure.first().location.to_string(), "a");
//!
//! let bound = signature.bind(&CallArgs::new().arg("7")).unwrap();
//! assert_eq!(bound.parse::<i64>("a").unwrap(), 7);
//! assert_eq!(bound.parse::<i64>("b").unwrap(), 0);
//! ```

use std::collections::HashSet;
use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::error::{
    ConfigError, Fault, ValidationFailure, ValidationIssue, ValidationIssues, ValidationPhase,
};
use crate::path::Location;
use crate::schema::ValueValidator;

struct Param {
    name: String,
    schema: Box<dyn ValueValidator>,
    default: Option<Value>,
}

/// The declared shape of a wrapped function.
pub struct Signature {
    name: String,
    params: Vec<Param>,
    returns: Option<Box<dyn ValueValidator>>,
}

impl Signature {
    /// Creates a signature for the function `name` with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: None,
        }
    }

    /// Adds a required parameter.
    pub fn param<S>(mut self, name: impl Into<String>, schema: S) -> Self
    where
        S: ValueValidator + 'static,
    {
        self.params.push(Param {
            name: name.into(),
            schema: Box::new(schema),
            default: None,
        });
        self
    }

    /// Adds a parameter that takes `default` when not supplied. Defaults are
    /// not validated.
    pub fn param_default<S>(mut self, name: impl Into<String>, schema: S, default: Value) -> Self
    where
        S: ValueValidator + 'static,
    {
        self.params.push(Param {
            name: name.into(),
            schema: Box::new(schema),
            default: Some(default),
        });
        self
    }

    /// Declares the schema the return value must satisfy.
    pub fn returns<S>(mut self, schema: S) -> Self
    where
        S: ValueValidator + 'static,
    {
        self.returns = Some(Box::new(schema));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter names in declaration order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }

    pub fn has_return_schema(&self) -> bool {
        self.returns.is_some()
    }

    /// Rejects signatures that declare a parameter twice.
    pub fn check(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for param in &self.params {
            if !seen.insert(param.name.as_str()) {
                return Err(ConfigError::DuplicateParameter {
                    function: self.name.clone(),
                    param: param.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Binds `args` to the parameters and validates each value.
    ///
    /// Every binding and schema issue is collected before failing.
    pub fn bind(&self, args: &CallArgs) -> Result<BoundArgs, ValidationFailure> {
        let mut issues = Vec::new();
        let mut supplied: Vec<Option<(Location, &Value)>> = vec![None; self.params.len()];

        for (i, value) in args.positional.iter().enumerate() {
            match supplied.get_mut(i) {
                Some(slot) => *slot = Some((Location::from_index(i), value)),
                None => issues.push(ValidationIssue::new(
                    "unexpected_positional_argument",
                    Location::from_index(i),
                    "Unexpected positional argument",
                    value.clone(),
                )),
            }
        }

        for (name, value) in &args.keywords {
            let location = Location::from_field(name.as_str());
            match self.params.iter().position(|p| &p.name == name) {
                Some(i) if supplied[i].is_some() => issues.push(ValidationIssue::new(
                    "multiple_argument_values",
                    location,
                    "Got multiple values for argument",
                    value.clone(),
                )),
                Some(i) => supplied[i] = Some((location, value)),
                None => issues.push(ValidationIssue::new(
                    "unexpected_keyword_argument",
                    location,
                    "Unexpected keyword argument",
                    value.clone(),
                )),
            }
        }

        let mut values = IndexMap::with_capacity(self.params.len());
        for (param, slot) in self.params.iter().zip(supplied) {
            match (slot, &param.default) {
                (Some((location, value)), _) => {
                    match param.schema.validate_value(value, &location) {
                        Validation::Success(v) => {
                            values.insert(param.name.clone(), v);
                        }
                        Validation::Failure(e) => issues.extend(e),
                    }
                }
                (None, Some(default)) => {
                    values.insert(param.name.clone(), default.clone());
                }
                (None, None) => issues.push(ValidationIssue::new(
                    "missing_argument",
                    Location::from_field(param.name.as_str()),
                    "Missing required argument",
                    args.to_value(),
                )),
            }
        }

        match ValidationIssues::from_vec(issues) {
            Some(issues) => Err(ValidationFailure::new(self.name.as_str(), issues)
                .with_phase(ValidationPhase::Arguments)),
            None => Ok(BoundArgs { values }),
        }
    }

    /// Validates a serialized return value against the return schema, at the
    /// root location. Without a return schema the value passes unchanged.
    pub fn check_return(&self, value: &Value) -> Result<Value, ValidationFailure> {
        let schema = match &self.returns {
            Some(schema) => schema,
            None => return Ok(value.clone()),
        };
        schema
            .validate_value(value, &Location::root())
            .into_result()
            .map_err(|issues| {
                ValidationFailure::new(self.name.as_str(), issues)
                    .with_phase(ValidationPhase::Return)
            })
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("name", &self.name)
            .field("params", &self.param_names().collect::<Vec<_>>())
            .field("returns", &self.has_return_schema())
            .finish()
    }
}

/// The arguments of one call: positional values, then keyword values in the
/// order they were given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<Value>,
    keywords: IndexMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Positional arguments only.
    pub fn positional<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            keywords: IndexMap::new(),
        }
    }

    /// Keyword arguments only.
    pub fn keywords<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            positional: Vec::new(),
            keywords: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a keyword argument. A repeated name replaces the earlier value.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.insert(name.into(), value.into());
        self
    }

    pub fn args(&self) -> &[Value] {
        &self.positional
    }

    pub fn kwargs(&self) -> &IndexMap<String, Value> {
        &self.keywords
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }

    /// `{"args": [...], "kwargs": {...}}`, the input reported for missing
    /// arguments.
    pub fn to_value(&self) -> Value {
        let kwargs: Map<String, Value> = self
            .keywords
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let mut map = Map::new();
        map.insert("args".to_string(), Value::Array(self.positional.clone()));
        map.insert("kwargs".to_string(), Value::Object(kwargs));
        Value::Object(map)
    }
}

/// Renders as `*(1, "x"), **{"a": 2}`; a single positional keeps its
/// trailing comma, `*(1,)`.
impl Display for CallArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("*(")?;
        for (i, value) in self.positional.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        if self.positional.len() == 1 {
            f.write_str(",")?;
        }
        f.write_str("), **{")?;
        for (i, (name, value)) in self.keywords.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?}: {}", name, value)?;
        }
        f.write_str("}")
    }
}

/// Validated arguments, keyed by parameter name in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    values: IndexMap<String, Value>,
}

impl BoundArgs {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Deserializes the argument `name` into `T`.
    ///
    /// A missing argument is a `KeyError` fault, a value `T` cannot be built
    /// from a `TypeError` fault.
    pub fn parse<T: DeserializeOwned>(&self, name: &str) -> Result<T, Fault> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| Fault::new("KeyError", format!("'{}'", name)))?;
        serde_json::from_value(value.clone())
            .map_err(|e| Fault::from_error(e).with_kind("TypeError"))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
