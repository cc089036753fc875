//! Type predicate registry.
//!
//! Maps a primitive type name as it appears in the catalog (`Number`,
//! `String[]`, ...) to a [`Predicate`]. The baseline vocabulary is a closed
//! set of [`PrimitiveKind`]s; hosts add their own names (for example
//! `p5.Color`) with [`TypeRegistry::register`].

use crate::value::Value;
use smol_str::SmolStr;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Built-in primitive checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Any present value, including `null`.
    Any,
    /// An array of anything.
    Array,
    Boolean,
    Function,
    /// A finite number with no fractional part.
    Integer,
    /// Any number except NaN.
    Number,
    NumberArray,
    /// Any non-null, non-array object, including opaque host objects.
    Object,
    String,
    StringArray,
}

impl PrimitiveKind {
    /// Tests a value against this kind.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            PrimitiveKind::Any => !value.is_absent(),
            PrimitiveKind::Array => matches!(value, Value::Array(_)),
            PrimitiveKind::Boolean => matches!(value, Value::Bool(_)),
            PrimitiveKind::Function => matches!(value, Value::Function(_)),
            PrimitiveKind::Integer => {
                matches!(value, Value::Number(n) if n.is_finite() && n.fract() == 0.0)
            }
            PrimitiveKind::Number => matches!(value, Value::Number(n) if !n.is_nan()),
            PrimitiveKind::NumberArray => match value {
                Value::Array(items) => items.iter().all(|v| PrimitiveKind::Number.accepts(v)),
                _ => false,
            },
            PrimitiveKind::Object => matches!(value, Value::Object(_) | Value::Opaque(_)),
            PrimitiveKind::String => matches!(value, Value::String(_)),
            PrimitiveKind::StringArray => match value {
                Value::Array(items) => items.iter().all(|v| matches!(v, Value::String(_))),
                _ => false,
            },
        }
    }

    /// Canonical catalog spelling.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Any => "Any",
            PrimitiveKind::Array => "Array",
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Function => "Function",
            PrimitiveKind::Integer => "Integer",
            PrimitiveKind::Number => "Number",
            PrimitiveKind::NumberArray => "Number[]",
            PrimitiveKind::Object => "Object",
            PrimitiveKind::String => "String",
            PrimitiveKind::StringArray => "String[]",
        }
    }
}

/// Host-supplied check for a custom type name.
#[derive(Clone)]
pub struct CustomPredicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl CustomPredicate {
    pub fn new(check: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(check))
    }

    pub fn accepts(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomPredicate(..)")
    }
}

/// A registered check.
#[derive(Debug, Clone)]
pub enum Predicate {
    Builtin(PrimitiveKind),
    Custom(CustomPredicate),
}

impl Predicate {
    /// Wraps a closure as a custom predicate.
    pub fn custom(check: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Predicate::Custom(CustomPredicate::new(check))
    }

    /// Accepts exactly the opaque host objects of the given class.
    pub fn instance_of(class: impl Into<SmolStr>) -> Self {
        let class = class.into();
        Predicate::custom(move |value| matches!(value, Value::Opaque(c) if *c == class))
    }

    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Predicate::Builtin(kind) => kind.accepts(value),
            Predicate::Custom(custom) => custom.accepts(value),
        }
    }
}

impl From<PrimitiveKind> for Predicate {
    fn from(kind: PrimitiveKind) -> Self {
        Predicate::Builtin(kind)
    }
}

/// Name -> predicate table.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    entries: HashMap<SmolStr, Predicate>,
}

impl TypeRegistry {
    /// Creates a registry with no entries at all.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Creates a registry pre-populated with the baseline vocabulary.
    ///
    /// `RegExp` maps to the string check: a pattern argument is accepted in
    /// its source form.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for kind in [
            PrimitiveKind::Any,
            PrimitiveKind::Array,
            PrimitiveKind::Boolean,
            PrimitiveKind::Function,
            PrimitiveKind::Integer,
            PrimitiveKind::Number,
            PrimitiveKind::NumberArray,
            PrimitiveKind::Object,
            PrimitiveKind::String,
            PrimitiveKind::StringArray,
        ] {
            registry.register(kind.name(), kind);
        }
        registry.register("RegExp", PrimitiveKind::String);
        registry
    }

    /// Adds or overwrites the predicate for `name`.
    pub fn register(&mut self, name: impl Into<SmolStr>, predicate: impl Into<Predicate>) {
        self.entries.insert(name.into(), predicate.into());
    }

    pub fn lookup(&self, name: &str) -> Option<&Predicate> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(SmolStr::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
