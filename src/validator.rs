//! Argument validation entry point.
//!
//! [`Validator`] ties together a borrowed [`Catalog`], a [`TypeRegistry`]
//! and a [`SchemaCache`]. Each function's parameter schema is compiled on
//! first use and reused afterwards.
//!
//! # Example
//!
//! ```
//! use param_validator::{Catalog, Validator, Value, ValidateError};
//!
//! let catalog = Catalog::from_json_str(r#"{ "p5": { "blendMode": {
//!     "overloads": [{ "params": [{ "name": "mode", "type": "BLEND|MULTIPLY" }] }]
//! } } }"#).unwrap();
//! let validator = Validator::new(&catalog);
//!
//! let ok = [Value::from("MULTIPLY")];
//! assert!(validator.validate("blendMode", &ok).is_ok());
//!
//! let bad = [Value::from("multiply")];
//! let Err(ValidateError::Validation(failure)) = validator.validate("p5.blendMode", &bad) else {
//!     panic!("expected a validation failure");
//! };
//! assert_eq!(failure.position, 0);
//! assert_eq!(failure.actual, "string");
//! ```

use crate::cache::{CacheStats, SchemaCache};
use crate::catalog::{Catalog, FunctionId};
use crate::compiler::{CompiledFunction, SchemaCompiler};
use crate::diag::Diag;
use crate::registry::{Predicate, TypeRegistry};
use crate::value::Value;
use smol_str::SmolStr;
use std::fmt;
use std::sync::Arc;

/// Why an argument list was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Qualified identifier, e.g. `p5.fill`.
    pub function_id: String,
    /// First failing position in the closest overload.
    pub position: usize,
    /// Description of what that position accepts.
    pub expected: String,
    /// Runtime shape of the value found there (`undefined` if omitted).
    pub actual: String,
    /// Index of the overload the failure is reported against.
    pub overload: usize,
    /// Number of overloads that were tried.
    pub overload_count: usize,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(): argument {} expected {}, got {}",
            self.function_id, self.position, self.expected, self.actual
        )
    }
}

/// Errors returned by [`Validator::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateError {
    /// The identifier has no catalog entry.
    UnknownFunction { function_id: String },
    /// No overload accepts the arguments.
    Validation(ValidationFailure),
}

impl fmt::Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidateError::UnknownFunction { function_id } => {
                write!(f, "function '{}' not found in catalog", function_id)
            }
            ValidateError::Validation(failure) => write!(f, "{}", failure),
        }
    }
}

impl std::error::Error for ValidateError {}

impl ValidateError {
    /// Converts this error to a diagnostic.
    pub fn to_diag(&self) -> Diag {
        match self {
            ValidateError::UnknownFunction { function_id } => {
                Diag::error(format!("function '{}' not found in catalog", function_id))
                    .with_help(format!(
                        "check that '{}' is documented in the loaded catalog",
                        function_id
                    ))
                    .with_code("param::unknown_function")
            }
            ValidateError::Validation(failure) => {
                let mut diag = Diag::error(format!(
                    "{}() received an invalid argument at position {}",
                    failure.function_id, failure.position
                ))
                .with_help(format!(
                    "expected {}, but received {}",
                    failure.expected, failure.actual
                ))
                .with_code("param::validation_failure");
                if failure.overload_count > 1 {
                    diag = diag.with_note(format!(
                        "no overload matched; reported against overload {} of {}",
                        failure.overload + 1,
                        failure.overload_count
                    ));
                }
                diag
            }
        }
    }

    /// Returns the failure details for a rejected argument list.
    pub fn as_failure(&self) -> Option<&ValidationFailure> {
        match self {
            ValidateError::Validation(failure) => Some(failure),
            ValidateError::UnknownFunction { .. } => None,
        }
    }
}

/// Configuration for validation.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Namespace used for identifiers without a `.`.
    pub default_namespace: SmolStr,

    /// Record and log unregistered type names found while compiling.
    pub warn_on_unregistered_types: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            default_namespace: SmolStr::new_static("p5"),
            warn_on_unregistered_types: true,
        }
    }
}

/// Validates argument lists against a catalog.
///
/// `Validator` is `Send + Sync`; one instance can serve many threads.
#[derive(Debug)]
pub struct Validator<'c> {
    catalog: &'c Catalog,
    registry: TypeRegistry,
    cache: SchemaCache,
    config: ValidationConfig,
}

impl<'c> Validator<'c> {
    /// Creates a validator with the baseline registry and default config.
    pub fn new(catalog: &'c Catalog) -> Self {
        Self::with_config(catalog, ValidationConfig::default())
    }

    /// Creates a validator with custom configuration.
    pub fn with_config(catalog: &'c Catalog, config: ValidationConfig) -> Self {
        Self {
            catalog,
            registry: TypeRegistry::default(),
            cache: SchemaCache::new(),
            config,
        }
    }

    /// Replaces the type registry.
    pub fn with_registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self.cache.clear();
        self
    }

    /// Sets the namespace for identifiers without a `.`.
    pub fn with_default_namespace(mut self, namespace: impl Into<SmolStr>) -> Self {
        self.config.default_namespace = namespace.into();
        self.cache.clear();
        self
    }

    /// Enables or disables unregistered-type diagnostics.
    pub fn with_unregistered_type_warnings(mut self, enabled: bool) -> Self {
        self.config.warn_on_unregistered_types = enabled;
        self.cache.clear();
        self
    }

    /// Registers a type predicate.
    ///
    /// Compiled schemas depend on the registry, so the cache is cleared.
    pub fn register_type(&mut self, name: impl Into<SmolStr>, predicate: impl Into<Predicate>) {
        self.registry.register(name, predicate);
        self.cache.clear();
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Resolves an identifier using the configured default namespace.
    pub fn resolve_id(&self, function_id: &str) -> FunctionId {
        FunctionId::parse(function_id, &self.config.default_namespace)
    }

    /// Returns the compiled schema for a function, compiling it if needed.
    pub fn compiled(&self, function_id: &str) -> Result<Arc<CompiledFunction>, ValidateError> {
        let id = self.resolve_id(function_id);
        let key = id.to_string();
        self.cache.get_or_build(&key, || {
            SchemaCompiler::new(&self.registry)
                .with_unregistered_warnings(self.config.warn_on_unregistered_types)
                .compile(self.catalog, &id)
        })
    }

    /// Validates `args` against every overload of `function_id`.
    ///
    /// On success the arguments are handed back unchanged. On failure the
    /// error describes the first bad position of the closest overload: the
    /// one with the fewest failing positions, earliest declared on a tie.
    pub fn validate<'a>(
        &self,
        function_id: &str,
        args: &'a [Value],
    ) -> Result<&'a [Value], ValidateError> {
        let compiled = self.compiled(function_id)?;
        let overloads = compiled.matcher.overloads();

        let mut closest = None;
        for (index, overload) in overloads.iter().enumerate() {
            let check = overload.check(args);
            if check.is_match() {
                return Ok(args);
            }
            let failures = check.failures.len();
            let closer = match &closest {
                Some((_, best, _)) => failures < *best,
                None => true,
            };
            if closer {
                closest = Some((index, failures, check));
            }
        }

        let failure = match closest {
            Some((overload, _, check)) => {
                let first = check.failures.into_iter().next();
                let (position, expected, actual) = match first {
                    Some(f) => (f.position, f.expected, f.actual),
                    None => (0, String::new(), String::new()),
                };
                ValidationFailure {
                    function_id: compiled.id.to_string(),
                    position,
                    expected,
                    actual,
                    overload,
                    overload_count: overloads.len(),
                }
            }
            // Compiled functions always have at least one overload.
            None => ValidationFailure {
                function_id: compiled.id.to_string(),
                position: 0,
                expected: "no overloads".to_string(),
                actual: args.first().map_or("undefined", Value::type_name).to_string(),
                overload: 0,
                overload_count: 0,
            },
        };
        Err(ValidateError::Validation(failure))
    }

    /// Validates and reports only whether the arguments were accepted.
    pub fn is_valid(&self, function_id: &str, args: &[Value]) -> bool {
        self.validate(function_id, args).is_ok()
    }
}
