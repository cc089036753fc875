//! Overload-aware validation of runtime arguments.
//!
//! Given a [`Catalog`] of documented functions (each with one or more
//! overloads of positional, possibly optional parameters) and a concrete
//! argument list, [`Validator`] decides whether some overload accepts the
//! arguments and, if none does, reports which position failed and why.
//!
//! # Example
//!
//! ```
//! use param_validator::{Catalog, Validator, Value};
//!
//! let catalog = Catalog::from_json_str(r#"{ "p5": { "fill": { "overloads": [
//!     { "params": [ { "name": "value", "type": "String" } ] },
//!     { "params": [
//!         { "name": "v1", "type": "Number" },
//!         { "name": "v2", "type": "Number" },
//!         { "name": "v3", "type": "Number" },
//!         { "name": "alpha", "type": "Number", "optional": true }
//!     ] }
//! ] } } }"#).unwrap();
//!
//! let validator = Validator::new(&catalog);
//! assert!(validator.is_valid("fill", &[Value::from("Black")]));
//! assert!(validator.is_valid("p5.fill", &[255.into(), 255.into(), 255.into()]));
//! assert!(!validator.is_valid("fill", &[Value::from(true)]));
//! ```

pub mod cache;
pub mod catalog;
pub mod compiler;
pub mod diag;
pub mod matcher;
pub mod registry;
pub mod type_expr;
pub mod validator;
pub mod value;

pub use cache::{CacheStats, SchemaCache};
pub use catalog::{Catalog, CatalogError, FunctionEntry, FunctionId, Overload, ParamDecl};
pub use compiler::{CompileDiagnostic, CompiledFunction, SchemaCompiler};
pub use diag::{Diag, DiagLabel, DiagSeverity, LabelRole, SourceFile, Span};
pub use matcher::{FunctionMatcher, Matcher, OverloadMatcher};
pub use registry::{Predicate, PrimitiveKind, TypeRegistry};
pub use validator::{ValidateError, ValidationConfig, ValidationFailure, Validator};
pub use value::Value;
