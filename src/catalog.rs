//! In-memory function catalog.
//!
//! The catalog is the parsed form of the reference documentation: for every
//! namespace (class) a map of members, each with one or more overloads of
//! positional parameters. It is read-only once built; the validator only ever
//! borrows it.
//!
//! # Example
//!
//! ```
//! use param_validator::catalog::{Catalog, FunctionId};
//!
//! let catalog = Catalog::from_json_str(r#"{
//!     "p5": {
//!         "blendMode": {
//!             "description": "ignored",
//!             "overloads": [{ "params": [{ "name": "mode", "type": "BLEND|ADD" }] }]
//!         }
//!     }
//! }"#).unwrap();
//!
//! let id = FunctionId::parse("blendMode", "p5");
//! assert!(catalog.get(&id).is_some());
//! ```

use serde::Deserialize;
use smol_str::SmolStr;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Errors raised while turning documentation JSON into a [`Catalog`].
#[derive(Debug)]
pub enum CatalogError {
    /// The input was not valid JSON.
    Json(serde_json::Error),
    /// The JSON root was not an object keyed by namespace.
    NotAnObject,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Json(err) => write!(f, "invalid catalog JSON: {}", err),
            CatalogError::NotAnObject => {
                write!(f, "catalog root must be an object keyed by namespace")
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Json(err) => Some(err),
            CatalogError::NotAnObject => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Json(err)
    }
}

/// Qualified function identifier: namespace plus member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId {
    pub namespace: SmolStr,
    pub member: SmolStr,
}

impl FunctionId {
    /// Creates an identifier from its parts.
    pub fn new(namespace: impl Into<SmolStr>, member: impl Into<SmolStr>) -> Self {
        Self {
            namespace: namespace.into(),
            member: member.into(),
        }
    }

    /// Parses `namespace.member`, splitting on the last `.`.
    ///
    /// `p5.Vector.add` becomes namespace `p5.Vector`, member `add`. An
    /// identifier without a `.` (or with an empty namespace part) lands in
    /// `default_namespace`.
    pub fn parse(id: &str, default_namespace: &str) -> Self {
        match id.rfind('.') {
            Some(dot) if dot > 0 => Self::new(&id[..dot], &id[dot + 1..]),
            Some(dot) => Self::new(default_namespace, &id[dot + 1..]),
            None => Self::new(default_namespace, id),
        }
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.member)
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParamDecl {
    #[serde(default)]
    pub name: Option<SmolStr>,
    /// Type expression, e.g. `Number`, `Number|String` or `BLEND|ADD`.
    #[serde(rename = "type")]
    pub type_expr: SmolStr,
    #[serde(default)]
    pub optional: bool,
}

impl ParamDecl {
    /// Creates a required parameter.
    pub fn required(name: impl Into<SmolStr>, type_expr: impl Into<SmolStr>) -> Self {
        Self {
            name: Some(name.into()),
            type_expr: type_expr.into(),
            optional: false,
        }
    }

    /// Creates an optional parameter.
    pub fn optional(name: impl Into<SmolStr>, type_expr: impl Into<SmolStr>) -> Self {
        Self {
            name: Some(name.into()),
            type_expr: type_expr.into(),
            optional: true,
        }
    }
}

/// One positional signature of a function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Overload {
    #[serde(default)]
    pub params: Vec<ParamDecl>,
}

impl Overload {
    pub fn new(params: Vec<ParamDecl>) -> Self {
        Self { params }
    }
}

/// All overloads of one function, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FunctionEntry {
    #[serde(default)]
    pub overloads: Vec<Overload>,
}

impl FunctionEntry {
    pub fn new(overloads: Vec<Overload>) -> Self {
        Self { overloads }
    }

    /// Shorthand for an entry with a single overload.
    pub fn single(params: Vec<ParamDecl>) -> Self {
        Self::new(vec![Overload::new(params)])
    }
}

/// Namespace -> member -> entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    namespaces: HashMap<SmolStr, HashMap<SmolStr, FunctionEntry>>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses documentation JSON.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_json_value(value)
    }

    /// Builds a catalog from already-parsed documentation JSON.
    ///
    /// Descriptive fields are dropped. Namespace or member values that are
    /// not objects (version strings, module lists and the like) are skipped,
    /// but a member object that does not fit the entry shape is an error.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, CatalogError> {
        let serde_json::Value::Object(root) = value else {
            return Err(CatalogError::NotAnObject);
        };

        let mut catalog = Catalog::new();
        for (namespace, members) in root {
            let serde_json::Value::Object(members) = members else {
                continue;
            };
            for (member, entry) in members {
                if !entry.is_object() {
                    continue;
                }
                let entry = FunctionEntry::deserialize(entry)?;
                catalog.insert(FunctionId::new(namespace.as_str(), member), entry);
            }
        }
        Ok(catalog)
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, id: FunctionId, entry: FunctionEntry) {
        self.namespaces
            .entry(id.namespace)
            .or_default()
            .insert(id.member, entry);
    }

    /// Looks up an entry.
    pub fn get(&self, id: &FunctionId) -> Option<&FunctionEntry> {
        self.namespaces.get(&id.namespace)?.get(&id.member)
    }

    /// Number of functions across all namespaces.
    pub fn len(&self) -> usize {
        self.namespaces.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All qualified identifiers, sorted.
    pub fn function_ids(&self) -> Vec<FunctionId> {
        let mut ids: Vec<FunctionId> = self
            .namespaces
            .iter()
            .flat_map(|(namespace, members)| {
                members
                    .keys()
                    .map(move |member| FunctionId::new(namespace.clone(), member.clone()))
            })
            .collect();
        ids.sort();
        ids
    }

    /// Every distinct type alternative used by any parameter.
    ///
    /// Alternatives are split on `|` and trimmed; empty pieces are ignored.
    pub fn type_vocabulary(&self) -> BTreeSet<SmolStr> {
        self.namespaces
            .values()
            .flat_map(HashMap::values)
            .flat_map(|entry| &entry.overloads)
            .flat_map(|overload| &overload.params)
            .flat_map(|param| param.type_expr.split('|'))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(SmolStr::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILL: &str = r#"{
        "p5": {
            "fill": {
                "description": "Sets the fill color.",
                "overloads": [
                    { "params": [
                        { "name": "v1", "description": "red", "type": "Number" },
                        { "name": "v2", "type": "Number" },
                        { "name": "v3", "type": "Number" },
                        { "name": "alpha", "type": "Number", "optional": true }
                    ] },
                    { "params": [ { "name": "value", "type": "String" } ] }
                ]
            },
            "noLoop": { "overloads": [ { "params": [] } ] }
        },
        "p5.Vector": {
            "add": { "overloads": [ { "params": [ { "name": "x", "type": "Number|Number[]|p5.Vector" } ] } ] }
        },
        "version": "1.11.0"
    }"#;

    #[test]
    fn parse_function_ids() {
        assert_eq!(FunctionId::parse("p5.fill", "p5"), FunctionId::new("p5", "fill"));
        assert_eq!(FunctionId::parse("fill", "p5"), FunctionId::new("p5", "fill"));
        assert_eq!(
            FunctionId::parse("p5.Vector.add", "p5"),
            FunctionId::new("p5.Vector", "add")
        );
        assert_eq!(FunctionId::parse(".fill", "p5"), FunctionId::new("p5", "fill"));
        assert_eq!(FunctionId::new("p5.Vector", "add").to_string(), "p5.Vector.add");
    }

    #[test]
    fn loads_documentation_json() {
        let catalog = Catalog::from_json_str(FILL).unwrap();
        assert_eq!(catalog.len(), 3);

        let fill = catalog.get(&FunctionId::new("p5", "fill")).unwrap();
        assert_eq!(fill.overloads.len(), 2);
        assert_eq!(fill.overloads[0].params.len(), 4);
        assert!(fill.overloads[0].params[3].optional);
        assert!(!fill.overloads[0].params[0].optional);
        assert_eq!(fill.overloads[1].params[0].type_expr, "String");

        let no_loop = catalog.get(&FunctionId::new("p5", "noLoop")).unwrap();
        assert!(no_loop.overloads[0].params.is_empty());
    }

    #[test]
    fn rejects_non_object_root() {
        assert!(matches!(
            Catalog::from_json_str("[1, 2]"),
            Err(CatalogError::NotAnObject)
        ));
        assert!(matches!(Catalog::from_json_str("{"), Err(CatalogError::Json(_))));
    }

    #[test]
    fn rejects_malformed_entry() {
        let json = r#"{ "p5": { "fill": { "overloads": [ { "params": [ { "name": "v" } ] } ] } } }"#;
        assert!(matches!(Catalog::from_json_str(json), Err(CatalogError::Json(_))));
    }

    #[test]
    fn vocabulary_is_distinct_and_sorted() {
        let catalog = Catalog::from_json_str(FILL).unwrap();
        let vocab: Vec<String> = catalog
            .type_vocabulary()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(vocab, vec!["Number", "Number[]", "String", "p5.Vector"]);
    }

    #[test]
    fn function_ids_sorted() {
        let catalog = Catalog::from_json_str(FILL).unwrap();
        let ids: Vec<String> = catalog.function_ids().iter().map(ToString::to_string).collect();
        assert_eq!(ids, vec!["p5.fill", "p5.noLoop", "p5.Vector.add"]);
    }

    #[test]
    fn programmatic_construction() {
        let mut catalog = Catalog::new();
        assert!(catalog.is_empty());
        catalog.insert(
            FunctionId::new("p5", "circle"),
            FunctionEntry::single(vec![
                ParamDecl::required("x", "Number"),
                ParamDecl::required("y", "Number"),
                ParamDecl::required("d", "Number"),
            ]),
        );
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get(&FunctionId::parse("circle", "p5")).is_some());
    }
}
