//! Parameter schema compilation.
//!
//! Turns catalog declarations into [`Matcher`]s using a [`TypeRegistry`].
//! Compilation never fails on a bad declaration: unregistered type names and
//! malformed expressions degrade to more permissive matchers and are recorded
//! as [`CompileDiagnostic`]s on the resulting [`CompiledFunction`].
//!
//! | Declaration | Matcher |
//! |---|---|
//! | `Number` | `Primitive(Number)` |
//! | `Foo` (unregistered) | `Primitive(Any)` |
//! | `Number\|String` | `Union[Number, String]` |
//! | `Number\|Foo` | `Union[Number]` |
//! | `Foo\|Bar` | `Primitive(Any)` |
//! | `BLEND\|ADD` | `Enum["BLEND", "ADD"]` |
//! | any, `optional: true` | `Optional(..)` |

use crate::catalog::{Catalog, FunctionEntry, FunctionId, ParamDecl};
use crate::diag::{Diag, SourceFile};
use crate::matcher::{FunctionMatcher, Matcher, OverloadMatcher};
use crate::registry::{PrimitiveKind, TypeRegistry};
use crate::type_expr::{Alternative, split_alternatives};
use crate::validator::ValidateError;
use smol_str::SmolStr;
use std::fmt;

/// A compile-time diagnostic together with the type expression it refers to.
#[derive(Debug, Clone)]
pub struct CompileDiagnostic {
    pub diag: Diag,
    /// The declaration's type expression, named `function#overload:position`.
    pub source: SourceFile,
}

impl CompileDiagnostic {
    /// Renders through miette with the type expression as source.
    pub fn to_report(&self) -> miette::Report {
        crate::diag::convert_diag_to_report(&self.diag, &self.source)
    }
}

/// The cached result of compiling one function.
#[derive(Debug, Clone)]
pub struct CompiledFunction {
    pub id: FunctionId,
    pub matcher: FunctionMatcher,
    pub diagnostics: Vec<CompileDiagnostic>,
}

/// Where a declaration sits, for diagnostics.
#[derive(Debug, Clone, Copy)]
struct ParamSite<'a> {
    function: &'a FunctionId,
    overload: usize,
    position: usize,
}

impl fmt::Display for ParamSite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}:{}", self.function, self.overload, self.position)
    }
}

/// Compiles declarations against a registry.
#[derive(Debug, Clone, Copy)]
pub struct SchemaCompiler<'r> {
    registry: &'r TypeRegistry,
    warn_on_unregistered: bool,
}

impl<'r> SchemaCompiler<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            warn_on_unregistered: true,
        }
    }

    /// Controls whether unregistered type names are reported.
    ///
    /// Matching is the same either way.
    pub fn with_unregistered_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_unregistered = enabled;
        self
    }

    /// Resolves `id` in the catalog and compiles every overload.
    pub fn compile(
        &self,
        catalog: &Catalog,
        id: &FunctionId,
    ) -> Result<CompiledFunction, ValidateError> {
        let entry = catalog
            .get(id)
            .ok_or_else(|| ValidateError::UnknownFunction {
                function_id: id.to_string(),
            })?;
        Ok(self.compile_entry(id, entry))
    }

    /// Compiles one catalog entry.
    ///
    /// An entry without overloads is treated as taking no arguments.
    pub fn compile_entry(&self, id: &FunctionId, entry: &FunctionEntry) -> CompiledFunction {
        let mut diagnostics = Vec::new();

        if entry.overloads.is_empty() {
            diagnostics.push(CompileDiagnostic {
                diag: Diag::note(format!("'{}' declares no overloads", id))
                    .with_help("the function is validated as taking no arguments")
                    .with_code("param::no_overloads"),
                source: SourceFile::with_name("", id.to_string()),
            });
            return CompiledFunction {
                id: id.clone(),
                matcher: FunctionMatcher::Single(OverloadMatcher::new(Vec::new())),
                diagnostics,
            };
        }

        let overloads = entry
            .overloads
            .iter()
            .enumerate()
            .map(|(overload, decl)| {
                let params = decl
                    .params
                    .iter()
                    .enumerate()
                    .map(|(position, param)| {
                        let site = ParamSite {
                            function: id,
                            overload,
                            position,
                        };
                        self.compile_param(param, site, &mut diagnostics)
                    })
                    .collect();
                OverloadMatcher::new(params)
            })
            .collect();

        CompiledFunction {
            id: id.clone(),
            matcher: FunctionMatcher::from_overloads(overloads),
            diagnostics,
        }
    }

    /// Compiles a single declaration outside of any function.
    pub fn compile_decl(&self, decl: &ParamDecl) -> (Matcher, Vec<CompileDiagnostic>) {
        let anonymous = FunctionId::new("", "<anonymous>");
        let site = ParamSite {
            function: &anonymous,
            overload: 0,
            position: 0,
        };
        let mut diagnostics = Vec::new();
        let matcher = self.compile_param(decl, site, &mut diagnostics);
        (matcher, diagnostics)
    }

    fn compile_param(
        &self,
        decl: &ParamDecl,
        site: ParamSite<'_>,
        diagnostics: &mut Vec<CompileDiagnostic>,
    ) -> Matcher {
        let source = SourceFile::with_name(decl.type_expr.as_str(), site.to_string());
        let expr = split_alternatives(&decl.type_expr);
        let is_enum = expr.is_enum();
        for diag in expr.diagnostics {
            tracing::warn!(
                function = %site.function,
                overload = site.overload,
                position = site.position,
                type_expr = %decl.type_expr,
                "{}",
                diag.message
            );
            diagnostics.push(CompileDiagnostic {
                diag,
                source: source.clone(),
            });
        }

        let base = if !expr.is_union {
            match expr.alternatives.first() {
                Some(alt) => self.lookup(alt).unwrap_or_else(|| {
                    self.report_unregistered(alt, site, &source, "falls back to Any", diagnostics);
                    any_matcher()
                }),
                None => any_matcher(),
            }
        } else if is_enum {
            Matcher::Enum(expr.alternatives.into_iter().map(|alt| alt.text).collect())
        } else {
            let members: Vec<Matcher> = expr
                .alternatives
                .iter()
                .filter_map(|alt| {
                    let found = self.lookup(alt);
                    if found.is_none() {
                        self.report_unregistered(
                            alt,
                            site,
                            &source,
                            "dropped from union",
                            diagnostics,
                        );
                    }
                    found
                })
                .collect();
            if members.is_empty() {
                any_matcher()
            } else {
                Matcher::Union(members)
            }
        };

        if decl.optional {
            Matcher::Optional(Box::new(base))
        } else {
            base
        }
    }

    fn lookup(&self, alt: &Alternative) -> Option<Matcher> {
        self.registry
            .lookup(&alt.text)
            .map(|predicate| Matcher::Primitive {
                name: alt.text.clone(),
                predicate: predicate.clone(),
            })
    }

    fn report_unregistered(
        &self,
        alt: &Alternative,
        site: ParamSite<'_>,
        source: &SourceFile,
        effect: &str,
        diagnostics: &mut Vec<CompileDiagnostic>,
    ) {
        if !self.warn_on_unregistered {
            return;
        }
        tracing::warn!(
            function = %site.function,
            overload = site.overload,
            position = site.position,
            type_name = %alt.text,
            "unregistered parameter type, {}",
            effect
        );
        diagnostics.push(CompileDiagnostic {
            diag: Diag::warning(format!("type '{}' is not registered", alt.text))
                .with_primary_label(alt.span.clone(), effect)
                .with_help(format!("register a predicate for '{}'", alt.text))
                .with_note(format!(
                    "in {} overload {} parameter {}",
                    site.function, site.overload, site.position
                ))
                .with_code("param::unregistered_type"),
            source: source.clone(),
        });
    }
}

fn any_matcher() -> Matcher {
    Matcher::Primitive {
        name: SmolStr::new_static("Any"),
        predicate: PrimitiveKind::Any.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Overload;
    use crate::value::Value;

    fn compile(decl: ParamDecl) -> (Matcher, Vec<CompileDiagnostic>) {
        let registry = TypeRegistry::default();
        SchemaCompiler::new(&registry).compile_decl(&decl)
    }

    fn codes(diags: &[CompileDiagnostic]) -> Vec<&str> {
        diags.iter().filter_map(|d| d.diag.code.as_deref()).collect()
    }

    #[test]
    fn single_registered_type() {
        let (m, diags) = compile(ParamDecl::required("x", "Number"));
        assert!(matches!(&m, Matcher::Primitive { name, .. } if name == "Number"));
        assert!(diags.is_empty());
    }

    #[test]
    fn single_unregistered_falls_back_to_any() {
        let (m, diags) = compile(ParamDecl::required("c", "p5.Color"));
        assert!(matches!(&m, Matcher::Primitive { name, .. } if name == "Any"));
        assert!(m.matches(&Value::opaque("p5.Color")));
        assert_eq!(codes(&diags), vec!["param::unregistered_type"]);
        assert_eq!(diags[0].diag.labels[0].span, 0..8);
    }

    #[test]
    fn enum_of_constants() {
        let (m, diags) = compile(ParamDecl::required("mode", "MULTIPLY|DARKEST|LIGHTEST"));
        let Matcher::Enum(constants) = &m else {
            panic!("expected enum, got {:?}", m);
        };
        assert_eq!(constants.len(), 3);
        assert!(diags.is_empty());
    }

    #[test]
    fn single_constant_is_a_type_lookup() {
        let (m, diags) = compile(ParamDecl::required("mode", "CORNER"));
        assert!(matches!(&m, Matcher::Primitive { name, .. } if name == "Any"));
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn union_drops_unregistered_members() {
        let (m, diags) = compile(ParamDecl::required("c", "p5.Color|Number[]|String"));
        let Matcher::Union(members) = &m else {
            panic!("expected union, got {:?}", m);
        };
        assert_eq!(members.len(), 2);
        assert_eq!(m.to_string(), "Number[] | String");
        assert!(!m.matches(&Value::from(true)));
        assert_eq!(codes(&diags), vec!["param::unregistered_type"]);
    }

    #[test]
    fn union_of_only_unregistered_is_any() {
        let (m, diags) = compile(ParamDecl::required("c", "p5.Color|p5.Image"));
        assert!(matches!(&m, Matcher::Primitive { name, .. } if name == "Any"));
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn optional_wraps_every_form() {
        let (m, _) = compile(ParamDecl::optional("a", "Number"));
        assert_eq!(m.to_string(), "Optional(Number)");
        let (m, _) = compile(ParamDecl::optional("mode", "BLEND|ADD"));
        assert!(matches!(&m, Matcher::Optional(inner) if matches!(**inner, Matcher::Enum(_))));
        let (m, _) = compile(ParamDecl::optional("x", "Number|String"));
        assert!(m.matches(&Value::Absent));
    }

    #[test]
    fn warnings_can_be_silenced() {
        let registry = TypeRegistry::default();
        let compiler = SchemaCompiler::new(&registry).with_unregistered_warnings(false);
        let (m, diags) = compiler.compile_decl(&ParamDecl::required("c", "p5.Color|String"));
        assert!(diags.is_empty());
        assert_eq!(m.to_string(), "String");
    }

    #[test]
    fn malformed_expression_still_compiles() {
        let (m, diags) = compile(ParamDecl::required("x", "Number||String"));
        assert_eq!(m.to_string(), "Number | String");
        assert_eq!(codes(&diags), vec!["param::empty_alternative"]);
    }

    #[test]
    fn custom_registration_changes_compilation() {
        let mut registry = TypeRegistry::default();
        registry.register("p5.Color", crate::registry::Predicate::instance_of("p5.Color"));
        let compiler = SchemaCompiler::new(&registry);
        let (m, diags) = compiler.compile_decl(&ParamDecl::required("c", "p5.Color|String"));
        assert!(diags.is_empty());
        assert!(m.matches(&Value::opaque("p5.Color")));
        assert!(!m.matches(&Value::opaque("p5.Vector")));
    }

    #[test]
    fn entry_with_overloads() {
        let registry = TypeRegistry::default();
        let id = FunctionId::new("p5", "fill");
        let entry = FunctionEntry::new(vec![
            Overload::new(vec![ParamDecl::required("value", "String")]),
            Overload::new(vec![
                ParamDecl::required("v1", "Number"),
                ParamDecl::required("v2", "Number"),
                ParamDecl::required("v3", "Number"),
                ParamDecl::optional("alpha", "Number"),
            ]),
        ]);
        let compiled = SchemaCompiler::new(&registry).compile_entry(&id, &entry);
        assert_eq!(compiled.id, id);
        assert!(matches!(compiled.matcher, FunctionMatcher::AnyOf(ref o) if o.len() == 2));
        assert_eq!(compiled.matcher.overloads()[1].min_arity(), 3);
    }

    #[test]
    fn entry_without_overloads_takes_no_arguments() {
        let registry = TypeRegistry::default();
        let id = FunctionId::new("p5", "noLoop");
        let compiled = SchemaCompiler::new(&registry).compile_entry(&id, &FunctionEntry::default());
        assert_eq!(compiled.matcher.first_match(&[]), Some(0));
        assert_eq!(compiled.matcher.first_match(&[1.into()]), None);
        assert_eq!(codes(&compiled.diagnostics), vec!["param::no_overloads"]);
    }

    #[test]
    fn unknown_function() {
        let registry = TypeRegistry::default();
        let err = SchemaCompiler::new(&registry)
            .compile(&Catalog::new(), &FunctionId::new("p5", "nope"))
            .unwrap_err();
        assert!(matches!(err, ValidateError::UnknownFunction { ref function_id } if function_id == "p5.nope"));
    }

    #[test]
    fn diagnostic_renders_with_source_name() {
        let registry = TypeRegistry::default();
        let id = FunctionId::new("p5", "saturation");
        let entry = FunctionEntry::single(vec![ParamDecl::required("color", "p5.Color|Number[]|String")]);
        let compiled = SchemaCompiler::new(&registry).compile_entry(&id, &entry);
        assert_eq!(compiled.diagnostics.len(), 1);
        assert_eq!(compiled.diagnostics[0].source.name(), Some("p5.saturation#0:0"));
        let report = compiled.diagnostics[0].to_report();
        assert_eq!(report.to_string(), "type 'p5.Color' is not registered");
    }
}
