//! Type expression lexing.
//!
//! A parameter's `type` is either one name (`Number`, `String[]`, `p5.Color`)
//! or several alternatives joined by `|`. The lexer only has to recognise
//! names and separators; anything else is reported and kept verbatim so the
//! unregistered-type policy can deal with it.

use crate::diag::{Diag, Span};
use logos::Logos;
use smol_str::SmolStr;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum TypeToken {
    #[token("|")]
    Pipe,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$.]*(\[\])*")]
    Name,
}

/// One `|`-separated alternative, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub text: SmolStr,
    /// Location of `text` inside the full expression.
    pub span: Span,
}

impl Alternative {
    /// True for conventional enum-constant spelling: `[A-Z_]+`.
    pub fn is_constant(&self) -> bool {
        is_constant_token(&self.text)
    }
}

/// Result of splitting a type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr {
    pub alternatives: Vec<Alternative>,
    /// True when the source contained at least one `|`.
    pub is_union: bool,
    pub diagnostics: Vec<Diag>,
}

impl TypeExpr {
    /// True when there is at least one alternative and all are constants.
    pub fn is_enum(&self) -> bool {
        !self.alternatives.is_empty() && self.alternatives.iter().all(Alternative::is_constant)
    }
}

/// Returns true if `token` is spelled like an enum constant.
pub fn is_constant_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_uppercase() || b == b'_')
}

/// Splits a type expression into its alternatives.
pub fn split_alternatives(source: &str) -> TypeExpr {
    let mut alternatives = Vec::new();
    let mut diagnostics = Vec::new();
    let mut is_union = false;
    let mut segment_start = 0;

    let mut lexer = TypeToken::lexer(source);
    while let Some(token) = lexer.next() {
        match token {
            Ok(TypeToken::Pipe) => {
                is_union = true;
                let pipe = lexer.span();
                push_segment(source, segment_start..pipe.start, &mut alternatives, &mut diagnostics);
                segment_start = pipe.end;
            }
            Ok(TypeToken::Name) => {}
            Err(()) => {
                let span = lexer.span();
                diagnostics.push(
                    Diag::warning(format!(
                        "unexpected '{}' in type expression",
                        &source[span.clone()]
                    ))
                    .with_primary_label(span, "not part of a type name")
                    .with_code("param::invalid_type_token"),
                );
            }
        }
    }
    push_segment(source, segment_start..source.len(), &mut alternatives, &mut diagnostics);

    TypeExpr {
        alternatives,
        is_union,
        diagnostics,
    }
}

fn push_segment(
    source: &str,
    segment: Span,
    alternatives: &mut Vec<Alternative>,
    diagnostics: &mut Vec<Diag>,
) {
    let raw = &source[segment.clone()];
    let text = raw.trim();
    if text.is_empty() {
        diagnostics.push(
            Diag::warning("empty alternative in type expression")
                .with_primary_label(segment, "nothing between separators")
                .with_code("param::empty_alternative"),
        );
        return;
    }
    let leading = raw.len() - raw.trim_start().len();
    let start = segment.start + leading;
    alternatives.push(Alternative {
        text: SmolStr::from(text),
        span: start..start + text.len(),
    });
}
