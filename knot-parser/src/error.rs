// Knot Parser Error Handling
// Diagnostics with miette integration

use crate::ast::Span;
use crate::parser::Rule;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Main parse error type with miette integration
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse error: {message}")]
    #[diagnostic(
        code(knot::parse::syntax_error),
        help("Check the syntax near the highlighted location")
    )]
    Syntax {
        #[source_code]
        src: String,
        #[label("error occurred here")]
        span: SourceSpan,
        message: String,
    },

    #[error("Invalid integer literal: {found}")]
    #[diagnostic(
        code(knot::parse::invalid_integer),
        help("Integer literals must fit in a signed 64-bit integer")
    )]
    InvalidInteger {
        #[source_code]
        src: String,
        #[label("invalid integer")]
        span: SourceSpan,
        found: String,
    },

    #[error("Invalid string escape sequence: {found}")]
    #[diagnostic(
        code(knot::parse::invalid_string_escape),
        help("Valid escape sequences: \\n, \\t, \\r, \\\\, \\\"")
    )]
    InvalidStringEscape {
        #[source_code]
        src: String,
        #[label("invalid escape sequence")]
        span: SourceSpan,
        found: String,
    },

    #[error("Duplicate parameter: {name}")]
    #[diagnostic(
        code(knot::parse::duplicate_parameter),
        help("Each parameter of a function must have a distinct name")
    )]
    DuplicateParameter {
        #[source_code]
        src: String,
        #[label("already declared")]
        span: SourceSpan,
        name: String,
    },

    #[error("Expression is nested {depth} levels deep, more than the limit of {max}")]
    #[diagnostic(
        code(knot::parse::nesting_too_deep),
        help("Split the expression up with intermediate `let` bindings")
    )]
    NestingTooDeep {
        #[source_code]
        src: String,
        #[label("nested too deeply")]
        span: SourceSpan,
        depth: usize,
        max: usize,
    },
}

impl ParseError {
    /// Create a parse error from a Pest parsing error
    pub fn from_pest_error(error: pest::error::Error<Rule>, src: String) -> Self {
        let span = match error.location {
            pest::error::InputLocation::Pos(pos) => SourceSpan::new(pos.into(), 0),
            pest::error::InputLocation::Span((start, end)) => {
                SourceSpan::new(start.into(), end - start)
            }
        };

        let message = match &error.variant {
            pest::error::ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
                let mut expected: Vec<String> =
                    positives.iter().map(rule_to_user_friendly_description).collect();
                expected.sort();
                expected.dedup();
                format!("expected {}", expected.join(" or "))
            }
            pest::error::ErrorVariant::ParsingError { .. } => "unexpected input".to_string(),
            pest::error::ErrorVariant::CustomError { message } => message.clone(),
        };

        ParseError::Syntax { src, span, message }
    }

    pub fn invalid_integer(src: String, span: Span, found: String) -> Self {
        ParseError::InvalidInteger {
            src,
            span: span_to_source_span(span),
            found,
        }
    }

    pub fn invalid_string_escape(src: String, span: Span, found: String) -> Self {
        ParseError::InvalidStringEscape {
            src,
            span: span_to_source_span(span),
            found,
        }
    }

    pub fn duplicate_parameter(src: String, span: Span, name: String) -> Self {
        ParseError::DuplicateParameter {
            src,
            span: span_to_source_span(span),
            name,
        }
    }

    pub fn nesting_too_deep(src: String, span: Span, depth: usize, max: usize) -> Self {
        ParseError::NestingTooDeep {
            src,
            span: span_to_source_span(span),
            depth,
            max,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Convert a parser Span to a miette SourceSpan
pub fn span_to_source_span(span: Span) -> SourceSpan {
    SourceSpan::new(span.start.into(), span.len())
}

/// Convert a grammar rule to a description suitable for error messages
fn rule_to_user_friendly_description(rule: &Rule) -> String {
    match rule {
        Rule::expression | Rule::postfix_expression => "an expression".to_string(),
        Rule::expression_statement => "an expression followed by ';'".to_string(),
        Rule::trailing_expression => "an expression".to_string(),
        Rule::let_statement => "a let binding (let name = value;)".to_string(),
        Rule::del_statement => "a del statement (del name;)".to_string(),
        Rule::for_statement => "a for loop (for i in 0..10 { ... })".to_string(),
        Rule::identifier => "an identifier".to_string(),
        Rule::integer => "an integer".to_string(),
        Rule::boolean => "a boolean".to_string(),
        Rule::string => "a string".to_string(),
        Rule::unit_literal => "unit".to_string(),
        Rule::function => "a function (fn(x) -> ...)".to_string(),
        Rule::parameters => "a parameter list".to_string(),
        Rule::rest_parameter => "a rest parameter (...name)".to_string(),
        Rule::call_arguments => "an argument list".to_string(),
        Rule::argument => "an argument".to_string(),
        Rule::if_expression => "an if expression".to_string(),
        Rule::block => "a block ({ ... })".to_string(),
        Rule::parenthesized_expression => "a parenthesized expression".to_string(),
        Rule::op_negate
        | Rule::op_not
        | Rule::op_logical_or
        | Rule::op_logical_and
        | Rule::op_equal
        | Rule::op_not_equal
        | Rule::op_less_equal
        | Rule::op_less
        | Rule::op_greater_equal
        | Rule::op_greater
        | Rule::op_add
        | Rule::op_subtract
        | Rule::op_multiply
        | Rule::op_divide
        | Rule::op_modulo => "an operator".to_string(),
        Rule::keyword_let => "'let'".to_string(),
        Rule::keyword_del => "'del'".to_string(),
        Rule::keyword_for => "'for'".to_string(),
        Rule::keyword_in => "'in'".to_string(),
        Rule::keyword_fn => "'fn'".to_string(),
        Rule::keyword_if => "'if'".to_string(),
        Rule::keyword_else => "'else'".to_string(),
        Rule::EOI => "end of input".to_string(),
        _ => format!("{:?}", rule).replace('_', " "),
    }
}
