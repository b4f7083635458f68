// Knot Parser
// Pest-based parser producing the syntax tree in `crate::ast`

use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

use crate::ast::*;
use crate::error::*;

mod expressions;
mod functions;
mod literals;
mod statements;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct KnotParser;

/// Deepest expression nesting a statement may have.
///
/// Evaluation recurses once per level, so deeper programs are refused
/// before any syntax tree is built for them.
pub const MAX_NESTING_DEPTH: usize = 128;

impl KnotParser {
    /// Parse a complete program
    pub fn parse_program(input: &str) -> ParseResult<Program> {
        Self::parse_program_with_source(input, None)
    }

    /// Parse a complete program, remembering where it came from
    pub fn parse_program_with_source(
        input: &str,
        source_file: Option<String>,
    ) -> ParseResult<Program> {
        let mut pairs = Self::parse_rule(Rule::program, input)?;
        let program = Self::expect_pair(&mut pairs, input, "program")?;
        let span = Self::span_from_pair(&program);

        let mut statements = Vec::new();
        for pair in program.into_inner() {
            Self::check_nesting(&pair)?;
            match pair.as_rule() {
                Rule::EOI => {}
                Rule::trailing_expression => {
                    let span = Self::span_from_pair(&pair);
                    let inner = Self::first_inner(pair, "trailing expression")?;
                    statements.push(Statement {
                        kind: StatementKind::Expression(Self::parse_expression_pair(inner)?),
                        span,
                    });
                }
                _ => statements.push(Self::parse_statement(pair)?),
            }
        }

        Ok(Program {
            statements,
            source_file,
            span,
        })
    }

    /// Parse a single expression (the whole input must be consumed)
    pub fn parse_expression(input: &str) -> ParseResult<Expression> {
        let mut pairs = Self::parse_rule(Rule::expression_input, input)?;
        let wrapper = Self::expect_pair(&mut pairs, input, "expression")?;
        Self::check_nesting(&wrapper)?;
        let expression = Self::first_inner(wrapper, "expression")?;
        Self::parse_expression_pair(expression)
    }

    fn check_nesting(pair: &Pair<Rule>) -> ParseResult<()> {
        let depth = Self::nesting_depth(pair);
        if depth > MAX_NESTING_DEPTH {
            return Err(ParseError::nesting_too_deep(
                pair.get_input().to_string(),
                Self::span_from_pair(pair),
                depth,
                MAX_NESTING_DEPTH,
            ));
        }
        Ok(())
    }

    /// Upper bound on the depth of the expression tree built from `pair`.
    ///
    /// Every `expression`, operator and call suffix can add one level. Operator
    /// chains are flat in the parse tree, so this recursion only goes as deep
    /// as the brackets do.
    fn nesting_depth(pair: &Pair<Rule>) -> usize {
        let own = usize::from(pair.as_rule() == Rule::expression);
        let mut levels = 0;
        let mut deepest = 0;

        for inner in pair.clone().into_inner() {
            if Self::adds_nesting_level(inner.as_rule()) {
                levels += 1;
            }
            deepest = deepest.max(Self::nesting_depth(&inner));
        }

        own + levels + deepest
    }

    fn adds_nesting_level(rule: Rule) -> bool {
        matches!(
            rule,
            Rule::call_arguments
                | Rule::op_negate
                | Rule::op_not
                | Rule::op_logical_or
                | Rule::op_logical_and
                | Rule::op_equal
                | Rule::op_not_equal
                | Rule::op_less
                | Rule::op_less_equal
                | Rule::op_greater
                | Rule::op_greater_equal
                | Rule::op_add
                | Rule::op_subtract
                | Rule::op_multiply
                | Rule::op_divide
                | Rule::op_modulo
        )
    }

    fn parse_rule(rule: Rule, input: &str) -> ParseResult<Pairs<'_, Rule>> {
        <Self as Parser<Rule>>::parse(rule, input)
            .map_err(|error| ParseError::from_pest_error(error, input.to_string()))
    }

    fn expect_pair<'i>(
        pairs: &mut Pairs<'i, Rule>,
        input: &str,
        what: &str,
    ) -> ParseResult<Pair<'i, Rule>> {
        pairs.next().ok_or_else(|| ParseError::Syntax {
            src: input.to_string(),
            span: span_to_source_span(Span::new(0, input.len())),
            message: format!("expected {what}"),
        })
    }

    /// First child of a pair whose grammar rule guarantees at least one
    pub(crate) fn first_inner<'i>(pair: Pair<'i, Rule>, what: &str) -> ParseResult<Pair<'i, Rule>> {
        let outer = pair.clone();
        pair.into_inner()
            .next()
            .ok_or_else(|| Self::malformed(&outer, what))
    }

    /// Error for a pair whose shape does not match what the grammar promises
    pub(crate) fn malformed(pair: &Pair<Rule>, what: &str) -> ParseError {
        ParseError::Syntax {
            src: pair.get_input().to_string(),
            span: span_to_source_span(Self::span_from_pair(pair)),
            message: format!("malformed {what}"),
        }
    }

    pub(crate) fn span_from_pair(pair: &Pair<Rule>) -> Span {
        let span = pair.as_span();
        Span::new(span.start(), span.end())
    }
}
