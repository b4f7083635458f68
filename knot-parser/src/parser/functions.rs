// Function parsing module
// Anonymous function literals, parameter lists and call arguments

use std::collections::HashSet;
use std::rc::Rc;

use pest::iterators::Pair;

use super::{KnotParser, Rule};
use crate::ast::*;
use crate::error::*;

impl KnotParser {
    /// `fn(a, b, ...rest) -> body`
    pub(super) fn parse_function(pair: Pair<Rule>) -> ParseResult<Expression> {
        let span = Self::span_from_pair(&pair);
        let mut parameters = Vec::new();
        let mut rest = None;
        let mut body = None;

        for part in pair.clone().into_inner() {
            match part.as_rule() {
                Rule::keyword_fn => {}
                Rule::parameters => {
                    let (positional, variadic) = Self::parse_parameters(part)?;
                    parameters = positional;
                    rest = variadic;
                }
                Rule::expression => body = Some(Self::parse_expression_pair(part)?),
                _ => return Err(Self::malformed(&part, "function")),
            }
        }

        let body = body.ok_or_else(|| Self::malformed(&pair, "function body"))?;

        Ok(Expression {
            kind: ExpressionKind::Function(Rc::new(FunctionLiteral {
                parameters,
                rest,
                body,
                span,
            })),
            span,
        })
    }

    fn parse_parameters(pair: Pair<Rule>) -> ParseResult<(Vec<Identifier>, Option<Identifier>)> {
        let input = pair.get_input();
        let mut seen = HashSet::new();
        let mut positional = Vec::new();
        let mut rest = None;

        for part in pair.into_inner() {
            let identifier = match part.as_rule() {
                Rule::identifier => {
                    let identifier = Self::parse_identifier(part)?;
                    positional.push(identifier.clone());
                    identifier
                }
                Rule::rest_parameter => {
                    let name = part
                        .clone()
                        .into_inner()
                        .find(|inner| inner.as_rule() == Rule::identifier)
                        .ok_or_else(|| Self::malformed(&part, "rest parameter"))?;
                    let identifier = Self::parse_identifier(name)?;
                    rest = Some(identifier.clone());
                    identifier
                }
                _ => return Err(Self::malformed(&part, "parameter")),
            };

            if !seen.insert(identifier.name.clone()) {
                return Err(ParseError::duplicate_parameter(
                    input.to_string(),
                    identifier.span,
                    identifier.name,
                ));
            }
        }

        Ok((positional, rest))
    }

    /// `(a, ...b, c)`
    pub(super) fn parse_call_arguments(pair: Pair<Rule>) -> ParseResult<Vec<Argument>> {
        if pair.as_rule() != Rule::call_arguments {
            return Err(Self::malformed(&pair, "argument list"));
        }

        pair.into_inner()
            .map(|argument| {
                let mut spread = false;
                let mut expression = None;
                for part in argument.clone().into_inner() {
                    match part.as_rule() {
                        Rule::spread => spread = true,
                        Rule::expression => expression = Some(Self::parse_expression_pair(part)?),
                        _ => return Err(Self::malformed(&part, "argument")),
                    }
                }

                let expression = expression.ok_or_else(|| Self::malformed(&argument, "argument"))?;
                Ok(if spread {
                    Argument::Spread(expression)
                } else {
                    Argument::Positional(expression)
                })
            })
            .collect()
    }
}
