// Statement parsing module
// let / del / for and expression statements

use pest::iterators::Pair;

use super::{KnotParser, Rule};
use crate::ast::*;
use crate::error::*;

impl KnotParser {
    pub(super) fn parse_statement(pair: Pair<Rule>) -> ParseResult<Statement> {
        let span = Self::span_from_pair(&pair);
        let kind = match pair.as_rule() {
            Rule::let_statement => Self::parse_let_statement(pair)?,
            Rule::del_statement => {
                let name = Self::find_identifier(&pair)?;
                StatementKind::Del(name)
            }
            Rule::for_statement => Self::parse_for_statement(pair)?,
            Rule::expression_statement => {
                let inner = Self::first_inner(pair, "expression statement")?;
                StatementKind::Expression(Self::parse_expression_pair(inner)?)
            }
            _ => return Err(Self::malformed(&pair, "statement")),
        };

        Ok(Statement { kind, span })
    }

    fn parse_let_statement(pair: Pair<Rule>) -> ParseResult<StatementKind> {
        let name = Self::find_identifier(&pair)?;
        let value = pair
            .clone()
            .into_inner()
            .find(|part| part.as_rule() == Rule::expression)
            .ok_or_else(|| Self::malformed(&pair, "let binding"))?;

        Ok(StatementKind::Let(LetBinding {
            name,
            value: Self::parse_expression_pair(value)?,
        }))
    }

    fn parse_for_statement(pair: Pair<Rule>) -> ParseResult<StatementKind> {
        let variable = Self::find_identifier(&pair)?;
        let mut bounds = Vec::with_capacity(2);
        let mut body = None;

        for part in pair.clone().into_inner() {
            match part.as_rule() {
                Rule::expression => bounds.push(Self::parse_expression_pair(part)?),
                Rule::block => body = Some(Self::parse_block(part)?),
                _ => {}
            }
        }

        let body = body.ok_or_else(|| Self::malformed(&pair, "for loop body"))?;
        let [start, end] = <[Expression; 2]>::try_from(bounds)
            .map_err(|_| Self::malformed(&pair, "for loop range"))?;

        Ok(StatementKind::For(ForLoop {
            variable,
            start,
            end,
            body,
        }))
    }

    fn find_identifier(pair: &Pair<Rule>) -> ParseResult<Identifier> {
        let identifier = pair
            .clone()
            .into_inner()
            .find(|part| part.as_rule() == Rule::identifier)
            .ok_or_else(|| Self::malformed(pair, "statement name"))?;
        Self::parse_identifier(identifier)
    }
}
