// Literal parsing for the Knot parser
// Handles integer, boolean, string and unit literals plus identifiers

use super::{KnotParser, Rule};
use crate::ast::*;
use crate::error::*;
use pest::iterators::Pair;

impl KnotParser {
    pub(super) fn parse_integer(pair: Pair<Rule>) -> ParseResult<Expression> {
        let span = Self::span_from_pair(&pair);
        let text = pair.as_str();
        let value = text.parse::<i64>().map_err(|_| {
            ParseError::invalid_integer(pair.get_input().to_string(), span, text.to_string())
        })?;

        Ok(Expression {
            kind: ExpressionKind::Integer(value),
            span,
        })
    }

    pub(super) fn parse_boolean(pair: Pair<Rule>) -> ParseResult<Expression> {
        let span = Self::span_from_pair(&pair);
        let inner = Self::first_inner(pair, "boolean literal")?;
        let value = match inner.as_rule() {
            Rule::boolean_true => true,
            Rule::boolean_false => false,
            _ => return Err(Self::malformed(&inner, "boolean literal")),
        };

        Ok(Expression {
            kind: ExpressionKind::Boolean(value),
            span,
        })
    }

    pub(super) fn parse_string(pair: Pair<Rule>) -> ParseResult<Expression> {
        let span = Self::span_from_pair(&pair);
        let content = Self::first_inner(pair, "string literal")?;
        let value = Self::unescape(&content)?;

        Ok(Expression {
            kind: ExpressionKind::String(value),
            span,
        })
    }

    pub(super) fn parse_unit(pair: Pair<Rule>) -> ParseResult<Expression> {
        Ok(Expression {
            kind: ExpressionKind::Unit,
            span: Self::span_from_pair(&pair),
        })
    }

    pub(crate) fn parse_identifier(pair: Pair<Rule>) -> ParseResult<Identifier> {
        if pair.as_rule() != Rule::identifier {
            return Err(Self::malformed(&pair, "identifier"));
        }

        Ok(Identifier {
            name: pair.as_str().to_string(),
            span: Self::span_from_pair(&pair),
        })
    }

    fn unescape(content: &Pair<Rule>) -> ParseResult<String> {
        let raw = content.as_str();
        let base = content.as_span().start();
        let mut value = String::with_capacity(raw.len());
        let mut chars = raw.char_indices();

        while let Some((offset, ch)) = chars.next() {
            if ch != '\\' {
                value.push(ch);
                continue;
            }

            let Some((_, escaped)) = chars.next() else {
                break;
            };
            match escaped {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                'r' => value.push('\r'),
                '\\' => value.push('\\'),
                '"' => value.push('"'),
                other => {
                    let start = base + offset;
                    let span = Span::new(start, start + 1 + other.len_utf8());
                    return Err(ParseError::invalid_string_escape(
                        content.get_input().to_string(),
                        span,
                        format!("\\{other}"),
                    ));
                }
            }
        }

        Ok(value)
    }
}
