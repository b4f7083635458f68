// Expression parsing module
// Handles operator precedence, calls, conditionals and primary expressions

use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};

use super::{KnotParser, Rule};
use crate::ast::*;
use crate::error::*;

impl KnotParser {
    /// Operator precedence, lowest to highest
    pub(crate) fn pratt_parser() -> PrattParser<Rule> {
        PrattParser::new()
            // Level 1: Logical OR
            .op(Op::infix(Rule::op_logical_or, Assoc::Left))
            // Level 2: Logical AND
            .op(Op::infix(Rule::op_logical_and, Assoc::Left))
            // Level 3: Equality
            .op(Op::infix(Rule::op_equal, Assoc::Left) | Op::infix(Rule::op_not_equal, Assoc::Left))
            // Level 4: Comparison
            .op(Op::infix(Rule::op_less, Assoc::Left)
                | Op::infix(Rule::op_less_equal, Assoc::Left)
                | Op::infix(Rule::op_greater, Assoc::Left)
                | Op::infix(Rule::op_greater_equal, Assoc::Left))
            // Level 5: Additive
            .op(Op::infix(Rule::op_add, Assoc::Left) | Op::infix(Rule::op_subtract, Assoc::Left))
            // Level 6: Multiplicative
            .op(Op::infix(Rule::op_multiply, Assoc::Left)
                | Op::infix(Rule::op_divide, Assoc::Left)
                | Op::infix(Rule::op_modulo, Assoc::Left))
            // Level 7: Unary prefix operators
            .op(Op::prefix(Rule::op_negate) | Op::prefix(Rule::op_not))
    }

    /// Parse an `expression` pair with full precedence support
    pub(crate) fn parse_expression_pair(pair: Pair<Rule>) -> ParseResult<Expression> {
        if pair.as_rule() != Rule::expression {
            return Err(Self::malformed(&pair, "expression"));
        }

        Self::pratt_parser()
            .map_primary(Self::parse_postfix_expression)
            .map_prefix(|op, operand: ParseResult<Expression>| {
                let operand = operand?;
                let operator = match op.as_rule() {
                    Rule::op_negate => UnaryOperator::Negate,
                    Rule::op_not => UnaryOperator::Not,
                    _ => return Err(Self::malformed(&op, "prefix operator")),
                };
                let span = Self::span_from_pair(&op).merge(&operand.span);

                Ok(Expression {
                    kind: ExpressionKind::UnaryOp(UnaryOperation {
                        operator,
                        operand: Box::new(operand),
                    }),
                    span,
                })
            })
            .map_infix(
                |left: ParseResult<Expression>, op: Pair<Rule>, right: ParseResult<Expression>| {
                    let left = left?;
                    let right = right?;

                    let operator = match op.as_rule() {
                        Rule::op_logical_or => BinaryOperator::LogicalOr,
                        Rule::op_logical_and => BinaryOperator::LogicalAnd,
                        Rule::op_equal => BinaryOperator::Equal,
                        Rule::op_not_equal => BinaryOperator::NotEqual,
                        Rule::op_less => BinaryOperator::Less,
                        Rule::op_less_equal => BinaryOperator::LessEqual,
                        Rule::op_greater => BinaryOperator::Greater,
                        Rule::op_greater_equal => BinaryOperator::GreaterEqual,
                        Rule::op_add => BinaryOperator::Add,
                        Rule::op_subtract => BinaryOperator::Subtract,
                        Rule::op_multiply => BinaryOperator::Multiply,
                        Rule::op_divide => BinaryOperator::Divide,
                        Rule::op_modulo => BinaryOperator::Modulo,
                        _ => return Err(Self::malformed(&op, "binary operator")),
                    };
                    let span = left.span.merge(&right.span);

                    Ok(Expression {
                        kind: ExpressionKind::BinaryOp(BinaryOperation {
                            left: Box::new(left),
                            operator,
                            right: Box::new(right),
                        }),
                        span,
                    })
                },
            )
            .parse(pair.into_inner())
    }

    /// Parse a primary expression followed by any number of call suffixes
    fn parse_postfix_expression(pair: Pair<Rule>) -> ParseResult<Expression> {
        let mut inner = pair.clone().into_inner();
        let primary = inner
            .next()
            .ok_or_else(|| Self::malformed(&pair, "postfix expression"))?;
        let mut expression = Self::parse_primary(primary)?;

        for call in inner {
            let span = expression.span.merge(&Self::span_from_pair(&call));
            let arguments = Self::parse_call_arguments(call)?;
            expression = Expression {
                kind: ExpressionKind::Call(FunctionCall {
                    callee: Box::new(expression),
                    arguments,
                }),
                span,
            };
        }

        Ok(expression)
    }

    fn parse_primary(pair: Pair<Rule>) -> ParseResult<Expression> {
        match pair.as_rule() {
            Rule::integer => Self::parse_integer(pair),
            Rule::boolean => Self::parse_boolean(pair),
            Rule::string => Self::parse_string(pair),
            Rule::unit_literal => Self::parse_unit(pair),
            Rule::function => Self::parse_function(pair),
            Rule::if_expression => Self::parse_if_expression(pair),
            Rule::identifier => {
                let identifier = Self::parse_identifier(pair)?;
                Ok(Expression {
                    span: identifier.span,
                    kind: ExpressionKind::Identifier(identifier),
                })
            }
            Rule::parenthesized_expression => {
                let span = Self::span_from_pair(&pair);
                let inner = Self::first_inner(pair, "parenthesized expression")?;
                Ok(Expression {
                    kind: ExpressionKind::Parenthesized(Box::new(Self::parse_expression_pair(
                        inner,
                    )?)),
                    span,
                })
            }
            _ => Err(Self::malformed(&pair, "primary expression")),
        }
    }

    /// `if condition { then } else { otherwise }`, with `else if` chains
    fn parse_if_expression(pair: Pair<Rule>) -> ParseResult<Expression> {
        let span = Self::span_from_pair(&pair);
        let parts: Vec<Pair<Rule>> = pair
            .clone()
            .into_inner()
            .filter(|part| !matches!(part.as_rule(), Rule::keyword_if | Rule::keyword_else))
            .collect();

        let [condition, then_block, otherwise] = <[Pair<Rule>; 3]>::try_from(parts)
            .map_err(|_| Self::malformed(&pair, "if expression"))?;

        let condition = Self::parse_expression_pair(condition)?;
        let then_branch = Self::parse_block(then_block)?;
        let else_branch = match otherwise.as_rule() {
            Rule::if_expression => Self::parse_if_expression(otherwise)?,
            _ => Self::parse_block(otherwise)?,
        };

        Ok(Expression {
            kind: ExpressionKind::If(IfExpression {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            }),
            span,
        })
    }

    pub(crate) fn parse_block(pair: Pair<Rule>) -> ParseResult<Expression> {
        if pair.as_rule() != Rule::block {
            return Err(Self::malformed(&pair, "block"));
        }
        let inner = Self::first_inner(pair, "block")?;
        Self::parse_expression_pair(inner)
    }
}
