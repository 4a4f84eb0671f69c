//! Grammar tree to lossless tree
//!
//! The engine reports UTF-16 offsets; the cursor maps them back to byte
//! positions. Recovery is decided once per node in [`HclBuilder::expression`]
//! and the body builders, so the per-production methods only ever see a
//! node that is complete or is missing nothing but its closer.

use crate::LANGUAGE;
use crate::grammar::{HclElement, HclGrammarToken, HclNode, HclRule, HclToken};
use crate::tree::*;
use std::sync::Arc;
use verbatim_core::config::VerbatimConfig;
use verbatim_core::error::VerbatimError;
use verbatim_core::lst::{
    CommentSyntax, Container, Cursor, FallbackLiteral, FallbackPolicy, FallbackTable,
    GrammarElement, GrammarKind, LeftPadded, NodeId, OffsetDomain, Recovery, RightPadded, Space,
};
use verbatim_core::result::Result;

/// Default fallback policy per production
pub const FALLBACKS: &[(&str, FallbackPolicy)] = &[
    ("FunctionCall", FallbackPolicy::PartialOmission),
    ("Tuple", FallbackPolicy::PartialOmission),
    ("Object", FallbackPolicy::PartialOmission),
    ("Parentheses", FallbackPolicy::PartialOmission),
    ("Index", FallbackPolicy::PartialOmission),
    ("Block", FallbackPolicy::PartialOmission),
    ("Conditional", FallbackPolicy::LiteralCapture),
    ("ForTuple", FallbackPolicy::LiteralCapture),
    ("ForObject", FallbackPolicy::LiteralCapture),
    ("Attribute", FallbackPolicy::LiteralCapture),
    ("Error", FallbackPolicy::LiteralCapture),
];

/// Elements of a delimited list and what followed them
struct Delimited {
    elements: Vec<RightPadded<Expression>>,
    /// Space between `...` and the closer, when present
    expand: Option<Space>,
    close: Option<Space>,
}

pub struct HclBuilder<'s> {
    cursor: Cursor<'s>,
    table: FallbackTable,
}

impl<'s> HclBuilder<'s> {
    pub fn new(source: &'s str, config: &VerbatimConfig) -> Self {
        let mut cursor = Cursor::new(source, OffsetDomain::Utf16, CommentSyntax::HASH_AND_C);
        if let Some(interner) = config.interner() {
            cursor = cursor.with_interner(interner);
        }
        if config.record_cursor {
            cursor = cursor.recording();
        }
        Self {
            cursor,
            table: config.fallback_table(LANGUAGE, FALLBACKS),
        }
    }

    pub fn cursor(&self) -> &Cursor<'s> {
        &self.cursor
    }

    pub fn build(&mut self, file: &HclNode) -> Result<ConfigFile> {
        let [GrammarElement::Node(body)] = file.children.as_slice() else {
            return Err(self.unhandled(file));
        };
        if file.rule != HclRule::ConfigFile {
            return Err(self.unhandled(file));
        }

        let prefix = self.cursor.take_prefix(file.start());
        let body = self.body(body)?;
        let eof = self.cursor.finish();

        Ok(ConfigFile {
            id: NodeId::next(),
            prefix,
            body,
            eof,
        })
    }

    fn unhandled(&self, node: &HclNode) -> VerbatimError {
        VerbatimError::unhandled_production(LANGUAGE, node.rule.name(), self.cursor.position())
    }

    fn unhandled_token(&self, token: &HclGrammarToken) -> VerbatimError {
        VerbatimError::unhandled_production(LANGUAGE, token.kind.name(), self.cursor.position())
    }

    fn unhandled_element(&self, element: &HclElement) -> VerbatimError {
        match element {
            GrammarElement::Token(token) => self.unhandled_token(token),
            GrammarElement::Node(node) => self.unhandled(node),
        }
    }

    fn capture(&mut self, node: &HclNode) -> FallbackLiteral {
        self.cursor
            .capture(node.start(), node.stop(), node.rule.name())
    }

    fn consume(&mut self, token: &HclGrammarToken) -> Result<Space> {
        self.consume_text(token).map(|(space, _)| space)
    }

    fn consume_text(&mut self, token: &HclGrammarToken) -> Result<(Space, &'s str)> {
        self.cursor.token(token).ok_or_else(|| {
            VerbatimError::internal_error(format!(
                "synthetic {} token reached the {LANGUAGE} builder",
                token.kind.name()
            ))
        })
    }

    /// Space before a closing token; `None` when recovery left it out
    fn closing(&mut self, token: &HclGrammarToken) -> Option<Space> {
        self.cursor.token(token).map(|(space, _)| space)
    }

    fn body(&mut self, node: &HclNode) -> Result<Body> {
        if node.rule != HclRule::Body {
            return Err(self.unhandled(node));
        }

        let mut items = Vec::with_capacity(node.children.len());
        for child in &node.children {
            let GrammarElement::Node(item) = child else {
                return Err(self.unhandled_element(child));
            };
            let closer = (item.rule == HclRule::Block).then_some(HclToken::RBrace);
            if self.table.recovery(item, closer, &self.cursor) == Recovery::Capture {
                items.push(BodyItem::Fallback(self.capture(item)));
                continue;
            }
            items.push(match item.rule {
                HclRule::Attribute => BodyItem::Attribute(Arc::new(self.attribute(item)?)),
                HclRule::Block => BodyItem::Block(Arc::new(self.block(item)?)),
                HclRule::Error => BodyItem::Fallback(self.capture(item)),
                _ => return Err(self.unhandled(item)),
            });
        }

        Ok(Body { items })
    }

    fn attribute(&mut self, node: &HclNode) -> Result<Attribute> {
        let [
            GrammarElement::Token(name),
            GrammarElement::Token(equals),
            GrammarElement::Node(value),
        ] = node.children.as_slice()
        else {
            return Err(self.unhandled(node));
        };

        let (prefix, name) = self.consume_text(name)?;
        let before = self.consume(equals)?;
        let value = self.expression(value)?;

        Ok(Attribute {
            id: NodeId::next(),
            prefix,
            name: Arc::from(name),
            value: LeftPadded::new(before, value),
        })
    }

    fn block(&mut self, node: &HclNode) -> Result<Block> {
        let mut children = node.children.iter();
        let Some(GrammarElement::Token(kind)) = children.next() else {
            return Err(self.unhandled(node));
        };
        let (prefix, kind) = self.consume_text(kind)?;

        let mut labels = Vec::new();
        let mut open = None;
        let mut body = None;
        let mut close = None;
        for child in children {
            match child {
                GrammarElement::Token(token)
                    if matches!(token.kind, HclToken::Identifier | HclToken::String) =>
                {
                    let (space, text) = self.consume_text(token)?;
                    labels.push(leaf(token.kind, space, text));
                }
                GrammarElement::Token(token) if token.kind == HclToken::LBrace => {
                    open = Some(self.consume(token)?);
                }
                GrammarElement::Token(token) if token.kind == HclToken::RBrace => {
                    close = self.closing(token);
                }
                GrammarElement::Node(inner) => body = Some(self.body(inner)?),
                other => return Err(self.unhandled_element(other)),
            }
        }

        Ok(Block {
            id: NodeId::next(),
            prefix,
            kind: Arc::from(kind),
            labels,
            open: open.ok_or_else(|| self.unhandled(node))?,
            body: body.unwrap_or_default(),
            close,
        })
    }

    /// Build an expression, or capture it when it cannot be built
    pub fn expression(&mut self, node: &HclNode) -> Result<Expression> {
        let closer = match node.rule {
            HclRule::FunctionCall | HclRule::Parentheses => Some(HclToken::RParen),
            HclRule::Tuple | HclRule::Index | HclRule::ForTuple => Some(HclToken::RBracket),
            HclRule::Object | HclRule::ForObject => Some(HclToken::RBrace),
            _ => None,
        };
        if node.rule == HclRule::Error
            || self.table.recovery(node, closer, &self.cursor) == Recovery::Capture
        {
            return Ok(Expression::Fallback(self.capture(node)));
        }

        match node.rule {
            HclRule::Literal | HclRule::Variable => match node.children.as_slice() {
                [GrammarElement::Token(token)] => {
                    let (prefix, text) = self.consume_text(token)?;
                    Ok(leaf(token.kind, prefix, text))
                }
                _ => Err(self.unhandled(node)),
            },
            HclRule::FunctionCall => self.function_call(node),
            HclRule::Tuple => self.tuple(node),
            HclRule::Object => self.object(node),
            HclRule::Unary => self.unary(node),
            HclRule::Binary => self.binary(node),
            HclRule::Conditional => self.conditional(node),
            HclRule::Parentheses => self.parentheses(node),
            HclRule::GetAttr => self.get_attr(node),
            HclRule::Index => self.index(node),
            HclRule::ForTuple | HclRule::ForObject => self.for_expression(node),
            _ => Err(self.unhandled(node)),
        }
    }

    /// Comma-separated expressions up to `close`
    ///
    /// A trailing comma, or space inside an empty list, is kept as a final
    /// [`Expression::Empty`].
    fn delimited<'n>(
        &mut self,
        children: impl Iterator<Item = &'n HclElement>,
        close: HclToken,
    ) -> Result<Delimited> {
        let mut elements = Vec::new();
        let mut pending = None;
        let mut expanded = false;
        let mut closing = None;

        for child in children {
            match child {
                GrammarElement::Node(node) => pending = Some(self.expression(node)?),
                GrammarElement::Token(token)
                    if matches!(token.kind, HclToken::Comma | HclToken::Ellipsis) =>
                {
                    let element = pending.take().ok_or_else(|| self.unhandled_token(token))?;
                    elements.push(RightPadded::new(element, self.consume(token)?));
                    expanded = token.kind == HclToken::Ellipsis;
                }
                GrammarElement::Token(token) if token.kind == close => {
                    closing = self.closing(token);
                }
                other => return Err(self.unhandled_element(other)),
            }
        }

        let tail = closing.clone().unwrap_or(Space::EMPTY);
        let expand = if expanded {
            Some(tail)
        } else {
            match pending {
                Some(last) => elements.push(RightPadded::new(last, tail)),
                None if !elements.is_empty() || !tail.is_empty() => {
                    elements.push(RightPadded::build(Expression::Empty(Empty::new(tail))));
                }
                None => {}
            }
            None
        };

        Ok(Delimited {
            elements,
            expand,
            close: closing,
        })
    }

    fn function_call(&mut self, node: &HclNode) -> Result<Expression> {
        let mut children = node.children.iter();
        let (Some(GrammarElement::Token(name)), Some(GrammarElement::Token(open))) =
            (children.next(), children.next())
        else {
            return Err(self.unhandled(node));
        };

        let (prefix, name) = self.consume_text(name)?;
        let before = self.consume(open)?;
        let list = self.delimited(children, HclToken::RParen)?;

        Ok(Expression::FunctionCall(Arc::new(FunctionCall {
            id: NodeId::next(),
            prefix,
            name: Arc::from(name),
            args: container(before, list.elements, list.close.is_some()),
            expand: list.expand,
        })))
    }

    fn tuple(&mut self, node: &HclNode) -> Result<Expression> {
        let mut children = node.children.iter();
        let Some(GrammarElement::Token(open)) = children.next() else {
            return Err(self.unhandled(node));
        };

        let prefix = self.consume(open)?;
        let list = self.delimited(children, HclToken::RBracket)?;
        if list.expand.is_some() {
            return Err(self.unhandled(node));
        }

        Ok(Expression::Tuple(Arc::new(Tuple {
            id: NodeId::next(),
            prefix,
            elements: container(Space::EMPTY, list.elements, list.close.is_some()),
        })))
    }

    fn object(&mut self, node: &HclNode) -> Result<Expression> {
        let mut children = node.children.iter();
        let Some(GrammarElement::Token(open)) = children.next() else {
            return Err(self.unhandled(node));
        };
        let prefix = self.consume(open)?;

        let mut members = Vec::new();
        let mut pending: Option<ObjectEntry> = None;
        let mut close = None;
        for child in children {
            match child {
                GrammarElement::Node(item) => {
                    if let Some(entry) = pending.take() {
                        members.push(RightPadded::build(ObjectMember {
                            entry,
                            comma: false,
                        }));
                    }
                    pending = Some(self.object_item(item)?);
                }
                GrammarElement::Token(token) if token.kind == HclToken::Comma => {
                    let entry = pending.take().ok_or_else(|| self.unhandled_token(token))?;
                    let after = self.consume(token)?;
                    members.push(RightPadded::new(ObjectMember { entry, comma: true }, after));
                }
                GrammarElement::Token(token) if token.kind == HclToken::RBrace => {
                    close = self.closing(token);
                }
                other => return Err(self.unhandled_element(other)),
            }
        }

        let tail = close.clone().unwrap_or(Space::EMPTY);
        let last = match pending {
            Some(entry) => Some(RightPadded::new(ObjectMember { entry, comma: false }, tail)),
            None if !members.is_empty() || !tail.is_empty() => Some(RightPadded::build(ObjectMember {
                entry: ObjectEntry::Empty(Empty::new(tail)),
                comma: false,
            })),
            None => None,
        };
        members.extend(last);

        Ok(Expression::Object(Arc::new(Object {
            id: NodeId::next(),
            prefix,
            members: container(Space::EMPTY, members, close.is_some()),
        })))
    }

    fn object_item(&mut self, node: &HclNode) -> Result<ObjectEntry> {
        if node.rule != HclRule::ObjectItem {
            return Err(self.unhandled(node));
        }
        if self.table.recovery(node, None, &self.cursor) == Recovery::Capture {
            return Ok(ObjectEntry::Fallback(self.capture(node)));
        }
        let [
            GrammarElement::Node(key),
            GrammarElement::Token(assign),
            GrammarElement::Node(value),
        ] = node.children.as_slice()
        else {
            return Err(self.unhandled(node));
        };

        let prefix = self.cursor.take_prefix(node.start());
        let key = self.expression(key)?;
        let kind = match assign.kind {
            HclToken::Equals => Assign::Equals,
            HclToken::Colon => Assign::Colon,
            _ => return Err(self.unhandled_token(assign)),
        };
        let before = self.consume(assign)?;
        let value = self.expression(value)?;

        Ok(ObjectEntry::Item(Arc::new(ObjectItem {
            id: NodeId::next(),
            prefix,
            key,
            assign: kind,
            value: LeftPadded::new(before, value),
        })))
    }

    fn unary(&mut self, node: &HclNode) -> Result<Expression> {
        let [GrammarElement::Token(operator), GrammarElement::Node(operand)] =
            node.children.as_slice()
        else {
            return Err(self.unhandled(node));
        };

        let op = match operator.kind {
            HclToken::Bang => UnaryOp::Not,
            HclToken::Minus => UnaryOp::Negate,
            _ => return Err(self.unhandled_token(operator)),
        };
        let prefix = self.consume(operator)?;
        let operand = self.expression(operand)?;

        Ok(Expression::Unary(Arc::new(Unary {
            id: NodeId::next(),
            prefix,
            operator: op,
            operand,
        })))
    }

    fn binary(&mut self, node: &HclNode) -> Result<Expression> {
        let [
            GrammarElement::Node(left),
            GrammarElement::Token(operator),
            GrammarElement::Node(right),
        ] = node.children.as_slice()
        else {
            return Err(self.unhandled(node));
        };

        let op = binary_op(operator.kind).ok_or_else(|| self.unhandled_token(operator))?;
        let prefix = self.cursor.take_prefix(node.start());
        let left = self.expression(left)?;
        let before = self.consume(operator)?;
        let right = self.expression(right)?;

        Ok(Expression::Binary(Arc::new(Binary {
            id: NodeId::next(),
            prefix,
            left,
            operator: LeftPadded::new(before, op),
            right,
        })))
    }

    fn conditional(&mut self, node: &HclNode) -> Result<Expression> {
        let [
            GrammarElement::Node(condition),
            GrammarElement::Token(question),
            GrammarElement::Node(truthy),
            GrammarElement::Token(colon),
            GrammarElement::Node(falsy),
        ] = node.children.as_slice()
        else {
            return Err(self.unhandled(node));
        };

        let prefix = self.cursor.take_prefix(node.start());
        let condition = self.expression(condition)?;
        let before_question = self.consume(question)?;
        let truthy = self.expression(truthy)?;
        let before_colon = self.consume(colon)?;
        let falsy = self.expression(falsy)?;

        Ok(Expression::Conditional(Arc::new(Conditional {
            id: NodeId::next(),
            prefix,
            condition,
            truthy: LeftPadded::new(before_question, truthy),
            falsy: LeftPadded::new(before_colon, falsy),
        })))
    }

    fn parentheses(&mut self, node: &HclNode) -> Result<Expression> {
        let [
            GrammarElement::Token(open),
            GrammarElement::Node(inner),
            GrammarElement::Token(close),
        ] = node.children.as_slice()
        else {
            return Err(self.unhandled(node));
        };

        let prefix = self.consume(open)?;
        let inner = self.expression(inner)?;
        let close = self.closing(close);

        Ok(Expression::Parentheses(Arc::new(Parentheses {
            id: NodeId::next(),
            prefix,
            closed: close.is_some(),
            inner: RightPadded::new(inner, close.unwrap_or(Space::EMPTY)),
        })))
    }

    fn get_attr(&mut self, node: &HclNode) -> Result<Expression> {
        let [
            GrammarElement::Node(target),
            GrammarElement::Token(dot),
            GrammarElement::Token(name),
        ] = node.children.as_slice()
        else {
            return Err(self.unhandled(node));
        };

        let prefix = self.cursor.take_prefix(node.start());
        let target = self.expression(target)?;
        let before = self.consume(dot)?;
        let (space, name) = self.consume_text(name)?;

        Ok(Expression::GetAttr(Arc::new(GetAttr {
            id: NodeId::next(),
            prefix,
            target,
            name: LeftPadded::new(before, Variable::new(space, name)),
        })))
    }

    fn index(&mut self, node: &HclNode) -> Result<Expression> {
        let [
            GrammarElement::Node(target),
            GrammarElement::Token(open),
            GrammarElement::Node(index),
            GrammarElement::Token(close),
        ] = node.children.as_slice()
        else {
            return Err(self.unhandled(node));
        };

        let prefix = self.cursor.take_prefix(node.start());
        let target = self.expression(target)?;
        let open = self.consume(open)?;
        let index = self.expression(index)?;
        let close = self.closing(close);

        Ok(Expression::Index(Arc::new(Index {
            id: NodeId::next(),
            prefix,
            target,
            open,
            closed: close.is_some(),
            index: RightPadded::new(index, close.unwrap_or(Space::EMPTY)),
        })))
    }

    fn for_expression(&mut self, node: &HclNode) -> Result<Expression> {
        let object = node.rule == HclRule::ForObject;
        let close_kind = if object {
            HclToken::RBrace
        } else {
            HclToken::RBracket
        };

        let mut children = node.children.iter();
        let Some(GrammarElement::Token(open)) = children.next() else {
            return Err(self.unhandled(node));
        };
        let prefix = self.consume(open)?;

        let mut intro = None;
        let mut variables = Vec::new();
        let mut comma = None;
        let mut keyword: Option<(HclToken, Space)> = None;
        let mut collection = None;
        let mut result = None;
        let mut object_value = None;
        let mut condition = None;
        let mut grouping = None;
        let mut close = None;

        for child in children {
            match child {
                GrammarElement::Token(token) => match token.kind {
                    HclToken::For => intro = Some(self.consume(token)?),
                    HclToken::Identifier => {
                        let (space, name) = self.consume_text(token)?;
                        variables.push(Variable::new(space, name));
                    }
                    HclToken::Comma => comma = Some(self.consume(token)?),
                    HclToken::In | HclToken::Colon | HclToken::FatArrow | HclToken::If => {
                        keyword = Some((token.kind, self.consume(token)?));
                    }
                    HclToken::Ellipsis => grouping = Some(self.consume(token)?),
                    kind if kind == close_kind => close = self.closing(token),
                    _ => return Err(self.unhandled_token(token)),
                },
                GrammarElement::Node(expression) => {
                    let (kind, before) = keyword.take().ok_or_else(|| self.unhandled(expression))?;
                    let padded = LeftPadded::new(before, self.expression(expression)?);
                    let slot = match kind {
                        HclToken::In => &mut collection,
                        HclToken::Colon => &mut result,
                        HclToken::FatArrow => &mut object_value,
                        _ => &mut condition,
                    };
                    *slot = Some(padded);
                }
            }
        }

        let mut variables = variables.into_iter();
        let (key, value) = match (variables.next(), variables.next(), comma) {
            (Some(key), Some(value), Some(comma)) => (Some(RightPadded::new(key, comma)), value),
            (Some(value), None, None) => (None, value),
            _ => return Err(self.unhandled(node)),
        };

        Ok(Expression::For(Arc::new(ForExpr {
            id: NodeId::next(),
            prefix,
            object,
            intro: intro.ok_or_else(|| self.unhandled(node))?,
            key,
            value,
            collection: collection.ok_or_else(|| self.unhandled(node))?,
            result: result.ok_or_else(|| self.unhandled(node))?,
            object_value,
            grouping,
            condition,
            close,
        })))
    }
}

/// Literal or variable for a single token
fn leaf(kind: HclToken, prefix: Space, text: &str) -> Expression {
    let kind = match kind {
        HclToken::Number => LiteralKind::Number,
        HclToken::String => LiteralKind::String,
        HclToken::True => LiteralKind::True,
        HclToken::False => LiteralKind::False,
        HclToken::Null => LiteralKind::Null,
        _ => return Expression::Variable(Variable::new(prefix, text)),
    };
    Expression::Literal(Literal {
        id: NodeId::next(),
        prefix,
        kind,
        text: Arc::from(text),
    })
}

fn binary_op(kind: HclToken) -> Option<BinaryOp> {
    Some(match kind {
        HclToken::OrOr => BinaryOp::Or,
        HclToken::AndAnd => BinaryOp::And,
        HclToken::EqEq => BinaryOp::Equal,
        HclToken::NotEq => BinaryOp::NotEqual,
        HclToken::Lt => BinaryOp::Less,
        HclToken::Gt => BinaryOp::Greater,
        HclToken::Le => BinaryOp::LessEqual,
        HclToken::Ge => BinaryOp::GreaterEqual,
        HclToken::Plus => BinaryOp::Add,
        HclToken::Minus => BinaryOp::Subtract,
        HclToken::Star => BinaryOp::Multiply,
        HclToken::Slash => BinaryOp::Divide,
        HclToken::Percent => BinaryOp::Modulo,
        _ => return None,
    })
}

fn container<T>(before: Space, elements: Vec<RightPadded<T>>, closed: bool) -> Container<T> {
    let container = Container::new(before, elements);
    if closed { container } else { container.unclosed() }
}
