//! Lossless tree of an HCL configuration file
//!
//! Nodes own the space before their first significant token. Delimited
//! lists keep the space before each separator in a [`Container`], so
//! elements can be removed or reordered without losing the layout of the
//! ones that stay.

use std::sync::Arc;
use verbatim_core::lst::{
    Container, FallbackLiteral, LeftPadded, NodeId, RightPadded, Space, Tree,
};

macro_rules! impl_tree {
    ($($node:ty),* $(,)?) => {
        $(
            impl Tree for $node {
                fn id(&self) -> NodeId {
                    self.id
                }

                fn prefix(&self) -> &Space {
                    &self.prefix
                }

                fn with_prefix(&self, prefix: Space) -> Self {
                    Self {
                        prefix,
                        ..self.clone()
                    }
                }

                fn with_id(&self, id: NodeId) -> Self {
                    Self { id, ..self.clone() }
                }
            }
        )*
    };
}

/// `Tree` for an enum whose variants are `Arc`-shared or owned nodes
macro_rules! impl_tree_for_enum {
    ($enum:ident, shared: [$($shared:ident),*], owned: [$($owned:ident),*] $(,)?) => {
        impl Tree for $enum {
            fn id(&self) -> NodeId {
                match self {
                    $($enum::$shared(node) => node.id(),)*
                    $($enum::$owned(node) => node.id(),)*
                }
            }

            fn prefix(&self) -> &Space {
                match self {
                    $($enum::$shared(node) => node.prefix(),)*
                    $($enum::$owned(node) => node.prefix(),)*
                }
            }

            fn with_prefix(&self, prefix: Space) -> Self {
                match self {
                    $($enum::$shared(node) => $enum::$shared(Arc::new(node.with_prefix(prefix))),)*
                    $($enum::$owned(node) => $enum::$owned(node.with_prefix(prefix)),)*
                }
            }

            fn with_id(&self, id: NodeId) -> Self {
                match self {
                    $($enum::$shared(node) => $enum::$shared(Arc::new(node.with_id(id))),)*
                    $($enum::$owned(node) => $enum::$owned(node.with_id(id)),)*
                }
            }
        }
    };
}

/// Root of one configuration file
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub id: NodeId,
    pub prefix: Space,
    pub body: Body,
    /// Whitespace and comments after the last item
    pub eof: Space,
}

/// Attributes and blocks in source order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Body {
    pub items: Vec<BodyItem>,
}

impl Body {
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.items.iter().filter_map(|item| match item {
            BodyItem::Attribute(attribute) => Some(attribute.as_ref()),
            _ => None,
        })
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.items.iter().filter_map(|item| match item {
            BodyItem::Block(block) => Some(block.as_ref()),
            _ => None,
        })
    }

    /// The attribute named `name`, if any
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes().find(|attribute| &*attribute.name == name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyItem {
    Attribute(Arc<Attribute>),
    Block(Arc<Block>),
    Fallback(FallbackLiteral),
}

/// `name = value`; the value is padded by the space before `=`
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub id: NodeId,
    pub prefix: Space,
    pub name: Arc<str>,
    pub value: LeftPadded<Expression>,
}

/// `type label* { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: NodeId,
    pub prefix: Space,
    pub kind: Arc<str>,
    /// Identifier or quoted-string labels
    pub labels: Vec<Expression>,
    /// Space before `{`
    pub open: Space,
    pub body: Body,
    /// Space before `}`, `None` when it was missing
    pub close: Option<Space>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Variable(Variable),
    FunctionCall(Arc<FunctionCall>),
    Tuple(Arc<Tuple>),
    Object(Arc<Object>),
    Unary(Arc<Unary>),
    Binary(Arc<Binary>),
    Conditional(Arc<Conditional>),
    Parentheses(Arc<Parentheses>),
    GetAttr(Arc<GetAttr>),
    Index(Arc<Index>),
    For(Arc<ForExpr>),
    /// Nothing but space: after a trailing comma, or inside `[ ]`
    Empty(Empty),
    /// Source the builders could not structure
    Fallback(FallbackLiteral),
}

impl Expression {
    /// Variable reference with no prefix
    pub fn variable(name: &str) -> Self {
        Expression::Variable(Variable::new(Space::EMPTY, name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    /// Quoted template, kept as written
    String,
    True,
    False,
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub id: NodeId,
    pub prefix: Space,
    pub kind: LiteralKind,
    pub text: Arc<str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub id: NodeId,
    pub prefix: Space,
    pub name: Arc<str>,
}

impl Variable {
    pub fn new(prefix: Space, name: &str) -> Self {
        Self {
            id: NodeId::next(),
            prefix,
            name: Arc::from(name),
        }
    }
}

/// `name(args)` or `name(args...)`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub id: NodeId,
    pub prefix: Space,
    pub name: Arc<str>,
    /// Arguments; `before` is the space before `(`
    pub args: Container<Expression>,
    /// Space between `...` and `)` when the last argument is expanded
    pub expand: Option<Space>,
}

/// `[a, b]`
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    pub id: NodeId,
    pub prefix: Space,
    pub elements: Container<Expression>,
}

/// `{ key = value ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub id: NodeId,
    pub prefix: Space,
    /// Each `after` is the space before the member's comma, or before `}`
    pub members: Container<ObjectMember>,
}

/// One object entry and whether a comma follows it
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMember {
    pub entry: ObjectEntry,
    pub comma: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectEntry {
    Item(Arc<ObjectItem>),
    Fallback(FallbackLiteral),
    Empty(Empty),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assign {
    Equals,
    Colon,
}

impl Assign {
    pub fn as_str(self) -> &'static str {
        match self {
            Assign::Equals => "=",
            Assign::Colon => ":",
        }
    }
}

/// `key = value` or `key: value`
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectItem {
    pub id: NodeId,
    pub prefix: Space,
    pub key: Expression,
    pub assign: Assign,
    pub value: LeftPadded<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Negate => "-",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub id: NodeId,
    pub prefix: Space,
    pub operator: UnaryOp,
    pub operand: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
        }
    }
}

/// `left op right`; the operator is padded by the space before it
#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub id: NodeId,
    pub prefix: Space,
    pub left: Expression,
    pub operator: LeftPadded<BinaryOp>,
    pub right: Expression,
}

/// `condition ? truthy : falsy`
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub id: NodeId,
    pub prefix: Space,
    pub condition: Expression,
    /// Space before `?`, and the value
    pub truthy: LeftPadded<Expression>,
    /// Space before `:`, and the value
    pub falsy: LeftPadded<Expression>,
}

/// `( inner )`; `inner.after` is the space before `)`
#[derive(Debug, Clone, PartialEq)]
pub struct Parentheses {
    pub id: NodeId,
    pub prefix: Space,
    pub inner: RightPadded<Expression>,
    pub closed: bool,
}

/// `target.name`; the name is padded by the space before `.`
#[derive(Debug, Clone, PartialEq)]
pub struct GetAttr {
    pub id: NodeId,
    pub prefix: Space,
    pub target: Expression,
    pub name: LeftPadded<Variable>,
}

/// `target[index]`
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub id: NodeId,
    pub prefix: Space,
    pub target: Expression,
    /// Space before `[`
    pub open: Space,
    /// `after` is the space before `]`
    pub index: RightPadded<Expression>,
    pub closed: bool,
}

/// `[for k, v in xs : result if cond]` or
/// `{for k, v in xs : key => value... if cond}`
#[derive(Debug, Clone, PartialEq)]
pub struct ForExpr {
    pub id: NodeId,
    pub prefix: Space,
    /// Braces rather than brackets
    pub object: bool,
    /// Space before `for`
    pub intro: Space,
    /// Key variable; `after` is the space before `,`
    pub key: Option<RightPadded<Variable>>,
    pub value: Variable,
    /// Space before `in`, and the collection
    pub collection: LeftPadded<Expression>,
    /// Space before `:`, and the result (the key, for objects)
    pub result: LeftPadded<Expression>,
    /// Space before `=>`, and the value of an object comprehension
    pub object_value: Option<LeftPadded<Expression>>,
    /// Space before `...`
    pub grouping: Option<Space>,
    /// Space before `if`, and the filter
    pub condition: Option<LeftPadded<Expression>>,
    /// Space before the closing delimiter
    pub close: Option<Space>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Empty {
    pub id: NodeId,
    pub prefix: Space,
}

impl Empty {
    pub fn new(prefix: Space) -> Self {
        Self {
            id: NodeId::next(),
            prefix,
        }
    }
}

impl_tree!(
    ConfigFile,
    Attribute,
    Block,
    Literal,
    Variable,
    FunctionCall,
    Tuple,
    Object,
    ObjectItem,
    Unary,
    Binary,
    Conditional,
    Parentheses,
    GetAttr,
    Index,
    ForExpr,
    Empty,
);

impl_tree_for_enum!(BodyItem, shared: [Attribute, Block], owned: [Fallback]);

impl_tree_for_enum!(ObjectEntry, shared: [Item], owned: [Fallback, Empty]);

impl_tree_for_enum!(
    Expression,
    shared: [
        FunctionCall,
        Tuple,
        Object,
        Unary,
        Binary,
        Conditional,
        Parentheses,
        GetAttr,
        Index,
        For
    ],
    owned: [Literal, Variable, Empty, Fallback],
);

impl Tree for ObjectMember {
    fn id(&self) -> NodeId {
        self.entry.id()
    }

    fn prefix(&self) -> &Space {
        self.entry.prefix()
    }

    fn with_prefix(&self, prefix: Space) -> Self {
        Self {
            entry: self.entry.with_prefix(prefix),
            comma: self.comma,
        }
    }

    fn with_id(&self, id: NodeId) -> Self {
        Self {
            entry: self.entry.with_id(id),
            comma: self.comma,
        }
    }
}
