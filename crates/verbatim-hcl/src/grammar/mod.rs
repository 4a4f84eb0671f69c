//! HCL grammar engine
//!
//! A lexer and a recovering recursive-descent parser for the native HCL
//! syntax. Like most engines written for UTF-16 hosts it reports offsets in
//! UTF-16 code units, which the builders map back through the cursor.
//! Whitespace and comments are discarded; newlines only steer the parser.

mod lexer;
mod parser;

pub use lexer::{Lexeme, lex};
pub use parser::parse;

use verbatim_core::lst::{GrammarElement, GrammarKind, GrammarNode, GrammarToken};

pub type HclNode = GrammarNode<HclRule, HclToken>;
pub type HclElement = GrammarElement<HclRule, HclToken>;
pub type HclGrammarToken = GrammarToken<HclToken>;

/// Productions of the HCL grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HclRule {
    ConfigFile,
    Body,
    Attribute,
    Block,
    Literal,
    Variable,
    FunctionCall,
    Tuple,
    Object,
    ObjectItem,
    ForTuple,
    ForObject,
    Unary,
    Binary,
    Conditional,
    Parentheses,
    GetAttr,
    Index,
    Error,
}

impl GrammarKind for HclRule {
    fn name(self) -> &'static str {
        match self {
            HclRule::ConfigFile => "ConfigFile",
            HclRule::Body => "Body",
            HclRule::Attribute => "Attribute",
            HclRule::Block => "Block",
            HclRule::Literal => "Literal",
            HclRule::Variable => "Variable",
            HclRule::FunctionCall => "FunctionCall",
            HclRule::Tuple => "Tuple",
            HclRule::Object => "Object",
            HclRule::ObjectItem => "ObjectItem",
            HclRule::ForTuple => "ForTuple",
            HclRule::ForObject => "ForObject",
            HclRule::Unary => "Unary",
            HclRule::Binary => "Binary",
            HclRule::Conditional => "Conditional",
            HclRule::Parentheses => "Parentheses",
            HclRule::GetAttr => "GetAttr",
            HclRule::Index => "Index",
            HclRule::Error => "Error",
        }
    }
}

/// Token kinds of the HCL grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HclToken {
    Identifier,
    Number,
    /// Quoted template, interpolations included
    String,
    Heredoc,

    // keywords, lexed as identifiers
    True,
    False,
    Null,
    For,
    In,
    If,

    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Equals,
    Colon,
    Question,
    Dot,
    Ellipsis,
    FatArrow,

    Bang,
    Minus,
    Plus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    AndAnd,
    OrOr,

    Newline,
    Unknown,
}

impl GrammarKind for HclToken {
    fn name(self) -> &'static str {
        match self {
            HclToken::Identifier => "Identifier",
            HclToken::Number => "Number",
            HclToken::String => "String",
            HclToken::Heredoc => "Heredoc",
            HclToken::True => "true",
            HclToken::False => "false",
            HclToken::Null => "null",
            HclToken::For => "for",
            HclToken::In => "in",
            HclToken::If => "if",
            HclToken::LBrace => "{",
            HclToken::RBrace => "}",
            HclToken::LBracket => "[",
            HclToken::RBracket => "]",
            HclToken::LParen => "(",
            HclToken::RParen => ")",
            HclToken::Comma => ",",
            HclToken::Equals => "=",
            HclToken::Colon => ":",
            HclToken::Question => "?",
            HclToken::Dot => ".",
            HclToken::Ellipsis => "...",
            HclToken::FatArrow => "=>",
            HclToken::Bang => "!",
            HclToken::Minus => "-",
            HclToken::Plus => "+",
            HclToken::Star => "*",
            HclToken::Slash => "/",
            HclToken::Percent => "%",
            HclToken::EqEq => "==",
            HclToken::NotEq => "!=",
            HclToken::Lt => "<",
            HclToken::Gt => ">",
            HclToken::Le => "<=",
            HclToken::Ge => ">=",
            HclToken::AndAnd => "&&",
            HclToken::OrOr => "||",
            HclToken::Newline => "newline",
            HclToken::Unknown => "Unknown",
        }
    }
}

impl HclToken {
    /// Binding power of a binary operator; higher binds tighter
    pub fn precedence(self) -> Option<u8> {
        Some(match self {
            HclToken::OrOr => 1,
            HclToken::AndAnd => 2,
            HclToken::EqEq | HclToken::NotEq => 3,
            HclToken::Lt | HclToken::Gt | HclToken::Le | HclToken::Ge => 4,
            HclToken::Plus | HclToken::Minus => 5,
            HclToken::Star | HclToken::Slash | HclToken::Percent => 6,
            _ => return None,
        })
    }
}
