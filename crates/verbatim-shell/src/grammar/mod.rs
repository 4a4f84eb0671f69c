//! Shell grammar engine
//!
//! A recovering recursive-descent parser that produces the conventional,
//! whitespace-discarding parse tree the builders consume. Offsets are
//! Unicode code point indices. Newlines separate commands here but are not
//! represented in the lossless tree; the builders leave them in prefixes.

mod parser;

pub use parser::parse;

use verbatim_core::lst::{GrammarElement, GrammarKind, GrammarNode, GrammarToken};

pub type ShellNode = GrammarNode<ShellRule, ShellToken>;
pub type ShellElement = GrammarElement<ShellRule, ShellToken>;
pub type ShellGrammarToken = GrammarToken<ShellToken>;

/// Productions of the shell grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellRule {
    Program,
    List,
    AndOr,
    Pipeline,
    SimpleCommand,
    Assignment,
    Word,
    Redirect,
    Redirected,
    Subshell,
    BraceGroup,
    If,
    ElifClause,
    ElseClause,
    While,
    Until,
    For,
    Case,
    CaseItem,
    FunctionDef,
    CommandSubstitution,
    Error,
}

impl GrammarKind for ShellRule {
    fn name(self) -> &'static str {
        match self {
            ShellRule::Program => "Program",
            ShellRule::List => "List",
            ShellRule::AndOr => "AndOr",
            ShellRule::Pipeline => "Pipeline",
            ShellRule::SimpleCommand => "SimpleCommand",
            ShellRule::Assignment => "Assignment",
            ShellRule::Word => "Word",
            ShellRule::Redirect => "Redirect",
            ShellRule::Redirected => "Redirected",
            ShellRule::Subshell => "Subshell",
            ShellRule::BraceGroup => "BraceGroup",
            ShellRule::If => "If",
            ShellRule::ElifClause => "ElifClause",
            ShellRule::ElseClause => "ElseClause",
            ShellRule::While => "While",
            ShellRule::Until => "Until",
            ShellRule::For => "For",
            ShellRule::Case => "Case",
            ShellRule::CaseItem => "CaseItem",
            ShellRule::FunctionDef => "FunctionDef",
            ShellRule::CommandSubstitution => "CommandSubstitution",
            ShellRule::Error => "Error",
        }
    }
}

/// Token kinds of the shell grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellToken {
    // word parts
    Literal,
    SingleQuoted,
    DoubleQuoted,
    Parameter,
    Arithmetic,
    Backtick,
    DollarParen,

    // assignment
    AssignName,
    Equals,

    // redirects
    IoNumber,
    RedirectOp,

    // operators
    Semi,
    Amp,
    AndIf,
    OrIf,
    Pipe,
    Bang,
    DoubleSemi,
    LParen,
    RParen,
    Newline,

    // reserved words
    LBrace,
    RBrace,
    If,
    Then,
    Elif,
    Else,
    Fi,
    While,
    Until,
    Do,
    Done,
    For,
    In,
    Case,
    Esac,
    Name,
}

impl GrammarKind for ShellToken {
    fn name(self) -> &'static str {
        match self {
            ShellToken::Literal => "Literal",
            ShellToken::SingleQuoted => "SingleQuoted",
            ShellToken::DoubleQuoted => "DoubleQuoted",
            ShellToken::Parameter => "Parameter",
            ShellToken::Arithmetic => "Arithmetic",
            ShellToken::Backtick => "Backtick",
            ShellToken::DollarParen => "$(",
            ShellToken::AssignName => "AssignName",
            ShellToken::Equals => "=",
            ShellToken::IoNumber => "IoNumber",
            ShellToken::RedirectOp => "RedirectOp",
            ShellToken::Semi => ";",
            ShellToken::Amp => "&",
            ShellToken::AndIf => "&&",
            ShellToken::OrIf => "||",
            ShellToken::Pipe => "|",
            ShellToken::Bang => "!",
            ShellToken::DoubleSemi => ";;",
            ShellToken::LParen => "(",
            ShellToken::RParen => ")",
            ShellToken::Newline => "newline",
            ShellToken::LBrace => "{",
            ShellToken::RBrace => "}",
            ShellToken::If => "if",
            ShellToken::Then => "then",
            ShellToken::Elif => "elif",
            ShellToken::Else => "else",
            ShellToken::Fi => "fi",
            ShellToken::While => "while",
            ShellToken::Until => "until",
            ShellToken::Do => "do",
            ShellToken::Done => "done",
            ShellToken::For => "for",
            ShellToken::In => "in",
            ShellToken::Case => "case",
            ShellToken::Esac => "esac",
            ShellToken::Name => "Name",
        }
    }
}

impl ShellToken {
    /// The reserved word spelled `text`, if any
    pub fn reserved(text: &str) -> Option<ShellToken> {
        Some(match text {
            "{" => ShellToken::LBrace,
            "}" => ShellToken::RBrace,
            "!" => ShellToken::Bang,
            "if" => ShellToken::If,
            "then" => ShellToken::Then,
            "elif" => ShellToken::Elif,
            "else" => ShellToken::Else,
            "fi" => ShellToken::Fi,
            "while" => ShellToken::While,
            "until" => ShellToken::Until,
            "do" => ShellToken::Do,
            "done" => ShellToken::Done,
            "for" => ShellToken::For,
            "case" => ShellToken::Case,
            "esac" => ShellToken::Esac,
            _ => return None,
        })
    }
}
