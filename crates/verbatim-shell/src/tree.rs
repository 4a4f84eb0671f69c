//! Lossless tree of a shell script
//!
//! Every node owns the space before its first significant token. Compound
//! nodes sit behind `Arc` so an edit rebuilds only the parent chain of what
//! changed and shares everything else.

use std::sync::Arc;
use verbatim_core::lst::{FallbackLiteral, LeftPadded, NodeId, RightPadded, Space, Tree};

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

/// Root of one script
#[derive(Debug, Clone, PartialEq)]
pub struct ShellFile {
    pub id: NodeId,
    pub prefix: Space,
    pub body: StatementList,
    /// Whitespace and comments after the last statement
    pub eof: Space,
}

/// Statements in source order with their separators
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatementList {
    pub items: Vec<ListItem>,
}

impl StatementList {
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.items.iter().map(|item| item.statement.element())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One statement; `after` is the space before its `;` or `&`
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub statement: RightPadded<Statement>,
    pub separator: Option<Separator>,
}

impl ListItem {
    pub fn new(statement: Statement) -> Self {
        Self {
            statement: RightPadded::build(statement),
            separator: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Semi,
    Amp,
}

impl Separator {
    pub fn as_str(self) -> &'static str {
        match self {
            Separator::Semi => ";",
            Separator::Amp => "&",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Command(Arc<Command>),
    Pipeline(Arc<Pipeline>),
    Logical(Arc<Logical>),
    Subshell(Arc<Subshell>),
    BraceGroup(Arc<BraceGroup>),
    If(Arc<If>),
    Loop(Arc<Loop>),
    For(Arc<For>),
    Case(Arc<Case>),
    Function(Arc<FunctionDef>),
    Redirected(Arc<Redirected>),
    /// Source the builders could not structure
    Fallback(FallbackLiteral),
}

/// Words, assignments and redirects of a simple command, in source order
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub id: NodeId,
    pub prefix: Space,
    pub elements: Vec<CommandElement>,
}

impl Command {
    /// The command's words, without assignments and redirects
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.elements.iter().filter_map(|element| match element {
            CommandElement::Word(word) => Some(word),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandElement {
    Assignment(Assignment),
    Word(Word),
    Redirect(Redirect),
}

/// `name=value`; the value is padded by the space before `=`
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub id: NodeId,
    pub prefix: Space,
    pub name: Arc<str>,
    pub value: LeftPadded<Option<Word>>,
}

/// `[n]op target`
#[derive(Debug, Clone, PartialEq)]
pub struct Redirect {
    pub id: NodeId,
    pub prefix: Space,
    pub fd: Option<Arc<str>>,
    pub operator: RedirectOp,
    pub target: Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectOp {
    Read,
    Write,
    Append,
    DupRead,
    DupWrite,
    ReadWrite,
    Clobber,
    HereDoc,
}

impl RedirectOp {
    pub fn as_str(self) -> &'static str {
        match self {
            RedirectOp::Read => "<",
            RedirectOp::Write => ">",
            RedirectOp::Append => ">>",
            RedirectOp::DupRead => "<&",
            RedirectOp::DupWrite => ">&",
            RedirectOp::ReadWrite => "<>",
            RedirectOp::Clobber => ">|",
            RedirectOp::HereDoc => "<<",
        }
    }

    pub fn from_text(text: &str) -> Option<Self> {
        Some(match text {
            "<" => RedirectOp::Read,
            ">" => RedirectOp::Write,
            ">>" => RedirectOp::Append,
            "<&" => RedirectOp::DupRead,
            ">&" => RedirectOp::DupWrite,
            "<>" => RedirectOp::ReadWrite,
            ">|" => RedirectOp::Clobber,
            "<<" => RedirectOp::HereDoc,
            _ => return None,
        })
    }
}

/// `[!] a | b | c`; each `after` is the space before the next `|`
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub id: NodeId,
    pub prefix: Space,
    pub negated: bool,
    pub commands: Vec<RightPadded<Statement>>,
}

/// `a && b || c`; `operators[i]` follows `operands[i]`
#[derive(Debug, Clone, PartialEq)]
pub struct Logical {
    pub id: NodeId,
    pub prefix: Space,
    pub operands: Vec<RightPadded<Statement>>,
    pub operators: Vec<LogicalOp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }
}

/// `( list )`; `close` is the space before `)`, `None` when it was missing
#[derive(Debug, Clone, PartialEq)]
pub struct Subshell {
    pub id: NodeId,
    pub prefix: Space,
    pub body: StatementList,
    pub close: Option<Space>,
}

/// `{ list; }`
#[derive(Debug, Clone, PartialEq)]
pub struct BraceGroup {
    pub id: NodeId,
    pub prefix: Space,
    pub body: StatementList,
    pub close: Option<Space>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub id: NodeId,
    pub prefix: Space,
    pub condition: StatementList,
    /// Space before `then`, and the branch
    pub then_branch: LeftPadded<StatementList>,
    /// Space before each `elif`, and its clause
    pub elifs: Vec<LeftPadded<Elif>>,
    /// Space before `else`, and the branch
    pub else_branch: Option<LeftPadded<StatementList>>,
    /// Space before `fi`
    pub fi: Option<Space>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Elif {
    pub condition: StatementList,
    pub then_branch: LeftPadded<StatementList>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    While,
    Until,
}

impl LoopKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LoopKind::While => "while",
            LoopKind::Until => "until",
        }
    }
}

/// `while`/`until` loop
#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    pub id: NodeId,
    pub prefix: Space,
    pub kind: LoopKind,
    pub condition: StatementList,
    pub body: DoGroup,
}

/// `do list done`
#[derive(Debug, Clone, PartialEq)]
pub struct DoGroup {
    /// Space before `do`
    pub before: Space,
    pub body: StatementList,
    /// Space before `done`
    pub done: Option<Space>,
}

/// `for name [in words] [;] do ... done`
#[derive(Debug, Clone, PartialEq)]
pub struct For {
    pub id: NodeId,
    pub prefix: Space,
    /// Space before the loop variable, and its name
    pub variable: LeftPadded<Arc<str>>,
    /// Space before `in`, and the words
    pub items: Option<LeftPadded<Vec<Word>>>,
    /// Space before `;`
    pub semi: Option<Space>,
    pub body: DoGroup,
}

/// `case word in items esac`
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub id: NodeId,
    pub prefix: Space,
    pub word: Word,
    /// Space before `in`
    pub before_in: Space,
    pub items: Vec<CaseItem>,
    /// Space before `esac`
    pub esac: Option<Space>,
}

/// `[(] pattern [| pattern]... ) list [;;]`
#[derive(Debug, Clone, PartialEq)]
pub struct CaseItem {
    pub id: NodeId,
    pub prefix: Space,
    pub open_paren: bool,
    /// Each `after` is the space before the next `|` or the `)`
    pub patterns: Vec<RightPadded<Word>>,
    pub body: StatementList,
    /// Space before `;;`
    pub terminator: Option<Space>,
}

/// `name() body`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub id: NodeId,
    pub prefix: Space,
    pub name: Arc<str>,
    /// Space before `(`
    pub before_parens: Space,
    /// Space between `(` and `)`
    pub inside_parens: Space,
    pub body: Statement,
}

/// A compound command followed by redirects
#[derive(Debug, Clone, PartialEq)]
pub struct Redirected {
    pub id: NodeId,
    pub prefix: Space,
    pub command: Statement,
    pub redirects: Vec<Redirect>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Word {
    /// A single part: literal text, quotes or an expansion
    Part(WordPart),
    /// Adjacent parts with no space between them
    Concatenation(Arc<Concatenation>),
    CommandSubstitution(Arc<CommandSubstitution>),
    Fallback(FallbackLiteral),
}

impl Word {
    /// Literal word with no prefix
    pub fn literal(text: &str) -> Self {
        Word::Part(WordPart {
            id: NodeId::next(),
            prefix: Space::EMPTY,
            kind: PartKind::Literal,
            text: Arc::from(text),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordPart {
    pub id: NodeId,
    pub prefix: Space,
    pub kind: PartKind,
    /// Exact source text, quotes and `$` included
    pub text: Arc<str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Literal,
    SingleQuoted,
    DoubleQuoted,
    Parameter,
    Arithmetic,
    Backtick,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Concatenation {
    pub id: NodeId,
    pub prefix: Space,
    pub parts: Vec<Word>,
}

/// `$( list )`
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSubstitution {
    pub id: NodeId,
    pub prefix: Space,
    pub body: StatementList,
    pub close: Option<Space>,
}

impl_tree!(
    ShellFile,
    Command,
    Assignment,
    Redirect,
    Pipeline,
    Logical,
    Subshell,
    BraceGroup,
    If,
    Loop,
    For,
    Case,
    CaseItem,
    FunctionDef,
    Redirected,
    WordPart,
    Concatenation,
    CommandSubstitution,
);

impl Tree for Statement {
    fn id(&self) -> NodeId {
        match self {
            Statement::Command(node) => node.id,
            Statement::Pipeline(node) => node.id,
            Statement::Logical(node) => node.id,
            Statement::Subshell(node) => node.id,
            Statement::BraceGroup(node) => node.id,
            Statement::If(node) => node.id,
            Statement::Loop(node) => node.id,
            Statement::For(node) => node.id,
            Statement::Case(node) => node.id,
            Statement::Function(node) => node.id,
            Statement::Redirected(node) => node.id,
            Statement::Fallback(node) => node.id(),
        }
    }

    fn prefix(&self) -> &Space {
        match self {
            Statement::Command(node) => &node.prefix,
            Statement::Pipeline(node) => &node.prefix,
            Statement::Logical(node) => &node.prefix,
            Statement::Subshell(node) => &node.prefix,
            Statement::BraceGroup(node) => &node.prefix,
            Statement::If(node) => &node.prefix,
            Statement::Loop(node) => &node.prefix,
            Statement::For(node) => &node.prefix,
            Statement::Case(node) => &node.prefix,
            Statement::Function(node) => &node.prefix,
            Statement::Redirected(node) => &node.prefix,
            Statement::Fallback(node) => node.prefix(),
        }
    }

    fn with_prefix(&self, prefix: Space) -> Self {
        match self {
            Statement::Command(node) => Statement::Command(Arc::new(node.with_prefix(prefix))),
            Statement::Pipeline(node) => Statement::Pipeline(Arc::new(node.with_prefix(prefix))),
            Statement::Logical(node) => Statement::Logical(Arc::new(node.with_prefix(prefix))),
            Statement::Subshell(node) => Statement::Subshell(Arc::new(node.with_prefix(prefix))),
            Statement::BraceGroup(node) => {
                Statement::BraceGroup(Arc::new(node.with_prefix(prefix)))
            }
            Statement::If(node) => Statement::If(Arc::new(node.with_prefix(prefix))),
            Statement::Loop(node) => Statement::Loop(Arc::new(node.with_prefix(prefix))),
            Statement::For(node) => Statement::For(Arc::new(node.with_prefix(prefix))),
            Statement::Case(node) => Statement::Case(Arc::new(node.with_prefix(prefix))),
            Statement::Function(node) => Statement::Function(Arc::new(node.with_prefix(prefix))),
            Statement::Redirected(node) => {
                Statement::Redirected(Arc::new(node.with_prefix(prefix)))
            }
            Statement::Fallback(node) => Statement::Fallback(node.with_prefix(prefix)),
        }
    }

    fn with_id(&self, id: NodeId) -> Self {
        match self {
            Statement::Command(node) => Statement::Command(Arc::new(node.with_id(id))),
            Statement::Pipeline(node) => Statement::Pipeline(Arc::new(node.with_id(id))),
            Statement::Logical(node) => Statement::Logical(Arc::new(node.with_id(id))),
            Statement::Subshell(node) => Statement::Subshell(Arc::new(node.with_id(id))),
            Statement::BraceGroup(node) => Statement::BraceGroup(Arc::new(node.with_id(id))),
            Statement::If(node) => Statement::If(Arc::new(node.with_id(id))),
            Statement::Loop(node) => Statement::Loop(Arc::new(node.with_id(id))),
            Statement::For(node) => Statement::For(Arc::new(node.with_id(id))),
            Statement::Case(node) => Statement::Case(Arc::new(node.with_id(id))),
            Statement::Function(node) => Statement::Function(Arc::new(node.with_id(id))),
            Statement::Redirected(node) => Statement::Redirected(Arc::new(node.with_id(id))),
            Statement::Fallback(node) => Statement::Fallback(node.with_id(id)),
        }
    }
}

impl Tree for Word {
    fn id(&self) -> NodeId {
        match self {
            Word::Part(node) => node.id,
            Word::Concatenation(node) => node.id,
            Word::CommandSubstitution(node) => node.id,
            Word::Fallback(node) => node.id(),
        }
    }

    fn prefix(&self) -> &Space {
        match self {
            Word::Part(node) => &node.prefix,
            Word::Concatenation(node) => &node.prefix,
            Word::CommandSubstitution(node) => &node.prefix,
            Word::Fallback(node) => node.prefix(),
        }
    }

    fn with_prefix(&self, prefix: Space) -> Self {
        match self {
            Word::Part(node) => Word::Part(node.with_prefix(prefix)),
            Word::Concatenation(node) => Word::Concatenation(Arc::new(node.with_prefix(prefix))),
            Word::CommandSubstitution(node) => {
                Word::CommandSubstitution(Arc::new(node.with_prefix(prefix)))
            }
            Word::Fallback(node) => Word::Fallback(node.with_prefix(prefix)),
        }
    }

    fn with_id(&self, id: NodeId) -> Self {
        match self {
            Word::Part(node) => Word::Part(node.with_id(id)),
            Word::Concatenation(node) => Word::Concatenation(Arc::new(node.with_id(id))),
            Word::CommandSubstitution(node) => {
                Word::CommandSubstitution(Arc::new(node.with_id(id)))
            }
            Word::Fallback(node) => Word::Fallback(node.with_id(id)),
        }
    }
}

impl Tree for CommandElement {
    fn id(&self) -> NodeId {
        match self {
            CommandElement::Assignment(node) => node.id,
            CommandElement::Word(node) => node.id(),
            CommandElement::Redirect(node) => node.id,
        }
    }

    fn prefix(&self) -> &Space {
        match self {
            CommandElement::Assignment(node) => &node.prefix,
            CommandElement::Word(node) => node.prefix(),
            CommandElement::Redirect(node) => &node.prefix,
        }
    }

    fn with_prefix(&self, prefix: Space) -> Self {
        match self {
            CommandElement::Assignment(node) => CommandElement::Assignment(node.with_prefix(prefix)),
            CommandElement::Word(node) => CommandElement::Word(node.with_prefix(prefix)),
            CommandElement::Redirect(node) => CommandElement::Redirect(node.with_prefix(prefix)),
        }
    }

    fn with_id(&self, id: NodeId) -> Self {
        match self {
            CommandElement::Assignment(node) => CommandElement::Assignment(node.with_id(id)),
            CommandElement::Word(node) => CommandElement::Word(node.with_id(id)),
            CommandElement::Redirect(node) => CommandElement::Redirect(node.with_id(id)),
        }
    }
}
