//! Grammar tree to lossless tree
//!
//! One method per production. Each takes its node's prefix from the shared
//! cursor, consumes its tokens and children in source order, and leaves the
//! cursor at the end of what it consumed. Whatever the grammar tree does not
//! cover (blanks, newlines, comments, line continuations) is picked up by
//! the next `take_prefix`.

use crate::LANGUAGE;
use crate::grammar::{ShellElement, ShellGrammarToken, ShellNode, ShellRule, ShellToken};
use crate::tree::*;
use std::sync::Arc;
use tracing::debug;
use verbatim_core::config::VerbatimConfig;
use verbatim_core::error::VerbatimError;
use verbatim_core::lst::{
    CommentSyntax, Cursor, FallbackLiteral, FallbackPolicy, FallbackTable, GrammarElement,
    GrammarKind, LeftPadded, NodeId, OffsetDomain, Recovery, RightPadded, Space, Tree,
};
use verbatim_core::result::Result;

/// Default fallback policy per production
pub const FALLBACKS: &[(&str, FallbackPolicy)] = &[
    ("Subshell", FallbackPolicy::LiteralCapture),
    ("BraceGroup", FallbackPolicy::LiteralCapture),
    ("If", FallbackPolicy::LiteralCapture),
    ("While", FallbackPolicy::LiteralCapture),
    ("Until", FallbackPolicy::LiteralCapture),
    ("For", FallbackPolicy::LiteralCapture),
    ("Case", FallbackPolicy::LiteralCapture),
    ("CommandSubstitution", FallbackPolicy::PartialOmission),
    ("FunctionDef", FallbackPolicy::LiteralCapture),
    ("Error", FallbackPolicy::LiteralCapture),
];

pub struct ShellBuilder<'s> {
    cursor: Cursor<'s>,
    table: FallbackTable,
}

impl<'s> ShellBuilder<'s> {
    pub fn new(source: &'s str, config: &VerbatimConfig) -> Self {
        let mut cursor = Cursor::new(source, OffsetDomain::CodePoint, CommentSyntax::HASH);
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

    pub fn build(&mut self, program: &ShellNode) -> Result<ShellFile> {
        if program.rule != ShellRule::Program {
            return Err(self.unhandled(program));
        }

        let prefix = self.cursor.take_prefix(program.start());
        let mut body = StatementList::default();
        for child in &program.children {
            match child {
                GrammarElement::Node(list) if list.rule == ShellRule::List => {
                    body = self.list(list)?;
                }
                other => return Err(self.unhandled_element(other)),
            }
        }
        let eof = self.cursor.finish();

        Ok(ShellFile {
            id: NodeId::next(),
            prefix,
            body,
            eof,
        })
    }

    fn unhandled(&self, node: &ShellNode) -> VerbatimError {
        VerbatimError::unhandled_production(LANGUAGE, node.rule.name(), self.cursor.position())
    }

    fn unhandled_token(&self, token: &ShellGrammarToken) -> VerbatimError {
        VerbatimError::unhandled_production(LANGUAGE, token.kind.name(), self.cursor.position())
    }

    fn unhandled_element(&self, element: &ShellElement) -> VerbatimError {
        match element {
            GrammarElement::Token(token) => self.unhandled_token(token),
            GrammarElement::Node(node) => self.unhandled(node),
        }
    }

    fn recovery(&self, node: &ShellNode, closer: Option<ShellToken>) -> Recovery {
        self.table.recovery(node, closer, &self.cursor)
    }

    fn capture(&mut self, node: &ShellNode) -> FallbackLiteral {
        self.cursor
            .capture(node.start(), node.stop(), node.rule.name())
    }

    /// Consume a real token, returning the space before it
    fn consume(&mut self, token: &ShellGrammarToken) -> Result<Space> {
        self.consume_text(token).map(|(space, _)| space)
    }

    fn consume_text(&mut self, token: &ShellGrammarToken) -> Result<(Space, &'s str)> {
        self.cursor.token(token).ok_or_else(|| {
            VerbatimError::internal_error(format!(
                "synthetic {} token reached the {LANGUAGE} builder",
                token.kind.name()
            ))
        })
    }

    fn required<'n>(
        &self,
        node: &'n ShellNode,
        kind: ShellToken,
    ) -> Result<&'n ShellGrammarToken> {
        node.token(kind).ok_or_else(|| self.unhandled(node))
    }

    fn required_node<'n>(&self, node: &'n ShellNode, rule: ShellRule) -> Result<&'n ShellNode> {
        node.node(rule).ok_or_else(|| self.unhandled(node))
    }

    /// The closing token's space, or `None` when recovery omits it
    fn closer(
        &mut self,
        node: &ShellNode,
        kind: ShellToken,
        recovery: Recovery,
    ) -> Result<Option<Space>> {
        if recovery == Recovery::OmitCloser {
            return Ok(None);
        }
        let token = self.required(node, kind)?;
        self.consume(token).map(Some)
    }

    fn list(&mut self, node: &ShellNode) -> Result<StatementList> {
        let mut items = Vec::new();
        let mut pending: Option<Statement> = None;

        for child in &node.children {
            match child {
                GrammarElement::Node(statement) => {
                    if let Some(previous) = pending.take() {
                        items.push(ListItem::new(previous));
                    }
                    pending = Some(self.statement(statement)?);
                }
                GrammarElement::Token(token) => match token.kind {
                    // left for the next prefix
                    ShellToken::Newline => {}
                    ShellToken::Semi | ShellToken::Amp => {
                        let statement = pending.take().ok_or_else(|| self.unhandled_token(token))?;
                        let after = self.consume(token)?;
                        let separator = if token.kind == ShellToken::Semi {
                            Separator::Semi
                        } else {
                            Separator::Amp
                        };
                        items.push(ListItem {
                            statement: RightPadded::new(statement, after),
                            separator: Some(separator),
                        });
                    }
                    _ => return Err(self.unhandled_token(token)),
                },
            }
        }
        if let Some(last) = pending {
            items.push(ListItem::new(last));
        }

        Ok(StatementList { items })
    }

    fn statement(&mut self, node: &ShellNode) -> Result<Statement> {
        match node.rule {
            ShellRule::AndOr => self.logical(node),
            ShellRule::Pipeline => self.pipeline(node),
            ShellRule::SimpleCommand => self.command(node),
            ShellRule::Subshell => self.subshell(node),
            ShellRule::BraceGroup => self.brace_group(node),
            ShellRule::If => self.if_clause(node),
            ShellRule::While | ShellRule::Until => self.loop_clause(node),
            ShellRule::For => self.for_clause(node),
            ShellRule::Case => self.case_clause(node),
            ShellRule::FunctionDef => self.function_def(node),
            ShellRule::Redirected => self.redirected(node),
            ShellRule::Error => Ok(Statement::Fallback(self.capture(node))),
            _ => Err(self.unhandled(node)),
        }
    }

    fn logical(&mut self, node: &ShellNode) -> Result<Statement> {
        if let [GrammarElement::Node(only)] = node.children.as_slice() {
            return self.statement(only);
        }
        if self.recovery(node, None) == Recovery::Capture {
            return Ok(Statement::Fallback(self.capture(node)));
        }

        let prefix = self.cursor.take_prefix(node.start());
        let mut operands = Vec::new();
        let mut operators = Vec::new();
        let mut pending = None;

        for child in &node.children {
            match child {
                GrammarElement::Node(operand) => pending = Some(self.statement(operand)?),
                GrammarElement::Token(token) => {
                    let operator = match token.kind {
                        ShellToken::AndIf => LogicalOp::And,
                        ShellToken::OrIf => LogicalOp::Or,
                        _ => return Err(self.unhandled_token(token)),
                    };
                    let operand = pending.take().ok_or_else(|| self.unhandled_token(token))?;
                    operands.push(RightPadded::new(operand, self.consume(token)?));
                    operators.push(operator);
                }
            }
        }
        let last = pending.ok_or_else(|| self.unhandled(node))?;
        operands.push(RightPadded::build(last));

        Ok(Statement::Logical(Arc::new(Logical {
            id: NodeId::next(),
            prefix,
            operands,
            operators,
        })))
    }

    fn pipeline(&mut self, node: &ShellNode) -> Result<Statement> {
        if let [GrammarElement::Node(only)] = node.children.as_slice() {
            return self.statement(only);
        }
        if self.recovery(node, None) == Recovery::Capture {
            return Ok(Statement::Fallback(self.capture(node)));
        }

        let prefix = self.cursor.take_prefix(node.start());
        let mut negated = false;
        let mut commands = Vec::new();
        let mut pending = None;

        for child in &node.children {
            match child {
                GrammarElement::Node(command) => pending = Some(self.statement(command)?),
                GrammarElement::Token(token) => match token.kind {
                    ShellToken::Bang => {
                        self.consume(token)?;
                        negated = true;
                    }
                    ShellToken::Pipe => {
                        let command = pending.take().ok_or_else(|| self.unhandled_token(token))?;
                        commands.push(RightPadded::new(command, self.consume(token)?));
                    }
                    _ => return Err(self.unhandled_token(token)),
                },
            }
        }
        let last = pending.ok_or_else(|| self.unhandled(node))?;
        commands.push(RightPadded::build(last));

        Ok(Statement::Pipeline(Arc::new(Pipeline {
            id: NodeId::next(),
            prefix,
            negated,
            commands,
        })))
    }

    /// Whether a redirect below `node` lost its target
    fn broken_redirects(&self, node: &ShellNode) -> bool {
        node.nodes()
            .any(|child| child.rule == ShellRule::Redirect && self.recovery(child, None) != Recovery::Build)
    }

    fn command(&mut self, node: &ShellNode) -> Result<Statement> {
        if self.broken_redirects(node) {
            return Ok(Statement::Fallback(self.capture(node)));
        }

        let prefix = self.cursor.take_prefix(node.start());
        let mut elements = Vec::with_capacity(node.children.len());
        for child in &node.children {
            let element = match child {
                GrammarElement::Node(n) if n.rule == ShellRule::Assignment => {
                    CommandElement::Assignment(self.assignment(n)?)
                }
                GrammarElement::Node(n) if n.rule == ShellRule::Word => {
                    CommandElement::Word(self.word(n)?)
                }
                GrammarElement::Node(n) if n.rule == ShellRule::Redirect => {
                    CommandElement::Redirect(self.redirect(n)?)
                }
                other => return Err(self.unhandled_element(other)),
            };
            elements.push(element);
        }

        Ok(Statement::Command(Arc::new(Command {
            id: NodeId::next(),
            prefix,
            elements,
        })))
    }

    fn assignment(&mut self, node: &ShellNode) -> Result<Assignment> {
        let prefix = self.cursor.take_prefix(node.start());
        let (_, name) = self.consume_text(self.required(node, ShellToken::AssignName)?)?;
        let before_equals = self.consume(self.required(node, ShellToken::Equals)?)?;
        let value = match node.node(ShellRule::Word) {
            Some(word) => Some(self.word(word)?),
            None => None,
        };

        Ok(Assignment {
            id: NodeId::next(),
            prefix,
            name: Arc::from(name),
            value: LeftPadded::new(before_equals, value),
        })
    }

    fn redirect(&mut self, node: &ShellNode) -> Result<Redirect> {
        let prefix = self.cursor.take_prefix(node.start());
        let fd = match node.token(ShellToken::IoNumber) {
            Some(token) => Some(Arc::from(self.consume_text(token)?.1)),
            None => None,
        };
        let op_token = self.required(node, ShellToken::RedirectOp)?;
        let (_, op_text) = self.consume_text(op_token)?;
        let operator = RedirectOp::from_text(op_text).ok_or_else(|| self.unhandled_token(op_token))?;
        let target = self.word(self.required_node(node, ShellRule::Word)?)?;

        Ok(Redirect {
            id: NodeId::next(),
            prefix,
            fd,
            operator,
            target,
        })
    }

    fn word(&mut self, node: &ShellNode) -> Result<Word> {
        if node.rule != ShellRule::Word {
            return Err(self.unhandled(node));
        }

        let prefix = self.cursor.take_prefix(node.start());
        let mut parts = Vec::with_capacity(node.children.len());
        for child in &node.children {
            let part = match child {
                GrammarElement::Token(token) => {
                    let kind = part_kind(token.kind).ok_or_else(|| self.unhandled_token(token))?;
                    let (_, text) = self.consume_text(token)?;
                    Word::Part(WordPart {
                        id: NodeId::next(),
                        prefix: Space::EMPTY,
                        kind,
                        text: Arc::from(text),
                    })
                }
                GrammarElement::Node(n) if n.rule == ShellRule::CommandSubstitution => {
                    self.command_substitution(n)?
                }
                GrammarElement::Node(n) => return Err(self.unhandled(n)),
            };
            parts.push(part);
        }

        // a one-part word is just that part, carrying the word's prefix
        if parts.len() == 1
            && let Some(only) = parts.pop()
        {
            return Ok(only.with_prefix(prefix));
        }
        if parts.is_empty() {
            return Err(self.unhandled(node));
        }
        Ok(Word::Concatenation(Arc::new(Concatenation {
            id: NodeId::next(),
            prefix,
            parts,
        })))
    }

    fn command_substitution(&mut self, node: &ShellNode) -> Result<Word> {
        let recovery = self.recovery(node, Some(ShellToken::RParen));
        if recovery == Recovery::Capture {
            return Ok(Word::Fallback(self.capture(node)));
        }

        let prefix = self.cursor.take_prefix(node.start());
        self.consume(self.required(node, ShellToken::DollarParen)?)?;
        let body = self.list(self.required_node(node, ShellRule::List)?)?;
        let close = self.closer(node, ShellToken::RParen, recovery)?;

        Ok(Word::CommandSubstitution(Arc::new(CommandSubstitution {
            id: NodeId::next(),
            prefix,
            body,
            close,
        })))
    }

    fn subshell(&mut self, node: &ShellNode) -> Result<Statement> {
        let recovery = self.recovery(node, Some(ShellToken::RParen));
        if recovery == Recovery::Capture {
            return Ok(Statement::Fallback(self.capture(node)));
        }

        let prefix = self.cursor.take_prefix(node.start());
        self.consume(self.required(node, ShellToken::LParen)?)?;
        let body = self.list(self.required_node(node, ShellRule::List)?)?;
        let close = self.closer(node, ShellToken::RParen, recovery)?;

        Ok(Statement::Subshell(Arc::new(Subshell {
            id: NodeId::next(),
            prefix,
            body,
            close,
        })))
    }

    fn brace_group(&mut self, node: &ShellNode) -> Result<Statement> {
        let recovery = self.recovery(node, Some(ShellToken::RBrace));
        if recovery == Recovery::Capture {
            return Ok(Statement::Fallback(self.capture(node)));
        }

        let prefix = self.cursor.take_prefix(node.start());
        self.consume(self.required(node, ShellToken::LBrace)?)?;
        let body = self.list(self.required_node(node, ShellRule::List)?)?;
        let close = self.closer(node, ShellToken::RBrace, recovery)?;

        Ok(Statement::BraceGroup(Arc::new(BraceGroup {
            id: NodeId::next(),
            prefix,
            body,
            close,
        })))
    }

    fn if_clause(&mut self, node: &ShellNode) -> Result<Statement> {
        let broken_elif = node.nodes().any(|clause| {
            clause.rule == ShellRule::ElifClause && self.recovery(clause, None) != Recovery::Build
        });
        let recovery = if broken_elif {
            Recovery::Capture
        } else {
            self.recovery(node, Some(ShellToken::Fi))
        };
        if recovery == Recovery::Capture {
            return Ok(Statement::Fallback(self.capture(node)));
        }

        let prefix = self.cursor.take_prefix(node.start());
        let mut lists = node.nodes().filter(|n| n.rule == ShellRule::List);
        let (Some(condition), Some(then_list)) = (lists.next(), lists.next()) else {
            return Err(self.unhandled(node));
        };

        self.consume(self.required(node, ShellToken::If)?)?;
        let condition = self.list(condition)?;
        let before_then = self.consume(self.required(node, ShellToken::Then)?)?;
        let then_branch = LeftPadded::new(before_then, self.list(then_list)?);

        let mut elifs = Vec::new();
        let mut else_branch = None;
        for clause in node.nodes() {
            match clause.rule {
                ShellRule::List => {}
                ShellRule::ElifClause => elifs.push(self.elif_clause(clause)?),
                ShellRule::ElseClause => {
                    let before = self.consume(self.required(clause, ShellToken::Else)?)?;
                    let body = self.list(self.required_node(clause, ShellRule::List)?)?;
                    else_branch = Some(LeftPadded::new(before, body));
                }
                _ => return Err(self.unhandled(clause)),
            }
        }
        let fi = self.closer(node, ShellToken::Fi, recovery)?;

        Ok(Statement::If(Arc::new(If {
            id: NodeId::next(),
            prefix,
            condition,
            then_branch,
            elifs,
            else_branch,
            fi,
        })))
    }

    fn elif_clause(&mut self, clause: &ShellNode) -> Result<LeftPadded<Elif>> {
        let mut lists = clause.nodes().filter(|n| n.rule == ShellRule::List);
        let (Some(condition), Some(then_list)) = (lists.next(), lists.next()) else {
            return Err(self.unhandled(clause));
        };

        let before = self.consume(self.required(clause, ShellToken::Elif)?)?;
        let condition = self.list(condition)?;
        let before_then = self.consume(self.required(clause, ShellToken::Then)?)?;
        let then_branch = LeftPadded::new(before_then, self.list(then_list)?);

        Ok(LeftPadded::new(
            before,
            Elif {
                condition,
                then_branch,
            },
        ))
    }

    fn loop_clause(&mut self, node: &ShellNode) -> Result<Statement> {
        let recovery = self.recovery(node, Some(ShellToken::Done));
        if recovery == Recovery::Capture {
            return Ok(Statement::Fallback(self.capture(node)));
        }

        let (kind, keyword) = match node.rule {
            ShellRule::While => (LoopKind::While, ShellToken::While),
            _ => (LoopKind::Until, ShellToken::Until),
        };
        let prefix = self.cursor.take_prefix(node.start());
        let mut lists = node.nodes().filter(|n| n.rule == ShellRule::List);
        let (Some(condition), Some(body)) = (lists.next(), lists.next()) else {
            return Err(self.unhandled(node));
        };

        self.consume(self.required(node, keyword)?)?;
        let condition = self.list(condition)?;
        let body = self.do_group(node, body, recovery)?;

        Ok(Statement::Loop(Arc::new(Loop {
            id: NodeId::next(),
            prefix,
            kind,
            condition,
            body,
        })))
    }

    fn do_group(&mut self, node: &ShellNode, body: &ShellNode, recovery: Recovery) -> Result<DoGroup> {
        let before = self.consume(self.required(node, ShellToken::Do)?)?;
        let body = self.list(body)?;
        let done = self.closer(node, ShellToken::Done, recovery)?;
        Ok(DoGroup { before, body, done })
    }

    fn for_clause(&mut self, node: &ShellNode) -> Result<Statement> {
        let recovery = self.recovery(node, Some(ShellToken::Done));
        if recovery == Recovery::Capture {
            return Ok(Statement::Fallback(self.capture(node)));
        }

        let prefix = self.cursor.take_prefix(node.start());
        self.consume(self.required(node, ShellToken::For)?)?;
        let (before_name, name) = self.consume_text(self.required(node, ShellToken::Name)?)?;
        let variable = LeftPadded::new(before_name, Arc::from(name));

        let items = match node.token(ShellToken::In) {
            Some(keyword) => {
                let before_in = self.consume(keyword)?;
                let mut words = Vec::new();
                for word in node.nodes().filter(|n| n.rule == ShellRule::Word) {
                    words.push(self.word(word)?);
                }
                Some(LeftPadded::new(before_in, words))
            }
            None => None,
        };
        let semi = match node.token(ShellToken::Semi) {
            Some(token) => Some(self.consume(token)?),
            None => None,
        };
        let body = self.required_node(node, ShellRule::List)?;
        let body = self.do_group(node, body, recovery)?;

        Ok(Statement::For(Arc::new(For {
            id: NodeId::next(),
            prefix,
            variable,
            items,
            semi,
            body,
        })))
    }

    fn case_clause(&mut self, node: &ShellNode) -> Result<Statement> {
        let broken_item = node.nodes().any(|item| {
            item.rule == ShellRule::CaseItem && self.recovery(item, None) != Recovery::Build
        });
        let recovery = if broken_item {
            Recovery::Capture
        } else {
            self.recovery(node, Some(ShellToken::Esac))
        };
        if recovery == Recovery::Capture {
            return Ok(Statement::Fallback(self.capture(node)));
        }

        let prefix = self.cursor.take_prefix(node.start());
        self.consume(self.required(node, ShellToken::Case)?)?;
        let word = self.word(self.required_node(node, ShellRule::Word)?)?;
        let before_in = self.consume(self.required(node, ShellToken::In)?)?;
        let mut items = Vec::new();
        for item in node.nodes().filter(|n| n.rule == ShellRule::CaseItem) {
            items.push(self.case_item(item)?);
        }
        let esac = self.closer(node, ShellToken::Esac, recovery)?;

        Ok(Statement::Case(Arc::new(Case {
            id: NodeId::next(),
            prefix,
            word,
            before_in,
            items,
            esac,
        })))
    }

    fn case_item(&mut self, node: &ShellNode) -> Result<CaseItem> {
        let prefix = self.cursor.take_prefix(node.start());
        let mut open_paren = false;
        let mut patterns = Vec::new();
        let mut pending = None;
        let mut body = StatementList::default();
        let mut terminator = None;

        for child in &node.children {
            match child {
                GrammarElement::Token(token) => match token.kind {
                    ShellToken::LParen => {
                        self.consume(token)?;
                        open_paren = true;
                    }
                    ShellToken::Pipe | ShellToken::RParen => {
                        let pattern = pending.take().ok_or_else(|| self.unhandled_token(token))?;
                        patterns.push(RightPadded::new(pattern, self.consume(token)?));
                    }
                    ShellToken::DoubleSemi => terminator = Some(self.consume(token)?),
                    _ => return Err(self.unhandled_token(token)),
                },
                GrammarElement::Node(n) if n.rule == ShellRule::Word => pending = Some(self.word(n)?),
                GrammarElement::Node(n) if n.rule == ShellRule::List => body = self.list(n)?,
                GrammarElement::Node(n) => return Err(self.unhandled(n)),
            }
        }

        Ok(CaseItem {
            id: NodeId::next(),
            prefix,
            open_paren,
            patterns,
            body,
            terminator,
        })
    }

    fn function_def(&mut self, node: &ShellNode) -> Result<Statement> {
        if self.recovery(node, None) == Recovery::Capture {
            return Ok(Statement::Fallback(self.capture(node)));
        }

        let prefix = self.cursor.take_prefix(node.start());
        let (_, name) = self.consume_text(self.required(node, ShellToken::Name)?)?;
        let before_parens = self.consume(self.required(node, ShellToken::LParen)?)?;
        let inside_parens = self.consume(self.required(node, ShellToken::RParen)?)?;
        let body = node.nodes().next().ok_or_else(|| self.unhandled(node))?;
        let body = self.statement(body)?;

        Ok(Statement::Function(Arc::new(FunctionDef {
            id: NodeId::next(),
            prefix,
            name: Arc::from(name),
            before_parens,
            inside_parens,
            body,
        })))
    }

    fn redirected(&mut self, node: &ShellNode) -> Result<Statement> {
        if self.broken_redirects(node) {
            return Ok(Statement::Fallback(self.capture(node)));
        }

        let prefix = self.cursor.take_prefix(node.start());
        let mut children = node.nodes();
        let command = children.next().ok_or_else(|| self.unhandled(node))?;
        let command = self.statement(command)?;
        let mut redirects = Vec::new();
        for redirect in children {
            redirects.push(self.redirect(redirect)?);
        }
        debug!("{} redirects on compound command", redirects.len());

        Ok(Statement::Redirected(Arc::new(Redirected {
            id: NodeId::next(),
            prefix,
            command,
            redirects,
        })))
    }
}

fn part_kind(kind: ShellToken) -> Option<PartKind> {
    Some(match kind {
        ShellToken::Literal => PartKind::Literal,
        ShellToken::SingleQuoted => PartKind::SingleQuoted,
        ShellToken::DoubleQuoted => PartKind::DoubleQuoted,
        ShellToken::Parameter => PartKind::Parameter,
        ShellToken::Arithmetic => PartKind::Arithmetic,
        ShellToken::Backtick => PartKind::Backtick,
        _ => return None,
    })
}
