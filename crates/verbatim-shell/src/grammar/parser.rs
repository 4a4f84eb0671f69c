use super::{ShellElement, ShellNode, ShellRule, ShellToken};
use verbatim_core::lst::{GrammarElement, GrammarNode, GrammarToken};

/// Parse a whole script into a `Program` node
///
/// Never fails: a missing closer becomes a synthetic token and a token that
/// cannot start a command becomes an `Error` production.
pub fn parse(source: &str) -> ShellNode {
    let mut parser = Parser {
        chars: source.chars().collect(),
        pos: 0,
    };
    let list = parser.list(&[]);
    GrammarNode::new(ShellRule::Program, vec![GrammarElement::Node(list)])
}

/// Where a nested command list ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    RParen,
    DoubleSemi,
    Reserved(ShellToken),
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

fn is_meta(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t' | '\r' | '\n' | ';' | '&' | '|' | '(' | ')' | '<' | '>'
    )
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn missing(kind: ShellToken) -> ShellElement {
    GrammarElement::Token(GrammarToken::synthetic(kind))
}

fn node(rule: ShellRule, children: Vec<ShellElement>) -> ShellElement {
    GrammarElement::Node(GrammarNode::new(rule, children))
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn bump(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.chars.len());
    }

    fn token(&mut self, kind: ShellToken, len: usize) -> ShellElement {
        let start = self.pos;
        self.bump(len);
        GrammarElement::Token(GrammarToken::new(kind, start as i64, self.pos as i64))
    }

    /// Skip blanks, line continuations and comments, stopping at a newline
    fn skip_blanks(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' => self.bump(1),
                '\\' if self.peek_at(1) == Some('\n') => self.bump(2),
                '\\' if self.starts_with("\\\r\n") => self.bump(3),
                '#' => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump(1);
                    }
                }
                _ => break,
            }
        }
    }

    /// Skip blanks and newlines where a newline cannot end a command
    fn skip_linebreaks(&mut self) {
        loop {
            self.skip_blanks();
            if self.peek() == Some('\n') {
                self.bump(1);
            } else {
                break;
            }
        }
    }

    /// Length of an unquoted word at the cursor, if it stands alone
    fn plain_word_len(&self) -> Option<usize> {
        let len = self.chars[self.pos..]
            .iter()
            .take_while(|&&c| !is_meta(c) && !matches!(c, '\'' | '"' | '`' | '$' | '\\'))
            .count();
        let ends_word = self.peek_at(len).is_none_or(is_meta);
        (len > 0 && ends_word).then_some(len)
    }

    fn plain_word_is(&self, text: &str) -> Option<usize> {
        let len = self.plain_word_len()?;
        self.chars[self.pos..self.pos + len]
            .iter()
            .copied()
            .eq(text.chars())
            .then_some(len)
    }

    fn reserved_at(&self) -> Option<(ShellToken, usize)> {
        let len = self.plain_word_len()?;
        let text: String = self.chars[self.pos..self.pos + len].iter().collect();
        ShellToken::reserved(&text).map(|kind| (kind, len))
    }

    fn name_len(&self) -> usize {
        match self.peek() {
            Some(c) if is_name_start(c) => self.chars[self.pos..]
                .iter()
                .take_while(|&&c| is_name_char(c))
                .count(),
            _ => 0,
        }
    }

    fn at_stop(&self, stops: &[Stop]) -> bool {
        stops.iter().any(|stop| match stop {
            Stop::RParen => self.peek() == Some(')'),
            Stop::DoubleSemi => self.starts_with(";;"),
            Stop::Reserved(kind) => self.reserved_at().is_some_and(|(k, _)| k == *kind),
        })
    }

    fn expect_reserved(&mut self, children: &mut Vec<ShellElement>, kind: ShellToken) {
        self.skip_blanks();
        match self.reserved_at() {
            Some((k, len)) if k == kind => children.push(self.token(kind, len)),
            _ => children.push(missing(kind)),
        }
    }

    fn expect_char(&mut self, children: &mut Vec<ShellElement>, c: char, kind: ShellToken) {
        self.skip_blanks();
        if self.peek() == Some(c) {
            children.push(self.token(kind, 1));
        } else {
            children.push(missing(kind));
        }
    }

    fn list(&mut self, stops: &[Stop]) -> ShellNode {
        let mut children = Vec::new();
        let mut open_statement = false;

        loop {
            self.skip_blanks();
            let Some(c) = self.peek() else { break };
            if self.at_stop(stops) {
                break;
            }

            match c {
                '\n' => {
                    children.push(self.token(ShellToken::Newline, 1));
                    open_statement = false;
                }
                ';' if open_statement && !self.starts_with(";;") => {
                    children.push(self.token(ShellToken::Semi, 1));
                    open_statement = false;
                }
                '&' if open_statement && !self.starts_with("&&") => {
                    children.push(self.token(ShellToken::Amp, 1));
                    open_statement = false;
                }
                _ => {
                    if let Some(error) = self.unexpected() {
                        children.push(error);
                        open_statement = false;
                    } else if let Some(statement) = self.and_or() {
                        children.push(statement);
                        open_statement = true;
                    } else {
                        let error = self.token(ShellToken::Literal, 1);
                        children.push(node(ShellRule::Error, vec![error]));
                        open_statement = false;
                    }
                }
            }
        }

        GrammarNode::new(ShellRule::List, children)
    }

    /// A token that cannot start a command here, wrapped as an error
    fn unexpected(&mut self) -> Option<ShellElement> {
        let token = if let Some((kind, len)) = self.reserved_at() {
            match kind {
                ShellToken::RBrace
                | ShellToken::Then
                | ShellToken::Elif
                | ShellToken::Else
                | ShellToken::Fi
                | ShellToken::Do
                | ShellToken::Done
                | ShellToken::Esac => self.token(kind, len),
                _ => return None,
            }
        } else if self.starts_with(";;") {
            self.token(ShellToken::DoubleSemi, 2)
        } else if self.starts_with("&&") {
            self.token(ShellToken::AndIf, 2)
        } else if self.starts_with("||") {
            self.token(ShellToken::OrIf, 2)
        } else {
            match self.peek()? {
                ')' => self.token(ShellToken::RParen, 1),
                ';' => self.token(ShellToken::Semi, 1),
                '&' => self.token(ShellToken::Amp, 1),
                '|' => self.token(ShellToken::Pipe, 1),
                _ => return None,
            }
        };
        Some(node(ShellRule::Error, vec![token]))
    }

    fn and_or(&mut self) -> Option<ShellElement> {
        let first = self.pipeline()?;
        let mut children = vec![first];

        loop {
            self.skip_blanks();
            let kind = if self.starts_with("&&") {
                ShellToken::AndIf
            } else if self.starts_with("||") {
                ShellToken::OrIf
            } else {
                break;
            };
            children.push(self.token(kind, 2));
            self.skip_linebreaks();
            match self.pipeline() {
                Some(pipeline) => children.push(pipeline),
                None => {
                    children.push(missing(ShellToken::Literal));
                    break;
                }
            }
        }

        Some(node(ShellRule::AndOr, children))
    }

    fn pipeline(&mut self) -> Option<ShellElement> {
        let mut children = Vec::new();
        self.skip_blanks();
        if let Some((ShellToken::Bang, len)) = self.reserved_at() {
            children.push(self.token(ShellToken::Bang, len));
        }

        match self.command() {
            Some(command) => children.push(command),
            None if children.is_empty() => return None,
            None => {
                children.push(missing(ShellToken::Literal));
                return Some(node(ShellRule::Pipeline, children));
            }
        }

        loop {
            self.skip_blanks();
            if self.peek() != Some('|') || self.starts_with("||") {
                break;
            }
            children.push(self.token(ShellToken::Pipe, 1));
            self.skip_linebreaks();
            match self.command() {
                Some(command) => children.push(command),
                None => {
                    children.push(missing(ShellToken::Literal));
                    break;
                }
            }
        }

        Some(node(ShellRule::Pipeline, children))
    }

    fn command(&mut self) -> Option<ShellElement> {
        self.skip_blanks();
        let compound = match self.reserved_at() {
            Some((ShellToken::If, len)) => self.if_clause(len),
            Some((ShellToken::While, len)) => {
                self.loop_clause(ShellRule::While, ShellToken::While, len)
            }
            Some((ShellToken::Until, len)) => {
                self.loop_clause(ShellRule::Until, ShellToken::Until, len)
            }
            Some((ShellToken::For, len)) => self.for_clause(len),
            Some((ShellToken::Case, len)) => self.case_clause(len),
            Some((ShellToken::LBrace, len)) => self.brace_group(len),
            Some(_) => return None,
            None if self.peek() == Some('(') => self.subshell(),
            None => {
                if let Some(function) = self.function_def() {
                    return Some(function);
                }
                return self.simple_command();
            }
        };
        Some(self.with_redirects(compound))
    }

    fn with_redirects(&mut self, compound: ShellElement) -> ShellElement {
        let mut redirects = Vec::new();
        loop {
            self.skip_blanks();
            match self.redirect() {
                Some(redirect) => redirects.push(redirect),
                None => break,
            }
        }
        if redirects.is_empty() {
            return compound;
        }
        let mut children = vec![compound];
        children.extend(redirects);
        node(ShellRule::Redirected, children)
    }

    fn redirect_op_len(&self, at: usize) -> Option<usize> {
        let rest = |text: &str| {
            text.chars()
                .enumerate()
                .all(|(i, c)| self.chars.get(at + i) == Some(&c))
        };
        [">>", ">&", ">|", "<&", "<>", "<<", "<", ">"]
            .into_iter()
            .find(|op| rest(op))
            .map(str::len)
    }

    fn redirect(&mut self) -> Option<ShellElement> {
        let digits = self.chars[self.pos..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count();
        let op_len = self.redirect_op_len(self.pos + digits)?;

        let mut children = Vec::new();
        if digits > 0 {
            children.push(self.token(ShellToken::IoNumber, digits));
        }
        children.push(self.token(ShellToken::RedirectOp, op_len));
        self.skip_blanks();
        match self.word() {
            Some(target) => children.push(target),
            None => children.push(missing(ShellToken::Literal)),
        }
        Some(node(ShellRule::Redirect, children))
    }

    fn function_def(&mut self) -> Option<ShellElement> {
        let name = self.name_len();
        if name == 0 {
            return None;
        }
        let mut at = self.pos + name;
        while matches!(self.chars.get(at), Some(' ' | '\t')) {
            at += 1;
        }
        if self.chars.get(at) != Some(&'(') {
            return None;
        }

        let mut children = vec![self.token(ShellToken::Name, name)];
        self.skip_blanks();
        children.push(self.token(ShellToken::LParen, 1));
        self.expect_char(&mut children, ')', ShellToken::RParen);
        self.skip_linebreaks();
        match self.command() {
            Some(body) => children.push(body),
            None => children.push(missing(ShellToken::LBrace)),
        }
        Some(node(ShellRule::FunctionDef, children))
    }

    fn simple_command(&mut self) -> Option<ShellElement> {
        let mut children = Vec::new();
        let mut words = 0;

        loop {
            self.skip_blanks();
            if let Some(redirect) = self.redirect() {
                children.push(redirect);
                continue;
            }
            match self.peek() {
                None => break,
                Some(c) if is_meta(c) => break,
                Some(_) => {}
            }
            if words == 0
                && let Some(assignment) = self.assignment()
            {
                children.push(assignment);
                continue;
            }
            match self.word() {
                Some(word) => {
                    children.push(word);
                    words += 1;
                }
                None => break,
            }
        }

        (!children.is_empty()).then(|| node(ShellRule::SimpleCommand, children))
    }

    fn assignment(&mut self) -> Option<ShellElement> {
        let name = self.name_len();
        if name == 0 || self.peek_at(name) != Some('=') {
            return None;
        }
        let mut children = vec![
            self.token(ShellToken::AssignName, name),
            self.token(ShellToken::Equals, 1),
        ];
        if self.peek().is_some_and(|c| !is_meta(c))
            && let Some(value) = self.word()
        {
            children.push(value);
        }
        Some(node(ShellRule::Assignment, children))
    }

    /// A word: adjacent literal, quoted and expansion parts
    fn word(&mut self) -> Option<ShellElement> {
        let mut parts = Vec::new();
        let mut literal_start = None;

        while let Some(c) = self.peek() {
            if is_meta(c) {
                break;
            }
            if self.starts_part() {
                if let Some(start) = literal_start.take() {
                    parts.push(literal(start, self.pos));
                }
                let part = self.part();
                parts.push(part);
            } else {
                literal_start.get_or_insert(self.pos);
                let len = if c == '\\' && self.peek_at(1).is_some() { 2 } else { 1 };
                self.bump(len);
            }
        }
        if let Some(start) = literal_start {
            parts.push(literal(start, self.pos));
        }

        (!parts.is_empty()).then(|| node(ShellRule::Word, parts))
    }

    fn starts_part(&self) -> bool {
        match self.peek() {
            Some('\'' | '"' | '`') => true,
            Some('$') => match self.peek_at(1) {
                Some('(' | '{') => true,
                Some(c) => {
                    is_name_start(c)
                        || c.is_ascii_digit()
                        || matches!(c, '@' | '*' | '#' | '?' | '-' | '$' | '!')
                }
                None => false,
            },
            _ => false,
        }
    }

    fn part(&mut self) -> ShellElement {
        let start = self.pos;
        let kind = match (self.peek(), self.peek_at(1), self.peek_at(2)) {
            (Some('\''), _, _) => {
                self.bump(1);
                while self.peek().is_some_and(|c| c != '\'') {
                    self.bump(1);
                }
                self.bump(1);
                ShellToken::SingleQuoted
            }
            (Some('"'), _, _) => {
                self.skip_double_quoted();
                ShellToken::DoubleQuoted
            }
            (Some('`'), _, _) => {
                self.skip_backtick();
                ShellToken::Backtick
            }
            (Some('$'), Some('('), Some('(')) => {
                self.bump(1);
                self.skip_balanced('(', ')');
                ShellToken::Arithmetic
            }
            (Some('$'), Some('('), _) => return self.command_substitution(),
            (Some('$'), Some('{'), _) => {
                self.bump(1);
                self.skip_balanced('{', '}');
                ShellToken::Parameter
            }
            (Some('$'), Some(c), _) if is_name_start(c) => {
                self.bump(1);
                let len = self.name_len();
                self.bump(len);
                ShellToken::Parameter
            }
            _ => {
                self.bump(2);
                ShellToken::Parameter
            }
        };
        GrammarElement::Token(GrammarToken::new(kind, start as i64, self.pos as i64))
    }

    fn command_substitution(&mut self) -> ShellElement {
        let mut children = vec![self.token(ShellToken::DollarParen, 2)];
        let body = self.list(&[Stop::RParen]);
        children.push(GrammarElement::Node(body));
        self.expect_char(&mut children, ')', ShellToken::RParen);
        node(ShellRule::CommandSubstitution, children)
    }

    fn skip_double_quoted(&mut self) {
        self.bump(1);
        while let Some(c) = self.peek() {
            match c {
                '\\' => self.bump(2),
                '"' => {
                    self.bump(1);
                    return;
                }
                '$' if self.peek_at(1) == Some('(') => {
                    self.bump(1);
                    self.skip_balanced('(', ')');
                }
                '$' if self.peek_at(1) == Some('{') => {
                    self.bump(1);
                    self.skip_balanced('{', '}');
                }
                '`' => self.skip_backtick(),
                _ => self.bump(1),
            }
        }
    }

    fn skip_backtick(&mut self) {
        self.bump(1);
        while let Some(c) = self.peek() {
            match c {
                '\\' => self.bump(2),
                '`' => {
                    self.bump(1);
                    return;
                }
                _ => self.bump(1),
            }
        }
    }

    /// Skip from an opening delimiter past its matching close
    fn skip_balanced(&mut self, open: char, close: char) {
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '\\' => self.bump(2),
                '\'' => {
                    self.bump(1);
                    while self.peek().is_some_and(|c| c != '\'') {
                        self.bump(1);
                    }
                    self.bump(1);
                }
                '"' => self.skip_double_quoted(),
                c if c == open => {
                    depth += 1;
                    self.bump(1);
                }
                c if c == close => {
                    self.bump(1);
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                _ => self.bump(1),
            }
        }
    }

    fn subshell(&mut self) -> ShellElement {
        let mut children = vec![self.token(ShellToken::LParen, 1)];
        children.push(GrammarElement::Node(self.list(&[Stop::RParen])));
        self.expect_char(&mut children, ')', ShellToken::RParen);
        node(ShellRule::Subshell, children)
    }

    fn brace_group(&mut self, len: usize) -> ShellElement {
        let mut children = vec![self.token(ShellToken::LBrace, len)];
        children.push(GrammarElement::Node(
            self.list(&[Stop::Reserved(ShellToken::RBrace)]),
        ));
        self.expect_reserved(&mut children, ShellToken::RBrace);
        node(ShellRule::BraceGroup, children)
    }

    fn if_clause(&mut self, len: usize) -> ShellElement {
        const BRANCH_END: &[Stop] = &[
            Stop::Reserved(ShellToken::Elif),
            Stop::Reserved(ShellToken::Else),
            Stop::Reserved(ShellToken::Fi),
        ];

        let mut children = vec![self.token(ShellToken::If, len)];
        children.push(GrammarElement::Node(
            self.list(&[Stop::Reserved(ShellToken::Then)]),
        ));
        self.expect_reserved(&mut children, ShellToken::Then);
        children.push(GrammarElement::Node(self.list(BRANCH_END)));

        loop {
            self.skip_blanks();
            match self.reserved_at() {
                Some((ShellToken::Elif, len)) => {
                    let mut clause = vec![self.token(ShellToken::Elif, len)];
                    clause.push(GrammarElement::Node(
                        self.list(&[Stop::Reserved(ShellToken::Then)]),
                    ));
                    self.expect_reserved(&mut clause, ShellToken::Then);
                    clause.push(GrammarElement::Node(self.list(BRANCH_END)));
                    children.push(node(ShellRule::ElifClause, clause));
                }
                Some((ShellToken::Else, len)) => {
                    let mut clause = vec![self.token(ShellToken::Else, len)];
                    clause.push(GrammarElement::Node(
                        self.list(&[Stop::Reserved(ShellToken::Fi)]),
                    ));
                    children.push(node(ShellRule::ElseClause, clause));
                    break;
                }
                _ => break,
            }
        }

        self.expect_reserved(&mut children, ShellToken::Fi);
        node(ShellRule::If, children)
    }

    fn loop_clause(&mut self, rule: ShellRule, keyword: ShellToken, len: usize) -> ShellElement {
        let mut children = vec![self.token(keyword, len)];
        children.push(GrammarElement::Node(
            self.list(&[Stop::Reserved(ShellToken::Do)]),
        ));
        self.do_group(&mut children);
        node(rule, children)
    }

    fn do_group(&mut self, children: &mut Vec<ShellElement>) {
        self.expect_reserved(children, ShellToken::Do);
        children.push(GrammarElement::Node(
            self.list(&[Stop::Reserved(ShellToken::Done)]),
        ));
        self.expect_reserved(children, ShellToken::Done);
    }

    fn for_clause(&mut self, len: usize) -> ShellElement {
        let mut children = vec![self.token(ShellToken::For, len)];
        self.skip_blanks();
        let name = self.name_len();
        if name > 0 && self.peek_at(name).is_none_or(is_meta) {
            children.push(self.token(ShellToken::Name, name));
        } else {
            children.push(missing(ShellToken::Name));
        }

        self.skip_linebreaks();
        if let Some(len) = self.plain_word_is("in") {
            children.push(self.token(ShellToken::In, len));
            loop {
                self.skip_blanks();
                match self.peek() {
                    Some(c) if !is_meta(c) => match self.word() {
                        Some(word) => children.push(word),
                        None => break,
                    },
                    _ => break,
                }
            }
        }

        self.skip_blanks();
        if self.peek() == Some(';') && !self.starts_with(";;") {
            children.push(self.token(ShellToken::Semi, 1));
        }
        self.skip_linebreaks();
        self.do_group(&mut children);
        node(ShellRule::For, children)
    }

    fn case_clause(&mut self, len: usize) -> ShellElement {
        let mut children = vec![self.token(ShellToken::Case, len)];
        self.skip_blanks();
        match self.word() {
            Some(word) => children.push(word),
            None => children.push(missing(ShellToken::Literal)),
        }

        self.skip_linebreaks();
        match self.plain_word_is("in") {
            Some(len) => children.push(self.token(ShellToken::In, len)),
            None => children.push(missing(ShellToken::In)),
        }

        loop {
            self.skip_linebreaks();
            if self.peek().is_none()
                || self
                    .reserved_at()
                    .is_some_and(|(kind, _)| kind == ShellToken::Esac)
            {
                break;
            }
            let before = self.pos;
            let item = self.case_item();
            children.push(item);
            if self.pos == before {
                break;
            }
        }

        self.expect_reserved(&mut children, ShellToken::Esac);
        node(ShellRule::Case, children)
    }

    fn case_item(&mut self) -> ShellElement {
        let mut children = Vec::new();
        if self.peek() == Some('(') {
            children.push(self.token(ShellToken::LParen, 1));
        }

        loop {
            self.skip_blanks();
            match self.word() {
                Some(pattern) => children.push(pattern),
                None => children.push(missing(ShellToken::Literal)),
            }
            self.skip_blanks();
            if self.peek() == Some('|') && !self.starts_with("||") {
                children.push(self.token(ShellToken::Pipe, 1));
            } else {
                break;
            }
        }

        self.expect_char(&mut children, ')', ShellToken::RParen);
        children.push(GrammarElement::Node(self.list(&[
            Stop::DoubleSemi,
            Stop::Reserved(ShellToken::Esac),
        ])));
        self.skip_blanks();
        if self.starts_with(";;") {
            children.push(self.token(ShellToken::DoubleSemi, 2));
        }
        node(ShellRule::CaseItem, children)
    }
}

fn literal(start: usize, stop: usize) -> ShellElement {
    GrammarElement::Token(GrammarToken::new(
        ShellToken::Literal,
        start as i64,
        stop as i64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use verbatim_core::lst::GrammarKind;

    fn statements(source: &str) -> Vec<ShellRule> {
        let program = parse(source);
        let list = program.node(ShellRule::List).unwrap();
        list.nodes().map(|node| node.rule).collect()
    }

    /// Rule names of the first statement, outermost first, following only
    /// single-child wrappers
    fn shape(source: &str) -> Vec<&'static str> {
        let program = parse(source);
        let mut node = program.node(ShellRule::List).unwrap().nodes().next().unwrap();
        let mut names = vec![node.rule.name()];
        while let [GrammarElement::Node(child)] = node.children.as_slice() {
            node = child;
            names.push(node.rule.name());
        }
        names
    }

    #[test]
    fn simple_command_is_wrapped_in_and_or_and_pipeline() {
        assert_eq!(shape("echo hi"), ["AndOr", "Pipeline", "SimpleCommand"]);
        assert_eq!(shape("a && b"), ["AndOr"]);
        assert_eq!(shape("! a"), ["AndOr", "Pipeline"]);
    }

    #[test]
    fn offsets_count_code_points() {
        let program = parse("echo 😀 x");
        assert_eq!(program.start(), 0);
        assert_eq!(program.stop(), 8);
    }

    #[test]
    fn separators_and_newlines_are_list_tokens() {
        let program = parse("a; b &\nc");
        let list = program.node(ShellRule::List).unwrap();
        let kinds: Vec<_> = list.tokens().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            [ShellToken::Semi, ShellToken::Amp, ShellToken::Newline]
        );
        assert_eq!(list.nodes().count(), 3);
    }

    #[test]
    fn unclosed_subshell_has_synthetic_closer() {
        let program = parse("(echo hi");
        assert!(program.has_synthetic());
        assert_eq!(program.stop(), 8);
    }

    #[test]
    fn stray_closers_become_errors() {
        assert_eq!(
            statements("echo a\n)\nfi\necho b"),
            [ShellRule::AndOr, ShellRule::Error, ShellRule::Error, ShellRule::AndOr]
        );
    }

    #[test]
    fn reserved_words_only_at_command_start() {
        let program = parse("echo if then fi");
        assert!(!program.has_synthetic());
        assert_eq!(statements("echo if then fi"), [ShellRule::AndOr]);
    }

    #[test]
    fn compound_commands_parse_without_recovery() {
        for source in [
            "if a; then b; elif c; then d; else e; fi",
            "while true; do x; done",
            "until false\ndo\n  y\ndone",
            "for f in *.txt; do cat \"$f\"; done",
            "for f\ndo echo $f; done",
            "case $x in\n  a|b) one ;;\n  (*) two\nesac",
            "{ a; b; }",
            "f() { echo $(( 1 + 2 )); }",
            "x=$(ls | wc -l) y= z=${a:-b}",
            "cat <in >out 2>&1",
        ] {
            assert!(!parse(source).has_synthetic(), "{source}");
        }
    }

    #[test]
    fn nested_command_substitution() {
        let program = parse("echo \"$(date)\" $(echo $(pwd))");
        assert!(!program.has_synthetic());
        assert_eq!(program.stop(), 29);
    }
}
