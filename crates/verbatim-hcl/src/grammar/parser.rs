use super::lexer::{Lexeme, lex};
use super::{HclElement, HclNode, HclRule, HclToken};
use verbatim_core::lst::{GrammarElement, GrammarNode, GrammarToken};

/// Parse a whole configuration file into a `ConfigFile` node
///
/// Never fails: missing closers become synthetic tokens, and anything that
/// cannot start a body item becomes an `Error` production running to the
/// end of its line. Offsets are UTF-16 code units.
pub fn parse(source: &str) -> HclNode {
    let mut parser = Parser {
        source,
        lexemes: lex(source),
        pos: 0,
        utf16: utf16_offsets(source),
        newlines: Vec::new(),
    };
    let body = parser.body(false);
    GrammarNode::new(HclRule::ConfigFile, vec![GrammarElement::Node(body)])
}

/// UTF-16 offset of every byte index that starts a character
fn utf16_offsets(source: &str) -> Vec<usize> {
    let mut table = vec![0; source.len() + 1];
    let mut units = 0;
    for (byte, c) in source.char_indices() {
        table[byte] = units;
        units += c.len_utf16();
    }
    table[source.len()] = units;
    table
}

fn missing(kind: HclToken) -> HclElement {
    GrammarElement::Token(GrammarToken::synthetic(kind))
}

fn node(rule: HclRule, children: Vec<HclElement>) -> HclElement {
    GrammarElement::Node(GrammarNode::new(rule, children))
}

struct Parser<'s> {
    source: &'s str,
    lexemes: Vec<Lexeme>,
    pos: usize,
    utf16: Vec<usize>,
    /// Whether newlines are insignificant, per open bracket
    newlines: Vec<bool>,
}

impl<'s> Parser<'s> {
    fn raw_kind_at(&self, pos: usize) -> Option<HclToken> {
        self.lexemes.get(pos).map(|lexeme| lexeme.kind)
    }

    fn raw_kind(&self) -> Option<HclToken> {
        self.raw_kind_at(self.pos)
    }

    /// Next token, skipping newlines inside brackets that ignore them
    fn peek(&mut self) -> Option<HclToken> {
        if self.newlines.last().copied().unwrap_or(false) {
            self.skip_newlines();
        }
        self.raw_kind()
    }

    fn skip_newlines(&mut self) {
        while self.raw_kind() == Some(HclToken::Newline) {
            self.pos += 1;
        }
    }

    fn text(&self) -> &'s str {
        self.lexemes
            .get(self.pos)
            .map_or("", |lexeme| &self.source[lexeme.span.clone()])
    }

    fn peek_keyword(&mut self, keyword: &str) -> bool {
        self.peek() == Some(HclToken::Identifier) && self.text() == keyword
    }

    /// Consume the current token, reporting it as `kind`
    fn bump_as(&mut self, kind: HclToken) -> HclElement {
        let span = self.lexemes[self.pos].span.clone();
        self.pos += 1;
        GrammarElement::Token(GrammarToken::new(
            kind,
            self.utf16[span.start] as i64,
            self.utf16[span.end] as i64,
        ))
    }

    fn bump(&mut self) -> HclElement {
        let kind = self.lexemes[self.pos].kind;
        self.bump_as(kind)
    }

    fn expect(&mut self, children: &mut Vec<HclElement>, kind: HclToken) -> bool {
        if self.peek() == Some(kind) {
            children.push(self.bump());
            true
        } else {
            children.push(missing(kind));
            false
        }
    }

    fn expression_or_missing(&mut self, children: &mut Vec<HclElement>) {
        match self.expression() {
            Some(expression) => children.push(expression),
            None => children.push(missing(HclToken::Identifier)),
        }
    }

    fn nested<T>(&mut self, ignore_newlines: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        self.newlines.push(ignore_newlines);
        let result = f(self);
        self.newlines.pop();
        result
    }

    fn body(&mut self, in_block: bool) -> HclNode {
        let mut children = Vec::new();
        self.newlines.push(false);

        loop {
            self.skip_newlines();
            match self.raw_kind() {
                None => break,
                Some(HclToken::RBrace) if in_block => break,
                Some(HclToken::Identifier) => children.push(self.item(in_block)),
                Some(_) => children.push(self.error_line(in_block)),
            }
        }

        self.newlines.pop();
        GrammarNode::new(HclRule::Body, children)
    }

    fn item(&mut self, in_block: bool) -> HclElement {
        match self.raw_kind_at(self.pos + 1) {
            Some(HclToken::Equals) => self.attribute(),
            Some(HclToken::Identifier | HclToken::String | HclToken::LBrace) => self.block(),
            _ => self.error_line(in_block),
        }
    }

    fn attribute(&mut self) -> HclElement {
        let mut children = vec![self.bump(), self.bump()];
        self.expression_or_missing(&mut children);
        node(HclRule::Attribute, children)
    }

    fn block(&mut self) -> HclElement {
        let mut children = vec![self.bump()];
        while matches!(
            self.raw_kind(),
            Some(HclToken::Identifier | HclToken::String)
        ) {
            children.push(self.bump());
        }

        if self.raw_kind() == Some(HclToken::LBrace) {
            children.push(self.bump());
            children.push(GrammarElement::Node(self.body(true)));
            self.expect(&mut children, HclToken::RBrace);
        } else {
            children.push(missing(HclToken::LBrace));
        }
        node(HclRule::Block, children)
    }

    /// Everything up to the end of the line, brackets balanced
    fn error_line(&mut self, in_block: bool) -> HclElement {
        let mut children = Vec::new();
        let mut depth = 0usize;

        while let Some(kind) = self.raw_kind() {
            match kind {
                HclToken::Newline if depth == 0 => break,
                HclToken::RBrace if depth == 0 && in_block && !children.is_empty() => break,
                HclToken::LBrace | HclToken::LBracket | HclToken::LParen => depth += 1,
                HclToken::RBrace | HclToken::RBracket | HclToken::RParen => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            children.push(self.bump());
        }
        node(HclRule::Error, children)
    }

    fn expression(&mut self) -> Option<HclElement> {
        let condition = self.binary(1)?;
        if self.peek() != Some(HclToken::Question) {
            return Some(condition);
        }

        let mut children = vec![condition, self.bump()];
        self.expression_or_missing(&mut children);
        if self.expect(&mut children, HclToken::Colon) {
            self.expression_or_missing(&mut children);
        } else {
            children.push(missing(HclToken::Identifier));
        }
        Some(node(HclRule::Conditional, children))
    }

    fn binary(&mut self, min: u8) -> Option<HclElement> {
        let mut left = self.unary()?;
        loop {
            let Some(precedence) = self.peek().and_then(HclToken::precedence) else {
                break;
            };
            if precedence < min {
                break;
            }
            let operator = self.bump();
            match self.binary(precedence + 1) {
                Some(right) => left = node(HclRule::Binary, vec![left, operator, right]),
                None => {
                    let operand = missing(HclToken::Identifier);
                    return Some(node(HclRule::Binary, vec![left, operator, operand]));
                }
            }
        }
        Some(left)
    }

    fn unary(&mut self) -> Option<HclElement> {
        if matches!(self.peek(), Some(HclToken::Bang | HclToken::Minus)) {
            let operator = self.bump();
            let operand = self.unary().unwrap_or_else(|| missing(HclToken::Identifier));
            return Some(node(HclRule::Unary, vec![operator, operand]));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Option<HclElement> {
        let mut target = self.primary()?;
        loop {
            match self.peek() {
                Some(HclToken::Dot) => match self.raw_kind_at(self.pos + 1) {
                    Some(HclToken::Star) => {
                        let (dot, star) = (self.bump(), self.bump());
                        target = node(HclRule::Error, vec![target, dot, star]);
                    }
                    Some(HclToken::Identifier | HclToken::Number) => {
                        let dot = self.bump();
                        let name = self.bump_as(HclToken::Identifier);
                        target = node(HclRule::GetAttr, vec![target, dot, name]);
                    }
                    _ => {
                        let dot = self.bump();
                        let name = missing(HclToken::Identifier);
                        return Some(node(HclRule::GetAttr, vec![target, dot, name]));
                    }
                },
                Some(HclToken::LBracket) => {
                    let splat = self.raw_kind_at(self.pos + 1) == Some(HclToken::Star)
                        && self.raw_kind_at(self.pos + 2) == Some(HclToken::RBracket);
                    if splat {
                        let children = vec![target, self.bump(), self.bump(), self.bump()];
                        target = node(HclRule::Error, children);
                        continue;
                    }
                    let mut children = vec![target, self.bump()];
                    self.nested(true, |p| {
                        p.expression_or_missing(&mut children);
                        p.expect(&mut children, HclToken::RBracket);
                    });
                    target = node(HclRule::Index, children);
                }
                _ => break,
            }
        }
        Some(target)
    }

    fn primary(&mut self) -> Option<HclElement> {
        let element = match self.peek()? {
            HclToken::Number | HclToken::String => node(HclRule::Literal, vec![self.bump()]),
            HclToken::Heredoc => node(HclRule::Error, vec![self.bump()]),
            HclToken::Identifier => match self.text() {
                "true" => node(HclRule::Literal, vec![self.bump_as(HclToken::True)]),
                "false" => node(HclRule::Literal, vec![self.bump_as(HclToken::False)]),
                "null" => node(HclRule::Literal, vec![self.bump_as(HclToken::Null)]),
                _ if self.raw_kind_at(self.pos + 1) == Some(HclToken::LParen) => {
                    self.function_call()
                }
                _ => node(HclRule::Variable, vec![self.bump()]),
            },
            HclToken::LParen => {
                let mut children = vec![self.bump()];
                self.nested(true, |p| {
                    p.expression_or_missing(&mut children);
                    p.expect(&mut children, HclToken::RParen);
                });
                node(HclRule::Parentheses, children)
            }
            HclToken::LBracket => self.tuple(),
            HclToken::LBrace => self.object(),
            _ => return None,
        };
        Some(element)
    }

    fn function_call(&mut self) -> HclElement {
        let mut children = vec![self.bump(), self.bump()];
        self.nested(true, |p| {
            while !matches!(p.peek(), None | Some(HclToken::RParen)) {
                let Some(argument) = p.expression() else { break };
                children.push(argument);
                match p.peek() {
                    Some(HclToken::Comma) => children.push(p.bump()),
                    Some(HclToken::Ellipsis) => {
                        children.push(p.bump());
                        break;
                    }
                    _ => break,
                }
            }
            p.expect(&mut children, HclToken::RParen);
        });
        node(HclRule::FunctionCall, children)
    }

    fn tuple(&mut self) -> HclElement {
        let mut children = vec![self.bump()];
        self.nested(true, |p| {
            if p.peek_keyword("for") {
                p.for_clauses(&mut children, false);
                p.expect(&mut children, HclToken::RBracket);
                return node(HclRule::ForTuple, children);
            }

            while !matches!(p.peek(), None | Some(HclToken::RBracket)) {
                let Some(element) = p.expression() else { break };
                children.push(element);
                if p.peek() == Some(HclToken::Comma) {
                    children.push(p.bump());
                } else {
                    break;
                }
            }
            p.expect(&mut children, HclToken::RBracket);
            node(HclRule::Tuple, children)
        })
    }

    fn object(&mut self) -> HclElement {
        let mut children = vec![self.bump()];

        let for_expression = self.nested(true, |p| p.peek_keyword("for"));
        if for_expression {
            return self.nested(true, |p| {
                p.for_clauses(&mut children, true);
                p.expect(&mut children, HclToken::RBrace);
                node(HclRule::ForObject, children)
            });
        }

        self.nested(false, |p| {
            loop {
                p.skip_newlines();
                if matches!(p.raw_kind(), None | Some(HclToken::RBrace)) {
                    break;
                }
                let Some(item) = p.object_item() else { break };
                children.push(item);
                match p.raw_kind() {
                    Some(HclToken::Comma) => children.push(p.bump()),
                    Some(HclToken::Newline | HclToken::RBrace) => {}
                    _ => break,
                }
            }
            p.skip_newlines();
            p.expect(&mut children, HclToken::RBrace);
        });
        node(HclRule::Object, children)
    }

    fn object_item(&mut self) -> Option<HclElement> {
        let key = self.expression()?;
        let mut children = vec![key];
        match self.peek() {
            Some(HclToken::Equals | HclToken::Colon) => {
                children.push(self.bump());
                self.expression_or_missing(&mut children);
            }
            _ => children.push(missing(HclToken::Equals)),
        }
        Some(node(HclRule::ObjectItem, children))
    }

    /// `for k, v in collection : result [=> value] [...] [if condition]`
    fn for_clauses(&mut self, children: &mut Vec<HclElement>, object: bool) {
        children.push(self.bump_as(HclToken::For));
        self.expect(children, HclToken::Identifier);
        if self.peek() == Some(HclToken::Comma) {
            children.push(self.bump());
            self.expect(children, HclToken::Identifier);
        }
        if self.peek_keyword("in") {
            children.push(self.bump_as(HclToken::In));
        } else {
            children.push(missing(HclToken::In));
        }
        self.expression_or_missing(children);
        self.expect(children, HclToken::Colon);
        self.expression_or_missing(children);

        if object {
            if self.expect(children, HclToken::FatArrow) {
                self.expression_or_missing(children);
            }
            if self.peek() == Some(HclToken::Ellipsis) {
                children.push(self.bump());
            }
        }
        if self.peek_keyword("if") {
            children.push(self.bump_as(HclToken::If));
            self.expression_or_missing(children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verbatim_core::lst::GrammarKind;

    fn items(source: &str) -> Vec<&'static str> {
        let file = parse(source);
        file.children[0]
            .as_node()
            .map(|body| body.nodes().map(|n| n.rule.name()).collect())
            .unwrap_or_default()
    }

    fn value(source: &str) -> HclNode {
        let file = parse(source);
        let body = file.node(HclRule::Body).unwrap();
        let attribute = body.node(HclRule::Attribute).unwrap();
        attribute.nodes().next().unwrap().clone()
    }

    #[test]
    fn test_attributes_and_blocks() {
        assert_eq!(
            items("a = 1\nresource \"x\" y {\n  b = 2\n}\nc = d\n"),
            vec!["Attribute", "Block", "Attribute"]
        );
    }

    #[test]
    fn test_offsets_count_utf16_units() {
        let file = parse("s = \"😀\"");
        assert_eq!(file.start(), 0);
        assert_eq!(file.stop(), 8);
    }

    #[test]
    fn test_operator_precedence() {
        let expr = value("a = 1 + 2 * 3 == 7 || b");
        assert_eq!(expr.rule, HclRule::Binary);
        assert_eq!(
            expr.tokens().next().map(|t| t.kind),
            Some(HclToken::OrOr)
        );
        let left = expr.nodes().next().unwrap();
        assert_eq!(left.tokens().next().map(|t| t.kind), Some(HclToken::EqEq));
    }

    #[test]
    fn test_unclosed_call_has_synthetic_closer() {
        let call = value("a = f(x, y");
        assert_eq!(call.rule, HclRule::FunctionCall);
        assert!(call.is_missing(HclToken::RParen));
    }

    #[test]
    fn test_newlines_inside_brackets_are_ignored() {
        let call = value("a = f(\n  x,\n  y\n)\n");
        assert!(!call.has_synthetic());
        assert_eq!(call.nodes().count(), 2);
    }

    #[test]
    fn test_object_items_separated_by_newlines_or_commas() {
        let object = value("a = {\n  x = 1\n  y: 2, z = 3\n}");
        assert_eq!(object.rule, HclRule::Object);
        assert!(!object.has_synthetic());
        assert_eq!(object.nodes().count(), 3);
    }

    #[test]
    fn test_for_expressions() {
        let tuple = value("a = [for i, v in xs : v * 2 if v > 0]");
        assert_eq!(tuple.rule, HclRule::ForTuple);
        assert!(!tuple.has_synthetic());

        let object = value("a = {for k, v in m : k => v... }");
        assert_eq!(object.rule, HclRule::ForObject);
        assert!(!object.has_synthetic());
    }

    #[test]
    fn test_splats_and_heredocs_are_errors() {
        assert_eq!(value("a = b.*.c").nodes().next().unwrap().rule, HclRule::Error);
        assert_eq!(value("a = b[*]").rule, HclRule::Error);
        assert_eq!(value("a = <<EOT\nx\nEOT\n").rule, HclRule::Error);
    }

    #[test]
    fn test_stray_tokens_become_error_lines() {
        assert_eq!(items("= 1\n} ]\na = 1 2\n"), vec!["Error", "Error", "Attribute", "Error"]);
    }
}
