//! Lossless tree back to shell source
//!
//! Each node prints its prefix, then its own tokens in source order. Tokens
//! are printed from the node kind (keywords, operators) or from stored text
//! (words, names); spaces are printed as stored.

use crate::tree::*;
use std::fmt;
use verbatim_core::lst::{PrintOutput, Space};

/// Print a whole script
pub fn print(file: &ShellFile) -> String {
    let mut out = PrintOutput::new();
    print_file(&mut out, file);
    out.finish()
}

pub fn print_file(out: &mut PrintOutput, file: &ShellFile) {
    out.space(&file.prefix);
    list(out, &file.body);
    out.space(&file.eof);
}

fn closer(out: &mut PrintOutput, close: &Option<Space>, text: &str) {
    if let Some(space) = close {
        out.space(space).append(text);
    }
}

fn list(out: &mut PrintOutput, list: &StatementList) {
    for item in &list.items {
        match item.separator {
            Some(separator) => {
                out.right_padded(&item.statement, separator.as_str(), statement);
            }
            None => {
                statement(out, item.statement.element());
                out.space(item.statement.after());
            }
        }
    }
}

pub fn statement(out: &mut PrintOutput, statement: &Statement) {
    match statement {
        Statement::Command(command) => {
            out.space(&command.prefix);
            for element in &command.elements {
                command_element(out, element);
            }
        }
        Statement::Pipeline(pipeline) => {
            out.space(&pipeline.prefix);
            if pipeline.negated {
                out.append("!");
            }
            separated(out, &pipeline.commands, |_| "|");
        }
        Statement::Logical(logical) => {
            out.space(&logical.prefix);
            separated(out, &logical.operands, |i| {
                logical.operators.get(i).map_or("", |op| op.as_str())
            });
        }
        Statement::Subshell(subshell) => {
            out.space(&subshell.prefix).append("(");
            list(out, &subshell.body);
            closer(out, &subshell.close, ")");
        }
        Statement::BraceGroup(group) => {
            out.space(&group.prefix).append("{");
            list(out, &group.body);
            closer(out, &group.close, "}");
        }
        Statement::If(node) => if_clause(out, node),
        Statement::Loop(node) => {
            out.space(&node.prefix).append(node.kind.as_str());
            list(out, &node.condition);
            do_group(out, &node.body);
        }
        Statement::For(node) => {
            out.space(&node.prefix).append("for");
            out.space(node.variable.before())
                .append(node.variable.element());
            if let Some(items) = &node.items {
                out.left_padded(items, "in", |out, words| {
                    for w in words {
                        word(out, w);
                    }
                });
            }
            closer(out, &node.semi, ";");
            do_group(out, &node.body);
        }
        Statement::Case(node) => {
            out.space(&node.prefix).append("case");
            word(out, &node.word);
            out.space(&node.before_in).append("in");
            for item in &node.items {
                case_item(out, item);
            }
            closer(out, &node.esac, "esac");
        }
        Statement::Function(node) => {
            out.space(&node.prefix).append(&node.name);
            out.space(&node.before_parens).append("(");
            out.space(&node.inside_parens).append(")");
            self::statement(out, &node.body);
        }
        Statement::Redirected(node) => {
            out.space(&node.prefix);
            self::statement(out, &node.command);
            for r in &node.redirects {
                redirect(out, r);
            }
        }
        Statement::Fallback(literal) => {
            out.fallback(literal);
        }
    }
}

/// Operands joined by operators; `operator(i)` follows operand `i`
fn separated(
    out: &mut PrintOutput,
    operands: &[verbatim_core::lst::RightPadded<Statement>],
    operator: impl Fn(usize) -> &'static str,
) {
    let last = operands.len().saturating_sub(1);
    for (i, operand) in operands.iter().enumerate() {
        statement(out, operand.element());
        out.space(operand.after());
        if i < last {
            out.append(operator(i));
        }
    }
}

fn if_clause(out: &mut PrintOutput, node: &If) {
    out.space(&node.prefix).append("if");
    list(out, &node.condition);
    out.left_padded(&node.then_branch, "then", list);
    for elif in &node.elifs {
        out.left_padded(elif, "elif", |out, elif| {
            list(out, &elif.condition);
            out.left_padded(&elif.then_branch, "then", list);
        });
    }
    if let Some(else_branch) = &node.else_branch {
        out.left_padded(else_branch, "else", list);
    }
    closer(out, &node.fi, "fi");
}

fn do_group(out: &mut PrintOutput, group: &DoGroup) {
    out.space(&group.before).append("do");
    list(out, &group.body);
    closer(out, &group.done, "done");
}

fn case_item(out: &mut PrintOutput, item: &CaseItem) {
    out.space(&item.prefix);
    if item.open_paren {
        out.append("(");
    }
    let last = item.patterns.len().saturating_sub(1);
    for (i, pattern) in item.patterns.iter().enumerate() {
        out.right_padded(pattern, if i == last { ")" } else { "|" }, word);
    }
    list(out, &item.body);
    closer(out, &item.terminator, ";;");
}

fn command_element(out: &mut PrintOutput, element: &CommandElement) {
    match element {
        CommandElement::Assignment(assignment) => {
            out.space(&assignment.prefix).append(&assignment.name);
            out.left_padded(&assignment.value, "=", |out, value| {
                if let Some(value) = value {
                    word(out, value);
                }
            });
        }
        CommandElement::Word(w) => word(out, w),
        CommandElement::Redirect(r) => redirect(out, r),
    }
}

fn redirect(out: &mut PrintOutput, redirect: &Redirect) {
    out.space(&redirect.prefix);
    if let Some(fd) = &redirect.fd {
        out.append(fd);
    }
    out.append(redirect.operator.as_str());
    word(out, &redirect.target);
}

pub fn word(out: &mut PrintOutput, word: &Word) {
    match word {
        Word::Part(part) => {
            out.space(&part.prefix).append(&part.text);
        }
        Word::Concatenation(concatenation) => {
            out.space(&concatenation.prefix);
            for part in &concatenation.parts {
                self::word(out, part);
            }
        }
        Word::CommandSubstitution(sub) => {
            out.space(&sub.prefix).append("$(");
            list(out, &sub.body);
            closer(out, &sub.close, ")");
        }
        Word::Fallback(literal) => {
            out.fallback(literal);
        }
    }
}

impl fmt::Display for ShellFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print(self))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = PrintOutput::new();
        statement(&mut out, self);
        f.write_str(out.as_str())
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = PrintOutput::new();
        word(&mut out, self);
        f.write_str(out.as_str())
    }
}
