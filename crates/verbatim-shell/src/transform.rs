//! Bottom-up rewriting of shell trees
//!
//! Children are visited before their parent, so a visitor sees a statement
//! whose words have already been rewritten. A node is rebuilt only when
//! something below it changed; every untouched subtree is shared with the
//! input tree.

use crate::tree::*;
use std::sync::Arc;
use verbatim_core::lst::{LeftPadded, RightPadded};

pub trait ShellVisitor {
    /// Replacement for `statement`, or `None` to keep it
    fn visit_statement(&mut self, _statement: &Statement) -> Option<Statement> {
        None
    }

    /// Replacement for `word`, or `None` to keep it
    fn visit_word(&mut self, _word: &Word) -> Option<Word> {
        None
    }
}

/// Apply `visitor` to every statement and word of `file`
pub fn transform<V: ShellVisitor>(file: &ShellFile, visitor: &mut V) -> ShellFile {
    match list(&file.body, visitor) {
        Some(body) => ShellFile {
            body,
            ..file.clone()
        },
        None => file.clone(),
    }
}

/// Rewrite each item; `None` when nothing changed
fn each<T: Clone>(items: &[T], mut rewrite: impl FnMut(&T) -> Option<T>) -> Option<Vec<T>> {
    let mut changed = false;
    let rewritten: Vec<T> = items
        .iter()
        .map(|item| match rewrite(item) {
            Some(new) => {
                changed = true;
                new
            }
            None => item.clone(),
        })
        .collect();
    changed.then_some(rewritten)
}

fn or_old<T: Clone>(new: Option<T>, old: &T) -> T {
    new.unwrap_or_else(|| old.clone())
}

fn right<T: Clone>(
    padded: &RightPadded<T>,
    rewrite: impl FnOnce(&T) -> Option<T>,
) -> Option<RightPadded<T>> {
    rewrite(padded.element()).map(|new| padded.clone().with_element(new))
}

fn left<T: Clone>(
    padded: &LeftPadded<T>,
    rewrite: impl FnOnce(&T) -> Option<T>,
) -> Option<LeftPadded<T>> {
    rewrite(padded.element()).map(|new| padded.clone().with_element(new))
}

fn list<V: ShellVisitor>(body: &StatementList, v: &mut V) -> Option<StatementList> {
    each(&body.items, |item| {
        right(&item.statement, |s| statement(s, v)).map(|statement| ListItem {
            statement,
            separator: item.separator,
        })
    })
    .map(|items| StatementList { items })
}

fn statements<V: ShellVisitor>(
    operands: &[RightPadded<Statement>],
    v: &mut V,
) -> Option<Vec<RightPadded<Statement>>> {
    each(operands, |operand| right(operand, |s| statement(s, v)))
}

fn words<V: ShellVisitor>(items: &[Word], v: &mut V) -> Option<Vec<Word>> {
    each(items, |w| word(w, v))
}

fn do_group<V: ShellVisitor>(group: &DoGroup, v: &mut V) -> Option<DoGroup> {
    list(&group.body, v).map(|body| DoGroup {
        body,
        ..group.clone()
    })
}

fn statement<V: ShellVisitor>(node: &Statement, v: &mut V) -> Option<Statement> {
    let rebuilt = match node {
        Statement::Command(command) => each(&command.elements, |e| element(e, v)).map(|elements| {
            Statement::Command(Arc::new(Command {
                elements,
                ..(**command).clone()
            }))
        }),
        Statement::Pipeline(pipeline) => statements(&pipeline.commands, v).map(|commands| {
            Statement::Pipeline(Arc::new(Pipeline {
                commands,
                ..(**pipeline).clone()
            }))
        }),
        Statement::Logical(logical) => statements(&logical.operands, v).map(|operands| {
            Statement::Logical(Arc::new(Logical {
                operands,
                ..(**logical).clone()
            }))
        }),
        Statement::Subshell(subshell) => list(&subshell.body, v).map(|body| {
            Statement::Subshell(Arc::new(Subshell {
                body,
                ..(**subshell).clone()
            }))
        }),
        Statement::BraceGroup(group) => list(&group.body, v).map(|body| {
            Statement::BraceGroup(Arc::new(BraceGroup {
                body,
                ..(**group).clone()
            }))
        }),
        Statement::If(node) => if_clause(node, v).map(|node| Statement::If(Arc::new(node))),
        Statement::Loop(node) => {
            let condition = list(&node.condition, v);
            let body = do_group(&node.body, v);
            (condition.is_some() || body.is_some()).then(|| {
                Statement::Loop(Arc::new(Loop {
                    condition: or_old(condition, &node.condition),
                    body: or_old(body, &node.body),
                    ..(**node).clone()
                }))
            })
        }
        Statement::For(node) => {
            let items = node
                .items
                .as_ref()
                .and_then(|items| left(items, |w| words(w, v)));
            let body = do_group(&node.body, v);
            (items.is_some() || body.is_some()).then(|| {
                Statement::For(Arc::new(For {
                    items: items.or_else(|| node.items.clone()),
                    body: or_old(body, &node.body),
                    ..(**node).clone()
                }))
            })
        }
        Statement::Case(node) => {
            let subject = word(&node.word, v);
            let items = each(&node.items, |item| case_item(item, v));
            (subject.is_some() || items.is_some()).then(|| {
                Statement::Case(Arc::new(Case {
                    word: or_old(subject, &node.word),
                    items: or_old(items, &node.items),
                    ..(**node).clone()
                }))
            })
        }
        Statement::Function(function) => statement(&function.body, v).map(|body| {
            Statement::Function(Arc::new(FunctionDef {
                body,
                ..(**function).clone()
            }))
        }),
        Statement::Redirected(node) => {
            let command = statement(&node.command, v);
            let redirects = each(&node.redirects, |r| redirect(r, v));
            (command.is_some() || redirects.is_some()).then(|| {
                Statement::Redirected(Arc::new(Redirected {
                    command: or_old(command, &node.command),
                    redirects: or_old(redirects, &node.redirects),
                    ..(**node).clone()
                }))
            })
        }
        Statement::Fallback(_) => None,
    };

    let current = rebuilt.as_ref().unwrap_or(node);
    v.visit_statement(current).or(rebuilt)
}

fn if_clause<V: ShellVisitor>(node: &If, v: &mut V) -> Option<If> {
    let condition = list(&node.condition, v);
    let then_branch = left(&node.then_branch, |body| list(body, v));
    let elifs = each(&node.elifs, |elif| {
        left(elif, |elif| {
            let condition = list(&elif.condition, v);
            let then_branch = left(&elif.then_branch, |body| list(body, v));
            (condition.is_some() || then_branch.is_some()).then(|| Elif {
                condition: or_old(condition, &elif.condition),
                then_branch: or_old(then_branch, &elif.then_branch),
            })
        })
    });
    let else_branch = node
        .else_branch
        .as_ref()
        .and_then(|branch| left(branch, |body| list(body, v)));

    if condition.is_none() && then_branch.is_none() && elifs.is_none() && else_branch.is_none() {
        return None;
    }
    Some(If {
        condition: or_old(condition, &node.condition),
        then_branch: or_old(then_branch, &node.then_branch),
        elifs: or_old(elifs, &node.elifs),
        else_branch: else_branch.or_else(|| node.else_branch.clone()),
        ..node.clone()
    })
}

fn case_item<V: ShellVisitor>(item: &CaseItem, v: &mut V) -> Option<CaseItem> {
    let patterns = each(&item.patterns, |pattern| right(pattern, |w| word(w, v)));
    let body = list(&item.body, v);
    (patterns.is_some() || body.is_some()).then(|| CaseItem {
        patterns: or_old(patterns, &item.patterns),
        body: or_old(body, &item.body),
        ..item.clone()
    })
}

fn element<V: ShellVisitor>(element: &CommandElement, v: &mut V) -> Option<CommandElement> {
    match element {
        CommandElement::Assignment(assignment) => assignment
            .value
            .element()
            .as_ref()
            .and_then(|value| word(value, v))
            .map(|value| {
                CommandElement::Assignment(Assignment {
                    value: assignment.value.clone().with_element(Some(value)),
                    ..assignment.clone()
                })
            }),
        CommandElement::Word(w) => word(w, v).map(CommandElement::Word),
        CommandElement::Redirect(r) => redirect(r, v).map(CommandElement::Redirect),
    }
}

fn redirect<V: ShellVisitor>(redirect: &Redirect, v: &mut V) -> Option<Redirect> {
    word(&redirect.target, v).map(|target| Redirect {
        target,
        ..redirect.clone()
    })
}

fn word<V: ShellVisitor>(node: &Word, v: &mut V) -> Option<Word> {
    let rebuilt = match node {
        Word::Concatenation(concatenation) => words(&concatenation.parts, v).map(|parts| {
            Word::Concatenation(Arc::new(Concatenation {
                parts,
                ..(**concatenation).clone()
            }))
        }),
        Word::CommandSubstitution(sub) => list(&sub.body, v).map(|body| {
            Word::CommandSubstitution(Arc::new(CommandSubstitution {
                body,
                ..(**sub).clone()
            }))
        }),
        Word::Part(_) | Word::Fallback(_) => None,
    };

    let current = rebuilt.as_ref().unwrap_or(node);
    v.visit_word(current).or(rebuilt)
}
