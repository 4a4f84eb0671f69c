//! Bottom-up rewriting of HCL trees
//!
//! Same contract as the shell transform: children first, parents rebuilt
//! only along the path of a change, everything else shared.

use crate::tree::*;
use std::sync::Arc;
use verbatim_core::lst::{Container, LeftPadded, RightPadded};

pub trait HclVisitor {
    /// Replacement for an attribute, block or fallback item
    fn visit_body_item(&mut self, _item: &BodyItem) -> Option<BodyItem> {
        None
    }

    /// Replacement for `expression`, or `None` to keep it
    fn visit_expression(&mut self, _expression: &Expression) -> Option<Expression> {
        None
    }
}

/// Apply `visitor` to every body item and expression of `file`
pub fn transform<V: HclVisitor>(file: &ConfigFile, visitor: &mut V) -> ConfigFile {
    match body(&file.body, visitor) {
        Some(body) => ConfigFile {
            body,
            ..file.clone()
        },
        None => file.clone(),
    }
}

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

fn left<T: Clone>(
    padded: &LeftPadded<T>,
    rewrite: impl FnOnce(&T) -> Option<T>,
) -> Option<LeftPadded<T>> {
    rewrite(padded.element()).map(|new| padded.clone().with_element(new))
}

fn right<T: Clone>(
    padded: &RightPadded<T>,
    rewrite: impl FnOnce(&T) -> Option<T>,
) -> Option<RightPadded<T>> {
    rewrite(padded.element()).map(|new| padded.clone().with_element(new))
}

/// Rewrite a container's elements, keeping every padding
fn container<T: Clone>(
    container: &Container<T>,
    mut rewrite: impl FnMut(&T) -> Option<T>,
) -> Option<Container<T>> {
    each(container.padding(), |padded| right(padded, &mut rewrite))
        .map(|padding| container.clone().with_padding(padding))
}

fn body<V: HclVisitor>(node: &Body, v: &mut V) -> Option<Body> {
    each(&node.items, |item| body_item(item, v)).map(|items| Body { items })
}

fn body_item<V: HclVisitor>(item: &BodyItem, v: &mut V) -> Option<BodyItem> {
    let rebuilt = match item {
        BodyItem::Attribute(attribute) => left(&attribute.value, |e| expression(e, v)).map(|value| {
            BodyItem::Attribute(Arc::new(Attribute {
                value,
                ..(**attribute).clone()
            }))
        }),
        BodyItem::Block(block) => body(&block.body, v).map(|body| {
            BodyItem::Block(Arc::new(Block {
                body,
                ..(**block).clone()
            }))
        }),
        BodyItem::Fallback(_) => None,
    };

    let current = rebuilt.as_ref().unwrap_or(item);
    v.visit_body_item(current).or(rebuilt)
}

fn object_member<V: HclVisitor>(member: &ObjectMember, v: &mut V) -> Option<ObjectMember> {
    let ObjectEntry::Item(item) = &member.entry else {
        return None;
    };
    let key = expression(&item.key, v);
    let value = left(&item.value, |e| expression(e, v));
    (key.is_some() || value.is_some()).then(|| ObjectMember {
        entry: ObjectEntry::Item(Arc::new(ObjectItem {
            key: or_old(key, &item.key),
            value: or_old(value, &item.value),
            ..(**item).clone()
        })),
        comma: member.comma,
    })
}

fn expression<V: HclVisitor>(node: &Expression, v: &mut V) -> Option<Expression> {
    let rebuilt = match node {
        Expression::FunctionCall(call) => container(&call.args, |e| expression(e, v)).map(|args| {
            Expression::FunctionCall(Arc::new(FunctionCall {
                args,
                ..(**call).clone()
            }))
        }),
        Expression::Tuple(tuple) => container(&tuple.elements, |e| expression(e, v)).map(|elements| {
            Expression::Tuple(Arc::new(Tuple {
                elements,
                ..(**tuple).clone()
            }))
        }),
        Expression::Object(object) => container(&object.members, |m| object_member(m, v)).map(|members| {
            Expression::Object(Arc::new(Object {
                members,
                ..(**object).clone()
            }))
        }),
        Expression::Unary(unary) => expression(&unary.operand, v).map(|operand| {
            Expression::Unary(Arc::new(Unary {
                operand,
                ..(**unary).clone()
            }))
        }),
        Expression::Binary(binary) => {
            let left = expression(&binary.left, v);
            let right = expression(&binary.right, v);
            (left.is_some() || right.is_some()).then(|| {
                Expression::Binary(Arc::new(Binary {
                    left: or_old(left, &binary.left),
                    right: or_old(right, &binary.right),
                    ..(**binary).clone()
                }))
            })
        }
        Expression::Conditional(node) => {
            let condition = expression(&node.condition, v);
            let truthy = left(&node.truthy, |e| expression(e, v));
            let falsy = left(&node.falsy, |e| expression(e, v));
            (condition.is_some() || truthy.is_some() || falsy.is_some()).then(|| {
                Expression::Conditional(Arc::new(Conditional {
                    condition: or_old(condition, &node.condition),
                    truthy: or_old(truthy, &node.truthy),
                    falsy: or_old(falsy, &node.falsy),
                    ..(**node).clone()
                }))
            })
        }
        Expression::Parentheses(parens) => right(&parens.inner, |e| expression(e, v)).map(|inner| {
            Expression::Parentheses(Arc::new(Parentheses {
                inner,
                ..(**parens).clone()
            }))
        }),
        Expression::GetAttr(get) => expression(&get.target, v).map(|target| {
            Expression::GetAttr(Arc::new(GetAttr {
                target,
                ..(**get).clone()
            }))
        }),
        Expression::Index(node) => {
            let target = expression(&node.target, v);
            let index = right(&node.index, |e| expression(e, v));
            (target.is_some() || index.is_some()).then(|| {
                Expression::Index(Arc::new(Index {
                    target: or_old(target, &node.target),
                    index: or_old(index, &node.index),
                    ..(**node).clone()
                }))
            })
        }
        Expression::For(node) => {
            let collection = left(&node.collection, |e| expression(e, v));
            let result = left(&node.result, |e| expression(e, v));
            let object_value = node
                .object_value
                .as_ref()
                .and_then(|value| left(value, |e| expression(e, v)));
            let condition = node
                .condition
                .as_ref()
                .and_then(|condition| left(condition, |e| expression(e, v)));
            let changed = collection.is_some()
                || result.is_some()
                || object_value.is_some()
                || condition.is_some();
            changed.then(|| {
                Expression::For(Arc::new(ForExpr {
                    collection: or_old(collection, &node.collection),
                    result: or_old(result, &node.result),
                    object_value: object_value.or_else(|| node.object_value.clone()),
                    condition: condition.or_else(|| node.condition.clone()),
                    ..(**node).clone()
                }))
            })
        }
        Expression::Literal(_)
        | Expression::Variable(_)
        | Expression::Empty(_)
        | Expression::Fallback(_) => None,
    };

    let current = rebuilt.as_ref().unwrap_or(node);
    v.visit_expression(current).or(rebuilt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    struct Rename;

    impl HclVisitor for Rename {
        fn visit_expression(&mut self, expression: &Expression) -> Option<Expression> {
            match expression {
                Expression::Variable(var) if &*var.name == "old" => {
                    Some(Expression::Variable(Variable {
                        name: Arc::from("new"),
                        ..var.clone()
                    }))
                }
                _ => None,
            }
        }
    }

    struct Nothing;

    impl HclVisitor for Nothing {}

    #[test]
    fn rewrites_nested_expressions_and_keeps_layout() {
        let source = "job {\n  a = f( old ,[ old ])  # c\n  b = { k = old } [old]\n}\n";
        let renamed = transform(&parse(source).unwrap(), &mut Rename);
        assert_eq!(
            renamed.to_string(),
            "job {\n  a = f( new ,[ new ])  # c\n  b = { k = new } [new]\n}\n"
        );
    }

    #[test]
    fn untouched_items_are_shared() {
        let file = parse("a = 1\nb = old\n").unwrap();
        let renamed = transform(&file, &mut Rename);

        let (BodyItem::Attribute(before), BodyItem::Attribute(after)) =
            (&file.body.items[0], &renamed.body.items[0])
        else {
            panic!("expected attributes");
        };
        assert!(Arc::ptr_eq(before, after));
        assert_eq!(renamed.to_string(), "a = 1\nb = new\n");
    }

    #[test]
    fn identity_visitor_changes_nothing() {
        let source = "x = [for v in old : v.id if v != null]\n";
        let file = parse(source).unwrap();
        let same = transform(&file, &mut Nothing);
        assert_eq!(same, file);
        assert_eq!(same.to_string(), source);
    }
}
