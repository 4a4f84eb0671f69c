//! Lossless tree back to HCL source

use crate::tree::*;
use std::fmt;
use verbatim_core::lst::{PrintOutput, Space};

/// Print a whole configuration file
pub fn print(file: &ConfigFile) -> String {
    let mut out = PrintOutput::new();
    print_file(&mut out, file);
    out.finish()
}

pub fn print_file(out: &mut PrintOutput, file: &ConfigFile) {
    out.space(&file.prefix);
    body(out, &file.body);
    out.space(&file.eof);
}

fn closer(out: &mut PrintOutput, close: &Option<Space>, text: &str) {
    if let Some(space) = close {
        out.space(space).append(text);
    }
}

fn body(out: &mut PrintOutput, body: &Body) {
    for item in &body.items {
        body_item(out, item);
    }
}

pub fn body_item(out: &mut PrintOutput, item: &BodyItem) {
    match item {
        BodyItem::Attribute(attribute) => {
            out.space(&attribute.prefix).append(&attribute.name);
            out.left_padded(&attribute.value, "=", expression);
        }
        BodyItem::Block(block) => {
            out.space(&block.prefix).append(&block.kind);
            for label in &block.labels {
                expression(out, label);
            }
            out.space(&block.open).append("{");
            self::body(out, &block.body);
            closer(out, &block.close, "}");
        }
        BodyItem::Fallback(literal) => {
            out.fallback(literal);
        }
    }
}

fn variable(out: &mut PrintOutput, variable: &Variable) {
    out.space(&variable.prefix).append(&variable.name);
}

pub fn expression(out: &mut PrintOutput, expression: &Expression) {
    match expression {
        Expression::Literal(literal) => {
            out.space(&literal.prefix).append(&literal.text);
        }
        Expression::Variable(node) => variable(out, node),
        Expression::FunctionCall(call) => function_call(out, call),
        Expression::Tuple(tuple) => {
            out.space(&tuple.prefix);
            out.container(&tuple.elements, "[", ",", "]", self::expression);
        }
        Expression::Object(object) => {
            out.space(&object.prefix).append("{");
            for padded in object.members.padding() {
                let member = padded.element();
                object_entry(out, &member.entry);
                out.space(padded.after());
                if member.comma {
                    out.append(",");
                }
            }
            if object.members.is_closed() {
                out.append("}");
            }
        }
        Expression::Unary(unary) => {
            out.space(&unary.prefix).append(unary.operator.as_str());
            self::expression(out, &unary.operand);
        }
        Expression::Binary(binary) => {
            out.space(&binary.prefix);
            self::expression(out, &binary.left);
            out.space(binary.operator.before())
                .append(binary.operator.element().as_str());
            self::expression(out, &binary.right);
        }
        Expression::Conditional(conditional) => {
            out.space(&conditional.prefix);
            self::expression(out, &conditional.condition);
            out.left_padded(&conditional.truthy, "?", self::expression);
            out.left_padded(&conditional.falsy, ":", self::expression);
        }
        Expression::Parentheses(parens) => {
            out.space(&parens.prefix).append("(");
            self::expression(out, parens.inner.element());
            out.space(parens.inner.after());
            if parens.closed {
                out.append(")");
            }
        }
        Expression::GetAttr(get) => {
            out.space(&get.prefix);
            self::expression(out, &get.target);
            out.left_padded(&get.name, ".", variable);
        }
        Expression::Index(index) => {
            out.space(&index.prefix);
            self::expression(out, &index.target);
            out.space(&index.open).append("[");
            self::expression(out, index.index.element());
            out.space(index.index.after());
            if index.closed {
                out.append("]");
            }
        }
        Expression::For(node) => for_expression(out, node),
        Expression::Empty(empty) => {
            out.space(&empty.prefix);
        }
        Expression::Fallback(literal) => {
            out.fallback(literal);
        }
    }
}

fn function_call(out: &mut PrintOutput, call: &FunctionCall) {
    out.space(&call.prefix).append(&call.name);
    let Some(expand) = &call.expand else {
        out.container(&call.args, "(", ",", ")", expression);
        return;
    };

    out.space(call.args.before()).append("(");
    let last = call.args.len().saturating_sub(1);
    for (i, padded) in call.args.padding().iter().enumerate() {
        out.right_padded(padded, if i < last { "," } else { "..." }, expression);
    }
    out.space(expand);
    if call.args.is_closed() {
        out.append(")");
    }
}

fn object_entry(out: &mut PrintOutput, entry: &ObjectEntry) {
    match entry {
        ObjectEntry::Item(item) => {
            out.space(&item.prefix);
            expression(out, &item.key);
            out.left_padded(&item.value, item.assign.as_str(), expression);
        }
        ObjectEntry::Fallback(literal) => {
            out.fallback(literal);
        }
        ObjectEntry::Empty(empty) => {
            out.space(&empty.prefix);
        }
    }
}

fn for_expression(out: &mut PrintOutput, node: &ForExpr) {
    let (open, close) = if node.object { ("{", "}") } else { ("[", "]") };
    out.space(&node.prefix).append(open);
    out.space(&node.intro).append("for");
    if let Some(key) = &node.key {
        out.right_padded(key, ",", variable);
    }
    variable(out, &node.value);
    out.left_padded(&node.collection, "in", expression);
    out.left_padded(&node.result, ":", expression);
    if let Some(value) = &node.object_value {
        out.left_padded(value, "=>", expression);
    }
    closer(out, &node.grouping, "...");
    if let Some(condition) = &node.condition {
        out.left_padded(condition, "if", expression);
    }
    closer(out, &node.close, close);
}

impl fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print(self))
    }
}

impl fmt::Display for BodyItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = PrintOutput::new();
        body_item(&mut out, self);
        f.write_str(out.as_str())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = PrintOutput::new();
        expression(&mut out, self);
        f.write_str(out.as_str())
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use crate::tree::*;
    use verbatim_core::lst::{Space, Tree};

    #[test]
    fn prints_structured_and_fallback_nodes() {
        for source in [
            "a = 1\n",
            "b = [1, 2, ]\n",
            "c = { x = 1, \"y\": 2\n  z = !true }\n",
            "d = f(x...) + g( ) * -h(1,)\n",
            "e = a.b[0].c ? (x) : null\n",
            "resource \"aws\" main {\n  tags = merge(var.t, {})\n}\n",
            "f = [for v in xs : v if v != \"\"]\n",
            "g = x ? y\n",
            "h = b.*.c\n",
        ] {
            let file = parse(source).unwrap();
            assert_eq!(file.to_string(), source);
        }
    }

    #[test]
    fn edited_prefix_is_printed() {
        let file = parse("a = b").unwrap();
        let attribute = file.body.attribute("a").unwrap();
        let value = attribute.value.element().with_prefix(Space::whitespace_only("\t"));
        assert_eq!(value.to_string(), "\tb");
        assert_eq!(file.to_string(), "a = b");
    }
}
