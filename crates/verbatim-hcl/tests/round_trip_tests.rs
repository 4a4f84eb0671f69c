//! Round-trip tests for HCL configuration files

use proptest::prelude::*;
use std::sync::Arc;
use verbatim_core::lst::{CommentStyle, LineDelimiter, Tree};
use verbatim_core::testing::{assert_round_trip, assert_round_trip_with, init_tracing};
use verbatim_core::{SourceText, VerbatimConfig, batch};
use verbatim_hcl::tree::{BodyItem, Expression, LiteralKind};
use verbatim_hcl::{Hcl, HclVisitor, parse, transform};

const CONFIG: &str = r#"# Network module
terraform {
  required_version = ">= 1.5"
}

/* shared
   settings */
locals {
  name    = "web-${var.env}"   // interpolated
  ports   = [80, 443, ]
  tags = {
    Owner = "ops"
    "cost-center": 42,
  }
  enabled = var.count > 0 && !var.disabled ? true : false
  ids     = [for s in aws_subnet.main : s.id if s.public]
  by_zone = {for s in aws_subnet.main : s.zone => s.id...}
}

resource "aws_instance" "web" {
  ami           = data.aws_ami.ubuntu.id
  instance_type = lookup(var.sizes, var.env, "t3.micro")
  subnet_id     = element(local.ids, count.index % length(local.ids))
  user_data     = <<-EOT
    #!/bin/bash
    echo hello
  EOT
  count = (var.replicas * 2) - 1
  azs   = slice(data.zones.names[*], 0, 2)
  args  = concat(local.extra...)
}
"#;

struct Identity;

impl HclVisitor for Identity {}

/// Replaces every node with a copy of itself, forcing every parent to rebuild
#[derive(Default)]
struct Rebuild {
    visits: usize,
}

impl HclVisitor for Rebuild {
    fn visit_body_item(&mut self, item: &BodyItem) -> Option<BodyItem> {
        self.visits += 1;
        Some(item.clone())
    }

    fn visit_expression(&mut self, expression: &Expression) -> Option<Expression> {
        self.visits += 1;
        Some(expression.clone())
    }
}

#[test]
fn test_realistic_config_round_trips() {
    init_tracing();
    assert_round_trip(&Hcl, CONFIG);
}

#[test]
fn test_small_inputs_round_trip() {
    for source in [
        "",
        "\n\n",
        "# only a comment",
        "/* unterminated",
        "a = 1",
        "a = {}",
        "a = []",
        "a = [ ]",
        "a = f()",
        "b {}",
        "b \"l\" {\n}\n",
        "c = -1.5e3",
        "d = \"${a}\" // t",
    ] {
        assert_round_trip(&Hcl, source);
    }
}

#[test]
fn test_removing_an_argument_keeps_separator_layout() {
    let file = parse("x = foo(a, b, c)").unwrap();
    let Some(Expression::FunctionCall(call)) = file.body.attribute("x").map(|a| a.value.element())
    else {
        panic!("expected a call");
    };

    let kept: Vec<Expression> = call
        .args
        .elements()
        .filter(|arg| !matches!(arg, Expression::Variable(v) if &*v.name == "b"))
        .cloned()
        .collect();
    let edited = Expression::FunctionCall(Arc::new(verbatim_hcl::tree::FunctionCall {
        args: call.args.with_elements(kept),
        ..(**call).clone()
    }));

    insta::assert_snapshot!(edited.to_string().trim_start(), @"foo(a, c)");
}

#[test]
fn test_comments_attach_to_the_next_item() {
    let file = parse("a = 1 // one\n# two\nb = 2\n").unwrap();
    let prefix = file.body.items[1].prefix();
    assert_eq!(prefix.whitespace(), " ");

    let comments = prefix.comments();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].style(), CommentStyle::Line(LineDelimiter::DoubleSlash));
    assert_eq!(comments[0].suffix(), "\n");
    assert_eq!(comments[1].text(), "# two");
    assert_eq!(comments[1].style(), CommentStyle::Line(LineDelimiter::Hash));
}

#[test]
fn test_block_comments_are_structured() {
    let file = parse("/* a */ /* b */\nx = 1").unwrap();
    let styles: Vec<_> = file.prefix.comments().iter().map(|c| c.style()).collect();
    assert_eq!(styles, [CommentStyle::Block, CommentStyle::Block]);
    assert_eq!(file.to_string(), "/* a */ /* b */\nx = 1");
}

#[test]
fn test_crlf_line_endings_are_preserved() {
    let source = "a = 1\r\n# c\r\nb {\r\n  c = [\r\n    1,\r\n  ]\r\n}\r\n";
    let file = assert_round_trip(&Hcl, source);
    assert_eq!(file.eof.whitespace(), "\r\n");
}

#[test]
fn test_surrogate_pairs_keep_offsets_aligned() {
    let source = "greeting = \"hi 😀\" /* 🎉 */\nname = \"🦀\" + x\n";
    let file = assert_round_trip(&Hcl, source);

    let name = file.body.attribute("name").unwrap();
    let Expression::Binary(binary) = name.value.element() else {
        panic!("expected a binary expression");
    };
    assert!(matches!(
        &binary.left,
        Expression::Literal(literal) if literal.kind == LiteralKind::String && &*literal.text == "\"🦀\""
    ));
}

#[test]
fn test_identity_transform_is_idempotent() {
    let file = parse(CONFIG).unwrap();
    let once = transform(&file, &mut Identity);
    assert_eq!(once, file);
    assert_eq!(transform(&once, &mut Identity).to_string(), CONFIG);
}

#[test]
fn test_rebuilding_every_node_reprints_identically() {
    let file = parse(CONFIG).unwrap();
    let mut rebuild = Rebuild::default();
    let rebuilt = transform(&file, &mut rebuild);

    assert!(rebuild.visits > 20);
    assert_eq!(rebuilt.to_string(), CONFIG);
    assert_eq!(transform(&rebuilt, &mut Rebuild::default()).to_string(), CONFIG);
}

#[test]
fn test_blocks_and_labels() {
    let file = parse(CONFIG).unwrap();
    let kinds: Vec<_> = file.body.blocks().map(|b| b.kind.to_string()).collect();
    assert_eq!(kinds, ["terraform", "locals", "resource"]);

    let resource = file.body.blocks().last().unwrap();
    let labels: Vec<_> = resource.labels.iter().map(|l| l.to_string()).collect();
    assert_eq!(labels, [" \"aws_instance\"", " \"web\""]);
    assert!(matches!(
        resource.body.items.iter().find(|i| i.to_string().contains("user_data")),
        Some(BodyItem::Attribute(_))
    ));
}

#[test]
fn test_batch_round_trip_in_parallel() {
    let sources: Vec<_> = (0..16)
        .map(|i| SourceText::new(format!("m{i}.tf"), format!("v{i} = {i} # n\nb{i} {{ x = [{i}] }}\n")))
        .collect();
    let printed = batch::round_trip_many(&Hcl, &sources, &VerbatimConfig::default()).unwrap();

    for (source, printed) in sources.iter().zip(printed) {
        assert_eq!(printed.as_deref(), Some(source.text()));
    }
}

#[test]
fn test_interning_does_not_change_output() {
    let config = VerbatimConfig {
        intern_whitespace: false,
        ..VerbatimConfig::default()
    };
    assert_round_trip_with(&Hcl, CONFIG, &config);
}

fn expression() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        "[0-9]{1,3}",
        "\"[a-z ]{0,5}\"",
        "[a-z][a-z_]{0,4}",
        Just("true".to_string()),
        Just("null".to_string()),
    ];
    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            (inner.clone(), "[ ]{0,2}[-+*/%<>][ ]{0,2}", inner.clone())
                .prop_map(|(a, op, b)| format!("{a}{op}{b}")),
            prop::collection::vec(inner.clone(), 0..3)
                .prop_map(|items| format!("[{}]", items.join(", "))),
            prop::collection::vec(inner.clone(), 0..3)
                .prop_map(|args| format!("f({})", args.join(" ,"))),
            (inner.clone(), inner.clone(), inner.clone())
                .prop_map(|(c, t, f)| format!("{c} ? {t} : {f}")),
            inner.prop_map(|e| format!("( {e} )")),
        ]
    })
}

fn config() -> impl Strategy<Value = String> {
    prop::collection::vec(
        ("[a-z]{1,4}", "[ \t]{0,2}", expression(), prop::option::of(" # [a-z]{0,5}")),
        1..6,
    )
    .prop_map(|attributes| {
        attributes
            .into_iter()
            .map(|(name, gap, value, comment)| {
                format!("{name}{gap}={gap}{value}{}\n", comment.unwrap_or_default())
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn generated_configs_round_trip(source in config()) {
        let file = parse(&source).unwrap();
        prop_assert_eq!(file.to_string(), source);
    }

    #[test]
    fn arbitrary_text_round_trips(source in "[ -~\n\t]{0,60}") {
        let file = parse(&source).unwrap();
        prop_assert_eq!(file.to_string(), source);
    }
}
