//! Error recovery: broken configuration still round-trips, with unclosed
//! lists kept structured and everything else captured literally.

use verbatim_core::lst::{FallbackPolicy, Tree};
use verbatim_core::testing::{assert_round_trip, assert_round_trip_with};
use verbatim_core::{ErrorKind, VerbatimConfig};
use verbatim_hcl::builder::{FALLBACKS, HclBuilder};
use verbatim_hcl::grammar::{self, HclRule};
use verbatim_hcl::tree::{BodyItem, Expression};
use verbatim_hcl::{Hcl, parse, parse_with};

fn value(source: &str) -> Expression {
    let file = parse(source).unwrap();
    file.body.attributes().next().unwrap().value.element().clone()
}

#[test]
fn test_unclosed_call_keeps_structure() {
    let file = assert_round_trip(&Hcl, "x = f(a, b");
    let Some(BodyItem::Attribute(attribute)) = file.body.items.first() else {
        panic!("expected an attribute");
    };
    let Expression::FunctionCall(call) = attribute.value.element() else {
        panic!("expected a call");
    };
    assert!(!call.args.is_closed());
    let args: Vec<_> = call.args.elements().map(|a| a.to_string()).collect();
    assert_eq!(args, ["a", " b"]);
}

#[test]
fn test_unclosed_block_keeps_its_body() {
    let source = "service \"api\" {\n  port = 8080\n";
    let file = assert_round_trip(&Hcl, source);
    let block = file.body.blocks().next().unwrap();
    assert!(block.close.is_none());
    assert!(block.body.attribute("port").is_some());
    assert_eq!(file.eof.whitespace(), "\n");
}

#[test]
fn test_literal_policy_override_captures_call() {
    let config = VerbatimConfig::from_toml_str(
        r#"
[fallback.hcl]
FunctionCall = "literal"
"#,
    )
    .unwrap();
    assert_eq!(
        config.fallback_table("hcl", FALLBACKS).policy("FunctionCall"),
        FallbackPolicy::LiteralCapture
    );

    let file = assert_round_trip_with(&Hcl, "x = f(a, b", &config);
    let value = file.body.attribute("x").unwrap().value.element();
    let Expression::Fallback(literal) = value else {
        panic!("expected a fallback");
    };
    assert_eq!(literal.text(), "f(a, b");
    assert_eq!(literal.prefix().whitespace(), " ");
}

#[test]
fn test_omit_policy_override_keeps_for_structure() {
    let config = VerbatimConfig::from_json_str(r#"{"fallback": {"hcl": {"ForTuple": "omit"}}}"#)
        .unwrap();
    let file = assert_round_trip_with(&Hcl, "x = [for v in xs : v", &config);
    let Expression::For(expr) = file.body.attribute("x").unwrap().value.element() else {
        panic!("expected a for expression");
    };
    assert!(expr.close.is_none());
}

#[test]
fn test_missing_interior_token_always_captures() {
    let config = VerbatimConfig::from_json_str(r#"{"fallback": {"hcl": {"Index": "omit"}}}"#)
        .unwrap();
    let file = parse_with("x = a[]\n", &config).unwrap();
    let value = file.body.attribute("x").unwrap().value.element();
    assert!(matches!(value, Expression::Fallback(literal) if literal.text() == "a[]"));
}

#[test]
fn test_unsupported_syntax_is_captured() {
    let Expression::Fallback(splat) = value("x = list[*]") else {
        panic!("expected a fallback");
    };
    assert_eq!(splat.text(), "list[*]");
    assert_eq!(splat.production(), "Error");

    let Expression::Fallback(heredoc) = value("x = <<EOT\nbody\nEOT\n") else {
        panic!("expected a fallback");
    };
    assert_eq!(heredoc.text(), "<<EOT\nbody\nEOT");
}

#[test]
fn test_stray_tokens_do_not_break_neighbours() {
    let source = "a = 1\n} ] ) = =\nb = 2\n";
    let file = assert_round_trip(&Hcl, source);
    assert!(file.body.attribute("a").is_some());
    assert!(file.body.attribute("b").is_some());
    assert!(matches!(file.body.items[1], BodyItem::Fallback(_)));
}

#[test]
fn test_broken_constructs_round_trip() {
    for source in [
        "a =",
        "a = 1 +",
        "a = !",
        "a = x ?",
        "a = x ? y :",
        "a = (",
        "a = (1",
        "a = [1, 2",
        "a = {x = 1",
        "a = {x 1}",
        "a = {x = }",
        "a = b.",
        "a = b[",
        "a = [for",
        "a = {for k, v in m : k}",
        "block \"x\"",
        "block {\n  inner {\n",
        "a = \"unterminated\nb = 2",
        "a = f(x...",
        "@ $ ^",
    ] {
        assert_round_trip(&Hcl, source);
    }
}

#[test]
fn test_unknown_production_is_reported() {
    let mut file = grammar::parse("a = 1");
    file.rule = HclRule::Object;

    let err = HclBuilder::new("a = 1", &VerbatimConfig::default())
        .build(&file)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Production);
    assert!(!err.is_recoverable());
}

#[test]
fn test_recorded_cursor_never_moves_backward() {
    let source = "a = f(1, [2, {b = 3}]) # c\nblk \"l\" {\n  x = y ? z\n";
    let config = VerbatimConfig {
        record_cursor: true,
        ..VerbatimConfig::default()
    };

    let mut builder = HclBuilder::new(source, &config);
    let file = builder.build(&grammar::parse(source)).unwrap();
    let trail = builder.cursor().trail().unwrap();

    assert!(trail.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(trail.last(), Some(&source.len()));
    assert_eq!(file.to_string(), source);
}
