//! Error recovery: broken scripts still produce trees that print back
//! exactly, with the broken constructs kept as fallback literals or
//! structured nodes missing their closer.

use verbatim_core::lst::{FallbackPolicy, GrammarElement, GrammarNode, GrammarToken, Tree};
use verbatim_core::testing::{assert_round_trip, assert_round_trip_with};
use verbatim_core::{ErrorKind, VerbatimConfig, VerbatimError};
use verbatim_shell::builder::ShellBuilder;
use verbatim_shell::grammar::{ShellRule, ShellToken};
use verbatim_shell::tree::{Statement, Word};
use verbatim_shell::{Shell, parse, parse_with};

fn first(source: &str) -> Statement {
    let file = parse(source).unwrap();
    file.body.statements().next().cloned().unwrap()
}

#[test]
fn test_unclosed_subshell_is_captured_literally() {
    let file = assert_round_trip(&Shell, "(echo hi");
    let Some(Statement::Fallback(literal)) = file.body.statements().next() else {
        panic!("expected a fallback literal");
    };
    assert_eq!(literal.text(), "(echo hi");
    assert_eq!(literal.production(), "Subshell");
}

#[test]
fn test_unclosed_command_substitution_keeps_structure() {
    let source = "echo $(date +%s";
    assert_round_trip(&Shell, source);

    let Statement::Command(command) = first(source) else {
        panic!("expected a command");
    };
    let Some(Word::CommandSubstitution(sub)) = command.words().nth(1) else {
        panic!("expected a command substitution");
    };
    assert!(sub.close.is_none());
    assert_eq!(sub.prefix.whitespace(), " ");
}

#[test]
fn test_literal_policy_override_captures_substitution() {
    let config = VerbatimConfig::from_toml_str(
        r#"
[fallback.shell]
CommandSubstitution = "literal"
"#,
    )
    .unwrap();
    assert_eq!(
        config.fallback_table("shell", verbatim_shell::builder::FALLBACKS)
            .policy("CommandSubstitution"),
        FallbackPolicy::LiteralCapture
    );

    let file = assert_round_trip_with(&Shell, "echo $(date", &config);
    let Some(Statement::Command(command)) = file.body.statements().next() else {
        panic!("expected a command");
    };
    let Some(Word::Fallback(literal)) = command.words().nth(1) else {
        panic!("expected a fallback word");
    };
    assert_eq!(literal.text(), "$(date");
    assert_eq!(literal.prefix().whitespace(), " ");
}

#[test]
fn test_stray_closers_do_not_break_neighbours() {
    let source = "echo a\n) fi done\necho b\n";
    let file = assert_round_trip(&Shell, source);

    let kinds: Vec<_> = file
        .body
        .statements()
        .map(|s| matches!(s, Statement::Fallback(_)))
        .collect();
    assert_eq!(kinds.first(), Some(&false));
    assert_eq!(kinds.last(), Some(&false));
    assert!(kinds.contains(&true));
}

#[test]
fn test_broken_constructs_round_trip() {
    for source in [
        "if true; then echo",
        "if true\necho x\nfi",
        "while :; do",
        "for do done",
        "case x in a) b",
        "case x a) b;; esac",
        "f ( echo",
        "echo >",
        "a && ",
        "a | | b",
        "! ",
        "{ echo; ",
        "echo \"unterminated",
        "echo 'unterminated",
        "echo ${unterminated",
        "x=$(( 1 + ",
        ";; & ;",
    ] {
        assert_round_trip(&Shell, source);
    }
}

#[test]
fn test_unknown_production_is_reported() {
    let bogus = GrammarNode::new(
        ShellRule::Program,
        vec![GrammarElement::Node(GrammarNode::new(
            ShellRule::List,
            vec![GrammarElement::Node(GrammarNode::new(
                ShellRule::ElseClause,
                vec![GrammarElement::Token(GrammarToken::new(ShellToken::Else, 0, 4))],
            ))],
        ))],
    );

    let err = ShellBuilder::new("else", &VerbatimConfig::default())
        .build(&bogus)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Production);
    assert!(matches!(
        err,
        VerbatimError::UnhandledProduction { ref production, .. } if production == "ElseClause"
    ));
    assert!(!err.is_recoverable());
}

#[test]
fn test_recorded_cursor_never_moves_backward() {
    let source = "if a; then b $(c; d) >out; fi # done\n( broken\n";
    let program = verbatim_shell::grammar::parse(source);
    let config = VerbatimConfig {
        record_cursor: true,
        ..VerbatimConfig::default()
    };

    let mut builder = ShellBuilder::new(source, &config);
    let file = builder.build(&program).unwrap();
    let trail = builder.cursor().trail().unwrap();

    assert!(trail.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(trail.last(), Some(&source.len()));
    assert_eq!(file.to_string(), source);
    assert_eq!(parse_with(source, &config).unwrap().to_string(), source);
}
