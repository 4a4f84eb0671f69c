//! Round-trip tests for shell scripts
//!
//! Every input must print back byte for byte, whatever the tree looks like.

use proptest::prelude::*;
use std::sync::Arc;
use std::thread;
use verbatim_core::lst::{CommentStyle, LineDelimiter, Tree};
use verbatim_core::testing::{assert_round_trip, assert_round_trip_with, init_tracing};
use verbatim_core::{SourceText, VerbatimConfig, batch};
use verbatim_shell::tree::{CommandElement, PartKind, Statement, Word};
use verbatim_shell::{Shell, ShellVisitor, parse, transform};

const SCRIPT: &str = r#"#!/bin/sh
# build helper

set -eu
PREFIX="${PREFIX:-/usr/local}"  # install root

log() {
    echo "[$(date +%H:%M)] $*" >&2
}

for target in lib bin \
    share; do
  if [ -d "$target" ]; then
    cp -r "$target" "$PREFIX/" || log "copy failed: $target"
  elif test -f "$target.tar"; then tar xf "$target.tar"
  else
    log 'nothing to do'
  fi
done

case "$1" in
  (clean|distclean) rm -rf build ;;
  *) make -j$((4 * 2)) all 2>/dev/null ;;
esac

while read -r line; do echo `basename $line`; done <files.txt
until false; do :; done &
! grep -q x file | wc -l && { echo ok; } || ( echo fail; exit 1 )
"#;

struct Identity;

impl ShellVisitor for Identity {}

/// Replaces every node with a copy of itself, forcing every parent to rebuild
#[derive(Default)]
struct Rebuild {
    visits: usize,
}

impl ShellVisitor for Rebuild {
    fn visit_statement(&mut self, statement: &Statement) -> Option<Statement> {
        self.visits += 1;
        Some(statement.clone())
    }

    fn visit_word(&mut self, word: &Word) -> Option<Word> {
        self.visits += 1;
        Some(word.clone())
    }
}

#[test]
fn test_realistic_script_round_trips() {
    init_tracing();
    assert_round_trip(&Shell, SCRIPT);
}

#[test]
fn test_small_inputs_round_trip() {
    for source in [
        "",
        "\n",
        "   ",
        "# only a comment",
        "# only a comment\n",
        "echo",
        "echo hi;",
        "a &",
        "x= y=2 env",
        "cat <<EOF\n",
        "echo a\\\nb",
        "f(){ :;}",
        "echo ${a:-b} $? $# $@ $1 $",
        "echo 'single' \"double $x\" `tick`",
    ] {
        assert_round_trip(&Shell, source);
    }
}

#[test]
fn test_identity_transform_is_idempotent() {
    let file = parse(SCRIPT).unwrap();
    let once = transform(&file, &mut Identity);
    let twice = transform(&once, &mut Identity);

    assert_eq!(once, file);
    assert_eq!(twice.to_string(), SCRIPT);
}

#[test]
fn test_rebuilding_every_node_reprints_identically() {
    let file = parse(SCRIPT).unwrap();
    let mut rebuild = Rebuild::default();
    let rebuilt = transform(&file, &mut rebuild);

    assert!(rebuild.visits > 20);
    assert_eq!(rebuilt.to_string(), SCRIPT);
    assert_eq!(transform(&rebuilt, &mut Rebuild::default()).to_string(), SCRIPT);
}

#[test]
fn test_trailing_comment_is_prefix_of_next_statement() {
    let file = parse("x=1 # set x\ny=2").unwrap();
    let statements: Vec<_> = file.body.statements().collect();
    assert_eq!(statements.len(), 2);

    let prefix = statements[1].prefix();
    assert_eq!(prefix.whitespace(), " ");
    assert_eq!(prefix.comments().len(), 1);
    let comment = &prefix.comments()[0];
    assert_eq!(comment.text(), "# set x");
    assert_eq!(comment.suffix(), "\n");
    assert_eq!(comment.style(), CommentStyle::Line(LineDelimiter::Hash));
}

#[test]
fn test_crlf_line_endings_are_preserved() {
    let source = "echo a\r\n# note\r\nif x; then\r\n  y\r\nfi\r\n";
    let file = assert_round_trip(&Shell, source);
    assert!(file.eof.whitespace().ends_with("\r\n"));
}

#[test]
fn test_astral_characters_keep_offsets_aligned() {
    let source = "echo \"😀 party\" 🎉 done\n";
    let file = assert_round_trip(&Shell, source);

    let Some(Statement::Command(command)) = file.body.statements().next() else {
        panic!("expected a command");
    };
    let words: Vec<_> = command.words().map(|w| w.to_string()).collect();
    assert_eq!(words, ["echo", " \"😀 party\"", " 🎉", " done"]);
}

#[test]
fn test_assignment_value_and_redirects_are_structured() {
    let file = parse("A=\"x y\" 2>>err cmd").unwrap();
    let Some(Statement::Command(command)) = file.body.statements().next() else {
        panic!("expected a command");
    };
    let CommandElement::Assignment(assignment) = &command.elements[0] else {
        panic!("expected an assignment");
    };
    assert_eq!(&*assignment.name, "A");
    assert!(matches!(
        assignment.value.element(),
        Some(Word::Part(part)) if part.kind == PartKind::DoubleQuoted
    ));
    let CommandElement::Redirect(redirect) = &command.elements[1] else {
        panic!("expected a redirect");
    };
    assert_eq!(redirect.fd.as_deref(), Some("2"));
    insta::assert_snapshot!(redirect.operator.as_str(), @">>");
}

#[test]
fn test_concurrent_printing_of_a_shared_tree() {
    let file = Arc::new(parse(SCRIPT).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let file = Arc::clone(&file);
            thread::spawn(move || file.to_string())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), SCRIPT);
    }
}

#[test]
fn test_batch_round_trip_in_parallel() {
    let sources: Vec<_> = (0..16)
        .map(|i| SourceText::new(format!("s{i}.sh"), format!("echo {i} # n\nexit {i}\n")))
        .collect();
    let printed = batch::round_trip_many(&Shell, &sources, &VerbatimConfig::default()).unwrap();

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
    assert_round_trip_with(&Shell, SCRIPT, &config);
}

fn word() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9_.-]{0,6}",
        "'[a-z ]{0,5}'",
        "\"[a-z ]{0,5}\"",
        "\\$[a-z]{1,4}",
        "\\$\\([a-z]{1,4}\\)",
    ]
}

fn command() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(word(), 1..4),
        "[ \t]{1,3}",
        prop::option::of(" # [a-z ]{0,8}"),
    )
        .prop_map(|(words, gap, comment)| {
            let mut line = format!("cmd{gap}{}", words.join(&gap));
            if let Some(comment) = comment {
                line.push_str(&comment);
            }
            line
        })
}

fn script() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(command(), 1..6),
        prop::sample::select(vec!["\n", "\r\n", " ; ", " && ", " | ", "\n\n"]),
    )
        .prop_map(|(commands, separator)| commands.join(separator))
}

proptest! {
    #[test]
    fn generated_scripts_round_trip(source in script()) {
        let file = parse(&source).unwrap();
        prop_assert_eq!(file.to_string(), source);
    }

    #[test]
    fn arbitrary_text_round_trips(source in "[ -~\n\t]{0,60}") {
        let file = parse(&source).unwrap();
        prop_assert_eq!(file.to_string(), source);
    }
}
