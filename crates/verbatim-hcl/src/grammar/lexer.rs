//! Token stream for the HCL parser
//!
//! Whitespace and comments are skipped; newlines are kept as tokens because
//! they terminate attributes and separate object items. Spans are UTF-8
//! byte ranges; the parser converts them to the engine's reporting domain.

use super::HclToken;
use std::ops::Range;

/// One significant token and its byte span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub kind: HclToken,
    pub span: Range<usize>,
}

/// Lex `input` into significant tokens and newlines
pub fn lex(input: &str) -> Vec<Lexeme> {
    let mut tokens = Vec::new();
    let len = input.len();
    let mut i = 0usize;

    while let Some((current, size)) = next_char(input, i) {
        let start = i;
        let rest = &input[i..];

        match current {
            ' ' | '\t' | '\r' => {
                i += size;
                continue;
            }
            '\n' => {
                tokens.push(lexeme(HclToken::Newline, start, start + 1));
                i += 1;
                continue;
            }
            '#' => {
                i = line_end(input, i);
                continue;
            }
            '/' if rest.starts_with("//") => {
                i = line_end(input, i);
                continue;
            }
            '/' if rest.starts_with("/*") => {
                i = match rest[2..].find("*/") {
                    Some(end) => i + 2 + end + 2,
                    None => len,
                };
                continue;
            }
            _ => {}
        }

        let (kind, end) = if current == '"' {
            (HclToken::String, lex_string(input, start))
        } else if current.is_ascii_digit() {
            (HclToken::Number, lex_number(input, start))
        } else if is_identifier_start(current) {
            (HclToken::Identifier, lex_identifier(input, start))
        } else if let Some(end) = lex_heredoc(input, start) {
            (HclToken::Heredoc, end)
        } else {
            lex_punctuation(rest, start, size)
        };

        tokens.push(lexeme(kind, start, end));
        i = end;
    }

    tokens
}

fn lexeme(kind: HclToken, start: usize, end: usize) -> Lexeme {
    Lexeme {
        kind,
        span: start..end,
    }
}

fn next_char(input: &str, pos: usize) -> Option<(char, usize)> {
    input.get(pos..)?.chars().next().map(|c| (c, c.len_utf8()))
}

/// Index of the next `\n` at or after `pos`, or the end of input
fn line_end(input: &str, pos: usize) -> usize {
    input[pos..].find('\n').map_or(input.len(), |offset| pos + offset)
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn lex_identifier(input: &str, start: usize) -> usize {
    let mut end = start;
    while let Some((c, size)) = next_char(input, end) {
        if (end == start && !is_identifier_start(c)) || !is_identifier_char(c) {
            break;
        }
        end += size;
    }
    end
}

fn lex_number(input: &str, start: usize) -> usize {
    let bytes = input.as_bytes();
    let digits = |mut at: usize| {
        while at < bytes.len() && bytes[at].is_ascii_digit() {
            at += 1;
        }
        at
    };

    let mut end = digits(start);
    if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
        end = digits(end + 1);
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        if bytes.get(end + 1 + sign).is_some_and(u8::is_ascii_digit) {
            end = digits(end + 1 + sign);
        }
    }
    end
}

/// End of the quoted template starting at `start`
///
/// Interpolation sequences may nest braces and further strings. An
/// unterminated string ends before the line break.
fn lex_string(input: &str, start: usize) -> usize {
    let mut i = start + 1;
    while let Some((c, size)) = next_char(input, i) {
        match c {
            '"' => return i + 1,
            '\n' => return i,
            '\\' => {
                i += 1;
                if let Some((_, escaped)) = next_char(input, i) {
                    i += escaped;
                }
            }
            '$' | '%' if input[i..].starts_with("$${") || input[i..].starts_with("%%{") => i += 3,
            '$' | '%' if input[i + 1..].starts_with('{') => i = lex_template(input, i + 2),
            _ => i += size,
        }
    }
    input.len()
}

/// End of an interpolation whose opening brace ends just before `start`
fn lex_template(input: &str, start: usize) -> usize {
    let mut depth = 1usize;
    let mut i = start;
    while let Some((c, size)) = next_char(input, i) {
        match c {
            '"' => {
                i = lex_string(input, i);
                continue;
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += size;
    }
    input.len()
}

/// `<<MARKER` or `<<-MARKER` through the line that closes it
fn lex_heredoc(input: &str, start: usize) -> Option<usize> {
    let rest = &input[start..];
    let intro = if rest.starts_with("<<-") {
        3
    } else if rest.starts_with("<<") {
        2
    } else {
        return None;
    };

    let marker_start = start + intro;
    let marker_end = lex_identifier(input, marker_start);
    if marker_end == marker_start {
        return None;
    }
    let marker = &input[marker_start..marker_end];

    let mut line_start = line_end(input, marker_end);
    while line_start < input.len() {
        let body_start = line_start + 1;
        let end = line_end(input, body_start);
        if input[body_start..end].trim() == marker {
            return Some(end);
        }
        line_start = end;
    }
    Some(input.len())
}

fn lex_punctuation(rest: &str, start: usize, size: usize) -> (HclToken, usize) {
    const MULTI: &[(&str, HclToken)] = &[
        ("...", HclToken::Ellipsis),
        ("=>", HclToken::FatArrow),
        ("==", HclToken::EqEq),
        ("!=", HclToken::NotEq),
        ("<=", HclToken::Le),
        (">=", HclToken::Ge),
        ("&&", HclToken::AndAnd),
        ("||", HclToken::OrOr),
    ];

    if let Some((text, kind)) = MULTI.iter().find(|(text, _)| rest.starts_with(text)) {
        return (*kind, start + text.len());
    }

    let kind = match rest.as_bytes()[0] {
        b'{' => HclToken::LBrace,
        b'}' => HclToken::RBrace,
        b'[' => HclToken::LBracket,
        b']' => HclToken::RBracket,
        b'(' => HclToken::LParen,
        b')' => HclToken::RParen,
        b',' => HclToken::Comma,
        b'=' => HclToken::Equals,
        b':' => HclToken::Colon,
        b'?' => HclToken::Question,
        b'.' => HclToken::Dot,
        b'!' => HclToken::Bang,
        b'-' => HclToken::Minus,
        b'+' => HclToken::Plus,
        b'*' => HclToken::Star,
        b'/' => HclToken::Slash,
        b'%' => HclToken::Percent,
        b'<' => HclToken::Lt,
        b'>' => HclToken::Gt,
        _ => HclToken::Unknown,
    };
    (kind, start + size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<HclToken> {
        lex(input).into_iter().map(|lexeme| lexeme.kind).collect()
    }

    fn texts(input: &str) -> Vec<&str> {
        lex(input)
            .into_iter()
            .map(|lexeme| &input[lexeme.span])
            .collect()
    }

    #[test]
    fn test_skips_trivia_but_keeps_newlines() {
        assert_eq!(
            kinds("a = 1 # c\n/* x\ny */ b // d\n"),
            vec![
                HclToken::Identifier,
                HclToken::Equals,
                HclToken::Number,
                HclToken::Newline,
                HclToken::Identifier,
                HclToken::Newline,
            ]
        );
    }

    #[test]
    fn test_numbers_and_operators() {
        assert_eq!(
            texts("1.5e+3 >= 2... => a.b 3.x"),
            vec!["1.5e+3", ">=", "2", "...", "=>", "a", ".", "b", "3", ".", "x"]
        );
    }

    #[test]
    fn test_templates_nest_strings_and_braces() {
        let input = r#"x = "a ${f("}", {b = 1})} $${raw} \" end" y"#;
        let strings: Vec<_> = lex(input)
            .into_iter()
            .filter(|lexeme| lexeme.kind == HclToken::String)
            .map(|lexeme| &input[lexeme.span])
            .collect();
        assert_eq!(strings, vec![r#""a ${f("}", {b = 1})} $${raw} \" end""#]);
    }

    #[test]
    fn test_unterminated_string_stops_at_line_end() {
        assert_eq!(texts("a = \"open\nb"), vec!["a", "=", "\"open", "\n", "b"]);
    }

    #[test]
    fn test_heredoc_runs_through_marker_line() {
        let input = "a = <<-EOT\n  hello\n  EOT\nb = 1";
        assert_eq!(texts(input)[2], "<<-EOT\n  hello\n  EOT");
        assert_eq!(kinds(input)[2], HclToken::Heredoc);
        assert_eq!(kinds("a < < b")[1], HclToken::Lt);
    }

    #[test]
    fn test_identifiers_allow_dashes_and_unicode() {
        assert_eq!(texts("dash-ed ünï_1"), vec!["dash-ed", "ünï_1"]);
    }
}
