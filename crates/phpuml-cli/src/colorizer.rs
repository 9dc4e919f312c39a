//! Terminal colorization for nomnoml diagram output
//!
//! Applies ANSI escape codes to diagram elements using crossterm.

use crossterm::style::{Color, Stylize};

const ABSTRACT_TAG: &str = "<abstract>";
const ARROWS: [&str; 2] = ["--:>", "-:>"];

/// Colorize nomnoml output using ANSI escape codes
///
/// Applies colors to different diagram elements:
/// - Brackets and compartment separators: Cyan
/// - Relationship arrows: Yellow
/// - The `<abstract>` marker: Magenta
/// - Visibility glyphs: Green
/// - Names and types: Default (terminal color)
pub fn colorize_output(input: &str) -> String {
    let mut result = String::with_capacity(input.len() * 2);

    for line in input.lines() {
        colorize_line(line, &mut result);
        result.push('\n');
    }

    if !input.ends_with('\n') && result.ends_with('\n') {
        result.pop();
    }

    result
}

fn colorize_line(line: &str, out: &mut String) {
    let mut rest = line;
    let mut previous: Option<char> = None;

    while let Some(c) = rest.chars().next() {
        if rest.starts_with(ABSTRACT_TAG) {
            out.push_str(&paint(ABSTRACT_TAG, Color::Magenta));
            rest = &rest[ABSTRACT_TAG.len()..];
            previous = Some('>');
            continue;
        }
        // arrows only appear between two bracketed names
        if previous == Some(' ') {
            if let Some(arrow) = ARROWS.iter().find(|a| rest.starts_with(**a)) {
                out.push_str(&paint(arrow, Color::Yellow));
                rest = &rest[arrow.len()..];
                previous = Some('>');
                continue;
            }
        }

        match c {
            '[' | ']' | '|' => out.push_str(&paint(&c.to_string(), Color::Cyan)),
            '+' | '-' | '#' if is_glyph_position(previous) => {
                out.push_str(&paint(&c.to_string(), Color::Green))
            }
            _ => out.push(c),
        }
        previous = Some(c);
        rest = &rest[c.len_utf8()..];
    }
}

/// Visibility glyphs open a member, right after `|` or `;`
fn is_glyph_position(previous: Option<char>) -> bool {
    matches!(previous, Some('|') | Some(';'))
}

fn paint(text: &str, color: Color) -> String {
    format!("{}", text.with(color))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_ansi(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for n in chars.by_ref() {
                    if n == 'm' {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_colorize_preserves_text() {
        let input = "[User|-id: int;#roles: array;|+save(force: bool);]\n\
                     [User] -:> [Model]\n\
                     [User] --:> [<abstract><Jsonable>]\n";
        let colored = colorize_output(input);

        assert!(colored.contains("\x1b["));
        assert_eq!(strip_ansi(&colored), input);
    }

    #[test]
    fn test_trailing_newline_matches_input() {
        assert!(!colorize_output("[A]").ends_with('\n'));
        assert!(colorize_output("[A]\n").ends_with('\n'));
        assert_eq!(colorize_output(""), "");
    }

    #[test]
    fn test_brackets_are_cyan() {
        let colored = colorize_output("[A]");
        assert!(colored.contains(&paint("[", Color::Cyan)));
        assert!(colored.contains(&paint("]", Color::Cyan)));
        assert!(colored.contains('A'));
    }

    #[test]
    fn test_arrows_are_yellow() {
        let colored = colorize_output("[B] -:> [A]\n[B] --:> [<abstract><I>]");
        assert!(colored.contains(&paint("-:>", Color::Yellow)));
        assert!(colored.contains(&paint("--:>", Color::Yellow)));
        assert!(colored.contains(&paint(ABSTRACT_TAG, Color::Magenta)));
    }

    #[test]
    fn test_glyphs_only_at_member_start() {
        let colored = colorize_output("[A|-x: int|string;+y;]");
        assert!(colored.contains(&paint("-", Color::Green)));
        assert!(colored.contains(&paint("+", Color::Green)));
        // the second `|` sits inside a union type, so `s` stays plain
        assert!(strip_ansi(&colored).contains("int|string"));
    }

    #[test]
    fn test_hyphen_inside_name_is_plain() {
        let colored = colorize_output("[Foo|+bar-baz;]");
        assert!(!colored.contains(&paint("-", Color::Green)));
    }
}
