//! PHP lexer built with chumsky
//!
//! Produces a flat token list with byte spans. String, number and operator
//! contents are not kept: the parser only needs the shape of the code. Broken
//! input (unterminated strings or comments, stray characters) still lexes into
//! [`Token::Unterminated`] / [`Token::Unknown`] so the parser can report it
//! with a position.

use std::borrow::Cow;

use chumsky::prelude::*;

use crate::core::chumsky_utils::{identifier, qualified_name, trivia, Extra};
use crate::core::{DiagramError, Span};

/// Bracket flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    Paren,
    Bracket,
    Brace,
}

impl Delim {
    pub fn open_char(self) -> char {
        match self {
            Delim::Paren => '(',
            Delim::Bracket => '[',
            Delim::Brace => '{',
        }
    }

    pub fn close_char(self) -> char {
        match self {
            Delim::Paren => ')',
            Delim::Bracket => ']',
            Delim::Brace => '}',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'src> {
    /// Keyword or (qualified) name
    Name(&'src str),
    /// `$name`, without the dollar
    Variable(&'src str),
    Str,
    Number,
    Open(Delim),
    Close(Delim),
    Semi,
    Comma,
    DoubleColon,
    Ellipsis,
    /// `#[`, opening an attribute group
    AttrOpen,
    Op(char),
    Unterminated(&'static str),
    Unknown(char),
}

impl Token<'_> {
    /// True for a name token equal to `keyword`, ignoring ASCII case
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Name(name) if name.eq_ignore_ascii_case(keyword))
    }
}

pub type SpannedToken<'src> = (Token<'src>, Span);

/// Quoted literal; yields whether the closing quote was found
fn quoted<'src>(quote: char) -> impl Parser<'src, &'src str, bool, Extra<'src>> + Clone {
    let escape = just('\\').then(any()).ignored();
    let plain = any()
        .filter(move |c: &char| *c != quote && *c != '\\')
        .ignored();

    just(quote)
        .ignore_then(escape.or(plain).repeated())
        .ignore_then(just(quote).or_not())
        .map(|close| close.is_some())
}

fn string_token<'src>(closed: bool) -> Token<'src> {
    if closed {
        Token::Str
    } else {
        Token::Unterminated("string")
    }
}

/// The token stream of one PHP file
pub fn lexer<'src>() -> impl Parser<'src, &'src str, Vec<SpannedToken<'src>>, Extra<'src>> {
    // `<?php` is matched in any case
    let open_tag = just("<?")
        .then(
            any()
                .repeated()
                .exactly(3)
                .to_slice()
                .filter(|tag: &&str| tag.eq_ignore_ascii_case("php")),
        )
        .ignored()
        .or(just("<?=").ignored());
    let inline_html = any().and_is(open_tag.clone().not()).repeated();

    // `?>` ends a statement; the HTML after it is skipped up to the next open tag
    let close_tag = just("?>")
        .then(inline_html.clone())
        .then(open_tag.clone().or_not())
        .to(Token::Semi);

    // only reached when the trivia parser could not close the comment
    let unterminated_comment = just("/*")
        .then(any().repeated())
        .to(Token::Unterminated("comment"));

    let string = choice((quoted('\''), quoted('"'), quoted('`'))).map(string_token);

    let variable = just('$').ignore_then(identifier()).map(Token::Variable);

    let name = qualified_name().map(Token::Name);

    let number = any()
        .filter(|c: &char| c.is_ascii_digit())
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
                .repeated(),
        )
        .to(Token::Number);

    let punct = choice((
        just("::").to(Token::DoubleColon),
        just("...").to(Token::Ellipsis),
        just("#[").to(Token::AttrOpen),
        just('(').to(Token::Open(Delim::Paren)),
        just(')').to(Token::Close(Delim::Paren)),
        just('[').to(Token::Open(Delim::Bracket)),
        just(']').to(Token::Close(Delim::Bracket)),
        just('{').to(Token::Open(Delim::Brace)),
        just('}').to(Token::Close(Delim::Brace)),
        just(';').to(Token::Semi),
        just(',').to(Token::Comma),
        one_of("+-*/%=<>!.?:|&^~@$").map(Token::Op),
    ));

    let token = choice((
        close_tag,
        unterminated_comment,
        string,
        variable,
        name,
        number,
        punct,
        any().map(Token::Unknown),
    ));

    inline_html
        .ignore_then(open_tag.or_not())
        .ignore_then(trivia())
        .ignore_then(
            token
                .map_with(|tok, e| {
                    let span: SimpleSpan = e.span();
                    (tok, span.start..span.end)
                })
                .then_ignore(trivia())
                .repeated()
                .collect::<Vec<_>>(),
        )
        .then_ignore(end())
}

/// Lex `source`, blanking heredoc/nowdoc bodies first
///
/// Token spans refer to `source` itself: the blanking keeps byte offsets.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken<'_>>, DiagramError> {
    match blank_heredocs(source) {
        Cow::Borrowed(text) => lex(text),
        Cow::Owned(text) => {
            // names and variables must borrow from the caller's text, so map
            // the spans back onto `source` after lexing the blanked copy
            let tokens = lex(&text)?;
            Ok(tokens
                .into_iter()
                .map(|(tok, span)| (rebind(tok, source, &span), span))
                .collect())
        }
    }
}

fn lex(text: &str) -> Result<Vec<SpannedToken<'_>>, DiagramError> {
    lexer().parse(text).into_result().map_err(|errors| {
        let (message, offset) = errors
            .first()
            .map(|e| (e.to_string(), e.span().start))
            .unwrap_or_else(|| ("unreadable input".to_string(), 0));
        DiagramError::parse_error_at(message, text, offset)
    })
}

fn rebind<'src>(tok: Token<'_>, source: &'src str, span: &Span) -> Token<'src> {
    match tok {
        Token::Name(_) => Token::Name(&source[span.clone()]),
        Token::Variable(_) => Token::Variable(&source[span.start + 1..span.end]),
        Token::Str => Token::Str,
        Token::Number => Token::Number,
        Token::Open(d) => Token::Open(d),
        Token::Close(d) => Token::Close(d),
        Token::Semi => Token::Semi,
        Token::Comma => Token::Comma,
        Token::DoubleColon => Token::DoubleColon,
        Token::Ellipsis => Token::Ellipsis,
        Token::AttrOpen => Token::AttrOpen,
        Token::Op(c) => Token::Op(c),
        Token::Unterminated(what) => Token::Unterminated(what),
        Token::Unknown(c) => Token::Unknown(c),
    }
}

/// Replace every heredoc/nowdoc with an empty string literal padded to the
/// same byte length, newlines kept
pub fn blank_heredocs(source: &str) -> Cow<'_, str> {
    if !source.contains("<<<") {
        return Cow::Borrowed(source);
    }

    let mut out = String::with_capacity(source.len());
    let mut copied = 0;
    let mut cursor = 0;

    while let Some(found) = source[cursor..].find("<<<") {
        let start = cursor + found;
        let Some((label, body_start)) = heredoc_label(source, start + 3) else {
            cursor = start + 3;
            continue;
        };
        let Some(end) = heredoc_end(source, body_start, label) else {
            cursor = start + 3;
            continue;
        };

        out.push_str(&source[copied..start]);
        out.push_str("''");
        for c in source[start + 2..end].chars() {
            if c == '\n' {
                out.push('\n');
            } else {
                out.extend(std::iter::repeat(' ').take(c.len_utf8()));
            }
        }
        copied = end;
        cursor = end;
    }

    out.push_str(&source[copied..]);
    Cow::Owned(out)
}

/// Label after `<<<` and the offset where the body starts
fn heredoc_label(source: &str, pos: usize) -> Option<(&str, usize)> {
    let rest = &source[pos..];
    let trimmed = rest.trim_start_matches([' ', '\t']);
    let mut offset = pos + (rest.len() - trimmed.len());

    let quote = trimmed
        .chars()
        .next()
        .filter(|c| *c == '\'' || *c == '"');
    if quote.is_some() {
        offset += 1;
    }

    let label_len = source[offset..]
        .char_indices()
        .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    let label = &source[offset..offset + label_len];
    if label.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    offset += label_len;

    if let Some(q) = quote {
        if !source[offset..].starts_with(q) {
            return None;
        }
        offset += 1;
    }

    let after = &source[offset..];
    if after.starts_with("\r\n") {
        Some((label, offset + 2))
    } else if after.starts_with('\n') {
        Some((label, offset + 1))
    } else {
        None
    }
}

/// Offset just past the closing label
fn heredoc_end(source: &str, body_start: usize, label: &str) -> Option<usize> {
    let mut line_start = body_start;
    loop {
        let line = &source[line_start..];
        let indented = line.trim_start_matches([' ', '\t']);
        let indent = line.len() - indented.len();
        if let Some(after) = indented.strip_prefix(label) {
            let continues = after
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric() || c == '_');
            if !continues {
                return Some(line_start + indent + label.len());
            }
        }
        line_start += line.find('\n')? + 1;
    }
}
