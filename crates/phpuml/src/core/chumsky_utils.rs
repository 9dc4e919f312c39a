//! Shared chumsky combinators for source lexing
//!
//! Whitespace, comments and identifiers in the C-family shape PHP uses.

use chumsky::prelude::*;

/// Parser extra carrying rich, positioned errors
pub type Extra<'src> = extra::Err<Rich<'src, char>>;

/// A single whitespace character, newlines included
pub fn whitespace_char<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    one_of(" \t\n\r\x0c").ignored()
}

/// Rest of a single-line comment; stops before a newline or a `?>` close tag
fn line_comment_body<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    any()
        .and_is(just('\n').ignored().or(just("?>").ignored()).not())
        .repeated()
        .ignored()
}

/// `// ...` comment
pub fn line_comment<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    just("//").ignore_then(line_comment_body())
}

/// `# ...` comment, but not a `#[` attribute opener
pub fn hash_comment<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    just('#')
        .and_is(just("#[").not())
        .ignore_then(line_comment_body())
}

/// Terminated `/* ... */` comment (doc comments included)
pub fn block_comment<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    just("/*")
        .then(any().and_is(just("*/").not()).repeated())
        .then(just("*/"))
        .ignored()
}

/// Any run of whitespace and comments, possibly empty
pub fn trivia<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    choice((
        whitespace_char(),
        line_comment(),
        hash_comment(),
        block_comment(),
    ))
    .repeated()
    .ignored()
}

/// Identifier: letter, `_` or non-ASCII byte first, then also digits
pub fn identifier<'src>() -> impl Parser<'src, &'src str, &'src str, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_alphabetic() || *c == '_' || !c.is_ascii())
        .then(
            any()
                .filter(|c: &char| c.is_alphanumeric() || *c == '_' || !c.is_ascii())
                .repeated(),
        )
        .to_slice()
}

/// Namespace-qualified name such as `Foo`, `\Foo\Bar` or `namespace\Foo`
///
/// A trailing separator is kept so group imports (`use App\{A, B}`) lex.
pub fn qualified_name<'src>() -> impl Parser<'src, &'src str, &'src str, Extra<'src>> + Clone {
    just('\\')
        .or_not()
        .then(identifier())
        .then(just('\\').then(identifier()).repeated())
        .then(just('\\').or_not())
        .to_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivia_skips_comments_and_whitespace() {
        let parser = trivia().then(just("class")).then_ignore(end());
        assert!(parser.parse("class").into_result().is_ok());
        assert!(parser.parse("  \n\tclass").into_result().is_ok());
        assert!(parser.parse("// note\nclass").into_result().is_ok());
        assert!(parser.parse("# note\nclass").into_result().is_ok());
        assert!(parser.parse("/** @var int */ class").into_result().is_ok());
        assert!(parser.parse("/* a */ // b\n # c\n class").into_result().is_ok());
    }

    #[test]
    fn test_hash_comment_leaves_attributes_alone() {
        let parser = hash_comment().then_ignore(end());
        assert!(parser.parse("# comment").into_result().is_ok());
        assert!(parser.parse("#[Attribute]").into_result().is_err());
    }

    #[test]
    fn test_block_comment_requires_terminator() {
        let parser = block_comment().then_ignore(end());
        assert!(parser.parse("/* done */").into_result().is_ok());
        assert!(parser.parse("/* open").into_result().is_err());
    }

    #[test]
    fn test_line_comment_stops_at_close_tag() {
        let parser = line_comment().then(just("?>")).then_ignore(end());
        assert!(parser.parse("// x ?>").into_result().is_ok());
    }

    #[test]
    fn test_identifier_and_qualified_name() {
        let ident = identifier().then_ignore(end());
        assert_eq!(ident.parse("_user2").into_result().unwrap(), "_user2");
        assert_eq!(ident.parse("Äpfel").into_result().unwrap(), "Äpfel");
        assert!(ident.parse("2abc").into_result().is_err());

        let name = qualified_name().then_ignore(end());
        assert_eq!(
            name.parse("\\App\\Models\\User").into_result().unwrap(),
            "\\App\\Models\\User"
        );
        assert_eq!(name.parse("Shape").into_result().unwrap(), "Shape");
        assert_eq!(name.parse("App\\").into_result().unwrap(), "App\\");
        assert!(name.parse("\\").into_result().is_err());
    }
}
