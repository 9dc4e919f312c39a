//! PHP declaration parser
//!
//! Recursive descent over the lexer's tokens. Declarations (classes,
//! interfaces, traits, enums, functions, members) are parsed precisely;
//! every other statement is skipped up to its `;` while the `{ }` blocks it
//! contains are parsed as nested statement lists, so declarations inside
//! conditionals or function bodies still end up in the tree.

use tracing::{debug, span, trace, Level};

use super::lexer::{tokenize, Delim, SpannedToken, Token};
use crate::core::{
    ArgumentDecl, DiagramError, GrammarEngine, Identifier, NodeKind, PropertyDecl, Span,
    SyntaxNode, Tree, TypeRef,
};

type Result<T> = std::result::Result<T, DiagramError>;

const VISIBILITIES: [&str; 3] = ["public", "private", "protected"];

/// Keywords that keep a statement going after one of its blocks
const BLOCK_CONTINUATIONS: [&str; 5] = ["else", "elseif", "catch", "finally", "while"];

/// Control statements that accept a `:` body closed by an `end*` keyword
const ALT_HEADERS: [&str; 8] = [
    "if", "elseif", "else", "while", "for", "foreach", "switch", "declare",
];
const ALT_ENDS: [&str; 6] = [
    "endif",
    "endwhile",
    "endfor",
    "endforeach",
    "endswitch",
    "enddeclare",
];

/// Statements deeper than this are rejected instead of exhausting the stack
pub const MAX_NESTING: usize = 128;

/// Grammar engine for PHP sources
#[derive(Debug, Clone, Copy, Default)]
pub struct PhpParser;

impl PhpParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a whole file into a `program` node
    pub fn parse_program(&self, source: &str) -> Result<SyntaxNode> {
        let parse_span = span!(Level::DEBUG, "parse_php", input_len = source.len());
        let _enter = parse_span.enter();

        let tokens = tokenize(source)?;
        let tokens = before_halt(&tokens);
        trace!(token_count = tokens.len(), "Lexing completed");
        check_tokens(source, tokens)?;

        let mut cursor = Cursor::new(source, tokens);
        let children = cursor.statements_until_eof()?;
        debug!(statements = children.len(), "Parsing completed");

        Ok(SyntaxNode::new(
            NodeKind::Program { children },
            0..source.len(),
        ))
    }
}

impl GrammarEngine for PhpParser {
    fn parse(&self, source: &str) -> Result<Tree> {
        self.parse_program(source).map(Tree::from)
    }

    fn language(&self) -> &'static str {
        "php"
    }
}

/// Tokens up to and including `__halt_compiler();`; what follows is raw data
fn before_halt<'t, 'src>(tokens: &'t [SpannedToken<'src>]) -> &'t [SpannedToken<'src>] {
    let halt = tokens.windows(4).position(|w| {
        w[0].0.is_keyword("__halt_compiler")
            && w[1].0 == Token::Open(Delim::Paren)
            && w[2].0 == Token::Close(Delim::Paren)
            && w[3].0 == Token::Semi
    });
    match halt {
        Some(at) => &tokens[..at + 4],
        None => tokens,
    }
}

/// Reject tokens the lexer could only recover from
fn check_tokens(source: &str, tokens: &[SpannedToken<'_>]) -> Result<()> {
    for (tok, span) in tokens {
        match tok {
            Token::Unterminated(what) => {
                return Err(DiagramError::parse_error_at(
                    format!("unterminated {}", what),
                    source,
                    span.start,
                ));
            }
            Token::Unknown(c) => {
                return Err(DiagramError::parse_error_at(
                    format!("unexpected character '{}'", c.escape_default()),
                    source,
                    span.start,
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

fn describe(tok: &Token<'_>) -> String {
    match tok {
        Token::Name(name) => format!("'{}'", name),
        Token::Variable(name) => format!("'${}'", name),
        Token::Str => "string literal".to_string(),
        Token::Number => "number".to_string(),
        Token::Open(d) => format!("'{}'", d.open_char()),
        Token::Close(d) => format!("'{}'", d.close_char()),
        Token::Semi => "';'".to_string(),
        Token::Comma => "','".to_string(),
        Token::DoubleColon => "'::'".to_string(),
        Token::Ellipsis => "'...'".to_string(),
        Token::AttrOpen => "'#['".to_string(),
        Token::Op(c) => format!("'{}'", c),
        Token::Unterminated(what) => format!("unterminated {}", what),
        Token::Unknown(c) => format!("'{}'", c),
    }
}

struct Cursor<'t, 'src> {
    source: &'src str,
    tokens: &'t [SpannedToken<'src>],
    pos: usize,
    last_end: usize,
    depth: usize,
}

impl<'t, 'src> Cursor<'t, 'src> {
    fn new(source: &'src str, tokens: &'t [SpannedToken<'src>]) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            last_end: 0,
            depth: 0,
        }
    }

    // ---- token access ----

    fn peek(&self) -> Option<Token<'src>> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<Token<'src>> {
        self.tokens.get(self.pos + n).map(|(tok, _)| *tok)
    }

    fn bump(&mut self) -> Option<SpannedToken<'src>> {
        let item = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        self.last_end = item.1.end;
        Some(item)
    }

    /// Offset of the next token, or end of input
    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.start)
            .unwrap_or(self.source.len())
    }

    fn span_from(&self, start: usize) -> Span {
        start..self.last_end.max(start)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|tok| tok.is_keyword(keyword))
    }

    fn keyword_at(&self, n: usize, keyword: &str) -> bool {
        self.peek_at(n).is_some_and(|tok| tok.is_keyword(keyword))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat(&mut self, expected: Token<'_>) -> bool {
        if self.peek().is_some_and(|tok| same_token(&tok, &expected)) {
            self.bump();
            true
        } else {
            false
        }
    }

    // ---- errors ----

    fn error_here(&self, message: impl Into<String>) -> DiagramError {
        DiagramError::parse_error_at(message, self.source, self.offset())
    }

    fn unexpected(&self, wanted: &str) -> DiagramError {
        match self.peek() {
            Some(tok) => self.error_here(format!("expected {}, found {}", wanted, describe(&tok))),
            None => self.error_here(format!("expected {}, found end of input", wanted)),
        }
    }

    fn unclosed(&self, delim: Delim, open: &Span) -> DiagramError {
        DiagramError::parse_error_at(
            format!("unclosed '{}'", delim.open_char()),
            self.source,
            open.start,
        )
    }

    fn expect(&mut self, expected: Token<'_>, wanted: &str) -> Result<Span> {
        match self.peek() {
            Some(tok) if same_token(&tok, &expected) => self
                .bump()
                .map(|(_, span)| span)
                .ok_or_else(|| self.unexpected(wanted)),
            _ => Err(self.unexpected(wanted)),
        }
    }

    fn expect_name(&mut self, wanted: &str) -> Result<Identifier> {
        match self.peek() {
            Some(Token::Name(name)) => {
                let (_, span) = self.bump().ok_or_else(|| self.unexpected(wanted))?;
                Ok(Identifier::new(name, span))
            }
            _ => Err(self.unexpected(wanted)),
        }
    }

    fn expect_variable(&mut self, wanted: &str) -> Result<Identifier> {
        match self.peek() {
            Some(Token::Variable(name)) => {
                let (_, span) = self.bump().ok_or_else(|| self.unexpected(wanted))?;
                Ok(Identifier::new(name, span))
            }
            _ => Err(self.unexpected(wanted)),
        }
    }

    fn name_list(&mut self, wanted: &str) -> Result<Vec<Identifier>> {
        let mut names = vec![self.expect_name(wanted)?];
        while self.eat(Token::Comma) {
            names.push(self.expect_name(wanted)?);
        }
        Ok(names)
    }

    // ---- skipping ----

    /// Skip a balanced group; the next token must be an opener
    fn skip_group(&mut self) -> Result<()> {
        let mut stack: Vec<(Delim, Span)> = Vec::new();
        loop {
            let Some((tok, span)) = self.bump() else {
                return match stack.last() {
                    Some((delim, open)) => Err(self.unclosed(*delim, open)),
                    None => Err(self.unexpected("a bracket")),
                };
            };
            match tok {
                Token::Open(delim) => stack.push((delim, span)),
                Token::AttrOpen => stack.push((Delim::Bracket, span)),
                Token::Close(delim) => match stack.pop() {
                    Some((open, _)) if open == delim => {}
                    Some((open, _)) => {
                        return Err(DiagramError::parse_error_at(
                            format!(
                                "mismatched '{}', expected '{}'",
                                delim.close_char(),
                                open.close_char()
                            ),
                            self.source,
                            span.start,
                        ));
                    }
                    None => {
                        return Err(DiagramError::parse_error_at(
                            format!("unexpected '{}'", delim.close_char()),
                            self.source,
                            span.start,
                        ));
                    }
                },
                _ if stack.is_empty() => return Err(self.unexpected("a bracket")),
                _ => {}
            }
            if stack.is_empty() {
                return Ok(());
            }
        }
    }

    fn skip_attributes(&mut self) -> Result<()> {
        while self.peek() == Some(Token::AttrOpen) {
            self.skip_group()?;
        }
        Ok(())
    }

    /// Skip an expression up to a stop token or an unmatched closer at depth 0
    fn skip_expression(&mut self, stops: &[Token<'_>]) -> Result<()> {
        loop {
            match self.peek() {
                None | Some(Token::Close(_)) => return Ok(()),
                Some(tok) if stops.iter().any(|stop| same_token(&tok, stop)) => return Ok(()),
                Some(Token::Open(_)) | Some(Token::AttrOpen) => self.skip_group()?,
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    // ---- statements ----

    fn statements_until_eof(&mut self) -> Result<Vec<SyntaxNode>> {
        let mut children = Vec::new();
        loop {
            match self.peek() {
                None => return Ok(children),
                Some(Token::Close(delim)) => {
                    return Err(self.error_here(format!("unexpected '{}'", delim.close_char())))
                }
                Some(_) => children.extend(self.statement()?),
            }
        }
    }

    /// `{ statements }`
    fn block(&mut self) -> Result<SyntaxNode> {
        let start = self.offset();
        let open = self.expect(Token::Open(Delim::Brace), "'{'")?;
        let mut children = Vec::new();
        loop {
            match self.peek() {
                None => return Err(self.unclosed(Delim::Brace, &open)),
                Some(Token::Close(Delim::Brace)) => {
                    self.bump();
                    break;
                }
                Some(Token::Close(delim)) => {
                    return Err(self.error_here(format!(
                        "mismatched '{}', expected '}}'",
                        delim.close_char()
                    )))
                }
                Some(_) => children.extend(self.statement()?),
            }
        }
        Ok(SyntaxNode::new(
            NodeKind::Block { children },
            self.span_from(start),
        ))
    }

    fn statement(&mut self) -> Result<Option<SyntaxNode>> {
        if self.depth >= MAX_NESTING {
            return Err(self.error_here("nesting too deep"));
        }
        self.depth += 1;
        let node = self.nested_statement();
        self.depth -= 1;
        node
    }

    fn nested_statement(&mut self) -> Result<Option<SyntaxNode>> {
        self.skip_attributes()?;
        let Some(tok) = self.peek() else {
            return Ok(None);
        };

        let node = match tok {
            Token::Semi => {
                self.bump();
                return Ok(None);
            }
            Token::Close(Delim::Brace) => return Ok(None),
            Token::Open(Delim::Brace) => self.block()?,
            _ if self.at_namespace() => self.namespace()?,
            _ if self.at_class() => self.class()?,
            _ if tok.is_keyword("interface") && self.name_at(1) => self.interface()?,
            _ if tok.is_keyword("trait") && self.name_at(1) => self.trait_decl()?,
            _ if self.at_enum() => self.enum_decl()?,
            _ if self.at_function() => self.function()?,
            _ => self.generic_statement()?,
        };
        trace!(kind = node.kind_name(), "Statement parsed");
        Ok(Some(node))
    }

    fn name_at(&self, n: usize) -> bool {
        matches!(self.peek_at(n), Some(Token::Name(_)))
    }

    fn at_namespace(&self) -> bool {
        self.at_keyword("namespace")
            && matches!(
                self.peek_at(1),
                Some(Token::Name(_)) | Some(Token::Open(Delim::Brace))
            )
    }

    fn at_class(&self) -> bool {
        let mut n = 0;
        while ["abstract", "final", "readonly"]
            .iter()
            .any(|modifier| self.keyword_at(n, modifier))
        {
            n += 1;
        }
        self.keyword_at(n, "class") && self.name_at(n + 1)
    }

    fn at_enum(&self) -> bool {
        self.at_keyword("enum")
            && self.name_at(1)
            && (matches!(
                self.peek_at(2),
                Some(Token::Open(Delim::Brace)) | Some(Token::Op(':'))
            ) || self.keyword_at(2, "implements"))
    }

    fn at_function(&self) -> bool {
        self.at_keyword("function")
            && (self.name_at(1) || (self.peek_at(1) == Some(Token::Op('&')) && self.name_at(2)))
    }

    fn namespace(&mut self) -> Result<SyntaxNode> {
        let start = self.offset();
        self.bump();
        let name = match self.peek() {
            Some(Token::Name(name)) => {
                self.bump();
                Some(name.to_string())
            }
            _ => None,
        };

        let children = if self.peek() == Some(Token::Open(Delim::Brace)) {
            match self.block()?.kind {
                NodeKind::Block { children } => children,
                _ => Vec::new(),
            }
        } else {
            self.expect(Token::Semi, "';' or '{' after namespace name")?;
            // `namespace X;` owns everything up to the next namespace
            let mut children = Vec::new();
            while let Some(tok) = self.peek() {
                if matches!(tok, Token::Close(_)) || self.at_namespace() {
                    break;
                }
                children.extend(self.statement()?);
            }
            children
        };

        debug!(namespace = name.as_deref().unwrap_or("<global>"), "Namespace parsed");
        Ok(SyntaxNode::new(
            NodeKind::Namespace { name, children },
            self.span_from(start),
        ))
    }

    fn class(&mut self) -> Result<SyntaxNode> {
        let start = self.offset();
        let (mut is_abstract, mut is_final) = (false, false);
        loop {
            if self.eat_keyword("abstract") {
                is_abstract = true;
            } else if self.eat_keyword("final") {
                is_final = true;
            } else if !self.eat_keyword("readonly") {
                break;
            }
        }
        if !self.eat_keyword("class") {
            return Err(self.unexpected("'class'"));
        }

        let name = self.expect_name("class name")?;
        let extends = if self.eat_keyword("extends") {
            Some(self.expect_name("parent class name")?)
        } else {
            None
        };
        let implements = if self.eat_keyword("implements") {
            self.name_list("interface name")?
        } else {
            Vec::new()
        };
        let body = self.member_block()?;

        debug!(class = %name.name, members = body.len(), "Class parsed");
        Ok(SyntaxNode::new(
            NodeKind::Class {
                name: Some(name),
                extends,
                implements,
                is_abstract,
                is_final,
                body,
            },
            self.span_from(start),
        ))
    }

    fn interface(&mut self) -> Result<SyntaxNode> {
        let start = self.offset();
        self.bump();
        let name = self.expect_name("interface name")?;
        let extends = if self.eat_keyword("extends") {
            self.name_list("parent interface name")?
        } else {
            Vec::new()
        };
        let body = self.member_block()?;

        debug!(interface = %name.name, members = body.len(), "Interface parsed");
        Ok(SyntaxNode::new(
            NodeKind::Interface {
                name,
                extends,
                body,
            },
            self.span_from(start),
        ))
    }

    fn trait_decl(&mut self) -> Result<SyntaxNode> {
        let start = self.offset();
        self.bump();
        let name = self.expect_name("trait name")?;
        let body = self.member_block()?;
        Ok(SyntaxNode::new(
            NodeKind::Trait { name, body },
            self.span_from(start),
        ))
    }

    fn enum_decl(&mut self) -> Result<SyntaxNode> {
        let start = self.offset();
        self.bump();
        let name = self.expect_name("enum name")?;
        if self.eat(Token::Op(':')) {
            self.type_ref()?;
        }
        let implements = if self.eat_keyword("implements") {
            self.name_list("interface name")?
        } else {
            Vec::new()
        };
        let body = self.member_block()?;
        Ok(SyntaxNode::new(
            NodeKind::Enum {
                name,
                implements,
                body,
            },
            self.span_from(start),
        ))
    }

    fn function(&mut self) -> Result<SyntaxNode> {
        let start = self.offset();
        self.bump();
        self.eat(Token::Op('&'));
        let name = self.expect_name("function name")?;
        let arguments = self.parameters()?;
        let return_type = self.return_type()?;
        let body = self.block()?;
        Ok(SyntaxNode::new(
            NodeKind::Function {
                name,
                arguments,
                return_type,
                body: Box::new(body),
            },
            self.span_from(start),
        ))
    }

    /// Any other statement: tokens up to `;`, nested blocks parsed
    fn generic_statement(&mut self) -> Result<SyntaxNode> {
        let start = self.offset();
        if self.alternative_header()? {
            return self.alternative_statement(start);
        }

        // `case x:` and `default:` labels are statements of their own
        let label = self.at_keyword("case") || self.at_keyword("default");
        let mut children = Vec::new();
        let mut open: Vec<(Delim, Span)> = Vec::new();

        loop {
            let Some(tok) = self.peek() else {
                if let Some((delim, span)) = open.last() {
                    return Err(self.unclosed(*delim, span));
                }
                break;
            };

            match tok {
                Token::Semi if open.is_empty() => {
                    self.bump();
                    break;
                }
                Token::Op(':') if label && open.is_empty() => {
                    self.bump();
                    break;
                }
                Token::Open(Delim::Brace) => {
                    children.push(self.block()?);
                    if open.is_empty() {
                        if self.eat(Token::Semi) {
                            break;
                        }
                        if !self.continues_after_block() {
                            break;
                        }
                    }
                }
                Token::Close(Delim::Brace) if open.is_empty() => break,
                Token::Open(delim) => {
                    if let Some((_, span)) = self.bump() {
                        open.push((delim, span));
                    }
                }
                Token::AttrOpen => self.skip_group()?,
                Token::Close(delim) => match open.pop() {
                    Some((opened, _)) if opened == delim => {
                        self.bump();
                    }
                    Some((opened, _)) => {
                        return Err(self.error_here(format!(
                            "mismatched '{}', expected '{}'",
                            delim.close_char(),
                            opened.close_char()
                        )))
                    }
                    None => {
                        return Err(
                            self.error_here(format!("unexpected '{}'", delim.close_char()))
                        )
                    }
                },
                _ => {
                    self.bump();
                }
            }
        }

        Ok(SyntaxNode::new(
            NodeKind::Statement { children },
            self.span_from(start),
        ))
    }

    /// Consume `if (...):` or `else:`; leaves the cursor untouched otherwise
    fn alternative_header(&mut self) -> Result<bool> {
        if !ALT_HEADERS.iter().any(|keyword| self.at_keyword(keyword)) {
            return Ok(false);
        }
        let (pos, last_end) = (self.pos, self.last_end);
        self.bump();
        if self.peek() == Some(Token::Open(Delim::Paren)) {
            self.skip_group()?;
        }
        if self.eat(Token::Op(':')) {
            return Ok(true);
        }
        self.pos = pos;
        self.last_end = last_end;
        Ok(false)
    }

    /// Bodies of `if (...): ... elseif (...): ... else: ... endif;` and the
    /// other `end*` forms, one block per clause
    fn alternative_statement(&mut self, start: usize) -> Result<SyntaxNode> {
        let mut children = Vec::new();
        loop {
            let body_start = self.offset();
            let mut body = Vec::new();
            loop {
                match self.peek() {
                    None => return Err(self.unexpected("an 'end' keyword")),
                    Some(Token::Close(delim)) => {
                        return Err(self.error_here(format!("unexpected '{}'", delim.close_char())))
                    }
                    Some(_) if ALT_ENDS.iter().any(|keyword| self.at_keyword(keyword)) => break,
                    Some(_) if self.at_keyword("else") || self.at_keyword("elseif") => {
                        if self.alternative_header()? {
                            break;
                        }
                        body.extend(self.statement()?);
                    }
                    Some(_) => body.extend(self.statement()?),
                }
            }
            children.push(SyntaxNode::new(
                NodeKind::Block { children: body },
                self.span_from(body_start),
            ));

            // the next clause header was consumed above
            if ALT_ENDS.iter().any(|keyword| self.at_keyword(keyword)) {
                self.bump();
                self.expect(Token::Semi, "';'")?;
                break;
            }
        }

        Ok(SyntaxNode::new(
            NodeKind::Statement { children },
            self.span_from(start),
        ))
    }

    fn continues_after_block(&self) -> bool {
        match self.peek() {
            Some(Token::Name(_)) => BLOCK_CONTINUATIONS
                .iter()
                .any(|keyword| self.at_keyword(keyword)),
            Some(Token::Op(_))
            | Some(Token::Comma)
            | Some(Token::DoubleColon)
            | Some(Token::Open(Delim::Paren))
            | Some(Token::Open(Delim::Bracket))
            | Some(Token::Close(Delim::Paren))
            | Some(Token::Close(Delim::Bracket)) => true,
            _ => false,
        }
    }

    // ---- class members ----

    fn member_block(&mut self) -> Result<Vec<SyntaxNode>> {
        let open = self.expect(Token::Open(Delim::Brace), "'{'")?;
        let mut members = Vec::new();
        loop {
            self.skip_attributes()?;
            match self.peek() {
                None => return Err(self.unclosed(Delim::Brace, &open)),
                Some(Token::Close(Delim::Brace)) => {
                    self.bump();
                    return Ok(members);
                }
                Some(Token::Semi) => {
                    self.bump();
                }
                Some(_) => members.push(self.member()?),
            }
        }
    }

    fn member(&mut self) -> Result<SyntaxNode> {
        let start = self.offset();

        if self.eat_keyword("use") {
            let traits = self.name_list("trait name")?;
            if self.peek() == Some(Token::Open(Delim::Brace)) {
                self.skip_group()?;
            } else {
                self.expect(Token::Semi, "';' after trait use")?;
            }
            return Ok(SyntaxNode::new(
                NodeKind::TraitUse { traits },
                self.span_from(start),
            ));
        }

        if self.eat_keyword("case") {
            let name = self.expect_name("enum case name")?;
            self.skip_expression(&[Token::Semi])?;
            self.expect(Token::Semi, "';' after enum case")?;
            return Ok(SyntaxNode::new(
                NodeKind::EnumCase { name },
                self.span_from(start),
            ));
        }

        let mut visibility: Option<String> = None;
        let (mut is_static, mut is_abstract) = (false, false);
        while let Some(Token::Name(word)) = self.peek() {
            let lower = word.to_ascii_lowercase();
            match lower.as_str() {
                "public" | "private" | "protected" => {
                    self.bump();
                    if self.at_set_visibility() {
                        // `private(set)` narrows writes only
                        self.skip_group()?;
                    } else {
                        visibility = Some(lower);
                    }
                }
                "static" => {
                    self.bump();
                    is_static = true;
                }
                "abstract" => {
                    self.bump();
                    is_abstract = true;
                }
                "final" | "readonly" | "var" => {
                    self.bump();
                }
                _ => break,
            }
        }

        if self.eat_keyword("const") {
            let names = self.constant_names()?;
            return Ok(SyntaxNode::new(
                NodeKind::ClassConstant { names },
                self.span_from(start),
            ));
        }

        if self.eat_keyword("function") {
            return self.method(start, visibility, is_static, is_abstract);
        }

        self.property_statement(start, visibility, is_static)
    }

    fn at_set_visibility(&self) -> bool {
        self.peek() == Some(Token::Open(Delim::Paren))
            && self.keyword_at(1, "set")
            && self.peek_at(2) == Some(Token::Close(Delim::Paren))
    }

    /// `const [type] A = 1, B = 2;`
    fn constant_names(&mut self) -> Result<Vec<Identifier>> {
        let mut names = Vec::new();
        loop {
            // the name is the last bare word before `=`
            let mut last = None;
            loop {
                match self.peek() {
                    Some(Token::Name(_)) => last = Some(self.expect_name("constant name")?),
                    Some(Token::Op('?' | '|' | '&'))
                    | Some(Token::Open(Delim::Paren))
                    | Some(Token::Close(Delim::Paren)) => {
                        self.bump();
                    }
                    _ => break,
                }
            }
            let name = last.ok_or_else(|| self.unexpected("constant name"))?;
            if !self.eat(Token::Op('=')) {
                return Err(self.unexpected("'=' in constant declaration"));
            }
            self.skip_expression(&[Token::Comma, Token::Semi])?;
            names.push(name);
            if self.eat(Token::Semi) {
                return Ok(names);
            }
            if !self.eat(Token::Comma) {
                return Err(self.unexpected("',' or ';' after constant"));
            }
        }
    }

    fn method(
        &mut self,
        start: usize,
        visibility: Option<String>,
        is_static: bool,
        is_abstract: bool,
    ) -> Result<SyntaxNode> {
        self.eat(Token::Op('&'));
        let name = self.expect_name("method name")?;
        let arguments = self.parameters()?;
        let return_type = self.return_type()?;

        let body = match self.peek() {
            Some(Token::Semi) => {
                self.bump();
                None
            }
            Some(Token::Open(Delim::Brace)) => Some(Box::new(self.block()?)),
            _ => return Err(self.unexpected("method body or ';'")),
        };

        trace!(method = %name.name, arguments = arguments.len(), "Method parsed");
        Ok(SyntaxNode::new(
            NodeKind::Method {
                name,
                visibility,
                is_static,
                is_abstract,
                arguments,
                return_type,
                body,
            },
            self.span_from(start),
        ))
    }

    fn property_statement(
        &mut self,
        start: usize,
        visibility: Option<String>,
        is_static: bool,
    ) -> Result<SyntaxNode> {
        let ty = if matches!(self.peek(), Some(Token::Variable(_))) {
            None
        } else {
            Some(self.type_ref()?)
        };

        let mut properties = Vec::new();
        loop {
            let name = self.expect_variable("property name")?;
            properties.push(PropertyDecl {
                name,
                ty: ty.clone(),
            });

            if self.eat(Token::Op('=')) {
                self.skip_expression(&[Token::Comma, Token::Semi, Token::Open(Delim::Brace)])?;
            }

            match self.peek() {
                Some(Token::Comma) => {
                    self.bump();
                }
                Some(Token::Semi) => {
                    self.bump();
                    break;
                }
                // property hooks
                Some(Token::Open(Delim::Brace)) => {
                    self.skip_group()?;
                    break;
                }
                _ => return Err(self.unexpected("';' after property")),
            }
        }

        Ok(SyntaxNode::new(
            NodeKind::PropertyStatement {
                visibility,
                is_static,
                properties,
            },
            self.span_from(start),
        ))
    }

    fn parameters(&mut self) -> Result<Vec<ArgumentDecl>> {
        let open = self.expect(Token::Open(Delim::Paren), "'('")?;
        let mut arguments = Vec::new();

        loop {
            self.skip_attributes()?;
            match self.peek() {
                None => return Err(self.unclosed(Delim::Paren, &open)),
                Some(Token::Close(Delim::Paren)) => {
                    self.bump();
                    return Ok(arguments);
                }
                Some(Token::Close(delim)) => {
                    return Err(self.error_here(format!(
                        "mismatched '{}', expected ')'",
                        delim.close_char()
                    )))
                }
                _ => {}
            }

            let mut promoted = None;
            while let Some(Token::Name(word)) = self.peek() {
                let lower = word.to_ascii_lowercase();
                if VISIBILITIES.contains(&lower.as_str()) {
                    self.bump();
                    if self.at_set_visibility() {
                        self.skip_group()?;
                    } else if promoted.is_none() {
                        promoted = Some(lower);
                    }
                } else if lower == "readonly" {
                    self.bump();
                    promoted.get_or_insert_with(|| "public".to_string());
                } else {
                    break;
                }
            }

            let ty = match self.peek() {
                Some(Token::Variable(_)) | Some(Token::Op('&')) | Some(Token::Ellipsis) => None,
                _ => Some(self.type_ref()?),
            };
            let by_ref = self.eat(Token::Op('&'));
            let variadic = self.eat(Token::Ellipsis);
            let name = self.expect_variable("parameter name")?;

            if self.eat(Token::Op('=')) {
                self.skip_expression(&[Token::Comma])?;
            }

            arguments.push(ArgumentDecl {
                name,
                ty,
                by_ref,
                variadic,
                promoted,
            });

            match self.peek() {
                Some(Token::Comma) => {
                    self.bump();
                }
                Some(Token::Close(Delim::Paren)) => {}
                None => return Err(self.unclosed(Delim::Paren, &open)),
                _ => return Err(self.unexpected("',' or ')' after parameter")),
            }
        }
    }

    fn return_type(&mut self) -> Result<Option<TypeRef>> {
        if self.eat(Token::Op(':')) {
            Ok(Some(self.type_ref()?))
        } else {
            Ok(None)
        }
    }

    /// A type as written: `int`, `?Foo`, `A|B`, `(A&B)|null`, `static`
    fn type_ref(&mut self) -> Result<TypeRef> {
        let start = self.offset();
        let mut text = String::new();
        let mut depth = 0usize;
        // alternates between a name position and an operator position
        let mut want_name = true;

        loop {
            let take = match self.peek() {
                Some(Token::Name(_)) | Some(Token::Op('?')) | Some(Token::Open(Delim::Paren))
                    if want_name =>
                {
                    if self.peek() == Some(Token::Open(Delim::Paren)) {
                        depth += 1;
                    } else if matches!(self.peek(), Some(Token::Name(_))) {
                        want_name = false;
                    }
                    true
                }
                Some(Token::Op('|')) if !want_name => {
                    want_name = true;
                    true
                }
                // intersection, unless it marks a by-reference parameter
                Some(Token::Op('&'))
                    if !want_name
                        && !matches!(
                            self.peek_at(1),
                            Some(Token::Variable(_)) | Some(Token::Ellipsis)
                        ) =>
                {
                    want_name = true;
                    true
                }
                Some(Token::Close(Delim::Paren)) if !want_name && depth > 0 => {
                    depth -= 1;
                    true
                }
                _ => false,
            };
            if !take {
                break;
            }
            if let Some((_, span)) = self.bump() {
                text.push_str(&self.source[span]);
            }
        }

        if text.is_empty() {
            return Err(self.unexpected("a type"));
        }
        Ok(TypeRef {
            name: text,
            span: self.span_from(start),
        })
    }
}

fn same_token(a: &Token<'_>, b: &Token<'_>) -> bool {
    match (a, b) {
        (Token::Name(x), Token::Name(y)) => x.eq_ignore_ascii_case(y),
        (Token::Variable(x), Token::Variable(y)) => x == y,
        _ => a == b,
    }
}
