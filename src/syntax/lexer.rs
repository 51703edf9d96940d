//! Tokenizer for TypeScript and JavaScript modules.
//!
//! Only as much of the language is recognized as import detection needs:
//! string, template and regex literals are scanned precisely so that their
//! contents are never mistaken for code, while operators are mostly kept as
//! single-character punctuation. In the JSX dialect an element in
//! expression position is scanned as one opaque token, so markup text such
//! as `Don't` or `</div>` is never read as a string or a regex.

use std::path::Path;

use crate::error::{MdrcError, Result};

/// Source dialect, chosen from the file extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    /// TypeScript or JavaScript without JSX (`<T>x` is a type assertion).
    #[default]
    Script,
    /// Sources that may contain JSX elements.
    Jsx,
}

impl Dialect {
    /// `.jsx`, `.tsx` and `.js` files may contain JSX.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("jsx" | "tsx" | "js") => Dialect::Jsx,
            _ => Dialect::Script,
        }
    }
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword (`import`, `from`, `Core`, `#private`).
    Ident,
    /// Quoted string literal with its decoded value.
    Str(String),
    /// Numeric literal.
    Number,
    /// A piece of a template literal between backticks and `${ }` holes.
    Template,
    /// Regular expression literal.
    Regex,
    /// A whole JSX element, children included.
    Jsx,
    /// Punctuation or operator.
    Punct,
}

/// A token with its byte range in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    /// The token text.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }

    /// Whether this token is the identifier `name`.
    pub fn is_ident(&self, source: &str, name: &str) -> bool {
        self.kind == TokenKind::Ident && self.text(source) == name
    }

    /// Whether this token is the punctuation `punct`.
    pub fn is_punct(&self, source: &str, punct: &str) -> bool {
        self.kind == TokenKind::Punct && self.text(source) == punct
    }
}

/// Keywords whose parenthesized head may be followed by a regex operand.
const CONTROL_KEYWORDS: &[&str] = &["if", "while", "for", "with"];

/// Keywords after which a `/` starts a regular expression.
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

const MULTI_CHAR_PUNCT: &[&str] = &["...", "===", "!==", "=>", "==", "!=", "?.", "??"];

/// Tokenize a module source.
///
/// Whitespace and comments are skipped. Unterminated strings, templates,
/// regular expressions and block comments are syntax errors.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    tokenize_with(source, Dialect::Script)
}

/// Tokenize a module source in the given dialect.
pub fn tokenize_with(source: &str, dialect: Dialect) -> Result<Vec<Token>> {
    Lexer::new(source, dialect).run()
}

struct Lexer<'a> {
    source: &'a str,
    dialect: Dialect,
    pos: usize,
    tokens: Vec<Token>,
    /// One entry per open `{`; `true` when it opened a template `${` hole.
    braces: Vec<bool>,
    /// One entry per open `(`; `true` when it opened an `if (...)`-style head.
    parens: Vec<bool>,
    /// Whether the last `)` closed a control statement head.
    closed_control_head: bool,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str, dialect: Dialect) -> Self {
        Self {
            source,
            dialect,
            pos: 0,
            tokens: Vec::new(),
            braces: Vec::new(),
            parens: Vec::new(),
            closed_control_head: false,
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        if self.source.starts_with("#!") {
            self.skip_line();
        }

        loop {
            self.skip_trivia()?;
            let Some(c) = self.peek() else { break };
            let start = self.pos;

            match c {
                '"' | '\'' => self.string(c)?,
                '`' => {
                    self.bump();
                    self.template(start)?;
                }
                '0'..='9' => self.number(),
                '.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.number(),
                '/' if self.expression_expected() => self.regex()?,
                '<' if self.jsx_allowed() => {
                    self.jsx_element(start)?;
                    self.push(TokenKind::Jsx, start);
                }
                '{' => {
                    self.bump();
                    self.braces.push(false);
                    self.push(TokenKind::Punct, start);
                }
                '}' => {
                    self.bump();
                    if self.braces.pop() == Some(true) {
                        self.template(start)?;
                    } else {
                        self.push(TokenKind::Punct, start);
                    }
                }
                c if is_ident_start(c) || c == '#' => self.ident(),
                _ => self.punct(),
            }
        }

        Ok(self.tokens)
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            start,
            end: self.pos,
        });
    }

    fn error(&self, start: usize, message: &str) -> MdrcError {
        let line = self.source[..start].matches('\n').count() + 1;
        MdrcError::Syntax {
            path: Default::default(),
            message: format!("{} at line {}", message, line),
        }
    }

    fn skip_line(&mut self) {
        match self.source[self.pos..].find('\n') {
            Some(offset) => self.pos += offset + 1,
            None => self.pos = self.source.len(),
        }
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            let rest = &self.source[self.pos..];
            if rest.starts_with("//") {
                self.skip_line();
            } else if rest.starts_with("/*") {
                let start = self.pos;
                match rest[2..].find("*/") {
                    Some(offset) => self.pos += offset + 4,
                    None => return Err(self.error(start, "unterminated block comment")),
                }
            } else if self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            } else {
                return Ok(());
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<()> {
        let start = self.pos;
        let value = self.string_value(quote)?;
        self.push(TokenKind::Str(value), start);
        Ok(())
    }

    /// Scan a quoted string starting at the opening quote.
    fn string_value(&mut self, quote: char) -> Result<String> {
        let start = self.pos;
        self.bump();
        let mut value = String::new();

        loop {
            match self.bump() {
                Some(c) if c == quote => break,
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('0') => value.push('\0'),
                    Some('\r') => {
                        if self.peek() == Some('\n') {
                            self.bump();
                        }
                    }
                    Some('\n') => {}
                    Some(other) => value.push(other),
                    None => return Err(self.error(start, "unterminated string literal")),
                },
                Some('\n') | None => return Err(self.error(start, "unterminated string literal")),
                Some(c) => value.push(c),
            }
        }

        Ok(value)
    }

    /// Scan template text up to the closing backtick or the next `${`.
    fn template(&mut self, start: usize) -> Result<()> {
        loop {
            match self.bump() {
                Some('`') => break,
                Some('\\') => {
                    self.bump();
                }
                Some('$') if self.peek() == Some('{') => {
                    self.bump();
                    self.braces.push(true);
                    break;
                }
                Some(_) => {}
                None => return Err(self.error(start, "unterminated template literal")),
            }
        }

        self.push(TokenKind::Template, start);
        Ok(())
    }

    fn number(&mut self) {
        let start = self.pos;
        while let Some(c) = self.peek() {
            let exponent_sign = (c == '+' || c == '-')
                && matches!(self.source[..self.pos].chars().last(), Some('e' | 'E'))
                && !self.source[start..self.pos].starts_with("0x");
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || exponent_sign {
                self.bump();
            } else {
                break;
            }
        }
        self.push(TokenKind::Number, start);
    }

    fn ident(&mut self) {
        let start = self.pos;
        self.bump();
        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }
        self.push(TokenKind::Ident, start);
    }

    fn punct(&mut self) {
        let start = self.pos;
        let rest = &self.source[self.pos..];
        match MULTI_CHAR_PUNCT.iter().find(|p| rest.starts_with(**p)) {
            Some(p) => self.pos += p.len(),
            None => match self.bump() {
                Some('(') => {
                    let control = self.tokens.last().is_some_and(|prev| {
                        prev.kind == TokenKind::Ident
                            && CONTROL_KEYWORDS.contains(&prev.text(self.source))
                    });
                    self.parens.push(control);
                }
                Some(')') => self.closed_control_head = self.parens.pop().unwrap_or(false),
                _ => {}
            },
        }
        self.push(TokenKind::Punct, start);
    }

    /// Whether an operand, rather than an operator, may start here.
    ///
    /// Decides between regex and division for `/`, and between JSX and
    /// less-than for `<`.
    fn expression_expected(&self) -> bool {
        let Some(prev) = self.tokens.last() else {
            return true;
        };
        let text = prev.text(self.source);
        match prev.kind {
            TokenKind::Ident => REGEX_PREFIX_KEYWORDS.contains(&text),
            TokenKind::Punct => match text {
                ")" => self.closed_control_head,
                "]" | "}" => false,
                _ => true,
            },
            TokenKind::Template => text.ends_with("${"),
            TokenKind::Str(_) | TokenKind::Number | TokenKind::Regex | TokenKind::Jsx => false,
        }
    }

    /// Whether a `<` here opens a JSX element.
    fn jsx_allowed(&self) -> bool {
        self.dialect == Dialect::Jsx
            && self.expression_expected()
            && opens_jsx(&self.source[self.pos + 1..])
    }

    /// Scan a JSX element starting at its `<`, children included.
    fn jsx_element(&mut self, start: usize) -> Result<()> {
        self.bump();

        loop {
            match self.bump() {
                Some('/') if self.peek() == Some('>') => {
                    self.bump();
                    return Ok(());
                }
                Some('>') => break,
                Some(quote @ ('"' | '\'')) => self.jsx_attribute_value(quote, start)?,
                Some('{') => self.jsx_expression(start)?,
                Some(_) => {}
                None => return Err(self.error(start, "unterminated JSX element")),
            }
        }

        loop {
            let rest = &self.source[self.pos..];
            if rest.starts_with("</") {
                return match rest.find('>') {
                    Some(offset) => {
                        self.pos += offset + 1;
                        Ok(())
                    }
                    None => Err(self.error(start, "unterminated JSX element")),
                };
            }
            match self.peek() {
                Some('<') => self.jsx_element(start)?,
                Some('{') => {
                    self.bump();
                    self.jsx_expression(start)?;
                }
                Some(_) => {
                    self.bump();
                }
                None => return Err(self.error(start, "unterminated JSX element")),
            }
        }
    }

    /// JSX attribute strings have no escapes and may span lines.
    fn jsx_attribute_value(&mut self, quote: char, start: usize) -> Result<()> {
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(()),
                Some(_) => {}
                None => return Err(self.error(start, "unterminated JSX attribute")),
            }
        }
    }

    /// Skip a `{ ... }` expression container; the `{` is already consumed.
    fn jsx_expression(&mut self, start: usize) -> Result<()> {
        let mut depth = 1;
        let mut last = '{';

        loop {
            let rest = &self.source[self.pos..];
            if rest.starts_with("//") {
                self.skip_line();
                continue;
            }
            if rest.starts_with("/*") {
                match rest[2..].find("*/") {
                    Some(offset) => self.pos += offset + 4,
                    None => return Err(self.error(start, "unterminated block comment")),
                }
                continue;
            }

            let Some(c) = self.peek() else {
                return Err(self.error(start, "unterminated JSX expression"));
            };
            match c {
                '"' | '\'' => {
                    self.string_value(c)?;
                }
                '`' => {
                    self.bump();
                    self.jsx_template(start)?;
                }
                '<' if (matches!(last, '(' | ',' | '=' | '?' | ':' | '&' | '|' | '{' | '[' | '!' | '>')
                    || self.follows_return())
                    && opens_jsx(&rest[1..]) =>
                {
                    self.jsx_element(start)?;
                }
                '{' => {
                    self.bump();
                    depth += 1;
                }
                '}' => {
                    self.bump();
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {
                    self.bump();
                }
            }

            if !c.is_whitespace() {
                last = match c {
                    '<' | '"' | '\'' | '`' => 'a',
                    other => other,
                };
            }
        }
    }

    /// Skip a template literal inside a JSX expression; the backtick is
    /// already consumed.
    fn jsx_template(&mut self, start: usize) -> Result<()> {
        loop {
            match self.bump() {
                Some('`') => return Ok(()),
                Some('\\') => {
                    self.bump();
                }
                Some('$') if self.peek() == Some('{') => {
                    self.bump();
                    self.jsx_expression(start)?;
                }
                Some(_) => {}
                None => return Err(self.error(start, "unterminated template literal")),
            }
        }
    }

    fn follows_return(&self) -> bool {
        let before = self.source[..self.pos].trim_end();
        before.strip_suffix("return").is_some_and(|head| {
            !head.chars().next_back().is_some_and(is_ident_continue)
        })
    }

    fn regex(&mut self) -> Result<()> {
        let start = self.pos;
        self.bump();
        let mut in_class = false;

        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('/') if !in_class => break,
                Some('\n') | None => {
                    return Err(self.error(start, "unterminated regular expression"))
                }
                Some(_) => {}
            }
        }

        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }
        self.push(TokenKind::Regex, start);
        Ok(())
    }
}

/// Whether the text after a `<` starts a tag rather than a type parameter
/// list such as `<T,>` or `<T extends U>`.
fn opens_jsx(rest: &str) -> bool {
    match rest.chars().next() {
        Some('>') => true,
        Some(c) if is_ident_start(c) => {
            let name_len = rest
                .find(|c: char| !(is_ident_continue(c) || matches!(c, '.' | ':' | '-')))
                .unwrap_or(rest.len());
            let after = rest[name_len..].trim_start();
            !(after.starts_with(',') || after.starts_with("extends "))
        }
        _ => false,
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '\u{200c}' || c == '\u{200d}'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<String> {
        tokenize(source)
            .unwrap()
            .iter()
            .map(|t| t.text(source).to_string())
            .collect()
    }

    #[test]
    fn test_import_statement() {
        assert_eq!(
            texts("import * as Core from './core.md';"),
            vec!["import", "*", "as", "Core", "from", "'./core.md'", ";"]
        );
    }

    #[test]
    fn test_string_values_are_decoded() {
        let tokens = tokenize(r#"'it\'s' "a\"b" 'tab\t'"#).unwrap();

        assert_eq!(tokens[0].kind, TokenKind::Str("it's".to_string()));
        assert_eq!(tokens[1].kind, TokenKind::Str("a\"b".to_string()));
        assert_eq!(tokens[2].kind, TokenKind::Str("tab\t".to_string()));
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            texts("// import x from './a.md'\n/* import y from './b.md' */ z"),
            vec!["z"]
        );
    }

    #[test]
    fn test_template_with_holes() {
        let source = "`a ${ import('./x.md') } b ${ {k: 1}.k } c`";

        let tokens = tokenize(source).unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text(source)).collect();

        assert_eq!(texts[0], "`a ${");
        assert_eq!(&texts[1..5], &["import", "(", "'./x.md'", ")"]);
        assert_eq!(texts[5], "} b ${");
        assert_eq!(*texts.last().unwrap(), "} c`");
    }

    #[test]
    fn test_template_text_is_not_code() {
        let tokens = tokenize("`import x from './a.md'`").unwrap();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Template);
    }

    #[test]
    fn test_regex_versus_division() {
        let source = "const r = /'[/]'/g; const d = a / b / c;";

        let tokens = tokenize(source).unwrap();

        assert_eq!(tokens[3].kind, TokenKind::Regex);
        assert_eq!(tokens[3].text(source), "/'[/]'/g");
        assert_eq!(
            tokens
                .iter()
                .filter(|t| t.is_punct(source, "/"))
                .count(),
            2
        );
    }

    #[test]
    fn test_regex_after_control_head_but_not_call() {
        let source = "if (ok) /'/.test(s); f(a) / 2 / g;";

        let tokens = tokenize(source).unwrap();

        assert_eq!(tokens[4].kind, TokenKind::Regex);
        assert_eq!(tokens[4].text(source), "/'/");
        assert_eq!(
            tokens
                .iter()
                .filter(|t| t.is_punct(source, "/"))
                .count(),
            2
        );
    }

    #[test]
    fn test_jsx_elements_are_opaque() {
        let source = "const App = () => <div className=\"a\">Don't {n > 1 ? <b>it's</b> : null} </div>;";

        let tokens = tokenize_with(source, Dialect::Jsx).unwrap();

        assert_eq!(tokens.len(), 8);
        assert_eq!(tokens[6].kind, TokenKind::Jsx);
        assert_eq!(tokens[6].text(source), &source[18..source.len() - 1]);
        assert!(tokens[7].is_punct(source, ";"));
    }

    #[test]
    fn test_jsx_fragments_and_self_closing_tags() {
        let source = "return <><Icon name='x' /></>;";

        let tokens = tokenize_with(source, Dialect::Jsx).unwrap();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].text(source), "<><Icon name='x' /></>");
    }

    #[test]
    fn test_jsx_inside_callback_expression() {
        let source = "<ul>{items.map(i => <li key={i}>{i}'s</li>)}</ul>";

        let tokens = tokenize_with(source, Dialect::Jsx).unwrap();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Jsx);
    }

    #[test]
    fn test_generic_arrow_is_not_jsx() {
        let source = "const id = <T,>(x: T) => x; const k = <K extends string>(k: K) => k;";

        let tokens = tokenize_with(source, Dialect::Jsx).unwrap();

        assert!(tokens.iter().all(|t| t.kind != TokenKind::Jsx));
        assert_eq!(tokens.iter().filter(|t| t.is_punct(source, "<")).count(), 2);
    }

    #[test]
    fn test_comparisons_are_not_jsx() {
        let source = "if (a < b && c<d) x = y;";

        let tokens = tokenize_with(source, Dialect::Jsx).unwrap();

        assert!(tokens.iter().all(|t| t.kind != TokenKind::Jsx));
    }

    #[test]
    fn test_script_dialect_has_no_jsx() {
        let tokens = tokenize("const x = <T>y;").unwrap();

        assert!(tokens.iter().all(|t| t.kind != TokenKind::Jsx));
    }

    #[test]
    fn test_dialect_for_path() {
        assert_eq!(Dialect::for_path(Path::new("App.tsx")), Dialect::Jsx);
        assert_eq!(Dialect::for_path(Path::new("App.jsx")), Dialect::Jsx);
        assert_eq!(Dialect::for_path(Path::new("main.js")), Dialect::Jsx);
        assert_eq!(Dialect::for_path(Path::new("main.ts")), Dialect::Script);
        assert_eq!(Dialect::for_path(Path::new("main.mts")), Dialect::Script);
    }

    #[test]
    fn test_multi_char_punctuation() {
        assert_eq!(texts("a === b => c?.d"), vec!["a", "===", "b", "=>", "c", "?.", "d"]);
    }

    #[test]
    fn test_shebang_skipped() {
        assert_eq!(texts("#!/usr/bin/env node\nrun()"), vec!["run", "(", ")"]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(texts("1.5e-3 0xff .5"), vec!["1.5e-3", "0xff", ".5"]);
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let err = tokenize("const a = 'oops\nnext").unwrap_err();

        assert!(err.to_string().contains("unterminated string literal at line 1"));
    }

    #[test]
    fn test_unterminated_comment_is_error() {
        assert!(tokenize("a /* never closed").is_err());
    }

    #[test]
    fn test_unicode_identifiers() {
        assert_eq!(texts("const café = 1"), vec!["const", "café", "=", "1"]);
    }
}
