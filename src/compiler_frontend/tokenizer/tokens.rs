use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorLocation};
use crate::compiler_frontend::string_interning::StringId;
use crate::{return_syntax_error, token_log};
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::Chars;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CharPosition {
    pub line_number: i32,
    pub char_column: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TextLocation {
    pub start_pos: CharPosition,
    pub end_pos: CharPosition,
}

impl TextLocation {
    pub fn new(start: CharPosition, end: CharPosition) -> Self {
        Self {
            start_pos: start,
            end_pos: end,
        }
    }

    pub fn to_error_location(&self, scope: &Path) -> ErrorLocation {
        ErrorLocation::new(scope.to_path_buf(), self.start_pos, self.end_pos)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: TextLocation,
}

impl Token {
    pub fn new(kind: TokenKind, location: TextLocation) -> Self {
        Self { kind, location }
    }
}

/// The token stream of one source file.
/// Each module being parsed owns its own stream,
/// so a nested import never disturbs the position of the importing file.
#[derive(Clone, Debug)]
pub struct FileTokens {
    pub tokens: Vec<Token>,
    pub src_path: PathBuf,
    pub index: usize,
}

impl FileTokens {
    pub fn new(src_path: PathBuf, tokens: Vec<Token>) -> FileTokens {
        FileTokens {
            src_path,
            tokens,
            index: 0,
        }
    }

    pub fn current_token_kind(&self) -> &TokenKind {
        &self.tokens[self.index].kind
    }

    pub fn peek_next_token(&self) -> Option<&TokenKind> {
        self.tokens.get(self.index + 1).map(|token| &token.kind)
    }

    pub fn current_location(&self) -> TextLocation {
        self.tokens[self.index].location
    }

    pub fn current_error_location(&self) -> ErrorLocation {
        self.current_location().to_error_location(&self.src_path)
    }

    pub fn advance(&mut self) {
        if self.index + 1 >= self.tokens.len() {
            // Can't advance past End of File
            token_log!(Red "Compiler tried to advance past EOF");
            return;
        }

        self.index += 1;
    }

    /// Fails unless the current token is the expected kind. Does not consume it.
    pub fn check(&self, expected: &TokenKind) -> Result<(), CompilerError> {
        if self.current_token_kind() != expected {
            return_syntax_error!(
                format!(
                    "{} expected but {} found",
                    expected.spelling(),
                    self.current_token_kind().spelling()
                ),
                self.current_error_location(),
                {
                    CompilationStage => "Parsing",
                }
            )
        }

        Ok(())
    }

    /// Consumes the expected token or fails.
    pub fn eat(&mut self, expected: &TokenKind) -> Result<(), CompilerError> {
        self.check(expected)?;
        self.advance();
        Ok(())
    }

    /// Returns the name of the current identifier without consuming it
    pub fn check_ident(&self) -> Result<StringId, CompilerError> {
        match self.current_token_kind() {
            TokenKind::Ident(name) => Ok(*name),
            found => return_syntax_error!(
                format!("identifier expected but {} found", found.spelling()),
                self.current_error_location(),
                {
                    CompilationStage => "Parsing",
                }
            ),
        }
    }

    pub fn eat_ident(&mut self) -> Result<StringId, CompilerError> {
        let name = self.check_ident()?;
        self.advance();
        Ok(name)
    }

    /// A separator is optional right before the closing bracket of a list
    pub fn eat_separator(&mut self, closing: &TokenKind) -> Result<(), CompilerError> {
        if self.current_token_kind() == closing {
            return Ok(());
        }

        self.eat(&TokenKind::Semicolon)
    }
}

pub struct TokenStream<'a> {
    pub chars: Peekable<Chars<'a>>,
    pub file_path: &'a Path,
    pub position: CharPosition,
    pub start_position: CharPosition,
}

impl<'a> TokenStream<'a> {
    pub fn new(source_code: &'a str, file_path: &'a Path) -> Self {
        Self {
            chars: source_code.chars().peekable(),
            file_path,
            position: CharPosition::default(),
            start_position: CharPosition::default(),
        }
    }

    pub fn next(&mut self) -> Option<char> {
        let c = self.chars.next()?;

        if c == '\n' {
            self.position.line_number += 1;
            self.position.char_column = 0;
        } else {
            self.position.char_column += 1;
        }

        Some(c)
    }

    pub fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    pub fn new_location(&mut self) -> TextLocation {
        let start_pos = self.start_position;
        self.update_start_position();
        TextLocation::new(start_pos, self.position)
    }

    pub fn error_location(&self) -> ErrorLocation {
        TextLocation::new(self.start_position, self.position).to_error_location(self.file_path)
    }

    pub fn update_start_position(&mut self) {
        self.start_position = self.position;
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum TokenKind {
    Eof,

    // Only produced by the tokenizer internally,
    // newlines become implicit semicolons or disappear before parsing.
    Newline,

    Ident(StringId),

    // Literals
    IntLiteral(i64),
    RealLiteral(f64),
    CharLiteral(char),
    StringLiteral(StringId),

    // Keywords
    Import,
    Type,
    Const,
    Var,
    Fn,
    Struct,
    Interface,
    Str,
    Return,

    // Brackets
    OpenParenthesis,  // (
    CloseParenthesis, // )
    OpenBracket,      // [
    CloseBracket,     // ]
    OpenCurly,        // {
    CloseCurly,       // }

    // Basic grammar
    Comma,
    Semicolon,
    Colon,       // :
    ColonAssign, // :=
    Assign,      // =
    Dot,
    Caret, // ^ pointer types

    // Operators
    Add,
    Subtract,
    Multiply, // Also the export mark
    Divide,
    Modulus,
    Not,
    And,
    Or,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl TokenKind {
    pub fn spelling(&self) -> &'static str {
        match self {
            TokenKind::Eof => "end of file",
            TokenKind::Newline => "newline",
            TokenKind::Ident(_) => "identifier",
            TokenKind::IntLiteral(_) => "integer number",
            TokenKind::RealLiteral(_) => "real number",
            TokenKind::CharLiteral(_) => "character",
            TokenKind::StringLiteral(_) => "string",
            TokenKind::Import => "import",
            TokenKind::Type => "type",
            TokenKind::Const => "const",
            TokenKind::Var => "var",
            TokenKind::Fn => "fn",
            TokenKind::Struct => "struct",
            TokenKind::Interface => "interface",
            TokenKind::Str => "str",
            TokenKind::Return => "return",
            TokenKind::OpenParenthesis => "(",
            TokenKind::CloseParenthesis => ")",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::OpenCurly => "{",
            TokenKind::CloseCurly => "}",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::ColonAssign => ":=",
            TokenKind::Assign => "=",
            TokenKind::Dot => ".",
            TokenKind::Caret => "^",
            TokenKind::Add => "+",
            TokenKind::Subtract => "-",
            TokenKind::Multiply => "*",
            TokenKind::Divide => "/",
            TokenKind::Modulus => "%",
            TokenKind::Not => "!",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::Equal => "==",
            TokenKind::NotEqual => "!=",
            TokenKind::LessThan => "<",
            TokenKind::LessThanOrEqual => "<=",
            TokenKind::GreaterThan => ">",
            TokenKind::GreaterThanOrEqual => ">=",
        }
    }

    /// Whether a newline after this token ends the statement
    pub fn ends_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::IntLiteral(_)
                | TokenKind::RealLiteral(_)
                | TokenKind::CharLiteral(_)
                | TokenKind::StringLiteral(_)
                | TokenKind::Str
                | TokenKind::Return
                | TokenKind::CloseParenthesis
                | TokenKind::CloseBracket
                | TokenKind::CloseCurly
        )
    }
}
