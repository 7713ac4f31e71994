use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::string_interning::StringTable;
use crate::compiler_frontend::tokenizer::tokens::{
    FileTokens, TextLocation, Token, TokenKind, TokenStream,
};
use crate::{return_syntax_error, settings, token_log};
use std::path::Path;

#[macro_export]
macro_rules! return_token {
    ($kind:expr, $stream:expr $(,)?) => {
        return Ok(Token::new($kind, $stream.new_location()))
    };
}

pub fn tokenize(
    source_code: &str,
    src_path: &Path,
    string_table: &mut StringTable,
) -> Result<FileTokens, CompilerError> {
    let initial_capacity = source_code.len() / settings::SRC_TO_TOKEN_RATIO;

    let mut tokens: Vec<Token> = Vec::with_capacity(initial_capacity);
    let mut stream = TokenStream::new(source_code, src_path);

    loop {
        let token = get_token_kind(&mut stream, string_table)?;
        token_log!(#token);

        match token.kind {
            TokenKind::Newline => insert_implicit_semicolon(&mut tokens, token.location),

            TokenKind::Eof => {
                insert_implicit_semicolon(&mut tokens, token.location);
                tokens.push(token);
                break;
            }

            _ => tokens.push(token),
        }
    }

    Ok(FileTokens::new(src_path.to_path_buf(), tokens))
}

// Newlines end statements after anything that can finish one
fn insert_implicit_semicolon(tokens: &mut Vec<Token>, location: TextLocation) {
    if tokens.last().is_some_and(|token| token.kind.ends_statement()) {
        tokens.push(Token::new(TokenKind::Semicolon, location));
    }
}

pub fn get_token_kind(
    stream: &mut TokenStream,
    string_table: &mut StringTable,
) -> Result<Token, CompilerError> {
    // Whitespace and comments
    let current_char = loop {
        stream.update_start_position();

        let current_char = match stream.next() {
            Some(ch) => ch,
            None => return_token!(TokenKind::Eof, stream),
        };

        if current_char == '\n' {
            return_token!(TokenKind::Newline, stream);
        }

        if current_char.is_whitespace() {
            continue;
        }

        if current_char == '/' && stream.peek() == Some(&'/') {
            while let Some(&ch) = stream.peek() {
                if ch == '\n' {
                    break;
                }
                stream.next();
            }
            continue;
        }

        if current_char == '/' && stream.peek() == Some(&'*') {
            stream.next();
            if skip_block_comment(stream)? {
                return_token!(TokenKind::Newline, stream);
            }
            continue;
        }

        break current_char;
    };

    if current_char.is_ascii_digit() {
        return tokenize_number(current_char, stream);
    }

    if current_char.is_alphabetic() || current_char == '_' {
        let mut token_value = String::from(current_char);
        return keyword_or_identifier(&mut token_value, stream, string_table);
    }

    if current_char == '"' {
        return tokenize_string(stream, string_table);
    }

    if current_char == '\'' {
        let c = match stream.next() {
            Some('\\') => escaped_char(stream)?,
            Some(c) if c != '\'' && c != '\n' => c,
            _ => return_syntax_error!(
                "Expected a character after the single quote in a char literal",
                stream.error_location(),
                {
                    CompilationStage => "Tokenization",
                    PrimarySuggestion => "Character literals must be exactly one character between single quotes",
                    SuggestedReplacement => "'x'",
                }
            ),
        };

        if stream.next() != Some('\'') {
            return_syntax_error!(
                "Character literal is missing its closing quote",
                stream.error_location(),
                {
                    CompilationStage => "Tokenization",
                    SuggestedInsertion => "'",
                }
            )
        }

        return_token!(TokenKind::CharLiteral(c), stream);
    }

    let kind = match current_char {
        '(' => TokenKind::OpenParenthesis,
        ')' => TokenKind::CloseParenthesis,
        '[' => TokenKind::OpenBracket,
        ']' => TokenKind::CloseBracket,
        '{' => TokenKind::OpenCurly,
        '}' => TokenKind::CloseCurly,
        ',' => TokenKind::Comma,
        ';' => TokenKind::Semicolon,
        '.' => TokenKind::Dot,
        '^' => TokenKind::Caret,
        '+' => TokenKind::Add,
        '-' => TokenKind::Subtract,
        '*' => TokenKind::Multiply,
        '/' => TokenKind::Divide,
        '%' => TokenKind::Modulus,

        ':' => followed_by_equals(stream, TokenKind::ColonAssign, TokenKind::Colon),
        '=' => followed_by_equals(stream, TokenKind::Equal, TokenKind::Assign),
        '!' => followed_by_equals(stream, TokenKind::NotEqual, TokenKind::Not),
        '<' => followed_by_equals(stream, TokenKind::LessThanOrEqual, TokenKind::LessThan),
        '>' => followed_by_equals(
            stream,
            TokenKind::GreaterThanOrEqual,
            TokenKind::GreaterThan,
        ),

        '&' | '|' => {
            if stream.peek() != Some(&current_char) {
                return_syntax_error!(
                    format!("Invalid Token Used: '{current_char}', logical operators are written twice"),
                    stream.error_location(),
                    {
                        CompilationStage => "Tokenization",
                        PrimarySuggestion => "Use '&&' or '||'",
                    }
                )
            }
            stream.next();

            if current_char == '&' {
                TokenKind::And
            } else {
                TokenKind::Or
            }
        }

        _ => return_syntax_error!(
            format!("Invalid Token Used: '{current_char}' this is not recognised by the compiler"),
            stream.error_location(),
            {
                CompilationStage => "Tokenization",
                PrimarySuggestion => "Check for typos or unsupported characters",
            }
        ),
    };

    return_token!(kind, stream);
}

fn followed_by_equals(stream: &mut TokenStream, with_equals: TokenKind, single: TokenKind) -> TokenKind {
    if stream.peek() == Some(&'=') {
        stream.next();
        return with_equals;
    }

    single
}

/// Returns true if the comment spanned a newline
fn skip_block_comment(stream: &mut TokenStream) -> Result<bool, CompilerError> {
    let mut spans_newline = false;

    while let Some(ch) = stream.next() {
        if ch == '\n' {
            spans_newline = true;
        }

        if ch == '*' && stream.peek() == Some(&'/') {
            stream.next();
            return Ok(spans_newline);
        }
    }

    return_syntax_error!(
        "Unterminated block comment",
        stream.error_location(),
        {
            CompilationStage => "Tokenization",
            SuggestedInsertion => "*/",
        }
    )
}

fn tokenize_number(first_char: char, stream: &mut TokenStream) -> Result<Token, CompilerError> {
    let mut token_value = String::from(first_char);

    // Hexadecimal
    if first_char == '0' && matches!(stream.peek(), Some(&'x') | Some(&'X')) {
        stream.next();
        token_value.clear();

        while let Some(&next_char) = stream.peek() {
            if !next_char.is_ascii_hexdigit() {
                break;
            }
            token_value.push(next_char);
            stream.next();
        }

        return match i64::from_str_radix(&token_value, 16) {
            Ok(value) => Ok(Token::new(TokenKind::IntLiteral(value), stream.new_location())),
            Err(_) => return_syntax_error!(
                "Invalid hexadecimal number",
                stream.error_location(),
                {
                    CompilationStage => "Tokenization",
                }
            ),
        };
    }

    let mut is_real = false;
    push_digits(&mut token_value, stream);

    // Only a dot followed by a digit continues the number
    if stream.peek() == Some(&'.') {
        let mut lookahead = stream.chars.clone();
        lookahead.next();

        if lookahead.next().is_some_and(|c| c.is_ascii_digit()) {
            is_real = true;
            stream.next();
            token_value.push('.');
            push_digits(&mut token_value, stream);
        }
    }

    if matches!(stream.peek(), Some(&'e') | Some(&'E')) {
        is_real = true;
        stream.next();
        token_value.push('e');

        if let Some(&sign) = stream.peek()
            && (sign == '+' || sign == '-')
        {
            stream.next();
            token_value.push(sign);
        }

        if !stream.peek().is_some_and(|c| c.is_ascii_digit()) {
            return_syntax_error!(
                "Exponent of a real number must have digits",
                stream.error_location(),
                {
                    CompilationStage => "Tokenization",
                }
            )
        }
        push_digits(&mut token_value, stream);
    }

    if is_real {
        return match token_value.parse::<f64>() {
            Ok(value) => Ok(Token::new(TokenKind::RealLiteral(value), stream.new_location())),
            Err(_) => return_syntax_error!(
                format!("Invalid real number: {token_value}"),
                stream.error_location()
            ),
        };
    }

    match token_value.parse::<i64>() {
        Ok(value) => Ok(Token::new(TokenKind::IntLiteral(value), stream.new_location())),
        Err(_) => return_syntax_error!(
            format!("Number is too large: {token_value}"),
            stream.error_location(),
            {
                CompilationStage => "Tokenization",
            }
        ),
    }
}

fn push_digits(token_value: &mut String, stream: &mut TokenStream) {
    while let Some(&next_char) = stream.peek() {
        if next_char == '_' {
            stream.next();
            continue;
        }

        if !next_char.is_ascii_digit() {
            break;
        }

        token_value.push(next_char);
        stream.next();
    }
}

fn keyword_or_identifier(
    token_value: &mut String,
    stream: &mut TokenStream,
    string_table: &mut StringTable,
) -> Result<Token, CompilerError> {
    while let Some(&c) = stream.peek() {
        if !(c.is_alphanumeric() || c == '_') {
            break;
        }
        token_value.push(c);
        stream.next();
    }

    let kind = match token_value.as_str() {
        "import" => TokenKind::Import,
        "type" => TokenKind::Type,
        "const" => TokenKind::Const,
        "var" => TokenKind::Var,
        "fn" => TokenKind::Fn,
        "struct" => TokenKind::Struct,
        "interface" => TokenKind::Interface,
        "str" => TokenKind::Str,
        "return" => TokenKind::Return,
        _ => TokenKind::Ident(string_table.intern(token_value)),
    };

    return_token!(kind, stream);
}

fn escaped_char(stream: &mut TokenStream) -> Result<char, CompilerError> {
    let c = match stream.next() {
        Some('n') => '\n',
        Some('t') => '\t',
        Some('r') => '\r',
        Some('0') => '\0',
        Some('\\') => '\\',
        Some('\'') => '\'',
        Some('"') => '"',
        _ => return_syntax_error!(
            "Unknown escape sequence",
            stream.error_location(),
            {
                CompilationStage => "Tokenization",
                PrimarySuggestion => "Supported escapes are \\n \\t \\r \\0 \\\\ \\' \\\"",
            }
        ),
    };

    Ok(c)
}

fn tokenize_string(
    stream: &mut TokenStream,
    string_table: &mut StringTable,
) -> Result<Token, CompilerError> {
    let mut token_value = String::new();

    while let Some(ch) = stream.next() {
        match ch {
            '"' => {
                let interned_string = string_table.intern(&token_value);
                return_token!(TokenKind::StringLiteral(interned_string), stream);
            }
            '\\' => token_value.push(escaped_char(stream)?),
            '\n' => break,
            _ => token_value.push(ch),
        }
    }

    return_syntax_error!(
        "Unterminated string literal - missing closing quote",
        stream.error_location(),
        {
            CompilationStage => "Tokenization",
            PrimarySuggestion => "Add closing double quote at the end of the string",
            SuggestedInsertion => "\"",
            SuggestedLocation => "at end of string",
        }
    )
}

#[cfg(test)]
#[path = "tests/tokenizer_tests.rs"]
mod tests;
