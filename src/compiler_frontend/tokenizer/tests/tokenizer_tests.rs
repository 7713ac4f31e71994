use super::*;
use std::path::PathBuf;

fn token_kinds(source: &str) -> (Vec<TokenKind>, StringTable) {
    let mut string_table = StringTable::new();
    let file_tokens = tokenize(source, &PathBuf::from("test.um"), &mut string_table)
        .expect("tokenization should succeed");

    (
        file_tokens
            .tokens
            .into_iter()
            .map(|token| token.kind)
            .collect(),
        string_table,
    )
}

#[test]
fn newline_after_identifier_becomes_a_semicolon() {
    let (kinds, mut string_table) = token_kinds("var x: int\nvar y: real\n");
    let x = string_table.intern("x");
    let int = string_table.intern("int");

    assert_eq!(
        &kinds[..5],
        &[
            TokenKind::Var,
            TokenKind::Ident(x),
            TokenKind::Colon,
            TokenKind::Ident(int),
            TokenKind::Semicolon,
        ]
    );
    assert_eq!(kinds.last(), Some(&TokenKind::Eof));
    assert_eq!(kinds[kinds.len() - 2], TokenKind::Semicolon);
}

#[test]
fn newline_after_an_operator_does_not_end_the_statement() {
    let (kinds, _) = token_kinds("const a = 1 +\n 2");
    assert!(!kinds[..6].contains(&TokenKind::Semicolon));
    assert_eq!(kinds[4], TokenKind::Add);
    assert_eq!(kinds[5], TokenKind::IntLiteral(2));
}

#[test]
fn compound_operators_are_single_tokens() {
    let (kinds, _) = token_kinds("a := b == c != d <= e >= f && g || h");
    assert!(kinds.contains(&TokenKind::ColonAssign));
    assert!(kinds.contains(&TokenKind::Equal));
    assert!(kinds.contains(&TokenKind::NotEqual));
    assert!(kinds.contains(&TokenKind::LessThanOrEqual));
    assert!(kinds.contains(&TokenKind::GreaterThanOrEqual));
    assert!(kinds.contains(&TokenKind::And));
    assert!(kinds.contains(&TokenKind::Or));
}

#[test]
fn numbers_chars_and_strings() {
    let (kinds, string_table) = token_kinds("0x1F 42 3.5 2e3 'a' '\\n' \"hi\\t\"");

    assert_eq!(kinds[0], TokenKind::IntLiteral(31));
    assert_eq!(kinds[1], TokenKind::IntLiteral(42));
    assert_eq!(kinds[2], TokenKind::RealLiteral(3.5));
    assert_eq!(kinds[3], TokenKind::RealLiteral(2000.0));
    assert_eq!(kinds[4], TokenKind::CharLiteral('a'));
    assert_eq!(kinds[5], TokenKind::CharLiteral('\n'));

    let TokenKind::StringLiteral(id) = kinds[6] else {
        panic!("expected a string literal, found {:?}", kinds[6]);
    };
    assert_eq!(string_table.resolve(id), "hi\t");
}

#[test]
fn comments_are_skipped_but_still_end_statements() {
    let (kinds, _) = token_kinds("x // trailing comment\ny /* block\n comment */ z");

    let semicolons = kinds
        .iter()
        .filter(|kind| **kind == TokenKind::Semicolon)
        .count();

    // After x, after y (the block comment spans a newline) and after z at EOF
    assert_eq!(semicolons, 3);
}

#[test]
fn keywords_are_not_identifiers() {
    let (kinds, _) = token_kinds("import type const var fn struct interface str return");
    assert_eq!(
        &kinds[..9],
        &[
            TokenKind::Import,
            TokenKind::Type,
            TokenKind::Const,
            TokenKind::Var,
            TokenKind::Fn,
            TokenKind::Struct,
            TokenKind::Interface,
            TokenKind::Str,
            TokenKind::Return,
        ]
    );
}

#[test]
fn unterminated_string_is_a_syntax_error() {
    let mut string_table = StringTable::new();
    let result = tokenize("\"open", &PathBuf::from("test.um"), &mut string_table);

    let error = result.expect_err("unterminated string should fail");
    assert_eq!(
        error.error_type,
        crate::compiler_frontend::compiler_errors::ErrorType::Syntax
    );
}

#[test]
fn single_ampersand_is_rejected() {
    let mut string_table = StringTable::new();
    assert!(tokenize("a & b", &PathBuf::from("test.um"), &mut string_table).is_err());
}

#[test]
fn dot_without_digits_is_not_part_of_a_number() {
    let (kinds, _) = token_kinds("1.x");
    assert_eq!(kinds[0], TokenKind::IntLiteral(1));
    assert_eq!(kinds[1], TokenKind::Dot);
}
