#[cfg(test)]
mod scanner_tests {
    use rox::error::LoxError;
    use rox::scanner::*;
    use rox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source.as_bytes());
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_keywords_and_operators() {
        assert_token_sequence(
            "class Foo < Bar { init() { this.x = super.y; } } a <= b != c",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "Foo"),
                (TokenType::LESS, "<"),
                (TokenType::IDENTIFIER, "Bar"),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::IDENTIFIER, "init"),
                (TokenType::LEFT_PAREN, "("),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::THIS, "this"),
                (TokenType::DOT, "."),
                (TokenType::IDENTIFIER, "x"),
                (TokenType::EQUAL, "="),
                (TokenType::SUPER, "super"),
                (TokenType::DOT, "."),
                (TokenType::IDENTIFIER, "y"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::IDENTIFIER, "a"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::IDENTIFIER, "b"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::IDENTIFIER, "c"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_literals_and_lines() {
        let tokens: Vec<Token> = Scanner::new(b"12.5 \"hi\"\n// comment\nfoo.")
            .filter_map(Result::ok)
            .collect();

        assert!(matches!(tokens[0].token_type, TokenType::NUMBER(n) if n == 12.5));
        assert!(matches!(&tokens[1].token_type, TokenType::STRING(s) if s == "hi"));
        assert_eq!(tokens[2].lexeme, "foo");
        assert_eq!(tokens[2].line, 3);
        assert_eq!(tokens[3].token_type, TokenType::DOT);
        assert_eq!(tokens.last().map(|t| t.token_type.clone()), Some(TokenType::EOF));
    }

    #[test]
    fn test_token_display() {
        let tokens: Vec<Token> = Scanner::new(b"42 \"s\" x")
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens[0].to_string(), "NUMBER 42 42.0");
        assert_eq!(tokens[1].to_string(), "STRING \"s\" s");
        assert_eq!(tokens[2].to_string(), "IDENTIFIER x null");
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let scanner = Scanner::new(source.as_bytes());

        let results: Vec<_> = scanner.collect();

        // COMMA, DOT, error '$', LEFT_PAREN, error '#', EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.to_string())
            .collect();

        assert_eq!(
            errors,
            vec![
                "[line 1] Error: Unexpected character: $".to_string(),
                "[line 1] Error: Unexpected character: #".to_string(),
            ]
        );

        fn assert_token_matches(
            result: &Result<Token, LoxError>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(token.token_type, expected_type);
                    assert_eq!(token.lexeme, expected_lexeme);
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }

    #[test]
    fn test_unterminated_string_is_reported() {
        let mut errors: Vec<String> = Vec::new();
        let (tokens, had_error) = scan_tokens(b"\"open\n", &mut errors);

        assert!(had_error);
        assert_eq!(errors, vec!["[line 2] Error: Unterminated string."]);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::EOF);
    }

    #[test]
    fn test_scanner_04_edges_at_end_of_input() {
        let mut scanner = Scanner::new(b"1. <= !\n// no newline after this");
        let kinds: Vec<TokenType> = scanner
            .by_ref()
            .map(|t| t.expect("no lexical errors").token_type)
            .collect();

        assert_eq!(
            kinds,
            vec![
                TokenType::NUMBER(1.0),
                TokenType::DOT,
                TokenType::LESS_EQUAL,
                TokenType::BANG,
                TokenType::EOF,
            ]
        );
        assert!(scanner.next().is_none());
    }
}
