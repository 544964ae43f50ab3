//! Lexer
//!
//!     The first pass over a source file is a vanilla logos lexer. It does not know anything about
//!     comments, strings or languages: it only cuts the text at the characters that can start or
//!     end one (slashes, stars, quotes, hashes, backslashes and newlines) and lumps everything else
//!     into `Text` runs. Every byte of the input lands in exactly one token, which is what lets the
//!     scanner rebuild the file byte for byte.
//!
//!     Multi-character markers are separate tokens so the longest match wins: `///<` beats `///`,
//!     which beats `//`. Anything that needs context (`////` banners, `/**/`, quotes inside
//!     strings) is left to [crate::scanning].

use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    #[token("///<")]
    #[token("//!<")]
    MemberLineDoc,

    #[token("///")]
    #[token("//!")]
    LineDoc,

    #[token("/**<")]
    #[token("/*!<")]
    MemberBlockDoc,

    #[token("/**")]
    #[token("/*!")]
    BlockDoc,

    #[token("//")]
    LineComment,

    #[token("/*")]
    BlockComment,

    #[token("*/")]
    BlockEnd,

    #[token("##")]
    HashDoc,

    #[token("#")]
    Hash,

    #[token("\"\"\"")]
    #[token("'''")]
    TripleQuote,

    #[token("\"")]
    DoubleQuote,

    #[token("'")]
    SingleQuote,

    #[token("\\")]
    Backslash,

    #[token("\n")]
    Newline,

    #[token("/")]
    Slash,

    #[token("*")]
    Star,

    #[regex(r#"[^/*"'\\\n#]+"#)]
    Text,
}

/// Tokenize a source string, keeping the byte span of every token
pub fn tokenize(source: &str) -> Vec<(Token, Range<usize>)> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        // The token set covers every byte, but never drop input if logos disagrees
        tokens.push((result.unwrap_or(Token::Text), lexer.span()));
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_line_doc_markers() {
        assert_eq!(kinds("/// a"), vec![Token::LineDoc, Token::Text]);
        assert_eq!(kinds("//!< a"), vec![Token::MemberLineDoc, Token::Text]);
        assert_eq!(kinds("// a"), vec![Token::LineComment, Token::Text]);
    }

    #[test]
    fn test_banner_is_doc_then_slash() {
        assert_eq!(
            kinds("////"),
            vec![Token::LineDoc, Token::Slash]
        );
        assert_eq!(kinds("/**/"), vec![Token::BlockDoc, Token::Slash]);
    }

    #[test]
    fn test_block_markers() {
        assert_eq!(
            kinds("/** x */"),
            vec![Token::BlockDoc, Token::Text, Token::BlockEnd]
        );
        assert_eq!(
            kinds("/*!< x */"),
            vec![Token::MemberBlockDoc, Token::Text, Token::BlockEnd]
        );
        assert_eq!(
            kinds("/* x */"),
            vec![Token::BlockComment, Token::Text, Token::BlockEnd]
        );
    }

    #[test]
    fn test_quotes_and_hashes() {
        assert_eq!(
            kinds(r#""a\"b""#),
            vec![
                Token::DoubleQuote,
                Token::Text,
                Token::Backslash,
                Token::DoubleQuote,
                Token::Text,
                Token::DoubleQuote
            ]
        );
        assert_eq!(kinds("## x"), vec![Token::HashDoc, Token::Text]);
        assert_eq!(kinds("'''"), vec![Token::TripleQuote]);
    }

    #[test]
    fn test_spans_cover_input() {
        let source = "int a; /// doc ü\n/* c */ \"s\" # x\n";
        let tokens = tokenize(source);
        let mut expected_start = 0;
        for (_, span) in &tokens {
            assert_eq!(span.start, expected_start);
            expected_start = span.end;
        }
        assert_eq!(expected_start, source.len());
    }
}
