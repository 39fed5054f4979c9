//! Operator and punctuation matching
//!
//! Candidates are grouped by their first character and kept longest-first,
//! so the first candidate that prefixes the input is the maximal munch.
use crate::tokens::TokenKind;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Every fixed-spelling, non-keyword kind the scanner matches by prefix
const OPERATOR_KINDS: [TokenKind; 45] = [
    TokenKind::Assignment,
    TokenKind::AssignmentAdd,
    TokenKind::AssignmentSubtract,
    TokenKind::AssignmentMultiply,
    TokenKind::AssignmentDivide,
    TokenKind::AssignmentModulo,
    TokenKind::AssignmentBitOr,
    TokenKind::AssignmentBitAnd,
    TokenKind::AssignmentBitShiftLeft,
    TokenKind::AssignmentBitShiftRight,
    TokenKind::LeftParenthesis,
    TokenKind::RightParenthesis,
    TokenKind::LeftSquareBrace,
    TokenKind::RightSquareBrace,
    TokenKind::LeftCurlyBrace,
    TokenKind::RightCurlyBrace,
    TokenKind::Dot,
    TokenKind::Comma,
    TokenKind::Colon,
    TokenKind::BitXor,
    TokenKind::BitAnd,
    TokenKind::BitShiftLeft,
    TokenKind::BitShiftRight,
    TokenKind::LogicalOr,
    TokenKind::LogicalAnd,
    TokenKind::LogicalNot,
    TokenKind::Equal,
    TokenKind::NotEqual,
    TokenKind::EqualLessThan,
    TokenKind::EqualGreaterThan,
    TokenKind::LessThan,
    TokenKind::GreaterThan,
    TokenKind::ApproxEqual,
    TokenKind::ApproxNotEqual,
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Star,
    TokenKind::Percent,
    TokenKind::Exponent,
    TokenKind::Slash,
    TokenKind::Pipe,
    TokenKind::Tilde,
    TokenKind::Range,
    TokenKind::AssignmentBitXor,
    TokenKind::Semicolon,
];

type OperatorTable = HashMap<char, Vec<(&'static str, TokenKind)>>;

static OPERATOR_TABLE: OnceLock<OperatorTable> = OnceLock::new();

fn operator_table() -> &'static OperatorTable {
    OPERATOR_TABLE.get_or_init(|| {
        let mut table: OperatorTable = HashMap::new();
        for kind in OPERATOR_KINDS {
            if let Some(spelling) = kind.lexeme() {
                if let Some(first) = spelling.chars().next() {
                    table.entry(first).or_default().push((spelling, kind));
                }
            }
        }
        for candidates in table.values_mut() {
            candidates.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        }
        table
    })
}

/// Longest operator spelled at the start of `input`, with its byte length
pub fn match_operator(input: &str) -> Option<(TokenKind, usize)> {
    let first = input.chars().next()?;
    operator_table()
        .get(&first)?
        .iter()
        .find(|(spelling, _)| input.starts_with(spelling))
        .map(|(spelling, kind)| (*kind, spelling.len()))
}

pub fn operator_kinds() -> &'static [TokenKind] {
    &OPERATOR_KINDS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenCategory;

    fn kind_of(input: &str) -> Option<TokenKind> {
        match_operator(input).map(|(kind, _)| kind)
    }

    #[test]
    fn test_maximal_munch() {
        assert_eq!(match_operator("<<= 1"), Some((TokenKind::AssignmentBitShiftLeft, 3)));
        assert_eq!(match_operator("<<1"), Some((TokenKind::BitShiftLeft, 2)));
        assert_eq!(match_operator("<1"), Some((TokenKind::LessThan, 1)));
        assert_eq!(match_operator("!~=x"), Some((TokenKind::ApproxNotEqual, 3)));
        assert_eq!(kind_of("!~x"), Some(TokenKind::LogicalNot));
        assert_eq!(kind_of("**="), Some(TokenKind::Exponent));
        assert_eq!(kind_of("*="), Some(TokenKind::AssignmentMultiply));
        assert_eq!(kind_of("^="), Some(TokenKind::AssignmentBitXor));
    }

    #[test]
    fn test_dots() {
        assert_eq!(match_operator("..."), Some((TokenKind::Range, 3)));
        assert_eq!(match_operator(".."), Some((TokenKind::Dot, 1)));
        assert_eq!(match_operator(".x"), Some((TokenKind::Dot, 1)));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(match_operator(""), None);
        assert_eq!(match_operator("@"), None);
        assert_eq!(match_operator("a+"), None);
        assert_eq!(match_operator("$x"), None);
        assert_eq!(match_operator(";"), Some((TokenKind::Semicolon, 1)));
    }

    #[test]
    fn test_table_covers_every_fixed_kind() {
        for kind in TokenKind::core_kinds() {
            let fixed = kind.lexeme().is_some() && kind.category() != TokenCategory::Keyword;
            assert_eq!(operator_kinds().contains(kind), fixed, "{}", kind);
            if let Some(spelling) = kind.lexeme().filter(|_| fixed) {
                assert_eq!(match_operator(spelling), Some((*kind, spelling.len())));
                assert!(spelling.len() <= 3, "{}", spelling);
            }
        }
    }
}
