//! Reserved words of the Raven language
//!
//! The keyword table is built once, on first use, and is read-only after
//! that. Lookups are exact and case-sensitive: `Return` is a plain word.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Keyword {
    Var,
    Const,
    Return,
    If,
    Else,
    While,
    Do,
    For,
    Break,
    Continue,
    Switch,
    Case,
    Use,
    Function,
    Class,
    Private,
    Public,
    Object,
}

impl Keyword {
    /// Every keyword, in token-table order
    pub const ALL: [Keyword; 18] = [
        Self::Var,
        Self::Const,
        Self::Return,
        Self::If,
        Self::Else,
        Self::While,
        Self::Do,
        Self::For,
        Self::Break,
        Self::Continue,
        Self::Switch,
        Self::Case,
        Self::Use,
        Self::Function,
        Self::Class,
        Self::Private,
        Self::Public,
        Self::Object,
    ];

    /// Spelling as it appears in source
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::Const => "const",
            Self::Return => "return",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::Do => "do",
            Self::For => "for",
            Self::Break => "break",
            Self::Continue => "continue",
            Self::Switch => "switch",
            Self::Case => "case",
            Self::Use => "use",
            Self::Function => "function",
            Self::Class => "class",
            Self::Private => "private",
            Self::Public => "public",
            Self::Object => "object",
        }
    }

    /// Token-kind name (`k_return`)
    pub const fn token_name(self) -> &'static str {
        match self {
            Self::Var => "k_var",
            Self::Const => "k_const",
            Self::Return => "k_return",
            Self::If => "k_if",
            Self::Else => "k_else",
            Self::While => "k_while",
            Self::Do => "k_do",
            Self::For => "k_for",
            Self::Break => "k_break",
            Self::Continue => "k_continue",
            Self::Switch => "k_switch",
            Self::Case => "k_case",
            Self::Use => "k_use",
            Self::Function => "k_function",
            Self::Class => "k_class",
            Self::Private => "k_private",
            Self::Public => "k_public",
            Self::Object => "k_object",
        }
    }

    /// Position in `ALL`
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Exact-match lookup in the keyword table
    pub fn lookup(spelling: &str) -> Option<Self> {
        keyword_table().get(spelling).copied()
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

static KEYWORD_TABLE: OnceLock<HashMap<&'static str, Keyword>> = OnceLock::new();

/// Process-wide keyword table, safe for concurrent reads from any scan
pub fn keyword_table() -> &'static HashMap<&'static str, Keyword> {
    KEYWORD_TABLE.get_or_init(|| Keyword::ALL.iter().map(|k| (k.as_str(), *k)).collect())
}

/// Force construction before the first scan (e.g. ahead of spawning workers)
pub fn init_keyword_table() -> usize {
    keyword_table().len()
}

pub fn is_reserved_keyword(s: &str) -> bool {
    Keyword::lookup(s).is_some()
}

pub fn reserved_keywords() -> impl Iterator<Item = &'static str> {
    Keyword::ALL.iter().map(|k| k.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_keyword_round_trips() {
        for keyword in Keyword::ALL {
            assert_eq!(Keyword::lookup(keyword.as_str()), Some(keyword));
            assert_eq!(keyword.token_name(), format!("k_{}", keyword.as_str()));
        }
        assert_eq!(init_keyword_table(), Keyword::ALL.len());
    }

    #[test]
    fn test_lookup_is_exact() {
        assert_eq!(Keyword::lookup("return"), Some(Keyword::Return));
        assert_eq!(Keyword::lookup("returning"), None);
        assert_eq!(Keyword::lookup("Return"), None);
        assert_eq!(Keyword::lookup("retur"), None);
        assert!(!is_reserved_keyword(""));
    }

    #[test]
    fn test_all_is_in_declaration_order() {
        for (index, keyword) in Keyword::ALL.iter().enumerate() {
            assert_eq!(keyword.index(), index);
        }
    }

    #[test]
    fn test_concurrent_reads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| reserved_keywords().all(is_reserved_keyword)))
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
