//! Fixed vocabulary of the Raven language: reserved words and operators

pub mod keywords;
pub mod operators;

pub use keywords::{init_keyword_table, is_reserved_keyword, Keyword};
pub use operators::match_operator;
