//! Parser module for cfglang.

mod core;
mod declarations;
mod expressions;
mod statements;
mod types;

#[cfg(test)]
mod tests;

pub use self::core::{ParseResult, Parser};
