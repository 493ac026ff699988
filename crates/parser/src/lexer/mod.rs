mod core;
mod token;

pub use core::Lexer;
pub use token::{LogosToken, Token, TokenKind};
