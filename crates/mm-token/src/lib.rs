//! Token model (component C1): lexical fragments carrying source locations,
//! and the `target.property` name grammar built on top of them.
//!
//! The engine never re-parses the Matmakefile; it only consumes [`Tokens`]
//! already produced by a parser (see `mm-parser`) and exposes `groups`,
//! `concat`, and `append` back to it.

mod name;
mod token;

pub use name::NameDescriptor;
pub use token::{Location, Token, Tokens, tokenize_line};
