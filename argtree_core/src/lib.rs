//! Parsing engine for `argtree`.
//! See [documentation root](https://docs.rs/argtree/latest/argtree/index.html) for full details.
#![deny(missing_docs)]
mod api;
mod config;
mod constant;
mod matcher;
mod model;
mod parser;
pub mod prelude;
pub mod validators;

pub use api::*;
pub use config::{ConfigItem, IniConfig};
pub use model::*;
pub use parser::{
    ConfigError, HelpContext, HelpFormatter, LookupError, ParameterSummary, ParseError,
    SubcommandSummary,
};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
