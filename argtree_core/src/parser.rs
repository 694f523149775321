mod base;
mod consumer;
mod interface;
mod middleware;
mod printer;
mod registry;
mod resolver;
mod scope;
mod validate;

pub use self::base::*;
pub(crate) use self::interface::*;
pub use self::printer::*;
pub(crate) use self::registry::Relation;
pub(crate) use self::scope::*;
