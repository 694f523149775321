//! Traits which, typically, may be imported without concern: `use argtree::prelude::*`.

/// Behaviour for multiple (0 to many) items T to be collected together.
// Needs to be imported in order to implement a custom `Collectable`.
pub trait Collectable<T> {
    /// Add a value to this `Collectable`.
    fn add(&mut self, item: T);
}

/// Behaviour to check (and possibly rewrite) a raw value before it is converted.
///
/// Return `Err` with a diagnostic to reject the value.
/// Closures of the shape `Fn(&mut String) -> Result<(), String>` implement this trait.
pub trait Validator {
    /// Validate the raw value, rewriting it in place if desired.
    fn validate(&self, value: &mut String) -> Result<(), String>;
}

impl<F> Validator for F
where
    F: Fn(&mut String) -> Result<(), String>,
{
    fn validate(&self, value: &mut String) -> Result<(), String> {
        self(value)
    }
}

/// Behaviour for rendering the help message of a command.
pub use crate::parser::Formatter;

/// Behaviour for reading and writing configuration files.
pub use crate::config::ConfigFormat;
