//! Ready made [`Validator`]s, for use with [`Parameter::check`](crate::Parameter::check).
//!
//! ### Example
//! ```
//! # use argtree_core as argtree;
//! use argtree::validators::Range;
//! use argtree::{CommandLineParser, Parameter, Scalar};
//!
//! let mut level: u8 = 0;
//! let mut parser = CommandLineParser::new("program");
//! parser
//!     .add(Parameter::option(Scalar::new(&mut level), "--level").check(Range::new(1, 5)))
//!     .unwrap();
//!
//! let error = parser.parse_tokens(&["--level", "9"]).unwrap_err();
//! assert_eq!(error.to_string(), "Parse error: --level: Value 9 not in range 1 to 5");
//! ```
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use crate::prelude::Validator;

/// Accepts paths to existing files (not directories).
#[derive(Debug, Default, Clone, Copy)]
pub struct ExistingFile;

impl Validator for ExistingFile {
    fn validate(&self, value: &mut String) -> Result<(), String> {
        let path = Path::new(value.as_str());

        if !path.exists() {
            Err(format!("File does not exist: {value}"))
        } else if path.is_dir() {
            Err(format!("File is actually a directory: {value}"))
        } else {
            Ok(())
        }
    }
}

/// Accepts paths to existing directories.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExistingDirectory;

impl Validator for ExistingDirectory {
    fn validate(&self, value: &mut String) -> Result<(), String> {
        let path = Path::new(value.as_str());

        if !path.exists() {
            Err(format!("Directory does not exist: {value}"))
        } else if !path.is_dir() {
            Err(format!("Directory is actually a file: {value}"))
        } else {
            Ok(())
        }
    }
}

/// Accepts any existing path.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExistingPath;

impl Validator for ExistingPath {
    fn validate(&self, value: &mut String) -> Result<(), String> {
        if Path::new(value.as_str()).exists() {
            Ok(())
        } else {
            Err(format!("Path does not exist: {value}"))
        }
    }
}

/// Accepts paths which do not exist yet.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonexistentPath;

impl Validator for NonexistentPath {
    fn validate(&self, value: &mut String) -> Result<(), String> {
        if Path::new(value.as_str()).exists() {
            Err(format!("Path already exists: {value}"))
        } else {
            Ok(())
        }
    }
}

/// Accepts values within `min..=max`.
/// Values which do not convert to `T` are left for the conversion to reject.
#[derive(Debug, Clone)]
pub struct Range<T> {
    min: T,
    max: T,
}

impl<T> Range<T> {
    /// Create an inclusive range validator.
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T> Validator for Range<T>
where
    T: FromStr + PartialOrd + Display,
{
    fn validate(&self, value: &mut String) -> Result<(), String> {
        match T::from_str(value) {
            Ok(v) if v < self.min || v > self.max => Err(format!(
                "Value {value} not in range {} to {}",
                self.min, self.max
            )),
            _ => Ok(()),
        }
    }
}

/// Accepts one of a fixed set of values, rewriting the value to the member as declared.
#[derive(Debug, Clone)]
pub struct IsMember {
    members: Vec<String>,
    ignore_case: bool,
}

impl IsMember {
    /// Create a membership validator.
    pub fn new<S: Into<String>>(members: impl IntoIterator<Item = S>) -> Self {
        Self {
            members: members.into_iter().map(Into::into).collect(),
            ignore_case: false,
        }
    }

    /// Match members regardless of case.
    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }
}

impl Validator for IsMember {
    fn validate(&self, value: &mut String) -> Result<(), String> {
        let found = self.members.iter().find(|member| {
            if self.ignore_case {
                member.to_lowercase() == value.to_lowercase()
            } else {
                member.as_str() == value.as_str()
            }
        });

        match found {
            Some(member) => {
                *value = member.clone();
                Ok(())
            }
            None => Err(format!("{value} not in {{{}}}", self.members.join(","))),
        }
    }
}
