use thiserror::Error;

use crate::api::InvalidCapture;

/// An invalid parser configuration, raised while the command tree is being declared.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The name declaration is not syntactically valid.
    #[error("Config error: Invalid name '{name}': {reason}.")]
    BadName {
        /// The offending name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A name collides with one already registered in the same command.
    #[error("Config error: Cannot duplicate the {kind} '{name}'.")]
    Duplicate {
        /// What kind of name collided (ex: "short option").
        kind: &'static str,
        /// The colliding name.
        name: String,
    },

    /// The parameter settings contradict each other.
    #[error("Config error: {0}")]
    IncorrectConstruction(String),

    /// The same requires/excludes edge was declared twice.
    #[error("Config error: '{dependent}' already {relation} '{dependency}'.")]
    DuplicateEdge {
        /// The parameter declaring the edge.
        dependent: String,
        /// Either "requires" or "excludes".
        relation: &'static str,
        /// The target of the edge.
        dependency: String,
    },

    /// A handle or name does not refer to a registered parameter.
    #[error("Config error: Parameter '{0}' does not exist.")]
    MissingParameter(String),
}

impl ConfigError {
    /// The process exit code classification for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfigError::IncorrectConstruction(_) | ConfigError::MissingParameter(_) => 100,
            ConfigError::BadName { .. } => 101,
            ConfigError::Duplicate { .. } | ConfigError::DuplicateEdge { .. } => 102,
        }
    }
}

/// A failure to parse the command line tokens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The configuration file could not be read.
    #[error("Parse error: '{0}' was not readable (missing?).")]
    FileMissing(String),

    /// A bound value could not be converted into the parameter's type.
    #[error("Parse error: The value '{values}' is not valid for '{name}': {reason}")]
    Conversion {
        /// The parameter.
        name: String,
        /// The joined raw values.
        values: String,
        /// The underlying conversion message.
        reason: String,
    },

    /// A validator rejected a value.
    #[error("Parse error: {name}: {message}")]
    Validation {
        /// The parameter.
        name: String,
        /// The validator's diagnostic.
        message: String,
    },

    /// A required parameter was not provided.
    #[error("Parse error: {0} is required.")]
    Required(String),

    /// The command requires a sub-command, and none was provided.
    #[error("Parse error: A sub-command is required for '{0}'.")]
    RequiredSubcommand(String),

    /// The parameter was provided without its dependency.
    #[error("Parse error: {name} requires {dependency}.")]
    Requires {
        /// The invoked parameter.
        name: String,
        /// The missing dependency.
        dependency: String,
    },

    /// The parameter was provided alongside an excluded parameter.
    #[error("Parse error: {name} excludes {excluded}.")]
    Excludes {
        /// The invoked parameter.
        name: String,
        /// The excluded, yet present, parameter.
        excluded: String,
    },

    /// Unknown options were provided.
    #[error("Parse error: The following {} not expected: {}", plural(.0), .0.join(" "))]
    Extras(Vec<String>),

    /// More positional values were provided than the command can hold.
    #[error("Parse error: Too many positional arguments: {}", .0.join(" "))]
    PositionalOverflow(Vec<String>),

    /// A configuration file item does not match any parameter.
    #[error("Parse error: The configuration item '{0}' does not match any parameter.")]
    ConfigExtras(String),

    /// A configuration file item targets a parameter that does not accept configuration.
    #[error("Parse error: '{0}' cannot be set from a configuration file.")]
    NotConfigurable(String),

    /// The number of values does not match the parameter's cardinality.
    #[error("Parse error: Expected {expected} value(s) for {name}, got {received}.")]
    ArgumentMismatch {
        /// The parameter.
        name: String,
        /// Human readable expectation (ex: "exactly 2", "at least 1").
        expected: String,
        /// The number of values received.
        received: usize,
    },

    /// The parser disagreed with itself; this should never happen.
    #[error("Parse error: Internal failure (this should never happen): {0}")]
    Horrible(String),
}

fn plural(values: &[String]) -> &'static str {
    if values.len() > 1 {
        "arguments were"
    } else {
        "argument was"
    }
}

impl ParseError {
    /// The process exit code classification for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ParseError::FileMissing(_) => 103,
            ParseError::Conversion { .. } => 104,
            ParseError::Validation { .. } => 105,
            ParseError::Required(_) | ParseError::RequiredSubcommand(_) => 106,
            ParseError::Requires { .. } => 107,
            ParseError::Excludes { .. } => 108,
            ParseError::Extras(_) | ParseError::PositionalOverflow(_) => 109,
            ParseError::ConfigExtras(_) | ParseError::NotConfigurable(_) => 110,
            ParseError::Horrible(_) => 112,
            ParseError::ArgumentMismatch { .. } => 114,
        }
    }

    /// Whether the usage hint should accompany this error when shown to a user.
    pub fn show_usage(&self) -> bool {
        !matches!(
            self,
            ParseError::FileMissing(_)
                | ParseError::ConfigExtras(_)
                | ParseError::NotConfigurable(_)
                | ParseError::Horrible(_)
        )
    }

    pub(crate) fn conversion(name: String, values: &[String], error: InvalidCapture) -> Self {
        ParseError::Conversion {
            name,
            values: values.join(" "),
            reason: error.to_string(),
        }
    }
}

/// A post-parse lookup of a parameter name which was never registered.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    /// No parameter answers to the name.
    #[error("Lookup error: {0} not found.")]
    ParameterNotFound(String),
}

impl LookupError {
    /// The process exit code classification for this error.
    pub fn exit_code(&self) -> i32 {
        113
    }
}

/// Behaviour to capture an implicit generic type T from an input `&str`.
///
/// We use this at the middle/top of the parser object graph so that different types may all be 'captured' in a single command tree.
pub(crate) trait AnonymousCapturable {
    /// Declare that the parameter has been matched (once per invocation for flags, once overall otherwise).
    fn matched(&mut self);

    /// Declare the summed count of a flag's invocations.
    fn flagged(&mut self, count: i64);

    /// Capture a value anonymously for this parameter.
    fn capture(&mut self, value: &str) -> Result<(), InvalidCapture>;
}

/// Captures nothing; the raw values remain available through the parser's queries.
#[derive(Default)]
pub(crate) struct Unbound {}

impl AnonymousCapturable for Unbound {
    fn matched(&mut self) {
        // Do nothing
    }

    fn flagged(&mut self, _count: i64) {
        // Do nothing
    }

    fn capture(&mut self, _value: &str) -> Result<(), InvalidCapture> {
        // Do nothing
        Ok(())
    }
}
