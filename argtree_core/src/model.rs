/// The cardinality of inputs to match for a single invocation of a parameter.
///
/// Inspired by argparse: <https://docs.python.org/3/library/argparse.html#nargs>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nargs {
    /// `N`: Precisely `N` values.
    /// `Precisely(0)` is a flag.
    Precisely(u8),
    /// `*`: May be any number of values, including `0`.
    Any,
    /// `+`: At least one value must be specified.
    AtLeastOne,
}

impl Nargs {
    /// Whether this is a flag (no values consumed).
    pub fn is_flag(&self) -> bool {
        matches!(self, Nargs::Precisely(0))
    }

    /// Whether values are consumed greedily.
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Nargs::Any | Nargs::AtLeastOne)
    }

    /// The number of values the parameter can hold before it is considered full.
    /// `None` when unlimited.
    pub fn capacity(&self) -> Option<usize> {
        match self {
            Nargs::Precisely(n) => Some(*n as usize),
            Nargs::Any | Nargs::AtLeastOne => None,
        }
    }

    /// The least number of values an invoked parameter must hold.
    pub fn minimum(&self) -> usize {
        match self {
            Nargs::Precisely(n) => *n as usize,
            Nargs::Any => 0,
            Nargs::AtLeastOne => 1,
        }
    }
}

impl std::fmt::Display for Nargs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// How repeated invocations of a non-vector parameter are reduced before conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultiOptionPolicy {
    /// Reject more values than the parameter holds.
    #[default]
    Throw,
    /// Keep the values of the final invocation(s).
    TakeLast,
    /// Keep the values of the first invocation(s).
    TakeFirst,
    /// Join every value into one, separated by newlines.
    Join,
}

/// Handle to a command scope (the root program, or a sub-command).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(pub(crate) usize);

/// Handle to a registered parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParameterId(pub(crate) usize);

/// The successful outcome of a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parsed {
    /// All tokens were matched, validated and captured.
    Complete,
    /// A help flag was invoked on the given command.
    /// Nothing was validated or captured.
    Help(CommandId),
}
