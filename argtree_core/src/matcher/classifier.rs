use crate::constant::POSITIONAL_MARK;

/// The syntactic category of a raw token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Classification {
    /// The literal `--`.
    PositionalMark,
    /// The name of a sub-command of the current command.
    Subcommand,
    /// `--name` or `--name=value`.
    Long,
    /// `-n`, `-nrest`.
    Short,
    /// A plain value.
    None,
}

/// Whether `c` may start an option name.
/// The excluded characters are reserved for negation markers and syntax.
pub(crate) fn valid_first_char(c: char) -> bool {
    !matches!(c, '-' | '!' | ' ' | '\n' | '=')
}

/// Whether `c` may appear after the first character of a long name.
pub(crate) fn valid_later_char(c: char) -> bool {
    !matches!(c, ' ' | '\t' | '\n' | '=')
}

pub(crate) fn valid_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) => valid_first_char(first) && chars.all(valid_later_char),
        None => false,
    }
}

/// Split `--name=value` into its name and optional inline value.
/// Only the first `=` delimits, so `--k=a=b` gives the value `a=b`.
pub(crate) fn split_long(token: &str) -> Option<(&str, Option<&str>)> {
    let body = token.strip_prefix("--")?;
    let first = body.chars().next()?;

    if !valid_first_char(first) {
        return None;
    }

    Some(match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    })
}

/// Split `-nrest` into the single character name and the (possibly empty) rest.
pub(crate) fn split_short(token: &str) -> Option<(char, &str)> {
    let body = token.strip_prefix('-')?;
    let first = body.chars().next()?;

    if !valid_first_char(first) {
        return None;
    }

    Some((first, &body[first.len_utf8()..]))
}

/// Classify the token without consuming it.
///
/// `is_subcommand` answers whether the token names a selectable sub-command of the current command.
pub(crate) fn classify(token: &str, is_subcommand: impl Fn(&str) -> bool) -> Classification {
    if token == POSITIONAL_MARK {
        Classification::PositionalMark
    } else if is_subcommand(token) {
        Classification::Subcommand
    } else if split_long(token).is_some() {
        Classification::Long
    } else if split_short(token).is_some() {
        Classification::Short
    } else {
        Classification::None
    }
}
