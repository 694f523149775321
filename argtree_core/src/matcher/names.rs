use crate::matcher::{valid_first_char, valid_name};
use crate::parser::ConfigError;

/// The names of a parameter, as declared by `"-i,--int,INT"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Names {
    pub(crate) shorts: Vec<char>,
    pub(crate) longs: Vec<String>,
    pub(crate) positional: Option<String>,
}

impl Names {
    pub(crate) fn parse(declaration: &str) -> Result<Self, ConfigError> {
        let mut names = Names::default();

        for part in declaration.split(',').map(str::trim) {
            if part.is_empty() {
                continue;
            } else if part == "-" || part == "--" {
                return Err(ConfigError::BadName {
                    name: part.to_string(),
                    reason: "must not be only dashes",
                });
            } else if let Some(long) = part.strip_prefix("--") {
                if !valid_name(long) {
                    return Err(ConfigError::BadName {
                        name: part.to_string(),
                        reason: "not a valid long name",
                    });
                }

                names.longs.push(long.to_string());
            } else if let Some(short) = part.strip_prefix('-') {
                let mut chars = short.chars();

                match (chars.next(), chars.next()) {
                    (Some(single), None) if valid_first_char(single) => {
                        names.shorts.push(single);
                    }
                    _ => {
                        return Err(ConfigError::BadName {
                            name: part.to_string(),
                            reason: "a short name must be precisely one valid character",
                        });
                    }
                }
            } else {
                if part.chars().any(char::is_whitespace) {
                    return Err(ConfigError::BadName {
                        name: part.to_string(),
                        reason: "a positional name must not contain whitespace",
                    });
                }

                if names.positional.replace(part.to_string()).is_some() {
                    return Err(ConfigError::BadName {
                        name: part.to_string(),
                        reason: "only one positional name may be declared",
                    });
                }
            }
        }

        if names.is_empty() {
            return Err(ConfigError::BadName {
                name: declaration.to_string(),
                reason: "no names declared",
            });
        }

        Ok(names)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.shorts.is_empty() && self.longs.is_empty() && self.positional.is_none()
    }

    pub(crate) fn is_positional(&self) -> bool {
        self.positional.is_some()
    }

    /// The most descriptive single name: the first long name, then short, then positional.
    pub(crate) fn display(&self) -> String {
        if let Some(long) = self.longs.first() {
            format!("--{long}")
        } else if let Some(short) = self.shorts.first() {
            format!("-{short}")
        } else {
            self.positional.clone().unwrap_or_default()
        }
    }
}
