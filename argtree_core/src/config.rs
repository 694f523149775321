use std::fs;

use crate::constant::DEFAULT_SECTION;
use crate::parser::ParseError;

/// A single value-carrying entry read from (or written to) a configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigItem {
    /// The sub-command names leading to the parameter, outermost first.
    pub parents: Vec<String>,
    /// The parameter name (ex: `count`, `-c`, or `INPUT`).
    pub name: String,
    /// The raw values, in order.
    pub inputs: Vec<String>,
}

impl ConfigItem {
    /// Create a configuration item.
    pub fn new(parents: Vec<String>, name: impl Into<String>, inputs: Vec<String>) -> Self {
        Self {
            parents,
            name: name.into(),
            inputs,
        }
    }

    /// The dotted name: parents followed by the name.
    pub fn fullname(&self) -> String {
        let mut parts = self.parents.clone();
        parts.push(self.name.clone());
        parts.join(".")
    }
}

/// Behaviour to translate between configuration text and [`ConfigItem`]s.
///
/// ### Example
/// ```
/// # use argtree_core as argtree;
/// use argtree::prelude::*;
/// use argtree::ConfigItem;
///
/// struct Lines;
///
/// impl ConfigFormat for Lines {
///     fn from_config(&self, text: &str) -> Vec<ConfigItem> {
///         text.lines()
///             .filter_map(|line| line.split_once(':'))
///             .map(|(name, value)| ConfigItem::new(vec![], name.trim(), vec![value.trim().to_string()]))
///             .collect()
///     }
///
///     fn to_config(&self, items: &[ConfigItem]) -> String {
///         items.iter().map(|item| format!("{}: {}\n", item.name, item.inputs.join(" "))).collect()
///     }
/// }
///
/// let items = Lines.from_config("count: 3\n");
/// assert_eq!(items, vec![ConfigItem::new(vec![], "count", vec!["3".to_string()])]);
/// ```
pub trait ConfigFormat {
    /// Parse the configuration text into items.
    fn from_config(&self, text: &str) -> Vec<ConfigItem>;

    /// Render the items as configuration text.
    fn to_config(&self, items: &[ConfigItem]) -> String;

    /// Read and parse the configuration file at `path`.
    fn from_file(&self, path: &str) -> Result<Vec<ConfigItem>, ParseError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(self.from_config(&text)),
            Err(_) => Err(ParseError::FileMissing(path.to_string())),
        }
    }
}

/// The INI style configuration format.
///
/// * `[section]` headers name the sub-command (dotted for nested sub-commands; `[default]` is the root).
/// * `name = value`, where multiple values are separated by whitespace (or written as `[a, b]`) and may be quoted.
/// * A bare `name` switches a flag on.
/// * Lines starting with `;` or `#` are comments.
#[derive(Debug, Default)]
pub struct IniConfig {}

impl ConfigFormat for IniConfig {
    fn from_config(&self, text: &str) -> Vec<ConfigItem> {
        let mut section: Vec<String> = Vec::default();
        let mut items = Vec::default();

        for line in text.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let header = header.trim();
                section = if header.is_empty() || header.eq_ignore_ascii_case(DEFAULT_SECTION) {
                    Vec::default()
                } else {
                    header.split('.').map(|s| s.trim().to_string()).collect()
                };
                continue;
            }

            let (name, inputs) = match line.split_once('=') {
                Some((name, value)) => (name.trim(), split_values(value.trim())),
                None => (line, vec!["ON".to_string()]),
            };

            let mut parents = section.clone();
            let mut parts: Vec<&str> = name.split('.').collect();
            let name = parts.pop().unwrap_or_default();
            parents.extend(parts.into_iter().map(String::from));
            items.push(ConfigItem::new(parents, name, inputs));
        }

        items
    }

    fn to_config(&self, items: &[ConfigItem]) -> String {
        let mut sections: Vec<(&[String], Vec<&ConfigItem>)> = Vec::default();

        for item in items {
            match sections.iter_mut().find(|(p, _)| *p == item.parents.as_slice()) {
                Some((_, grouped)) => grouped.push(item),
                None => sections.push((&item.parents, vec![item])),
            }
        }

        // The root items must precede any section header.
        sections.sort_by_key(|(parents, _)| !parents.is_empty());
        let mut out = String::default();

        for (parents, grouped) in sections {
            if !parents.is_empty() {
                if !out.is_empty() {
                    out.push('\n');
                }

                out.push_str(&format!("[{}]\n", parents.join(".")));
            }

            for item in grouped {
                let values: Vec<String> = item.inputs.iter().map(|v| quote(v)).collect();
                out.push_str(&format!("{} = {}\n", item.name, values.join(" ")));
            }
        }

        out
    }
}

fn split_values(value: &str) -> Vec<String> {
    if let Some(array) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        return array
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .flat_map(split_values)
            .collect();
    }

    let mut values = Vec::default();
    let mut current = String::default();
    let mut quote: Option<char> = None;
    let mut started = false;

    for c in value.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                started = true;
            }
            None if c.is_whitespace() => {
                if started {
                    values.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            None => {
                current.push(c);
                started = true;
            }
        }
    }

    if started {
        values.push(current);
    }

    values
}

fn quote(value: &str) -> String {
    if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c == '\'') {
        format!("\"{value}\"")
    } else if value.contains('"') {
        format!("'{value}'")
    } else {
        value.to_string()
    }
}

/// Interpret a textual flag value as a signed count.
///
/// True words count `1` and false words count `-1`; digits count as themselves.
pub(crate) fn to_flag(value: &str) -> Result<i64, String> {
    let lowered = value.to_lowercase();

    match lowered.as_str() {
        "true" | "t" | "on" | "yes" | "y" | "enable" | "+" => Ok(1),
        "false" | "f" | "off" | "no" | "n" | "disable" | "-" | "0" => Ok(-1),
        _ => lowered
            .parse::<i64>()
            .map_err(|_| format!("'{value}' is not a recognized flag value")),
    }
}
