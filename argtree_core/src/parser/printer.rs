use terminal_size::{terminal_size, Width};

use crate::model::Nargs;
use crate::parser::CommandTree;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Behaviour for rendering the help message of a command.
///
/// ### Example
/// ```
/// # use argtree_core as argtree;
/// use argtree::prelude::*;
/// use argtree::{CommandLineParser, HelpContext};
///
/// struct Terse;
///
/// impl Formatter for Terse {
///     fn make_help(&self, context: &HelpContext) -> String {
///         format!("{} takes {} option(s)", context.program, context.options.len())
///     }
/// }
///
/// let mut parser = CommandLineParser::new("program");
/// parser.formatter(Terse);
/// assert_eq!(parser.help(parser.root()), "program takes 1 option(s)");
/// ```
pub trait Formatter {
    /// Render the help message.
    fn make_help(&self, context: &HelpContext) -> String;
}

/// Everything a [`Formatter`] may show about a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpContext {
    /// The program followed by the sub-command names (ex: `program start`).
    pub program: String,
    /// The command's description.
    pub about: Option<String>,
    /// Text shown after everything else.
    pub footer: Option<String>,
    /// The dashed parameters, in registration order.
    pub options: Vec<ParameterSummary>,
    /// The positional parameters, in registration order.
    pub arguments: Vec<ParameterSummary>,
    /// The sub-commands, in registration order.
    pub subcommands: Vec<SubcommandSummary>,
}

/// A parameter, as shown in help.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSummary {
    /// The dashed names (ex: `-v`, `--verbose`); empty for positionals.
    pub flags: Vec<String>,
    /// The name used for the value placeholder.
    pub name: String,
    /// The number of values per invocation.
    pub nargs: Nargs,
    /// The documentation.
    pub help: Option<String>,
    /// Whether the parameter must be provided.
    pub required: bool,
    /// The environment variable the parameter falls back to.
    pub env: Option<String>,
}

/// A sub-command, as shown in help.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubcommandSummary {
    /// The sub-command name.
    pub name: String,
    /// The sub-command's description.
    pub about: Option<String>,
}

impl<'a> CommandTree<'a> {
    pub(crate) fn help_context(&self, command: usize) -> HelpContext {
        let scope = &self.commands[command];
        let mut options = Vec::default();
        let mut arguments = Vec::default();

        for p in &scope.parameters {
            let parameter = self.parameter(*p);
            let names = &parameter.names;
            let flags: Vec<String> = names
                .shorts
                .iter()
                .map(|s| format!("-{s}"))
                .chain(names.longs.iter().map(|l| format!("--{l}")))
                .collect();
            let name = names
                .positional
                .clone()
                .or_else(|| names.longs.first().cloned())
                .or_else(|| names.shorts.first().map(char::to_string))
                .unwrap_or_default();
            let summary = ParameterSummary {
                flags,
                name,
                nargs: parameter.nargs,
                help: parameter.help.clone(),
                required: parameter.required,
                env: parameter.env.clone(),
            };

            if names.is_positional() {
                arguments.push(summary);
            } else {
                options.push(summary);
            }
        }

        HelpContext {
            program: self.lineage(command).join(" "),
            about: scope.about.clone(),
            footer: scope.footer.clone(),
            options,
            arguments,
            subcommands: scope
                .children
                .iter()
                .map(|c| SubcommandSummary {
                    name: self.commands[*c].name.clone(),
                    about: self.commands[*c].about.clone(),
                })
                .collect(),
        }
    }
}

/// The default [`Formatter`]: an argparse style layout fit to the terminal width.
pub struct HelpFormatter {
    terminal_width: Option<usize>,
}

impl Default for HelpFormatter {
    fn default() -> Self {
        let terminal_width = if let Some((Width(terminal_width), _)) = terminal_size() {
            Some(terminal_width as usize)
        } else {
            None
        };

        Self { terminal_width }
    }
}

impl HelpFormatter {
    /// A formatter for a fixed total width, regardless of the terminal.
    pub fn fixed(width: usize) -> Self {
        Self {
            terminal_width: Some(width),
        }
    }
}

const PADDING_WIDTH: usize = 3;
const MAIN_INDENT: usize = 1;

impl Formatter for HelpFormatter {
    fn make_help(&self, context: &HelpContext) -> String {
        let mut summary = Vec::default();
        let mut left_column_width = 1;
        let mut middle_column_width = 2;
        let mut options = Vec::default();
        let mut arguments = Vec::default();
        let mut subcommands = Vec::default();

        for option in &context.options {
            let grammar = grammar(&option.name, option.nargs);
            let usage = match option.flags.first() {
                Some(flag) => format!("{flag}{grammar}"),
                None => grammar.trim_start().to_string(),
            };

            if option.required {
                summary.push(usage);
            } else {
                summary.push(format!("[{usage}]"));
            }

            options.push((format!("{}{grammar}", option.flags.join(", ")), describe(option)));
        }

        for argument in &context.arguments {
            let grammar = grammar(&argument.name, argument.nargs).trim_start().to_string();
            summary.push(grammar.clone());
            arguments.push((grammar, describe(argument)));
        }

        if !context.subcommands.is_empty() {
            summary.push("SUBCOMMAND ...".to_string());

            for subcommand in &context.subcommands {
                subcommands.push((
                    subcommand.name.clone(),
                    subcommand.about.clone().unwrap_or_default(),
                ));
            }
        }

        for (left, middle) in options.iter().chain(arguments.iter()).chain(subcommands.iter()) {
            left_column_width = std::cmp::max(left_column_width, left.len());
            middle_column_width = std::cmp::max(middle_column_width, middle.len() + MAIN_INDENT);
        }

        let column_renderer = match self.terminal_width {
            Some(tw) => ColumnRenderer::guided(
                PaddingWidth(PADDING_WIDTH),
                LeftWidth(left_column_width),
                MiddleWidth(middle_column_width),
                TotalWidth(tw),
            ),
            None => ColumnRenderer::new(
                PaddingWidth(PADDING_WIDTH),
                LeftWidth(left_column_width),
                MiddleWidth(std::cmp::max(middle_column_width, MINIMUM_MIDDLE_WIDTH)),
            ),
        };

        let mut lines = vec![format!("usage: {} {}", context.program, summary.join(" "))
            .trim_end()
            .to_string()];

        if let Some(about) = &context.about {
            lines.push("".to_string());
            lines.push(about.clone());
        }

        for (heading, rows) in [
            ("positional arguments:", &arguments),
            ("options:", &options),
            ("sub-commands:", &subcommands),
        ] {
            if rows.is_empty() {
                continue;
            }

            lines.push("".to_string());
            lines.push(heading.to_string());

            for (left, middle) in rows {
                lines.extend(column_renderer.render(MAIN_INDENT, left, middle));
            }
        }

        if let Some(footer) = &context.footer {
            lines.push("".to_string());
            lines.push(footer.clone());
        }

        lines.join("\n")
    }
}

fn grammar(name: &str, nargs: Nargs) -> String {
    let name_example = name.to_ascii_uppercase().replace('-', "_");

    match nargs {
        Nargs::Precisely(n) => (0..n).map(|_| format!(" {name_example}")).collect(),
        Nargs::Any => format!(" [{name_example} ...]"),
        Nargs::AtLeastOne => format!(" {name_example} [...]"),
    }
}

fn describe(parameter: &ParameterSummary) -> String {
    let mut parts: Vec<String> = parameter.help.iter().cloned().collect();

    if parameter.required {
        parts.push("[required]".to_string());
    }

    if let Some(env) = &parameter.env {
        parts.push(format!("[env: {env}]"));
    }

    parts.join(" ")
}

#[derive(Debug)]
struct PaddingWidth(usize);

#[derive(Debug)]
struct LeftWidth(usize);

#[derive(Debug)]
struct MiddleWidth(usize);

#[derive(Debug)]
struct TotalWidth(usize);

#[derive(Debug)]
struct ColumnRenderer {
    padding: PaddingWidth,
    left: LeftWidth,
    middle: MiddleWidth,
}

// We'll target 95% of the total width, to ensure the renderer doesn't literally use the full space.
const TARGET_TOTAL_FACTOR: f64 = 0.95;

// Let's assume the average word length is 5.
// Then 17 is a good minimum, because it allows precisely 3 words with a space between them.
const MINIMUM_MIDDLE_WIDTH: usize = 17;

impl ColumnRenderer {
    /// Produce a renderer based off the provided widths.
    /// This renderer will use a heuristic to chose the middle width.
    fn guided(
        padding: PaddingWidth,
        left: LeftWidth,
        middle: MiddleWidth,
        total_width: TotalWidth,
    ) -> Self {
        // We always have a left and a middle (and a padding between them).
        let non_middle: usize = left.0 + padding.0;
        let target_total_width = (total_width.0 as f64 * TARGET_TOTAL_FACTOR) as usize;
        let guided_middle = std::cmp::max(middle.0, MINIMUM_MIDDLE_WIDTH);

        if guided_middle + non_middle <= target_total_width {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} and middle fit within the target total {target_total_width}.  Selecting middle: {guided_middle}.");
            }

            Self::new(padding, left, MiddleWidth(guided_middle))
        } else if non_middle < total_width.0 {
            let calculated_middle =
                std::cmp::max(total_width.0 - non_middle, MINIMUM_MIDDLE_WIDTH);
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} fits within the total {}.  Selecting middle: {calculated_middle}.", total_width.0);
            }

            Self::new(padding, left, MiddleWidth(calculated_middle))
        } else {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} do not fit within the total {}.  Selecting middle: {MINIMUM_MIDDLE_WIDTH}.", total_width.0);
            }

            Self::new(padding, left, MiddleWidth(MINIMUM_MIDDLE_WIDTH))
        }
    }

    fn new(padding: PaddingWidth, left: LeftWidth, middle: MiddleWidth) -> Self {
        Self {
            padding,
            left,
            middle,
        }
    }

    fn render(&self, indent: usize, left: &str, middle: &str) -> Vec<String> {
        let padding = format!("{:width$}", "", width = self.padding.0);
        let left_column_width = self.left.0;
        let middle_column_width = std::cmp::max(self.middle.0.saturating_sub(indent), 2);
        let mut out = Vec::default();

        for (i, part) in chunk(middle, middle_column_width).iter().enumerate() {
            if i == 0 {
                out.push(format!("{:indent$}{:left_column_width$}{padding}{}", "", left, part));
            } else {
                out.push(format!("{:indent$}{:left_column_width$}{padding}{}", "", "", part));
            }
        }

        if out.is_empty() {
            out.push(format!("{:indent$}{}", "", left));
        }

        out
    }
}

fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
        if current.is_empty() {
            hyphenate(width, &mut lines, &mut current, word);
        } else if current.chars().count() + word.chars().count() < width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            hyphenate(width, &mut lines, &mut current, word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let increment = width - 1;
    let mut characters: Vec<char> = word.chars().collect();

    while characters.len() > width {
        let rest = characters.split_off(increment);
        lines.push(format!("{}-", characters.iter().collect::<String>()));
        characters = rest;
    }

    current.extend(characters);
}
