use std::collections::VecDeque;

use crate::api::ParameterInner;
use crate::config::{ConfigFormat, IniConfig};
use crate::matcher::Names;
use crate::model::{MultiOptionPolicy, Nargs};
use crate::parser::AnonymousCapturable;
use crate::prelude::Validator;

/// Settings which sub-commands inherit from their parent at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) allow_extras: bool,
    pub(crate) allow_config_extras: bool,
    pub(crate) prefix_command: bool,
    pub(crate) fallthrough: bool,
    pub(crate) ignore_case: bool,
    pub(crate) ignore_underscore: bool,
    pub(crate) help_names: Option<String>,
}

impl Settings {
    /// The name as it participates in lookups.
    pub(crate) fn normalize(&self, name: &str) -> String {
        let mut out = if self.ignore_case {
            name.to_lowercase()
        } else {
            name.to_string()
        };

        if self.ignore_underscore {
            out.retain(|c| c != '_');
        }

        out
    }

    pub(crate) fn normalize_char(&self, name: char) -> char {
        if self.ignore_case {
            name.to_lowercase().next().unwrap_or(name)
        } else {
            name
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScopeState {
    Unparsed,
    Parsing,
    Parsed,
}

pub(crate) struct ParameterState<'a> {
    pub(crate) names: Names,
    pub(crate) command: usize,
    pub(crate) nargs: Nargs,
    pub(crate) vector: bool,
    pub(crate) required: bool,
    pub(crate) configurable: bool,
    pub(crate) env: Option<String>,
    pub(crate) policy: MultiOptionPolicy,
    pub(crate) help: Option<String>,
    pub(crate) validators: Vec<Box<dyn Validator + 'a>>,
    pub(crate) capture: Box<dyn AnonymousCapturable + 'a>,
    pub(crate) requires: Vec<usize>,
    pub(crate) excludes: Vec<usize>,
    pub(crate) invocations: Vec<Vec<String>>,
}

impl<'a> ParameterState<'a> {
    pub(crate) fn new(command: usize, names: Names, inner: ParameterInner<'a>) -> Self {
        let ParameterInner {
            capture,
            nargs,
            vector,
            required,
            configurable,
            env,
            policy,
            help,
            validators,
            ..
        } = inner;

        Self {
            names,
            command,
            nargs,
            vector,
            required,
            configurable,
            env,
            policy,
            help,
            validators,
            capture,
            requires: Vec::default(),
            excludes: Vec::default(),
            invocations: Vec::default(),
        }
    }

    /// The flattened number of bound values.
    pub(crate) fn count(&self) -> usize {
        self.invocations.iter().map(Vec::len).sum()
    }

    pub(crate) fn invoked(&self) -> bool {
        !self.invocations.is_empty()
    }

    pub(crate) fn display(&self) -> String {
        self.names.display()
    }
}

pub(crate) struct CommandScope<'a> {
    pub(crate) name: String,
    pub(crate) about: Option<String>,
    pub(crate) footer: Option<String>,
    pub(crate) parent: Option<usize>,
    pub(crate) parameters: Vec<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) settings: Settings,
    pub(crate) require_subcommand: bool,
    pub(crate) help: Option<usize>,
    pub(crate) callback: Option<Box<dyn FnMut() + 'a>>,
    pub(crate) state: ScopeState,
    pub(crate) pending: VecDeque<String>,
    pub(crate) missing: Vec<String>,
    pub(crate) overflow: Vec<String>,
    pub(crate) selected: Option<usize>,
    pub(crate) positional_only: bool,
}

impl<'a> CommandScope<'a> {
    pub(crate) fn new(name: String, parent: Option<usize>, settings: Settings) -> Self {
        Self {
            name,
            about: None,
            footer: None,
            parent,
            parameters: Vec::default(),
            children: Vec::default(),
            settings,
            require_subcommand: false,
            help: None,
            callback: None,
            state: ScopeState::Unparsed,
            pending: VecDeque::default(),
            missing: Vec::default(),
            overflow: Vec::default(),
            selected: None,
            positional_only: false,
        }
    }

    fn reset(&mut self) {
        self.state = ScopeState::Unparsed;
        self.pending.clear();
        self.missing.clear();
        self.overflow.clear();
        self.selected = None;
        self.positional_only = false;
    }
}

/// The parameter which names the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConfigBinding {
    pub(crate) parameter: usize,
    pub(crate) default: Option<String>,
    pub(crate) required: bool,
}

/// The command tree: an arena of scopes (the root at index `0`) and the parameters they own.
///
/// Children are owned through `children`; `parent` is a plain index used for upward lookups.
pub(crate) struct CommandTree<'a> {
    pub(crate) commands: Vec<CommandScope<'a>>,
    // Removed parameters leave a `None` so that handles stay stable.
    pub(crate) parameters: Vec<Option<ParameterState<'a>>>,
    pub(crate) config: Option<ConfigBinding>,
    pub(crate) format: Box<dyn ConfigFormat>,
}

pub(crate) const ROOT: usize = 0;

impl<'a> CommandTree<'a> {
    pub(crate) fn new(program: impl Into<String>) -> Self {
        Self {
            commands: vec![CommandScope::new(program.into(), None, Settings::default())],
            parameters: Vec::default(),
            config: None,
            format: Box::new(IniConfig::default()),
        }
    }

    pub(crate) fn parameter(&self, index: usize) -> &ParameterState<'a> {
        match self.parameters.get(index) {
            Some(Some(parameter)) => parameter,
            _ => unreachable!("internal error - parameter {index} must exist"),
        }
    }

    pub(crate) fn parameter_mut(&mut self, index: usize) -> &mut ParameterState<'a> {
        match self.parameters.get_mut(index) {
            Some(Some(parameter)) => parameter,
            _ => unreachable!("internal error - parameter {index} must exist"),
        }
    }

    /// Clear the parse state of every command and parameter.
    pub(crate) fn reset(&mut self) {
        for command in self.commands.iter_mut() {
            command.reset();
        }

        for parameter in self.parameters.iter_mut().flatten() {
            parameter.invocations.clear();
        }
    }

    /// The root, followed by each selected sub-command.
    pub(crate) fn active_path(&self) -> Vec<usize> {
        let mut path = vec![ROOT];
        let mut current = ROOT;

        while let Some(child) = self.commands[current].selected {
            path.push(child);
            current = child;
        }

        path
    }

    /// The command names from the root down to `command`.
    pub(crate) fn lineage(&self, command: usize) -> Vec<String> {
        let mut names = vec![self.commands[command].name.clone()];
        let mut current = command;

        while let Some(parent) = self.commands[current].parent {
            names.push(self.commands[parent].name.clone());
            current = parent;
        }

        names.reverse();
        names
    }

    /// The parameters of `command` which are filled by position, in registration order.
    pub(crate) fn positionals(&self, command: usize) -> Vec<usize> {
        self.commands[command]
            .parameters
            .iter()
            .copied()
            .filter(|p| self.parameter(*p).names.is_positional())
            .collect()
    }

    /// The number of further positional values `command` can hold; `None` when unlimited.
    /// Values already bound by name take up room.
    pub(crate) fn positional_room(&self, command: usize) -> Option<usize> {
        let mut total = 0;

        for p in self.positionals(command) {
            let parameter = self.parameter(p);
            total += parameter.nargs.capacity()?.saturating_sub(parameter.count());
        }

        Some(total)
    }
}
