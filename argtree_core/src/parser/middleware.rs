use std::env;

use crate::config::ConfigItem;
use crate::model::{CommandId, Parsed};
use crate::parser::{CommandTree, ParseError, ScopeState, ROOT};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

impl<'a> CommandTree<'a> {
    /// Parse the tokens (natural order) against the tree.
    pub(crate) fn parse(&mut self, tokens: Vec<String>) -> Result<Parsed, ParseError> {
        self.reset();
        let mut stack: Vec<String> = tokens.into_iter().rev().collect();
        let consumed = self.consume(ROOT, &mut stack);
        let path = self.active_path();

        // Help wins over everything, including a malformed command line.
        if let Some(command) = self.help_invoked(&path) {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Help requested for command {command}.");
            }

            return Ok(Parsed::Help(CommandId(command)));
        }

        consumed?;
        self.resolve(&path);
        self.overlay_config(&path)?;
        self.overlay_env(&path);

        for command in path.iter().rev() {
            self.finalize(*command)?;
        }

        for command in path.iter() {
            if let Some(callback) = self.commands[*command].callback.as_mut() {
                callback();
            }

            self.commands[*command].state = ScopeState::Parsed;
        }

        Ok(Parsed::Complete)
    }

    /// The deepest command on the `path` whose help flag was invoked.
    fn help_invoked(&self, path: &[usize]) -> Option<usize> {
        path.iter().rev().copied().find(|command| {
            matches!(self.commands[*command].help, Some(help) if self.parameter(help).invoked())
        })
    }

    fn overlay_config(&mut self, path: &[usize]) -> Result<(), ParseError> {
        let binding = match &self.config {
            Some(binding) => binding.clone(),
            None => return Ok(()),
        };

        let explicit = self
            .parameter(binding.parameter)
            .invocations
            .iter()
            .flatten()
            .last()
            .cloned();
        let file = match explicit.as_ref().or(binding.default.as_ref()) {
            Some(file) => file.clone(),
            None => return Ok(()),
        };

        let items = match self.format.from_file(&file) {
            Ok(items) => items,
            Err(error) if explicit.is_some() || binding.required => return Err(error),
            Err(_) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Optional configuration '{file}' is not readable; skipping.");
                }

                return Ok(());
            }
        };

        // Only values absent from the command line are taken from the file.
        let invoked: Vec<bool> = self
            .parameters
            .iter()
            .map(|p| matches!(p, Some(parameter) if parameter.invoked()))
            .collect();

        for item in items {
            self.overlay_item(path, &invoked, item)?;
        }

        Ok(())
    }

    fn overlay_item(
        &mut self,
        path: &[usize],
        invoked: &[bool],
        item: ConfigItem,
    ) -> Result<(), ParseError> {
        let mut command = ROOT;

        for parent in &item.parents {
            match self.find_child(command, parent) {
                Some(child) if path.contains(&child) => command = child,
                Some(_) => {
                    // The sub-command exists, but was not selected.
                    return Ok(());
                }
                None => return self.config_extra(command, &item),
            }
        }

        let index = match self.find_named(command, &item.name) {
            Some(index) => index,
            None => return self.config_extra(command, &item),
        };

        let parameter = self.parameter_mut(index);

        if !parameter.configurable {
            return Err(ParseError::NotConfigurable(item.fullname()));
        }

        if invoked[index] {
            return Ok(());
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Configuration item {} binds {:?}.", item.fullname(), item.inputs);
        }

        if parameter.nargs.is_flag() && item.inputs.len() != 1 {
            return Err(ParseError::Conversion {
                name: parameter.display(),
                values: item.inputs.join(" "),
                reason: "a flag takes a single value".to_string(),
            });
        }

        parameter.invocations.push(item.inputs);
        Ok(())
    }

    fn config_extra(&self, command: usize, item: &ConfigItem) -> Result<(), ParseError> {
        if self.commands[command].settings.allow_config_extras {
            Ok(())
        } else {
            Err(ParseError::ConfigExtras(item.fullname()))
        }
    }

    fn overlay_env(&mut self, path: &[usize]) {
        for command in path {
            for p in self.commands[*command].parameters.clone() {
                let parameter = self.parameter_mut(p);

                if parameter.invoked() {
                    continue;
                }

                if let Some(value) = parameter.env.as_ref().and_then(|name| env::var(name).ok()) {
                    parameter.invocations.push(vec![value]);
                }
            }
        }
    }

    /// The tokens no parameter accepted, across the active path.
    pub(crate) fn remaining(&self) -> Vec<String> {
        self.active_path()
            .into_iter()
            .flat_map(|command| self.commands[command].missing.iter().cloned())
            .collect()
    }
}
