use crate::parser::CommandTree;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

impl<'a> CommandTree<'a> {
    /// Distribute the pending positionals of each command on the `path`, deepest first.
    ///
    /// Positional parameters are filled in registration order, so an unlimited positional drains
    /// the queue before any later positional receives a value.
    pub(crate) fn resolve(&mut self, path: &[usize]) {
        for command in path.iter().rev().copied() {
            let mut pending = std::mem::take(&mut self.commands[command].pending);

            for p in self.positionals(command) {
                let parameter = self.parameter_mut(p);
                let capacity = parameter.nargs.capacity();

                while capacity.map_or(true, |c| parameter.count() < c) {
                    match pending.pop_front() {
                        Some(token) => parameter.invocations.push(vec![token]),
                        None => break,
                    }
                }
            }

            if pending.is_empty() {
                continue;
            }

            #[cfg(feature = "tracing_debug")]
            {
                debug!("Command {command}: {pending:?} are left over.");
            }

            let parent = self.commands[command].parent;
            let settings = &self.commands[command].settings;
            let (fallthrough, allow_extras) = (settings.fallthrough, settings.allow_extras);

            match parent {
                Some(parent) if fallthrough => {
                    self.commands[parent].pending.extend(pending);
                }
                _ if allow_extras => {
                    self.commands[command].missing.extend(pending);
                }
                _ => {
                    self.commands[command].overflow.extend(pending);
                }
            }
        }
    }
}
