use crate::matcher::{classify, split_long, split_short, Classification};
use crate::parser::{CommandTree, ParseError, ScopeState};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

impl<'a> CommandTree<'a> {
    /// Classify the token as seen from `command`.
    pub(crate) fn classify(&self, command: usize, token: &str) -> Classification {
        let scope = &self.commands[command];

        if scope.positional_only {
            return Classification::None;
        }

        classify(token, |name| {
            scope.selected.is_none() && self.find_child(command, name).is_some()
        })
    }

    /// Consume the token stack (next token at the end) from the perspective of `command`.
    /// Recurses into the selected sub-command, which then consumes the remainder.
    pub(crate) fn consume(
        &mut self,
        command: usize,
        tokens: &mut Vec<String>,
    ) -> Result<(), ParseError> {
        self.commands[command].state = ScopeState::Parsing;

        while let Some(token) = tokens.last() {
            let classification = self.classify(command, token);
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Command {command}: {token} classified as {classification:?}.");
            }

            match classification {
                Classification::PositionalMark => {
                    tokens.pop();
                    self.commands[command].positional_only = true;
                }
                Classification::Subcommand => {
                    let token = pop(tokens)?;
                    self.dispatch(command, &token, tokens)?;
                }
                Classification::Long => {
                    let token = pop(tokens)?;
                    self.consume_long(command, token, tokens)?;
                }
                Classification::Short => {
                    let token = pop(tokens)?;
                    self.consume_short(command, token, tokens)?;
                }
                Classification::None => {
                    let token = pop(tokens)?;
                    self.consume_positional(command, token, tokens);
                }
            }
        }

        Ok(())
    }

    fn dispatch(
        &mut self,
        command: usize,
        token: &str,
        tokens: &mut Vec<String>,
    ) -> Result<(), ParseError> {
        let child = match self.find_child(command, token) {
            Some(child) => child,
            None => {
                return Err(ParseError::Horrible(format!(
                    "'{token}' was classified as a sub-command, but it does not exist."
                )));
            }
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Dispatching into sub-command '{token}'.");
        }

        self.commands[command].selected = Some(child);
        self.consume(child, tokens)
    }

    fn consume_long(
        &mut self,
        command: usize,
        token: String,
        tokens: &mut Vec<String>,
    ) -> Result<(), ParseError> {
        let (name, inline) = match split_long(&token) {
            Some(split) => split,
            None => {
                return Err(ParseError::Horrible(format!(
                    "'{token}' was classified as a long option, but it cannot be split."
                )));
            }
        };

        match self.lookup_long(command, name) {
            Some(parameter) => {
                let first = inline.map(String::from);
                self.bind(command, parameter, first, tokens)
            }
            None => {
                self.unmatched(command, token, tokens);
                Ok(())
            }
        }
    }

    fn consume_short(
        &mut self,
        command: usize,
        token: String,
        tokens: &mut Vec<String>,
    ) -> Result<(), ParseError> {
        let (name, rest) = match split_short(&token) {
            Some(split) => split,
            None => {
                return Err(ParseError::Horrible(format!(
                    "'{token}' was classified as a short option, but it cannot be split."
                )));
            }
        };

        let parameter = match self.lookup_short(command, name) {
            Some(parameter) => parameter,
            None => {
                self.unmatched(command, token, tokens);
                return Ok(());
            }
        };

        if self.parameter(parameter).nargs.is_flag() {
            self.parameter_mut(parameter)
                .invocations
                .push(vec![String::default()]);

            // Chained flags: `-aA` continues as `-A`.
            if !rest.is_empty() {
                tokens.push(format!("-{rest}"));
            }

            Ok(())
        } else {
            let first = if rest.is_empty() {
                None
            } else {
                Some(rest.strip_prefix('=').unwrap_or(rest).to_string())
            };
            self.bind(command, parameter, first, tokens)
        }
    }

    /// Start a new invocation of `parameter`, binding `first` and then values from the stream.
    fn bind(
        &mut self,
        command: usize,
        parameter: usize,
        first: Option<String>,
        tokens: &mut Vec<String>,
    ) -> Result<(), ParseError> {
        let nargs = self.parameter(parameter).nargs;
        let mut invocation: Vec<String> = first.into_iter().collect();

        match nargs.capacity() {
            // A flag given an inline value keeps it (ex: `--flag=false`).
            Some(0) => {
                if invocation.is_empty() {
                    invocation.push(String::default());
                }
            }
            Some(n) => {
                // Fixed arity is blind to the shape of the tokens.
                while invocation.len() < n {
                    match tokens.pop() {
                        Some(token) => invocation.push(token),
                        None => {
                            return Err(ParseError::ArgumentMismatch {
                                name: self.parameter(parameter).display(),
                                expected: format!("exactly {n}"),
                                received: invocation.len(),
                            });
                        }
                    }
                }
            }
            None => {
                while let Some(token) = tokens.last() {
                    if self.classify(command, token) != Classification::None {
                        break;
                    }

                    invocation.push(pop(tokens)?);
                }
            }
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Bound {invocation:?} to {name}.",
                name = self.parameter(parameter).display()
            );
        }

        self.parameter_mut(parameter).invocations.push(invocation);
        Ok(())
    }

    fn consume_positional(&mut self, command: usize, token: String, tokens: &mut Vec<String>) {
        let scope = &self.commands[command];

        if scope.settings.prefix_command {
            let full = match self.positional_room(command) {
                Some(room) => scope.pending.len() >= room,
                None => false,
            };

            if full {
                self.stop(command, token, tokens);
                return;
            }
        }

        self.commands[command].pending.push_back(token);
    }

    fn unmatched(&mut self, command: usize, token: String, tokens: &mut Vec<String>) {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Command {command}: {token} is unmatched.");
        }

        if self.commands[command].settings.prefix_command {
            self.stop(command, token, tokens);
        } else {
            self.commands[command].missing.push(token);
        }
    }

    /// Move the token and the remainder of the stream into the missing list.
    fn stop(&mut self, command: usize, token: String, tokens: &mut Vec<String>) {
        let missing = &mut self.commands[command].missing;
        missing.push(token);

        while let Some(token) = tokens.pop() {
            missing.push(token);
        }
    }
}

fn pop(tokens: &mut Vec<String>) -> Result<String, ParseError> {
    tokens
        .pop()
        .ok_or_else(|| ParseError::Horrible("the token stream ran out unexpectedly.".to_string()))
}
