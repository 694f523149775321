use std::env;

use crate::api::Parameter;
use crate::config::{ConfigFormat, ConfigItem};
use crate::constant::HELP_NAMES;
use crate::model::{CommandId, Nargs, ParameterId, Parsed};
use crate::parser::{
    CommandTree, ConfigBinding, ConfigError, ConsoleInterface, Formatter, HelpFormatter,
    LookupError, ParseError, Relation, ScopeState, UserInterface, ROOT,
};

/// The command line parser.
///
/// Parameters bind to program variables through mutable borrows; the parser must be dropped before those variables are read.
///
/// ### Example
/// ```
/// # use argtree_core as argtree;
/// use argtree::{CommandLineParser, Parameter, Scalar, Switch};
///
/// let mut verbose: bool = false;
/// let mut value: u32 = 0;
/// let mut parser = CommandLineParser::new("program");
/// parser.add(Parameter::option(Switch::new(&mut verbose, true), "-v,--verbose")).unwrap();
/// parser.add(Parameter::argument(Scalar::new(&mut value), "value")).unwrap();
///
/// parser.parse_tokens(&["-v", "3"]).unwrap();
/// drop(parser);
///
/// assert!(verbose);
/// assert_eq!(value, 3);
/// ```
pub struct CommandLineParser<'a> {
    tree: CommandTree<'a>,
    formatter: Box<dyn Formatter>,
    user_interface: Box<dyn UserInterface>,
}

impl<'a> CommandLineParser<'a> {
    /// Create a command line parser, with the help flag `-h,--help` on the root command.
    pub fn new(program: impl Into<String>) -> Self {
        let mut tree = CommandTree::new(program);

        if let Err(error) = tree.set_help(ROOT, Some(HELP_NAMES)) {
            unreachable!("internal error - the default help flag must be valid: {error}");
        }

        Self {
            tree,
            formatter: Box::new(HelpFormatter::default()),
            user_interface: Box::new(ConsoleInterface::default()),
        }
    }

    /// Document the about message for the root command.
    /// If repeated, only the final message will apply.
    pub fn about(&mut self, description: impl Into<String>) -> &mut Self {
        self.tree.commands[ROOT].about.replace(description.into());
        self
    }

    /// Document the text shown at the end of the root command's help.
    pub fn footer(&mut self, text: impl Into<String>) -> &mut Self {
        self.tree.commands[ROOT].footer.replace(text.into());
        self
    }

    /// The handle of the root command.
    pub fn root(&self) -> CommandId {
        CommandId(ROOT)
    }

    /// Add a parameter to the root command.
    ///
    /// The order of positional parameters corresponds to their positional order during parsing.
    ///
    /// ### Example
    /// ```
    /// # use argtree_core as argtree;
    /// use argtree::{CommandLineParser, Parameter, Scalar};
    ///
    /// let mut a: u32 = 0;
    /// let mut b: u32 = 0;
    /// let mut parser = CommandLineParser::new("program");
    /// parser.add(Parameter::option(Scalar::new(&mut a), "-a")).unwrap();
    /// let error = parser.add(Parameter::option(Scalar::new(&mut b), "-a")).unwrap_err();
    ///
    /// assert_eq!(error.exit_code(), 102);
    /// ```
    pub fn add(&mut self, parameter: Parameter<'a>) -> Result<ParameterId, ConfigError> {
        self.tree
            .insert_parameter(ROOT, parameter.consume())
            .map(ParameterId)
    }

    /// Add a sub-command to the root command.
    ///
    /// Sub-commands inherit the settings of their parent as they are at this point.
    ///
    /// ### Example
    /// ```
    /// # use argtree_core as argtree;
    /// use argtree::{CommandLineParser, Parameter, Scalar};
    ///
    /// let mut port: u16 = 0;
    /// let mut parser = CommandLineParser::new("program");
    /// parser
    ///     .subcommand("serve")
    ///     .unwrap()
    ///     .about("Start the server.")
    ///     .add(Parameter::option(Scalar::new(&mut port), "--port"))
    ///     .unwrap();
    ///
    /// parser.parse_tokens(&["serve", "--port", "8080"]).unwrap();
    /// assert_eq!(parser.subcommand_path(), vec!["serve".to_string()]);
    /// drop(parser);
    ///
    /// assert_eq!(port, 8080);
    /// ```
    pub fn subcommand(&mut self, name: impl Into<String>) -> Result<SubCommand<'_, 'a>, ConfigError> {
        let index = self.tree.insert_child(ROOT, name)?;
        Ok(SubCommand {
            tree: &mut self.tree,
            command: index,
        })
    }

    /// Configure a command (the root, or a previously added sub-command).
    pub fn command(&mut self, id: CommandId) -> SubCommand<'_, 'a> {
        SubCommand {
            tree: &mut self.tree,
            command: id.0,
        }
    }

    /// Declare that `dependent` may only be provided alongside `dependency`.
    ///
    /// ### Example
    /// ```
    /// # use argtree_core as argtree;
    /// use argtree::{CommandLineParser, Nargs, Parameter};
    ///
    /// let mut parser = CommandLineParser::new("program");
    /// let user = parser.add(Parameter::values("--user", Nargs::Precisely(1))).unwrap();
    /// let password = parser.add(Parameter::values("--password", Nargs::Precisely(1))).unwrap();
    /// parser.requires(password, user).unwrap();
    ///
    /// let error = parser.parse_tokens(&["--password", "secret"]).unwrap_err();
    /// assert_eq!(error.exit_code(), 107);
    /// ```
    pub fn requires(&mut self, dependent: ParameterId, dependency: ParameterId) -> Result<(), ConfigError> {
        self.tree.add_edge(dependent.0, Relation::Requires, dependency.0)
    }

    /// Declare that `dependent` may not be provided alongside `excluded`.
    /// The relation is one directional; declare both directions for mutual exclusion.
    pub fn excludes(&mut self, dependent: ParameterId, excluded: ParameterId) -> Result<(), ConfigError> {
        self.tree.add_edge(dependent.0, Relation::Excludes, excluded.0)
    }

    /// Remove a parameter, along with any requires/excludes edges that mention it.
    pub fn remove(&mut self, id: ParameterId) -> Result<(), ConfigError> {
        self.tree.remove_parameter(id.0)
    }

    /// Declare the root option which names a configuration file.
    ///
    /// Values from the file apply to parameters not given on the command line.
    /// The `default` file is used when the option is absent; it may be missing, unless `required` is set.
    /// A file given explicitly must always exist.
    ///
    /// ### Example
    /// ```
    /// # use argtree_core as argtree;
    /// use argtree::{CommandLineParser, Nargs, Parameter};
    ///
    /// let mut parser = CommandLineParser::new("program");
    /// parser.set_config("--config", Some("/no/such/file.ini"), false).unwrap();
    /// parser.add(Parameter::values("--level", Nargs::Precisely(1))).unwrap();
    ///
    /// // The default configuration file is optional.
    /// parser.parse_tokens(&[]).unwrap();
    ///
    /// // An explicit configuration file is not.
    /// let error = parser.parse_tokens(&["--config", "/no/such/other.ini"]).unwrap_err();
    /// assert_eq!(error.exit_code(), 103);
    /// ```
    pub fn set_config(
        &mut self,
        names: impl Into<String>,
        default: Option<&str>,
        required: bool,
    ) -> Result<ParameterId, ConfigError> {
        if let Some(previous) = self.tree.config.take() {
            self.tree.remove_parameter(previous.parameter)?;
        }

        let inner = Parameter::values(names, Nargs::Precisely(1))
            .help("Read parameters from a configuration file.")
            .configurable(false)
            .consume();
        let index = self.tree.insert_parameter(ROOT, inner)?;
        self.tree.config = Some(ConfigBinding {
            parameter: index,
            default: default.map(String::from),
            required,
        });
        Ok(ParameterId(index))
    }

    /// Use a custom configuration file format (the default is [`IniConfig`](crate::IniConfig)).
    pub fn config_format(&mut self, format: impl ConfigFormat + 'static) -> &mut Self {
        self.tree.format = Box::new(format);
        self
    }

    /// Use a custom help formatter (the default is [`HelpFormatter`]).
    pub fn formatter(&mut self, formatter: impl Formatter + 'static) -> &mut Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Run the command line parser against the input tokens.
    ///
    /// The parser state is reset first, so the same parser may be run many times.
    /// Bound variables are written to as the parse completes; on an error, some of them may already be written.
    ///
    /// ### Example
    /// ```
    /// # use argtree_core as argtree;
    /// use argtree::{CommandLineParser, Parsed};
    ///
    /// let mut parser = CommandLineParser::new("program");
    /// assert_eq!(parser.parse_tokens(&["--help"]).unwrap(), Parsed::Help(parser.root()));
    /// assert_eq!(parser.parse_tokens(&[]).unwrap(), Parsed::Complete);
    /// ```
    pub fn parse_tokens(&mut self, tokens: &[&str]) -> Result<Parsed, ParseError> {
        self.tree
            .parse(tokens.iter().map(|t| t.to_string()).collect())
    }

    /// Run the command line parser against owned input tokens.
    pub fn parse_args(&mut self, tokens: Vec<String>) -> Result<Parsed, ParseError> {
        self.tree.parse(tokens)
    }

    /// Run the command line parser against the Cli [`env::args`].
    ///
    /// If the parser encounters an error, it prints the error and exits with the error's code (via [`std::process::exit`]).
    /// If a help flag is encountered, the parser prints the help message and exits with code `0`.
    pub fn parse(&mut self) {
        let tokens: Vec<String> = env::args().skip(1).collect();

        if let Err(exit_code) = self.invoke(tokens) {
            std::process::exit(exit_code);
        }
    }

    fn invoke(&mut self, tokens: Vec<String>) -> Result<(), i32> {
        match self.tree.parse(tokens) {
            Ok(Parsed::Complete) => Ok(()),
            Ok(Parsed::Help(command)) => {
                self.user_interface.print(self.help(command));
                Err(0)
            }
            Err(error) => {
                self.user_interface.print_error(&error);

                if error.show_usage() {
                    let command = *self.tree.active_path().last().unwrap_or(&ROOT);

                    if let Some(help) = self.tree.commands[command].help {
                        self.user_interface.print(format!(
                            "Run with {} for more information.",
                            self.tree.parameter(help).display()
                        ));
                    }
                }

                Err(error.exit_code())
            }
        }
    }

    /// Clear the results of the previous parse.
    pub fn reset(&mut self) {
        self.tree.reset();
    }

    /// The number of values bound to the root parameter answering to `name` (ex: `-i`, `--int`, `FILE`).
    /// A flag counts once per invocation.
    ///
    /// ### Example
    /// ```
    /// # use argtree_core as argtree;
    /// use argtree::{CommandLineParser, Nargs, Parameter};
    ///
    /// let mut parser = CommandLineParser::new("program");
    /// parser.add(Parameter::values("-v,--verbose", Nargs::Precisely(0))).unwrap();
    /// parser.parse_tokens(&["-vv", "--verbose"]).unwrap();
    ///
    /// assert_eq!(parser.count("-v").unwrap(), 3);
    /// assert_eq!(parser.count("--verbose").unwrap(), 3);
    /// assert!(parser.count("--other").is_err());
    /// ```
    pub fn count(&self, name: &str) -> Result<usize, LookupError> {
        self.count_in(self.root(), name)
    }

    /// The number of values bound to the parameter of `command` answering to `name`.
    pub fn count_in(&self, command: CommandId, name: &str) -> Result<usize, LookupError> {
        match self.tree.find_named(command.0, name) {
            Some(index) => Ok(self.tree.parameter(index).count()),
            None => Err(LookupError::ParameterNotFound(name.to_string())),
        }
    }

    /// The raw values bound to a parameter, across all invocations.
    pub fn results(&self, id: ParameterId) -> Result<Vec<String>, LookupError> {
        Ok(self.invocations(id)?.into_iter().flatten().collect())
    }

    /// The raw values bound to a parameter, per invocation.
    ///
    /// ### Example
    /// ```
    /// # use argtree_core as argtree;
    /// use argtree::{CommandLineParser, MultiOptionPolicy, Nargs, Parameter};
    ///
    /// let mut parser = CommandLineParser::new("program");
    /// let name = parser
    ///     .add(Parameter::values("--name", Nargs::Precisely(1)).multi_option_policy(MultiOptionPolicy::TakeLast))
    ///     .unwrap();
    /// parser.parse_tokens(&["--name", "one", "--name", "two"]).unwrap();
    ///
    /// assert_eq!(parser.invocations(name).unwrap(), vec![vec!["one".to_string()], vec!["two".to_string()]]);
    /// ```
    pub fn invocations(&self, id: ParameterId) -> Result<Vec<Vec<String>>, LookupError> {
        match self.tree.parameters.get(id.0) {
            Some(Some(parameter)) => Ok(parameter.invocations.clone()),
            _ => Err(LookupError::ParameterNotFound(format!("#{}", id.0))),
        }
    }

    /// The tokens which no parameter accepted (with `allow_extras` or `prefix_command`).
    pub fn remaining(&self) -> Vec<String> {
        self.tree.remaining()
    }

    /// The sub-command selected under `command` during the last parse.
    pub fn selected(&self, command: CommandId) -> Option<CommandId> {
        self.tree.commands[command.0].selected.map(CommandId)
    }

    /// The names of the selected sub-commands, outermost first.
    pub fn subcommand_path(&self) -> Vec<String> {
        self.tree
            .active_path()
            .into_iter()
            .skip(1)
            .map(|c| self.tree.commands[c].name.clone())
            .collect()
    }

    /// Whether `command` completed the last parse.
    pub fn is_parsed(&self, command: CommandId) -> bool {
        self.tree.commands[command.0].state == ScopeState::Parsed
    }

    /// The help message of `command`.
    pub fn help(&self, command: CommandId) -> String {
        self.formatter
            .make_help(&self.tree.help_context(command.0))
    }

    /// Render the configurable parameters bound during the last parse as a configuration file.
    ///
    /// ### Example
    /// ```
    /// # use argtree_core as argtree;
    /// use argtree::{CommandLineParser, Nargs, Parameter};
    ///
    /// let mut parser = CommandLineParser::new("program");
    /// parser.add(Parameter::values("--level", Nargs::Precisely(1))).unwrap();
    /// parser.parse_tokens(&["--level", "3"]).unwrap();
    ///
    /// assert_eq!(parser.to_config(), "level = 3\n");
    /// ```
    pub fn to_config(&self) -> String {
        let mut items = Vec::default();

        for command in self.tree.active_path() {
            let parents: Vec<String> = self.tree.lineage(command).into_iter().skip(1).collect();

            for p in &self.tree.commands[command].parameters {
                let parameter = self.tree.parameter(*p);

                if !parameter.configurable || !parameter.invoked() {
                    continue;
                }

                let names = &parameter.names;
                let name = names
                    .longs
                    .first()
                    .cloned()
                    .or_else(|| names.positional.clone())
                    .or_else(|| names.shorts.first().map(char::to_string))
                    .unwrap_or_default();
                let mut inputs: Vec<String> =
                    parameter.invocations.iter().flatten().cloned().collect();

                if parameter.nargs.is_flag() {
                    inputs = vec![inputs
                        .into_iter()
                        .filter(|v| !v.is_empty())
                        .last()
                        .unwrap_or_else(|| "true".to_string())];
                }

                items.push(ConfigItem::new(parents.clone(), name, inputs));
            }
        }

        self.tree.format.to_config(&items)
    }
}

/// A view onto a command of the [`CommandLineParser`], for configuring it.
pub struct SubCommand<'p, 'a> {
    tree: &'p mut CommandTree<'a>,
    command: usize,
}

impl<'p, 'a> SubCommand<'p, 'a> {
    /// The handle of this command.
    pub fn id(&self) -> CommandId {
        CommandId(self.command)
    }

    /// Add a parameter to this command.
    pub fn add(&mut self, parameter: Parameter<'a>) -> Result<ParameterId, ConfigError> {
        self.tree
            .insert_parameter(self.command, parameter.consume())
            .map(ParameterId)
    }

    /// Add a nested sub-command to this command.
    pub fn subcommand(&mut self, name: impl Into<String>) -> Result<SubCommand<'_, 'a>, ConfigError> {
        let index = self.tree.insert_child(self.command, name)?;
        Ok(SubCommand {
            tree: &mut *self.tree,
            command: index,
        })
    }

    /// Document the about message for this command.
    pub fn about(&mut self, description: impl Into<String>) -> &mut Self {
        self.tree.commands[self.command]
            .about
            .replace(description.into());
        self
    }

    /// Document the text shown at the end of this command's help.
    pub fn footer(&mut self, text: impl Into<String>) -> &mut Self {
        self.tree.commands[self.command].footer.replace(text.into());
        self
    }

    /// Tolerate unknown options and surplus positionals; they are recorded in [`CommandLineParser::remaining`].
    pub fn allow_extras(&mut self, allow: bool) -> &mut Self {
        self.tree.commands[self.command].settings.allow_extras = allow;
        self
    }

    /// Tolerate configuration file items which match no parameter.
    pub fn allow_config_extras(&mut self, allow: bool) -> &mut Self {
        self.tree.commands[self.command].settings.allow_config_extras = allow;
        self
    }

    /// Stop parsing at the first unknown token (or once the positionals are full); the rest is left in [`CommandLineParser::remaining`].
    ///
    /// ### Example
    /// ```
    /// # use argtree_core as argtree;
    /// use argtree::{CommandLineParser, Nargs, Parameter};
    ///
    /// let mut parser = CommandLineParser::new("wrapper");
    /// parser.add(Parameter::values("-v", Nargs::Precisely(0))).unwrap();
    /// parser.add(Parameter::values("TOOL", Nargs::Precisely(1))).unwrap();
    /// let root = parser.root();
    /// parser.command(root).prefix_command(true);
    ///
    /// parser.parse_tokens(&["-v", "ls", "-la", "/tmp"]).unwrap();
    /// assert_eq!(parser.remaining(), vec!["-la".to_string(), "/tmp".to_string()]);
    /// ```
    pub fn prefix_command(&mut self, prefix: bool) -> &mut Self {
        self.tree.commands[self.command].settings.prefix_command = prefix;
        self
    }

    /// Resolve unknown options (and surplus positionals) against the parent command.
    pub fn fallthrough(&mut self, fallthrough: bool) -> &mut Self {
        self.tree.commands[self.command].settings.fallthrough = fallthrough;
        self
    }

    /// Match option and sub-command names regardless of case.
    pub fn ignore_case(&mut self, ignore: bool) -> Result<&mut Self, ConfigError> {
        let previous = self.tree.commands[self.command].settings.ignore_case;
        self.tree.commands[self.command].settings.ignore_case = ignore;

        if let Err(error) = self.tree.recheck(self.command) {
            self.tree.commands[self.command].settings.ignore_case = previous;
            return Err(error);
        }

        Ok(self)
    }

    /// Match option and sub-command names regardless of underscores.
    pub fn ignore_underscore(&mut self, ignore: bool) -> Result<&mut Self, ConfigError> {
        let previous = self.tree.commands[self.command].settings.ignore_underscore;
        self.tree.commands[self.command].settings.ignore_underscore = ignore;

        if let Err(error) = self.tree.recheck(self.command) {
            self.tree.commands[self.command].settings.ignore_underscore = previous;
            return Err(error);
        }

        Ok(self)
    }

    /// Demand that one of this command's sub-commands is selected.
    pub fn require_subcommand(&mut self, require: bool) -> &mut Self {
        self.tree.commands[self.command].require_subcommand = require;
        self
    }

    /// Run `callback` once this command completes a parse.
    /// Callbacks run from the root down to the deepest selected sub-command.
    pub fn callback(&mut self, callback: impl FnMut() + 'a) -> &mut Self {
        self.tree.commands[self.command].callback = Some(Box::new(callback));
        self
    }

    /// Replace the help flag of this command (`None` removes it).
    /// Sub-commands added afterwards inherit the change.
    pub fn help_flag(&mut self, names: Option<&str>) -> Result<&mut Self, ConfigError> {
        self.tree.set_help(self.command, names)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Collection, Counter, Optional, Scalar, Switch};
    use crate::model::MultiOptionPolicy;
    use crate::parser::util::channel_interface;
    use crate::test::assert_contains;
    use rand::Rng;
    use rstest::rstest;

    #[test]
    fn empty() {
        let mut parser = CommandLineParser::new("program");
        assert_eq!(parser.parse_tokens(&[]), Ok(Parsed::Complete));
        assert!(parser.is_parsed(parser.root()));
        assert_eq!(parser.remaining(), Vec::<String>::default());
    }

    #[test]
    fn short_attached_value() {
        // Setup
        let mut value: u32 = 0;
        let mut parser = CommandLineParser::new("program");
        parser
            .add(Parameter::option(Scalar::new(&mut value), "-i,--int"))
            .unwrap();

        // Execute
        parser.parse_tokens(&["-i4"]).unwrap();

        // Verify
        assert_eq!(parser.count("-i"), Ok(1));
        assert_eq!(parser.count("--int"), Ok(1));
        assert_eq!(parser.count("int"), Ok(1));
        drop(parser);
        assert_eq!(value, 4);
    }

    #[rstest]
    #[case(MultiOptionPolicy::Throw, None)]
    #[case(MultiOptionPolicy::TakeLast, Some("two"))]
    #[case(MultiOptionPolicy::TakeFirst, Some("one"))]
    #[case(MultiOptionPolicy::Join, Some("one\ntwo"))]
    fn repeated_invocations(#[case] policy: MultiOptionPolicy, #[case] expected: Option<&str>) {
        // Setup
        let mut value = String::default();
        let mut parser = CommandLineParser::new("program");
        let id = parser
            .add(Parameter::option(Scalar::new(&mut value), "--str").multi_option_policy(policy))
            .unwrap();

        // Execute
        let result = parser.parse_tokens(&["--str", "one", "--str", "two"]);

        // Verify
        assert_eq!(
            parser.invocations(id).unwrap(),
            vec![vec!["one".to_string()], vec!["two".to_string()]]
        );
        drop(parser);

        match expected {
            Some(expected) => {
                assert_eq!(result, Ok(Parsed::Complete));
                assert_eq!(value, expected);
            }
            None => {
                assert_matches!(result, Err(ParseError::ArgumentMismatch { .. }));
            }
        }
    }

    #[test]
    fn positional_mark() {
        // Setup
        let mut flag: usize = 0;
        let mut posit: Vec<String> = Vec::default();
        let mut parser = CommandLineParser::new("program");
        parser
            .add(Parameter::option(Counter::new(&mut flag), "--one"))
            .unwrap();
        parser
            .add(Parameter::argument(Collection::new(&mut posit, Nargs::Any), "posit"))
            .unwrap();

        // Execute
        parser.parse_tokens(&["--", "--one", "two"]).unwrap();

        // Verify
        assert_eq!(parser.count("--one"), Ok(0));
        assert_eq!(parser.count("posit"), Ok(2));
        drop(parser);
        assert_eq!(flag, 0);
        assert_eq!(posit, vec!["--one", "two"]);
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn unknown_option(#[case] allow: bool) {
        // Setup
        let mut parser = CommandLineParser::new("program");
        let root = parser.root();
        parser.command(root).allow_extras(allow);

        // Execute
        let result = parser.parse_tokens(&["--nosuch"]);

        // Verify
        if allow {
            assert_eq!(result, Ok(Parsed::Complete));
            assert_eq!(parser.remaining(), vec!["--nosuch".to_string()]);
        } else {
            let error = result.unwrap_err();
            assert_eq!(error.exit_code(), 109);
            assert_contains!(error.to_string(), "--nosuch");
        }
    }

    #[test]
    fn chained_flags() {
        // Setup
        let mut lower = false;
        let mut upper = false;
        let mut parser = CommandLineParser::new("program");
        parser
            .add(Parameter::option(Switch::new(&mut lower, true), "-a"))
            .unwrap();
        parser
            .add(Parameter::option(Switch::new(&mut upper, true), "-A"))
            .unwrap();

        // Execute
        parser.parse_tokens(&["-aA"]).unwrap();
        let chained = (parser.count("-a"), parser.count("-A"));
        parser.parse_tokens(&["-a", "-A"]).unwrap();
        let separate = (parser.count("-a"), parser.count("-A"));

        // Verify
        assert_eq!(chained, (Ok(1), Ok(1)));
        assert_eq!(chained, separate);
        drop(parser);
        assert!(lower);
        assert!(upper);
    }

    #[rstest]
    #[case(false, Some("x"), vec!["y", "z"])]
    #[case(true, None, vec!["x", "y", "z"])]
    fn positional_order(
        #[case] reversed: bool,
        #[case] single_expected: Option<&str>,
        #[case] unlimited_expected: Vec<&str>,
    ) {
        // Setup
        let mut single: Option<String> = None;
        let mut unlimited: Vec<String> = Vec::default();
        let mut parser = CommandLineParser::new("program");
        let single_parameter = Parameter::argument(Optional::new(&mut single), "P1");
        let unlimited_parameter =
            Parameter::argument(Collection::new(&mut unlimited, Nargs::Any), "P2");

        if reversed {
            parser.add(unlimited_parameter).unwrap();
            parser.add(single_parameter).unwrap();
        } else {
            parser.add(single_parameter).unwrap();
            parser.add(unlimited_parameter).unwrap();
        }

        // Execute
        parser.parse_tokens(&["x", "y", "z"]).unwrap();

        // Verify
        drop(parser);
        assert_eq!(single.as_deref(), single_expected);
        assert_eq!(unlimited, unlimited_expected);
    }

    #[test]
    fn reset_idempotence() {
        // Setup
        let mut rng = rand::thread_rng();
        let values: Vec<String> = (0..rng.gen_range(1..8))
            .map(|_| rng.gen_range(0..1000).to_string())
            .collect();
        let mut tokens: Vec<&str> = vec!["--items"];
        tokens.extend(values.iter().map(String::as_str));
        let mut parser = CommandLineParser::new("program");
        let id = parser
            .add(Parameter::values("--items", Nargs::AtLeastOne))
            .unwrap();

        // Execute
        parser.parse_tokens(&tokens).unwrap();
        let first = parser.results(id).unwrap();
        parser.reset();
        let cleared = parser.results(id).unwrap();
        parser.parse_tokens(&tokens).unwrap();
        let second = parser.results(id).unwrap();

        // Verify
        assert_eq!(first, values);
        assert_eq!(cleared, Vec::<String>::default());
        assert_eq!(second, first);
    }

    #[test]
    fn requires_excludes() {
        // Setup
        let mut parser = CommandLineParser::new("program");
        let a = parser.add(Parameter::values("-a", Nargs::Precisely(0))).unwrap();
        let b = parser.add(Parameter::values("-b", Nargs::Precisely(0))).unwrap();
        let c = parser.add(Parameter::values("-c", Nargs::Precisely(0))).unwrap();
        parser.requires(a, b).unwrap();
        parser.excludes(a, c).unwrap();

        // Execute & Verify
        let error = parser.parse_tokens(&["-a"]).unwrap_err();
        assert_eq!(
            error,
            ParseError::Requires {
                name: "-a".to_string(),
                dependency: "-b".to_string(),
            }
        );
        assert_eq!(parser.parse_tokens(&["-a", "-b"]), Ok(Parsed::Complete));
        assert_matches!(parser.parse_tokens(&["-abc"]), Err(ParseError::Excludes { .. }));
        assert_eq!(parser.parse_tokens(&["-c"]), Ok(Parsed::Complete));
        assert_eq!(parser.requires(a, b), Err(ConfigError::DuplicateEdge {
            dependent: "-a".to_string(),
            relation: "requires",
            dependency: "-b".to_string(),
        }));

        parser.remove(b).unwrap();
        assert_eq!(parser.parse_tokens(&["-a"]), Ok(Parsed::Complete));
        assert_eq!(parser.results(b), Err(LookupError::ParameterNotFound("#2".to_string())));
    }

    #[test]
    fn subcommands() {
        // Setup
        let mut verbose = false;
        let mut port: u16 = 0;
        let mut level: u8 = 0;
        let mut parser = CommandLineParser::new("program");
        parser
            .add(Parameter::option(Switch::new(&mut verbose, true), "-v"))
            .unwrap();
        let mut serve = parser.subcommand("serve").unwrap();
        serve
            .add(Parameter::option(Scalar::new(&mut port), "-p,--port"))
            .unwrap();
        let serve_id = serve.id();
        serve
            .subcommand("debug")
            .unwrap()
            .add(Parameter::argument(Scalar::new(&mut level), "LEVEL"))
            .unwrap();
        parser.subcommand("stop").unwrap();

        // Execute
        parser
            .parse_tokens(&["-v", "serve", "-p", "80", "debug", "3"])
            .unwrap();

        // Verify
        assert_eq!(parser.subcommand_path(), vec!["serve", "debug"]);
        assert_eq!(parser.selected(parser.root()), Some(serve_id));
        assert!(parser.is_parsed(serve_id));
        assert_eq!(parser.count_in(serve_id, "--port"), Ok(1));
        assert!(parser.count("--port").is_err());
        drop(parser);
        assert!(verbose);
        assert_eq!(port, 80);
        assert_eq!(level, 3);
    }

    #[test]
    fn subcommand_duplicate() {
        let mut parser = CommandLineParser::new("program");
        parser.subcommand("serve").unwrap();
        assert_matches!(
            parser.subcommand("serve").err(),
            Some(ConfigError::Duplicate { .. })
        );
    }

    #[test]
    fn require_subcommand() {
        let mut parser = CommandLineParser::new("program");
        parser.subcommand("serve").unwrap();
        let root = parser.root();
        parser.command(root).require_subcommand(true);

        assert_eq!(
            parser.parse_tokens(&[]),
            Err(ParseError::RequiredSubcommand("program".to_string()))
        );
        assert_eq!(parser.parse_tokens(&["serve"]), Ok(Parsed::Complete));
    }

    #[test]
    fn ignore_case() {
        // Setup
        let mut parser = CommandLineParser::new("program");
        parser.add(Parameter::values("--Name", Nargs::Precisely(1))).unwrap();
        let root = parser.root();
        parser.command(root).ignore_case(true).unwrap();
        parser.subcommand("Serve").unwrap();

        // Execute
        parser.parse_tokens(&["--NAME", "x", "serve"]).unwrap();

        // Verify
        assert_eq!(parser.count("--name"), Ok(1));
        assert_eq!(parser.subcommand_path(), vec!["Serve"]);
    }

    #[test]
    fn ignore_case_collision() {
        let mut parser = CommandLineParser::new("program");
        parser.add(Parameter::values("--name", Nargs::Precisely(1))).unwrap();
        parser.add(Parameter::values("--NAME", Nargs::Precisely(1))).unwrap();
        let root = parser.root();
        assert_matches!(
            parser.command(root).ignore_case(true).err(),
            Some(ConfigError::Duplicate { .. })
        );
        assert_eq!(parser.parse_tokens(&["--NAME", "x"]), Ok(Parsed::Complete));
    }

    #[test]
    fn callbacks() {
        // Setup
        let mut fired: usize = 0;
        let mut parser = CommandLineParser::new("program");
        parser.subcommand("serve").unwrap().callback(|| fired += 1);

        // Execute
        parser.parse_tokens(&[]).unwrap();
        parser.parse_tokens(&["serve"]).unwrap();

        // Verify
        drop(parser);
        assert_eq!(fired, 1);
    }

    #[test]
    fn help_flag() {
        // Setup
        let mut parser = CommandLineParser::new("program");
        let root = parser.root();
        parser.command(root).help_flag(Some("-H,--usage")).unwrap();
        let serve = parser.subcommand("serve").unwrap().id();

        // Execute & Verify
        assert_eq!(parser.parse_tokens(&["-H"]), Ok(Parsed::Help(root)));
        assert_eq!(parser.parse_tokens(&["serve", "--usage"]), Ok(Parsed::Help(serve)));
        assert!(parser.parse_tokens(&["--help"]).is_err());

        parser.command(root).help_flag(None).unwrap();
        assert!(parser.parse_tokens(&["--usage"]).is_err());
    }

    #[test]
    fn invoke_help() {
        // Setup
        let (sender, receiver) = channel_interface();
        let mut parser = CommandLineParser::new("program");
        parser.user_interface = Box::new(sender);
        parser.formatter(HelpFormatter::fixed(80));
        parser.about("Does things.");
        parser
            .add(Parameter::values("-i,--int", Nargs::Precisely(1)).help("An integer."))
            .unwrap();

        // Execute
        let exit_code = parser.invoke(vec!["--help".to_string()]).unwrap_err();

        // Verify
        assert_eq!(exit_code, 0);
        drop(parser);
        let (message, error) = receiver.consume();
        let message = message.unwrap();
        assert_contains!(message, "usage: program [-h] [-i INT]");
        assert_contains!(message, "Does things.");
        assert_contains!(message, "-i, --int INT");
        assert_contains!(message, "An integer.");
        assert_eq!(error, None);
    }

    #[rstest]
    #[case(vec!["--int", "x"], 104, true)]
    #[case(vec!["--int"], 114, true)]
    #[case(vec!["--config", "/no/such/file.ini"], 103, false)]
    fn invoke_error(#[case] tokens: Vec<&str>, #[case] code: i32, #[case] usage: bool) {
        // Setup
        let mut value: u32 = 0;
        let (sender, receiver) = channel_interface();
        let mut parser = CommandLineParser::new("program");
        parser.user_interface = Box::new(sender);
        parser.set_config("--config", None, false).unwrap();
        parser
            .add(Parameter::option(Scalar::new(&mut value), "--int"))
            .unwrap();

        // Execute
        let exit_code = parser
            .invoke(tokens.iter().map(|t| t.to_string()).collect())
            .unwrap_err();

        // Verify
        assert_eq!(exit_code, code);
        drop(parser);
        let (message, error) = receiver.consume();
        assert!(error.is_some());

        if usage {
            assert_eq!(message, Some("Run with --help for more information.".to_string()));
        } else {
            assert_eq!(message, None);
        }
    }

    #[rstest]
    #[case(vec!["-vvv"], "", None, 3, false)]
    #[case(vec!["-vv", "--verbose=false"], "", None, 1, false)]
    #[case(vec!["--verbose=false"], "", None, 0, false)]
    #[case(vec![], "verbose = 3\nquiet = false\n", None, 3, false)]
    #[case(vec![], "", Some("3"), 3, true)]
    #[case(vec!["-v"], "verbose = 5\n", Some("yes"), 1, true)]
    fn flag_counts(
        #[case] tokens: Vec<&str>,
        #[case] contents: &str,
        #[case] environment: Option<&str>,
        #[case] expected_verbose: usize,
        #[case] expected_quiet: bool,
    ) {
        // Setup
        let id = rand::thread_rng().gen::<u32>();
        let path = std::env::temp_dir().join(format!("argtree-flags-{id}.ini"));
        std::fs::write(&path, contents).unwrap();
        let config = path.to_string_lossy().to_string();
        let variable = format!("ARGTREE_TEST_QUIET_{id}");

        if let Some(value) = environment {
            std::env::set_var(&variable, value);
        }

        let mut verbose: usize = 0;
        let mut quiet = false;
        let mut parser = CommandLineParser::new("program");
        parser
            .set_config("--config", Some(config.as_str()), false)
            .unwrap();
        parser
            .add(Parameter::option(Counter::new(&mut verbose), "-v,--verbose").env(&variable))
            .unwrap();
        parser
            .add(Parameter::option(Switch::new(&mut quiet, true), "-q,--quiet").env(&variable))
            .unwrap();

        // Execute
        let result = parser.parse_tokens(&tokens);

        // Verify
        std::fs::remove_file(&path).unwrap();
        std::env::remove_var(&variable);
        assert_eq!(result, Ok(Parsed::Complete));
        drop(parser);
        assert_eq!(verbose, expected_verbose);
        assert_eq!(quiet, expected_quiet);
    }

    #[test]
    fn flag_validators() {
        let mut verbose: usize = 0;
        let mut parser = CommandLineParser::new("program");
        assert_matches!(
            parser.add(
                Parameter::option(Counter::new(&mut verbose), "-v")
                    .check(|_: &mut String| -> Result<(), String> { Err("rejected".to_string()) })
            ),
            Err(ConfigError::IncorrectConstruction(_))
        );
        assert_eq!(parser.parse_tokens(&["-v"]), Err(ParseError::Extras(vec!["-v".to_string()])));
    }

    #[test]
    fn to_config() {
        // Setup
        let mut parser = CommandLineParser::new("program");
        parser.set_config("--config", None, false).unwrap();
        parser.add(Parameter::values("-v,--verbose", Nargs::Precisely(0))).unwrap();
        parser.add(Parameter::values("--skipped", Nargs::Precisely(1))).unwrap();
        parser
            .subcommand("serve")
            .unwrap()
            .add(Parameter::values("HOSTS", Nargs::Any))
            .unwrap();

        // Execute
        parser
            .parse_tokens(&["-v", "serve", "a", "b c"])
            .unwrap();

        // Verify
        assert_eq!(
            parser.to_config(),
            "verbose = true\n\n[serve]\nHOSTS = a \"b c\"\n"
        );
    }
}
