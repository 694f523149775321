use crate::api::{CliArgument, CliOption, GenericCapturable, InvalidCapture};
use crate::model::{MultiOptionPolicy, Nargs};
use crate::parser::{AnonymousCapturable, Unbound};
use crate::prelude::Validator;

pub(crate) struct AnonymousCapture<'a, T: 'a> {
    field: Box<dyn GenericCapturable<'a, T> + 'a>,
}

impl<'a, T> AnonymousCapture<'a, T> {
    pub(crate) fn bind(field: impl GenericCapturable<'a, T> + 'a) -> Self {
        Self {
            field: Box::new(field),
        }
    }
}

impl<'a, T> AnonymousCapturable for AnonymousCapture<'a, T> {
    fn matched(&mut self) {
        self.field.matched();
    }

    fn flagged(&mut self, count: i64) {
        self.field.flagged(count);
    }

    fn capture(&mut self, value: &str) -> Result<(), InvalidCapture> {
        self.field.capture(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParameterClass {
    Opt,
    Arg,
    Raw,
}

struct Transformer<F>(F);

impl<F> Validator for Transformer<F>
where
    F: Fn(&str) -> String,
{
    fn validate(&self, value: &mut String) -> Result<(), String> {
        *value = (self.0)(value);
        Ok(())
    }
}

pub(crate) struct ParameterInner<'a> {
    pub(crate) class: ParameterClass,
    pub(crate) declaration: String,
    pub(crate) capture: Box<dyn AnonymousCapturable + 'a>,
    pub(crate) nargs: Nargs,
    pub(crate) vector: bool,
    pub(crate) required: bool,
    pub(crate) configurable: bool,
    pub(crate) env: Option<String>,
    pub(crate) policy: MultiOptionPolicy,
    pub(crate) help: Option<String>,
    pub(crate) validators: Vec<Box<dyn Validator + 'a>>,
}

impl<'a> std::fmt::Debug for ParameterInner<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let help = if let Some(d) = &self.help {
            format!(", {d}")
        } else {
            "".to_string()
        };

        write!(
            f,
            "{class:?}[{nargs}, {declaration}{help}]",
            class = self.class,
            nargs = self.nargs,
            declaration = self.declaration,
        )
    }
}

/// An argument/option for the command parser.
/// Used with [`CommandLineParser::add`](./struct.CommandLineParser.html#method.add) and [`SubCommand::add`](./struct.SubCommand.html#method.add).
///
/// Names are declared as a comma separated list: short names (`-v`), long names (`--verbose`), and positional names (`FILE`).
pub struct Parameter<'a>(ParameterInner<'a>);

impl<'a> Parameter<'a> {
    fn inner(
        class: ParameterClass,
        declaration: String,
        capture: Box<dyn AnonymousCapturable + 'a>,
        nargs: Nargs,
        vector: bool,
    ) -> Self {
        Self(ParameterInner {
            class,
            declaration,
            capture,
            nargs,
            vector,
            required: false,
            configurable: true,
            env: None,
            policy: MultiOptionPolicy::default(),
            help: None,
            validators: Vec::default(),
        })
    }

    /// Create an option parameter, named by its short and/or long names.
    ///
    /// ### Example
    /// ```
    /// # use argtree_core as argtree;
    /// use argtree::{Parameter, Switch};
    ///
    /// let mut verbose: bool = false;
    /// Parameter::option(Switch::new(&mut verbose, true), "-v,--verbose");
    /// ```
    pub fn option<T: 'a>(
        field: impl GenericCapturable<'a, T> + CliOption + 'a,
        names: impl Into<String>,
    ) -> Self {
        let nargs = field.nargs();
        let vector = field.vector();
        Self::inner(
            ParameterClass::Opt,
            names.into(),
            Box::new(AnonymousCapture::bind(field)),
            nargs,
            vector,
        )
    }

    /// Create a positional argument parameter.
    ///
    /// The order of argument parameters corresponds to their positional order during parsing.
    ///
    /// ### Example
    /// ```
    /// # use argtree_core as argtree;
    /// use argtree::{Parameter, Scalar};
    ///
    /// let mut item: u32 = 0;
    /// Parameter::argument(Scalar::new(&mut item), "ITEM");
    /// ```
    pub fn argument<T: 'a>(
        field: impl GenericCapturable<'a, T> + CliArgument + 'a,
        name: impl Into<String>,
    ) -> Self {
        let nargs = field.nargs();
        let vector = field.vector();
        Self::inner(
            ParameterClass::Arg,
            name.into(),
            Box::new(AnonymousCapture::bind(field)),
            nargs,
            vector,
        )
    }

    /// Create a parameter without a bound variable.
    /// Its raw values are read back with the parser's queries (ex: [`CommandLineParser::results`](./struct.CommandLineParser.html#method.results)).
    ///
    /// May mix short, long, and positional names.
    /// Repeated invocations accumulate.
    ///
    /// ### Example
    /// ```
    /// # use argtree_core as argtree;
    /// use argtree::{Nargs, Parameter};
    ///
    /// Parameter::values("-f,--file,FILE", Nargs::Precisely(1));
    /// ```
    pub fn values(names: impl Into<String>, nargs: Nargs) -> Self {
        Self::inner(
            ParameterClass::Raw,
            names.into(),
            Box::new(Unbound::default()),
            nargs,
            true,
        )
    }

    /// Document the help message for this parameter.
    /// If repeated, only the final message will apply to the parameter.
    pub fn help(self, description: impl Into<String>) -> Self {
        let mut inner = self.0;
        inner.help = Some(description.into());
        Self(inner)
    }

    /// Require this parameter to be provided (from the command line, configuration, or environment).
    pub fn required(self) -> Self {
        let mut inner = self.0;
        inner.required = true;
        Self(inner)
    }

    /// Read the parameter from the environment variable `name`, when not otherwise provided.
    pub fn env(self, name: impl Into<String>) -> Self {
        let mut inner = self.0;
        inner.env = Some(name.into());
        Self(inner)
    }

    /// Set how repeated invocations are reduced.
    /// Only applies to parameters of fixed [`Nargs`].
    ///
    /// ### Example
    /// ```
    /// # use argtree_core as argtree;
    /// use argtree::{CommandLineParser, MultiOptionPolicy, Parameter, Scalar};
    ///
    /// let mut name: String = "".to_string();
    /// let mut parser = CommandLineParser::new("program");
    /// parser
    ///     .add(
    ///         Parameter::option(Scalar::new(&mut name), "--name")
    ///             .multi_option_policy(MultiOptionPolicy::TakeLast),
    ///     )
    ///     .unwrap();
    ///
    /// parser.parse_tokens(&["--name", "one", "--name", "two"]).unwrap();
    /// drop(parser);
    /// assert_eq!(name, "two");
    /// ```
    pub fn multi_option_policy(self, policy: MultiOptionPolicy) -> Self {
        let mut inner = self.0;
        inner.policy = policy;
        Self(inner)
    }

    /// Check each raw value before conversion.
    /// Checks run in the order they are declared.
    ///
    /// Flags take no values, so they may not be checked.
    ///
    /// ### Example
    /// ```
    /// # use argtree_core as argtree;
    /// use argtree::{CommandLineParser, Parameter, Scalar};
    ///
    /// let mut name: String = "".to_string();
    /// let mut parser = CommandLineParser::new("program");
    /// parser
    ///     .add(Parameter::argument(Scalar::new(&mut name), "NAME").check(|value: &mut String| {
    ///         if value.starts_with('x') {
    ///             Ok(())
    ///         } else {
    ///             Err("must start with 'x'".to_string())
    ///         }
    ///     }))
    ///     .unwrap();
    ///
    /// let error = parser.parse_tokens(&["abc"]).unwrap_err();
    /// assert_eq!(error.exit_code(), 105);
    /// ```
    pub fn check(self, validator: impl Validator + 'a) -> Self {
        let mut inner = self.0;
        inner.validators.push(Box::new(validator));
        Self(inner)
    }

    /// Rewrite each raw value before conversion.
    /// Shares its ordering with [`Parameter::check`].
    pub fn transform(self, transformer: impl Fn(&str) -> String + 'a) -> Self {
        self.check(Transformer(transformer))
    }

    /// Whether this parameter may be set from a configuration file (default: `true`).
    pub fn configurable(self, configurable: bool) -> Self {
        let mut inner = self.0;
        inner.configurable = configurable;
        Self(inner)
    }

    pub(crate) fn consume(self) -> ParameterInner<'a> {
        self.0
    }
}
