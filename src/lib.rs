//! `argtree` is a command line parser for Rust, organized as a tree of sub-commands.
//!
//! `argtree` converts the flat list of process tokens into typed, validated program variables.
//! It prioritizes the following concerns:
//! * *Type safe argument parsing*:
//! The user should not call any `&str -> T` conversion functions directly.
//! * *Sub-command trees*:
//! Every command (the root program, or a sub-command at any depth) owns its own parameters and settings.
//! * *Layered inputs*:
//! Values come from the command line first, then a configuration file, then environment variables.
//! * *Detailed yet basic UX*:
//! Help and error output is plain text; there is no colour or shell completion support.
//!
//! # Usage
//! More examples are outlined in the `demos/` directory of this crate (`summer`, `sub_command` and `config_overlay`).
//!
//! ```no_run
#![doc = include_str!("../demos/summer.rs")]
//! ```
//!
//! ```console
//! $ summer -h
//! usage: summer [-h] ITEM [...]
//!
//! Sum the items.
//!
//! positional arguments:
//!  ITEM [...]   The items to sum.
//!
//! options:
//!  -h, --help   Show this help message and exit.
//!
//! $ summer 1 2 3
//! Sum: 6
//!
//! $ summer 1 blah
//! Parse error: The value '1 blah' is not valid for 'ITEM': cannot convert 'blah' to u32.
//! ```
//!
//! # Builder Api
//! Configure `argtree` by starting with a [`CommandLineParser`] and `add`ing parameters.
//! There are three classes of parameters: [`Parameter::option`], [`Parameter::argument`] and [`Parameter::values`].
//!
//! Options and arguments take a *field*, which binds a program variable `T` (via `&mut T`) and defines the parameter cardinality.
//! All type `T` parsing is controlled by [`std::str::FromStr`].
//! Values parameters bind no variable; their raw tokens are read back after parsing (ex: [`CommandLineParser::results`]).
//!
//! ### Fields
//! * [`Scalar`]: a single-value parameter.
//! * [`Optional`]: a single-value parameter bound to an `Option<T>`.
//! * [`Collection`]: a multi-value parameter, for any [Collectable](./prelude/trait.Collectable.html) container.
//! `argtree` provides `Collectable` for `Vec<T>`, `HashSet<T>` and `BTreeSet<T>`.
//! * [`Switch`]: a flag which assigns a target value when present.
//! * [`Counter`]: a flag which counts its invocations (ex: `-vvv`).
//!
//! The initial value of a bound variable is its default.
//! Collections are extended, never cleared.
//!
//! ### Sub-commands
//! Sub-commands are added with [`CommandLineParser::subcommand`], and nest with [`SubCommand::subcommand`].
//! A sub-command inherits the settings of its parent at the point it is added.
//!
//! ```no_run
#![doc = include_str!("../demos/sub_command.rs")]
//! ```
//!
//! ### Configuration files
//! [`CommandLineParser::set_config`] declares the configuration file option.
//! Items from the file apply only to parameters not given on the command line.
//! The default format is [`IniConfig`]; sections name sub-commands.
//!
//! ```no_run
#![doc = include_str!("../demos/config_overlay.rs")]
//! ```
//!
//! ```console
//! $ cat config_overlay.ini
//! greeting = Howdy
//! tags = [a, b]
//!
//! $ config-overlay there -r 2
//! greeting = Howdy
//! repeat = 2
//! tags = a b
//! NAME = there
//! Howdy, there! ["a", "b"]
//! Howdy, there! ["a", "b"]
//! ```
//!
//! # Cli Semantics
//! * Options are matched by `--NAME` or `-N`; the following tokens are bound per the option's cardinality.
//! * `--NAME=VALUE` and `-NVALUE` (or `-N=VALUE`) attach the first value to the option.
//! * Short flags may be combined: `-abc` is equivalent to `-a -b -c`.
//! * Unlimited options (`Nargs::Any`, `Nargs::AtLeastOne`) bind tokens greedily, until the next option or sub-command.
//! * Tokens after `--` are always positional.
//! * Positional tokens are distributed across argument parameters in declaration order.
//! Each takes tokens until it is full; an unlimited argument drains the rest.
//! * Requires and excludes relations are checked after all values are in.
//!
//! # Features
//! * `tracing_debug`: Emit `tracing` debug events during parsing.
pub use argtree_core::*;
