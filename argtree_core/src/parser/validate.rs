use crate::config::to_flag;
use crate::constant::JOIN_SEPARATOR;
use crate::model::{MultiOptionPolicy, Nargs};
use crate::parser::{CommandTree, ParameterState, ParseError};

impl<'a> CommandTree<'a> {
    /// Capture, then validate, the parameters of `command`.
    pub(crate) fn finalize(&mut self, command: usize) -> Result<(), ParseError> {
        let parameters = self.commands[command].parameters.clone();

        for p in &parameters {
            self.capture(*p)?;
        }

        for p in &parameters {
            let parameter = self.parameter(*p);

            if parameter.required && !parameter.invoked() {
                return Err(ParseError::Required(parameter.display()));
            }
        }

        let scope = &self.commands[command];

        if !scope.overflow.is_empty() {
            return Err(ParseError::PositionalOverflow(scope.overflow.clone()));
        }

        if !scope.missing.is_empty()
            && !scope.settings.allow_extras
            && !scope.settings.prefix_command
        {
            return Err(ParseError::Extras(scope.missing.clone()));
        }

        for p in &parameters {
            self.check_edges(*p)?;
        }

        let scope = &self.commands[command];

        if scope.require_subcommand && scope.selected.is_none() {
            return Err(ParseError::RequiredSubcommand(
                self.lineage(command).join(" "),
            ));
        }

        Ok(())
    }

    /// Run the checks, reduce the invocations, and convert into the bound field.
    fn capture(&mut self, index: usize) -> Result<(), ParseError> {
        let parameter = self.parameter_mut(index);

        if !parameter.invoked() {
            return Ok(());
        }

        let name = parameter.display();

        if parameter.nargs.is_flag() {
            let mut count = 0i64;

            for value in parameter.invocations.iter().flatten() {
                // Command line flags hold an empty placeholder; configuration and environment hold text.
                count += if value.is_empty() {
                    1
                } else {
                    to_flag(value).map_err(|reason| ParseError::Conversion {
                        name: name.clone(),
                        values: value.clone(),
                        reason,
                    })?
                };
            }

            parameter.capture.flagged(count);
            return Ok(());
        }

        for validator in &parameter.validators {
            for value in parameter.invocations.iter_mut().flatten() {
                validator
                    .validate(value)
                    .map_err(|message| ParseError::Validation {
                        name: name.clone(),
                        message,
                    })?;
            }
        }

        let values = reduce(parameter)?;
        parameter.capture.matched();

        for value in &values {
            parameter
                .capture
                .capture(value)
                .map_err(|error| ParseError::conversion(name.clone(), &values, error))?;
        }

        Ok(())
    }

    fn check_edges(&self, index: usize) -> Result<(), ParseError> {
        let parameter = self.parameter(index);

        if !parameter.invoked() {
            return Ok(());
        }

        for dependency in &parameter.requires {
            if !self.parameter(*dependency).invoked() {
                return Err(ParseError::Requires {
                    name: parameter.display(),
                    dependency: self.parameter(*dependency).display(),
                });
            }
        }

        for excluded in &parameter.excludes {
            if self.parameter(*excluded).invoked() {
                return Err(ParseError::Excludes {
                    name: parameter.display(),
                    excluded: self.parameter(*excluded).display(),
                });
            }
        }

        Ok(())
    }
}

/// Check the arity of the invocations and reduce them per the multi option policy.
fn reduce(parameter: &ParameterState) -> Result<Vec<String>, ParseError> {
    let values: Vec<String> = parameter.invocations.iter().flatten().cloned().collect();
    let mismatch = |expected: String, received: usize| ParseError::ArgumentMismatch {
        name: parameter.display(),
        expected,
        received,
    };

    if parameter.nargs == Nargs::AtLeastOne && parameter.invocations.iter().any(Vec::is_empty) {
        return Err(mismatch("at least 1".to_string(), 0));
    }

    let limit = parameter.nargs.capacity();

    match parameter.policy {
        MultiOptionPolicy::Throw => {
            if let Some(n) = limit {
                if parameter.vector && values.len() % n != 0 {
                    return Err(mismatch(format!("a multiple of {n}"), values.len()));
                } else if !parameter.vector && values.len() != n {
                    return Err(mismatch(format!("exactly {n}"), values.len()));
                }
            }

            Ok(values)
        }
        MultiOptionPolicy::TakeLast => {
            let skip = values.len().saturating_sub(limit.unwrap_or(1));
            Ok(values.into_iter().skip(skip).collect())
        }
        MultiOptionPolicy::TakeFirst => Ok(values.into_iter().take(limit.unwrap_or(1)).collect()),
        MultiOptionPolicy::Join => Ok(vec![values.join(JOIN_SEPARATOR)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Collection, Counter, Optional, Parameter, Scalar, Switch};
    use crate::parser::{Relation, ROOT};
    use crate::test::assert_contains;
    use rstest::rstest;

    fn invoke(tree: &mut CommandTree, parameter: usize, invocations: Vec<Vec<&str>>) {
        tree.parameter_mut(parameter).invocations = invocations
            .into_iter()
            .map(|i| i.into_iter().map(String::from).collect())
            .collect();
    }

    #[rstest]
    #[case(vec![vec!["1"]], Ok(1))]
    #[case(vec![vec!["1"], vec!["2"]], Err("exactly 1"))]
    #[case(vec![vec!["x"]], Err("not-u32"))]
    fn capture_scalar(#[case] invocations: Vec<Vec<&str>>, #[case] expected: Result<u32, &str>) {
        // Setup
        let mut value: u32 = 0;
        let mut tree = CommandTree::new("program");
        let p = tree
            .insert_parameter(ROOT, Parameter::option(Scalar::new(&mut value), "--value").consume())
            .unwrap();
        invoke(&mut tree, p, invocations);

        // Execute
        let result = tree.finalize(ROOT);
        drop(tree);

        // Verify
        match expected {
            Ok(expected) => {
                result.unwrap();
                assert_eq!(value, expected);
            }
            Err("exactly 1") => {
                assert_eq!(
                    result.unwrap_err(),
                    ParseError::ArgumentMismatch {
                        name: "--value".to_string(),
                        expected: "exactly 1".to_string(),
                        received: 2,
                    }
                );
            }
            Err(_) => {
                let error = result.unwrap_err();
                assert_matches!(&error, ParseError::Conversion { name, values, .. } if name == "--value" && values == "x");
                assert_eq!(error.exit_code(), 104);
            }
        }
    }

    #[rstest]
    #[case(MultiOptionPolicy::TakeLast, "two")]
    #[case(MultiOptionPolicy::TakeFirst, "one")]
    #[case(MultiOptionPolicy::Join, "one\ntwo")]
    fn capture_policy(#[case] policy: MultiOptionPolicy, #[case] expected: &str) {
        // Setup
        let mut value: String = String::default();
        let mut tree = CommandTree::new("program");
        let p = tree
            .insert_parameter(
                ROOT,
                Parameter::option(Scalar::new(&mut value), "--str")
                    .multi_option_policy(policy)
                    .consume(),
            )
            .unwrap();
        invoke(&mut tree, p, vec![vec!["one"], vec!["two"]]);

        // Execute
        tree.finalize(ROOT).unwrap();

        // Verify
        drop(tree);
        assert_eq!(value, expected);
    }

    #[test]
    fn capture_collection() {
        // Setup
        let mut items: Vec<u32> = Vec::default();
        let mut tree = CommandTree::new("program");
        let p = tree
            .insert_parameter(
                ROOT,
                Parameter::option(Collection::new(&mut items, Nargs::Precisely(2)), "--pair")
                    .consume(),
            )
            .unwrap();
        invoke(&mut tree, p, vec![vec!["1", "2"], vec!["3", "4"]]);

        // Execute
        tree.finalize(ROOT).unwrap();

        // Verify
        drop(tree);
        assert_eq!(items, vec![1, 2, 3, 4]);
    }

    #[test]
    fn capture_collection_mismatch() {
        // Setup
        let mut items: Vec<u32> = Vec::default();
        let mut tree = CommandTree::new("program");
        let p = tree
            .insert_parameter(
                ROOT,
                Parameter::option(Collection::new(&mut items, Nargs::Precisely(2)), "--pair")
                    .consume(),
            )
            .unwrap();
        invoke(&mut tree, p, vec![vec!["1", "2", "3"]]);

        // Execute
        let error = tree.finalize(ROOT).unwrap_err();

        // Verify
        assert_eq!(
            error,
            ParseError::ArgumentMismatch {
                name: "--pair".to_string(),
                expected: "a multiple of 2".to_string(),
                received: 3,
            }
        );
    }

    #[test]
    fn capture_at_least_one() {
        let mut items: Vec<u32> = Vec::default();
        let mut tree = CommandTree::new("program");
        let p = tree
            .insert_parameter(
                ROOT,
                Parameter::option(Collection::new(&mut items, Nargs::AtLeastOne), "--items")
                    .consume(),
            )
            .unwrap();
        invoke(&mut tree, p, vec![vec![]]);
        assert_matches!(
            tree.finalize(ROOT),
            Err(ParseError::ArgumentMismatch { received: 0, .. })
        );
    }

    #[rstest]
    #[case(vec![vec![""]], true, 1)]
    #[case(vec![vec![""], vec![""], vec![""]], true, 3)]
    #[case(vec![vec!["yes"]], true, 1)]
    #[case(vec![vec!["Off"]], false, 0)]
    #[case(vec![vec!["3"]], true, 3)]
    #[case(vec![vec!["false"]], false, 0)]
    #[case(vec![vec!["false"], vec![""]], false, 0)]
    #[case(vec![vec![""], vec![""], vec!["false"]], true, 1)]
    fn capture_flags(
        #[case] invocations: Vec<Vec<&str>>,
        #[case] switched: bool,
        #[case] counted: usize,
    ) {
        // Setup
        let mut verbose = false;
        let mut count: usize = 0;
        let mut tree = CommandTree::new("program");
        let s = tree
            .insert_parameter(ROOT, Parameter::option(Switch::new(&mut verbose, true), "-v").consume())
            .unwrap();
        let c = tree
            .insert_parameter(ROOT, Parameter::option(Counter::new(&mut count), "-c").consume())
            .unwrap();
        invoke(&mut tree, s, invocations.clone());
        invoke(&mut tree, c, invocations);

        // Execute
        tree.finalize(ROOT).unwrap();

        // Verify
        drop(tree);
        assert_eq!(verbose, switched);
        assert_eq!(count, counted);
    }

    #[test]
    fn capture_flag_invalid() {
        let mut verbose = false;
        let mut tree = CommandTree::new("program");
        let s = tree
            .insert_parameter(ROOT, Parameter::option(Switch::new(&mut verbose, true), "-v").consume())
            .unwrap();
        invoke(&mut tree, s, vec![vec!["maybe"]]);
        assert_matches!(tree.finalize(ROOT), Err(ParseError::Conversion { .. }));
    }

    #[test]
    fn capture_validators() {
        // Setup
        let mut value: Option<String> = None;
        let mut tree = CommandTree::new("program");
        let p = tree
            .insert_parameter(
                ROOT,
                Parameter::option(Optional::new(&mut value), "--name")
                    .transform(|v| v.trim().to_string())
                    .check(|v: &mut String| -> Result<(), String> {
                        if v.is_empty() {
                            Err("must not be blank".to_string())
                        } else {
                            v.push('!');
                            Ok(())
                        }
                    })
                    .consume(),
            )
            .unwrap();
        invoke(&mut tree, p, vec![vec!["  abc "]]);

        // Execute
        tree.finalize(ROOT).unwrap();

        // Verify
        assert_eq!(tree.parameter(p).invocations, vec![vec!["abc!".to_string()]]);
        drop(tree);
        assert_eq!(value, Some("abc!".to_string()));
    }

    #[test]
    fn capture_validators_reject() {
        let mut tree = CommandTree::new("program");
        let p = tree
            .insert_parameter(
                ROOT,
                Parameter::values("--name", Nargs::Precisely(1))
                    .check(|_: &mut String| -> Result<(), String> { Err("nope".to_string()) })
                    .consume(),
            )
            .unwrap();
        invoke(&mut tree, p, vec![vec!["abc"]]);
        assert_eq!(
            tree.finalize(ROOT).unwrap_err(),
            ParseError::Validation {
                name: "--name".to_string(),
                message: "nope".to_string(),
            }
        );
    }

    #[test]
    fn required() {
        let mut tree = CommandTree::new("program");
        tree.insert_parameter(
            ROOT,
            Parameter::values("-r,--req", Nargs::Precisely(1)).required().consume(),
        )
        .unwrap();
        assert_eq!(
            tree.finalize(ROOT).unwrap_err(),
            ParseError::Required("--req".to_string())
        );
    }

    #[rstest]
    #[case(false, false, Err(ParseError::Extras(vec!["--nosuch".to_string()])))]
    #[case(true, false, Ok(()))]
    #[case(false, true, Ok(()))]
    fn extras(
        #[case] allow_extras: bool,
        #[case] prefix_command: bool,
        #[case] expected: Result<(), ParseError>,
    ) {
        let mut tree = CommandTree::new("program");
        tree.commands[ROOT].settings.allow_extras = allow_extras;
        tree.commands[ROOT].settings.prefix_command = prefix_command;
        tree.commands[ROOT].missing.push("--nosuch".to_string());
        assert_eq!(tree.finalize(ROOT), expected);
    }

    #[test]
    fn overflow() {
        let mut tree = CommandTree::new("program");
        tree.commands[ROOT].overflow.push("x".to_string());
        assert_eq!(
            tree.finalize(ROOT),
            Err(ParseError::PositionalOverflow(vec!["x".to_string()]))
        );
    }

    #[rstest]
    #[case(Relation::Requires, true, false, Some(107))]
    #[case(Relation::Requires, true, true, None)]
    #[case(Relation::Requires, false, false, None)]
    #[case(Relation::Excludes, true, true, Some(108))]
    #[case(Relation::Excludes, true, false, None)]
    #[case(Relation::Excludes, false, true, None)]
    fn edges(
        #[case] relation: Relation,
        #[case] a_invoked: bool,
        #[case] b_invoked: bool,
        #[case] exit_code: Option<i32>,
    ) {
        // Setup
        let mut tree = CommandTree::new("program");
        let a = tree
            .insert_parameter(ROOT, Parameter::values("-a", Nargs::Precisely(0)).consume())
            .unwrap();
        let b = tree
            .insert_parameter(ROOT, Parameter::values("-b", Nargs::Precisely(0)).consume())
            .unwrap();
        tree.add_edge(a, relation, b).unwrap();

        if a_invoked {
            invoke(&mut tree, a, vec![vec![""]]);
        }

        if b_invoked {
            invoke(&mut tree, b, vec![vec![""]]);
        }

        // Execute
        let result = tree.finalize(ROOT);

        // Verify
        match exit_code {
            Some(code) => {
                let error = result.unwrap_err();
                assert_eq!(error.exit_code(), code);
                assert_contains!(error.to_string(), "-a");
                assert_contains!(error.to_string(), "-b");
            }
            None => result.unwrap(),
        }
    }

    #[test]
    fn require_subcommand() {
        let mut tree = CommandTree::new("program");
        tree.insert_child(ROOT, "start").unwrap();
        tree.commands[ROOT].require_subcommand = true;
        assert_eq!(
            tree.finalize(ROOT),
            Err(ParseError::RequiredSubcommand("program".to_string()))
        );
    }
}
