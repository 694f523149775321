use crate::api::{Parameter, ParameterClass, ParameterInner};
use crate::constant::HELP_MESSAGE;
use crate::matcher::{valid_name, Names};
use crate::model::{MultiOptionPolicy, Nargs};
use crate::parser::{CommandScope, CommandTree, ConfigError, ParameterState};

/// A dependency edge between two parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Relation {
    Requires,
    Excludes,
}

impl Relation {
    fn label(&self) -> &'static str {
        match self {
            Relation::Requires => "requires",
            Relation::Excludes => "excludes",
        }
    }
}

impl<'a> CommandTree<'a> {
    pub(crate) fn insert_parameter(
        &mut self,
        command: usize,
        inner: ParameterInner<'a>,
    ) -> Result<usize, ConfigError> {
        let names = Names::parse(&inner.declaration)?;
        let dashed = !names.shorts.is_empty() || !names.longs.is_empty();

        match inner.class {
            ParameterClass::Opt if names.is_positional() => {
                return Err(ConfigError::IncorrectConstruction(format!(
                    "option '{}' must only declare dashed names.",
                    inner.declaration
                )));
            }
            ParameterClass::Arg if dashed => {
                return Err(ConfigError::IncorrectConstruction(format!(
                    "argument '{}' must only declare a positional name.",
                    inner.declaration
                )));
            }
            _ => {}
        }

        if names.is_positional() && inner.nargs.is_flag() {
            return Err(ConfigError::IncorrectConstruction(format!(
                "positional '{}' cannot be a flag.",
                inner.declaration
            )));
        }

        if inner.nargs.is_flag() && !inner.validators.is_empty() {
            return Err(ConfigError::IncorrectConstruction(format!(
                "flag '{}' takes no values, so it cannot have validators.",
                inner.declaration
            )));
        }

        if inner.nargs.is_unlimited() && inner.policy != MultiOptionPolicy::Throw {
            return Err(ConfigError::IncorrectConstruction(format!(
                "'{}' takes unlimited values, so it cannot have a multi option policy.",
                inner.declaration
            )));
        }

        let existing = self.commands[command].parameters.clone();
        self.check_collisions(command, &names, &existing)?;
        let index = self.parameters.len();
        self.parameters
            .push(Some(ParameterState::new(command, names, inner)));
        self.commands[command].parameters.push(index);
        Ok(index)
    }

    fn check_collisions(
        &self,
        command: usize,
        names: &Names,
        among: &[usize],
    ) -> Result<(), ConfigError> {
        let settings = &self.commands[command].settings;

        for p in among {
            let existing = &self.parameter(*p).names;

            for short in &names.shorts {
                if existing
                    .shorts
                    .iter()
                    .any(|e| settings.normalize_char(*e) == settings.normalize_char(*short))
                {
                    return Err(ConfigError::Duplicate {
                        kind: "short name",
                        name: format!("-{short}"),
                    });
                }
            }

            for long in &names.longs {
                if existing
                    .longs
                    .iter()
                    .any(|e| settings.normalize(e) == settings.normalize(long))
                {
                    return Err(ConfigError::Duplicate {
                        kind: "long name",
                        name: format!("--{long}"),
                    });
                }
            }

            if let (Some(positional), Some(e)) = (&names.positional, &existing.positional) {
                if settings.normalize(e) == settings.normalize(positional) {
                    return Err(ConfigError::Duplicate {
                        kind: "positional name",
                        name: positional.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Check every name in `command` against its current settings.
    pub(crate) fn recheck(&self, command: usize) -> Result<(), ConfigError> {
        let parameters = &self.commands[command].parameters;

        for (i, p) in parameters.iter().enumerate() {
            self.check_collisions(command, &self.parameter(*p).names, &parameters[..i])?;
        }

        let settings = &self.commands[command].settings;
        let children = &self.commands[command].children;

        for (i, c) in children.iter().enumerate() {
            let name = settings.normalize(&self.commands[*c].name);

            if children[..i]
                .iter()
                .any(|o| settings.normalize(&self.commands[*o].name) == name)
            {
                return Err(ConfigError::Duplicate {
                    kind: "sub-command",
                    name: self.commands[*c].name.clone(),
                });
            }
        }

        Ok(())
    }

    pub(crate) fn insert_child(
        &mut self,
        parent: usize,
        name: impl Into<String>,
    ) -> Result<usize, ConfigError> {
        let name = name.into();

        if !valid_name(&name) {
            return Err(ConfigError::BadName {
                name,
                reason: "not a valid sub-command name",
            });
        }

        if self.find_child(parent, &name).is_some() {
            return Err(ConfigError::Duplicate {
                kind: "sub-command",
                name,
            });
        }

        let settings = self.commands[parent].settings.clone();
        let help_names = settings.help_names.clone();
        let index = self.commands.len();
        self.commands
            .push(CommandScope::new(name, Some(parent), settings));
        self.commands[parent].children.push(index);

        if let Some(help_names) = help_names {
            self.set_help(index, Some(&help_names))?;
        }

        Ok(index)
    }

    /// Replace (or remove, with `None`) the help flag of `command`.
    pub(crate) fn set_help(&mut self, command: usize, names: Option<&str>) -> Result<(), ConfigError> {
        if let Some(previous) = self.commands[command].help.take() {
            self.remove_parameter(previous)?;
        }

        if let Some(names) = names {
            let inner = Parameter::values(names, Nargs::Precisely(0))
                .help(HELP_MESSAGE)
                .configurable(false)
                .consume();
            let index = self.insert_parameter(command, inner)?;
            self.commands[command].help = Some(index);
        }

        self.commands[command].settings.help_names = names.map(String::from);
        Ok(())
    }

    pub(crate) fn remove_parameter(&mut self, index: usize) -> Result<(), ConfigError> {
        let parameter = match self.parameters.get_mut(index).and_then(Option::take) {
            Some(parameter) => parameter,
            None => return Err(ConfigError::MissingParameter(format!("#{index}"))),
        };

        let scope = &mut self.commands[parameter.command];
        scope.parameters.retain(|p| *p != index);

        if scope.help == Some(index) {
            scope.help = None;
        }

        for other in self.parameters.iter_mut().flatten() {
            other.requires.retain(|p| *p != index);
            other.excludes.retain(|p| *p != index);
        }

        if matches!(&self.config, Some(config) if config.parameter == index) {
            self.config = None;
        }

        Ok(())
    }

    pub(crate) fn add_edge(
        &mut self,
        dependent: usize,
        relation: Relation,
        dependency: usize,
    ) -> Result<(), ConfigError> {
        for index in [dependent, dependency] {
            if !matches!(self.parameters.get(index), Some(Some(_))) {
                return Err(ConfigError::MissingParameter(format!("#{index}")));
            }
        }

        let dependent_name = self.parameter(dependent).display();
        let dependency_name = self.parameter(dependency).display();

        if dependent == dependency {
            return Err(ConfigError::IncorrectConstruction(format!(
                "'{dependent_name}' cannot {} itself.",
                relation.label()
            )));
        }

        if !self.is_ancestor_or_self(
            self.parameter(dependency).command,
            self.parameter(dependent).command,
        ) {
            return Err(ConfigError::IncorrectConstruction(format!(
                "'{dependent_name}' {} '{dependency_name}', which must be in the same or an ancestor command.",
                relation.label()
            )));
        }

        let parameter = self.parameter_mut(dependent);
        let edges = match relation {
            Relation::Requires => &mut parameter.requires,
            Relation::Excludes => &mut parameter.excludes,
        };

        if edges.contains(&dependency) {
            return Err(ConfigError::DuplicateEdge {
                dependent: dependent_name,
                relation: relation.label(),
                dependency: dependency_name,
            });
        }

        edges.push(dependency);
        Ok(())
    }

    fn is_ancestor_or_self(&self, ancestor: usize, command: usize) -> bool {
        let mut current = Some(command);

        while let Some(c) = current {
            if c == ancestor {
                return true;
            }

            current = self.commands[c].parent;
        }

        false
    }

    pub(crate) fn find_child(&self, command: usize, name: &str) -> Option<usize> {
        let settings = &self.commands[command].settings;
        let name = settings.normalize(name);
        self.commands[command]
            .children
            .iter()
            .copied()
            .find(|c| settings.normalize(&self.commands[*c].name) == name)
    }

    pub(crate) fn find_short(&self, command: usize, name: char) -> Option<usize> {
        let settings = &self.commands[command].settings;
        let name = settings.normalize_char(name);
        self.commands[command].parameters.iter().copied().find(|p| {
            self.parameter(*p)
                .names
                .shorts
                .iter()
                .any(|s| settings.normalize_char(*s) == name)
        })
    }

    pub(crate) fn find_long(&self, command: usize, name: &str) -> Option<usize> {
        let settings = &self.commands[command].settings;
        let name = settings.normalize(name);
        self.commands[command].parameters.iter().copied().find(|p| {
            self.parameter(*p)
                .names
                .longs
                .iter()
                .any(|l| settings.normalize(l) == name)
        })
    }

    pub(crate) fn find_positional(&self, command: usize, name: &str) -> Option<usize> {
        let settings = &self.commands[command].settings;
        let name = settings.normalize(name);
        self.commands[command].parameters.iter().copied().find(|p| {
            matches!(&self.parameter(*p).names.positional, Some(positional) if settings.normalize(positional) == name)
        })
    }

    /// Find a parameter by any of its names: `--long`, `-s`, `POSITIONAL`, or the bare long/short name.
    pub(crate) fn find_named(&self, command: usize, name: &str) -> Option<usize> {
        if let Some(long) = name.strip_prefix("--") {
            return self.find_long(command, long);
        }

        if let Some(short) = name.strip_prefix('-') {
            let mut chars = short.chars();
            return match (chars.next(), chars.next()) {
                (Some(single), None) => self.find_short(command, single),
                _ => None,
            };
        }

        let mut chars = name.chars();
        self.find_positional(command, name)
            .or_else(|| self.find_long(command, name))
            .or_else(|| match (chars.next(), chars.next()) {
                (Some(single), None) => self.find_short(command, single),
                _ => None,
            })
    }

    /// Find a short name in `command`, then up the parent chain while fallthrough is enabled.
    pub(crate) fn lookup_short(&self, command: usize, name: char) -> Option<usize> {
        self.lookup(command, |c| self.find_short(c, name))
    }

    /// Find a long name in `command`, then up the parent chain while fallthrough is enabled.
    pub(crate) fn lookup_long(&self, command: usize, name: &str) -> Option<usize> {
        self.lookup(command, |c| self.find_long(c, name))
    }

    fn lookup(&self, command: usize, find: impl Fn(usize) -> Option<usize>) -> Option<usize> {
        let mut current = command;

        loop {
            if let Some(found) = find(current) {
                return Some(found);
            }

            let scope = &self.commands[current];

            match scope.parent {
                Some(parent) if scope.settings.fallthrough => current = parent,
                _ => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ROOT;
    use rstest::rstest;

    fn values(names: &str, nargs: Nargs) -> ParameterInner<'static> {
        Parameter::values(names, nargs).consume()
    }

    #[test]
    fn insert_parameter() {
        // Setup
        let mut tree = CommandTree::new("program");

        // Execute
        let a = tree
            .insert_parameter(ROOT, values("-a,--apple", Nargs::Precisely(1)))
            .unwrap();
        let b = tree
            .insert_parameter(ROOT, values("BANANA", Nargs::Any))
            .unwrap();

        // Verify
        assert_eq!(tree.commands[ROOT].parameters, vec![a, b]);
        assert_eq!(tree.find_short(ROOT, 'a'), Some(a));
        assert_eq!(tree.find_long(ROOT, "apple"), Some(a));
        assert_eq!(tree.find_positional(ROOT, "BANANA"), Some(b));
        assert_eq!(tree.find_named(ROOT, "-a"), Some(a));
        assert_eq!(tree.find_named(ROOT, "--apple"), Some(a));
        assert_eq!(tree.find_named(ROOT, "apple"), Some(a));
        assert_eq!(tree.find_named(ROOT, "a"), Some(a));
        assert_eq!(tree.find_named(ROOT, "BANANA"), Some(b));
        assert_eq!(tree.find_named(ROOT, "--banana"), None);
        assert_eq!(tree.positionals(ROOT), vec![b]);
        assert_eq!(tree.positional_room(ROOT), None);
    }

    #[rstest]
    #[case("-a", "-a,--other", "short name")]
    #[case("--apple", "-o,--apple", "long name")]
    #[case("APPLE", "APPLE", "positional name")]
    fn insert_parameter_duplicate(
        #[case] first: &str,
        #[case] second: &str,
        #[case] kind: &'static str,
    ) {
        // Setup
        let mut tree = CommandTree::new("program");
        tree.insert_parameter(ROOT, values(first, Nargs::Precisely(1)))
            .unwrap();

        // Execute
        let error = tree
            .insert_parameter(ROOT, values(second, Nargs::Precisely(1)))
            .unwrap_err();

        // Verify
        assert_matches!(error, ConfigError::Duplicate { kind: k, .. } if k == kind);
    }

    #[test]
    fn insert_parameter_positional_does_not_collide_with_long() {
        let mut tree = CommandTree::new("program");
        tree.insert_parameter(ROOT, values("--apple", Nargs::Precisely(1)))
            .unwrap();
        tree.insert_parameter(ROOT, values("apple", Nargs::Precisely(1)))
            .unwrap();
    }

    #[rstest]
    #[case(values("POSITIONAL", Nargs::Precisely(0)))]
    #[case(Parameter::values("--items", Nargs::Any).multi_option_policy(MultiOptionPolicy::TakeLast).consume())]
    #[case(Parameter::values("-v", Nargs::Precisely(0)).transform(|v| v.to_string()).consume())]
    fn insert_parameter_incorrect(#[case] inner: ParameterInner<'static>) {
        let mut tree = CommandTree::new("program");
        assert_matches!(
            tree.insert_parameter(ROOT, inner),
            Err(ConfigError::IncorrectConstruction(_))
        );
    }

    #[test]
    fn ignore_case() {
        // Setup
        let mut tree = CommandTree::new("program");
        let a = tree
            .insert_parameter(ROOT, values("-a,--Apple", Nargs::Precisely(1)))
            .unwrap();
        let child = tree.insert_child(ROOT, "Start").unwrap();
        assert_eq!(tree.find_long(ROOT, "apple"), None);
        assert_eq!(tree.find_child(ROOT, "start"), None);

        // Execute
        tree.commands[ROOT].settings.ignore_case = true;

        // Verify
        tree.recheck(ROOT).unwrap();
        assert_eq!(tree.find_long(ROOT, "APPLE"), Some(a));
        assert_eq!(tree.find_short(ROOT, 'A'), Some(a));
        assert_eq!(tree.find_child(ROOT, "START"), Some(child));
    }

    #[test]
    fn ignore_case_collision() {
        // Setup
        let mut tree = CommandTree::new("program");
        tree.insert_parameter(ROOT, values("--apple", Nargs::Precisely(1)))
            .unwrap();
        tree.insert_parameter(ROOT, values("--APPLE", Nargs::Precisely(1)))
            .unwrap();

        // Execute
        tree.commands[ROOT].settings.ignore_case = true;

        // Verify
        assert_matches!(tree.recheck(ROOT), Err(ConfigError::Duplicate { .. }));
    }

    #[test]
    fn ignore_underscore() {
        let mut tree = CommandTree::new("program");
        tree.commands[ROOT].settings.ignore_underscore = true;
        let a = tree
            .insert_parameter(ROOT, values("--some_name", Nargs::Precisely(1)))
            .unwrap();
        assert_eq!(tree.find_long(ROOT, "somename"), Some(a));
        assert_eq!(tree.find_long(ROOT, "so_me_name"), Some(a));
    }

    #[test]
    fn insert_child() {
        // Setup
        let mut tree = CommandTree::new("program");
        tree.commands[ROOT].settings.allow_extras = true;
        tree.set_help(ROOT, Some("-h,--help")).unwrap();

        // Execute
        let child = tree.insert_child(ROOT, "start").unwrap();

        // Verify
        assert_eq!(tree.commands[child].parent, Some(ROOT));
        assert!(tree.commands[child].settings.allow_extras);
        let help = tree.commands[child].help.unwrap();
        assert_eq!(tree.find_short(child, 'h'), Some(help));
        assert_eq!(tree.find_child(ROOT, "start"), Some(child));
        assert_matches!(
            tree.insert_child(ROOT, "start"),
            Err(ConfigError::Duplicate { kind: "sub-command", .. })
        );
        assert_matches!(
            tree.insert_child(ROOT, "bad name"),
            Err(ConfigError::BadName { .. })
        );
    }

    #[test]
    fn set_help() {
        // Setup
        let mut tree = CommandTree::new("program");
        tree.set_help(ROOT, Some("-h,--help")).unwrap();

        // Execute
        tree.set_help(ROOT, Some("-?,--usage")).unwrap();

        // Verify
        assert_eq!(tree.find_short(ROOT, 'h'), None);
        assert!(tree.find_short(ROOT, '?').is_some());
        assert_eq!(tree.commands[ROOT].parameters.len(), 1);

        tree.set_help(ROOT, None).unwrap();
        assert_eq!(tree.commands[ROOT].help, None);
        assert!(tree.commands[ROOT].parameters.is_empty());
    }

    #[test]
    fn fallthrough_lookup() {
        // Setup
        let mut tree = CommandTree::new("program");
        let a = tree
            .insert_parameter(ROOT, values("-a", Nargs::Precisely(0)))
            .unwrap();
        let child = tree.insert_child(ROOT, "start").unwrap();
        assert_eq!(tree.lookup_short(child, 'a'), None);

        // Execute
        tree.commands[child].settings.fallthrough = true;

        // Verify
        assert_eq!(tree.lookup_short(child, 'a'), Some(a));
        assert_eq!(tree.lookup_long(child, "a"), None);
    }

    #[rstest]
    #[case(Relation::Requires)]
    #[case(Relation::Excludes)]
    fn add_edge(#[case] relation: Relation) {
        // Setup
        let mut tree = CommandTree::new("program");
        let a = tree
            .insert_parameter(ROOT, values("-a", Nargs::Precisely(0)))
            .unwrap();
        let b = tree
            .insert_parameter(ROOT, values("-b", Nargs::Precisely(0)))
            .unwrap();
        let child = tree.insert_child(ROOT, "start").unwrap();
        let c = tree
            .insert_parameter(child, values("-c", Nargs::Precisely(0)))
            .unwrap();

        // Execute
        tree.add_edge(a, relation, b).unwrap();
        tree.add_edge(c, relation, a).unwrap();

        // Verify
        assert_matches!(
            tree.add_edge(a, relation, b),
            Err(ConfigError::DuplicateEdge { .. })
        );
        assert_matches!(
            tree.add_edge(a, relation, a),
            Err(ConfigError::IncorrectConstruction(_))
        );
        assert_matches!(
            tree.add_edge(a, relation, c),
            Err(ConfigError::IncorrectConstruction(_))
        );
        assert_matches!(
            tree.add_edge(a, relation, 99),
            Err(ConfigError::MissingParameter(_))
        );
    }

    #[test]
    fn remove_parameter() {
        // Setup
        let mut tree = CommandTree::new("program");
        let a = tree
            .insert_parameter(ROOT, values("-a", Nargs::Precisely(0)))
            .unwrap();
        let b = tree
            .insert_parameter(ROOT, values("-b", Nargs::Precisely(0)))
            .unwrap();
        tree.add_edge(b, Relation::Requires, a).unwrap();

        // Execute
        tree.remove_parameter(a).unwrap();

        // Verify
        assert_eq!(tree.find_short(ROOT, 'a'), None);
        assert!(tree.parameter(b).requires.is_empty());
        assert_eq!(tree.commands[ROOT].parameters, vec![b]);
        assert_matches!(
            tree.remove_parameter(a),
            Err(ConfigError::MissingParameter(_))
        );
    }
}
