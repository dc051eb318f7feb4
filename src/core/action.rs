// src/core/action.rs

use crate::core::{errors::UsageError, parameters::ParameterSet};
use anyhow::Result;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ACTION_NAME_RE: Regex = Regex::new(r"^[a-z][a-z0-9]*(-[a-z0-9]+)*$").unwrap();
}

/// The identity and help text of an action.
#[derive(Debug, Clone, Default)]
pub struct ActionOptions {
    /// The token typed on the command line, e.g. `build` or `clean-all`.
    pub action_name: String,
    /// One line shown in the tool's action list.
    pub summary: String,
    /// Longer text shown by `<tool> <action> --help`.
    pub documentation: String,
}

/// The state every action carries: its options and its own parameters.
#[derive(Debug)]
pub struct ActionDefinition {
    options: ActionOptions,
    parameters: ParameterSet,
}

impl ActionDefinition {
    pub fn new(options: ActionOptions) -> Result<Self, UsageError> {
        if !ACTION_NAME_RE.is_match(&options.action_name) {
            return Err(UsageError::InvalidActionName(options.action_name));
        }
        Ok(Self {
            options,
            parameters: ParameterSet::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.options.action_name
    }

    pub fn summary(&self) -> &str {
        &self.options.summary
    }

    pub fn documentation(&self) -> &str {
        &self.options.documentation
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterSet {
        &mut self.parameters
    }
}

/// A named sub-command of a tool.
///
/// Implementors keep an [`ActionDefinition`] and expose it through
/// [`Action::definition`]. Parameters may be defined when the action is
/// constructed or in [`Action::on_define_parameters`], which the parser calls
/// exactly once from `add_action`. [`Action::execute`] only runs after this
/// action's parameters have received their values.
#[async_trait]
pub trait Action: Send + Sync {
    fn definition(&self) -> &ActionDefinition;

    fn definition_mut(&mut self) -> &mut ActionDefinition;

    /// Define-phase hook, called once when the action is registered with a parser.
    fn on_define_parameters(&mut self) -> Result<(), UsageError> {
        Ok(())
    }

    /// The body of the action.
    async fn execute(&self) -> Result<()>;

    fn name(&self) -> &str {
        self.definition().name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(name: &str) -> ActionOptions {
        ActionOptions {
            action_name: name.to_string(),
            summary: "summary".to_string(),
            documentation: "docs".to_string(),
        }
    }

    #[test]
    fn test_valid_action_names() {
        for name in ["build", "clean-all", "v2", "deploy-to-prod"] {
            let definition = ActionDefinition::new(options(name)).unwrap();
            assert_eq!(definition.name(), name);
            assert!(definition.parameters().is_empty());
        }
    }

    #[test]
    fn test_invalid_action_names() {
        for name in ["", "Build", "-build", "build-", "two words", "2fast", "a--b"] {
            assert_eq!(
                ActionDefinition::new(options(name)).unwrap_err(),
                UsageError::InvalidActionName(name.to_string())
            );
        }
    }
}
