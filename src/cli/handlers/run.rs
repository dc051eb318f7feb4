// src/cli/handlers/run.rs

use crate::{
    constants::INTERRUPTED_EXIT_CODE,
    core::{
        action::{Action, ActionDefinition, ActionOptions},
        errors::{ExitSignal, UsageError},
        parameters::{ParameterOptions, StringHandle},
    },
    system::executor::{self, ExecutionError},
};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use colored::*;
use std::env;
use std::path::PathBuf;

/// `run --command "<LINE>" [--cwd <DIR>]`
pub struct RunAction {
    definition: ActionDefinition,
    command: StringHandle,
    cwd: StringHandle,
}

impl RunAction {
    pub fn new() -> Result<Self, UsageError> {
        let mut definition = ActionDefinition::new(ActionOptions {
            action_name: "run".to_string(),
            summary: "Runs an external command.".to_string(),
            documentation: "Runs LINE as an external command and waits for it. Ctrl-C stops the \
                            command and exits with code 130."
                .to_string(),
        })?;

        let parameters = definition.parameters_mut();
        let command = parameters.define_string(
            ParameterOptions::new("--command", "The command line to run")
                .short("-c")
                .argument_name("LINE")
                .required(),
            None,
        )?;
        let cwd = parameters.define_string(
            ParameterOptions::new("--cwd", "Working directory (defaults to the current one)")
                .argument_name("DIR"),
            None,
        )?;

        Ok(Self {
            definition,
            command,
            cwd,
        })
    }
}

#[async_trait]
impl Action for RunAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    fn definition_mut(&mut self) -> &mut ActionDefinition {
        &mut self.definition
    }

    async fn execute(&self) -> Result<()> {
        let command = self
            .command
            .value()?
            .as_deref()
            .ok_or_else(|| anyhow!("--command is required"))?;
        let cwd = match self.cwd.value()? {
            Some(dir) => PathBuf::from(dir),
            None => env::current_dir().context("Could not determine the current directory")?,
        };

        println!(t!("demo.run.starting"), command = command.cyan());

        match executor::execute_command_async(command, &cwd).await {
            Ok(()) => Ok(()),
            Err(ExecutionError::Interrupted(_)) => Err(ExitSignal::failure(
                INTERRUPTED_EXIT_CODE,
                Some(t!("demo.run.interrupted").to_string()),
            )
            .into()),
            Err(e) => Err(e.into()),
        }
    }
}
