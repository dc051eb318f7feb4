// src/cli/handlers/greet.rs

use crate::core::{
    action::{Action, ActionDefinition, ActionOptions},
    errors::{ExitSignal, UsageError},
    parameters::{ChoiceHandle, IntegerHandle, ParameterOptions, StringHandle},
};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use colored::*;

const STYLES: &[&str] = &["plain", "fancy"];

/// `greet --name <NAME> [--times N] [--style plain|fancy]`
pub struct GreetAction {
    definition: ActionDefinition,
    name: StringHandle,
    times: IntegerHandle,
    style: ChoiceHandle,
}

impl GreetAction {
    pub fn new() -> Result<Self, UsageError> {
        let mut definition = ActionDefinition::new(ActionOptions {
            action_name: "greet".to_string(),
            summary: "Prints a greeting.".to_string(),
            documentation: "Prints a greeting for NAME, once or several times. The style can also \
                            be chosen with the ACTIONLINE_GREET_STYLE environment variable."
                .to_string(),
        })?;

        let parameters = definition.parameters_mut();
        let name = parameters.define_string(
            ParameterOptions::new("--name", "Who to greet").short("-n").required(),
            None,
        )?;
        let times = parameters.define_integer(
            ParameterOptions::new("--times", "How many times to print the greeting")
                .short("-t")
                .argument_name("COUNT"),
            Some(1),
        )?;
        let style = parameters.define_choice(
            ParameterOptions::new("--style", "How the greeting looks")
                .environment_variable("ACTIONLINE_GREET_STYLE"),
            STYLES,
            Some("plain"),
        )?;

        Ok(Self {
            definition,
            name,
            times,
            style,
        })
    }
}

/// Builds the greeting lines for an already validated invocation.
fn greeting_lines(name: &str, times: i64, style: &str) -> Result<Vec<String>> {
    let count = usize::try_from(times).map_err(|_| {
        ExitSignal::failure(
            2,
            Some(format!("--times must be zero or more, got {}.", times)),
        )
    })?;

    let line = match style {
        "fancy" => format!(t!("demo.greet.message_fancy"), name = name),
        _ => format!(t!("demo.greet.message"), name = name),
    };
    Ok(vec![line; count])
}

#[async_trait]
impl Action for GreetAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    fn definition_mut(&mut self) -> &mut ActionDefinition {
        &mut self.definition
    }

    async fn execute(&self) -> Result<()> {
        let name = self
            .name
            .value()?
            .as_deref()
            .ok_or_else(|| anyhow!("--name is required"))?;
        let times = self.times.value()?.unwrap_or(1);
        let style = self.style.value()?.as_deref().unwrap_or("plain");

        for line in greeting_lines(name, times, style)? {
            println!("{}", line.green());
        }
        Ok(())
    }
}
