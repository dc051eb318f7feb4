// src/core/parameters.rs

use crate::core::errors::UsageError;
use clap::builder::PossibleValuesParser;
use clap::parser::MatchesError;
use clap::{Arg, ArgAction, ArgMatches, value_parser};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

lazy_static! {
    static ref LONG_NAME_RE: Regex = Regex::new(r"^--[a-z][a-z0-9]*(-[a-z0-9]+)*$").unwrap();
    static ref SHORT_NAME_RE: Regex = Regex::new(r"^-[a-zA-Z]$").unwrap();
    static ref UPPER_SNAKE_RE: Regex = Regex::new(r"^[A-Z][A-Z0-9]*(_[A-Z0-9]+)*$").unwrap();
}

const RESERVED_LONG_NAME: &str = "--help";
const RESERVED_SHORT_NAME: &str = "-h";

// --- DECLARATIONS ---

/// The value shape of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    /// `--name`, no value. Parses to `bool`.
    Flag,
    /// `--name VALUE`. Parses to `Option<String>`.
    String,
    /// `--name 42`. Parses to `Option<i64>`.
    Integer,
    /// `--name VALUE` where VALUE must be one of `alternatives`. Parses to `Option<String>`.
    Choice { alternatives: Vec<String> },
    /// `--name A --name B`. Parses to `Vec<String>`.
    StringList,
}

/// Everything a caller says about a parameter, independent of its kind.
#[derive(Debug, Clone, Default)]
pub struct ParameterOptions {
    /// Long name including the dashes, e.g. `--dry-run`.
    pub long_name: String,
    /// Optional short name, e.g. `-d`.
    pub short_name: Option<String>,
    pub description: String,
    pub required: bool,
    /// Environment variable consulted when the parameter is absent from the command line.
    pub environment_variable: Option<String>,
    /// Placeholder shown in help, e.g. `PATH`. Derived from the long name when omitted.
    pub argument_name: Option<String>,
}

impl ParameterOptions {
    pub fn new(long_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            long_name: long_name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn short(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn environment_variable(mut self, variable: impl Into<String>) -> Self {
        self.environment_variable = Some(variable.into());
        self
    }

    pub fn argument_name(mut self, argument_name: impl Into<String>) -> Self {
        self.argument_name = Some(argument_name.into());
        self
    }
}

/// A validated parameter declaration, as registered on a [`ParameterSet`].
#[derive(Debug, Clone)]
pub struct ParameterDefinition {
    pub long_name: String,
    pub short_name: Option<String>,
    pub description: String,
    pub kind: ParameterKind,
    pub required: bool,
    pub environment_variable: Option<String>,
    pub argument_name: String,
    pub default_value: Option<String>,
}

impl ParameterDefinition {
    /// The identifier used with the grammar engine (the long name without dashes).
    pub fn id(&self) -> &str {
        self.long_name.trim_start_matches('-')
    }

    /// Translates the declaration into the engine's argument type.
    fn to_engine_arg(&self) -> Arg {
        let mut arg = Arg::new(self.id().to_string())
            .long(self.id().to_string())
            .help(self.description.clone());

        if let Some(short) = self.short_name.as_deref().and_then(|s| s.chars().nth(1)) {
            arg = arg.short(short);
        }
        if let Some(variable) = &self.environment_variable {
            arg = arg.env(variable.clone());
        }

        arg = match &self.kind {
            ParameterKind::Flag => return arg.action(ArgAction::SetTrue),
            ParameterKind::String => arg.action(ArgAction::Set),
            ParameterKind::Integer => arg
                .action(ArgAction::Set)
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i64)),
            ParameterKind::Choice { alternatives } => arg
                .action(ArgAction::Set)
                .value_parser(PossibleValuesParser::new(alternatives.clone())),
            ParameterKind::StringList => arg.action(ArgAction::Append),
        };

        arg = arg
            .value_name(self.argument_name.clone())
            .required(self.required);
        if let Some(default) = &self.default_value {
            arg = arg.default_value(default.clone());
        }
        arg
    }
}

// --- HANDLES ---

/// A typed view of one parameter's parsed value.
///
/// Handles are returned at definition time and can be cloned freely. Reading a
/// handle before its owning [`ParameterSet`] has been parsed is a usage error.
pub struct ParameterHandle<T> {
    long_name: String,
    slot: Arc<OnceLock<T>>,
}

pub type FlagHandle = ParameterHandle<bool>;
pub type StringHandle = ParameterHandle<Option<String>>;
pub type IntegerHandle = ParameterHandle<Option<i64>>;
pub type ChoiceHandle = ParameterHandle<Option<String>>;
pub type StringListHandle = ParameterHandle<Vec<String>>;

impl<T> ParameterHandle<T> {
    fn new(long_name: &str) -> Self {
        Self {
            long_name: long_name.to_string(),
            slot: Arc::new(OnceLock::new()),
        }
    }

    pub fn long_name(&self) -> &str {
        &self.long_name
    }

    /// Returns the parsed value, or [`UsageError::ValueNotAvailable`] if parsing has not happened yet.
    pub fn value(&self) -> Result<&T, UsageError> {
        self.slot
            .get()
            .ok_or_else(|| UsageError::ValueNotAvailable(self.long_name.clone()))
    }
}

impl<T> Clone for ParameterHandle<T> {
    fn clone(&self) -> Self {
        Self {
            long_name: self.long_name.clone(),
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ParameterHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterHandle")
            .field("long_name", &self.long_name)
            .field("value", &self.slot.get())
            .finish()
    }
}

/// The storage shared between a [`ParameterSet`] entry and the handle given to the caller.
#[derive(Debug)]
enum ValueSlot {
    Flag(Arc<OnceLock<bool>>),
    Text(Arc<OnceLock<Option<String>>>),
    Integer(Arc<OnceLock<Option<i64>>>),
    TextList(Arc<OnceLock<Vec<String>>>),
}

#[derive(Debug)]
struct ParameterEntry {
    definition: ParameterDefinition,
    slot: ValueSlot,
}

// --- PARAMETER SET ---

/// Declares typed parameters and later receives their parsed values.
///
/// Both the parser (global parameters) and every action (its own parameters) hold
/// one of these. The set has two phases: definitions are accepted until the
/// parser applies the parsed values, after which it is read-only.
#[derive(Debug, Default)]
pub struct ParameterSet {
    entries: Vec<ParameterEntry>,
    parsed: AtomicBool,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_flag(&mut self, options: ParameterOptions) -> Result<FlagHandle, UsageError> {
        let definition = self.validate(options, ParameterKind::Flag, None)?;
        let handle = ParameterHandle::new(&definition.long_name);
        self.push(definition, ValueSlot::Flag(Arc::clone(&handle.slot)));
        Ok(handle)
    }

    pub fn define_string(
        &mut self,
        options: ParameterOptions,
        default_value: Option<&str>,
    ) -> Result<StringHandle, UsageError> {
        let definition =
            self.validate(options, ParameterKind::String, default_value.map(str::to_string))?;
        let handle = ParameterHandle::new(&definition.long_name);
        self.push(definition, ValueSlot::Text(Arc::clone(&handle.slot)));
        Ok(handle)
    }

    pub fn define_integer(
        &mut self,
        options: ParameterOptions,
        default_value: Option<i64>,
    ) -> Result<IntegerHandle, UsageError> {
        let definition = self.validate(
            options,
            ParameterKind::Integer,
            default_value.map(|v| v.to_string()),
        )?;
        let handle = ParameterHandle::new(&definition.long_name);
        self.push(definition, ValueSlot::Integer(Arc::clone(&handle.slot)));
        Ok(handle)
    }

    pub fn define_choice(
        &mut self,
        options: ParameterOptions,
        alternatives: &[&str],
        default_value: Option<&str>,
    ) -> Result<ChoiceHandle, UsageError> {
        let kind = ParameterKind::Choice {
            alternatives: alternatives.iter().map(|a| a.to_string()).collect(),
        };
        let definition = self.validate(options, kind, default_value.map(str::to_string))?;
        let handle = ParameterHandle::new(&definition.long_name);
        self.push(definition, ValueSlot::Text(Arc::clone(&handle.slot)));
        Ok(handle)
    }

    pub fn define_string_list(
        &mut self,
        options: ParameterOptions,
    ) -> Result<StringListHandle, UsageError> {
        let definition = self.validate(options, ParameterKind::StringList, None)?;
        let handle = ParameterHandle::new(&definition.long_name);
        self.push(definition, ValueSlot::TextList(Arc::clone(&handle.slot)));
        Ok(handle)
    }

    /// All declarations, in definition order.
    pub fn definitions(&self) -> impl Iterator<Item = &ParameterDefinition> {
        self.entries.iter().map(|entry| &entry.definition)
    }

    pub fn get_definition(&self, long_name: &str) -> Option<&ParameterDefinition> {
        self.definitions().find(|d| d.long_name == long_name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed.load(Ordering::SeqCst)
    }

    /// Every declaration as an engine argument.
    pub(crate) fn engine_args(&self) -> Vec<Arg> {
        self.entries
            .iter()
            .map(|entry| entry.definition.to_engine_arg())
            .collect()
    }

    /// Moves the engine's parsed values into the typed slots. Runs at most once.
    pub(crate) fn apply_matches(&self, matches: &ArgMatches) -> Result<(), UsageError> {
        if self.parsed.swap(true, Ordering::SeqCst) {
            return Err(UsageError::AlreadyParsed);
        }

        for entry in &self.entries {
            let id = entry.definition.id();
            let mismatch = |e: MatchesError| UsageError::ParsedValueMismatch {
                name: entry.definition.long_name.clone(),
                reason: e.to_string(),
            };

            let stored = match &entry.slot {
                ValueSlot::Flag(slot) => {
                    let value = matches.try_get_one::<bool>(id).map_err(mismatch)?;
                    slot.set(value.copied().unwrap_or(false)).is_ok()
                }
                ValueSlot::Text(slot) => {
                    let value = matches.try_get_one::<String>(id).map_err(mismatch)?;
                    slot.set(value.cloned()).is_ok()
                }
                ValueSlot::Integer(slot) => {
                    let value = matches.try_get_one::<i64>(id).map_err(mismatch)?;
                    slot.set(value.copied()).is_ok()
                }
                ValueSlot::TextList(slot) => {
                    let values = matches
                        .try_get_many::<String>(id)
                        .map_err(mismatch)?
                        .map(|values| values.cloned().collect())
                        .unwrap_or_default();
                    slot.set(values).is_ok()
                }
            };

            if !stored {
                return Err(UsageError::AlreadyParsed);
            }
            log::debug!("Parameter '{}' received its value.", entry.definition.long_name);
        }

        Ok(())
    }

    fn push(&mut self, definition: ParameterDefinition, slot: ValueSlot) {
        log::debug!(
            "Defined parameter '{}' ({:?}).",
            definition.long_name,
            definition.kind
        );
        self.entries.push(ParameterEntry { definition, slot });
    }

    /// Checks a declaration against the naming rules and against what is already defined.
    fn validate(
        &self,
        options: ParameterOptions,
        kind: ParameterKind,
        default_value: Option<String>,
    ) -> Result<ParameterDefinition, UsageError> {
        let ParameterOptions {
            long_name,
            short_name,
            description,
            required,
            environment_variable,
            argument_name,
        } = options;

        if self.is_parsed() {
            return Err(UsageError::DefinitionAfterParse(long_name));
        }

        // Names
        if long_name == RESERVED_LONG_NAME {
            return Err(UsageError::ReservedName(long_name));
        }
        if !LONG_NAME_RE.is_match(&long_name) {
            return Err(UsageError::InvalidParameterName(long_name));
        }
        if self.get_definition(&long_name).is_some() {
            return Err(UsageError::DuplicateParameter(long_name));
        }
        if let Some(short) = &short_name {
            if short == RESERVED_SHORT_NAME {
                return Err(UsageError::ReservedName(short.clone()));
            }
            if !SHORT_NAME_RE.is_match(short) {
                return Err(UsageError::InvalidShortName(short.clone()));
            }
            if let Some(owner) = self
                .definitions()
                .find(|d| d.short_name.as_deref() == Some(short.as_str()))
            {
                return Err(UsageError::DuplicateShortName {
                    short_name: short.clone(),
                    owner: owner.long_name.clone(),
                });
            }
        }
        if let Some(variable) = &environment_variable {
            if !UPPER_SNAKE_RE.is_match(variable) {
                return Err(UsageError::InvalidEnvironmentVariable {
                    name: long_name,
                    variable: variable.clone(),
                });
            }
        }
        let argument_name = match argument_name {
            Some(argument) if !UPPER_SNAKE_RE.is_match(&argument) => {
                return Err(UsageError::InvalidArgumentName {
                    name: long_name,
                    argument,
                });
            }
            Some(argument) => argument,
            None => long_name
                .trim_start_matches('-')
                .replace('-', "_")
                .to_uppercase(),
        };

        // Kind-specific rules
        if required && kind == ParameterKind::Flag {
            return Err(UsageError::RequiredFlag(long_name));
        }
        if required && default_value.is_some() {
            return Err(UsageError::RequiredWithDefault(long_name));
        }
        if let ParameterKind::Choice { alternatives } = &kind {
            if alternatives.is_empty() {
                return Err(UsageError::EmptyChoices(long_name));
            }
            if let Some(default) = &default_value {
                if !alternatives.contains(default) {
                    return Err(UsageError::InvalidDefault {
                        name: long_name,
                        default: default.clone(),
                        alternatives: alternatives.join(", "),
                    });
                }
            }
        }

        Ok(ParameterDefinition {
            long_name,
            short_name,
            description,
            kind,
            required,
            environment_variable,
            argument_name,
            default_value,
        })
    }
}
