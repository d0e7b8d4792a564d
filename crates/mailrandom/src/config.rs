//! Run configuration, built once from parsed arguments.

use std::path::PathBuf;

use anyhow::{Context, Result};
use mailrandom_core::mail::credentials::from_env;
use mailrandom_core::mail::resolve_password;
use mailrandom_core::{Delivery, MailConfig, OptionSet, read_option_file, split_list};

use crate::args::Args;

/// What the invocation asks for.
#[derive(Debug)]
pub enum Command {
    /// Print the mail configuration layout.
    MailHelp,
    /// No options were given; print usage.
    Usage,
    /// Draw and announce a selection.
    Run(RunConfig),
}

impl Command {
    /// Interprets parsed arguments.
    #[must_use]
    pub fn from_args(args: Args) -> Self {
        if args.mail_help {
            return Self::MailHelp;
        }
        let source = match (args.input_file, args.options) {
            (Some(path), _) => OptionSource::File(path),
            (None, Some(options)) if !options.is_empty() => OptionSource::Inline {
                labels: split_list(&options),
                weights: split_list(args.weights.as_deref().unwrap_or_default()),
            },
            (None, _) => return Self::Usage,
        };
        Self::Run(RunConfig {
            category: args.category,
            source,
            mail_config: args.mail_config,
            password: args.password,
            seed: args.seed,
        })
    }
}

/// Where options come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionSource {
    /// Two-column option file.
    File(PathBuf),
    /// Comma lists from `-o` and `-w`.
    Inline {
        /// Option labels.
        labels: Vec<String>,
        /// Weight texts; empty means unweighted.
        weights: Vec<String>,
    },
}

impl OptionSource {
    /// Builds the option set.
    pub fn load(&self) -> Result<OptionSet> {
        match self {
            Self::File(path) => read_option_file(path)
                .with_context(|| format!("failed to load options from {}", path.display())),
            Self::Inline { labels, weights } => {
                OptionSet::from_labels(labels, weights).context("invalid options")
            }
        }
    }
}

/// Settings for one draw.
#[derive(Debug)]
pub struct RunConfig {
    /// Category used in the announcement.
    pub category: String,
    /// Option source.
    pub source: OptionSource,
    /// Mail configuration file; console output when absent.
    pub mail_config: Option<PathBuf>,
    /// Password from the command line.
    pub password: Option<String>,
    /// Seed for a reproducible draw.
    pub seed: Option<u64>,
}

impl RunConfig {
    /// Resolves the delivery, reading the mail configuration and password.
    pub fn delivery(&self) -> Result<Delivery> {
        let Some(path) = &self.mail_config else {
            return Ok(Delivery::Console);
        };
        let config = MailConfig::load(path)
            .with_context(|| format!("failed to load mail configuration {}", path.display()))?;
        let password = resolve_password(&config, self.password.as_deref(), from_env)?;
        Ok(Delivery::Mail { config, password })
    }
}
