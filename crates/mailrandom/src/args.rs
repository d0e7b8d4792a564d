//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use mailrandom_core::DEFAULT_CATEGORY;

/// Pick a weighted-random option and print it or send it by email.
#[derive(Debug, Parser)]
#[command(name = "mailrandom", version)]
pub struct Args {
    /// Category, e.g. "exercise", "study topic"
    #[arg(short = 'c', value_name = "CATEGORY", default_value = DEFAULT_CATEGORY)]
    pub category: String,

    /// Comma-separated list of options
    #[arg(short = 'o', value_name = "OPTIONS")]
    pub options: Option<String>,

    /// Comma-separated list of weights, one per option
    #[arg(short = 'w', value_name = "WEIGHTS")]
    pub weights: Option<String>,

    /// Weighted option CSV file with one option and one weight per line; overrides -o and -w
    #[arg(short = 'i', value_name = "FILE")]
    pub input_file: Option<PathBuf>,

    /// Mail configuration JSON file; see --mail-help
    #[arg(short = 'm', value_name = "FILE")]
    pub mail_config: Option<PathBuf>,

    /// Mail server password; overrides the MAIL_PASS environment variable
    #[arg(short = 'p', value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Describe the mail configuration file and exit
    #[arg(long = "mail-help")]
    pub mail_help: bool,

    /// Seed the draw for reproducible output
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Log debug details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn short_flags_match_documented_names() {
        let args = Args::try_parse_from([
            "mailrandom", "-c", "exercise", "-o", "a,b", "-w", "1,2", "-p", "pw", "--seed", "9",
        ])
        .unwrap();
        assert_eq!(args.category, "exercise");
        assert_eq!(args.options.as_deref(), Some("a,b"));
        assert_eq!(args.weights.as_deref(), Some("1,2"));
        assert_eq!(args.password.as_deref(), Some("pw"));
        assert_eq!(args.seed, Some(9));
        assert!(!args.mail_help);
    }

    #[test]
    fn category_defaults_to_selection() {
        let args = Args::try_parse_from(["mailrandom"]).unwrap();
        assert_eq!(args.category, "selection");
    }
}
