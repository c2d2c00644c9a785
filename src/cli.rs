use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use simplelog::LevelFilter;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// The amount of log output.
    #[arg(long, global = true, value_enum, default_value_t = CliLogLevel::Info)]
    pub log_level: CliLogLevel,

    #[command(subcommand)]
    pub command: CliCommands,
}

#[derive(Subcommand)]
pub enum CliCommands {
    /// Train a compact prediction tree on a sequence file and predict the next symbols of the query sequences.
    Predict(PredictCommand),
}

#[derive(Args)]
pub struct PredictCommand {
    /// The sequences to train on, one sequence per line.
    #[arg(long)]
    pub train: PathBuf,

    /// The sequences whose next symbols should be predicted, one sequence per line.
    #[arg(long)]
    pub queries: PathBuf,

    /// The amount of trailing query symbols used to find similar training sequences.
    #[arg(short = 'k', long, default_value_t = 2)]
    pub context_length: usize,

    /// The maximum amount of predicted symbols per query.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub prediction_count: usize,

    /// The character separating the symbols of a sequence.
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Skip the first line of each sequence file.
    #[arg(long)]
    pub header: bool,

    /// Add the query sequences to the training sequences.
    #[arg(long)]
    pub train_on_queries: bool,

    /// The amount of prediction threads. 0 uses one thread per core.
    #[arg(long, default_value_t = 1)]
    pub threads: usize,

    /// Write the predictions to this file instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per query with the predicted symbols separated by the delimiter.
    Text,
    /// A CBOR list with one record per query.
    Cbor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliLogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LevelFilter {
    fn from(log_level: CliLogLevel) -> Self {
        match log_level {
            CliLogLevel::Off => LevelFilter::Off,
            CliLogLevel::Error => LevelFilter::Error,
            CliLogLevel::Warn => LevelFilter::Warn,
            CliLogLevel::Info => LevelFilter::Info,
            CliLogLevel::Debug => LevelFilter::Debug,
            CliLogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, CliCommands, CliLogLevel, OutputFormat};

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_predict() {
        let cli = Cli::parse_from([
            "cpt",
            "--log-level",
            "debug",
            "predict",
            "--train",
            "train.csv",
            "--queries",
            "queries.csv",
            "-k",
            "3",
            "-n",
            "2",
            "--header",
            "--output-format",
            "cbor",
        ]);
        assert_eq!(cli.log_level, CliLogLevel::Debug);

        let CliCommands::Predict(predict_command) = cli.command;
        assert_eq!(predict_command.train.to_str(), Some("train.csv"));
        assert_eq!(predict_command.queries.to_str(), Some("queries.csv"));
        assert_eq!(predict_command.context_length, 3);
        assert_eq!(predict_command.prediction_count, 2);
        assert_eq!(predict_command.delimiter, ',');
        assert!(predict_command.header);
        assert!(!predict_command.train_on_queries);
        assert_eq!(predict_command.threads, 1);
        assert_eq!(predict_command.output, None);
        assert_eq!(predict_command.output_format, OutputFormat::Cbor);
    }

    #[test]
    fn log_level_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cpt",
            "predict",
            "--train",
            "train.csv",
            "--queries",
            "queries.csv",
            "-k",
            "1",
            "-n",
            "2",
            "--header",
            "--log-level",
            "warn",
        ])
        .unwrap();
        assert_eq!(cli.log_level, CliLogLevel::Warn);

        let CliCommands::Predict(predict_command) = cli.command;
        assert_eq!(predict_command.context_length, 1);
        assert_eq!(predict_command.prediction_count, 2);
        assert_eq!(predict_command.output_format, OutputFormat::Text);

        let cli = Cli::try_parse_from([
            "cpt",
            "predict",
            "--train",
            "train.csv",
            "--queries",
            "queries.csv",
        ])
        .unwrap();
        assert_eq!(cli.log_level, CliLogLevel::Info);
    }
}
