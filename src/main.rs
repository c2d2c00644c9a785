use std::{
    fs::File,
    io::{BufWriter, Write},
};

use clap::Parser;
use cli::{Cli, CliCommands, OutputFormat, PredictCommand};
use compact_prediction_tree::{
    sequence_io::{
        read_sequence_file, write_predictions_cbor, write_predictions_text, SequenceFileFormat,
    },
    CompactPredictionTree, Parallelism, PredictionParameters, Result,
};
use indicatif::ProgressBar;
use log::{info, warn};
use simplelog::{ColorChoice, TermLogger, TerminalMode};

mod cli;

fn main() {
    let cli = Cli::parse();

    if let Err(error) = TermLogger::init(
        cli.log_level.into(),
        Default::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Could not initialise logging: {error}");
    }

    match cli.command {
        CliCommands::Predict(predict_command) => predict(predict_command),
    }
    .unwrap_or_else(|error| {
        eprintln!("Error: {error}");
        std::process::exit(1);
    });
}

fn predict(predict_command: PredictCommand) -> Result<()> {
    // Load sequences.
    let format = SequenceFileFormat {
        delimiter: predict_command.delimiter,
        has_header: predict_command.header,
    };
    let training_sequences = read_sequence_file(&predict_command.train, &format)?;
    let queries = read_sequence_file(&predict_command.queries, &format)?;
    info!(
        "Loaded {} training sequences and {} queries",
        training_sequences.len(),
        queries.len()
    );
    let training_sequences =
        training_corpus(training_sequences, &queries, predict_command.train_on_queries);

    // Train model.
    let model = CompactPredictionTree::<String>::from_sequences(&training_sequences);

    // Predict.
    let parameters = PredictionParameters::new(
        predict_command.context_length,
        predict_command.prediction_count,
    )
    .with_parallelism(Parallelism::from_threads(predict_command.threads));
    let progress_bar = ProgressBar::new(queries.len() as u64);
    let predictions = model.predict_with_progress(&queries, &parameters, &|| progress_bar.inc(1))?;
    progress_bar.finish_and_clear();

    // Write predictions.
    let mut output: Box<dyn Write> = if let Some(output) = &predict_command.output {
        Box::new(BufWriter::new(File::create(output)?))
    } else {
        Box::new(BufWriter::new(std::io::stdout().lock()))
    };
    write_predictions(
        &mut output,
        &predictions,
        predict_command.output_format,
        predict_command.delimiter,
    )?;
    output.flush()?;

    Ok(())
}

/// The sequences to train on, optionally followed by the queries.
fn training_corpus(
    mut training_sequences: Vec<Vec<String>>,
    queries: &[Vec<String>],
    train_on_queries: bool,
) -> Vec<Vec<String>> {
    if train_on_queries {
        training_sequences.extend(queries.iter().cloned());
    }
    if training_sequences.is_empty() {
        warn!("No training sequences, all predictions will be empty");
    }

    training_sequences
}

fn write_predictions(
    output: &mut impl Write,
    predictions: &[Vec<String>],
    output_format: OutputFormat,
    delimiter: char,
) -> Result<()> {
    match output_format {
        OutputFormat::Text => write_predictions_text(output, predictions, delimiter),
        OutputFormat::Cbor => write_predictions_cbor(output, predictions),
    }
}
