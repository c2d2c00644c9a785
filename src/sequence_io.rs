//! Reading sequences from delimited text files and writing predictions.
//!
//! A sequence file contains one sequence per line, with symbols separated by a delimiter.
//! Empty fields and blank lines are ignored, and an optional first line can be skipped as header.

use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceFileFormat {
    pub delimiter: char,
    pub has_header: bool,
}

/// The predictions for one query, as written in CBOR format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub query_index: usize,
    pub predictions: Vec<String>,
}

impl Default for SequenceFileFormat {
    fn default() -> Self {
        Self {
            delimiter: ',',
            has_header: false,
        }
    }
}

pub fn read_sequence_file(
    path: impl AsRef<Path>,
    format: &SequenceFileFormat,
) -> Result<Vec<Vec<String>>> {
    let path = path.as_ref();
    let sequences = read_sequences(
        BufReader::new(File::open(path)?),
        format,
        &path.display().to_string(),
    )?;
    debug!("Read {} sequences from {path:?}", sequences.len());
    Ok(sequences)
}

/// Read sequences from `input`, using `source_name` to refer to the input in errors.
pub fn read_sequences(
    input: impl BufRead,
    format: &SequenceFileFormat,
    source_name: &str,
) -> Result<Vec<Vec<String>>> {
    let mut lines = input.lines();

    if format.has_header && lines.next().transpose()?.is_none() {
        return Err(Error::MissingHeader(source_name.to_string()));
    }

    let mut sequences = Vec::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        sequences.push(
            line.split(format.delimiter)
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .map(ToString::to_string)
                .collect(),
        );
    }

    Ok(sequences)
}

/// Write one line per query, with the predicted symbols separated by `delimiter`.
pub fn write_predictions_text(
    output: &mut impl Write,
    predictions: &[Vec<String>],
    delimiter: char,
) -> Result<()> {
    let delimiter = delimiter.to_string();
    for prediction in predictions {
        writeln!(output, "{}", prediction.join(&delimiter))?;
    }

    Ok(())
}

pub fn write_predictions_cbor(output: &mut impl Write, predictions: &[Vec<String>]) -> Result<()> {
    let records: Vec<_> = predictions
        .iter()
        .enumerate()
        .map(|(query_index, predictions)| PredictionRecord {
            query_index,
            predictions: predictions.clone(),
        })
        .collect();
    ciborium::into_writer(&records, output)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::error::Error;

    use super::{
        read_sequences, write_predictions_cbor, write_predictions_text, PredictionRecord,
        SequenceFileFormat,
    };

    #[test]
    fn read_without_header() {
        let input = "A,B,C\n\nB, C ,D,,\nE\n";
        let sequences =
            read_sequences(Cursor::new(input), &SequenceFileFormat::default(), "test").unwrap();
        assert_eq!(
            sequences,
            [vec!["A", "B", "C"], vec!["B", "C", "D"], vec!["E"]]
        );
    }

    #[test]
    fn read_with_header() {
        let format = SequenceFileFormat {
            delimiter: ';',
            has_header: true,
        };

        let sequences = read_sequences(Cursor::new("x;y\n1;2\n3\n"), &format, "test").unwrap();
        assert_eq!(sequences, [vec!["1", "2"], vec!["3"]]);

        let sequences = read_sequences(Cursor::new("x;y\n"), &format, "test").unwrap();
        assert!(sequences.is_empty());

        assert!(matches!(
            read_sequences(Cursor::new(""), &format, "test"),
            Err(Error::MissingHeader(name)) if name == "test"
        ));
    }

    #[test]
    fn write_text() {
        let mut output = Vec::new();
        write_predictions_text(
            &mut output,
            &[vec!["a".to_string(), "b".to_string()], vec![]],
            ',',
        )
        .unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "a,b\n\n");
    }

    #[test]
    fn write_cbor() {
        let mut output = Vec::new();
        write_predictions_cbor(&mut output, &[vec![], vec!["c".to_string()]]).unwrap();

        let records: Vec<PredictionRecord> = ciborium::from_reader(output.as_slice()).unwrap();
        assert_eq!(
            records,
            [
                PredictionRecord {
                    query_index: 0,
                    predictions: vec![],
                },
                PredictionRecord {
                    query_index: 1,
                    predictions: vec!["c".to_string()],
                },
            ]
        );
    }
}
