//! # Matrix Input
//!
//! Reads a ball matrix from JSON:
//!
//! ```json
//! {"real": [["1", "1/3 +/- 1e-20"], [0, "-2.5e-1"]],
//!  "imag": [["0", "1"], ["0", "0"]]}
//! ```
//!
//! Entries are strings in the ball syntax accepted by
//! [`RealBall::parse`] or plain JSON numbers, which are read by their
//! decimal text rather than as doubles. The presence of `imag` selects a
//! complex matrix.

use std::path::Path;

use anyhow::{Context, Result};
use ballexp_core::RealBall;
use ballexp_mat::{ComplexMatrix, RealMatrix};
use serde::Deserialize;

/// One matrix entry as written in the input file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    /// Ball syntax, e.g. `"0.1 +/- 1e-10"`.
    Text(String),
    /// A JSON number literal.
    Number(serde_json::Number),
}

impl Entry {
    fn text(&self) -> String {
        match self {
            Entry::Text(s) => s.clone(),
            Entry::Number(n) => n.to_string(),
        }
    }
}

/// The raw input document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixInput {
    /// Real parts, row by row.
    pub real: Vec<Vec<Entry>>,
    /// Imaginary parts, row by row.
    #[serde(default)]
    pub imag: Option<Vec<Vec<Entry>>>,
}

/// A parsed matrix of either kind.
#[derive(Debug, Clone)]
pub enum LoadedMatrix {
    /// Real entries.
    Real(RealMatrix),
    /// Complex entries.
    Complex(ComplexMatrix),
}

impl LoadedMatrix {
    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            LoadedMatrix::Real(m) => m.shape(),
            LoadedMatrix::Complex(m) => m.shape(),
        }
    }

    /// `"real"` or `"complex"`.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadedMatrix::Real(_) => "real",
            LoadedMatrix::Complex(_) => "complex",
        }
    }
}

/// Parse a JSON document, rounding inexact literals to `prec` bits.
pub fn parse_matrix_json(text: &str, prec: u64) -> Result<LoadedMatrix> {
    let input: MatrixInput = serde_json::from_str(text).context("malformed matrix document")?;
    let re = real_part(&input.real, prec).context("in \"real\"")?;
    match &input.imag {
        None => Ok(LoadedMatrix::Real(re)),
        Some(rows) => {
            let im = real_part(rows, prec).context("in \"imag\"")?;
            let z = ComplexMatrix::from_parts(&re, &im)
                .context("\"real\" and \"imag\" must have the same shape")?;
            Ok(LoadedMatrix::Complex(z))
        }
    }
}

/// Read and parse a matrix file.
pub fn load_matrix(path: &Path, prec: u64) -> Result<LoadedMatrix> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let matrix = parse_matrix_json(&text, prec)
        .with_context(|| format!("failed to load matrix from {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        kind = matrix.kind(),
        rows = matrix.shape().0,
        cols = matrix.shape().1,
        "loaded matrix"
    );
    Ok(matrix)
}

fn real_part(rows: &[Vec<Entry>], prec: u64) -> Result<RealMatrix> {
    let balls = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(|(j, entry)| {
                    RealBall::parse(&entry.text(), prec)
                        .with_context(|| format!("entry ({i}, {j})"))
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(RealMatrix::from_rows(balls)?)
}
