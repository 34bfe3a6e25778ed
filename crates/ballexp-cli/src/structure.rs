//! # Structure Subcommand
//!
//! `ballexp structure <input.json>` prints the reachability closure of the
//! nonzero pattern: `1` where `exp(A)` may differ from the identity, `0`
//! where it is known exactly.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use ballexp_mat::StructureMatrix;
use clap::Args;

use crate::input::{load_matrix, LoadedMatrix};

/// Exact zeros are detected regardless of precision; this only bounds the
/// cost of parsing inexact literals.
const PARSE_PREC: u64 = 64;

/// Arguments for the structure subcommand.
#[derive(Args, Debug)]
pub struct StructureArgs {
    /// JSON file holding the matrix.
    pub input: PathBuf,
}

/// Print the reachability pattern. Returns the process exit code.
pub fn run_structure(args: &StructureArgs, out: &mut dyn Write) -> Result<u8> {
    let matrix = load_matrix(&args.input, PARSE_PREC)?;
    let structure = match &matrix {
        LoadedMatrix::Real(a) => {
            a.check_square()?;
            StructureMatrix::of(a)
        }
        LoadedMatrix::Complex(a) => {
            a.check_square()?;
            StructureMatrix::of(a)
        }
    };
    let n = structure.dim();
    write!(out, "{structure}")?;
    writeln!(out, "reachable: {} of {}", structure.reachable_count(), n * n)?;
    Ok(0)
}
