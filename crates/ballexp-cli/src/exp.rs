//! # Exp Subcommand
//!
//! `ballexp exp <input.json> [--prec bits] [--digits n] [--plan]`

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use ballexp_core::Ball;
use ballexp_mat::{exp_with, BallMatrix, ExpConfig, ExpPlan};
use clap::Args;

use crate::input::{load_matrix, LoadedMatrix};

/// Arguments for the exp subcommand.
#[derive(Args, Debug)]
pub struct ExpArgs {
    /// JSON file holding the matrix.
    pub input: PathBuf,

    /// Target precision in bits.
    #[arg(long, default_value_t = 128)]
    pub prec: u64,

    /// Significant decimal digits printed per midpoint.
    #[arg(long, default_value_t = 15)]
    pub digits: usize,

    /// Also print the evaluation plan as JSON.
    #[arg(long)]
    pub plan: bool,
}

/// Compute and print the exponential. Returns the process exit code.
pub fn run_exp(args: &ExpArgs, config: &ExpConfig, out: &mut dyn Write) -> Result<u8> {
    // Inputs are read at working precision so that rounding them costs
    // nothing visible at the target precision.
    let input_prec = config.working_precision(args.prec);
    let matrix = load_matrix(&args.input, input_prec)?;
    let (rows, cols) = matrix.shape();
    writeln!(out, "exp(A) for a {rows}x{cols} {} matrix at {} bits", matrix.kind(), args.prec)?;

    let plan = match &matrix {
        LoadedMatrix::Real(a) => evaluate(a, args, config, out)?,
        LoadedMatrix::Complex(a) => evaluate(a, args, config, out)?,
    };
    tracing::info!(path = ?plan.path, r = plan.scaling, terms = plan.terms, "exponential computed");

    if args.plan {
        let json = serde_json::to_string_pretty(&plan).context("failed to serialize plan")?;
        writeln!(out, "{json}")?;
    }
    Ok(0)
}

fn evaluate<T: Ball>(
    a: &BallMatrix<T>,
    args: &ExpArgs,
    config: &ExpConfig,
    out: &mut dyn Write,
) -> Result<ExpPlan> {
    let outcome = exp_with(a, args.prec, config)?;
    let e = &outcome.matrix;
    for i in 0..e.rows() {
        for (j, x) in e.row(i).iter().enumerate() {
            writeln!(out, "[{i}, {j}]  {x:.prec$}", prec = args.digits)?;
        }
    }
    Ok(outcome.plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(json: &str, prec: u64, plan: bool) -> String {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, json).unwrap();
        let args = ExpArgs {
            input: path,
            prec,
            digits: 10,
            plan,
        };
        let mut buf = Vec::new();
        let code = run_exp(&args, &ExpConfig::default(), &mut buf).unwrap();
        assert_eq!(code, 0);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn prints_every_entry() {
        let text = run(r#"{"real": [["0", "1"], ["0", "0"]]}"#, 64, false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "exp(A) for a 2x2 real matrix at 64 bits");
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("[0, 0]  1.000000000e0"), "{}", lines[1]);
        assert!(lines[3].starts_with("[1, 0]  0"), "{}", lines[3]);
    }

    #[test]
    fn prints_plan_as_json() {
        let text = run(r#"{"real": [["0", "1"], ["-1", "0"]]}"#, 64, true);
        let start = text.find('{').unwrap();
        let plan: serde_json::Value = serde_json::from_str(&text[start..]).unwrap();
        assert_eq!(plan["path"], "scaling_squaring");
        assert_eq!(plan["prec"], 64);
    }

    #[test]
    fn complex_input() {
        let text = run(r#"{"real": [["0"]], "imag": [["1"]]}"#, 53, false);
        assert!(text.contains("complex"));
        assert!(text.contains("[0, 0]  (5.403023059e-1 + 8.414709848e-1j)"), "{text}");
    }

    #[test]
    fn non_square_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, r#"{"real": [["1", "2"]]}"#).unwrap();
        let args = ExpArgs {
            input: path,
            prec: 64,
            digits: 10,
            plan: false,
        };
        let err = run_exp(&args, &ExpConfig::default(), &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("square"));
    }
}
