//! Loading the starting generation.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::num::ParseIntError;

use conway_sparse::{Cell, Generation, patterns};
use thiserror::Error;

use crate::args::Args;

/// Live marker in plaintext patterns.
const LIVE: char = 'O';
/// Leading character of a plaintext comment line.
const COMMENT: char = '!';

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: expected `x y`, got {text:?}")]
    MalformedLine { line: usize, text: String },

    #[error("line {line}: invalid coordinate: {source}")]
    InvalidNumber { line: usize, source: ParseIntError },

    #[error("cell at coordinates {x},{y} already exists")]
    DuplicateCell { x: i64, y: i64 },

    #[error("unknown built-in pattern `{0}`")]
    UnknownPattern(String),
}

/// Builds the starting generation from whichever source `args` selects.
pub fn load(args: &Args) -> Result<Generation, InputError> {
    if let Some(name) = &args.builtin {
        let pattern = patterns::find(name).ok_or_else(|| InputError::UnknownPattern(name.clone()))?;
        return Ok(pattern.generation());
    }
    if let Some(seed) = args.random {
        return Ok(patterns::soup(seed, args.random_size, args.random_size));
    }

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };

    if args.pattern {
        read_pattern(reader)
    } else {
        read_coordinates(reader)
    }
}

/// Reads one whitespace-separated `x y` pair per line. Blank lines are skipped.
pub fn read_coordinates<R: BufRead>(reader: R) -> Result<Generation, InputError> {
    let mut cells = HashSet::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;

        let fields: Vec<&str> = line.split_whitespace().collect();
        let (x, y) = match fields.as_slice() {
            [] => continue,
            [x, y] => (parse(x, number)?, parse(y, number)?),
            _ => return Err(InputError::MalformedLine { line: number, text: line.clone() }),
        };

        if !cells.insert(Cell::new(x, y)) {
            return Err(InputError::DuplicateCell { x, y });
        }
    }

    Ok(cells.into_iter().collect())
}

fn parse(field: &str, line: usize) -> Result<i64, InputError> {
    field
        .parse()
        .map_err(|source| InputError::InvalidNumber { line, source })
}

/// Reads a plaintext pattern.
///
/// Lines starting with `!` are skipped. Every other line is one row, the
/// first at `y = 0` and each following one a step lower, so the file keeps
/// its top-to-bottom look. Column `i` holding `O` is the live cell `(i, y)`.
pub fn read_pattern<R: BufRead>(reader: R) -> Result<Generation, InputError> {
    let mut cells = Vec::new();
    let mut row: i64 = 0;

    for line in reader.lines() {
        let line = line?;
        if line.starts_with(COMMENT) {
            continue;
        }

        cells.extend(
            line.chars()
                .enumerate()
                .filter(|&(_, c)| c == LIVE)
                .map(|(col, _)| Cell::new(col as i64, row)),
        );
        row -= 1;
    }

    Ok(cells.into_iter().collect())
}
