//! Read text files that store a series of floating-point values.

// std
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
// others
use log::warn;
// fluo
use crate::core::error::Result;
use crate::core::pbrt::Float;

/// All whitespace separated numbers of a file, lines starting with
/// `#` are comments.
pub fn read_float_file<P: AsRef<Path>>(filename: P) -> Result<Vec<Float>> {
    let f = File::open(filename.as_ref())?;
    let reader = BufReader::new(f);
    let mut values: Vec<Float> = Vec::new();
    for (line_number, line_result) in reader.lines().enumerate() {
        let line: String = line_result?;
        if line.trim_start().starts_with('#') {
            // ignore comments
            continue;
        }
        for token in line.split_whitespace() {
            match token.parse::<Float>() {
                Ok(float) => values.push(float),
                Err(_) => {
                    warn!(
                        "Unexpected text found at line {} of float file {:?}",
                        line_number + 1,
                        filename.as_ref()
                    );
                }
            }
        }
    }
    Ok(values)
}
