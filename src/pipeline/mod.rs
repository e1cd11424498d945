//! Pipeline orchestration and table IO.

mod orchestrator;

pub use orchestrator::Pipeline;

use crate::error::Result;
use polars::prelude::*;
use std::path::Path;

/// Read one measurement table from a headered CSV file.
pub fn load_table(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Write a dataframe as a headered CSV.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df.clone())?;
    Ok(())
}
