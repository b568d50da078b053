mod parser;

use crate::underwriting::domain::PropertyFinancialInput;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// An imported listing: its street address plus the engine inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedProperty {
    pub address: String,
    pub input: PropertyFinancialInput,
}

#[derive(Debug, thiserror::Error)]
pub enum PropertyImportError {
    #[error("failed to read property export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid property CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: purchase_price is required")]
    MissingPurchasePrice { line: usize },
    #[error("line {line}: could not read {column} value '{value}'")]
    InvalidValue {
        line: usize,
        column: &'static str,
        value: String,
    },
}

/// Reads listing exports with one property per row and snake_case headers.
///
/// Blank cells are absent values. An input group (expenses, financing terms,
/// operating assumptions) counts as provided when the header names any of its
/// columns, even if a given row leaves them all blank.
pub struct PropertyCsvImporter;

impl PropertyCsvImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<ImportedProperty>, PropertyImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<ImportedProperty>, PropertyImportError> {
        parser::parse_records(reader)
    }
}
