//! Delimited-text dataset loader.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, warn};

use super::{DatasetError, Row};
use crate::config::DataSourceConfig;

/// Picks the delimiter from the file extension: tab for `.tsv`/`.tab`, comma otherwise.
#[must_use]
pub fn delimiter_for_path(path: &Path) -> u8 {
    let is_tab_separated = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab"));
    if is_tab_separated { b'\t' } else { b',' }
}

/// Loads every row of the configured dataset, in file order.
///
/// Rows with an empty identifier are skipped; a repeated identifier keeps its
/// first occurrence. A missing URL column is tolerated and read as empty.
///
/// # Errors
///
/// Returns [`DatasetError::Read`] if the file cannot be opened or decoded and
/// [`DatasetError::MissingColumn`] if the identifier column is absent.
#[tracing::instrument(skip(config), fields(path = %config.data_file.display()))]
pub fn load_rows(config: &DataSourceConfig) -> Result<Vec<Row>, DatasetError> {
    let path = config.data_file.as_path();
    let delimiter = config
        .delimiter
        .unwrap_or_else(|| delimiter_for_path(path));
    let file = std::fs::File::open(path)
        .map_err(|e| DatasetError::read(path, csv::Error::from(e)))?;
    let rows = read_rows(file, delimiter, config)?;
    info!(rows = rows.len(), "loaded dataset");
    Ok(rows)
}

fn read_rows<R: Read>(
    input: R,
    delimiter: u8,
    config: &DataSourceConfig,
) -> Result<Vec<Row>, DatasetError> {
    let path = config.data_file.as_path();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| DatasetError::read(path, e))?
        .clone();
    let columns = ColumnIndexes::resolve(&headers, config)?;

    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DatasetError::read(path, e))?;
        let line = record.position().map_or(0, csv::Position::line);

        let Some(id) = field(&record, Some(columns.id)) else {
            warn!(line, "skipping row without identifier");
            continue;
        };
        if !seen.insert(id.to_string()) {
            warn!(line, id, "skipping duplicate identifier");
            continue;
        }

        rows.push(Row {
            id: id.to_string(),
            primary_url: field(&record, columns.primary_url).map(str::to_string),
            secondary_url: field(&record, columns.secondary_url).map(str::to_string),
        });
    }
    Ok(rows)
}

/// Returns the trimmed cell, or `None` for absent/blank cells.
fn field(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Copy)]
struct ColumnIndexes {
    id: usize,
    primary_url: Option<usize>,
    secondary_url: Option<usize>,
}

impl ColumnIndexes {
    fn resolve(headers: &StringRecord, config: &DataSourceConfig) -> Result<Self, DatasetError> {
        let position = |name: &str| headers.iter().position(|header| header.trim() == name);

        let Some(id) = position(&config.id_column) else {
            return Err(DatasetError::MissingColumn {
                path: config.data_file.clone(),
                column: config.id_column.clone(),
                available: headers.iter().collect::<Vec<_>>().join(", "),
            });
        };

        let primary_url = position(&config.primary_url_column);
        let secondary_url = position(&config.secondary_url_column);
        for (column, index) in [
            (&config.primary_url_column, primary_url),
            (&config.secondary_url_column, secondary_url),
        ] {
            if index.is_none() {
                warn!(column = %column, "URL column not found in dataset; treating as empty");
            }
        }
        debug!(id, ?primary_url, ?secondary_url, "resolved dataset columns");

        Ok(Self {
            id,
            primary_url,
            secondary_url,
        })
    }
}
