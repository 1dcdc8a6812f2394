//! Concatenation of category-specific item files

use std::path::{Path, PathBuf};

use super::Table;
use crate::error::{EvalError, EvalResult};

/// Concatenate tables in order: all rows of the first, then the second, etc.
///
/// Every table must carry the same set of column names. A table whose columns
/// are a permutation of the first table's has its rows realigned to the first
/// header order, repeated names matched by occurrence. Any other difference
/// is a `SchemaMismatch`.
pub fn merge_tables(tables: Vec<(PathBuf, Table)>) -> EvalResult<Table> {
    let mut tables = tables.into_iter();
    let (_, mut merged) = tables.next().ok_or(EvalError::NoInputs)?;

    let mut expected = merged.headers.clone();
    expected.sort();

    for (path, table) in tables {
        if table.headers == merged.headers {
            merged.rows.extend(table.rows);
            continue;
        }

        let mut found = table.headers.clone();
        found.sort();
        if found != expected {
            return Err(EvalError::SchemaMismatch {
                path,
                expected: merged.headers.clone(),
                found: table.headers,
            });
        }

        // The k-th occurrence of a name maps to the k-th occurrence in `table`.
        let mut taken = vec![false; table.headers.len()];
        let mut order = Vec::with_capacity(merged.headers.len());
        for name in &merged.headers {
            let i = table
                .headers
                .iter()
                .enumerate()
                .position(|(i, h)| !taken[i] && h == name)
                .ok_or_else(|| EvalError::SchemaMismatch {
                    path: path.clone(),
                    expected: merged.headers.clone(),
                    found: table.headers.clone(),
                })?;
            taken[i] = true;
            order.push(i);
        }
        tracing::debug!("Realigning columns of {}", path.display());
        merged.rows.extend(table.rows.into_iter().map(|row| {
            order
                .iter()
                .map(|&i| row.get(i).cloned().unwrap_or_default())
                .collect()
        }));
    }

    Ok(merged)
}

/// Read every input, merge them and write the result to `output`.
///
/// All inputs are read before anything is written, so a missing input leaves
/// `output` untouched.
pub fn merge_files<P: AsRef<Path>>(inputs: &[P], output: impl AsRef<Path>) -> EvalResult<Table> {
    let tables = inputs
        .iter()
        .map(|p| {
            let path = p.as_ref().to_path_buf();
            Table::read(&path).map(|t| (path, t))
        })
        .collect::<EvalResult<Vec<_>>>()?;

    let merged = merge_tables(tables)?;
    merged.write(output.as_ref())?;

    tracing::info!(
        "Merged {} files ({} rows) into {}",
        inputs.len(),
        merged.len(),
        output.as_ref().display()
    );
    Ok(merged)
}
