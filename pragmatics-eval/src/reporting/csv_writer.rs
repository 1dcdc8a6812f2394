//! Results CSV: every input column plus `Model_Prediction` and `Correct`

use std::path::Path;

use crate::error::{EvalError, EvalResult};
use crate::items::{columns, ColumnIndex, ItemRow, Prediction, PredictionResult, Table};

/// Build the output table from the input headers and the per-item results
pub fn results_table(headers: &[String], results: &[PredictionResult]) -> Table {
    let mut out_headers = headers.to_vec();
    out_headers.push(columns::MODEL_PREDICTION.to_string());
    out_headers.push(columns::CORRECT.to_string());

    let rows = results
        .iter()
        .map(|r| {
            let mut row = r.record.clone();
            row.push(r.prediction_text().to_string());
            row.push(r.correct_text().to_string());
            row
        })
        .collect();

    Table {
        headers: out_headers,
        rows,
    }
}

/// Write results as CSV, replacing any existing file
pub fn write_results(
    path: impl AsRef<Path>,
    headers: &[String],
    results: &[PredictionResult],
) -> EvalResult<()> {
    results_table(headers, results).write(path.as_ref())?;
    tracing::info!("Wrote {} results to {}", results.len(), path.as_ref().display());
    Ok(())
}

/// Read a results CSV back into prediction results.
///
/// An empty `Model_Prediction` cell is a failed oracle call. `Correct` is
/// recomputed from the prediction and the gold label.
pub fn read_results(path: impl AsRef<Path>) -> EvalResult<Vec<PredictionResult>> {
    let table = Table::read(path.as_ref())?;

    let prediction_col = table
        .column_index(columns::MODEL_PREDICTION)
        .ok_or_else(|| EvalError::MissingColumn(columns::MODEL_PREDICTION.to_string()))?;
    let correct_col = table
        .column_index(columns::CORRECT)
        .ok_or_else(|| EvalError::MissingColumn(columns::CORRECT.to_string()))?;

    let input_headers: Vec<String> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != prediction_col && *i != correct_col)
        .map(|(_, h)| h.clone())
        .collect();
    let index = ColumnIndex::locate(&input_headers)?;

    table
        .rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let prediction_text = row.get(prediction_col).cloned().unwrap_or_default();
            let correct_text = row.get(correct_col).cloned().unwrap_or_default();
            let record: Vec<String> = row
                .into_iter()
                .enumerate()
                .filter(|(j, _)| *j != prediction_col && *j != correct_col)
                .map(|(_, v)| v)
                .collect();

            let item = index.item(&record, i + 1)?;
            let prediction = if prediction_text.is_empty() {
                None
            } else {
                Some(Prediction::normalize(&prediction_text))
            };

            let result = PredictionResult::new(ItemRow { item, record }, prediction);
            if result.correct_text() != correct_text {
                tracing::warn!(
                    "Row {}: recorded Correct={} disagrees with prediction, using {}",
                    i + 1,
                    correct_text,
                    result.correct_text()
                );
            }
            Ok(result)
        })
        .collect()
}
