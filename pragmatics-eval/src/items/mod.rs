//! Item definitions, tables and merging

pub mod merge;
pub mod table;

pub use merge::{merge_files, merge_tables};
pub use table::Table;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};

/// Column names of the item and result CSV files
pub mod columns {
    pub const CONTEXT: &str = "Context";
    pub const OPTION_A: &str = "Option_A";
    pub const OPTION_B: &str = "Option_B";
    pub const GOLD_LABEL: &str = "Gold_Label";
    pub const PHENOMENON: &str = "Phenomenon";
    pub const DOMAIN: &str = "Domain";
    pub const ROLE_DIRECTION: &str = "Role_Direction";
    pub const MODEL_PREDICTION: &str = "Model_Prediction";
    pub const CORRECT: &str = "Correct";

    /// Columns every item table must carry
    pub const REQUIRED: [&str; 7] = [
        CONTEXT,
        OPTION_A,
        OPTION_B,
        GOLD_LABEL,
        PHENOMENON,
        DOMAIN,
        ROLE_DIRECTION,
    ];
}

/// One of the two forced-choice options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    A,
    B,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::A => "A",
            Label::B => "B",
        }
    }

    pub fn all() -> [Label; 2] {
        [Label::A, Label::B]
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(Label::A),
            "B" => Ok(Label::B),
            _ => Err(format!("Unknown label: {}", s)),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized model answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prediction {
    A,
    B,
    /// The model replied with something other than a bare `A` or `B`
    Unknown,
}

impl Prediction {
    /// Trim and uppercase a raw response; anything but `A` or `B` is `Unknown`.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "A" => Prediction::A,
            "B" => Prediction::B,
            _ => Prediction::Unknown,
        }
    }

    pub fn matches(&self, gold: Label) -> bool {
        matches!(
            (self, gold),
            (Prediction::A, Label::A) | (Prediction::B, Label::B)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Prediction::A => "A",
            Prediction::B => "B",
            Prediction::Unknown => "UNKNOWN",
        }
    }
}

impl FromStr for Prediction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Prediction::A),
            "B" => Ok(Prediction::B),
            "UNKNOWN" => Ok(Prediction::Unknown),
            _ => Err(format!("Unknown prediction: {}", s)),
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A forced-choice evaluation item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub context: String,
    pub option_a: String,
    pub option_b: String,
    pub gold_label: Label,
    pub phenomenon: String,
    pub domain: String,
    pub role_direction: String,
}

/// An item together with its raw CSV row, so extra columns survive to the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    pub item: Item,
    pub record: Vec<String>,
}

/// Positions of the required columns within a header row
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnIndex {
    context: usize,
    option_a: usize,
    option_b: usize,
    gold_label: usize,
    phenomenon: usize,
    domain: usize,
    role_direction: usize,
}

impl ColumnIndex {
    pub(crate) fn locate(headers: &[String]) -> EvalResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| EvalError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            context: find(columns::CONTEXT)?,
            option_a: find(columns::OPTION_A)?,
            option_b: find(columns::OPTION_B)?,
            gold_label: find(columns::GOLD_LABEL)?,
            phenomenon: find(columns::PHENOMENON)?,
            domain: find(columns::DOMAIN)?,
            role_direction: find(columns::ROLE_DIRECTION)?,
        })
    }

    /// Build an item from a record; `row` is 1-based for error messages.
    pub(crate) fn item(&self, record: &[String], row: usize) -> EvalResult<Item> {
        let cell = |idx: usize| record.get(idx).cloned().unwrap_or_default();
        let gold = cell(self.gold_label);
        let gold_label = gold
            .parse::<Label>()
            .map_err(|_| EvalError::InvalidGoldLabel { row, value: gold.clone() })?;

        Ok(Item {
            context: cell(self.context),
            option_a: cell(self.option_a),
            option_b: cell(self.option_b),
            gold_label,
            phenomenon: cell(self.phenomenon),
            domain: cell(self.domain),
            role_direction: cell(self.role_direction),
        })
    }
}

/// A table of parsed items in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTable {
    headers: Vec<String>,
    rows: Vec<ItemRow>,
}

impl ItemTable {
    /// Parse items from a raw table, validating columns and gold labels
    pub fn from_table(table: Table) -> EvalResult<Self> {
        let index = ColumnIndex::locate(&table.headers)?;
        let rows = table
            .rows
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                let item = index.item(&record, i + 1)?;
                Ok(ItemRow { item, record })
            })
            .collect::<EvalResult<Vec<_>>>()?;

        Ok(Self {
            headers: table.headers,
            rows,
        })
    }

    /// Load and parse an item CSV file
    pub fn load(path: impl AsRef<Path>) -> EvalResult<Self> {
        Self::from_table(Table::read(path)?)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[ItemRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Outcome of evaluating a single item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionResult {
    pub item: Item,
    pub record: Vec<String>,
    model_prediction: Option<Prediction>,
    is_correct: bool,
}

impl PredictionResult {
    /// `None` marks an item whose oracle call failed
    pub fn new(row: ItemRow, model_prediction: Option<Prediction>) -> Self {
        let is_correct = model_prediction
            .map(|p| p.matches(row.item.gold_label))
            .unwrap_or(false);
        Self {
            item: row.item,
            record: row.record,
            model_prediction,
            is_correct,
        }
    }

    pub fn model_prediction(&self) -> Option<Prediction> {
        self.model_prediction
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    pub fn gold_label(&self) -> Label {
        self.item.gold_label
    }

    /// Text written to the `Model_Prediction` column
    pub fn prediction_text(&self) -> &'static str {
        self.model_prediction.map(|p| p.as_str()).unwrap_or("")
    }

    /// Text written to the `Correct` column
    pub fn correct_text(&self) -> &'static str {
        if self.is_correct {
            "True"
        } else {
            "False"
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn item(gold: Label, phenomenon: &str, domain: &str, role: &str) -> ItemRow {
        let item = Item {
            context: "ctx".to_string(),
            option_a: "first".to_string(),
            option_b: "second".to_string(),
            gold_label: gold,
            phenomenon: phenomenon.to_string(),
            domain: domain.to_string(),
            role_direction: role.to_string(),
        };
        let record = vec![
            item.context.clone(),
            item.option_a.clone(),
            item.option_b.clone(),
            gold.as_str().to_string(),
            item.phenomenon.clone(),
            item.domain.clone(),
            item.role_direction.clone(),
        ];
        ItemRow { item, record }
    }

    pub fn headers() -> Vec<String> {
        columns::REQUIRED.iter().map(|c| c.to_string()).collect()
    }
}
