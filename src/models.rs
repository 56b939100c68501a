use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Wire shape delivered by the backing store. Missing fields degrade to
/// defaults instead of failing the whole export; a record with no usable
/// amount counts as zero.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Transaction {
  pub id: i64,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub amount: f64,
  #[serde(default)]
  pub date: String,
  pub category_id: Option<i64>,
  pub payment_method_id: Option<i64>,
}

impl Transaction {
  /// Amount as fed into every statistic: non-finite and negative values
  /// collapse to 0 so a malformed record can never poison a total.
  pub fn safe_amount(&self) -> f64 {
    if self.amount.is_finite() && self.amount > 0.0 {
      self.amount
    } else {
      0.0
    }
  }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Category {
  pub id: i64,
  pub name: String,
  #[serde(default)]
  pub color: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaymentMethod {
  pub id: i64,
  pub name: String,
}

/// Filter strategy of one export call.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExportMode {
  All,
  /// Absent end means: match only the calendar day of `start`.
  Range {
    start: NaiveDate,
    end: Option<NaiveDate>,
  },
  /// Tokens shaped "YYYY-MM".
  Months { months: Vec<String> },
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
  Workbook,
  Document,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExportRequest {
  #[serde(flatten)]
  pub mode: ExportMode,
  /// Category allow-list; empty means no category filtering.
  #[serde(default)]
  pub categories: Vec<i64>,
  pub format: ExportFormat,
}

/// Final binary artifact handed to the download/delivery collaborator.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportArtifact {
  pub file_name: String,
  pub bytes: Vec<u8>,
}
