pub mod excel;
pub mod pdf;

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::aggregate::{self, UNCATEGORIZED, NO_PAYMENT_METHOD};
use crate::error::AppError;
use crate::format;
use crate::models::{Category, ExportArtifact, ExportFormat, ExportRequest, PaymentMethod, Transaction};
use crate::sanitize::sanitize;
use crate::select;
use crate::style::ReportStyle;

/// Run one full export: select, aggregate, render the requested artifact.
/// Every invocation works on its own filtered list and output buffer, so
/// concurrent calls are independent.
pub fn generate(
  transactions: &[Transaction],
  categories: &HashMap<i64, Category>,
  payment_methods: &HashMap<i64, PaymentMethod>,
  request: &ExportRequest,
) -> Result<ExportArtifact, AppError> {
  generate_with_style(transactions, categories, payment_methods, request, &ReportStyle::default())
}

pub fn generate_with_style(
  transactions: &[Transaction],
  categories: &HashMap<i64, Category>,
  payment_methods: &HashMap<i64, PaymentMethod>,
  request: &ExportRequest,
  style: &ReportStyle,
) -> Result<ExportArtifact, AppError> {
  let subset = select::select(transactions, request);
  let stats = aggregate::aggregate(&subset, categories, payment_methods);
  let stamp = chrono::Utc::now().format("%Y-%m-%d");

  match request.format {
    ExportFormat::Workbook => {
      let bytes = excel::build_workbook(&subset, &stats, categories, payment_methods, style)?;
      Ok(ExportArtifact {
        file_name: format!("gastos_{stamp}.xlsx"),
        bytes,
      })
    }
    ExportFormat::Document => {
      let rendered = pdf::build_document(&subset, &stats, categories, payment_methods, style)?;
      Ok(ExportArtifact {
        file_name: format!("gastos_{stamp}.pdf"),
        bytes: rendered.bytes,
      })
    }
  }
}

/// Detail rows for both renderers: most recent first, unparseable dates
/// last, ties kept in input order.
pub(crate) fn rows_desc_by_date(subset: &[Transaction]) -> Vec<&Transaction> {
  let mut keyed: Vec<(Option<NaiveDateTime>, &Transaction)> = subset
    .iter()
    .map(|tx| (format::parse_timestamp(&tx.date), tx))
    .collect();
  keyed.sort_by(|a, b| b.0.cmp(&a.0));
  keyed.into_iter().map(|(_, tx)| tx).collect()
}

pub(crate) fn category_label(tx: &Transaction, categories: &HashMap<i64, Category>) -> String {
  tx.category_id
    .and_then(|id| categories.get(&id))
    .map(|category| sanitize(&category.name))
    .filter(|name| !name.is_empty())
    .unwrap_or_else(|| UNCATEGORIZED.to_string())
}

pub(crate) fn method_label(tx: &Transaction, payment_methods: &HashMap<i64, PaymentMethod>) -> String {
  tx.payment_method_id
    .and_then(|id| payment_methods.get(&id))
    .map(|method| sanitize(&method.name))
    .filter(|name| !name.is_empty())
    .unwrap_or_else(|| NO_PAYMENT_METHOD.to_string())
}

/// Date-range label for cover and summary. Collapses to a single long-form
/// date when the span is one day and to a placeholder when there is none.
pub(crate) fn range_label(stats: &crate::aggregate::Stats) -> String {
  match (stats.first_day, stats.last_day) {
    (Some(first), Some(last)) if first == last => format::long_date(first),
    (Some(first), Some(last)) => format!("{} al {}", format::long_date(first), format::long_date(last)),
    _ => "Sin periodo".to_string(),
  }
}
