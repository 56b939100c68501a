use crate::format;
use crate::models::{ExportMode, ExportRequest, Transaction};

/// Reduce the full transaction list to the subset an export request asks
/// for. Date predicate and category allow-list compose by AND; input order
/// is preserved and nothing is mutated (ordering belongs to the renderers).
pub fn select(transactions: &[Transaction], request: &ExportRequest) -> Vec<Transaction> {
  transactions
    .iter()
    .filter(|tx| matches_mode(tx, &request.mode))
    .filter(|tx| matches_categories(tx, &request.categories))
    .cloned()
    .collect()
}

fn matches_mode(tx: &Transaction, mode: &ExportMode) -> bool {
  match mode {
    ExportMode::All => true,
    ExportMode::Range { start, end } => match format::day_of(&tx.date) {
      // An unparseable date has no calendar day to compare against.
      None => false,
      Some(day) => match end {
        None => day == *start,
        Some(end) => day >= *start && day <= *end,
      },
    },
    ExportMode::Months { months } => match format::day_of(&tx.date) {
      None => false,
      Some(day) => months.iter().any(|token| token == &format::month_token(day)),
    },
  }
}

fn matches_categories(tx: &Transaction, allow_list: &[i64]) -> bool {
  if allow_list.is_empty() {
    return true;
  }
  tx.category_id.map(|id| allow_list.contains(&id)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::ExportFormat;

  fn tx(id: i64, date: &str, category_id: Option<i64>) -> Transaction {
    Transaction {
      id,
      name: format!("tx {id}"),
      amount: 10.0,
      date: date.to_string(),
      category_id,
      payment_method_id: None,
    }
  }

  fn request(mode: ExportMode, categories: Vec<i64>) -> ExportRequest {
    ExportRequest {
      mode,
      categories,
      format: ExportFormat::Workbook,
    }
  }

  fn day(y: i32, m: u32, d: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn all_mode_is_identity() {
    let txs = vec![tx(1, "2024-01-10", None), tx(2, "nonsense", Some(3))];
    let out = select(&txs, &request(ExportMode::All, vec![]));
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].id, 1);
    assert_eq!(out[1].id, 2);
  }

  #[test]
  fn output_is_subset_with_fields_unchanged() {
    let txs = vec![tx(1, "2024-01-10", Some(1)), tx(2, "2024-02-01", Some(2))];
    let out = select(&txs, &request(ExportMode::All, vec![1]));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, txs[0].id);
    assert_eq!(out[0].name, txs[0].name);
    assert_eq!(out[0].amount, txs[0].amount);
    assert_eq!(out[0].date, txs[0].date);
  }

  #[test]
  fn start_only_range_matches_single_calendar_day() {
    let txs = vec![
      tx(1, "2024-01-10T08:15:00", None),
      tx(2, "2024-01-10T23:59:59", None),
      tx(3, "2024-01-11", None),
    ];
    let mode = ExportMode::Range {
      start: day(2024, 1, 10),
      end: None,
    };
    let out = select(&txs, &request(mode, vec![]));
    assert_eq!(out.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
  }

  #[test]
  fn full_range_is_inclusive() {
    let txs = vec![
      tx(1, "2024-01-09", None),
      tx(2, "2024-01-10", None),
      tx(3, "2024-01-20", None),
      tx(4, "2024-01-21", None),
    ];
    let mode = ExportMode::Range {
      start: day(2024, 1, 10),
      end: Some(day(2024, 1, 20)),
    };
    let out = select(&txs, &request(mode, vec![]));
    assert_eq!(out.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 3]);
  }

  #[test]
  fn months_mode_matches_tokens() {
    let txs = vec![
      tx(1, "2024-01-15", None),
      tx(2, "2024-02-15", None),
      tx(3, "2024-03-15", None),
    ];
    let mode = ExportMode::Months {
      months: vec!["2024-01".to_string(), "2024-03".to_string()],
    };
    let out = select(&txs, &request(mode, vec![]));
    assert_eq!(out.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3]);
  }

  #[test]
  fn category_allow_list_ands_with_mode() {
    let txs = vec![
      tx(1, "2024-01-15", Some(7)),
      tx(2, "2024-01-16", Some(8)),
      tx(3, "2024-02-15", Some(7)),
      tx(4, "2024-01-17", None),
    ];
    let mode = ExportMode::Months {
      months: vec!["2024-01".to_string()],
    };
    let out = select(&txs, &request(mode, vec![7]));
    assert_eq!(out.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1]);
  }

  #[test]
  fn unparseable_dates_never_match_date_modes() {
    let txs = vec![tx(1, "sin fecha", None)];
    let mode = ExportMode::Range {
      start: day(2024, 1, 10),
      end: None,
    };
    assert!(select(&txs, &request(mode, vec![])).is_empty());
  }
}
