use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::format;
use crate::models::{Category, PaymentMethod, Transaction};
use crate::sanitize::sanitize;

pub const UNCATEGORIZED: &str = "Sin categoria";
pub const NO_PAYMENT_METHOD: &str = "Sin metodo de pago";
pub const OTHERS: &str = "Otros";

/// How many buckets the document's cover breakdown shows before the rest
/// collapses into the "Otros" residual.
pub const TOP_BUCKET_COUNT: usize = 4;

/// One aggregation group (category or payment method) over the filtered
/// set. Derived and ephemeral; recomputed on every export call.
#[derive(Debug, Clone, PartialEq)]
pub struct StatBucket {
  pub name: String,
  pub total: f64,
  pub count: usize,
  pub percentage: f64,
  pub average: f64,
}

/// Top-N+Others reduction: `display` holds at most N+1 buckets (the last
/// one "Otros"), `excluded` keeps the merged originals for disclosure.
#[derive(Debug, Clone)]
pub struct TopSplit {
  pub display: Vec<StatBucket>,
  pub excluded: Vec<StatBucket>,
}

#[derive(Debug, Clone)]
pub struct Stats {
  pub grand_total: f64,
  pub tx_count: usize,
  pub per_category: Vec<StatBucket>,
  pub per_payment_method: Vec<StatBucket>,
  pub first_day: Option<NaiveDate>,
  pub last_day: Option<NaiveDate>,
  pub distinct_days: usize,
}

impl Stats {
  pub fn per_tx_average(&self) -> f64 {
    format::safe_div(self.grand_total, self.tx_count as f64)
  }

  pub fn per_day_average(&self) -> f64 {
    format::safe_div(self.grand_total, self.distinct_days as f64)
  }

  pub fn top_category_name(&self) -> Option<&str> {
    self.per_category.first().map(|bucket| bucket.name.as_str())
  }

  pub fn top_categories_with_others(&self) -> TopSplit {
    top_with_others(&self.per_category, TOP_BUCKET_COUNT, self.grand_total)
  }
}

/// Category/payment-method statistics and grand totals for one filtered
/// set. Pure and synchronous; an empty subset yields all-zero stats.
pub fn aggregate(
  subset: &[Transaction],
  categories: &HashMap<i64, Category>,
  payment_methods: &HashMap<i64, PaymentMethod>,
) -> Stats {
  let grand_total: f64 = subset.iter().map(Transaction::safe_amount).sum();

  let mut category_acc = BucketAccumulator::new();
  let mut method_acc = BucketAccumulator::new();
  let mut days: BTreeSet<NaiveDate> = BTreeSet::new();

  for tx in subset {
    let category_name = tx
      .category_id
      .and_then(|id| categories.get(&id))
      .map(|category| sanitize(&category.name))
      .filter(|name| !name.is_empty())
      .unwrap_or_else(|| UNCATEGORIZED.to_string());
    let method_name = tx
      .payment_method_id
      .and_then(|id| payment_methods.get(&id))
      .map(|method| sanitize(&method.name))
      .filter(|name| !name.is_empty())
      .unwrap_or_else(|| NO_PAYMENT_METHOD.to_string());

    category_acc.add(category_name, tx.safe_amount());
    method_acc.add(method_name, tx.safe_amount());

    if let Some(day) = format::day_of(&tx.date) {
      days.insert(day);
    }
  }

  Stats {
    grand_total,
    tx_count: subset.len(),
    per_category: category_acc.into_buckets(grand_total),
    per_payment_method: method_acc.into_buckets(grand_total),
    first_day: days.iter().next().copied(),
    last_day: days.iter().next_back().copied(),
    distinct_days: days.len(),
  }
}

/// Stable-descending top-N reduction. Input is already ordered; everything
/// past `n` merges into one residual bucket whose total is the sum of the
/// excluded totals.
pub fn top_with_others(buckets: &[StatBucket], n: usize, grand_total: f64) -> TopSplit {
  if buckets.len() <= n {
    return TopSplit {
      display: buckets.to_vec(),
      excluded: Vec::new(),
    };
  }

  let mut display: Vec<StatBucket> = buckets[..n].to_vec();
  let excluded: Vec<StatBucket> = buckets[n..].to_vec();
  let total: f64 = excluded.iter().map(|bucket| bucket.total).sum();
  let count: usize = excluded.iter().map(|bucket| bucket.count).sum();
  display.push(StatBucket {
    name: OTHERS.to_string(),
    total,
    count,
    percentage: format::safe_div(total, grand_total) * 100.0,
    average: format::safe_div(total, count as f64),
  });

  TopSplit { display, excluded }
}

/// Accumulates {total, count} per display name in input-encounter order,
/// which is also the tie-break order of the final sort.
struct BucketAccumulator {
  order: Vec<String>,
  totals: HashMap<String, (f64, usize)>,
}

impl BucketAccumulator {
  fn new() -> Self {
    Self {
      order: Vec::new(),
      totals: HashMap::new(),
    }
  }

  fn add(&mut self, name: String, amount: f64) {
    if !self.totals.contains_key(&name) {
      self.order.push(name.clone());
    }
    let entry = self.totals.entry(name).or_insert((0.0, 0));
    entry.0 += amount;
    entry.1 += 1;
  }

  fn into_buckets(self, grand_total: f64) -> Vec<StatBucket> {
    let mut buckets: Vec<StatBucket> = self
      .order
      .into_iter()
      .map(|name| {
        let (total, count) = self.totals[&name];
        StatBucket {
          name,
          total,
          count,
          percentage: format::safe_div(total, grand_total) * 100.0,
          average: format::safe_div(total, count as f64),
        }
      })
      .collect();
    // Stable sort keeps encounter order between equal totals.
    buckets.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(std::cmp::Ordering::Equal));
    buckets
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tx(id: i64, amount: f64, date: &str, category_id: Option<i64>, payment_method_id: Option<i64>) -> Transaction {
    Transaction {
      id,
      name: format!("tx {id}"),
      amount,
      date: date.to_string(),
      category_id,
      payment_method_id,
    }
  }

  fn category_map(entries: &[(i64, &str)]) -> HashMap<i64, Category> {
    entries
      .iter()
      .map(|(id, name)| {
        (*id, Category {
          id: *id,
          name: name.to_string(),
          color: String::new(),
        })
      })
      .collect()
  }

  fn method_map(entries: &[(i64, &str)]) -> HashMap<i64, PaymentMethod> {
    entries
      .iter()
      .map(|(id, name)| {
        (*id, PaymentMethod {
          id: *id,
          name: name.to_string(),
        })
      })
      .collect()
  }

  #[test]
  fn single_transaction_scenario() {
    let txs = vec![tx(1, 10.0, "2024-05-01", Some(1), None)];
    let stats = aggregate(&txs, &category_map(&[(1, "Food")]), &HashMap::new());

    assert_eq!(stats.grand_total, 10.0);
    assert_eq!(stats.tx_count, 1);
    assert_eq!(stats.per_category.len(), 1);
    let food = &stats.per_category[0];
    assert_eq!(food.name, "Food");
    assert_eq!(food.total, 10.0);
    assert_eq!(food.count, 1);
    assert_eq!(food.percentage, 100.0);
    assert_eq!(food.average, 10.0);
  }

  #[test]
  fn empty_input_yields_zero_stats() {
    let stats = aggregate(&[], &HashMap::new(), &HashMap::new());
    assert_eq!(stats.grand_total, 0.0);
    assert_eq!(stats.tx_count, 0);
    assert!(stats.per_category.is_empty());
    assert!(stats.per_payment_method.is_empty());
    assert_eq!(stats.distinct_days, 0);
    assert!(stats.first_day.is_none());
    assert_eq!(stats.per_tx_average(), 0.0);
    assert_eq!(stats.per_day_average(), 0.0);
  }

  #[test]
  fn zero_grand_total_produces_zero_percentages() {
    let txs = vec![tx(1, 0.0, "2024-05-01", Some(1), None), tx(2, -4.0, "2024-05-02", None, None)];
    let stats = aggregate(&txs, &category_map(&[(1, "Food")]), &HashMap::new());
    assert_eq!(stats.grand_total, 0.0);
    for bucket in &stats.per_category {
      assert_eq!(bucket.percentage, 0.0);
      assert!(bucket.percentage.is_finite());
    }
  }

  #[test]
  fn bucket_totals_sum_to_grand_total_and_percentages_to_100() {
    let txs = vec![
      tx(1, 12.5, "2024-05-01", Some(1), Some(1)),
      tx(2, 30.0, "2024-05-02", Some(2), Some(1)),
      tx(3, 7.25, "2024-05-02", None, Some(2)),
      tx(4, 19.99, "2024-05-03", Some(1), None),
    ];
    let stats = aggregate(
      &txs,
      &category_map(&[(1, "Food"), (2, "Transporte")]),
      &method_map(&[(1, "Efectivo"), (2, "Tarjeta")]),
    );

    let tolerance = 1e-6 * stats.grand_total.max(1.0);
    let category_sum: f64 = stats.per_category.iter().map(|b| b.total).sum();
    let method_sum: f64 = stats.per_payment_method.iter().map(|b| b.total).sum();
    assert!((category_sum - stats.grand_total).abs() < tolerance);
    assert!((method_sum - stats.grand_total).abs() < tolerance);

    let pct_sum: f64 = stats.per_category.iter().map(|b| b.percentage).sum();
    assert!((pct_sum - 100.0).abs() < 1e-6);
  }

  #[test]
  fn unresolved_ids_fall_into_sentinel_buckets() {
    let txs = vec![tx(1, 5.0, "2024-05-01", Some(99), Some(99)), tx(2, 5.0, "2024-05-01", None, None)];
    let stats = aggregate(&txs, &HashMap::new(), &HashMap::new());
    assert_eq!(stats.per_category.len(), 1);
    assert_eq!(stats.per_category[0].name, UNCATEGORIZED);
    assert_eq!(stats.per_category[0].total, 10.0);
    assert_eq!(stats.per_payment_method[0].name, NO_PAYMENT_METHOD);
  }

  #[test]
  fn buckets_sorted_descending_with_stable_ties() {
    let txs = vec![
      tx(1, 10.0, "2024-05-01", Some(1), None),
      tx(2, 10.0, "2024-05-01", Some(2), None),
      tx(3, 25.0, "2024-05-01", Some(3), None),
    ];
    let stats = aggregate(
      &txs,
      &category_map(&[(1, "Primero"), (2, "Segundo"), (3, "Grande")]),
      &HashMap::new(),
    );
    let names: Vec<&str> = stats.per_category.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Grande", "Primero", "Segundo"]);
  }

  #[test]
  fn top_four_plus_others_reduction() {
    let totals = [50.0, 40.0, 30.0, 20.0, 10.0, 5.0];
    let txs: Vec<Transaction> = totals
      .iter()
      .enumerate()
      .map(|(idx, total)| tx(idx as i64, *total, "2024-05-01", Some(idx as i64), None))
      .collect();
    let categories = category_map(&[
      (0, "A"),
      (1, "B"),
      (2, "C"),
      (3, "D"),
      (4, "E"),
      (5, "F"),
    ]);
    let stats = aggregate(&txs, &categories, &HashMap::new());

    let split = stats.top_categories_with_others();
    assert_eq!(split.display.len(), 5);
    let display_totals: Vec<f64> = split.display.iter().map(|b| b.total).collect();
    assert_eq!(&display_totals[..4], &[50.0, 40.0, 30.0, 20.0]);
    let others = split.display.last().unwrap();
    assert_eq!(others.name, OTHERS);
    assert_eq!(others.total, 15.0);
    assert_eq!(split.excluded.len(), 2);
    assert_eq!(split.excluded.iter().map(|b| b.total).sum::<f64>(), others.total);
  }

  #[test]
  fn top_split_is_identity_when_few_buckets() {
    let txs = vec![tx(1, 10.0, "2024-05-01", Some(1), None)];
    let stats = aggregate(&txs, &category_map(&[(1, "Food")]), &HashMap::new());
    let split = stats.top_categories_with_others();
    assert_eq!(split.display.len(), 1);
    assert!(split.excluded.is_empty());
  }

  #[test]
  fn date_span_and_distinct_days() {
    let txs = vec![
      tx(1, 1.0, "2024-05-03T10:00:00", None, None),
      tx(2, 1.0, "2024-05-01", None, None),
      tx(3, 1.0, "2024-05-03T18:00:00", None, None),
      tx(4, 1.0, "no es fecha", None, None),
    ];
    let stats = aggregate(&txs, &HashMap::new(), &HashMap::new());
    assert_eq!(stats.first_day, chrono::NaiveDate::from_ymd_opt(2024, 5, 1));
    assert_eq!(stats.last_day, chrono::NaiveDate::from_ymd_opt(2024, 5, 3));
    assert_eq!(stats.distinct_days, 2);
    assert_eq!(stats.per_day_average(), 2.0);
  }

  #[test]
  fn emoji_category_names_share_a_sanitized_bucket() {
    let txs = vec![tx(1, 5.0, "2024-05-01", Some(1), None), tx(2, 5.0, "2024-05-01", Some(2), None)];
    let categories = category_map(&[(1, "Comida \u{1F355}"), (2, "Comida")]);
    let stats = aggregate(&txs, &categories, &HashMap::new());
    assert_eq!(stats.per_category.len(), 1);
    assert_eq!(stats.per_category[0].name, "Comida");
    assert_eq!(stats.per_category[0].count, 2);
  }
}
