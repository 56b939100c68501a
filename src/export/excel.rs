use std::collections::HashMap;

use chrono::Datelike;
use rust_xlsxwriter::{Color, ExcelDateTime, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::aggregate::{StatBucket, Stats};
use crate::error::AppError;
use crate::format;
use crate::models::{Category, PaymentMethod, Transaction};
use crate::sanitize::sanitize;
use crate::style::ReportStyle;

const MONEY_FORMAT: &str = "$#,##0.00";
const PERCENT_FORMAT: &str = "0.0\"%\"";
const DATE_FORMAT: &str = "dd/mm/yyyy";

/// Four-sheet workbook over one aggregated export. All four sheets are
/// emitted even for an empty subset.
pub fn build_workbook(
  subset: &[Transaction],
  stats: &Stats,
  categories: &HashMap<i64, Category>,
  payment_methods: &HashMap<i64, PaymentMethod>,
  style: &ReportStyle,
) -> Result<Vec<u8>, AppError> {
  let mut workbook = Workbook::new();
  write_transactions_sheet(&mut workbook, subset, stats, categories, payment_methods, style)?;
  write_summary_sheet(&mut workbook, stats, style)?;
  write_bucket_sheet(&mut workbook, "Por Categoria", "Categoria", &stats.per_category, style)?;
  write_bucket_sheet(&mut workbook, "Por Metodo de Pago", "Metodo de pago", &stats.per_payment_method, style)?;
  Ok(workbook.save_to_buffer()?)
}

fn header_format(style: &ReportStyle) -> Format {
  Format::new()
    .set_bold()
    .set_font_color(Color::White)
    .set_background_color(Color::RGB(style.accent_color))
    .set_border_bottom(FormatBorder::Medium)
}

fn write_transactions_sheet(
  workbook: &mut Workbook,
  subset: &[Transaction],
  stats: &Stats,
  categories: &HashMap<i64, Category>,
  payment_methods: &HashMap<i64, PaymentMethod>,
  style: &ReportStyle,
) -> Result<(), AppError> {
  let sheet = workbook.add_worksheet();
  sheet.set_name("Transacciones")?;

  let header = header_format(style);
  let money = Format::new().set_num_format(MONEY_FORMAT);
  let date_format = Format::new().set_num_format(DATE_FORMAT);
  let total_label = Format::new().set_bold().set_border_top(FormatBorder::Double);
  let total_money = Format::new()
    .set_bold()
    .set_border_top(FormatBorder::Double)
    .set_num_format(MONEY_FORMAT);

  let headers = ["Nr", "Fecha", "Nombre", "Categoria", "Metodo de pago", "Importe"];
  for (idx, label) in headers.iter().enumerate() {
    sheet.write_string_with_format(0, idx as u16, *label, &header)?;
  }

  let mut row: u32 = 1;
  for tx in super::rows_desc_by_date(subset) {
    sheet.write_number(row, 0, row as f64)?;
    write_date_cell(sheet, row, 1, &tx.date, &date_format)?;
    sheet.write_string(row, 2, sanitize(&tx.name))?;
    sheet.write_string(row, 3, super::category_label(tx, categories))?;
    sheet.write_string(row, 4, super::method_label(tx, payment_methods))?;
    sheet.write_number_with_format(row, 5, tx.safe_amount(), &money)?;
    row += 1;
  }

  // Totals row stays outside the filter range so filtering the data can
  // never hide the grand total.
  sheet.write_string_with_format(row, 0, "Total", &total_label)?;
  sheet.write_number_with_format(row, 5, stats.grand_total, &total_money)?;

  if row > 1 {
    sheet.autofilter(0, 0, row - 1, 5)?;
  }
  sheet.set_freeze_panes(1, 0)?;

  sheet.set_column_width(0, style.col_width_seq)?;
  sheet.set_column_width(1, style.col_width_date)?;
  sheet.set_column_width(2, style.col_width_name)?;
  sheet.set_column_width(3, style.col_width_label)?;
  sheet.set_column_width(4, style.col_width_label)?;
  sheet.set_column_width(5, style.col_width_amount)?;
  Ok(())
}

fn write_summary_sheet(workbook: &mut Workbook, stats: &Stats, style: &ReportStyle) -> Result<(), AppError> {
  let sheet = workbook.add_worksheet();
  sheet.set_name("Resumen")?;

  let title = header_format(style).set_align(FormatAlign::Center);
  let section = Format::new().set_bold().set_background_color(Color::RGB(style.zebra_color));
  let label = Format::new();
  let money = Format::new().set_num_format(MONEY_FORMAT);

  sheet.merge_range(0, 0, 0, 1, "Resumen del periodo", &title)?;

  sheet.write_string_with_format(2, 0, "Totales", &section)?;
  sheet.write_string_with_format(2, 1, "", &section)?;
  sheet.write_string_with_format(3, 0, "Total general", &label)?;
  sheet.write_number_with_format(3, 1, stats.grand_total, &money)?;
  sheet.write_string_with_format(4, 0, "Movimientos", &label)?;
  sheet.write_number(4, 1, stats.tx_count as f64)?;
  sheet.write_string_with_format(5, 0, "Promedio por movimiento", &label)?;
  sheet.write_number_with_format(5, 1, stats.per_tx_average(), &money)?;
  sheet.write_string_with_format(6, 0, "Promedio por dia", &label)?;
  sheet.write_number_with_format(6, 1, stats.per_day_average(), &money)?;

  sheet.write_string_with_format(8, 0, "Periodo", &section)?;
  sheet.write_string_with_format(8, 1, "", &section)?;
  sheet.write_string_with_format(9, 0, "Desde", &label)?;
  sheet.write_string(9, 1, stats.first_day.map(format::long_date).unwrap_or_else(|| "-".to_string()))?;
  sheet.write_string_with_format(10, 0, "Hasta", &label)?;
  sheet.write_string(10, 1, stats.last_day.map(format::long_date).unwrap_or_else(|| "-".to_string()))?;
  sheet.write_string_with_format(11, 0, "Dias con movimientos", &label)?;
  sheet.write_number(11, 1, stats.distinct_days as f64)?;
  sheet.write_string_with_format(12, 0, "Generado", &label)?;
  sheet.write_string(12, 1, chrono::Utc::now().format("%d/%m/%Y %H:%M").to_string())?;

  sheet.set_column_width(0, style.col_width_name)?;
  sheet.set_column_width(1, style.col_width_label)?;
  Ok(())
}

fn write_bucket_sheet(
  workbook: &mut Workbook,
  sheet_name: &str,
  label_header: &str,
  buckets: &[StatBucket],
  style: &ReportStyle,
) -> Result<(), AppError> {
  let sheet = workbook.add_worksheet();
  sheet.set_name(sheet_name)?;

  let header = header_format(style);
  let money = Format::new().set_num_format(MONEY_FORMAT);
  let percent = Format::new().set_num_format(PERCENT_FORMAT);
  let zebra = Format::new().set_background_color(Color::RGB(style.zebra_color));
  let zebra_money = Format::new()
    .set_background_color(Color::RGB(style.zebra_color))
    .set_num_format(MONEY_FORMAT);
  let zebra_percent = Format::new()
    .set_background_color(Color::RGB(style.zebra_color))
    .set_num_format(PERCENT_FORMAT);

  let headers = [label_header, "Total", "Movimientos", "Porcentaje", "Promedio"];
  for (idx, label) in headers.iter().enumerate() {
    sheet.write_string_with_format(0, idx as u16, *label, &header)?;
  }

  for (idx, bucket) in buckets.iter().enumerate() {
    let row = idx as u32 + 1;
    if idx % 2 == 1 {
      sheet.write_string_with_format(row, 0, bucket.name.as_str(), &zebra)?;
      sheet.write_number_with_format(row, 1, bucket.total, &zebra_money)?;
      sheet.write_number_with_format(row, 2, bucket.count as f64, &zebra)?;
      sheet.write_number_with_format(row, 3, bucket.percentage, &zebra_percent)?;
      sheet.write_number_with_format(row, 4, bucket.average, &zebra_money)?;
    } else {
      sheet.write_string(row, 0, bucket.name.as_str())?;
      sheet.write_number_with_format(row, 1, bucket.total, &money)?;
      sheet.write_number(row, 2, bucket.count as f64)?;
      sheet.write_number_with_format(row, 3, bucket.percentage, &percent)?;
      sheet.write_number_with_format(row, 4, bucket.average, &money)?;
    }
  }

  sheet.set_column_width(0, style.col_width_name)?;
  sheet.set_column_width(1, style.col_width_amount)?;
  sheet.set_column_width(2, style.col_width_date)?;
  sheet.set_column_width(3, style.col_width_date)?;
  sheet.set_column_width(4, style.col_width_amount)?;
  Ok(())
}

fn write_date_cell(sheet: &mut Worksheet, row: u32, col: u16, raw: &str, date_format: &Format) -> Result<(), AppError> {
  if let Some(day) = format::day_of(raw) {
    // Excel datetimes only cover 1900-9999; anything outside degrades to
    // text below instead of aborting the whole workbook.
    if let Ok(year) = u16::try_from(day.year()) {
      if let Ok(date) = ExcelDateTime::from_ymd(year, day.month() as u8, day.day() as u8) {
        sheet.write_datetime_with_format(row, col, &date, date_format)?;
        return Ok(());
      }
    }
  }
  // Degraded record: show whatever text the store delivered.
  sheet.write_string(row, col, sanitize(raw))?;
  Ok(())
}
