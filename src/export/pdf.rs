use std::collections::HashMap;

use printpdf::path::PaintMode;
use printpdf::*;

use crate::aggregate::Stats;
use crate::error::AppError;
use crate::format;
use crate::models::{Category, PaymentMethod, Transaction};
use crate::sanitize::sanitize;
use crate::style::ReportStyle;

const PT_TO_MM: f32 = 0.3528;
/// Average Helvetica advance as a fraction of the font size, used to
/// right-align and to size the bar-chart label column.
const CHAR_WIDTH_EM: f32 = 0.5;

const COL_DATE: f32 = 2.0;
const COL_NAME: f32 = 24.0;
const COL_CATEGORY: f32 = 96.0;
const COL_METHOD: f32 = 128.0;

pub struct RenderedDocument {
  pub bytes: Vec<u8>,
  pub page_count: usize,
}

/// Paginated printable report: cover with summary stats and a bucket
/// breakdown, then a detail table that flows over as many pages as needed,
/// then a footer stamped onto every page in a second pass (the total page
/// count only exists once layout is done).
pub fn build_document(
  subset: &[Transaction],
  stats: &Stats,
  categories: &HashMap<i64, Category>,
  payment_methods: &HashMap<i64, PaymentMethod>,
  style: &ReportStyle,
) -> Result<RenderedDocument, AppError> {
  let (doc, first_page, first_layer) = PdfDocument::new(
    "Reporte de gastos",
    Mm(style.page_width),
    Mm(style.page_height),
    "contenido",
  );
  let font = doc
    .add_builtin_font(BuiltinFont::Helvetica)
    .map_err(|err| AppError::new("EXPORT", err.to_string()))?;
  let bold = doc
    .add_builtin_font(BuiltinFont::HelveticaBold)
    .map_err(|err| AppError::new("EXPORT", err.to_string()))?;

  let mut writer = DocWriter {
    doc,
    pages: vec![(first_page, first_layer)],
    font,
    bold,
    style,
    y: 0.0,
  };

  writer.draw_cover(stats);
  let rows = super::rows_desc_by_date(subset);
  if rows.is_empty() {
    writer.draw_empty_notice();
  } else {
    writer.start_detail_page(false);
    for (idx, tx) in rows.iter().enumerate() {
      if writer.y + style.row_height > style.usable_height() {
        writer.start_detail_page(true);
      }
      writer.write_row(idx, tx, categories, payment_methods);
    }
  }
  writer.stamp_footers();

  let page_count = writer.pages.len();
  let bytes = writer
    .doc
    .save_to_bytes()
    .map_err(|err| AppError::new("EXPORT", err.to_string()))?;
  Ok(RenderedDocument { bytes, page_count })
}

/// Rows that fit on one detail page; the column header band sits at a
/// fixed offset, identical on first and continuation pages.
pub(crate) fn detail_rows_per_page(style: &ReportStyle) -> usize {
  let rows_top = style.margin + 18.0;
  ((style.usable_height() - rows_top) / style.row_height).floor() as usize
}

pub(crate) fn footer_page_label(page: usize, total: usize) -> String {
  format!("Pagina {} de {}", page, total)
}

struct DocWriter<'a> {
  doc: PdfDocumentReference,
  pages: Vec<(PdfPageIndex, PdfLayerIndex)>,
  font: IndirectFontRef,
  bold: IndirectFontRef,
  style: &'a ReportStyle,
  /// Layout cursor in millimeters from the top edge of the current page.
  y: f32,
}

impl DocWriter<'_> {
  fn layer(&self) -> PdfLayerReference {
    let (page, layer) = self.pages[self.pages.len() - 1];
    self.doc.get_page(page).get_layer(layer)
  }

  fn new_page(&mut self) {
    let (page, layer) = self
      .doc
      .add_page(Mm(self.style.page_width), Mm(self.style.page_height), "contenido");
    self.pages.push((page, layer));
    self.y = self.style.margin;
  }

  fn baseline(&self, y_from_top: f32) -> Mm {
    Mm(self.style.page_height - y_from_top)
  }

  fn text(&self, text: &str, size: f32, x: f32, y_from_top: f32, bold: bool) {
    let font = if bold { &self.bold } else { &self.font };
    self.layer().use_text(text, size, Mm(x), self.baseline(y_from_top), font);
  }

  fn text_right(&self, text: &str, size: f32, right_edge: f32, y_from_top: f32, bold: bool) {
    let width = text.chars().count() as f32 * size * CHAR_WIDTH_EM * PT_TO_MM;
    self.text(text, size, right_edge - width, y_from_top, bold);
  }

  fn fill_rect(&self, x: f32, y_from_top: f32, width: f32, height: f32, color: u32) {
    let (r, g, b) = ReportStyle::rgb(color);
    let layer = self.layer();
    layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
    let rect = Rect::new(
      Mm(x),
      Mm(self.style.page_height - y_from_top - height),
      Mm(x + width),
      Mm(self.style.page_height - y_from_top),
    )
    .with_mode(PaintMode::Fill);
    layer.add_rect(rect);
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
  }

  fn content_width(&self) -> f32 {
    self.style.page_width - 2.0 * self.style.margin
  }

  fn draw_cover(&mut self, stats: &Stats) {
    let style = self.style;

    // Brand band.
    self.fill_rect(0.0, 0.0, style.page_width, 30.0, style.accent_color);
    let layer = self.layer();
    layer.set_fill_color(Color::Rgb(Rgb::new(1.0, 1.0, 1.0, None)));
    layer.use_text(
      style.brand_name.as_str(),
      style.title_size,
      Mm(style.margin),
      self.baseline(19.0),
      &self.bold,
    );
    layer.use_text(
      "Reporte de gastos",
      style.heading_size,
      Mm(style.margin),
      self.baseline(26.0),
      &self.font,
    );
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));

    self.text(&super::range_label(stats), style.heading_size, style.margin, 42.0, false);

    // Summary cards.
    let gap = 4.0;
    let card_width = (self.content_width() - 3.0 * gap) / 4.0;
    let card_top = 50.0;
    let cards = [
      ("Total", format::currency(stats.grand_total)),
      ("Promedio por dia", format::currency(stats.per_day_average())),
      ("Movimientos", stats.tx_count.to_string()),
      (
        "Categoria principal",
        format::truncate(stats.top_category_name().unwrap_or("-"), 16),
      ),
    ];
    for (idx, (label, value)) in cards.iter().enumerate() {
      let x = style.margin + idx as f32 * (card_width + gap);
      self.fill_rect(x, card_top, card_width, 20.0, style.zebra_color);
      self.text(label, style.footer_size, x + 2.0, card_top + 6.0, false);
      self.text(value, style.heading_size - 1.0, x + 2.0, card_top + 15.0, true);
    }

    // Top categories bar breakdown.
    self.text("Por categoria", style.heading_size, style.margin, 84.0, true);
    let split = stats.top_categories_with_others();
    let label_width = 50.0;
    let value_width = 24.0;
    let bar_max = self.content_width() - label_width - value_width;
    let max_total = split
      .display
      .iter()
      .map(|bucket| bucket.total)
      .fold(0.0_f64, f64::max);
    let mut bar_top = 92.0;
    for bucket in &split.display {
      let ratio = format::safe_div(bucket.total, max_total) as f32;
      self.text(
        &format::truncate(&bucket.name, 20),
        style.body_size,
        style.margin,
        bar_top + 4.0,
        false,
      );
      self.fill_rect(style.margin + label_width, bar_top, (bar_max * ratio).max(0.5), 5.0, style.accent_color);
      self.text_right(
        &format::percent(bucket.percentage),
        style.body_size,
        style.page_width - style.margin,
        bar_top + 4.0,
        false,
      );
      bar_top += 9.0;
    }
    self.y = bar_top;
  }

  fn draw_empty_notice(&mut self) {
    self.text(
      "Sin movimientos en el periodo",
      self.style.heading_size,
      self.style.margin,
      self.y + 16.0,
      true,
    );
  }

  /// New detail page with the fixed-offset column header band; continuation
  /// pages get a condensed heading on top.
  fn start_detail_page(&mut self, continued: bool) {
    self.new_page();
    let style = self.style;
    let heading = if continued {
      "Detalle de movimientos (continuacion)"
    } else {
      "Detalle de movimientos"
    };
    self.text(heading, style.heading_size, style.margin, style.margin + 5.0, true);

    let band_top = style.margin + 10.0;
    self.fill_rect(style.margin, band_top, self.content_width(), 8.0, style.accent_color);
    let layer = self.layer();
    layer.set_fill_color(Color::Rgb(Rgb::new(1.0, 1.0, 1.0, None)));
    let label_y = self.baseline(band_top + 5.5);
    layer.use_text("Fecha", style.body_size, Mm(style.margin + COL_DATE), label_y, &self.bold);
    layer.use_text("Nombre", style.body_size, Mm(style.margin + COL_NAME), label_y, &self.bold);
    layer.use_text("Categoria", style.body_size, Mm(style.margin + COL_CATEGORY), label_y, &self.bold);
    layer.use_text("Metodo", style.body_size, Mm(style.margin + COL_METHOD), label_y, &self.bold);
    layer.use_text("Importe", style.body_size, Mm(style.page_width - style.margin - 16.0), label_y, &self.bold);
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));

    self.y = band_top + 8.0;
  }

  fn write_row(
    &mut self,
    idx: usize,
    tx: &Transaction,
    categories: &HashMap<i64, Category>,
    payment_methods: &HashMap<i64, PaymentMethod>,
  ) {
    let style = self.style;
    if idx % 2 == 1 {
      self.fill_rect(style.margin, self.y, self.content_width(), style.row_height, style.zebra_color);
    }

    let date_text = match format::day_of(&tx.date) {
      Some(day) => format::short_date(day),
      None => format::truncate(&sanitize(&tx.date), 10),
    };
    let name = format::truncate(&sanitize(&tx.name), style.name_max_chars);
    let category = format::truncate(&super::category_label(tx, categories), style.category_max_chars);
    let method = format::truncate(&super::method_label(tx, payment_methods), style.method_max_chars);

    let text_y = self.y + style.row_height - 2.0;
    self.text(&date_text, style.body_size, style.margin + COL_DATE, text_y, false);
    self.text(&name, style.body_size, style.margin + COL_NAME, text_y, false);
    self.text(&category, style.body_size, style.margin + COL_CATEGORY, text_y, false);
    self.text(&method, style.body_size, style.margin + COL_METHOD, text_y, false);
    self.text_right(
      &format::currency(tx.safe_amount()),
      style.body_size,
      style.page_width - style.margin - 2.0,
      text_y,
      false,
    );

    self.y += style.row_height;
  }

  /// Second pass over every placed page; N is only known here.
  fn stamp_footers(&self) {
    let style = self.style;
    let total = self.pages.len();
    for (idx, (page, layer)) in self.pages.iter().enumerate() {
      let layer = self.doc.get_page(*page).get_layer(*layer);
      let y = Mm(style.footer_reserve - 6.0);
      layer.use_text(
        format!("Generado por {}", style.brand_name),
        style.footer_size,
        Mm(style.margin),
        y,
        &self.font,
      );
      let label = footer_page_label(idx + 1, total);
      let width = label.chars().count() as f32 * style.footer_size * CHAR_WIDTH_EM * PT_TO_MM;
      layer.use_text(label, style.footer_size, Mm(style.page_width - style.margin - width), y, &self.font);
    }
  }
}
