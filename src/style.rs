/// Formatting and layout configuration shared by both builders. One
/// immutable value is passed explicitly into every builder call so the
/// pipeline stays purely functional; `Default` carries the brand values.
#[derive(Debug, Clone)]
pub struct ReportStyle {
  pub brand_name: String,
  /// 0xRRGGBB, used for the workbook header fill and the PDF cover band.
  pub accent_color: u32,
  /// 0xRRGGBB tint of alternating table rows in both artifacts.
  pub zebra_color: u32,

  // Workbook column widths per role.
  pub col_width_seq: f64,
  pub col_width_date: f64,
  pub col_width_name: f64,
  pub col_width_label: f64,
  pub col_width_amount: f64,

  // Document page geometry, millimeters, A4 portrait.
  pub page_width: f32,
  pub page_height: f32,
  pub margin: f32,
  pub row_height: f32,
  pub footer_reserve: f32,

  // Document font sizes, points.
  pub title_size: f32,
  pub heading_size: f32,
  pub body_size: f32,
  pub footer_size: f32,

  // Hard per-field character budgets for detail rows. Tuned against the
  // body font size and the fixed column offsets in export/pdf.rs; a longer
  // string would collide with the next column.
  pub name_max_chars: usize,
  pub category_max_chars: usize,
  pub method_max_chars: usize,
}

impl Default for ReportStyle {
  fn default() -> Self {
    Self {
      brand_name: "Gastos".to_string(),
      accent_color: 0x1A2433,
      zebra_color: 0xF1F5F9,

      col_width_seq: 6.0,
      col_width_date: 12.0,
      col_width_name: 34.0,
      col_width_label: 22.0,
      col_width_amount: 14.0,

      page_width: 210.0,
      page_height: 297.0,
      margin: 16.0,
      row_height: 7.0,
      footer_reserve: 14.0,

      title_size: 20.0,
      heading_size: 12.0,
      body_size: 9.0,
      footer_size: 8.0,

      name_max_chars: 38,
      category_max_chars: 14,
      method_max_chars: 12,
    }
  }
}

impl ReportStyle {
  /// Vertical space usable by table rows on one page.
  pub fn usable_height(&self) -> f32 {
    self.page_height - self.margin - self.footer_reserve
  }

  pub fn rgb(color: u32) -> (f32, f32, f32) {
    let r = ((color >> 16) & 0xFF) as f32 / 255.0;
    let g = ((color >> 8) & 0xFF) as f32 / 255.0;
    let b = (color & 0xFF) as f32 / 255.0;
    (r, g, b)
  }
}
