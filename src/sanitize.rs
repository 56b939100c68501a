/// Renderer-safe text cleanup. The spreadsheet and PDF encoders only carry
/// glyphs for Latin-1 plus Latin Extended-A, so decorative unicode (emoji,
/// dingbats, flags, variation selectors) is removed first and anything else
/// outside the printable range is dropped afterwards. Idempotent and total.
pub fn sanitize(text: &str) -> String {
  text
    .chars()
    .filter(|c| !is_decorative(*c))
    .filter(|c| is_printable(*c))
    .collect::<String>()
    .trim()
    .to_string()
}

fn is_decorative(c: char) -> bool {
  matches!(u32::from(c),
    0x2600..=0x27BF          // misc symbols + dingbats
    | 0xFE00..=0xFE0F        // variation selectors
    | 0x1F100..=0x1F1FF      // enclosed alphanumerics + regional flags
    | 0x1F300..=0x1FAFF      // pictographs, emoticons, transport, extended
  )
}

fn is_printable(c: char) -> bool {
  matches!(u32::from(c),
    0x20..=0x7E              // printable ASCII
    | 0xA0..=0xFF            // printable Latin-1
    | 0x100..=0x17F          // Latin Extended-A
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_emoji_and_symbols() {
    assert_eq!(sanitize("Cafe \u{2615} con leche"), "Cafe  con leche");
    assert_eq!(sanitize("\u{1F355} Pizza"), "Pizza");
    assert_eq!(sanitize("Viaje \u{1F1E6}\u{1F1F7}"), "Viaje");
  }

  #[test]
  fn keeps_latin_accents() {
    assert_eq!(sanitize("Almuerzo según menú"), "Almuerzo según menú");
    assert_eq!(sanitize("Łódź"), "Łódź");
  }

  #[test]
  fn drops_out_of_range_scripts() {
    assert_eq!(sanitize("Tienda 東京"), "Tienda");
  }

  #[test]
  fn empty_and_whitespace_yield_empty() {
    assert_eq!(sanitize(""), "");
    assert_eq!(sanitize("   "), "");
    assert_eq!(sanitize("\u{1F600}"), "");
  }

  #[test]
  fn idempotent_and_never_grows() {
    let samples = ["Cafe \u{2615}", "  plain  ", "Łódź \u{1F355}\u{FE0F}", "東京"];
    for sample in samples {
      let once = sanitize(sample);
      assert_eq!(sanitize(&once), once);
      assert!(once.chars().count() <= sample.chars().count());
    }
  }
}
