//! Text helpers for the standard (non-embedded) Helvetica fonts.

/// Encode `s` for a font using `WinAnsiEncoding`.
///
/// ASCII and Latin-1 map to themselves, a few common typographic characters
/// map to their WinAnsi slots, control characters become spaces, and
/// anything else becomes `?`.
pub fn win_ansi(s: &str) -> Vec<u8> {
  s.chars()
    .map(|c| match c {
      '\u{20}'..='\u{7E}' => c as u8,
      '\u{A0}'..='\u{FF}' => c as u8,
      '\u{20AC}' => 0x80,
      '\u{2018}' => 0x91,
      '\u{2019}' => 0x92,
      '\u{201C}' => 0x93,
      '\u{201D}' => 0x94,
      '\u{2022}' => 0x95,
      '\u{2013}' => 0x96,
      '\u{2014}' => 0x97,
      c if c.is_control() => b' ',
      _ => b'?',
    })
    .collect()
}

/// Rough rendered width of `s` in Helvetica at `size` points.
///
/// Average glyph width is a little over half the font size; good enough for
/// centring a footer and truncating long names.
pub fn approx_width(s: &str, size: f32) -> f32 {
  s.chars().count() as f32 * size * 0.55
}

/// Shorten `s` with a trailing `...` so it fits `max_width` at `size`.
pub fn truncate_to_width(s: &str, size: f32, max_width: f32) -> String {
  if approx_width(s, size) <= max_width {
    return s.to_owned();
  }
  let budget = ((max_width / (size * 0.55)).floor() as usize).saturating_sub(3);
  let mut out: String = s.chars().take(budget).collect();
  out.push_str("...");
  out
}

/// Render a measurement without a spurious trailing `.0`.
pub fn measurement(value: f64) -> String { format!("{value}") }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn win_ansi_keeps_latin1_and_replaces_the_rest() {
    assert_eq!(win_ansi("Bolt M8"), b"Bolt M8");
    assert_eq!(win_ansi("Gr\u{F6}\u{DF}e"), vec![b'G', b'r', 0xF6, 0xDF, b'e']);
    assert_eq!(win_ansi("\u{20AC}5"), vec![0x80, b'5']);
    assert_eq!(win_ansi("\u{65E5}\tx"), b"? x");
  }

  #[test]
  fn truncation_only_applies_to_long_text() {
    assert_eq!(truncate_to_width("Bolt", 12.0, 200.0), "Bolt");
    let long = "x".repeat(200);
    let cut = truncate_to_width(&long, 12.0, 120.0);
    assert!(cut.ends_with("..."));
    assert!(approx_width(&cut, 12.0) <= 120.0);
  }

  #[test]
  fn measurements_drop_trailing_zero_fraction() {
    assert_eq!(measurement(40.0), "40");
    assert_eq!(measurement(12.5), "12.5");
  }
}
