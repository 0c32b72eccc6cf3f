//! Word wrapping for multi-line fields

use crate::WrapSpec;
use pdf_core::StandardFont;

/// Wrap text with Helvetica metrics at the wrap's measurement size
pub fn wrap_text(text: &str, spec: &WrapSpec) -> Vec<String> {
    let font = StandardFont::Helvetica;
    pdf_core::wrap_text(
        text,
        |line| font.text_width_points(line, spec.measure_size),
        spec.max_width,
        spec.max_lines,
    )
}
