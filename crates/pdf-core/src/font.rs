//! Standard (non-embedded) PDF fonts
//!
//! The 14 standard Type 1 fonts are guaranteed to be available in every PDF
//! viewer, so they need no font program in the file. Only Helvetica is
//! provided here; its advance widths come from the Adobe AFM metrics and the
//! text is encoded with `WinAnsiEncoding`.

use crate::{PdfError, Result};
use lopdf::{Dictionary, Object};

/// Standard Type 1 font
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum StandardFont {
    #[default]
    Helvetica,
}

/// Helvetica widths for WinAnsi codes 0x20..=0x7E (1/1000 em)
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Helvetica widths for WinAnsi codes 0xA0..=0xFF (same as Latin-1)
const HELVETICA_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 0xF0
];

/// Unicode punctuation that WinAnsi places in 0x80..=0x9F, with Helvetica widths
const WIN_ANSI_EXTRAS: [(char, u8, u16); 12] = [
    ('\u{20AC}', 0x80, 556), // euro
    ('\u{201A}', 0x82, 222), // quotesinglbase
    ('\u{201E}', 0x84, 333), // quotedblbase
    ('\u{2026}', 0x85, 1000), // ellipsis
    ('\u{2018}', 0x91, 222), // quoteleft
    ('\u{2019}', 0x92, 222), // quoteright
    ('\u{201C}', 0x93, 333), // quotedblleft
    ('\u{201D}', 0x94, 333), // quotedblright
    ('\u{2022}', 0x95, 350), // bullet
    ('\u{2013}', 0x96, 556), // endash
    ('\u{2014}', 0x97, 1000), // emdash
    ('\u{2122}', 0x99, 1000), // trademark
];

impl StandardFont {
    /// PostScript name written as `/BaseFont`
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
        }
    }

    /// Map a character to its WinAnsi code and advance width
    fn lookup(&self, c: char) -> Option<(u8, u16)> {
        let code = c as u32;
        match code {
            0x20..=0x7E => Some((code as u8, HELVETICA_ASCII[(code - 0x20) as usize])),
            0xA0..=0xFF => Some((code as u8, HELVETICA_LATIN1[(code - 0xA0) as usize])),
            _ => WIN_ANSI_EXTRAS
                .iter()
                .find(|(ch, _, _)| *ch == c)
                .map(|&(_, byte, width)| (byte, width)),
        }
    }

    /// Check if the font can encode a character
    pub fn has_glyph(&self, c: char) -> bool {
        self.lookup(c).is_some()
    }

    /// Advance width of a character in 1/1000 em
    ///
    /// Characters outside WinAnsi have no glyph and measure as zero.
    pub fn char_width(&self, c: char) -> u16 {
        self.lookup(c).map(|(_, width)| width).unwrap_or(0)
    }

    /// Width of text in points at the given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f32 * font_size / 1000.0
    }

    /// Encode text as WinAnsi bytes
    ///
    /// Fails on the first character the encoding cannot represent.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        text.chars()
            .map(|c| {
                self.lookup(c)
                    .map(|(byte, _)| byte)
                    .ok_or(PdfError::UnsupportedCharacter(c))
            })
            .collect()
    }

    /// Encode text as a PDF hex string (e.g. `<48656C6C6F>`)
    pub fn encode_hex(&self, text: &str) -> Result<String> {
        let bytes = self.encode(text)?;
        let mut hex = String::with_capacity(bytes.len() * 2 + 2);
        hex.push('<');
        for byte in bytes {
            hex.push_str(&format!("{byte:02X}"));
        }
        hex.push('>');
        Ok(hex)
    }

    /// Build the font dictionary for embedding
    pub fn to_pdf_object(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"Font".to_vec()));
        dict.set("Subtype", Object::Name(b"Type1".to_vec()));
        dict.set("BaseFont", Object::Name(self.base_font().as_bytes().to_vec()));
        dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        dict
    }
}
