//! Glyph alphabets for the rain field.

use serde::{Deserialize, Serialize};

/// Characters used for binary rain.
pub const BINARY_CHARS: &[char] = &['0', '1'];

/// Characters used for classic katakana rain.
pub const KATAKANA_CHARS: &[char] = &[
    'ア', 'イ', 'ウ', 'エ', 'オ', 'カ', 'キ', 'ク', 'ケ', 'コ', 'サ', 'シ', 'ス', 'セ', 'ソ', 'タ',
    'チ', 'ツ', 'テ', 'ト', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Named glyph sets selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alphabet {
    #[default]
    Binary,
    Katakana,
    Mixed,
}

impl Alphabet {
    pub fn glyphs(self) -> Vec<char> {
        match self {
            Alphabet::Binary => BINARY_CHARS.to_vec(),
            Alphabet::Katakana => KATAKANA_CHARS.to_vec(),
            Alphabet::Mixed => {
                let mut glyphs = KATAKANA_CHARS.to_vec();
                glyphs.extend_from_slice(BINARY_CHARS);
                glyphs.extend_from_slice(BINARY_CHARS);
                glyphs
            }
        }
    }
}
