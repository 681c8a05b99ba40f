//! Text canonicalization.
//!
//! Answers arrive in mixed scripts and widths: full-width Latin from
//! Japanese IMEs, stray full-width spaces, arbitrary casing. `normalize`
//! folds all of that into one canonical form. Kana conversion is a separate
//! concern — the matcher applies it when comparing, but it is never part of
//! `normalize` itself.

/// Full-width ASCII block (！ through ～) sits at a fixed offset from the
/// half-width forms.
const FULL_TO_HALF_OFFSET: u32 = 0xFEE0;

/// Katakana ァ..ヶ sits 0x60 above the corresponding hiragana ぁ..ゖ.
const KANA_OFFSET: u32 = 0x60;

/// Canonicalizes answer text: trim, full-width → half-width, whitespace
/// runs collapsed to a single space, lowercased.
///
/// Idempotent; empty input yields the empty string.
#[must_use]
pub fn normalize(text: &str) -> String {
    let half_width = to_half_width(text);
    let collapsed = half_width.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

/// Converts full-width Latin letters, digits, and punctuation
/// (U+FF01..=U+FF5E) to their half-width forms. Everything else passes
/// through untouched.
#[must_use]
pub fn to_half_width(text: &str) -> String {
    map_range(text, 0xFF01, 0xFF5E, |code| code - FULL_TO_HALF_OFFSET)
}

/// Converts katakana (U+30A1..=U+30F6) to hiragana. Everything else passes
/// through untouched.
#[must_use]
pub fn to_hiragana(text: &str) -> String {
    map_range(text, 0x30A1, 0x30F6, |code| code - KANA_OFFSET)
}

/// Converts hiragana (U+3041..=U+3096) to katakana. Everything else passes
/// through untouched.
#[must_use]
pub fn to_katakana(text: &str) -> String {
    map_range(text, 0x3041, 0x3096, |code| code + KANA_OFFSET)
}

fn map_range(text: &str, lo: u32, hi: u32, shift: impl Fn(u32) -> u32) -> String {
    text.chars()
        .map(|c| {
            let code = u32::from(c);
            if (lo..=hi).contains(&code) {
                // The shifted code point stays inside the BMP kana/ASCII
                // blocks, so the conversion cannot produce an invalid char.
                char::from_u32(shift(code)).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}
