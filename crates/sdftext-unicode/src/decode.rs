// this_file: crates/sdftext-unicode/src/decode.rs

//! Validating decoders for the three encodings text can arrive in.

use sdftext_core::{Result, TextError};

/// Borrowed text in one of the supported encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInput<'a> {
    Utf8(&'a [u8]),
    Utf16(&'a [u16]),
    Utf32(&'a [u32]),
}

impl<'a> From<&'a str> for TextInput<'a> {
    fn from(text: &'a str) -> Self {
        TextInput::Utf8(text.as_bytes())
    }
}

impl TextInput<'_> {
    /// True when there are no code units at all
    pub fn is_empty(&self) -> bool {
        match self {
            TextInput::Utf8(units) => units.is_empty(),
            TextInput::Utf16(units) => units.is_empty(),
            TextInput::Utf32(units) => units.is_empty(),
        }
    }

    /// Count code points, rejecting malformed input
    pub fn count_chars(&self) -> Result<usize> {
        match self {
            TextInput::Utf8(bytes) => Ok(utf8_str(bytes)?.chars().count()),
            TextInput::Utf16(units) => {
                let mut count = 0;
                for decoded in char::decode_utf16(units.iter().copied()) {
                    decoded.map_err(|err| {
                        TextError::Format(format!(
                            "unpaired UTF-16 surrogate 0x{:04X}",
                            err.unpaired_surrogate()
                        ))
                    })?;
                    count += 1;
                }
                Ok(count)
            }
            TextInput::Utf32(units) => {
                for &unit in units.iter() {
                    utf32_char(unit)?;
                }
                Ok(units.len())
            }
        }
    }

    /// Decode into `out`, replacing its contents
    ///
    /// On error `out` is left empty so no half-decoded text escapes.
    pub fn decode_into(&self, out: &mut Vec<char>) -> Result<usize> {
        out.clear();
        let count = self.count_chars()?;
        out.try_reserve(count)
            .map_err(|_| TextError::out_of_memory("decoded characters"))?;

        match self {
            TextInput::Utf8(bytes) => out.extend(utf8_str(bytes)?.chars()),
            TextInput::Utf16(units) => {
                // Already validated by count_chars
                out.extend(char::decode_utf16(units.iter().copied()).flatten())
            }
            TextInput::Utf32(units) => {
                for &unit in units.iter() {
                    out.push(utf32_char(unit)?);
                }
            }
        }

        Ok(out.len())
    }
}

fn utf8_str(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|err| TextError::Format(format!("invalid UTF-8 at byte {}", err.valid_up_to())))
}

fn utf32_char(unit: u32) -> Result<char> {
    char::from_u32(unit)
        .ok_or_else(|| TextError::Format(format!("invalid UTF-32 code point 0x{unit:X}")))
}
