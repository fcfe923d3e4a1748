//! Binary sub-protocol embedded in the status text.
//!
//! A status line is a byte stream with three kinds of item:
//!
//! ```text
//! stream  := item*
//! item    := colour | token | text
//! colour  := 0x01..=0x08        switch foreground; 0x01 resets to normal
//! token   := marker x y w h skip
//! marker  := 1 f 0 0 t t t t    f = filled, tttt = tier (1..=8)
//! x..skip := logical value + 1  (never 0x00)
//! text    := 0x20..=0x7e
//! ```
//!
//! Tokens carry no length prefix; a renderer consumes six bytes whenever it
//! sees a byte with the high bit set.

use crate::classify::Tier;
use serde::Serialize;
use thiserror::Error;

pub const TOKEN_LEN: usize = 6;
pub const MARKER_BIT: u8 = 0x80;
pub const FILLED_BIT: u8 = 0x40;
const RESERVED_BITS: u8 = 0x30;
const TIER_BITS: u8 = 0x0f;
/// Largest logical field value; the +1 wire offset must still fit in a byte.
pub const MAX_FIELD: u8 = u8::MAX - 1;
/// Colour byte that ends a coloured run.
pub const RESET: u8 = Tier::Normal.byte();

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("bar token truncated: need 6 bytes, have {0}")]
    Truncated(usize),
    #[error("byte {0:#04x} is not a bar token marker")]
    MissingMarker(u8),
    #[error("marker {0:#04x} does not carry a valid tier")]
    InvalidTier(u8),
    #[error("bar token field {index} is zero")]
    ZeroField { index: usize },
    #[error("unexpected byte {byte:#04x} at offset {offset}")]
    UnexpectedByte { byte: u8, offset: usize },
}

/// Drawing primitive for the status bar's overlay channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BarToken {
    pub x: u8,
    pub y: u8,
    pub width: u8,
    pub height: u8,
    /// Column to continue text at after drawing; 0 keeps the current column.
    pub skip_to_col: u8,
    pub filled: bool,
    pub color: Tier,
}

impl BarToken {
    /// Filled bar; fields above [`MAX_FIELD`] are clamped.
    pub fn filled(x: u32, y: u32, width: u32, height: u32, skip_to_col: u32, color: Tier) -> Self {
        Self {
            x: clamp_field(x),
            y: clamp_field(y),
            width: clamp_field(width),
            height: clamp_field(height),
            skip_to_col: clamp_field(skip_to_col),
            filled: true,
            color,
        }
    }

    /// Outline-only bar.
    pub fn outline(x: u32, y: u32, width: u32, height: u32, skip_to_col: u32, color: Tier) -> Self {
        Self {
            filled: false,
            ..Self::filled(x, y, width, height, skip_to_col, color)
        }
    }

    pub fn encode(&self) -> [u8; TOKEN_LEN] {
        let mut head = MARKER_BIT | self.color.byte();
        if self.filled {
            head |= FILLED_BIT;
        }
        [
            head,
            wire(self.x),
            wire(self.y),
            wire(self.width),
            wire(self.height),
            wire(self.skip_to_col),
        ]
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.encode());
    }

    /// Decodes the token at the start of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let Some(raw) = bytes.get(..TOKEN_LEN) else {
            return Err(DecodeError::Truncated(bytes.len()));
        };
        let head = raw[0];
        if head & MARKER_BIT == 0 {
            return Err(DecodeError::MissingMarker(head));
        }
        if head & RESERVED_BITS != 0 {
            return Err(DecodeError::InvalidTier(head));
        }
        let color = Tier::from_byte(head & TIER_BITS).ok_or(DecodeError::InvalidTier(head))?;
        let mut fields = [0u8; TOKEN_LEN - 1];
        for (index, (slot, byte)) in fields.iter_mut().zip(&raw[1..]).enumerate() {
            *slot = byte
                .checked_sub(1)
                .ok_or(DecodeError::ZeroField { index: index + 1 })?;
        }
        let [x, y, width, height, skip_to_col] = fields;
        Ok(Self {
            x,
            y,
            width,
            height,
            skip_to_col,
            filled: head & FILLED_BIT != 0,
            color,
        })
    }
}

fn clamp_field(value: u32) -> u8 {
    value.min(u32::from(MAX_FIELD)) as u8
}

fn wire(value: u8) -> u8 {
    value.min(MAX_FIELD) + 1
}

/// Decodes back-to-back tokens for as long as a marker byte leads.
///
/// Returns the tokens and the number of bytes consumed.
pub fn decode_run(bytes: &[u8]) -> Result<(Vec<BarToken>, usize), DecodeError> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    while bytes.get(offset).is_some_and(|b| b & MARKER_BIT != 0) {
        tokens.push(BarToken::decode(&bytes[offset..])?);
        offset += TOKEN_LEN;
    }
    Ok((tokens, offset))
}

/// One decoded item of a status line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Span {
    Text { color: Tier, text: String },
    Bar(BarToken),
}

/// Parses a rendered status line back into coloured text runs and tokens.
///
/// Adjacent text bytes of the same colour are merged into one span.
pub fn decode_stream(bytes: &[u8]) -> Result<Vec<Span>, DecodeError> {
    let mut spans = Vec::new();
    let mut color = Tier::Normal;
    let mut offset = 0;
    while let Some(&byte) = bytes.get(offset) {
        if byte & MARKER_BIT != 0 {
            let (tokens, used) = decode_run(&bytes[offset..])?;
            spans.extend(tokens.into_iter().map(Span::Bar));
            offset += used;
            continue;
        }
        if let Some(tier) = Tier::from_byte(byte) {
            color = tier;
        } else if (0x20..=0x7e).contains(&byte) {
            match spans.last_mut() {
                Some(Span::Text { color: c, text }) if *c == color => text.push(byte as char),
                _ => spans.push(Span::Text {
                    color,
                    text: (byte as char).to_string(),
                }),
            }
        } else {
            return Err(DecodeError::UnexpectedByte { byte, offset });
        }
        offset += 1;
    }
    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_token_has_marker_and_no_zero_bytes() {
        let token = BarToken::filled(0, 2, 16, 2, 0, Tier::Green);
        let bytes = token.encode();
        assert_ne!(bytes[0] & MARKER_BIT, 0);
        assert_ne!(bytes[0] & FILLED_BIT, 0);
        assert!(bytes.iter().all(|b| *b != 0));
        assert_eq!(bytes, [0x80 | 0x40 | 8, 1, 3, 17, 3, 1]);
    }

    #[test]
    fn decode_inverts_encode() {
        let cases = [
            BarToken::filled(0, 0, 0, 0, 0, Tier::Normal),
            BarToken::filled(254, 254, 254, 254, 254, Tier::Green),
            BarToken::outline(0, 1, 100, 12, 101, Tier::Normal),
            BarToken::filled(0, 9, 1, 4, 1, Tier::Red),
            BarToken::outline(17, 3, 40, 2, 41, Tier::Cyan),
        ];
        for token in cases {
            assert_eq!(BarToken::decode(&token.encode()), Ok(token));
        }
    }

    #[test]
    fn oversized_fields_are_clamped() {
        let token = BarToken::filled(1000, 0, 300, 0, 0, Tier::Blue);
        assert_eq!(token.x, MAX_FIELD);
        assert_eq!(token.width, MAX_FIELD);
        assert_eq!(token.encode()[1], u8::MAX);
    }

    #[test]
    fn decode_rejects_malformed_markers() {
        assert_eq!(
            BarToken::decode(&[0x08, 1, 1, 1, 1, 1]),
            Err(DecodeError::MissingMarker(0x08))
        );
        assert_eq!(
            BarToken::decode(&[0x80, 1, 1, 1, 1, 1]),
            Err(DecodeError::InvalidTier(0x80))
        );
        assert_eq!(
            BarToken::decode(&[0x89, 1, 1, 1, 1, 1]),
            Err(DecodeError::InvalidTier(0x89))
        );
        assert_eq!(
            BarToken::decode(&[0x93, 1, 1, 1, 1, 1]),
            Err(DecodeError::InvalidTier(0x93))
        );
        assert_eq!(
            BarToken::decode(&[0x83, 1, 1, 0, 1, 1]),
            Err(DecodeError::ZeroField { index: 3 })
        );
        assert_eq!(BarToken::decode(&[0x83, 1]), Err(DecodeError::Truncated(2)));
    }

    #[test]
    fn runs_decode_without_delimiters() {
        let a = BarToken::filled(0, 4, 1, 4, 0, Tier::Green);
        let b = BarToken::filled(0, 9, 1, 2, 1, Tier::Red);
        let mut bytes = Vec::new();
        a.encode_into(&mut bytes);
        b.encode_into(&mut bytes);
        bytes.extend_from_slice(b"::");
        let (tokens, used) = decode_run(&bytes).unwrap();
        assert_eq!(tokens, vec![a, b]);
        assert_eq!(used, 2 * TOKEN_LEN);
    }

    #[test]
    fn stream_splits_colours_text_and_bars() {
        let bar = BarToken::filled(0, 1, 10, 12, 0, Tier::Blue);
        let mut bytes = vec![Tier::Red.byte()];
        bytes.extend_from_slice(b"hot");
        bytes.push(RESET);
        bytes.extend_from_slice(b" ok");
        bar.encode_into(&mut bytes);
        bytes.extend_from_slice(b"::");
        let spans = decode_stream(&bytes).unwrap();
        assert_eq!(
            spans,
            vec![
                Span::Text {
                    color: Tier::Red,
                    text: "hot".into()
                },
                Span::Text {
                    color: Tier::Normal,
                    text: " ok".into()
                },
                Span::Bar(bar),
                Span::Text {
                    color: Tier::Normal,
                    text: "::".into()
                },
            ]
        );
    }

    #[test]
    fn stream_rejects_stray_control_bytes() {
        assert_eq!(
            decode_stream(b"ab\x00"),
            Err(DecodeError::UnexpectedByte { byte: 0, offset: 2 })
        );
        assert_eq!(
            decode_stream(b"\n"),
            Err(DecodeError::UnexpectedByte { byte: b'\n', offset: 0 })
        );
    }
}
