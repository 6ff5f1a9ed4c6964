//! Client-generated idempotency token sent as the `uuid` form field.
//!
//! The server rejects a token it has already seen, so a fresh one is drawn
//! after every failed attempt.

use std::fmt;

use rand::Rng;

const TEMPLATE: &[u8; 32] = b"xxxxxxxxxxxx4xxxyxxxxxxxxxxxxxxx";
const HEX: &[u8; 16] = b"0123456789abcdef";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IdempotencyToken(String);

impl IdempotencyToken {
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let token = TEMPLATE
            .iter()
            .map(|&c| {
                let r: u8 = rng.gen_range(0..16);
                match c {
                    b'x' => HEX[r as usize] as char,
                    b'y' => HEX[((r & 0x3) | 0x8) as usize] as char,
                    other => other as char,
                }
            })
            .collect();
        Self(token)
    }

    /// Draw a new token that differs from `self`.
    pub fn rotate(&self) -> Self {
        loop {
            let next = Self::generate();
            if next != *self {
                return next;
            }
        }
    }

    /// 32 lowercase hex digits, version nibble `4` at 12, variant `8..=b` at 16.
    pub fn is_well_formed(&self) -> bool {
        let bytes = self.0.as_bytes();
        bytes.len() == TEMPLATE.len()
            && bytes
                .iter()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(b))
            && bytes[12] == b'4'
            && matches!(bytes[16], b'8' | b'9' | b'a' | b'b')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
