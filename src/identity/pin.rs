// KiddieFlix - Parent PIN
// Unsalted SHA-256 of the trimmed code, hex encoded.
// Friction for kids, not a security boundary. Stored hashes must keep this format.

use sha2::{Digest, Sha256};

use crate::constants::{PIN_MAX_LEN, PIN_MIN_LEN};
use crate::error::{KiddieError, Result};

/// One-way digest used to store and compare parent PINs.
pub trait PinScheme {
    fn digest(&self, code: &str) -> String;
}

/// Default scheme: lowercase hex SHA-256.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Pin;

impl PinScheme for Sha256Pin {
    fn digest(&self, code: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(code.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Source of a PIN code when a gated action needs one.
/// Returning `None` means the parent dismissed the prompt.
pub trait PinPrompt {
    fn request_pin(&mut self, message: &str) -> Option<String>;
}

impl<F> PinPrompt for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn request_pin(&mut self, message: &str) -> Option<String> {
        self(message)
    }
}

/// A prompt that always answers with the same code (or always cancels).
#[derive(Debug, Clone, Default)]
pub struct FixedPin(pub Option<String>);

impl PinPrompt for FixedPin {
    fn request_pin(&mut self, _message: &str) -> Option<String> {
        self.0.clone()
    }
}

/// Trim and compare digests. `stored = None` means no PIN is set: everyone is a parent.
pub fn verify_code(scheme: &dyn PinScheme, stored: Option<&str>, code: &str) -> bool {
    match stored {
        None => true,
        Some(saved) => scheme.digest(code.trim()) == saved,
    }
}

/// Validate a new PIN entered twice. Returns the trimmed code.
pub fn validate_new_pin(code: &str, confirm: &str) -> Result<String> {
    let code = code.trim();
    let confirm = confirm.trim();

    let len = code.chars().count();
    if !(PIN_MIN_LEN..=PIN_MAX_LEN).contains(&len) {
        return Err(KiddieError::InvalidPin);
    }
    if code != confirm {
        return Err(KiddieError::PinMismatch);
    }

    Ok(code.to_string())
}
