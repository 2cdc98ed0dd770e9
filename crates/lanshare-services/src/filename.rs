//! Client filename handling
//!
//! Some clients send UTF-8 filenames that arrive byte-per-char as Latin-1 text. Decoding is
//! pluggable so a deployment can switch the repair off if it ever mangles legitimate names.

const MAX_STORED_NAME_BYTES: usize = 200;
const FALLBACK_NAME: &str = "file";

pub trait FilenameDecoder: Send + Sync {
    fn decode(&self, raw: &str) -> String;
}

/// Reinterpret a Latin-1 decoded name as UTF-8 when that yields valid UTF-8.
///
/// Lossy by nature: a genuine Latin-1 name whose bytes happen to form valid UTF-8 is rewritten.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latin1Utf8Repair;

impl FilenameDecoder for Latin1Utf8Repair {
    fn decode(&self, raw: &str) -> String {
        let all_latin1 = raw.chars().all(|c| (c as u32) <= 0xFF);
        let has_high = raw.chars().any(|c| (c as u32) >= 0x80);

        if all_latin1 && has_high {
            let bytes: Vec<u8> = raw.chars().map(|c| c as u32 as u8).collect();
            if let Ok(repaired) = String::from_utf8(bytes) {
                return repaired;
            }
        }

        raw.to_string()
    }
}

/// Keep names exactly as received.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl FilenameDecoder for Passthrough {
    fn decode(&self, raw: &str) -> String {
        raw.to_string()
    }
}

/// Strip any client-side directory components.
pub fn display_name(decoded: &str) -> String {
    let base = decoded
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(decoded)
        .trim();

    if base.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        base.to_string()
    }
}

/// Turn a display name into the name component of a storage key.
///
/// The result has no separators, control characters or `..` sequences and fits in a
/// filesystem name once prefixed with a millisecond timestamp.
pub fn sanitize_for_storage(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_control() || c == '/' || c == '\\' {
            '_'
        } else {
            c
        };
        if sanitized.len() + c.len_utf8() > MAX_STORED_NAME_BYTES {
            break;
        }
        sanitized.push(c);
    }

    let sanitized = sanitized.replace("..", "._");

    if sanitized.trim().is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        sanitized
    }
}
