// gitplumb: async Git plumbing for per-file buffer state
//
// SPDX-FileCopyrightText: 2026 gitplumb contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Buffer encoding conversion (declared label → UTF-8).
//!
//! ```text
//! git stdout bytes --(decode per buffer 'fileencoding')--> UTF-8 lines
//! ```
//!
//! Uses `encoding_rs` label lookup. Invalid sequences → U+FFFD.

use encoding_rs::Encoding;
use std::borrow::Cow;

/// Returns whether a label names the canonical internal encoding, for which
/// no conversion is performed.
///
/// # Example
/// ```
/// use gitplumb::utility::encoding::is_utf8_label;
///
/// assert!(is_utf8_label("utf-8"));
/// assert!(is_utf8_label("UTF-8"));
/// assert!(!is_utf8_label("latin1"));
/// ```
#[must_use]
pub fn is_utf8_label(label: &str) -> bool {
    label.eq_ignore_ascii_case("utf-8") || label.eq_ignore_ascii_case("utf8")
}

/// Resolves an encoding label (WHATWG names and their aliases, e.g.
/// `latin1`, `shift_jis`, `euc-jp`) to an `encoding_rs` handle.
///
/// Returns `None` for unknown labels and for UTF-8 itself, since callers
/// treat both as "no conversion".
#[must_use]
pub fn encoding_for_label(label: &str) -> Option<&'static Encoding> {
    if is_utf8_label(label) {
        return None;
    }
    Encoding::for_label(label.as_bytes()).filter(|&enc| enc != encoding_rs::UTF_8)
}

/// Converts bytes from the given encoding to UTF-8.
///
/// # Example
/// ```
/// use gitplumb::utility::encoding::{bytes_to_utf8, encoding_for_label};
///
/// let enc = encoding_for_label("latin1").unwrap();
/// let latin1_bytes = b"caf\xe9";
/// assert_eq!(bytes_to_utf8(Some(enc), latin1_bytes), "café");
/// assert_eq!(bytes_to_utf8(None, "café".as_bytes()), "café");
/// ```
#[must_use]
pub fn bytes_to_utf8<'a>(encoding: Option<&'static Encoding>, bytes: &'a [u8]) -> Cow<'a, str> {
    match encoding {
        Some(enc) => {
            let (result, _had_errors) = enc.decode_without_bom_handling(bytes);
            result
        }
        None => String::from_utf8_lossy(bytes),
    }
}
