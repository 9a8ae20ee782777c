//! Tag name normalization applied before tags are stored or looked up.
//!
//! Policy:
//! - Drop control characters.
//! - Drop common zero-width characters (ZWS/ZWNJ/ZWJ/WJ/BOM).
//! - Collapse whitespace runs to a single space and trim both ends.
//!
//! Case is preserved: `RHTT` and `rhtt` are different tags.

/// Normalize a raw tag name as typed or imported.
pub fn tag_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if ch.is_control() {
            continue;
        }
        match ch {
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' => {}
            _ => {
                if pending_space {
                    out.push(' ');
                    pending_space = false;
                }
                out.push(ch);
            }
        }
    }
    out
}
