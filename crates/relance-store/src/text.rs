//! Best-effort text recovery from `attributedBody` blobs.
//!
//! When the plain `text` column is empty the body usually lives in an
//! archived `NSAttributedString`.  Rather than parse the proprietary
//! typedstream format, this module decodes the blob permissively and
//! fishes the longest human-looking run out of it.  The result is lossy
//! and approximate by construction: `None` means "no text available",
//! which downstream treats as media or a reaction.

use std::sync::OnceLock;

use regex::Regex;

/// Tokens that mark a run as serialization scaffolding rather than
/// message text.  Compared against the lowercased run, so entries must
/// be lowercase.
pub const INTERNAL_TOKENS: &[&str] = &[
    "nsstring",
    "nsmutablestring",
    "nsattributed",
    "nsobject",
    "streamtyped",
    "nsvalue",
    "nsdata",
    "nsnumber",
    "nsdictionary",
    "__kim",
    "__cf",
    "nscolor",
    "nsfont",
    "uicolor",
    "attributename",
    "filetransferguid",
    "messagepartattribute",
    "bplist",
    "typedstream",
];

/// Runs at or past this many characters are embedded payload, not text.
const MAX_RUN_CHARS: usize = 500;

fn build_printable_runs_regex() -> Regex {
    // ASCII printables plus everything from NBSP through the BMP, two
    // characters or longer.  Astral characters split runs.
    Regex::new(r"[\x20-\x7E\u{00A0}-\u{FFFF}]{2,}").unwrap()
}

fn build_guid_regex() -> Regex {
    Regex::new(r"^[A-F0-9\-]{8,}$").unwrap()
}

fn build_numeric_regex() -> Regex {
    Regex::new(r"^[\d\.\-\+]+$").unwrap()
}

fn printable_runs_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(build_printable_runs_regex)
}

fn guid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(build_guid_regex)
}

fn numeric_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(build_numeric_regex)
}

/// Resolve the display text for a message row.
///
/// The plain `text` column wins when it is non-empty; otherwise the blob
/// is salvaged.  `None` means no recoverable text.
pub fn resolve_text(text: Option<String>, attributed_body: Option<&[u8]>) -> Option<String> {
    match text {
        Some(t) if !t.is_empty() => Some(t),
        _ => attributed_body.and_then(salvage_attributed_body),
    }
}

/// Recover the most plausible message text from an archived rich-text
/// blob, using the default deny list.
pub fn salvage_attributed_body(data: &[u8]) -> Option<String> {
    salvage_with_deny_list(data, INTERNAL_TOKENS)
}

/// Recover text with a caller-supplied deny list.
///
/// The blob is decoded with invalid bytes replaced, split into printable
/// runs, and filtered: runs containing a deny token, runs starting with
/// `$` (archive field markers), pure GUIDs, pure numeric/punctuation
/// strings, and runs of [`MAX_RUN_CHARS`] or more are discarded.  The
/// longest survivor wins; the earliest one on a tie.
pub fn salvage_with_deny_list(data: &[u8], deny_tokens: &[&str]) -> Option<String> {
    if data.is_empty() {
        return None;
    }

    let decoded = String::from_utf8_lossy(data);

    let mut best: Option<(usize, &str)> = None;
    for run in printable_runs_regex().find_iter(&decoded) {
        let run = run.as_str();
        if !looks_like_message_text(run, deny_tokens) {
            continue;
        }
        let chars = run.chars().count();
        if chars >= MAX_RUN_CHARS {
            continue;
        }
        // Strictly greater, so the earliest of equally long runs wins.
        match best {
            Some((best_chars, _)) if chars <= best_chars => {}
            _ => best = Some((chars, run)),
        }
    }

    best.map(|(_, run)| run.to_string())
}

fn looks_like_message_text(run: &str, deny_tokens: &[&str]) -> bool {
    if run.starts_with('$') {
        return false;
    }
    let lowered = run.to_lowercase();
    if deny_tokens.iter().any(|token| lowered.contains(token)) {
        return false;
    }
    !guid_regex().is_match(run) && !numeric_regex().is_match(run)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_blob_yields_nothing() {
        assert_eq!(salvage_attributed_body(b""), None);
    }

    #[test]
    fn test_salvages_message_out_of_archive_noise() {
        let mut blob = Vec::new();
        blob.extend_from_slice(b"\x04\x0bstreamtyped\x81\xe8\x03\x84\x01@\x84\x84\x84\x12");
        blob.extend_from_slice(b"NSAttributedString\x00\x84\x84\x08NSObject\x00\x85\x92\x84\x84\x84\x08");
        blob.extend_from_slice(b"NSString\x01\x94\x84\x01\x02");
        blob.extend_from_slice(b"Hey are we still on for tomorrow?");
        blob.extend_from_slice(b"\x00\x86\x84\x02iI\x01\x92\x84");

        assert_eq!(
            salvage_attributed_body(&blob).as_deref(),
            Some("Hey are we still on for tomorrow?")
        );
    }

    #[test]
    fn test_framework_tokens_are_denied_case_insensitively() {
        let blob = b"\x00NSDictionary\x00nscolor junk\x00ok then\x00";
        assert_eq!(salvage_attributed_body(blob).as_deref(), Some("ok then"));
    }

    #[test]
    fn test_guid_and_numeric_runs_are_denied() {
        let blob = b"\x00A1B2C3D4-E5F6-A7B8\x00+1.2345678\x00see you\x00";
        assert_eq!(salvage_attributed_body(blob).as_deref(), Some("see you"));
    }

    #[test]
    fn test_dollar_prefixed_runs_are_denied() {
        let blob = b"\x00$null\x00$class\x00yo";
        assert_eq!(salvage_attributed_body(blob).as_deref(), Some("yo"));
    }

    #[test]
    fn test_lowercase_guid_is_not_a_guid() {
        // The GUID filter is deliberately uppercase-only; lowercase hex
        // this short reads like a word.
        let blob = b"\x00deadbeef\x00";
        assert_eq!(salvage_attributed_body(blob).as_deref(), Some("deadbeef"));
    }

    #[test]
    fn test_oversized_runs_are_payload() {
        let mut blob = vec![0u8];
        blob.extend(std::iter::repeat(b'a').take(700));
        blob.push(0);
        blob.extend_from_slice(b"short msg");
        assert_eq!(salvage_attributed_body(&blob).as_deref(), Some("short msg"));

        let mut only_payload = vec![0u8];
        only_payload.extend(std::iter::repeat(b'a').take(700));
        assert_eq!(salvage_attributed_body(&only_payload), None);
    }

    #[test]
    fn test_size_cutoff_counts_characters_not_bytes() {
        // 499 two-byte characters stay under the cutoff.
        let kept: String = std::iter::repeat('я').take(499).collect();
        let dropped: String = std::iter::repeat('я').take(500).collect();

        let mut blob = vec![0u8];
        blob.extend_from_slice(kept.as_bytes());
        assert_eq!(salvage_attributed_body(&blob), Some(kept));

        let mut blob = vec![0u8];
        blob.extend_from_slice(dropped.as_bytes());
        assert_eq!(salvage_attributed_body(&blob), None);
    }

    #[test]
    fn test_first_of_equally_long_runs_wins() {
        let blob = b"\x00hello\x00world\x00";
        assert_eq!(salvage_attributed_body(blob).as_deref(), Some("hello"));
    }

    #[test]
    fn test_invalid_bytes_are_replaced_not_fatal() {
        let mut blob = b"\x00great idea ".to_vec();
        blob.push(0xFF);
        blob.extend_from_slice(b" thanks\x00");

        assert_eq!(
            salvage_attributed_body(&blob).as_deref(),
            Some("great idea \u{FFFD} thanks")
        );
    }

    #[test]
    fn test_custom_deny_list() {
        let blob = b"\x00hello there\x00general";
        assert_eq!(
            salvage_with_deny_list(blob, &["hello"]).as_deref(),
            Some("general")
        );
    }

    #[test]
    fn test_resolve_text_prefers_plain_column() {
        let blob = b"\x00salvaged text here\x00".to_vec();
        assert_eq!(
            resolve_text(Some("plain".to_string()), Some(&blob)).as_deref(),
            Some("plain")
        );
        assert_eq!(
            resolve_text(Some(String::new()), Some(&blob)).as_deref(),
            Some("salvaged text here")
        );
        assert_eq!(
            resolve_text(None, Some(&blob)).as_deref(),
            Some("salvaged text here")
        );
        assert_eq!(resolve_text(None, None), None);
        assert_eq!(resolve_text(Some(String::new()), None), None);
    }
}
