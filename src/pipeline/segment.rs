//! Splits a group policy's text into the contract header and the insured list.

use tracing::debug;

/// The two halves of a group policy document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PolicySegments {
    /// Everything before the first marker, trimmed
    pub policy_text: String,
    /// Everything from the first marker on, trimmed, minus leading marker lines
    pub insured_text: String,
}

impl PolicySegments {
    pub fn has_insured(&self) -> bool {
        !self.insured_text.is_empty()
    }
}

/// Splits `text` at the earliest case-insensitive occurrence of any marker.
///
/// When two markers start at the same offset the one listed first wins. With
/// no marker present the whole text is the policy and the insured list is empty.
pub fn split_policy_text<S: AsRef<str>>(text: &str, markers: &[S]) -> PolicySegments {
    let mut split_index = text.len();
    for marker in markers {
        let marker = marker.as_ref();
        if marker.is_empty() {
            continue;
        }
        if let Some(index) = find_ignore_case(text, marker) {
            if index < split_index {
                split_index = index;
            }
        }
    }

    let policy_text = text[..split_index].trim().to_string();
    let insured_text = text[split_index..].trim();

    // Drop heading lines that just repeat a marker
    let lowered_markers: Vec<String> = markers
        .iter()
        .map(|m| m.as_ref().to_lowercase())
        .filter(|m| !m.is_empty())
        .collect();
    let mut lines = insured_text.split('\n').peekable();
    while let Some(line) = lines.peek() {
        let lowered = line.to_lowercase();
        if lowered_markers.iter().any(|m| lowered.contains(m.as_str())) {
            lines.next();
        } else {
            break;
        }
    }
    let insured_text = lines.collect::<Vec<_>>().join("\n");

    debug!("Policy text (first 200 chars): {}", excerpt(&policy_text, 200));
    debug!("Insured text (first 200 chars): {}", excerpt(&insured_text, 200));

    PolicySegments { policy_text, insured_text }
}

/// Byte offset in `haystack` where `needle` starts, ignoring case
fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    haystack.char_indices().map(|(i, _)| i).find(|&start| {
        let mut candidate = haystack[start..].chars().flat_map(char::to_lowercase);
        needle.iter().all(|c| candidate.next() == Some(*c))
    })
}

pub(crate) fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
