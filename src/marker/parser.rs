// Marker parser - Turns authored marker names into display labels
// Grammar: `#<order> -> <title> (<feature>)`, the feature suffix is optional

use serde::{Deserialize, Serialize};

/// Name of the marker that starts the silence loop
pub const PANIC_ENTRY_NAME: &str = "#SILENCE#";

/// Name of the marker that closes the silence loop
pub const PANIC_EXIT_NAME: &str = "#/SILENCE#";

/// Order shown for both panic markers
pub const PANIC_ORDER: &str = "!!!";

/// Title shown for both panic markers
pub const PANIC_TITLE: &str = "PANIC SILENCE";

/// The two reserved markers of the silence loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanicMarker {
    /// Start of the loop, target of the panic command
    Entry,
    /// End of the loop
    Exit,
}

impl PanicMarker {
    /// Exact-name match, no trimming or case folding
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            PANIC_ENTRY_NAME => Some(PanicMarker::Entry),
            PANIC_EXIT_NAME => Some(PanicMarker::Exit),
            _ => None,
        }
    }

    /// Marker name as authored in the sequencer
    pub fn name(&self) -> &'static str {
        match self {
            PanicMarker::Entry => PANIC_ENTRY_NAME,
            PanicMarker::Exit => PANIC_EXIT_NAME,
        }
    }
}

/// Check if a marker name is one of the panic markers
pub fn is_panic_marker(name: &str) -> bool {
    PanicMarker::from_name(name).is_some()
}

/// Structured segment descriptor parsed from a marker name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerLabel {
    pub order: String,
    pub title: String,
    pub feature: String,
}

impl MarkerLabel {
    /// Fixed descriptor used for both panic markers
    pub fn panic() -> Self {
        Self {
            order: PANIC_ORDER.to_string(),
            title: PANIC_TITLE.to_string(),
            feature: String::new(),
        }
    }

    /// Parse a raw marker name
    ///
    /// Never fails: a name that does not follow the grammar becomes the title,
    /// with empty order and feature. Panic markers take priority over the grammar.
    pub fn parse(name: &str) -> Self {
        if is_panic_marker(name) {
            return Self::panic();
        }

        match_grammar(name).unwrap_or_else(|| Self {
            order: String::new(),
            title: name.to_string(),
            feature: String::new(),
        })
    }
}

/// Find the first `#<digits> ->` header and split what follows into title and feature
fn match_grammar(name: &str) -> Option<MarkerLabel> {
    for (hash, _) in name.match_indices('#') {
        let after_hash = &name[hash + 1..];
        let digits = after_hash.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            continue;
        }

        let Some(rest) = after_hash[digits..].trim_start().strip_prefix("->") else {
            continue;
        };

        let Some((title, feature)) = split_feature(rest.trim_start()) else {
            continue;
        };
        return Some(MarkerLabel {
            order: after_hash[..digits].to_string(),
            title: title.trim().to_string(),
            feature: feature.map(str::trim).unwrap_or_default().to_string(),
        });
    }

    None
}

/// Split `title (feature)` on the first opening parenthesis that gives a valid split.
/// The feature only exists when the text ends with the closing parenthesis.
/// Title and feature are single-line; whitespace around them may span lines.
fn split_feature(rest: &str) -> Option<(&str, Option<&str>)> {
    if let Some(body) = rest.strip_suffix(')') {
        for (open, _) in body.match_indices('(') {
            let title = body[..open].trim_end();
            let feature = &body[open + 1..];
            if is_single_line(title) && is_single_line(feature) {
                return Some((title, Some(feature)));
            }
        }
    }

    is_single_line(rest).then_some((rest, None))
}

fn is_single_line(text: &str) -> bool {
    !text.contains(['\n', '\r', '\u{2028}', '\u{2029}'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(order: &str, title: &str, feature: &str) -> MarkerLabel {
        MarkerLabel {
            order: order.into(),
            title: title.into(),
            feature: feature.into(),
        }
    }

    #[test]
    fn test_full_grammar() {
        assert_eq!(
            MarkerLabel::parse("#3 -> Intro (feat. X)"),
            label("3", "Intro", "feat. X")
        );
    }

    #[test]
    fn test_grammar_without_feature() {
        assert_eq!(MarkerLabel::parse("#12 -> Outro"), label("12", "Outro", ""));
        assert_eq!(MarkerLabel::parse("#7->Tight"), label("7", "Tight", ""));
    }

    #[test]
    fn test_unmatched_name_becomes_title() {
        assert_eq!(MarkerLabel::parse("Untitled"), label("", "Untitled", ""));
        assert_eq!(MarkerLabel::parse("# -> No order"), label("", "# -> No order", ""));
        assert_eq!(MarkerLabel::parse(""), label("", "", ""));
    }

    #[test]
    fn test_feature_whitespace_is_trimmed() {
        assert_eq!(
            MarkerLabel::parse("#1 ->   Song   (  guest  )"),
            label("1", "Song", "guest")
        );
    }

    #[test]
    fn test_feature_requires_trailing_parenthesis() {
        // Parenthesis in the middle of the title stays in the title
        assert_eq!(
            MarkerLabel::parse("#2 -> Song (live) reprise"),
            label("2", "Song (live) reprise", "")
        );
    }

    #[test]
    fn test_feature_starts_at_first_parenthesis() {
        assert_eq!(
            MarkerLabel::parse("#4 -> A (b) (c)"),
            label("4", "A", "b) (c")
        );
    }

    #[test]
    fn test_header_may_follow_a_prefix() {
        assert_eq!(
            MarkerLabel::parse("Set B #5 -> Encore"),
            label("5", "Encore", "")
        );
    }

    #[test]
    fn test_line_breaks_inside_title_or_feature() {
        assert_eq!(
            MarkerLabel::parse("#1 -> Title\nmore"),
            label("", "#1 -> Title\nmore", "")
        );
        assert_eq!(
            MarkerLabel::parse("#1 -> Song (a\nb)"),
            label("", "#1 -> Song (a\nb)", "")
        );
        // A later header on its own line still matches
        assert_eq!(
            MarkerLabel::parse("#1 -> Old\r\n#2 -> New"),
            label("2", "New", "")
        );
    }

    #[test]
    fn test_line_breaks_in_surrounding_whitespace() {
        assert_eq!(MarkerLabel::parse("#1\n->\nTitle"), label("1", "Title", ""));
        assert_eq!(
            MarkerLabel::parse("#1 -> Title\n(feat)"),
            label("1", "Title", "feat")
        );
    }

    #[test]
    fn test_panic_markers_override_grammar() {
        assert_eq!(MarkerLabel::parse(PANIC_ENTRY_NAME), MarkerLabel::panic());
        assert_eq!(MarkerLabel::parse(PANIC_EXIT_NAME), MarkerLabel::panic());
        assert_eq!(MarkerLabel::panic(), label("!!!", "PANIC SILENCE", ""));
    }

    #[test]
    fn test_panic_marker_lookup_is_exact() {
        assert_eq!(PanicMarker::from_name("#SILENCE#"), Some(PanicMarker::Entry));
        assert_eq!(PanicMarker::from_name("#/SILENCE#"), Some(PanicMarker::Exit));
        assert_eq!(PanicMarker::from_name(" #SILENCE#"), None);
        assert_eq!(PanicMarker::from_name("#silence#"), None);
        assert_eq!(PanicMarker::Entry.name(), PANIC_ENTRY_NAME);
    }
}
