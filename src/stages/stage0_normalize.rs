use std::borrow::Cow;

use tracing::warn;

use crate::models::TagMap;

/// Annotator disambiguation markers, checked in this order (later matches win)
pub const DISAMBIGUATION_MARKERS: [char; 6] = ['(', '^', '@', '*', ',', ';'];

/// Upper bound on qualifier-chain retries for a single raw tag
const MAX_QUALIFIER_DEPTH: usize = 8;

/// Outcome of one pass over a raw tag
enum Pass<'a> {
    Resolved(Option<&'a str>),
    /// Normalize this qualifier instead and return its result unchanged
    Retry(String),
}

/// Map a raw corpus tag to its canonical dialogue act.
///
/// `previous` is the canonical tag of the preceding utterance; continuation
/// (`+`) and elaboration (`^e`) markers inherit it. Rules apply in order and a
/// later rule overwrites an earlier result:
/// 1. exact key in the tag map
/// 2. continuation/elaboration inherits `previous`
/// 3. prefix before each disambiguation marker
/// 4. chained `^` qualifiers collapse to the first qualifier
/// 5. first two characters as a coarse tag family
///
/// Returns `None` (and logs a warning) when nothing matches.
pub fn normalize_tag(raw_tag: &str, tag_map: &TagMap, previous: Option<&str>) -> Option<String> {
    let mut current = Cow::Borrowed(raw_tag);
    for _ in 0..MAX_QUALIFIER_DEPTH {
        match normalize_pass(&current, tag_map, previous) {
            Pass::Resolved(Some(tag)) => return Some(tag.to_string()),
            Pass::Resolved(None) => {
                warn!(raw_tag, "Unrecognized dialogue act tag");
                return None;
            }
            Pass::Retry(qualifier) => current = Cow::Owned(qualifier),
        }
    }
    warn!(raw_tag, "Qualifier chain did not resolve");
    None
}

fn normalize_pass<'a>(raw: &str, tag_map: &'a TagMap, previous: Option<&'a str>) -> Pass<'a> {
    let mut result = None;

    if let Some(tag) = tag_map.get(raw) {
        result = Some(tag);
    } else if raw.contains('+') || raw.contains("^e") {
        result = previous;
    }

    for marker in DISAMBIGUATION_MARKERS {
        let prefix = raw.split_once(marker).map_or(raw, |(prefix, _)| prefix);
        if let Some(tag) = tag_map.get(prefix) {
            result = Some(tag);
        }
    }

    if raw.contains('^') {
        let qualifiers: Vec<&str> = raw.split('^').collect();
        if qualifiers.len() > 2 {
            let qualifier = format!("^{}", qualifiers[1]);
            match tag_map.get(&qualifier) {
                Some(tag) => result = Some(tag),
                None => return Pass::Retry(qualifier),
            }
        }
    }

    if result.is_none() {
        let family: String = raw.chars().take(2).collect();
        result = tag_map.get(&family);
    }

    Pass::Resolved(result)
}
