//! Field-name pattern expansion.

use ahash::AHashSet;

/// Matches `name` against `pattern`, where `*` stands for any run of
/// characters (including none). A pattern without `*` must equal `name`.
pub fn simple_match(pattern: &str, name: &str) -> bool {
    let Some(first) = pattern.find('*') else {
        return pattern == name;
    };
    let (prefix, rest) = pattern.split_at(first);
    let Some(mut remaining) = name.strip_prefix(prefix) else {
        return false;
    };

    let mut pieces = rest.split('*').filter(|piece| !piece.is_empty()).peekable();
    let ends_with_star = rest.ends_with('*');
    while let Some(piece) = pieces.next() {
        let is_last = pieces.peek().is_none();
        if is_last && !ends_with_star {
            return remaining.ends_with(piece);
        }
        match remaining.find(piece) {
            Some(pos) => remaining = &remaining[pos + piece.len()..],
            None => return false,
        }
    }
    true
}

/// Expands `patterns` against the available `names`, keeping the first-seen
/// order and dropping duplicates.
pub fn expand<'a, I>(patterns: &[String], names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    let mut seen = AHashSet::new();
    let mut expanded = Vec::new();
    for pattern in patterns {
        for name in names.clone() {
            if simple_match(pattern, name) && seen.insert(name) {
                expanded.push(name.to_string());
            }
        }
    }
    expanded
}
