//! Occurrence bookkeeping for the repetition detector.
//!
//! An [`OccurrenceMap`] folds sentences or phrases under a canonical
//! [`OccurrenceKey`] and remembers on which lines each one was seen.

use std::collections::{BTreeSet, HashMap};

use super::reports::Repetition;

/// Case- and whitespace-insensitive identity of a sentence or phrase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OccurrenceKey(String);

impl OccurrenceKey {
    /// Canonicalize `text`: collapse whitespace runs to one space, lowercase.
    pub fn new(text: &str) -> Self {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        Self(collapsed.to_lowercase())
    }

    /// Borrow the canonical form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Display text of the first occurrence plus every distinct line it hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceRecord {
    text: String,
    lines: BTreeSet<usize>,
}

impl OccurrenceRecord {
    fn new(text: &str) -> Self {
        Self {
            text: text.trim().to_string(),
            lines: BTreeSet::new(),
        }
    }

    /// Display text, as first seen (trimmed).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Distinct line numbers, ascending.
    pub fn lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines.iter().copied()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Whether the record spans more than one line.
    pub fn is_repeated(&self) -> bool {
        self.lines.len() > 1
    }
}

impl From<OccurrenceRecord> for Repetition {
    fn from(record: OccurrenceRecord) -> Self {
        Self {
            count: record.lines.len(),
            lines: record.lines.into_iter().collect(),
            text: record.text,
        }
    }
}

/// Accumulates occurrences keyed by [`OccurrenceKey`].
#[derive(Debug, Default)]
pub struct OccurrenceMap {
    records: HashMap<OccurrenceKey, OccurrenceRecord>,
}

impl OccurrenceMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `text` occurred on `line`.
    ///
    /// The first occurrence of a key fixes its display text; later ones only
    /// add their line number.
    pub fn record(&mut self, text: &str, line: usize) {
        self.records
            .entry(OccurrenceKey::new(text))
            .or_insert_with(|| OccurrenceRecord::new(text))
            .lines
            .insert(line);
    }

    /// Look up the record for a key.
    pub fn get(&self, key: &OccurrenceKey) -> Option<&OccurrenceRecord> {
        self.records.get(key)
    }

    /// Number of distinct keys seen.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keep only keys seen on more than one line, as sorted repetitions.
    ///
    /// Ordered by line count descending, then display text ascending
    /// ignoring case, then exact display text.
    pub fn into_repetitions(self) -> Vec<Repetition> {
        let mut repeated: Vec<(String, Repetition)> = self
            .records
            .into_values()
            .filter(OccurrenceRecord::is_repeated)
            .map(|record| (record.text.to_lowercase(), Repetition::from(record)))
            .collect();

        repeated.sort_by(|(a_folded, a), (b_folded, b)| {
            b.count
                .cmp(&a.count)
                .then_with(|| a_folded.cmp(b_folded))
                .then_with(|| a.text.cmp(&b.text))
        });

        repeated.into_iter().map(|(_, rep)| rep).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_ignores_case_and_spacing() {
        assert_eq!(
            OccurrenceKey::new("  Hello \t  World "),
            OccurrenceKey::new("hello world")
        );
        assert_eq!(OccurrenceKey::new("Hello   World").as_str(), "hello world");
    }

    #[test]
    fn first_text_wins() {
        let mut map = OccurrenceMap::new();
        map.record("The Quick Fox", 4);
        map.record("the quick fox", 2);
        let record = map.get(&OccurrenceKey::new("THE QUICK FOX")).unwrap();
        assert_eq!(record.text(), "The Quick Fox");
        assert_eq!(record.lines().collect::<Vec<_>>(), vec![2, 4]);
    }

    #[test]
    fn same_line_counts_once() {
        let mut map = OccurrenceMap::new();
        map.record("again and again", 3);
        map.record("again and again", 3);
        let record = map.get(&OccurrenceKey::new("again and again")).unwrap();
        assert_eq!(record.line_count(), 1);
        assert!(!record.is_repeated());
        assert!(map.into_repetitions().is_empty());
    }

    #[test]
    fn repetitions_sorted_by_count_then_text() {
        let mut map = OccurrenceMap::new();
        for line in [1, 2] {
            map.record("banana split", line);
            map.record("Apple pie", line);
        }
        for line in [1, 2, 3] {
            map.record("cherry tart", line);
        }
        map.record("lonely", 9);

        let reps = map.into_repetitions();
        let texts: Vec<_> = reps.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["cherry tart", "Apple pie", "banana split"]);
        assert_eq!(reps[0].count, 3);
        assert_eq!(reps[0].lines, vec![1, 2, 3]);
    }

    #[test]
    fn map_len_tracks_distinct_keys() {
        let mut map = OccurrenceMap::new();
        assert!(map.is_empty());
        map.record("one two", 1);
        map.record("ONE  two", 2);
        map.record("three", 2);
        assert_eq!(map.len(), 2);
    }
}
