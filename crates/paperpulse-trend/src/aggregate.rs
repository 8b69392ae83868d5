//! Grouping and summing: phrase counts per (conference, year) and paper counts.

use std::collections::{BTreeMap, BTreeSet};

use paperpulse_core::{Conference, ConferenceYearCount, KeywordCount, PaperRecord};

use crate::blacklist::is_informative;
use crate::canonical::{CanonicalMap, Vocabulary};

/// (conference, year, phrase).
pub type GroupKey = (Conference, i64, String);

/// Raw phrase counts, keyed by (conference, year, raw phrase).
///
/// Each title contributes at most one occurrence of a phrase.
#[derive(Debug, Clone, Default)]
pub struct PhraseTally {
    counts: BTreeMap<GroupKey, i64>,
}

impl PhraseTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the distinct phrases of one title.
    pub fn add_title(&mut self, conference: &Conference, year: i64, phrases: &BTreeSet<String>) {
        for phrase in phrases {
            *self
                .counts
                .entry((conference.clone(), year, phrase.clone()))
                .or_insert(0) += 1;
        }
    }

    /// Distinct raw phrases across every group.
    pub fn vocabulary(&self) -> Vocabulary {
        self.counts
            .keys()
            .map(|(_, _, phrase)| phrase.as_str())
            .collect()
    }

    /// Total phrase occurrences.
    pub fn total(&self) -> i64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Map each raw phrase to its canonical form and sum per group, without
    /// filtering.
    pub fn canonical_totals(&self, map: &CanonicalMap) -> BTreeMap<GroupKey, i64> {
        let mut merged: BTreeMap<GroupKey, i64> = BTreeMap::new();
        for ((conference, year, raw), count) in &self.counts {
            let canonical = map.get(raw).to_string();
            *merged
                .entry((conference.clone(), *year, canonical))
                .or_insert(0) += count;
        }
        merged
    }

    /// Canonicalize, drop uninformative phrases per conference and sum.
    pub fn keyword_counts(&self, map: &CanonicalMap) -> Vec<KeywordCount> {
        let mut rows: Vec<KeywordCount> = self
            .canonical_totals(map)
            .into_iter()
            .filter(|((conference, _, phrase), _)| is_informative(phrase, conference))
            .map(|((conference, year, phrase), count)| KeywordCount {
                conference,
                year,
                phrase,
                count,
            })
            .collect();
        sort_keyword_counts(&mut rows);
        rows
    }
}

/// Conference asc, year asc, count desc, phrase asc.
pub fn sort_keyword_counts(rows: &mut [KeywordCount]) {
    rows.sort_by(|a, b| {
        a.conference
            .cmp(&b.conference)
            .then(a.year.cmp(&b.year))
            .then(b.count.cmp(&a.count))
            .then_with(|| a.phrase.cmp(&b.phrase))
    });
}

/// Observed papers per (conference, year), sorted by conference then year.
pub fn count_papers(papers: &[PaperRecord]) -> Vec<ConferenceYearCount> {
    let mut groups: BTreeMap<(Conference, i64), i64> = BTreeMap::new();
    for paper in papers {
        *groups
            .entry((paper.conference.clone(), paper.year))
            .or_insert(0) += 1;
    }
    groups
        .into_iter()
        .map(|((conference, year), count)| ConferenceYearCount {
            conference,
            year,
            count,
        })
        .collect()
}
