use std::collections::HashMap;

use super::ChromosomeNaming;
use crate::windows::Window;

/// Windows of one annotation chromosome sorted by start.
///
/// `max_ends[i]` is the largest end among entries `0..=i`, so a backwards scan
/// from the last candidate can stop as soon as it drops below the query start.
#[derive(Debug, Clone, Default)]
struct ChromIndex {
    starts: Vec<u64>,
    ends: Vec<u64>,
    max_ends: Vec<u64>,
    ranks: Vec<usize>,
}

impl ChromIndex {
    fn from_entries(mut entries: Vec<(u64, u64, usize)>) -> Self {
        entries.sort_by_key(|&(start, _, rank)| (start, rank));

        let mut index = Self::default();
        let mut running_max = 0;
        for (start, end, rank) in entries {
            running_max = running_max.max(end);
            index.starts.push(start);
            index.ends.push(end);
            index.max_ends.push(running_max);
            index.ranks.push(rank);
        }
        index
    }

    /// Ranks of every window overlapping `[start, end]`, unordered.
    fn overlapping(&self, start: u64, end: u64) -> impl Iterator<Item = usize> + '_ {
        let candidates = self.starts.partition_point(|&window_start| window_start <= end);
        (0..candidates)
            .rev()
            .take_while(move |&i| self.max_ends[i] >= start)
            .filter(move |&i| self.ends[i] >= start)
            .map(move |i| self.ranks[i])
    }
}

/// Per-chromosome interval index over significant windows.
///
/// Windows are keyed by their annotation-side chromosome name and identified
/// by rank, their position in the slice the index was built from.
#[derive(Debug, Clone, Default)]
pub struct WindowIndex {
    chroms: HashMap<String, ChromIndex>,
    len: usize,
}

impl WindowIndex {
    /// Index `windows`, translating chromosome ids with `naming`.
    pub fn build(windows: &[&Window], naming: &ChromosomeNaming) -> Self {
        let mut entries: HashMap<String, Vec<(u64, u64, usize)>> = HashMap::new();
        for (rank, window) in windows.iter().enumerate() {
            entries
                .entry(naming.annotation_name(&window.chrom))
                .or_default()
                .push((window.bin_start, window.bin_end, rank));
        }

        let chroms = entries
            .into_iter()
            .map(|(chrom, entries)| (chrom, ChromIndex::from_entries(entries)))
            .collect();
        Self {
            chroms,
            len: windows.len(),
        }
    }

    /// Number of indexed windows.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no window was indexed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Annotation-side chromosome names present in the index.
    pub fn chromosomes(&self) -> impl Iterator<Item = &str> {
        self.chroms.keys().map(String::as_str)
    }

    /// Rank of the earliest window on `chrom` overlapping `[start, end]`.
    pub fn first_overlap(&self, chrom: &str, start: u64, end: u64) -> Option<usize> {
        self.chroms.get(chrom)?.overlapping(start, end).min()
    }

    /// Ranks of all windows on `chrom` overlapping `[start, end]`, ascending.
    pub fn all_overlaps(&self, chrom: &str, start: u64, end: u64) -> Vec<usize> {
        let mut ranks: Vec<usize> = self
            .chroms
            .get(chrom)
            .map(|index| index.overlapping(start, end).collect())
            .unwrap_or_default();
        ranks.sort_unstable();
        ranks
    }
}
