//! Size cohorts and the graduated concurrency ladder
//!
//! The inventory is split into disjoint size buckets, each processed with
//! its own concurrency budget. The mover's per-transfer thread count scales
//! with file size (one thread per 32 MiB), so the ladder trades process
//! parallelism against per-transfer thread count as size grows: many small
//! transfers run side by side, the largest run one at a time with the full
//! thread budget.

use crate::inventory::WorkItem;

/// Bytes handled per transfer thread by the mover
pub const BYTES_PER_THREAD: u64 = 32 * 1024 * 1024;

/// Half-open byte range `[lower, upper)`; `upper == None` is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRange {
    /// Inclusive lower bound in bytes
    pub lower: u64,

    /// Exclusive upper bound in bytes, or None for the final cohort
    pub upper: Option<u64>,
}

impl SizeRange {
    /// Check whether a size falls inside this range
    pub fn contains(&self, size: u64) -> bool {
        size >= self.lower && self.upper.map_or(true, |u| size < u)
    }
}

/// Concurrency budget for one cohort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyBudget {
    /// Maximum concurrent transfer processes (before the run multiplier)
    pub max_processes: u32,

    /// Minimum-thread hint passed to the mover
    pub min_threads: u32,

    /// Upper thread bound for the tier, None for the final cohort
    pub max_threads: Option<u32>,
}

/// One rung of the ladder: a budget plus the byte range it owns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CohortSpec {
    /// 1-based cohort number, for display
    pub index: usize,

    /// Byte range this cohort covers
    pub range: SizeRange,

    /// Concurrency budget for this cohort
    pub budget: ConcurrencyBudget,
}

/// The fixed tier table: (max processes, min threads, max threads)
///
/// Cohort 1 is the zero-byte tier: max_threads of 0 yields the degenerate
/// byte bound that `cohort_bound` shifts to 1, so it covers exactly the
/// empty files.
const TIERS: [(u32, u32, Option<u32>); 8] = [
    (16, 0, Some(0)),
    (16, 0, Some(1)),
    (8, 1, Some(2)),
    (6, 2, Some(3)),
    (4, 3, Some(5)),
    (3, 5, Some(7)),
    (2, 7, Some(15)),
    (1, 15, None),
];

/// Byte bound for a thread-count boundary
///
/// A bound of 0 bytes would make a degenerate empty range, and a size of
/// exactly 0 is itself a valid cohort boundary, so a computed 0 is shifted
/// to 1: cohort 1 owns `[0, 1)` and its neighbor starts at 1.
pub fn cohort_bound(threads: u32) -> u64 {
    let bytes = threads as u64 * BYTES_PER_THREAD;
    if bytes == 0 {
        1
    } else {
        bytes
    }
}

/// Build the full 8-cohort ladder
///
/// Ranges are derived pairwise from the thread tiers, so the cohorts are
/// contiguous and partition `[0, ∞)` by construction.
pub fn ladder() -> Vec<CohortSpec> {
    let mut specs = Vec::with_capacity(TIERS.len());
    let mut lower = 0u64;

    for (i, &(max_processes, min_threads, max_threads)) in TIERS.iter().enumerate() {
        let upper = max_threads.map(cohort_bound);
        specs.push(CohortSpec {
            index: i + 1,
            range: SizeRange { lower, upper },
            budget: ConcurrencyBudget {
                max_processes,
                min_threads,
                max_threads,
            },
        });
        if let Some(u) = upper {
            lower = u;
        }
    }

    specs
}

/// Select the ordered subsequence of items whose size falls in `range`
///
/// Read-only over the input; relative order is preserved.
pub fn partition(items: &[WorkItem], range: &SizeRange) -> Vec<WorkItem> {
    items
        .iter()
        .filter(|item| range.contains(item.size))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    fn item(size: u64, path: &str) -> WorkItem {
        WorkItem::new(size, path)
    }

    #[test]
    fn test_ladder_shape() {
        let specs = ladder();
        assert_eq!(specs.len(), 8);

        // Zero-byte cohort
        assert_eq!(specs[0].range, SizeRange { lower: 0, upper: Some(1) });
        assert_eq!(specs[0].budget.max_processes, 16);

        // Small-file cohort picks up at 1 byte, not 0
        assert_eq!(specs[1].range.lower, 1);
        assert_eq!(specs[1].range.upper, Some(32 * MIB));

        // Final cohort is unbounded, single process
        let last = specs.last().unwrap();
        assert_eq!(last.range.lower, 480 * MIB);
        assert_eq!(last.range.upper, None);
        assert_eq!(last.budget.max_processes, 1);
        assert_eq!(last.budget.min_threads, 15);
    }

    #[test]
    fn test_ladder_contiguous() {
        let specs = ladder();
        for pair in specs.windows(2) {
            assert_eq!(pair[0].range.upper, Some(pair[1].range.lower));
        }
    }

    #[test]
    fn test_cohort_bound_zero_shifts_to_one() {
        assert_eq!(cohort_bound(0), 1);
        assert_eq!(cohort_bound(1), 32 * MIB);
        assert_eq!(cohort_bound(15), 480 * MIB);
    }

    #[test]
    fn test_partition_disjoint_union() {
        // Sizes straddling every boundary in the ladder, plus the bounds
        // themselves and their neighbors
        let mut sizes = vec![0, 1, 2, 500, MIB];
        for t in [1u64, 2, 3, 5, 7, 15] {
            let b = t * 32 * MIB;
            sizes.extend([b - 1, b, b + 1]);
        }
        sizes.push(10 * 1024 * MIB);

        let items: Vec<WorkItem> = sizes
            .iter()
            .enumerate()
            .map(|(i, &s)| item(s, &format!("/zone/obj{}", i)))
            .collect();

        let specs = ladder();
        let mut seen = 0usize;
        for spec in &specs {
            let cohort = partition(&items, &spec.range);
            // Disjointness: every selected item is in no other cohort
            for other in specs.iter().filter(|o| o.index != spec.index) {
                for it in &cohort {
                    assert!(
                        !other.range.contains(it.size),
                        "size {} in cohorts {} and {}",
                        it.size,
                        spec.index,
                        other.index
                    );
                }
            }
            seen += cohort.len();
        }
        // Union covers everything
        assert_eq!(seen, items.len());
    }

    #[test]
    fn test_partition_preserves_order() {
        let items = vec![
            item(10, "/zone/c"),
            item(20, "/zone/a"),
            item(5 * MIB, "/zone/b"),
        ];
        let range = SizeRange { lower: 1, upper: Some(32 * MIB) };
        let cohort = partition(&items, &range);
        let paths: Vec<_> = cohort.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, ["/zone/c", "/zone/a", "/zone/b"]);
    }

    #[test]
    fn test_scenario_a_placement() {
        let items = vec![
            item(0, "a"),
            item(0, "b"),
            item(5_000_000, "c"),
            item(40_000_000, "d"),
        ];
        let specs = ladder();

        let c1 = partition(&items, &specs[0].range);
        assert_eq!(c1.len(), 2);
        assert_eq!(c1[0].path, "a");
        assert_eq!(c1[1].path, "b");

        // 5 MB is under one thread's worth
        let c2 = partition(&items, &specs[1].range);
        assert_eq!(c2.len(), 1);
        assert_eq!(c2[0].path, "c");

        // 40 MB needs a second thread
        let c3 = partition(&items, &specs[2].range);
        assert_eq!(c3.len(), 1);
        assert_eq!(c3[0].path, "d");

        let total: usize = specs
            .iter()
            .map(|s| partition(&items, &s.range).len())
            .sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_zero_size_only_in_first_cohort() {
        let items = vec![item(0, "/zone/empty")];
        let specs = ladder();
        for spec in &specs[1..] {
            assert!(partition(&items, &spec.range).is_empty());
        }
        assert_eq!(partition(&items, &specs[0].range).len(), 1);
    }
}
