//! Size-based split planning across resolved targets.

use manifold_core::types::{BlockLocation, FileSplit, ResolvedTarget};

/// Sizing knobs for the planner. The `Default` plans purely from the total
/// input size and the desired split count.
#[derive(Debug, Clone, Copy)]
pub struct PlannerConfig {
    /// Lower bound on the nominal split size.
    pub min_split_bytes: u64,
    /// Optional upper bound on the nominal split size.
    pub max_split_bytes: Option<u64>,
    /// A trailing remainder within this percentage of the nominal split
    /// size is merged into the preceding split instead of forming its own
    /// tiny split.
    pub slop_percent: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_split_bytes: 1,
            max_split_bytes: None,
            slop_percent: 10,
        }
    }
}

/// Partitions each target's byte range into consecutive splits of a nominal
/// size computed from the total input size and `desired`.
///
/// `desired` is a hint, not a guarantee: short targets produce fewer
/// splits, slop merging and block alignment shift boundaries. The output is
/// ordered by target, then by ascending start offset, and per target the
/// ranges exactly tile `[0, target.len)`. A split never spans two targets.
pub fn plan_splits(
    targets: &[ResolvedTarget],
    desired: u32,
    cfg: &PlannerConfig,
) -> Vec<FileSplit> {
    let total: u64 = targets.iter().fold(0, |acc, t| acc.saturating_add(t.len));
    let split_size = nominal_split_size(total, desired, cfg);
    let slop_bytes = split_size.saturating_mul(cfg.slop_percent) / 100;

    let mut splits = Vec::new();
    for target in targets {
        plan_target(target, split_size, slop_bytes, &mut splits);
    }
    splits
}

fn nominal_split_size(total: u64, desired: u32, cfg: &PlannerConfig) -> u64 {
    let goal = total / u64::from(desired.max(1));
    let mut size = goal.max(cfg.min_split_bytes);
    if let Some(max) = cfg.max_split_bytes {
        size = size.min(max);
    }
    size.max(1)
}

fn plan_target(
    target: &ResolvedTarget,
    split_size: u64,
    slop_bytes: u64,
    out: &mut Vec<FileSplit>,
) {
    let mut start = 0u64;
    while target.len - start > split_size.saturating_add(slop_bytes) {
        let nominal_end = start.saturating_add(split_size);
        let end = aligned_end(start, nominal_end, &target.blocks);
        out.push(split_for(target, start, end));
        start = end;
    }
    // The final split takes everything left, so a within-slop remainder is
    // merged rather than emitted on its own. A zero-length target still
    // gets its one (empty) split.
    out.push(split_for(target, start, target.len));
}

/// Snaps `nominal_end` down to the start of the block containing it, when
/// that still leaves a non-empty chunk.
fn aligned_end(start: u64, nominal_end: u64, blocks: &[BlockLocation]) -> u64 {
    for block in blocks {
        if block.contains(nominal_end) && block.offset > start {
            return block.offset;
        }
    }
    nominal_end
}

fn split_for(target: &ResolvedTarget, start: u64, end: u64) -> FileSplit {
    FileSplit {
        path: target.path.clone(),
        start,
        len: end - start,
        hosts: hosts_for_range(&target.blocks, start, end),
    }
}

/// Order-preserving union of the hosts of every block the range overlaps.
fn hosts_for_range(blocks: &[BlockLocation], start: u64, end: u64) -> Vec<String> {
    let mut hosts: Vec<String> = Vec::new();
    for block in blocks {
        if !block.overlaps(start, end) {
            continue;
        }
        for host in &block.hosts {
            if !hosts.iter().any(|seen| seen == host) {
                hosts.push(host.clone());
            }
        }
    }
    hosts
}
