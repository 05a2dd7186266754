//! Breadth-first impact propagation.
//!
//! Starting from the seed rules (the rules implemented by changed files),
//! the traversal walks outgoing dependency edges level by level and assigns
//! every rule it reaches exactly one [`ImpactLevel`].
//!
//! # Algorithm
//!
//! 1. Enqueue each seed at depth 0 and mark it visited
//! 2. Pop the front of the queue and record it with the level for its depth
//! 3. Unless the depth is [`MAX_IMPACT_DEPTH`], enqueue every unvisited
//!    neighbor at depth + 1, marking it visited **when it is enqueued**
//! 4. Repeat until the queue is empty
//!
//! Marking at enqueue time means each rule enters the queue at most once,
//! so cycles of any length terminate and no rule is classified twice. The
//! FIFO order makes the first discovery the shortest one: a rule reachable
//! at several depths is classified by the smallest, and a seed is always
//! `DIRECT`. Among equally short paths the first discovered wins, following
//! seed order and then edge order.

use crate::domain::impact::MAX_IMPACT_DEPTH;
use crate::domain::{ImpactLevel, RuleId};
use std::collections::{HashMap, HashSet, VecDeque};

/// One rule reached by the traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalEntry {
    /// The rule reached
    pub rule_id: RuleId,

    /// Level assigned from the discovery depth
    pub level: ImpactLevel,

    /// Rule ids from the discovering seed to this rule, both inclusive
    pub path: Vec<RuleId>,
}

impl TraversalEntry {
    /// Hop count from the discovering seed
    pub fn depth(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Result of a traversal: `rule_id -> (level, path)` in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Traversal {
    entries: Vec<TraversalEntry>,
    index: HashMap<RuleId, usize>,
}

impl Traversal {
    /// Entry for a rule, if it was reached
    pub fn get(&self, rule_id: &RuleId) -> Option<&TraversalEntry> {
        self.index.get(rule_id).map(|&i| &self.entries[i])
    }

    /// Whether a rule was reached
    pub fn contains(&self, rule_id: &RuleId) -> bool {
        self.index.contains_key(rule_id)
    }

    /// All entries in BFS order
    pub fn entries(&self) -> &[TraversalEntry] {
        &self.entries
    }

    /// Rule ids in BFS order
    pub fn rule_ids(&self) -> Vec<RuleId> {
        self.entries.iter().map(|e| e.rule_id.clone()).collect()
    }

    /// Number of rules reached
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was reached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn record(&mut self, entry: TraversalEntry) {
        self.index.insert(entry.rule_id.clone(), self.entries.len());
        self.entries.push(entry);
    }
}

/// Propagate impact from `seeds` along `neighbors`.
///
/// `neighbors` returns the targets of a rule's outgoing edges. It is called
/// at most once per rule, and never for rules at the depth cap.
///
/// # Example
///
/// For edges `A -> B -> C` and seed `A`:
/// - `A` is `DIRECT` with path `[A]`
/// - `B` is `INDIRECT` with path `[A, B]`
/// - `C` is `CASCADE` with path `[A, B, C]`
pub fn traverse<F>(seeds: &[RuleId], mut neighbors: F) -> Traversal
where
    F: FnMut(&RuleId) -> Vec<RuleId>,
{
    let mut result = Traversal::default();
    let mut visited: HashSet<RuleId> = HashSet::new();
    let mut queue: VecDeque<(RuleId, Vec<RuleId>, usize)> = VecDeque::new();

    for seed in seeds {
        if visited.insert(seed.clone()) {
            queue.push_back((seed.clone(), vec![seed.clone()], 0));
        }
    }

    while let Some((rule_id, path, depth)) = queue.pop_front() {
        let Some(level) = ImpactLevel::from_depth(depth) else {
            continue;
        };
        tracing::debug!(rule_id = %rule_id, depth, level = %level, "Rule reached");

        if depth < MAX_IMPACT_DEPTH {
            for target in neighbors(&rule_id) {
                if visited.insert(target.clone()) {
                    let mut next_path = path.clone();
                    next_path.push(target.clone());
                    queue.push_back((target, next_path, depth + 1));
                }
            }
        }

        result.record(TraversalEntry {
            rule_id,
            level,
            path,
        });
    }

    result
}
