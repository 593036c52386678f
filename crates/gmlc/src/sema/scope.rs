//! Local scopes and the per-file scope ranges
//!
//! A file is cut into gapless, ordered ranges. Each range binds one self and
//! one local scope, so "what is visible at this offset" is a binary search.

use crate::common::{FileId, ScopeId, SelfId, SignifierId};
use rustc_hash::FxHashMap;

/// Variables declared with `var` or as parameters in one function body or
/// at the top level of one file
#[derive(Debug, Clone)]
pub struct LocalScope {
    pub id: ScopeId,
    pub file: FileId,
    order: Vec<SignifierId>,
    by_name: FxHashMap<String, SignifierId>,
}

impl LocalScope {
    pub fn new(id: ScopeId, file: FileId) -> Self {
        Self {
            id,
            file,
            order: Vec::new(),
            by_name: FxHashMap::default(),
        }
    }

    pub fn get(&self, name: &str) -> Option<SignifierId> {
        self.by_name.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, id: SignifierId) {
        if self.by_name.insert(name.into(), id).is_none() {
            self.order.push(id);
        }
    }

    /// Symbols in declaration order
    pub fn symbols(&self) -> impl Iterator<Item = SignifierId> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.order.clear();
        self.by_name.clear();
    }
}

/// One interval of a file bound to a (self, local scope) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeRange {
    pub start: usize,
    pub end: usize,
    pub self_id: SelfId,
    pub local: ScopeId,
}

impl ScopeRange {
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

/// Ordered, gapless, non-overlapping ranges covering a file
#[derive(Debug, Clone)]
pub struct ScopeRanges {
    ranges: Vec<ScopeRange>,
}

impl ScopeRanges {
    /// A single range starting at offset 0
    pub fn new(self_id: SelfId, local: ScopeId) -> Self {
        Self {
            ranges: vec![ScopeRange {
                start: 0,
                end: 0,
                self_id,
                local,
            }],
        }
    }

    /// Close the current range at `offset` and open an adjacent one that
    /// inherits its self and local scope
    pub fn create_next(&mut self, offset: usize) -> &mut ScopeRange {
        let last = self.current();
        let start = offset.max(last.start);
        let next = ScopeRange {
            start,
            end: start,
            self_id: last.self_id,
            local: last.local,
        };
        if let Some(current) = self.ranges.last_mut() {
            current.end = start;
        }
        self.ranges.push(next);
        let index = self.ranges.len() - 1;
        &mut self.ranges[index]
    }

    /// Close the final range at end of file
    pub fn close(&mut self, end: usize) {
        if let Some(last) = self.ranges.last_mut() {
            last.end = end.max(last.start);
        }
    }

    pub fn current(&self) -> ScopeRange {
        self.ranges[self.ranges.len() - 1]
    }

    /// The range containing `offset`; where two ranges touch, the later one
    pub fn at(&self, offset: usize) -> ScopeRange {
        let index = self.ranges.partition_point(|range| range.start <= offset);
        self.ranges[index.saturating_sub(1)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScopeRange> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
