//! Generic graph search.
//!
//! [`GraphSearch`] is the traversal primitive behind every on-the-fly
//! construction in this crate: reachable products, reachable power
//! automata, interleaving, trace enumeration and word acceptance.
//!
//! The loop is the classic one:
//!
//! ```text
//! while frontier is not empty:
//!     current = dequeue(frontier)
//!     for successor in successors(current):
//!         if not is_seen(successor):
//!             mark_seen(successor)
//!             enqueue(successor)
//!     if quit(current): return current
//! ```
//!
//! The dequeue policy is given by [`Order`], successor generation by an
//! [`Explorable`], and deduplication by a [`Deduper`]. The deduper is always
//! present, so a search can never be configured with only half of the
//! seen-set protocol.
//!
//! # Example
//!
//! ```
//! use lts_rs::search::GraphSearch;
//!
//! // Toy successor function over small integers.
//! let mut successors = |&n: &u32| if n < 10 { vec![n * 2, n + 3] } else { vec![] };
//!
//! let mut search = GraphSearch::bfs([1]);
//! let found = search.run_until(&mut successors, |&n| n == 7);
//! assert_eq!(found, Some(7));
//! ```

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

use log::{debug, trace};

/// Dequeue policy of a [`GraphSearch`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Order {
    /// FIFO: breadth-first.
    #[default]
    BreadthFirst,
    /// LIFO: depth-first.
    DepthFirst,
}

/// A problem that can be searched: produces the successors of an item.
///
/// Implemented for every `FnMut(&T) -> Vec<T>`, so closures can be passed
/// directly. Implementors may record side information (e.g. the transitions
/// they generated) while producing successors.
pub trait Explorable<T> {
    fn successors(&mut self, item: &T) -> Vec<T>;
}

impl<T, F> Explorable<T> for F
where
    F: FnMut(&T) -> Vec<T>,
{
    fn successors(&mut self, item: &T) -> Vec<T> {
        self(item)
    }
}

/// Seen-set strategy of a [`GraphSearch`].
pub trait Deduper<T> {
    /// Records that `item` has been enqueued.
    fn mark_seen(&mut self, item: &T);
    /// Returns true if `item` (or something it is identified with) was already enqueued.
    fn is_seen(&self, item: &T) -> bool;
}

/// Deduplicates items by their own identity.
#[derive(Debug, Clone)]
pub struct IdentityDeduper<T> {
    seen: HashSet<T>,
}

impl<T> Default for IdentityDeduper<T> {
    fn default() -> Self {
        Self { seen: HashSet::new() }
    }
}

impl<T> IdentityDeduper<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// All items seen so far.
    pub fn seen(&self) -> &HashSet<T> {
        &self.seen
    }

    pub fn into_seen(self) -> HashSet<T> {
        self.seen
    }
}

impl<T> Deduper<T> for IdentityDeduper<T>
where
    T: Clone + Eq + Hash,
{
    fn mark_seen(&mut self, item: &T) {
        self.seen.insert(item.clone());
    }

    fn is_seen(&self, item: &T) -> bool {
        self.seen.contains(item)
    }
}

/// Deduplicates items on a projection of themselves.
///
/// Lets a search carry extra context in its items (a path, a partial trace)
/// while still expanding every projected key at most once.
pub struct ProjectionDeduper<K, F> {
    seen: HashSet<K>,
    project: F,
}

impl<K, F> ProjectionDeduper<K, F> {
    pub fn new(project: F) -> Self {
        Self {
            seen: HashSet::new(),
            project,
        }
    }

    /// All projected keys seen so far.
    pub fn seen(&self) -> &HashSet<K> {
        &self.seen
    }
}

impl<T, K, F> Deduper<T> for ProjectionDeduper<K, F>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    fn mark_seen(&mut self, item: &T) {
        self.seen.insert((self.project)(item));
    }

    fn is_seen(&self, item: &T) -> bool {
        self.seen.contains(&(self.project)(item))
    }
}

/// Never considers anything seen.
///
/// Only terminates when the explorer itself stops producing successors,
/// e.g. when items carry a path that forbids revisits.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoDedup;

impl<T> Deduper<T> for NoDedup {
    fn mark_seen(&mut self, _item: &T) {}

    fn is_seen(&self, _item: &T) -> bool {
        false
    }
}

/// A breadth-first or depth-first search over items of type `T`.
pub struct GraphSearch<T, D = IdentityDeduper<T>> {
    frontier: VecDeque<T>,
    order: Order,
    deduper: D,
    expanded: usize,
}

impl<T> GraphSearch<T, IdentityDeduper<T>>
where
    T: Clone + Eq + Hash,
{
    /// Breadth-first search from `frontier`, deduplicating on item identity.
    pub fn bfs(frontier: impl IntoIterator<Item = T>) -> Self {
        Self::with_deduper(Order::BreadthFirst, frontier, IdentityDeduper::new())
    }

    /// Depth-first search from `frontier`, deduplicating on item identity.
    pub fn dfs(frontier: impl IntoIterator<Item = T>) -> Self {
        Self::with_deduper(Order::DepthFirst, frontier, IdentityDeduper::new())
    }
}

impl<T, D> GraphSearch<T, D>
where
    D: Deduper<T>,
{
    /// Creates a search with an explicit dedup strategy.
    ///
    /// Items of the initial frontier are marked seen; duplicates among them
    /// are dropped.
    pub fn with_deduper(order: Order, frontier: impl IntoIterator<Item = T>, mut deduper: D) -> Self {
        let mut queue = VecDeque::new();
        for item in frontier {
            if !deduper.is_seen(&item) {
                deduper.mark_seen(&item);
                queue.push_back(item);
            }
        }
        Self {
            frontier: queue,
            order,
            deduper,
            expanded: 0,
        }
    }

    /// Runs the search until the frontier is exhausted.
    pub fn run<E>(&mut self, explorer: &mut E)
    where
        E: Explorable<T>,
    {
        self.run_until(explorer, |_| false);
    }

    /// Runs the search, stopping right after expanding the first item for
    /// which `quit` returns true. Returns that item, or `None` if the
    /// frontier was exhausted.
    pub fn run_until<E, Q>(&mut self, explorer: &mut E, mut quit: Q) -> Option<T>
    where
        E: Explorable<T>,
        Q: FnMut(&T) -> bool,
    {
        while let Some(current) = self.dequeue() {
            self.expanded += 1;

            let successors = explorer.successors(&current);
            trace!("expanding item #{} with {} successors", self.expanded, successors.len());

            for successor in successors {
                if !self.deduper.is_seen(&successor) {
                    self.deduper.mark_seen(&successor);
                    self.frontier.push_back(successor);
                }
            }

            if quit(&current) {
                debug!("search stopped after {} expansions", self.expanded);
                return Some(current);
            }
        }

        debug!("search exhausted after {} expansions", self.expanded);
        None
    }

    fn dequeue(&mut self) -> Option<T> {
        match self.order {
            Order::BreadthFirst => self.frontier.pop_front(),
            Order::DepthFirst => self.frontier.pop_back(),
        }
    }

    /// Number of items expanded so far.
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    pub fn deduper(&self) -> &D {
        &self.deduper
    }

    pub fn into_deduper(self) -> D {
        self.deduper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    // 0 -> 1, 2; 1 -> 3; 2 -> 3; 3 -> 0
    fn diamond(n: &u32) -> Vec<u32> {
        match n {
            0 => vec![1, 2],
            1 | 2 => vec![3],
            3 => vec![0],
            _ => vec![],
        }
    }

    #[test]
    fn test_bfs_order() {
        let mut order = Vec::new();
        let mut explorer = |n: &u32| {
            order.push(*n);
            diamond(n)
        };
        GraphSearch::bfs([0]).run(&mut explorer);
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_dfs_order() {
        let mut order = Vec::new();
        let mut explorer = |n: &u32| {
            order.push(*n);
            diamond(n)
        };
        GraphSearch::dfs([0]).run(&mut explorer);
        assert_eq!(order, vec![0, 2, 3, 1]);
    }

    #[test]
    fn test_each_item_expanded_once() {
        let mut search = GraphSearch::dfs([0, 0, 1]);
        search.run(&mut diamond);
        assert_eq!(search.expanded(), 4);
        assert_eq!(search.deduper().seen().len(), 4);
    }

    #[test]
    fn test_quit() {
        let mut search = GraphSearch::bfs([0]);
        let stopped = search.run_until(&mut diamond, |&n| n == 1);
        assert_eq!(stopped, Some(1));
        assert_eq!(search.expanded(), 2);
    }

    #[test]
    fn test_exhausted() {
        let mut search = GraphSearch::bfs([0]);
        assert_eq!(search.run_until(&mut diamond, |&n| n == 42), None);
    }

    #[test]
    fn test_projection_dedup() {
        // Items carry the path length, but are deduplicated on the node only.
        let mut explorer = |&(n, len): &(u32, usize)| diamond(&n).into_iter().map(|m| (m, len + 1)).collect::<Vec<_>>();
        let deduper = ProjectionDeduper::new(|&(n, _): &(u32, usize)| n);
        let mut search = GraphSearch::with_deduper(Order::BreadthFirst, [(0u32, 0usize)], deduper);
        search.run(&mut explorer);
        assert_eq!(search.expanded(), 4);
        assert_eq!(search.deduper().seen().len(), 4);
    }

    #[test]
    fn test_no_dedup_on_acyclic() {
        // Without deduplication, node 3 is reached through both 1 and 2.
        let mut explorer = |n: &u32| match n {
            0 => vec![1, 2],
            1 | 2 => vec![3],
            _ => vec![],
        };
        let mut search = GraphSearch::with_deduper(Order::DepthFirst, [0u32], NoDedup);
        search.run(&mut explorer);
        assert_eq!(search.expanded(), 5);
    }
}
