//! Strongly connected components (Tarjan).
//!
//! Works on any finite graph given as a node list and an edge list, so it
//! does not depend on the automaton types; [`Lts::strongly_connected_components`]
//! is a thin adapter over the transition graph.
//!
//! Only *non-trivial* components are reported: those with more than one
//! node, and single nodes with a self-loop. Components are listed in the
//! input order of their root node; the nodes of a component are sorted.

use std::collections::HashMap;
use std::hash::Hash;

use log::debug;

use crate::lts::Lts;
use crate::types::StateId;

/// Low-link of a node that was already assigned to a component.
const DONE: usize = usize::MAX;

/// Tarjan's algorithm over an explicit graph.
///
/// Edges naming a node outside `nodes` are ignored.
///
/// # Example
///
/// ```
/// use lts_rs::scc::tarjan;
///
/// let nodes = [1, 2, 3, 4];
/// let edges = [(1, 2), (2, 1), (2, 3), (4, 4)];
/// assert_eq!(tarjan(&nodes, &edges), vec![vec![1, 2], vec![4]]);
/// ```
pub fn tarjan<N>(nodes: &[N], edges: &[(N, N)]) -> Vec<Vec<N>>
where
    N: Clone + Eq + Hash + Ord,
{
    let index: HashMap<&N, usize> = nodes.iter().enumerate().map(|(i, n)| (n, i)).collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut self_loop = vec![false; nodes.len()];
    for (s, t) in edges {
        if let (Some(&s), Some(&t)) = (index.get(s), index.get(t)) {
            children[s].push(t);
            if s == t {
                self_loop[s] = true;
            }
        }
    }

    let roots = Tarjan::new(&children).run();

    let components: Vec<Vec<N>> = roots
        .into_iter()
        .enumerate()
        .filter_map(|(root, members)| members.map(|m| (root, m)))
        .filter(|(root, members)| members.len() > 1 || self_loop[*root])
        .map(|(_, members)| {
            let mut component: Vec<N> = members.into_iter().map(|i| nodes[i].clone()).collect();
            component.sort();
            component
        })
        .collect();

    debug!("tarjan(|N| = {}, |E| = {}): {} components", nodes.len(), edges.len(), components.len());
    components
}

impl<S: Clone + Eq + Hash + Ord, A> Lts<S, A> {
    /// Non-trivial strongly connected components of the transition graph.
    pub fn strongly_connected_components(&self) -> Vec<Vec<S>> {
        let nodes: Vec<StateId> = (0..self.num_states()).map(StateId::new).collect();
        let edges: Vec<(StateId, StateId)> = self.transition_ids().iter().map(|t| (t.source, t.target)).collect();
        tarjan(&nodes, &edges)
            .into_iter()
            .map(|component| component.into_iter().map(|s| self.state(s).clone()).collect())
            .collect()
    }
}

/// An activation of the depth-first traversal: a node and the position of
/// the next child to visit.
struct Frame {
    node: usize,
    next_child: usize,
}

struct Tarjan<'a> {
    children: &'a [Vec<usize>],
    /// Discovery index, starting at 1; 0 means unvisited.
    dfsi: Vec<usize>,
    low: Vec<usize>,
    stack: Vec<usize>,
    counter: usize,
    /// `components[root]`: the component rooted at `root`, if any.
    components: Vec<Option<Vec<usize>>>,
}

impl<'a> Tarjan<'a> {
    fn new(children: &'a [Vec<usize>]) -> Self {
        let n = children.len();
        Self {
            children,
            dfsi: vec![0; n],
            low: vec![DONE; n],
            stack: Vec::new(),
            counter: 0,
            components: vec![None; n],
        }
    }

    fn run(mut self) -> Vec<Option<Vec<usize>>> {
        for node in 0..self.children.len() {
            if self.dfsi[node] == 0 {
                self.visit(node);
            }
        }
        self.components
    }

    fn discover(&mut self, node: usize) {
        self.counter += 1;
        self.dfsi[node] = self.counter;
        self.low[node] = self.counter;
        self.stack.push(node);
    }

    /// Iterative depth-first visit from `start`, with an explicit call stack.
    fn visit(&mut self, start: usize) {
        let children = self.children;
        self.discover(start);
        let mut calls = vec![Frame {
            node: start,
            next_child: 0,
        }];

        while let Some(frame) = calls.last_mut() {
            let node = frame.node;
            if let Some(&child) = children[node].get(frame.next_child) {
                frame.next_child += 1;
                if self.dfsi[child] == 0 {
                    self.discover(child);
                    calls.push(Frame {
                        node: child,
                        next_child: 0,
                    });
                }
                continue;
            }

            calls.pop();
            self.finish(node);
        }
    }

    /// Called once all children of `node` are visited.
    fn finish(&mut self, node: usize) {
        let children = self.children;
        for &child in &children[node] {
            self.low[node] = self.low[node].min(self.low[child]);
        }
        if self.dfsi[node] != self.low[node] {
            return;
        }

        let mut members = Vec::new();
        while let Some(member) = self.stack.pop() {
            self.low[member] = DONE;
            members.push(member);
            if member == node {
                break;
            }
        }
        self.components[node] = Some(members);
    }
}
