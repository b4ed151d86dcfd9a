use crate::error::SearchFailure;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::hash::Hash;

/// A state space that a [`SearchAlgorithm`] can explore.
///
/// The search engine knows nothing about the domain: it asks the problem for
/// the initial state, for the successors of a state and whether a state is a
/// goal. Successor generation takes `&mut self` so that a problem may keep its
/// own bookkeeping (for example, transition deduplication) across one run.
pub trait SearchProblem {
    type State: Clone + Eq + Hash;
    type Action: Clone;

    /// The state the search starts from.
    fn initial_state(&self) -> Self::State;

    /// Whether `state` satisfies the goal.
    fn is_goal(&self, state: &Self::State) -> bool;

    /// Every `(action, resulting state)` pair reachable in one step.
    fn successors(&mut self, state: &Self::State) -> Vec<(Self::Action, Self::State)>;

    /// Cost of a single transition. Unit cost unless overridden.
    fn step_cost(&self, _from: &Self::State, _action: &Self::Action, _to: &Self::State) -> u32 {
        1
    }
}

/// A trait for heuristic functions used in search algorithms.
pub trait HeuristicStrategy<P: SearchProblem> {
    /// Estimated remaining cost from `state` to a goal.
    fn estimate(&self, problem: &P, state: &P::State) -> u32;
}

/// Zero heuristic for algorithms like Dijkstra that don't use heuristics.
pub struct ZeroHeuristic;

impl<P: SearchProblem> HeuristicStrategy<P> for ZeroHeuristic {
    fn estimate(&self, _problem: &P, _state: &P::State) -> u32 {
        0
    }
}

/// Trait defining the interface for search algorithms.
///
/// `budget` caps how many states may be expanded. Running out of budget is a
/// failure ([`SearchFailure::BudgetExhausted`]), not a cancellation.
pub trait SearchAlgorithm<P: SearchProblem> {
    fn search(
        &self,
        problem: &mut P,
        budget: usize,
    ) -> Result<Solution<P::Action, P::State>, SearchFailure>;
}

/// One step of a solution path. The root step has no action.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStep<A, S> {
    pub action: Option<A>,
    pub state: S,
}

/// The path found by a search, from the initial state to a goal state.
#[derive(Debug, Clone)]
pub struct Solution<A, S> {
    steps: Vec<PathStep<A, S>>,
    expanded: usize,
}

impl<A: Clone, S> Solution<A, S> {
    /// Every step from the root to the goal, root first.
    pub fn path(&self) -> &[PathStep<A, S>] {
        &self.steps
    }

    /// The actions to execute, without the root's placeholder.
    pub fn actions(&self) -> Vec<A> {
        self.steps
            .iter()
            .skip(1)
            .filter_map(|step| step.action.clone())
            .collect()
    }

    pub fn goal_state(&self) -> Option<&S> {
        self.steps.last().map(|step| &step.state)
    }

    /// Number of states expanded before the goal was found.
    pub fn expanded(&self) -> usize {
        self.expanded
    }
}

/// Represents a node in the search space.
#[derive(Debug, Clone)]
struct Node<A, S> {
    state: S,
    /// Index of the parent node
    parent: Option<usize>,
    /// Action that led to this state (from parent)
    action: Option<A>,
    /// Path cost from start to this node
    g_cost: u32,
}

/// Open-set entry ordered for a max-heap: lowest f first, ties broken towards
/// deeper nodes, then towards older nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeWrapper {
    idx: usize,
    f_cost: u32,
    g_cost: u32,
}

impl Ord for NodeWrapper {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| self.g_cost.cmp(&other.g_cost))
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

impl PartialOrd for NodeWrapper {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Manages the state of a graph search.
struct SearchContext<A, S> {
    /// List of all nodes created during the search
    nodes: Vec<Node<A, S>>,
    /// Priority queue of nodes to explore
    open_set: BinaryHeap<NodeWrapper>,
    /// Cheapest known cost per state
    best_g: HashMap<S, u32>,
    /// States already expanded
    closed_set: HashSet<S>,
}

impl<A: Clone, S: Clone + Eq + Hash> SearchContext<A, S> {
    fn new(initial_state: S, h_cost: u32) -> Self {
        let mut context = Self {
            nodes: Vec::new(),
            open_set: BinaryHeap::new(),
            best_g: HashMap::new(),
            closed_set: HashSet::new(),
        };
        context.push(initial_state, None, None, 0, h_cost);
        context
    }

    fn push(&mut self, state: S, parent: Option<usize>, action: Option<A>, g_cost: u32, h_cost: u32) {
        let idx = self.nodes.len();
        self.best_g.insert(state.clone(), g_cost);
        self.nodes.push(Node {
            state,
            parent,
            action,
            g_cost,
        });
        self.open_set.push(NodeWrapper {
            idx,
            f_cost: g_cost.saturating_add(h_cost),
            g_cost,
        });
    }

    /// Gets the next node to explore, skipping stale queue entries.
    fn next_node(&mut self) -> Option<usize> {
        while let Some(wrapper) = self.open_set.pop() {
            if !self.closed_set.contains(&self.nodes[wrapper.idx].state) {
                return Some(wrapper.idx);
            }
        }
        None
    }

    /// Whether a successor reached at `g_cost` is worth queueing.
    fn improves(&self, state: &S, g_cost: u32) -> bool {
        if self.closed_set.contains(state) {
            return false;
        }
        self.best_g.get(state).map_or(true, |&best| g_cost < best)
    }

    /// Reconstructs the path from the initial state to the given node.
    fn reconstruct_path(&self, node_idx: usize) -> Vec<PathStep<A, S>> {
        let mut path = Vec::new();
        let mut current = Some(node_idx);

        while let Some(idx) = current {
            let node = &self.nodes[idx];
            path.push(PathStep {
                action: node.action.clone(),
                state: node.state.clone(),
            });
            current = node.parent;
        }

        path.reverse();
        path
    }
}

fn best_first<P: SearchProblem>(
    problem: &mut P,
    heuristic: &dyn HeuristicStrategy<P>,
    budget: usize,
) -> Result<Solution<P::Action, P::State>, SearchFailure> {
    let initial = problem.initial_state();
    let h_initial = heuristic.estimate(problem, &initial);
    let mut context = SearchContext::new(initial, h_initial);
    let mut expanded = 0;

    while let Some(current_idx) = context.next_node() {
        let state = context.nodes[current_idx].state.clone();

        if problem.is_goal(&state) {
            return Ok(Solution {
                steps: context.reconstruct_path(current_idx),
                expanded,
            });
        }

        if expanded >= budget {
            log::debug!("search budget of {} expansions exhausted", budget);
            return Err(SearchFailure::BudgetExhausted { expanded });
        }
        expanded += 1;
        context.closed_set.insert(state.clone());

        let g_cost = context.nodes[current_idx].g_cost;
        for (action, next) in problem.successors(&state) {
            let next_g = g_cost.saturating_add(problem.step_cost(&state, &action, &next));
            if !context.improves(&next, next_g) {
                continue;
            }
            let h_cost = heuristic.estimate(problem, &next);
            context.push(next, Some(current_idx), Some(action), next_g, h_cost);
        }
    }

    Err(SearchFailure::NoSolution)
}

/// A* search algorithm implementation.
pub struct AStarSearch<P: SearchProblem> {
    heuristic: Box<dyn HeuristicStrategy<P>>,
}

impl<P: SearchProblem> AStarSearch<P> {
    /// Creates a new A* search with the given heuristic.
    pub fn new(heuristic: Box<dyn HeuristicStrategy<P>>) -> Self {
        Self { heuristic }
    }
}

impl<P: SearchProblem> SearchAlgorithm<P> for AStarSearch<P> {
    fn search(
        &self,
        problem: &mut P,
        budget: usize,
    ) -> Result<Solution<P::Action, P::State>, SearchFailure> {
        best_first(problem, self.heuristic.as_ref(), budget)
    }
}

/// Dijkstra's algorithm: A* with a zero heuristic.
#[derive(Default)]
pub struct DijkstraSearch;

impl<P: SearchProblem> SearchAlgorithm<P> for DijkstraSearch {
    fn search(
        &self,
        problem: &mut P,
        budget: usize,
    ) -> Result<Solution<P::Action, P::State>, SearchFailure> {
        best_first(problem, &ZeroHeuristic, budget)
    }
}
