//! Circular dependency detection over a task batch.
//!
//! Depth-first walk with an explicit work stack, so deep dependency chains
//! cannot overflow the call stack. Each node is `Unvisited`, `Active` (on the
//! current path) or `Done`. Reaching an `Active` node closes a cycle; the
//! "involved" flag then travels back up the path as frames are popped, so
//! every node on the cycle and every ancestor that walks into it is reported.
//!
//! Only edges whose target is in the batch count. Dangling references are
//! ignored here (they still count toward the dependency factor in scoring).

use crate::task::{Task, TaskId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    Active,
    Done,
}

/// Index-addressed dependency graph restricted to in-batch edges.
struct DepGraph<'a> {
    ids: Vec<&'a TaskId>,
    edges: Vec<Vec<usize>>,
}

impl<'a> DepGraph<'a> {
    fn build(tasks: &'a [Task]) -> Self {
        let mut index: HashMap<&TaskId, usize> = HashMap::with_capacity(tasks.len());
        let mut ids: Vec<&TaskId> = Vec::with_capacity(tasks.len());
        let mut deps: Vec<&[TaskId]> = Vec::with_capacity(tasks.len());

        // Duplicate ids collapse into one node; the last record's deps win.
        for t in tasks {
            match index.get(&t.id).copied() {
                Some(i) => deps[i] = t.deps(),
                None => {
                    index.insert(&t.id, ids.len());
                    ids.push(&t.id);
                    deps.push(t.deps());
                }
            }
        }

        let edges = deps
            .iter()
            .map(|ds| ds.iter().filter_map(|d| index.get(d).copied()).collect())
            .collect();

        Self { ids, edges }
    }

    fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Return the id of every task that lies on a dependency cycle or depends
/// (directly or transitively) on one.
///
/// O(V + E). Self-dependencies are cycles of length one.
pub fn detect_cycles(tasks: &[Task]) -> HashSet<TaskId> {
    let graph = DepGraph::build(tasks);
    let n = graph.len();

    let mut state = vec![Visit::Unvisited; n];
    let mut involved = vec![false; n];
    // (node, index of the next outgoing edge to follow)
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if state[root] != Visit::Unvisited {
            continue;
        }
        state[root] = Visit::Active;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;

            if let Some(&dep) = graph.edges[node].get(next) {
                frame.1 += 1;
                match state[dep] {
                    Visit::Unvisited => {
                        state[dep] = Visit::Active;
                        stack.push((dep, 0));
                    }
                    Visit::Active => {
                        involved[dep] = true;
                        involved[node] = true;
                    }
                    // Plain DAG join unless the finished node already leads into a cycle.
                    Visit::Done => {
                        if involved[dep] {
                            involved[node] = true;
                        }
                    }
                }
            } else {
                state[node] = Visit::Done;
                stack.pop();
                if involved[node] {
                    if let Some(&(parent, _)) = stack.last() {
                        involved[parent] = true;
                    }
                }
            }
        }
    }

    let cycles: HashSet<TaskId> = graph
        .ids
        .iter()
        .zip(&involved)
        .filter(|&(_, &hit)| hit)
        .map(|(id, _)| (*id).clone())
        .collect();

    debug!(tasks = n, flagged = cycles.len(), "cycle detection finished");
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn task(id: &str, deps: &[&str]) -> Task {
        Task::new(id).with_dependencies(deps.iter().copied())
    }

    fn ids(list: &[&str]) -> HashSet<TaskId> {
        list.iter().map(|s| TaskId::from(*s)).collect()
    }

    #[test]
    fn test_empty_batch() {
        assert!(detect_cycles(&[]).is_empty());
    }

    #[test]
    fn test_no_dependencies_no_cycles() {
        let tasks = vec![task("a", &[]), task("b", &[]), Task::new("c")];
        assert!(detect_cycles(&tasks).is_empty());
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let tasks = vec![task("a", &["a"]), task("b", &[])];
        assert_eq!(detect_cycles(&tasks), ids(&["a"]));
    }

    #[test]
    fn test_two_node_cycle_flags_both() {
        let tasks = vec![task("a", &["b"]), task("b", &["a"])];
        assert_eq!(detect_cycles(&tasks), ids(&["a", "b"]));
    }

    #[test]
    fn test_disjoint_cycles_both_detected() {
        let tasks = vec![
            task("a", &["b"]),
            task("b", &["a"]),
            task("x", &["y"]),
            task("y", &["z"]),
            task("z", &["x"]),
            task("free", &["a"]),
        ];
        // `free` only leads into the a/b cycle, so it is flagged with it.
        assert_eq!(detect_cycles(&tasks), ids(&["a", "b", "x", "y", "z", "free"]));
    }

    #[test]
    fn test_diamond_join_is_not_a_cycle() {
        let tasks = vec![
            task("top", &["left", "right"]),
            task("left", &["bottom"]),
            task("right", &["bottom"]),
            task("bottom", &[]),
        ];
        assert!(detect_cycles(&tasks).is_empty());
    }

    #[test]
    fn test_dangling_references_are_not_edges() {
        let tasks = vec![task("a", &["ghost", "b"]), task("b", &["phantom"])];
        assert!(detect_cycles(&tasks).is_empty());
    }

    #[test]
    fn test_many_acyclic_dependencies_not_flagged() {
        let mut tasks: Vec<Task> = (0..50).map(|i| Task::new(format!("leaf{i}"))).collect();
        let leaves: Vec<String> = (0..50).map(|i| format!("leaf{i}")).collect();
        tasks.push(Task::new("hub").with_dependencies(leaves));
        assert!(detect_cycles(&tasks).is_empty());
    }

    #[test]
    fn test_ancestor_reaching_into_cycle_is_flagged() {
        // entry -> a -> b -> a
        let tasks = vec![task("entry", &["a"]), task("a", &["b"]), task("b", &["a"])];
        assert_eq!(detect_cycles(&tasks), ids(&["entry", "a", "b"]));

        // Same graph, cycle visited before the ancestor.
        let tasks = vec![task("a", &["b"]), task("b", &["a"]), task("entry", &["a"])];
        assert_eq!(detect_cycles(&tasks), ids(&["entry", "a", "b"]));
    }

    #[test]
    fn test_tasks_downstream_of_cycle_not_flagged() {
        // a <-> b, and b also depends on c, which is acyclic.
        let tasks = vec![task("a", &["b"]), task("b", &["a", "c"]), task("c", &["d"]), task("d", &[])];
        assert_eq!(detect_cycles(&tasks), ids(&["a", "b"]));
    }

    #[test]
    fn test_integer_ids() {
        let tasks = vec![
            Task::new(1_i64).with_dependencies([2_i64]),
            Task::new(2_i64).with_dependencies([1_i64]),
            Task::new(3_i64).with_dependencies([1_000_i64]),
        ];
        let found = detect_cycles(&tasks);
        assert_eq!(found, [TaskId::Int(1), TaskId::Int(2)].into_iter().collect());
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let n = 200_000;
        let mut tasks: Vec<Task> = (0..n)
            .map(|i| Task::new(i as i64).with_dependencies([(i + 1) as i64]))
            .collect();
        tasks.push(Task::new(n as i64));
        assert!(detect_cycles(&tasks).is_empty());

        // Close the loop: everything is now on one cycle.
        tasks.pop();
        tasks.push(Task::new(n as i64).with_dependencies([0_i64]));
        assert_eq!(detect_cycles(&tasks).len(), n + 1);
    }

    fn build(edges: &[Vec<usize>], order: &[usize]) -> Vec<Task> {
        order
            .iter()
            .map(|&i| Task::new(i as i64).with_dependencies(edges[i].iter().map(|&d| d as i64)))
            .collect()
    }

    /// Brute force: a node is involved if something it can reach (itself
    /// included) can reach itself again.
    fn reference(edges: &[Vec<usize>]) -> HashSet<TaskId> {
        let n = edges.len();
        let reach = |start: usize| -> HashSet<usize> {
            let mut seen = HashSet::new();
            let mut work: Vec<usize> = edges[start].iter().copied().filter(|&d| d < n).collect();
            while let Some(v) = work.pop() {
                if seen.insert(v) {
                    work.extend(edges[v].iter().copied().filter(|&d| d < n));
                }
            }
            seen
        };
        let reachable: Vec<HashSet<usize>> = (0..n).map(reach).collect();
        let on_cycle: Vec<bool> = (0..n).map(|v| reachable[v].contains(&v)).collect();
        (0..n)
            .filter(|&v| on_cycle[v] || reachable[v].iter().any(|&w| on_cycle[w]))
            .map(|v| TaskId::Int(v as i64))
            .collect()
    }

    fn graph_and_order() -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<usize>)> {
        (1usize..12)
            .prop_flat_map(|n| prop::collection::vec(prop::collection::vec(0..n + 3, 0..4), n))
            .prop_flat_map(|edges| {
                let order: Vec<usize> = (0..edges.len()).collect();
                (Just(edges), Just(order).prop_shuffle())
            })
    }

    proptest! {
        #[test]
        fn test_cycle_set_is_order_independent((edges, order) in graph_and_order()) {
            let natural: Vec<usize> = (0..edges.len()).collect();
            let a = detect_cycles(&build(&edges, &natural));
            let b = detect_cycles(&build(&edges, &order));
            prop_assert_eq!(a, b);
        }

        #[test]
        fn test_matches_brute_force_reachability((edges, order) in graph_and_order()) {
            let found = detect_cycles(&build(&edges, &order));
            prop_assert_eq!(found, reference(&edges));
        }
    }
}
