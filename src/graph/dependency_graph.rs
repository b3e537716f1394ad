use crate::task::Task;
use petgraph::Direction;
use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// Predecessor graph over task ids, edges pointing `pred -> task`.
///
/// Nodes are added in list order, so node indices follow task positions.
/// Predecessor ids with no matching task produce no edge.
pub struct DependencyGraph {
    pub graph: DiGraph<String, ()>,
    pub id_to_index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn build(tasks: &[Task]) -> Self {
        let mut graph: DiGraph<String, ()> = DiGraph::new();
        let mut id_to_index: HashMap<String, NodeIndex> = HashMap::new();

        // Add nodes first
        for task in tasks {
            if !id_to_index.contains_key(&task.id) {
                let node_ix = graph.add_node(task.id.clone());
                id_to_index.insert(task.id.clone(), node_ix);
            }
        }

        // Add edges: pred -> task
        for task in tasks {
            let Some(&to) = id_to_index.get(&task.id) else {
                continue;
            };
            for pred_id in &task.predecessors {
                if let Some(&from) = id_to_index.get(pred_id) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        Self { graph, id_to_index }
    }

    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Every strongly connected component that forms a cycle (including
    /// self-dependencies), each listed in task order.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut components: Vec<Vec<NodeIndex>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| match component.as_slice() {
                [single] => self.graph.find_edge(*single, *single).is_some(),
                _ => true,
            })
            .collect();
        for component in &mut components {
            component.sort();
        }
        components.sort();
        components
            .into_iter()
            .map(|component| {
                component
                    .into_iter()
                    .map(|ix| self.graph[ix].clone())
                    .collect()
            })
            .collect()
    }

    /// The task itself plus everything it transitively depends on.
    pub fn ancestors(&self, task_id: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let Some(&start) = self.id_to_index.get(task_id) else {
            return seen;
        };
        let mut stack = vec![start];
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        while let Some(node_ix) = stack.pop() {
            if !visited.insert(node_ix) {
                continue;
            }
            seen.insert(self.graph[node_ix].clone());
            stack.extend(self.graph.neighbors_directed(node_ix, Direction::Incoming));
        }
        seen
    }

    /// Direct successors of a task, in task order.
    pub fn successors(&self, task_id: &str) -> Vec<String> {
        let Some(&node_ix) = self.id_to_index.get(task_id) else {
            return Vec::new();
        };
        let mut succ: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node_ix, Direction::Outgoing)
            .collect();
        succ.sort();
        succ.dedup();
        succ.into_iter().map(|ix| self.graph[ix].clone()).collect()
    }

    /// `(task, missing predecessor)` pairs. The scheduler treats these as satisfied.
    pub fn dangling_references(tasks: &[Task]) -> Vec<(String, String)> {
        let known: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        let mut dangling = Vec::new();
        for task in tasks {
            for pred in &task.predecessors {
                if !known.contains(pred.as_str()) {
                    dangling.push((task.id.clone(), pred.clone()));
                }
            }
        }
        dangling
    }
}
