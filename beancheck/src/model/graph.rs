//! Composite-field dependency graph.
//!
//! Targets are nodes; a composite field of type `S` inside `T` is an edge
//! `T -> S`. Strongly connected components identify the fields that would
//! recurse forever if materialized.

use std::collections::{HashMap, HashSet};

use crate::model::target::TargetType;
use crate::model::types::QualifiedName;

/// Strongly connected components of the composite-field graph.
#[derive(Debug, Clone, Default)]
pub(crate) struct CompositeGraph {
    /// Component id per target.
    component: HashMap<QualifiedName, usize>,

    /// Components containing at least one edge (including self-edges).
    cyclic: HashSet<usize>,

    /// Members of each component, in discovery order.
    members: Vec<Vec<QualifiedName>>,
}

impl CompositeGraph {
    /// Compute components with Tarjan's algorithm.
    ///
    /// Edges to types outside `targets` are ignored.
    pub(crate) fn build(targets: &[TargetType]) -> Self {
        let known: HashSet<&QualifiedName> = targets.iter().map(|t| &t.name).collect();

        let edges: HashMap<&QualifiedName, Vec<&QualifiedName>> = targets
            .iter()
            .map(|t| {
                let deps = t
                    .composite_dependencies()
                    .filter(|d| known.contains(d))
                    .collect();
                (&t.name, deps)
            })
            .collect();

        let mut tarjan = Tarjan {
            edges: &edges,
            next_index: 0,
            indices: HashMap::new(),
            lowlinks: HashMap::new(),
            stack: Vec::new(),
            on_stack: HashSet::new(),
            components: Vec::new(),
        };

        for target in targets {
            if !tarjan.indices.contains_key(&target.name) {
                tarjan.visit(&target.name);
            }
        }

        let mut graph = CompositeGraph::default();
        for (id, members) in tarjan.components.into_iter().enumerate() {
            let self_loop = members.len() == 1
                && edges
                    .get(members[0])
                    .is_some_and(|deps| deps.contains(&members[0]));
            if members.len() > 1 || self_loop {
                graph.cyclic.insert(id);
            }
            for member in &members {
                graph.component.insert((*member).clone(), id);
            }
            graph
                .members
                .push(members.into_iter().cloned().collect());
        }

        graph
    }

    /// Whether `a` and `b` sit on a common cycle (or `a == b` with a self-edge).
    pub(crate) fn same_component(&self, a: &QualifiedName, b: &QualifiedName) -> bool {
        match (self.component.get(a), self.component.get(b)) {
            (Some(x), Some(y)) => x == y && self.cyclic.contains(x),
            _ => false,
        }
    }

    /// Members of every cyclic component.
    pub(crate) fn cyclic_components(&self) -> Vec<Vec<QualifiedName>> {
        self.members
            .iter()
            .enumerate()
            .filter(|(id, _)| self.cyclic.contains(id))
            .map(|(_, members)| members.clone())
            .collect()
    }
}

struct Tarjan<'g, 'n> {
    edges: &'g HashMap<&'n QualifiedName, Vec<&'n QualifiedName>>,
    next_index: usize,
    indices: HashMap<&'n QualifiedName, usize>,
    lowlinks: HashMap<&'n QualifiedName, usize>,
    stack: Vec<&'n QualifiedName>,
    on_stack: HashSet<&'n QualifiedName>,
    components: Vec<Vec<&'n QualifiedName>>,
}

impl<'g, 'n> Tarjan<'g, 'n> {
    fn visit(&mut self, node: &'n QualifiedName) {
        self.indices.insert(node, self.next_index);
        self.lowlinks.insert(node, self.next_index);
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack.insert(node);

        let edges = self.edges;
        if let Some(deps) = edges.get(node) {
            for &dep in deps {
                if !self.indices.contains_key(dep) {
                    self.visit(dep);
                    let low = self.lowlinks[dep].min(self.lowlinks[node]);
                    self.lowlinks.insert(node, low);
                } else if self.on_stack.contains(dep) {
                    let low = self.indices[dep].min(self.lowlinks[node]);
                    self.lowlinks.insert(node, low);
                }
            }
        }

        if self.lowlinks[node] == self.indices[node] {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack.remove(member);
                component.push(member);
                if member == node {
                    break;
                }
            }
            component.reverse();
            self.components.push(component);
        }
    }
}
