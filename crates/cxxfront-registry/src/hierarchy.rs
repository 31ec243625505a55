//! Inheritance graph.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: class identities
//! - Edges: base-specifiers, pointing from the derived class to the base
//!
//! Paths are enumerated per subobject: a class reached twice through
//! non-virtual edges yields two paths, which the semantic core treats as two
//! distinct subobjects.

use cxxfront_core::{BaseSpecifier, ClassId, InheritancePath, RegistrationError, TypeHash};
use petgraph::Direction;
use petgraph::algo::{all_simple_paths, has_path_connecting};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;
use tracing::trace;

/// The base-class graph of every registered class.
#[derive(Debug, Default)]
pub struct ClassHierarchy {
    graph: DiGraph<ClassId, BaseSpecifier>,
    nodes: FxHashMap<TypeHash, NodeIndex>,
}

impl ClassHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, class: &ClassId) -> NodeIndex {
        if let Some(&index) = self.nodes.get(&class.hash()) {
            return index;
        }
        let index = self.graph.add_node(class.clone());
        self.nodes.insert(class.hash(), index);
        index
    }

    /// Add a class and its direct bases.
    ///
    /// Re-adding a class (completing a forward declaration) replaces its
    /// edges.
    pub fn add_class(
        &mut self,
        class: &ClassId,
        bases: &[BaseSpecifier],
    ) -> Result<(), RegistrationError> {
        let derived = self.node(class);

        for (i, base) in bases.iter().enumerate() {
            if base.class == *class {
                return Err(RegistrationError::CircularInheritance(class.to_string()));
            }
            if bases[..i].iter().any(|earlier| earlier.class == base.class) {
                return Err(RegistrationError::DuplicateBase {
                    class: class.to_string(),
                    base: base.class.to_string(),
                });
            }
            if let Some(&base_node) = self.nodes.get(&base.class.hash()) {
                if has_path_connecting(&self.graph, base_node, derived, None) {
                    return Err(RegistrationError::CircularInheritance(class.to_string()));
                }
            }
        }

        let mut stale: Vec<_> = self
            .graph
            .edges_directed(derived, Direction::Outgoing)
            .map(|e| e.id())
            .collect();
        // remove_edge swaps the last edge into the hole; go highest first
        stale.sort_unstable_by(|a, b| b.cmp(a));
        for edge in stale {
            self.graph.remove_edge(edge);
        }

        for base in bases {
            let base_node = self.node(&base.class);
            self.graph.add_edge(derived, base_node, base.clone());
        }
        Ok(())
    }

    pub fn contains(&self, class: &ClassId) -> bool {
        self.nodes.contains_key(&class.hash())
    }

    /// `derived` has `base` as a direct or indirect base (a class is not its
    /// own base).
    pub fn is_derived_from(&self, derived: &ClassId, base: &ClassId) -> bool {
        if derived == base {
            return false;
        }
        match (self.nodes.get(&derived.hash()), self.nodes.get(&base.hash())) {
            (Some(&from), Some(&to)) => has_path_connecting(&self.graph, from, to, None),
            _ => false,
        }
    }

    /// Every path from `from` down to `to`, shortest first.
    ///
    /// `from == to` yields the single empty path.
    pub fn paths(&self, from: &ClassId, to: &ClassId) -> Vec<InheritancePath> {
        if from == to {
            return vec![InheritancePath::start(from.clone())];
        }
        let (Some(&start), Some(&end)) = (self.nodes.get(&from.hash()), self.nodes.get(&to.hash()))
        else {
            return Vec::new();
        };

        let mut paths: Vec<InheritancePath> =
            all_simple_paths::<Vec<NodeIndex>, _>(&self.graph, start, end, 0, None)
                .filter_map(|nodes| self.path_from_nodes(&nodes))
                .collect();
        paths.sort_by(|a, b| {
            a.len().cmp(&b.len()).then_with(|| {
                let ka: Vec<_> = a.classes.iter().map(ClassId::hash).collect();
                let kb: Vec<_> = b.classes.iter().map(ClassId::hash).collect();
                ka.cmp(&kb)
            })
        });
        trace!(from = %from, to = %to, count = paths.len(), "enumerated inheritance paths");
        paths
    }

    fn path_from_nodes(&self, nodes: &[NodeIndex]) -> Option<InheritancePath> {
        let first = self.graph.node_weight(*nodes.first()?)?.clone();
        let mut path = InheritancePath::start(first);
        for pair in nodes.windows(2) {
            let edge = self.graph.find_edge(pair[0], pair[1])?;
            path = path.extended(self.graph.edge_weight(edge)?);
        }
        Some(path)
    }

    /// Every direct and indirect base, each listed once.
    pub fn ancestors(&self, class: &ClassId) -> Vec<ClassId> {
        let Some(&start) = self.nodes.get(&class.hash()) else {
            return Vec::new();
        };
        let mut seen = vec![start];
        let mut stack = vec![start];
        let mut result = Vec::new();
        while let Some(node) = stack.pop() {
            for neighbor in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if !seen.contains(&neighbor) {
                    seen.push(neighbor);
                    stack.push(neighbor);
                    result.push(self.graph[neighbor].clone());
                }
            }
        }
        result.sort();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxfront_core::Access;

    fn spec(class: &ClassId, is_virtual: bool) -> BaseSpecifier {
        BaseSpecifier {
            class: class.clone(),
            access: Access::Public,
            is_virtual,
        }
    }

    fn diamond(is_virtual: bool) -> (ClassHierarchy, ClassId, ClassId) {
        let v = ClassId::new("V");
        let a = ClassId::new("A");
        let b = ClassId::new("B");
        let d = ClassId::new("D");
        let mut h = ClassHierarchy::new();
        h.add_class(&v, &[]).unwrap();
        h.add_class(&a, &[spec(&v, is_virtual)]).unwrap();
        h.add_class(&b, &[spec(&v, is_virtual)]).unwrap();
        h.add_class(&d, &[spec(&a, false), spec(&b, false)]).unwrap();
        (h, d, v)
    }

    #[test]
    fn diamond_has_two_paths() {
        let (h, d, v) = diamond(false);
        let paths = h.paths(&d, &v);
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.len() == 2));
        assert_ne!(paths[0].subobject(), paths[1].subobject());
    }

    #[test]
    fn virtual_diamond_paths_share_subobject() {
        let (h, d, v) = diamond(true);
        let paths = h.paths(&d, &v);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].subobject(), paths[1].subobject());
    }

    #[test]
    fn derivation_queries() {
        let (h, d, v) = diamond(false);
        assert!(h.is_derived_from(&d, &v));
        assert!(!h.is_derived_from(&v, &d));
        assert!(!h.is_derived_from(&d, &d));
        assert_eq!(h.paths(&d, &d).len(), 1);
        assert_eq!(h.ancestors(&d).len(), 3);
    }

    #[test]
    fn cycles_are_rejected() {
        let a = ClassId::new("A");
        let b = ClassId::new("B");
        let mut h = ClassHierarchy::new();
        h.add_class(&a, &[]).unwrap();
        h.add_class(&b, &[spec(&a, false)]).unwrap();
        let err = h.add_class(&a, &[spec(&b, false)]).unwrap_err();
        assert!(matches!(err, RegistrationError::CircularInheritance(_)));
        assert!(matches!(
            h.add_class(&a, &[spec(&a, false)]),
            Err(RegistrationError::CircularInheritance(_))
        ));
    }

    #[test]
    fn duplicate_direct_base_is_rejected() {
        let a = ClassId::new("A");
        let b = ClassId::new("B");
        let mut h = ClassHierarchy::new();
        h.add_class(&a, &[]).unwrap();
        assert!(matches!(
            h.add_class(&b, &[spec(&a, false), spec(&a, true)]),
            Err(RegistrationError::DuplicateBase { .. })
        ));
    }
}
