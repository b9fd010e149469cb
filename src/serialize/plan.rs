//! Traversal plan for serializing an entity graph.
//!
//! The plan depends only on the root kind and the exclusion rules, never on
//! the data, so it is computed once and then used both to decide which rows
//! to load and to render them.

use super::rules::{ExclusionRules, default_rules, join_path};
use crate::db::schema::{EntityKind, Relation};

/// One entity position in the output tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub kind: EntityKind,
    /// Dotted path from the root; empty for the root itself.
    pub path: String,
    /// Scalar columns emitted at this position.
    pub columns: Vec<&'static str>,
    pub children: Vec<PlanEdge>,
}

/// A relationship followed from a plan node.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanEdge {
    pub relation: &'static Relation,
    pub node: Plan,
}

impl Plan {
    /// Plan for `root` using each entity's default rules plus `extra`.
    pub fn build(root: EntityKind, extra: &ExclusionRules) -> Plan {
        let mut visited = Vec::new();
        build_node(root, "", extra, true, &mut visited)
    }

    /// Plan that only applies `extra`, ignoring entity defaults.
    ///
    /// Still finite: the path guard alone bounds the depth.
    pub fn build_without_defaults(root: EntityKind, extra: &ExclusionRules) -> Plan {
        let mut visited = Vec::new();
        build_node(root, "", extra, false, &mut visited)
    }

    /// Number of entity levels, counting the root.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|edge| edge.node.depth())
            .max()
            .unwrap_or(0)
    }

    /// Paths of every relationship the plan follows, depth-first.
    pub fn relation_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths(&mut paths);
        paths
    }

    fn collect_paths(&self, out: &mut Vec<String>) {
        for edge in &self.children {
            out.push(edge.node.path.clone());
            edge.node.collect_paths(out);
        }
    }
}

fn build_node(
    kind: EntityKind,
    path: &str,
    inherited: &ExclusionRules,
    apply_defaults: bool,
    visited: &mut Vec<(EntityKind, &'static str)>,
) -> Plan {
    let mut active = inherited.clone();
    if apply_defaults {
        active.extend(&default_rules(kind).prefixed(path));
    }

    let columns = kind
        .columns()
        .iter()
        .copied()
        .filter(|column| !active.excludes(&join_path(path, column)))
        .collect();

    let mut children = Vec::new();
    for relation in kind.relations() {
        let child_path = join_path(path, relation.name);
        if active.excludes(&child_path) {
            continue;
        }

        // Never follow the same relationship twice along one path.
        let step = (kind, relation.name);
        if visited.contains(&step) {
            continue;
        }

        visited.push(step);
        let node = build_node(relation.target, &child_path, &active, apply_defaults, visited);
        visited.pop();

        children.push(PlanEdge { relation, node });
    }

    Plan {
        kind,
        path: path.to_string(),
        columns,
        children,
    }
}
