//! Explicit activity tree over catalog codes.
//!
//! Nodes keep catalog order. A node's parent is the nearest proper
//! segment-prefix of its code that is itself in the catalog, so codes whose
//! ancestors were never registered still attach to the closest one present.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::code::TaskCode;

/// Which codes a roll-up total includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollupRule {
    /// Every code whose text starts with the code's text: `1` rolls up
    /// `1_2`, `12` and `12_3`. Matches historical summaries.
    #[default]
    Textual,
    /// The code and its descendants at segment boundaries only.
    Segment,
}

#[derive(Debug, Clone)]
struct Node {
    code: TaskCode,
    parent: Option<usize>,
    children: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct CodeTree {
    nodes: Vec<Node>,
    roots: Vec<usize>,
    /// Node indices sorted by code text.
    sorted: Vec<usize>,
}

impl CodeTree {
    pub fn build<'a>(codes: impl IntoIterator<Item = &'a TaskCode>) -> Self {
        let mut nodes: Vec<Node> = codes
            .into_iter()
            .map(|code| Node {
                code: code.clone(),
                parent: None,
                children: Vec::new(),
            })
            .collect();

        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.code.as_str(), i))
            .collect();

        let parents: Vec<Option<usize>> = nodes
            .iter()
            .map(|n| n.code.ancestors().find_map(|a| index.get(a).copied()))
            .collect();

        let mut roots = Vec::new();
        for (i, parent) in parents.into_iter().enumerate() {
            nodes[i].parent = parent;
            match parent {
                Some(p) => nodes[p].children.push(i),
                None => roots.push(i),
            }
        }

        let mut sorted: Vec<usize> = (0..nodes.len()).collect();
        sorted.sort_by(|&a, &b| nodes[a].code.as_str().cmp(nodes[b].code.as_str()));

        Self {
            nodes,
            roots,
            sorted,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn code(&self, node: usize) -> &TaskCode {
        &self.nodes[node].code
    }

    pub fn parent(&self, node: usize) -> Option<usize> {
        self.nodes[node].parent
    }

    pub fn children(&self, node: usize) -> &[usize] {
        &self.nodes[node].children
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// No other catalog code extends this one at a segment boundary.
    pub fn is_leaf(&self, node: usize) -> bool {
        self.nodes[node].children.is_empty()
    }

    /// Boundary descendants of `node`, not including itself.
    pub fn descendants(&self, node: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.nodes[node].children.iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n].children.iter().rev());
        }
        out
    }

    /// Every node, children before parents.
    pub fn post_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, bool)> = self.roots.iter().rev().map(|&r| (r, false)).collect();
        while let Some((n, expanded)) = stack.pop() {
            if expanded {
                order.push(n);
            } else {
                stack.push((n, true));
                stack.extend(self.nodes[n].children.iter().rev().map(|&c| (c, false)));
            }
        }
        order
    }

    /// Nodes whose code text starts with `node`'s code text, itself included.
    pub fn textual_matches(&self, node: usize) -> &[usize] {
        let prefix = self.nodes[node].code.as_str();
        let start = self
            .sorted
            .partition_point(|&i| self.nodes[i].code.as_str() < prefix);
        let len = self.sorted[start..]
            .iter()
            .take_while(|&&i| self.nodes[i].code.as_str().starts_with(prefix))
            .count();
        &self.sorted[start..start + len]
    }

    /// Sum `values` (indexed by node) over every node's roll-up set.
    pub fn roll_up<T>(&self, values: &[T], rule: RollupRule) -> Vec<T>
    where
        T: Copy + Default + std::ops::Add<Output = T>,
    {
        match rule {
            RollupRule::Textual => (0..self.nodes.len())
                .map(|n| {
                    self.textual_matches(n)
                        .iter()
                        .fold(T::default(), |acc, &m| acc + values[m])
                })
                .collect(),
            RollupRule::Segment => {
                let mut totals = values.to_vec();
                for n in self.post_order() {
                    if let Some(p) = self.nodes[n].parent {
                        totals[p] = totals[p] + totals[n];
                    }
                }
                totals
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(codes: &[&str]) -> CodeTree {
        let codes: Vec<TaskCode> = codes.iter().map(|c| TaskCode::new(*c).unwrap()).collect();
        CodeTree::build(&codes)
    }

    fn codes_of(tree: &CodeTree, nodes: &[usize]) -> Vec<String> {
        let mut out: Vec<String> = nodes.iter().map(|&n| tree.code(n).to_string()).collect();
        out.sort();
        out
    }

    #[test]
    fn parents_skip_missing_ancestors() {
        let t = tree(&["0", "0_1_2", "0_1", "3_4_5"]);
        assert_eq!(t.parent(0), None);
        assert_eq!(t.parent(1), Some(2));
        assert_eq!(t.parent(2), Some(0));
        assert_eq!(t.parent(3), None);
        assert_eq!(t.roots(), &[0, 3]);
    }

    #[test]
    fn leaves_use_segment_boundaries() {
        let t = tree(&["1", "12", "1_2"]);
        assert!(!t.is_leaf(0));
        assert!(t.is_leaf(1));
        assert!(t.is_leaf(2));
        assert_eq!(codes_of(&t, &t.descendants(0)), vec!["1_2"]);
    }

    #[test]
    fn textual_matches_ignore_boundaries() {
        let t = tree(&["1", "12", "1_2", "1_23", "2", "12_3"]);
        assert_eq!(
            codes_of(&t, t.textual_matches(0)),
            vec!["1", "12", "12_3", "1_2", "1_23"]
        );
        assert_eq!(codes_of(&t, t.textual_matches(2)), vec!["1_2", "1_23"]);
        assert_eq!(codes_of(&t, t.textual_matches(4)), vec!["2"]);
    }

    #[test]
    fn post_order_visits_children_first() {
        let t = tree(&["0", "0_1", "0_1_1", "0_2"]);
        let order = t.post_order();
        assert_eq!(order.len(), 4);
        let pos = |n: usize| order.iter().position(|&x| x == n).unwrap();
        assert!(pos(2) < pos(1));
        assert!(pos(1) < pos(0));
        assert!(pos(3) < pos(0));
    }

    #[test]
    fn roll_up_rules_differ_on_prefix_collisions() {
        let t = tree(&["1", "1_2", "12"]);
        let values = [1.0, 2.0, 4.0];
        assert_eq!(t.roll_up(&values, RollupRule::Textual), vec![7.0, 2.0, 4.0]);
        assert_eq!(t.roll_up(&values, RollupRule::Segment), vec![3.0, 2.0, 4.0]);
    }

    #[test]
    fn roll_up_rules_agree_without_collisions() {
        let t = tree(&["0", "0_1", "0_1_1", "0_1_2", "0_2"]);
        let values = [1usize, 2, 3, 4, 5];
        assert_eq!(
            t.roll_up(&values, RollupRule::Textual),
            t.roll_up(&values, RollupRule::Segment)
        );
        assert_eq!(t.roll_up(&values, RollupRule::Segment)[0], 15);
    }
}
