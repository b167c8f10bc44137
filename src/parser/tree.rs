/*
 * ==========================================================================
 * RECSPL - Table-Driven Compiler Front End
 * ==========================================================================
 * 
 * Author:   Sam Wilcox
 * 
 * License:
 * This file is part of the RECSPL compiler front end project.
 * 
 * RECSPL is dual-licensed under the terms of:
 *   - The MIT license
 *   - The Apache License, Version 2.0
 * 
 * You may choose either license to govern your use of this software.
 * 
 * Unless required by applicable law or agreed to in writing, software
 * distributed under these licenses is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * 
 * ==========================================================================
 */

use serde::{Deserialize, Serialize};
use std::ops::Index;

use crate::error::CompileError;
use crate::grammar::NonTerminal;
use crate::lexer::Token;

/// Index of a node inside its `ParseTree` arena.
///
/// Ids are handed out in allocation order, so a node's id is strictly
/// greater than that of every node allocated before it. They mean nothing
/// outside the tree that allocated them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeKind {
    /// The tree root, labeled with the augmented start symbol. Has at most
    /// one child (none until the input is accepted).
    Root { start: NonTerminal },

    /// A reduced nonterminal. Children follow the RHS order of the rule
    /// that built it; nullable productions leave it childless.
    Inner { label: NonTerminal },

    /// A shifted input token.
    Leaf { token: Token },
}

/// One arena slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
}

impl Node {
    /// The nonterminal a root or inner node stands for.
    pub fn label(&self) -> Option<NonTerminal> {
        match &self.kind {
            NodeKind::Root { start } => Some(*start),
            NodeKind::Inner { label } => Some(*label),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        match &self.kind {
            NodeKind::Leaf { token } => Some(token),
            _ => None,
        }
    }
}

/// The concrete syntax tree of one compilation, stored as an arena.
///
/// The tree exclusively owns its nodes. Nodes refer to each other by
/// `NodeId` only, which keeps parent links cheap and makes the whole
/// structure trivially serializable.
///
/// # Invariants
/// - `nodes[i].id == NodeId(i)` for every slot
/// - exactly one node (the root) has no parent
/// - a node's `parent` lists it exactly once among its `children`
/// - every node is reachable from the root
///
/// The engine maintains these while building; `from_json` re-checks them
/// on every tree it reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TreeRepr")]
pub struct ParseTree {
    root: NodeId,
    nodes: Vec<Node>,
}

/// Unvalidated wire shape of a `ParseTree`.
#[derive(Deserialize)]
struct TreeRepr {
    root: NodeId,
    nodes: Vec<Node>,
}

impl TryFrom<TreeRepr> for ParseTree {
    type Error = CompileError;

    fn try_from(repr: TreeRepr) -> Result<Self, Self::Error> {
        let tree = ParseTree {
            root: repr.root,
            nodes: repr.nodes,
        };
        tree.validate()?;
        Ok(tree)
    }
}

impl ParseTree {
    /// Creates a tree holding only a childless root labeled `start`.
    pub fn new(start: NonTerminal) -> Self {
        let root = Node {
            id: NodeId(0),
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Root { start },
        };

        Self {
            root: NodeId(0),
            nodes: vec![root],
        }
    }

    fn allocate(&mut self, children: Vec<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());

        for child in &children {
            self.nodes[child.0].parent = Some(id);
        }

        self.nodes.push(Node {
            id,
            parent: None,
            children,
            kind,
        });

        id
    }

    /// Allocates a leaf for a shifted token.
    pub fn allocate_leaf(&mut self, token: Token) -> NodeId {
        self.allocate(Vec::new(), NodeKind::Leaf { token })
    }

    /// Allocates an inner node and adopts `children`, which must be live,
    /// currently parentless nodes of this tree, in left-to-right order.
    pub fn allocate_inner(&mut self, label: NonTerminal, children: Vec<NodeId>) -> NodeId {
        self.allocate(children, NodeKind::Inner { label })
    }

    /// Hangs the fully reduced start production under the root.
    pub fn attach_root_child(&mut self, child: NodeId) {
        let root = self.root;
        self.nodes[child.0].parent = Some(root);
        self.nodes[root.0].children = vec![child];
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Ordered children of `id`; empty for leaves and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    pub fn label(&self, id: NodeId) -> Option<NonTerminal> {
        self.get(id).and_then(Node::label)
    }

    pub fn token(&self, id: NodeId) -> Option<&Token> {
        self.get(id).and_then(Node::token)
    }

    /// The parent chain of `id`, nearest first, ending at the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Node ids in pre-order (parent first, children left to right).
    ///
    /// Uses an explicit stack so arbitrarily deep programs do not exhaust
    /// the call stack.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev());
        }

        order
    }

    /// Leaf tokens, left to right.
    ///
    /// For an accepted tree this is exactly the input minus `EOF`.
    pub fn frontier(&self) -> Vec<&Token> {
        self.pre_order()
            .into_iter()
            .filter_map(|id| self.token(id))
            .collect()
    }

    /// Human-readable outline, two spaces of indent per level.
    ///
    /// ```text
    /// PROG'
    ///   PROG
    ///     main
    ///     GLOBVARS
    ///     ALGO
    ///       begin
    ///       INSTRUC
    ///       end
    ///     FUNCTIONS
    /// ```
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root, 0usize)];

        while let Some((id, depth)) = stack.pop() {
            let node = &self[id];
            let text = match &node.kind {
                NodeKind::Root { start } => start.to_string(),
                NodeKind::Inner { label } => label.to_string(),
                NodeKind::Leaf { token } => token.to_string(),
            };
            out.push_str(&format!("{}{}\n", "  ".repeat(depth), text));
            stack.extend(node.children.iter().rev().map(|child| (*child, depth + 1)));
        }

        out
    }

    pub fn to_json(&self) -> Result<String, CompileError> {
        serde_json::to_string_pretty(self).map_err(|err| CompileError::MalformedArtifact {
            line: None,
            detail: err.to_string(),
        })
    }

    /// Reads a tree written by `to_json`, re-checking every arena invariant.
    pub fn from_json(text: &str) -> Result<ParseTree, CompileError> {
        serde_json::from_str(text).map_err(|err| CompileError::MalformedArtifact {
            line: Some(err.line()),
            detail: err.to_string(),
        })
    }

    /// Checks the arena invariants listed on the type.
    pub fn validate(&self) -> Result<(), CompileError> {
        fn broken(detail: String) -> CompileError {
            CompileError::MalformedArtifact { line: None, detail }
        }

        let count = self.nodes.len();

        for (index, node) in self.nodes.iter().enumerate() {
            if node.id != NodeId(index) {
                return Err(broken(format!("node in slot {} claims id {}", index, node.id)));
            }
        }

        let root = self
            .get(self.root)
            .ok_or_else(|| broken(format!("root {} is out of range", self.root)))?;

        if !matches!(root.kind, NodeKind::Root { .. }) || root.parent.is_some() {
            return Err(broken(format!("node {} is not a parentless root", self.root)));
        }

        let mut seen_as_child = vec![false; count];

        for node in &self.nodes {
            match node.kind {
                NodeKind::Leaf { .. } if !node.children.is_empty() => {
                    return Err(broken(format!("leaf {} has children", node.id)));
                }
                NodeKind::Root { .. } if node.id != self.root => {
                    return Err(broken(format!("second root {}", node.id)));
                }
                NodeKind::Root { .. } if node.children.len() > 1 => {
                    return Err(broken("root has more than one child".to_string()));
                }
                _ => {}
            }

            for child in &node.children {
                let slot = seen_as_child
                    .get_mut(child.0)
                    .ok_or_else(|| broken(format!("{} lists unknown child {}", node.id, child)))?;

                if *slot {
                    return Err(broken(format!("{} is the child of two nodes", child)));
                }
                *slot = true;

                if self.nodes[child.0].parent != Some(node.id) {
                    return Err(broken(format!("{} does not point back at {}", child, node.id)));
                }
            }
        }

        // Every non-root node is someone's child exactly once; a cycle
        // detached from the root would still pass that, so walk from the root.
        let mut reached = vec![false; count];
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut reached[id.0], true) {
                return Err(broken(format!("cycle through {}", id)));
            }
            stack.extend(self.children(id));
        }

        match reached.iter().position(|r| !r) {
            Some(orphan) => Err(broken(format!("{} is unreachable from the root", NodeId(orphan)))),
            None => Ok(()),
        }
    }
}

impl Index<NodeId> for ParseTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenKind;

    /// `PROG' → ALGO → begin INSTRUC end`, built the way the engine would.
    fn small_tree() -> ParseTree {
        let mut tree = ParseTree::new(NonTerminal::Start);
        let begin = tree.allocate_leaf(Token::new(TokenKind::Begin, "begin"));
        let instruc = tree.allocate_inner(NonTerminal::Instruc, vec![]);
        let end = tree.allocate_leaf(Token::new(TokenKind::End, "end"));
        let algo = tree.allocate_inner(NonTerminal::Algo, vec![begin, instruc, end]);
        tree.attach_root_child(algo);
        tree
    }

    #[test]
    fn allocation_links_parents_and_children() {
        let tree = small_tree();
        let algo = tree.child(tree.root(), 0).unwrap();

        assert_eq!(tree.label(algo), Some(NonTerminal::Algo));
        assert_eq!(tree.children(algo), &[NodeId(1), NodeId(2), NodeId(3)]);
        for child in tree.children(algo) {
            assert_eq!(tree.parent(*child), Some(algo));
        }
        assert_eq!(tree.parent(algo), Some(tree.root()));
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn walks_in_pre_order() {
        let tree = small_tree();
        let order: Vec<usize> = tree.pre_order().into_iter().map(|id| id.0).collect();
        assert_eq!(order, vec![0, 4, 1, 2, 3]);

        let lexemes: Vec<&str> = tree.frontier().iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["begin", "end"]);
    }

    #[test]
    fn ancestors_end_at_the_root() {
        let tree = small_tree();
        let chain: Vec<NodeId> = tree.ancestors(NodeId(2)).collect();
        assert_eq!(chain, vec![NodeId(4), NodeId(0)]);
    }

    #[test]
    fn dumps_an_indented_outline() {
        assert_eq!(small_tree().dump(), "PROG'\n  ALGO\n    begin\n    INSTRUC\n    end\n");
    }

    #[test]
    fn json_round_trip_preserves_the_tree() {
        let tree = small_tree();
        let back = ParseTree::from_json(&tree.to_json().unwrap()).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn rejects_json_with_broken_parent_links() {
        let mut value: serde_json::Value = serde_json::to_value(small_tree()).unwrap();
        value["nodes"][1]["parent"] = serde_json::json!(3);

        let err = ParseTree::from_json(&value.to_string()).unwrap_err();
        assert_eq!(err.code(), "E_ARTIFACT");
    }

    #[test]
    fn rejects_json_with_a_shared_child() {
        let mut value: serde_json::Value = serde_json::to_value(small_tree()).unwrap();
        value["nodes"][0]["children"] = serde_json::json!([4, 1]);

        assert!(ParseTree::from_json(&value.to_string()).is_err());
    }
}
