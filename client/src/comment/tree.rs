use std::{cmp::Reverse, collections::HashMap};

use super::{Comment, CommentNode, SortType};

/// Rebuilds the reply tree of a post from its flat list of comments.
///
/// Comments may arrive in any order. Every input comment ends up in the
/// returned forest exactly once: replies whose parent is not part of the
/// input are surfaced as roots instead of being dropped. Roots and each
/// node's children keep their relative input order.
pub fn build_comment_tree(comments: &[Comment]) -> Vec<CommentNode> {
    let len = comments.len();

    // Allocate every node up front so replies listed before their parent
    // can still be linked to it
    let mut arena: Vec<Option<CommentNode>> = Vec::with_capacity(len);
    let mut index = HashMap::<i64, usize>::with_capacity(len);
    for (i, comment) in comments.iter().enumerate() {
        arena.push(Some(CommentNode::new(comment.clone())));
        // first occurrence owns the id if the backend ever sends duplicates
        index.entry(comment.id).or_insert(i);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); len];
    let mut parent_of: Vec<Option<usize>> = vec![None; len];

    for (i, comment) in comments.iter().enumerate() {
        let Some(parent_id) = comment.parent_comment_id.get() else {
            continue;
        };

        match index.get(&parent_id) {
            Some(&parent) => {
                children[parent].push(i);
                parent_of[i] = Some(parent);
            }
            None => {
                tracing::debug!(
                    comment_id = comment.id,
                    parent_id,
                    "Parent comment not found, showing reply as a root comment"
                );
            }
        }
    }

    // Pre-order walk from the roots. Anything left unvisited hangs off a
    // parent cycle and is promoted to a root in input order.
    let mut is_root: Vec<bool> = parent_of.iter().map(Option::is_none).collect();
    let mut visited = vec![false; len];
    let mut order = Vec::with_capacity(len);

    for i in 0..len {
        if is_root[i] {
            visit(i, &children, &mut visited, &mut order);
        }
    }

    for i in 0..len {
        if visited[i] {
            continue;
        }

        if let Some(parent) = parent_of[i].take() {
            tracing::warn!(
                comment_id = comments[i].id,
                parent_id = comments[parent].id,
                "Comment is part of a reply cycle, showing it as a root comment"
            );
            children[parent].retain(|&c| c != i);
        }
        is_root[i] = true;
        visit(i, &children, &mut visited, &mut order);
    }

    // Children come after their parent in pre-order, so walking it backwards
    // moves every subtree into place before its parent is completed
    for &i in order.iter().rev() {
        let kids: Vec<CommentNode> = children[i]
            .iter()
            .filter_map(|&c| arena[c].take())
            .collect();

        if let Some(node) = arena[i].as_mut() {
            node.children = kids;
        }
    }

    (0..len)
        .filter(|&i| is_root[i])
        .filter_map(|i| arena[i].take())
        .collect()
}

fn visit(root: usize, children: &[Vec<usize>], visited: &mut [bool], order: &mut Vec<usize>) {
    let mut stack = vec![root];
    while let Some(i) = stack.pop() {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        order.push(i);
        stack.extend(children[i].iter().rev().copied());
    }
}

pub fn count_nodes(nodes: &[CommentNode]) -> usize {
    nodes.iter().map(CommentNode::count).sum()
}

/// Depth-first walk yielding every comment with its nesting depth, in the
/// order they should be displayed.
pub fn flatten(nodes: &[CommentNode]) -> Vec<(usize, &Comment)> {
    let mut result = Vec::with_capacity(count_nodes(nodes));
    let mut stack: Vec<(usize, &CommentNode)> = nodes.iter().rev().map(|n| (0, n)).collect();

    while let Some((depth, node)) = stack.pop() {
        result.push((depth, &node.comment));
        stack.extend(node.children.iter().rev().map(|c| (depth + 1, c)));
    }

    result
}

pub fn sort_tree(nodes: &mut [CommentNode], sort: SortType) {
    match sort {
        SortType::Best => sort_best(nodes),
        SortType::New => sort_new(nodes),
    }
}

fn sort_best(nodes: &mut [CommentNode]) {
    let mut stack = vec![nodes];
    while let Some(level) = stack.pop() {
        level.sort_by_key(|k| (Reverse(k.comment.likes), k.comment.created_at));

        // then every level of replies below it
        for node in level {
            stack.push(&mut node.children);
        }
    }
}

fn sort_new(nodes: &mut [CommentNode]) {
    // sort the top level comments
    nodes.sort_by_key(|k| Reverse(k.comment.created_at));

    // replies stay ranked by likes
    for node in nodes {
        sort_best(&mut node.children);
    }
}
