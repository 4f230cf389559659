// ABOUTME: Arena-backed comment tree built from Reddit listings and morechildren batches.
// ABOUTME: Flattening uses an explicit stack so deep threads cannot exhaust the call stack.

use std::collections::HashMap;

use super::api::{CommentData, MoreData, RawThing, Thing};

/// One comment in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    pub author: Option<String>,
    pub body: String,
    children: Vec<usize>,
}

/// Where unexpanded comments hang and which ids they stand for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoreStub {
    /// Ids that `morechildren` can expand.
    Ids {
        parent: Option<usize>,
        ids: Vec<String>,
    },
    /// "Continue this thread": replies of `parent` need a focused thread fetch.
    Continue { parent: usize, comment_id: String },
}

/// A comment forest in display order.
#[derive(Debug, Default)]
pub struct CommentTree {
    nodes: Vec<CommentNode>,
    roots: Vec<usize>,
    by_fullname: HashMap<String, usize>,
}

impl CommentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of comments collected so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a nested listing (as returned by the thread endpoint) under `parent`.
    ///
    /// `more` placeholders found anywhere in the listing are returned for expansion.
    pub fn add_listing(&mut self, things: Vec<RawThing>, parent: Option<usize>) -> Vec<MoreStub> {
        let mut stubs = Vec::new();
        let mut work = vec![(parent, things)];

        while let Some((parent, things)) = work.pop() {
            for raw in things {
                match raw.decode() {
                    Ok(Thing::Comment(mut comment)) => {
                        let replies = comment.take_replies();
                        let idx = self.push(comment, parent);
                        if !replies.is_empty() {
                            work.push((Some(idx), replies));
                        }
                    }
                    Ok(Thing::More(more)) => {
                        if let Some(stub) = self.stub_for(more, parent) {
                            stubs.push(stub);
                        }
                    }
                    Ok(Thing::Link(_)) | Ok(Thing::Other(_)) => {}
                    Err(err) => tracing::debug!(error = %err, "skipping undecodable listing child"),
                }
            }
        }
        stubs
    }

    /// Add a flat `morechildren` batch; each thing names its parent by fullname.
    ///
    /// Things whose parent is unknown attach to `fallback`.
    pub fn add_flat(&mut self, things: Vec<RawThing>, fallback: Option<usize>) -> Vec<MoreStub> {
        let mut stubs = Vec::new();
        for raw in things {
            match raw.decode() {
                Ok(Thing::Comment(mut comment)) => {
                    let parent = self.parent_of(&comment.parent_id, fallback);
                    let replies = comment.take_replies();
                    let idx = self.push(comment, parent);
                    if !replies.is_empty() {
                        stubs.extend(self.add_listing(replies, Some(idx)));
                    }
                }
                Ok(Thing::More(more)) => {
                    let parent = self.parent_of(&more.parent_id, fallback);
                    if let Some(stub) = self.stub_for(more, parent) {
                        stubs.push(stub);
                    }
                }
                Ok(Thing::Link(_)) | Ok(Thing::Other(_)) => {}
                Err(err) => tracing::debug!(error = %err, "skipping undecodable morechildren entry"),
            }
        }
        stubs
    }

    fn parent_of(&self, parent_fullname: &str, fallback: Option<usize>) -> Option<usize> {
        if parent_fullname.starts_with("t3_") {
            return None;
        }
        self.by_fullname.get(parent_fullname).copied().or(fallback)
    }

    fn stub_for(&self, more: MoreData, parent: Option<usize>) -> Option<MoreStub> {
        if !more.children.is_empty() {
            return Some(MoreStub::Ids {
                parent,
                ids: more.children,
            });
        }
        // An empty `more` under a comment is a "continue this thread" link.
        let parent = parent?;
        let comment_id = more.parent_id.strip_prefix("t1_")?.to_string();
        tracing::trace!(more_id = %more.id, count = more.count, "continue-thread stub");
        Some(MoreStub::Continue { parent, comment_id })
    }

    fn push(&mut self, comment: CommentData, parent: Option<usize>) -> usize {
        let idx = self.nodes.len();
        if !comment.name.is_empty() {
            self.by_fullname.insert(comment.name, idx);
        }
        self.nodes.push(CommentNode {
            author: comment.author,
            body: comment.body.unwrap_or_default(),
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p].children.push(idx),
            None => self.roots.push(idx),
        }
        idx
    }

    /// Comments in display order: each comment, then its whole subtree, then its next sibling.
    pub fn flatten(&self) -> Vec<&CommentNode> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            out.push(node);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }
}
