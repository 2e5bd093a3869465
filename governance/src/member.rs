//! The dense member/node collection.

use serde::{Deserialize, Serialize};
use stakegov_types::{Address, Node};
use std::collections::HashMap;

/// One governance member and the node they declared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberEntry {
    pub member: Address,
    pub node: Node,
}

/// Members indexed densely from 1; index 0 means "not a member".
///
/// Removal swaps the last entry into the freed slot and re-points its index,
/// so removal is O(1) and the removed index becomes the moved member's.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<MemberEntry>", into = "Vec<MemberEntry>")]
pub struct MemberSet {
    entries: Vec<MemberEntry>,
    /// member → position in `entries`
    index: HashMap<Address, usize>,
}

impl MemberSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, member: &Address) -> bool {
        self.index.contains_key(member)
    }

    /// 1-based index of `member`, or 0.
    pub fn index_of(&self, member: &Address) -> usize {
        self.index.get(member).map(|pos| pos + 1).unwrap_or(0)
    }

    pub fn member_at(&self, index: usize) -> Option<Address> {
        self.entry_at(index).map(|e| e.member)
    }

    pub fn node_at(&self, index: usize) -> Option<&Node> {
        self.entry_at(index).map(|e| &e.node)
    }

    pub fn node_of(&self, member: &Address) -> Option<&Node> {
        self.index.get(member).map(|pos| &self.entries[*pos].node)
    }

    fn entry_at(&self, index: usize) -> Option<&MemberEntry> {
        index.checked_sub(1).and_then(|pos| self.entries.get(pos))
    }

    /// Append a member. Returns its index, or `None` if already present.
    pub fn push(&mut self, member: Address, node: Node) -> Option<usize> {
        if self.contains(&member) {
            return None;
        }
        self.entries.push(MemberEntry { member, node });
        let pos = self.entries.len() - 1;
        self.index.insert(member, pos);
        Some(pos + 1)
    }

    /// Swap-remove `member`, returning its node.
    pub fn remove(&mut self, member: &Address) -> Option<Node> {
        let pos = self.index.remove(member)?;
        let removed = self.entries.swap_remove(pos);
        if let Some(moved) = self.entries.get(pos) {
            self.index.insert(moved.member, pos);
        }
        Some(removed.node)
    }

    /// Rebind `old`'s slot to `new` with a fresh node.
    ///
    /// Fails if `old` is absent or `new` already holds another slot.
    pub fn replace(&mut self, old: &Address, new: Address, node: Node) -> bool {
        let Some(&pos) = self.index.get(old) else {
            return false;
        };
        if *old != new && self.contains(&new) {
            return false;
        }
        self.index.remove(old);
        self.index.insert(new, pos);
        self.entries[pos] = MemberEntry { member: new, node };
        true
    }

    pub fn update_node(&mut self, member: &Address, node: Node) -> bool {
        match self.index.get(member) {
            Some(&pos) => {
                self.entries[pos].node = node;
                true
            }
            None => false,
        }
    }

    /// `(index, member, node)` in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Address, &Node)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(pos, e)| (pos + 1, &e.member, &e.node))
    }

    pub fn members(&self) -> impl Iterator<Item = &Address> {
        self.entries.iter().map(|e| &e.member)
    }
}

impl TryFrom<Vec<MemberEntry>> for MemberSet {
    type Error = String;

    fn try_from(entries: Vec<MemberEntry>) -> Result<Self, Self::Error> {
        let mut set = MemberSet::new();
        for entry in entries {
            let member = entry.member;
            if set.push(entry.member, entry.node).is_none() {
                return Err(format!("duplicate member {}", member));
            }
        }
        Ok(set)
    }
}

impl From<MemberSet> for Vec<MemberEntry> {
    fn from(set: MemberSet) -> Self {
        set.entries
    }
}
