//! Node role classification for presentation.
//!
//! [`classify_nodes`] assigns a single [`Role`] per node with a fixed
//! tie-break: upstream is assigned first, downstream second (so a node in
//! both sets ends up downstream), and the focus overwrites either.
//!
//! [`classify_membership`] keeps the overlap visible instead, reporting
//! [`Membership::Both`] for nodes that are upstream and downstream at once.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::domain::NodeId;

/// Presentation role of a node relative to the focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The node under analysis
    Focus,
    /// Supplies into the focus
    Upstream,
    /// Depends on the focus
    Downstream,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Focus => write!(f, "focus"),
            Self::Upstream => write!(f, "upstream"),
            Self::Downstream => write!(f, "downstream"),
        }
    }
}

/// Set membership of a node, with dual membership kept distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Membership {
    /// The node under analysis
    Focus,
    /// Only upstream
    Upstream,
    /// Only downstream
    Downstream,
    /// Upstream and downstream (the focus sits on a cycle with it)
    Both,
}

impl Membership {
    /// Collapse to a single role using the downstream-wins tie-break.
    #[must_use]
    pub fn role(self) -> Role {
        match self {
            Self::Focus => Role::Focus,
            Self::Upstream => Role::Upstream,
            Self::Downstream | Self::Both => Role::Downstream,
        }
    }
}

/// Node id to role.
pub type RoleMap = BTreeMap<NodeId, Role>;

/// Label every node touched by a traversal.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use supplymap::domain::NodeId;
/// use supplymap::roles::{classify_nodes, Role};
///
/// let b: BTreeSet<NodeId> = [NodeId::new("B")].into();
/// let roles = classify_nodes(Some(&NodeId::new("A")), &b, &b);
///
/// assert_eq!(roles[&NodeId::new("A")], Role::Focus);
/// assert_eq!(roles[&NodeId::new("B")], Role::Downstream);
/// ```
#[must_use]
pub fn classify_nodes(
    focus: Option<&NodeId>,
    upstream: &BTreeSet<NodeId>,
    downstream: &BTreeSet<NodeId>,
) -> RoleMap {
    let mut roles = RoleMap::new();

    for id in upstream {
        roles.insert(id.clone(), Role::Upstream);
    }

    for id in downstream {
        roles.insert(id.clone(), Role::Downstream);
    }

    if let Some(focus) = focus {
        roles.insert(focus.clone(), Role::Focus);
    }

    roles
}

/// Like [`classify_nodes`], but nodes in both sets get [`Membership::Both`].
#[must_use]
pub fn classify_membership(
    focus: Option<&NodeId>,
    upstream: &BTreeSet<NodeId>,
    downstream: &BTreeSet<NodeId>,
) -> BTreeMap<NodeId, Membership> {
    let mut membership = BTreeMap::new();

    for id in upstream.union(downstream) {
        let kind = match (upstream.contains(id), downstream.contains(id)) {
            (true, true) => Membership::Both,
            (true, false) => Membership::Upstream,
            _ => Membership::Downstream,
        };
        membership.insert(id.clone(), kind);
    }

    if let Some(focus) = focus {
        membership.insert(focus.clone(), Membership::Focus);
    }

    membership
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> BTreeSet<NodeId> {
        ids.iter().map(|id| NodeId::new(*id)).collect()
    }

    #[test]
    fn downstream_beats_upstream_and_focus_beats_both() {
        let up = set(&["A", "B", "F"]);
        let down = set(&["B", "C", "F"]);
        let focus = NodeId::new("F");

        let roles = classify_nodes(Some(&focus), &up, &down);

        assert_eq!(roles.len(), 4);
        assert_eq!(roles[&NodeId::new("A")], Role::Upstream);
        assert_eq!(roles[&NodeId::new("B")], Role::Downstream);
        assert_eq!(roles[&NodeId::new("C")], Role::Downstream);
        assert_eq!(roles[&focus], Role::Focus);
    }

    #[test]
    fn no_focus_means_no_focus_role() {
        let roles = classify_nodes(None, &set(&["A"]), &set(&[]));
        assert_eq!(roles.len(), 1);
        assert!(roles.values().all(|r| *r != Role::Focus));
    }

    #[test]
    fn membership_keeps_overlap_and_collapses_consistently() {
        let up = set(&["A", "B"]);
        let down = set(&["B", "C"]);
        let focus = NodeId::new("X");

        let membership = classify_membership(Some(&focus), &up, &down);
        let roles = classify_nodes(Some(&focus), &up, &down);

        assert_eq!(membership[&NodeId::new("B")], Membership::Both);
        assert_eq!(membership[&NodeId::new("A")], Membership::Upstream);
        assert_eq!(membership[&focus], Membership::Focus);

        for (id, kind) in &membership {
            assert_eq!(kind.role(), roles[id]);
        }
    }

    #[test]
    fn role_displays_lowercase() {
        assert_eq!(Role::Downstream.to_string(), "downstream");
        assert_eq!(serde_json::to_string(&Role::Focus).unwrap(), "\"focus\"");
    }
}
