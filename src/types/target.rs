//! The [`Target`] type: a votable entity as registered by the content service.

use crate::types::basic::{CommunityId, TargetId, TargetKind, UnixSeconds};

/// What a target hangs off of: posts belong to a community, comments belong to a post.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parent {
    Community(CommunityId),
    Post(TargetId),
}

/// A votable entity. The content service constructs one of these when the durable row has been
/// inserted and hands it to the engine for registration.
///
/// The kind is derived from the parent: a target whose parent is a community is a post, a target
/// whose parent is a post is a comment. This makes the "membership entries exist only for posts"
/// invariant unrepresentable to violate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    id: TargetId,
    created_at: UnixSeconds,
    parent: Parent,
}

impl Target {
    pub fn post(id: TargetId, community: CommunityId, created_at: UnixSeconds) -> Target {
        Target {
            id,
            created_at,
            parent: Parent::Community(community),
        }
    }

    pub fn comment(id: TargetId, post: TargetId, created_at: UnixSeconds) -> Target {
        Target {
            id,
            created_at,
            parent: Parent::Post(post),
        }
    }

    pub fn id(&self) -> TargetId {
        self.id
    }

    pub fn created_at(&self) -> UnixSeconds {
        self.created_at
    }

    pub fn parent(&self) -> Parent {
        self.parent
    }

    pub fn kind(&self) -> TargetKind {
        match self.parent {
            Parent::Community(_) => TargetKind::Post,
            Parent::Post(_) => TargetKind::Comment,
        }
    }

    /// The community this target belongs to, if it is a post.
    pub fn community(&self) -> Option<CommunityId> {
        match self.parent {
            Parent::Community(community) => Some(community),
            Parent::Post(_) => None,
        }
    }
}
