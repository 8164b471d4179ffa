//! Domain objects that a commerce product can unlock.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{CourseId, MembershipId};

/// Kind of object linked to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Course,
    Membership,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Course => write!(f, "course"),
            ObjectKind::Membership => write!(f, "membership"),
        }
    }
}

/// A course or membership plan linked to a commerce product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum DomainObject {
    Course(CourseId),
    Membership(MembershipId),
}

impl DomainObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            DomainObject::Course(_) => ObjectKind::Course,
            DomainObject::Membership(_) => ObjectKind::Membership,
        }
    }

    /// Raw host identifier, regardless of kind.
    pub fn raw_id(&self) -> u64 {
        match self {
            DomainObject::Course(id) => id.value(),
            DomainObject::Membership(id) => id.value(),
        }
    }

    pub fn as_course(&self) -> Option<CourseId> {
        match self {
            DomainObject::Course(id) => Some(*id),
            DomainObject::Membership(_) => None,
        }
    }

    pub fn as_membership(&self) -> Option<MembershipId> {
        match self {
            DomainObject::Membership(id) => Some(*id),
            DomainObject::Course(_) => None,
        }
    }
}

impl fmt::Display for DomainObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.raw_id())
    }
}
