//! Replica set status as reported by `replSetGetStatus`

use mongodb::bson::Document;
use serde::{Deserialize, Serialize};

use crate::common::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicaSetStatus {
    pub set: String,
    #[serde(default)]
    pub members: Vec<MemberStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberStatus {
    #[serde(rename = "_id")]
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub health: f64,
    #[serde(rename = "stateStr", default)]
    pub state: String,
}

impl MemberStatus {
    pub fn is_primary(&self) -> bool {
        self.state == "PRIMARY"
    }

    pub fn is_healthy(&self) -> bool {
        self.health >= 1.0
    }
}

impl ReplicaSetStatus {
    /// Parse a `replSetGetStatus` reply; unknown fields are ignored
    pub fn from_document(doc: Document) -> Result<Self> {
        Ok(mongodb::bson::from_document(doc)?)
    }

    pub fn primary(&self) -> Option<&MemberStatus> {
        self.members.iter().find(|m| m.is_primary())
    }

    pub fn has_primary(&self) -> bool {
        self.primary().is_some()
    }
}
