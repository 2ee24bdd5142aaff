//! Cluster topology: member and cluster descriptors

use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::common::utils::with_default_port;
use crate::common::{Error, Result};

/// One replica set member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: u32,
    /// `host:port`, resolvable from the seed at formation time
    pub host: String,
}

/// Replica set name plus its members in id order.
///
/// Built once and submitted once. After formation the member list is
/// fixed; reconfiguration is outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterDescriptor {
    name: String,
    members: Vec<Member>,
}

impl ClusterDescriptor {
    /// Build a descriptor from explicit members, validating ids and hosts
    pub fn new(name: impl Into<String>, members: Vec<Member>) -> Result<Self> {
        let descriptor = Self {
            name: name.into(),
            members,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Assign ids by position: the first host is member 0
    pub fn from_hosts<S: AsRef<str>>(name: &str, hosts: &[S]) -> Result<Self> {
        let members = hosts
            .iter()
            .enumerate()
            .map(|(id, host)| {
                Ok(Member {
                    id: id as u32,
                    host: with_default_port(host.as_ref())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(name, members)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Member 0, the node the set is initiated from
    pub fn seed(&self) -> &Member {
        &self.members[0]
    }

    /// Ids must be exactly `0..n` in order; hosts non-empty and distinct
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidDescriptor("cluster name is empty".into()));
        }
        if self.members.is_empty() {
            return Err(Error::InvalidDescriptor("no members".into()));
        }

        let mut hosts = HashSet::new();
        for (position, member) in self.members.iter().enumerate() {
            if member.id as usize != position {
                return Err(Error::InvalidDescriptor(format!(
                    "member {} has id {}, expected {}",
                    member.host, member.id, position
                )));
            }
            if member.host.trim().is_empty() {
                return Err(Error::InvalidDescriptor(format!(
                    "member {} has an empty host",
                    member.id
                )));
            }
            if !hosts.insert(member.host.as_str()) {
                return Err(Error::InvalidDescriptor(format!(
                    "duplicate host {}",
                    member.host
                )));
            }
        }

        Ok(())
    }

    /// Replica set config document for `replSetInitiate`
    pub fn to_document(&self) -> Document {
        let members: Vec<Document> = self
            .members
            .iter()
            .map(|m| doc! { "_id": m.id as i32, "host": m.host.as_str() })
            .collect();

        doc! {
            "_id": self.name.as_str(),
            "members": members,
        }
    }
}

impl std::fmt::Display for ClusterDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [", self.name)?;
        for (i, m) in self.members.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", m.id, m.host)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts() -> Vec<&'static str> {
        vec!["mongo1:27017", "mongo2:27017", "mongo3:27017"]
    }

    #[test]
    fn test_from_hosts_assigns_positions() {
        let d = ClusterDescriptor::from_hosts("rs0", &hosts()).unwrap();
        assert_eq!(d.name(), "rs0");
        assert_eq!(d.members().len(), 3);
        assert_eq!(d.seed().host, "mongo1:27017");
        for (i, m) in d.members().iter().enumerate() {
            assert_eq!(m.id as usize, i);
        }
    }

    #[test]
    fn test_from_hosts_adds_default_port() {
        let d = ClusterDescriptor::from_hosts("rs0", &["mongo1", "mongo2:27018"]).unwrap();
        assert_eq!(d.members()[0].host, "mongo1:27017");
        assert_eq!(d.members()[1].host, "mongo2:27018");
    }

    #[test]
    fn test_rejects_bad_descriptors() {
        assert!(ClusterDescriptor::from_hosts::<&str>("rs0", &[]).is_err());
        assert!(ClusterDescriptor::from_hosts("", &hosts()).is_err());
        assert!(ClusterDescriptor::from_hosts("rs0", &["a:1", "a:1"]).is_err());

        let gap = vec![
            Member { id: 0, host: "a:1".into() },
            Member { id: 2, host: "b:1".into() },
        ];
        assert!(matches!(
            ClusterDescriptor::new("rs0", gap),
            Err(Error::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_to_document() {
        let d = ClusterDescriptor::from_hosts("rs0", &hosts()).unwrap();
        let doc = d.to_document();
        assert_eq!(doc.get_str("_id").unwrap(), "rs0");

        let members = doc.get_array("members").unwrap();
        assert_eq!(members.len(), 3);
        let second = members[1].as_document().unwrap();
        assert_eq!(second.get_i32("_id").unwrap(), 1);
        assert_eq!(second.get_str("host").unwrap(), "mongo2:27017");
    }

    #[test]
    fn test_display() {
        let d = ClusterDescriptor::from_hosts("rs0", &["a:1", "b:2"]).unwrap();
        assert_eq!(d.to_string(), "rs0 [0: a:1, 1: b:2]");
    }
}
