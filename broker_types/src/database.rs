//! Database descriptors as stored under the database config namespace.
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A logical database and the storage cluster that holds its shards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    pub name: String,
    /// Name of the storage cluster, which is the cluster's namespace.
    pub storage: String,
    pub num_of_shard: u32,
    pub replica_factor: u32,
    #[serde(default)]
    pub desc: String,
}

impl Database {
    pub fn new(
        name: impl Into<String>,
        storage: impl Into<String>,
        num_of_shard: u32,
        replica_factor: u32,
    ) -> Self {
        let mut db = Self {
            name: name.into(),
            storage: storage.into(),
            num_of_shard,
            replica_factor,
            desc: String::new(),
        };
        db.desc = db.to_string();
        db
    }

    /// The schema view of this database returned by `show schemas`.
    pub fn schema(&self) -> DatabaseSchema {
        DatabaseSchema {
            name: self.name.clone(),
            storage: self.storage.clone(),
            desc: if self.desc.is_empty() {
                self.to_string()
            } else {
                self.desc.clone()
            },
        }
    }
}

impl Display for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "create database {} with shard {}, replica {} on storage {}",
            self.name, self.num_of_shard, self.replica_factor, self.storage
        )
    }
}

/// Human oriented description of a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSchema {
    pub name: String,
    pub storage: String,
    pub desc: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shape() {
        let db = Database::new("test", "cluster-test", 12, 3);
        let json = serde_json::to_value(&db).unwrap();
        assert_eq!(json["numOfShard"], 12);
        assert_eq!(json["replicaFactor"], 3);
        assert_eq!(json["storage"], "cluster-test");

        let decoded: Database =
            serde_json::from_str(r#"{"name":"a","storage":"s","numOfShard":1,"replicaFactor":1}"#)
                .unwrap();
        assert_eq!(decoded.desc, "");
        assert_eq!(
            decoded.schema().desc,
            "create database a with shard 1, replica 1 on storage s"
        );
    }

    #[test]
    fn rejects_non_object() {
        assert!(serde_json::from_slice::<Database>(&[1, 2, 4]).is_err());
    }
}
