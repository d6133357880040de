//! Topology snapshot model.
//!
//! A [`TopologyDescription`] captures how the client currently sees the
//! deployment: the overall topology type, an optional replica-set name and
//! the known servers with their roles. The prompt deriver consumes these
//! snapshots; the mongo adapter builds them fresh from the server `hello`
//! response on every prompt computation.

use bson::Document;

/// Deployment shape as seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyType {
    /// Direct connection to a single server.
    Single,

    /// Replica set with no reachable primary.
    ReplicaSetNoPrimary,

    /// Replica set with a reachable primary.
    ReplicaSetWithPrimary,

    /// Sharded cluster (connected through mongos).
    Sharded,

    /// Topology state not yet determined.
    Unknown,
}

/// Role of a single server within the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerType {
    Standalone,
    Mongos,
    RsPrimary,
    RsSecondary,
    RsArbiter,
    RsOther,
    RsGhost,
    PossiblePrimary,
    LoadBalancer,
    Unknown,
}

impl ServerType {
    /// Prompt label for this role.
    ///
    /// Roles without a meaningful direct-connection label (standalone,
    /// ghost, possible-primary, load balancer, unknown) map to the empty
    /// string, which suppresses the prompt bracket entirely.
    pub fn prompt_label(&self) -> &'static str {
        match self {
            ServerType::Mongos => "mongos",
            ServerType::RsPrimary => "primary",
            ServerType::RsSecondary => "secondary",
            ServerType::RsArbiter => "arbiter",
            ServerType::RsOther => "other",
            _ => "",
        }
    }
}

/// One server within a topology snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDescription {
    /// host:port address.
    pub address: String,

    /// Role of this server.
    pub server_type: ServerType,

    /// Replica-set name reported by this server, if any.
    pub set_name: Option<String>,
}

/// Snapshot of the deployment topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyDescription {
    /// Overall topology type.
    pub topology_type: TopologyType,

    /// Replica-set name, if the deployment is a replica set.
    pub set_name: Option<String>,

    /// All servers in the snapshot.
    pub servers: Vec<ServerDescription>,
}

impl TopologyDescription {
    /// Servers whose role has been determined.
    pub fn known_servers(&self) -> Vec<&ServerDescription> {
        self.servers
            .iter()
            .filter(|s| s.server_type != ServerType::Unknown)
            .collect()
    }

    /// Build a snapshot from a server `hello` response.
    ///
    /// `direct` is whether the client was opened with `directConnection`,
    /// which pins the topology to `Single` regardless of what the server
    /// reports about the rest of its deployment.
    pub fn from_hello(reply: &Document, address: &str, direct: bool) -> Self {
        let set_name = reply.get_str("setName").ok().map(str::to_owned);
        let is_mongos = reply.get_str("msg").is_ok_and(|m| m == "isdbgrid");
        let is_writable = reply
            .get_bool("isWritablePrimary")
            .or_else(|_| reply.get_bool("ismaster"))
            .unwrap_or(false);
        let is_secondary = reply.get_bool("secondary").unwrap_or(false);
        let is_arbiter = reply.get_bool("arbiterOnly").unwrap_or(false);

        let server_type = if is_mongos {
            ServerType::Mongos
        } else if set_name.is_some() {
            if is_writable {
                ServerType::RsPrimary
            } else if is_secondary {
                ServerType::RsSecondary
            } else if is_arbiter {
                ServerType::RsArbiter
            } else {
                ServerType::RsOther
            }
        } else {
            ServerType::Standalone
        };

        let this_server = ServerDescription {
            address: address.to_owned(),
            server_type,
            set_name: set_name.clone(),
        };

        if direct {
            return Self {
                topology_type: TopologyType::Single,
                set_name,
                servers: vec![this_server],
            };
        }

        if is_mongos {
            return Self {
                topology_type: TopologyType::Sharded,
                set_name: None,
                servers: vec![this_server],
            };
        }

        if set_name.is_some() {
            let topology_type = if is_writable || reply.contains_key("primary") {
                TopologyType::ReplicaSetWithPrimary
            } else {
                TopologyType::ReplicaSetNoPrimary
            };

            // Peers from the hello host lists; their roles are unknown
            // until they are contacted themselves.
            let mut servers = vec![this_server];
            for key in ["hosts", "passives", "arbiters"] {
                if let Ok(hosts) = reply.get_array(key) {
                    for host in hosts {
                        if let Some(host) = host.as_str() {
                            if !servers.iter().any(|s| s.address == host) {
                                servers.push(ServerDescription {
                                    address: host.to_owned(),
                                    server_type: ServerType::Unknown,
                                    set_name: set_name.clone(),
                                });
                            }
                        }
                    }
                }
            }

            return Self {
                topology_type,
                set_name,
                servers,
            };
        }

        Self {
            topology_type: TopologyType::Single,
            set_name: None,
            servers: vec![this_server],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_hello_standalone() {
        let reply = doc! { "isWritablePrimary": true, "ok": 1 };
        let desc = TopologyDescription::from_hello(&reply, "localhost:27017", true);
        assert_eq!(desc.topology_type, TopologyType::Single);
        assert_eq!(desc.servers.len(), 1);
        assert_eq!(desc.servers[0].server_type, ServerType::Standalone);
        assert_eq!(desc.servers[0].server_type.prompt_label(), "");
    }

    #[test]
    fn test_hello_direct_to_secondary() {
        let reply = doc! {
            "isWritablePrimary": false,
            "secondary": true,
            "setName": "rs0",
            "hosts": ["a:27017", "b:27017"],
        };
        let desc = TopologyDescription::from_hello(&reply, "b:27017", true);
        assert_eq!(desc.topology_type, TopologyType::Single);
        assert_eq!(desc.servers.len(), 1);
        assert_eq!(desc.servers[0].server_type, ServerType::RsSecondary);
        assert_eq!(desc.set_name.as_deref(), Some("rs0"));
    }

    #[test]
    fn test_hello_replica_set_with_primary() {
        let reply = doc! {
            "isWritablePrimary": true,
            "setName": "rs0",
            "hosts": ["a:27017", "b:27017", "c:27017"],
        };
        let desc = TopologyDescription::from_hello(&reply, "a:27017", false);
        assert_eq!(desc.topology_type, TopologyType::ReplicaSetWithPrimary);
        assert_eq!(desc.servers.len(), 3);
        // Only the contacted server has a determined role.
        assert_eq!(desc.known_servers().len(), 1);
    }

    #[test]
    fn test_hello_replica_set_no_primary() {
        let reply = doc! {
            "isWritablePrimary": false,
            "secondary": true,
            "setName": "rs0",
            "hosts": ["a:27017"],
        };
        let desc = TopologyDescription::from_hello(&reply, "a:27017", false);
        assert_eq!(desc.topology_type, TopologyType::ReplicaSetNoPrimary);
    }

    #[test]
    fn test_hello_mongos() {
        let reply = doc! { "isWritablePrimary": true, "msg": "isdbgrid" };
        let desc = TopologyDescription::from_hello(&reply, "router:27017", false);
        assert_eq!(desc.topology_type, TopologyType::Sharded);

        let direct = TopologyDescription::from_hello(&reply, "router:27017", true);
        assert_eq!(direct.topology_type, TopologyType::Single);
        assert_eq!(direct.servers[0].server_type, ServerType::Mongos);
    }
}
