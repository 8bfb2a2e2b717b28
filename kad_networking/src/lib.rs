// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

#[macro_use]
extern crate tracing;

mod cmd;
mod config;
mod driver;
mod error;
mod event;
mod lookup;
mod record_store;
mod replies;
mod routing_table;

pub use self::{
    config::NetworkConfig,
    driver::{NetworkBuilder, NodeDriver},
    error::Error,
};

use self::{
    cmd::NetworkCmd,
    lookup::{LookupPurpose, LookupState},
    replies::ReplyEvent,
    routing_table::RoutingTable,
};
use bytes::Bytes;
use itertools::Itertools;
use kad_protocol::{
    messages::{Query, ResponseKind},
    NodeInfo, XorName,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::mpsc;

/// Width of a routing bucket, and the number of closest peers a lookup tries
/// to reach before it settles. Called `k` in the Kademlia paper.
pub const BUCKET_SIZE: usize = 7;

/// Number of peers a lookup queries up front. Called `alpha` in the paper.
pub const LOOKUP_PARALLELISM: usize = 3;

/// Sort the provided nodes by their xor distance to `target`, closest first.
///
/// The distances are computed once up front so the sort never re-derives
/// them.
pub fn sort_nodes_by_distance(nodes: Vec<NodeInfo>, target: &XorName) -> Vec<NodeInfo> {
    nodes
        .into_iter()
        .sorted_by(|a, b| target.cmp_distance(&a.id, &b.id))
        .collect_vec()
}

/// API to interact with the node's networking layer.
///
/// Cheap to clone; every handle talks to the same driver task.
#[derive(Clone)]
pub struct Network {
    pub(crate) cmd_sender: mpsc::Sender<NetworkCmd>,
    pub(crate) routing: Arc<RoutingTable>,
    pub(crate) peer_id: XorName,
    pub(crate) local_addr: SocketAddr,
}

impl Network {
    /// Our own location in the xor space.
    pub fn peer_id(&self) -> XorName {
        self.peer_id
    }

    /// The UDP address the node is reachable on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of peers currently held in the routing table.
    pub fn peer_count(&self) -> usize {
        self.routing.peer_count()
    }

    /// Iteratively search the network for the value stored under `target`.
    ///
    /// Returns `None` once the closest reachable peers have all been polled
    /// without any of them producing the value. Network failures along the
    /// way are folded into that `None`; nothing is raised.
    pub async fn lookup(&self, target: XorName) -> Option<Bytes> {
        self.run_lookup(LookupPurpose::GetValue, target).await
    }

    /// Publish `value` on the reachable peer closest to `key`.
    ///
    /// Fire-and-forget: a single `Store` datagram with no acknowledgement.
    /// Callers that need durable publication should store against several
    /// keys or re-store periodically.
    pub async fn store(&self, key: XorName, value: Bytes) {
        let _ = self.run_lookup(LookupPurpose::PutValue { value }, key).await;
    }

    /// Join the network through `seed`, populating the routing table by
    /// searching for our own id.
    pub async fn join_network(&self, seed: NodeInfo) {
        let _ = self
            .run_lookup(LookupPurpose::Bootstrap { seed }, self.peer_id)
            .await;
    }

    /// Re-walk our own neighbourhood so the routing table tracks peers
    /// arriving and leaving around us.
    pub async fn refresh(&self) {
        let _ = self.run_lookup(LookupPurpose::FindPeers, self.peer_id).await;
    }

    /// Probe a single peer for liveness.
    pub async fn ping(&self, node: NodeInfo) -> bool {
        let (reply_tx, mut inbox) = mpsc::channel(1);
        let cmd = NetworkCmd::SendQuery {
            to: node,
            query: Query::Ping,
            expect: vec![ResponseKind::Pong],
            reply_tx,
        };
        if self.cmd_sender.try_send(cmd).is_err() {
            return false;
        }
        matches!(inbox.recv().await, Some(ReplyEvent::Answer { .. }))
    }

    async fn run_lookup(&self, purpose: LookupPurpose, target: XorName) -> Option<Bytes> {
        LookupState::new(
            purpose,
            target,
            self.cmd_sender.clone(),
            Arc::clone(&self.routing),
        )
        .run()
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(byte: u8) -> NodeInfo {
        let mut bytes = [0u8; 32];
        bytes[31] = byte;
        NodeInfo::new(
            XorName(bytes),
            ([127, 0, 0, 1], 5483 + u16::from(byte)).into(),
        )
    }

    #[test]
    fn sorting_is_by_xor_distance_not_numeric_value() {
        let target = {
            let mut bytes = [0u8; 32];
            bytes[31] = 5;
            XorName(bytes)
        };

        // d(5,4) = 1, d(5,7) = 2, d(5,12) = 9
        let sorted = sort_nodes_by_distance(vec![node(12), node(7), node(4)], &target);
        let ids: Vec<u8> = sorted.iter().map(|n| n.id.0[31]).collect();
        assert_eq!(ids, vec![4, 7, 12]);
    }
}
