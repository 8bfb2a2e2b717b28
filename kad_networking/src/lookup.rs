// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! The iterative lookup: the state machine that walks the network towards
//! the peers closest to a target.
//!
//! One instance drives one operation. It seeds a frontier of candidates from
//! the routing table, queries them, and on every batch of returned peers
//! re-evaluates whether the closest candidates it knows of still contain
//! someone it has not polled. Once they do not, the frontier has converged
//! and the operation's final action runs.

use crate::{
    cmd::NetworkCmd,
    config::REPLY_CHANNEL_SIZE,
    replies::ReplyEvent,
    routing_table::RoutingTable,
    sort_nodes_by_distance, BUCKET_SIZE, LOOKUP_PARALLELISM,
};
use bytes::Bytes;
use kad_protocol::{
    messages::{Cmd, Query, Response, ResponseKind},
    NodeInfo, XorName,
};
use std::{
    collections::{HashMap, HashSet},
    net::SocketAddr,
    sync::Arc,
};
use tokio::sync::mpsc;

/// What a lookup is after once it has converged on the target.
pub(crate) enum LookupPurpose {
    /// Fetch the value stored under the target key.
    GetValue,
    /// Converge on the key, then hand the value to the closest polled peer.
    PutValue { value: Bytes },
    /// Populate an empty routing table by searching for our own id through
    /// a single seed peer.
    Bootstrap { seed: NodeInfo },
    /// Walk the neighbourhood of the target to freshen the routing table.
    FindPeers,
}

enum Flow {
    /// Keep consuming reply events.
    Wait,
    /// The lookup is over.
    Done(Option<Bytes>),
}

/// State of one iterative lookup.
///
/// Owned by the task driving the operation and mutated only there; the only
/// suspension point is the reply inbox.
pub(crate) struct LookupState {
    target: XorName,
    purpose: LookupPurpose,
    cmd_sender: mpsc::Sender<NetworkCmd>,
    routing: Arc<RoutingTable>,
    reply_tx: mpsc::Sender<ReplyEvent>,
    inbox: mpsc::Receiver<ReplyEvent>,
    /// Candidate frontier: peers we may still want to poll.
    known: HashMap<XorName, SocketAddr>,
    /// Polled peers still owing us a reply or a timeout.
    pending: HashSet<XorName>,
    /// Every peer we have queried at least once.
    polled: HashMap<XorName, SocketAddr>,
    /// Polled peers that have burnt their single retransmission.
    timed_out: HashSet<XorName>,
}

impl LookupState {
    pub(crate) fn new(
        purpose: LookupPurpose,
        target: XorName,
        cmd_sender: mpsc::Sender<NetworkCmd>,
        routing: Arc<RoutingTable>,
    ) -> Self {
        let (reply_tx, inbox) = mpsc::channel(REPLY_CHANNEL_SIZE);
        Self {
            target,
            purpose,
            cmd_sender,
            routing,
            reply_tx,
            inbox,
            known: HashMap::new(),
            pending: HashSet::new(),
            polled: HashMap::new(),
            timed_out: HashSet::new(),
        }
    }

    /// Drive the lookup to completion. All failures collapse into the
    /// operation's no-result outcome; nothing is raised.
    pub(crate) async fn run(mut self) -> Option<Bytes> {
        trace!("Lookup for {:?} starting", self.target);
        if !self.seed_frontier() {
            return self.cancel();
        }
        loop {
            match self.inbox.recv().await {
                Some(ReplyEvent::Answer { source, response }) => {
                    self.routing.insert(source.clone());
                    let _ = self.pending.remove(&source.id);
                    match self.on_response(response) {
                        Flow::Wait => {}
                        Flow::Done(result) => return result,
                    }
                }
                Some(ReplyEvent::Timeout(id)) => match self.on_timeout(id) {
                    Flow::Wait => {}
                    Flow::Done(result) => return result,
                },
                Some(ReplyEvent::Closed) | None => return self.cancel(),
            }
        }
    }

    /// Issue the first burst of queries. Returns false when there is no one
    /// to ask.
    fn seed_frontier(&mut self) -> bool {
        let seeds = match &self.purpose {
            LookupPurpose::Bootstrap { seed } => vec![seed.clone()],
            _ => self.routing.closest(&self.target, LOOKUP_PARALLELISM),
        };
        if seeds.is_empty() {
            debug!("Lookup for {:?} has no peers to start from", self.target);
            return false;
        }
        for node in seeds {
            let _ = self.known.insert(node.id, node.addr);
            if !self.send_query(&node) {
                return false;
            }
        }
        true
    }

    /// Register the expected reply and issue the operation's query to
    /// `node`, recording it as polled and pending. Returns false when the
    /// driver is gone.
    fn send_query(&mut self, node: &NodeInfo) -> bool {
        let cmd = NetworkCmd::SendQuery {
            to: node.clone(),
            query: self.query(),
            expect: self.expected_replies(),
            reply_tx: self.reply_tx.clone(),
        };
        if self.cmd_sender.try_send(cmd).is_err() {
            return false;
        }
        let _ = self.polled.insert(node.id, node.addr);
        let _ = self.pending.insert(node.id);
        true
    }

    fn query(&self) -> Query {
        match self.purpose {
            LookupPurpose::GetValue => Query::FindValue {
                target: self.target,
            },
            LookupPurpose::PutValue { .. }
            | LookupPurpose::Bootstrap { .. }
            | LookupPurpose::FindPeers => Query::FindNode {
                target: self.target,
            },
        }
    }

    fn expected_replies(&self) -> Vec<ResponseKind> {
        match self.purpose {
            LookupPurpose::GetValue => {
                vec![ResponseKind::ReturnValue, ResponseKind::ReturnNodes]
            }
            _ => vec![ResponseKind::ReturnNodes],
        }
    }

    fn on_response(&mut self, response: Response) -> Flow {
        match response {
            Response::ReturnValue { value, .. }
                if matches!(self.purpose, LookupPurpose::GetValue) =>
            {
                debug!("Lookup for {:?} found the value", self.target);
                Flow::Done(Some(value))
            }
            Response::ReturnNodes { nodes, .. } => self.continue_lookup(nodes),
            // Only registered kinds reach the inbox; whatever else a peer
            // sent us, the remaining pending queries are still live.
            _ => Flow::Wait,
        }
    }

    /// A polled peer stayed silent past its deadline. The first time this is
    /// forgiven with a retransmission, datagrams being lossy; the second
    /// time the peer is evicted from the lookup and the routing table.
    fn on_timeout(&mut self, id: XorName) -> Flow {
        // Inbox contract: a timeout refers to a registration, and every
        // registration goes through send_query.
        let Some(addr) = self.polled.get(&id).copied() else {
            warn!("Timeout for a peer this lookup never polled: {id:?}");
            return Flow::Wait;
        };
        if self.timed_out.insert(id) {
            trace!("Peer {id:?} timed out once, retransmitting");
            let _ = self.pending.remove(&id);
            if !self.send_query(&NodeInfo::new(id, addr)) {
                return Flow::Done(self.cancel());
            }
        } else {
            trace!("Peer {id:?} timed out twice, evicting");
            self.routing.remove(&id);
            let _ = self.pending.remove(&id);
            let _ = self.known.remove(&id);
            let _ = self.polled.remove(&id);
            let _ = self.timed_out.remove(&id);
        }
        if self.pending.is_empty() {
            Flow::Done(self.cancel())
        } else {
            Flow::Wait
        }
    }

    /// Fold newly returned peers into the frontier and decide what happens
    /// next: probe the best unpolled candidate, keep waiting on in-flight
    /// queries, or settle.
    ///
    /// The convergence rule is the classic one: progress is possible while
    /// the closest candidates we know of include at least one peer we have
    /// not polled.
    fn continue_lookup(&mut self, nodes: Vec<NodeInfo>) -> Flow {
        let own_id = self.routing.our_id();

        let mut new_known: Vec<NodeInfo> = Vec::new();
        let candidates = nodes.into_iter().chain(
            self.known
                .iter()
                .map(|(id, addr)| NodeInfo::new(*id, *addr)),
        );
        for node in candidates {
            if new_known.len() == BUCKET_SIZE {
                break;
            }
            if node.id == own_id || self.polled.contains_key(&node.id) {
                continue;
            }
            if new_known.iter().any(|candidate| candidate.id == node.id) {
                continue;
            }
            new_known.push(node);
        }

        let union = new_known
            .iter()
            .cloned()
            .chain(
                self.polled
                    .iter()
                    .map(|(id, addr)| NodeInfo::new(*id, *addr)),
            )
            .collect();
        let mut closest = sort_nodes_by_distance(union, &self.target);
        closest.truncate(BUCKET_SIZE);
        let closest_polled = closest
            .iter()
            .all(|node| self.polled.contains_key(&node.id));

        if !closest_polled {
            if let Some(next) = new_known
                .iter()
                .min_by(|a, b| self.target.cmp_distance(&a.id, &b.id))
                .cloned()
            {
                if !self.send_query(&next) {
                    return Flow::Done(self.cancel());
                }
                self.known = new_known
                    .into_iter()
                    .map(|node| (node.id, node.addr))
                    .collect();
                return Flow::Wait;
            }
        }
        if !self.pending.is_empty() {
            return Flow::Wait;
        }
        self.finish()
    }

    /// The closest reachable peers have all been polled: run the operation's
    /// final action.
    fn finish(&mut self) -> Flow {
        match &self.purpose {
            LookupPurpose::GetValue
            | LookupPurpose::Bootstrap { .. }
            | LookupPurpose::FindPeers => Flow::Done(None),
            LookupPurpose::PutValue { value } => {
                if let Some(node) = self
                    .polled
                    .iter()
                    .min_by(|a, b| self.target.cmp_distance(a.0, b.0))
                    .map(|(id, addr)| NodeInfo::new(*id, *addr))
                {
                    debug!("Storing {:?} on {node}", self.target);
                    let cmd = NetworkCmd::SendCmd {
                        to: node,
                        cmd: Cmd::Store {
                            key: self.target,
                            value: value.clone(),
                        },
                    };
                    let _ = self.cmd_sender.try_send(cmd);
                }
                Flow::Done(None)
            }
        }
    }

    /// Terminal for exhaustion and closure: no result, no side effects.
    fn cancel(&mut self) -> Option<Bytes> {
        trace!("Lookup for {:?} cancelled", self.target);
        None
    }
}
