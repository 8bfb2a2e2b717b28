// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{
    cmd::NetworkCmd,
    config::{NetworkConfig, REPLY_SWEEP_INTERVAL},
    error::Result,
    record_store::RecordStore,
    replies::{PendingReplies, ReplyEvent, ReplyTicket},
    routing_table::RoutingTable,
    Network,
};
use kad_protocol::{
    messages::{Msg, Packet, Request},
    XorName,
};
use std::{net::SocketAddr, sync::Arc, time::Instant};
use tokio::{net::UdpSocket, sync::mpsc};

/// Builds the networking layer: binds the socket and wires up the driver.
pub struct NetworkBuilder {
    listen_addr: SocketAddr,
    peer_id: Option<XorName>,
    config: NetworkConfig,
}

impl NetworkBuilder {
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            peer_id: None,
            config: NetworkConfig::default(),
        }
    }

    /// Run with a fixed identity instead of a random one.
    pub fn peer_id(mut self, peer_id: XorName) -> Self {
        self.peer_id = Some(peer_id);
        self
    }

    pub fn config(mut self, config: NetworkConfig) -> Self {
        self.config = config;
        self
    }

    /// Bind the UDP socket and produce the API handle plus the driver task.
    /// The caller spawns [`NodeDriver::run`]; nothing moves until it does.
    pub async fn build(self) -> Result<(Network, NodeDriver)> {
        let socket = UdpSocket::bind(self.listen_addr).await?;
        let local_addr = socket.local_addr()?;
        let peer_id = self
            .peer_id
            .unwrap_or_else(|| XorName::random(&mut rand::thread_rng()));
        let routing = Arc::new(RoutingTable::new(peer_id));
        let (cmd_sender, cmd_receiver) = mpsc::channel(self.config.channel_size);

        info!("Node {peer_id:?} listening on {local_addr}");

        let driver = NodeDriver {
            peer_id,
            socket,
            routing: Arc::clone(&routing),
            records: RecordStore::default(),
            pending_replies: PendingReplies::default(),
            cmd_receiver,
            recv_buf: vec![0; self.config.max_packet_size],
            config: self.config,
        };
        let network = Network {
            cmd_sender,
            routing,
            peer_id,
            local_addr,
        };
        Ok((network, driver))
    }
}

/// Drives the node's UDP socket: outbound commands, inbound packets and
/// reply deadlines, all on one task. Runs until every [`Network`] handle is
/// dropped.
pub struct NodeDriver {
    pub(crate) peer_id: XorName,
    pub(crate) socket: UdpSocket,
    pub(crate) routing: Arc<RoutingTable>,
    pub(crate) records: RecordStore,
    pub(crate) pending_replies: PendingReplies,
    cmd_receiver: mpsc::Receiver<NetworkCmd>,
    recv_buf: Vec<u8>,
    config: NetworkConfig,
}

impl NodeDriver {
    /// The event loop. `tokio::select!` multiplexes inbound datagrams,
    /// commands from the API handles and the reply-deadline sweep.
    pub async fn run(mut self) {
        let mut sweep = tokio::time::interval(REPLY_SWEEP_INTERVAL);
        loop {
            tokio::select! {
                received = self.socket.recv_from(&mut self.recv_buf) => match received {
                    Ok((len, src)) => self.handle_datagram(len, src).await,
                    Err(err) => warn!("UDP receive failed: {err}"),
                },
                cmd = self.cmd_receiver.recv() => match cmd {
                    Some(cmd) => {
                        trace!("Handling {cmd:?}");
                        self.handle_cmd(cmd).await;
                    }
                    None => break,
                },
                _ = sweep.tick() => self.expire_replies(),
            }
        }
        self.shutdown();
    }

    async fn handle_datagram(&mut self, len: usize, src: SocketAddr) {
        let decoded = Packet::from_bytes(&self.recv_buf[..len]);
        match decoded {
            Ok(packet) => self.handle_packet(packet, src).await,
            Err(err) => trace!("Undecodable datagram from {src}: {err}"),
        }
    }

    async fn handle_cmd(&mut self, cmd: NetworkCmd) {
        match cmd {
            NetworkCmd::SendQuery {
                to,
                query,
                expect,
                reply_tx,
            } => {
                // Registered before the send so the deadline covers the
                // datagram even when the send itself fails.
                self.pending_replies.register(ReplyTicket {
                    source: to.id,
                    kinds: expect,
                    reply_tx,
                    deadline: Instant::now() + self.config.reply_timeout,
                });
                self.send_msg(to.addr, Msg::Request(Request::Query(query)))
                    .await;
            }
            NetworkCmd::SendCmd { to, cmd } => {
                self.send_msg(to.addr, Msg::Request(Request::Cmd(cmd))).await;
            }
        }
    }

    pub(crate) async fn send_msg(&self, addr: SocketAddr, msg: Msg) {
        let packet = Packet::new(self.peer_id, msg);
        match packet.to_bytes() {
            Ok(bytes) => {
                // A failed send is indistinguishable from a dropped datagram.
                if let Err(err) = self.socket.send_to(&bytes, addr).await {
                    trace!("Send to {addr} failed: {err}");
                }
            }
            Err(err) => error!("Failed to encode outbound packet: {err}"),
        }
    }

    fn expire_replies(&mut self) {
        for ticket in self.pending_replies.expire(Instant::now()) {
            trace!("Reply from {:?} is overdue", ticket.source);
            let _ = ticket.reply_tx.try_send(ReplyEvent::Timeout(ticket.source));
        }
    }

    fn shutdown(&mut self) {
        debug!("Driver for {:?} shutting down", self.peer_id);
        for ticket in self.pending_replies.drain() {
            let _ = ticket.reply_tx.try_send(ReplyEvent::Closed);
        }
    }
}
