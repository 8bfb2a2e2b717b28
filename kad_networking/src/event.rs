// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Inbound packet handling: reply correlation for our own queries, and the
//! responder that answers everyone else's.

use crate::{driver::NodeDriver, replies::ReplyEvent, BUCKET_SIZE};
use kad_protocol::{
    messages::{Cmd, Msg, Packet, Query, Request, Response},
    NodeInfo,
};
use std::net::SocketAddr;

impl NodeDriver {
    /// Dispatch one decoded datagram.
    pub(crate) async fn handle_packet(&mut self, packet: Packet, src: SocketAddr) {
        if packet.sender == self.peer_id {
            return;
        }
        let source = NodeInfo::new(packet.sender, src);
        match packet.msg {
            Msg::Response(response) => self.handle_response(source, response),
            Msg::Request(Request::Query(query)) => self.answer_query(source, query).await,
            Msg::Request(Request::Cmd(Cmd::Store { key, value })) => {
                self.routing.insert(source);
                self.records.put(key, value);
            }
        }
    }

    /// A response is only ever meaningful to whoever registered interest in
    /// it; everything else is noise on the socket.
    fn handle_response(&mut self, source: NodeInfo, response: Response) {
        let kind = response.kind();
        match self.pending_replies.take_match(&source.id, kind) {
            Some(ticket) => {
                let event = ReplyEvent::Answer { source, response };
                if ticket.reply_tx.try_send(event).is_err() {
                    // The lookup finished before this reply arrived.
                    trace!("Reply inbox closed before delivery");
                }
            }
            None => trace!("Unsolicited {kind:?} from {source}"),
        }
    }

    /// Answer a peer's query from local knowledge. Every inbound query also
    /// freshens the sender's entry in the routing table.
    async fn answer_query(&mut self, source: NodeInfo, query: Query) {
        trace!("Answering {query} from {source}");
        let reply_to = source.addr;
        self.routing.insert(source);
        let response = match query {
            Query::Ping => Response::Pong,
            Query::FindNode { target } => Response::ReturnNodes {
                target,
                nodes: self.routing.closest(&target, BUCKET_SIZE),
            },
            Query::FindValue { target } => match self.records.get(&target) {
                Some(value) => Response::ReturnValue { target, value },
                None => Response::ReturnNodes {
                    target,
                    nodes: self.routing.closest(&target, BUCKET_SIZE),
                },
            },
        };
        self.send_msg(reply_to, Msg::Response(response)).await;
    }
}
