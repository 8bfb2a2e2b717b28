// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use kad_protocol::{
    messages::{Response, ResponseKind},
    NodeInfo, XorName,
};
use std::time::Instant;
use tokio::sync::mpsc;

/// One event on a lookup's reply inbox.
#[derive(Debug, Clone)]
pub(crate) enum ReplyEvent {
    /// A registered reply arrived from `source`.
    Answer { source: NodeInfo, response: Response },
    /// A registered reply did not arrive within its deadline.
    Timeout(XorName),
    /// The driver is gone; no further events will ever be delivered.
    Closed,
}

/// Interest in a reply, registered before the query datagram leaves.
pub(crate) struct ReplyTicket {
    pub source: XorName,
    pub kinds: Vec<ResponseKind>,
    pub reply_tx: mpsc::Sender<ReplyEvent>,
    pub deadline: Instant,
}

/// The outstanding reply registrations, owned by the driver task.
///
/// An inbound response is delivered to the oldest ticket whose source id and
/// expected kinds match it; everything else on the socket is unsolicited.
#[derive(Default)]
pub(crate) struct PendingReplies {
    tickets: Vec<ReplyTicket>,
}

impl PendingReplies {
    pub fn register(&mut self, ticket: ReplyTicket) {
        self.tickets.push(ticket);
    }

    /// Consume the oldest ticket matching the reply's source and kind.
    pub fn take_match(&mut self, source: &XorName, kind: ResponseKind) -> Option<ReplyTicket> {
        let index = self
            .tickets
            .iter()
            .position(|ticket| ticket.source == *source && ticket.kinds.contains(&kind))?;
        Some(self.tickets.remove(index))
    }

    /// Remove and return every ticket whose deadline has passed.
    pub fn expire(&mut self, now: Instant) -> Vec<ReplyTicket> {
        let (expired, live) = self
            .tickets
            .drain(..)
            .partition(|ticket| ticket.deadline <= now);
        self.tickets = live;
        expired
    }

    /// Remove and return every ticket, for shutdown.
    pub fn drain(&mut self) -> Vec<ReplyTicket> {
        self.tickets.drain(..).collect()
    }
}
