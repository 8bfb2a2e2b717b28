// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::replies::ReplyEvent;
use kad_protocol::{
    messages::{Cmd, Query, ResponseKind},
    NodeInfo,
};
use std::fmt::{self, Debug, Formatter};
use tokio::sync::mpsc;

/// Commands to send to the driver.
pub(crate) enum NetworkCmd {
    /// Register interest in a reply from `to`, then send the query.
    ///
    /// Registration happens before the datagram leaves, so every queried
    /// peer is guaranteed to produce either an `Answer` or a `Timeout` on
    /// `reply_tx`.
    SendQuery {
        to: NodeInfo,
        query: Query,
        expect: Vec<ResponseKind>,
        reply_tx: mpsc::Sender<ReplyEvent>,
    },
    /// Fire-and-forget write to a peer.
    SendCmd { to: NodeInfo, cmd: Cmd },
}

// Manual impl: the reply sender is noise and cmd payloads are elided by
// their own Debug impls.
impl Debug for NetworkCmd {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NetworkCmd::SendQuery {
                to, query, expect, ..
            } => {
                write!(
                    f,
                    "NetworkCmd::SendQuery {{ to: {to}, query: {query}, expect: {expect:?} }}"
                )
            }
            NetworkCmd::SendCmd { to, cmd } => {
                write!(f, "NetworkCmd::SendCmd {{ to: {to}, cmd: {cmd:?} }}")
            }
        }
    }
}
