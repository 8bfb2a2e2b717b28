// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Datagram messages and their possible responses.
mod cmd;
mod query;
mod response;

pub use self::{
    cmd::Cmd,
    query::Query,
    response::{Response, ResponseKind},
};

use crate::error::Result;
use serde::{Deserialize, Serialize};
use xor_name::XorName;

/// A request sent to a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    /// A cmd is a write, i.e. can cause mutation. Cmds are not answered.
    Cmd(Cmd),
    /// A query is read-only and is answered with a [`Response`].
    Query(Query),
}

/// Everything that can ride in a single datagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Msg {
    Request(Request),
    Response(Response),
}

/// The envelope around every datagram.
///
/// The receiver reconstructs the full sender identity from `sender` and the
/// datagram's source address, so messages themselves never carry addresses
/// for the sending side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    pub sender: XorName,
    pub msg: Msg,
}

impl Packet {
    pub fn new(sender: XorName, msg: Msg) -> Self {
        Self { sender, msg }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeInfo;
    use bytes::Bytes;
    use eyre::Result;
    use rand::thread_rng;

    #[test]
    fn packet_survives_the_wire() -> Result<()> {
        let mut rng = thread_rng();
        let target = XorName::random(&mut rng);
        let nodes = vec![
            NodeInfo::new(XorName::random(&mut rng), "127.0.0.1:5483".parse()?),
            NodeInfo::new(XorName::random(&mut rng), "[::1]:5484".parse()?),
        ];
        let packet = Packet::new(
            XorName::random(&mut rng),
            Msg::Response(Response::ReturnNodes { target, nodes }),
        );

        let decoded = Packet::from_bytes(&packet.to_bytes()?)?;
        assert_eq!(decoded, packet);
        Ok(())
    }

    #[test]
    fn store_cmd_keeps_its_payload() -> Result<()> {
        let mut rng = thread_rng();
        let packet = Packet::new(
            XorName::random(&mut rng),
            Msg::Request(Request::Cmd(Cmd::Store {
                key: XorName::random(&mut rng),
                value: Bytes::from_static(b"an opaque payload"),
            })),
        );

        let decoded = Packet::from_bytes(&packet.to_bytes()?)?;
        assert_eq!(decoded, packet);
        Ok(())
    }

    #[test]
    fn truncated_datagrams_are_rejected() -> Result<()> {
        let packet = Packet::new(
            XorName::random(&mut thread_rng()),
            Msg::Request(Request::Query(Query::Ping)),
        );
        let bytes = packet.to_bytes()?;

        assert!(Packet::from_bytes(&bytes[..bytes.len() - 1]).is_err());
        Ok(())
    }
}
