// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
    net::SocketAddr,
};
use xor_name::XorName;

/// A peer of the network: its location in the xor space plus the UDP address
/// datagrams for it should be sent to.
///
/// Two `NodeInfo`s are the same peer when their ids match; the address is a
/// routing detail and may change across restarts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: XorName,
    pub addr: SocketAddr,
}

impl NodeInfo {
    pub fn new(id: XorName, addr: SocketAddr) -> Self {
        Self { id, addr }
    }
}

impl PartialEq for NodeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NodeInfo {}

impl Hash for NodeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.id, self.addr)
    }
}
