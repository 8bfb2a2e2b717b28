// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};
use xor_name::XorName;

/// Writes sent to a peer. Cmds carry no reply channel.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cmd {
    /// Record `value` under `key` in the receiver's local store.
    Store { key: XorName, value: Bytes },
}

// Manual impl so log lines carry the key and the size, never the payload.
impl Debug for Cmd {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Cmd::Store { key, value } => {
                write!(f, "Cmd::Store {{ key: {key:?}, value: {} bytes }}", value.len())
            }
        }
    }
}

impl Display for Cmd {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
