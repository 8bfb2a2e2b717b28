// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use serde::{Deserialize, Serialize};
use xor_name::XorName;

/// Read-only queries, answered by every node's responder task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Query {
    /// Liveness probe.
    ///
    /// Answered with [`Pong`].
    ///
    /// [`Pong`]: super::Response::Pong
    Ping,
    /// Ask for the closest peers to `target` the receiver knows of.
    ///
    /// Answered with [`ReturnNodes`].
    ///
    /// [`ReturnNodes`]: super::Response::ReturnNodes
    FindNode { target: XorName },
    /// Ask for the value stored under `target`.
    ///
    /// Answered with [`ReturnValue`] when the receiver holds the value, and
    /// with [`ReturnNodes`] otherwise.
    ///
    /// [`ReturnValue`]: super::Response::ReturnValue
    /// [`ReturnNodes`]: super::Response::ReturnNodes
    FindValue { target: XorName },
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::Ping => write!(f, "Query::Ping"),
            Query::FindNode { target } => write!(f, "Query::FindNode({target:?})"),
            Query::FindValue { target } => write!(f, "Query::FindValue({target:?})"),
        }
    }
}
