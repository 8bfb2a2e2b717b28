// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::NodeInfo;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Formatter};
use strum::EnumDiscriminants;
use xor_name::XorName;

/// The answer to a [`Query`].
///
/// [`Query`]: super::Query
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, EnumDiscriminants)]
#[strum_discriminants(name(ResponseKind), derive(Hash))]
pub enum Response {
    /// Reply to [`Ping`].
    ///
    /// [`Ping`]: super::Query::Ping
    Pong,
    /// The closest peers to `target` the sender knows of.
    ///
    /// Reply to [`FindNode`], and to [`FindValue`] when the sender does not
    /// hold the value.
    ///
    /// [`FindNode`]: super::Query::FindNode
    /// [`FindValue`]: super::Query::FindValue
    ReturnNodes { target: XorName, nodes: Vec<NodeInfo> },
    /// The value stored under `target`.
    ///
    /// Reply to [`FindValue`].
    ///
    /// [`FindValue`]: super::Query::FindValue
    ReturnValue { target: XorName, value: Bytes },
}

impl Response {
    /// The discriminant, used to match a reply against a registered
    /// expectation without looking at its payload.
    pub fn kind(&self) -> ResponseKind {
        self.into()
    }
}

// Manual impl so log lines never carry the value payload.
impl Debug for Response {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Response::Pong => write!(f, "Response::Pong"),
            Response::ReturnNodes { target, nodes } => {
                write!(f, "Response::ReturnNodes {{ target: {target:?}, nodes: {} }}", nodes.len())
            }
            Response::ReturnValue { target, value } => write!(
                f,
                "Response::ReturnValue {{ target: {target:?}, value: {} bytes }}",
                value.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tracks_the_variant() {
        let target = XorName([0u8; 32]);

        assert_eq!(Response::Pong.kind(), ResponseKind::Pong);
        assert_eq!(
            Response::ReturnNodes { target, nodes: vec![] }.kind(),
            ResponseKind::ReturnNodes
        );
        assert_eq!(
            Response::ReturnValue { target, value: Bytes::new() }.kind(),
            ResponseKind::ReturnValue
        );
    }
}
