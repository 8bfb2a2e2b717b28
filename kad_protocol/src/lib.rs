// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Wire protocol for the kad network.
//!
//! Nodes and record keys live in the same 256-bit xor space, so a single
//! [`XorName`] doubles as a node identity and as a key under which a value is
//! stored. Peers exchange one [`messages::Packet`] per UDP datagram.

/// Errors.
pub mod error;
/// Datagram message types.
pub mod messages;
mod node;

pub use error::Error;
pub use node::NodeInfo;
pub use xor_name::{XorName, XOR_NAME_LEN};
