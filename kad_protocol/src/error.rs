// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use thiserror::Error;

/// Result alias for protocol-level failures.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while encoding or decoding datagrams.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to serialise packet: {0}")]
    Serialisation(#[from] rmp_serde::encode::Error),

    #[error("Failed to deserialise packet: {0}")]
    Deserialisation(#[from] rmp_serde::decode::Error),
}
