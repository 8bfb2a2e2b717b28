// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Configuration constants and settings for the networking layer.
use std::time::Duration;

/// Largest datagram we will encode or accept.
pub const MAX_PACKET_SIZE: usize = 64 * 1024;

/// How long the driver waits for a registered reply before synthesising a
/// timeout for it.
pub const REPLY_TIMEOUT_DEFAULT: Duration = Duration::from_secs(2);

/// Granularity of the reply deadline sweep.
pub(crate) const REPLY_SWEEP_INTERVAL: Duration = Duration::from_millis(50);

/// Size of the command channel into the driver.
pub(crate) const NETWORKING_CHANNEL_SIZE: usize = 10_000;

/// Size of a single lookup's reply inbox.
pub(crate) const REPLY_CHANNEL_SIZE: usize = 32;

/// Configuration for a node's networking layer.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub reply_timeout: Duration,
    pub max_packet_size: usize,
    pub channel_size: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            reply_timeout: REPLY_TIMEOUT_DEFAULT,
            max_packet_size: MAX_PACKET_SIZE,
            channel_size: NETWORKING_CHANNEL_SIZE,
        }
    }
}
