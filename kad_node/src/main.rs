// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! The `kadnode` binary: runs one node of the kad network, joining through
//! any supplied peers and answering queries until interrupted.

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use kad_networking::{Network, NetworkBuilder};
use kad_protocol::{NodeInfo, XorName, XOR_NAME_LEN};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How often the node re-walks its own neighbourhood to keep the routing
/// table fresh.
const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// A node of the kad network.
#[derive(Debug, Parser)]
#[clap(name = "kadnode", version = env!("CARGO_PKG_VERSION"))]
struct Opt {
    /// IP address to listen on.
    #[clap(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    ip: IpAddr,

    /// Port to listen on.
    ///
    /// `0` causes the OS to assign a random available port.
    #[clap(long, default_value_t = 0)]
    port: u16,

    /// Peer to join the network through, as `<hex id>@<ip>:<port>`.
    ///
    /// Can be provided multiple times. Without any peers the node starts a
    /// network of its own and waits to be joined.
    #[clap(long = "peer", value_name = "contact", value_parser = parse_node_addr)]
    peers: Vec<NodeInfo>,

    /// Fixed node identity as 64 hex characters.
    ///
    /// A random identity is generated when not provided.
    #[clap(long, value_parser = parse_node_id)]
    id: Option<XorName>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let opt = Opt::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()?;

    let mut builder = NetworkBuilder::new(SocketAddr::new(opt.ip, opt.port));
    if let Some(id) = opt.id {
        builder = builder.peer_id(id);
    }
    let (network, driver) = builder.build().await?;
    let driver_task = tokio::spawn(driver.run());

    info!(
        "Contact for other nodes: {}@{}",
        hex::encode(network.peer_id().0),
        network.local_addr()
    );

    for seed in opt.peers {
        network.join_network(seed).await;
    }
    info!("Network joined, {} peers known", network.peer_count());

    let refresh_task = tokio::spawn(run_refresh_loop(network.clone()));

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    refresh_task.abort();
    drop(network);
    let _ = driver_task.await;
    Ok(())
}

/// Periodically re-run a lookup for our own id so the routing table tracks
/// peers arriving and leaving around us.
async fn run_refresh_loop(network: Network) {
    let mut interval = tokio::time::interval(REFRESH_INTERVAL);
    // The first tick fires immediately; the join just did that work.
    interval.tick().await;
    loop {
        interval.tick().await;
        network.refresh().await;
        debug!("Routing table refreshed, {} peers known", network.peer_count());
    }
}

/// Parse `<hex id>@<ip>:<port>` into a node contact.
fn parse_node_addr(val: &str) -> Result<NodeInfo> {
    let (id_part, addr_part) = val
        .split_once('@')
        .ok_or_else(|| eyre!("Expected <hex id>@<ip>:<port>, got {val:?}"))?;
    let id = parse_node_id(id_part)?;
    let addr: SocketAddr = addr_part
        .parse()
        .map_err(|err| eyre!("Invalid peer address {addr_part:?}: {err}"))?;
    Ok(NodeInfo::new(id, addr))
}

fn parse_node_id(val: &str) -> Result<XorName> {
    let bytes = hex::decode(val).map_err(|err| eyre!("Invalid hex id: {err}"))?;
    let bytes: [u8; XOR_NAME_LEN] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| eyre!("Node ids are {XOR_NAME_LEN} bytes, got {}", bytes.len()))?;
    Ok(XorName(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_strings_round_trip() -> Result<()> {
        let id = XorName([7u8; XOR_NAME_LEN]);
        let contact = format!("{}@192.168.1.5:5483", hex::encode(id.0));

        let parsed = parse_node_addr(&contact)?;
        assert_eq!(parsed.id, id);
        assert_eq!(parsed.addr, "192.168.1.5:5483".parse::<SocketAddr>()?);
        Ok(())
    }

    #[test]
    fn malformed_contacts_are_rejected() {
        // No separator.
        assert!(parse_node_addr("deadbeef127.0.0.1:5483").is_err());
        // Id of the wrong length.
        assert!(parse_node_addr("deadbeef@127.0.0.1:5483").is_err());
        // Not hex at all.
        let id = "zz".repeat(XOR_NAME_LEN);
        assert!(parse_node_addr(&format!("{id}@127.0.0.1:5483")).is_err());
    }
}
