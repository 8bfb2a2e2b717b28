// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! End-to-end checks over real UDP sockets on the loopback interface.

use bytes::Bytes;
use eyre::Result;
use kad_networking::{Network, NetworkBuilder};
use kad_protocol::{NodeInfo, XorName, XOR_NAME_LEN};
use std::time::Duration;

async fn spawn_node(id: Option<XorName>) -> Result<Network> {
    let mut builder = NetworkBuilder::new("127.0.0.1:0".parse()?);
    if let Some(id) = id {
        builder = builder.peer_id(id);
    }
    let (network, driver) = builder.build().await?;
    let _driver_task = tokio::spawn(driver.run());
    Ok(network)
}

fn contact(network: &Network) -> NodeInfo {
    NodeInfo::new(network.peer_id(), network.local_addr())
}

/// Start one node per id, each joining through the first one.
async fn spawn_network(ids: &[XorName]) -> Result<Vec<Network>> {
    let mut nodes = vec![spawn_node(Some(ids[0])).await?];
    for id in &ids[1..] {
        let node = spawn_node(Some(*id)).await?;
        node.join_network(contact(&nodes[0])).await;
        nodes.push(node);
    }
    Ok(nodes)
}

/// Ids with a fixed byte pattern make the store placement predictable: with
/// the key at `[9; 32]`, the node at `[1; 32]` is the closest and therefore
/// the one that ends up holding the value.
fn test_ids() -> Vec<XorName> {
    (1..=5u8).map(|byte| XorName([byte; XOR_NAME_LEN])).collect()
}

fn test_key() -> XorName {
    XorName([9u8; XOR_NAME_LEN])
}

#[tokio::test]
async fn joining_populates_routing_tables_both_ways() -> Result<()> {
    let nodes = spawn_network(&test_ids()[..2]).await?;

    // The joiner learnt the bootstrap node, and answering the join query
    // taught the bootstrap node about the joiner.
    assert_eq!(nodes[1].peer_count(), 1);
    assert_eq!(nodes[0].peer_count(), 1);
    Ok(())
}

#[tokio::test]
async fn stored_values_are_found_from_another_node() -> Result<()> {
    let nodes = spawn_network(&test_ids()).await?;

    let value = Bytes::from_static(b"hello there");
    nodes[1].store(test_key(), value.clone()).await;

    // The final store datagram is fire-and-forget; give it a moment.
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(nodes[2].lookup(test_key()).await, Some(value));
    Ok(())
}

#[tokio::test]
async fn lookups_for_unpublished_keys_return_none() -> Result<()> {
    let nodes = spawn_network(&test_ids()[..4]).await?;

    let key = XorName::from_content(b"never stored");
    assert_eq!(nodes[2].lookup(key).await, None);
    Ok(())
}

#[tokio::test]
async fn lookups_are_idempotent_against_a_quiet_network() -> Result<()> {
    let nodes = spawn_network(&test_ids()).await?;

    let value = Bytes::from_static(b"unchanging");
    nodes[1].store(test_key(), value.clone()).await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(nodes[4].lookup(test_key()).await, Some(value.clone()));
    assert_eq!(nodes[4].lookup(test_key()).await, Some(value));
    Ok(())
}

#[tokio::test]
async fn ping_reports_liveness() -> Result<()> {
    let nodes = spawn_network(&test_ids()[..2]).await?;

    assert!(nodes[0].ping(contact(&nodes[1])).await);

    // Nothing listens on port 1; the reply deadline turns this into false.
    let dead = NodeInfo::new(
        XorName::from_content(b"long gone"),
        "127.0.0.1:1".parse()?,
    );
    assert!(!nodes[0].ping(dead).await);
    Ok(())
}

#[tokio::test]
async fn refresh_converges_without_disturbing_the_view() -> Result<()> {
    let nodes = spawn_network(&test_ids()[..3]).await?;
    let before = nodes[1].peer_count();

    nodes[1].refresh().await;

    assert_eq!(nodes[1].peer_count(), before);
    Ok(())
}
