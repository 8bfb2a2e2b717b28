// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{sort_nodes_by_distance, BUCKET_SIZE};
use itertools::Itertools;
use kad_protocol::{NodeInfo, XorName, XOR_NAME_LEN};
use parking_lot::Mutex;

const BUCKET_COUNT: usize = XOR_NAME_LEN * 8;

/// The node's view of the network, bucketed by the length of the prefix an
/// id shares with our own.
///
/// Shared between the driver task and every in-flight lookup; mutations are
/// serialised behind the internal lock. Buckets never split and a full
/// bucket simply drops newcomers; stale entries leave when a lookup evicts
/// them after repeated timeouts.
pub(crate) struct RoutingTable {
    our_id: XorName,
    buckets: Mutex<Vec<Vec<NodeInfo>>>,
}

impl RoutingTable {
    pub fn new(our_id: XorName) -> Self {
        Self {
            our_id,
            buckets: Mutex::new(vec![Vec::new(); BUCKET_COUNT]),
        }
    }

    pub fn our_id(&self) -> XorName {
        self.our_id
    }

    /// Add `node`, or refresh it when already present: the stored address is
    /// updated and the entry moves to the bucket tail as the most recently
    /// seen peer.
    pub fn insert(&self, node: NodeInfo) {
        if node.id == self.our_id {
            return;
        }
        let index = self.bucket_index(&node.id);
        let mut buckets = self.buckets.lock();
        let bucket = &mut buckets[index];
        if let Some(position) = bucket.iter().position(|entry| entry.id == node.id) {
            let _ = bucket.remove(position);
            bucket.push(node);
        } else if bucket.len() < BUCKET_SIZE {
            bucket.push(node);
        } else {
            trace!("Bucket {index} full, not keeping {node}");
        }
    }

    pub fn remove(&self, id: &XorName) {
        let index = self.bucket_index(id);
        let mut buckets = self.buckets.lock();
        buckets[index].retain(|entry| entry.id != *id);
    }

    /// Up to `n` known peers, ascending by distance to `target`.
    pub fn closest(&self, target: &XorName, n: usize) -> Vec<NodeInfo> {
        let nodes = {
            let buckets = self.buckets.lock();
            buckets.iter().flatten().cloned().collect_vec()
        };
        let mut sorted = sort_nodes_by_distance(nodes, target);
        sorted.truncate(n);
        sorted
    }

    pub fn peer_count(&self) -> usize {
        self.buckets.lock().iter().map(Vec::len).sum()
    }

    fn bucket_index(&self, id: &XorName) -> usize {
        let common_prefix = (0..BUCKET_COUNT)
            .take_while(|&i| self.our_id.bit(i as u8) == id.bit(i as u8))
            .count();
        common_prefix.min(BUCKET_COUNT - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn our_id() -> XorName {
        XorName([0u8; 32])
    }

    fn node(byte: u8) -> NodeInfo {
        let mut bytes = [0u8; 32];
        bytes[31] = byte;
        NodeInfo::new(
            XorName(bytes),
            ([127, 0, 0, 1], 5483 + u16::from(byte)).into(),
        )
    }

    #[test]
    fn own_id_is_never_stored() {
        let table = RoutingTable::new(our_id());
        table.insert(NodeInfo::new(our_id(), "127.0.0.1:5483".parse().expect("valid addr")));
        assert_eq!(table.peer_count(), 0);
    }

    #[test]
    fn reinsertion_refreshes_the_address() {
        let table = RoutingTable::new(our_id());
        table.insert(node(1));

        let moved = NodeInfo::new(node(1).id, "127.0.0.1:9999".parse().expect("valid addr"));
        table.insert(moved.clone());

        assert_eq!(table.peer_count(), 1);
        let closest = table.closest(&node(1).id, 1);
        assert_eq!(closest[0].addr, moved.addr);
    }

    #[test]
    fn closest_is_ascending_by_distance() {
        let table = RoutingTable::new(our_id());
        for byte in [12, 4, 7] {
            table.insert(node(byte));
        }

        // target 5: d(4)=1, d(7)=2, d(12)=9
        let closest = table.closest(&node(5).id, 2);
        let ids: Vec<u8> = closest.iter().map(|n| n.id.0[31]).collect();
        assert_eq!(ids, vec![4, 7]);
    }

    #[test]
    fn a_full_bucket_drops_newcomers() {
        let table = RoutingTable::new(our_id());
        // Ids 128..=134 all share exactly 248 leading bits with our zero id,
        // so they land in the same bucket.
        for byte in 128..128 + BUCKET_SIZE as u8 {
            table.insert(node(byte));
        }
        assert_eq!(table.peer_count(), BUCKET_SIZE);

        table.insert(node(200));
        assert_eq!(table.peer_count(), BUCKET_SIZE);
        assert!(table
            .closest(&node(200).id, BUCKET_SIZE + 1)
            .iter()
            .all(|n| n.id != node(200).id));
    }

    #[test]
    fn removal_frees_the_slot() {
        let table = RoutingTable::new(our_id());
        table.insert(node(1));
        table.insert(node(2));

        table.remove(&node(1).id);
        assert_eq!(table.peer_count(), 1);
        assert_eq!(table.closest(&node(1).id, 2).len(), 1);
    }
}
