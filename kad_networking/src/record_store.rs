// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use bytes::Bytes;
use std::collections::HashMap;
use xor_name::XorName;

/// In-memory store of the values this node holds on behalf of the network.
///
/// Owned by the driver task, which is the only writer and reader, so no
/// locking. A re-store under the same key overwrites.
#[derive(Default)]
pub(crate) struct RecordStore {
    records: HashMap<XorName, Bytes>,
}

impl RecordStore {
    pub fn put(&mut self, key: XorName, value: Bytes) {
        trace!("Storing {} bytes under {key:?}", value.len());
        let _ = self.records.insert(key, value);
    }

    pub fn get(&self, key: &XorName) -> Option<Bytes> {
        self.records.get(key).cloned()
    }
}
