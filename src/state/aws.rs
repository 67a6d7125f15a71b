use serde::{Deserialize, Serialize};

use super::{BoolValue, Metadata, StateNode, StringValue};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsState {
    pub s3: S3,
}

impl AwsState {
    pub(crate) fn link(&mut self) {
        for (index, bucket) in self.s3.buckets.iter_mut().enumerate() {
            bucket.link(index);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3 {
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bucket {
    pub metadata: Metadata,
    pub name: StringValue,
    pub acl: StringValue,
    pub encryption: Encryption,
    /// `None` when no public access block is attached to the bucket.
    pub public_access_block: Option<PublicAccessBlock>,
}

impl Bucket {
    fn link(&mut self, index: usize) {
        self.metadata.ensure_reference("aws_s3_bucket", index);
        let parent = self.metadata.clone();
        self.name.link(&parent, "bucket");
        self.acl.link(&parent, "acl");
        self.encryption.metadata.inherit(&parent, "server_side_encryption_configuration");
        let encryption = self.encryption.metadata.clone();
        self.encryption.enabled.link(&encryption, "enabled");
        self.encryption.algorithm.link(&encryption, "sse_algorithm");
        if let Some(block) = &mut self.public_access_block {
            block.metadata.inherit(&parent, "public_access_block");
            let block_meta = block.metadata.clone();
            block.block_public_acls.link(&block_meta, "block_public_acls");
            block.block_public_policy.link(&block_meta, "block_public_policy");
        }
    }
}

impl StateNode for Bucket {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Encryption {
    pub metadata: Metadata,
    pub enabled: BoolValue,
    pub algorithm: StringValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicAccessBlock {
    pub metadata: Metadata,
    pub block_public_acls: BoolValue,
    pub block_public_policy: BoolValue,
}

impl StateNode for PublicAccessBlock {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}
