use serde::{Deserialize, Serialize};

use super::{Metadata, StateNode, StringValue};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NifcloudState {
    pub computing: Computing,
}

impl NifcloudState {
    pub(crate) fn link(&mut self) {
        for (index, group) in self.computing.security_groups.iter_mut().enumerate() {
            group.metadata.ensure_reference("nifcloud_security_group", index);
            let parent = group.metadata.clone();
            group.name.link(&parent, "group_name");
            group.description.link(&parent, "description");
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Computing {
    pub security_groups: Vec<SecurityGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityGroup {
    pub metadata: Metadata,
    pub name: StringValue,
    pub description: StringValue,
}

impl StateNode for SecurityGroup {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}
