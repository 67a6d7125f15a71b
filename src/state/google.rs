use serde::{Deserialize, Serialize};

use super::{BoolValue, Metadata, StateNode, StringValue};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleState {
    pub sql: Sql,
}

impl GoogleState {
    pub(crate) fn link(&mut self) {
        for (index, instance) in self.sql.instances.iter_mut().enumerate() {
            instance.link(index);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sql {
    pub instances: Vec<DatabaseInstance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseFamily {
    MySql,
    Postgres,
    SqlServer,
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseInstance {
    pub metadata: Metadata,
    pub name: StringValue,
    /// e.g. `POSTGRES_14`, `SQLSERVER_2017_STANDARD`.
    pub database_version: StringValue,
    pub settings: Settings,
}

impl DatabaseInstance {
    pub fn database_family(&self) -> DatabaseFamily {
        let version = &self.database_version.value;
        if version.starts_with("POSTGRES") {
            DatabaseFamily::Postgres
        } else if version.starts_with("MYSQL") {
            DatabaseFamily::MySql
        } else if version.starts_with("SQLSERVER") {
            DatabaseFamily::SqlServer
        } else {
            DatabaseFamily::Unknown
        }
    }

    fn link(&mut self, index: usize) {
        self.metadata.ensure_reference("google_sql_database_instance", index);
        let parent = self.metadata.clone();
        self.name.link(&parent, "name");
        self.database_version.link(&parent, "database_version");

        let settings = &mut self.settings;
        settings.metadata.inherit(&parent, "settings");
        let settings_meta = settings.metadata.clone();

        settings.flags.metadata.inherit(&settings_meta, "database_flags");
        let flags_meta = settings.flags.metadata.clone();
        settings
            .flags
            .contained_database_authentication
            .link(&flags_meta, "contained_database_authentication");
        settings
            .flags
            .cross_db_ownership_chaining
            .link(&flags_meta, "cross_db_ownership_chaining");

        settings
            .ip_configuration
            .metadata
            .inherit(&settings_meta, "ip_configuration");
        let ip_meta = settings.ip_configuration.metadata.clone();
        settings.ip_configuration.require_tls.link(&ip_meta, "require_ssl");
        settings.ip_configuration.enable_ipv4.link(&ip_meta, "ipv4_enabled");
    }
}

impl StateNode for DatabaseInstance {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub metadata: Metadata,
    pub flags: Flags,
    pub ip_configuration: IpConfiguration,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flags {
    pub metadata: Metadata,
    pub contained_database_authentication: BoolValue,
    pub cross_db_ownership_chaining: BoolValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpConfiguration {
    pub metadata: Metadata,
    pub require_tls: BoolValue,
    pub enable_ipv4: BoolValue,
}
