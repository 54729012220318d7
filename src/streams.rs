//! Turso platform API streams
//!
//! Organizations are the root of the tree: groups, databases and audit logs
//! are listed once per organization, keyed by its slug. Locations stand
//! alone.

use crate::decode::RecordSelector;
use crate::error::Result;
use crate::pagination::{PaginationConfig, StopCondition};
use crate::schema::{JsonSchema, SchemaProperty};
use crate::stream::{ChildContextRule, StreamDefinition, StreamRegistry};

pub const ORGANIZATIONS: &str = "organizations";
pub const GROUPS: &str = "groups";
pub const DATABASES: &str = "databases";
pub const LOCATIONS: &str = "locations";
pub const AUDIT_LOGS: &str = "audit_logs";

/// Page size requested from paginated endpoints
pub const PAGE_SIZE: u32 = 500;

/// Every stream, in sync order
pub fn all_streams() -> Vec<StreamDefinition> {
    vec![
        organizations(),
        groups(),
        databases(),
        locations(),
        audit_logs(),
    ]
}

/// Validated registry of every stream
pub fn registry() -> Result<StreamRegistry> {
    StreamRegistry::new(all_streams())
}

fn organizations() -> StreamDefinition {
    StreamDefinition::new(ORGANIZATIONS, "/v1/organizations")
        .primary_key("slug")
        .child_context(ChildContextRule::new().field("slug", "organization_name"))
        .schema(
            JsonSchema::new()
                .property("blocked_reads", SchemaProperty::boolean())
                .property("blocked_writes", SchemaProperty::boolean())
                .property("name", SchemaProperty::string())
                .property("overages", SchemaProperty::boolean())
                .property("slug", SchemaProperty::string())
                .property(
                    "type",
                    SchemaProperty::string().with_enum(["personal", "team"]),
                )
                .property("plan_id", SchemaProperty::string())
                .property("plan_timeline", SchemaProperty::string())
                .property("memory", SchemaProperty::integer()),
        )
}

fn groups() -> StreamDefinition {
    StreamDefinition::new(GROUPS, "/v1/organizations/{organization_name}/groups")
        .parent(ORGANIZATIONS)
        .primary_key("uuid")
        .selector(RecordSelector::json_path("$.groups[*]"))
        .schema(
            JsonSchema::new()
                .property("archived", SchemaProperty::boolean())
                .property("locations", SchemaProperty::array(SchemaProperty::string()))
                .property("name", SchemaProperty::string())
                .property("primary", SchemaProperty::string())
                .property("uuid", SchemaProperty::string().with_format("uuid"))
                .property("organization_name", SchemaProperty::string()),
        )
}

fn databases() -> StreamDefinition {
    StreamDefinition::new(DATABASES, "/v1/organizations/{organization_name}/databases")
        .parent(ORGANIZATIONS)
        .primary_key("DbId")
        .selector(RecordSelector::json_path("$.databases[*]"))
        .schema(
            JsonSchema::new()
                .property("DbId", SchemaProperty::string())
                .property("Hostname", SchemaProperty::string())
                .property("hostname", SchemaProperty::string())
                .property("Name", SchemaProperty::string())
                .property("group", SchemaProperty::string())
                .property("primaryRegion", SchemaProperty::string())
                .property("regions", SchemaProperty::array(SchemaProperty::string()))
                .property("type", SchemaProperty::string())
                .property("version", SchemaProperty::string())
                .property("sleeping", SchemaProperty::boolean())
                .property("organization_name", SchemaProperty::string()),
        )
}

fn locations() -> StreamDefinition {
    StreamDefinition::new(LOCATIONS, "/v1/locations")
        .primary_key("code")
        .selector(RecordSelector::key_value("locations", "code", "name"))
        .schema(
            JsonSchema::new()
                .property("name", SchemaProperty::string())
                .property("code", SchemaProperty::string()),
        )
}

fn audit_logs() -> StreamDefinition {
    StreamDefinition::new(
        AUDIT_LOGS,
        "/v1/organizations/{organization_name}/audit-logs",
    )
    .parent(ORGANIZATIONS)
    .replication_key("created_at")
    .selector(RecordSelector::json_path("$.audit_logs[*]"))
    .pagination(
        PaginationConfig::page_number("page", 1)
            .with_page_size("page_size", PAGE_SIZE)
            .with_stop_condition(StopCondition::total_pages("pagination.total_pages")),
    )
    .schema(
        JsonSchema::new()
            .property("code", SchemaProperty::string())
            .property("message", SchemaProperty::string())
            .property("origin", SchemaProperty::string())
            .property("author", SchemaProperty::string())
            .property("created_at", SchemaProperty::string().with_format("date-time"))
            .property("data", SchemaProperty::object())
            .property("organization_name", SchemaProperty::string()),
    )
}
