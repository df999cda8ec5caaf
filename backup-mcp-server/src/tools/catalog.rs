//! Fixed table of portal endpoints exposed as tools

use std::sync::Arc;

use rmcp::model::JsonObject;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Single document, no arguments
    Info { path: &'static str },
    /// Paginated collection, takes list arguments
    List { path: &'static str },
    /// One member of a collection, takes `id`
    Get { collection: &'static str },
}

#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ToolKind,
}

pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        name: "get_about",
        description: "Get portal version and installation information",
        kind: ToolKind::Info { path: "/api/v3/about" },
    },
    CatalogEntry {
        name: "list_companies",
        description: "List managed companies (tenants)",
        kind: ToolKind::List { path: "/api/v3/organizations/companies" },
    },
    CatalogEntry {
        name: "get_company",
        description: "Get a managed company by its UID",
        kind: ToolKind::Get { collection: "/api/v3/organizations/companies" },
    },
    CatalogEntry {
        name: "list_resellers",
        description: "List resellers",
        kind: ToolKind::List { path: "/api/v3/organizations/resellers" },
    },
    CatalogEntry {
        name: "list_sites",
        description: "List cloud connect sites",
        kind: ToolKind::List { path: "/api/v3/infrastructure/sites" },
    },
    CatalogEntry {
        name: "list_backup_servers",
        description: "List backup servers connected to the portal",
        kind: ToolKind::List { path: "/api/v3/infrastructure/backupServers" },
    },
    CatalogEntry {
        name: "get_backup_server",
        description: "Get a backup server by its UID",
        kind: ToolKind::Get { collection: "/api/v3/infrastructure/backupServers" },
    },
    CatalogEntry {
        name: "list_backup_jobs",
        description: "List backup jobs across all backup servers, including last run status",
        kind: ToolKind::List { path: "/api/v3/infrastructure/backupServers/jobs" },
    },
    CatalogEntry {
        name: "get_backup_job",
        description: "Get a backup job by its UID",
        kind: ToolKind::Get { collection: "/api/v3/infrastructure/backupServers/jobs" },
    },
    CatalogEntry {
        name: "list_repositories",
        description: "List backup repositories and their capacity",
        kind: ToolKind::List { path: "/api/v3/infrastructure/backupServers/repositories" },
    },
    CatalogEntry {
        name: "list_backup_agents",
        description: "List managed backup agents",
        kind: ToolKind::List { path: "/api/v3/infrastructure/backupAgents" },
    },
    CatalogEntry {
        name: "list_protected_vms",
        description: "List protected virtual machines and their restore points",
        kind: ToolKind::List { path: "/api/v3/protectedWorkloads/virtualMachines" },
    },
    CatalogEntry {
        name: "list_active_alarms",
        description: "List currently active alarms",
        kind: ToolKind::List { path: "/api/v3/alarms/active" },
    },
    CatalogEntry {
        name: "list_license_usage",
        description: "List license usage per company",
        kind: ToolKind::List { path: "/api/v3/licensing/usage/companies" },
    },
];

pub fn find(name: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.name == name)
}

impl CatalogEntry {
    pub fn input_schema(&self) -> Arc<JsonObject> {
        match self.kind {
            ToolKind::Info { .. } => empty_schema(),
            ToolKind::List { .. } => list_schema(),
            ToolKind::Get { .. } => object(json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "string",
                        "minLength": 1,
                        "description": "UID of the resource"
                    }
                },
                "required": ["id"],
                "additionalProperties": false
            })),
        }
    }
}

pub fn empty_schema() -> Arc<JsonObject> {
    object(json!({
        "type": "object",
        "properties": {},
        "additionalProperties": false
    }))
}

fn list_schema() -> Arc<JsonObject> {
    object(json!({
        "type": "object",
        "properties": {
            "offset": {
                "type": "integer",
                "minimum": 0,
                "description": "Number of items to skip"
            },
            "limit": {
                "type": "integer",
                "minimum": 1,
                "maximum": 100,
                "description": "Page size (1-100)"
            },
            "filter": {
                "type": "string",
                "description": "Filter expression in the portal's JSON filter syntax"
            },
            "sort": {
                "type": "string",
                "description": "Sort expression, e.g. [{\"property\":\"name\",\"direction\":\"ascending\"}]"
            },
            "search": {
                "type": "string",
                "description": "Free-text search"
            },
            "all": {
                "type": "boolean",
                "description": "Follow pages and return up to 1000 items as one array"
            }
        },
        "additionalProperties": false
    }))
}

fn object(schema: Value) -> Arc<JsonObject> {
    match schema {
        Value::Object(map) => Arc::new(map),
        _ => Arc::new(JsonObject::new()),
    }
}
