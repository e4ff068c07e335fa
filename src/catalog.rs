use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::SchemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
        }
    }

    /// Methods that carry a JSON body built from a POST form.
    pub fn is_write(&self) -> bool {
        !matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PATCH" => Ok(Method::Patch),
            other => Err(format!("unsupported method: {}", other)),
        }
    }
}

/// Resources whose writes are model-wrapped and whose list view gets a
/// tickets-over-time chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    TicketLike,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "of", rename_all = "snake_case")]
pub enum FieldType {
    String,
    Boolean,
    Uuid,
    /// ISO 8601 date text; sent exactly as entered.
    Date,
    EnumOf(Vec<String>),
    ArrayOfUuid,
    ArrayOfString,
    Nested(Vec<FieldSpec>),
}

impl FieldType {
    pub fn is_array(&self) -> bool {
        matches!(self, FieldType::ArrayOfUuid | FieldType::ArrayOfString)
    }

    pub fn label(&self) -> String {
        match self {
            FieldType::String => "string".to_string(),
            FieldType::Boolean => "boolean".to_string(),
            FieldType::Uuid => "UUID".to_string(),
            FieldType::Date => "string (ISO 8601 date)".to_string(),
            FieldType::EnumOf(values) => format!("enum ({})", values.join(", ")),
            FieldType::ArrayOfUuid => "array of UUIDs".to_string(),
            FieldType::ArrayOfString => "array of strings".to_string(),
            FieldType::Nested(_) => "object".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    /// Advisory text such as "Required for Zendesk". Never enforced.
    pub note: Option<String>,
}

impl FieldSpec {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            note: None,
        }
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    pub fn sub_fields(&self) -> Option<&[FieldSpec]> {
        match &self.field_type {
            FieldType::Nested(fields) => Some(fields),
            _ => None,
        }
    }

    /// Whether the advisory note lists `integration` (or every integration).
    ///
    /// A listed name also covers integrations it prefixes, so "Zoho" marks
    /// both "Zoho Desk" and "Zoho BugTracker".
    pub fn required_for(&self, integration: &str) -> bool {
        let Some(note) = &self.note else {
            return false;
        };
        let Some(names) = note.strip_prefix("Required for ") else {
            return false;
        };
        if names == "all integrations" {
            return true;
        }
        names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .any(|name| integration == name || integration.starts_with(&format!("{} ", name)))
    }

    pub fn title(&self) -> String {
        title_case(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSchema {
    pub name: String,
    pub description: String,
    pub kind: ResourceKind,
    pub methods: Vec<Method>,
    pub paths: Vec<String>,
    pub post_fields: Option<Vec<FieldSpec>>,
}

impl ResourceSchema {
    pub fn supports(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }

    /// The collection endpoint, always the first declared path.
    pub fn list_path(&self) -> &str {
        &self.paths[0]
    }

    pub fn post_field(&self, name: &str) -> Option<&FieldSpec> {
        self.post_fields
            .as_ref()
            .and_then(|fields| fields.iter().find(|f| f.name == name))
    }

    /// Filters accepted by GET endpoints; empty for write-only resources.
    pub fn query_params(&self) -> &'static [QueryParamSpec] {
        if self.supports(Method::Get) {
            common_query_params()
        } else {
            &[]
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub description: String,
    pub resources: Vec<ResourceSchema>,
}

impl Category {
    pub fn resource(&self, name: &str) -> Result<&ResourceSchema, SchemaError> {
        self.resources
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| SchemaError::ResourceNotFound {
                category: self.name.clone(),
                resource: name.to_string(),
            })
    }

    pub fn is_available(&self) -> bool {
        !self.resources.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<Category>,
}

impl Catalog {
    pub fn category(&self, name: &str) -> Result<&Category, SchemaError> {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| SchemaError::CategoryNotFound(name.to_string()))
    }

    pub fn resource(&self, category: &str, name: &str) -> Result<&ResourceSchema, SchemaError> {
        self.category(category)?.resource(name)
    }

    /// Finds the resource whose path templates include one matching `path`.
    pub fn resource_for_path(
        &self,
        category: &str,
        path: &str,
    ) -> Result<&ResourceSchema, SchemaError> {
        self.category(category)?
            .resources
            .iter()
            .find(|r| r.paths.iter().any(|template| path_matches(template, path)))
            .ok_or_else(|| SchemaError::PathNotFound(path.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamKind {
    DateTime,
    Boolean,
    Integer,
    String,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ParamKind::DateTime => "DateTime (ISO 8601)",
            ParamKind::Boolean => "Boolean",
            ParamKind::Integer => "Integer",
            ParamKind::String => "String",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
    pub description: String,
}

impl QueryParamSpec {
    pub fn title(&self) -> String {
        title_case(&self.name)
    }
}

/// Integrations offered in the tickets form; only used to highlight the
/// advisory "Required for …" notes.
pub const TICKET_INTEGRATIONS: [&str; 7] = [
    "Teamwork",
    "Trello",
    "Wrike",
    "Zendesk",
    "Zoho Desk",
    "Zoho BugTracker",
    "SpotDraft",
];

pub const TICKET_STATUSES: [&str; 4] = ["OPEN", "CLOSED", "IN_PROGRESS", "ON_HOLD"];
pub const TICKET_PRIORITIES: [&str; 4] = ["URGENT", "HIGH", "NORMAL", "LOW"];

pub fn get_catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

pub fn common_query_params() -> &'static [QueryParamSpec] {
    static PARAMS: OnceLock<Vec<QueryParamSpec>> = OnceLock::new();
    PARAMS.get_or_init(build_query_params)
}

/// Names of the `{placeholder}` segments in a path template, in order.
pub fn path_placeholders(template: &str) -> Vec<String> {
    template
        .split('/')
        .filter_map(|segment| segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
        .map(str::to_string)
        .collect()
}

/// Substitutes every `{placeholder}` segment. Unknown placeholders stay as-is.
pub fn fill_path(template: &str, values: &BTreeMap<String, String>) -> String {
    template
        .split('/')
        .map(|segment| {
            segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .and_then(|name| values.get(name))
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| segment.to_string())
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn path_matches(template: &str, path: &str) -> bool {
    let path = path.split('?').next().unwrap_or(path);
    let t: Vec<&str> = template.trim_end_matches('/').split('/').collect();
    let p: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    t.len() == p.len()
        && t.iter().zip(&p).all(|(ts, ps)| {
            (ts.starts_with('{') && ts.ends_with('}') && !ps.is_empty()) || ts == ps
        })
}

fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn enum_of(values: &[&str]) -> FieldType {
    FieldType::EnumOf(values.iter().map(|v| v.to_string()).collect())
}

fn read_only(name: &str, description: &str, paths: &[&str]) -> ResourceSchema {
    ResourceSchema {
        name: name.to_string(),
        description: description.to_string(),
        kind: ResourceKind::Other,
        methods: vec![Method::Get],
        paths: paths.iter().map(|p| p.to_string()).collect(),
        post_fields: None,
    }
}

fn writable(
    name: &str,
    description: &str,
    methods: &[Method],
    paths: &[&str],
    fields: Vec<FieldSpec>,
) -> ResourceSchema {
    ResourceSchema {
        name: name.to_string(),
        description: description.to_string(),
        kind: ResourceKind::Other,
        methods: methods.to_vec(),
        paths: paths.iter().map(|p| p.to_string()).collect(),
        post_fields: Some(fields),
    }
}

fn placeholder_category(name: &str, description: &str) -> Category {
    Category {
        name: name.to_string(),
        description: description.to_string(),
        resources: vec![],
    }
}

fn build_catalog() -> Catalog {
    use FieldType::*;

    let mut tickets = writable(
        "tickets",
        "Manage tickets",
        &[Method::Get, Method::Post, Method::Patch],
        &[
            "/tickets",
            "/tickets/{id}",
            "/tickets/{ticket_id}/viewers",
            "/tickets/meta/patch/{id}",
            "/tickets/meta/post",
            "/tickets/remote-field-classes",
        ],
        vec![
            FieldSpec::new("name", String).with_note("Required for most integrations"),
            FieldSpec::new("description", String).with_note("Required for Zendesk"),
            FieldSpec::new("status", enum_of(&TICKET_STATUSES)),
            FieldSpec::new("priority", enum_of(&TICKET_PRIORITIES)),
            FieldSpec::new("due_date", Date),
            FieldSpec::new("assignees", ArrayOfUuid),
            FieldSpec::new("collections", ArrayOfUuid)
                .with_note("Required for Teamwork, Trello, Wrike, Zoho"),
            FieldSpec::new("ticket_type", String),
            FieldSpec::new("account", Uuid),
            FieldSpec::new("contact", Uuid).with_note("Required for Zoho Desk"),
            FieldSpec::new("creator", Uuid),
            FieldSpec::new("parent_ticket", Uuid),
            FieldSpec::new("remote_id", String),
            FieldSpec::new("remote_created_at", Date),
            FieldSpec::new("remote_updated_at", Date),
            FieldSpec::new("ticket_url", String),
            FieldSpec::new("tags", ArrayOfString),
            FieldSpec::new(
                "integration_params",
                Nested(vec![
                    FieldSpec::new("counter_party_email", String)
                        .with_note("Required for SpotDraft"),
                    FieldSpec::new("counter_party_first_name", String)
                        .with_note("Required for SpotDraft"),
                    FieldSpec::new("counter_party_last_name", String)
                        .with_note("Required for SpotDraft"),
                    FieldSpec::new("template_remote_id", String)
                        .with_note("Required for SpotDraft"),
                    FieldSpec::new("department_id", String).with_note("Required for Zoho Desk"),
                ]),
            ),
            FieldSpec::new(
                "remote_fields",
                Nested(vec![
                    FieldSpec::new("remote_field_class", String)
                        .with_note("Required for all integrations"),
                    FieldSpec::new("value", String).with_note("Required for most integrations"),
                ]),
            ),
        ],
    );
    tickets.kind = ResourceKind::TicketLike;

    let ticketing = Category {
        name: "Ticketing".to_string(),
        description: "Welcome to the Merge Ticketing (TCKT) API explorer! Enter your Merge API key \
                      and access token of the linked account to check the response of Merge's \
                      unified API endpoints."
            .to_string(),
        resources: vec![
            read_only(
                "accounts",
                "Retrieve accounts information",
                &["/accounts", "/accounts/{id}"],
            ),
            writable(
                "attachments",
                "Manage ticket attachments",
                &[Method::Get, Method::Post],
                &[
                    "/attachments",
                    "/attachments/{id}",
                    "/attachments/{id}/download",
                    "/attachments/meta/post",
                ],
                vec![
                    FieldSpec::new("file_name", String),
                    FieldSpec::new("file_url", String),
                    FieldSpec::new("ticket", Uuid),
                    FieldSpec::new("content_type", String),
                ],
            ),
            read_only(
                "collections",
                "Manage collections of tickets",
                &["/collections", "/collections/{id}", "/collections/{collection_id}/viewers"],
            ),
            writable(
                "comments",
                "Manage ticket comments",
                &[Method::Get, Method::Post],
                &["/comments", "/comments/{id}", "/comments/meta/post"],
                vec![
                    FieldSpec::new("body", String),
                    FieldSpec::new("html_body", String),
                    FieldSpec::new("is_private", Boolean),
                    FieldSpec::new("ticket", Uuid),
                    FieldSpec::new("user", Uuid),
                ],
            ),
            writable(
                "contacts",
                "Manage contacts",
                &[Method::Get, Method::Post],
                &["/contacts", "/contacts/{id}", "/contacts/meta/post"],
                vec![
                    FieldSpec::new("name", String),
                    FieldSpec::new("email_address", String),
                    FieldSpec::new("phone_number", String),
                    FieldSpec::new("details", String),
                ],
            ),
            read_only("roles", "Manage user roles", &["/roles", "/roles/{id}"]),
            read_only("tags", "Manage tags", &["/tags", "/tags/{id}"]),
            read_only("teams", "Manage teams", &["/teams", "/teams/{id}"]),
            tickets,
            read_only("users", "Manage users", &["/users", "/users/{id}"]),
        ],
    };

    Catalog {
        categories: vec![
            placeholder_category("HRIS", "HR, Payroll, and Directory"),
            placeholder_category("ATS", "Recruiting"),
            placeholder_category("Accounting", "Accounting and Finance"),
            ticketing,
            placeholder_category("CRM", "Customer Relationship Management"),
            placeholder_category("File Storage", "File Storage and Management"),
        ],
    }
}

fn build_query_params() -> Vec<QueryParamSpec> {
    let param = |name: &str, kind: ParamKind, description: &str| QueryParamSpec {
        name: name.to_string(),
        kind,
        required: false,
        description: description.to_string(),
    };

    vec![
        param(
            "created_after",
            ParamKind::DateTime,
            "If provided, will only return objects created after this datetime.",
        ),
        param(
            "created_before",
            ParamKind::DateTime,
            "If provided, will only return objects created before this datetime.",
        ),
        param("cursor", ParamKind::String, "The pagination cursor value."),
        param(
            "include_deleted_data",
            ParamKind::Boolean,
            "Indicates whether or not this object has been deleted in the third party platform. Full coverage deletion detection is a premium add-on. Native deletion detection is offered for free with limited coverage.",
        ),
        param(
            "include_remote_data",
            ParamKind::Boolean,
            "Whether to include the original data Merge fetched from the third-party to produce these models.",
        ),
        param(
            "include_shell_data",
            ParamKind::Boolean,
            "Whether to include shell records. Shell records are empty records (they may contain some metadata but all other fields are null).",
        ),
        param(
            "modified_after",
            ParamKind::DateTime,
            "If provided, only objects synced by Merge after this date time will be returned.",
        ),
        param(
            "modified_before",
            ParamKind::DateTime,
            "If provided, only objects synced by Merge before this date time will be returned.",
        ),
        param("page_size", ParamKind::Integer, "Number of results to return per page."),
        param("remote_id", ParamKind::String, "The API provider's ID for the given object."),
    ]
}
