//! The tabbed tools dashboard: a fixed list of list endpoints, plus short
//! create forms for tickets, comments and attachments.

use serde_json::Value;

use crate::catalog::{Catalog, FieldSpec, ResourceSchema};
use crate::error::SchemaError;
use crate::payload::{build_fields, Envelope, FieldValues};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    pub name: &'static str,
    pub resource: &'static str,
    pub endpoint: &'static str,
    pub icon: &'static str,
}

pub static TOOLS: [Tool; 8] = [
    Tool {
        name: "Tickets",
        resource: "tickets",
        endpoint: "/tickets",
        icon: "🎫",
    },
    Tool {
        name: "Comments",
        resource: "comments",
        endpoint: "/comments",
        icon: "💬",
    },
    Tool {
        name: "Attachments",
        resource: "attachments",
        endpoint: "/attachments",
        icon: "📎",
    },
    Tool {
        name: "Collections",
        resource: "collections",
        endpoint: "/collections",
        icon: "🗂️",
    },
    Tool {
        name: "Users",
        resource: "users",
        endpoint: "/users",
        icon: "👤",
    },
    Tool {
        name: "Teams",
        resource: "teams",
        endpoint: "/teams",
        icon: "👥",
    },
    Tool {
        name: "Roles",
        resource: "roles",
        endpoint: "/roles",
        icon: "🛡️",
    },
    Tool {
        name: "Tags",
        resource: "tags",
        endpoint: "/tags",
        icon: "🏷️",
    },
];

impl Tool {
    pub fn label(&self) -> String {
        format!("{} {}", self.icon, self.name)
    }

    pub fn schema<'a>(&self, catalog: &'a Catalog) -> Result<&'a ResourceSchema, SchemaError> {
        catalog.resource("Ticketing", self.resource)
    }

    pub fn create_form(&self) -> Option<CreateForm> {
        match self.resource {
            "tickets" => Some(CreateForm::Ticket),
            "comments" => Some(CreateForm::Comment),
            "attachments" => Some(CreateForm::Attachment),
            _ => None,
        }
    }
}

/// A reduced create form. Unlike the explorer, every body built here is
/// sent inside the `model` envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateForm {
    Ticket,
    Comment,
    Attachment,
}

impl CreateForm {
    pub fn title(&self) -> &'static str {
        match self {
            CreateForm::Ticket => "Create Ticket",
            CreateForm::Comment => "Create Comment",
            CreateForm::Attachment => "Create Attachment",
        }
    }

    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            CreateForm::Ticket => &["name", "status", "priority", "collections"],
            CreateForm::Comment => &["body", "ticket"],
            CreateForm::Attachment => &["file_name", "file_url", "ticket", "content_type"],
        }
    }

    /// Prefilled value shown in the prompt.
    pub fn default_for(&self, field: &str) -> Option<&'static str> {
        match (self, field) {
            (CreateForm::Ticket, "name") => Some("My Ticket"),
            _ => None,
        }
    }

    /// The subset of `schema`'s POST fields this form asks for, in form order.
    pub fn fields(&self, schema: &ResourceSchema) -> Vec<FieldSpec> {
        self.field_names()
            .iter()
            .filter_map(|name| schema.post_field(name).cloned())
            .collect()
    }

    pub fn build(&self, schema: &ResourceSchema, values: &FieldValues) -> Value {
        Envelope::Model.apply(build_fields(&self.fields(schema), values))
    }
}
