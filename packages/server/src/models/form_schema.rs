use serde::Serialize;

use crate::probes::{SLUG_ANTHROPIC, SLUG_DEEPGRAM, SLUG_GEMINI, SLUG_OPENAI};

/// One input field the credential dialog should render.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, utoipa::ToSchema)]
pub struct FormField {
    /// Key under which the value is stored in the secret map.
    #[schema(example = "api_key")]
    pub name: &'static str,
    #[schema(example = "API key")]
    pub label: &'static str,
    /// Input widget type: `password` or `text`.
    #[schema(example = "password")]
    pub field_type: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    /// Client-side validation regex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<&'static str>,
}

impl FormField {
    const fn password(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            field_type: "password",
            required: true,
            placeholder: None,
            pattern: None,
        }
    }

    const fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            field_type: "text",
            required: false,
            placeholder: None,
            pattern: None,
        }
    }

    const fn with_placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    const fn with_pattern(mut self, pattern: &'static str) -> Self {
        self.pattern = Some(pattern);
        self
    }
}

/// Field descriptors for a catalogued integration. Unknown slugs fall back
/// to a single generic API-key field.
pub fn fields_for(slug: &str) -> Vec<FormField> {
    match slug {
        SLUG_OPENAI => vec![
            FormField::password("api_key", "API key")
                .with_placeholder("sk-...")
                .with_pattern(r"^sk-[A-Za-z0-9_-]{20,}$"),
            FormField::text("org_id", "Organization ID").with_placeholder("org-..."),
        ],
        SLUG_ANTHROPIC => vec![
            FormField::password("api_key", "API key")
                .with_placeholder("sk-ant-...")
                .with_pattern(r"^sk-ant-[A-Za-z0-9_-]{20,}$"),
        ],
        SLUG_DEEPGRAM => vec![
            FormField::password("api_key", "API key").with_pattern(r"^[a-f0-9]{40}$"),
        ],
        SLUG_GEMINI => vec![
            FormField::password("api_key", "API key")
                .with_placeholder("AIza...")
                .with_pattern(r"^AIza[A-Za-z0-9_-]{35}$"),
        ],
        _ => vec![FormField::password("api_key", "API key")],
    }
}

/// Form schema for one integration.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FormSchemaResponse {
    #[schema(example = "openai")]
    pub slug: String,
    pub fields: Vec<FormField>,
}
