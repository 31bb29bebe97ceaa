//! Operation catalog
//!
//! One `Operation` per administrative capability: the GraphQL document and
//! the name of the single top-level field the client unwraps. Documents
//! take their input as `$data` and are assembled at compile time from
//! shared selection fragments.

/// Whether the document is a query or a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        }
    }
}

/// A fixed GraphQL operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// Top-level field, also used as the metrics/log label
    pub name: &'static str,
    pub kind: OperationKind,
    pub document: &'static str,
    /// Whether the document declares `$data`
    pub takes_input: bool,
}

macro_rules! user_fields {
    () => {
        "id email email_verified given_name family_name middle_name nickname \
         preferred_username picture signup_methods gender birthdate phone_number \
         phone_number_verified roles created_at updated_at \
         is_multi_factor_auth_enabled app_data"
    };
}

macro_rules! pagination_fields {
    () => {
        "pagination { offset total page limit }"
    };
}

macro_rules! webhook_fields {
    () => {
        "id event_name event_description endpoint enabled headers created_at updated_at"
    };
}

macro_rules! webhook_log_fields {
    () => {
        "id http_status request response webhook_id created_at updated_at"
    };
}

macro_rules! email_template_fields {
    () => {
        "id event_name template design subject created_at updated_at"
    };
}

macro_rules! message_fields {
    () => {
        "message"
    };
}

/// `$kind Name($data: InputType) { field(params: $data) { selection } }`
macro_rules! with_input {
    ($kind:literal, $op:literal, $input:literal, $field:literal, $arg:literal, $selection:expr) => {
        concat!(
            $kind, " ", $op, "($data: ", $input, ") { ", $field, "(", $arg,
            ": $data) { ", $selection, " } }"
        )
    };
}

macro_rules! without_input {
    ($kind:literal, $op:literal, $field:literal, $selection:expr) => {
        concat!($kind, " ", $op, " { ", $field, " { ", $selection, " } }")
    };
}

macro_rules! operation {
    (query $name:literal, $doc:expr) => {
        Operation {
            name: $name,
            kind: OperationKind::Query,
            document: $doc,
            takes_input: true,
        }
    };
    (mutation $name:literal, $doc:expr) => {
        Operation {
            name: $name,
            kind: OperationKind::Mutation,
            document: $doc,
            takes_input: true,
        }
    };
    (bare query $name:literal, $doc:expr) => {
        Operation {
            name: $name,
            kind: OperationKind::Query,
            document: $doc,
            takes_input: false,
        }
    };
    (bare mutation $name:literal, $doc:expr) => {
        Operation {
            name: $name,
            kind: OperationKind::Mutation,
            document: $doc,
            takes_input: false,
        }
    };
}

// --- Queries ---

pub const USER: Operation = operation!(
    query "_user",
    with_input!("query", "GetUser", "GetUserRequest!", "_user", "params", user_fields!())
);

pub const USERS: Operation = operation!(
    query "_users",
    with_input!(
        "query", "ListUsers", "PaginatedInput", "_users", "params",
        concat!(pagination_fields!(), " users { ", user_fields!(), " }")
    )
);

pub const VERIFICATION_REQUESTS: Operation = operation!(
    query "_verification_requests",
    with_input!(
        "query", "ListVerificationRequests", "PaginatedInput", "_verification_requests", "params",
        concat!(
            pagination_fields!(),
            " verification_requests { id token email expires identifier }"
        )
    )
);

pub const ADMIN_SESSION: Operation = operation!(
    bare query "_admin_session",
    without_input!("query", "AdminSession", "_admin_session", message_fields!())
);

pub const WEBHOOK: Operation = operation!(
    query "_webhook",
    with_input!("query", "GetWebhook", "WebhookRequest!", "_webhook", "params", webhook_fields!())
);

pub const WEBHOOKS: Operation = operation!(
    query "_webhooks",
    with_input!(
        "query", "ListWebhooks", "PaginatedInput", "_webhooks", "params",
        concat!(pagination_fields!(), " webhooks { ", webhook_fields!(), " }")
    )
);

pub const WEBHOOK_LOGS: Operation = operation!(
    query "_webhook_logs",
    with_input!(
        "query", "ListWebhookLogs", "ListWebhookLogRequest", "_webhook_logs", "params",
        concat!(pagination_fields!(), " webhook_logs { ", webhook_log_fields!(), " }")
    )
);

pub const EMAIL_TEMPLATES: Operation = operation!(
    query "_email_templates",
    with_input!(
        "query", "ListEmailTemplates", "PaginatedInput", "_email_templates", "params",
        concat!(pagination_fields!(), " email_templates { ", email_template_fields!(), " }")
    )
);

/// Field name of the env query. Its selection set is caller-chosen, see
/// [`env_document`].
pub const ENV_FIELD: &str = "_env";

// --- Mutations ---

pub const ADMIN_SIGNUP: Operation = operation!(
    mutation "_admin_signup",
    with_input!("mutation", "AdminSignup", "AdminSignupInput!", "_admin_signup", "params", message_fields!())
);

pub const ADMIN_LOGIN: Operation = operation!(
    mutation "_admin_login",
    with_input!("mutation", "AdminLogin", "AdminLoginInput!", "_admin_login", "params", message_fields!())
);

pub const ADMIN_LOGOUT: Operation = operation!(
    bare mutation "_admin_logout",
    without_input!("mutation", "AdminLogout", "_admin_logout", message_fields!())
);

pub const UPDATE_ENV: Operation = operation!(
    mutation "_update_env",
    with_input!("mutation", "UpdateEnv", "UpdateEnvInput!", "_update_env", "params", message_fields!())
);

pub const UPDATE_USER: Operation = operation!(
    mutation "_update_user",
    with_input!("mutation", "UpdateUser", "UpdateUserInput!", "_update_user", "params", user_fields!())
);

pub const DELETE_USER: Operation = operation!(
    mutation "_delete_user",
    with_input!("mutation", "DeleteUser", "DeleteUserInput!", "_delete_user", "params", message_fields!())
);

pub const INVITE_MEMBERS: Operation = operation!(
    mutation "_invite_members",
    with_input!("mutation", "InviteMembers", "InviteMemberInput!", "_invite_members", "params", message_fields!())
);

// The access mutations name their argument `param`
pub const REVOKE_ACCESS: Operation = operation!(
    mutation "_revoke_access",
    with_input!("mutation", "RevokeAccess", "UpdateAccessInput!", "_revoke_access", "param", message_fields!())
);

pub const ENABLE_ACCESS: Operation = operation!(
    mutation "_enable_access",
    with_input!("mutation", "EnableAccess", "UpdateAccessInput!", "_enable_access", "param", message_fields!())
);

pub const GENERATE_JWT_KEYS: Operation = operation!(
    mutation "_generate_jwt_keys",
    with_input!(
        "mutation", "GenerateJwtKeys", "GenerateJWTKeysInput!", "_generate_jwt_keys", "params",
        "secret public_key private_key"
    )
);

pub const TEST_ENDPOINT: Operation = operation!(
    mutation "_test_endpoint",
    with_input!(
        "mutation", "TestEndpoint", "TestEndpointRequest!", "_test_endpoint", "params",
        "http_status response"
    )
);

pub const ADD_WEBHOOK: Operation = operation!(
    mutation "_add_webhook",
    with_input!("mutation", "AddWebhook", "AddWebhookRequest!", "_add_webhook", "params", message_fields!())
);

pub const UPDATE_WEBHOOK: Operation = operation!(
    mutation "_update_webhook",
    with_input!("mutation", "UpdateWebhook", "UpdateWebhookRequest!", "_update_webhook", "params", message_fields!())
);

pub const DELETE_WEBHOOK: Operation = operation!(
    mutation "_delete_webhook",
    with_input!("mutation", "DeleteWebhook", "WebhookRequest!", "_delete_webhook", "params", message_fields!())
);

pub const ADD_EMAIL_TEMPLATE: Operation = operation!(
    mutation "_add_email_template",
    with_input!(
        "mutation", "AddEmailTemplate", "AddEmailTemplateRequest!", "_add_email_template", "params",
        message_fields!()
    )
);

pub const UPDATE_EMAIL_TEMPLATE: Operation = operation!(
    mutation "_update_email_template",
    with_input!(
        "mutation", "UpdateEmailTemplate", "UpdateEmailTemplateRequest!", "_update_email_template", "params",
        message_fields!()
    )
);

pub const DELETE_EMAIL_TEMPLATE: Operation = operation!(
    mutation "_delete_email_template",
    with_input!(
        "mutation", "DeleteEmailTemplate", "DeleteEmailTemplateRequest!", "_delete_email_template", "params",
        message_fields!()
    )
);

/// Every fixed operation.
pub const ALL: &[Operation] = &[
    USER,
    USERS,
    VERIFICATION_REQUESTS,
    ADMIN_SESSION,
    WEBHOOK,
    WEBHOOKS,
    WEBHOOK_LOGS,
    EMAIL_TEMPLATES,
    ADMIN_SIGNUP,
    ADMIN_LOGIN,
    ADMIN_LOGOUT,
    UPDATE_ENV,
    UPDATE_USER,
    DELETE_USER,
    INVITE_MEMBERS,
    REVOKE_ACCESS,
    ENABLE_ACCESS,
    GENERATE_JWT_KEYS,
    TEST_ENDPOINT,
    ADD_WEBHOOK,
    UPDATE_WEBHOOK,
    DELETE_WEBHOOK,
    ADD_EMAIL_TEMPLATE,
    UPDATE_EMAIL_TEMPLATE,
    DELETE_EMAIL_TEMPLATE,
];

/// Look up an operation by its field name.
pub fn find(name: &str) -> Option<&'static Operation> {
    ALL.iter().find(|op| op.name == name)
}

/// Build the env query selecting `fields`.
///
/// Field names are spliced into the document, so each must be a GraphQL
/// name (`[_A-Za-z][_0-9A-Za-z]*`). Returns the offending name otherwise.
pub fn env_document<S: AsRef<str>>(fields: &[S]) -> Result<String, String> {
    if fields.is_empty() {
        return Err("at least one env field is required".into());
    }
    let mut selection = Vec::with_capacity(fields.len());
    for field in fields {
        let field = field.as_ref();
        if !is_graphql_name(field) {
            return Err(format!("invalid env field name: {field:?}"));
        }
        selection.push(field);
    }
    Ok(format!(
        "query GetEnv {{ {ENV_FIELD} {{ {} }} }}",
        selection.join(" ")
    ))
}

fn is_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
