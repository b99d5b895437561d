//! Results returned by write mutators.
//!
//! Mutations never throw at their callers: every failure is a value carrying a
//! stable code (`UNAUTHORIZED`, `INVALID_STATUS`, ...) and, for validation
//! failures, the offending fields.

use std::str::FromStr;

use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use url::Url;
use uuid::Uuid;

use crate::application::repos::RepoError;
use crate::domain::entities::UserRecord;
use crate::domain::slug::SlugError;
use crate::domain::types::{UnknownLabel, UserRole};

/// The authenticated user performing a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn from_user(user: &UserRecord) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Whether the actor may modify a record owned by `owner`.
    pub fn can_edit(&self, owner: Uuid) -> bool {
        self.is_admin() || self.user_id == owner
    }
}

/// Reject anonymous callers.
pub fn require_actor(actor: Option<&Actor>) -> Result<&Actor, ActionError> {
    actor.ok_or(ActionError::Unauthorized)
}

/// Reject anonymous and non-admin callers.
pub fn require_admin(actor: Option<&Actor>) -> Result<&Actor, ActionError> {
    let actor = require_actor(actor)?;
    if actor.is_admin() {
        Ok(actor)
    } else {
        Err(ActionError::Unauthorized)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid status: {0}")]
    InvalidStatus(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldIssue>),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Repo(RepoError),
}

impl ActionError {
    pub fn code(&self) -> &'static str {
        match self {
            ActionError::Unauthorized => "UNAUTHORIZED",
            ActionError::InvalidStatus(_) => "INVALID_STATUS",
            ActionError::InvalidData(_) => "INVALID_DATA",
            ActionError::Validation(_) => "VALIDATION",
            ActionError::NotFound(_) => "NOT_FOUND",
            ActionError::Repo(_) => "INTERNAL",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ActionError::Unauthorized => StatusCode::UNAUTHORIZED,
            ActionError::InvalidStatus(_) | ActionError::InvalidData(_) => StatusCode::BAD_REQUEST,
            ActionError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ActionError::NotFound(_) => StatusCode::NOT_FOUND,
            ActionError::Repo(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ActionError::Validation(vec![FieldIssue::new(field, message)])
    }

    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            ActionError::Validation(issues) => issues,
            _ => &[],
        }
    }
}

impl From<RepoError> for ActionError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate { constraint } if constraint.contains("user") => {
                ActionError::field("user_id", "a record already exists for this user")
            }
            RepoError::Duplicate { .. } => {
                ActionError::field("slug", "a record with this slug already exists")
            }
            RepoError::NotFound => ActionError::NotFound("record"),
            RepoError::InvalidInput { message } => ActionError::InvalidData(message),
            other => {
                error!(
                    target = "pemuda::application::actions",
                    error = %other,
                    "mutation failed in storage"
                );
                ActionError::Repo(other)
            }
        }
    }
}

impl From<UnknownLabel> for ActionError {
    fn from(err: UnknownLabel) -> Self {
        ActionError::InvalidStatus(err.value)
    }
}

/// Wire shape of a mutation result.
#[derive(Debug, Serialize)]
pub struct ActionOutcome<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<FieldIssue>,
}

impl<T> From<Result<T, ActionError>> for ActionOutcome<T> {
    fn from(result: Result<T, ActionError>) -> Self {
        match result {
            Ok(data) => Self {
                ok: true,
                data: Some(data),
                error: None,
                issues: Vec::new(),
            },
            Err(err) => Self {
                ok: false,
                data: None,
                error: Some(err.code()),
                issues: err.issues().to_vec(),
            },
        }
    }
}

/// Parse a status label, mapping non-members to `INVALID_STATUS`.
pub fn parse_status<S>(raw: &str) -> Result<S, ActionError>
where
    S: FromStr<Err = UnknownLabel>,
{
    raw.trim().parse::<S>().map_err(ActionError::from)
}

/// Parse an optional status label; blank counts as absent.
pub fn parse_requested_status<S>(raw: Option<&str>) -> Result<Option<S>, ActionError>
where
    S: FromStr<Err = UnknownLabel>,
{
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(parse_status)
        .transpose()
}

/// Status written by a save. `kept` is the stored status on update and the
/// initial status on create. Only admins may move a record away from it;
/// status changes otherwise go through the moderation setters.
pub fn permitted_status<S>(actor: &Actor, requested: Option<S>, kept: S) -> Result<S, ActionError>
where
    S: Copy + PartialEq,
{
    match requested {
        None => Ok(kept),
        Some(status) if status == kept || actor.is_admin() => Ok(status),
        Some(_) => Err(ActionError::Unauthorized),
    }
}

pub fn parse_id(raw: &str) -> Result<Uuid, ActionError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ActionError::InvalidData(format!("`{raw}` is not a valid identifier")))
}

/// Update target of a save: `Some` when the input carries a non-empty id.
pub fn target_id(raw: Option<&str>) -> Result<Option<Uuid>, ActionError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_id(value).map(Some),
        None => Ok(None),
    }
}

pub fn optional_id(raw: Option<&str>) -> Result<Option<Uuid>, ActionError> {
    target_id(raw)
}

/// Trim optional text and drop it when blank.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|inner| inner.trim().to_string())
        .filter(|inner| !inner.is_empty())
}

pub fn slug_issue(err: SlugError, field: &str) -> ActionError {
    ActionError::field(field, err.to_string())
}

/// Collects field-level issues before a write.
#[derive(Debug, Default)]
pub struct Validator {
    issues: Vec<FieldIssue>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, field: &str, value: &str, max_len: usize) -> &mut Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(field, "is required");
        } else if trimmed.chars().count() > max_len {
            self.push(field, format!("must be at most {max_len} characters"));
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: Option<&str>, max_len: usize) -> &mut Self {
        if let Some(value) = value {
            if value.chars().count() > max_len {
                self.push(field, format!("must be at most {max_len} characters"));
            }
        }
        self
    }

    /// Absolute http(s) URL.
    pub fn url(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            let valid = Url::parse(value)
                .map(|url| matches!(url.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !valid {
                self.push(field, "must be an http(s) URL");
            }
        }
        self
    }

    /// Image reference: an absolute URL or a site-relative path.
    pub fn image(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        match value {
            Some(value) if value.starts_with('/') => self,
            other => self.url(field, other),
        }
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        if !value.is_empty() {
            let valid = value
                .split_once('@')
                .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
                .unwrap_or(false);
            if !valid {
                self.push(field, "must be an email address");
            }
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: i64) -> &mut Self {
        if value < 0 {
            self.push(field, "must not be negative");
        }
        self
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.issues.push(FieldIssue::new(field, message));
    }

    pub fn finish(&mut self) -> Result<(), ActionError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ActionError::Validation(std::mem::take(&mut self.issues)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ContentStatus;

    #[test]
    fn unknown_status_is_invalid_status() {
        let err = parse_status::<ContentStatus>("archived").unwrap_err();
        assert_eq!(err.code(), "INVALID_STATUS");
        assert_eq!(
            parse_requested_status::<ContentStatus>(Some(" ")).unwrap(),
            None
        );
    }

    fn actor(role: UserRole) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn only_admins_move_status_on_save() {
        let member = actor(UserRole::Member);
        let admin = actor(UserRole::Admin);
        let banned = ContentStatus::Banned;

        assert_eq!(permitted_status(&member, None, banned).unwrap(), banned);
        assert_eq!(permitted_status(&member, Some(banned), banned).unwrap(), banned);
        assert_eq!(
            permitted_status(&member, Some(ContentStatus::Published), banned)
                .unwrap_err()
                .code(),
            "UNAUTHORIZED"
        );
        assert_eq!(
            permitted_status(&admin, Some(ContentStatus::Published), banned).unwrap(),
            ContentStatus::Published
        );
    }

    #[test]
    fn blank_id_selects_create() {
        assert_eq!(target_id(None).unwrap(), None);
        assert_eq!(target_id(Some("  ")).unwrap(), None);
        let id = Uuid::new_v4();
        assert_eq!(target_id(Some(&id.to_string())).unwrap(), Some(id));
        assert_eq!(target_id(Some("nope")).unwrap_err().code(), "INVALID_DATA");
    }

    #[test]
    fn duplicate_slug_becomes_field_issue() {
        let err = ActionError::from(RepoError::Duplicate {
            constraint: "articles_slug_key".into(),
        });
        assert_eq!(err.code(), "VALIDATION");
        assert_eq!(err.issues()[0].field, "slug");

        let err = ActionError::from(RepoError::Duplicate {
            constraint: "talents_user_id_key".into(),
        });
        assert_eq!(err.issues()[0].field, "user_id");
    }

    #[test]
    fn validator_collects_every_issue() {
        let err = Validator::new()
            .required("title", " ", 10)
            .required("content", "ok", 10)
            .url("link", Some("ftp://example.com"))
            .image("thumbnail", Some("/cdn/2024/01/01/a.png"))
            .email("email", "nobody")
            .non_negative("price", -1)
            .finish()
            .unwrap_err();
        let fields: Vec<_> = err.issues().iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "link", "email", "price"]);
    }

    #[test]
    fn outcome_serializes_failures_as_data() {
        let outcome: ActionOutcome<()> = Err(ActionError::Unauthorized).into();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({"ok": false, "error": "UNAUTHORIZED"}));

        let outcome: ActionOutcome<u8> = Ok(7).into();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({"ok": true, "data": 7}));
    }
}
