//! RPC method handler for the IR Hub JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` resolves the caller, dispatches to the managers on `App`
//! and turns every failure into an [`RpcError`] carrying a banner style.

use std::sync::Mutex;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::app::App;
use crate::managers::bookmark_manager::BookmarkManagerTrait;
use crate::managers::category_manager::CategoryManagerTrait;
use crate::managers::comment_manager::CommentManagerTrait;
use crate::managers::counters;
use crate::managers::user_manager::UserManagerTrait;
use crate::managers::vote_manager::VoteManagerTrait;
use crate::types::bookmark::{BookmarkDraft, BookmarkQuery, SortOrder};
use crate::types::caller::Caller;
use crate::types::category::CategoryDraft;
use crate::types::errors::HubError;
use crate::types::user::{ProfileUpdate, Role};
use crate::types::vote::VoteType;

/// Error object returned in the `error` member of an RPC response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcError {
    pub kind: String,
    pub message: String,
    pub banner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Value>,
}

impl RpcError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            kind: "invalid_params".to_string(),
            message: message.into(),
            banner: "alert-danger".to_string(),
            fields: None,
        }
    }

    /// A fault inside the server rather than in the request.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: "internal".to_string(),
            message: message.into(),
            banner: "alert-danger".to_string(),
            fields: None,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| json!({"kind": self.kind, "message": self.message}))
    }
}

impl From<HubError> for RpcError {
    fn from(e: HubError) -> Self {
        let fields = match &e {
            HubError::Validation(errors) => serde_json::to_value(errors.fields()).ok(),
            _ => None,
        };
        Self {
            kind: e.kind().to_string(),
            message: e.to_string(),
            banner: e.banner().to_string(),
            fields,
        }
    }
}

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, RpcError> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params(format!("missing {}", name)))
}

fn opt_str_param(params: &Value, name: &str) -> Option<String> {
    params.get(name).and_then(|v| v.as_str()).map(str::to_string)
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::invalid_params(e.to_string()))
}

/// Page numbers arrive either as JSON integers or as query-string text.
fn page_param(params: &Value) -> Result<Option<i64>, RpcError> {
    match params.get("page") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| RpcError::invalid_params(format!("invalid page: {}", n))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| RpcError::invalid_params(format!("invalid page: {}", s))),
        Some(other) => Err(RpcError::invalid_params(format!("invalid page: {}", other))),
    }
}

fn bookmark_draft(params: &Value) -> BookmarkDraft {
    BookmarkDraft {
        title: opt_str_param(params, "title").unwrap_or_default(),
        description: opt_str_param(params, "description").unwrap_or_default(),
        media_content: opt_str_param(params, "media_content").unwrap_or_default(),
    }
}

fn category_draft(params: &Value) -> CategoryDraft {
    CategoryDraft {
        name: opt_str_param(params, "name").unwrap_or_default(),
        description: opt_str_param(params, "description"),
        visibility: params.get("visibility").and_then(|v| v.as_bool()).unwrap_or(true),
    }
}

fn vote_type(params: &Value) -> Result<VoteType, RpcError> {
    let raw = str_param(params, "vote_type")?;
    VoteType::parse(raw)
        .ok_or_else(|| RpcError::invalid_params(format!("invalid vote_type: {}", raw)))
}

/// Dispatch a JSON-RPC method call to the appropriate manager.
///
/// The acting identity comes from the optional `caller_id` parameter; its
/// admin flag is read from the stored role.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, RpcError> {
    if method == "ping" {
        return Ok(json!({"pong": true}));
    }

    let a = app.lock().map_err(|e| RpcError::internal(e.to_string()))?;
    let caller_id = params.get("caller_id").and_then(|v| v.as_str());
    let caller: Caller = a.users().resolve_caller(caller_id)?;
    debug!(method, caller = ?caller.user_id, admin = caller.is_admin, "dispatching");

    match method {
        // ─── Users ───
        "user.register" => {
            let user_name = str_param(params, "user_name")?;
            let role = opt_str_param(params, "role").map(|r| Role::parse(&r)).unwrap_or(Role::User);
            if role == Role::Admin && !caller.is_admin {
                return Err(HubError::Forbidden("Only an admin can create admin accounts".to_string()).into());
            }
            let user = a.users().register_user(user_name, role)?;
            to_json(&user)
        }
        "user.list" => to_json(&a.users().list_users()?),
        "user.show" => {
            let id = str_param(params, "id")?;
            to_json(&a.users().show_profile(&caller, id)?)
        }
        "user.edit_form" => {
            let id = str_param(params, "id")?;
            to_json(&a.users().render_edit_form(&caller, id)?)
        }
        "user.edit" => {
            let id = str_param(params, "id")?;
            let update = ProfileUpdate {
                user_name: opt_str_param(params, "user_name").unwrap_or_default(),
                first_name: opt_str_param(params, "first_name"),
                last_name: opt_str_param(params, "last_name"),
                about: opt_str_param(params, "about"),
                profile_image: opt_str_param(params, "profile_image"),
            };
            to_json(&a.users().apply_edit(&caller, id, &update)?)
        }
        "user.delete" => {
            let id = str_param(params, "id")?;
            to_json(&a.users().delete_user(&caller, id)?)
        }

        // ─── Bookmarks ───
        "bookmark.create" => {
            let draft = bookmark_draft(params);
            to_json(&a.bookmarks().create_bookmark(&caller, &draft)?)
        }
        "bookmark.index" => {
            let query = BookmarkQuery {
                sort: opt_str_param(params, "sort").map(|s| SortOrder::parse(&s)).unwrap_or_default(),
                search: opt_str_param(params, "search"),
                page: page_param(params)?,
            };
            to_json(&a.bookmarks().list_bookmarks(&query, a.settings.page_size)?)
        }
        "bookmark.show" => {
            let id = str_param(params, "id")?;
            to_json(&a.bookmarks().show_bookmark(&caller, id)?)
        }
        "bookmark.edit_form" => {
            let id = str_param(params, "id")?;
            to_json(&a.bookmarks().render_edit_form(&caller, id)?)
        }
        "bookmark.edit" => {
            let id = str_param(params, "id")?;
            let draft = bookmark_draft(params);
            to_json(&a.bookmarks().apply_edit(&caller, id, &draft)?)
        }
        "bookmark.delete" => {
            let id = str_param(params, "id")?;
            a.bookmarks().delete_bookmark(&caller, id)?;
            Ok(json!({"ok": true}))
        }

        // ─── Comments ───
        "comment.add" => {
            let bookmark_id = str_param(params, "bookmark_id")?;
            let content = opt_str_param(params, "content").unwrap_or_default();
            to_json(&a.comments().add_comment(&caller, bookmark_id, &content)?)
        }
        "comment.edit_form" => {
            let id = str_param(params, "id")?;
            to_json(&a.comments().render_edit_form(&caller, id)?)
        }
        "comment.edit" => {
            let id = str_param(params, "id")?;
            let content = opt_str_param(params, "content").unwrap_or_default();
            to_json(&a.comments().apply_edit(&caller, id, &content)?)
        }
        "comment.delete" => {
            let id = str_param(params, "id")?;
            let bookmark_id = a.comments().delete_comment(&caller, id)?;
            Ok(json!({"ok": true, "bookmark_id": bookmark_id}))
        }

        // ─── Votes ───
        "vote.cast" => {
            let bookmark_id = str_param(params, "bookmark_id")?;
            let vote_type = vote_type(params)?;
            to_json(&a.votes().cast_vote(&caller, bookmark_id, vote_type)?)
        }
        "vote.retract" => {
            let id = str_param(params, "id")?;
            to_json(&a.votes().retract_vote(&caller, id)?)
        }

        // ─── Categories ───
        "category.create" => {
            let draft = category_draft(params);
            to_json(&a.categories().create_category(&caller, &draft)?)
        }
        "category.index" => to_json(&a.categories().list_categories(&caller)?),
        "category.show" => {
            let id = str_param(params, "id")?;
            to_json(&a.categories().show_category(&caller, id)?)
        }
        "category.edit_form" => {
            let id = str_param(params, "id")?;
            to_json(&a.categories().render_edit_form(&caller, id)?)
        }
        "category.edit" => {
            let id = str_param(params, "id")?;
            let draft = category_draft(params);
            to_json(&a.categories().apply_edit(&caller, id, &draft)?)
        }
        "category.delete" => {
            let id = str_param(params, "id")?;
            a.categories().delete_category(&caller, id)?;
            Ok(json!({"ok": true}))
        }
        "category.add_bookmark" => {
            let category_id = str_param(params, "category_id")?;
            let bookmark_id = str_param(params, "bookmark_id")?;
            to_json(&a.categories().add_bookmark(&caller, category_id, bookmark_id)?)
        }
        "category.remove_bookmark" => {
            let category_id = str_param(params, "category_id")?;
            let bookmark_id = str_param(params, "bookmark_id")?;
            a.categories().remove_bookmark(&caller, category_id, bookmark_id)?;
            Ok(json!({"ok": true}))
        }

        // ─── Maintenance ───
        "counters.reconcile" => {
            if !caller.is_authenticated() {
                return Err(HubError::Unauthenticated.into());
            }
            if !caller.is_admin {
                return Err(HubError::Forbidden("Only an admin can reconcile counters".to_string()).into());
            }
            let corrected = counters::reconcile_all(a.db.connection())?;
            Ok(json!({"corrected": corrected}))
        }

        _ => Err(RpcError {
            kind: "unknown_method".to_string(),
            message: format!("unknown method: {}", method),
            banner: "alert-danger".to_string(),
            fields: None,
        }),
    }
}
