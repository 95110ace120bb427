//! Category Manager for IR Hub.
//!
//! Categories are personal collections of bookmarks. Private categories are
//! visible only to their owner and to admins.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;
use uuid::Uuid;

use crate::database::connection::write_transaction;
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait, BOOKMARK_COLUMNS};
use crate::managers::cascade;
use crate::services::access_policy::{can_modify, ensure_can_modify, require_authenticated};
use crate::types::caller::Caller;
use crate::types::category::{Category, CategoryBookmark, CategoryDetails, CategoryDraft};
use crate::types::errors::{HubError, ValidationErrors};

const CATEGORY_COLUMNS: &str = "id, name, description, visibility, user_id, created_at, updated_at";

/// Rows the caller may see: public ones, their own, or everything for an admin.
const VISIBLE_TO_CALLER: &str = "(visibility = 1 OR ?1 = 1 OR user_id = ?2)";

/// Trait defining category operations.
pub trait CategoryManagerTrait {
    fn create_category(&mut self, caller: &Caller, draft: &CategoryDraft) -> Result<Category, HubError>;
    fn get_category(&self, id: &str) -> Result<Category, HubError>;
    /// Every category the caller may see, ordered by name.
    fn list_categories(&self, caller: &Caller) -> Result<Vec<Category>, HubError>;
    /// One user's categories as seen by `caller`.
    fn list_user_categories(&self, caller: &Caller, owner_id: &str) -> Result<Vec<Category>, HubError>;
    fn show_category(&self, caller: &Caller, id: &str) -> Result<CategoryDetails, HubError>;
    fn render_edit_form(&self, caller: &Caller, id: &str) -> Result<Category, HubError>;
    fn apply_edit(&mut self, caller: &Caller, id: &str, draft: &CategoryDraft) -> Result<Category, HubError>;
    fn delete_category(&mut self, caller: &Caller, id: &str) -> Result<(), HubError>;
    fn add_bookmark(&mut self, caller: &Caller, category_id: &str, bookmark_id: &str) -> Result<CategoryBookmark, HubError>;
    fn remove_bookmark(&mut self, caller: &Caller, category_id: &str, bookmark_id: &str) -> Result<(), HubError>;
}

/// Category manager backed by a SQLite connection.
pub struct CategoryManager<'a> {
    conn: &'a Connection,
}

impl<'a> CategoryManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub(crate) fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            visibility: row.get(3)?,
            user_id: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn validate_draft(draft: &CategoryDraft) -> Result<(), HubError> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &draft.name, "Category name is required");
        errors.into_result()
    }

    fn clean_description(description: Option<&str>) -> Option<String> {
        description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }

    /// Loads a category the caller may see. Hidden categories read as missing.
    fn visible_category(&self, caller: &Caller, id: &str) -> Result<Category, HubError> {
        let category = self.get_category(id)?;
        if category.visibility || can_modify(caller, &category.user_id) {
            Ok(category)
        } else {
            Err(HubError::not_found("Category", id))
        }
    }

    fn link_exists(&self, category_id: &str, bookmark_id: &str) -> Result<bool, HubError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM category_bookmarks WHERE category_id = ?1 AND bookmark_id = ?2",
            params![category_id, bookmark_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

impl<'a> CategoryManagerTrait for CategoryManager<'a> {
    fn create_category(&mut self, caller: &Caller, draft: &CategoryDraft) -> Result<Category, HubError> {
        let user_id = require_authenticated(caller)?;
        Self::validate_draft(draft)?;

        let now = super::now();
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: draft.name.trim().to_string(),
            description: Self::clean_description(draft.description.as_deref()),
            visibility: draft.visibility,
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.conn.execute(
            "INSERT INTO categories (id, name, description, visibility, user_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                category.id,
                category.name,
                category.description,
                category.visibility,
                category.user_id,
                category.created_at,
                category.updated_at
            ],
        )?;

        info!(category = %category.id, user = user_id, public = category.visibility, "category created");
        Ok(category)
    }

    fn get_category(&self, id: &str) -> Result<Category, HubError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM categories WHERE id = ?1", CATEGORY_COLUMNS),
                params![id],
                Self::row_to_category,
            )
            .optional()?
            .ok_or_else(|| HubError::not_found("Category", id))
    }

    fn list_categories(&self, caller: &Caller) -> Result<Vec<Category>, HubError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM categories WHERE {} ORDER BY name, rowid",
            CATEGORY_COLUMNS, VISIBLE_TO_CALLER
        ))?;
        let rows = stmt.query_map(
            params![caller.is_admin, caller.user_id],
            Self::row_to_category,
        )?;
        super::collect_rows(rows)
    }

    fn list_user_categories(&self, caller: &Caller, owner_id: &str) -> Result<Vec<Category>, HubError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM categories WHERE user_id = ?3 AND {} ORDER BY name, rowid",
            CATEGORY_COLUMNS, VISIBLE_TO_CALLER
        ))?;
        let rows = stmt.query_map(
            params![caller.is_admin, caller.user_id, owner_id],
            Self::row_to_category,
        )?;
        super::collect_rows(rows)
    }

    fn show_category(&self, caller: &Caller, id: &str) -> Result<CategoryDetails, HubError> {
        let category = self.visible_category(caller, id)?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM bookmarks b JOIN category_bookmarks cb ON cb.bookmark_id = b.id \
             WHERE cb.category_id = ?1 ORDER BY cb.created_at DESC, cb.rowid DESC",
            BOOKMARK_COLUMNS
        ))?;
        let rows = stmt.query_map(params![id], BookmarkManager::row_to_bookmark)?;
        let bookmarks = super::collect_rows(rows)?;

        Ok(CategoryDetails {
            can_edit: can_modify(caller, &category.user_id),
            category,
            bookmarks,
        })
    }

    fn render_edit_form(&self, caller: &Caller, id: &str) -> Result<Category, HubError> {
        require_authenticated(caller)?;
        let category = self.get_category(id)?;
        ensure_can_modify(caller, &category.user_id, "You are not allowed to modify this category")?;
        Ok(category)
    }

    fn apply_edit(&mut self, caller: &Caller, id: &str, draft: &CategoryDraft) -> Result<Category, HubError> {
        let mut category = self.render_edit_form(caller, id)?;
        Self::validate_draft(draft)?;

        category.name = draft.name.trim().to_string();
        category.description = Self::clean_description(draft.description.as_deref());
        category.visibility = draft.visibility;
        category.updated_at = super::now();

        self.conn.execute(
            "UPDATE categories SET name = ?1, description = ?2, visibility = ?3, updated_at = ?4 WHERE id = ?5",
            params![
                category.name,
                category.description,
                category.visibility,
                category.updated_at,
                category.id
            ],
        )?;

        info!(category = id, "category edited");
        Ok(category)
    }

    fn delete_category(&mut self, caller: &Caller, id: &str) -> Result<(), HubError> {
        let category = self.render_edit_form(caller, id)?;

        let tx = write_transaction(self.conn)?;
        let links = cascade::delete_category_graph(&tx, &category.id)?;
        tx.commit()?;

        info!(category = id, links, "category deleted");
        Ok(())
    }

    fn add_bookmark(
        &mut self,
        caller: &Caller,
        category_id: &str,
        bookmark_id: &str,
    ) -> Result<CategoryBookmark, HubError> {
        let category = self.render_edit_form(caller, category_id)?;
        BookmarkManager::new(self.conn).get_bookmark(bookmark_id)?;

        if self.link_exists(&category.id, bookmark_id)? {
            return Err(HubError::AlreadyLinked {
                category_id: category.id,
                bookmark_id: bookmark_id.to_string(),
            });
        }

        let link = CategoryBookmark {
            id: Uuid::new_v4().to_string(),
            category_id: category.id,
            bookmark_id: bookmark_id.to_string(),
            created_at: super::now(),
        };
        self.conn.execute(
            "INSERT INTO category_bookmarks (id, category_id, bookmark_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![link.id, link.category_id, link.bookmark_id, link.created_at],
        )?;

        info!(category = category_id, bookmark = bookmark_id, "bookmark added to category");
        Ok(link)
    }

    fn remove_bookmark(&mut self, caller: &Caller, category_id: &str, bookmark_id: &str) -> Result<(), HubError> {
        self.render_edit_form(caller, category_id)?;

        let affected = self.conn.execute(
            "DELETE FROM category_bookmarks WHERE category_id = ?1 AND bookmark_id = ?2",
            params![category_id, bookmark_id],
        )?;
        if affected == 0 {
            return Err(HubError::NotFound {
                entity: "Category link",
                id: format!("{}/{}", category_id, bookmark_id),
            });
        }

        info!(category = category_id, bookmark = bookmark_id, "bookmark removed from category");
        Ok(())
    }
}
