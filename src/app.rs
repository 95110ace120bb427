//! App Core for IR Hub.
//!
//! Holds the database and the loaded settings, and hands out managers
//! configured from those settings.

use tracing::info;

use crate::database::connection::Database;
use crate::database::seed;
use crate::managers::bookmark_manager::BookmarkManager;
use crate::managers::category_manager::CategoryManager;
use crate::managers::comment_manager::CommentManager;
use crate::managers::user_manager::UserManager;
use crate::managers::vote_manager::VoteManager;
use crate::services::access_policy::VoteRetractionPolicy;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::settings::ServiceSettings;

/// Central application struct.
///
/// Managers borrow the connection with a lifetime, so they are created on
/// demand through the accessor methods rather than stored.
pub struct App {
    pub db: Database,
    pub settings: ServiceSettings,
}

impl App {
    /// Loads settings from `config_path` (or the default location), applies
    /// environment overrides, then opens the database.
    pub fn load(config_path: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut engine = SettingsEngine::new(config_path);
        engine.load()?;
        engine.apply_env_overrides()?;
        info!(config = engine.get_config_path(), "settings loaded");
        Self::open(engine.get_settings().clone())
    }

    /// Opens the database named in `settings`, seeding it when enabled.
    pub fn open(settings: ServiceSettings) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::open(&settings.database_path)?;
        Self::with_database(db, settings)
    }

    /// Wraps an already opened database.
    pub fn with_database(db: Database, settings: ServiceSettings) -> Result<Self, Box<dyn std::error::Error>> {
        if settings.seed_defaults {
            seed::seed_defaults(db.connection())?;
        }
        info!(
            database = %settings.database_path,
            page_size = settings.page_size,
            admin_vote_retraction = settings.allow_admin_vote_retraction,
            "app ready"
        );
        Ok(Self { db, settings })
    }

    pub fn users(&self) -> UserManager<'_> {
        UserManager::new(self.db.connection())
    }

    pub fn bookmarks(&self) -> BookmarkManager<'_> {
        BookmarkManager::new(self.db.connection())
    }

    pub fn categories(&self) -> CategoryManager<'_> {
        CategoryManager::new(self.db.connection())
    }

    pub fn comments(&self) -> CommentManager<'_> {
        CommentManager::new(self.db.connection())
    }

    /// Vote manager honoring the configured retraction policy.
    pub fn votes(&self) -> VoteManager<'_> {
        VoteManager::with_policy(
            self.db.connection(),
            VoteRetractionPolicy {
                allow_admin_override: self.settings.allow_admin_vote_retraction,
            },
        )
    }
}
