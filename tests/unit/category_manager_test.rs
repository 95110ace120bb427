//! Unit tests for the CategoryManager: visibility filtering, ownership
//! checks and bookmark links.

use irhub::database::Database;
use irhub::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use irhub::managers::category_manager::{CategoryManager, CategoryManagerTrait};
use irhub::managers::user_manager::{UserManager, UserManagerTrait};
use irhub::types::bookmark::BookmarkDraft;
use irhub::types::caller::Caller;
use irhub::types::category::CategoryDraft;
use irhub::types::errors::HubError;
use irhub::types::user::Role;

fn setup() -> (Database, Caller, Caller, Caller) {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    let (owner, other, admin) = {
        let mut users = UserManager::new(db.connection());
        (
            Caller::user(&users.register_user("owner", Role::User).unwrap().id),
            Caller::user(&users.register_user("other", Role::User).unwrap().id),
            Caller::admin(&users.register_user("admin", Role::Admin).unwrap().id),
        )
    };
    (db, owner, other, admin)
}

fn category(name: &str, visibility: bool) -> CategoryDraft {
    CategoryDraft {
        name: name.to_string(),
        description: Some(format!("{} things", name)),
        visibility,
    }
}

fn bookmark(db: &Database, caller: &Caller, title: &str) -> String {
    BookmarkManager::new(db.connection())
        .create_bookmark(
            caller,
            &BookmarkDraft {
                title: title.to_string(),
                description: "desc".to_string(),
                media_content: "https://example.com".to_string(),
            },
        )
        .unwrap()
        .id
}

fn names(categories: &[irhub::types::category::Category]) -> Vec<&str> {
    categories.iter().map(|c| c.name.as_str()).collect()
}

#[test]
fn test_create_category_requires_name() {
    let (db, owner, _other, _admin) = setup();
    let mut mgr = CategoryManager::new(db.connection());

    match mgr.create_category(&owner, &category("  ", true)) {
        Err(HubError::Validation(errors)) => {
            assert_eq!(errors.get("name"), Some("Category name is required"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_blank_description_is_stored_as_none() {
    let (db, owner, _other, _admin) = setup();
    let mut mgr = CategoryManager::new(db.connection());
    let created = mgr
        .create_category(
            &owner,
            &CategoryDraft {
                name: "Reading".to_string(),
                description: Some("   ".to_string()),
                visibility: true,
            },
        )
        .unwrap();
    assert_eq!(created.description, None);
}

#[test]
fn test_index_hides_private_categories_from_others() {
    let (db, owner, other, admin) = setup();
    let mut mgr = CategoryManager::new(db.connection());
    mgr.create_category(&owner, &category("Public", true)).unwrap();
    mgr.create_category(&owner, &category("Secret", false)).unwrap();

    assert_eq!(names(&mgr.list_categories(&Caller::anonymous()).unwrap()), vec!["Public"]);
    assert_eq!(names(&mgr.list_categories(&other).unwrap()), vec!["Public"]);
    assert_eq!(names(&mgr.list_categories(&owner).unwrap()), vec!["Public", "Secret"]);
    assert_eq!(names(&mgr.list_categories(&admin).unwrap()), vec!["Public", "Secret"]);
}

#[test]
fn test_private_category_reads_as_not_found() {
    let (db, owner, other, admin) = setup();
    let mut mgr = CategoryManager::new(db.connection());
    let secret = mgr.create_category(&owner, &category("Secret", false)).unwrap();

    assert!(matches!(
        mgr.show_category(&other, &secret.id),
        Err(HubError::NotFound { entity: "Category", .. })
    ));
    assert!(mgr.show_category(&owner, &secret.id).unwrap().can_edit);
    assert!(mgr.show_category(&admin, &secret.id).unwrap().can_edit);
}

#[test]
fn test_edit_and_delete_require_owner_or_admin() {
    let (db, owner, other, admin) = setup();
    let mut mgr = CategoryManager::new(db.connection());
    let public = mgr.create_category(&owner, &category("Public", true)).unwrap();

    assert!(matches!(
        mgr.apply_edit(&other, &public.id, &category("Mine now", true)),
        Err(HubError::Forbidden(_))
    ));
    assert!(matches!(
        mgr.delete_category(&other, &public.id),
        Err(HubError::Forbidden(_))
    ));

    let edited = mgr.apply_edit(&owner, &public.id, &category("Renamed", false)).unwrap();
    assert_eq!(edited.name, "Renamed");
    assert!(!edited.visibility);

    mgr.delete_category(&admin, &public.id).unwrap();
    assert!(matches!(mgr.get_category(&public.id), Err(HubError::NotFound { .. })));
}

#[test]
fn test_private_category_mutations_by_non_owner_are_forbidden() {
    let (db, owner, other, _admin) = setup();
    let bookmark_id = bookmark(&db, &other, "Other's link");
    let mut mgr = CategoryManager::new(db.connection());
    let secret = mgr.create_category(&owner, &category("Secret", false)).unwrap();

    assert!(matches!(
        mgr.apply_edit(&other, &secret.id, &category("Taken", true)),
        Err(HubError::Forbidden(_))
    ));
    assert!(matches!(
        mgr.delete_category(&other, &secret.id),
        Err(HubError::Forbidden(_))
    ));
    assert!(matches!(
        mgr.add_bookmark(&other, &secret.id, &bookmark_id),
        Err(HubError::Forbidden(_))
    ));
    assert!(matches!(
        mgr.show_category(&other, &secret.id),
        Err(HubError::NotFound { entity: "Category", .. })
    ));

    let unchanged = mgr.get_category(&secret.id).unwrap();
    assert_eq!(unchanged.name, "Secret");
    assert!(!unchanged.visibility);
}

#[test]
fn test_add_bookmark_twice_is_already_linked() {
    let (db, owner, other, _admin) = setup();
    let bookmark_id = bookmark(&db, &other, "Someone else's link");
    let mut mgr = CategoryManager::new(db.connection());
    let cat = mgr.create_category(&owner, &category("Mixed", true)).unwrap();

    let link = mgr.add_bookmark(&owner, &cat.id, &bookmark_id).unwrap();
    assert_eq!(link.category_id, cat.id);

    match mgr.add_bookmark(&owner, &cat.id, &bookmark_id) {
        Err(err @ HubError::AlreadyLinked { .. }) => assert_eq!(err.banner(), "alert-warning"),
        other => panic!("expected AlreadyLinked, got {:?}", other),
    }

    let details = mgr.show_category(&owner, &cat.id).unwrap();
    assert_eq!(details.bookmarks.len(), 1);
}

#[test]
fn test_add_bookmark_to_foreign_category_is_forbidden() {
    let (db, owner, other, _admin) = setup();
    let bookmark_id = bookmark(&db, &other, "Link");
    let mut mgr = CategoryManager::new(db.connection());
    let cat = mgr.create_category(&owner, &category("Owner's", true)).unwrap();

    assert!(matches!(
        mgr.add_bookmark(&other, &cat.id, &bookmark_id),
        Err(HubError::Forbidden(_))
    ));
}

#[test]
fn test_add_missing_bookmark_is_not_found() {
    let (db, owner, _other, _admin) = setup();
    let mut mgr = CategoryManager::new(db.connection());
    let cat = mgr.create_category(&owner, &category("Empty", true)).unwrap();

    assert!(matches!(
        mgr.add_bookmark(&owner, &cat.id, "missing"),
        Err(HubError::NotFound { entity: "Bookmark", .. })
    ));
}

#[test]
fn test_show_lists_most_recently_linked_first() {
    let (db, owner, _other, _admin) = setup();
    let older = bookmark(&db, &owner, "Older");
    let newer = bookmark(&db, &owner, "Newer");
    let mut mgr = CategoryManager::new(db.connection());
    let cat = mgr.create_category(&owner, &category("Ordered", true)).unwrap();

    mgr.add_bookmark(&owner, &cat.id, &older).unwrap();
    mgr.add_bookmark(&owner, &cat.id, &newer).unwrap();

    let details = mgr.show_category(&Caller::anonymous(), &cat.id).unwrap();
    let ids: Vec<&str> = details.bookmarks.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec![newer.as_str(), older.as_str()]);
    assert!(!details.can_edit);
}

#[test]
fn test_remove_bookmark_and_delete_keep_bookmarks() {
    let (db, owner, _other, _admin) = setup();
    let first = bookmark(&db, &owner, "First");
    let second = bookmark(&db, &owner, "Second");
    let mut mgr = CategoryManager::new(db.connection());
    let cat = mgr.create_category(&owner, &category("Temp", true)).unwrap();
    mgr.add_bookmark(&owner, &cat.id, &first).unwrap();
    mgr.add_bookmark(&owner, &cat.id, &second).unwrap();

    mgr.remove_bookmark(&owner, &cat.id, &first).unwrap();
    assert!(matches!(
        mgr.remove_bookmark(&owner, &cat.id, &first),
        Err(HubError::NotFound { entity: "Category link", .. })
    ));

    mgr.delete_category(&owner, &cat.id).unwrap();

    let bookmarks = BookmarkManager::new(db.connection());
    assert!(bookmarks.get_bookmark(&first).is_ok());
    assert!(bookmarks.get_bookmark(&second).is_ok());
    let links: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM category_bookmarks", [], |row| row.get(0))
        .unwrap();
    assert_eq!(links, 0);
}

#[test]
fn test_user_categories_respect_visibility() {
    let (db, owner, other, _admin) = setup();
    let mut mgr = CategoryManager::new(db.connection());
    mgr.create_category(&owner, &category("Open", true)).unwrap();
    mgr.create_category(&owner, &category("Closed", false)).unwrap();
    mgr.create_category(&other, &category("Elsewhere", true)).unwrap();

    let owner_id = owner.user_id.clone().unwrap();
    assert_eq!(names(&mgr.list_user_categories(&other, &owner_id).unwrap()), vec!["Open"]);
    assert_eq!(
        names(&mgr.list_user_categories(&owner, &owner_id).unwrap()),
        vec!["Closed", "Open"]
    );
}
