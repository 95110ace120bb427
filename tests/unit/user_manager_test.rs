//! Unit tests for the UserManager: registration, profile pages, profile
//! edits and account deletion.

use irhub::database::Database;
use irhub::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use irhub::managers::category_manager::{CategoryManager, CategoryManagerTrait};
use irhub::managers::comment_manager::{CommentManager, CommentManagerTrait};
use irhub::managers::user_manager::{UserManager, UserManagerTrait, UNKNOWN_FIRST_NAME, UNKNOWN_LAST_NAME};
use irhub::managers::vote_manager::{VoteManager, VoteManagerTrait};
use irhub::types::bookmark::BookmarkDraft;
use irhub::types::caller::Caller;
use irhub::types::category::CategoryDraft;
use irhub::types::errors::HubError;
use irhub::types::user::{DeletionReport, ProfileUpdate, Role};
use irhub::types::vote::VoteType;

fn setup() -> (Database, Caller, Caller, Caller) {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    let (alice, bob, admin) = {
        let mut users = UserManager::new(db.connection());
        (
            Caller::user(&users.register_user("alice", Role::User).unwrap().id),
            Caller::user(&users.register_user("bob", Role::User).unwrap().id),
            Caller::admin(&users.register_user("admin", Role::Admin).unwrap().id),
        )
    };
    (db, alice, bob, admin)
}

fn id(caller: &Caller) -> String {
    caller.user_id.clone().unwrap()
}

fn update(user_name: &str, first: Option<&str>, last: Option<&str>) -> ProfileUpdate {
    ProfileUpdate {
        user_name: user_name.to_string(),
        first_name: first.map(str::to_string),
        last_name: last.map(str::to_string),
        about: Some("About me".to_string()),
        profile_image: None,
    }
}

fn count(db: &Database, sql: &str) -> i64 {
    db.connection().query_row(sql, [], |row| row.get(0)).unwrap()
}

#[test]
fn test_register_rejects_blank_and_duplicate_names() {
    let (db, _alice, _bob, _admin) = setup();
    let mut users = UserManager::new(db.connection());

    match users.register_user(" ", Role::User) {
        Err(HubError::Validation(errors)) => {
            assert_eq!(errors.get("user_name"), Some("User name is required"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    match users.register_user("alice", Role::User) {
        Err(HubError::Validation(errors)) => {
            assert_eq!(errors.get("user_name"), Some("User name is already taken"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_list_users_is_ordered_by_name() {
    let (db, _alice, _bob, _admin) = setup();
    let users = UserManager::new(db.connection());
    let names: Vec<String> = users.list_users().unwrap().into_iter().map(|u| u.user_name).collect();
    assert_eq!(names, vec!["admin", "alice", "bob"]);
}

#[test]
fn test_resolve_caller_reads_role() {
    let (db, alice, _bob, admin) = setup();
    let users = UserManager::new(db.connection());

    assert_eq!(users.resolve_caller(None).unwrap(), Caller::anonymous());
    assert_eq!(users.resolve_caller(Some(&id(&alice))).unwrap(), alice);
    assert!(users.resolve_caller(Some(&id(&admin))).unwrap().is_admin);
    assert_eq!(users.resolve_caller(Some("ghost")).unwrap(), Caller::anonymous());
}

#[test]
fn test_profile_shows_only_visible_categories() {
    let (db, alice, bob, _admin) = setup();
    let mut categories = CategoryManager::new(db.connection());
    for (name, visibility) in [("Shared", true), ("Hidden", false)] {
        categories
            .create_category(
                &alice,
                &CategoryDraft {
                    name: name.to_string(),
                    description: None,
                    visibility,
                },
            )
            .unwrap();
    }

    let users = UserManager::new(db.connection());
    let seen_by_bob = users.show_profile(&bob, &id(&alice)).unwrap();
    assert_eq!(seen_by_bob.categories.len(), 1);
    assert!(!seen_by_bob.can_edit);

    let seen_by_self = users.show_profile(&alice, &id(&alice)).unwrap();
    assert_eq!(seen_by_self.categories.len(), 2);
    assert!(seen_by_self.can_edit);
}

#[test]
fn test_edit_with_both_names_blank_uses_placeholders() {
    let (db, alice, _bob, _admin) = setup();
    let mut users = UserManager::new(db.connection());

    let edited = users.apply_edit(&alice, &id(&alice), &update("alice", Some(" "), None)).unwrap();

    assert_eq!(edited.first_name.as_deref(), Some(UNKNOWN_FIRST_NAME));
    assert_eq!(edited.last_name.as_deref(), Some(UNKNOWN_LAST_NAME));
    assert_eq!(edited.display_name(), "Unknown User");
}

#[test]
fn test_edit_with_one_blank_name_stores_it_empty() {
    let (db, alice, _bob, _admin) = setup();
    let mut users = UserManager::new(db.connection());

    let edited = users
        .apply_edit(&alice, &id(&alice), &update("alice", Some("Alice"), Some("")))
        .unwrap();

    assert_eq!(edited.first_name.as_deref(), Some("Alice"));
    assert_eq!(edited.last_name.as_deref(), Some(""));
    assert_eq!(users.get_user(&id(&alice)).unwrap().display_name(), "Alice");
}

#[test]
fn test_edit_other_profile_is_forbidden_unless_admin() {
    let (db, alice, bob, admin) = setup();
    let mut users = UserManager::new(db.connection());

    assert!(matches!(
        users.render_edit_form(&bob, &id(&alice)),
        Err(HubError::Forbidden(_))
    ));
    assert!(matches!(
        users.apply_edit(&bob, &id(&alice), &update("alice", Some("B"), None)),
        Err(HubError::Forbidden(_))
    ));

    let edited = users
        .apply_edit(&admin, &id(&alice), &update("alice2", Some("Al"), Some("Ice")))
        .unwrap();
    assert_eq!(edited.user_name, "alice2");
}

#[test]
fn test_edit_cannot_take_existing_user_name() {
    let (db, alice, _bob, _admin) = setup();
    let mut users = UserManager::new(db.connection());
    let result = users.apply_edit(&alice, &id(&alice), &update("bob", None, None));
    assert!(matches!(result, Err(HubError::Validation(_))));
}

#[test]
fn test_delete_user_leaves_no_orphans_and_fixes_counters() {
    let (db, alice, bob, _admin) = setup();

    let bob_bookmark = BookmarkManager::new(db.connection())
        .create_bookmark(
            &bob,
            &BookmarkDraft {
                title: "Bob's".to_string(),
                description: "kept".to_string(),
                media_content: "https://bob.example".to_string(),
            },
        )
        .unwrap();
    let alice_bookmark = BookmarkManager::new(db.connection())
        .create_bookmark(
            &alice,
            &BookmarkDraft {
                title: "Alice's".to_string(),
                description: "gone".to_string(),
                media_content: "https://alice.example".to_string(),
            },
        )
        .unwrap();

    VoteManager::new(db.connection())
        .cast_vote(&alice, &bob_bookmark.id, VoteType::Like)
        .unwrap();
    VoteManager::new(db.connection())
        .cast_vote(&bob, &alice_bookmark.id, VoteType::Like)
        .unwrap();
    CommentManager::new(db.connection())
        .add_comment(&alice, &bob_bookmark.id, "from alice")
        .unwrap();
    CommentManager::new(db.connection())
        .add_comment(&bob, &alice_bookmark.id, "from bob")
        .unwrap();

    let mut categories = CategoryManager::new(db.connection());
    let bob_category = categories
        .create_category(
            &bob,
            &CategoryDraft {
                name: "Bob's picks".to_string(),
                description: None,
                visibility: true,
            },
        )
        .unwrap();
    categories.add_bookmark(&bob, &bob_category.id, &alice_bookmark.id).unwrap();
    categories
        .create_category(
            &alice,
            &CategoryDraft {
                name: "Alice's list".to_string(),
                description: None,
                visibility: false,
            },
        )
        .unwrap();

    let mut users = UserManager::new(db.connection());
    assert!(matches!(users.delete_user(&bob, &id(&alice)), Err(HubError::Forbidden(_))));

    let deletion = users.delete_user(&alice, &id(&alice)).unwrap();

    assert!(deletion.signed_out);
    assert_eq!(deletion.report.bookmarks, 1);
    assert_eq!(deletion.report.categories, 1);
    assert_eq!(deletion.report.comments, 1);
    assert_eq!(deletion.report.votes, 1);
    assert_eq!(deletion.report.category_links, 1);

    assert!(matches!(users.get_user(&id(&alice)), Err(HubError::NotFound { .. })));
    let survivor = BookmarkManager::new(db.connection()).get_bookmark(&bob_bookmark.id).unwrap();
    assert_eq!(survivor.votes_count, 0);
    assert_eq!(survivor.comments_count, 0);

    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM comments WHERE bookmark_id NOT IN (SELECT id FROM bookmarks) \
                    OR user_id NOT IN (SELECT id FROM users)"),
        0
    );
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM votes WHERE bookmark_id NOT IN (SELECT id FROM bookmarks) \
                    OR user_id NOT IN (SELECT id FROM users)"),
        0
    );
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM category_bookmarks WHERE bookmark_id NOT IN (SELECT id FROM bookmarks)"),
        0
    );
    assert!(categories.get_category(&bob_category.id).is_ok());
}

#[test]
fn test_admin_deleting_someone_is_not_signed_out() {
    let (db, alice, _bob, admin) = setup();
    let mut users = UserManager::new(db.connection());
    let deletion = users.delete_user(&admin, &id(&alice)).unwrap();
    assert!(!deletion.signed_out);
    assert_eq!(deletion.report, DeletionReport::default());
}
