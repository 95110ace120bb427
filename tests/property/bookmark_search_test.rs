//! Property-based tests for bookmark search.
//!
//! A search term found in a bookmark's own fields or in any of its comments
//! returns that bookmark, and the count matches the items returned.

use irhub::database::Database;
use irhub::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use irhub::managers::comment_manager::{CommentManager, CommentManagerTrait};
use irhub::managers::user_manager::{UserManager, UserManagerTrait};
use irhub::types::bookmark::{BookmarkDraft, BookmarkQuery};
use irhub::types::caller::Caller;
use irhub::types::user::Role;
use proptest::prelude::*;

/// Search terms never contain the filler text used for other fields.
fn arb_term() -> impl Strategy<Value = String> {
    "[qxz]{2}[a-z0-9%_]{1,8}"
}

#[derive(Debug, Clone, Copy)]
enum Placement {
    Title,
    Description,
    Media,
    Comment,
}

fn arb_placement() -> impl Strategy<Value = Placement> {
    prop_oneof![
        Just(Placement::Title),
        Just(Placement::Description),
        Just(Placement::Media),
        Just(Placement::Comment),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn term_is_found_wherever_it_is_placed(
        term in arb_term(),
        placement in arb_placement(),
        decoys in 0usize..5,
    ) {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let conn = db.connection();
        let caller = Caller::user(&UserManager::new(conn).register_user("searcher", Role::User).unwrap().id);
        let mut bookmarks = BookmarkManager::new(conn);

        for i in 0..decoys {
            bookmarks
                .create_bookmark(
                    &caller,
                    &BookmarkDraft {
                        title: format!("decoy {}", i),
                        description: "nothing here".to_string(),
                        media_content: "https://decoy.example".to_string(),
                    },
                )
                .unwrap();
        }

        let mut draft = BookmarkDraft {
            title: "plain title".to_string(),
            description: "plain description".to_string(),
            media_content: "https://plain.example".to_string(),
        };
        match placement {
            Placement::Title => draft.title = format!("about {} here", term),
            Placement::Description => draft.description = term.clone(),
            Placement::Media => draft.media_content = format!("https://{}.example", term),
            Placement::Comment => {}
        }
        let target = bookmarks.create_bookmark(&caller, &draft).unwrap();
        if let Placement::Comment = placement {
            CommentManager::new(conn)
                .add_comment(&caller, &target.id, &format!("see {}", term.to_uppercase()))
                .unwrap();
        }

        let page = bookmarks
            .list_bookmarks(
                &BookmarkQuery {
                    search: Some(term.clone()),
                    ..Default::default()
                },
                50,
            )
            .unwrap();

        prop_assert_eq!(page.total, page.items.len() as i64);
        prop_assert_eq!(page.items.len(), 1);
        prop_assert_eq!(&page.items[0].id, &target.id);
    }
}
