//! Property-based tests for page window resolution.
//!
//! Any requested page number, including missing, negative and far past the
//! end, resolves to a page inside `1..=last_page`, and the windows of all
//! pages tile the result set exactly.

use irhub::types::page::PageWindow;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn requested_page_is_clamped(
        total in 0i64..500,
        per_page in 1i64..50,
        requested in proptest::option::of(-100i64..100),
    ) {
        let window = PageWindow::resolve(total, requested, per_page);

        prop_assert!(window.last_page >= 1);
        prop_assert!(window.page >= 1 && window.page <= window.last_page);
        prop_assert_eq!(window.offset, (window.page - 1) * per_page);
        prop_assert_eq!(window.limit, per_page);
        prop_assert!(total == 0 || window.offset < total);

        if let Some(n) = requested {
            if n >= 1 && n <= window.last_page {
                prop_assert_eq!(window.page, n);
            }
        } else {
            prop_assert_eq!(window.page, 1);
        }
    }

    #[test]
    fn huge_page_sizes_fit_on_one_page(
        total in 0i64..1_000_000,
        per_page in (i64::MAX - 1_000)..=i64::MAX,
        requested in proptest::option::of(any::<i64>()),
    ) {
        let window = PageWindow::resolve(total, requested, per_page);

        prop_assert_eq!(window.last_page, 1);
        prop_assert_eq!(window.page, 1);
        prop_assert_eq!(window.offset, 0);
        prop_assert_eq!(window.limit, per_page);
    }

    #[test]
    fn last_page_matches_ceiling_division(total in 0i64..i64::MAX, per_page in 1i64..=i64::MAX) {
        let window = PageWindow::resolve(total, None, per_page);
        let expected = ((total as i128 + per_page as i128 - 1) / per_page as i128).max(1) as i64;
        prop_assert_eq!(window.last_page, expected);
    }

    #[test]
    fn pages_tile_the_result_set(total in 0i64..300, per_page in 1i64..25) {
        let last_page = PageWindow::resolve(total, None, per_page).last_page;

        let mut covered = 0;
        for page in 1..=last_page {
            let window = PageWindow::resolve(total, Some(page), per_page);
            prop_assert_eq!(window.offset, covered);
            covered += window.limit.min(total - window.offset).max(0);
        }
        prop_assert_eq!(covered, total);
    }
}
