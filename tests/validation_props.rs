// Property tests for file validation
use proptest::prelude::*;
use shotframe::image_handler::{CandidateFile, ClipboardItem};
use shotframe::validation::{
    INVALID_TYPE_MESSAGE, get_image_from_clipboard, has_image_in_clipboard, validate_image_file,
};

const MAX: u64 = 10 * 1024 * 1024;
const ALLOWED: [&str; 5] = ["image/png", "image/jpeg", "image/jpg", "image/webp", "image/gif"];

fn declared(mime: &str, size: u64) -> CandidateFile {
    CandidateFile::new("f", mime, Vec::new()).with_declared_size(size)
}

proptest! {
    #[test]
    fn allowed_types_within_limit_are_valid(idx in 0usize..5, size in 0u64..=MAX) {
        let result = validate_image_file(&declared(ALLOWED[idx], size));
        prop_assert!(result.valid);
        prop_assert_eq!(result.error, None);
    }

    #[test]
    fn oversized_allowed_types_are_rejected(idx in 0usize..5, extra in 1u64..1_000_000_000) {
        let result = validate_image_file(&declared(ALLOWED[idx], MAX + extra));
        prop_assert!(!result.valid);
        prop_assert_eq!(result.error.as_deref(), Some("File too large. Maximum size: 10MB"));
    }

    #[test]
    fn unknown_types_fail_on_type_before_size(mime in "[a-z]{1,8}/[a-z0-9.+-]{1,12}", size in any::<u64>()) {
        prop_assume!(!ALLOWED.contains(&mime.as_str()));
        let result = validate_image_file(&declared(&mime, size));
        prop_assert!(!result.valid);
        prop_assert_eq!(result.error.as_deref(), Some(INVALID_TYPE_MESSAGE));
    }

    #[test]
    fn first_image_item_wins(prefix in 0usize..4, images in 1usize..4) {
        let mut items: Vec<ClipboardItem> = (0..prefix)
            .map(|_| ClipboardItem::without_file("text/plain"))
            .collect();
        for i in 0..images {
            items.push(ClipboardItem::from_file(CandidateFile::new(
                format!("img-{}", i),
                "image/png",
                vec![i as u8],
            )));
        }

        prop_assert!(has_image_in_clipboard(&items));
        let file = get_image_from_clipboard(&items).unwrap();
        prop_assert_eq!(file.name, "img-0");
    }
}

#[test]
fn text_only_clipboard_has_no_image() {
    let items = vec![ClipboardItem::without_file("text/plain")];
    assert!(!has_image_in_clipboard(&items));
    assert_eq!(get_image_from_clipboard(&items), None);
}
