//! Sub-listing URLs and staged paths for arbitrary safe entry names

use proptest::prelude::*;
use repomirror::tree::path::{child_listing_url, child_path, validate_entry_name};
use reqwest::Url;
use std::path::{Component, Path};

#[test]
fn test_child_url_round_trips_segment() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let parent = Url::parse("http://example.com/api/contents?ref=main").unwrap();

    runner
        .run(&"[a-zA-Z0-9 ._#%?-]{1,24}", |name| {
            prop_assume!(validate_entry_name("test", &name).is_ok());

            let child = child_listing_url(&parent, &name).unwrap();
            let last = child.path_segments().unwrap().last().unwrap().to_string();
            let decoded = percent_decode(&last);

            prop_assert_eq!(decoded, name);
            prop_assert_eq!(child.query(), Some("ref=main"));
            prop_assert_eq!(child.host_str(), Some("example.com"));
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_child_path_stays_below_parent() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let parent = Path::new("/staging/root");

    runner
        .run(&r"[^/\\\x00]{1,16}", |name| {
            prop_assume!(validate_entry_name("test", &name).is_ok());

            let child = child_path(parent, &name);
            prop_assert_eq!(child.parent(), Some(parent));
            prop_assert!(child
                .components()
                .all(|c| !matches!(c, Component::ParentDir)));
            Ok(())
        })
        .unwrap();
}

fn percent_decode(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap();
            out.push(u8::from_str_radix(hex, 16).unwrap());
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).unwrap()
}
