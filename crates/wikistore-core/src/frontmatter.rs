//! Front-matter parsing and writing for `.wiki` page files.
//!
//! A page file optionally starts with a `---` delimited header carrying page
//! properties, one per line:
//! ```text
//! ---
//! Help: how to use
//! Suite
//! SymbolicLinks
//!   Friend: .Other.Page
//! Test: no
//! ---
//! !3 Actual wiki body starts here.
//! ```
//!
//! Properties are always read and written relative to a set of defaults (the
//! properties the page inherits). A flag present in the defaults but absent
//! from the page is written as `Flag: no` so the suppression survives reload.

use crate::page_data::PageData;
use crate::property::{is_flag, PageProperty, PropertyValue, HELP, SUITES, SYMBOLIC_LINKS};

const FENCE: &str = "---";

/// Split a page file into its raw header and body.
///
/// Returns `None` when the text does not open with a `---` line or the header
/// is never closed; the whole text is then body.
#[must_use]
pub fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let rest = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == FENCE {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Decode a page file into its body and properties.
///
/// Decoding starts from a copy of `defaults`; each header line then sets or
/// removes a property. Unknown keys are ignored and later lines win.
#[must_use]
pub fn decode(text: &str, defaults: &PageProperty) -> (String, PageProperty) {
    let mut properties = defaults.clone();
    let Some((header, body)) = split_frontmatter(text) else {
        return (text.to_string(), properties);
    };

    let mut in_links = false;
    for line in header.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with([' ', '\t']) {
            if in_links {
                if let (Some(links), Some((name, path))) = (
                    properties.nested_mut(SYMBOLIC_LINKS),
                    line.trim().split_once(':'),
                ) {
                    links.set_text(name.trim(), path.trim());
                }
            }
            continue;
        }

        in_links = false;
        let (key, value) = match line.split_once(':') {
            Some((key, value)) => (key.trim(), Some(value.trim())),
            None => (line.trim(), None),
        };

        if is_flag(key) {
            apply_flag(&mut properties, key, value);
        } else if key == HELP || key == SUITES {
            properties.set_text(key, value.unwrap_or_default());
        } else if key == SYMBOLIC_LINKS {
            properties.set_nested(key);
            in_links = true;
        }
    }

    (body.to_string(), properties)
}

fn apply_flag(properties: &mut PageProperty, key: &str, value: Option<&str>) {
    match value {
        None => properties.set_flag(key),
        Some(v) if v.is_empty() || is_truthy(v) => properties.set_flag(key),
        Some(v) if is_falsy(v) => {
            properties.remove(key);
        }
        Some(v) => properties.set_text(key, v),
    }
}

fn is_truthy(value: &str) -> bool {
    let value = value.to_lowercase();
    ["y", "yes", "t", "true", "1"].contains(&value.as_str())
}

fn is_falsy(value: &str) -> bool {
    let value = value.to_lowercase();
    ["n", "no", "f", "false", "0"].contains(&value.as_str())
}

/// Encode the front-matter header for `properties` relative to `defaults`.
///
/// Returns an empty string when nothing differs from the defaults.
#[must_use]
pub fn encode(properties: &PageProperty, defaults: &PageProperty) -> String {
    let mut lines = Vec::new();

    for (key, value) in properties.iter() {
        if is_flag(key) {
            if !defaults.has(key) {
                lines.push(key.to_string());
            }
        } else if key == HELP || key == SUITES {
            if let PropertyValue::Text(text) = value {
                lines.push(format!("{key}: {text}"));
            }
        } else if key == SYMBOLIC_LINKS {
            if let PropertyValue::Nested(links) = value {
                let mut block = key.to_string();
                for (name, target) in links.iter() {
                    if let PropertyValue::Text(target) = target {
                        block.push_str(&format!("\n  {name}: {target}"));
                    }
                }
                lines.push(block);
            }
        }
    }

    for key in defaults.keys() {
        if is_flag(key) && !properties.has(key) {
            lines.push(format!("{key}: no"));
        }
    }

    if lines.is_empty() {
        return String::new();
    }
    lines.sort();

    let mut output = String::from("---\n");
    output.push_str(&lines.join("\n"));
    output.push_str("\n---\n");
    output
}

/// Write a whole page file: header followed by the body, verbatim.
///
/// A body that would itself read as a header gets an empty fenced header in
/// front of it.
#[must_use]
pub fn write_page(data: &PageData, defaults: &PageProperty) -> String {
    let mut header = encode(data.properties(), defaults);
    if header.is_empty() && split_frontmatter(data.content()).is_some() {
        header = format!("{FENCE}\n{FENCE}\n");
    }
    let mut output = String::with_capacity(header.len() + data.content().len());
    output.push_str(&header);
    output.push_str(data.content());
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{
        DEFAULT_FLAGS, NON_SECURITY_ATTRIBUTES, PAGE_TYPE_ATTRIBUTES, SECURITY_ATTRIBUTES, SUITE,
        TEST,
    };
    use proptest::prelude::*;

    #[test]
    fn split_frontmatter_extracts_header_and_body() {
        let text = "---\nHelp: x\nSuite\n---\n!3 Body\n";
        let (header, body) = split_frontmatter(text).unwrap();
        assert_eq!(header, "Help: x\nSuite\n");
        assert_eq!(body, "!3 Body\n");
    }

    #[test]
    fn split_frontmatter_needs_opener_on_first_line() {
        assert!(split_frontmatter("\n---\nSuite\n---\nbody").is_none());
        assert!(split_frontmatter("Suite\n---\n").is_none());
    }

    #[test]
    fn split_frontmatter_rejects_missing_closer() {
        assert!(split_frontmatter("---\nSuite\nbody").is_none());
    }

    #[test]
    fn decode_without_header_keeps_defaults_and_whole_body() {
        let defaults = PageProperty::defaults_for("FrontPage");
        let (body, props) = decode("just text\n---\n", &defaults);
        assert_eq!(body, "just text\n---\n");
        assert_eq!(props, defaults);
    }

    #[test]
    fn decode_reads_documented_example() {
        let text = "---\nHelp: how to use\nSuite\nSymbolicLinks\n  Friend: .Other.Page\nTest: no\n---\n!3 Actual wiki body starts here.";
        let defaults = PageProperty::defaults_for("TestPage");
        let (body, props) = decode(text, &defaults);

        assert_eq!(body, "!3 Actual wiki body starts here.");
        assert_eq!(props.get(HELP), Some("how to use"));
        assert!(props.has(SUITE));
        assert!(!props.has(TEST));
        let links = props.nested(SYMBOLIC_LINKS).unwrap();
        assert_eq!(links.get("Friend"), Some(".Other.Page"));
    }

    #[test]
    fn decode_interprets_flag_values() {
        let text = "---\nTest: YES\nSuite: t\nStatic:\nEdit: False\nFiles: 0\nPrune: later\n---\n";
        let defaults = PageProperty::defaults_for("ChildPage");
        let (_, props) = decode(text, &defaults);

        assert_eq!(props.value(TEST), Some(&PropertyValue::Flag));
        assert_eq!(props.value(SUITE), Some(&PropertyValue::Flag));
        assert_eq!(props.value("Static"), Some(&PropertyValue::Flag));
        assert!(!props.has("Edit"));
        assert!(!props.has("Files"));
        assert_eq!(props.get("Prune"), Some("later"));
    }

    #[test]
    fn decode_ignores_unknown_keys() {
        let text = "---\nColour: blue\nLastModifyingUser: mallory\nSearch: no\n---\nbody";
        let defaults = PageProperty::defaults_for("ChildPage");
        let (_, props) = decode(text, &defaults);
        assert!(!props.has("Colour"));
        assert!(!props.has("LastModifyingUser"));
        assert!(!props.has("Search"));
    }

    #[test]
    fn decode_last_line_wins() {
        let defaults = PageProperty::new();
        let (_, props) = decode("---\nTest\nTest: no\n---\n", &defaults);
        assert!(!props.has(TEST));

        let (_, props) = decode("---\nTest: no\nTest\n---\n", &defaults);
        assert!(props.has(TEST));
    }

    #[test]
    fn encode_writes_sorted_lines_and_suppressions() {
        let defaults = PageProperty::defaults_for("TestPage");
        let mut props = PageProperty::new();
        props.set_text(HELP, "how to use");
        props.set_flag(SUITE);
        props
            .set_nested(SYMBOLIC_LINKS)
            .set_text("Friend", ".Other.Page");
        for flag in DEFAULT_FLAGS {
            props.set_flag(flag);
        }

        let header = encode(&props, &defaults);
        assert_eq!(
            header,
            "---\nHelp: how to use\nSuite\nSymbolicLinks\n  Friend: .Other.Page\nTest: no\n---\n"
        );
    }

    #[test]
    fn encode_emits_nothing_when_equal_to_defaults() {
        let defaults = PageProperty::defaults_for("ChildPage");
        assert_eq!(encode(&defaults, &defaults), "");
    }

    #[test]
    fn encode_keeps_suites_tags() {
        let mut props = PageProperty::new();
        props.set_text(SUITES, "smoke,nightly");
        let header = encode(&props, &PageProperty::new());
        assert_eq!(header, "---\nSuites: smoke,nightly\n---\n");
    }

    #[test]
    fn reencoding_a_decoded_page_is_byte_equal() {
        let defaults = PageProperty::defaults_for("ChildPage");
        let mut props = defaults.clone();
        props.set_text(HELP, "x");
        props.set_flag(SUITE);
        props.set_nested(SYMBOLIC_LINKS).set_text("F", ".A.B");

        let first = write_page(&PageData::new("body text\n", props), &defaults);
        let (body, decoded) = decode(&first, &defaults);
        let second = write_page(&PageData::new(body, decoded), &defaults);
        assert_eq!(first, second);
    }

    #[test]
    fn body_that_looks_like_a_header_is_fenced_off() {
        let defaults = PageProperty::defaults_for("ChildPage");
        let data = PageData::new("---\nTest\n---\nreal body", defaults.clone());

        let text = write_page(&data, &defaults);
        assert_eq!(text, "---\n---\n---\nTest\n---\nreal body");

        let (body, props) = decode(&text, &defaults);
        assert_eq!(body, "---\nTest\n---\nreal body");
        assert!(!props.has(TEST));
        assert_eq!(props, defaults);
    }

    #[test]
    fn unclosed_leading_fence_needs_no_header() {
        let defaults = PageProperty::defaults_for("ChildPage");
        let data = PageData::new("---\nno closer", defaults.clone());
        assert_eq!(write_page(&data, &defaults), "---\nno closer");
    }

    fn all_flags() -> Vec<&'static str> {
        PAGE_TYPE_ATTRIBUTES
            .iter()
            .chain(NON_SECURITY_ATTRIBUTES.iter())
            .chain(SECURITY_ATTRIBUTES.iter())
            .copied()
            .collect()
    }

    fn properties_strategy() -> impl Strategy<Value = PageProperty> {
        let flags = proptest::sample::subsequence(all_flags(), 0..=all_flags().len());
        let help = proptest::option::of("[A-Za-z0-9]([A-Za-z0-9 ,.:]{0,20}[A-Za-z0-9])?");
        let suites = proptest::option::of("[a-z]{1,8}(,[a-z]{1,8}){0,2}");
        let links = proptest::option::of(proptest::collection::btree_map(
            "[A-Z][a-z]{1,6}",
            "\\.[A-Z][a-z]{1,5}(\\.[A-Z][a-z]{1,5}){0,2}",
            0..3,
        ));

        (flags, help, suites, links).prop_map(|(flags, help, suites, links)| {
            let mut props = PageProperty::new();
            for flag in flags {
                props.set_flag(flag);
            }
            if let Some(help) = help {
                props.set_text(HELP, help);
            }
            if let Some(suites) = suites {
                props.set_text(SUITES, suites);
            }
            if let Some(links) = links {
                let nested = props.set_nested(SYMBOLIC_LINKS);
                for (name, target) in links {
                    nested.set_text(&name, target);
                }
            }
            props
        })
    }

    proptest! {
        #[test]
        fn decode_inverts_write_page(
            props in properties_strategy(),
            content in "(---\n)?[A-Za-z0-9 !.\n-]{0,64}",
            name in prop::sample::select(vec!["ChildPage", "TestPage", "SuitePage", "FrontPage"]),
        ) {
            let defaults = PageProperty::defaults_for(name);
            let text = write_page(&PageData::new(content.clone(), props.clone()), &defaults);
            let (body, decoded) = decode(&text, &defaults);
            prop_assert_eq!(body, content);
            prop_assert_eq!(decoded, props);
        }
    }
}
