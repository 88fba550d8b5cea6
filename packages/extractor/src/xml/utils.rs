//! XML utility functions for navigating e-file DOM trees by local name.

use roxmltree::Node;

/// How local names are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    /// Exact local-name comparison.
    Exact,
    /// ASCII case-insensitive comparison.
    IgnoreCase,
}

impl NameMatch {
    fn matches(self, actual: &str, expected: &str) -> bool {
        match self {
            Self::Exact => actual == expected,
            Self::IgnoreCase => actual.eq_ignore_ascii_case(expected),
        }
    }
}

/// Get the tag name without namespace.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use irs990_extractor::xml::get_tag_name;
///
/// let xml = r#"<Return xmlns="http://www.irs.gov/efile"><ReturnData/></Return>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_tag_name(doc.root_element()), "Return");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Check if a node is an element with the given local name.
pub fn has_local_name(node: Node<'_, '_>, name: &str, mode: NameMatch) -> bool {
    node.is_element() && mode.matches(get_tag_name(node), name)
}

/// Find the first child element with the given local name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use irs990_extractor::xml::find_child;
///
/// let xml = r#"<Filer><EIN>123456789</EIN><PhoneNum/></Filer>"#;
/// let doc = Document::parse(xml).unwrap();
/// let filer = doc.root_element();
///
/// assert!(find_child(filer, "EIN").is_some());
/// assert!(find_child(filer, "USAddress").is_none());
/// ```
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| has_local_name(*child, tag, NameMatch::Exact))
}

/// Find the first element strictly below `node` with the given local name.
///
/// Search is depth-first in document order; `node` itself is never returned.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use irs990_extractor::xml::{find_descendant, NameMatch};
///
/// let xml = r#"<Return><ReturnData><IRS990ScheduleM/></ReturnData></Return>"#;
/// let doc = Document::parse(xml).unwrap();
/// let root = doc.root_element();
///
/// assert!(find_descendant(root, "IRS990ScheduleM", NameMatch::Exact).is_some());
/// assert!(find_descendant(root, "irs990schedulem", NameMatch::IgnoreCase).is_some());
/// assert!(find_descendant(root, "Return", NameMatch::Exact).is_none());
/// ```
pub fn find_descendant<'a, 'input>(
    node: Node<'a, 'input>,
    name: &str,
    mode: NameMatch,
) -> Option<Node<'a, 'input>> {
    find_descendants(node, name, mode).next()
}

/// Iterate over all elements strictly below `node` with the given local name.
pub fn find_descendants<'a, 'input, 'n>(
    node: Node<'a, 'input>,
    name: &'n str,
    mode: NameMatch,
) -> impl Iterator<Item = Node<'a, 'input>> + 'n
where
    'a: 'n,
    'input: 'n,
{
    node.descendants()
        .skip(1)
        .filter(move |n| has_local_name(*n, name, mode))
}

/// Find the first element matching any of `names`, trying names in order.
///
/// Earlier names win over later ones even when a later name occurs earlier
/// in the document.
pub fn find_first_of<'a, 'input>(
    node: Node<'a, 'input>,
    names: &[&str],
    mode: NameMatch,
) -> Option<Node<'a, 'input>> {
    names
        .iter()
        .find_map(|name| find_descendant(node, name, mode))
}

/// Look up the text of the first element matching any of `names`.
///
/// Names are tried in order; for each name, matching elements are visited in
/// document order and the first non-empty trimmed text is returned. When
/// elements exist but every one is empty, `Some("")` is returned so callers
/// can tell "present but blank" from "absent".
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use irs990_extractor::xml::{find_text, NameMatch};
///
/// let xml = r#"<Grp><NoncashCheckboxInd>X</NoncashCheckboxInd><Desc/></Grp>"#;
/// let doc = Document::parse(xml).unwrap();
/// let grp = doc.root_element();
///
/// assert_eq!(find_text(grp, &["Checkbox", "NoncashCheckboxInd"], NameMatch::Exact), Some("X".to_string()));
/// assert_eq!(find_text(grp, &["Desc"], NameMatch::Exact), Some(String::new()));
/// assert_eq!(find_text(grp, &["TypeDesc"], NameMatch::Exact), None);
/// ```
pub fn find_text(node: Node<'_, '_>, names: &[&str], mode: NameMatch) -> Option<String> {
    let mut seen_blank = false;

    for name in names {
        for element in find_descendants(node, name, mode) {
            let text = get_text(element);
            if !text.is_empty() {
                return Some(text);
            }
            seen_blank = true;
        }
    }

    seen_blank.then(String::new)
}

/// Get the text content of a node, trimmed.
///
/// Only the text before the first child element is considered, which is
/// where e-file leaf values live.
pub fn get_text(node: Node<'_, '_>) -> String {
    node.text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
