//! Resolution strategies for a single field.

use roxmltree::Node;

use crate::concordance::CandidatePath;
use crate::xml::{find_descendants, get_text, NameMatch};

/// One tier of field resolution.
///
/// A strategy looks at the ordered candidate list for a field and returns
/// the first non-empty value it can locate, or `None` to let the next tier
/// try.
pub trait ResolveStrategy: Send + Sync {
    /// Short name used in trace output.
    fn name(&self) -> &'static str;

    /// Resolve a value for the field within `scope`.
    fn resolve(&self, scope: Node<'_, '_>, candidates: &[CandidatePath]) -> Option<String>;
}

/// Evaluate each candidate xpath in order.
///
/// Absolute paths are evaluated from the document root, relative paths from
/// `scope`. Candidates that did not compile are skipped.
pub struct XPathStrategy;

impl ResolveStrategy for XPathStrategy {
    fn name(&self) -> &'static str {
        "xpath"
    }

    fn resolve(&self, scope: Node<'_, '_>, candidates: &[CandidatePath]) -> Option<String> {
        candidates
            .iter()
            .filter_map(CandidatePath::xpath)
            .find_map(|xpath| {
                xpath
                    .select(scope)
                    .iter()
                    .filter_map(|item| item.text())
                    .map(str::trim)
                    .find(|text| !text.is_empty())
                    .map(str::to_string)
            })
    }
}

/// Search the subtree for the final segment of each candidate as a bare
/// element name, ignoring namespace and full path.
pub struct LocalNameStrategy;

impl ResolveStrategy for LocalNameStrategy {
    fn name(&self) -> &'static str {
        "local-name"
    }

    fn resolve(&self, scope: Node<'_, '_>, candidates: &[CandidatePath]) -> Option<String> {
        candidates
            .iter()
            .filter_map(CandidatePath::local_name)
            .find_map(|name| {
                find_descendants(scope, name, NameMatch::Exact)
                    .map(get_text)
                    .find(|text| !text.is_empty())
            })
    }
}
