//! XML navigation for e-file documents.
//!
//! [`utils`] holds local-name helpers used by the fixed-name lookups;
//! [`xpath`] evaluates concordance location paths.

mod utils;
mod xpath;

pub use utils::{
    find_child, find_descendant, find_descendants, find_first_of, find_text,
    get_tag_name, get_text, has_local_name, NameMatch,
};
pub use xpath::{XPath, XPathError, XPathItem};

pub(crate) use xpath::is_ncname;
