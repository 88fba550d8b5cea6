//! Field resolution: ordered strategies with early exit.
//!
//! A field's candidate xpaths are tried precisely first and then by leaf
//! element name. New tiers are added with [`FieldResolver::with_strategy`].

mod chain;
mod strategy;

pub use chain::FieldResolver;
pub use strategy::{LocalNameStrategy, ResolveStrategy, XPathStrategy};
