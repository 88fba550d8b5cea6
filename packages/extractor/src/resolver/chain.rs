//! Ordered chain of resolution strategies.

use roxmltree::Node;

use super::strategy::{LocalNameStrategy, ResolveStrategy, XPathStrategy};
use crate::concordance::CandidatePath;

/// Tries each strategy in order and returns the first hit.
///
/// The chain owns no per-document state and is shared by every worker.
pub struct FieldResolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl FieldResolver {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// The default two-tier chain: exact xpath, then local-name search.
    ///
    /// # Examples
    /// ```
    /// use roxmltree::Document;
    /// use irs990_extractor::concordance::CandidatePath;
    /// use irs990_extractor::resolver::FieldResolver;
    ///
    /// let xml = r#"<Return><ReturnData><Moved><TaxYr>2021</TaxYr></Moved></ReturnData></Return>"#;
    /// let doc = Document::parse(xml).unwrap();
    /// let candidates = vec![CandidatePath::new("/Return/ReturnHeader/TaxYr")];
    ///
    /// let resolver = FieldResolver::standard();
    /// assert_eq!(resolver.resolve(doc.root_element(), &candidates), Some("2021".to_string()));
    /// ```
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with_strategy(XPathStrategy)
            .with_strategy(LocalNameStrategy)
    }

    /// Append a strategy to the end of the chain.
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl ResolveStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Names of the strategies in evaluation order.
    pub fn strategy_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.strategies.iter().map(|s| s.name())
    }

    /// Resolve a field's raw text within `scope`.
    ///
    /// Returns `None` when no strategy finds a non-empty value, including
    /// when `candidates` is empty.
    pub fn resolve(&self, scope: Node<'_, '_>, candidates: &[CandidatePath]) -> Option<String> {
        if candidates.is_empty() {
            return None;
        }

        self.strategies.iter().find_map(|strategy| {
            let value = strategy.resolve(scope, candidates)?;
            tracing::trace!(
                tier = strategy.name(),
                candidate = candidates[0].as_str(),
                "field resolved"
            );
            Some(value)
        })
    }
}

impl Default for FieldResolver {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for FieldResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldResolver")
            .field("strategies", &self.strategy_names().collect::<Vec<_>>())
            .finish()
    }
}
