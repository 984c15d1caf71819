//! Deterministic follow-up query generation.
//!
//! Context templates come first, the generic catalog second. Exact
//! duplicates keep their first position and anything already issued is
//! left out. The output depends only on the inputs, so callers and tests
//! can rely on its exact order.

use std::collections::HashSet;

use crate::config::ExpansionConfig;
use crate::types::SessionContext;

/// Produces expansion queries from templates and a generic catalog.
#[derive(Debug, Clone)]
pub struct QueryExpansionStrategy {
    config: ExpansionConfig,
}

impl QueryExpansionStrategy {
    pub fn new(config: ExpansionConfig) -> Self {
        Self { config }
    }

    /// Every candidate query not yet issued, in priority order.
    ///
    /// The caller slices the result to its remaining budget.
    pub fn next_queries(&self, context: &SessionContext, already_issued: &[String]) -> Vec<String> {
        let issued: HashSet<&str> = already_issued.iter().map(String::as_str).collect();
        let candidates = self
            .context_queries(context)
            .into_iter()
            .chain(self.config.generic_queries.iter().cloned());

        let mut emitted: HashSet<String> = HashSet::new();
        let mut queries: Vec<String> = Vec::new();
        for query in candidates {
            if query.trim().is_empty()
                || issued.contains(query.as_str())
                || !emitted.insert(query.clone())
            {
                continue;
            }
            queries.push(query);
        }
        queries
    }

    /// Templates interpolated with the session context.
    ///
    /// Segment/product templates are used when both attributes are present;
    /// otherwise subject templates are filled with the base query. Without
    /// either, there are no context queries.
    pub fn context_queries(&self, context: &SessionContext) -> Vec<String> {
        let segment = context.attribute(&self.config.segment_key);
        let product = context.attribute(&self.config.product_key);
        let subject = context.base_query.trim();

        match (segment, product) {
            (Some(segment), Some(product)) => self
                .config
                .segment_product_templates
                .iter()
                .map(|t| fill(t, segment, product, subject))
                .collect(),
            _ if !subject.is_empty() => self
                .config
                .subject_templates
                .iter()
                .map(|t| fill(t, "", "", subject))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Interpolate a template. Only the edges are trimmed, for a placeholder
/// at either end that resolved to nothing.
fn fill(template: &str, segment: &str, product: &str, subject: &str) -> String {
    template
        .replace("{segment}", segment)
        .replace("{product}", product)
        .replace("{subject}", subject)
        .trim()
        .to_owned()
}
