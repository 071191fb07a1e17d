//! Reply generation from the catalog

use tracing::debug;

use super::{
    catalog::{matcher_for, Category, Matcher, FALLBACK, MATCHERS},
    random::RandomSource,
};

/// Maps free text to a canned reply.
///
/// Matching is an unanchored, case-insensitive substring test over an ordered
/// list of categories, so an input that mentions a greeting and AI always gets
/// a greeting. Ties among a category's replies are broken by the random source.
pub struct ResponseGenerator {
    random: Box<dyn RandomSource>,
}

impl ResponseGenerator {
    pub fn new(random: Box<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// The matcher that wins for `text`
    pub fn matcher(text: &str) -> &'static Matcher {
        let normalized = text.to_lowercase();
        MATCHERS
            .iter()
            .find(|m| m.matches(&normalized))
            .unwrap_or(&FALLBACK)
    }

    /// Category that `text` falls into
    pub fn classify(text: &str) -> Category {
        Self::matcher(text).category
    }

    /// Pick a reply for `text`
    pub fn generate(&mut self, text: &str) -> String {
        let category = Self::classify(text);
        let matcher = matcher_for(category);
        let index = self.random.pick(matcher.replies.len());
        debug!("Replying from {:?} candidate {}", category, index);
        matcher.replies[index].to_string()
    }

    /// Access the random source, e.g. to sample thinking jitter
    pub fn random_mut(&mut self) -> &mut dyn RandomSource {
        self.random.as_mut()
    }
}
