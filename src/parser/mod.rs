pub mod json;

use crate::error::Result;
use crate::state::State;

/// Turns configuration source text into a linked [`State`].
///
/// Configuration-language front ends live outside this crate and plug in
/// here; the engine ships only its own JSON state document format.
pub trait StateParser: Send + Sync {
    /// Language key used in rule example fixtures (e.g. "terraform").
    fn language(&self) -> &str;

    fn parse(&self, source: &str) -> Result<State>;
}

/// Parsers bundled with the crate.
pub fn builtin_parsers() -> Vec<Box<dyn StateParser>> {
    vec![Box::new(json::JsonStateParser)]
}
