use crate::error::{Result, RulesError};
use crate::state::State;

use super::StateParser;

pub const LANGUAGE: &str = "state";

/// Reads serialized `State` documents.
///
/// Leaf attributes may be bare values or `{ "value": ..., "metadata": {...} }`;
/// anything without an explicit reference is addressed by [`State::link`].
pub struct JsonStateParser;

impl StateParser for JsonStateParser {
    fn language(&self) -> &str {
        LANGUAGE
    }

    fn parse(&self, source: &str) -> Result<State> {
        let mut state: State = serde_json::from_str(source).map_err(|e| RulesError::Parse {
            language: LANGUAGE.into(),
            message: e.to_string(),
        })?;
        state.link();
        Ok(state)
    }
}
