//! The value handed back to callers

use crate::fallback::FallbackModel;
use crate::providers::{ModelClient, ProviderTag};

/// A ready-to-use model: one authenticated client, or an ordered failover chain.
///
/// The caller owns the handle; the resolver keeps no reference to it.
#[derive(Debug)]
pub enum ModelHandle {
    Single(Box<dyn ModelClient>),
    Fallback(FallbackModel),
}

impl ModelHandle {
    /// Provider of the single client, or of the chain's primary entry
    pub fn provider(&self) -> ProviderTag {
        match self {
            Self::Single(client) => client.provider(),
            Self::Fallback(model) => model.primary().provider,
        }
    }

    /// Model name of the single client, or of the chain's primary entry
    pub fn model_name(&self) -> &str {
        match self {
            Self::Single(client) => client.model(),
            Self::Fallback(model) => &model.primary().model_name,
        }
    }

    pub fn client(&self) -> Option<&dyn ModelClient> {
        match self {
            Self::Single(client) => Some(client.as_ref()),
            Self::Fallback(_) => None,
        }
    }

    pub fn fallback(&self) -> Option<&FallbackModel> {
        match self {
            Self::Single(_) => None,
            Self::Fallback(model) => Some(model),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// Provider/model binding, e.g. `"openai:gpt-4o"` or
    /// `"fallback(openai:gpt-4o, anthropic:claude-3-5-sonnet-latest)"`.
    /// Two handles with the same binding are interchangeable.
    pub fn binding(&self) -> String {
        match self {
            Self::Single(client) => format!("{}:{}", client.provider(), client.model()),
            Self::Fallback(model) => {
                format!("fallback({})", model.chain().model_strings().join(", "))
            }
        }
    }
}
