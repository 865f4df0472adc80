pub mod cleanup;
pub mod formatting;

pub use cleanup::CleanupService;
pub use formatting::{FormattingAgent, FormattingOutcome, UnconfiguredFormattingAgent};
