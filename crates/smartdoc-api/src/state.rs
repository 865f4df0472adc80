use crate::services::FormattingAgent;
use crate::session::SessionRegistry;
use smartdoc_core::Config;
use smartdoc_processing::{DocumentValidator, PreviewAssembler};
use smartdoc_storage::Storage;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub sessions: SessionRegistry,
    pub assembler: PreviewAssembler,
    pub validator: DocumentValidator,
    pub formatter: Arc<dyn FormattingAgent>,
}
