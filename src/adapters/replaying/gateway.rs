//! Replaying adapter for the `ServiceGateway` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::GATEWAY_PORT;
use crate::ports::gateway::{
    GenerateFuture, ImageRef, ImageRequest, PromptFuture, PromptRequest, ServiceGateway,
};

/// Serves recorded gateway results from a cassette.
pub struct ReplayingGateway {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingGateway {
    /// Create a replaying gateway backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl ServiceGateway for ReplayingGateway {
    fn generate_images(&self, _request: &ImageRequest) -> GenerateFuture<'_> {
        let output = next_output(&self.replayer, GATEWAY_PORT, "generate_images");
        Box::pin(async move { replay_result::<Vec<ImageRef>>(output?) })
    }

    fn random_prompt(&self, _request: &PromptRequest) -> PromptFuture<'_> {
        let output = next_output(&self.replayer, GATEWAY_PORT, "random_prompt");
        Box::pin(async move { replay_result::<String>(output?) })
    }
}
