//! Recording adapter for the `ServiceGateway` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::GATEWAY_PORT;
use crate::ports::gateway::{
    GenerateFuture, ImageRequest, PromptFuture, PromptRequest, ServiceGateway,
};

/// Records gateway interactions while delegating to an inner implementation.
pub struct RecordingGateway {
    inner: Box<dyn ServiceGateway>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingGateway {
    /// Creates a new recording gateway wrapping the given implementation.
    pub fn new(inner: Box<dyn ServiceGateway>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ServiceGateway for RecordingGateway {
    fn generate_images(&self, request: &ImageRequest) -> GenerateFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let result = self.inner.generate_images(&request).await;
            record_result(&self.recorder, GATEWAY_PORT, "generate_images", &request, &result);
            result
        })
    }

    fn random_prompt(&self, request: &PromptRequest) -> PromptFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let result = self.inner.random_prompt(&request).await;
            record_result(&self.recorder, GATEWAY_PORT, "random_prompt", &request, &result);
            result
        })
    }
}
