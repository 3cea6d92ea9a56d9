//! Session state and the two user-triggered workflows.
//!
//! The [`Controller`] is the only writer of [`Session`]. Every change goes
//! through one update call, which publishes the new snapshot on a `watch`
//! channel (latest value, for rendering) and to any transition listeners
//! (every value, in order). Failures never escape a workflow; they end up in
//! [`Session::error`].

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::aspect::AspectRatioOption;
use crate::messages::Messages;
use crate::ports::{Dictation, ImageRef, ImageRequest, PromptRequest, ServiceGateway};

/// Everything the user sees. Lives for one run, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Current prompt text.
    pub prompt: String,
    /// Images from the last successful workflow.
    pub images: Vec<ImageRef>,
    /// True while a workflow is in flight.
    pub loading: bool,
    /// Message from the last failed workflow.
    pub error: Option<String>,
    /// Selected aspect ratio.
    pub aspect_ratio: AspectRatioOption,
    /// True while dictation is active.
    pub listening: bool,
}

/// User intents dispatched to [`Controller::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the prompt text.
    SetPrompt(String),
    /// Choose another aspect ratio.
    SelectAspectRatio(AspectRatioOption),
    /// Generate images from the current prompt.
    Generate,
    /// Ask for a random prompt, then generate images from it.
    Random,
    /// Start or stop dictation.
    ToggleDictation,
}

/// Model and output settings sent with every gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    /// Resolved image model identifier.
    pub image_model: String,
    /// Resolved text model identifier.
    pub text_model: String,
    /// Images per generation.
    pub count: u32,
    /// MIME type requested from the service.
    pub mime_type: String,
    /// Instruction sent when asking for a random prompt.
    pub random_instruction: String,
}

/// Instruction for the random prompt request.
pub const RANDOM_PROMPT_INSTRUCTION: &str = "Generate one short, vivid and creative description \
     for an image generation model. Describe a single scene in one sentence. Reply with the \
     description only, without quotes or any other text.";

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            image_model: "imagen-4.0-generate-001".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            count: 4,
            mime_type: "image/jpeg".to_string(),
            random_instruction: RANDOM_PROMPT_INSTRUCTION.to_string(),
        }
    }
}

struct Store {
    current: watch::Sender<Session>,
    listeners: Mutex<Vec<mpsc::UnboundedSender<Session>>>,
}

impl Store {
    fn update(&self, f: impl FnOnce(&mut Session)) {
        self.update_if(|session| {
            f(session);
            true
        });
    }

    /// Apply `f`; publish only if it reports a change.
    fn update_if(&self, f: impl FnOnce(&mut Session) -> bool) {
        if !self.current.send_if_modified(f) {
            return;
        }
        let snapshot = self.current.borrow().clone();
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|tx| tx.send(snapshot.clone()).is_ok());
        }
    }
}

/// Owns the session and runs workflows against the service gateway.
pub struct Controller {
    store: Arc<Store>,
    gateway: Box<dyn ServiceGateway>,
    dictation: Box<dyn Dictation>,
    settings: GenerationSettings,
    messages: &'static Messages,
}

impl Controller {
    /// Create a controller with a fresh default session.
    #[must_use]
    pub fn new(
        gateway: Box<dyn ServiceGateway>,
        dictation: Box<dyn Dictation>,
        settings: GenerationSettings,
        messages: &'static Messages,
    ) -> Self {
        let (current, _) = watch::channel(Session::default());
        let store = Arc::new(Store { current, listeners: Mutex::new(Vec::new()) });
        if !dictation.available() {
            info!("speech recognition is not available; dictation disabled");
        }
        Self { store, gateway, dictation, settings, messages }
    }

    /// A copy of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.store.current.borrow().clone()
    }

    /// Watch the latest session value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.store.current.subscribe()
    }

    /// Receive every session snapshot published from now on, in order.
    #[cfg(test)]
    #[must_use]
    pub fn transitions(&self) -> mpsc::UnboundedReceiver<Session> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut listeners) = self.store.listeners.lock() {
            listeners.push(tx);
        }
        rx
    }

    /// Whether the dictation capability exists on this host.
    #[must_use]
    pub fn dictation_available(&self) -> bool {
        self.dictation.available()
    }

    /// The message table in use.
    #[must_use]
    pub fn messages(&self) -> &'static Messages {
        self.messages
    }

    /// Apply one user intent.
    pub async fn dispatch(&self, command: Command) {
        match command {
            Command::SetPrompt(prompt) => self.store.update(|s| s.prompt = prompt),
            Command::SelectAspectRatio(option) => self.store.update(|s| s.aspect_ratio = option),
            Command::Generate => {
                let prompt = self.store.current.borrow().prompt.clone();
                self.generate(&prompt).await;
            }
            Command::Random => self.random().await,
            Command::ToggleDictation => self.toggle_dictation(),
        }
    }

    /// Generate images from `prompt` with the selected aspect ratio.
    pub async fn generate(&self, prompt: &str) {
        if prompt.trim().is_empty() {
            self.store.update(|s| s.error = Some(self.messages.empty_prompt.to_string()));
            return;
        }

        self.store.update(|s| {
            s.loading = true;
            s.error = None;
            s.images.clear();
        });

        let request = ImageRequest {
            model: self.settings.image_model.clone(),
            prompt: prompt.to_string(),
            aspect_ratio: self.store.current.borrow().aspect_ratio.value.to_string(),
            count: self.settings.count,
            mime_type: self.settings.mime_type.clone(),
        };
        info!(model = %request.model, ratio = %request.aspect_ratio, "generating images");

        match self.gateway.generate_images(&request).await {
            Ok(images) => {
                info!(count = images.len(), "images generated");
                self.store.update(|s| {
                    s.images = images;
                    s.loading = false;
                });
            }
            Err(e) => {
                warn!("image generation failed: {e}");
                let message =
                    e.user_message().unwrap_or_else(|| self.messages.generation_failed.to_string());
                self.store.update(|s| {
                    s.error = Some(message);
                    s.loading = false;
                });
            }
        }
    }

    /// Ask the service for a random prompt, then generate images from it.
    pub async fn random(&self) {
        self.store.update(|s| {
            s.loading = true;
            s.error = None;
            s.images.clear();
            s.prompt = self.messages.random_placeholder.to_string();
        });

        let request = PromptRequest {
            model: self.settings.text_model.clone(),
            instruction: self.settings.random_instruction.clone(),
        };
        info!(model = %request.model, "requesting random prompt");

        match self.gateway.random_prompt(&request).await {
            Ok(prompt) => {
                self.store.update(|s| s.prompt.clone_from(&prompt));
                self.generate(&prompt).await;
            }
            Err(e) => {
                warn!("random prompt failed: {e}");
                self.store.update(|s| {
                    s.error = Some(self.messages.random_failed.to_string());
                    s.prompt.clear();
                });
            }
        }

        // The nested generation normally clears the flag itself.
        self.store.update_if(|s| std::mem::replace(&mut s.loading, false));
    }

    fn toggle_dictation(&self) {
        if !self.dictation.available() {
            warn!("dictation requested but speech recognition is not available");
            return;
        }

        if self.store.current.borrow().listening {
            self.store.update(|s| s.listening = false);
            self.dictation.stop();
            return;
        }

        // Transcripts only land in the prompt while listening.
        let store = Arc::clone(&self.store);
        let sink = Box::new(move |text: String| {
            store.update_if(|s| {
                if s.listening {
                    s.prompt = text;
                }
                s.listening
            });
        });
        self.store.update(|s| s.listening = true);
        if let Err(e) = self.dictation.start(sink) {
            warn!("dictation failed to start: {e}");
            self.store.update(|s| s.listening = false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspect::ASPECT_RATIOS;
    use crate::error::ImageError;
    use crate::messages::{Locale, Messages};
    use crate::ports::dictation::TranscriptSink;
    use crate::ports::gateway::{GenerateFuture, PromptFuture};

    /// Scripted gateway that records calls and the loading flag seen during each.
    #[derive(Default)]
    struct FakeGateway {
        images: Option<Result<Vec<String>, String>>,
        prompt: Option<Result<String, String>>,
        calls: Mutex<Vec<String>>,
        requests: Mutex<Vec<ImageRequest>>,
        observer: Mutex<Option<watch::Receiver<Session>>>,
        loading_during_calls: Mutex<Vec<bool>>,
    }

    impl FakeGateway {
        fn with_images(images: &[&str]) -> Self {
            Self {
                images: Some(Ok(images.iter().map(|s| (*s).to_string()).collect())),
                ..Self::default()
            }
        }

        fn observe(&self) {
            if let Some(rx) = self.observer.lock().unwrap().as_ref() {
                self.loading_during_calls.lock().unwrap().push(rx.borrow().loading);
            }
        }
    }

    fn fail(message: &str) -> ImageError {
        ImageError::Api { status: 500, message: message.to_string() }
    }

    impl ServiceGateway for FakeGateway {
        fn generate_images(&self, request: &ImageRequest) -> GenerateFuture<'_> {
            self.calls.lock().unwrap().push("generate_images".into());
            self.requests.lock().unwrap().push(request.clone());
            self.observe();
            let result = match &self.images {
                Some(Ok(images)) => Ok(images.clone()),
                Some(Err(message)) => Err(fail(message)),
                None => Err(fail("unscripted generate_images")),
            };
            Box::pin(async move {
                tokio::task::yield_now().await;
                result
            })
        }

        fn random_prompt(&self, _request: &PromptRequest) -> PromptFuture<'_> {
            self.calls.lock().unwrap().push("random_prompt".into());
            self.observe();
            let result = match &self.prompt {
                Some(Ok(prompt)) => Ok(prompt.clone()),
                Some(Err(message)) => Err(fail(message)),
                None => Err(fail("unscripted random_prompt")),
            };
            Box::pin(async move { result })
        }
    }

    /// Shares the fake with the test after it is boxed into the controller.
    struct SharedGateway(Arc<FakeGateway>);

    impl ServiceGateway for SharedGateway {
        fn generate_images(&self, request: &ImageRequest) -> GenerateFuture<'_> {
            self.0.generate_images(request)
        }

        fn random_prompt(&self, request: &PromptRequest) -> PromptFuture<'_> {
            self.0.random_prompt(request)
        }
    }

    #[derive(Default)]
    struct FakeDictation {
        available: bool,
        sink: Arc<Mutex<Option<TranscriptSink>>>,
        stops: Arc<Mutex<u32>>,
    }

    impl Dictation for FakeDictation {
        fn available(&self) -> bool {
            self.available
        }

        fn start(&self, on_result: TranscriptSink) -> Result<(), ImageError> {
            *self.sink.lock().unwrap() = Some(on_result);
            Ok(())
        }

        fn stop(&self) {
            // Keeps the sink so tests can deliver a late transcript.
            *self.stops.lock().unwrap() += 1;
        }
    }

    fn tr() -> &'static Messages {
        Messages::for_locale(Locale::Tr)
    }

    fn controller(gateway: FakeGateway) -> (Controller, Arc<FakeGateway>) {
        let gateway = Arc::new(gateway);
        let controller = Controller::new(
            Box::new(SharedGateway(Arc::clone(&gateway))),
            Box::new(FakeDictation::default()),
            GenerationSettings::default(),
            tr(),
        );
        *gateway.observer.lock().unwrap() = Some(controller.subscribe());
        (controller, gateway)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Session>) -> Vec<Session> {
        let mut snapshots = Vec::new();
        while let Ok(s) = rx.try_recv() {
            snapshots.push(s);
        }
        snapshots
    }

    #[test]
    fn new_session_defaults() {
        let (controller, _) = controller(FakeGateway::default());
        let session = controller.session();
        assert!(session.prompt.is_empty());
        assert!(session.images.is_empty());
        assert!(!session.loading);
        assert!(session.error.is_none());
        assert_eq!(session.aspect_ratio, ASPECT_RATIOS[1]);
        assert!(!session.listening);
    }

    #[tokio::test]
    async fn cat_prompt_with_square_ratio_yields_four_images() {
        let images = ["data:a", "data:b", "data:c", "data:d"];
        let (controller, gateway) = controller(FakeGateway::with_images(&images));

        controller.dispatch(Command::SelectAspectRatio(ASPECT_RATIOS[0])).await;
        controller.dispatch(Command::SetPrompt("a cat".into())).await;
        controller.dispatch(Command::Generate).await;

        let session = controller.session();
        assert_eq!(session.images, images);
        assert!(session.error.is_none());
        assert!(!session.loading);

        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt, "a cat");
        assert_eq!(requests[0].aspect_ratio, "1:1");
        assert_eq!(requests[0].count, 4);
    }

    #[tokio::test]
    async fn empty_and_blank_prompts_never_reach_the_gateway() {
        for prompt in ["", "   ", "\t\n"] {
            let (controller, gateway) = controller(FakeGateway::with_images(&["data:x"]));
            let mut transitions = controller.transitions();

            controller.generate(prompt).await;

            assert!(gateway.calls.lock().unwrap().is_empty());
            let session = controller.session();
            assert_eq!(session.error.as_deref(), Some("Lütfen bir metin girin."));
            assert!(session.images.is_empty());
            assert!(drain(&mut transitions).iter().all(|s| !s.loading));
        }
    }

    #[tokio::test]
    async fn loading_spans_the_whole_generation() {
        let (controller, gateway) = controller(FakeGateway::with_images(&["data:x"]));
        let mut transitions = controller.transitions();

        assert!(!controller.session().loading);
        controller.generate("a cat").await;

        assert_eq!(*gateway.loading_during_calls.lock().unwrap(), vec![true]);
        let loading: Vec<bool> = drain(&mut transitions).iter().map(|s| s.loading).collect();
        assert_eq!(loading, vec![true, false]);
    }

    #[tokio::test]
    async fn generation_start_clears_previous_outcome() {
        let (controller, _) = controller(FakeGateway::with_images(&["data:x"]));
        controller.generate("").await;
        assert!(controller.session().error.is_some());

        let mut transitions = controller.transitions();
        controller.generate("a cat").await;

        let started = &drain(&mut transitions)[0];
        assert!(started.loading);
        assert!(started.error.is_none());
        assert!(started.images.is_empty());
    }

    #[tokio::test]
    async fn failed_generation_surfaces_the_error_message() {
        let gateway =
            FakeGateway { images: Some(Err("quota exceeded".into())), ..FakeGateway::default() };
        let (controller, _) = controller(gateway);

        controller.generate("a cat").await;

        let session = controller.session();
        assert!(session.images.is_empty());
        assert_eq!(session.error.as_deref(), Some("quota exceeded"));
        assert!(!session.loading);
    }

    #[tokio::test]
    async fn failed_generation_without_message_uses_fallback() {
        let gateway = FakeGateway { images: Some(Err(String::new())), ..FakeGateway::default() };
        let (controller, _) = controller(gateway);

        controller.generate("a cat").await;

        assert_eq!(controller.session().error.as_deref(), Some(tr().generation_failed));
    }

    #[tokio::test]
    async fn failure_after_success_clears_images() {
        let (controller, _) = controller(FakeGateway::with_images(&["data:x"]));
        controller.generate("a cat").await;
        assert_eq!(controller.session().images.len(), 1);

        let failing = Arc::new(FakeGateway {
            images: Some(Err("boom".into())),
            ..FakeGateway::default()
        });
        let controller = Controller {
            gateway: Box::new(SharedGateway(failing)),
            ..controller
        };
        controller.generate("a cat").await;

        let session = controller.session();
        assert!(session.images.is_empty());
        assert_eq!(session.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn random_success_runs_nested_generation() {
        let gateway = FakeGateway {
            prompt: Some(Ok("a lighthouse in fog".into())),
            images: Some(Ok(vec!["data:1".into(), "data:2".into()])),
            ..FakeGateway::default()
        };
        let (controller, gateway) = controller(gateway);
        let mut transitions = controller.transitions();

        controller.dispatch(Command::Random).await;

        let session = controller.session();
        assert_eq!(session.prompt, "a lighthouse in fog");
        assert_eq!(session.images, vec!["data:1", "data:2"]);
        assert!(session.error.is_none());
        assert!(!session.loading);

        assert_eq!(*gateway.calls.lock().unwrap(), vec!["random_prompt", "generate_images"]);
        assert_eq!(*gateway.loading_during_calls.lock().unwrap(), vec![true, true]);
        assert_eq!(gateway.requests.lock().unwrap()[0].prompt, "a lighthouse in fog");

        let snapshots = drain(&mut transitions);
        assert_eq!(snapshots[0].prompt, tr().random_placeholder);
        let last = snapshots.len() - 1;
        assert!(snapshots[..last].iter().all(|s| s.loading));
        assert!(!snapshots[last].loading);
    }

    #[tokio::test]
    async fn random_failure_resets_prompt_without_generating() {
        let gateway = FakeGateway {
            prompt: Some(Err("network down".into())),
            images: Some(Ok(vec!["data:1".into()])),
            ..FakeGateway::default()
        };
        let (controller, gateway) = controller(gateway);
        controller.dispatch(Command::SetPrompt("old".into())).await;

        controller.dispatch(Command::Random).await;

        let session = controller.session();
        assert!(session.prompt.is_empty());
        assert_eq!(session.error.as_deref(), Some(tr().random_failed));
        assert!(session.images.is_empty());
        assert!(!session.loading);
        assert_eq!(*gateway.calls.lock().unwrap(), vec!["random_prompt"]);
    }

    #[tokio::test]
    async fn random_with_nested_generation_failure() {
        let gateway = FakeGateway {
            prompt: Some(Ok("a fox".into())),
            images: Some(Err("safety filter".into())),
            ..FakeGateway::default()
        };
        let (controller, _) = controller(gateway);

        controller.random().await;

        let session = controller.session();
        assert_eq!(session.prompt, "a fox");
        assert_eq!(session.error.as_deref(), Some("safety filter"));
        assert!(session.images.is_empty());
        assert!(!session.loading);
    }

    #[tokio::test]
    async fn random_blank_suggestion_still_settles_loading() {
        let gateway = FakeGateway { prompt: Some(Ok("  ".into())), ..FakeGateway::default() };
        let (controller, gateway) = controller(gateway);

        controller.random().await;

        let session = controller.session();
        assert!(!session.loading);
        assert_eq!(session.error.as_deref(), Some(tr().empty_prompt));
        assert_eq!(*gateway.calls.lock().unwrap(), vec!["random_prompt"]);
    }

    #[tokio::test]
    async fn random_publishes_loading_clear_once() {
        let gateway = FakeGateway {
            prompt: Some(Ok("a fox".into())),
            images: Some(Ok(vec!["data:1".into()])),
            ..FakeGateway::default()
        };
        let (controller, _) = controller(gateway);
        let mut transitions = controller.transitions();

        controller.random().await;

        let snapshots = drain(&mut transitions);
        let clears = snapshots.windows(2).filter(|w| w[0].loading && !w[1].loading).count();
        assert_eq!(clears, 1);
        assert!(!snapshots.last().unwrap().loading);
    }

    #[tokio::test]
    async fn unavailable_dictation_is_ignored() {
        let (controller, _) = controller(FakeGateway::default());
        let before = controller.session();

        controller.dispatch(Command::ToggleDictation).await;

        assert!(!controller.dictation_available());
        assert_eq!(controller.session(), before);
    }

    type SharedSink = Arc<Mutex<Option<TranscriptSink>>>;

    fn dictation_controller() -> (Controller, SharedSink, Arc<Mutex<u32>>) {
        let dictation = FakeDictation { available: true, ..FakeDictation::default() };
        let sink = Arc::clone(&dictation.sink);
        let stops = Arc::clone(&dictation.stops);
        let controller = Controller::new(
            Box::new(FakeGateway::default()),
            Box::new(dictation),
            GenerationSettings::default(),
            tr(),
        );
        (controller, sink, stops)
    }

    #[tokio::test]
    async fn dictation_writes_transcripts_into_prompt() {
        let (controller, sink, stops) = dictation_controller();

        controller.dispatch(Command::ToggleDictation).await;
        assert!(controller.session().listening);

        (sink.lock().unwrap().as_ref().unwrap())("a red fox".into());
        assert_eq!(controller.session().prompt, "a red fox");

        controller.dispatch(Command::ToggleDictation).await;
        assert!(!controller.session().listening);
        assert_eq!(*stops.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn transcripts_after_stop_are_dropped() {
        let (controller, sink, _) = dictation_controller();
        controller.dispatch(Command::ToggleDictation).await;
        (sink.lock().unwrap().as_ref().unwrap())("a red fox".into());
        controller.dispatch(Command::ToggleDictation).await;

        let mut transitions = controller.transitions();
        (sink.lock().unwrap().as_ref().unwrap())("too late".into());

        assert_eq!(controller.session().prompt, "a red fox");
        assert!(drain(&mut transitions).is_empty());
    }
}
