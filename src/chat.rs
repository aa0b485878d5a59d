//! Chat widget boundary
//!
//! Turns a conversation plus a new user message into a single reply string
//! from the generative-language API. Failures never escape: every error is
//! mapped to a readable fallback line that the widget shows as a reply.

use std::cell::{Ref, RefCell};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// API root; the model and method are appended
pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// First line of every conversation. Shown, never sent.
pub const GREETING: &str = "System Online. How can I assist with your project today?";

/// Reply shown when the call itself is lost
pub const UPLINK_FAILED: &str = "Critical Error: Uplink failed.";

/// Assistant persona sent as the system instruction
pub const PERSONA: &str = "You are the professional AI Assistant for 'Amblify', a digital \
marketing and design portfolio. Assist visitors with questions about Digital Strategy, UI/UX \
Design, Cloud Systems, and Brand Identity. For project inquiries, direct them to \
amblify@workwithabhinav.com. Stay silent until the user speaks first. Keep responses concise.";

/// Who said a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// `"user"` is the user; any other sender name is the assistant
impl<'de> Deserialize<'de> for Speaker {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(if name == "user" {
            Speaker::User
        } else {
            Speaker::Assistant
        })
    }
}

impl Speaker {
    /// Role name on the wire
    pub fn role(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Assistant => "model",
        }
    }
}

/// One line of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }
}

/// Chat failures. Each has a user-facing fallback line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatError {
    #[error("API key missing")]
    MissingApiKey,

    #[error("model failed to initialize: {0}")]
    InitFailed(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Malformed(err.to_string())
    }
}

impl ChatError {
    /// Text shown in place of a reply
    pub fn fallback_message(&self) -> String {
        match self {
            ChatError::MissingApiKey => "System Error: API Key missing on server.".to_string(),
            ChatError::InitFailed(reason) => {
                format!("System Error: Model failed to initialize. ({reason})")
            }
            ChatError::Request(reason) | ChatError::Api(reason) | ChatError::Malformed(reason) => {
                format!("Error: {reason}")
            }
        }
    }
}

/// API credentials and model selection
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub system_instruction: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            system_instruction: PERSONA.to_string(),
        }
    }
}

impl ChatConfig {
    pub const API_KEY_VAR: &'static str = "GEMINI_API_KEY";
    pub const MODEL_VAR: &'static str = "GEMINI_MODEL";

    pub fn with_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Read `GEMINI_API_KEY` and `GEMINI_MODEL` from the process environment.
    ///
    /// Native only. The web build never embeds a key; the host page passes
    /// one in at runtime through `from_values`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var(Self::API_KEY_VAR).ok(),
            std::env::var(Self::MODEL_VAR).ok(),
        )
    }

    /// Config from host-supplied values. A blank key counts as missing and a
    /// blank model falls back to `DEFAULT_MODEL`.
    pub fn from_values(api_key: Option<String>, model: Option<String>) -> Self {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        match &api_key {
            Some(key) => {
                let tail = key.char_indices().rev().nth(3).map_or(key.as_str(), |(i, _)| &key[i..]);
                log::info!("Chat configured with key ending in {tail}");
            }
            None => log::error!("{} is missing or empty", Self::API_KEY_VAR),
        }
        Self {
            api_key,
            model: model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            ..Self::default()
        }
    }

    /// Key and model, or the reason the model can't be used
    pub fn validate(&self) -> Result<(&str, &str), ChatError> {
        let key = self.api_key.as_deref().ok_or(ChatError::MissingApiKey)?;
        let model = self.model.trim();
        if model.is_empty() || model.contains(|c: char| c == '/' || c.is_whitespace()) {
            return Err(ChatError::InitFailed(format!("invalid model name '{}'", self.model)));
        }
        Ok((key, model))
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{API_BASE}/{model}:generateContent")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiErrorBody>,
}

/// A ready-to-send API call
pub struct ChatRequest {
    pub url: String,
    pub api_key: String,
    /// JSON body
    pub body: String,
}

/// Build the `generateContent` call: history in order, then the new message
pub fn build_request(
    config: &ChatConfig,
    history: &[ChatTurn],
    message: &str,
) -> Result<ChatRequest, ChatError> {
    let (key, model) = config.validate()?;
    let mut contents: Vec<Content> = history
        .iter()
        .map(|turn| Content::text(turn.speaker.role(), &turn.text))
        .collect();
    contents.push(Content::text(Speaker::User.role(), message));

    let request = GenerateRequest {
        system_instruction: Content::text("system", &config.system_instruction),
        contents,
    };
    Ok(ChatRequest {
        url: config.endpoint(model),
        api_key: key.to_string(),
        body: serde_json::to_string(&request)?,
    })
}

/// Extract the reply text from a response body
pub fn parse_response(body: &str) -> Result<String, ChatError> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        return Err(ChatError::Api(error.message));
    }
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ChatError::Malformed("no candidates in response".to_string()))?;
    Ok(candidate
        .content
        .parts
        .into_iter()
        .map(|p| p.text)
        .collect())
}

/// Sends a request and returns the raw response body
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: &ChatRequest) -> Result<String, ChatError>;
}

/// Browser `fetch` transport
#[cfg(target_arch = "wasm32")]
pub struct FetchTransport;

#[cfg(target_arch = "wasm32")]
impl Transport for FetchTransport {
    async fn send(&self, request: &ChatRequest) -> Result<String, ChatError> {
        use wasm_bindgen::{JsCast, JsValue};
        use wasm_bindgen_futures::JsFuture;

        fn js_err(err: JsValue) -> ChatError {
            ChatError::Request(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
        }

        let window = web_sys::window().ok_or_else(|| ChatError::Request("no window".to_string()))?;

        let headers = web_sys::Headers::new().map_err(js_err)?;
        headers.set("Content-Type", "application/json").map_err(js_err)?;
        headers.set("x-goog-api-key", &request.api_key).map_err(js_err)?;

        let init = web_sys::RequestInit::new();
        init.set_method("POST");
        init.set_mode(web_sys::RequestMode::Cors);
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&request.body));

        let req = web_sys::Request::new_with_str_and_init(&request.url, &init).map_err(js_err)?;
        let resp: web_sys::Response = JsFuture::from(window.fetch_with_request(&req))
            .await
            .map_err(js_err)?
            .dyn_into()
            .map_err(js_err)?;
        log::debug!("Chat response status {}", resp.status());

        let text = JsFuture::from(resp.text().map_err(js_err)?)
            .await
            .map_err(js_err)?;
        text.as_string()
            .ok_or_else(|| ChatError::Malformed("response body is not text".to_string()))
    }
}

/// Configuration plus transport
pub struct ChatClient<T: Transport> {
    config: ChatConfig,
    transport: T,
}

impl<T: Transport> ChatClient<T> {
    pub fn new(config: ChatConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Reply text for `message`; on any failure, the fallback line
    pub async fn generate_response(&self, history: &[ChatTurn], message: &str) -> String {
        match self.try_generate(history, message).await {
            Ok(text) => text,
            Err(err) => {
                log::error!("Chat generation failed: {err}");
                err.fallback_message()
            }
        }
    }

    async fn try_generate(&self, history: &[ChatTurn], message: &str) -> Result<String, ChatError> {
        let request = build_request(&self.config, history, message)?;
        let body = self.transport.send(&request).await?;
        parse_response(&body)
    }
}

/// A send accepted by the widget, waiting for its reply
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSend {
    /// Conversation before this message, greeting excluded
    pub history: Vec<ChatTurn>,
    pub message: String,
}

/// Visible conversation state of the assistant widget
#[derive(Debug, Clone)]
pub struct ChatWidget {
    messages: Vec<ChatTurn>,
    loading: bool,
}

impl Default for ChatWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatWidget {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatTurn::assistant(GREETING)],
            loading: false,
        }
    }

    pub fn messages(&self) -> &[ChatTurn] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Accept user input. Blank input and sends while a reply is pending are ignored.
    pub fn begin_send(&mut self, input: &str) -> Option<PendingSend> {
        if input.trim().is_empty() || self.loading {
            return None;
        }
        let history = self.messages[1..].to_vec();
        self.messages.push(ChatTurn::user(input));
        self.loading = true;
        Some(PendingSend {
            history,
            message: input.to_string(),
        })
    }

    pub fn finish(&mut self, reply: impl Into<String>) {
        self.messages.push(ChatTurn::assistant(reply));
        self.loading = false;
    }

    /// The call never came back
    pub fn fail(&mut self) {
        self.finish(UPLINK_FAILED);
    }
}

/// Marks the widget failed if a send is dropped before its reply lands
struct InFlight<'a> {
    widget: &'a RefCell<ChatWidget>,
    done: bool,
}

impl InFlight<'_> {
    fn complete(mut self, reply: &str) {
        self.done = true;
        self.widget.borrow_mut().finish(reply);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        log::warn!("Chat send dropped before a reply arrived");
        if let Ok(mut widget) = self.widget.try_borrow_mut() {
            widget.fail();
        }
    }
}

/// A widget wired to a client: the assistant panel's full send cycle
pub struct ChatSession<T: Transport> {
    client: ChatClient<T>,
    widget: RefCell<ChatWidget>,
}

impl<T: Transport> ChatSession<T> {
    pub fn new(client: ChatClient<T>) -> Self {
        Self {
            client,
            widget: RefCell::new(ChatWidget::new()),
        }
    }

    pub fn widget(&self) -> Ref<'_, ChatWidget> {
        self.widget.borrow()
    }

    /// Send `input` and append the reply. Returns `None` if the widget
    /// rejected the input (blank, or a reply still pending).
    pub async fn send(&self, input: &str) -> Option<String> {
        let pending = self.widget.borrow_mut().begin_send(input)?;
        let flight = InFlight {
            widget: &self.widget,
            done: false,
        };
        let reply = self
            .client
            .generate_response(&pending.history, &pending.message)
            .await;
        flight.complete(&reply);
        Some(reply)
    }
}
