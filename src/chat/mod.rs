//! Chat domain: the trader answers questions through an OpenAI-compatible
//! endpoint. The request runs on the async compute pool; the main loop only
//! polls for the reply.

use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy::tasks::{block_on, AsyncComputeTaskPool, Task};

use crate::shared::*;

mod client;

pub use client::{
    build_messages, build_request_body, build_status_prompt, extract_reply, request_reply, ChatError,
    ChatMessage, GameStatus, Role,
};

pub const GREETING: &str = "Hello! Ask me anything in English.";
pub const FAILURE_REPLY: &str = "Oops, I couldn't reach the server...";
const MAX_INPUT_CHARS: usize = 200;

/// Conversation shown in the chat panel plus the request in flight.
#[derive(Resource)]
pub struct ChatState {
    pub history: Vec<ChatMessage>,
    pub input: String,
    pub thinking: bool,
    task: Option<Task<String>>,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            history: vec![ChatMessage::new(Role::Assistant, GREETING)],
            input: String::new(),
            thinking: false,
            task: None,
        }
    }
}

impl ChatState {
    /// Append and keep only the newest `limit` entries.
    pub fn push(&mut self, message: ChatMessage, limit: usize) {
        self.history.push(message);
        let excess = self.history.len().saturating_sub(limit.max(1));
        self.history.drain(..excess);
    }

    /// Take the typed line if a new message may be sent now.
    pub fn take_input(&mut self) -> Option<String> {
        if self.thinking {
            return None;
        }
        let text = self.input.trim().to_string();
        self.input.clear();
        (!text.is_empty()).then_some(text)
    }

    /// The reply task finished: record the answer and accept input again.
    pub fn receive(&mut self, reply: String, limit: usize) {
        self.push(ChatMessage::new(Role::Assistant, reply), limit);
        self.thinking = false;
    }
}

pub struct ChatPlugin;

impl Plugin for ChatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ChatState>()
            .add_systems(Update, open_chat.run_if(in_state(GameState::Playing)))
            // Key events are read every frame so the chat line only sees
            // presses made while the panel is open.
            .add_systems(
                Update,
                (
                    chat_text_entry,
                    chat_controls.run_if(in_state(GameState::Chat)),
                )
                    .chain(),
            )
            // Replies land even if the panel was closed meanwhile.
            .add_systems(Update, poll_chat_reply);
    }
}

pub fn open_chat(input: Res<PlayerInput>, mut next_state: ResMut<NextState<GameState>>) {
    if input.toggle_chat {
        next_state.set(GameState::Chat);
    }
}

/// Printable keys go into the input line; Backspace deletes. Outside the
/// chat state the events are drained and dropped.
pub fn chat_text_entry(
    state: Res<State<GameState>>,
    mut keys: EventReader<KeyboardInput>,
    mut chat: ResMut<ChatState>,
) {
    if *state.get() != GameState::Chat {
        keys.clear();
        return;
    }
    for event in keys.read() {
        if event.state != ButtonState::Pressed {
            continue;
        }
        match &event.logical_key {
            Key::Character(text) => {
                for c in text.chars().filter(|c| !c.is_control()) {
                    if chat.input.chars().count() < MAX_INPUT_CHARS {
                        chat.input.push(c);
                    }
                }
            }
            Key::Space => {
                if chat.input.chars().count() < MAX_INPUT_CHARS {
                    chat.input.push(' ');
                }
            }
            Key::Backspace => {
                chat.input.pop();
            }
            _ => {}
        }
    }
}

pub fn chat_controls(
    input: Res<PlayerInput>,
    config: Res<GameConfig>,
    player: Option<Res<PlayerState>>,
    day: Option<Res<DayCycle>>,
    mut chat: ResMut<ChatState>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if input.toggle_chat || input.ui_cancel {
        next_state.set(GameState::Playing);
        return;
    }
    if !input.ui_confirm {
        return;
    }
    let Some(text) = chat.take_input() else {
        return;
    };

    let chat_config = config.chat.clone();
    chat.push(ChatMessage::new(Role::User, text), chat_config.history_limit);
    chat.thinking = true;

    let status = GameStatus::snapshot(player.as_deref(), day.as_deref());
    let messages = build_messages(&chat_config, &chat.history, &status);
    let body = build_request_body(&chat_config, &messages);

    let pool = AsyncComputeTaskPool::get();
    chat.task = Some(pool.spawn(async move {
        match request_reply(&chat_config, &body) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("[Chat] {e}");
                FAILURE_REPLY.to_string()
            }
        }
    }));
    debug!("[Chat] Request sent with {} messages", messages.len());
}

pub fn poll_chat_reply(config: Res<GameConfig>, mut chat: ResMut<ChatState>) {
    let Some(task) = chat.task.as_mut() else {
        return;
    };
    let finished = block_on(futures_lite::future::poll_once(task));
    let Some(reply) = finished else {
        return;
    };
    info!("[Chat] Reply: {reply}");
    chat.task = None;
    chat.receive(reply, config.chat.history_limit);
}
