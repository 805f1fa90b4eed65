//! Prompt assembly for the tutoring session manager.
//!
//! Stored turn history is replayed in full on every continuation; there is no
//! truncation or token budget, so the prompt grows with the session.

use crate::llm::{ChatMessage, ChatRole};
use crate::models::{SessionTurn, TurnRole};

pub const TUTOR_TEMPERATURE: f32 = 0.7;

pub const START_FALLBACK_REPLY: &str = "I'm here to help you succeed!";
pub const CONTINUE_FALLBACK_REPLY: &str = "Let me help you with that!";

/// Messages for the opening exchange: one system instruction embedding the
/// subject and topic verbatim, followed by the student's first question.
pub fn start_messages(subject: &str, topic: &str, initial_question: &str) -> Vec<ChatMessage> {
    let system_prompt = format!(
        "You are Sage, the ScholarHub study tutor, helping university students \
         master their coursework. You are knowledgeable, patient, and encouraging.\n\n\
         Subject: {subject}\nTopic: {topic}\n\n\
         Provide clear, step-by-step explanations with concrete examples. Always \
         encourage the student and remind them of their potential."
    );

    vec![
        ChatMessage {
            role: ChatRole::System,
            content: system_prompt,
        },
        ChatMessage {
            role: ChatRole::User,
            content: initial_question.to_string(),
        },
    ]
}

/// Messages for a continuation: the persona instruction restating the session's
/// subject and topic, the full stored history in order, then the new question.
pub fn continue_messages(
    subject: &str,
    topic: &str,
    turns: &[SessionTurn],
    message: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(turns.len() + 2);

    messages.push(ChatMessage {
        role: ChatRole::System,
        content: format!(
            "You are Sage, the ScholarHub study tutor. Continue helping this student \
             with {subject} - {topic}. Be encouraging and provide clear explanations."
        ),
    });

    for turn in turns {
        messages.push(ChatMessage {
            role: chat_role(turn.role),
            content: turn.content.clone(),
        });
    }

    messages.push(ChatMessage {
        role: ChatRole::User,
        content: message.to_string(),
    });

    messages
}

/// An empty completion text is replaced by the operation's fixed fallback.
pub fn reply_or_fallback(text: String, fallback: &str) -> String {
    if text.is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

fn chat_role(role: TurnRole) -> ChatRole {
    match role {
        TurnRole::User => ChatRole::User,
        TurnRole::Assistant => ChatRole::Assistant,
    }
}
