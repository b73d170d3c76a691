//! Locally produced chat turns.

use architect_core::profile::UserProfile;
use architect_core::session::ChatMessage;

/// Shown in place of a reply whose stream failed.
pub const CHAT_ERROR: &str = "Connection error. Please check your API key or internet connection.";

/// Greeting added when a conversation starts with no history. Attributed to
/// the model but never generated by it.
pub fn welcome_message(profile: &UserProfile) -> ChatMessage {
    ChatMessage::model(format!(
        "Hello {name}. I have been trained on your approved profile strategy.\n\n\
         **Headline:** *Loaded*\n\
         **About:** *Loaded*\n\
         **Tone:** *{tone}*\n\n\
         I am ready to write your next LinkedIn post. What's on your mind?",
        name = profile.full_name,
        tone = profile.tone,
    ))
}
