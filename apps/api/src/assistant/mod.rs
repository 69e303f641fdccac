//! PDF-grounded assistant endpoints (chat and voice) and their supporting
//! document cache and text-to-speech wrapper.

pub mod docs;
pub mod handlers;
pub mod tts;
