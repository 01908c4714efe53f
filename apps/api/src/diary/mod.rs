// Diary entries: storage, the creation pipeline, and HTTP handlers.
// LLM calls go through the enhancement module, never from here.

pub mod handlers;
pub mod pipeline;
pub mod store;
