//! Structured text generation for the deep research engine
//!
//! Wraps an OpenAI chat-completion model behind `StructuredGenerator` and
//! coerces its free-text replies into JSON objects on a best-effort basis.

pub mod coerce;
pub mod openai;

pub use coerce::coerce_object;
pub use openai::OpenAIClient;
