//! These models represent the objects passed around by the agent
//!
//! The internal message shape follows the chat-completions wire format closely:
//! a role, a text body, and the tool-call bookkeeping needed to pair tool results
//! with the assistant turn that requested them. Conversion to and from the exact
//! JSON the endpoint expects lives in `providers::utils`.
pub mod message;
pub mod role;
pub mod tool;
