pub mod gemini;
pub(crate) mod http_errors;

pub use gemini::GeminiGateway;
