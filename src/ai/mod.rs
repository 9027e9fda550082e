mod gemini;
mod prompt;

pub use gemini::GeminiClient;
pub use prompt::compose_prompt;
