/// Error returned when a document cannot be rendered.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    /// A code block processor rejected a fenced block.
    #[error("code block `{language}` failed: {message}")]
    Processor {
        /// Fence language of the rejected block.
        language: String,
        /// Message reported by the processor.
        message: String,
    },
}
