use thiserror::Error;

/// Errors from the local session store.
///
/// Corrupted stored data is not an error here: it is recovered as an empty
/// collection and logged by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("chat session '{0}' not found")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors from a model inference call.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    RequestFailed(String),

    #[error("inference endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode inference response: {0}")]
    Deserialization(String),

    #[error("model '{0}' not found")]
    UnknownModel(String),

    #[error("authentication with the inference endpoint failed")]
    AuthenticationFailed,
}

/// Errors surfaced by the chat session controller to its caller.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat controller has not been initialized")]
    NotInitialized,

    #[error("message is empty")]
    EmptyMessage,

    #[error("no active chat session")]
    NoActiveSession,

    #[error("unknown chat session '{0}'")]
    UnknownSession(String),

    #[error("unknown model '{0}'")]
    UnknownModel(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("model request failed: {0}")]
    Inference(#[from] InferenceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::NotFound("abc".to_string());
        assert_eq!(err.to_string(), "chat session 'abc' not found");
    }

    #[test]
    fn test_inference_error_display() {
        let err = InferenceError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("bad gateway"));
    }

    #[test]
    fn test_chat_error_from_conversions() {
        let err: ChatError = StoreError::NotFound("x".to_string()).into();
        assert!(matches!(err, ChatError::Storage(StoreError::NotFound(_))));
        assert_eq!(err.to_string(), "chat session 'x' not found");

        let err: ChatError = InferenceError::AuthenticationFailed.into();
        assert!(matches!(err, ChatError::Inference(_)));
        assert!(err.to_string().starts_with("model request failed"));
    }
}
