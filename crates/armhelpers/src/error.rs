//! Error taxonomy for the resource-management facade

use thiserror::Error;

/// Facade errors
///
/// Lower layers are wrapped with [`ArmError::Context`] rather than converted,
/// so [`ArmError::kind`] still reports the original classification.
#[derive(Error, Debug)]
pub enum ArmError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("certificate error: {0}")]
    Certificate(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("unknown resource provider {0:?}")]
    UnknownProvider(String),

    #[error("operation timed out: {0}")]
    OperationTimeout(String),

    #[error("{code}: {message}")]
    ProviderOperation {
        code: String,
        message: String,
        status: Option<u16>,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<ArmError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Classification of an [`ArmError`], independent of context layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Certificate,
    NotFound,
    UnknownProvider,
    OperationTimeout,
    ProviderOperation,
    Transport,
    Io,
    Json,
}

impl ArmError {
    /// Build a provider-side failure from an ARM error envelope
    pub fn provider(code: impl Into<String>, message: impl Into<String>) -> Self {
        ArmError::ProviderOperation {
            code: code.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ArmError::Configuration(_) => ErrorKind::Configuration,
            ArmError::Certificate(_) => ErrorKind::Certificate,
            ArmError::NotFound(_) => ErrorKind::NotFound,
            ArmError::UnknownProvider(_) => ErrorKind::UnknownProvider,
            ArmError::OperationTimeout(_) => ErrorKind::OperationTimeout,
            ArmError::ProviderOperation { status: Some(404), .. } => ErrorKind::NotFound,
            ArmError::ProviderOperation { .. } => ErrorKind::ProviderOperation,
            ArmError::Transport(_) => ErrorKind::Transport,
            ArmError::Context { source, .. } => source.kind(),
            ArmError::Io(_) => ErrorKind::Io,
            ArmError::Json(_) => ErrorKind::Json,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Innermost error, skipping every context layer
    pub fn root(&self) -> &ArmError {
        match self {
            ArmError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn context(self, context: impl Into<String>) -> Self {
        ArmError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ArmError>;

/// Attach operation context to a failed result
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ArmError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().context(context))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| e.into().context(f()))
    }
}
