use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error raised by any stage of the authentication chain
///
/// Transport failures, unreadable response bodies, API-declared errors and
/// malformed data all surface as this one type. The wrapped cause, when
/// present, is available through [`std::error::Error::source`].
#[derive(Error, Debug)]
#[error("{message}")]
pub struct AuthError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Classified XErr code, if Xbox Live rejected the request
    pub fn xbox_error(&self) -> Option<&XboxError> {
        self.source.as_deref()?.downcast_ref::<XboxError>()
    }
}

/// Xbox Live error codes from the XErr field
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum XboxError {
    #[error("No Xbox profile associated with account")]
    NoXboxProfile,

    #[error("Not available in country")]
    CountryNotSupported,

    #[error("Adult verification required (South Korea)")]
    AdultVerificationRequired,

    #[error("Child account must be added to a family")]
    ChildAccountRequiresFamily,

    #[error("Unknown error")]
    Unknown(u64),
}

impl XboxError {
    /// Classify an XErr code from an XBL/XSTS response
    pub fn from_xerr(code: u64) -> Self {
        match code {
            2148916233 => Self::NoXboxProfile,
            2148916235 => Self::CountryNotSupported,
            2148916236 | 2148916237 => Self::AdultVerificationRequired,
            2148916238 => Self::ChildAccountRequiresFamily,
            code => Self::Unknown(code),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

/// Attach a stage description to a foreign error
pub(crate) trait ResultExt<T> {
    fn context(self, message: &str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, message: &str) -> Result<T> {
        self.map_err(|e| AuthError::with_source(message, e))
    }
}
