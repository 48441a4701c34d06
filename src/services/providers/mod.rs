//! Third-party collaborators: URL reputation (VirusTotal) and the language
//! model (Gemini). Both sit behind traits so callers can degrade when a
//! provider is unconfigured or failing.

mod gemini;
mod virustotal;

pub use gemini::*;
pub use virustotal::*;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned status {0}")]
    Status(u16),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
