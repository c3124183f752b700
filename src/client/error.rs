use thiserror::Error;

/// Erreurs côté client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Erreur HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Réponse {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Authentification requise")]
    NotAuthenticated,

    #[error("Session admin expirée")]
    SessionExpired,

    #[error("Erreur d'entrée/sortie: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erreur de sérialisation: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ClientError {
    /// Statut HTTP de la réponse en erreur, s'il y en a une
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
