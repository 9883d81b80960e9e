use thiserror::Error;

/// Failure while retrieving a layer or the layer list from a feature source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("server answered {code}: {body}")]
    Status { code: u16, body: String },
    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Common error type for dashboard operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    #[error("layer {layer} returned no features")]
    EmptyResult { layer: String },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

pub type DashboardResult<T> = Result<T, DashboardError>;

impl DashboardError {
    /// Text shown to the user in the transient message area.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::EmptyResult { layer } => {
                format!("No se encontraron datos para {layer}.")
            }
            DashboardError::Fetch(_) => {
                "No se pudo cargar la capa. Intente de nuevo más tarde.".to_string()
            }
            DashboardError::InvalidRequest(reason) => format!("Solicitud inválida: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_converts_into_dashboard_error() {
        let err: DashboardError = FetchError::Transport("connection refused".into()).into();
        assert!(matches!(err, DashboardError::Fetch(FetchError::Transport(_))));
        assert_eq!(err.to_string(), "transport failure: connection refused");
    }

    #[test]
    fn empty_result_message_names_layer() {
        let err = DashboardError::EmptyResult {
            layer: "focos_2024".into(),
        };
        assert_eq!(err.user_message(), "No se encontraron datos para focos_2024.");
    }

    #[test]
    fn user_messages_are_in_spanish() {
        let fetch: DashboardError = FetchError::Transport("timeout".into()).into();
        assert_eq!(
            fetch.user_message(),
            "No se pudo cargar la capa. Intente de nuevo más tarde."
        );
        let invalid = DashboardError::InvalidRequest("nombre de capa vacío".into());
        assert_eq!(invalid.user_message(), "Solicitud inválida: nombre de capa vacío");
    }
}
