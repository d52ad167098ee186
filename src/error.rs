use crate::store::StoreError;

/// Input rejected before any backend call. The display text is what the
/// user sees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Completa toda la configuración requerida")]
    IncompleteSelection,
    #[error("Selecciona {0} primero")]
    UpstreamNotSelected(&'static str),
    #[error("Fecha inválida")]
    InvalidDate,
    #[error("Estudiante fuera de la lista")]
    UnknownStudent,
    #[error("Por favor completa todos los campos")]
    MissingNames,
    #[error("La lista está vacía")]
    EmptyBulkList,
    #[error("Puntaje inválido")]
    InvalidScore,
}

/// Outcome of a failed user action, flattened to the two kinds the user
/// can tell apart.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{notice}")]
    Sync {
        notice: &'static str,
        #[source]
        source: StoreError,
    },
}

impl AppError {
    pub fn sync(notice: &'static str) -> impl FnOnce(StoreError) -> AppError {
        move |source| AppError::Sync { notice, source }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_failed",
            AppError::Sync { .. } => "sync_failed",
        }
    }

    /// Text for the error notification.
    pub fn notice(&self) -> String {
        self.to_string()
    }

    pub fn details(&self) -> Option<String> {
        match self {
            AppError::Validation(_) => None,
            AppError::Sync { source, .. } => Some(source.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_separate_validation_from_sync() {
        let v = AppError::from(ValidationError::InvalidScore);
        assert_eq!(v.code(), "validation_failed");
        assert_eq!(v.notice(), "Puntaje inválido");
        assert_eq!(v.details(), None);

        let s = AppError::sync("Error de sincronización")(StoreError::Protocol("eof".to_string()));
        assert_eq!(s.code(), "sync_failed");
        assert_eq!(s.notice(), "Error de sincronización");
        assert!(s.details().expect("details").contains("eof"));
    }
}
