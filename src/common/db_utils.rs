use crate::common::error::AppError;

// ---
// Helpers de tradução de erros do Postgres
// ---

/// Converte violação de chave única em um erro de domínio.
/// Qualquer outro erro segue como `DatabaseError`.
pub(crate) fn on_unique_violation(
    e: sqlx::Error,
    conflict: impl FnOnce(Option<&str>) -> AppError,
) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return conflict(db_err.constraint());
        }
    }
    e.into()
}

/// Violação de FK na remoção: ainda existe alguém apontando para a linha.
pub(crate) fn on_foreign_key_violation(e: sqlx::Error, conflict: AppError) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return conflict;
        }
    }
    e.into()
}
