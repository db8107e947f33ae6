use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("Pedidos em formato inválido: {0}")]
    MalformedOrders(String),

    // --- Autenticação / Autorização ---
    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso restrito a administradores")]
    AdminOnly,

    #[error("Usuário não autorizado para esta loja")]
    StoreNotInRoute,

    // --- Não encontrados ---
    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Loja não encontrada")]
    StoreNotFound,

    #[error("Produto não encontrado")]
    ProductNotFound,

    #[error("Visita não encontrada")]
    VisitNotFound,

    #[error("Atribuição não encontrada")]
    AssignmentNotFound,

    // --- Conflitos ---
    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Loja '{0}' já existe")]
    StoreNameAlreadyExists(String),

    #[error("Produto '{0}' já existe")]
    ProductNameAlreadyExists(String),

    #[error("Loja já atribuída ao usuário")]
    StoreAlreadyAssigned,

    #[error("Loja possui dados associados")]
    StoreHasDependents,

    #[error("Produto possui pedidos associados")]
    ProductHasOrders,

    #[error("Usuário possui dados associados")]
    UserHasDependents,

    // --- Falhas internas ---
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de E/S: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) | AppError::MalformedOrders(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::AdminOnly | AppError::StoreNotInRoute => StatusCode::FORBIDDEN,
            AppError::UserNotFound
            | AppError::StoreNotFound
            | AppError::ProductNotFound
            | AppError::VisitNotFound
            | AppError::AssignmentNotFound => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists
            | AppError::StoreNameAlreadyExists(_)
            | AppError::ProductNameAlreadyExists(_)
            | AppError::StoreAlreadyAssigned
            | AppError::StoreHasDependents
            | AppError::ProductHasOrders
            | AppError::UserHasDependents => StatusCode::CONFLICT,
            AppError::DatabaseError(_)
            | AppError::IoError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let error_message = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }
            AppError::BadRequest(reason) => reason.clone(),
            AppError::MalformedOrders(reason) => format!("Pedidos em formato inválido: {}", reason),
            AppError::InvalidCredentials => "E-mail ou senha inválidos.".to_string(),
            AppError::InvalidToken => "Token de autenticação inválido ou ausente.".to_string(),
            AppError::AdminOnly => "Ação restrita a administradores.".to_string(),
            AppError::StoreNotInRoute => "Usuário não autorizado para esta loja.".to_string(),
            AppError::UserNotFound => "Usuário não encontrado.".to_string(),
            AppError::StoreNotFound => "Loja não encontrada.".to_string(),
            AppError::ProductNotFound => "Produto não encontrado.".to_string(),
            AppError::VisitNotFound => "Visita não encontrada.".to_string(),
            AppError::AssignmentNotFound => "Atribuição não encontrada.".to_string(),
            AppError::EmailAlreadyExists => "Este e-mail já está em uso.".to_string(),
            AppError::StoreNameAlreadyExists(name) => format!("Já existe uma loja chamada '{}'.", name),
            AppError::ProductNameAlreadyExists(name) => format!("Já existe um produto chamado '{}'.", name),
            AppError::StoreAlreadyAssigned => "A loja já está atribuída a este usuário.".to_string(),
            AppError::StoreHasDependents => {
                "A loja não pode ser removida pois possui dados associados.".to_string()
            }
            AppError::ProductHasOrders => {
                "O produto não pode ser removido pois possui pedidos associados.".to_string()
            }
            AppError::UserHasDependents => {
                "O usuário não pode ser removido pois possui lojas ou visitas associadas.".to_string()
            }

            // Todos os outros erros viram 500. O detalhe fica só no log.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                "Ocorreu um erro inesperado.".to_string()
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(AppError::UserNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::StoreNotInRoute.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::MalformedOrders("eof".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::ProductHasOrders.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::IoError(std::io::Error::other("disk full")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_hide_details_from_the_client() {
        let response = AppError::IoError(std::io::Error::other("/var/secret")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
