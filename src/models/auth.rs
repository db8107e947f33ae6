// src/models/auth.rs

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Papel do usuário ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum Role {
    Admin, // Vira "ADMIN"
    User,  // Vira "USER" (entregador / vendedor de campo)
}

// Representa um usuário com a sua rota (lojas atribuídas) já carregada
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub role: Role,

    /// IDs das lojas da rota do usuário.
    #[schema(value_type = Vec<Uuid>)]
    pub route: BTreeSet<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha crua do banco: a rota vem agregada num array do Postgres
#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub route: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role,
            route: row.route.into_iter().collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// Dados já validados e com hash para inserir um usuário
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

// ---
// Validações customizadas
// ---
pub(crate) fn validate_no_angle_brackets(val: &str) -> Result<(), ValidationError> {
    if val.contains('<') || val.contains('>') {
        let mut err = ValidationError::new("no_angle_brackets");
        err.message = Some("Não pode conter os caracteres < ou >.".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validate_password_strength(val: &str) -> Result<(), ValidationError> {
    let has_lower = val.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = val.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = val.chars().any(|c| c.is_ascii_digit());
    let has_special = val.chars().any(|c| !c.is_ascii_alphanumeric());

    if !(has_lower && has_upper && has_digit && has_special) {
        let mut err = ValidationError::new("password_strength");
        err.message = Some(
            "A senha deve conter letra minúscula, letra maiúscula, dígito e caractere especial."
                .into(),
        );
        return Err(err);
    }
    validate_no_angle_brackets(val)
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserPayload {
    #[validate(
        length(min = 1, message = "O nome é obrigatório."),
        custom(function = "validate_no_angle_brackets")
    )]
    #[schema(example = "Carlos Martínez")]
    pub name: String,

    #[validate(
        email(message = "O e-mail fornecido é inválido."),
        custom(function = "validate_no_angle_brackets")
    )]
    #[schema(example = "carlos@rutas.app")]
    pub email: String,

    #[validate(
        length(min = 8, message = "A senha deve ter no mínimo 8 caracteres."),
        custom(function = "validate_password_strength")
    )]
    pub password: String,
}

// Criação de usuário pelo administrador (com papel explícito)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserPayload {
    #[serde(flatten)]
    #[validate(nested)]
    pub account: RegisterUserPayload,

    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

// Atualização parcial do perfil
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserPayload {
    #[validate(custom(function = "validate_no_angle_brackets"))]
    pub name: Option<String>,
    pub role: Option<Role>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub role: Role, // Papel no momento da emissão
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}
