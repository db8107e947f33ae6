// src/handlers/visits.rs

use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::RequireAdmin},
    models::{
        auth::Role,
        visit::{RegisterVisitForm, VisitCreated, VisitDetail},
    },
    services::visit_service::RegisterVisit,
};

#[utoipa::path(
    post,
    path = "/api/visits",
    tag = "Visits",
    request_body(content = RegisterVisitForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Visita registrada", body = VisitCreated),
        (status = 400, description = "Formulário ou pedidos inválidos"),
        (status = 403, description = "Loja fora da rota do usuário"),
        (status = 404, description = "Usuário ou loja não encontrados")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_visit(
    State(app_state): State<AppState>,
    AuthenticatedUser(requester): AuthenticatedUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<VisitCreated>), AppError> {
    let (form, photo_name) = read_visit_form(multipart).await?;

    // Agente de campo só registra visitas em nome próprio
    if requester.role != Role::Admin && requester.id != form.user_id {
        return Err(AppError::AdminOnly);
    }

    let cmd = RegisterVisit {
        user_id: form.user_id,
        store_id: form.store_id,
        validation: form.validation,
        orders_payload: form.orders,
        photo: form.photo,
        photo_name,
    };
    let id = app_state.visit_service.register_visit(cmd).await?;
    Ok((StatusCode::CREATED, Json(VisitCreated { id })))
}

#[utoipa::path(
    get,
    path = "/api/visits",
    tag = "Visits",
    responses((status = 200, description = "Visitas com os seus pedidos", body = Vec<VisitDetail>)),
    security(("api_jwt" = []))
)]
pub async fn list_visits(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<VisitDetail>>, AppError> {
    Ok(Json(app_state.visit_service.list_visits().await?))
}

#[utoipa::path(
    get,
    path = "/api/visits/{id}",
    tag = "Visits",
    params(("id" = Uuid, Path, description = "ID da visita")),
    responses(
        (status = 200, description = "Visita com os seus pedidos", body = VisitDetail),
        (status = 404, description = "Visita não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_visit(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<VisitDetail>, AppError> {
    Ok(Json(app_state.visit_service.get_visit(id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/visits/{id}",
    tag = "Visits",
    params(("id" = Uuid, Path, description = "ID da visita")),
    responses(
        (status = 204, description = "Visita e pedidos removidos"),
        (status = 404, description = "Visita não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_visit(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.visit_service.delete_visit(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Leitura do formulário multipart
// ---
// Devolve o formulário e o nome original da foto
async fn read_visit_form(
    mut multipart: Multipart,
) -> Result<(RegisterVisitForm, String), AppError> {
    let mut user_id = None;
    let mut store_id = None;
    let mut validation = None;
    let mut orders = None;
    let mut photo = None;

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            "userId" | "userUuid" => user_id = Some(parse_uuid("userId", &text(field).await?)?),
            "storeId" | "storeUuid" => store_id = Some(parse_uuid("storeId", &text(field).await?)?),
            "validation" => validation = Some(parse_flag(&text(field).await?)?),
            "orders" | "ordersJson" => orders = Some(text(field).await?),
            "photo" => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await.map_err(form_error)?;
                photo = Some((file_name, bytes.to_vec()));
            }
            other => tracing::debug!("Campo ignorado no formulário de visita: {}", other),
        }
    }

    let (photo_name, photo) =
        photo.ok_or_else(|| AppError::BadRequest("A foto da visita é obrigatória.".into()))?;
    if photo.is_empty() {
        return Err(AppError::BadRequest("A foto da visita está vazia.".into()));
    }

    let form = RegisterVisitForm {
        user_id: user_id.ok_or_else(|| missing("userId"))?,
        store_id: store_id.ok_or_else(|| missing("storeId"))?,
        validation: validation.ok_or_else(|| missing("validation"))?,
        orders: orders.unwrap_or_default(),
        photo,
    };
    Ok((form, photo_name))
}

async fn text(field: Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(form_error)
}

fn form_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Formulário inválido: {}", e.body_text()))
}

fn missing(field: &str) -> AppError {
    AppError::BadRequest(format!("O campo '{field}' é obrigatório."))
}

fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("O campo '{field}' não é um UUID válido.")))
}

fn parse_flag(raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" => Ok(true),
        "false" | "0" | "off" => Ok(false),
        _ => Err(AppError::BadRequest(
            "O campo 'validation' deve ser true ou false.".into(),
        )),
    }
}
