// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::users::list_users,
        handlers::users::list_agents,
        handlers::users::list_admins,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::users::stores_of_user,

        // --- Stores ---
        handlers::stores::create_store,
        handlers::stores::list_stores,
        handlers::stores::get_store,
        handlers::stores::update_store,
        handlers::stores::delete_store,

        // --- Products ---
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,

        // --- Routes / Catálogo ---
        handlers::assignments::assign_store,
        handlers::assignments::unassign_store,
        handlers::assignments::assign_products,
        handlers::assignments::unassign_product,

        // --- Visits ---
        handlers::visits::register_visit,
        handlers::visits::list_visits,
        handlers::visits::get_visit,
        handlers::visits::delete_visit,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Stores ---
            models::store::Store,
            models::store::StoreWithProducts,
            models::store::CreateStorePayload,
            models::store::UpdateStorePayload,

            // --- Products ---
            models::product::Product,
            models::product::CreateProductPayload,
            models::product::UpdateProductPayload,

            // --- Assignments ---
            models::assignment::RouteAssignmentPayload,
            models::assignment::AssignProductsPayload,
            models::assignment::UnassignProductPayload,

            // --- Visits ---
            models::visit::OrderRequest,
            models::visit::OrderLineDetail,
            models::visit::VisitDetail,
            models::visit::VisitCreated,
            models::visit::RegisterVisitForm,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Usuários, papéis e rota de cada agente"),
        (name = "Stores", description = "Lojas e QR"),
        (name = "Products", description = "Catálogo de produtos"),
        (name = "Routes", description = "Atribuição de lojas a usuários e de produtos a lojas"),
        (name = "Visits", description = "Registro de visitas com evidência e pedidos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
