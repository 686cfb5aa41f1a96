// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas de sessão
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout));

    let user_routes = Router::new().route("/me", get(handlers::auth::get_me));

    let admin_routes = Router::new()
        .route("/dashboard", get(handlers::admin::dashboard))
        .route(
            "/tecnicos",
            get(handlers::admin::list_tecnicos).post(handlers::admin::create_tecnico),
        )
        .route("/tecnicos/{id}/password", put(handlers::admin::reset_password))
        .route(
            "/recomendaciones",
            get(handlers::admin::list_recomendaciones).post(handlers::admin::create_recomendacion),
        )
        .route(
            "/recomendaciones/{id}/estado",
            put(handlers::admin::update_recomendacion_estado),
        )
        .route(
            "/huertos",
            get(handlers::huertos::list_huertos).post(handlers::huertos::create_huerto),
        )
        .route("/huertos/{id}/responsable", put(handlers::huertos::set_responsable))
        .route("/huertos/{id}/bitacora", get(handlers::huertos::bitacora))
        .route("/huertos/{id}/actividades", post(handlers::huertos::registrar_actividad))
        .route(
            "/bodegas",
            get(handlers::bodegas::list_bodegas).post(handlers::bodegas::create_bodega),
        )
        .route(
            "/bodegas/{id}",
            put(handlers::bodegas::update_bodega).delete(handlers::bodegas::delete_bodega),
        )
        .route("/bodegas/{id}/tecnicos", put(handlers::bodegas::set_tecnicos))
        .route(
            "/bodegas/{id}/quimicos",
            get(handlers::bodegas::list_quimicos).post(handlers::bodegas::add_quimico),
        )
        .route(
            "/quimicos/{id}",
            put(handlers::bodegas::update_quimico).delete(handlers::bodegas::delete_quimico),
        )
        .route(
            "/formularios",
            get(handlers::admin::list_formularios).post(handlers::admin::create_formulario),
        );

    let tecnico_routes = Router::new()
        .route("/dashboard", get(handlers::tecnico::dashboard))
        .route("/recomendaciones", get(handlers::tecnico::recomendaciones))
        .route(
            "/recomendacion/{id}/completar",
            post(handlers::tecnico::completar_recomendacion),
        )
        .route("/mis_huertos", get(handlers::tecnico::mis_huertos))
        .route("/huertos/{id}/bitacora", get(handlers::tecnico::bitacora))
        .route("/huertos/{id}/actividades", post(handlers::tecnico::registrar_actividad))
        .route("/mis_bodegas", get(handlers::tecnico::mis_bodegas))
        .route(
            "/bodegas/{id}/quimicos",
            get(handlers::tecnico::list_quimicos).post(handlers::tecnico::add_quimico),
        )
        .route(
            "/quimicos/{id}",
            put(handlers::tecnico::update_quimico).delete(handlers::tecnico::delete_quimico),
        )
        .route("/formulario/{id}", get(handlers::tecnico::get_formulario))
        .route(
            "/formulario/{id}/responder",
            post(handlers::tecnico::responder_formulario),
        )
        .route("/todos_los_quimicos", get(handlers::tecnico::todos_los_quimicos));

    let doc_routes = Router::new()
        .route(
            "/admin",
            get(handlers::documentos::admin_list).post(handlers::documentos::register),
        )
        .route("/list", get(handlers::documentos::list))
        .route(
            "/{id}",
            get(handlers::documentos::get_documento).delete(handlers::documentos::delete),
        );

    let geo_routes = Router::new()
        .route("/map", get(handlers::geo::map_center))
        .route("/api/huertos", get(handlers::geo::huertos_geojson))
        .route("/api/parcelas", get(handlers::geo::parcelas_geojson))
        .route("/api/actividades", get(handlers::geo::actividades_geojson))
        .route("/api/parcelas/{id}", get(handlers::geo::parcela_feature))
        .route("/api/actividades/{id}", get(handlers::geo::actividad_feature))
        .route(
            "/parcelas",
            get(handlers::geo::list_parcelas).post(handlers::geo::create_parcela),
        )
        .route(
            "/parcelas/{id}",
            put(handlers::geo::update_parcela).delete(handlers::geo::delete_parcela),
        )
        .route("/actividades", post(handlers::geo::registrar_actividad))
        .route(
            "/tipos",
            get(handlers::geo::list_tipos).post(handlers::geo::create_tipo),
        )
        .route(
            "/tipos/{id}",
            put(handlers::geo::update_tipo).delete(handlers::geo::delete_tipo),
        )
        .route("/estilos", get(handlers::geo::estilos));

    // Tudo abaixo de /api (exceto sessão, empresas e health) exige token
    let protected = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/tecnico", tecnico_routes)
        .nest("/api/docs", doc_routes)
        .nest("/api/geo", geo_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/api/empresas",
            get(handlers::auth::list_empresas).post(handlers::auth::register_empresa),
        )
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .with_state(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
}
