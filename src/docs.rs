// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth / Empresas ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,
        handlers::auth::list_empresas,
        handlers::auth::register_empresa,

        // --- Admin ---
        handlers::admin::dashboard,
        handlers::admin::list_tecnicos,
        handlers::admin::create_tecnico,
        handlers::admin::reset_password,
        handlers::admin::list_recomendaciones,
        handlers::admin::create_recomendacion,
        handlers::admin::update_recomendacion_estado,
        handlers::admin::list_formularios,
        handlers::admin::create_formulario,

        // --- Huertos ---
        handlers::huertos::list_huertos,
        handlers::huertos::create_huerto,
        handlers::huertos::set_responsable,
        handlers::huertos::bitacora,
        handlers::huertos::registrar_actividad,

        // --- Bodegas ---
        handlers::bodegas::list_bodegas,
        handlers::bodegas::create_bodega,
        handlers::bodegas::update_bodega,
        handlers::bodegas::delete_bodega,
        handlers::bodegas::set_tecnicos,
        handlers::bodegas::list_quimicos,
        handlers::bodegas::add_quimico,
        handlers::bodegas::update_quimico,
        handlers::bodegas::delete_quimico,

        // --- Técnico ---
        handlers::tecnico::dashboard,
        handlers::tecnico::recomendaciones,
        handlers::tecnico::completar_recomendacion,
        handlers::tecnico::mis_huertos,
        handlers::tecnico::bitacora,
        handlers::tecnico::registrar_actividad,
        handlers::tecnico::mis_bodegas,
        handlers::tecnico::todos_los_quimicos,
        handlers::tecnico::list_quimicos,
        handlers::tecnico::add_quimico,
        handlers::tecnico::update_quimico,
        handlers::tecnico::delete_quimico,
        handlers::tecnico::get_formulario,
        handlers::tecnico::responder_formulario,

        // --- Documentos ---
        handlers::documentos::admin_list,
        handlers::documentos::register,
        handlers::documentos::delete,
        handlers::documentos::list,
        handlers::documentos::get_documento,

        // --- Geo ---
        handlers::geo::map_center,
        handlers::geo::huertos_geojson,
        handlers::geo::parcelas_geojson,
        handlers::geo::actividades_geojson,
        handlers::geo::parcela_feature,
        handlers::geo::actividad_feature,
        handlers::geo::list_parcelas,
        handlers::geo::create_parcela,
        handlers::geo::update_parcela,
        handlers::geo::delete_parcela,
        handlers::geo::registrar_actividad,
        handlers::geo::list_tipos,
        handlers::geo::create_tipo,
        handlers::geo::update_tipo,
        handlers::geo::delete_tipo,
        handlers::geo::estilos,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::SessionUser,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::empresa::Empresa,
            models::empresa::EmpresaOption,
            handlers::auth::RegisterEmpresaPayload,
            handlers::auth::RegisterEmpresaResponse,

            // --- Painéis ---
            models::dashboard::AdminDashboard,
            models::dashboard::TecnicoDashboard,

            // --- Huertos ---
            models::huerto::Huerto,
            models::huerto::HuertoResumen,
            models::huerto::TipoActividad,
            models::huerto::ActividadHuerto,
            models::huerto::Bitacora,
            handlers::huertos::CreateHuertoPayload,
            handlers::huertos::SetResponsablePayload,
            handlers::huertos::ActividadPayload,

            // --- Bodegas ---
            models::bodega::Bodega,
            models::bodega::BodegaDetalle,
            models::bodega::QuimicoTipo,
            models::bodega::Quimico,
            models::bodega::BodegaQuimicos,
            models::bodega::TodosLosQuimicos,
            handlers::bodegas::BodegaPayload,
            handlers::bodegas::SetTecnicosPayload,
            handlers::bodegas::TecnicosAsignados,
            handlers::bodegas::QuimicoPayload,

            // --- Recomendações / Formulários ---
            models::recomendacion::EstadoRecomendacion,
            models::recomendacion::Recomendacion,
            models::recomendacion::RecomendacionDetalle,
            models::recomendacion::RecomendacionesTecnico,
            models::formulario::EstadoTarea,
            models::formulario::FormularioTarea,
            models::formulario::ChecklistItem,
            models::formulario::FormularioDetalle,
            models::formulario::RespuestaItem,
            handlers::admin::CreateTecnicoPayload,
            handlers::admin::ResetPasswordPayload,
            handlers::admin::CreateRecomendacionPayload,
            handlers::admin::UpdateEstadoPayload,
            handlers::admin::CreateFormularioPayload,
            handlers::tecnico::ResponderPayload,

            // --- Documentos ---
            models::documento::Documento,
            models::documento::DocumentoItem,
            models::documento::DocumentoList,
            handlers::documentos::RegisterDocumentoPayload,

            // --- Geo ---
            models::geo::Parcela,
            models::geo::ActividadCampo,
            models::geo::ActivityType,
            models::geo::ActivityStyle,
            models::geo::MapCenter,
            models::geo::Feature,
            models::geo::FeatureCollection,
            handlers::geo::CreateParcelaPayload,
            handlers::geo::UpdateParcelaPayload,
            handlers::geo::ActividadCampoPayload,
            handlers::geo::ActivityTypePayload,
        )
    ),
    tags(
        (name = "Auth", description = "Login e sessão"),
        (name = "Users", description = "Usuário da sessão"),
        (name = "Empresas", description = "Seletor do login e cadastro inicial"),
        (name = "Admin", description = "Painel, técnicos, recomendações e formulários"),
        (name = "Huertos", description = "Huertos e bitácora (admin)"),
        (name = "Bodegas", description = "Bodegas e químicos (admin)"),
        (name = "Técnico", description = "Rotas do técnico de campo"),
        (name = "Documentos", description = "Metadados de documentos"),
        (name = "Geo", description = "Mapa, GeoJSON e catálogo de tipos")
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
