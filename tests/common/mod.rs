// tests/common/mod.rs
//
// Apoio para os testes que precisam de Postgres. Sem DATABASE_URL os testes
// retornam cedo e só avisam no stderr.

use anyhow::{Context, Result};
use agrodesk::{
    config::{AppState, Config},
    routes::build_router,
};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "segredo-de-integracao";

pub struct TestApp {
    pub pool: PgPool,
    router: Router,
}

// Empresa criada pelo cadastro inicial, com o token do admin
pub struct Tenant {
    pub id: Uuid,
    pub slug: String,
    pub admin_token: String,
}

/// Conecta, aplica as migrations e monta o roteador com cadastro liberado.
pub async fn connect() -> Result<Option<TestApp>> {
    let _ = dotenvy::dotenv();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL não definida, pulando teste com banco");
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .context("falha ao conectar no banco de teste")?;
    sqlx::migrate!().run(&pool).await.context("falha nas migrations")?;

    let mut config = Config::for_tests(SECRET);
    config.allow_signup = true;
    let router = build_router(AppState::with_pool(config, pool.clone()));

    Ok(Some(TestApp { pool, router }))
}

/// Slug único por execução, para os testes não colidirem entre si.
pub fn unique_slug(label: &str) -> String {
    format!("{label}-{}", &Uuid::new_v4().simple().to_string()[..8])
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).with_context(|| format!("corpo não é JSON ({status})"))?
        };
        Ok((status, json))
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    /// POST /api/empresas: empresa nova com o seu admin.
    pub async fn bootstrap_empresa(&self, label: &str) -> Result<Tenant> {
        let slug = unique_slug(label);
        let body = serde_json::json!({
            "nombre": format!("Agrícola {label}"),
            "slug": slug,
            "adminName": "Admin",
            "adminEmail": format!("admin@{slug}.cl"),
            "password": "secreto1"
        });
        let (status, json) = self.send(Method::POST, "/api/empresas", None, Some(body)).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "cadastro falhou: {status} {json}");

        Ok(Tenant {
            id: json["empresa"]["id"].as_str().context("empresa.id")?.parse()?,
            slug,
            admin_token: json["token"].as_str().context("token")?.to_string(),
        })
    }

    /// Cria um técnico e devolve (id, token de login).
    pub async fn create_tecnico(&self, tenant: &Tenant, name: &str) -> Result<(Uuid, String)> {
        let email = format!("{}@{}.cl", name.to_lowercase(), tenant.slug);
        let (status, json) = self
            .post(
                "/api/admin/tecnicos",
                &tenant.admin_token,
                serde_json::json!({ "name": name, "email": email, "password": "secreto1" }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "técnico falhou: {status} {json}");
        let id: Uuid = json["id"].as_str().context("tecnico.id")?.parse()?;

        let (status, json) = self
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({ "empresa": tenant.slug, "email": email, "password": "secreto1" })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login falhou: {status} {json}");
        Ok((id, json["token"].as_str().context("token")?.to_string()))
    }

    pub async fn create_huerto(&self, tenant: &Tenant, nombre: &str, responsable: Option<Uuid>) -> Result<Uuid> {
        let (status, json) = self
            .post(
                "/api/admin/huertos",
                &tenant.admin_token,
                serde_json::json!({ "nombre": nombre, "responsableId": responsable }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "huerto falhou: {status} {json}");
        Ok(json["id"].as_str().context("huerto.id")?.parse()?)
    }

    pub async fn create_bodega(
        &self,
        tenant: &Tenant,
        nombre: &str,
        huerto_id: Uuid,
        responsable: Option<Uuid>,
    ) -> Result<Uuid> {
        let (status, json) = self
            .post(
                "/api/admin/bodegas",
                &tenant.admin_token,
                serde_json::json!({ "nombre": nombre, "huertoId": huerto_id, "responsableId": responsable }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "bodega falhou: {status} {json}");
        Ok(json["id"].as_str().context("bodega.id")?.parse()?)
    }
}
