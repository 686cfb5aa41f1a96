// tests/tenancy.rs
//
// Isolamento entre empresas contra um Postgres real (DATABASE_URL).

mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn foreign_ids_are_not_found() -> Result<()> {
    let Some(app) = common::connect().await? else { return Ok(()) };
    let norte = app.bootstrap_empresa("norte").await?;
    let sur = app.bootstrap_empresa("sur").await?;
    let huerto = app.create_huerto(&norte, "Los Aromos", None).await?;
    let bodega = app.create_bodega(&norte, "Bodega Norte", huerto, None).await?;

    let (status, _) = app
        .get(&format!("/api/admin/huertos/{huerto}/bitacora"), &sur.admin_token)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .put(
            &format!("/api/admin/huertos/{huerto}/responsable"),
            &sur.admin_token,
            json!({ "responsableId": null }),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .get(&format!("/api/admin/bodegas/{bodega}/quimicos"), &sur.admin_token)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A dona continua enxergando
    let (status, json) = app
        .get(&format!("/api/admin/huertos/{huerto}/bitacora"), &norte.admin_token)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["huerto"]["nombre"], "Los Aromos");
    Ok(())
}

#[tokio::test]
async fn foreign_references_in_payload_are_rejected() -> Result<()> {
    let Some(app) = common::connect().await? else { return Ok(()) };
    let norte = app.bootstrap_empresa("norte").await?;
    let sur = app.bootstrap_empresa("sur").await?;
    let huerto_norte = app.create_huerto(&norte, "Los Aromos", None).await?;
    let (tecnico_norte, _) = app.create_tecnico(&norte, "Pedro").await?;

    let (status, json) = app
        .post(
            "/api/admin/bodegas",
            &sur.admin_token,
            json!({ "nombre": "Bodega Sur", "huertoId": huerto_norte }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{json}");

    let (status, _) = app
        .post(
            "/api/admin/huertos",
            &sur.admin_token,
            json!({ "nombre": "El Roble", "responsableId": tecnico_norte }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let huerto_sur = app.create_huerto(&sur, "El Roble", None).await?;
    let bodega_sur = app.create_bodega(&sur, "Bodega Sur", huerto_sur, None).await?;
    let (status, _) = app
        .put(
            &format!("/api/admin/bodegas/{bodega_sur}/tecnicos"),
            &sur.admin_token,
            json!({ "tecnicoIds": [tecnico_norte] }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn mis_bodegas_is_deduplicated_union_sorted_by_name() -> Result<()> {
    let Some(app) = common::connect().await? else { return Ok(()) };
    let norte = app.bootstrap_empresa("norte").await?;
    let (tecnico, tecnico_token) = app.create_tecnico(&norte, "Pedro").await?;
    let huerto = app.create_huerto(&norte, "Los Aromos", None).await?;

    app.create_bodega(&norte, "zeta", huerto, Some(tecnico)).await?;
    let alfa = app.create_bodega(&norte, "Alfa", huerto, None).await?;
    let medio = app.create_bodega(&norte, "medio", huerto, Some(tecnico)).await?;
    app.create_bodega(&norte, "Otra", huerto, None).await?;

    for bodega in [alfa, medio] {
        let (status, _) = app
            .put(
                &format!("/api/admin/bodegas/{bodega}/tecnicos"),
                &norte.admin_token,
                json!({ "tecnicoIds": [tecnico] }),
            )
            .await?;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, json) = app.get("/api/tecnico/mis_bodegas", &tecnico_token).await?;
    assert_eq!(status, StatusCode::OK);
    let nombres: Vec<&str> = json
        .as_array()
        .map(|bodegas| bodegas.iter().filter_map(|b| b["nombre"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(nombres, ["Alfa", "medio", "zeta"]);
    Ok(())
}

#[tokio::test]
async fn actividad_takes_empresa_from_huerto() -> Result<()> {
    let Some(app) = common::connect().await? else { return Ok(()) };
    let norte = app.bootstrap_empresa("norte").await?;
    let sur = app.bootstrap_empresa("sur").await?;
    let (tecnico, tecnico_token) = app.create_tecnico(&norte, "Pedro").await?;
    let huerto = app.create_huerto(&norte, "Los Aromos", Some(tecnico)).await?;

    let (status, json) = app
        .post(
            &format!("/api/tecnico/huertos/{huerto}/actividades"),
            &tecnico_token,
            json!({ "tipo": "riego", "descripcion": "Riego cuartel 2" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["empresaId"], norte.id.to_string());
    assert_eq!(json["responsable"], "Pedro");

    let actividad: Uuid = json["id"].as_str().unwrap_or_default().parse()?;
    let empresa_id: Uuid = sqlx::query_scalar("SELECT empresa_id FROM actividades_huerto WHERE id = $1")
        .bind(actividad)
        .fetch_one(&app.pool)
        .await?;
    assert_eq!(empresa_id, norte.id);

    let (status, _) = app
        .post(
            &format!("/api/admin/huertos/{huerto}/actividades"),
            &sur.admin_token,
            json!({ "tipo": "poda", "descripcion": "Poda de invierno" }),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn row_level_security_hides_other_tenants() -> Result<()> {
    let Some(app) = common::connect().await? else { return Ok(()) };
    let norte = app.bootstrap_empresa("norte").await?;
    let sur = app.bootstrap_empresa("sur").await?;
    let huerto = app.create_huerto(&norte, "Los Aromos", None).await?;

    // Superusuário e BYPASSRLS ignoram as políticas mesmo com FORCE
    let bypass: bool = sqlx::query_scalar(
        "SELECT rolsuper OR rolbypassrls FROM pg_roles WHERE rolname = current_user",
    )
    .fetch_one(&app.pool)
    .await?;
    if bypass {
        eprintln!("usuário do banco ignora RLS, pulando a checagem das políticas");
        return Ok(());
    }

    let mut tx = app.pool.begin().await?;
    sqlx::query("SELECT set_config('app.empresa_id', $1, true)")
        .bind(sur.id.to_string())
        .execute(&mut *tx)
        .await?;
    let visible: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM huertos WHERE id = $1")
        .bind(huerto)
        .fetch_one(&mut *tx)
        .await?;
    assert_eq!(visible, 0);

    sqlx::query("SELECT set_config('app.empresa_id', $1, true)")
        .bind(norte.id.to_string())
        .execute(&mut *tx)
        .await?;
    let visible: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM huertos WHERE id = $1")
        .bind(huerto)
        .fetch_one(&mut *tx)
        .await?;
    assert_eq!(visible, 1);
    tx.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn oversized_values_are_400_not_500() -> Result<()> {
    let Some(app) = common::connect().await? else { return Ok(()) };
    let norte = app.bootstrap_empresa("norte").await?;
    let huerto = app.create_huerto(&norte, "Los Aromos", None).await?;

    let (status, json) = app
        .post("/api/admin/huertos", &norte.admin_token, json!({ "nombre": "x".repeat(130) }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["details"]["nombre"].is_array());

    let (status, _) = app
        .post(
            "/api/admin/bodegas",
            &norte.admin_token,
            json!({ "nombre": "b".repeat(120), "huertoId": huerto }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            &format!("/api/admin/huertos/{huerto}/actividades"),
            &norte.admin_token,
            json!({ "tipo": "control_plagas", "descripcion": "Monitoreo", "nivelInfestacion": "n".repeat(22) }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nome longo é encurtado para caber na coluna
    let (status, json) = app
        .post(
            "/api/docs/admin",
            &norte.admin_token,
            json!({ "filename": format!("{}.pdf", "d".repeat(248)) }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert!(json["filename"].as_str().is_some_and(|f| f.len() <= 255 && f.ends_with(".pdf")));

    let (status, json) = app
        .get("/api/admin/dashboard?page=9223372036854775807", &norte.admin_token)
        .await?;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert!(json["huertos"]["items"].as_array().is_some_and(Vec::is_empty));
    Ok(())
}
