// src/services/access.rs
//
// Regras de acesso do técnico. Funções puras: o tenant já foi filtrado na
// consulta, aqui só se decide se a linha pertence ao técnico.

use uuid::Uuid;

use crate::models::{
    bodega::Bodega, formulario::FormularioTarea, huerto::Huerto, recomendacion::Recomendacion,
};

pub fn same_tenant(empresa_id: Uuid, session_empresa_id: Uuid) -> bool {
    empresa_id == session_empresa_id
}

/// Huerto: só o responsável.
pub fn can_access_huerto(huerto: &Huerto, user_id: Uuid, empresa_id: Uuid) -> bool {
    same_tenant(huerto.empresa_id, empresa_id) && huerto.responsable_id == Some(user_id)
}

/// Bodega: responsável ou atribuído pela tabela tecnico_bodega.
pub fn can_access_bodega(bodega: &Bodega, user_id: Uuid, empresa_id: Uuid, assigned: bool) -> bool {
    same_tenant(bodega.empresa_id, empresa_id) && (assigned || bodega.responsable_id == Some(user_id))
}

pub fn can_answer_formulario(formulario: &FormularioTarea, user_id: Uuid, empresa_id: Uuid) -> bool {
    same_tenant(formulario.empresa_id, empresa_id) && formulario.tecnico_id == user_id
}

pub fn can_complete_recomendacion(reco: &Recomendacion, user_id: Uuid, empresa_id: Uuid) -> bool {
    same_tenant(reco.empresa_id, empresa_id) && reco.tecnico_id == user_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recomendacion::EstadoRecomendacion;
    use chrono::Utc;

    fn bodega(empresa_id: Uuid, responsable_id: Option<Uuid>) -> Bodega {
        Bodega {
            id: Uuid::new_v4(),
            empresa_id,
            nombre: "Bodega Norte".into(),
            ubicacion: None,
            huerto_id: Uuid::new_v4(),
            responsable_id,
            created_at: Utc::now(),
        }
    }

    fn huerto(empresa_id: Uuid, responsable_id: Option<Uuid>) -> Huerto {
        Huerto {
            id: Uuid::new_v4(),
            empresa_id,
            nombre: "Los Aromos".into(),
            ubicacion: None,
            superficie_ha: Some(12.5),
            tipo_cultivo: Some("Cerezos".into()),
            fecha_siembra: None,
            responsable_id,
            center_lat: None,
            center_lng: None,
            bounds_geojson: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn bodega_access_by_responsable_or_assignment() {
        let empresa = Uuid::new_v4();
        let tecnico = Uuid::new_v4();

        assert!(can_access_bodega(&bodega(empresa, Some(tecnico)), tecnico, empresa, false));
        assert!(can_access_bodega(&bodega(empresa, None), tecnico, empresa, true));
        assert!(!can_access_bodega(&bodega(empresa, Some(Uuid::new_v4())), tecnico, empresa, false));
    }

    #[test]
    fn bodega_of_other_tenant_is_never_accessible() {
        let tecnico = Uuid::new_v4();
        let otra_empresa = bodega(Uuid::new_v4(), Some(tecnico));
        assert!(!can_access_bodega(&otra_empresa, tecnico, Uuid::new_v4(), true));
    }

    #[test]
    fn huerto_access_requires_responsable() {
        let empresa = Uuid::new_v4();
        let tecnico = Uuid::new_v4();
        assert!(can_access_huerto(&huerto(empresa, Some(tecnico)), tecnico, empresa));
        assert!(!can_access_huerto(&huerto(empresa, None), tecnico, empresa));
        assert!(!can_access_huerto(&huerto(Uuid::new_v4(), Some(tecnico)), tecnico, empresa));
    }

    #[test]
    fn only_assigned_tecnico_completes_recomendacion() {
        let empresa = Uuid::new_v4();
        let tecnico = Uuid::new_v4();
        let reco = Recomendacion {
            id: Uuid::new_v4(),
            empresa_id: empresa,
            contenido: "Aplicar azufre".into(),
            fecha: Utc::now(),
            categoria: None,
            estado: EstadoRecomendacion::Pendiente,
            adjunto: None,
            tecnico_id: tecnico,
            autor_id: Uuid::new_v4(),
            huerto_id: None,
        };
        assert!(can_complete_recomendacion(&reco, tecnico, empresa));
        assert!(!can_complete_recomendacion(&reco, Uuid::new_v4(), empresa));
    }
}
