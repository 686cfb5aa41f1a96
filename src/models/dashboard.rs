// src/models/dashboard.rs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::{
    auth::User,
    bodega::{Bodega, BodegaDetalle},
    huerto::{Huerto, HuertoResumen},
    recomendacion::{Recomendacion, RecomendacionDetalle},
};

pub const ADMIN_PAGE_SIZE: i64 = 9;
pub const TECNICO_PAGE_SIZE: i64 = 6;

// ?page=N (começa em 1)
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<i64>,
}

impl PageQuery {
    /// Página pedida, nunca menor que 1.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn offset(&self, per_page: i64) -> i64 {
        (self.page() - 1).saturating_mul(per_page.max(1))
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: i64, per_page: i64, total: i64) -> Self {
        let pages = if total <= 0 { 0 } else { (total + per_page - 1) / per_page };
        Self { items, page, per_page, total, pages }
    }
}

// Painel do admin
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub huertos: Page<HuertoResumen>,
    pub bodegas: Vec<BodegaDetalle>,
    pub tecnicos: Vec<User>,
    pub ultimas_recomendaciones: Vec<RecomendacionDetalle>,
}

// Painel do técnico: só o que é dele
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TecnicoDashboard {
    pub huertos: Page<Huerto>,
    pub bodegas: Vec<Bodega>,
    pub ultimas_recomendaciones: Vec<Recomendacion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_never_goes_below_one() {
        assert_eq!(PageQuery { page: Some(0) }.page(), 1);
        assert_eq!(PageQuery { page: Some(-3) }.offset(9), 0);
        assert_eq!(PageQuery::default().offset(6), 0);
        assert_eq!(PageQuery { page: Some(3) }.offset(9), 18);
    }

    #[test]
    fn huge_page_saturates_instead_of_overflowing() {
        let query = PageQuery { page: Some(i64::MAX) };
        assert_eq!(query.offset(ADMIN_PAGE_SIZE), i64::MAX);
        assert_eq!(query.offset(TECNICO_PAGE_SIZE), i64::MAX);
        assert_eq!(PageQuery { page: Some(i64::MAX / 9 + 1) }.offset(9), (i64::MAX / 9) * 9);
    }

    #[test]
    fn page_count_rounds_up() {
        let page: Page<u8> = Page::new(vec![], 1, 9, 19);
        assert_eq!(page.pages, 3);
        let empty: Page<u8> = Page::new(vec![], 1, 9, 0);
        assert_eq!(empty.pages, 0);
    }
}
