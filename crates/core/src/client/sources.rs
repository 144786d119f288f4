//! [`PagedSource`] adapters over [`BdthequeClient`].
//!
//! Each list screen of the application is one of these: the public catalog,
//! the admin BD list, the admin member list and the "rent a new book" picker.

use std::sync::Arc;

use async_trait::async_trait;

use super::{ApiError, BdthequeClient};
use crate::catalog::{CatalogEntry, PageRequest, PagedSource, SortField, Unsorted};
use crate::members::Member;

/// Public, unauthenticated album listing.
#[derive(Clone)]
pub struct PublicCatalog {
    client: Arc<BdthequeClient>,
}

impl PublicCatalog {
    pub fn new(client: Arc<BdthequeClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PagedSource for PublicCatalog {
    type Item = CatalogEntry;
    type Field = SortField;

    async fn list(&self, request: &PageRequest<SortField>) -> Result<Vec<CatalogEntry>, ApiError> {
        self.client.list_bds(request).await
    }

    async fn count(&self, search: Option<&str>) -> Result<u64, ApiError> {
        self.client.count_bds(search).await
    }

    fn name(&self) -> &'static str {
        "catalog"
    }
}

/// Album listing of the administration panel.
#[derive(Clone)]
pub struct AdminCatalog {
    client: Arc<BdthequeClient>,
}

impl AdminCatalog {
    pub fn new(client: Arc<BdthequeClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PagedSource for AdminCatalog {
    type Item = CatalogEntry;
    type Field = SortField;

    async fn list(&self, request: &PageRequest<SortField>) -> Result<Vec<CatalogEntry>, ApiError> {
        self.client.admin_list_bds(request).await
    }

    async fn count(&self, search: Option<&str>) -> Result<u64, ApiError> {
        self.client.admin_count_bds(search).await
    }

    fn name(&self) -> &'static str {
        "admin_bds"
    }
}

/// Member listing of the administration panel. Members have no sortable
/// columns.
#[derive(Clone)]
pub struct AdminMembers {
    client: Arc<BdthequeClient>,
}

impl AdminMembers {
    pub fn new(client: Arc<BdthequeClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PagedSource for AdminMembers {
    type Item = Member;
    type Field = Unsorted;

    async fn list(&self, request: &PageRequest<Unsorted>) -> Result<Vec<Member>, ApiError> {
        self.client.list_members(request).await
    }

    async fn count(&self, search: Option<&str>) -> Result<u64, ApiError> {
        self.client.count_members(search).await
    }

    fn name(&self) -> &'static str {
        "admin_members"
    }
}

/// Albums with their rental status, counted through the public endpoint.
#[derive(Clone)]
pub struct AvailableBds {
    client: Arc<BdthequeClient>,
}

impl AvailableBds {
    pub fn new(client: Arc<BdthequeClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PagedSource for AvailableBds {
    type Item = CatalogEntry;
    type Field = SortField;

    async fn list(&self, request: &PageRequest<SortField>) -> Result<Vec<CatalogEntry>, ApiError> {
        self.client.available_bds(request).await
    }

    async fn count(&self, search: Option<&str>) -> Result<u64, ApiError> {
        self.client.count_bds(search).await
    }

    fn name(&self) -> &'static str {
        "available_bds"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    #[test]
    fn test_source_names_are_distinct() {
        let client = Arc::new(BdthequeClient::from_config(&ApiConfig::default()).unwrap());
        let names = [
            PublicCatalog::new(Arc::clone(&client)).name(),
            AdminCatalog::new(Arc::clone(&client)).name(),
            AdminMembers::new(Arc::clone(&client)).name(),
            AvailableBds::new(client).name(),
        ];
        let mut unique = names.to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
    }
}
