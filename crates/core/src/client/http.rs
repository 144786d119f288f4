//! HTTP implementation of the BDthèque client.

use std::sync::Arc;
use std::time::Instant;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::ApiError;
use crate::catalog::{
    effective_search, CatalogEntry, CatalogStats, CountResponse, EntryDraft, PageRequest,
    SortField, Unsorted,
};
use crate::config::ApiConfig;
use crate::members::{Member, MemberDraft, Rental, RentalHistoryPage};
use crate::metrics::{API_REQUESTS, API_REQUEST_DURATION};
use crate::session::{create_credentials, CredentialProvider};
use crate::validation::{validate_entry, validate_member};

/// Client for the catalog, member and rental endpoints.
pub struct BdthequeClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl BdthequeClient {
    /// Create a client with an explicit credential source.
    pub fn new(
        config: &ApiConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ApiError::NotConfigured("api.base_url is empty".to_string()));
        }

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Create a client whose credentials come from `config.token`.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(config, Arc::from(create_credentials(config)))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credential_method(&self) -> &'static str {
        self.credentials.method_name()
    }

    // =========================================================================
    // Public catalog
    // =========================================================================

    /// List albums with search, sort and skip/limit pagination.
    pub async fn list_bds(
        &self,
        request: &PageRequest<SortField>,
    ) -> Result<Vec<CatalogEntry>, ApiError> {
        debug!(
            "List BDs: page={}, size={}, search={:?}",
            request.page,
            request.page_size,
            request.identity.effective_search()
        );
        let req = self
            .client
            .get(self.url("/bds/"))
            .query(&request.query_params());
        self.send_json("bds.list", req, "BD list").await
    }

    /// Count albums matching `search`.
    pub async fn count_bds(&self, search: Option<&str>) -> Result<u64, ApiError> {
        let req = self
            .client
            .get(self.url("/bds/count"))
            .query(&search_params(search));
        let count: CountResponse = self.send_json("bds.count", req, "BD count").await?;
        Ok(count.total)
    }

    pub async fn get_bd(&self, bid: &str) -> Result<CatalogEntry, ApiError> {
        debug!("Get BD: bid={}", bid);
        let req = self.client.get(self.url(&format!("/bds/{}", encode(bid))));
        self.send_json("bds.get", req, &format!("BD {}", bid)).await
    }

    /// Collection-wide counters.
    pub async fn stats(&self) -> Result<CatalogStats, ApiError> {
        let req = self.client.get(self.url("/stats/"));
        self.send_json("stats", req, "stats").await
    }

    // =========================================================================
    // Admin catalog
    // =========================================================================

    pub async fn admin_list_bds(
        &self,
        request: &PageRequest<SortField>,
    ) -> Result<Vec<CatalogEntry>, ApiError> {
        debug!(
            "Admin list BDs: page={}, size={}, search={:?}",
            request.page,
            request.page_size,
            request.identity.effective_search()
        );
        let req = self
            .authorized(self.client.get(self.url("/admin/bds/")))
            .await?
            .query(&request.query_params());
        self.send_json("admin.bds.list", req, "BD list").await
    }

    pub async fn admin_count_bds(&self, search: Option<&str>) -> Result<u64, ApiError> {
        let req = self
            .authorized(self.client.get(self.url("/admin/bds/count")))
            .await?
            .query(&search_params(search));
        let count: CountResponse = self.send_json("admin.bds.count", req, "BD count").await?;
        Ok(count.total)
    }

    pub async fn admin_get_bd(&self, bid: &str) -> Result<CatalogEntry, ApiError> {
        let req = self
            .authorized(self.client.get(self.url(&format!("/admin/bds/{}", encode(bid)))))
            .await?;
        self.send_json("admin.bds.get", req, &format!("BD {}", bid))
            .await
    }

    /// Create an album. The draft is validated first; nothing is sent if it
    /// has field errors.
    pub async fn create_bd(&self, draft: &EntryDraft) -> Result<CatalogEntry, ApiError> {
        validate_entry(draft)?;
        debug!("Create BD: cote={}", draft.cote);
        let req = self
            .authorized(self.client.post(self.url("/admin/bds/")))
            .await?
            .json(draft);
        self.send_json("admin.bds.create", req, "BD").await
    }

    pub async fn update_bd(&self, bid: &str, draft: &EntryDraft) -> Result<CatalogEntry, ApiError> {
        validate_entry(draft)?;
        debug!("Update BD: bid={}", bid);
        let req = self
            .authorized(self.client.put(self.url(&format!("/admin/bds/{}", encode(bid)))))
            .await?
            .json(draft);
        self.send_json("admin.bds.update", req, &format!("BD {}", bid))
            .await
    }

    pub async fn delete_bd(&self, bid: &str) -> Result<(), ApiError> {
        debug!("Delete BD: bid={}", bid);
        let req = self
            .authorized(
                self.client
                    .delete(self.url(&format!("/admin/bds/{}", encode(bid)))),
            )
            .await?;
        self.execute("admin.bds.delete", req, &format!("BD {}", bid))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Members
    // =========================================================================

    pub async fn list_members(&self, request: &PageRequest<Unsorted>) -> Result<Vec<Member>, ApiError> {
        debug!(
            "List members: page={}, size={}, search={:?}",
            request.page,
            request.page_size,
            request.identity.effective_search()
        );
        let req = self
            .authorized(self.client.get(self.url("/admin/membres/")))
            .await?
            .query(&request.query_params());
        self.send_json("admin.members.list", req, "member list")
            .await
    }

    pub async fn count_members(&self, search: Option<&str>) -> Result<u64, ApiError> {
        let req = self
            .authorized(self.client.get(self.url("/admin/membres/count")))
            .await?
            .query(&search_params(search));
        let count: CountResponse = self
            .send_json("admin.members.count", req, "member count")
            .await?;
        Ok(count.total)
    }

    pub async fn get_member(&self, mid: i64) -> Result<Member, ApiError> {
        let req = self
            .authorized(self.client.get(self.url(&format!("/admin/membres/{}", mid))))
            .await?;
        self.send_json("admin.members.get", req, &format!("member {}", mid))
            .await
    }

    pub async fn create_member(&self, draft: &MemberDraft) -> Result<Member, ApiError> {
        validate_member(draft)?;
        debug!("Create member: {} {}", draft.prenom, draft.nom);
        let req = self
            .authorized(self.client.post(self.url("/admin/membres/")))
            .await?
            .json(draft);
        self.send_json("admin.members.create", req, "member").await
    }

    pub async fn update_member(&self, mid: i64, draft: &MemberDraft) -> Result<Member, ApiError> {
        validate_member(draft)?;
        let req = self
            .authorized(self.client.put(self.url(&format!("/admin/membres/{}", mid))))
            .await?
            .json(draft);
        self.send_json("admin.members.update", req, &format!("member {}", mid))
            .await
    }

    // =========================================================================
    // Rentals
    // =========================================================================

    /// Albums the member currently has out.
    pub async fn member_rentals(&self, mid: i64) -> Result<Vec<Rental>, ApiError> {
        let req = self
            .authorized(
                self.client
                    .get(self.url(&format!("/admin/membres/{}/rentals", mid))),
            )
            .await?;
        self.send_json("admin.rentals.active", req, &format!("rentals of member {}", mid))
            .await
    }

    /// One page of the member's rental history (`page` is zero-based).
    pub async fn member_rental_history(
        &self,
        mid: i64,
        page: u32,
        page_size: u32,
    ) -> Result<RentalHistoryPage, ApiError> {
        let skip = u64::from(page) * u64::from(page_size);
        let req = self
            .authorized(
                self.client
                    .get(self.url(&format!("/admin/membres/{}/rental-history", mid))),
            )
            .await?
            .query(&[("skip", skip.to_string()), ("limit", page_size.to_string())]);
        self.send_json(
            "admin.rentals.history",
            req,
            &format!("rental history of member {}", mid),
        )
        .await
    }

    /// Lend an album to a member.
    pub async fn rent_book(&self, mid: i64, bid: &str) -> Result<(), ApiError> {
        debug!("Rent BD {} to member {}", bid, mid);
        let req = self
            .authorized(
                self.client
                    .post(self.url(&format!("/admin/membres/{}/rent/{}", mid, encode(bid)))),
            )
            .await?;
        self.execute("admin.rentals.rent", req, &format!("BD {}", bid))
            .await?;
        Ok(())
    }

    /// Close a rental.
    pub async fn return_book(&self, lid: i64) -> Result<(), ApiError> {
        debug!("Return rental {}", lid);
        let req = self
            .authorized(
                self.client
                    .post(self.url(&format!("/admin/rentals/{}/return", lid))),
            )
            .await?;
        self.execute("admin.rentals.return", req, &format!("rental {}", lid))
            .await?;
        Ok(())
    }

    /// Albums with their rental status, for the "rent a new book" picker.
    pub async fn available_bds(
        &self,
        request: &PageRequest<SortField>,
    ) -> Result<Vec<CatalogEntry>, ApiError> {
        self.admin_list_bds(request).await
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        match self.credentials.bearer().await {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Err(ApiError::NotConfigured(
                "admin endpoints require a bearer token".to_string(),
            )),
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
        subject: &str,
    ) -> Result<T, ApiError> {
        let response = self.execute(endpoint, request, subject).await?;
        response.json::<T>().await.map_err(|e| {
            ApiError::ParseError(format!("Failed to parse {} response: {}", endpoint, e))
        })
    }

    async fn execute(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
        subject: &str,
    ) -> Result<Response, ApiError> {
        let started = Instant::now();
        let result = send_checked(request, subject).await;

        API_REQUEST_DURATION
            .with_label_values(&[endpoint])
            .observe(started.elapsed().as_secs_f64());
        let outcome = if result.is_ok() { "success" } else { "error" };
        API_REQUESTS.with_label_values(&[endpoint, outcome]).inc();

        if let Err(e) = &result {
            warn!("{} failed: {}", endpoint, e);
        }
        result
    }
}

async fn send_checked(request: RequestBuilder, subject: &str) -> Result<Response, ApiError> {
    let response = request.send().await?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_detail(&body, status);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized(message)),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(subject.to_string())),
        _ => Err(ApiError::ApiError {
            status: status.as_u16(),
            message,
        }),
    }
}

/// Extract the backend's `detail` message, falling back to the raw body.
fn error_detail(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(detail)) => return detail.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

fn search_params(search: Option<&str>) -> Vec<(&'static str, String)> {
    search
        .and_then(effective_search)
        .map(|s| vec![("search", s.to_string())])
        .unwrap_or_default()
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Anonymous;

    #[test]
    fn test_error_detail_string() {
        let msg = error_detail(r#"{"detail": "BD déjà louée"}"#, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "BD déjà louée");
    }

    #[test]
    fn test_error_detail_structured() {
        let msg = error_detail(
            r#"{"detail": [{"loc": ["body", "cote"], "msg": "field required"}]}"#,
            StatusCode::UNPROCESSABLE_ENTITY,
        );
        assert!(msg.contains("field required"));
    }

    #[test]
    fn test_error_detail_fallbacks() {
        assert_eq!(error_detail("boom", StatusCode::INTERNAL_SERVER_ERROR), "boom");
        assert_eq!(
            error_detail("", StatusCode::INTERNAL_SERVER_ERROR),
            "Internal Server Error"
        );
    }

    #[test]
    fn test_search_params() {
        assert!(search_params(None).is_empty());
        assert!(search_params(Some("   ")).is_empty());
        assert_eq!(
            search_params(Some(" lucky luke ")),
            vec![("search", "lucky luke".to_string())]
        );
    }

    #[test]
    fn test_path_segment_encoding() {
        assert_eq!(encode("a b/c"), "a%20b%2Fc");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ApiConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..ApiConfig::default()
        };
        let client = BdthequeClient::new(&config, Arc::new(Anonymous)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/bds/"), "http://localhost:8000/bds/");
        assert_eq!(client.credential_method(), "none");
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let config = ApiConfig {
            base_url: "  ".to_string(),
            ..ApiConfig::default()
        };
        let result = BdthequeClient::new(&config, Arc::new(Anonymous));
        assert!(matches!(result, Err(ApiError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_admin_call_without_token_is_not_sent() {
        let config = ApiConfig {
            // Nothing listens here; the call must fail before connecting.
            base_url: "http://127.0.0.1:9".to_string(),
            ..ApiConfig::default()
        };
        let client = BdthequeClient::from_config(&config).unwrap();
        let result = client.count_members(None).await;
        assert!(matches!(result, Err(ApiError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_invalid_draft_is_not_sent() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            token: Some("tok".to_string()),
            ..ApiConfig::default()
        };
        let client = BdthequeClient::from_config(&config).unwrap();
        let result = client.create_bd(&EntryDraft::default()).await;
        match result {
            Err(ApiError::Validation(errors)) => assert_eq!(errors.fields.len(), 4),
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }
}
