pub mod catalog;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod members;
pub mod metrics;
pub mod session;
pub mod testing;
pub mod validation;

pub use catalog::{
    effective_search, fetch_page, CatalogEntry, CatalogStats, EntryDraft, FetchedPage,
    PageRequest, PagedSource, QueryIdentity, ResultSet, SortField, SortKey, SortOrder, SortSpec,
    Unsorted,
};
pub use client::{AdminCatalog, AdminMembers, ApiError, AvailableBds, BdthequeClient, PublicCatalog};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, ApiConfig, Config,
    ConfigError, SanitizedConfig,
};
pub use coordinator::{
    CoordinatorConfig, CoordinatorUpdate, FetchError, LoadState, QueryCoordinator,
};
pub use members::{Member, MemberDraft, Rental, RentalHistoryPage};
pub use session::{
    create_credentials, Anonymous, CredentialProvider, Session, SessionError, StaticToken,
    UserProfile,
};
pub use validation::{validate_entry, validate_member, FieldError, ValidationErrors};
