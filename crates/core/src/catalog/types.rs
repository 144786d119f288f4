//! Types for the comic catalog (albums, sorting, query identity, result sets).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A column that a paged listing can be ordered by.
pub trait SortKey: Clone + fmt::Debug + PartialEq + Eq + Send + Sync + 'static {
    /// Name sent in the `sort_field` query parameter.
    fn wire_name(&self) -> &'static str;
}

/// Sort key for listings that have no sortable columns.
///
/// Uninhabited: a `SortSpec<Unsorted>` can never be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsorted {}

impl SortKey for Unsorted {
    fn wire_name(&self) -> &'static str {
        match *self {}
    }
}

impl FromStr for Unsorted {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Err(format!("this list cannot be sorted (got '{}')", s))
    }
}

/// Catalog columns the backend accepts as `sort_field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Cote,
    TitreSerie,
    TitreAlbum,
    NumTome,
    Scenariste,
    Dessinateur,
    Editeur,
    Collection,
    Genre,
}

impl SortField {
    pub const ALL: [SortField; 9] = [
        SortField::Cote,
        SortField::TitreSerie,
        SortField::TitreAlbum,
        SortField::NumTome,
        SortField::Scenariste,
        SortField::Dessinateur,
        SortField::Editeur,
        SortField::Collection,
        SortField::Genre,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Cote => "cote",
            SortField::TitreSerie => "titreserie",
            SortField::TitreAlbum => "titrealbum",
            SortField::NumTome => "numtome",
            SortField::Scenariste => "scenariste",
            SortField::Dessinateur => "dessinateur",
            SortField::Editeur => "editeur",
            SortField::Collection => "collection",
            SortField::Genre => "genre",
        }
    }
}

impl SortKey for SortField {
    fn wire_name(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        SortField::ALL
            .into_iter()
            .find(|f| f.as_str() == lower)
            .ok_or_else(|| format!("unknown sort field: {}", s))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Value sent in the `sort_order` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" | "ascend" => Ok(SortOrder::Ascending),
            "desc" | "descending" | "descend" => Ok(SortOrder::Descending),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// A column plus a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec<F> {
    pub field: F,
    pub order: SortOrder,
}

impl<F> SortSpec<F> {
    pub fn new(field: F, order: SortOrder) -> Self {
        Self { field, order }
    }

    pub fn descending(field: F) -> Self {
        Self::new(field, SortOrder::Descending)
    }
}

/// What a fetched page means: search text plus ordering.
///
/// Pages fetched under one identity are never mixed with pages of another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryIdentity<F> {
    pub search_term: String,
    pub sort: Option<SortSpec<F>>,
}

impl<F> Default for QueryIdentity<F> {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            sort: None,
        }
    }
}

impl<F> QueryIdentity<F> {
    pub fn new(search_term: impl Into<String>, sort: Option<SortSpec<F>>) -> Self {
        Self {
            search_term: search_term.into(),
            sort,
        }
    }

    /// Search text as sent to the backend; `None` when blank.
    pub fn effective_search(&self) -> Option<&str> {
        effective_search(&self.search_term)
    }
}

/// Trim a search term, mapping blank input to "no filter".
pub fn effective_search(term: &str) -> Option<&str> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// One page of a listing under a given identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<F> {
    pub identity: QueryIdentity<F>,
    /// Zero-based page index.
    pub page: u32,
    pub page_size: u32,
}

impl<F> PageRequest<F> {
    pub fn new(identity: QueryIdentity<F>, page: u32, page_size: u32) -> Self {
        Self {
            identity,
            page,
            page_size,
        }
    }

    pub fn skip(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }
}

impl<F: SortKey> PageRequest<F> {
    /// Query parameters for a skip/limit listing endpoint.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("skip", self.skip().to_string()),
            ("limit", self.limit().to_string()),
        ];
        if let Some(search) = self.identity.effective_search() {
            params.push(("search", search.to_string()));
        }
        if let Some(sort) = &self.identity.sort {
            params.push(("sort_field", sort.field.wire_name().to_string()));
            params.push(("sort_order", sort.order.as_param().to_string()));
        }
        params
    }
}

/// Items accumulated for one query identity.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet<T> {
    /// Arrival order; append-only within one identity.
    pub items: Vec<T>,
    /// Backend count for the active search text.
    pub total_count: u64,
    pub has_more: bool,
    /// Index of the last page applied.
    pub page_cursor: u32,
}

impl<T> Default for ResultSet<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            has_more: false,
            page_cursor: 0,
        }
    }
}

impl<T> ResultSet<T> {
    pub fn clear(&mut self) {
        self.items.clear();
        self.total_count = 0;
        self.has_more = false;
        self.page_cursor = 0;
    }

    /// Apply a fetched page.
    ///
    /// `append = false` replaces the items, `append = true` concatenates.
    pub fn apply_page(&mut self, page: u32, page_size: u32, items: Vec<T>, total: u64, append: bool) {
        let fetched = items.len();
        if append {
            self.items.extend(items);
        } else {
            self.items = items;
        }
        self.total_count = total;
        self.page_cursor = page;
        self.has_more = compute_has_more(fetched, page, page_size, total);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// True iff the page was full and later pages exist for `total`.
pub fn compute_has_more(fetched: usize, page: u32, page_size: u32, total: u64) -> bool {
    fetched == page_size as usize && (u64::from(page) + 1) * u64::from(page_size) < total
}

/// A comic album as returned by the catalog endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub bid: String,
    /// Shelf code.
    pub cote: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titreserie: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titrealbum: Option<String>,
    /// Volume number, kept as text (the backend stores it as a short string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numtome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenariste: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dessinateur: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editeur: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_creation: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_modification: Option<NaiveDateTime>,
    /// Only present in the administrative "available BDs" view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_rented: Option<bool>,
    /// Only present in the administrative "available BDs" view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rented_by: Option<String>,
}

impl CatalogEntry {
    /// "Série - Titre (T.n)" style label for listings.
    pub fn display_title(&self) -> String {
        let title = self.titrealbum.as_deref().unwrap_or("Sans titre");
        let mut label = match self.titreserie.as_deref().filter(|s| !s.is_empty()) {
            Some(serie) => format!("{} - {}", serie, title),
            None => title.to_string(),
        };
        if let Some(tome) = self.numtome.as_deref().filter(|t| !t.is_empty()) {
            label.push_str(&format!(" (T.{})", tome));
        }
        label
    }

    pub fn is_available(&self) -> bool {
        !self.is_rented.unwrap_or(false)
    }
}

/// Response body of the `count` endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountResponse {
    #[serde(default)]
    pub total: u64,
}

/// Payload for creating or updating a catalog entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntryDraft {
    pub cote: String,
    pub titreserie: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titrealbum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numtome: Option<String>,
    pub scenariste: String,
    pub dessinateur: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editeur: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, rename = "ISBN", skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
}

/// Counters from the `/stats/` endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogStats {
    pub total_bds: u64,
    pub total_membres: u64,
    pub total_locations: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_field_parse_and_display() {
        assert_eq!("cote".parse::<SortField>().unwrap(), SortField::Cote);
        assert_eq!("TitreSerie".parse::<SortField>().unwrap(), SortField::TitreSerie);
        assert_eq!(SortField::NumTome.to_string(), "numtome");
        assert!("isbn".parse::<SortField>().is_err());
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Descending);
        assert_eq!("ascend".parse::<SortOrder>().unwrap(), SortOrder::Ascending);
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_query_params_with_search_and_sort() {
        let identity = QueryIdentity::new("  asterix ", Some(SortSpec::descending(SortField::Cote)));
        let request = PageRequest::new(identity, 2, 25);
        let params = request.query_params();

        assert_eq!(
            params,
            vec![
                ("skip", "50".to_string()),
                ("limit", "25".to_string()),
                ("search", "asterix".to_string()),
                ("sort_field", "cote".to_string()),
                ("sort_order", "desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_params_blank_search_is_omitted() {
        let request: PageRequest<SortField> = PageRequest::new(QueryIdentity::new("   ", None), 0, 20);
        let params = request.query_params();
        assert_eq!(params.len(), 2);
        assert!(params.iter().all(|(k, _)| *k != "search"));
    }

    #[test]
    fn test_has_more_rules() {
        // full page, more remaining
        assert!(compute_has_more(20, 0, 20, 45));
        assert!(compute_has_more(20, 1, 20, 45));
        // short page
        assert!(!compute_has_more(5, 2, 20, 45));
        // full page that reaches the total exactly
        assert!(!compute_has_more(20, 1, 20, 40));
    }

    #[test]
    fn test_result_set_replace_then_append() {
        let mut set = ResultSet::default();
        set.apply_page(0, 2, vec![1, 2], 5, false);
        assert_eq!(set.items, vec![1, 2]);
        assert!(set.has_more);

        set.apply_page(1, 2, vec![3, 4], 5, true);
        assert_eq!(set.items, vec![1, 2, 3, 4]);
        assert_eq!(set.page_cursor, 1);
        assert!(set.has_more);

        set.apply_page(0, 2, vec![9], 1, false);
        assert_eq!(set.items, vec![9]);
        assert_eq!(set.page_cursor, 0);
        assert!(!set.has_more);
    }

    #[test]
    fn test_catalog_entry_deserialize_minimal() {
        let json = r#"{"bid": "b-1", "cote": "A12", "titrealbum": "Le Lotus bleu", "numtome": "5"}"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.cote, "A12");
        assert!(entry.titreserie.is_none());
        assert!(entry.is_available());
        assert_eq!(entry.display_title(), "Le Lotus bleu (T.5)");
    }

    #[test]
    fn test_catalog_entry_rented_view() {
        let json = r#"{"bid": "b-2", "cote": "B1", "titreserie": "Tintin", "is_rented": true, "rented_by": "Dupont"}"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert!(!entry.is_available());
        assert_eq!(entry.rented_by.as_deref(), Some("Dupont"));
        assert_eq!(entry.display_title(), "Tintin - Sans titre");
    }

    #[test]
    fn test_entry_draft_isbn_rename() {
        let draft = EntryDraft {
            cote: "C3".to_string(),
            isbn: Some("978203".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["ISBN"], "978203");
        assert!(json.get("genre").is_none());
    }
}
