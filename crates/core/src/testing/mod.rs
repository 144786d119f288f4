//! Testing utilities and mock implementations.
//!
//! This module provides an in-memory [`PagedSource`](crate::catalog::PagedSource)
//! so coordinators can be exercised without a running backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use bdtheque_core::testing::{MockPagedSource, fixtures};
//! use bdtheque_core::{CoordinatorConfig, QueryCoordinator};
//!
//! let source = Arc::new(MockPagedSource::with_entries(fixtures::catalog(45)));
//! let mut coordinator = QueryCoordinator::new(source, CoordinatorConfig::default());
//!
//! coordinator.initial_load();
//! coordinator.settle().await;
//! ```

mod mock_paged_source;

pub use mock_paged_source::MockPagedSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::NaiveDate;

    use crate::catalog::CatalogEntry;
    use crate::members::Member;

    const SERIES: [(&str, &str); 3] = [
        ("Tintin", "Hergé"),
        ("Astérix", "Goscinny"),
        ("Spirou", "Franquin"),
    ];

    /// Create a catalog entry with the required fields only.
    pub fn entry(bid: &str, cote: &str) -> CatalogEntry {
        CatalogEntry {
            bid: bid.to_string(),
            cote: cote.to_string(),
            titreserie: None,
            titrealbum: None,
            numtome: None,
            scenariste: None,
            dessinateur: None,
            editeur: None,
            collection: None,
            genre: None,
            date_creation: None,
            date_modification: None,
            is_rented: None,
            rented_by: None,
        }
    }

    /// Create `n` albums `bd-001..`, cycling through three series.
    ///
    /// Entry `i` has cote `C{i:03}`, title `Tome {i}` and volume `i`.
    pub fn catalog(n: usize) -> Vec<CatalogEntry> {
        (1..=n)
            .map(|i| {
                let (serie, author) = SERIES[(i - 1) % SERIES.len()];
                CatalogEntry {
                    titreserie: Some(serie.to_string()),
                    titrealbum: Some(format!("Tome {}", i)),
                    numtome: Some(i.to_string()),
                    scenariste: Some(author.to_string()),
                    dessinateur: Some(author.to_string()),
                    editeur: Some("Dupuis".to_string()),
                    genre: Some("BD".to_string()),
                    ..entry(&format!("bd-{:03}", i), &format!("C{:03}", i))
                }
            })
            .collect()
    }

    /// Create a member with a 20 EUR deposit.
    pub fn member(mid: i64, nom: &str, prenom: &str) -> Member {
        Member {
            mid,
            nom: nom.to_string(),
            prenom: prenom.to_string(),
            gsm: String::new(),
            rue: String::new(),
            numero: None,
            boite: None,
            codepostal: None,
            ville: String::new(),
            mail: None,
            caution: 20,
            remarque: None,
            bdpass: None,
            abonnement: NaiveDate::from_ymd_opt(2025, 1, 1),
            vip: None,
            active_rentals: Some(0),
        }
    }
}
