//! Types for club members and their rentals.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A club member as returned by the admin member endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub mid: i64,
    pub nom: String,
    pub prenom: String,
    #[serde(default)]
    pub gsm: String,
    #[serde(default)]
    pub rue: String,
    #[serde(default)]
    pub numero: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boite: Option<String>,
    #[serde(default)]
    pub codepostal: Option<i32>,
    #[serde(default)]
    pub ville: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail: Option<String>,
    /// Deposit in euros.
    pub caution: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarque: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bdpass: Option<String>,
    /// Subscription date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abonnement: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vip: Option<i32>,
    /// Number of albums currently rented (list view only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_rentals: Option<u32>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom)
    }

    pub fn is_vip(&self) -> bool {
        self.vip.unwrap_or(0) != 0
    }
}

/// Payload for creating or updating a member.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MemberDraft {
    pub nom: String,
    pub prenom: String,
    #[serde(default)]
    pub gsm: String,
    #[serde(default)]
    pub rue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codepostal: Option<i32>,
    #[serde(default)]
    pub ville: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail: Option<String>,
    /// Required; `None` means the field was left empty in the form.
    pub caution: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarque: Option<String>,
}

impl From<&Member> for MemberDraft {
    fn from(m: &Member) -> Self {
        Self {
            nom: m.nom.clone(),
            prenom: m.prenom.clone(),
            gsm: m.gsm.clone(),
            rue: m.rue.clone(),
            numero: m.numero,
            boite: m.boite.clone(),
            codepostal: m.codepostal,
            ville: m.ville.clone(),
            mail: m.mail.clone(),
            caution: Some(m.caution),
            remarque: m.remarque.clone(),
        }
    }
}

/// An album lent to a member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rental {
    pub lid: i64,
    pub bid: String,
    pub mid: i64,
    /// Day the rental was opened.
    pub date: NaiveDate,
    #[serde(default)]
    pub paye: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debut: Option<NaiveDateTime>,
    /// Set once the album has been returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fin: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titreserie: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titrealbum: Option<String>,
}

impl Rental {
    pub fn is_returned(&self) -> bool {
        self.fin.is_some()
    }

    pub fn is_paid(&self) -> bool {
        self.paye.unwrap_or(0) != 0
    }
}

/// One page of a member's closed and open rentals.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RentalHistoryPage {
    #[serde(default)]
    pub rentals: Vec<Rental>,
    #[serde(default)]
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_deserialize() {
        let json = r#"{
            "mid": 7, "nom": "Haddock", "prenom": "Archibald", "gsm": "0470 00 00 00",
            "rue": "Moulinsart", "numero": 1, "codepostal": 1000, "ville": "Bruxelles",
            "caution": 20, "abonnement": "2024-09-01", "vip": 1
        }"#;
        let member: Member = serde_json::from_str(json).unwrap();
        assert_eq!(member.full_name(), "Archibald Haddock");
        assert!(member.is_vip());
        assert_eq!(member.abonnement, NaiveDate::from_ymd_opt(2024, 9, 1));
        assert!(member.mail.is_none());
    }

    #[test]
    fn test_draft_from_member_keeps_caution() {
        let member = Member {
            mid: 1,
            nom: "Tournesol".to_string(),
            prenom: "Tryphon".to_string(),
            gsm: String::new(),
            rue: String::new(),
            numero: None,
            boite: None,
            codepostal: None,
            ville: String::new(),
            mail: Some("tryphon@example.com".to_string()),
            caution: 15,
            remarque: None,
            bdpass: None,
            abonnement: None,
            vip: None,
            active_rentals: Some(2),
        };
        let draft = MemberDraft::from(&member);
        assert_eq!(draft.caution, Some(15));
        assert_eq!(draft.mail.as_deref(), Some("tryphon@example.com"));
    }

    #[test]
    fn test_rental_history_page() {
        let json = r#"{"rentals": [
            {"lid": 3, "bid": "b-9", "mid": 7, "date": "2025-01-10", "paye": 1, "fin": "2025-01-24T10:00:00"}
        ], "total": 12}"#;
        let page: RentalHistoryPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.total, 12);
        assert!(page.rentals[0].is_returned());
        assert!(page.rentals[0].is_paid());
    }
}
