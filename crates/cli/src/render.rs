//! One-line text rendering of list rows.

use bdtheque_core::{CatalogEntry, Member, Rental};

pub trait Row {
    fn row(&self) -> String;
}

impl Row for CatalogEntry {
    fn row(&self) -> String {
        let mut line = format!("{:<10} {}", self.cote, self.display_title());
        let authors: Vec<&str> = [self.scenariste.as_deref(), self.dessinateur.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if !authors.is_empty() {
            line.push_str(&format!(" - {}", authors.join(" / ")));
        }
        if let Some(true) = self.is_rented {
            match self.rented_by.as_deref() {
                Some(who) => line.push_str(&format!(" [louée par {}]", who)),
                None => line.push_str(" [louée]"),
            }
        }
        line
    }
}

impl Row for Member {
    fn row(&self) -> String {
        let mut line = format!("#{:<5} {}", self.mid, self.full_name());
        if self.is_vip() {
            line.push_str(" (VIP)");
        }
        if let Some(count) = self.active_rentals.filter(|c| *c > 0) {
            line.push_str(&format!(" - {} en cours", count));
        }
        line
    }
}

impl Row for Rental {
    fn row(&self) -> String {
        let title = match (self.titreserie.as_deref(), self.titrealbum.as_deref()) {
            (Some(serie), Some(album)) => format!("{} - {}", serie, album),
            (Some(t), None) | (None, Some(t)) => t.to_string(),
            (None, None) => self.bid.clone(),
        };
        let status = if self.is_returned() {
            "rendue"
        } else {
            "en cours"
        };
        format!(
            "#{:<5} {} {} ({}{})",
            self.lid,
            self.date,
            title,
            status,
            if self.is_paid() { ", payée" } else { "" }
        )
    }
}
