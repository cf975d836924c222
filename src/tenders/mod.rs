use serde::{Deserialize, Serialize};

use crate::store::{Record, Store};

pub mod view;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tender {
    pub id: String,
    pub road_name: String,
    /// The display name (not the username) of the contractor assigned to
    /// this tender.
    pub contractor_name: String,
    pub fund_allocated: String,
    pub start_date: String,
    pub end_date: String,
    pub warranty_period: String,
    pub status: String,
}

impl Record for Tender {
    const FILE_NAME: &'static str = "tenders.csv";
    const HEADERS: &'static [&'static str] = &[
        "id",
        "road_name",
        "contractor_name",
        "fund_allocated",
        "start_date",
        "end_date",
        "warranty_period",
        "status",
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenderFilter {
    /// Case-insensitive exact match on the status.
    Status(String),
    /// Case-insensitive substring match on the road name.
    RoadName(String),
    /// Case-insensitive substring match on the contractor's name.
    Contractor(String),
}

impl TenderFilter {
    /// Builds a filter from the tender search form. An unknown kind or an
    /// empty value means "no filter".
    pub fn parse(kind: &str, value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        if value.is_empty() {
            return None;
        }
        match kind.trim() {
            "status" => Some(TenderFilter::Status(value)),
            "road_name" => Some(TenderFilter::RoadName(value)),
            "contractor" => Some(TenderFilter::Contractor(value)),
            _ => None,
        }
    }

    pub fn matches(&self, tender: &Tender) -> bool {
        match self {
            TenderFilter::Status(v) => tender.status.to_lowercase() == *v,
            TenderFilter::RoadName(v) => {
                tender.road_name.to_lowercase().contains(v.as_str())
            }
            TenderFilter::Contractor(v) => {
                tender.contractor_name.to_lowercase().contains(v.as_str())
            }
        }
    }
}

impl Tender {
    pub fn list(store: &Store, filter: Option<&TenderFilter>) -> Vec<Tender> {
        let tenders = store.tenders.load();
        match filter {
            Some(filter) => {
                tenders.into_iter().filter(|t| filter.matches(t)).collect()
            }
            None => tenders,
        }
    }

    pub fn exists(store: &Store, id: &str) -> bool {
        store.tenders.load().iter().any(|t| t.id == id)
    }

    /// Tenders assigned to the contractor with display name `name`.
    pub fn for_contractor(store: &Store, name: &str) -> Vec<Tender> {
        store
            .tenders
            .load()
            .into_iter()
            .filter(|t| t.contractor_name == name)
            .collect()
    }
}
