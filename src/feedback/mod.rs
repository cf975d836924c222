//! Free-text feedback left by citizens on a tender.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    store::{Record, Store, StoreError, counter::format_id},
    tenders::Tender,
};

pub mod submit;

const RATING_SEQUENCE: &str = "ratings";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rating {
    pub rating_id: String,
    pub username: String,
    pub tender_id: String,
    pub feedback: String,
}

impl Record for Rating {
    const FILE_NAME: &'static str = "ratings.csv";
    const HEADERS: &'static [&'static str] =
        &["rating_id", "username", "tender_id", "feedback"];
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewFeedback {
    pub tender_id: String,
    pub feedback: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("tender id and feedback are required")]
    MissingFields,
    #[error("there is no tender with id {0}")]
    UnknownTender(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Rating {
    pub fn submit(
        store: &Store,
        username: &str,
        form: NewFeedback,
    ) -> Result<Rating, FeedbackError> {
        let tender_id = form.tender_id.trim();
        let text = form.feedback.trim();
        if tender_id.is_empty() || text.is_empty() {
            return Err(FeedbackError::MissingFields);
        }
        if !Tender::exists(store, tender_id) {
            return Err(FeedbackError::UnknownTender(tender_id.to_string()));
        }

        let rating = store.ratings.modify(|ratings| {
            let seq = store.counters.next(RATING_SEQUENCE, ratings.len())?;
            let rating = Rating {
                rating_id: format_id('F', seq),
                username: username.to_string(),
                tender_id: tender_id.to_string(),
                feedback: text.to_string(),
            };
            ratings.push(rating.clone());
            Ok::<_, FeedbackError>(rating)
        })?;

        tracing::info!(
            rating_id = %rating.rating_id,
            %username,
            tender_id = %rating.tender_id,
            "feedback submitted"
        );
        Ok(rating)
    }

    pub fn list(store: &Store) -> Vec<Rating> {
        store.ratings.load()
    }

    pub fn for_contractor(store: &Store, contractor_name: &str) -> Vec<Rating> {
        let tender_ids: HashSet<String> =
            Tender::for_contractor(store, contractor_name)
                .into_iter()
                .map(|t| t.id)
                .collect();
        store
            .ratings
            .load()
            .into_iter()
            .filter(|r| tender_ids.contains(&r.tender_id))
            .collect()
    }
}
