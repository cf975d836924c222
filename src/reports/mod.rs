//! Issue reports filed by citizens against a tender.

use std::{collections::HashSet, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    store::{Record, Store, StoreError, counter::format_id},
    tenders::Tender,
};

pub mod photo;
pub mod status;
pub mod submit;

pub use photo::Photo;

pub const PENDING: &str = "Pending";
const REPORT_SEQUENCE: &str = "reports";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    pub report_id: String,
    pub username: String,
    pub tender_id: String,
    pub location: String,
    pub description: String,
    /// Path of the photo relative to the static directory.
    pub photo: String,
    pub status: String,
}

impl Record for Report {
    const FILE_NAME: &'static str = "reports.csv";
    const HEADERS: &'static [&'static str] = &[
        "report_id",
        "username",
        "tender_id",
        "location",
        "description",
        "photo",
        "status",
    ];
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewReport {
    pub tender_id: String,
    pub location: String,
    pub description: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("tender id, location and description are required")]
    MissingFields,
    #[error("a photo is required")]
    MissingPhoto,
    #[error("there is no tender with id {0}")]
    UnknownTender(String),
    #[error("could not save photo: {0}")]
    Photo(#[source] std::io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    Updated,
    /// No report with that id exists on any of the contractor's tenders.
    NotFound,
}

impl Report {
    /// Files a new report on behalf of `username`. The photo is saved into
    /// `upload_dir` only once every other field has been validated.
    pub fn submit(
        store: &Store,
        upload_dir: &Path,
        username: &str,
        form: NewReport,
        photo: Option<Photo>,
    ) -> Result<Report, SubmitError> {
        let tender_id = form.tender_id.trim();
        let location = form.location.trim();
        let description = form.description.trim();
        if tender_id.is_empty() || location.is_empty() || description.is_empty()
        {
            return Err(SubmitError::MissingFields);
        }
        let photo = photo.ok_or(SubmitError::MissingPhoto)?;
        if !Tender::exists(store, tender_id) {
            return Err(SubmitError::UnknownTender(tender_id.to_string()));
        }

        let photo = photo.save(upload_dir).map_err(SubmitError::Photo)?;

        let res = store.reports.modify(|reports| {
            let seq = store.counters.next(REPORT_SEQUENCE, reports.len())?;
            let report = Report {
                report_id: format_id('R', seq),
                username: username.to_string(),
                tender_id: tender_id.to_string(),
                location: location.to_string(),
                description: description.to_string(),
                photo: photo.clone(),
                status: PENDING.to_string(),
            };
            reports.push(report.clone());
            Ok::<_, SubmitError>(report)
        });
        let report = match res {
            Ok(report) => report,
            Err(e) => {
                photo::remove_saved(upload_dir, &photo);
                return Err(e);
            }
        };

        tracing::info!(
            report_id = %report.report_id,
            %username,
            tender_id = %report.tender_id,
            "report submitted"
        );
        Ok(report)
    }

    pub fn list_by_user(store: &Store, username: &str) -> Vec<Report> {
        store
            .reports
            .load()
            .into_iter()
            .filter(|r| r.username == username)
            .collect()
    }

    /// Reports filed against any of the tenders assigned to the contractor
    /// with display name `contractor_name`.
    pub fn for_contractor(store: &Store, contractor_name: &str) -> Vec<Report> {
        let tender_ids = assigned_tender_ids(store, contractor_name);
        store
            .reports
            .load()
            .into_iter()
            .filter(|r| tender_ids.contains(r.tender_id.as_str()))
            .collect()
    }

    /// Sets the status of one of the contractor's reports. Reports on other
    /// contractors' tenders are treated as if they did not exist.
    pub fn update_status(
        store: &Store,
        contractor_name: &str,
        report_id: &str,
        new_status: &str,
    ) -> Result<StatusUpdate, StoreError> {
        let tender_ids = assigned_tender_ids(store, contractor_name);

        let outcome = store.reports.modify(|reports| {
            let report = reports.iter_mut().find(|r| {
                r.report_id == report_id
                    && tender_ids.contains(r.tender_id.as_str())
            });
            match report {
                Some(report) => {
                    report.status = new_status.to_string();
                    Ok(StatusUpdate::Updated)
                }
                // nothing changed, so skip the rewrite
                None => Err(None),
            }
        });

        match outcome {
            Ok(update) => {
                tracing::info!(
                    %report_id,
                    contractor = %contractor_name,
                    status = %new_status,
                    "report status updated"
                );
                Ok(update)
            }
            Err(None) => Ok(StatusUpdate::NotFound),
            Err(Some(e)) => Err(e),
        }
    }
}

fn assigned_tender_ids(store: &Store, contractor_name: &str) -> HashSet<String> {
    Tender::for_contractor(store, contractor_name)
        .into_iter()
        .map(|t| t.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use super::*;
    use crate::store::temp_data_dir;

    fn setup() -> (Store, PathBuf) {
        let dir = temp_data_dir();
        let store = Store::open(&dir).unwrap();
        (store, dir.join("uploads"))
    }

    fn pothole(tender_id: &str) -> NewReport {
        NewReport {
            tender_id: tender_id.into(),
            location: "Near the school gate".into(),
            description: "Deep pothole".into(),
        }
    }

    fn photo() -> Option<Photo> {
        Some(Photo::new("pothole.jpg", vec![0xFF, 0xD8, 0xFF]))
    }

    #[test]
    fn failed_write_leaves_no_orphan_photo() {
        let (store, uploads) = setup();
        // a directory in the way of the counter file makes the write fail
        let counters = uploads.parent().unwrap().join("counters.toml");
        fs::create_dir_all(counters.join("blocked")).unwrap();

        let res =
            Report::submit(&store, &uploads, "john_j", pothole("1"), photo());
        assert!(matches!(res, Err(SubmitError::Store(_))));
        assert!(store.reports.load().is_empty());
        assert!(uploads.read_dir().unwrap().next().is_none());
    }

    #[test]
    fn photo_is_mandatory() {
        let (store, uploads) = setup();
        let res = Report::submit(&store, &uploads, "john_j", pothole("1"), None);
        assert!(matches!(res, Err(SubmitError::MissingPhoto)));
        assert!(store.reports.load().is_empty());
    }

    #[test]
    fn text_fields_are_mandatory() {
        let (store, uploads) = setup();
        let mut form = pothole("1");
        form.location = " ".into();
        let res = Report::submit(&store, &uploads, "john_j", form, photo());
        assert!(matches!(res, Err(SubmitError::MissingFields)));
        assert!(!uploads.exists() || uploads.read_dir().unwrap().next().is_none());
    }

    #[test]
    fn unknown_tender_is_rejected() {
        let (store, uploads) = setup();
        let res =
            Report::submit(&store, &uploads, "john_j", pothole("42"), photo());
        assert!(matches!(res, Err(SubmitError::UnknownTender(id)) if id == "42"));
    }

    #[test]
    fn submission_appends_one_pending_row() {
        let (store, uploads) = setup();
        store
            .reports
            .replace_all(&[Report {
                report_id: "R0001".into(),
                username: "someone".into(),
                tender_id: "2".into(),
                status: PENDING.into(),
                ..Default::default()
            }])
            .unwrap();

        let report =
            Report::submit(&store, &uploads, "john_j", pothole("1"), photo())
                .unwrap();

        let rows = store.reports.load();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], report);
        assert_eq!(report.report_id, "R0002");
        assert_eq!(report.status, "Pending");
        assert_eq!(report.photo, "uploads/pothole.jpg");
        assert!(uploads.join("pothole.jpg").exists());
    }

    #[test]
    fn repeated_photo_names_are_deduplicated() {
        let (store, uploads) = setup();
        for _ in 0..3 {
            Report::submit(&store, &uploads, "john_j", pothole("1"), photo())
                .unwrap();
        }

        let photos: Vec<String> =
            store.reports.load().into_iter().map(|r| r.photo).collect();
        assert_eq!(
            photos,
            [
                "uploads/pothole.jpg",
                "uploads/pothole_1.jpg",
                "uploads/pothole_2.jpg"
            ]
        );
        let ids: Vec<String> =
            store.reports.load().into_iter().map(|r| r.report_id).collect();
        assert_eq!(ids, ["R0001", "R0002", "R0003"]);
    }

    #[test]
    fn listings_are_scoped() {
        let (store, uploads) = setup();
        Report::submit(&store, &uploads, "john_j", pothole("1"), photo())
            .unwrap();
        Report::submit(&store, &uploads, "ada_a", pothole("2"), photo())
            .unwrap();

        let mine = Report::list_by_user(&store, "john_j");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].tender_id, "1");

        let abc = Report::for_contractor(&store, "ABC Constructions");
        assert_eq!(abc.len(), 1);
        assert_eq!(abc[0].username, "john_j");

        let xyz = Report::for_contractor(&store, "XYZ Builders");
        assert_eq!(xyz.len(), 1);
        assert_eq!(xyz[0].username, "ada_a");
    }

    #[test]
    fn contractors_only_update_their_own_reports() {
        let (store, uploads) = setup();
        let report =
            Report::submit(&store, &uploads, "john_j", pothole("1"), photo())
                .unwrap();

        let foreign = Report::update_status(
            &store,
            "XYZ Builders",
            &report.report_id,
            "Resolved",
        )
        .unwrap();
        assert_eq!(foreign, StatusUpdate::NotFound);
        assert_eq!(store.reports.load()[0].status, PENDING);

        let missing =
            Report::update_status(&store, "ABC Constructions", "R9999", "Done")
                .unwrap();
        assert_eq!(missing, StatusUpdate::NotFound);

        let own = Report::update_status(
            &store,
            "ABC Constructions",
            &report.report_id,
            "In Repair",
        )
        .unwrap();
        assert_eq!(own, StatusUpdate::Updated);
        assert_eq!(store.reports.load()[0].status, "In Repair");
    }
}
