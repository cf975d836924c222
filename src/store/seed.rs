use crate::{
    auth::{accounts::Contractor, hash_password},
    store::{Store, StoreError},
    tenders::Tender,
};

/// Creates any missing table files. The tender and contractor tables start
/// out with a couple of sample rows so that a fresh install is usable.
pub fn init_tables(store: &Store) -> Result<(), StoreError> {
    if store.tenders.ensure_exists()? {
        tracing::info!("seeding tenders table");
        store.tenders.replace_all(&sample_tenders())?;
    }
    if store.contractors.ensure_exists()? {
        tracing::info!("seeding contractors table");
        store.contractors.replace_all(&sample_contractors()?)?;
    }
    store.reports.ensure_exists()?;
    store.ratings.ensure_exists()?;
    store.citizens.ensure_exists()?;
    Ok(())
}

fn sample_tenders() -> Vec<Tender> {
    vec![
        Tender {
            id: "1".into(),
            road_name: "Main Street".into(),
            contractor_name: "ABC Constructions".into(),
            fund_allocated: "500000".into(),
            start_date: "2025-01-01".into(),
            end_date: "2025-06-01".into(),
            warranty_period: "5 years".into(),
            status: "In Progress".into(),
        },
        Tender {
            id: "2".into(),
            road_name: "2nd Avenue".into(),
            contractor_name: "XYZ Builders".into(),
            fund_allocated: "750000".into(),
            start_date: "2025-02-01".into(),
            end_date: "2025-07-01".into(),
            warranty_period: "3 years".into(),
            status: "Completed".into(),
        },
    ]
}

fn sample_contractors() -> Result<Vec<Contractor>, StoreError> {
    [
        ("abc", "ABC Constructions", "password123"),
        ("xyz", "XYZ Builders", "password456"),
    ]
    .into_iter()
    .map(|(username, name, password)| {
        Ok(Contractor {
            username: username.into(),
            name: name.into(),
            password_hash: hash_password(password).map_err(StoreError::Seed)?,
        })
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use crate::store::{Store, temp_data_dir};

    #[test]
    fn fresh_store_is_seeded_once() {
        let dir = temp_data_dir();
        let store = Store::open(&dir).unwrap();
        assert_eq!(store.tenders.load().len(), 2);
        assert_eq!(store.contractors.load().len(), 2);
        assert!(store.citizens.load().is_empty());
        assert!(store.reports.load().is_empty());

        store.tenders.replace_all(&[]).unwrap();
        let reopened = Store::open(&dir).unwrap();
        assert!(reopened.tenders.load().is_empty());
    }
}
