//! System settings as an explicit key/value mapping backed by the settings
//! table. Loaded at startup, refreshed on demand; never ambient global state.

use std::collections::HashMap;

use sea_orm::*;

use crate::models::setting::{self, Entity as Setting};

use super::ServiceError;

/// Load the full settings mapping
pub async fn load(db: &DatabaseConnection) -> Result<HashMap<String, String>, ServiceError> {
    let rows = Setting::find().all(db).await?;
    Ok(rows.into_iter().map(|r| (r.key, r.value)).collect())
}

pub async fn get(db: &DatabaseConnection, key: &str) -> Result<Option<String>, ServiceError> {
    let row = Setting::find_by_id(key.to_owned()).one(db).await?;
    Ok(row.map(|r| r.value))
}

/// Upsert a batch of settings and return the refreshed mapping
pub async fn set_many(
    db: &DatabaseConnection,
    values: HashMap<String, String>,
) -> Result<HashMap<String, String>, ServiceError> {
    for (key, value) in values {
        if key.trim().is_empty() {
            return Err(ServiceError::Validation(
                "setting key must not be empty".to_string(),
            ));
        }

        let existing = Setting::find_by_id(key.clone()).one(db).await?;
        match existing {
            Some(row) => {
                let mut active: setting::ActiveModel = row.into();
                active.value = Set(value);
                active.update(db).await?;
            }
            None => {
                setting::ActiveModel {
                    key: Set(key),
                    value: Set(value),
                }
                .insert(db)
                .await?;
            }
        }
    }

    load(db).await
}
