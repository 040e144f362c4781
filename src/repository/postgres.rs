// src/repository/postgres.rs - Listing store backed by PostgreSQL
use log::{debug, info};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::models::core::{EnrichmentStatus, RecordDraft, SpringRecord};
use crate::repository::{RecordRepository, RepositoryError};
use crate::utils::db_connect::PgPool;
use crate::utils::dedup_config::{is_valid_identifier, DedupConfig};

const COLUMNS: &str = "id, name, state, lat, lng, description, temp_f, access_difficulty, \
    parking, fee_type, clothing_optional, cell_service, crowd_level, best_season, directions, \
    safety_notes, photo_url, enrichment_status, source";

pub struct PgRecordRepository {
    pool: PgPool,
    /// `schema.table`, both parts checked by `is_valid_identifier`.
    table: String,
    page_size: i64,
}

impl PgRecordRepository {
    pub fn new(pool: PgPool, config: &DedupConfig) -> Result<Self, RepositoryError> {
        Ok(Self {
            pool,
            table: qualified_table(&config.schema, &config.table)?,
            page_size: config.read_page_size.max(1) as i64,
        })
    }
}

fn qualified_table(schema: &str, table: &str) -> Result<String, RepositoryError> {
    for part in [schema, table] {
        if !is_valid_identifier(part) {
            return Err(RepositoryError::Connection(format!(
                "invalid identifier '{}'",
                part
            )));
        }
    }
    Ok(format!("{}.{}", schema, table))
}

fn row_to_record(row: &Row) -> Result<SpringRecord, RepositoryError> {
    let id: Uuid = row.try_get("id")?;
    let name: Option<String> = row.try_get("name")?;
    let state: Option<String> = row.try_get("state")?;
    let enrichment_status: Option<String> = row.try_get("enrichment_status")?;

    let details = RecordDraft {
        name: name.unwrap_or_default(),
        state: state.unwrap_or_default(),
        lat: row.try_get("lat")?,
        lng: row.try_get("lng")?,
        description: row.try_get("description")?,
        temp_f: row.try_get("temp_f")?,
        access_difficulty: row.try_get("access_difficulty")?,
        parking: row.try_get("parking")?,
        fee_type: row.try_get("fee_type")?,
        clothing_optional: row.try_get("clothing_optional")?,
        cell_service: row.try_get("cell_service")?,
        crowd_level: row.try_get("crowd_level")?,
        best_season: row.try_get("best_season")?,
        directions: row.try_get("directions")?,
        safety_notes: row.try_get("safety_notes")?,
        photo_url: row.try_get("photo_url")?,
        enrichment_status: enrichment_status.as_deref().map(EnrichmentStatus::from_db),
        source: row.try_get("source")?,
    };
    Ok(SpringRecord::new(&id.hyphenated().to_string(), details))
}

impl RecordRepository for PgRecordRepository {
    async fn read_all(&self) -> Result<Vec<SpringRecord>, RepositoryError> {
        let conn = self.pool.get().await?;

        let first_page_sql = format!(
            "SELECT {} FROM {} ORDER BY id LIMIT $1",
            COLUMNS, self.table
        );
        let next_page_sql = format!(
            "SELECT {} FROM {} WHERE id > $1 ORDER BY id LIMIT $2",
            COLUMNS, self.table
        );

        let mut records = Vec::new();
        let mut last_id: Option<Uuid> = None;
        loop {
            let rows = match last_id {
                None => conn.query(first_page_sql.as_str(), &[&self.page_size]).await?,
                Some(ref after) => {
                    conn.query(next_page_sql.as_str(), &[after, &self.page_size])
                        .await?
                }
            };
            let fetched = rows.len();
            for row in &rows {
                records.push(row_to_record(row)?);
            }
            if let Some(row) = rows.last() {
                last_id = Some(row.try_get("id")?);
            }
            debug!("Fetched page of {} rows from {}", fetched, self.table);
            if (fetched as i64) < self.page_size {
                break;
            }
        }

        info!("Read {} records from {}", records.len(), self.table);
        Ok(records)
    }

    async fn delete_by_ids(&self, ids: &[Uuid]) -> Result<usize, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let conn = self.pool.get().await?;
        let sql = format!("DELETE FROM {} WHERE id = ANY($1)", self.table);
        let targets: Vec<Uuid> = ids.to_vec();
        let deleted = conn.execute(sql.as_str(), &[&targets]).await?;
        Ok(deleted as usize)
    }

    async fn insert_drafts(&self, drafts: &[RecordDraft]) -> Result<Vec<String>, RepositoryError> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;
        let transaction = conn.transaction().await?;
        let sql = format!(
            "INSERT INTO {} (name, state, lat, lng, description, temp_f, access_difficulty, \
             parking, fee_type, clothing_optional, cell_service, crowd_level, best_season, \
             directions, safety_notes, photo_url, enrichment_status, source) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) \
             RETURNING id",
            self.table
        );
        let statement = transaction.prepare(sql.as_str()).await?;

        let mut ids = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let enrichment_status = draft.enrichment_status.as_ref().map(|s| s.as_str());
            let row = transaction
                .query_one(
                    &statement,
                    &[
                        &draft.name,
                        &draft.state,
                        &draft.lat,
                        &draft.lng,
                        &draft.description,
                        &draft.temp_f,
                        &draft.access_difficulty,
                        &draft.parking,
                        &draft.fee_type,
                        &draft.clothing_optional,
                        &draft.cell_service,
                        &draft.crowd_level,
                        &draft.best_season,
                        &draft.directions,
                        &draft.safety_notes,
                        &draft.photo_url,
                        &enrichment_status,
                        &draft.source,
                    ],
                )
                .await?;
            let id: Uuid = row.try_get("id")?;
            ids.push(id.hyphenated().to_string());
        }
        transaction.commit().await?;

        info!("Inserted {} records into {}", ids.len(), self.table);
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_table() {
        assert_eq!(qualified_table("public", "springs").unwrap(), "public.springs");
        assert_eq!(qualified_table("listings", "_springs_v2").unwrap(), "listings._springs_v2");
        assert!(matches!(
            qualified_table("public", "springs; drop table x"),
            Err(RepositoryError::Connection(_))
        ));
        assert!(qualified_table("public.x", "springs").is_err());
    }
}
