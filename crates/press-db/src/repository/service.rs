//! # Service Repository
//!
//! The service catalog. Each row stores its rule set as a tagged JSON blob
//! (`rules_json`) that is parsed and validated on every load: a row whose
//! rules are malformed, negative, or for a different service type is
//! refused rather than priced with.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use press_core::validation::validate_name;
use press_core::{RuleSet, Service, ServiceType};

const SERVICE_COLUMNS: &str =
    "id, name, service_type, rules_json, is_active, created_at, updated_at";

/// Raw `services` row before the rules blob is parsed.
#[derive(Debug, sqlx::FromRow)]
struct ServiceRow {
    id: String,
    name: String,
    service_type: ServiceType,
    rules_json: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ServiceRow {
    fn into_service(self) -> DbResult<Service> {
        let rules = RuleSet::from_json(&self.rules_json).map_err(|e| DbError::InvalidRules {
            service_id: self.id.clone(),
            reason: e.to_string(),
        })?;

        if rules.service_type() != self.service_type {
            return Err(DbError::RulesTypeMismatch {
                service_id: self.id,
                expected: self.service_type,
                found: rules.service_type(),
            });
        }

        Ok(Service {
            id: self.id,
            name: self.name,
            service_type: self.service_type,
            rules,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for the service catalog.
#[derive(Debug, Clone)]
pub struct ServiceRepository {
    pool: SqlitePool,
}

impl ServiceRepository {
    /// Creates a new ServiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ServiceRepository { pool }
    }

    /// Adds a service to the catalog. The service type is taken from the
    /// rule set, so the two can never disagree.
    pub async fn insert(&self, name: &str, rules: &RuleSet) -> DbResult<Service> {
        let name = validate_name("name", name)?;
        let id = Uuid::new_v4().to_string();

        rules.validate().map_err(|e| DbError::InvalidRules {
            service_id: id.clone(),
            reason: e.to_string(),
        })?;
        let rules_json =
            serde_json::to_string(rules).map_err(|e| DbError::Internal(e.to_string()))?;

        let now = Utc::now();
        let service = Service {
            id,
            name,
            service_type: rules.service_type(),
            rules: rules.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO services (
                id, name, service_type, rules_json, is_active, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&service.id)
        .bind(&service.name)
        .bind(service.service_type)
        .bind(&rules_json)
        .bind(service.is_active)
        .bind(service.created_at)
        .bind(service.updated_at)
        .execute(&self.pool)
        .await?;

        info!(
            id = %service.id,
            name = %service.name,
            service_type = %service.service_type,
            "Service added to catalog"
        );
        Ok(service)
    }

    /// Gets a service by ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Service>> {
        let row: Option<ServiceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM services WHERE id = ?1",
            SERVICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ServiceRow::into_service).transpose()
    }

    /// Lists active services by name.
    ///
    /// A row with broken rules is logged and left out, so one bad entry
    /// does not take the whole catalog down.
    pub async fn list_active(&self) -> DbResult<Vec<Service>> {
        let rows: Vec<ServiceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM services WHERE is_active = 1 ORDER BY name",
            SERVICE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut services = Vec::with_capacity(rows.len());
        for row in rows {
            match row.into_service() {
                Ok(service) => services.push(service),
                Err(err) => error!(error = %err, "Skipping service with unusable rules"),
            }
        }

        debug!(count = services.len(), "Listed active services");
        Ok(services)
    }

    /// Activates or retires a service. Retired services cannot be sold.
    pub async fn set_active(&self, id: &str, is_active: bool) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE services SET is_active = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(is_active)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Service", id));
        }

        debug!(id = %id, is_active, "Service activation changed");
        Ok(())
    }

    /// Loads the rule sets for the given service IDs, for checkout.
    ///
    /// Only active services are returned; an ID missing from the map is
    /// unknown to checkout. Any requested row with broken rules fails the
    /// whole load.
    pub async fn load_rules<S: AsRef<str>>(&self, ids: &[S]) -> DbResult<HashMap<String, RuleSet>> {
        let mut unique: Vec<&str> = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.as_ref();
            if !unique.contains(&id) {
                unique.push(id);
            }
        }

        if unique.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM services WHERE is_active = 1 AND id IN (",
            SERVICE_COLUMNS
        ));
        let mut separated = query.separated(", ");
        for id in &unique {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(")");

        let rows: Vec<ServiceRow> = query.build_query_as().fetch_all(&self.pool).await?;

        let mut rules = HashMap::with_capacity(rows.len());
        for row in rows {
            let service = row.into_service()?;
            rules.insert(service.id, service.rules);
        }

        debug!(
            requested = unique.len(),
            found = rules.len(),
            "Loaded rule sets for checkout"
        );
        Ok(rules)
    }

    /// Counts all services, active or not.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use press_core::rules::{LaminationRules, StandardRules};
    use press_core::spec::LaminationSize;
    use press_core::Money;
    use std::collections::BTreeMap;

    fn standard(cents: i64) -> RuleSet {
        RuleSet::Standard(StandardRules {
            base_price: Money::from_cents(cents),
        })
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.services();

        let mut multipliers = BTreeMap::new();
        multipliers.insert(LaminationSize::A4, 1.5);
        let rules = RuleSet::Lamination(LaminationRules {
            base_price: Money::from_cents(2000),
            size_multipliers: multipliers,
        });

        let created = repo.insert("  Lamination  ", &rules).await.unwrap();
        assert_eq!(created.name, "Lamination");
        assert_eq!(created.service_type, ServiceType::Lamination);

        let loaded = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.rules, rules);
        assert!(loaded.is_active);
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_rules() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.services();

        let err = repo.insert("Binding", &standard(-1)).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidRules { .. }));

        let err = repo.insert("   ", &standard(100)).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_load_rules_skips_inactive_and_dedupes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.services();

        let binding = repo.insert("Binding", &standard(5000)).await.unwrap();
        let scanning = repo.insert("Scanning", &standard(1000)).await.unwrap();
        repo.set_active(&scanning.id, false).await.unwrap();

        let ids = vec![
            binding.id.clone(),
            binding.id.clone(),
            scanning.id.clone(),
            "missing".to_string(),
        ];
        let rules = repo.load_rules(&ids).await.unwrap();

        assert_eq!(rules.len(), 1);
        assert_eq!(rules.get(&binding.id), Some(&standard(5000)));

        let empty: Vec<String> = Vec::new();
        assert!(repo.load_rules(&empty).await.unwrap().is_empty());

        let active = repo.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, binding.id);
    }

    #[tokio::test]
    async fn test_mismatched_rules_row_is_refused() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.services();

        // A row claiming to be a document service but holding standard rules
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO services
                 (id, name, service_type, rules_json, is_active, created_at, updated_at)
             VALUES ('bad', 'Broken', 'document', ?1, 1, ?2, ?2)",
        )
        .bind(r#"{"serviceType":"standard","basePrice":100}"#)
        .bind(now)
        .execute(db.pool())
        .await
        .unwrap();

        let err = repo.get_by_id("bad").await.unwrap_err();
        assert!(matches!(err, DbError::RulesTypeMismatch { .. }));

        let err = repo.load_rules(&["bad"]).await.unwrap_err();
        assert!(matches!(err, DbError::RulesTypeMismatch { .. }));

        // Listing survives the broken row
        assert!(repo.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_active_unknown_service() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.services().set_active("missing", false).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
