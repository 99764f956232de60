use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, QueryBuilder, Row, Sqlite};
use validator::{Validate, ValidationErrors};

use crate::errors::{IntakeError, QueryError};
use crate::models::candidate_model::{
    CandidateInput, CandidateQuery, CandidateRecord, CandidateStatus, FieldError,
    ListCandidatesResponse, StatusFilter,
};

const SELECT_COLUMNS: &str = "id, name, email, phone_number, link, dob, status, external_id, \
                              relay_attempts, created_at, updated_at";

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    OldestFirst,
    NewestFirst,
}

impl SortOrder {
    fn sql(&self) -> &'static str {
        match self {
            SortOrder::OldestFirst => " ORDER BY created_at ASC, id ASC",
            SortOrder::NewestFirst => " ORDER BY created_at DESC, id DESC",
        }
    }
}

#[derive(Clone, Debug)]
pub struct CandidateService {
    db_pool: Pool<Sqlite>,
}

impl CandidateService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        CandidateService { db_pool }
    }

    /// Corre migraciones con sqlx
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db_pool)
            .await
            .context("Fallo en migraciones de 'candidates'")?;
        Ok(())
    }

    // ======================================================
    // Intake
    // ======================================================

    /// Valida y guarda el candidato con estado PENDING.
    pub async fn create_candidate(
        &self,
        input: CandidateInput,
    ) -> Result<CandidateRecord, IntakeError> {
        let input = input.normalized();
        input
            .validate()
            .map_err(|e| IntakeError::Validation(field_errors(&e)))?;

        let record = self.insert_candidate(&input, Utc::now()).await?;
        log::info!(
            "(create_candidate) Candidato {} creado con estado {}",
            record.id,
            record.status
        );
        Ok(record)
    }

    /// INSERT sin validar; `created_at` explícito para poder ordenar en tests.
    pub(crate) async fn insert_candidate(
        &self,
        input: &CandidateInput,
        created_at: DateTime<Utc>,
    ) -> Result<CandidateRecord> {
        let now = timestamp(created_at);

        let result = sqlx::query(
            r#"
            INSERT INTO candidates (
                name, email, phone_number, link, dob,
                status, external_id, relay_attempts, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, 0, ?7, ?7)
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone_number)
        .bind(&input.link)
        .bind(&input.dob)
        .bind(CandidateStatus::Pending.as_str())
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar candidato")?;

        self.get_candidate(result.last_insert_rowid()).await
    }

    pub async fn get_candidate(&self, id: i64) -> Result<CandidateRecord> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM candidates WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_one(&self.db_pool)
            .await
            .with_context(|| format!("No se encontró candidato con id={}", id))?;

        map_row(&row)
    }

    // ======================================================
    // Consultas
    // ======================================================

    /// Lista candidatos con paginación, filtro de estado y búsqueda por nombre/email.
    pub async fn list_candidates(
        &self,
        query: CandidateQuery,
    ) -> Result<ListCandidatesResponse, QueryError> {
        let page = query.page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = query
            .limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        // page viene del query string sin tope
        let offset = page.saturating_sub(1).saturating_mul(limit);

        let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => raw
                .parse::<StatusFilter>()
                .map_err(|_| QueryError::InvalidStatus(raw.to_string()))?,
            None => StatusFilter::All,
        };
        let pattern = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        // total
        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM candidates");
        push_filters(&mut count_qb, status, pattern.as_deref());
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.db_pool)
            .await
            .context("Fallo al contar candidatos")?;

        // items
        let mut qb =
            QueryBuilder::<Sqlite>::new(format!("SELECT {SELECT_COLUMNS} FROM candidates"));
        push_filters(&mut qb, status, pattern.as_deref());
        qb.push(SortOrder::NewestFirst.sql());
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        let rows = qb
            .build()
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar candidatos")?;
        let data = rows.iter().map(map_row).collect::<Result<Vec<_>>>()?;

        Ok(ListCandidatesResponse {
            data,
            total,
            page,
            total_pages: (total + limit - 1) / limit,
        })
    }

    /// Endpoint legacy: todos los SUCCESS, más recientes primero.
    pub async fn list_successful(&self) -> Result<Vec<CandidateRecord>> {
        self.find_by_status(&[CandidateStatus::Success], None, SortOrder::NewestFirst)
            .await
    }

    // ======================================================
    // Store del worker
    // ======================================================

    /// Hasta `limit` registros PENDING/FAILED, los más antiguos primero.
    pub async fn find_eligible(&self, limit: i64) -> Result<Vec<CandidateRecord>> {
        self.find_by_status(
            &CandidateStatus::eligible(),
            Some(limit),
            SortOrder::OldestFirst,
        )
        .await
    }

    pub async fn find_by_status(
        &self,
        statuses: &[CandidateStatus],
        limit: Option<i64>,
        order: SortOrder,
    ) -> Result<Vec<CandidateRecord>> {
        if statuses.is_empty() {
            return Ok(vec![]);
        }

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {SELECT_COLUMNS} FROM candidates WHERE status IN ("
        ));
        let mut separated = qb.separated(", ");
        for status in statuses {
            separated.push_bind(status.as_str());
        }
        separated.push_unseparated(")");
        qb.push(order.sql());
        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(limit);
        }

        let rows = qb
            .build()
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al buscar candidatos por estado")?;

        rows.iter().map(map_row).collect()
    }

    /// PENDING/FAILED -> SUCCESS con su external_id. Un SUCCESS no se vuelve a tocar.
    pub async fn mark_success(&self, id: i64, external_id: i64) -> Result<u64> {
        let now = timestamp(Utc::now());
        let result = sqlx::query(
            r#"
            UPDATE candidates
            SET status = 'SUCCESS',
                external_id = ?2,
                updated_at = ?3
            WHERE id = ?1
              AND status IN ('PENDING', 'FAILED')
            "#,
        )
        .bind(id)
        .bind(external_id)
        .bind(now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al marcar candidato SUCCESS")?;

        Ok(result.rows_affected())
    }

    /// Marca todo el batch FAILED en un solo UPDATE.
    pub async fn mark_failed_bulk(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "UPDATE candidates SET status = 'FAILED', external_id = NULL, updated_at = ",
        );
        qb.push_bind(timestamp(Utc::now()));
        push_id_filter(&mut qb, ids);

        let result = qb
            .build()
            .execute(&self.db_pool)
            .await
            .context("Fallo al marcar batch FAILED")?;

        Ok(result.rows_affected())
    }

    /// Suma un intento de envío a cada registro del batch.
    pub async fn record_attempts(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "UPDATE candidates SET relay_attempts = relay_attempts + 1, updated_at = ",
        );
        qb.push_bind(timestamp(Utc::now()));
        push_id_filter(&mut qb, ids);

        let result = qb
            .build()
            .execute(&self.db_pool)
            .await
            .context("Fallo al registrar intentos del batch")?;

        Ok(result.rows_affected())
    }
}

/// Formato fijo (microsegundos, "Z") para que el orden de texto sea el orden temporal.
fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn map_row(row: &SqliteRow) -> Result<CandidateRecord> {
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(CandidateRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone_number: row.try_get("phone_number")?,
        link: row.try_get("link")?,
        dob: row.try_get("dob")?,
        status: status.parse()?,
        external_id: row.try_get("external_id")?,
        relay_attempts: row.try_get("relay_attempts")?,
        created_at: created_at.parse()?,
        updated_at: updated_at.parse()?,
    })
}

/// `WHERE id IN (...)` restringido a registros que todavía se pueden procesar.
fn push_id_filter(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    qb.push(" WHERE status IN ('PENDING', 'FAILED') AND id IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, status: StatusFilter, pattern: Option<&str>) {
    let mut has_where = false;

    if let StatusFilter::Only(status) = status {
        qb.push(" WHERE status = ").push_bind(status.as_str());
        has_where = true;
    }

    if let Some(pattern) = pattern {
        qb.push(if has_where { " AND " } else { " WHERE " });
        qb.push("(LOWER(name) LIKE ")
            .push_bind(pattern.to_string())
            .push(" ESCAPE '\\' OR LOWER(email) LIKE ")
            .push_bind(pattern.to_string())
            .push(" ESCAPE '\\')");
    }
}

/// Substring case-insensitive; `%`, `_` y `\` se buscan literalmente.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let name: &str = field.as_ref();
            let field = camel_case(name);
            errs.iter().map(move |err| FieldError {
                field: field.clone(),
                message: err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string()),
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for c in snake.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
