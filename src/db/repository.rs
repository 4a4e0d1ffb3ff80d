//! Database repository for CRUD operations.
//!
//! Uses prepared statements and conditional updates for data integrity.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::gate::{DEFAULT_IMPROVEMENTS, DEFAULT_SYSTEM_VERSION};
use crate::models::{
    merge_draft, Convocation, ConvocationResponse, CreateConvocationRequest,
    CreateMessageRequest, CreateOperationRequest, CreateSlotRequest, CreateTcoRequest, Draft,
    Message, Operation, SystemVersion, Tco, TimeSlot, UpdateOperationRequest, UpdateUserRequest,
    User, INITIAL_USER_VERSION,
};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== USER OPERATIONS ====================

    /// List all users.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(
            "SELECT id, email, display_name, user_type, blocked, app_version, created_at FROM users ORDER BY display_name"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(
            "SELECT id, email, display_name, user_type, blocked, app_version, created_at FROM users WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Get a user by email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(
            "SELECT id, email, display_name, user_type, blocked, app_version, created_at FROM users WHERE email = ?"
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Create an account from the migration tool. Duplicate emails conflict.
    pub async fn insert_migrated_user(
        &self,
        email: &str,
        display_name: &str,
        user_type: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO users (id, email, display_name, user_type, password_hash, blocked, app_version, created_at) VALUES (?, ?, ?, ?, ?, 0, ?, ?)"
        )
        .bind(&id)
        .bind(email)
        .bind(display_name)
        .bind(user_type)
        .bind(password_hash)
        .bind(INITIAL_USER_VERSION)
        .bind(&now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(User {
                id,
                email: email.to_string(),
                display_name: display_name.to_string(),
                user_type: user_type.to_string(),
                blocked: false,
                app_version: INITIAL_USER_VERSION.to_string(),
                created_at: now,
            }),
            Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(format!(
                "User {} already exists",
                email
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Update a user's profile fields.
    pub async fn update_user(&self, id: &str, request: &UpdateUserRequest) -> Result<User, AppError> {
        let existing = self
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        let display_name = request
            .display_name
            .as_ref()
            .unwrap_or(&existing.display_name);
        let user_type = request.user_type.as_ref().unwrap_or(&existing.user_type);
        let blocked = request.blocked.unwrap_or(existing.blocked);

        sqlx::query("UPDATE users SET display_name = ?, user_type = ?, blocked = ? WHERE id = ?")
            .bind(display_name)
            .bind(user_type)
            .bind(blocked as i32)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(User {
            display_name: display_name.clone(),
            user_type: user_type.clone(),
            blocked,
            ..existing
        })
    }

    /// Persist an acknowledged system version to a user record.
    pub async fn set_user_app_version(&self, email: &str, version: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET app_version = ? WHERE email = ?")
            .bind(version)
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", email)));
        }
        Ok(())
    }

    // ==================== TCO OPERATIONS ====================

    /// List TCOs, optionally filtered by calendar year and creator.
    pub async fn list_tcos(
        &self,
        year: Option<i32>,
        created_by: Option<&str>,
    ) -> Result<Vec<Tco>, AppError> {
        let mut sql = String::from(
            "SELECT id, tco_number, natureza, data_fato, created_by, created_at, extra FROM tcos WHERE 1 = 1",
        );
        if year.is_some() {
            sql.push_str(" AND substr(created_at, 1, 4) = ?");
        }
        if created_by.is_some() {
            sql.push_str(" AND created_by = ?");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(year) = year {
            query = query.bind(format!("{:04}", year));
        }
        if let Some(created_by) = created_by {
            query = query.bind(created_by.to_string());
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(tco_from_row).collect())
    }

    /// Get a TCO by ID.
    pub async fn get_tco(&self, id: &str) -> Result<Option<Tco>, AppError> {
        let row = sqlx::query(
            "SELECT id, tco_number, natureza, data_fato, created_by, created_at, extra FROM tcos WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(tco_from_row))
    }

    /// Register a new TCO.
    pub async fn create_tco(&self, request: &CreateTcoRequest) -> Result<Tco, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let extra_json = request
            .extra
            .as_ref()
            .map(|e| serde_json::to_string(e).unwrap_or_default());

        sqlx::query(
            "INSERT INTO tcos (id, tco_number, natureza, data_fato, created_by, created_at, extra) VALUES (?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&request.tco_number)
        .bind(&request.natureza)
        .bind(&request.data_fato)
        .bind(&request.created_by)
        .bind(&now)
        .bind(&extra_json)
        .execute(&self.pool)
        .await?;

        Ok(Tco {
            id,
            tco_number: request.tco_number.clone(),
            natureza: request.natureza.clone(),
            data_fato: request.data_fato.clone(),
            created_by: request.created_by.clone(),
            created_at: now,
            extra: request.extra.clone(),
        })
    }

    /// Delete a TCO.
    pub async fn delete_tco(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tcos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("TCO {} not found", id)));
        }
        Ok(())
    }

    /// Find a same-year TCO whose normalized number matches exactly.
    ///
    /// Fetches up to 10 candidates whose stored number loosely contains the
    /// normalized digits, then compares normalized forms for an exact match.
    pub async fn find_duplicate_tco(
        &self,
        normalized: &str,
        year: i32,
    ) -> Result<Option<Tco>, AppError> {
        if normalized.is_empty() {
            return Ok(None);
        }

        let rows = sqlx::query(
            r#"SELECT id, tco_number, natureza, data_fato, created_by, created_at, extra
               FROM tcos
               WHERE tco_number LIKE '%' || ? || '%' AND substr(created_at, 1, 4) = ?
               LIMIT 10"#,
        )
        .bind(normalized)
        .bind(format!("{:04}", year))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(tco_from_row)
            .find(|candidate| candidate.normalized_number() == normalized))
    }

    // ==================== DRAFT OPERATIONS ====================

    /// Load a stored draft. Corrupt stored JSON is treated as absent.
    pub async fn get_draft(&self, owner_email: &str) -> Result<Option<Draft>, AppError> {
        let row = sqlx::query(
            "SELECT owner_email, payload, updated_at FROM drafts WHERE owner_email = ?",
        )
        .bind(owner_email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: String = row.get("payload");
        match serde_json::from_str(&raw) {
            Ok(payload) => Ok(Some(Draft {
                owner_email: row.get("owner_email"),
                payload,
                updated_at: row.get("updated_at"),
            })),
            Err(e) => {
                tracing::warn!("Discarding corrupt draft for {}: {}", owner_email, e);
                Ok(None)
            }
        }
    }

    /// Merge a partial update into the stored draft and write it back wholesale.
    pub async fn save_draft(
        &self,
        owner_email: &str,
        partial: &serde_json::Value,
    ) -> Result<Draft, AppError> {
        let base = self
            .get_draft(owner_email)
            .await?
            .map(|d| d.payload)
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()));

        let merged = merge_draft(base, partial);
        let payload_json = serde_json::to_string(&merged)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO drafts (owner_email, payload, updated_at) VALUES (?, ?, ?)
               ON CONFLICT(owner_email) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at"#,
        )
        .bind(owner_email)
        .bind(&payload_json)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Draft {
            owner_email: owner_email.to_string(),
            payload: merged,
            updated_at: now,
        })
    }

    /// Remove a stored draft. Clearing an absent draft is not an error.
    pub async fn clear_draft(&self, owner_email: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM drafts WHERE owner_email = ?")
            .bind(owner_email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ==================== CONVOCATION OPERATIONS ====================

    /// List all convocations, newest first.
    pub async fn list_convocations(&self) -> Result<Vec<Convocation>, AppError> {
        let rows = sqlx::query(
            "SELECT id, month_year, starts_on, ends_on, deadline, active, created_at FROM convocations ORDER BY created_at DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(convocation_from_row).collect())
    }

    /// List active convocations.
    pub async fn list_active_convocations(&self) -> Result<Vec<Convocation>, AppError> {
        let rows = sqlx::query(
            "SELECT id, month_year, starts_on, ends_on, deadline, active, created_at FROM convocations WHERE active = 1 ORDER BY created_at"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(convocation_from_row).collect())
    }

    /// Create a new convocation.
    pub async fn create_convocation(
        &self,
        request: &CreateConvocationRequest,
    ) -> Result<Convocation, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO convocations (id, month_year, starts_on, ends_on, deadline, active, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&request.month_year)
        .bind(&request.starts_on)
        .bind(&request.ends_on)
        .bind(&request.deadline)
        .bind(request.active as i32)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Convocation {
            id,
            month_year: request.month_year.clone(),
            starts_on: request.starts_on.clone(),
            ends_on: request.ends_on.clone(),
            deadline: request.deadline.clone(),
            active: request.active,
            created_at: now,
        })
    }

    /// Delete a convocation.
    pub async fn delete_convocation(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM convocations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Convocation {} not found", id)));
        }
        Ok(())
    }

    /// Get a user's response to a convocation, if any.
    pub async fn get_response(
        &self,
        convocation_id: &str,
        user_email: &str,
    ) -> Result<Option<ConvocationResponse>, AppError> {
        let row = sqlx::query(
            "SELECT id, convocation_id, user_email, response, responded_at FROM convocation_responses WHERE convocation_id = ? AND user_email = ?"
        )
        .bind(convocation_id)
        .bind(user_email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(response_from_row))
    }

    /// Record a user's response. At most one per (convocation, user).
    pub async fn insert_response(
        &self,
        convocation_id: &str,
        user_email: &str,
        response: &str,
    ) -> Result<ConvocationResponse, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO convocation_responses (id, convocation_id, user_email, response, responded_at) VALUES (?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(convocation_id)
        .bind(user_email)
        .bind(response)
        .bind(&now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(ConvocationResponse {
                id,
                convocation_id: convocation_id.to_string(),
                user_email: user_email.to_string(),
                response: response.to_string(),
                responded_at: now,
            }),
            Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(format!(
                "User {} has already responded to this convocation",
                user_email
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Find the first active convocation the user has not responded to.
    ///
    /// At most one convocation is expected to be active, but all active ones
    /// are checked in order; the first unanswered one wins.
    pub async fn find_pending_convocation(
        &self,
        user_email: &str,
    ) -> Result<Option<Convocation>, AppError> {
        for convocation in self.list_active_convocations().await? {
            if self.get_response(&convocation.id, user_email).await?.is_none() {
                return Ok(Some(convocation));
            }
        }
        Ok(None)
    }

    // ==================== TIME SLOT OPERATIONS ====================

    /// List time slots, optionally bounded by date (inclusive).
    pub async fn list_slots(
        &self,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<TimeSlot>, AppError> {
        let mut sql = String::from(
            "SELECT id, slot_date, starts_at, ends_at, total_slots, used_slots, allowed_user_types, created_at FROM time_slots WHERE 1 = 1",
        );
        if from.is_some() {
            sql.push_str(" AND slot_date >= ?");
        }
        if to.is_some() {
            sql.push_str(" AND slot_date <= ?");
        }
        sql.push_str(" ORDER BY slot_date, starts_at");

        let mut query = sqlx::query(&sql);
        if let Some(from) = from {
            query = query.bind(from.to_string());
        }
        if let Some(to) = to {
            query = query.bind(to.to_string());
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(slot_from_row).collect())
    }

    /// Get a time slot by ID.
    pub async fn get_slot(&self, id: &str) -> Result<Option<TimeSlot>, AppError> {
        let row = sqlx::query(
            "SELECT id, slot_date, starts_at, ends_at, total_slots, used_slots, allowed_user_types, created_at FROM time_slots WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(slot_from_row))
    }

    /// Create a new time slot.
    pub async fn create_slot(&self, request: &CreateSlotRequest) -> Result<TimeSlot, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let allowed_json = request
            .allowed_user_types
            .as_ref()
            .map(|t| serde_json::to_string(t).unwrap_or_default());

        sqlx::query(
            "INSERT INTO time_slots (id, slot_date, starts_at, ends_at, total_slots, used_slots, allowed_user_types, created_at) VALUES (?, ?, ?, ?, ?, 0, ?, ?)"
        )
        .bind(&id)
        .bind(&request.slot_date)
        .bind(&request.starts_at)
        .bind(&request.ends_at)
        .bind(request.total_slots)
        .bind(&allowed_json)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(TimeSlot {
            id,
            slot_date: request.slot_date.clone(),
            starts_at: request.starts_at.clone(),
            ends_at: request.ends_at.clone(),
            total_slots: request.total_slots,
            used_slots: 0,
            allowed_user_types: request.allowed_user_types.clone(),
            created_at: now,
        })
    }

    /// Delete a time slot.
    pub async fn delete_slot(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM time_slots WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Time slot {} not found", id)));
        }
        Ok(())
    }

    /// Book one place in a slot.
    ///
    /// The conditional UPDATE guards the capacity invariant: two concurrent
    /// bookings of the last place cannot both succeed.
    pub async fn book_slot(&self, id: &str, user_type: Option<&str>) -> Result<TimeSlot, AppError> {
        let slot = self
            .get_slot(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Time slot {} not found", id)))?;

        if let Some(allowed) = &slot.allowed_user_types {
            let user_type = user_type.ok_or_else(|| {
                AppError::Validation("userType is required for this slot".to_string())
            })?;
            if !allowed.iter().any(|a| a == user_type) {
                return Err(AppError::Validation(format!(
                    "User type {} is not allowed for this slot",
                    user_type
                )));
            }
        }

        let result = sqlx::query(
            "UPDATE time_slots SET used_slots = used_slots + 1 WHERE id = ? AND used_slots < total_slots"
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Slot is already full".to_string()));
        }

        self.get_slot(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Time slot {} not found", id)))
    }

    /// Release one booked place in a slot, floored at zero.
    pub async fn cancel_slot_booking(&self, id: &str) -> Result<TimeSlot, AppError> {
        let exists = self.get_slot(id).await?.is_some();
        if !exists {
            return Err(AppError::NotFound(format!("Time slot {} not found", id)));
        }

        let result = sqlx::query(
            "UPDATE time_slots SET used_slots = used_slots - 1 WHERE id = ? AND used_slots > 0",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Slot has no bookings to cancel".to_string(),
            ));
        }

        self.get_slot(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Time slot {} not found", id)))
    }

    // ==================== SYSTEM VERSION OPERATIONS ====================

    /// Get the system version record, creating the default lazily.
    pub async fn get_system_version(&self) -> Result<SystemVersion, AppError> {
        let row = sqlx::query(
            "SELECT version, improvements, updated_at FROM system_version WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(version_from_row(&row));
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT OR IGNORE INTO system_version (id, version, improvements, updated_at) VALUES (1, ?, ?, ?)"
        )
        .bind(DEFAULT_SYSTEM_VERSION)
        .bind(DEFAULT_IMPROVEMENTS)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        // Re-read in case a concurrent writer created the record first
        let row = sqlx::query(
            "SELECT version, improvements, updated_at FROM system_version WHERE id = 1",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(version_from_row(&row))
    }

    /// Publish a new system version.
    pub async fn set_system_version(
        &self,
        version: &str,
        improvements: &str,
    ) -> Result<SystemVersion, AppError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO system_version (id, version, improvements, updated_at) VALUES (1, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET version = excluded.version, improvements = excluded.improvements, updated_at = excluded.updated_at"#,
        )
        .bind(version)
        .bind(improvements)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(SystemVersion {
            version: version.to_string(),
            improvements: improvements.to_string(),
            updated_at: now,
        })
    }

    // ==================== MESSAGE OPERATIONS ====================

    /// List all messages, newest first.
    pub async fn list_messages(&self) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query(
            "SELECT id, author_email, body, created_at FROM messages ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(message_from_row).collect())
    }

    /// Post a new message.
    pub async fn create_message(
        &self,
        request: &CreateMessageRequest,
    ) -> Result<Message, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO messages (id, author_email, body, created_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(&request.author_email)
            .bind(&request.body)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(Message {
            id,
            author_email: request.author_email.clone(),
            body: request.body.clone(),
            created_at: now,
        })
    }

    /// Delete a message.
    pub async fn delete_message(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Message {} not found", id)));
        }
        Ok(())
    }

    // ==================== OPERATION OPERATIONS ====================

    /// List all operations.
    pub async fn list_operations(&self) -> Result<Vec<Operation>, AppError> {
        let rows =
            sqlx::query("SELECT id, name, active, created_at FROM operations ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.iter().map(operation_from_row).collect())
    }

    /// Get an operation by ID.
    pub async fn get_operation(&self, id: &str) -> Result<Option<Operation>, AppError> {
        let row = sqlx::query("SELECT id, name, active, created_at FROM operations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(operation_from_row))
    }

    /// Create an operation. Names must be unique.
    pub async fn create_operation(
        &self,
        request: &CreateOperationRequest,
    ) -> Result<Operation, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let result =
            sqlx::query("INSERT INTO operations (id, name, active, created_at) VALUES (?, ?, ?, ?)")
                .bind(&id)
                .bind(&request.name)
                .bind(request.active as i32)
                .bind(&now)
                .execute(&self.pool)
                .await;

        match result {
            Ok(_) => Ok(Operation {
                id,
                name: request.name.clone(),
                active: request.active,
                created_at: now,
            }),
            Err(e) if is_unique_violation(&e) => Err(AppError::Validation(format!(
                "Operation {} already exists",
                request.name
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Rename or toggle an operation.
    pub async fn update_operation(
        &self,
        id: &str,
        request: &UpdateOperationRequest,
    ) -> Result<Operation, AppError> {
        let existing = self
            .get_operation(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Operation {} not found", id)))?;

        let name = request.name.as_ref().unwrap_or(&existing.name);
        let active = request.active.unwrap_or(existing.active);

        let result = sqlx::query("UPDATE operations SET name = ?, active = ? WHERE id = ?")
            .bind(name)
            .bind(active as i32)
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(Operation {
                name: name.clone(),
                active,
                ..existing
            }),
            Err(e) if is_unique_violation(&e) => Err(AppError::Validation(format!(
                "Operation {} already exists",
                name
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an operation.
    pub async fn delete_operation(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM operations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Operation {} not found", id)));
        }
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

// Helper functions for row conversion

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    let blocked: i32 = row.get("blocked");
    User {
        id: row.get("id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        user_type: row.get("user_type"),
        blocked: blocked != 0,
        app_version: row.get("app_version"),
        created_at: row.get("created_at"),
    }
}

fn tco_from_row(row: &sqlx::sqlite::SqliteRow) -> Tco {
    let extra_str: Option<String> = row.get("extra");
    Tco {
        id: row.get("id"),
        tco_number: row.get("tco_number"),
        natureza: row.get("natureza"),
        data_fato: row.get("data_fato"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        extra: extra_str.and_then(|s| serde_json::from_str(&s).ok()),
    }
}

fn convocation_from_row(row: &sqlx::sqlite::SqliteRow) -> Convocation {
    let active: i32 = row.get("active");
    Convocation {
        id: row.get("id"),
        month_year: row.get("month_year"),
        starts_on: row.get("starts_on"),
        ends_on: row.get("ends_on"),
        deadline: row.get("deadline"),
        active: active != 0,
        created_at: row.get("created_at"),
    }
}

fn response_from_row(row: &sqlx::sqlite::SqliteRow) -> ConvocationResponse {
    ConvocationResponse {
        id: row.get("id"),
        convocation_id: row.get("convocation_id"),
        user_email: row.get("user_email"),
        response: row.get("response"),
        responded_at: row.get("responded_at"),
    }
}

fn slot_from_row(row: &sqlx::sqlite::SqliteRow) -> TimeSlot {
    let allowed_str: Option<String> = row.get("allowed_user_types");
    TimeSlot {
        id: row.get("id"),
        slot_date: row.get("slot_date"),
        starts_at: row.get("starts_at"),
        ends_at: row.get("ends_at"),
        total_slots: row.get("total_slots"),
        used_slots: row.get("used_slots"),
        allowed_user_types: allowed_str.and_then(|s| serde_json::from_str(&s).ok()),
        created_at: row.get("created_at"),
    }
}

fn version_from_row(row: &sqlx::sqlite::SqliteRow) -> SystemVersion {
    SystemVersion {
        version: row.get("version"),
        improvements: row.get("improvements"),
        updated_at: row.get("updated_at"),
    }
}

fn message_from_row(row: &sqlx::sqlite::SqliteRow) -> Message {
    Message {
        id: row.get("id"),
        author_email: row.get("author_email"),
        body: row.get("body"),
        created_at: row.get("created_at"),
    }
}

fn operation_from_row(row: &sqlx::sqlite::SqliteRow) -> Operation {
    Operation {
        id: row.get("id"),
        name: row.get("name"),
        active: active_flag(row),
        created_at: row.get("created_at"),
    }
}

fn active_flag(row: &sqlx::sqlite::SqliteRow) -> bool {
    let active: i32 = row.get("active");
    active != 0
}
