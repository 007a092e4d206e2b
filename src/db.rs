use anyhow::Context;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    AttendanceRecord, Group, Member, MemberUpdate, NewMember, NewPayment, Payment, PaymentMethod,
    PaymentRow, PaymentUpdate, Role, SessionDay,
};
use crate::store::{AttendanceStore, PaymentStore, RosterStore, SessionStore};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    debug!("migrations applied");
    Ok(())
}

/// Postgres-backed implementation of the storage traits. Cheap to clone;
/// clones share the pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_foreign_key_violation())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_unique_violation())
}

fn member_from_row(row: &PgRow) -> Result<Member> {
    let role_raw: String = row.try_get("role")?;
    let role = role_raw.parse::<Role>().map_err(|msg| {
        Error::Storage(sqlx::Error::ColumnDecode {
            index: "role".into(),
            source: msg.into(),
        })
    })?;
    Ok(Member {
        id: row.try_get("id")?,
        given_name: row.try_get("given_name")?,
        family_name: row.try_get("family_name")?,
        email: row.try_get("email")?,
        role,
        group_id: row.try_get("group_id")?,
        enrolled_at: row.try_get("enrolled_at")?,
        active: row.try_get("active")?,
        inactive_since: row.try_get("inactive_since")?,
        payment_exempt: row.try_get("payment_exempt")?,
    })
}

fn payment_from_row(row: &PgRow) -> Result<Payment> {
    let method_raw: String = row.try_get("method")?;
    let method = method_raw.parse::<PaymentMethod>().map_err(|msg| {
        Error::Storage(sqlx::Error::ColumnDecode {
            index: "method".into(),
            source: msg.into(),
        })
    })?;
    Ok(Payment {
        id: row.try_get("id")?,
        member_id: row.try_get("member_id")?,
        paid_on: row.try_get("paid_on")?,
        reference: row.try_get("reference")?,
        bank: row.try_get("bank")?,
        method,
        receipt: row.try_get("receipt")?,
    })
}

#[async_trait]
impl RosterStore for PgStore {
    async fn groups(&self) -> Result<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(
            "SELECT id, name, description FROM club.groups ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    async fn group_by_id(&self, id: Uuid) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, name, description FROM club.groups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(group)
    }

    async fn group_by_name(&self, name: &str) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, name, description FROM club.groups WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(group)
    }

    async fn create_group(&self, name: &str, description: &str) -> Result<Group> {
        let inserted = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO club.groups (id, name, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            RETURNING id, name, description
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;
        inserted.ok_or_else(|| Error::DuplicateGroup(name.to_string()))
    }

    async fn update_group(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Group> {
        let updated = sqlx::query_as::<_, Group>(
            r#"
            UPDATE club.groups
            SET name = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE id = $1
            RETURNING id, name, description
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                Error::DuplicateGroup(name.unwrap_or_default().to_string())
            } else {
                Error::Storage(err)
            }
        })?;
        updated.ok_or_else(|| Error::GroupNotFound(id.to_string()))
    }

    async fn delete_group(&self, id: Uuid) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM club.groups WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match deleted {
            Some(_) => Ok(()),
            None => Err(Error::GroupNotFound(id.to_string())),
        }
    }

    async fn members(&self, role: Option<Role>) -> Result<Vec<Member>> {
        let mut query = String::from(
            "SELECT id, given_name, family_name, email, role, group_id, \
             enrolled_at, active, inactive_since, payment_exempt \
             FROM club.members",
        );
        if role.is_some() {
            query.push_str(" WHERE role = $1");
        }
        query.push_str(" ORDER BY given_name, family_name");

        let mut rows = sqlx::query(&query);
        if let Some(role) = role {
            rows = rows.bind(role.as_str());
        }

        let records = rows.fetch_all(&self.pool).await?;
        records.iter().map(member_from_row).collect()
    }

    async fn members_of_group(&self, group_id: Uuid) -> Result<Vec<Member>> {
        let records = sqlx::query(
            "SELECT id, given_name, family_name, email, role, group_id, \
             enrolled_at, active, inactive_since, payment_exempt \
             FROM club.members WHERE group_id = $1 \
             ORDER BY given_name, family_name",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        records.iter().map(member_from_row).collect()
    }

    async fn member_by_id(&self, id: Uuid) -> Result<Option<Member>> {
        let record = sqlx::query(
            "SELECT id, given_name, family_name, email, role, group_id, \
             enrolled_at, active, inactive_since, payment_exempt \
             FROM club.members WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        record.as_ref().map(member_from_row).transpose()
    }

    async fn member_by_email(&self, email: &str) -> Result<Option<Member>> {
        let record = sqlx::query(
            "SELECT id, given_name, family_name, email, role, group_id, \
             enrolled_at, active, inactive_since, payment_exempt \
             FROM club.members WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        record.as_ref().map(member_from_row).transpose()
    }

    async fn create_member(&self, new: &NewMember) -> Result<Member> {
        let record = sqlx::query(
            r#"
            INSERT INTO club.members
            (id, given_name, family_name, email, role, group_id,
             enrolled_at, active, inactive_since, payment_exempt)
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, NULL, $8)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, given_name, family_name, email, role, group_id,
                      enrolled_at, active, inactive_since, payment_exempt
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.given_name)
        .bind(&new.family_name)
        .bind(&new.email)
        .bind(new.role.as_str())
        .bind(new.group_id)
        .bind(new.enrolled_at)
        .bind(new.payment_exempt)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                Error::GroupNotFound(
                    new.group_id.map(|id| id.to_string()).unwrap_or_default(),
                )
            } else {
                Error::Storage(err)
            }
        })?;
        match record {
            Some(row) => member_from_row(&row),
            None => Err(Error::DuplicateEmail(new.email.clone())),
        }
    }

    async fn update_member(&self, id: Uuid, update: &MemberUpdate) -> Result<Member> {
        if update.is_empty() {
            return self
                .member_by_id(id)
                .await?
                .ok_or_else(|| Error::MemberNotFound(id.to_string()));
        }
        let record = sqlx::query(
            r#"
            UPDATE club.members
            SET given_name = COALESCE($2, given_name),
                family_name = COALESCE($3, family_name),
                email = COALESCE($4, email),
                role = COALESCE($5, role),
                group_id = CASE WHEN $6 THEN $7 ELSE group_id END
            WHERE id = $1
            RETURNING id, given_name, family_name, email, role, group_id,
                      enrolled_at, active, inactive_since, payment_exempt
            "#,
        )
        .bind(id)
        .bind(&update.given_name)
        .bind(&update.family_name)
        .bind(&update.email)
        .bind(update.role.map(|r| r.as_str()))
        .bind(update.group.is_some())
        .bind(update.group.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                Error::DuplicateEmail(update.email.clone().unwrap_or_default())
            } else if is_foreign_key_violation(&err) {
                Error::GroupNotFound(
                    update
                        .group
                        .flatten()
                        .map(|g| g.to_string())
                        .unwrap_or_default(),
                )
            } else {
                Error::Storage(err)
            }
        })?;
        match record {
            Some(row) => member_from_row(&row),
            None => Err(Error::MemberNotFound(id.to_string())),
        }
    }

    async fn delete_member(&self, id: Uuid) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM club.members WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match deleted {
            Some(_) => Ok(()),
            None => Err(Error::MemberNotFound(id.to_string())),
        }
    }

    async fn set_member_active(&self, id: Uuid, active: bool, today: NaiveDate) -> Result<Member> {
        // Deactivating stamps today's date unless a date was already set,
        // so re-running the operation never moves an earlier cutoff.
        let record = sqlx::query(
            r#"
            UPDATE club.members
            SET active = $2,
                inactive_since = CASE
                    WHEN $2 THEN NULL
                    WHEN inactive_since IS NULL THEN $3
                    ELSE inactive_since
                END
            WHERE id = $1
            RETURNING id, given_name, family_name, email, role, group_id,
                      enrolled_at, active, inactive_since, payment_exempt
            "#,
        )
        .bind(id)
        .bind(active)
        .bind(today)
        .fetch_optional(&self.pool)
        .await?;
        match record {
            Some(row) => member_from_row(&row),
            None => Err(Error::MemberNotFound(id.to_string())),
        }
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn session_day(&self, group_id: Uuid, date: NaiveDate) -> Result<Option<SessionDay>> {
        let day = sqlx::query_as::<_, SessionDay>(
            "SELECT id, group_id, session_date, active FROM club.session_days \
             WHERE group_id = $1 AND session_date = $2",
        )
        .bind(group_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(day)
    }

    async fn session_day_by_id(&self, id: Uuid) -> Result<Option<SessionDay>> {
        let day = sqlx::query_as::<_, SessionDay>(
            "SELECT id, group_id, session_date, active FROM club.session_days WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(day)
    }

    async fn session_days(&self, group_id: Option<Uuid>) -> Result<Vec<SessionDay>> {
        let mut query =
            String::from("SELECT id, group_id, session_date, active FROM club.session_days");
        if group_id.is_some() {
            query.push_str(" WHERE group_id = $1");
        }
        query.push_str(" ORDER BY session_date DESC");

        let mut rows = sqlx::query_as::<_, SessionDay>(&query);
        if let Some(group_id) = group_id {
            rows = rows.bind(group_id);
        }
        let days = rows.fetch_all(&self.pool).await?;
        Ok(days)
    }

    async fn session_days_between(
        &self,
        group_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SessionDay>> {
        let days = sqlx::query_as::<_, SessionDay>(
            "SELECT id, group_id, session_date, active FROM club.session_days \
             WHERE group_id = $1 AND session_date BETWEEN $2 AND $3 \
             ORDER BY session_date",
        )
        .bind(group_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(days)
    }

    async fn activate(&self, group_id: Uuid, date: NaiveDate) -> Result<SessionDay> {
        let day = sqlx::query_as::<_, SessionDay>(
            r#"
            INSERT INTO club.session_days (id, group_id, session_date, active)
            VALUES ($1, $2, $3, TRUE)
            ON CONFLICT (group_id, session_date) DO UPDATE SET active = TRUE
            RETURNING id, group_id, session_date, active
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(group_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                Error::GroupNotFound(group_id.to_string())
            } else {
                Error::Storage(err)
            }
        })?;
        Ok(day)
    }

    async fn deactivate(&self, group_id: Uuid, date: NaiveDate) -> Result<Option<SessionDay>> {
        let day = sqlx::query_as::<_, SessionDay>(
            r#"
            UPDATE club.session_days SET active = FALSE
            WHERE group_id = $1 AND session_date = $2
            RETURNING id, group_id, session_date, active
            "#,
        )
        .bind(group_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(day)
    }

    async fn delete_session_day(&self, id: Uuid) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM club.session_days WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match deleted {
            Some(_) => Ok(()),
            None => Err(Error::SessionDayNotFound(id.to_string())),
        }
    }

    async fn is_session_active(&self, group_id: Uuid, date: NaiveDate) -> Result<bool> {
        let active: Option<bool> = sqlx::query_scalar(
            "SELECT active FROM club.session_days WHERE group_id = $1 AND session_date = $2",
        )
        .bind(group_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(active.unwrap_or(false))
    }

    async fn active_days(
        &self,
        group_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let days = sqlx::query_scalar(
            "SELECT session_date FROM club.session_days \
             WHERE group_id = $1 AND active AND session_date BETWEEN $2 AND $3 \
             ORDER BY session_date",
        )
        .bind(group_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(days)
    }
}

#[async_trait]
impl AttendanceStore for PgStore {
    async fn record(&self, member_id: Uuid, date: NaiveDate) -> Result<Option<AttendanceRecord>> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT id, member_id, session_date, present, note FROM club.attendance \
             WHERE member_id = $1 AND session_date = $2",
        )
        .bind(member_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn records_between(
        &self,
        member_ids: &[Uuid],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT id, member_id, session_date, present, note FROM club.attendance \
             WHERE member_id = ANY($1) AND session_date BETWEEN $2 AND $3 \
             ORDER BY session_date, member_id",
        )
        .bind(member_ids)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn records_for_member(&self, member_id: Uuid) -> Result<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT id, member_id, session_date, present, note FROM club.attendance \
             WHERE member_id = $1 ORDER BY session_date",
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn mark(
        &self,
        member_id: Uuid,
        date: NaiveDate,
        present: bool,
        note: &str,
    ) -> Result<AttendanceRecord> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO club.attendance (id, member_id, session_date, present, note)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (member_id, session_date) DO NOTHING
            RETURNING id, member_id, session_date, present, note
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(member_id)
        .bind(date)
        .bind(present)
        .bind(note)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                Error::MemberNotFound(member_id.to_string())
            } else {
                Error::Storage(err)
            }
        })?;
        record.ok_or(Error::DuplicateAttendance {
            member: member_id,
            date,
        })
    }

    async fn toggle(&self, member_id: Uuid, date: NaiveDate) -> Result<AttendanceRecord> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            UPDATE club.attendance SET present = NOT present
            WHERE member_id = $1 AND session_date = $2
            RETURNING id, member_id, session_date, present, note
            "#,
        )
        .bind(member_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        record.ok_or_else(|| Error::AttendanceNotFound(format!("for member {member_id} on {date}")))
    }

    async fn set_note(
        &self,
        member_id: Uuid,
        date: NaiveDate,
        note: &str,
    ) -> Result<AttendanceRecord> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            UPDATE club.attendance SET note = $3
            WHERE member_id = $1 AND session_date = $2
            RETURNING id, member_id, session_date, present, note
            "#,
        )
        .bind(member_id)
        .bind(date)
        .bind(note)
        .fetch_optional(&self.pool)
        .await?;
        record.ok_or_else(|| Error::AttendanceNotFound(format!("for member {member_id} on {date}")))
    }

    async fn unmark(&self, member_id: Uuid, date: NaiveDate) -> Result<()> {
        let deleted = sqlx::query(
            "DELETE FROM club.attendance WHERE member_id = $1 AND session_date = $2 RETURNING id",
        )
        .bind(member_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        match deleted {
            Some(_) => Ok(()),
            None => Err(Error::AttendanceNotFound(format!(
                "for member {member_id} on {date}"
            ))),
        }
    }
}

#[async_trait]
impl PaymentStore for PgStore {
    async fn insert_payment(&self, new: &NewPayment) -> Result<Payment> {
        let record = sqlx::query(
            r#"
            INSERT INTO club.payments (id, member_id, paid_on, reference, bank, method, receipt)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (reference) DO NOTHING
            RETURNING id, member_id, paid_on, reference, bank, method, receipt
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.member_id)
        .bind(new.paid_on)
        .bind(&new.reference)
        .bind(&new.bank)
        .bind(new.method.as_str())
        .bind(&new.receipt)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                Error::MemberNotFound(new.member_id.to_string())
            } else {
                Error::Storage(err)
            }
        })?;
        match record {
            Some(row) => payment_from_row(&row),
            None => Err(Error::DuplicateReference(new.reference.clone())),
        }
    }

    async fn payment(&self, id: Uuid) -> Result<Option<Payment>> {
        let record = sqlx::query(
            "SELECT id, member_id, paid_on, reference, bank, method, receipt \
             FROM club.payments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        record.as_ref().map(payment_from_row).transpose()
    }

    async fn payment_by_reference(&self, reference: &str) -> Result<Option<Payment>> {
        let record = sqlx::query(
            "SELECT id, member_id, paid_on, reference, bank, method, receipt \
             FROM club.payments WHERE reference = $1",
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;
        record.as_ref().map(payment_from_row).transpose()
    }

    async fn update_payment(&self, id: Uuid, update: &PaymentUpdate) -> Result<Payment> {
        if update.is_empty() {
            return self
                .payment(id)
                .await?
                .ok_or_else(|| Error::PaymentNotFound(id.to_string()));
        }
        let record = sqlx::query(
            r#"
            UPDATE club.payments
            SET paid_on = COALESCE($2, paid_on),
                reference = COALESCE($3, reference),
                method = COALESCE($4, method),
                bank = CASE WHEN $5 THEN $6 ELSE bank END,
                receipt = CASE WHEN $7 THEN $8 ELSE receipt END
            WHERE id = $1
            RETURNING id, member_id, paid_on, reference, bank, method, receipt
            "#,
        )
        .bind(id)
        .bind(update.paid_on)
        .bind(&update.reference)
        .bind(update.method.map(|m| m.as_str()))
        .bind(update.bank.is_some())
        .bind(update.bank.clone().flatten())
        .bind(update.receipt.is_some())
        .bind(update.receipt.clone().flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                Error::DuplicateReference(update.reference.clone().unwrap_or_default())
            } else {
                Error::Storage(err)
            }
        })?;
        match record {
            Some(row) => payment_from_row(&row),
            None => Err(Error::PaymentNotFound(id.to_string())),
        }
    }

    async fn delete_payment(&self, id: Uuid) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM club.payments WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match deleted {
            Some(_) => Ok(()),
            None => Err(Error::PaymentNotFound(id.to_string())),
        }
    }

    async fn payments_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<PaymentRow>> {
        let records = sqlx::query(
            "SELECT p.id, p.member_id, p.paid_on, p.reference, p.bank, p.method, p.receipt, \
             m.given_name, m.family_name \
             FROM club.payments p \
             JOIN club.members m ON m.id = p.member_id \
             WHERE p.paid_on BETWEEN $1 AND $2 \
             ORDER BY p.paid_on DESC, p.reference",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let mut rows = Vec::with_capacity(records.len());
        for row in &records {
            let given: String = row.try_get("given_name")?;
            let family: String = row.try_get("family_name")?;
            rows.push(PaymentRow {
                payment: payment_from_row(row)?,
                member_name: format!("{given} {family}"),
            });
        }
        Ok(rows)
    }

    async fn payments_for_member(&self, member_id: Uuid) -> Result<Vec<Payment>> {
        let records = sqlx::query(
            "SELECT id, member_id, paid_on, reference, bank, method, receipt \
             FROM club.payments WHERE member_id = $1 \
             ORDER BY paid_on DESC, reference",
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;
        records.iter().map(payment_from_row).collect()
    }
}

/// Loads a small demo roster: two groups, a January training week with
/// marked attendance, and a couple of payments. Safe to re-run.
pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let groups = vec![
        (
            Uuid::parse_str("6b9f2a3e-41c7-4d18-9a6e-f12c68d4b0a1")?,
            "Infantil A",
            "Atletas de 8 a 11 años",
        ),
        (
            Uuid::parse_str("c4e8d1f0-7b52-49c3-8d2e-a90b31c7e6f4")?,
            "Juvenil",
            "Atletas de 12 a 15 años",
        ),
    ];

    for (id, name, description) in &groups {
        sqlx::query(
            r#"
            INSERT INTO club.groups (id, name, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE SET description = EXCLUDED.description
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_one(pool)
        .await?;
    }

    let infantil = groups[0].0;
    let juvenil = groups[1].0;

    // (given, family, email, role, group, enrolled, active, inactive_since, exempt)
    let members: Vec<(
        &str,
        &str,
        &str,
        Role,
        Option<Uuid>,
        NaiveDate,
        bool,
        Option<NaiveDate>,
        bool,
    )> = vec![
        (
            "María",
            "González",
            "maria.gonzalez@clubatletismo.test",
            Role::Student,
            Some(infantil),
            NaiveDate::from_ymd_opt(2025, 9, 1).context("invalid date")?,
            true,
            None,
            false,
        ),
        (
            "Pedro",
            "Ramírez",
            "pedro.ramirez@clubatletismo.test",
            Role::Student,
            Some(infantil),
            NaiveDate::from_ymd_opt(2025, 9, 1).context("invalid date")?,
            true,
            None,
            false,
        ),
        (
            "Luisa",
            "Mendoza",
            "luisa.mendoza@clubatletismo.test",
            Role::Student,
            Some(infantil),
            NaiveDate::from_ymd_opt(2026, 1, 14).context("invalid date")?,
            true,
            None,
            false,
        ),
        (
            "Diego",
            "Torres",
            "diego.torres@clubatletismo.test",
            Role::Student,
            Some(infantil),
            NaiveDate::from_ymd_opt(2025, 9, 1).context("invalid date")?,
            false,
            Some(NaiveDate::from_ymd_opt(2026, 1, 14).context("invalid date")?),
            false,
        ),
        (
            "Carmen",
            "Silva",
            "carmen.silva@clubatletismo.test",
            Role::Student,
            Some(juvenil),
            NaiveDate::from_ymd_opt(2025, 9, 1).context("invalid date")?,
            true,
            None,
            false,
        ),
        (
            "José",
            "Blanco",
            "jose.blanco@clubatletismo.test",
            Role::Student,
            Some(juvenil),
            NaiveDate::from_ymd_opt(2025, 10, 15).context("invalid date")?,
            true,
            None,
            true,
        ),
        (
            "Ana",
            "Pérez",
            "ana.perez@clubatletismo.test",
            Role::Coach,
            Some(infantil),
            NaiveDate::from_ymd_opt(2024, 3, 1).context("invalid date")?,
            true,
            None,
            false,
        ),
        (
            "Rafael",
            "Ortiz",
            "rafael.ortiz@clubatletismo.test",
            Role::Administrator,
            None,
            NaiveDate::from_ymd_opt(2023, 6, 1).context("invalid date")?,
            true,
            None,
            false,
        ),
    ];

    for (given, family, email, role, group_id, enrolled, active, inactive_since, exempt) in members
    {
        let enrolled_at = Utc
            .with_ymd_and_hms(enrolled.year(), enrolled.month(), enrolled.day(), 9, 0, 0)
            .single()
            .context("invalid timestamp")?;
        sqlx::query(
            r#"
            INSERT INTO club.members
            (id, given_name, family_name, email, role, group_id,
             enrolled_at, active, inactive_since, payment_exempt)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (email) DO UPDATE
            SET given_name = EXCLUDED.given_name, family_name = EXCLUDED.family_name,
                role = EXCLUDED.role, group_id = EXCLUDED.group_id,
                enrolled_at = EXCLUDED.enrolled_at, active = EXCLUDED.active,
                inactive_since = EXCLUDED.inactive_since,
                payment_exempt = EXCLUDED.payment_exempt
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(given)
        .bind(family)
        .bind(email)
        .bind(role.as_str())
        .bind(group_id)
        .bind(enrolled_at)
        .bind(active)
        .bind(inactive_since)
        .bind(exempt)
        .fetch_one(pool)
        .await?;
    }

    // Training week 3 of 2026: Tuesday and Thursday for Infantil A,
    // Wednesday for Juvenil. The Saturday row stays inactive.
    let sessions = vec![
        (infantil, NaiveDate::from_ymd_opt(2026, 1, 13).context("invalid date")?, true),
        (infantil, NaiveDate::from_ymd_opt(2026, 1, 15).context("invalid date")?, true),
        (infantil, NaiveDate::from_ymd_opt(2026, 1, 17).context("invalid date")?, false),
        (juvenil, NaiveDate::from_ymd_opt(2026, 1, 14).context("invalid date")?, true),
    ];

    for (group_id, date, active) in sessions {
        sqlx::query(
            r#"
            INSERT INTO club.session_days (id, group_id, session_date, active)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (group_id, session_date) DO UPDATE SET active = EXCLUDED.active
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(group_id)
        .bind(date)
        .bind(active)
        .execute(pool)
        .await?;
    }

    let attendance = vec![
        ("maria.gonzalez@clubatletismo.test", NaiveDate::from_ymd_opt(2026, 1, 13), true, ""),
        (
            "pedro.ramirez@clubatletismo.test",
            NaiveDate::from_ymd_opt(2026, 1, 13),
            false,
            "Lesión en el tobillo",
        ),
        ("diego.torres@clubatletismo.test", NaiveDate::from_ymd_opt(2026, 1, 13), true, ""),
        ("maria.gonzalez@clubatletismo.test", NaiveDate::from_ymd_opt(2026, 1, 15), true, ""),
        ("pedro.ramirez@clubatletismo.test", NaiveDate::from_ymd_opt(2026, 1, 15), true, ""),
        ("luisa.mendoza@clubatletismo.test", NaiveDate::from_ymd_opt(2026, 1, 15), true, ""),
        ("carmen.silva@clubatletismo.test", NaiveDate::from_ymd_opt(2026, 1, 14), true, ""),
    ];

    for (email, date, present, note) in attendance {
        let member_id: Uuid = sqlx::query("SELECT id FROM club.members WHERE email = $1")
            .bind(email)
            .fetch_one(pool)
            .await?
            .get("id");

        sqlx::query(
            r#"
            INSERT INTO club.attendance (id, member_id, session_date, present, note)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (member_id, session_date) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(member_id)
        .bind(date.context("invalid date")?)
        .bind(present)
        .bind(note)
        .execute(pool)
        .await?;
    }

    let payments = vec![
        (
            "maria.gonzalez@clubatletismo.test",
            NaiveDate::from_ymd_opt(2026, 1, 5),
            "0051234567",
            Some("0102"),
            PaymentMethod::MobilePayment,
            None::<&str>,
        ),
        (
            "carmen.silva@clubatletismo.test",
            NaiveDate::from_ymd_opt(2026, 1, 7),
            "7798812345",
            Some("0134"),
            PaymentMethod::BankTransfer,
            Some("recibos/7798812345.jpg"),
        ),
    ];

    for (email, paid_on, reference, bank, method, receipt) in payments {
        let member_id: Uuid = sqlx::query("SELECT id FROM club.members WHERE email = $1")
            .bind(email)
            .fetch_one(pool)
            .await?
            .get("id");

        sqlx::query(
            r#"
            INSERT INTO club.payments (id, member_id, paid_on, reference, bank, method, receipt)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (reference) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(member_id)
        .bind(paid_on.context("invalid date")?)
        .bind(reference)
        .bind(bank)
        .bind(method.as_str())
        .bind(receipt)
        .execute(pool)
        .await?;
    }

    debug!("seed fixture upserted");
    Ok(())
}
