//! Storage traits the view builders and reports are written against.
//! `db::PgStore` is the production implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    AttendanceRecord, Group, Member, MemberUpdate, NewMember, NewPayment, Payment, PaymentRow,
    PaymentUpdate, Role, SessionDay,
};

#[async_trait]
pub trait RosterStore {
    async fn groups(&self) -> Result<Vec<Group>>;
    async fn group_by_id(&self, id: Uuid) -> Result<Option<Group>>;
    async fn group_by_name(&self, name: &str) -> Result<Option<Group>>;
    /// Fails with `DuplicateGroup` when the name is already taken.
    async fn create_group(&self, name: &str, description: &str) -> Result<Group>;
    /// Renames the group or replaces its description; `None` keeps the
    /// current value.
    async fn update_group(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Group>;
    /// Deletes the group and its session rows. Members of the group stay
    /// registered, just without an assignment.
    async fn delete_group(&self, id: Uuid) -> Result<()>;

    /// All members, optionally narrowed to one role, in roster order
    /// (given name, then family name).
    async fn members(&self, role: Option<Role>) -> Result<Vec<Member>>;
    async fn members_of_group(&self, group_id: Uuid) -> Result<Vec<Member>>;
    async fn member_by_id(&self, id: Uuid) -> Result<Option<Member>>;
    async fn member_by_email(&self, email: &str) -> Result<Option<Member>>;
    /// Fails with `DuplicateEmail` when the address is already registered.
    async fn create_member(&self, new: &NewMember) -> Result<Member>;
    /// Applies the non-`None` fields of `update`. Fails with
    /// `DuplicateEmail` when moving to a taken address and with
    /// `GroupNotFound` when assigning to a group that does not exist.
    async fn update_member(&self, id: Uuid, update: &MemberUpdate) -> Result<Member>;
    /// Deletes the member together with their attendance and payment
    /// history.
    async fn delete_member(&self, id: Uuid) -> Result<()>;
    /// Flips the active flag. Deactivating stamps `inactive_since` with
    /// `today` unless a date is already set; reactivating clears it.
    async fn set_member_active(&self, id: Uuid, active: bool, today: NaiveDate) -> Result<Member>;
}

/// Per-group session activation registry.
#[async_trait]
pub trait SessionStore {
    async fn session_day(&self, group_id: Uuid, date: NaiveDate) -> Result<Option<SessionDay>>;
    async fn session_day_by_id(&self, id: Uuid) -> Result<Option<SessionDay>>;
    /// Session rows, newest date first, optionally narrowed to one group.
    async fn session_days(&self, group_id: Option<Uuid>) -> Result<Vec<SessionDay>>;
    /// Session rows for the group with dates in `from..=to`, ascending.
    async fn session_days_between(
        &self,
        group_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SessionDay>>;
    /// Marks the session active, creating the row if needed. Repeating
    /// the call is harmless.
    async fn activate(&self, group_id: Uuid, date: NaiveDate) -> Result<SessionDay>;
    /// Marks an existing session inactive. Returns `None` when no row
    /// exists, which already means "not active".
    async fn deactivate(&self, group_id: Uuid, date: NaiveDate) -> Result<Option<SessionDay>>;
    /// Removes the row entirely, unlike `deactivate`. Fails with
    /// `SessionDayNotFound` when the id is unknown.
    async fn delete_session_day(&self, id: Uuid) -> Result<()>;
    /// Whether the group's session on `date` counts for attendance; a
    /// date without a row was never activated.
    async fn is_session_active(&self, group_id: Uuid, date: NaiveDate) -> Result<bool>;
    /// Activated session dates of the group within `from..=to`, ascending.
    async fn active_days(
        &self,
        group_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>>;
}

#[async_trait]
pub trait AttendanceStore {
    async fn record(&self, member_id: Uuid, date: NaiveDate) -> Result<Option<AttendanceRecord>>;
    /// Records for any of `member_ids` dated within `from..=to`.
    async fn records_between(
        &self,
        member_ids: &[Uuid],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>>;
    /// Full history for one member, oldest first.
    async fn records_for_member(&self, member_id: Uuid) -> Result<Vec<AttendanceRecord>>;
    /// Creates the record; fails with `DuplicateAttendance` when one
    /// already exists for the member and date.
    async fn mark(
        &self,
        member_id: Uuid,
        date: NaiveDate,
        present: bool,
        note: &str,
    ) -> Result<AttendanceRecord>;
    /// Flips the present flag of an existing record.
    async fn toggle(&self, member_id: Uuid, date: NaiveDate) -> Result<AttendanceRecord>;
    async fn set_note(
        &self,
        member_id: Uuid,
        date: NaiveDate,
        note: &str,
    ) -> Result<AttendanceRecord>;
    /// Deletes the record; fails with `AttendanceNotFound` when there is
    /// nothing to delete.
    async fn unmark(&self, member_id: Uuid, date: NaiveDate) -> Result<()>;
}

#[async_trait]
pub trait PaymentStore {
    /// Inserts the payment; fails with `DuplicateReference` when the
    /// reference number was already registered.
    async fn insert_payment(&self, new: &NewPayment) -> Result<Payment>;
    async fn payment(&self, id: Uuid) -> Result<Option<Payment>>;
    async fn payment_by_reference(&self, reference: &str) -> Result<Option<Payment>>;
    /// Applies the non-`None` fields of `update`. Fails with
    /// `DuplicateReference` when moving to a taken reference.
    async fn update_payment(&self, id: Uuid, update: &PaymentUpdate) -> Result<Payment>;
    async fn delete_payment(&self, id: Uuid) -> Result<()>;
    /// Payments dated within `from..=to` joined with member names, newest
    /// first.
    async fn payments_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<PaymentRow>>;
    async fn payments_for_member(&self, member_id: Uuid) -> Result<Vec<Payment>>;
}
