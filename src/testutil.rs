//! In-memory store used by the unit tests. Mirrors the uniqueness and
//! foreign-key behavior of the Postgres schema so the view builders can
//! be exercised without a database.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    AttendanceRecord, Group, Member, MemberUpdate, NewMember, NewPayment, Payment, PaymentRow,
    PaymentUpdate, Role, SessionDay,
};
use crate::store::{AttendanceStore, PaymentStore, RosterStore, SessionStore};

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<State>,
}

#[derive(Default)]
struct State {
    groups: Vec<Group>,
    members: Vec<Member>,
    sessions: Vec<SessionDay>,
    records: Vec<AttendanceRecord>,
    payments: Vec<Payment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&self, name: &str, description: &str) -> Group {
        let group = Group {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
        };
        self.inner.lock().unwrap().groups.push(group.clone());
        group
    }

    pub fn add_member(
        &self,
        given: &str,
        family: &str,
        email: &str,
        role: Role,
        group_id: Option<Uuid>,
        enrolled: NaiveDate,
    ) -> Member {
        let member = Member {
            id: Uuid::new_v4(),
            given_name: given.to_string(),
            family_name: family.to_string(),
            email: email.to_string(),
            role,
            group_id,
            enrolled_at: Utc
                .with_ymd_and_hms(enrolled.year(), enrolled.month(), enrolled.day(), 9, 0, 0)
                .unwrap(),
            active: true,
            inactive_since: None,
            payment_exempt: false,
        };
        self.inner.lock().unwrap().members.push(member.clone());
        member
    }

    pub fn add_student(
        &self,
        given: &str,
        family: &str,
        email: &str,
        group_id: Option<Uuid>,
        enrolled: NaiveDate,
    ) -> Member {
        self.add_member(given, family, email, Role::Student, group_id, enrolled)
    }

    pub fn set_inactive(&self, member_id: Uuid, since: NaiveDate) {
        let mut state = self.inner.lock().unwrap();
        let member = state
            .members
            .iter_mut()
            .find(|m| m.id == member_id)
            .unwrap();
        member.active = false;
        member.inactive_since = Some(since);
    }
}

fn roster_order(members: &mut [Member]) {
    members.sort_by(|a, b| {
        a.given_name
            .cmp(&b.given_name)
            .then_with(|| a.family_name.cmp(&b.family_name))
    });
}

#[async_trait]
impl RosterStore for MemoryStore {
    async fn groups(&self) -> Result<Vec<Group>> {
        let mut groups = self.inner.lock().unwrap().groups.clone();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn group_by_id(&self, id: Uuid) -> Result<Option<Group>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .groups
            .iter()
            .find(|g| g.id == id)
            .cloned())
    }

    async fn group_by_name(&self, name: &str) -> Result<Option<Group>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .groups
            .iter()
            .find(|g| g.name == name)
            .cloned())
    }

    async fn create_group(&self, name: &str, description: &str) -> Result<Group> {
        let mut state = self.inner.lock().unwrap();
        if state.groups.iter().any(|g| g.name == name) {
            return Err(Error::DuplicateGroup(name.to_string()));
        }
        let group = Group {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
        };
        state.groups.push(group.clone());
        Ok(group)
    }

    async fn update_group(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Group> {
        let mut state = self.inner.lock().unwrap();
        if let Some(name) = name {
            if state.groups.iter().any(|g| g.name == name && g.id != id) {
                return Err(Error::DuplicateGroup(name.to_string()));
            }
        }
        let group = state
            .groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| Error::GroupNotFound(id.to_string()))?;
        if let Some(name) = name {
            group.name = name.to_string();
        }
        if let Some(description) = description {
            group.description = description.to_string();
        }
        Ok(group.clone())
    }

    async fn delete_group(&self, id: Uuid) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        let position = state
            .groups
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| Error::GroupNotFound(id.to_string()))?;
        state.groups.remove(position);
        for member in state.members.iter_mut().filter(|m| m.group_id == Some(id)) {
            member.group_id = None;
        }
        state.sessions.retain(|s| s.group_id != id);
        Ok(())
    }

    async fn members(&self, role: Option<Role>) -> Result<Vec<Member>> {
        let mut members: Vec<Member> = self
            .inner
            .lock()
            .unwrap()
            .members
            .iter()
            .filter(|m| role.map(|r| m.role == r).unwrap_or(true))
            .cloned()
            .collect();
        roster_order(&mut members);
        Ok(members)
    }

    async fn members_of_group(&self, group_id: Uuid) -> Result<Vec<Member>> {
        let mut members: Vec<Member> = self
            .inner
            .lock()
            .unwrap()
            .members
            .iter()
            .filter(|m| m.group_id == Some(group_id))
            .cloned()
            .collect();
        roster_order(&mut members);
        Ok(members)
    }

    async fn member_by_id(&self, id: Uuid) -> Result<Option<Member>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .members
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn member_by_email(&self, email: &str) -> Result<Option<Member>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .members
            .iter()
            .find(|m| m.email == email)
            .cloned())
    }

    async fn create_member(&self, new: &NewMember) -> Result<Member> {
        let mut state = self.inner.lock().unwrap();
        if state.members.iter().any(|m| m.email == new.email) {
            return Err(Error::DuplicateEmail(new.email.clone()));
        }
        if let Some(group_id) = new.group_id {
            if !state.groups.iter().any(|g| g.id == group_id) {
                return Err(Error::GroupNotFound(group_id.to_string()));
            }
        }
        let member = Member {
            id: Uuid::new_v4(),
            given_name: new.given_name.clone(),
            family_name: new.family_name.clone(),
            email: new.email.clone(),
            role: new.role,
            group_id: new.group_id,
            enrolled_at: new.enrolled_at,
            active: true,
            inactive_since: None,
            payment_exempt: new.payment_exempt,
        };
        state.members.push(member.clone());
        Ok(member)
    }

    async fn update_member(&self, id: Uuid, update: &MemberUpdate) -> Result<Member> {
        let mut state = self.inner.lock().unwrap();
        if let Some(email) = &update.email {
            if state.members.iter().any(|m| m.email == *email && m.id != id) {
                return Err(Error::DuplicateEmail(email.clone()));
            }
        }
        if let Some(Some(group_id)) = update.group {
            if !state.groups.iter().any(|g| g.id == group_id) {
                return Err(Error::GroupNotFound(group_id.to_string()));
            }
        }
        let member = state
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::MemberNotFound(id.to_string()))?;
        if let Some(given) = &update.given_name {
            member.given_name = given.clone();
        }
        if let Some(family) = &update.family_name {
            member.family_name = family.clone();
        }
        if let Some(email) = &update.email {
            member.email = email.clone();
        }
        if let Some(role) = update.role {
            member.role = role;
        }
        if let Some(group) = update.group {
            member.group_id = group;
        }
        Ok(member.clone())
    }

    async fn delete_member(&self, id: Uuid) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        let position = state
            .members
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| Error::MemberNotFound(id.to_string()))?;
        state.members.remove(position);
        state.records.retain(|r| r.member_id != id);
        state.payments.retain(|p| p.member_id != id);
        Ok(())
    }

    async fn set_member_active(&self, id: Uuid, active: bool, today: NaiveDate) -> Result<Member> {
        let mut state = self.inner.lock().unwrap();
        let member = state
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::MemberNotFound(id.to_string()))?;
        member.active = active;
        if active {
            member.inactive_since = None;
        } else if member.inactive_since.is_none() {
            member.inactive_since = Some(today);
        }
        Ok(member.clone())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn session_day(&self, group_id: Uuid, date: NaiveDate) -> Result<Option<SessionDay>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .sessions
            .iter()
            .find(|s| s.group_id == group_id && s.session_date == date)
            .cloned())
    }

    async fn session_day_by_id(&self, id: Uuid) -> Result<Option<SessionDay>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .sessions
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn session_days(&self, group_id: Option<Uuid>) -> Result<Vec<SessionDay>> {
        let mut sessions: Vec<SessionDay> = self
            .inner
            .lock()
            .unwrap()
            .sessions
            .iter()
            .filter(|s| group_id.map(|g| s.group_id == g).unwrap_or(true))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.session_date.cmp(&a.session_date));
        Ok(sessions)
    }

    async fn session_days_between(
        &self,
        group_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SessionDay>> {
        let mut sessions: Vec<SessionDay> = self
            .inner
            .lock()
            .unwrap()
            .sessions
            .iter()
            .filter(|s| s.group_id == group_id && s.session_date >= from && s.session_date <= to)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.session_date);
        Ok(sessions)
    }

    async fn activate(&self, group_id: Uuid, date: NaiveDate) -> Result<SessionDay> {
        let mut state = self.inner.lock().unwrap();
        if !state.groups.iter().any(|g| g.id == group_id) {
            return Err(Error::GroupNotFound(group_id.to_string()));
        }
        if let Some(session) = state
            .sessions
            .iter_mut()
            .find(|s| s.group_id == group_id && s.session_date == date)
        {
            session.active = true;
            return Ok(session.clone());
        }
        let session = SessionDay {
            id: Uuid::new_v4(),
            group_id,
            session_date: date,
            active: true,
        };
        state.sessions.push(session.clone());
        Ok(session)
    }

    async fn deactivate(&self, group_id: Uuid, date: NaiveDate) -> Result<Option<SessionDay>> {
        let mut state = self.inner.lock().unwrap();
        if let Some(session) = state
            .sessions
            .iter_mut()
            .find(|s| s.group_id == group_id && s.session_date == date)
        {
            session.active = false;
            return Ok(Some(session.clone()));
        }
        Ok(None)
    }

    async fn delete_session_day(&self, id: Uuid) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        let position = state
            .sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| Error::SessionDayNotFound(id.to_string()))?;
        state.sessions.remove(position);
        Ok(())
    }

    async fn is_session_active(&self, group_id: Uuid, date: NaiveDate) -> Result<bool> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .sessions
            .iter()
            .any(|s| s.group_id == group_id && s.session_date == date && s.active))
    }

    async fn active_days(
        &self,
        group_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let mut days: Vec<NaiveDate> = self
            .inner
            .lock()
            .unwrap()
            .sessions
            .iter()
            .filter(|s| {
                s.group_id == group_id
                    && s.active
                    && s.session_date >= from
                    && s.session_date <= to
            })
            .map(|s| s.session_date)
            .collect();
        days.sort();
        Ok(days)
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn record(&self, member_id: Uuid, date: NaiveDate) -> Result<Option<AttendanceRecord>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .records
            .iter()
            .find(|r| r.member_id == member_id && r.session_date == date)
            .cloned())
    }

    async fn records_between(
        &self,
        member_ids: &[Uuid],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>> {
        let mut records: Vec<AttendanceRecord> = self
            .inner
            .lock()
            .unwrap()
            .records
            .iter()
            .filter(|r| {
                member_ids.contains(&r.member_id)
                    && r.session_date >= from
                    && r.session_date <= to
            })
            .cloned()
            .collect();
        records.sort_by_key(|r| (r.session_date, r.member_id));
        Ok(records)
    }

    async fn records_for_member(&self, member_id: Uuid) -> Result<Vec<AttendanceRecord>> {
        let mut records: Vec<AttendanceRecord> = self
            .inner
            .lock()
            .unwrap()
            .records
            .iter()
            .filter(|r| r.member_id == member_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.session_date);
        Ok(records)
    }

    async fn mark(
        &self,
        member_id: Uuid,
        date: NaiveDate,
        present: bool,
        note: &str,
    ) -> Result<AttendanceRecord> {
        let mut state = self.inner.lock().unwrap();
        if !state.members.iter().any(|m| m.id == member_id) {
            return Err(Error::MemberNotFound(member_id.to_string()));
        }
        if state
            .records
            .iter()
            .any(|r| r.member_id == member_id && r.session_date == date)
        {
            return Err(Error::DuplicateAttendance {
                member: member_id,
                date,
            });
        }
        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            member_id,
            session_date: date,
            present,
            note: note.to_string(),
        };
        state.records.push(record.clone());
        Ok(record)
    }

    async fn toggle(&self, member_id: Uuid, date: NaiveDate) -> Result<AttendanceRecord> {
        let mut state = self.inner.lock().unwrap();
        let record = state
            .records
            .iter_mut()
            .find(|r| r.member_id == member_id && r.session_date == date)
            .ok_or_else(|| {
                Error::AttendanceNotFound(format!("for member {member_id} on {date}"))
            })?;
        record.present = !record.present;
        Ok(record.clone())
    }

    async fn set_note(
        &self,
        member_id: Uuid,
        date: NaiveDate,
        note: &str,
    ) -> Result<AttendanceRecord> {
        let mut state = self.inner.lock().unwrap();
        let record = state
            .records
            .iter_mut()
            .find(|r| r.member_id == member_id && r.session_date == date)
            .ok_or_else(|| {
                Error::AttendanceNotFound(format!("for member {member_id} on {date}"))
            })?;
        record.note = note.to_string();
        Ok(record.clone())
    }

    async fn unmark(&self, member_id: Uuid, date: NaiveDate) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        let position = state
            .records
            .iter()
            .position(|r| r.member_id == member_id && r.session_date == date)
            .ok_or_else(|| {
                Error::AttendanceNotFound(format!("for member {member_id} on {date}"))
            })?;
        state.records.remove(position);
        Ok(())
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn insert_payment(&self, new: &NewPayment) -> Result<Payment> {
        let mut state = self.inner.lock().unwrap();
        if !state.members.iter().any(|m| m.id == new.member_id) {
            return Err(Error::MemberNotFound(new.member_id.to_string()));
        }
        if state.payments.iter().any(|p| p.reference == new.reference) {
            return Err(Error::DuplicateReference(new.reference.clone()));
        }
        let payment = Payment {
            id: Uuid::new_v4(),
            member_id: new.member_id,
            paid_on: new.paid_on,
            reference: new.reference.clone(),
            bank: new.bank.clone(),
            method: new.method,
            receipt: new.receipt.clone(),
        };
        state.payments.push(payment.clone());
        Ok(payment)
    }

    async fn payment(&self, id: Uuid) -> Result<Option<Payment>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .payments
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn payment_by_reference(&self, reference: &str) -> Result<Option<Payment>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .payments
            .iter()
            .find(|p| p.reference == reference)
            .cloned())
    }

    async fn update_payment(&self, id: Uuid, update: &PaymentUpdate) -> Result<Payment> {
        let mut state = self.inner.lock().unwrap();
        if let Some(reference) = &update.reference {
            if state
                .payments
                .iter()
                .any(|p| p.reference == *reference && p.id != id)
            {
                return Err(Error::DuplicateReference(reference.clone()));
            }
        }
        let payment = state
            .payments
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::PaymentNotFound(id.to_string()))?;
        if let Some(paid_on) = update.paid_on {
            payment.paid_on = paid_on;
        }
        if let Some(reference) = &update.reference {
            payment.reference = reference.clone();
        }
        if let Some(method) = update.method {
            payment.method = method;
        }
        if let Some(bank) = &update.bank {
            payment.bank = bank.clone();
        }
        if let Some(receipt) = &update.receipt {
            payment.receipt = receipt.clone();
        }
        Ok(payment.clone())
    }

    async fn delete_payment(&self, id: Uuid) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        let position = state
            .payments
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Error::PaymentNotFound(id.to_string()))?;
        state.payments.remove(position);
        Ok(())
    }

    async fn payments_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<PaymentRow>> {
        let state = self.inner.lock().unwrap();
        let mut payments: Vec<Payment> = state
            .payments
            .iter()
            .filter(|p| p.paid_on >= from && p.paid_on <= to)
            .cloned()
            .collect();
        payments.sort_by(|a, b| {
            b.paid_on
                .cmp(&a.paid_on)
                .then_with(|| a.reference.cmp(&b.reference))
        });
        Ok(payments
            .into_iter()
            .map(|payment| {
                let member_name = state
                    .members
                    .iter()
                    .find(|m| m.id == payment.member_id)
                    .map(|m| m.full_name())
                    .unwrap_or_default();
                PaymentRow {
                    payment,
                    member_name,
                }
            })
            .collect())
    }

    async fn payments_for_member(&self, member_id: Uuid) -> Result<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .inner
            .lock()
            .unwrap()
            .payments
            .iter()
            .filter(|p| p.member_id == member_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| {
            b.paid_on
                .cmp(&a.paid_on)
                .then_with(|| a.reference.cmp(&b.reference))
        });
        Ok(payments)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::PaymentMethod;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn member_emails_are_unique() {
        let store = MemoryStore::new();
        let new = NewMember {
            given_name: "Ana".into(),
            family_name: "Prueba".into(),
            email: "ana@example.test".into(),
            role: Role::Student,
            group_id: None,
            enrolled_at: Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap(),
            payment_exempt: false,
        };
        store.create_member(&new).await.unwrap();
        let err = store.create_member(&new).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn group_names_are_unique() {
        let store = MemoryStore::new();
        store.create_group("Infantil A", "").await.unwrap();
        let err = store.create_group("Infantil A", "otra").await.unwrap_err();
        assert!(matches!(err, Error::DuplicateGroup(_)));
    }

    #[tokio::test]
    async fn deactivating_stamps_the_date_once() {
        let store = MemoryStore::new();
        let member = store.add_student("Ana", "Prueba", "ana@example.test", None, d(2025, 9, 1));

        let deactivated = store
            .set_member_active(member.id, false, d(2026, 1, 10))
            .await
            .unwrap();
        assert_eq!(deactivated.inactive_since, Some(d(2026, 1, 10)));

        // Repeating later must not move the cutoff forward.
        let repeated = store
            .set_member_active(member.id, false, d(2026, 2, 1))
            .await
            .unwrap();
        assert_eq!(repeated.inactive_since, Some(d(2026, 1, 10)));

        let reactivated = store
            .set_member_active(member.id, true, d(2026, 2, 15))
            .await
            .unwrap();
        assert!(reactivated.active);
        assert_eq!(reactivated.inactive_since, None);
    }

    #[tokio::test]
    async fn session_activation_is_idempotent_and_reversible() {
        let store = MemoryStore::new();
        let group = store.add_group("Infantil A", "");
        let date = d(2026, 1, 13);

        let first = store.activate(group.id, date).await.unwrap();
        let second = store.activate(group.id, date).await.unwrap();
        assert_eq!(first.id, second.id);
        assert!(second.active);

        let off = store.deactivate(group.id, date).await.unwrap().unwrap();
        assert!(!off.active);
        assert_eq!(off.id, first.id);

        // Deactivating a day that was never activated is a quiet no-op.
        assert!(store.deactivate(group.id, d(2026, 1, 20)).await.unwrap().is_none());

        let back = store.activate(group.id, date).await.unwrap();
        assert!(back.active);
        assert_eq!(back.id, first.id);
    }

    #[tokio::test]
    async fn double_marking_a_day_conflicts() {
        let store = MemoryStore::new();
        let member = store.add_student("Ana", "Prueba", "ana@example.test", None, d(2025, 9, 1));
        store.mark(member.id, d(2026, 1, 13), true, "").await.unwrap();
        let err = store
            .mark(member.id, d(2026, 1, 13), false, "")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateAttendance { .. }));
    }

    #[tokio::test]
    async fn toggle_flips_and_missing_records_error() {
        let store = MemoryStore::new();
        let member = store.add_student("Ana", "Prueba", "ana@example.test", None, d(2025, 9, 1));
        store.mark(member.id, d(2026, 1, 13), false, "").await.unwrap();

        let flipped = store.toggle(member.id, d(2026, 1, 13)).await.unwrap();
        assert!(flipped.present);
        let flipped_back = store.toggle(member.id, d(2026, 1, 13)).await.unwrap();
        assert!(!flipped_back.present);

        let err = store.toggle(member.id, d(2026, 1, 14)).await.unwrap_err();
        assert!(matches!(err, Error::AttendanceNotFound(_)));
    }

    #[tokio::test]
    async fn unmark_deletes_exactly_once() {
        let store = MemoryStore::new();
        let member = store.add_student("Ana", "Prueba", "ana@example.test", None, d(2025, 9, 1));
        store.mark(member.id, d(2026, 1, 13), true, "").await.unwrap();

        store.unmark(member.id, d(2026, 1, 13)).await.unwrap();
        assert!(store.record(member.id, d(2026, 1, 13)).await.unwrap().is_none());

        let err = store.unmark(member.id, d(2026, 1, 13)).await.unwrap_err();
        assert!(matches!(err, Error::AttendanceNotFound(_)));
    }

    #[tokio::test]
    async fn marking_an_unknown_member_fails_like_the_database_would() {
        let store = MemoryStore::new();
        let err = store
            .mark(Uuid::new_v4(), d(2026, 1, 13), true, "")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MemberNotFound(_)));
    }

    #[tokio::test]
    async fn update_member_can_move_and_clear_the_group() {
        let store = MemoryStore::new();
        let group = store.add_group("Infantil A", "");
        let member = store.add_student("Ana", "Prueba", "ana@example.test", None, d(2025, 9, 1));

        let moved = store
            .update_member(
                member.id,
                &MemberUpdate {
                    group: Some(Some(group.id)),
                    ..MemberUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.group_id, Some(group.id));

        let cleared = store
            .update_member(
                member.id,
                &MemberUpdate {
                    group: Some(None),
                    ..MemberUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.group_id, None);

        let err = store
            .update_member(
                member.id,
                &MemberUpdate {
                    group: Some(Some(Uuid::new_v4())),
                    ..MemberUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::GroupNotFound(_)));
    }

    #[tokio::test]
    async fn update_member_rejects_taken_emails() {
        let store = MemoryStore::new();
        store.add_student("Ana", "Prueba", "ana@example.test", None, d(2025, 9, 1));
        let other = store.add_student("Luis", "Prueba", "luis@example.test", None, d(2025, 9, 1));

        let err = store
            .update_member(
                other.id,
                &MemberUpdate {
                    email: Some("ana@example.test".into()),
                    ..MemberUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateEmail(_)));

        // Re-submitting your own address is not a conflict.
        let kept = store
            .update_member(
                other.id,
                &MemberUpdate {
                    email: Some("luis@example.test".into()),
                    ..MemberUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(kept.email, "luis@example.test");
    }

    #[tokio::test]
    async fn deleting_a_group_detaches_members_and_drops_sessions() {
        let store = MemoryStore::new();
        let group = store.add_group("Infantil A", "");
        let member = store.add_student(
            "Ana",
            "Prueba",
            "ana@example.test",
            Some(group.id),
            d(2025, 9, 1),
        );
        store.activate(group.id, d(2026, 1, 13)).await.unwrap();

        store.delete_group(group.id).await.unwrap();

        let detached = store.member_by_id(member.id).await.unwrap().unwrap();
        assert_eq!(detached.group_id, None);
        assert!(store.session_days(None).await.unwrap().is_empty());

        let err = store.delete_group(group.id).await.unwrap_err();
        assert!(matches!(err, Error::GroupNotFound(_)));
    }

    #[tokio::test]
    async fn deleting_a_member_takes_their_history_along() {
        let store = MemoryStore::new();
        let member = store.add_student("Ana", "Prueba", "ana@example.test", None, d(2025, 9, 1));
        store.mark(member.id, d(2026, 1, 13), true, "").await.unwrap();
        store
            .insert_payment(&NewPayment {
                member_id: member.id,
                paid_on: d(2026, 1, 5),
                reference: "0051234567".into(),
                bank: None,
                method: PaymentMethod::MobilePayment,
                receipt: None,
            })
            .await
            .unwrap();

        store.delete_member(member.id).await.unwrap();

        assert!(store.record(member.id, d(2026, 1, 13)).await.unwrap().is_none());
        assert!(store.payments_for_member(member.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn session_days_list_newest_first_and_delete_by_id() {
        let store = MemoryStore::new();
        let group = store.add_group("Infantil A", "");
        store.activate(group.id, d(2026, 1, 13)).await.unwrap();
        let later = store.activate(group.id, d(2026, 1, 15)).await.unwrap();

        let days = store.session_days(Some(group.id)).await.unwrap();
        assert_eq!(days[0].session_date, d(2026, 1, 15));
        assert_eq!(days[1].session_date, d(2026, 1, 13));

        store.delete_session_day(later.id).await.unwrap();
        assert_eq!(store.session_days(Some(group.id)).await.unwrap().len(), 1);

        let err = store.delete_session_day(later.id).await.unwrap_err();
        assert!(matches!(err, Error::SessionDayNotFound(_)));
    }

    #[tokio::test]
    async fn payment_updates_respect_reference_uniqueness() {
        let store = MemoryStore::new();
        let member = store.add_student("Ana", "Prueba", "ana@example.test", None, d(2025, 9, 1));
        let first = store
            .insert_payment(&NewPayment {
                member_id: member.id,
                paid_on: d(2026, 1, 5),
                reference: "0051234567".into(),
                bank: Some("0102".into()),
                method: PaymentMethod::MobilePayment,
                receipt: None,
            })
            .await
            .unwrap();
        let second = store
            .insert_payment(&NewPayment {
                member_id: member.id,
                paid_on: d(2026, 2, 4),
                reference: "7798812345".into(),
                bank: None,
                method: PaymentMethod::Cash,
                receipt: None,
            })
            .await
            .unwrap();

        let err = store
            .update_payment(
                second.id,
                &PaymentUpdate {
                    reference: Some(first.reference.clone()),
                    ..PaymentUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateReference(_)));

        let cleared = store
            .update_payment(
                first.id,
                &PaymentUpdate {
                    bank: Some(None),
                    ..PaymentUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.bank, None);

        store.delete_payment(second.id).await.unwrap();
        let err = store.delete_payment(second.id).await.unwrap_err();
        assert!(matches!(err, Error::PaymentNotFound(_)));
    }
}
