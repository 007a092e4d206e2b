//! Builds the attendance views: one group's sheet for a single day, the
//! weekly matrix over activated session days, and whole-history summaries.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::calendar;
use crate::eligibility::{eligible_on, is_eligible};
use crate::error::{Error, Result};
use crate::models::{
    AttendanceRecord, DailyRow, DailyView, DayCell, Group, Member, MemberSummary, Role,
    WeeklyMatrix, WeeklyRow,
};
use crate::store::{AttendanceStore, RosterStore, SessionStore};

async fn load_group(store: &impl RosterStore, group_id: Uuid) -> Result<Group> {
    store
        .group_by_id(group_id)
        .await?
        .ok_or_else(|| Error::GroupNotFound(group_id.to_string()))
}

/// One group's attendance sheet for `date`: every eligible member with
/// whatever record exists for them. Used both for marking attendance and
/// for the daily report.
pub async fn daily_view<S>(store: &S, group_id: Uuid, date: NaiveDate) -> Result<DailyView>
where
    S: RosterStore + SessionStore + AttendanceStore,
{
    let group = load_group(store, group_id).await?;
    let eligible = eligible_on(&store.members_of_group(group.id).await?, date);

    let session_active = store.is_session_active(group.id, date).await?;

    let ids: Vec<Uuid> = eligible.iter().map(|member| member.id).collect();
    let records = store.records_between(&ids, date, date).await?;
    let mut by_member: HashMap<Uuid, AttendanceRecord> = records
        .into_iter()
        .map(|record| (record.member_id, record))
        .collect();

    let rows = eligible
        .into_iter()
        .map(|member| {
            let record = by_member.remove(&member.id);
            DailyRow { member, record }
        })
        .collect();

    Ok(DailyView {
        group,
        date,
        session_active,
        rows,
    })
}

/// Same as [`daily_view`], but refuses dates whose session was never
/// activated. Reports only cover days that actually counted.
pub async fn daily_report_view<S>(store: &S, group_id: Uuid, date: NaiveDate) -> Result<DailyView>
where
    S: RosterStore + SessionStore + AttendanceStore,
{
    let view = daily_view(store, group_id, date).await?;
    if !view.session_active {
        return Err(Error::SessionInactive {
            group: view.group.name.clone(),
            date,
        });
    }
    Ok(view)
}

/// The weekly matrix for a group: one column per activated session day of
/// the ISO week, one row per student.
///
/// Eligibility is decided cell by cell, so a student who joined or left
/// mid-week shows N/A on the days outside their span and those days stay
/// out of their totals. Records on non-activated days are ignored.
pub async fn weekly_matrix<S>(
    store: &S,
    group_id: Uuid,
    year: i32,
    week: u32,
) -> Result<WeeklyMatrix>
where
    S: RosterStore + SessionStore + AttendanceStore,
{
    let group = load_group(store, group_id).await?;
    let week_days = calendar::week_dates(year, week)?;
    let (monday, sunday) = (week_days[0], week_days[6]);

    let dates = store.active_days(group.id, monday, sunday).await?;
    debug!(group = %group.name, week, active_days = dates.len(), "building weekly matrix");

    let students: Vec<Member> = store
        .members_of_group(group.id)
        .await?
        .into_iter()
        .filter(|member| member.role == Role::Student)
        .collect();

    let ids: Vec<Uuid> = students.iter().map(|member| member.id).collect();
    let records = store.records_between(&ids, monday, sunday).await?;
    let by_member_day: HashMap<(Uuid, NaiveDate), AttendanceRecord> = records
        .into_iter()
        .map(|record| ((record.member_id, record.session_date), record))
        .collect();

    let rows = students
        .into_iter()
        .map(|member| {
            let mut total_sessions = 0;
            let mut total_present = 0;
            let cells: Vec<DayCell> = dates
                .iter()
                .map(|&date| {
                    if !is_eligible(&member, date) {
                        return DayCell::NotEligible;
                    }
                    match by_member_day.get(&(member.id, date)) {
                        Some(record) if record.present => {
                            total_sessions += 1;
                            total_present += 1;
                            DayCell::Present
                        }
                        Some(_) => {
                            total_sessions += 1;
                            DayCell::Absent
                        }
                        None => DayCell::Unmarked,
                    }
                })
                .collect();
            WeeklyRow {
                member,
                cells,
                total_sessions,
                total_present,
            }
        })
        .collect();

    Ok(WeeklyMatrix {
        group,
        year,
        week,
        dates,
        rows,
    })
}

/// Whole-history totals per student of a group. Every stored record
/// counts here, whichever session day it fell on.
pub async fn member_summaries<S>(store: &S, group_id: Uuid) -> Result<(Group, Vec<MemberSummary>)>
where
    S: RosterStore + AttendanceStore,
{
    let group = load_group(store, group_id).await?;
    let students: Vec<Member> = store
        .members_of_group(group.id)
        .await?
        .into_iter()
        .filter(|member| member.role == Role::Student)
        .collect();

    let mut summaries = Vec::with_capacity(students.len());
    for member in students {
        let records = store.records_for_member(member.id).await?;
        let total_sessions = records.len() as u32;
        let total_present = records.iter().filter(|record| record.present).count() as u32;
        summaries.push(MemberSummary {
            first_date: records.first().map(|record| record.session_date),
            last_date: records.last().map(|record| record.session_date),
            member,
            total_sessions,
            total_present,
        });
    }

    Ok((group, summaries))
}
