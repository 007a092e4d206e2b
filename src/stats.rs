//! Counters behind the portal landing page: membership by role, session
//! activity across the current week, payments this month.

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar;
use crate::error::Result;
use crate::models::Role;
use crate::store::{PaymentStore, RosterStore, SessionStore};

pub const WEEKDAY_LABELS: [&str; 7] = ["Lun", "Mar", "Mié", "Jue", "Vie", "Sáb", "Dom"];

#[derive(Debug, Clone, Serialize)]
pub struct RoleCount {
    pub role: Role,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySessions {
    pub label: &'static str,
    pub date: NaiveDate,
    /// Activated sessions on that date across all groups.
    pub active_sessions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub year: i32,
    pub week: u32,
    pub members_by_role: Vec<RoleCount>,
    pub active_students: usize,
    pub sessions_per_day: Vec<DaySessions>,
    pub payments_this_month: usize,
}

pub async fn dashboard<S>(store: &S, today: NaiveDate) -> Result<Dashboard>
where
    S: RosterStore + SessionStore + PaymentStore,
{
    let members = store.members(None).await?;
    let members_by_role = Role::ALL
        .iter()
        .map(|&role| RoleCount {
            role,
            label: role.label(),
            count: members.iter().filter(|m| m.role == role).count(),
        })
        .collect();
    let active_students = members
        .iter()
        .filter(|m| m.role == Role::Student && m.active)
        .count();

    let (year, week) = calendar::week_of(today);
    let week_days = calendar::week_dates(year, week)?;

    let mut counts = [0usize; 7];
    for group in store.groups().await? {
        for date in store.active_days(group.id, week_days[0], week_days[6]).await? {
            counts[calendar::weekday_index(date)] += 1;
        }
    }
    let sessions_per_day = (0..7)
        .map(|idx| DaySessions {
            label: WEEKDAY_LABELS[idx],
            date: week_days[idx],
            active_sessions: counts[idx],
        })
        .collect();

    let (month_start, month_end) = calendar::month_span(today);
    let payments_this_month = store.payments_between(month_start, month_end).await?.len();

    Ok(Dashboard {
        year,
        week,
        members_by_role,
        active_students,
        sessions_per_day,
        payments_this_month,
    })
}
