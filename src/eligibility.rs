//! The rule deciding which members belong on an attendance sheet for a
//! given date.

use chrono::NaiveDate;

use crate::models::{Member, Role};

/// True when `member` should appear on the attendance sheet dated `date`.
///
/// Three conditions, all required: the member is a student, was already
/// enrolled on `date`, and had not yet gone inactive. The inactive-since
/// day itself still counts; the member drops off the sheet the day after.
pub fn is_eligible(member: &Member, date: NaiveDate) -> bool {
    if member.role != Role::Student {
        return false;
    }
    if member.enrolled_at.date_naive() > date {
        return false;
    }
    match member.inactive_since {
        Some(since) => date <= since,
        None => true,
    }
}

pub fn eligible_on(members: &[Member], date: NaiveDate) -> Vec<Member> {
    members
        .iter()
        .filter(|m| is_eligible(m, date))
        .cloned()
        .collect()
}
