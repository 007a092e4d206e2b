use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Club role of a member. Only students appear in attendance views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Coach,
    Assistant,
    Administrator,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Student, Role::Coach, Role::Assistant, Role::Administrator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Coach => "coach",
            Role::Assistant => "assistant",
            Role::Administrator => "administrator",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Student => "Alumnos",
            Role::Coach => "Entrenadores",
            Role::Assistant => "Asistentes",
            Role::Administrator => "Administradores",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "coach" => Ok(Role::Coach),
            "assistant" => Ok(Role::Assistant),
            "administrator" => Ok(Role::Administrator),
            other => Err(format!(
                "unknown role '{other}' (expected student, coach, assistant or administrator)"
            )),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    pub role: Role,
    pub group_id: Option<Uuid>,
    pub enrolled_at: DateTime<Utc>,
    pub active: bool,
    pub inactive_since: Option<NaiveDate>,
    pub payment_exempt: bool,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }
}

/// Creation payload for a member; the id and active flag are assigned by
/// the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMember {
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    pub role: Role,
    pub group_id: Option<Uuid>,
    pub enrolled_at: DateTime<Utc>,
    pub payment_exempt: bool,
}

/// Partial update for a member; `None` fields keep their current value.
/// `group` carries a second `Option` so an update can clear the group
/// assignment as well as change it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberUpdate {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub group: Option<Option<Uuid>>,
}

impl MemberUpdate {
    pub fn is_empty(&self) -> bool {
        self.given_name.is_none()
            && self.family_name.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.group.is_none()
    }
}

/// Whether a group's training session on a given date counts for reports.
/// Absence of a row means the session was never activated.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SessionDay {
    pub id: Uuid,
    pub group_id: Uuid,
    pub session_date: NaiveDate,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub member_id: Uuid,
    pub session_date: NaiveDate,
    pub present: bool,
    pub note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "pago_movil")]
    MobilePayment,
    #[serde(rename = "transferencia")]
    BankTransfer,
    #[serde(rename = "deposito")]
    Deposit,
    #[serde(rename = "efectivo")]
    Cash,
    #[serde(rename = "zelle")]
    Zelle,
    #[serde(rename = "binance")]
    Binance,
    #[serde(rename = "paypal")]
    PayPal,
    #[serde(rename = "otro")]
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::MobilePayment => "pago_movil",
            PaymentMethod::BankTransfer => "transferencia",
            PaymentMethod::Deposit => "deposito",
            PaymentMethod::Cash => "efectivo",
            PaymentMethod::Zelle => "zelle",
            PaymentMethod::Binance => "binance",
            PaymentMethod::PayPal => "paypal",
            PaymentMethod::Other => "otro",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::MobilePayment => "Pago Móvil",
            PaymentMethod::BankTransfer => "Transferencia Bancaria",
            PaymentMethod::Deposit => "Depósito Bancario",
            PaymentMethod::Cash => "Efectivo",
            PaymentMethod::Zelle => "Zelle",
            PaymentMethod::Binance => "Binance",
            PaymentMethod::PayPal => "PayPal",
            PaymentMethod::Other => "Otro",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pago_movil" => Ok(PaymentMethod::MobilePayment),
            "transferencia" => Ok(PaymentMethod::BankTransfer),
            "deposito" => Ok(PaymentMethod::Deposit),
            "efectivo" => Ok(PaymentMethod::Cash),
            "zelle" => Ok(PaymentMethod::Zelle),
            "binance" => Ok(PaymentMethod::Binance),
            "paypal" => Ok(PaymentMethod::PayPal),
            "otro" => Ok(PaymentMethod::Other),
            other => Err(format!("unknown payment method '{other}'")),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monthly club payment. `receipt` is an opaque key into the blob storage
/// collaborator; the contents are never inspected here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub member_id: Uuid,
    pub paid_on: NaiveDate,
    pub reference: String,
    pub bank: Option<String>,
    pub method: PaymentMethod,
    pub receipt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub member_id: Uuid,
    pub paid_on: NaiveDate,
    pub reference: String,
    pub bank: Option<String>,
    pub method: PaymentMethod,
    pub receipt: Option<String>,
}

/// Partial update for a payment. The nullable columns carry a second
/// `Option` to tell "keep the current value" apart from "clear it".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentUpdate {
    pub paid_on: Option<NaiveDate>,
    pub reference: Option<String>,
    pub bank: Option<Option<String>>,
    pub method: Option<PaymentMethod>,
    pub receipt: Option<Option<String>>,
}

impl PaymentUpdate {
    pub fn is_empty(&self) -> bool {
        self.paid_on.is_none()
            && self.reference.is_none()
            && self.bank.is_none()
            && self.method.is_none()
            && self.receipt.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentRow {
    pub payment: Payment,
    pub member_name: String,
}

/// One roster line of a daily attendance view. `record` stays `None` when
/// no mark was ever made for the member on that date, which is distinct
/// from an explicit absent mark.
#[derive(Debug, Clone, Serialize)]
pub struct DailyRow {
    pub member: Member,
    pub record: Option<AttendanceRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyView {
    pub group: Group,
    pub date: NaiveDate,
    pub session_active: bool,
    pub rows: Vec<DailyRow>,
}

/// State of one member/day cell in a weekly matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayCell {
    Present,
    Absent,
    /// No record exists for an otherwise eligible member.
    Unmarked,
    /// The member was not eligible on that date (enrolled later, or past
    /// their inactive-since day); excluded from totals.
    NotEligible,
}

impl DayCell {
    /// Cell text used by the report renderer. An unmarked day reads as an
    /// absence, matching the downloadable reports the club always got.
    pub fn label(&self) -> &'static str {
        match self {
            DayCell::Present => "Presente",
            DayCell::Absent | DayCell::Unmarked => "Ausente",
            DayCell::NotEligible => "N/A",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyRow {
    pub member: Member,
    /// Aligned with `WeeklyMatrix::dates`.
    pub cells: Vec<DayCell>,
    /// Days in the active set carrying a record, whatever its flag.
    pub total_sessions: u32,
    /// Days in the active set recorded with present = true.
    pub total_present: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyMatrix {
    pub group: Group,
    pub year: i32,
    pub week: u32,
    /// Activated session dates of the week, ascending. A week with no
    /// activated days is a valid, zero-column matrix.
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<WeeklyRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberSummary {
    pub member: Member,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub total_sessions: u32,
    pub total_present: u32,
}
