use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing::debug;
use uuid::Uuid;

use club_gestion::db::{self, PgStore};
use club_gestion::models::{
    DayCell, Group, Member, MemberUpdate, NewMember, NewPayment, PaymentMethod, PaymentUpdate, Role,
};
use club_gestion::report::{self, ReportArtifact, ReportFormat};
use club_gestion::store::{AttendanceStore, PaymentStore, RosterStore, SessionStore};
use club_gestion::{attendance, calendar, payments, stats, Error};

#[derive(Parser)]
#[command(name = "club-gestion")]
#[command(about = "Membership, attendance and payment tracking for an athletics club", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a small demo roster
    Seed,
    /// List training groups
    Groups,
    /// Create a training group
    AddGroup {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Rename a group or replace its description
    UpdateGroup {
        /// Group name or id
        group: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a group; its members stay registered without an assignment
    RemoveGroup {
        /// Group name or id
        group: String,
    },
    /// List members, optionally narrowed to one role
    Members {
        #[arg(long)]
        role: Option<Role>,
        /// Group name or id
        #[arg(long)]
        group: Option<String>,
    },
    /// Register a member
    AddMember {
        #[arg(long)]
        given_name: String,
        #[arg(long)]
        family_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "student")]
        role: Role,
        /// Group name or id
        #[arg(long)]
        group: Option<String>,
        /// Enrollment date; defaults to today
        #[arg(long)]
        enrolled: Option<NaiveDate>,
        #[arg(long)]
        payment_exempt: bool,
    },
    /// Activate or deactivate a member
    SetMemberActive {
        #[arg(long)]
        email: String,
        #[arg(long, action = clap::ArgAction::Set)]
        active: bool,
    },
    /// Change a member's details or group assignment
    UpdateMember {
        /// Current email of the member
        #[arg(long)]
        email: String,
        #[arg(long)]
        given_name: Option<String>,
        #[arg(long)]
        family_name: Option<String>,
        #[arg(long)]
        new_email: Option<String>,
        #[arg(long)]
        role: Option<Role>,
        /// Group name or id
        #[arg(long)]
        group: Option<String>,
        /// Clear the group assignment
        #[arg(long, conflicts_with = "group")]
        no_group: bool,
    },
    /// Delete a member together with their attendance and payment history
    RemoveMember {
        #[arg(long)]
        email: String,
    },
    /// Activate a group's session for a date so it counts in reports
    Activate {
        /// Group name or id
        group: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Deactivate a group's session for a date
    Deactivate {
        /// Group name or id
        group: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List recorded session days, newest first
    Sessions {
        /// Group name or id; all groups when omitted
        group: Option<String>,
    },
    /// Delete a session row by id, as shown by `sessions`
    RemoveSession { id: Uuid },
    /// Show one group's attendance sheet for a day
    Daily {
        /// Group name or id
        group: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
    /// Show one group's weekly attendance matrix
    Weekly {
        /// Group name or id
        group: String,
        /// ISO week-year; defaults to the current week's
        #[arg(long)]
        year: Option<i32>,
        /// ISO week number; defaults to the current week
        #[arg(long)]
        week: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// List the weeks of the current year up to this one
    Weeks {
        #[arg(long)]
        json: bool,
    },
    /// Whole-history attendance totals for a group
    Summary {
        /// Group name or id
        group: String,
        #[arg(long)]
        json: bool,
    },
    /// Record attendance for a member on a date
    Mark {
        #[arg(long)]
        email: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Record an absence instead of a presence
        #[arg(long)]
        absent: bool,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Flip an existing attendance record between present and absent
    Toggle {
        #[arg(long)]
        email: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Replace the note on an existing attendance record
    Note {
        #[arg(long)]
        email: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        note: String,
    },
    /// Delete an attendance record
    Unmark {
        #[arg(long)]
        email: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Register a monthly payment
    AddPayment {
        #[arg(long)]
        email: String,
        #[arg(long)]
        reference: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Issuing bank code, e.g. 0134
        #[arg(long)]
        bank: Option<String>,
        #[arg(long, default_value = "pago_movil")]
        method: PaymentMethod,
        /// Storage key of the uploaded proof
        #[arg(long)]
        receipt: Option<String>,
    },
    /// Correct a registered payment
    UpdatePayment {
        /// Current reference number
        #[arg(long)]
        reference: String,
        #[arg(long)]
        new_reference: Option<String>,
        /// New payment date
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Issuing bank code, e.g. 0134
        #[arg(long)]
        bank: Option<String>,
        /// Clear the issuing bank
        #[arg(long, conflicts_with = "bank")]
        no_bank: bool,
        #[arg(long)]
        method: Option<PaymentMethod>,
        /// Storage key of the uploaded proof
        #[arg(long)]
        receipt: Option<String>,
        /// Clear the receipt key
        #[arg(long, conflicts_with = "receipt")]
        no_receipt: bool,
    },
    /// Delete a registered payment
    RemovePayment {
        #[arg(long)]
        reference: String,
    },
    /// List payments for a calendar month
    Payments {
        /// Defaults to the current year
        #[arg(long)]
        year: Option<i32>,
        /// Defaults to the current month
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// Membership and activity counters for the portal landing page
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Write a report artifact to disk
    Export {
        #[command(subcommand)]
        target: ExportCommands,
    },
}

#[derive(Subcommand)]
enum ExportCommands {
    /// One group's sheet for a single activated day
    Daily {
        /// Group name or id
        group: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "csv")]
        format: ReportFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Weekly matrix over activated session days
    Weekly {
        /// Group name or id
        group: String,
        /// ISO week-year; defaults to the current week's
        #[arg(long)]
        year: Option<i32>,
        /// ISO week number; defaults to the current week
        #[arg(long)]
        week: Option<u32>,
        #[arg(long, default_value = "csv")]
        format: ReportFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Whole-history totals per student
    Summary {
        /// Group name or id
        group: String,
        #[arg(long, default_value = "csv")]
        format: ReportFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Payments registered in a calendar month
    Payments {
        /// Defaults to the current year
        #[arg(long)]
        year: Option<i32>,
        /// Defaults to the current month
        #[arg(long)]
        month: Option<u32>,
        #[arg(long, default_value = "csv")]
        format: ReportFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn resolve_group(store: &PgStore, reference: &str) -> anyhow::Result<Group> {
    if let Ok(id) = reference.parse::<Uuid>() {
        if let Some(group) = store.group_by_id(id).await? {
            return Ok(group);
        }
    }
    let group = store
        .group_by_name(reference)
        .await?
        .ok_or_else(|| Error::GroupNotFound(reference.to_string()))?;
    Ok(group)
}

async fn resolve_member(store: &PgStore, email: &str) -> anyhow::Result<Member> {
    let member = store
        .member_by_email(email)
        .await?
        .ok_or_else(|| Error::MemberNotFound(email.to_string()))?;
    Ok(member)
}

fn resolve_week(year: Option<i32>, week: Option<u32>) -> (i32, u32) {
    let (current_year, current_week) = calendar::week_of(today());
    (year.unwrap_or(current_year), week.unwrap_or(current_week))
}

fn resolve_month(year: Option<i32>, month: Option<u32>) -> (i32, u32) {
    use chrono::Datelike;
    let now = today();
    (year.unwrap_or(now.year()), month.unwrap_or(now.month()))
}

fn write_artifact(artifact: ReportArtifact, out: Option<PathBuf>) -> anyhow::Result<()> {
    let path = out.unwrap_or_else(|| PathBuf::from(&artifact.file_name));
    std::fs::write(&path, &artifact.bytes)?;
    println!("Report written to {}.", path.display());
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;
    debug!("database connection established");

    let store = PgStore::new(pool);

    match cli.command {
        Commands::InitDb => {
            db::init_db(store.pool()).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(store.pool()).await?;
            println!("Seed data inserted.");
            println!("Try: club-gestion weekly \"Infantil A\" --year 2026 --week 3");
        }
        Commands::Groups => {
            let groups = store.groups().await?;
            if groups.is_empty() {
                println!("No groups yet.");
                return Ok(());
            }
            for group in groups {
                if group.description.is_empty() {
                    println!("- {} ({})", group.name, group.id);
                } else {
                    println!("- {} ({}): {}", group.name, group.id, group.description);
                }
            }
        }
        Commands::AddGroup { name, description } => {
            let group = store.create_group(&name, &description).await?;
            println!("Group {} created ({}).", group.name, group.id);
        }
        Commands::UpdateGroup {
            group,
            name,
            description,
        } => {
            let group = resolve_group(&store, &group).await?;
            let updated = store
                .update_group(group.id, name.as_deref(), description.as_deref())
                .await?;
            println!("Group {} updated.", updated.name);
        }
        Commands::RemoveGroup { group } => {
            let group = resolve_group(&store, &group).await?;
            store.delete_group(group.id).await?;
            println!(
                "Group {} removed; its members are now unassigned.",
                group.name
            );
        }
        Commands::Members { role, group } => {
            let members = match group {
                Some(reference) => {
                    let group = resolve_group(&store, &reference).await?;
                    let mut members = store.members_of_group(group.id).await?;
                    if let Some(role) = role {
                        members.retain(|m| m.role == role);
                    }
                    members
                }
                None => store.members(role).await?,
            };
            if members.is_empty() {
                println!("No members found.");
                return Ok(());
            }
            for member in members {
                let mut line = format!("- {} <{}> {}", member.full_name(), member.email, member.role);
                if let Some(since) = member.inactive_since {
                    line.push_str(&format!(" (inactive since {since})"));
                }
                println!("{line}");
            }
        }
        Commands::AddMember {
            given_name,
            family_name,
            email,
            role,
            group,
            enrolled,
            payment_exempt,
        } => {
            let group_id = match group {
                Some(reference) => Some(resolve_group(&store, &reference).await?.id),
                None => None,
            };
            let enrolled_at = match enrolled {
                Some(date) => {
                    let at_nine = date.and_hms_opt(9, 0, 0).context("invalid time of day")?;
                    Utc.from_utc_datetime(&at_nine)
                }
                None => Utc::now(),
            };
            let member = store
                .create_member(&NewMember {
                    given_name,
                    family_name,
                    email,
                    role,
                    group_id,
                    enrolled_at,
                    payment_exempt,
                })
                .await?;
            println!("Member {} registered ({}).", member.full_name(), member.id);
        }
        Commands::SetMemberActive { email, active } => {
            let member = resolve_member(&store, &email).await?;
            let updated = store.set_member_active(member.id, active, today()).await?;
            if updated.active {
                println!("{} is active again.", updated.full_name());
            } else if let Some(since) = updated.inactive_since {
                println!("{} marked inactive since {since}.", updated.full_name());
            }
        }
        Commands::UpdateMember {
            email,
            given_name,
            family_name,
            new_email,
            role,
            group,
            no_group,
        } => {
            let member = resolve_member(&store, &email).await?;
            let group = if no_group {
                Some(None)
            } else {
                match group {
                    Some(reference) => Some(Some(resolve_group(&store, &reference).await?.id)),
                    None => None,
                }
            };
            let updated = store
                .update_member(
                    member.id,
                    &MemberUpdate {
                        given_name,
                        family_name,
                        email: new_email,
                        role,
                        group,
                    },
                )
                .await?;
            println!("Member {} updated.", updated.full_name());
        }
        Commands::RemoveMember { email } => {
            let member = resolve_member(&store, &email).await?;
            store.delete_member(member.id).await?;
            println!(
                "Member {} removed together with their attendance and payment history.",
                member.full_name()
            );
        }
        Commands::Activate { group, date } => {
            let group = resolve_group(&store, &group).await?;
            let date = date.unwrap_or_else(today);
            let session = store.activate(group.id, date).await?;
            println!("Session for {} on {} is active.", group.name, session.session_date);
        }
        Commands::Deactivate { group, date } => {
            let group = resolve_group(&store, &group).await?;
            let date = date.unwrap_or_else(today);
            match store.deactivate(group.id, date).await? {
                Some(session) => println!(
                    "Session for {} on {} is inactive.",
                    group.name, session.session_date
                ),
                None => println!("No session existed for {} on {date}.", group.name),
            }
        }
        Commands::Sessions { group } => {
            let filter = match group {
                Some(reference) => Some(resolve_group(&store, &reference).await?.id),
                None => None,
            };
            let days = store.session_days(filter).await?;
            if days.is_empty() {
                println!("No session days recorded.");
                return Ok(());
            }
            let names: HashMap<Uuid, String> = store
                .groups()
                .await?
                .into_iter()
                .map(|g| (g.id, g.name))
                .collect();
            for day in days {
                let name = names
                    .get(&day.group_id)
                    .cloned()
                    .unwrap_or_else(|| day.group_id.to_string());
                println!(
                    "- {} {} {} ({})",
                    day.session_date,
                    name,
                    if day.active { "active" } else { "inactive" },
                    day.id
                );
            }
        }
        Commands::RemoveSession { id } => {
            let day = store
                .session_day_by_id(id)
                .await?
                .ok_or_else(|| Error::SessionDayNotFound(id.to_string()))?;
            store.delete_session_day(day.id).await?;
            let name = store
                .group_by_id(day.group_id)
                .await?
                .map(|g| g.name)
                .unwrap_or_else(|| day.group_id.to_string());
            println!("Session row for {} on {} removed.", name, day.session_date);
        }
        Commands::Daily { group, date, json } => {
            let group = resolve_group(&store, &group).await?;
            let date = date.unwrap_or_else(today);
            let view = attendance::daily_view(&store, group.id, date).await?;
            if json {
                return print_json(&view);
            }
            println!(
                "Attendance for {} on {} (session {}):",
                view.group.name,
                view.date,
                if view.session_active { "active" } else { "inactive" }
            );
            if view.rows.is_empty() {
                println!("No eligible students on this date.");
                return Ok(());
            }
            for row in &view.rows {
                match &row.record {
                    Some(record) if record.present => {
                        println!("- {}: Presente", row.member.full_name());
                    }
                    Some(record) if record.note.is_empty() => {
                        println!("- {}: Ausente", row.member.full_name());
                    }
                    Some(record) => {
                        println!("- {}: Ausente ({})", row.member.full_name(), record.note);
                    }
                    None => println!("- {}: sin marcar", row.member.full_name()),
                }
            }
        }
        Commands::Weekly { group, year, week, json } => {
            let group = resolve_group(&store, &group).await?;
            let (year, week) = resolve_week(year, week);
            let matrix = attendance::weekly_matrix(&store, group.id, year, week).await?;
            if json {
                return print_json(&matrix);
            }
            println!(
                "Week {week} of {year} for {}: {} active session days",
                matrix.group.name,
                matrix.dates.len()
            );
            if matrix.dates.is_empty() {
                println!("No activated sessions this week.");
                return Ok(());
            }
            let header: Vec<String> = matrix
                .dates
                .iter()
                .map(|d| d.format("%d-%m").to_string())
                .collect();
            println!("  days: {}", header.join("  "));
            for row in &matrix.rows {
                let cells: Vec<&str> = row
                    .cells
                    .iter()
                    .map(|cell| match cell {
                        DayCell::Present => "P",
                        DayCell::Absent => "A",
                        DayCell::Unmarked => "-",
                        DayCell::NotEligible => "N/A",
                    })
                    .collect();
                println!(
                    "- {}: {} | {}/{} present",
                    row.member.full_name(),
                    cells.join(" "),
                    row.total_present,
                    row.total_sessions
                );
            }
        }
        Commands::Weeks { json } => {
            let spans = calendar::week_index(today())?;
            if json {
                return print_json(&spans);
            }
            for span in spans {
                println!(
                    "Week {}: {} to {}",
                    span.week,
                    span.start.format("%d/%m/%Y"),
                    span.end.format("%d/%m/%Y")
                );
            }
        }
        Commands::Summary { group, json } => {
            let group = resolve_group(&store, &group).await?;
            let (group, summaries) = attendance::member_summaries(&store, group.id).await?;
            if json {
                return print_json(&serde_json::json!({
                    "group": group,
                    "members": summaries,
                }));
            }
            println!("Attendance history for {}:", group.name);
            if summaries.is_empty() {
                println!("No students in this group.");
                return Ok(());
            }
            for summary in &summaries {
                match (summary.first_date, summary.last_date) {
                    (Some(first), Some(last)) => println!(
                        "- {}: {}/{} present ({first} to {last})",
                        summary.member.full_name(),
                        summary.total_present,
                        summary.total_sessions
                    ),
                    _ => println!("- {}: no records", summary.member.full_name()),
                }
            }
        }
        Commands::Mark {
            email,
            date,
            absent,
            note,
        } => {
            let member = resolve_member(&store, &email).await?;
            let date = date.unwrap_or_else(today);
            let record = store.mark(member.id, date, !absent, &note).await?;
            println!(
                "{} marked {} on {}.",
                member.full_name(),
                if record.present { "present" } else { "absent" },
                record.session_date
            );
        }
        Commands::Toggle { email, date } => {
            let member = resolve_member(&store, &email).await?;
            let date = date.unwrap_or_else(today);
            let record = store.toggle(member.id, date).await?;
            println!(
                "{} is now {} on {}.",
                member.full_name(),
                if record.present { "present" } else { "absent" },
                record.session_date
            );
        }
        Commands::Note { email, date, note } => {
            let member = resolve_member(&store, &email).await?;
            let date = date.unwrap_or_else(today);
            store.set_note(member.id, date, &note).await?;
            println!("Note saved for {} on {date}.", member.full_name());
        }
        Commands::Unmark { email, date } => {
            let member = resolve_member(&store, &email).await?;
            let date = date.unwrap_or_else(today);
            store.unmark(member.id, date).await?;
            println!("Record removed for {} on {date}.", member.full_name());
        }
        Commands::AddPayment {
            email,
            reference,
            date,
            bank,
            method,
            receipt,
        } => {
            let member = resolve_member(&store, &email).await?;
            let payment = payments::record_payment(
                &store,
                NewPayment {
                    member_id: member.id,
                    paid_on: date.unwrap_or_else(today),
                    reference,
                    bank,
                    method,
                    receipt,
                },
            )
            .await?;
            println!(
                "Payment {} recorded for {} on {}.",
                payment.reference,
                member.full_name(),
                payment.paid_on
            );
        }
        Commands::UpdatePayment {
            reference,
            new_reference,
            date,
            bank,
            no_bank,
            method,
            receipt,
            no_receipt,
        } => {
            let payment = store
                .payment_by_reference(&reference)
                .await?
                .ok_or_else(|| Error::PaymentNotFound(format!("with reference '{reference}'")))?;
            let bank = if no_bank { Some(None) } else { bank.map(Some) };
            let receipt = if no_receipt {
                Some(None)
            } else {
                receipt.map(Some)
            };
            let updated = payments::amend_payment(
                &store,
                payment.id,
                PaymentUpdate {
                    paid_on: date,
                    reference: new_reference,
                    bank,
                    method,
                    receipt,
                },
            )
            .await?;
            println!("Payment {} updated.", updated.reference);
        }
        Commands::RemovePayment { reference } => {
            let payment = store
                .payment_by_reference(&reference)
                .await?
                .ok_or_else(|| Error::PaymentNotFound(format!("with reference '{reference}'")))?;
            store.delete_payment(payment.id).await?;
            println!("Payment {} removed.", payment.reference);
        }
        Commands::Payments { year, month, json } => {
            let (year, month) = resolve_month(year, month);
            let rows = payments::payments_for_month(&store, year, month).await?;
            if json {
                return print_json(&rows);
            }
            if rows.is_empty() {
                println!("No payments in {year}-{month:02}.");
                return Ok(());
            }
            println!("Payments in {year}-{month:02}:");
            for row in &rows {
                let bank = row
                    .payment
                    .bank
                    .as_deref()
                    .and_then(payments::bank_label)
                    .map(|label| format!(", {label}"))
                    .unwrap_or_default();
                println!(
                    "- {} {}: ref {} ({}{bank})",
                    row.payment.paid_on,
                    row.member_name,
                    row.payment.reference,
                    row.payment.method.label()
                );
            }
        }
        Commands::Stats { json } => {
            let dashboard = stats::dashboard(&store, today()).await?;
            if json {
                return print_json(&dashboard);
            }
            println!("Members by role:");
            for count in &dashboard.members_by_role {
                println!("- {}: {}", count.label, count.count);
            }
            println!("Active students: {}", dashboard.active_students);
            println!(
                "Sessions in week {} of {}:",
                dashboard.week, dashboard.year
            );
            for day in &dashboard.sessions_per_day {
                println!("- {} {}: {}", day.label, day.date, day.active_sessions);
            }
            println!("Payments this month: {}", dashboard.payments_this_month);
        }
        Commands::Export { target } => match target {
            ExportCommands::Daily {
                group,
                date,
                format,
                out,
            } => {
                let group = resolve_group(&store, &group).await?;
                let date = date.unwrap_or_else(today);
                let view = attendance::daily_report_view(&store, group.id, date).await?;
                let artifact = report::daily_table(&view).render(format)?;
                write_artifact(artifact, out)?;
            }
            ExportCommands::Weekly {
                group,
                year,
                week,
                format,
                out,
            } => {
                let group = resolve_group(&store, &group).await?;
                let (year, week) = resolve_week(year, week);
                let matrix = attendance::weekly_matrix(&store, group.id, year, week).await?;
                let artifact = report::weekly_table(&matrix).render(format)?;
                write_artifact(artifact, out)?;
            }
            ExportCommands::Summary { group, format, out } => {
                let group = resolve_group(&store, &group).await?;
                let (group, summaries) = attendance::member_summaries(&store, group.id).await?;
                let artifact = report::summary_table(&group, &summaries).render(format)?;
                write_artifact(artifact, out)?;
            }
            ExportCommands::Payments {
                year,
                month,
                format,
                out,
            } => {
                let (year, month) = resolve_month(year, month);
                let rows = payments::payments_for_month(&store, year, month).await?;
                let artifact = report::payments_table(year, month, &rows).render(format)?;
                write_artifact(artifact, out)?;
            }
        },
    }

    Ok(())
}
