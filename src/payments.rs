//! Monthly payment registration and the issuing-bank registry.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::calendar;
use crate::error::{Error, Result};
use crate::models::{NewPayment, Payment, PaymentRow, PaymentUpdate};
use crate::store::PaymentStore;

/// Issuing banks accepted on payment proofs, keyed by the national
/// four-digit code.
pub const BANKS: [(&str, &str); 28] = [
    ("0001", "Banco Central de Venezuela"),
    ("0102", "Banco de Venezuela, S.A. Banco Universal"),
    ("0104", "Banco Venezolano de Crédito, S.A. Banco Universal"),
    ("0105", "Banco Mercantil C.A., Banco Universal"),
    ("0108", "Banco Provincial, S.A. Banco Universal"),
    ("0114", "Banco del Caribe C.A., Banco Universal"),
    ("0115", "Banco Exterior C.A., Banco Universal"),
    ("0128", "Banco Caroní C.A., Banco Universal"),
    ("0134", "Banesco Banco Universal, C.A."),
    ("0137", "Banco Sofitasa Banco Universal, C.A."),
    ("0138", "Banco Plaza, Banco Universal"),
    ("0146", "Banco de la Gente Emprendedora C.A."),
    ("0151", "Banco Fondo Común, C.A Banco Universal"),
    ("0156", "100% Banco, Banco Comercial, C.A"),
    ("0157", "DelSur, Banco Universal C.A."),
    ("0163", "Banco del Tesoro C.A., Banco Universal"),
    ("0166", "Banco Agrícola de Venezuela C.A., Banco Universal"),
    ("0168", "Bancrecer S.A., Banco Microfinanciero"),
    ("0169", "Mi Banco, Banco Microfinanciero, C.A."),
    ("0171", "Banco Activo C.A., Banco Universal"),
    ("0172", "Bancamiga Banco Universal, C.A."),
    ("0173", "Banco Internacional de Desarrollo C.A., Banco Universal"),
    ("0174", "Banplus Banco Universal, C.A."),
    ("0175", "Banco Bicentenario del Pueblo, Banco Universal C.A."),
    ("0177", "Banco de la Fuerza Armada Nacional Bolivariana, B.U."),
    ("0178", "N58 Banco Digital, Banco Microfinanciero"),
    ("0191", "Banco Nacional de Crédito C.A., Banco Universal"),
    ("0601", "Instituto Municipal de Crédito Popular"),
];

pub fn bank_name(code: &str) -> Option<&'static str> {
    BANKS.iter().find(|(c, _)| *c == code).map(|(_, name)| *name)
}

/// "0134 - Banesco Banco Universal, C.A." style label, as shown on forms
/// and reports.
pub fn bank_label(code: &str) -> Option<String> {
    bank_name(code).map(|name| format!("{code} - {name}"))
}

const MAX_REFERENCE_LEN: usize = 20;

/// Validates and stores a payment. The reference number is trimmed before
/// any check; uniqueness is enforced by the store itself.
pub async fn record_payment(store: &impl PaymentStore, new: NewPayment) -> Result<Payment> {
    let reference = new.reference.trim().to_string();
    if reference.is_empty() {
        return Err(Error::Validation("payment reference is required".into()));
    }
    if reference.chars().count() > MAX_REFERENCE_LEN {
        return Err(Error::Validation(format!(
            "payment reference is longer than {MAX_REFERENCE_LEN} characters"
        )));
    }
    if let Some(code) = new.bank.as_deref() {
        if bank_name(code).is_none() {
            return Err(Error::UnknownBank(code.to_string()));
        }
    }
    store
        .insert_payment(&NewPayment {
            reference,
            ..new
        })
        .await
}

/// Validates and applies a partial update to a stored payment. Reference
/// and bank checks match [`record_payment`]; `None` fields keep their
/// stored value.
pub async fn amend_payment(
    store: &impl PaymentStore,
    id: Uuid,
    mut update: PaymentUpdate,
) -> Result<Payment> {
    if let Some(reference) = update.reference.take() {
        let reference = reference.trim().to_string();
        if reference.is_empty() {
            return Err(Error::Validation("payment reference is required".into()));
        }
        if reference.chars().count() > MAX_REFERENCE_LEN {
            return Err(Error::Validation(format!(
                "payment reference is longer than {MAX_REFERENCE_LEN} characters"
            )));
        }
        update.reference = Some(reference);
    }
    if let Some(Some(code)) = &update.bank {
        if bank_name(code).is_none() {
            return Err(Error::UnknownBank(code.clone()));
        }
    }
    store.update_payment(id, &update).await
}

/// All payments made in the given calendar month, joined with member
/// names, newest first.
pub async fn payments_for_month(
    store: &impl PaymentStore,
    year: i32,
    month: u32,
) -> Result<Vec<PaymentRow>> {
    let anchor = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::InvalidDate(format!("{year}-{month:02} is not a calendar month")))?;
    let (first, last) = calendar::month_span(anchor);
    store.payments_between(first, last).await
}
