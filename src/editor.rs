//! Form state for the add/edit dialog.
//!
//! A [`MethodFormState`] stages raw user input for one record and exists
//! only while a dialog is open. Setters are total: every keystroke
//! produces a best-effort staged value, never an error. On submit the
//! staged fields are folded into a [`PaymentMethod`]; only the fields
//! relevant to the staged type survive, so values left over from a
//! previous type selection are dropped by construction.

use crate::method::{generate_id, MethodKind, MethodType, PaymentMethod};
use crate::normalize::{
    digits, format_card_number, format_expiration, format_expiration_input, parse_expiration,
    trailing4,
};

/// The dialog state machine. The add and edit dialogs are mutually
/// exclusive; at most one form is staged at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Closed,
    Adding(MethodFormState),
    Editing(MethodFormState),
}

impl EditorState {
    /// The staged form, if a dialog is open.
    pub fn form(&self) -> Option<&MethodFormState> {
        match self {
            EditorState::Closed => None,
            EditorState::Adding(form) | EditorState::Editing(form) => Some(form),
        }
    }

    /// Mutable access to the staged form, if a dialog is open.
    pub fn form_mut(&mut self) -> Option<&mut MethodFormState> {
        match self {
            EditorState::Closed => None,
            EditorState::Adding(form) | EditorState::Editing(form) => Some(form),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, EditorState::Closed)
    }
}

/// Staged input for one payment method.
///
/// A superset of the stored record: `card_number`, `expiration`, and
/// `cvv` are raw staging fields. The CVV is collected for a downstream
/// processor but is never written into a [`PaymentMethod`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodFormState {
    /// Present when editing an existing record; generated on submit
    /// otherwise.
    pub id: Option<String>,

    /// The currently selected kind. Switching types does not clear staged
    /// values; submit ignores the ones that no longer apply.
    pub method_type: MethodType,

    pub brand: String,
    pub bank: String,
    pub handle: String,
    pub nickname: String,

    /// Trailing digits, either derived live from `card_number` or edited
    /// directly for non-card kinds.
    pub last4: String,

    /// Display-formatted card number (groups of four). Never prefilled
    /// when editing.
    pub card_number: String,

    /// Display-formatted `MM/YY` string.
    pub expiration: String,

    /// Raw CVV digits. Never persisted, never prefilled when editing.
    pub cvv: String,

    /// Expiration snapshot from the record being edited, used when the
    /// expiration field is left blank on submit.
    pub exp_month: Option<u32>,
    pub exp_year: Option<u32>,

    pub is_default: bool,
}

impl MethodFormState {
    /// A blank form for a newly picked type.
    pub fn blank(method_type: MethodType, is_default: bool) -> Self {
        MethodFormState {
            id: None,
            method_type,
            brand: String::new(),
            bank: String::new(),
            handle: String::new(),
            nickname: String::new(),
            last4: String::new(),
            card_number: String::new(),
            expiration: String::new(),
            cvv: String::new(),
            exp_month: None,
            exp_year: None,
            is_default,
        }
    }

    /// A form prefilled from an existing record.
    ///
    /// The stored expiration is formatted back into `MM/YY`; the raw card
    /// number and CVV are never reconstructed from stored data.
    pub fn from_method(method: &PaymentMethod) -> Self {
        let (exp_month, exp_year) = method.kind.expiration();
        let expiration = match (exp_month, exp_year) {
            (Some(month), Some(year)) => format_expiration(month, year),
            _ => String::new(),
        };

        MethodFormState {
            id: Some(method.id.clone()),
            method_type: method.method_type(),
            brand: method.kind.brand().unwrap_or_default().to_string(),
            bank: method.kind.bank().unwrap_or_default().to_string(),
            handle: method.kind.handle().unwrap_or_default().to_string(),
            nickname: method.nickname.clone().unwrap_or_default(),
            last4: method.last4.clone(),
            card_number: String::new(),
            expiration,
            cvv: String::new(),
            exp_month,
            exp_year,
            is_default: method.is_default,
        }
    }

    /// Switches the staged type. Staged values are kept as-is.
    pub fn set_method_type(&mut self, method_type: MethodType) {
        self.method_type = method_type;
    }

    /// Direct `last4` edit: digits only, truncated to four.
    pub fn set_last4(&mut self, raw: &str) {
        let mut all = digits(raw);
        all.truncate(4);
        self.last4 = all;
    }

    /// Card number keystroke: reformat for display and track `last4` live
    /// as the trailing digits typed so far (unpadded below four digits).
    pub fn set_card_number(&mut self, raw: &str) {
        self.card_number = format_card_number(raw);
        let all = digits(&self.card_number);
        if !all.is_empty() {
            self.last4 = trailing4(&all).to_string();
        }
    }

    /// Expiration keystroke: forced into `MM/YY` shape once three digits
    /// are present.
    pub fn set_expiration(&mut self, raw: &str) {
        self.expiration = format_expiration_input(raw);
    }

    /// CVV keystroke: digits only, truncated to four.
    pub fn set_cvv(&mut self, raw: &str) {
        let mut all = digits(raw);
        all.truncate(4);
        self.cvv = all;
    }

    /// Folds the staged fields into a stored record.
    ///
    /// Submission is never blocked: a missing card number falls back to
    /// the staged `last4`, then to `"0000"`. An unparseable expiration
    /// yields an expiration-less card. `current_year` supplies the
    /// century for two-digit years.
    pub fn into_method(self, current_year: u32) -> PaymentMethod {
        let card_digits = digits(&self.card_number);
        let last4 = if !card_digits.is_empty() {
            trailing4(&card_digits).to_string()
        } else if !self.last4.is_empty() {
            self.last4.clone()
        } else {
            "0000".to_string()
        };

        let kind = match self.method_type {
            MethodType::CreditCard => {
                let (exp_month, exp_year) = if self.expiration.trim().is_empty() {
                    (self.exp_month, self.exp_year)
                } else {
                    match parse_expiration(&self.expiration, current_year) {
                        Some(exp) => (Some(exp.month), Some(exp.year)),
                        None => (None, None),
                    }
                };
                MethodKind::CreditCard {
                    brand: non_empty(&self.brand),
                    exp_month,
                    exp_year,
                }
            }
            MethodType::BankAccount => MethodKind::BankAccount {
                bank: non_empty(&self.bank),
                brand: non_empty(&self.brand),
            },
            MethodType::Ach => MethodKind::Ach {
                bank: non_empty(&self.bank),
                brand: non_empty(&self.brand),
            },
            MethodType::DigitalWallet => MethodKind::DigitalWallet {
                brand: non_empty(&self.brand),
                handle: non_empty(&self.handle),
            },
        };

        let nickname = self.nickname.trim();
        let nickname = (!nickname.is_empty()).then(|| nickname.to_string());

        PaymentMethod {
            id: self.id.unwrap_or_else(generate_id),
            kind,
            last4,
            nickname,
            is_default: self.is_default,
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_number_formats_and_tracks_last4() {
        let mut form = MethodFormState::blank(MethodType::CreditCard, false);

        form.set_card_number("4111 1111 1111 1111");
        assert_eq!(form.card_number, "4111 1111 1111 1111");
        assert_eq!(form.last4, "1111");

        form.set_card_number("42");
        assert_eq!(form.card_number, "42");
        assert_eq!(form.last4, "42");
    }

    #[test]
    fn test_card_number_cleared_keeps_prior_last4() {
        let mut form = MethodFormState::blank(MethodType::CreditCard, false);
        form.set_card_number("4242424242424242");
        form.set_card_number("");
        assert_eq!(form.last4, "4242");
    }

    #[test]
    fn test_last4_direct_edit_strips_and_truncates() {
        let mut form = MethodFormState::blank(MethodType::BankAccount, false);
        form.set_last4("x6-78九9extra");
        assert_eq!(form.last4, "6789");
    }

    #[test]
    fn test_cvv_digits_only() {
        let mut form = MethodFormState::blank(MethodType::CreditCard, false);
        form.set_cvv("1a2b3c4d5");
        assert_eq!(form.cvv, "1234");
    }

    #[test]
    fn test_expiration_keystrokes() {
        let mut form = MethodFormState::blank(MethodType::CreditCard, false);
        form.set_expiration("07");
        assert_eq!(form.expiration, "07");
        form.set_expiration("072");
        assert_eq!(form.expiration, "07/2");
        form.set_expiration("0729");
        assert_eq!(form.expiration, "07/29");
    }

    #[test]
    fn test_from_method_prefills_expiration_not_card_number() {
        let method = PaymentMethod {
            id: "pm-1".to_string(),
            kind: MethodKind::CreditCard {
                brand: Some("Visa".to_string()),
                exp_month: Some(7),
                exp_year: Some(2029),
            },
            last4: "4242".to_string(),
            nickname: Some("Work".to_string()),
            is_default: true,
        };

        let form = MethodFormState::from_method(&method);
        assert_eq!(form.id.as_deref(), Some("pm-1"));
        assert_eq!(form.expiration, "07/29");
        assert_eq!(form.card_number, "");
        assert_eq!(form.cvv, "");
        assert_eq!(form.last4, "4242");
        assert_eq!(form.nickname, "Work");
        assert!(form.is_default);
    }

    #[test]
    fn test_submit_derives_last4_from_card_number() {
        let mut form = MethodFormState::blank(MethodType::CreditCard, false);
        form.set_card_number("4111111111111111");
        form.set_expiration("0729");

        let method = form.into_method(2026);
        assert_eq!(method.last4, "1111");
        assert_eq!(method.kind.expiration(), (Some(7), Some(2029)));
    }

    #[test]
    fn test_submit_falls_back_to_staged_last4_then_zeros() {
        let mut form = MethodFormState::blank(MethodType::BankAccount, false);
        form.set_last4("6789");
        assert_eq!(form.clone().into_method(2026).last4, "6789");

        let blank = MethodFormState::blank(MethodType::CreditCard, false);
        assert_eq!(blank.into_method(2026).last4, "0000");
    }

    #[test]
    fn test_submit_blank_expiration_keeps_edited_snapshot() {
        let method = PaymentMethod {
            id: "pm-1".to_string(),
            kind: MethodKind::CreditCard {
                brand: None,
                exp_month: Some(3),
                exp_year: Some(2028),
            },
            last4: "4242".to_string(),
            nickname: None,
            is_default: false,
        };

        let mut form = MethodFormState::from_method(&method);
        form.set_expiration("");
        let updated = form.into_method(2026);
        assert_eq!(updated.kind.expiration(), (Some(3), Some(2028)));
    }

    #[test]
    fn test_submit_unparseable_expiration_yields_none() {
        let mut form = MethodFormState::blank(MethodType::CreditCard, false);
        form.set_expiration("13/29");
        let method = form.into_method(2026);
        assert_eq!(method.kind.expiration(), (None, None));
    }

    #[test]
    fn test_submit_nickname_trimmed_and_empty_dropped() {
        let mut form = MethodFormState::blank(MethodType::CreditCard, false);
        form.nickname = "  Work card  ".to_string();
        assert_eq!(
            form.clone().into_method(2026).nickname.as_deref(),
            Some("Work card")
        );

        form.nickname = "   ".to_string();
        assert_eq!(form.into_method(2026).nickname, None);
    }

    #[test]
    fn test_type_switch_drops_stale_fields_at_submit() {
        let mut form = MethodFormState::blank(MethodType::CreditCard, false);
        form.set_expiration("0729");
        form.bank = "Chase".to_string();
        form.set_method_type(MethodType::BankAccount);

        // Staged expiration survives in the form but not in the record.
        assert_eq!(form.expiration, "07/29");
        let method = form.into_method(2026);
        assert_eq!(method.kind.expiration(), (None, None));
        assert_eq!(method.kind.bank(), Some("Chase"));
    }

    #[test]
    fn test_submit_generates_id_when_absent() {
        let form = MethodFormState::blank(MethodType::Ach, false);
        let method = form.into_method(2026);
        assert!(method.id.starts_with("pm-"));
    }
}
