//! Payment method data model.
//!
//! A `PaymentMethod` is polymorphic over four kinds, modeled as a tagged
//! union so that only the fields meaningful for a given kind can exist.
//! The serde representation matches the externally owned JSON list: a
//! snake_case `type` tag with camelCase field names.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Kind-specific fields of a payment method.
///
/// Cards carry an optional network name and expiration; bank accounts and
/// ACH entries carry an institution name (with the network name kept as a
/// display fallback); wallets carry a provider name and a handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MethodKind {
    #[serde(rename_all = "camelCase")]
    CreditCard {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        brand: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exp_month: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exp_year: Option<u32>,
    },
    BankAccount {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bank: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        brand: Option<String>,
    },
    Ach {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bank: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        brand: Option<String>,
    },
    DigitalWallet {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        brand: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        handle: Option<String>,
    },
}

impl MethodKind {
    /// Returns the fieldless discriminant for this kind.
    pub fn method_type(&self) -> MethodType {
        match self {
            MethodKind::CreditCard { .. } => MethodType::CreditCard,
            MethodKind::BankAccount { .. } => MethodType::BankAccount,
            MethodKind::Ach { .. } => MethodType::Ach,
            MethodKind::DigitalWallet { .. } => MethodType::DigitalWallet,
        }
    }

    /// Issuer network or wallet provider name, if present.
    pub fn brand(&self) -> Option<&str> {
        match self {
            MethodKind::CreditCard { brand, .. }
            | MethodKind::BankAccount { brand, .. }
            | MethodKind::Ach { brand, .. }
            | MethodKind::DigitalWallet { brand, .. } => brand.as_deref(),
        }
    }

    /// Financial institution name, if present.
    pub fn bank(&self) -> Option<&str> {
        match self {
            MethodKind::BankAccount { bank, .. } | MethodKind::Ach { bank, .. } => bank.as_deref(),
            _ => None,
        }
    }

    /// Wallet handle, if present.
    pub fn handle(&self) -> Option<&str> {
        match self {
            MethodKind::DigitalWallet { handle, .. } => handle.as_deref(),
            _ => None,
        }
    }

    /// Card expiration as `(month, year)`, if present.
    pub fn expiration(&self) -> (Option<u32>, Option<u32>) {
        match self {
            MethodKind::CreditCard {
                exp_month, exp_year, ..
            } => (*exp_month, *exp_year),
            _ => (None, None),
        }
    }
}

/// Fieldless payment method discriminant, used by the editor's type picker
/// and by scripted operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodType {
    CreditCard,
    BankAccount,
    Ach,
    DigitalWallet,
}

impl MethodType {
    /// Parses the snake_case type tag. Returns `None` for unknown tags.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "credit_card" => Some(MethodType::CreditCard),
            "bank_account" => Some(MethodType::BankAccount),
            "ach" => Some(MethodType::Ach),
            "digital_wallet" => Some(MethodType::DigitalWallet),
            _ => None,
        }
    }

    /// The snake_case type tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodType::CreditCard => "credit_card",
            MethodType::BankAccount => "bank_account",
            MethodType::Ach => "ach",
            MethodType::DigitalWallet => "digital_wallet",
        }
    }

    /// An empty `MethodKind` of this type.
    pub fn blank_kind(&self) -> MethodKind {
        match self {
            MethodType::CreditCard => MethodKind::CreditCard {
                brand: None,
                exp_month: None,
                exp_year: None,
            },
            MethodType::BankAccount => MethodKind::BankAccount {
                bank: None,
                brand: None,
            },
            MethodType::Ach => MethodKind::Ach {
                bank: None,
                brand: None,
            },
            MethodType::DigitalWallet => MethodKind::DigitalWallet {
                brand: None,
                handle: None,
            },
        }
    }
}

/// A stored payment method record.
///
/// `last4` is the only field guaranteed present and display-safe for every
/// kind. The raw card number and CVV are never stored; `last4` is derived
/// at form-submit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    /// Opaque unique identifier. Caller-assigned for existing records,
    /// generated locally (`pm-<timestamp>`) for records created here.
    pub id: String,

    /// Kind-specific fields, flattened into the record alongside the
    /// `type` tag.
    #[serde(flatten)]
    pub kind: MethodKind,

    /// The trailing digits shown in lists. Up to four digits.
    pub last4: String,

    /// Optional free-form label, prefixed to the display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    /// Whether this is the default method. Exactly one record carries
    /// this flag in any non-empty normalized list.
    #[serde(default)]
    pub is_default: bool,
}

impl PaymentMethod {
    /// Returns the fieldless discriminant for this record.
    pub fn method_type(&self) -> MethodType {
        self.kind.method_type()
    }
}

/// Generates a timestamp-based identifier for a locally created record.
pub fn generate_id() -> String {
    let ts = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_millis());
    format!("pm-{ts}")
}
