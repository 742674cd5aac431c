//! Fixed vocabularies per document type.
//!
//! Matching is case-insensitive; the casing here is only for readability.

pub const BANK_STATEMENT_LABEL: &str = "Bank Statement";
pub const SALARY_SLIP_LABEL: &str = "Salary Slip";

pub const BANK_KEYWORDS: &[&str] = &[
    "Bank Statement",
    "Statement of Account",
    "Account Number",
    "Account No.",
    "Account #",
    "Debit",
    "Credit",
    "Deposit",
    "Withdrawal",
    "Account Title",
    "Account Name",
    "Customer Name",
    "Cust. Name",
    "Description",
    "Transaction Detail",
    "Voucher Narration",
    "IBAN",
];

pub const SALARY_KEYWORDS: &[&str] = &[
    "Wages",
    "Pay Slip",
    "Salary Slip",
    "Earning",
    "Deduction",
    "Account Number",
    "Account No.",
    "Account #",
    "Net Amount",
    "Basic Salary",
    "Allowances",
    "Payment Date",
    "IBAN",
];

/// Phrases that earn the bonus weight when they appear in a keyword list.
pub const BONUS_PHRASES: &[&str] = &["salary slip", "bank statement"];
