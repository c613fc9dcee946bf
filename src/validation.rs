//! Field rules checked before a record reaches its repository, plus the input
//! masks the forms apply while the user types.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::{Customer, Motorcycle, ServiceOrder};

/// One or more fields failed their rules. Maps field name to message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    pub fields: BTreeMap<&'static str, String>,
}

impl ValidationError {
    pub fn message(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (i, (field, msg)) in self.fields.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{} {}", sep, field, msg)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern"))
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^\(\d{2}\) \d{5}-\d{4}$")
}

fn tax_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^\d{3}\.\d{3}\.\d{3}-\d{2}$")
}

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^\d{2}/\d{2}/\d{4}$")
}

fn plate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^[A-Z]{3}-\d{4}$")
}

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^\d{4}$")
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
}

/// Collects failures field by field; the first failing rule per field wins.
#[derive(Default)]
struct Checker {
    errors: ValidationError,
}

impl Checker {
    fn fail(&mut self, field: &'static str, msg: &str) {
        self.errors.fields.entry(field).or_insert_with(|| msg.to_string());
    }

    fn required(&mut self, field: &'static str, value: &str) -> bool {
        if value.is_empty() {
            self.fail(field, "is required");
            return false;
        }
        true
    }

    fn pattern(&mut self, field: &'static str, value: &str, re: &Regex, format: &str) {
        if self.required(field, value) && !re.is_match(value) {
            self.fail(field, &format!("must match {}", format));
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.errors.fields.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

pub fn is_valid_plate(plate: &str) -> bool {
    plate_re().is_match(plate)
}

pub fn validate_customer(c: &Customer) -> Result<(), ValidationError> {
    let mut check = Checker::default();
    check.required("name", &c.name);
    if check.required("email", &c.email) && !email_re().is_match(c.email.trim()) {
        check.fail("email", "is not a valid address");
    }
    check.pattern("phone", &c.phone, phone_re(), "(DD) DDDDD-DDDD");
    check.pattern("tax_id", &c.tax_id, tax_id_re(), "DDD.DDD.DDD-DD");
    check.pattern("birth_date", &c.birth_date, date_re(), "DD/MM/YYYY");
    check.finish()
}

/// `code` is not checked: it is assigned by the store, not typed in.
pub fn validate_motorcycle(m: &Motorcycle) -> Result<(), ValidationError> {
    let mut check = Checker::default();
    check.required("model", &m.model);
    check.pattern("year", &m.year, year_re(), "4 digits");
    check.pattern("plate", &m.plate, plate_re(), "AAA-DDDD");
    check.required("color", &m.color);
    if check.required("chassis", &m.chassis) {
        let len = m.chassis.chars().count();
        if len < 5 {
            check.fail("chassis", "must have at least 5 characters");
        } else if len > 17 {
            check.fail("chassis", "must have at most 17 characters");
        }
    }
    check.required("notes", &m.notes);
    check.finish()
}

pub fn validate_service_order(o: &ServiceOrder) -> Result<(), ValidationError> {
    let mut check = Checker::default();
    check.required("customer_name", o.customer_name.as_str());
    check.required("motorcycle_model", &o.motorcycle_model);
    check.required("plate", o.plate.as_str());
    check.required("mileage", &o.mileage);
    check.pattern("date", &o.date, date_re(), "DD/MM/YYYY");
    check.required("description", &o.description);
    if o.status.is_none() {
        check.fail("status", "is required");
    }
    check.required("amount", &o.amount);
    check.finish()
}

fn digits(text: &str, max: usize) -> String {
    text.chars().filter(char::is_ascii_digit).take(max).collect()
}

/// Formats typed digits as `DD/MM/YYYY`, inserting slashes as the input grows.
pub fn mask_date(text: &str) -> String {
    let d = digits(text, 8);
    let mut out = String::with_capacity(10);
    for (i, c) in d.chars().enumerate() {
        if i == 2 || i == 4 {
            out.push('/');
        }
        out.push(c);
    }
    out
}

/// Uppercases, drops anything but letters and digits and puts a dash after
/// three leading letters (`abc1234` becomes `ABC-1234`).
pub fn mask_plate(text: &str) -> String {
    let cleaned: String = text
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect();
    let letters = cleaned.chars().take_while(char::is_ascii_uppercase).count();
    let tail = &cleaned[letters.min(cleaned.len())..];
    if letters == 3 && tail.len() <= 4 && tail.chars().all(|c| c.is_ascii_digit()) {
        let mut out: String = format!("{}-{}", &cleaned[..3], tail);
        out.truncate(8);
        return out;
    }
    cleaned.chars().take(8).collect()
}

/// Formats up to 11 digits as `(DD) DDDDD-DDDD`.
pub fn mask_phone(text: &str) -> String {
    let d = digits(text, 11);
    let mut out = String::with_capacity(15);
    for (i, c) in d.chars().enumerate() {
        match i {
            0 => out.push('('),
            2 => out.push_str(") "),
            7 => out.push('-'),
            _ => {}
        }
        out.push(c);
    }
    out
}

/// Formats up to 11 digits as `DDD.DDD.DDD-DD`.
pub fn mask_tax_id(text: &str) -> String {
    let d = digits(text, 11);
    let mut out = String::with_capacity(14);
    for (i, c) in d.chars().enumerate() {
        match i {
            3 | 6 => out.push('.'),
            9 => out.push('-'),
            _ => {}
        }
        out.push(c);
    }
    out
}
