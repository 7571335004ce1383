//! Free-text postal address normalization.
//!
//! # Responsibility
//! - Define the parser collaborator contract (`AddressParser`).
//! - Turn a parsed address into the flat fields stored on a location.
//!
//! # Invariants
//! - `normalize` is pure: same input and parser give the same output.
//! - A parser miss yields `None`; callers keep their original field values.
//! - Missing components come back as empty strings, never `None`.

mod us_parser;

pub use us_parser::UsAddressParser;

/// Structured decomposition of a raw address string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAddress {
    pub number: String,
    /// Leading directional, e.g. `N` in `124 N Main St`.
    pub prefix: Option<String>,
    pub street: String,
    /// Street type abbreviation, e.g. `St`, `Ave`.
    pub street_type: Option<String>,
    /// Trailing directional, e.g. `NW` in `10 Main St NW`.
    pub suffix: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    /// ZIP+4 extension.
    pub plus4: Option<String>,
}

/// Address fields as stored on a location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// Parser collaborator: returns `None` when the input is unparseable.
pub trait AddressParser {
    fn parse(&self, raw: &str) -> Option<ParsedAddress>;
}

impl<P: AddressParser + ?Sized> AddressParser for &P {
    fn parse(&self, raw: &str) -> Option<ParsedAddress> {
        (**self).parse(raw)
    }
}

/// Normalizes `raw` into stored address fields.
///
/// Produces `"<number> [<prefix> ]<street>[ <type>]"` plus verbatim city,
/// state and zip.
pub fn normalize<P: AddressParser + ?Sized>(parser: &P, raw: &str) -> Option<NormalizedAddress> {
    let parsed = parser.parse(raw)?;

    let mut address = parsed.number;
    if let Some(prefix) = parsed.prefix.filter(|value| !value.is_empty()) {
        address.push(' ');
        address.push_str(&prefix);
    }
    address.push(' ');
    address.push_str(&parsed.street);
    if let Some(street_type) = parsed.street_type.filter(|value| !value.is_empty()) {
        address.push(' ');
        address.push_str(&street_type);
    }

    Some(NormalizedAddress {
        address,
        city: parsed.city.unwrap_or_default(),
        state: parsed.state.unwrap_or_default(),
        zip_code: parsed.zip.unwrap_or_default(),
    })
}
