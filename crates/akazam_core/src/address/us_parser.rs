//! Heuristic parser for US-style postal addresses.
//!
//! Recognises `<number> [<dir>] <street...> [<type>] [<dir>]` followed by an
//! optional `city`, `state` (code or full name) and `zip[-plus4]`, with or
//! without commas between the street line and the locality.

use super::{AddressParser, ParsedAddress};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+[A-Za-z]?(?:-\d+[A-Za-z]?)?$").expect("valid house number regex")
});
static ZIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{5})(?:-(\d{4}))?$").expect("valid zip regex"));

const DIRECTIONALS: &[(&str, &[&str])] = &[
    ("N", &["n", "north"]),
    ("S", &["s", "south"]),
    ("E", &["e", "east"]),
    ("W", &["w", "west"]),
    ("NE", &["ne", "northeast"]),
    ("NW", &["nw", "northwest"]),
    ("SE", &["se", "southeast"]),
    ("SW", &["sw", "southwest"]),
];

const STREET_TYPES: &[(&str, &[&str])] = &[
    ("Aly", &["alley", "aly", "ally"]),
    ("Ave", &["avenue", "ave", "av", "aven", "avn"]),
    ("Blvd", &["boulevard", "blvd", "boul"]),
    ("Cir", &["circle", "cir", "circ"]),
    ("Cres", &["crescent", "cres"]),
    ("Ct", &["court", "ct"]),
    ("Dr", &["drive", "dr", "drv"]),
    ("Expy", &["expressway", "expy", "expwy"]),
    ("Fwy", &["freeway", "fwy"]),
    ("Hwy", &["highway", "hwy"]),
    ("Ln", &["lane", "ln"]),
    ("Loop", &["loop"]),
    ("Pkwy", &["parkway", "pkwy", "pky"]),
    ("Pl", &["place", "pl"]),
    ("Plz", &["plaza", "plz"]),
    ("Rd", &["road", "rd"]),
    ("Row", &["row"]),
    ("Sq", &["square", "sq"]),
    ("St", &["street", "st", "str"]),
    ("Ter", &["terrace", "ter", "terr"]),
    ("Trl", &["trail", "trl"]),
    ("Way", &["way", "wy"]),
];

const UNIT_DESIGNATORS: &[&str] = &[
    "apt", "apartment", "suite", "ste", "unit", "fl", "floor", "rm", "room", "bldg", "building",
];

const STATES: &[(&str, &str)] = &[
    ("AL", "alabama"),
    ("AK", "alaska"),
    ("AZ", "arizona"),
    ("AR", "arkansas"),
    ("CA", "california"),
    ("CO", "colorado"),
    ("CT", "connecticut"),
    ("DE", "delaware"),
    ("DC", "district of columbia"),
    ("FL", "florida"),
    ("GA", "georgia"),
    ("HI", "hawaii"),
    ("ID", "idaho"),
    ("IL", "illinois"),
    ("IN", "indiana"),
    ("IA", "iowa"),
    ("KS", "kansas"),
    ("KY", "kentucky"),
    ("LA", "louisiana"),
    ("ME", "maine"),
    ("MD", "maryland"),
    ("MA", "massachusetts"),
    ("MI", "michigan"),
    ("MN", "minnesota"),
    ("MS", "mississippi"),
    ("MO", "missouri"),
    ("MT", "montana"),
    ("NE", "nebraska"),
    ("NV", "nevada"),
    ("NH", "new hampshire"),
    ("NJ", "new jersey"),
    ("NM", "new mexico"),
    ("NY", "new york"),
    ("NC", "north carolina"),
    ("ND", "north dakota"),
    ("OH", "ohio"),
    ("OK", "oklahoma"),
    ("OR", "oregon"),
    ("PA", "pennsylvania"),
    ("PR", "puerto rico"),
    ("RI", "rhode island"),
    ("SC", "south carolina"),
    ("SD", "south dakota"),
    ("TN", "tennessee"),
    ("TX", "texas"),
    ("UT", "utah"),
    ("VT", "vermont"),
    ("VA", "virginia"),
    ("WA", "washington"),
    ("WV", "west virginia"),
    ("WI", "wisconsin"),
    ("WY", "wyoming"),
];

static DIRECTIONAL_LOOKUP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| alias_lookup(DIRECTIONALS));
static STREET_TYPE_LOOKUP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| alias_lookup(STREET_TYPES));
static STATE_LOOKUP: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    let mut lookup = HashMap::new();
    for (code, name) in STATES {
        lookup.insert(code.to_ascii_lowercase(), *code);
        lookup.insert((*name).to_string(), *code);
    }
    lookup
});

fn alias_lookup(table: &[(&'static str, &[&'static str])]) -> HashMap<&'static str, &'static str> {
    table
        .iter()
        .flat_map(|(canonical, aliases)| aliases.iter().map(move |alias| (*alias, *canonical)))
        .collect()
}

/// Default parser collaborator for US postal addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsAddressParser;

impl AddressParser for UsAddressParser {
    fn parse(&self, raw: &str) -> Option<ParsedAddress> {
        let mut segments = raw
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty());
        let street_segment = segments.next()?;
        let has_locality_segment = raw.contains(',');

        let mut tokens = tokenize(street_segment);
        if tokens.is_empty() || !NUMBER_RE.is_match(&tokens[0]) {
            return None;
        }
        let number = tokens.remove(0);

        let prefix = if tokens.len() >= 2 && street_type(&tokens[1]).is_none() {
            directional(&tokens[0])
        } else {
            None
        };
        if prefix.is_some() {
            tokens.remove(0);
        }

        let type_index = (1..tokens.len()).find(|&index| street_type(&tokens[index]).is_some());
        let (street_tokens, street_type_value, trailing) = match type_index {
            Some(index) => {
                let trailing = tokens.split_off(index + 1);
                let type_token = tokens.pop()?;
                (tokens, street_type(&type_token), trailing)
            }
            None => (tokens, None, Vec::new()),
        };
        if street_tokens.is_empty() {
            return None;
        }

        let mut trailing = trailing.into_iter().peekable();
        let mut suffix = None;
        if let Some(token) = trailing.peek() {
            if let Some(dir) = directional(token) {
                suffix = Some(dir);
                trailing.next();
            }
        }
        let mut locality = Vec::new();
        while let Some(token) = trailing.next() {
            if is_unit_designator(&token) {
                trailing.next();
                continue;
            }
            if token.starts_with('#') {
                continue;
            }
            locality.push(token);
        }

        for segment in segments {
            let segment_tokens = tokenize(segment);
            if segment_tokens
                .first()
                .is_some_and(|first| is_unit_designator(first) || first.starts_with('#'))
            {
                continue;
            }
            locality.extend(segment_tokens);
        }

        // Without a street type we cannot tell where the street ends, so only
        // peel a trailing state/zip off the street tokens.
        let (street_tokens, locality) = if type_index.is_none() && !has_locality_segment {
            split_unterminated_street(street_tokens)
        } else {
            (street_tokens, locality)
        };
        if street_tokens.is_empty() {
            return None;
        }

        // A bare street line carries no locality and is treated as unparseable.
        let parts = parse_locality(locality);
        if parts.city.is_none() && parts.state.is_none() && parts.zip.is_none() {
            return None;
        }
        Some(ParsedAddress {
            number,
            prefix,
            street: street_tokens.join(" "),
            street_type: street_type_value,
            suffix,
            city: parts.city,
            state: parts.state,
            zip: parts.zip,
            plus4: parts.plus4,
        })
    }
}

#[derive(Debug, Default)]
struct LocalityParts {
    city: Option<String>,
    state: Option<String>,
    zip: Option<String>,
    plus4: Option<String>,
}

fn parse_locality(mut tokens: Vec<String>) -> LocalityParts {
    let mut parts = LocalityParts::default();

    if let Some(captures) = tokens.last().and_then(|last| ZIP_RE.captures(last)) {
        parts.zip = captures.get(1).map(|m| m.as_str().to_string());
        parts.plus4 = captures.get(2).map(|m| m.as_str().to_string());
        tokens.pop();
    }

    if let Some((code, width)) = trailing_state(&tokens) {
        parts.state = Some(code.to_string());
        tokens.truncate(tokens.len() - width);
    }

    if !tokens.is_empty() {
        parts.city = Some(tokens.join(" "));
    }
    parts
}

fn split_unterminated_street(mut tokens: Vec<String>) -> (Vec<String>, Vec<String>) {
    let zip = if tokens.last().is_some_and(|last| ZIP_RE.is_match(last)) {
        tokens.pop()
    } else {
        None
    };
    let mut locality = match trailing_state(&tokens) {
        Some((_, width)) => tokens.split_off(tokens.len() - width),
        None => Vec::new(),
    };
    locality.extend(zip);
    (tokens, locality)
}

/// Finds a state at the end of `tokens`, preferring the longest name.
fn trailing_state(tokens: &[String]) -> Option<(&'static str, usize)> {
    (1..=3.min(tokens.len())).rev().find_map(|width| {
        let candidate = tokens[tokens.len() - width..]
            .iter()
            .map(|token| token.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        STATE_LOOKUP.get(&candidate).map(|code| (*code, width))
    })
}

fn tokenize(segment: &str) -> Vec<String> {
    segment
        .split_whitespace()
        .map(|token| token.trim_end_matches('.').to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

fn directional(token: &str) -> Option<String> {
    DIRECTIONAL_LOOKUP
        .get(token.to_ascii_lowercase().as_str())
        .map(|value| (*value).to_string())
}

fn street_type(token: &str) -> Option<String> {
    STREET_TYPE_LOOKUP
        .get(token.to_ascii_lowercase().as_str())
        .map(|value| (*value).to_string())
}

fn is_unit_designator(token: &str) -> bool {
    UNIT_DESIGNATORS.contains(&token.to_ascii_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::UsAddressParser;
    use crate::address::{AddressParser, ParsedAddress};

    fn parse(raw: &str) -> Option<ParsedAddress> {
        UsAddressParser.parse(raw)
    }

    #[test]
    fn parses_prefix_type_and_locality() {
        let parsed = parse("124 North Throndike street, Cambridge MA 02141").unwrap();
        assert_eq!(parsed.number, "124");
        assert_eq!(parsed.prefix.as_deref(), Some("N"));
        assert_eq!(parsed.street, "Throndike");
        assert_eq!(parsed.street_type.as_deref(), Some("St"));
        assert_eq!(parsed.city.as_deref(), Some("Cambridge"));
        assert_eq!(parsed.state.as_deref(), Some("MA"));
        assert_eq!(parsed.zip.as_deref(), Some("02141"));
    }

    #[test]
    fn parses_without_commas_after_street_type() {
        let parsed = parse("124 North Throndike street Cambridge MA 02141").unwrap();
        assert_eq!(parsed.street, "Throndike");
        assert_eq!(parsed.city.as_deref(), Some("Cambridge"));
        assert_eq!(parsed.zip.as_deref(), Some("02141"));
    }

    #[test]
    fn directional_before_street_type_is_the_street_name() {
        let parsed = parse("100 North St, Salem, MA").unwrap();
        assert_eq!(parsed.prefix, None);
        assert_eq!(parsed.street, "North");
        assert_eq!(parsed.street_type.as_deref(), Some("St"));
    }

    #[test]
    fn full_state_names_and_plus4_are_recognised() {
        let parsed = parse("350 Fifth Avenue, New York, New York 10118-0110").unwrap();
        assert_eq!(parsed.street, "Fifth");
        assert_eq!(parsed.street_type.as_deref(), Some("Ave"));
        assert_eq!(parsed.city.as_deref(), Some("New York"));
        assert_eq!(parsed.state.as_deref(), Some("NY"));
        assert_eq!(parsed.zip.as_deref(), Some("10118"));
        assert_eq!(parsed.plus4.as_deref(), Some("0110"));
    }

    #[test]
    fn missing_zip_is_none() {
        let parsed = parse("9 Elm Rd, Springfield, IL").unwrap();
        assert_eq!(parsed.state.as_deref(), Some("IL"));
        assert_eq!(parsed.zip, None);
    }

    #[test]
    fn suffix_and_unit_are_split_from_locality() {
        let parsed = parse("1600 Pennsylvania Ave NW Suite 200, Washington, DC 20500").unwrap();
        assert_eq!(parsed.street, "Pennsylvania");
        assert_eq!(parsed.suffix.as_deref(), Some("NW"));
        assert_eq!(parsed.city.as_deref(), Some("Washington"));
        assert_eq!(parsed.state.as_deref(), Some("DC"));
    }

    #[test]
    fn unit_segment_is_skipped() {
        let parsed = parse("1 Main St., Apt 4, Boston, MA 02101").unwrap();
        assert_eq!(parsed.street_type.as_deref(), Some("St"));
        assert_eq!(parsed.city.as_deref(), Some("Boston"));
    }

    #[test]
    fn street_without_type_keeps_trailing_state_and_zip_apart() {
        let parsed = parse("500 Broadway NY 10012").unwrap();
        assert_eq!(parsed.street, "Broadway");
        assert_eq!(parsed.street_type, None);
        assert_eq!(parsed.state.as_deref(), Some("NY"));
        assert_eq!(parsed.zip.as_deref(), Some("10012"));
    }

    #[test]
    fn city_between_street_type_and_comma_is_kept() {
        let parsed = parse("1600 Amphitheatre Pkwy Mountain View, CA 94043").unwrap();
        assert_eq!(parsed.street, "Amphitheatre");
        assert_eq!(parsed.street_type.as_deref(), Some("Pkwy"));
        assert_eq!(parsed.city.as_deref(), Some("Mountain View"));
        assert_eq!(parsed.state.as_deref(), Some("CA"));
        assert_eq!(parsed.zip.as_deref(), Some("94043"));
    }

    #[test]
    fn street_line_without_locality_is_unparseable() {
        assert_eq!(parse("1100 Throndike street"), None);
        assert_eq!(parse("10 Thorndike street"), None);
        assert_eq!(parse("124 South Throndike street"), None);
        assert_eq!(parse("1 Main St, Apt 4"), None);
    }

    #[test]
    fn unparseable_inputs_return_none() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("somewhere over the rainbow"), None);
        assert_eq!(parse("Cambridge, MA 02141"), None);
        assert_eq!(parse("42"), None);
    }
}
