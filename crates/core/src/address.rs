//! Street line splitting.
//!
//! The carrier expects street name and house number in separate fields while
//! shops collect free-form street lines.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitStreet {
    pub name: String,
    pub number: String,
    pub supplement: Option<String>,
}

fn starts_with_digit(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Split street lines into name, number and supplement.
///
/// The first line carries street and number, in either `"Street 12a"` or
/// `"12a Street"` order. Further lines become the supplement.
pub fn split_street(lines: &[String]) -> SplitStreet {
    let mut lines = lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty());
    let first = lines.next().unwrap_or_default();
    let rest: Vec<&str> = lines.collect();
    let supplement = if rest.is_empty() {
        None
    } else {
        Some(rest.join(" "))
    };

    let tokens: Vec<&str> = first.split_whitespace().collect();
    let (name, number) = match tokens.iter().skip(1).position(|t| starts_with_digit(t)) {
        Some(pos) => {
            let at = pos + 1;
            (tokens[..at].join(" "), tokens[at..].join(" "))
        }
        None if tokens.len() > 1 && starts_with_digit(tokens[0]) => {
            (tokens[1..].join(" "), tokens[0].to_string())
        }
        None => (tokens.join(" "), String::new()),
    };

    SplitStreet {
        name,
        number,
        supplement,
    }
}
