//! Decoding of normalized statements: ingredient declarations, method
//! statements, and the ingredient/bowl/dish argument forms they share.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::lexer;
use crate::ops::Op;

/// An error produced while decoding a single statement.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ParseError {
    #[error("Malformed ingredient declaration: `{0}`.")]
    MalformedIngredient(String),
    #[error("Malformed statement: `{0}`.")]
    MalformedStatement(String),
    #[error("`{verb}` requires a {anchor} target.")]
    MissingAnchor { verb: &'static str, anchor: &'static str },
    #[error("Recipe is missing a `{0}` statement.")]
    MissingSection(&'static str),
    #[error("`{0}` is not supported by this kitchen.")]
    UnsupportedOp(String),
}

/// The measure class of an ingredient, inferred from its declared unit.
/// Liquid values render as characters when a dish is served; everything
/// else renders as a decimal integer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Measure {
    Dry,
    Liquid,
    Unspecified,
}

/// A named recipe ingredient. The value may be absent when the declaration
/// carries no number; reading an absent value is fatal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ingredient {
    pub value: Option<i64>,
    pub measure: Measure,
}

/// A loaded recipe program: the flattened statement list plus a
/// case-insensitive index of statement text used for auxiliary recipe
/// lookup by `Serve with`.
#[derive(Clone, Debug)]
pub struct Program {
    pub statements: Vec<String>,
    titles: FxHashMap<String, usize>,
}

impl Program {
    pub fn new(statements: Vec<String>) -> Self {
        let mut titles = FxHashMap::default();
        for (index, statement) in statements.iter().enumerate() {
            titles.entry(statement.to_lowercase()).or_insert(index);
        }
        Program { statements, titles }
    }

    pub fn load(source: &str) -> Self {
        Program::new(lexer::normalize(source))
    }

    /// Index of the first statement whose text equals `title`, ignoring
    /// case and surrounding whitespace.
    pub fn title_index(&self, title: &str) -> Option<usize> {
        self.titles.get(&title.trim().to_lowercase()).copied()
    }
}

/// Decodes an ingredient list line.
///
/// A single token is a bare key with no value. Otherwise the first token is
/// the value and the second selects the measure: `heaped`/`level` announce a
/// dry measure word to skip, weights and pinches are dry, volumes and dashes
/// are liquid, cups and spoons leave the measure unspecified, and anything
/// else is already part of the (possibly multi-word) ingredient name.
pub fn parse_ingredient(line: &str) -> Result<(String, Ingredient), ParseError> {
    let malformed = || ParseError::MalformedIngredient(line.to_string());
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.len() {
        0 => Err(malformed()),
        1 => Ok((
            tokens[0].to_string(),
            Ingredient { value: None, measure: Measure::Unspecified },
        )),
        _ => {
            let value: i64 = tokens[0].parse().map_err(|_| malformed())?;
            let (measure, start) = match tokens[1] {
                "heaped" | "level" => (Measure::Dry, 3),
                "g" | "kg" | "pinch" | "pinches" => (Measure::Dry, 2),
                "ml" | "l" | "dash" | "dashes" => (Measure::Liquid, 2),
                "cup" | "cups" | "teaspoon" | "teaspoons" | "tablespoon"
                | "tablespoons" => (Measure::Unspecified, 2),
                _ => (Measure::Unspecified, 1),
            };
            if tokens.len() <= start {
                return Err(malformed());
            }
            Ok((
                tokens[start..].join(" "),
                Ingredient { value: Some(value), measure },
            ))
        }
    }
}

/// Decodes a method statement into an [`Op`]. The first token picks the
/// operator; any unrecognized verb opens a loop.
pub fn decode(statement: &str) -> Result<Op, ParseError> {
    let malformed = || ParseError::MalformedStatement(statement.to_string());
    let tokens: Vec<&str> = statement.split_whitespace().collect();
    let verb = tokens.first().copied().unwrap_or_default();
    match verb {
        "Put" | "Fold" => {
            let bowl = mixing_bowl_index(&tokens).ok_or(ParseError::MissingAnchor {
                verb: if verb == "Put" { "Put" } else { "Fold" },
                anchor: "mixing bowl",
            })?;
            let ingredient = ingredient_name(&tokens, 1, Some("into"));
            if ingredient.is_empty() {
                return Err(malformed());
            }
            Ok(if verb == "Put" {
                Op::Put { ingredient, bowl }
            } else {
                Op::Fold { ingredient, bowl }
            })
        }
        "Add" | "Remove" | "Combine" | "Divide" => {
            let terminator = match verb {
                "Add" => "to",
                "Remove" => "from",
                _ => "into",
            };
            let ingredient = ingredient_name(&tokens, 1, Some(terminator));
            if ingredient.is_empty() {
                return Err(malformed());
            }
            let bowl = mixing_bowl_index(&tokens).unwrap_or(1);
            Ok(match verb {
                "Add" if ingredient == "dry ingredients" => Op::AddDryIngredients { bowl },
                "Add" => Op::Add { ingredient, bowl },
                "Remove" => Op::Remove { ingredient, bowl },
                "Combine" => Op::Combine { ingredient, bowl },
                _ => Op::Divide { ingredient, bowl },
            })
        }
        "Liquefy" => {
            if tokens.len() < 2 {
                return Err(malformed());
            }
            Ok(Op::Liquefy { bowl: mixing_bowl_index(&tokens).unwrap_or(1) })
        }
        "Stir" => {
            let bowl = mixing_bowl_index(&tokens).unwrap_or(1);
            if tokens.last() == Some(&"minutes") {
                let at = tokens.iter().position(|&w| w == "for").ok_or_else(malformed)?;
                let minutes: i64 = tokens
                    .get(at + 1)
                    .and_then(|w| w.parse().ok())
                    .ok_or_else(malformed)?;
                Ok(Op::StirMinutes { bowl, minutes })
            } else {
                let ingredient = ingredient_name(&tokens, 1, Some("into"));
                if ingredient.is_empty() {
                    return Err(malformed());
                }
                Ok(Op::StirIngredient { ingredient, bowl })
            }
        }
        "Clean" => Ok(Op::Clean { bowl: mixing_bowl_index(&tokens).unwrap_or(1) }),
        "Pour" => {
            let bowl = mixing_bowl_index(&tokens)
                .ok_or(ParseError::MissingAnchor { verb: "Pour", anchor: "mixing bowl" })?;
            let dish = baking_dish_index(&tokens)
                .ok_or(ParseError::MissingAnchor { verb: "Pour", anchor: "baking dish" })?;
            Ok(Op::Pour { bowl, dish })
        }
        "Set" => {
            if tokens.get(1) != Some(&"aside") {
                return Err(malformed());
            }
            Ok(Op::SetAside)
        }
        "Serve" => {
            if tokens.get(1) != Some(&"with") || tokens.len() < 3 {
                return Err(malformed());
            }
            Ok(Op::ServeWith { title: tokens[2..].join(" ") })
        }
        "Refrigerate" => {
            if tokens.len() == 1 {
                return Ok(Op::Refrigerate { hours: None });
            }
            let hours: usize = (tokens.get(1) == Some(&"for"))
                .then(|| tokens.get(2))
                .flatten()
                .and_then(|w| w.parse().ok())
                .ok_or_else(malformed)?;
            Ok(Op::Refrigerate { hours: Some(hours) })
        }
        "Take" | "Mix" => Err(ParseError::UnsupportedOp(verb.to_string())),
        _ => {
            let guard = ingredient_name(&tokens, 1, None);
            if guard.is_empty() {
                return Err(malformed());
            }
            Ok(Op::StartLoop { guard })
        }
    }
}

/// Whether a method statement would decode to a loop header. Used when
/// scanning forward for a loop's matching `until` statement.
pub fn is_loop_header(statement: &str) -> bool {
    const VERBS: &[&str] = &[
        "Put", "Fold", "Add", "Remove", "Combine", "Divide", "Liquefy", "Stir",
        "Clean", "Pour", "Set", "Serve", "Serves", "Refrigerate", "Take", "Mix",
    ];
    let Some(verb) = statement.split_whitespace().next() else {
        return false;
    };
    !VERBS.contains(&verb) && !statement.contains(" until ")
}

/// The decrement ingredient named in a loop's `until` statement, if any.
/// `Shake the sauce until shaken` names `sauce`; a bare `Shake until
/// shaken` names nothing.
pub fn until_ingredient(statement: &str) -> Option<String> {
    let tokens: Vec<&str> = statement.split_whitespace().collect();
    let name = ingredient_name(&tokens, 1, Some("until"));
    (!name.is_empty()).then_some(name)
}

/// Joins the multi-word ingredient name beginning at `start`, skipping a
/// leading `the` and stopping before the first `terminator` token when one
/// is present.
fn ingredient_name(tokens: &[&str], mut start: usize, terminator: Option<&str>) -> String {
    if tokens.get(start) == Some(&"the") {
        start += 1;
    }
    let end = terminator
        .and_then(|t| tokens.iter().position(|&w| w == t))
        .unwrap_or(tokens.len());
    tokens[start..end.max(start)].join(" ")
}

/// 1-based bowl index from an `Nth mixing bowl` phrase, or `None` when the
/// `mixing` anchor is absent.
pub fn mixing_bowl_index(tokens: &[&str]) -> Option<usize> {
    container_index(tokens, "mixing")
}

/// 1-based dish index from an `Nth baking dish` phrase, or `None` when the
/// `baking` anchor is absent.
pub fn baking_dish_index(tokens: &[&str]) -> Option<usize> {
    container_index(tokens, "baking")
}

fn container_index(tokens: &[&str], anchor: &str) -> Option<usize> {
    let at = tokens.iter().position(|&w| w == anchor)?;
    if at == 0 {
        return None;
    }
    Some(ordinal(tokens[at - 1]))
}

/// Parses `1st`, `2nd`, `3rd`, `4th`, … into a 1-based index. A preceding
/// token without an ordinal suffix (commonly `the`) means the first
/// container.
fn ordinal(token: &str) -> usize {
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(digits) = token.strip_suffix(suffix) {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                return digits.parse().map(|n: usize| n.max(1)).unwrap_or(1);
            }
        }
    }
    1
}
