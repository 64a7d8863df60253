// Engine metadata reported alongside every outcome

use serde::Serialize;

/// Static description of the wrapped solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineCredits {
    pub name: &'static str,
    pub author: &'static str,
    pub website: &'static str,
    pub license: &'static str,
    pub short_description: &'static str,
    pub long_description: &'static str,
}

pub const PATTY_CREDITS: EngineCredits = EngineCredits {
    name: "Patty",
    author: "Matteo Cardellini",
    website: "https://matteocardellini.it/",
    license: "MIT",
    short_description: "A Numeric Planner made with SMT.",
    long_description: "A Numeric Planner made with SMT.",
};
