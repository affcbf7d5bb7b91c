//! # Modal Guard Logic
//!
//! Surface syntax for the Modal Guard reasoning engine: a lexer, a recursive
//! descent parser and a canonical printer for propositional modal logic with
//! tagged (multi-agent) modalities.
//!
//! Expert rules are authored in this syntax and persisted as source data, so
//! the grammar below is a stable interface.
//!
//! ## Grammar
//!
//! ```text
//! formula     := iff
//! iff         := implication ( IFF implication )*
//! implication := disjunction ( IMPLIES disjunction )*
//! disjunction := conjunction ( OR conjunction )*
//! conjunction := unary ( AND unary )*
//! unary       := NOT unary | box unary | diamond unary | primary
//! box         := "[]" | "[" tag "]" | "box" ( "[" tag "]" )?
//! diamond     := "<>" | "<" tag ">" | "diamond" ( "[" tag "]" )?
//! primary     := "true" | "false" | IDENT | "(" formula ")"
//!
//! NOT     := "~" | "!" | "not"
//! AND     := "&" | "&&" | "and"
//! OR      := "|" | "||" | "or"
//! IMPLIES := "->" | "implies"
//! IFF     := "<->" | "iff"
//! IDENT   := [A-Za-z_][A-Za-z0-9_]*     (keywords excluded)
//! ```
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 1 (loosest) | `<->` | left |
//! | 2 | `->` | left |
//! | 3 | `\|` | left |
//! | 4 | `&` | left |
//! | 5 (tightest) | `~`, `[m]`, `<m>` | prefix |
//!
//! A modal operator without a tag uses the `default` modality. Whitespace is
//! insignificant.
//!
//! ## Usage
//!
//! ```rust
//! use modal_logic::{parse, Formula, Modality};
//!
//! let rule = parse("[RF](pressure_high -> diamond[RF](valve_open))")?;
//! assert!(matches!(rule, Formula::Box(ref m, _) if m.as_str() == "RF"));
//!
//! // Canonical printing round-trips structurally.
//! assert_eq!(rule.to_string(), "[RF](pressure_high -> <RF>valve_open)");
//! assert_eq!(parse(&rule.to_string())?, rule);
//! # Ok::<(), modal_logic::SyntaxError>(())
//! ```

mod error;
mod formula;
mod lexer;
mod parser;

pub use error::{Result, SyntaxError};
pub use formula::{to_hex, Fingerprint, Formula, Modality, DEFAULT_MODALITY};
pub use lexer::{is_identifier, Lexer, Token, TokenKind, KEYWORDS};
pub use parser::{Parser, MAX_NESTING};

/// Parse formula text. Shorthand for [`Parser::parse`].
pub fn parse(input: &str) -> Result<Formula> {
    Parser::parse(input)
}

impl std::str::FromStr for Formula {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self> {
        Parser::parse(s)
    }
}
