//! RetentionPolicy - どの artifact を残し、どれを purge するか
//!
//! 3 種類のうち必ず 1 つだけを選ぶ。選択は呼び出し境界で一度だけ行い、
//! 以降は enum の variant で分岐する。

use std::fmt;

use super::errors::LavatoryError;
use super::query::Term;

#[derive(Debug, Clone, PartialEq)]
pub enum RetentionPolicy {
    /// Caller-supplied terms select the purge set directly.
    Explicit(Vec<Term>),

    /// Keep the N most recently created artifacts of each project.
    KeepLastN(u32),

    /// Keep artifacts created within the last N weeks.
    KeepNewerThan { weeks: u32 },
}

impl RetentionPolicy {
    /// Builds a policy from the three optional knobs.
    ///
    /// Exactly one of `terms`, `count`, `weeks` must be given. Zero counts,
    /// zero weeks and empty term lists are rejected as well, since none of
    /// them describes a usable boundary.
    pub fn from_options(
        terms: Option<Vec<Term>>,
        count: Option<u32>,
        weeks: Option<u32>,
    ) -> Result<Self, LavatoryError> {
        match (terms, count, weeks) {
            (Some(terms), None, None) => {
                if terms.is_empty() {
                    return Err(LavatoryError::invalid_argument(
                        "explicit retention needs at least one term",
                    ));
                }
                Ok(Self::Explicit(terms))
            }
            (None, Some(count), None) => {
                if count == 0 {
                    return Err(LavatoryError::invalid_argument("count must be at least 1"));
                }
                Ok(Self::KeepLastN(count))
            }
            (None, None, Some(weeks)) => {
                if weeks == 0 {
                    return Err(LavatoryError::invalid_argument("weeks must be at least 1"));
                }
                Ok(Self::KeepNewerThan { weeks })
            }
            _ => Err(LavatoryError::invalid_argument(
                "must specify exactly one of terms, count, or weeks",
            )),
        }
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(terms) => {
                let rendered: Vec<String> = terms.iter().map(ToString::to_string).collect();
                write!(f, "terms [{}]", rendered.join(", "))
            }
            Self::KeepLastN(count) => write!(f, "keep last {count}"),
            Self::KeepNewerThan { weeks } => write!(f, "keep newer than {weeks} weeks"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn some_terms() -> Option<Vec<Term>> {
        Some(vec![Term::eq("name", "old")])
    }

    #[test]
    fn exactly_one_option_selects_a_variant() {
        assert_eq!(
            RetentionPolicy::from_options(None, Some(3), None).unwrap(),
            RetentionPolicy::KeepLastN(3)
        );
        assert_eq!(
            RetentionPolicy::from_options(None, None, Some(4)).unwrap(),
            RetentionPolicy::KeepNewerThan { weeks: 4 }
        );
        assert!(matches!(
            RetentionPolicy::from_options(some_terms(), None, None).unwrap(),
            RetentionPolicy::Explicit(terms) if terms.len() == 1
        ));
    }

    #[rstest]
    #[case(None, None, None)]
    #[case(some_terms(), Some(1), None)]
    #[case(None, Some(1), Some(1))]
    #[case(some_terms(), None, Some(2))]
    #[case(some_terms(), Some(1), Some(2))]
    fn anything_but_one_option_is_rejected(
        #[case] terms: Option<Vec<Term>>,
        #[case] count: Option<u32>,
        #[case] weeks: Option<u32>,
    ) {
        let err = RetentionPolicy::from_options(terms, count, weeks).unwrap_err();
        assert!(matches!(err, LavatoryError::InvalidArgument(_)));
    }

    #[rstest]
    #[case(Some(Vec::new()), None, None)]
    #[case(None, Some(0), None)]
    #[case(None, None, Some(0))]
    fn empty_boundaries_are_rejected(
        #[case] terms: Option<Vec<Term>>,
        #[case] count: Option<u32>,
        #[case] weeks: Option<u32>,
    ) {
        assert!(RetentionPolicy::from_options(terms, count, weeks).is_err());
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(RetentionPolicy::KeepLastN(5).to_string(), "keep last 5");
        assert_eq!(
            RetentionPolicy::KeepNewerThan { weeks: 2 }.to_string(),
            "keep newer than 2 weeks"
        );
    }
}
