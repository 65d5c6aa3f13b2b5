//! Operator and mode literals accepted on the wire.
//!
//! The literal spellings (`Greater_than_or_equal_to`, `Not_in`, `contains`, ...)
//! are part of the public query-string contract and must not change.

/// Comparison used by a `____from` or `____to` bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOperator {
    /// `Greater_than` (>)
    GreaterThan,
    /// `Greater_than_or_equal_to` (>=)
    GreaterThanOrEqualTo,
    /// `Less_than` (<)
    LessThan,
    /// `Less_than_or_equal_to` (<=)
    LessThanOrEqualTo,
}

impl RangeOperator {
    /// Default operator for a `____from` bound
    pub const FROM_DEFAULT: Self = Self::GreaterThanOrEqualTo;
    /// Default operator for a `____to` bound
    pub const TO_DEFAULT: Self = Self::LessThanOrEqualTo;

    /// Parse the wire literal
    #[must_use]
    pub fn parse(literal: &str) -> Option<Self> {
        match literal {
            "Greater_than" => Some(Self::GreaterThan),
            "Greater_than_or_equal_to" => Some(Self::GreaterThanOrEqualTo),
            "Less_than" => Some(Self::LessThan),
            "Less_than_or_equal_to" => Some(Self::LessThanOrEqualTo),
            _ => None,
        }
    }

    #[must_use]
    pub const fn literal(self) -> &'static str {
        match self {
            Self::GreaterThan => "Greater_than",
            Self::GreaterThanOrEqualTo => "Greater_than_or_equal_to",
            Self::LessThan => "Less_than",
            Self::LessThanOrEqualTo => "Less_than_or_equal_to",
        }
    }

    pub const ALL: [Self; 4] = [
        Self::GreaterThan,
        Self::GreaterThanOrEqualTo,
        Self::LessThan,
        Self::LessThanOrEqualTo,
    ];
}

/// Comparison used by a `____list` constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOperator {
    /// `In`
    #[default]
    In,
    /// `Not_in`
    NotIn,
    /// `Equal`
    Equal,
    /// `Not_equal`
    NotEqual,
}

impl ListOperator {
    #[must_use]
    pub fn parse(literal: &str) -> Option<Self> {
        match literal {
            "In" => Some(Self::In),
            "Not_in" => Some(Self::NotIn),
            "Equal" => Some(Self::Equal),
            "Not_equal" => Some(Self::NotEqual),
            _ => None,
        }
    }

    #[must_use]
    pub const fn literal(self) -> &'static str {
        match self {
            Self::In => "In",
            Self::NotIn => "Not_in",
            Self::Equal => "Equal",
            Self::NotEqual => "Not_equal",
        }
    }

    /// `Equal` and `Not_equal` compare against exactly one value.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        matches!(self, Self::Equal | Self::NotEqual)
    }

    /// True for the excluding forms (`Not_in`, `Not_equal`).
    #[must_use]
    pub const fn is_negated(self) -> bool {
        matches!(self, Self::NotIn | Self::NotEqual)
    }

    pub const ALL: [Self; 4] = [Self::In, Self::NotIn, Self::Equal, Self::NotEqual];
}

/// How a `____str` value is matched against a string column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// `case_sensitive`: exact equality
    #[default]
    CaseSensitive,
    /// `case_insensitive`: equality after case folding
    CaseInsensitive,
    /// `contains`: substring match
    Contains,
}

impl MatchMode {
    #[must_use]
    pub fn parse(literal: &str) -> Option<Self> {
        match literal {
            "case_sensitive" => Some(Self::CaseSensitive),
            "case_insensitive" => Some(Self::CaseInsensitive),
            "contains" => Some(Self::Contains),
            _ => None,
        }
    }

    #[must_use]
    pub const fn literal(self) -> &'static str {
        match self {
            Self::CaseSensitive => "case_sensitive",
            Self::CaseInsensitive => "case_insensitive",
            Self::Contains => "contains",
        }
    }

    /// In-process evaluation, matching what the SQL rendering does.
    /// `case_insensitive` folds ASCII letters only, as `SQLite`'s `LOWER()` does.
    #[must_use]
    pub fn matches(self, stored: &str, wanted: &str) -> bool {
        match self {
            Self::CaseSensitive => stored == wanted,
            Self::CaseInsensitive => stored.eq_ignore_ascii_case(wanted),
            Self::Contains => stored.contains(wanted),
        }
    }

    pub const ALL: [Self; 3] = [Self::CaseSensitive, Self::CaseInsensitive, Self::Contains];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_round_trip() {
        for op in RangeOperator::ALL {
            assert_eq!(RangeOperator::parse(op.literal()), Some(op));
        }
        for op in ListOperator::ALL {
            assert_eq!(ListOperator::parse(op.literal()), Some(op));
        }
        for mode in MatchMode::ALL {
            assert_eq!(MatchMode::parse(mode.literal()), Some(mode));
        }
    }

    #[test]
    fn test_literals_are_case_sensitive() {
        assert_eq!(RangeOperator::parse("greater_than"), None);
        assert_eq!(ListOperator::parse("in"), None);
        assert_eq!(ListOperator::parse("NOT_IN"), None);
        assert_eq!(MatchMode::parse("Contains"), None);
    }

    #[test]
    fn test_match_modes() {
        assert!(MatchMode::Contains.matches("string1", "string"));
        assert!(!MatchMode::CaseSensitive.matches("string1", "string"));
        assert!(MatchMode::CaseSensitive.matches("string", "string"));
        assert!(MatchMode::CaseInsensitive.matches("String", "sTRING"));
        assert!(!MatchMode::Contains.matches("String1", "string"));
        assert!(MatchMode::CaseInsensitive.matches("Café", "CAFé"));
        assert!(!MatchMode::CaseInsensitive.matches("Café", "CAFÉ"));
    }

    #[test]
    fn test_list_operator_shape() {
        assert!(ListOperator::Equal.is_scalar());
        assert!(!ListOperator::In.is_scalar());
        assert!(ListOperator::NotIn.is_negated());
        assert!(!ListOperator::Equal.is_negated());
        assert_eq!(ListOperator::default(), ListOperator::In);
    }
}
