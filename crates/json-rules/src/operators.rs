//! Operator registry.
//!
//! Every operator symbol belongs to exactly one group. The rule and
//! condition parsers call [`classify`] and dispatch on the returned
//! [`OperatorClass`]; moving a symbol between groups is a registry edit.

use std::fmt;

macro_rules! operator_group {
    (
        $(#[$meta:meta])*
        $name:ident, $group:ident {
            $($variant:ident => $symbol:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        pub const $group: &[&str] = &[$($symbol),+];

        impl $name {
            pub fn from_symbol(symbol: &str) -> Option<Self> {
                match symbol {
                    $($symbol => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn symbol(self) -> &'static str {
                match self {
                    $($name::$variant => $symbol),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.symbol())
            }
        }
    };
}

operator_group! {
    /// Strict equality and relational comparison.
    ValueOperator, VALUE_OPERATORS {
        Eq => "=",
        Gt => ">",
        Lt => "<",
        Gte => ">=",
        Lte => "<=",
    }
}

operator_group! {
    /// Negated comparisons. `not` and `!=` both mean strict inequality.
    InversionOperator, INVERSION_OPERATORS {
        Not => "not",
        Ne => "!=",
        NotGt => "!>",
        NotLt => "!<",
        NotGte => "!>=",
        NotLte => "!<=",
    }
}

impl InversionOperator {
    /// The comparison this operator negates.
    pub fn positive(self) -> ValueOperator {
        match self {
            InversionOperator::Not | InversionOperator::Ne => ValueOperator::Eq,
            InversionOperator::NotGt => ValueOperator::Gt,
            InversionOperator::NotLt => ValueOperator::Lt,
            InversionOperator::NotGte => ValueOperator::Gte,
            InversionOperator::NotLte => ValueOperator::Lte,
        }
    }
}

operator_group! {
    ArrayOperator, ARRAY_OPERATORS {
        Contains => "contains",
    }
}

operator_group! {
    /// Per-element sub-rule evaluation.
    ArrayInspectionOperator, ARRAY_INSPECTION_OPERATORS {
        Filter => "filter",
        Map => "map",
    }
}

operator_group! {
    /// Aggregates over a whole array.
    ArrayArithmeticOperator, ARRAY_ARITHMETIC_OPERATORS {
        Min => "min",
        Max => "max",
        Sum => "sum",
        Mean => "mean",
        Median => "median",
        Mode => "mode",
    }
}

operator_group! {
    LogicalOperator, LOGICAL_OPERATORS {
        And => "and",
        Or => "or",
    }
}

operator_group! {
    /// Operators that take no target value.
    EndOperator, END_OPERATORS {
        IsUndefined => "is undefined",
        IsNotUndefined => "is not undefined",
        IsNull => "is null",
        IsNotNull => "is not null",
        Abs => "abs",
    }
}

operator_group! {
    NonTargetArithmeticOperator, NON_TARGET_ARITHMETIC_OPERATORS {
        Sqrt => "sqrt",
    }
}

operator_group! {
    /// Binary arithmetic. `+` also concatenates strings.
    ValueArithmeticOperator, VALUE_ARITHMETIC_OPERATORS {
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        Rem => "%",
        Pow => "^",
    }
}

operator_group! {
    /// Relational orderings accepted by `sort`.
    SortOrder, SORT_ORDER_OPERATORS {
        Ascending => ">",
        Descending => "<",
        AscendingTiesReversed => ">=",
        DescendingTiesReversed => "<=",
    }
}

pub const CAST_OPERATOR: &str = "cast";
pub const SET_OPERATOR: &str = "set";
pub const LENGTH_OPERATOR: &str = "len";
pub const SLICE_OPERATOR: &str = "slice";
pub const SPLICE_OPERATOR: &str = "splice";
pub const SORT_OPERATOR: &str = "sort";

/// Every symbol accepted as a sort `comparisonOperator`.
pub const SORT_COMPARISON_OPERATORS: &[&str] =
    &["+", "-", "*", "/", "%", "^", ">", "<", ">=", "<="];

/// How `sort` compares two comparison keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortComparison {
    Order(SortOrder),
    Arithmetic(ValueArithmeticOperator),
}

impl SortComparison {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        if !SORT_COMPARISON_OPERATORS.contains(&symbol) {
            return None;
        }
        SortOrder::from_symbol(symbol)
            .map(SortComparison::Order)
            .or_else(|| ValueArithmeticOperator::from_symbol(symbol).map(SortComparison::Arithmetic))
    }
}

impl Default for SortComparison {
    fn default() -> Self {
        SortComparison::Order(SortOrder::Ascending)
    }
}

impl fmt::Display for SortComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortComparison::Order(o) => o.fmt(f),
            SortComparison::Arithmetic(a) => a.fmt(f),
        }
    }
}

/// Dispatch class of an operator symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorClass {
    Value,
    Inversion,
    Array,
    ArrayInspection,
    ArrayArithmetic,
    Logical,
    End,
    Cast,
    Set,
    Length,
    Slice,
    Splice,
    Sort,
    NonTargetArithmetic,
    ValueArithmetic,
}

const REGISTRY: &[(OperatorClass, &[&str])] = &[
    (OperatorClass::End, END_OPERATORS),
    (OperatorClass::Cast, &[CAST_OPERATOR]),
    (OperatorClass::Length, &[LENGTH_OPERATOR]),
    (OperatorClass::Slice, &[SLICE_OPERATOR]),
    (OperatorClass::Splice, &[SPLICE_OPERATOR]),
    (OperatorClass::Sort, &[SORT_OPERATOR]),
    (OperatorClass::ArrayInspection, ARRAY_INSPECTION_OPERATORS),
    (OperatorClass::ArrayArithmetic, ARRAY_ARITHMETIC_OPERATORS),
    (OperatorClass::Array, ARRAY_OPERATORS),
    (OperatorClass::NonTargetArithmetic, NON_TARGET_ARITHMETIC_OPERATORS),
    (OperatorClass::Set, &[SET_OPERATOR]),
    (OperatorClass::Value, VALUE_OPERATORS),
    (OperatorClass::Inversion, INVERSION_OPERATORS),
    (OperatorClass::ValueArithmetic, VALUE_ARITHMETIC_OPERATORS),
    (OperatorClass::Logical, LOGICAL_OPERATORS),
];

/// Looks up the class of `symbol`, or `None` for an unknown operator.
pub fn classify(symbol: &str) -> Option<OperatorClass> {
    REGISTRY
        .iter()
        .find(|(_, group)| group.contains(&symbol))
        .map(|(class, _)| *class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_groups_are_disjoint() {
        let mut seen = HashSet::new();
        for (_, group) in REGISTRY {
            for symbol in *group {
                assert!(seen.insert(*symbol), "{symbol} registered twice");
            }
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("abs"), Some(OperatorClass::End));
        assert_eq!(classify("is not null"), Some(OperatorClass::End));
        assert_eq!(classify("len"), Some(OperatorClass::Length));
        assert_eq!(classify("contains"), Some(OperatorClass::Array));
        assert_eq!(classify("not"), Some(OperatorClass::Inversion));
        assert_eq!(classify("!>="), Some(OperatorClass::Inversion));
        assert_eq!(classify("^"), Some(OperatorClass::ValueArithmetic));
        assert_eq!(classify("or"), Some(OperatorClass::Logical));
        assert_eq!(classify("xor"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_symbols_round_trip() {
        for symbol in ARRAY_ARITHMETIC_OPERATORS {
            let op = ArrayArithmeticOperator::from_symbol(symbol).unwrap();
            assert_eq!(op.symbol(), *symbol);
        }
        for symbol in INVERSION_OPERATORS {
            assert!(InversionOperator::from_symbol(symbol).is_some());
        }
    }

    #[test]
    fn test_sort_comparison() {
        assert_eq!(
            SortComparison::from_symbol(">="),
            Some(SortComparison::Order(SortOrder::AscendingTiesReversed))
        );
        assert_eq!(
            SortComparison::from_symbol("%"),
            Some(SortComparison::Arithmetic(ValueArithmeticOperator::Rem))
        );
        assert_eq!(SortComparison::from_symbol("="), None);
        assert_eq!(SortComparison::default().to_string(), ">");
    }

    #[test]
    fn test_inversion_positive() {
        assert_eq!(InversionOperator::Not.positive(), ValueOperator::Eq);
        assert_eq!(InversionOperator::NotLte.positive(), ValueOperator::Lte);
    }
}
