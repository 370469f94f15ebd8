//! Declarative hue/saturation/lightness rule tables.
//!
//! Classification ladders (color naming, brand neutrals) are expressed as an
//! ordered list of [`Rule`]s rather than if/else chains. Each rule matches a
//! closed span on each HSL axis and carries a `tier`. The table is
//! stable-sorted by `(tier, specificity)` on construction, so within a tier
//! the narrowest rule is tried first; evaluation is top-to-bottom and the
//! first match wins.

/// A closed interval on one HSL axis. For hue, `lo > hi` wraps through 0°.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub lo: f64,
    pub hi: f64,
}

impl Span {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    fn contains(self, v: f64) -> bool {
        if self.lo <= self.hi {
            self.lo <= v && v <= self.hi
        } else {
            v >= self.lo || v <= self.hi
        }
    }

    /// Width as a fraction of the axis domain `[0, domain]`.
    fn coverage(self, domain: f64) -> f64 {
        let width = if self.lo <= self.hi {
            self.hi - self.lo
        } else {
            domain - self.lo + self.hi
        };
        (width / domain).clamp(0.0, 1.0)
    }
}

const HUE_ALL: Span = Span::new(0.0, 360.0);
const PERCENT_ALL: Span = Span::new(0.0, 100.0);

/// One row of a [`RuleTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct Rule<L> {
    pub tier: u8,
    pub hue: Span,
    pub saturation: Span,
    pub lightness: Span,
    pub label: L,
}

impl<L> Rule<L> {
    /// A tier-0 rule matching every color; narrow it with the builder methods.
    pub fn new(label: L) -> Self {
        Self {
            tier: 0,
            hue: HUE_ALL,
            saturation: PERCENT_ALL,
            lightness: PERCENT_ALL,
            label,
        }
    }

    pub fn tier(mut self, tier: u8) -> Self {
        self.tier = tier;
        self
    }

    pub fn hue(mut self, lo: f64, hi: f64) -> Self {
        self.hue = Span::new(lo, hi);
        self
    }

    pub fn saturation(mut self, lo: f64, hi: f64) -> Self {
        self.saturation = Span::new(lo, hi);
        self
    }

    pub fn lightness(mut self, lo: f64, hi: f64) -> Self {
        self.lightness = Span::new(lo, hi);
        self
    }

    pub fn matches(&self, h: f64, s: f64, l: f64) -> bool {
        self.hue.contains(h) && self.saturation.contains(s) && self.lightness.contains(l)
    }

    /// Fraction of the HSL volume the rule covers; smaller is narrower.
    fn specificity(&self) -> f64 {
        self.hue.coverage(360.0) * self.saturation.coverage(100.0) * self.lightness.coverage(100.0)
    }
}

/// Ordered, first-match-wins rule list.
#[derive(Debug, Clone)]
pub struct RuleTable<L> {
    rules: Vec<Rule<L>>,
}

impl<L> RuleTable<L> {
    /// Builds a table, stable-sorting rows by tier and then by narrowest
    /// coverage. Rows with equal tier and coverage keep their given order.
    pub fn new(mut rules: Vec<Rule<L>>) -> Self {
        rules.sort_by(|a, b| {
            a.tier
                .cmp(&b.tier)
                .then_with(|| a.specificity().total_cmp(&b.specificity()))
        });
        Self { rules }
    }

    /// Label of the first matching rule, if any.
    pub fn classify(&self, h: f64, s: f64, l: f64) -> Option<&L> {
        self.rules
            .iter()
            .find(|rule| rule.matches(h, s, l))
            .map(|rule| &rule.label)
    }

    pub fn rules(&self) -> &[Rule<L>] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_wins_across_tiers() {
        let table = RuleTable::new(vec![
            Rule::new("fallback").tier(9),
            Rule::new("dark").lightness(0.0, 30.0),
        ]);
        assert_eq!(table.classify(120.0, 50.0, 10.0), Some(&"dark"));
        assert_eq!(table.classify(120.0, 50.0, 80.0), Some(&"fallback"));
    }

    #[test]
    fn narrowest_rule_wins_within_a_tier() {
        let table = RuleTable::new(vec![
            Rule::new("orange").hue(15.0, 45.0),
            Rule::new("brown").hue(15.0, 45.0).lightness(0.0, 35.0),
        ]);
        assert_eq!(table.classify(30.0, 60.0, 20.0), Some(&"brown"));
        assert_eq!(table.classify(30.0, 60.0, 60.0), Some(&"orange"));
    }

    #[test]
    fn equal_specificity_keeps_declaration_order() {
        let table = RuleTable::new(vec![
            Rule::new("first").saturation(0.0, 50.0),
            Rule::new("second").saturation(50.0, 100.0),
        ]);
        assert_eq!(table.classify(0.0, 50.0, 50.0), Some(&"first"));
    }

    #[test]
    fn hue_span_wraps_through_zero() {
        let table = RuleTable::new(vec![Rule::new("red").hue(345.0, 15.0)]);
        assert_eq!(table.classify(350.0, 80.0, 50.0), Some(&"red"));
        assert_eq!(table.classify(5.0, 80.0, 50.0), Some(&"red"));
        assert_eq!(table.classify(180.0, 80.0, 50.0), None);
    }

    #[test]
    fn no_match_returns_none() {
        let table: RuleTable<&str> = RuleTable::new(vec![]);
        assert_eq!(table.classify(0.0, 0.0, 0.0), None);
    }

    #[test]
    fn wrapped_span_coverage_accounts_for_both_sides() {
        let wrapped = Span::new(345.0, 15.0);
        assert!((wrapped.coverage(360.0) - 30.0 / 360.0).abs() < 1e-12);
    }
}
