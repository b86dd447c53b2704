//! Keyword rules that assign line items to aggregate buckets.
//!
//! Every bucket is evaluated on its own, so one item may land in several
//! buckets (e.g. a `category2` of "Belanja Operasi dan Belanja Modal" counts
//! toward both operating and capital expenditure). Matching is on the literal
//! keyword, so "Belanja Operasi dan Modal" is operating only. Items matching
//! no bucket are left out of every total.

use crate::types::LineItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Category1,
    Category2,
}

/// Substring predicate over one text field of a line item.
#[derive(Debug, Clone, Copy)]
pub struct MatchRule {
    pub field: Field,
    pub needle: &'static str,
    pub case_insensitive: bool,
}

impl MatchRule {
    const fn ci(field: Field, needle: &'static str) -> Self {
        Self {
            field,
            needle,
            case_insensitive: true,
        }
    }

    pub fn matches(&self, item: &LineItem) -> bool {
        let haystack = match self.field {
            Field::Category1 => item.category1.as_str(),
            Field::Category2 => item.category2.as_str(),
        };
        if self.case_insensitive {
            haystack.to_lowercase().contains(&self.needle.to_lowercase())
        } else {
            haystack.contains(self.needle)
        }
    }
}

const REVENUE: MatchRule = MatchRule::ci(Field::Category1, "Pendapatan");
const EXPENDITURE: MatchRule = MatchRule::ci(Field::Category1, "Belanja");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Revenue,
    OwnSourceRevenue,
    Expenditure,
    OperatingExpenditure,
    CapitalExpenditure,
    ContingencyExpenditure,
    TransferExpenditure,
}

impl Bucket {
    pub const ALL: [Bucket; 7] = [
        Bucket::Revenue,
        Bucket::OwnSourceRevenue,
        Bucket::Expenditure,
        Bucket::OperatingExpenditure,
        Bucket::CapitalExpenditure,
        Bucket::ContingencyExpenditure,
        Bucket::TransferExpenditure,
    ];

    /// Rules that must all hold for an item to count toward this bucket.
    pub fn rules(self) -> &'static [MatchRule] {
        const OWN_SOURCE: [MatchRule; 2] = [REVENUE, MatchRule::ci(Field::Category2, "PAD")];
        const OPERATING: [MatchRule; 2] =
            [EXPENDITURE, MatchRule::ci(Field::Category2, "Belanja Operasi")];
        const CAPITAL: [MatchRule; 2] =
            [EXPENDITURE, MatchRule::ci(Field::Category2, "Belanja Modal")];
        const CONTINGENCY: [MatchRule; 2] = [
            EXPENDITURE,
            MatchRule::ci(Field::Category2, "Belanja Tidak Terduga"),
        ];
        const TRANSFER: [MatchRule; 2] =
            [EXPENDITURE, MatchRule::ci(Field::Category2, "Belanja Transfer")];

        match self {
            Bucket::Revenue => &[REVENUE],
            Bucket::OwnSourceRevenue => &OWN_SOURCE,
            Bucket::Expenditure => &[EXPENDITURE],
            Bucket::OperatingExpenditure => &OPERATING,
            Bucket::CapitalExpenditure => &CAPITAL,
            Bucket::ContingencyExpenditure => &CONTINGENCY,
            Bucket::TransferExpenditure => &TRANSFER,
        }
    }

    pub fn matches(self, item: &LineItem) -> bool {
        self.rules().iter().all(|rule| rule.matches(item))
    }

    pub fn label(self) -> &'static str {
        match self {
            Bucket::Revenue => "Pendapatan",
            Bucket::OwnSourceRevenue => "PAD",
            Bucket::Expenditure => "Belanja",
            Bucket::OperatingExpenditure => "Belanja Operasi",
            Bucket::CapitalExpenditure => "Belanja Modal",
            Bucket::ContingencyExpenditure => "Belanja Tidak Terduga",
            Bucket::TransferExpenditure => "Belanja Transfer",
        }
    }
}
