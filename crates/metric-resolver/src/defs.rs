//! Built-in alias definitions for the canonical metric vocabulary.
//!
//! Declaration order is also the tie-break order when a label matches the
//! patterns of more than one metric, so narrower metrics ("Sales growth")
//! are declared before broader ones ("Revenue").

pub const RETURN_ON_EQUITY: &str = "Return on equity";
pub const RETURN_ON_CAPITAL_EMPLOYED: &str = "Return on capital employed";
pub const DEBT_TO_EQUITY: &str = "Debt to equity";
pub const PRICE_TO_EARNING: &str = "Price to Earning";
pub const PRICE_TO_BOOK_VALUE: &str = "Price to book value";
pub const PEG_RATIO: &str = "PEG ratio";
pub const EPS: &str = "EPS";
pub const DIVIDEND_PAYOUT: &str = "Dividend payout";
pub const DIVIDEND_YIELD: &str = "Dividend yield";
pub const PROMOTER_HOLDING: &str = "Promoter holding";
pub const FII_HOLDING: &str = "FII holding";
pub const DII_HOLDING: &str = "DII holding";
pub const SALES_GROWTH: &str = "Sales growth";
pub const PROFIT_GROWTH: &str = "Profit growth";
pub const OPERATING_PROFIT_MARGIN: &str = "Operating profit margin";
pub const NET_PROFIT: &str = "Net profit";
pub const REVENUE: &str = "Revenue";
pub const CURRENT_RATIO: &str = "Current ratio";
pub const MARKET_CAPITALIZATION: &str = "Market capitalization";

#[derive(Debug, Clone, Copy)]
pub struct AliasDef {
    pub metric: &'static str,
    pub patterns: &'static [&'static str],
}

const BUILTIN_ALIASES: &[AliasDef] = &[
    AliasDef {
        metric: RETURN_ON_EQUITY,
        patterns: &[r"return\s+on\s+equity", r"\broe\b"],
    },
    AliasDef {
        metric: RETURN_ON_CAPITAL_EMPLOYED,
        patterns: &[r"return\s+on\s+capital\s+employed", r"\broce\b"],
    },
    AliasDef {
        metric: DEBT_TO_EQUITY,
        patterns: &[r"debt\s*(to|/)\s*equity", r"\bd\s*/\s*e\b"],
    },
    AliasDef {
        metric: PEG_RATIO,
        patterns: &[r"\bpeg\b"],
    },
    AliasDef {
        metric: PRICE_TO_EARNING,
        patterns: &[r"price\s*to\s*earning", r"\bp\s*/\s*e\b", r"\bpe\b"],
    },
    AliasDef {
        metric: PRICE_TO_BOOK_VALUE,
        patterns: &[r"price\s*to\s*book", r"\bp\s*/\s*b(v)?\b", r"\bpb\b"],
    },
    AliasDef {
        metric: EPS,
        patterns: &[r"\beps\b", r"earnings?\s+per\s+share"],
    },
    AliasDef {
        metric: DIVIDEND_PAYOUT,
        patterns: &[r"dividend\s+payout", r"payout\s+ratio"],
    },
    AliasDef {
        metric: DIVIDEND_YIELD,
        patterns: &[r"dividend\s+yield", r"\bdiv\s+yld\b"],
    },
    AliasDef {
        metric: PROMOTER_HOLDING,
        patterns: &[r"\bpromoters?\b"],
    },
    AliasDef {
        metric: FII_HOLDING,
        patterns: &[r"\bfiis?\b", r"foreign\s+institution"],
    },
    AliasDef {
        metric: DII_HOLDING,
        patterns: &[r"\bdiis?\b", r"domestic\s+institution"],
    },
    AliasDef {
        metric: SALES_GROWTH,
        patterns: &[r"sales\s+growth", r"revenue\s+growth"],
    },
    AliasDef {
        metric: PROFIT_GROWTH,
        patterns: &[r"profit\s+growth"],
    },
    AliasDef {
        metric: OPERATING_PROFIT_MARGIN,
        patterns: &[r"\bopm\b", r"operating\s+profit\s+margin"],
    },
    AliasDef {
        metric: NET_PROFIT,
        patterns: &[
            r"^net\s+profit\s*\+?$",
            r"^profit\s+after\s+tax\s*\+?$",
            r"^pat\s*\+?$",
        ],
    },
    AliasDef {
        metric: REVENUE,
        // Whole labels only; growth rows never fall through to Revenue
        patterns: &[r"^(net\s+|total\s+)?(revenue|sales)(\s+from\s+operations)?\s*\+?$"],
    },
    AliasDef {
        metric: CURRENT_RATIO,
        patterns: &[r"current\s+ratio"],
    },
    AliasDef {
        metric: MARKET_CAPITALIZATION,
        patterns: &[r"market\s+cap"],
    },
];

pub fn builtin_aliases() -> &'static [AliasDef] {
    BUILTIN_ALIASES
}
