#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod calculator;
pub mod error;
pub mod record;
pub mod registry;
pub mod row;

pub use calculator::{DerivedRatios, EbitPriceConvention, RatioCalculator};
pub use error::{RatioError, Result};
pub use record::{FinancialRecord, MarketInfo, RequiredField};
pub use registry::{
    IndicatorCategory, IndicatorInfo, available_indicators, count_by_category, get_indicator_info,
    indicators_by_category, list_indicator_names,
};
pub use row::TickerRatios;
