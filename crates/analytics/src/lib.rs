//! # Quantlens Analytics Engine
//!
//! This crate turns a raw daily price series into an explainable
//! `AssetAnalysis`: annualized return/risk statistics plus a trend and
//! momentum classification.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** This crate has no knowledge of external systems. It
//!   depends only on `core-types`. Fetching and persistence live elsewhere.
//! - **Stateless Calculation:** Every function takes a series and returns a
//!   value. No caches, no globals; every call is reentrant.
//! - **NaN Is a Result:** Undefined statistics (short history, zero
//!   variance) are reported as `NaN`, never coerced to zero.
//!
//! ## Public API
//!
//! - `normalize`: The single gate from a provider `RawSeries` to a `TimeSeries`.
//! - `indicators`: Moving average and relative strength oscillator.
//! - `performance`: CAGR, volatility, Sharpe and max drawdown.
//! - `technical`: Trend regime and latest RSI.
//! - `AnalyticsEngine`: Composes the above into an `AssetAnalysis`.
//! - `chart_frame`: Indicator columns for presentation.

// Declare the modules that constitute this crate.
pub mod chart;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod normalizer;
pub mod performance;
pub mod report;
pub mod technical;

// Re-export the key components to create a clean, public-facing API.
pub use chart::{chart_frame, ChartFrame, ChartRow};
pub use engine::{AnalysisParams, AnalyticsEngine};
pub use error::AnalyticsError;
pub use normalizer::normalize;
pub use report::{AnalysisMetadata, AssetAnalysis, Explain, ExplainValue, QuantReport, TechnicalReport};
