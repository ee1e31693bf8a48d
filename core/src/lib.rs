//! Salon commission engine.
//!
//! Turns a payroll report grid into per-staff commission components:
//!   1. PayrollRowScanner finds staff blocks        (scanner.rs)
//!   2. RevenueBucketer splits block revenue         (bucketer.rs)
//!   3. TieredCommissionCalculator applies hurdles   (tiered.rs)
//!   4. CommissionAggregator assembles the record    (aggregator.rs)
//!   5. PoolAllocator equalizes pooled staff         (pooling.rs)
//!
//! The engine (engine.rs) runs these in that fixed order.

pub mod aggregator;
pub mod bucketer;
pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod grid;
pub mod payments;
pub mod pooling;
pub mod resolver;
pub mod scanner;
pub mod tiered;
pub mod types;
