//! Cleaning and consolidation of the three logistics extracts.
//!
//! Health scoring is the leaf; inventory and feedback cleaning are
//! independent; transactions are checked against both cleaned tables; the
//! consolidator joins everything into the fact table.

pub mod consolidate;
pub mod feedback;
pub mod health;
pub mod inventory;
pub mod metrics;
pub mod transactions;

pub use consolidate::{apply_loyalty_paradox, consolidate};
pub use feedback::{NpsCategory, normalize_nps, normalize_nps_value, process_feedback};
pub use health::health_score;
pub use inventory::{correct_stock, parse_lead_time, process_inventory};
pub use metrics::{
    CostRange, Dataset, DatasetCounters, FeedbackCounters, HealthScore, InventoryCounters,
    QualityMetrics, TransactionCounters,
};
pub use transactions::process_transactions;
