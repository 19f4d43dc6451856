pub mod config;
pub mod demo_data;
pub mod dominance_ord;
pub mod fitness;
pub mod hypervolume;
pub mod individual;
pub mod instance;
pub mod logging;
pub mod non_dominated_sort;
pub mod nsga2_optimizer;
pub mod policy;
pub mod priority_orders;
pub mod reader;
pub mod report;
pub mod variation;
pub mod visualization;
