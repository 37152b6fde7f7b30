mod scan_results_query;

pub use scan_results_query::{NodeRef, ScanResultsQuery};
