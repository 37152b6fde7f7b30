/// Console adapters for interactive progress on stderr
mod scan_spinner;

pub use scan_spinner::ScanSpinner;
