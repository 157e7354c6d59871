pub mod random;
pub mod range;
pub mod scan;

pub use random::{EntropySource, RandomSource};
pub use range::{classify_value, observe};
pub use scan::{classify_scan, PanelEvidence, ScanAssessment};
