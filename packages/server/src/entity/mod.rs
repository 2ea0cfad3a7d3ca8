pub mod fap_analysis;
pub mod fap_average;
