//! Composition scenario tests and shared recording behaviors


mod lifecycle_scenarios;
