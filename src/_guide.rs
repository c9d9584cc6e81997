/*!

Tutorials, overviews, and etc... for the `cmphints` crate.

All the documentation that isn't API reference.

# Table of Contents

* [How Scalar Hints Are Resolved][width_reconciliation]
* [Integrating Hints with a Fuzzer][fuzzer_integration]
* [Cargo Features][cargo_features]
* [Minimum Supported Rust Version][msrv]

 */

pub mod cargo_features;
pub mod fuzzer_integration;
pub mod msrv;
pub mod width_reconciliation;
