/*!

# Cargo Features

* **`std`** (enabled by default): Implement `std::error::Error` for
  [`cmphints::Error`][crate::Error]. Without it the crate only needs `alloc`.

* **`log`**: Enable logging with [the `log` crate](https://docs.rs/log). Dropped
  hints are logged at the `trace` level and a summary of every hint pass at the
  `debug` level.

 */
