//! Component-level tests gathered under `tests/unit/`.

mod unit;
