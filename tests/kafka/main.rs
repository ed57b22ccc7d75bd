//! Kafka broker E2E tests
//!
//! These need a broker reachable at `kafka:9092` and are ignored by default:
//! `cargo test --test kafka -- --ignored`

mod consume_lib;
