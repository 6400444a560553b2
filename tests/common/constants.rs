//! Shared constants for end-to-end tests

#![allow(dead_code)]

// ============================================================================
// Broker
// ============================================================================

pub const TEST_HOST: &str = "localhost";

pub const TEST_USER: &str = "guest";

pub const TEST_PASS: &str = "guest";

/// `Authorization` header the management client must send for
/// [`TEST_USER`]/[`TEST_PASS`]
pub const TEST_BASIC_AUTH: &str = "Basic Z3Vlc3Q6Z3Vlc3Q=";

pub const DEFAULT_VHOST: &str = "/";

// ============================================================================
// Broker objects
// ============================================================================

pub const ORDERS_QUEUE: &str = "orders";

pub const EVENTS_EXCHANGE: &str = "events";

pub const MISSING_QUEUE: &str = "missing";

// ============================================================================
// Protocol
// ============================================================================

pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const NOT_FOUND_CODE: i64 = -32004;

pub const BROKER_OPERATION_CODE: i64 = -32005;

pub const CONNECTION_CODE: i64 = -32006;
