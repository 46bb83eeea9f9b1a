//! Read telemetry from PowerQueen LiFePO4 Battery Management Systems over Bluetooth Low Energy
//!
//! Tested with a 12.8V 100Ah battery sold around the year 2023.
//!
//! The BMS has a BLE interface with a single GATT characteristic carrying a
//! proprietary request-response protocol, reverse engineered from the stock
//! PowerQueen app. Fixed 8-byte requests select a report and the responses
//! are little-endian binary frames.
//!
//! Currently the following data can be accessed:
//!
//! - Battery and per-cell voltages (V)
//! - Load / charge current (A) and power (W)
//! - State of charge (%) and state of health
//! - Remaining and factory capacity (Ah)
//! - Cell and MOSFET temperatures
//! - Protection, failure, heating and balancing state
//! - Discharge counters
//! - Firmware version, hardware revision and manufacture date
//!
//! # Example
//!
//! ```no_run
//! # #[tokio::main]
//! # pub async fn main() {
//!     let mut client = pqbms::BmsClient::new("P051-12100A").await.unwrap();
//!     let telemetry = client.fetch_telemetry().await.unwrap();
//!     println!("{}", serde_json::to_string_pretty(&telemetry).unwrap());
//!     client.stop().await.unwrap();
//! # }
//! ```

mod client;
mod command;
mod error;
mod frame;
mod telemetry;

pub use client::BmsClient;
pub use command::Command;
pub use error::DecodeError;
pub use telemetry::Telemetry;
