// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod api;
pub mod assembly;
pub mod backend;
pub mod certificate;
pub mod config;
pub mod errors;
pub mod network;
pub mod server;
pub mod service;
pub mod store;
pub mod sync;
pub mod telemetry;
