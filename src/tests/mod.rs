// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod fixtures;
pub mod merkle_tests;
pub mod status_tests;
pub mod proof_tests;
