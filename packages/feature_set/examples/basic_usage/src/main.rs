#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Basic usage example for `uuid_feature_set`
//!
//! This example demonstrates:
//! - Reading feature options from the environment
//! - Inspecting which variant was selected for each role
//! - Creating and parsing UUIDs through the assembled roles
//! - Swapping the time source at runtime

use std::sync::Arc;

use uuid_feature_set::{
    FeatureOptions, FeatureSet, Strategy as _,
    time::FixedTimeProvider,
    types::Time,
    uuid_factory::UuidFactory,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    println!("=== UUID Feature Set - Basic Usage Example ===\n");

    // Example 1: Options from UUID_* environment variables
    let options = FeatureOptions::from_env()?;
    println!("1. Options: {options:?}\n");

    // Example 2: Assemble against the host
    let features = FeatureSet::new(options)?;
    println!("2. Capabilities: {:?}", features.capabilities());
    println!("   Calculator:       {}", features.calculator().kind());
    println!("   Time converter:   {}", features.time_converter().kind());
    println!("   Builder:          {}", features.uuid_builder().kind());
    println!("   Codec:            {}", features.codec().kind());
    println!("   Node provider:    {}", features.node_provider().kind());
    println!("   Random generator: {}", features.random_generator().kind());
    println!("   Time generator:   {}", features.time_generator().kind());
    println!("   Validator:        {}\n", features.validator().kind());

    // Example 3: Create and parse UUIDs
    let mut factory = UuidFactory::new(features);
    let v1 = factory.uuid1(None, None)?;
    let v4 = factory.uuid4()?;
    println!("3. Version 1: {v1}");
    println!("   Version 4: {v4}");

    let parsed = factory.from_string(&format!("urn:uuid:{v4}"))?;
    println!("   Parsed URN matches: {}", parsed == v4);
    println!("   '{v1}' valid: {}\n", factory.is_valid(&v1.to_string()));

    // Example 4: Pin the clock
    factory
        .features_mut()
        .set_time_provider(Arc::new(FixedTimeProvider::new(Time::new(1_234_567_890, 0))));
    let pinned = factory.uuid1(None, Some(0))?;
    log::info!("pinned uuid={pinned}");
    println!("4. Pinned version 1: {pinned}");
    if let Some(timestamp) = pinned.get_timestamp() {
        println!("   Unix time: {:?}", timestamp.to_unix());
    }

    Ok(())
}
