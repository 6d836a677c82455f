//! Global versus per-model scope, and admin exemption.
//!
//! Loads the limiter from host-style JSON settings, then shows how one
//! user's requests to different models share a quota under global scope
//! and stop sharing it once the policy is replaced.

use request_throttle::{Decision, InMemoryController, Policy, PolicyConfig, Role, Subject};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn report(label: &str, decision: Decision) {
    match decision {
        Decision::Admitted => println!("  {:<28} admitted", label),
        Decision::Rejected(r) => println!("  {:<28} {}", label, r),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = PolicyConfig::from_json_str(
        r#"{
            "requests_per_minute": 2,
            "requests_per_hour": null,
            "sliding_window_limit": null,
            "global_limit": true,
            "enabled_for_admins": false
        }"#,
    )?;
    let limiter = InMemoryController::builder().with_config(config)?.build();
    let now = Instant::now();

    println!("=== Global scope (2/min per user) ===");
    for model in ["llama", "mistral", "qwen"] {
        let subject = Subject::new("bob", model)?;
        report(&format!("bob -> {}", model), limiter.evaluate(&subject, Role::User, now));
    }

    println!("\n=== Admins are exempt ===");
    let admin = Subject::new("root", "llama")?;
    for i in 1..=3 {
        report(&format!("root (admin) #{}", i), limiter.evaluate(&admin, Role::Admin, now));
    }

    limiter.replace_policy(
        Policy::builder()
            .per_minute(Some(2))
            .scope_global(false)
            .build()?,
    );

    println!("\n=== Per-model scope after reconfiguration ===");
    for model in ["llama", "mistral", "qwen"] {
        let subject = Subject::new("bob", model)?;
        report(&format!("bob -> {}", model), limiter.evaluate(&subject, Role::User, now));
    }

    println!("\nUsage for bob -> qwen:");
    for usage in limiter.usage(&Subject::new("bob", "qwen")?, now) {
        println!(
            "  {:<14} {} used, {} remaining",
            usage.tier.kind(),
            usage.count,
            usage.remaining
        );
    }

    Ok(())
}
