//! # Controlled Visibility Example
//!
//! Caller-driven show/hide:
//! - Declaring an explicit `visible` flag switches the popover into
//!   controlled mode, disabling the engine's own interaction triggers
//! - Each render pass reconciles the declared flag against the engine
//!
//! Run with: `cargo run --example controlled`

use std::rc::Rc;

use tether::testing::TestEngine;
use tether::widgets::{Popover, PopoverProps};
use tether::{Element, PopoverHandle};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let engine = Rc::new(TestEngine::new());
    let trigger = Element::new("input");

    let mut popover = Popover::new(
        Rc::clone(&engine),
        PopoverProps::new("required field").visible(false),
    );
    popover.render(Some(&trigger), PopoverProps::new("required field").visible(false))?;

    let handle = popover.handle().ok_or("popover did not mount")?;
    println!("triggers: {:?}", handle.props().triggers);
    println!("shown:    {}", handle.is_shown());

    // flipping the flag shows without any interaction event
    popover.render(Some(&trigger), PopoverProps::new("required field").visible(true))?;
    println!("shown:    {}", handle.is_shown());

    popover.render(Some(&trigger), PopoverProps::new("required field").visible(false))?;
    println!("shown:    {}", handle.is_shown());

    println!("ops:      {:?}", engine.ops());
    Ok(())
}
