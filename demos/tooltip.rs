//! # Tooltip Example
//!
//! A plain text tooltip driven end to end through the headless test engine:
//! - Declaring [`PopoverProps`] and rendering a [`Popover`] against a trigger
//! - Pushing a configuration change on a later render pass
//! - Inspecting the engine operation log and the popper's class list
//!
//! Run with: `cargo run --example tooltip`

use std::rc::Rc;

use tether::testing::TestEngine;
use tether::widgets::{Popover, PopoverProps};
use tether::{Element, Placement, PopoverHandle};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let engine = Rc::new(TestEngine::new());
    let trigger = Element::new("button");
    trigger.set_text("hover me");

    let props = PopoverProps::new("Saved!").class_name("toast success");
    let mut popover = Popover::new(Rc::clone(&engine), props.clone());
    popover.render(Some(&trigger), props.clone())?;

    let handle = popover.handle().ok_or("popover did not mount")?;
    println!("trigger:  {trigger}");
    println!("popper:   {}", handle.popper());

    handle.show();
    println!("shown:    {}", handle.is_shown());

    // a later pass with new props pushes the change into the live handle
    popover.render(
        Some(&trigger),
        props.placement(Placement::Bottom).class_name("toast warning"),
    )?;
    println!("popper:   {}", handle.popper());
    println!("placement: {:?}", handle.props().placement);

    popover.unmount();
    println!("ops:      {:?}", engine.ops());
    Ok(())
}
