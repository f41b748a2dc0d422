//! # Singleton Example
//!
//! Three triggers sharing one popover:
//! - Building a group with [`singleton`] and registering member handles
//! - Simulating member trigger events with [`TestSingleton::fire`]
//! - Watching the shared container's content swap per active member
//!
//! Run with: `cargo run --example singleton`

use std::rc::Rc;

use tether::testing::TestEngine;
use tether::widgets::{singleton, Popover, PopoverProps, SingletonProps};
use tether::{Delay, Element, SingletonHandle};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let engine = Rc::new(TestEngine::new());
    let (mut source, target) = singleton(
        Rc::clone(&engine),
        SingletonProps::new().delay(Delay::both(100)),
    );

    // each member is an ordinary popover whose handle joins the group
    let mut members = Vec::new();
    for label in ["alpha", "beta", "gamma"] {
        let trigger = Element::new("button");
        trigger.set_text(label);
        let props = PopoverProps::new(format!("tip for {label}"));
        let mut popover = Popover::new(Rc::clone(&engine), props.clone());
        popover.render(Some(&trigger), props)?;
        let handle = popover.handle_dyn().ok_or("member did not mount")?;
        target.register(handle, format!("tip for {label}"));
        members.push((trigger, popover));
    }

    source.render(SingletonProps::new().delay(Delay::both(100)))?;
    let aggregate = source.aggregate().ok_or("group did not mount")?;
    println!("members:   {}", aggregate.instances().len());

    for (trigger, _) in &members {
        aggregate.fire(trigger);
        println!("active:    {}", source.container());
    }

    // dropping a member removes it from the group on the next pass
    members.pop();
    source.refresh()?;
    println!("members:   {}", source.aggregate().unwrap().instances().len());
    Ok(())
}
