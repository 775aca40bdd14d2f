//! Thermostat with Level-Crossing Detection
//!
//! A two-state heater controller driven by a crude room simulation. The
//! simulation integrates the temperature with a variable step and uses the
//! controller's boundary estimate to shrink the step until each switching
//! threshold is hit within tolerance.
//!
//! Key concepts:
//! - Building a machine with guards, choice outputs and commit assignments
//! - Repeated evaluate passes before a single commit
//! - Refining the step size from the relation distances
//! - Checkpointing the controller
//!
//! Run with: cargo run --example thermostat
//! Set RUST_LOG=modal_fsm=debug to see the engine's trace.

use modal_fsm::builder::{MachineBuilder, TransitionBuilder};
use modal_fsm::controller::{FsmController, StateChange};
use modal_fsm::core::Value;
use modal_fsm::effects::PortMap;
use modal_fsm::machine::{Comparison, ValueExpr};
use tracing_subscriber::EnvFilter;

const LOW: f64 = 18.0;
const HIGH: f64 = 22.0;
const HEAT_RATE: f64 = 1.5;
const COOL_RATE: f64 = -0.8;
const TOLERANCE: f64 = 1e-3;
const MAX_STEP: f64 = 1.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Thermostat ===\n");

    let machine = MachineBuilder::new("thermostat")
        .input("temperature", 1)
        .output("heater", 1)
        .parameter("heating_cycles", 0i64)
        .state("Idle")
        .state("Heating")
        .initial("Idle")
        .transition(
            TransitionBuilder::new()
                .from("Idle")
                .to("Heating")
                .name("too_cold")
                .when(|ctx| {
                    let t = ctx.number("temperature")?;
                    Ok(ctx.compare(t, Comparison::Less, LOW))
                })
                .output("heater", ValueExpr::literal(true))
                .set(
                    "heating_cycles",
                    ValueExpr::computed(|scope| {
                        let n = scope.number("heating_cycles")?;
                        Ok(Value::Int(n as i64 + 1))
                    }),
                ),
        )?
        .transition(
            TransitionBuilder::new()
                .from("Heating")
                .to("Idle")
                .name("warm_enough")
                .when(|ctx| {
                    let t = ctx.number("temperature")?;
                    Ok(ctx.compare(t, Comparison::Greater, HIGH))
                })
                .output("heater", ValueExpr::literal(false)),
        )?
        .build()?;

    let mut controller = FsmController::new(machine).with_listener(|change: &StateChange| {
        println!(
            "  [{}] {} -> {} via {}",
            change.cycle, change.from_name, change.to_name, change.transition_name
        );
    });
    controller.initialize()?;

    let mut ports = PortMap::new();
    let mut time = 0.0;
    let mut temperature = 20.0;

    while time < 30.0 {
        let rate = if controller.current_state_name() == Some("Heating") {
            HEAT_RATE
        } else {
            COOL_RATE
        };

        let mut step = MAX_STEP;
        let mut proposed = temperature + rate * step;
        let mut refinements = 0;
        loop {
            ports.set_input("temperature", 0, proposed);
            controller.fire(&mut ports)?;
            let estimate = controller.estimate_boundary(TOLERANCE)?;
            if estimate.accurate || refinements == 20 {
                break;
            }
            step = controller.refined_step_size(step, TOLERANCE);
            proposed = temperature + rate * step;
            refinements += 1;
        }

        let crossed = controller.has_current_event();
        controller.postfire(&mut ports)?;
        time += step;
        temperature = proposed;

        if crossed || refinements > 0 {
            println!(
                "t = {time:6.3}s  T = {temperature:7.4}  dt = {step:.4} ({refinements} refinements)"
            );
        }
    }

    println!("\nFinal state: {:?}", controller.current_state_name());
    println!(
        "Heating cycles: {}",
        controller
            .variable("heating_cycles")
            .map(ToString::to_string)
            .unwrap_or_default()
    );
    println!("Path: {}", controller.history().path().join(" -> "));

    let checkpoint = controller.checkpoint();
    println!("\nCheckpoint ({} bytes as bincode):", checkpoint.to_bytes()?.len());
    println!("{}", checkpoint.to_json()?);

    Ok(())
}
