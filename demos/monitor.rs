use std::collections::HashMap;
use std::env;

use luxtronik_climate::{Circuit, CircuitKind, RegisterMap, discover};

fn main() -> luxtronik_climate::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let path = args.get(1).expect("usage: monitor <registers.json> [--discover]");

    if args.iter().any(|a| a == "--discover") {
        match discover()? {
            Some((ip, port)) => println!("Controller at {ip} (port {port:?})"),
            None => println!("No controller answered"),
        }
    }

    let json = std::fs::read_to_string(path)?;
    let regs = RegisterMap::from_json(&json)?;
    let sensors: HashMap<String, String> = HashMap::new();

    for kind in [CircuitKind::Heating, CircuitKind::DomesticWater, CircuitKind::Cooling] {
        let mut circuit = Circuit::builder(kind)
            .on_event(|event| println!("{event:?}"))
            .build();
        let state = circuit.state(&regs, &sensors)?;
        println!(
            "[{}] action: {} | mode: {} | preset: {} | current: {:?} | target: {:?} | {}",
            circuit.name(),
            state.action,
            state.mode,
            state.preset,
            state.current_temperature,
            state.target_temperature,
            state.icon,
        );
    }

    Ok(())
}
