use std::collections::HashMap;

use luxtronik_climate::{
    CircuitKind, DeviceInfo, DeviceInfos, EntryConfig, OperatingAction, OperatingMode, Preset,
    RegisterEntry, RegisterMap, config_entry_diagnostics, discover, setup_entry,
};

const SNAPSHOT: &str = r#"{
    "calculations.ID_WEB_WP_BZ_akt": "heating",
    "calculations.ID_WEB_HauptMenuStatus_Zeile1": "heatpump running",
    "calculations.ID_WEB_HauptMenuStatus_Zeile3": "heating",
    "calculations.ID_WEB_Temperatur_TBW": 47.5,
    "calculations.ID_WEB_Temperatur_TA": 3.2,
    "calculations.ID_WEB_BUPout": false,
    "calculations.ID_WEB_HUPout": true,
    "parameters.ID_Ba_Hz_akt": "Automatic",
    "parameters.ID_Ba_Bw_akt": "Party",
    "parameters.ID_Einst_BA_Kuehl_akt": "Off",
    "parameters.ID_Einst_WK_akt": -1.0,
    "parameters.ID_Soll_BWS_akt": 50.0,
    "parameters.ID_Einst_KuhlFreig_akt": 22.0,
    "parameters.ID_Einst_Fernwartung_akt": true,
    "parameters.ID_Einst_Effizienzpumpe_akt": false,
    "parameters.ID_Einst_P155_PumpHeatCtrl": true,
    "parameters.ID_Einst_Popt_akt": false,
    "parameters.ID_Einst_Heizgrenze": true
}"#;

fn devices() -> DeviceInfos {
    let model = Some("LWP 8");
    DeviceInfos {
        main: DeviceInfo::new("luxtronik", "Luxtronik", model),
        heating: Some(DeviceInfo::new("heating", "Heating", model)),
        domestic_water: Some(DeviceInfo::new("domestic_water", "Domestic water", model)),
        cooling: Some(DeviceInfo::new("cooling", "Cooling", model)),
    }
}

#[test]
fn setup_and_poll_all_circuits() {
    let entry = EntryConfig::from_json(
        r#"{"title": "Alpha Innotec LWP 8", "data": {"host": "192.168.1.20"},
            "options": {"ha_sensor_indoor_temperature": "sensor.living_room"}}"#,
    )
    .unwrap();
    let mut regs = RegisterMap::from_json(SNAPSHOT).unwrap();
    let mut sensors = HashMap::new();
    sensors.insert("sensor.living_room".to_string(), "20.5".to_string());

    let mut entities = setup_entry(&entry, &devices()).unwrap();

    let heating = entities.circuit_mut(CircuitKind::Heating).unwrap();
    assert_eq!(
        heating.device_info().and_then(|d| d.manufacturer.as_deref()),
        Some("Alpha Innotec")
    );
    let state = heating.state(&regs, &sensors).unwrap();
    assert_eq!(state.action, OperatingAction::Heating);
    assert_eq!(state.mode, OperatingMode::Auto);
    assert_eq!(state.current_temperature, Some(20.5));
    assert_eq!(state.target_temperature, Some(-1.0));

    let water = entities.circuit_mut(CircuitKind::DomesticWater).unwrap();
    let state = water.state(&regs, &sensors).unwrap();
    assert_eq!(state.action, OperatingAction::Idle);
    assert_eq!(state.preset, Preset::Boost);
    assert_eq!(state.current_temperature, Some(47.5));
    water.set_preset(&mut regs, Preset::None).unwrap();

    let cooling = entities.circuit_mut(CircuitKind::Cooling).unwrap();
    let state = cooling.state(&regs, &sensors).unwrap();
    assert_eq!(state.action, OperatingAction::Off);
    assert_eq!(state.icon, "mdi:snowflake");

    let switch = entities.switch("domestic_water").unwrap();
    assert!(switch.is_on(&regs).unwrap());
    assert!(entities.switch("remote_maintenance").unwrap().is_on(&regs).unwrap());
}

#[test]
fn diagnostics_for_entry() {
    let entry =
        EntryConfig::from_json(r#"{"data": {"host": "192.168.1.20", "port": 8888}}"#).unwrap();
    let diag = config_entry_diagnostics(
        &entry,
        None,
        &[RegisterEntry::new(3, "ID_Ba_Hz_akt", "Automatic")],
        &[],
        &[],
    )
    .unwrap();
    assert_eq!(diag["entry"]["data"]["port"], 8888);
    assert_eq!(diag["entry"]["data"]["mac"], "");
}

/// Run with: cargo test --test integration -- --ignored
/// Requires a Luxtronik controller on the local broadcast domain.
#[test]
#[ignore]
fn discover_controller_on_lan() {
    let found = discover().expect("discovery failed");
    let (ip, port) = found.expect("no controller answered");
    println!("found controller at {ip} port {port:?}");
}
