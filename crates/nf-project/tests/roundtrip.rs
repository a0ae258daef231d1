use nf_project::schema::*;
use nf_project::{load_json, load_yaml, save_json, save_yaml, LATEST_VERSION};

fn sample() -> NetworkDef {
    NetworkDef {
        version: LATEST_VERSION,
        name: "Roundtrip".to_string(),
        solver: nf_solver::SolverConfig {
            max_minor_steps: 4,
            parallel_islands: true,
            ..Default::default()
        },
        ground: GroundDef {
            name: "GND".to_string(),
            potential: 0.0,
        },
        nodes: vec![
            NodeDef {
                name: "bus".to_string(),
                potential: 28.0,
                capacitance: 0.0,
            },
            NodeDef {
                name: "tank".to_string(),
                potential: 0.0,
                capacitance: 5.0,
            },
        ],
        tables: vec![TableDef {
            id: "voc".to_string(),
            x: vec![0.0, 1.0],
            y: vec![3.0, 4.2],
        }],
        links: vec![
            LinkDef {
                name: "bat".to_string(),
                ports: vec!["GND".to_string(), "bus".to_string()],
                enabled: true,
                kind: LinkKind::Battery {
                    cells: 7,
                    cell_resistance: 0.05,
                    max_capacity: 10.0,
                    soc: 0.8,
                    voc_table: "voc".to_string(),
                    open_circuit: false,
                },
            },
            LinkDef {
                name: "feed".to_string(),
                ports: vec!["bus".to_string(), "tank".to_string()],
                enabled: false,
                kind: LinkKind::Conductor {
                    conductance: 2.0,
                    blockage: Some(0.25),
                },
            },
            LinkDef {
                name: "heater".to_string(),
                ports: vec!["bus".to_string(), "GND".to_string()],
                enabled: true,
                kind: LinkKind::ConstantPowerLoad {
                    power: 50.0,
                    expected_potential: None,
                },
            },
        ],
        spotters: vec![SpotterDef {
            name: "bus_v".to_string(),
            kind: SpotterKind::PotentialSensor {
                node: "bus".to_string(),
                min: 0.0,
                max: 40.0,
            },
        }],
    }
}

#[test]
fn roundtrip_yaml() {
    let def = sample();
    let path = std::env::temp_dir().join("nf_project_roundtrip.yaml");
    save_yaml(&path, &def).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(def, loaded);
}

#[test]
fn roundtrip_json() {
    let def = sample();
    let path = std::env::temp_dir().join("nf_project_roundtrip.json");
    save_json(&path, &def).unwrap();
    let loaded = load_json(&path).unwrap();
    assert_eq!(def, loaded);
}

#[test]
fn save_refuses_invalid_definition() {
    let mut def = sample();
    def.links[0].ports[1] = "nowhere".to_string();
    let path = std::env::temp_dir().join("nf_project_invalid.yaml");
    assert!(save_yaml(&path, &def).is_err());
}

#[test]
fn disabled_link_starts_disabled() {
    let def = sample();
    let network = nf_project::build_network(&def).unwrap();
    let feed = network.link_id("feed").unwrap();
    assert_eq!(network.solver().link_enabled(feed), Some(false));
}
