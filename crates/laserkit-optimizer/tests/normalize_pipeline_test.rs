use laserkit_core::parse_program;
use laserkit_optimizer::{NormalizerSettings, StreamNormalizer};

// Raw vector-converter style output: power carried implicitly by S words,
// no toggles, no axis control.
const RAW: &str = "\
G0 X50 Y50
G1 X51 Y51 S500 F600
G1 X52 Y52
S0
G0 X1 Y1
G1 X2 Y2 S500
S0";

#[test]
fn test_full_normalization_makes_power_explicit_and_minimal() {
    let mut commands = parse_program(RAW).unwrap();
    StreamNormalizer::new().normalize(&mut commands).unwrap();

    let texts: Vec<&str> = commands.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "G0 X50.000 Y50.000",
            "M3 S500",
            "G0 Z0.000",
            "G1 X51.000 Y51.000 F600.0",
            "G1 X52.000 Y52.000 F600.0",
            "M5",
            "G0 Z1.000",
            "G0 X1.000 Y1.000 F600.0",
            "M3 S500",
            "G0 Z0.000",
            "G1 X2.000 Y2.000 F600.0",
            "M5",
            "G0 Z1.000",
        ]
    );
}

#[test]
fn test_full_normalization_is_idempotent() {
    let mut commands = parse_program(RAW).unwrap();
    let normalizer = StreamNormalizer::new();

    normalizer.normalize(&mut commands).unwrap();
    let once = commands.clone();
    normalizer.normalize(&mut commands).unwrap();

    assert_eq!(commands, once);
}

#[test]
fn test_custom_depths_flow_through() {
    let mut commands = parse_program("G1 X5 Y0 S800 F300\nS0").unwrap();
    StreamNormalizer::with_settings(NormalizerSettings {
        engrave_z: -1.5,
        travel_z: 5.0,
    })
    .normalize(&mut commands)
    .unwrap();

    let texts: Vec<&str> = commands.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "M3 S800",
            "G0 Z-1.500",
            "G1 X5.000 Y0.000 F300.0",
            "M5",
            "G0 Z5.000",
        ]
    );
}
