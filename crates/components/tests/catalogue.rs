//! Checks on the catalogue compiled into the binary

use appbuild_components::ComponentDatabase;

#[test]
fn test_location_sensor_base_permissions() {
    let db = ComponentDatabase::builtin().unwrap();
    let descriptor = db.get("LocationSensor").unwrap();

    let permissions: Vec<&str> = descriptor.permissions.iter().map(String::as_str).collect();
    assert_eq!(
        permissions,
        vec![
            "android.permission.ACCESS_COARSE_LOCATION",
            "android.permission.ACCESS_FINE_LOCATION",
            "android.permission.ACCESS_LOCATION_EXTRA_COMMANDS",
            "android.permission.ACCESS_MOCK_LOCATION",
        ]
    );
    assert!(descriptor.conditional_permissions.is_empty());
}

#[test]
fn test_texting_receivers_are_block_triggered() {
    let db = ComponentDatabase::builtin().unwrap();
    let descriptor = db.get("Texting").unwrap();

    assert_eq!(descriptor.receivers.len(), 2);
    assert!(descriptor
        .receivers
        .iter()
        .all(|receiver| !receiver.is_unconditional()));
}

#[test]
fn test_picker_activities_are_always_included() {
    let db = ComponentDatabase::builtin().unwrap();

    for component_type in ["BarcodeScanner", "ListPicker"] {
        let descriptor = db.get(component_type).unwrap();
        assert_eq!(descriptor.activities.len(), 1, "{}", component_type);
        assert!(descriptor.activities[0].is_unconditional());
    }
}

#[test]
fn test_every_fragment_is_an_element() {
    let db = ComponentDatabase::builtin().unwrap();

    for (component_type, descriptor) in db.iter() {
        for fragment in descriptor
            .receivers
            .iter()
            .chain(&descriptor.activities)
            .chain(&descriptor.services)
        {
            let text = fragment.fragment.trim();
            assert!(
                text.starts_with('<') && text.ends_with('>'),
                "{} has a non-element fragment: {}",
                component_type,
                text
            );
        }
    }
}
