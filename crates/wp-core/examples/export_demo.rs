//! Build a small CCTV topology and print the save-file records.
//!
//! Run with `cargo run --example export_demo -p wp-core`.

use wp_core::{CreateOptions, CustomTextLabel, DeviceId, DeviceRef, TopologyGraph};

fn main() {
    env_logger::init();

    let nvr = DeviceRef::new(DeviceId::intern("nvr_1"), "nvr.png")
        .panel()
        .with_label("Rack NVR");
    let lobby = DeviceRef::new(DeviceId::intern("cam_lobby"), "fixed-camera.png");
    let dock = DeviceRef::new(DeviceId::intern("cam_dock"), "ptz-camera.png");

    let mut graph = TopologyGraph::new();
    let opts = CreateOptions::default();
    let run1 = graph.create_connection(&nvr, &lobby, None, opts).unwrap();
    let run2 = graph.create_connection(&nvr, &dock, None, opts).unwrap();

    graph.set_label(run1, "lobby run");
    graph.add_custom_label(run2, CustomTextLabel {
        id: "riser".into(),
        text: "through riser 2".into(),
        path_ratio: 0.4,
    });
    for event in graph.take_events() {
        log::info!("{event:?}");
    }

    let records = graph.export_records();
    println!("{}", serde_json::to_string_pretty(&records).unwrap());
}
