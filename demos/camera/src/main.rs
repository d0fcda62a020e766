use shape_ngin::{AppConfig, Deg, demos::camera, flow::run};

fn main() -> anyhow::Result<()> {
    run(
        vec![camera::constructor()],
        AppConfig {
            title: "Camera".to_string(),
            camera_turn: Deg(1.5),
            ..Default::default()
        },
    )
}
