use shape_ngin::{AppConfig, demos::cube, flow::run};

fn main() -> anyhow::Result<()> {
    run(
        vec![cube::constructor()],
        AppConfig {
            title: "Cube".to_string(),
            ..Default::default()
        },
    )
}
