use shape_ngin::{AppConfig, demos::cubes, flow::run};

fn main() -> anyhow::Result<()> {
    run(
        vec![cubes::constructor()],
        AppConfig {
            title: "Multiple cubes".to_string(),
            ..Default::default()
        },
    )
}
