use shape_ngin::{AppConfig, demos::triangle, flow::run};

fn main() -> anyhow::Result<()> {
    let config = AppConfig {
        title: "Triangle".to_string(),
        ..Default::default()
    };
    run(vec![triangle::constructor()], config)
}
